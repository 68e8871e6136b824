//! 图像与标签的配对表。配对只在原始目录列表上建立一次，之后各阶段只更新表中路径。

use crate::prep::imgio::{self, file_stem};
use crate::Result;
use log::warn;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// 一对训练样本：图像及其标签的当前路径。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Sample {
    /// 原始图像的文件主干名，整个流水线中不变。
    pub key: String,
    pub image: PathBuf,
    pub label: PathBuf,
}

/// 按原始图像文件名排序建立配对表。
///
/// 标签主干名等于`图像主干名 + label_suffix`或图像主干名本身时视为匹配，
/// 前者优先。没有配对的图像或标签会被警告并排除。
pub fn pair_sources<P, Q, S>(
    images_dir: P,
    labels_dir: Q,
    label_suffix: &str,
    extensions: &[S],
) -> Result<Vec<Sample>>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    S: AsRef<str>,
{
    let images = imgio::list_files(images_dir, extensions)?;
    let mut labels: BTreeMap<String, PathBuf> = BTreeMap::new();
    for path in imgio::list_files(labels_dir, extensions)? {
        let stem = file_stem(&path);
        if let Some(prev) = labels.get(&stem) {
            warn!(
                "标签`{}`与`{}`主干名相同，忽略前者",
                path.display(),
                prev.display()
            );
            continue;
        }
        labels.insert(stem, path);
    }

    let mut samples = Vec::with_capacity(images.len());
    for image in images {
        let key = file_stem(&image);
        let suffixed = format!("{key}{label_suffix}");
        let label = labels.remove(&suffixed).or_else(|| labels.remove(&key));
        match label {
            Some(label) => samples.push(Sample { key, image, label }),
            None => warn!("图像`{}`没有对应的标签，已排除", image.display()),
        }
    }
    for orphan in labels.values() {
        warn!("标签`{}`没有对应的图像，已排除", orphan.display());
    }
    Ok(samples)
}
