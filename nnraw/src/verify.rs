//! 标签二值性校验与 nnU-Net 目录配对检查。校验失败只产生报告，不是错误。

use crate::dataset::layout::DatasetLayout;
use crate::dataset::CHANNEL_SUFFIX;
use crate::prep::imgio::{self, file_name, file_stem, DecodeOptions};
use crate::prep::pixel::{distinct_values, is_binary};
use crate::{PrepError, Result};
use log::warn;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// 一个像素值集合不是 {0, 1} 子集的标签文件。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LabelViolation {
    pub file: PathBuf,
    pub values: BTreeSet<u8>,
}

/// 标签校验结果。
#[derive(Debug, Default)]
pub struct VerificationReport {
    pub checked: usize,
    pub violations: Vec<LabelViolation>,
    /// 无法读取的标签。
    pub unreadable: Vec<(PathBuf, PrepError)>,
}

impl VerificationReport {
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.unreadable.is_empty()
    }

    /// 校验单个标签文件并计入报告。
    pub fn check_file(&mut self, path: &Path, decode: &DecodeOptions) {
        match imgio::decode_luma(path, decode) {
            Ok(img) => {
                self.checked += 1;
                let values = distinct_values(&img);
                if !is_binary(&values) {
                    warn!("`{}`的像素值集合为{values:?}，不是二值标签", file_name(path));
                    self.violations.push(LabelViolation {
                        file: path.to_path_buf(),
                        values,
                    });
                }
            }
            Err(e) => {
                warn!("无法校验`{}`: {e}", path.display());
                self.unreadable.push((path.to_path_buf(), e));
            }
        }
    }
}

/// 校验目录下每个标签的像素值集合都是 {0, 1} 的子集。
pub fn verify_labels<P: AsRef<Path>, S: AsRef<str>>(
    labels_dir: P,
    extensions: &[S],
    decode: &DecodeOptions,
) -> Result<VerificationReport> {
    let mut report = VerificationReport::default();
    for path in imgio::list_files(labels_dir, extensions)? {
        report.check_file(&path, decode);
    }
    Ok(report)
}

/// 已有数据集目录的配对检查结果。
#[derive(Debug, Default, Eq, PartialEq)]
pub struct LayoutReport {
    pub paired: usize,
    /// 没有标签的训练图像。
    pub images_without_label: Vec<PathBuf>,
    /// 没有图像的标签。
    pub labels_without_image: Vec<PathBuf>,
    pub test_images: usize,
}

impl LayoutReport {
    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.images_without_label.is_empty() && self.labels_without_image.is_empty()
    }
}

/// 检查`imagesTr/<name>_0000<ext>`与`labelsTr/<name><ext>`一一对应。
pub fn check_layout<P: AsRef<Path>>(dataset_root: P, file_ending: &str) -> Result<LayoutReport> {
    let layout = DatasetLayout::at(dataset_root.as_ref());
    for dir in [&layout.images_tr, &layout.labels_tr] {
        if !dir.is_dir() {
            return Err(PrepError::SourceMissing { path: dir.clone() });
        }
    }
    let allow = [file_ending];
    let labels = imgio::list_files(&layout.labels_tr, &allow)?;
    let label_stems: HashSet<String> = labels.iter().map(|p| file_stem(p)).collect();

    let mut report = LayoutReport::default();
    let mut matched = HashSet::new();
    for image in imgio::list_files(&layout.images_tr, &allow)? {
        let stem = file_stem(&image);
        match stem.strip_suffix(CHANNEL_SUFFIX) {
            Some(case) if label_stems.contains(case) => {
                report.paired += 1;
                matched.insert(case.to_string());
            }
            _ => report.images_without_label.push(image),
        }
    }
    report.labels_without_image = labels
        .into_iter()
        .filter(|p| !matched.contains(&file_stem(p)))
        .collect();
    if layout.images_ts.is_dir() {
        report.test_images = imgio::list_files(&layout.images_ts, &allow)?.len();
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use std::fs;

    #[test]
    fn test_verify_labels_reports_non_binary() {
        let dir = tempfile::tempdir().unwrap();
        GrayImage::from_fn(4, 4, |x, _| Luma([(x % 2) as u8]))
            .save(dir.path().join("ok.png"))
            .unwrap();
        GrayImage::from_fn(4, 4, |x, _| Luma([if x == 0 { 255 } else { 0 }]))
            .save(dir.path().join("raw.png"))
            .unwrap();
        fs::write(dir.path().join("bad.png"), b"nope").unwrap();

        let report = verify_labels(dir.path(), &["png"], &DecodeOptions::default()).unwrap();
        assert_eq!(report.checked, 2);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].file, dir.path().join("raw.png"));
        assert_eq!(
            report.violations[0].values.iter().copied().collect::<Vec<_>>(),
            vec![0, 255]
        );
        assert_eq!(report.unreadable.len(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_check_layout() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DatasetLayout::at(dir.path());
        layout.create().unwrap();
        for name in ["c_001_0000.png", "c_002_0000.png", "stray.png"] {
            fs::write(layout.images_tr.join(name), b"").unwrap();
        }
        for name in ["c_001.png", "c_002.png", "c_009.png"] {
            fs::write(layout.labels_tr.join(name), b"").unwrap();
        }
        fs::write(layout.images_ts.join("c_000_0000.png"), b"").unwrap();

        let report = check_layout(dir.path(), ".png").unwrap();
        assert_eq!(report.paired, 2);
        assert_eq!(report.images_without_label, vec![layout.images_tr.join("stray.png")]);
        assert_eq!(report.labels_without_image, vec![layout.labels_tr.join("c_009.png")]);
        assert_eq!(report.test_images, 1);
        assert!(!report.is_consistent());
    }
}
