//! 像素亮度重映射：将哨兵值提亮为最大亮度，输出 PNG。

use crate::prep::imgio::{self, DecodeOptions, IMAGE_EXTENSIONS};
use crate::prep::pixel::{self, consts::{MAX_INTENSITY, SENTINEL}};
use crate::{BatchSummary, PrepError, Result};
use log::{debug, info};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// 重映射参数。
#[derive(Clone, Debug)]
pub struct RemapConfig {
    /// 被替换的像素值。
    pub from: u8,
    /// 替换后的像素值。
    pub to: u8,
    /// 目标是目录时，输出文件名中被替换的标记。
    pub marker: String,
    /// 标记的替换内容。
    pub replacement: String,
    /// 目录模式下处理的扩展名。
    pub extensions: Vec<String>,
    pub decode: DecodeOptions,
}

impl Default for RemapConfig {
    fn default() -> Self {
        Self {
            from: SENTINEL,
            to: MAX_INTENSITY,
            marker: "_0000".to_string(),
            replacement: "_final".to_string(),
            extensions: IMAGE_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            decode: DecodeOptions::default(),
        }
    }
}

impl RemapConfig {
    /// `dst`为目录时推导输出文件名：替换标记，扩展名改为`.png`。
    fn output_path(&self, src: &Path, dst: &Path) -> PathBuf {
        if !dst.is_dir() {
            return dst.to_path_buf();
        }
        let stem = imgio::file_stem(src).replace(self.marker.as_str(), &self.replacement);
        dst.join(format!("{stem}.png"))
    }
}

/// 重映射单个文件，返回实际写入的路径。
pub fn remap_file<P: AsRef<Path>, Q: AsRef<Path>>(
    src: P,
    dst: Q,
    cfg: &RemapConfig,
) -> Result<PathBuf> {
    let src = src.as_ref();
    let out = cfg.output_path(src, dst.as_ref());

    let mut img = imgio::decode_luma(src, &cfg.decode)?;
    let changed = pixel::remap_value(&mut img, cfg.from, cfg.to);
    imgio::save_png(&img, out.as_path())?;
    debug!(
        "`{}` -> `{}` ({changed} 个像素 {} -> {})",
        src.display(),
        out.display(),
        cfg.from,
        cfg.to
    );
    Ok(out)
}

/// 重映射目录下所有可处理的图像。单个文件读取失败时跳过并记录，不中断整批。
pub fn remap_folder<P: AsRef<Path>, Q: AsRef<Path>>(
    src_dir: P,
    dst_dir: Q,
    cfg: &RemapConfig,
) -> Result<BatchSummary> {
    let (src_dir, dst_dir) = (src_dir.as_ref(), dst_dir.as_ref());
    if !src_dir.is_dir() {
        return Err(PrepError::SourceMissing {
            path: src_dir.to_path_buf(),
        });
    }
    fs::create_dir_all(dst_dir).map_err(PrepError::io(dst_dir))?;

    let mut summary = BatchSummary::default();
    let mut written = HashSet::new();
    for path in imgio::list_files(src_dir, &cfg.extensions)? {
        info!("处理文件`{}`...", imgio::file_name(&path));
        let out = cfg.output_path(&path, dst_dir);
        // 主干名相同、扩展名不同的输入会得到同一个输出名。
        let result = if written.contains(&out) {
            Err(PrepError::DuplicateOutput { path: out })
        } else {
            remap_file(&path, &out, cfg)
        };
        if let Ok(ref out) = result {
            written.insert(out.clone());
        }
        summary.record(&path, result)?;
    }
    Ok(summary)
}
