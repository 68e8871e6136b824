use std::path::{Path, PathBuf};
use thiserror::Error;

/// 数据准备过程中可能出现的错误。
#[derive(Error, Debug)]
pub enum PrepError {
    /// 源目录不存在。
    #[error("source directory `{}` does not exist", .path.display())]
    SourceMissing { path: PathBuf },

    /// 源目录中没有可处理的文件。
    #[error("source directory `{}` contains no eligible files", .path.display())]
    SourceEmpty { path: PathBuf },

    /// 图像无法读取或格式不受支持。
    #[error("cannot decode `{}`: {source}", .path.display())]
    DecodeFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// 图像无法写入。
    #[error("cannot encode `{}`: {source}", .path.display())]
    EncodeFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// 图像像素数超过解码上限。
    #[error(
        "`{}` is {width}x{height}, exceeding the limit of {max_pixels} pixels",
        .path.display()
    )]
    TooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_pixels: u64,
    },

    /// 配对文件缺失，如原图没有对应的标签。
    #[error("matching file `{}` not found", .path.display())]
    PairMissing { path: PathBuf },

    /// 批处理中多个输入映射到同一个输出文件。
    #[error("output `{}` was already written by another input", .path.display())]
    DuplicateOutput { path: PathBuf },

    /// 配置参数不合法。
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// 重命名计划中存在冲突的目标路径。
    #[error("rename target `{}` collides with another file", .target.display())]
    PlanCollision { target: PathBuf },

    /// 文件系统错误。
    #[error("I/O error on `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PrepError {
    #[inline]
    pub(crate) fn io<P: AsRef<Path>>(path: P) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        move |source| Self::Io { path, source }
    }

    /// 该错误是否只影响单个文件（批处理可以跳过并继续）。
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Self::DecodeFailed { .. }
                | Self::TooLarge { .. }
                | Self::PairMissing { .. }
                | Self::DuplicateOutput { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PrepError>;

/// 一次批处理的结果汇总。
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// 成功处理的输出文件。
    pub processed: Vec<PathBuf>,
    /// 被跳过的输入文件及原因。
    pub skipped: Vec<(PathBuf, PrepError)>,
}

impl BatchSummary {
    /// 记录一个单文件结果：可跳过的错误计入`skipped`，其余错误向上传递。
    pub(crate) fn record(&mut self, input: &Path, result: Result<PathBuf>) -> Result<()> {
        match result {
            Ok(out) => self.processed.push(out),
            Err(e) if e.is_per_file() => {
                log::warn!("跳过`{}`: {e}", input.display());
                self.skipped.push((input.to_path_buf(), e));
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// 以`info`级别输出汇总。
    pub fn log(&self, what: &str) {
        log::info!(
            "{what}: 成功 {} 个, 跳过 {} 个",
            self.processed.len(),
            self.skipped.len()
        );
        for (path, e) in self.skipped.iter() {
            log::info!("\t{}: {e}", path.display());
        }
    }
}
