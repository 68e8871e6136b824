//! nnU-Net raw 格式显微图像数据集的准备工具库。
//!
//! 提供像素值重映射、标签二值化与校验、数据集目录转换流水线以及轮廓叠加可视化。
//! 所有操作都是单线程、同步地对目录逐文件处理。

pub mod dataset;
mod error;
pub mod overlay;
pub mod prelude;
pub mod prep;
pub mod remap;
pub mod verify;

pub use error::{BatchSummary, PrepError, Result};
