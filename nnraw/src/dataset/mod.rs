//! nnU-Net raw 格式数据集转换。

pub mod layout;
pub mod metadata;
pub mod pairing;
pub mod pipeline;
pub mod plan;

pub use layout::DatasetLayout;
pub use metadata::DatasetMetadata;
pub use pairing::Sample;
pub use pipeline::{convert, ConvertConfig, ConvertReport, Stage, Stages};
pub use plan::RenamePlan;

/// 训练图像文件名中的通道后缀。
pub const CHANNEL_SUFFIX: &str = "_0000";
