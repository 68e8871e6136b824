//! `curate`命令行工具：显微图像数据集的重映射、转换、校验与可视化。

mod subcmd_impls;

pub use subcmd_impls::args::Cli;
