use super::utils::DecodeArgs;
use clap::Args;
use log::{info, warn};
use nnraw::dataset::DatasetLayout;
use nnraw::prelude::{check_layout, verify_labels, Result};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct Verify {
    /// 数据集根目录（`Dataset<ID>_<case>`）。
    dataset_root: PathBuf,
    /// 图像与标签的扩展名。
    #[arg(long = "file-ending", default_value = ".png", value_parser = super::utils::file_ending)]
    file_ending: String,
    #[command(flatten)]
    decode: DecodeArgs,
}

impl Verify {
    pub fn run(&mut self) -> Result<()> {
        info!("正在目录`{}`中验证性质...", self.dataset_root.display());

        let layout = check_layout(&self.dataset_root, &self.file_ending)?;
        info!(
            "配对 {} 对, 测试图像 {} 张",
            layout.paired, layout.test_images
        );
        for p in layout.images_without_label.iter() {
            warn!("图像`{}`没有标签", p.display());
        }
        for p in layout.labels_without_image.iter() {
            warn!("标签`{}`没有图像", p.display());
        }

        let labels_tr = DatasetLayout::at(&self.dataset_root).labels_tr;
        let report = verify_labels(
            labels_tr,
            &[self.file_ending.as_str()],
            &self.decode.options(),
        )?;
        if layout.is_consistent() && report.is_clean() {
            info!("全部 {} 个标签通过校验", report.checked);
        } else {
            warn!(
                "{} 个标签不是二值图像, {} 个无法读取",
                report.violations.len(),
                report.unreadable.len()
            );
        }
        Ok(())
    }
}
