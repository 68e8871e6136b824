use super::utils::{self, DecodeArgs};
use clap::{Args, ValueEnum};
use log::{info, warn};
use nnraw::prelude::{convert, ConvertConfig, Result, Stage, Stages};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct Convert {
    /// 数据根目录，包含训练图像与标注两个子目录。
    input_folder: PathBuf,
    /// 输出根目录，数据集目录`Dataset<ID>_<case>`将建立在其中。
    output_folder: PathBuf,
    /// 数据集编号。
    #[arg(long = "dataset-id", short = 'd')]
    dataset_id: u16,
    /// 训练样本名，用于数据集目录名与文件名。
    #[arg(long = "case-name", short = 'n')]
    case_name: String,
    /// 写入`numTraining`的样本数（默认使用划分后的实际数量）。
    #[arg(long = "num-training")]
    num_training: Option<usize>,
    /// 移入测试集的样本数。
    #[arg(long = "num-test", default_value_t = 1)]
    num_test: usize,
    /// 输出文件扩展名。
    #[arg(long = "file-ending", default_value = ".png", value_parser = utils::file_ending)]
    file_ending: String,
    /// 写入`overwrite_image_reader_writer`的读写器名。
    #[arg(long = "reader-writer")]
    reader_writer: Option<String>,
    /// 训练图像子目录名。
    #[arg(long = "images-subdir", default_value = "Images_entrainement")]
    images_subdir: String,
    /// 标注子目录名。
    #[arg(long = "labels-subdir", default_value = "Images_annotees")]
    labels_subdir: String,
    /// 标注文件主干名相对图像的后缀。
    #[arg(long = "label-suffix", default_value = "_annotee")]
    label_suffix: String,
    /// 通道映射，如`0=L`（可重复，默认`0=L`）。
    #[arg(long = "channel", value_parser = utils::name_pair)]
    channels: Vec<(String, String)>,
    /// 标签映射，如`axons=1`（可重复，默认`background=0 axons=1`）。
    #[arg(long = "label", value_parser = utils::label_pair)]
    labels: Vec<(String, u32)>,
    /// 跳过的阶段，逗号分隔。
    #[arg(long, value_enum, value_delimiter = ',')]
    skip: Vec<StageArg>,
    #[command(flatten)]
    decode: DecodeArgs,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
/// 可跳过的流水线阶段。
enum StageArg {
    /// 转换为单通道PNG。
    Convert,
    /// 标签二值化。
    Binarize,
    /// 标签二值性校验。
    Verify,
    /// 按位置重命名。
    Rename,
    /// 划分测试集。
    Split,
    /// 写入`dataset.json`。
    Metadata,
}

impl From<StageArg> for Stage {
    fn from(s: StageArg) -> Self {
        match s {
            StageArg::Convert => Stage::Convert,
            StageArg::Binarize => Stage::Binarize,
            StageArg::Verify => Stage::Verify,
            StageArg::Rename => Stage::Rename,
            StageArg::Split => Stage::Split,
            StageArg::Metadata => Stage::Metadata,
        }
    }
}

impl Convert {
    fn config(&self) -> ConvertConfig {
        let mut cfg = ConvertConfig {
            dataset_id: self.dataset_id,
            case_name: self.case_name.clone(),
            images_subdir: self.images_subdir.clone(),
            labels_subdir: self.labels_subdir.clone(),
            label_suffix: self.label_suffix.clone(),
            file_ending: self.file_ending.clone(),
            num_training: self.num_training,
            num_test: self.num_test,
            reader_writer: self.reader_writer.clone(),
            stages: Stages::default().without(self.skip.iter().map(|&s| Stage::from(s))),
            decode: self.decode.options(),
            ..Default::default()
        };
        if !self.channels.is_empty() {
            cfg.channel_names = self.channels.clone();
        }
        if !self.labels.is_empty() {
            cfg.labels = self.labels.clone();
        }
        cfg
    }

    pub fn run(&mut self) -> Result<()> {
        // [input/{Images_entrainement, Images_annotees}] -> [output/Dataset<ID>_<case>]
        let cfg = self.config();
        let report = convert(&self.input_folder, &self.output_folder, &cfg)?;

        info!("数据集已生成: `{}`", report.layout.root.display());
        info!(
            "\t训练 {} 对, 测试 {} 张",
            report.training.len(),
            report.test.len()
        );
        for (path, e) in report.skipped.iter() {
            warn!("\t已跳过`{}`: {e}", path.display());
        }
        if let Some(v) = report.verification {
            for violation in v.violations.iter() {
                warn!(
                    "\t`{}`的像素值集合: {:?}",
                    violation.file.display(),
                    violation.values
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cli;
    use clap::Parser;
    use image::{GrayImage, Luma};
    use std::ffi::OsString;
    use std::fs;

    #[test]
    fn test_convert_config_from_args() {
        let cmd = Convert {
            input_folder: "in".into(),
            output_folder: "out".into(),
            dataset_id: 4,
            case_name: "myelin".into(),
            num_training: Some(9),
            num_test: 2,
            file_ending: ".png".into(),
            reader_writer: Some("NaturalImage2DIO".into()),
            images_subdir: "imgs".into(),
            labels_subdir: "lbls".into(),
            label_suffix: "_mask".into(),
            channels: vec![],
            labels: vec![("background".into(), 0), ("myelin".into(), 2)],
            skip: vec![StageArg::Verify, StageArg::Split],
            decode: DecodeArgs { max_pixels: None },
        };
        let cfg = cmd.config();
        assert_eq!(cfg.channel_names, vec![("0".to_string(), "L".to_string())]);
        assert_eq!(cfg.labels[1], ("myelin".to_string(), 2));
        assert!(!cfg.stages.is_enabled(Stage::Verify));
        assert!(!cfg.stages.is_enabled(Stage::Split));
        assert!(cfg.stages.is_enabled(Stage::Rename));
        assert_eq!(cfg.num_test, 2);
    }

    #[test]
    fn test_convert_command_end_to_end() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let images = input.path().join("Images_entrainement");
        let labels = input.path().join("Images_annotees");
        fs::create_dir(&images).unwrap();
        fs::create_dir(&labels).unwrap();
        for key in ["a", "b", "c"] {
            GrayImage::from_pixel(4, 4, Luma([90]))
                .save(images.join(format!("{key}.tif")))
                .unwrap();
            GrayImage::from_pixel(4, 4, Luma([255]))
                .save(labels.join(format!("{key}_annotee.png")))
                .unwrap();
        }

        let args: Vec<OsString> = vec![
            "curate".into(),
            "convert".into(),
            input.path().into(),
            output.path().into(),
            "--dataset-id".into(),
            "2".into(),
            "--case-name".into(),
            "axones".into(),
            "--num-training".into(),
            "3".into(),
        ];
        Cli::try_parse_from(args).unwrap().run_program().unwrap();

        let root = output.path().join("Dataset002_axones");
        assert_eq!(fs::read_dir(root.join("imagesTr")).unwrap().count(), 2);
        assert_eq!(fs::read_dir(root.join("labelsTr")).unwrap().count(), 2);
        assert!(root.join("imagesTs/axones_001_0000.png").is_file());
        let meta = json::parse(&fs::read_to_string(root.join("dataset.json")).unwrap()).unwrap();
        assert_eq!(meta["numTraining"], 3);
    }
}
