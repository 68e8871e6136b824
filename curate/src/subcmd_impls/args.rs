use clap::{Parser, Subcommand};
use nnraw::Result;

#[derive(Parser, Debug)]
#[command(name = "curate")]
#[command(about = "将显微图像标注数据整理为 nnU-Net raw 格式的工具集.")]
#[command(version, long_about = None)]
pub struct Cli {
    /// 子命令。
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run_program(&mut self) -> Result<()> {
        match self.command {
            Commands::Remap(ref mut v) => v.run(),
            Commands::Convert(ref mut v) => v.run(),
            Commands::Verify(ref mut v) => v.run(),
            Commands::Visualize(ref mut v) => v.run(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 将图像（或目录下所有图像）中值为1的像素提亮为255，输出PNG。
    Remap(crate::subcmd_impls::remap::Remap),
    /// 将训练图像与标注目录转换为`Dataset<ID>_<case>`格式的数据集。
    Convert(crate::subcmd_impls::convert::Convert),
    /// 校验已有数据集的图像/标签配对及标签二值性。
    Verify(crate::subcmd_impls::verify::Verify),
    /// 在原图上绘制标签外轮廓，输出JPEG用于人工检查。
    Visualize(crate::subcmd_impls::visualize::Visualize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn test_parse_convert() {
        let cli = Cli::try_parse_from([
            "curate",
            "convert",
            "in",
            "out",
            "--dataset-id",
            "12",
            "--case-name",
            "axones",
            "--skip",
            "split,metadata",
            "--label",
            "background=0",
            "--label",
            "axons=1",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Convert(_)));
    }

    #[test]
    fn test_parse_rejects_bad_stage() {
        assert!(Cli::try_parse_from([
            "curate",
            "convert",
            "in",
            "out",
            "--dataset-id",
            "1",
            "--case-name",
            "c",
            "--skip",
            "train",
        ])
        .is_err());
    }

    #[test]
    fn test_parse_visualize_color() {
        let ok = Cli::try_parse_from([
            "curate", "visualize", "-i", "a", "-m", "b", "-o", "c", "--color", "#ff0000",
        ]);
        assert!(ok.is_ok());
        let bad = Cli::try_parse_from([
            "curate", "visualize", "-i", "a", "-m", "b", "-o", "c", "--color", "red",
        ]);
        assert!(bad.is_err());
    }

    #[test]
    fn test_remap_missing_input_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let args: Vec<OsString> = vec![
            "curate".into(),
            "remap".into(),
            "-i".into(),
            missing.into_os_string(),
            "-o".into(),
            dir.path().into(),
        ];
        let mut cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(
            cli.run_program(),
            Err(nnraw::PrepError::SourceMissing { .. })
        ));
    }
}
