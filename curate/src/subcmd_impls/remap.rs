use super::utils::DecodeArgs;
use clap::Args;
use log::info;
use nnraw::prelude::{remap_file, remap_folder, RemapConfig, Result, MAX_INTENSITY, SENTINEL};
use nnraw::PrepError;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct Remap {
    /// 输入图像或目录。
    #[arg(long = "input", short)]
    input: PathBuf,
    /// 输出文件或目录。
    #[arg(long = "output", short)]
    output: PathBuf,
    /// 被替换的像素值。
    #[arg(long, default_value_t = SENTINEL)]
    from: u8,
    /// 替换后的像素值。
    #[arg(long, default_value_t = MAX_INTENSITY)]
    to: u8,
    /// 输出到目录时，文件名中被替换的标记。
    #[arg(long, default_value = "_0000")]
    marker: String,
    /// 标记的替换内容。
    #[arg(long, default_value = "_final")]
    replacement: String,
    #[command(flatten)]
    decode: DecodeArgs,
}

impl Remap {
    pub fn run(&mut self) -> Result<()> {
        let cfg = RemapConfig {
            from: self.from,
            to: self.to,
            marker: self.marker.clone(),
            replacement: self.replacement.clone(),
            decode: self.decode.options(),
            ..Default::default()
        };

        if self.input.is_file() {
            let out = remap_file(&self.input, &self.output, &cfg)?;
            info!("已保存`{}`", out.display());
        } else if self.input.is_dir() {
            remap_folder(&self.input, &self.output, &cfg)?.log("重映射");
        } else {
            return Err(PrepError::SourceMissing {
                path: self.input.clone(),
            });
        }
        Ok(())
    }
}
