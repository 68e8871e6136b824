use super::utils::DecodeArgs;
use clap::Args;
use image::Rgb;
use nnraw::prelude::{overlay_folder, OverlayConfig, Result};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct Visualize {
    /// 原图目录。
    #[arg(long = "images", short)]
    images: PathBuf,
    /// 标签目录。
    #[arg(long = "masks", short)]
    masks: PathBuf,
    /// 输出目录。
    #[arg(long = "output-dir", short)]
    out_dir: PathBuf,
    /// 处理的原图扩展名。
    #[arg(long = "image-ext", default_value = "tif")]
    image_ext: String,
    /// 由原图主干名得到标签文件名的后缀。
    #[arg(long = "mask-suffix", default_value = "_annotee.png")]
    mask_suffix: String,
    /// 轮廓颜色（十六进制RGB，默认黑色）。
    #[arg(long, short, value_parser = super::utils::color_valid_rgb_hex)]
    color: Option<Rgb<u8>>,
    /// 轮廓线宽。
    #[arg(long, default_value_t = 10)]
    thickness: u32,
    /// JPEG质量 (1-100)。
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,
    #[command(flatten)]
    decode: DecodeArgs,
}

impl Visualize {
    pub fn run(&mut self) -> Result<()> {
        let mut cfg = OverlayConfig {
            image_ext: self.image_ext.trim_start_matches('.').to_string(),
            mask_suffix: self.mask_suffix.clone(),
            thickness: self.thickness,
            quality: self.quality,
            decode: self.decode.options(),
            ..Default::default()
        };
        if let Some(color) = self.color {
            cfg.color = color;
        }
        overlay_folder(&self.images, &self.masks, &self.out_dir, &cfg)?.log("轮廓叠加");
        Ok(())
    }
}
