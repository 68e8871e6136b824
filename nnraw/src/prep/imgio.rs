//! 图像读写与目录遍历。

use crate::{PrepError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::io::Reader as ImageReader;
use image::{ColorType, DynamicImage, GrayImage, ImageFormat, RgbImage};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 默认可处理的图像扩展名。
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "tif", "bmp"];

/// 解码选项。像素上限作为显式参数传入，而不是进程级设置。
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DecodeOptions {
    /// 允许解码的最大像素数（宽 * 高）。`None`表示不设上限。
    pub max_pixels: Option<u64>,
}

/// 读取并解码一张图像，格式由文件内容推断。
pub fn decode<P: AsRef<Path>>(path: P, opts: &DecodeOptions) -> Result<DynamicImage> {
    let path = path.as_ref();
    let decode_err = |source: image::ImageError| PrepError::DecodeFailed {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = ImageReader::open(path)
        .map_err(PrepError::io(path))?
        .with_guessed_format()
        .map_err(PrepError::io(path))?;

    match opts.max_pixels {
        None => reader.no_limits(),
        Some(max_pixels) => {
            let (width, height) = image::image_dimensions(path).map_err(decode_err)?;
            if width as u64 * height as u64 > max_pixels {
                return Err(PrepError::TooLarge {
                    path: path.to_path_buf(),
                    width,
                    height,
                    max_pixels,
                });
            }
        }
    }
    reader.decode().map_err(decode_err)
}

/// 读取一张图像并转为单通道灰度图。
#[inline]
pub fn decode_luma<P: AsRef<Path>>(path: P, opts: &DecodeOptions) -> Result<GrayImage> {
    decode(path, opts).map(DynamicImage::into_luma8)
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(PrepError::io(parent))
        }
        _ => Ok(()),
    }
}

/// 以 PNG 格式保存灰度图，必要时创建上级目录。
pub fn save_png<P: AsRef<Path>>(img: &GrayImage, path: P) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    img.save_with_format(path, ImageFormat::Png)
        .map_err(|source| PrepError::EncodeFailed {
            path: path.to_path_buf(),
            source,
        })
}

/// 以给定质量 (1-100) 保存 JPEG，必要时创建上级目录。
pub fn save_jpeg<P: AsRef<Path>>(img: &RgbImage, path: P, quality: u8) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let file = File::create(path).map_err(PrepError::io(path))?;
    let mut writer = BufWriter::new(file);
    JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100))
        .encode(img.as_raw(), img.width(), img.height(), ColorType::Rgb8)
        .map_err(|source| PrepError::EncodeFailed {
            path: path.to_path_buf(),
            source,
        })
}

/// 文件扩展名是否在`allow_list`中（不区分大小写，不含点号）。
pub fn has_extension<P: AsRef<Path>, S: AsRef<str>>(path: P, allow_list: &[S]) -> bool {
    match path.as_ref().extension().and_then(|s| s.to_str()) {
        Some(ext) => allow_list
            .iter()
            .any(|a| a.as_ref().trim_start_matches('.').eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// 列出目录下（不递归）扩展名符合要求的普通文件，按文件名排序。
pub fn list_files<P: AsRef<Path>, S: AsRef<str>>(
    dir: P,
    allow_list: &[S],
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| PrepError::Io {
            path: e.path().unwrap_or(dir).to_path_buf(),
            source: e.into(),
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && has_extension(path, allow_list) {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

/// 路径的文件主干名（不含扩展名）。
#[inline]
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// 路径的文件名。
#[inline]
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
