//! 在原图上叠加标签外轮廓，输出低质量 JPEG 供人工检查。

use crate::prep::imgio::{self, file_name, file_stem, DecodeOptions};
use crate::{BatchSummary, PrepError, Result};
use image::{Rgb, RgbImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::drawing::draw_filled_circle_mut;
use log::info;
use std::fs;
use std::path::Path;

/// 叠加参数。
#[derive(Clone, Debug)]
pub struct OverlayConfig {
    /// 处理的原图扩展名（不含点号）。
    pub image_ext: String,
    /// 由原图主干名得到标签文件名时追加的后缀。
    pub mask_suffix: String,
    /// 由原图主干名得到输出文件名时追加的后缀。
    pub output_suffix: String,
    pub color: Rgb<u8>,
    /// 轮廓线宽（像素）。
    pub thickness: u32,
    /// JPEG 质量 (1-100)。
    pub quality: u8,
    pub decode: DecodeOptions,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            image_ext: "tif".to_string(),
            mask_suffix: "_annotee.png".to_string(),
            output_suffix: "_contours.jpeg".to_string(),
            color: Rgb([0, 0, 0]),
            thickness: 10,
            quality: 10,
            decode: DecodeOptions::default(),
        }
    }
}

impl OverlayConfig {
    #[inline]
    pub fn mask_name(&self, image: &Path) -> String {
        format!("{}{}", file_stem(image), self.mask_suffix)
    }

    #[inline]
    pub fn output_name(&self, image: &Path) -> String {
        format!("{}{}", file_stem(image), self.output_suffix)
    }
}

/// 标签中非零区域的最外层轮廓（不含孔洞及孔洞内的轮廓）。
pub fn external_contours(mask: &image::GrayImage) -> Vec<Contour<i32>> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .collect()
}

/// 以直径`thickness`的实心圆沿轮廓点描边。
pub fn draw_contours(
    canvas: &mut RgbImage,
    contours: &[Contour<i32>],
    color: Rgb<u8>,
    thickness: u32,
) {
    let radius = (thickness / 2) as i32;
    let (width, height) = canvas.dimensions();
    for p in contours.iter().flat_map(|c| c.points.iter()) {
        if radius > 0 {
            draw_filled_circle_mut(canvas, (p.x, p.y), radius, color);
        } else if let (Ok(x), Ok(y)) = (u32::try_from(p.x), u32::try_from(p.y)) {
            if x < width && y < height {
                canvas.put_pixel(x, y, color);
            }
        }
    }
}

/// 为一对原图与标签生成叠加图，返回外轮廓个数。
pub fn overlay_file<P, Q, R>(image: P, mask: Q, out: R, cfg: &OverlayConfig) -> Result<usize>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    let mut canvas = imgio::decode(image, &cfg.decode)?.into_rgb8();
    let mask = imgio::decode_luma(mask, &cfg.decode)?;
    let contours = external_contours(&mask);
    draw_contours(&mut canvas, &contours, cfg.color, cfg.thickness);
    imgio::save_jpeg(&canvas, out, cfg.quality)?;
    Ok(contours.len())
}

/// 处理目录下所有原图。缺失或无法读取的图像/标签被跳过，整批继续。
pub fn overlay_folder<P, Q, R>(
    images_dir: P,
    masks_dir: Q,
    out_dir: R,
    cfg: &OverlayConfig,
) -> Result<BatchSummary>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    let images_dir = images_dir.as_ref();
    let masks_dir = masks_dir.as_ref();
    let out_dir = out_dir.as_ref();
    for dir in [images_dir, masks_dir] {
        if !dir.is_dir() {
            return Err(PrepError::SourceMissing {
                path: dir.to_path_buf(),
            });
        }
    }
    fs::create_dir_all(out_dir).map_err(PrepError::io(out_dir))?;

    let mut summary = BatchSummary::default();
    for image in imgio::list_files(images_dir, &[cfg.image_ext.as_str()])? {
        let mask = masks_dir.join(cfg.mask_name(&image));
        if !mask.is_file() {
            summary.record(&image, Err(PrepError::PairMissing { path: mask }))?;
            continue;
        }
        let out = out_dir.join(cfg.output_name(&image));
        let result = overlay_file(&image, &mask, &out, cfg).map(|n| {
            info!("`{}`: {n} 个轮廓 -> `{}`", file_name(&image), file_name(&out));
            out.clone()
        });
        summary.record(&image, result)?;
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn square_mask(w: u32, h: u32, squares: &[(u32, u32, u32, u8)]) -> GrayImage {
        let mut mask = GrayImage::new(w, h);
        for &(x0, y0, side, v) in squares {
            for y in y0..y0 + side {
                for x in x0..x0 + side {
                    mask.put_pixel(x, y, Luma([v]));
                }
            }
        }
        mask
    }

    #[test]
    fn test_external_contours_ignore_nested() {
        // 带孔的方块，孔中再有一个小方块；另有一个独立方块。
        let mask = square_mask(
            60,
            40,
            &[(5, 5, 20, 255), (10, 10, 10, 0), (13, 13, 4, 255), (40, 10, 8, 1)],
        );
        let contours = external_contours(&mask);
        assert_eq!(contours.len(), 2);
        assert!(contours.iter().all(|c| c.border_type == BorderType::Outer));
        assert_eq!(find_contours::<i32>(&mask).len(), 4);
    }

    #[test]
    fn test_external_contours_empty_mask() {
        assert!(external_contours(&GrayImage::new(10, 10)).is_empty());
    }

    #[test]
    fn test_draw_thin_contour() {
        let mask = square_mask(10, 10, &[(2, 2, 5, 255)]);
        let mut canvas = RgbImage::from_pixel(10, 10, Rgb([200, 200, 200]));
        draw_contours(&mut canvas, &external_contours(&mask), Rgb([255, 0, 0]), 1);
        assert_eq!(*canvas.get_pixel(2, 2), Rgb([255, 0, 0]));
        assert_eq!(*canvas.get_pixel(4, 4), Rgb([200, 200, 200]));
        assert_eq!(*canvas.get_pixel(0, 0), Rgb([200, 200, 200]));
    }

    #[test]
    fn test_overlay_folder_square() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("img");
        let masks = dir.path().join("mask");
        let out = dir.path().join("out");
        fs::create_dir(&images).unwrap();
        fs::create_dir(&masks).unwrap();

        let source = GrayImage::from_pixel(100, 100, Luma([128]));
        source.save(images.join("s.tif")).unwrap();
        square_mask(100, 100, &[(40, 40, 20, 255)])
            .save(masks.join("s_annotee.png"))
            .unwrap();
        // 没有标签的图像与损坏的图像都被跳过。
        source.save(images.join("lonely.tif")).unwrap();
        fs::write(images.join("broken.tif"), b"xx").unwrap();
        square_mask(100, 100, &[(0, 0, 5, 255)])
            .save(masks.join("broken_annotee.png"))
            .unwrap();

        let summary = overlay_folder(&images, &masks, &out, &OverlayConfig::default()).unwrap();
        assert_eq!(summary.processed, vec![out.join("s_contours.jpeg")]);
        assert_eq!(summary.skipped.len(), 2);

        let result = image::open(out.join("s_contours.jpeg")).unwrap().into_luma8();
        assert_eq!(result.dimensions(), (100, 100));
        // 方块边缘被黑色粗线覆盖，远处保持原样。
        assert!(result.get_pixel(40, 50)[0] < 80);
        assert!(result.get_pixel(50, 40)[0] < 80);
        assert!((result.get_pixel(5, 95)[0] as i32 - 128).abs() < 30);
    }
}
