//! 单通道像素值变换。

use image::GrayImage;
use std::collections::BTreeSet;

/// 像素值常量。
pub mod consts {
    /// 二值化后背景的像素值。
    pub const BACKGROUND: u8 = 0;

    /// 二值化后前景的像素值。
    pub const FOREGROUND: u8 = 1;

    /// 原始标注中需要提亮的哨兵像素值。
    pub const SENTINEL: u8 = 1;

    /// 8-bit 灰度图的最大亮度。
    pub const MAX_INTENSITY: u8 = 255;
}

use consts::*;

/// 将图像中所有值为`from`的像素替换为`to`，返回因此而被修改的像素个数。
pub fn remap_value(img: &mut GrayImage, from: u8, to: u8) -> usize {
    let mut cnt = 0;
    img.iter_mut().filter(|v| **v == from).for_each(|v| {
        cnt += 1;
        *v = to
    });
    cnt
}

/// 将标签图像二值化：最大亮度变为前景，其余变为背景。
///
/// 已经是 {0, 1} 二值的图像保持不变，因此重复调用是幂等的。
/// 返回前景像素个数。
pub fn binarize(img: &mut GrayImage) -> usize {
    if is_binary(&distinct_values(img)) {
        return img.iter().filter(|&&v| v == FOREGROUND).count();
    }
    let mut cnt = 0;
    for v in img.iter_mut() {
        *v = if *v == MAX_INTENSITY {
            cnt += 1;
            FOREGROUND
        } else {
            BACKGROUND
        };
    }
    cnt
}

/// 图像中出现过的所有像素值。
pub fn distinct_values(img: &GrayImage) -> BTreeSet<u8> {
    let mut seen = [false; 256];
    img.iter().for_each(|&v| seen[v as usize] = true);
    (0..=u8::MAX).filter(|&v| seen[v as usize]).collect()
}

/// 像素值集合是否为 {0, 1} 的子集。
#[inline]
pub fn is_binary(values: &BTreeSet<u8>) -> bool {
    values.iter().all(|&v| v == BACKGROUND || v == FOREGROUND)
}
