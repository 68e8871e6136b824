use clap::Args;
use image::Rgb;
use nnraw::prelude::DecodeOptions;

pub fn color_valid_rgb_hex(s: &str) -> Result<Rgb<u8>, &'static str> {
    const ERR: &str = "十六进制RGB颜色格式错误";
    fn ck(s: &str) -> Option<Rgb<u8>> {
        let r = u8::from_str_radix(s.get(0..=1)?, 16).ok()?;
        let g = u8::from_str_radix(s.get(2..=3)?, 16).ok()?;
        let b = u8::from_str_radix(s.get(4..=5)?, 16).ok()?;
        Some(Rgb::from([r, g, b]))
    }
    match s.len() {
        6 => ck(s).ok_or(ERR),
        7 if s.as_bytes()[0] == b'#' => ck(&s[1..]).ok_or(ERR),
        _ => Err(ERR),
    }
}

/// 解析`键=字符串`，如通道映射`0=L`。
pub fn name_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.is_empty() && !v.is_empty() => Ok((k.to_string(), v.to_string())),
        _ => Err(format!("`{s}`应为`key=value`格式")),
    }
}

/// 解析`类别名=像素值`，如`axons=1`。
pub fn label_pair(s: &str) -> Result<(String, u32), String> {
    let (name, value) = name_pair(s)?;
    let value = value
        .parse()
        .map_err(|_| format!("`{value}`不是合法的标签值"))?;
    Ok((name, value))
}

/// 扩展名统一为带点号的形式。
pub fn file_ending(s: &str) -> Result<String, String> {
    let ext = s.trim_start_matches('.');
    if ext.is_empty() || ext.contains(['/', '\\']) {
        return Err(format!("`{s}`不是合法的扩展名"));
    }
    Ok(format!(".{ext}"))
}

/// 图像解码相关参数。
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// 允许解码的最大像素数（宽*高），默认不限制。
    #[arg(long = "max-pixels")]
    pub(crate) max_pixels: Option<u64>,
}

impl DecodeArgs {
    #[inline]
    pub fn options(&self) -> DecodeOptions {
        DecodeOptions {
            max_pixels: self.max_pixels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex() {
        assert_eq!(color_valid_rgb_hex("00ff7f"), Ok(Rgb([0, 255, 127])));
        assert_eq!(color_valid_rgb_hex("#000000"), Ok(Rgb([0, 0, 0])));
        assert!(color_valid_rgb_hex("#00ff7").is_err());
        assert!(color_valid_rgb_hex("zzzzzz").is_err());
        assert!(color_valid_rgb_hex("中文").is_err());
    }

    #[test]
    fn test_pairs() {
        assert_eq!(name_pair("0=L"), Ok(("0".to_string(), "L".to_string())));
        assert_eq!(label_pair("axons=1"), Ok(("axons".to_string(), 1)));
        assert!(label_pair("axons=one").is_err());
        assert!(name_pair("=L").is_err());
        assert!(name_pair("L").is_err());
    }

    #[test]
    fn test_file_ending() {
        assert_eq!(file_ending("png"), Ok(".png".to_string()));
        assert_eq!(file_ending(".tif"), Ok(".tif".to_string()));
        assert!(file_ending(".").is_err());
    }
}
