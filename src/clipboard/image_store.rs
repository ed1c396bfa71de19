//! 图片落盘与读取
//!
//! 捕获时把 RGBA 像素保存为 `img_<时间戳>.png`，路径即图片引用；
//! 写回时接受文件路径或 `data:image/...;base64,` URL，统一解码为 RGBA。

use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use chrono::Local;
use image::ImageFormat;

use crate::error::AppError;
use crate::models::CapturedImage;

use super::binding::RgbaImage;

const PNG_FORMAT: &str = "png";

/// 保存 RGBA 像素为 PNG，返回图片引用
pub fn save_rgba_png(
    dir: &Path,
    width: u32,
    height: u32,
    bytes: Vec<u8>,
) -> Result<CapturedImage, AppError> {
    let image = image::RgbaImage::from_raw(width, height, bytes)
        .ok_or_else(|| AppError::Image("创建图像缓冲区失败".to_string()))?;

    let timestamp = Local::now().format("%Y%m%d%H%M%S%f");
    let file_path = dir.join(format!("img_{}.png", timestamp));

    image
        .save_with_format(&file_path, ImageFormat::Png)
        .map_err(|e| AppError::Image(format!("保存图片失败: {}", e)))?;

    log::debug!("🖼️ 已保存剪贴板图片 {}x{} -> {}", width, height, file_path.display());

    Ok(CapturedImage {
        reference: file_path.to_string_lossy().to_string(),
        width,
        height,
        format: PNG_FORMAT.to_string(),
    })
}

fn decode_data_url(reference: &str) -> Result<Vec<u8>, AppError> {
    let start = reference
        .find(";base64,")
        .ok_or_else(|| AppError::Image("缺少 base64 标记".to_string()))?;
    general_purpose::STANDARD
        .decode(&reference[start + 8..])
        .map_err(|e| AppError::Image(format!("Base64 解码失败: {}", e)))
}

/// 读取图片引用并解码为 RGBA
pub fn load_image_reference(reference: &str) -> Result<RgbaImage, AppError> {
    let reference = reference.trim();
    let decoded = if reference.starts_with("data:image/") {
        let bytes = decode_data_url(reference)?;
        image::load_from_memory(&bytes)
    } else {
        image::open(reference)
    }
    .map_err(|e| AppError::Image(format!("打开图片失败: {}", e)))?;

    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(RgbaImage {
        width,
        height,
        bytes: rgba.into_raw(),
    })
}
