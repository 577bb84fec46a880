use crate::error::InferenceError;
use image::imageops::FilterType;
use ndarray::Array4;

pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// Decodes raw image bytes into a model-ready tensor.
///
/// The image is converted to RGB, resized to `size`x`size` without keeping the
/// aspect ratio, and scaled from [0, 255] to [0, 1].
/// Returns a channel-last tensor of shape [1, size, size, 3].
pub fn process_bytes(buffer: &[u8], size: u32) -> Result<Array4<f32>, InferenceError> {
    // 1. Decode (format guessed from the bytes)
    let img = image::load_from_memory(buffer)?;

    // 2. Resize, bicubic
    let resized = img.resize_exact(size, size, FilterType::CatmullRom);

    // 3. Scale to [0, 1]; RGB8 raw data is already [H, W, C]
    let data: Vec<f32> = resized
        .to_rgb8()
        .into_raw()
        .into_iter()
        .map(|v| v as f32 / 255.0)
        .collect();

    // 4. Add batch dimension
    let side = size as usize;
    let array = Array4::from_shape_vec((1, side, side, 3), data)?;

    Ok(array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode_png(img: &RgbImage) -> Vec<u8> {
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_process_bytes_shape() {
        let buffer = encode_png(&RgbImage::new(10, 10));

        let tensor = process_bytes(&buffer, DEFAULT_INPUT_SIZE).unwrap();
        // [batch, height, width, channels]
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
    }

    #[test]
    fn test_non_square_input_is_stretched() {
        let buffer = encode_png(&RgbImage::new(300, 40));
        let tensor = process_bytes(&buffer, DEFAULT_INPUT_SIZE).unwrap();
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
    }

    #[test]
    fn test_custom_size() {
        let buffer = encode_png(&RgbImage::new(64, 64));
        let tensor = process_bytes(&buffer, 32).unwrap();
        assert_eq!(tensor.shape(), &[1, 32, 32, 3]);
    }

    #[test]
    fn test_white_pixels_scale_to_one() {
        let buffer = encode_png(&RgbImage::from_pixel(10, 10, Rgb([255, 255, 255])));
        let tensor = process_bytes(&buffer, DEFAULT_INPUT_SIZE).unwrap();

        assert!(tensor.iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_channel_order_is_rgb_last() {
        let buffer = encode_png(&RgbImage::from_pixel(8, 8, Rgb([255, 0, 51])));
        let tensor = process_bytes(&buffer, 16).unwrap();

        assert!((tensor[[0, 5, 5, 0]] - 1.0).abs() < 1e-6);
        assert!(tensor[[0, 5, 5, 1]].abs() < 1e-6);
        assert!((tensor[[0, 5, 5, 2]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_alpha_channel_dropped() {
        let img = RgbaImage::from_pixel(12, 12, Rgba([10, 20, 30, 128]));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();

        let tensor = process_bytes(&buffer, 16).unwrap();
        assert_eq!(tensor.shape(), &[1, 16, 16, 3]);
    }

    #[test]
    fn test_values_within_unit_range() {
        let mut img = RgbImage::new(20, 20);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgb([(x * 12) as u8, (y * 12) as u8, 128]);
        }
        let tensor = process_bytes(&encode_png(&img), DEFAULT_INPUT_SIZE).unwrap();

        assert!(tensor.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_process_bytes_error_handling() {
        let result = process_bytes(b"invalid image data", DEFAULT_INPUT_SIZE);
        assert!(matches!(result, Err(InferenceError::ImageError(_))));
    }

    #[test]
    fn test_preprocessing_is_deterministic() {
        let buffer = encode_png(&RgbImage::from_pixel(30, 17, Rgb([128, 64, 32])));
        let first = process_bytes(&buffer, DEFAULT_INPUT_SIZE).unwrap();
        let second = process_bytes(&buffer, DEFAULT_INPUT_SIZE).unwrap();
        assert_eq!(first, second);
    }
}
