/// Image normalization for classifier input.
///
/// Decodes image bytes (PNG/JPEG/BMP/GIF), forces three RGB channels, stretches
/// to the model's input size and scales every channel to [0, 1].  The
/// sequence mirrors the preprocessing used when the model was trained, so it
/// must not be "improved" independently (no aspect-ratio padding, no mean/std
/// normalization).

use image::imageops::{self, FilterType};

use crate::error::DecodeError;
use crate::preprocess::tensor::Tensor;

/// (width, height) of the reference mushroom model.
pub const DEFAULT_TARGET_SIZE: (u32, u32) = (224, 224);

/// Bicubic (a = -0.5), the default resampling filter of the training pipeline.
const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

/// Decodes `bytes`, converts to RGB, resizes to `target_size` (width, height)
/// and returns a `[1, height, width, 3]` tensor with values in [0, 1].
pub fn normalize(bytes: &[u8], target_size: (u32, u32)) -> Result<Tensor, DecodeError> {
    let (width, height) = target_size;
    let img = image::load_from_memory(bytes)?;
    // 8-bit RGB before resampling, as in training.
    let rgb = imageops::resize(&img.to_rgb8(), width, height, RESIZE_FILTER);
    Ok(Tensor::from_rgb8(&rgb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, ImageBuffer, ImageOutputFormat, Luma, Rgb, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode_png(img: DynamicImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageOutputFormat::Png).unwrap();
        buf.into_inner()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1.0 / 255.0 + 1e-9
    }

    #[test]
    fn produces_batch_of_one_rgb_tensor() {
        let img = RgbaImage::from_fn(31, 17, |x, y| Rgba([(x * 8) as u8, (y * 15) as u8, 77, 255]));
        let tensor = normalize(&encode_png(DynamicImage::ImageRgba8(img)), (224, 224)).unwrap();

        assert_eq!(tensor.shape(), [1, 224, 224, 3]);
        assert!(tensor.data().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn stretches_without_preserving_aspect_ratio() {
        let img = RgbaImage::from_pixel(40, 10, Rgba([0, 0, 0, 255]));
        let tensor = normalize(&encode_png(DynamicImage::ImageRgba8(img)), (5, 4)).unwrap();
        assert_eq!(tensor.shape(), [1, 4, 5, 3]);
    }

    #[test]
    fn drops_alpha_channel() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 0]));
        let tensor = normalize(&encode_png(DynamicImage::ImageRgba8(img)), (4, 4)).unwrap();

        assert!(close(tensor.get(0, 2, 2, 0).unwrap(), 10.0 / 255.0));
        assert!(close(tensor.get(0, 2, 2, 1).unwrap(), 20.0 / 255.0));
        assert!(close(tensor.get(0, 2, 2, 2).unwrap(), 30.0 / 255.0));
    }

    #[test]
    fn synthesizes_rgb_from_grayscale() {
        let img = GrayImage::from_pixel(6, 6, Luma([255]));
        let tensor = normalize(&encode_png(DynamicImage::ImageLuma8(img)), (3, 3)).unwrap();

        assert_eq!(tensor.shape(), [1, 3, 3, 3]);
        for c in 0..3 {
            assert!(close(tensor.get(0, 1, 1, c).unwrap(), 1.0));
        }
    }

    #[test]
    fn sixteen_bit_images_are_converted_before_resizing() {
        let img: ImageBuffer<Rgb<u16>, Vec<u16>> = ImageBuffer::from_fn(7, 5, |x, y| {
            Rgb([(x * 9000 + y * 311) as u16, (y * 13000 + 77) as u16, ((x * y) * 2500 + 129) as u16])
        });
        let img = DynamicImage::ImageRgb16(img);
        let tensor = normalize(&encode_png(img.clone()), (3, 3)).unwrap();

        let expected = Tensor::from_rgb8(&imageops::resize(&img.to_rgb8(), 3, 3, RESIZE_FILTER));
        assert_eq!(tensor, expected);
    }

    #[test]
    fn corrupted_bytes_are_a_decode_error() {
        let mut bytes = encode_png(DynamicImage::ImageRgba8(RgbaImage::new(4, 4)));
        bytes.truncate(20);
        assert!(normalize(&bytes, DEFAULT_TARGET_SIZE).is_err());
        assert!(normalize(b"definitely not an image", DEFAULT_TARGET_SIZE).is_err());
    }
}
