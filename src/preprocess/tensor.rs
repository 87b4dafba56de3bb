use image::RgbImage;

/// Dense `[batch, height, width, channels]` array, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: [usize; 4],
    data: Vec<f64>,
}

impl Tensor {
    /// Returns `None` when `data.len()` does not match the product of `shape`.
    pub fn new(shape: [usize; 4], data: Vec<f64>) -> Option<Tensor> {
        if shape.iter().product::<usize>() != data.len() {
            return None;
        }
        Some(Tensor { shape, data })
    }

    /// Batch of one: every u8 channel divided by 255.
    pub fn from_rgb8(rgb: &RgbImage) -> Tensor {
        let data = rgb
            .pixels()
            .flat_map(|p| p.0.iter().map(|&c| c as f64 / 255.0))
            .collect();
        Tensor {
            shape: [1, rgb.height() as usize, rgb.width() as usize, 3],
            data,
        }
    }

    pub fn shape(&self) -> [usize; 4] {
        self.shape
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Value at `[b, y, x, c]`, or `None` when out of bounds.
    pub fn get(&self, b: usize, y: usize, x: usize, c: usize) -> Option<f64> {
        let [nb, h, w, ch] = self.shape;
        if b >= nb || y >= h || x >= w || c >= ch {
            return None;
        }
        self.data.get(((b * h + y) * w + x) * ch + c).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgb8_scales_to_unit_range() {
        let rgb = RgbImage::from_pixel(2, 1, image::Rgb([0, 51, 255]));
        let t = Tensor::from_rgb8(&rgb);
        assert_eq!(t.shape(), [1, 1, 2, 3]);
        assert_eq!(t.data(), &[0.0, 0.2, 1.0, 0.0, 0.2, 1.0]);
    }

    #[test]
    fn rejects_mismatched_length() {
        assert!(Tensor::new([1, 2, 2, 3], vec![0.0; 11]).is_none());
    }

    #[test]
    fn indexes_row_major_nhwc() {
        let data: Vec<f64> = (0..12).map(|v| v as f64).collect();
        let t = Tensor::new([1, 2, 2, 3], data).unwrap();
        assert_eq!(t.get(0, 0, 0, 0), Some(0.0));
        assert_eq!(t.get(0, 0, 1, 2), Some(5.0));
        assert_eq!(t.get(0, 1, 0, 1), Some(7.0));
        assert_eq!(t.get(0, 2, 0, 0), None);
    }
}
