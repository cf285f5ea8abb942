use image::imageops::FilterType;
use image::DynamicImage;

/// バイリニアで input_size×input_size に縮小し、grid×grid のセルごとに
/// RGB平均（0〜1）を並べる。並びは 行 → 列 → チャネル
pub fn features(img: &DynamicImage, input_size: u32, grid: u32) -> Vec<f32> {
    let resized = img
        .resize_exact(input_size, input_size, FilterType::Triangle)
        .to_rgb8();
    let cell = input_size / grid;
    let pixels_per_cell = (cell * cell) as f32;

    let mut out = Vec::with_capacity((grid * grid * 3) as usize);
    for row in 0..grid {
        for col in 0..grid {
            let mut sum = [0f32; 3];
            for y in row * cell..(row + 1) * cell {
                for x in col * cell..(col + 1) * cell {
                    let p = resized.get_pixel(x, y);
                    for (c, s) in sum.iter_mut().enumerate() {
                        *s += p[c] as f32;
                    }
                }
            }
            out.extend(sum.iter().map(|s| s / pixels_per_cell / 255.0));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_uniform_image() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 30, Rgb([255, 0, 51])));
        let f = features(&img, 224, 7);
        assert_eq!(f.len(), 147);
        assert!((f[0] - 1.0).abs() < 0.01);
        assert!(f[1].abs() < 0.01);
        assert!((f[2] - 0.2).abs() < 0.01);
    }

    #[test]
    fn test_halves() {
        // 左半分が白、右半分が黒
        let img = RgbImage::from_fn(4, 4, |x, _| if x < 2 { Rgb([255, 255, 255]) } else { Rgb([0, 0, 0]) });
        let f = features(&DynamicImage::ImageRgb8(img), 4, 2);
        assert_eq!(f.len(), 12);
        assert!(f[0] > 0.9);
        assert!(f[3] < 0.1);
    }
}
