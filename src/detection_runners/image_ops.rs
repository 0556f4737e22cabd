//! Frame preprocessing: upright rotation, stretch to the square model input,
//! NCHW normalization.

use anyhow::{bail, Result};
use fast_image_resize::{
    images::Image as FirImage,
    pixels::PixelType,
    FilterType, ResizeAlg, ResizeOptions, Resizer,
};
use image::imageops::{self, FilterType as ImageFilter};
use image::{DynamicImage, RgbImage};
use ndarray::Array4;

/// Rotates clockwise by a multiple of 90 degrees. Other angles are ignored.
pub fn rotate_upright(image: &DynamicImage, rotation_degrees: u32) -> DynamicImage {
    match rotation_degrees % 360 {
        90 => image.rotate90(),
        180 => image.rotate180(),
        270 => image.rotate270(),
        0 => image.clone(),
        other => {
            log::warn!("Unsupported rotation {} deg, using frame as is", other);
            image.clone()
        }
    }
}

pub fn to_fir_image<'a>(image: RgbImage) -> Result<FirImage<'a>> {
    let (width, height) = image.dimensions();
    Ok(FirImage::from_vec_u8(width, height, image.into_raw(), PixelType::U8x3)?)
}

/// Stretches (no letterbox) to `size x size`, so the two axes scale independently.
pub fn stretch_resize(image: RgbImage, size: u32) -> RgbImage {
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));
    let fallback = image.clone();

    let resized = to_fir_image(image).and_then(|src| {
        let mut dst = FirImage::new(size, size, PixelType::U8x3);
        Resizer::new().resize(&src, &mut dst, &options)?;
        RgbImage::from_raw(size, size, dst.into_vec())
            .ok_or_else(|| anyhow::anyhow!("Resized buffer does not match {size}x{size}"))
    });

    match resized {
        Ok(img) => img,
        Err(err) => {
            log::warn!("Failed to use `fast_image_resize`: {err}. Falling back.");
            imageops::resize(&fallback, size, size, ImageFilter::Triangle)
        }
    }
}

/// HWC u8 → `[1, 3, h, w]` f32 in `[0, 1]`.
pub fn nchw_normalize(image: &RgbImage) -> Result<Array4<f32>> {
    let buf = image.as_raw();
    let w = image.width() as usize;
    let h = image.height() as usize;

    if buf.len() != w * h * 3 {
        bail!("Unexpected buffer size: got {}, expected {}", buf.len(), w * h * 3);
    }

    let hw = w * h;
    let mut out = vec![0.0f32; buf.len()];
    for i in 0..hw {
        out[i] = buf[3 * i] as f32 / 255.0;
        out[i + hw] = buf[3 * i + 1] as f32 / 255.0;
        out[i + 2 * hw] = buf[3 * i + 2] as f32 / 255.0;
    }

    Ok(Array4::from_shape_vec((1, 3, h, w), out)?)
}

/// Full preprocessing for one frame. Returns the input tensor and the upright
/// frame dimensions.
pub fn preprocess_frame(image: &DynamicImage, rotation_degrees: u32, input_size: u32) -> Result<(Array4<f32>, u32, u32)> {
    let upright = rotate_upright(image, rotation_degrees);
    let (width, height) = (upright.width(), upright.height());
    if width == 0 || height == 0 {
        bail!("Empty frame {}x{}", width, height);
    }
    let resized = stretch_resize(upright.to_rgb8(), input_size);
    Ok((nchw_normalize(&resized)?, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn rotation_swaps_axes() {
        let img = DynamicImage::new_rgb8(40, 20);
        let r = rotate_upright(&img, 90);
        assert_eq!((r.width(), r.height()), (20, 40));
        let r = rotate_upright(&img, 45);
        assert_eq!((r.width(), r.height()), (40, 20));
    }

    #[test]
    fn preprocess_produces_square_nchw() {
        let mut img = RgbImage::new(64, 32);
        for p in img.pixels_mut() {
            *p = Rgb([255, 0, 51]);
        }
        let (x, w, h) = preprocess_frame(&DynamicImage::from(img), 0, 16).unwrap();
        assert_eq!((w, h), (64, 32));
        assert_eq!(x.shape(), &[1, 3, 16, 16]);
        assert!((x[[0, 0, 8, 8]] - 1.0).abs() < 0.01);
        assert!(x[[0, 1, 8, 8]].abs() < 0.01);
        assert!((x[[0, 2, 8, 8]] - 0.2).abs() < 0.01);
    }

    #[test]
    fn empty_frame_is_an_error() {
        assert!(preprocess_frame(&DynamicImage::new_rgb8(0, 0), 0, 16).is_err());
    }
}
