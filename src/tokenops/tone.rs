use image::{GenericImageView, Pixel, Primitive, Rgba};
use num_traits::AsPrimitive;

use crate::errors::{Result, TokenError};
use crate::tokenops::get_max_value;

/// Derives a border tint from the mean color of `image`.
///
/// Channel means are rescaled to 8-bit, shifted by `brightness`, then passed
/// through the contrast curve using the shifted value as its own reference
/// mean, which leaves the value unchanged. Alpha is ignored and the result is
/// always opaque.
pub fn average_tone<I, S>(image: &I, brightness: i32, contrast: f32) -> Result<Rgba<u8>>
where
    I: GenericImageView<Pixel = Rgba<S>>,
    Rgba<S>: Pixel<Subpixel = S>,
    S: Primitive + AsPrimitive<f64> + 'static,
{
    if !contrast.is_finite() {
        return Err(TokenError::validation(
            "contrast",
            format!("must be finite, got {contrast}"),
        ));
    }

    let (width, height) = image.dimensions();
    let count = width as u64 * height as u64;
    if count == 0 {
        return Err(TokenError::validation(
            "image",
            "has no pixels to average",
        ));
    }

    let mut sums = [0f64; 3];
    for (_, _, pixel) in image.pixels() {
        let Rgba([r, g, b, _]) = pixel;
        let channels: [f64; 3] = [r.as_(), g.as_(), b.as_()];
        for (sum, channel) in sums.iter_mut().zip(channels) {
            *sum += channel;
        }
    }

    let max: f64 = get_max_value::<S>().as_();
    let tone = sums.map(|sum| {
        let mean = (sum / count as f64 * 255.0 / max).floor() as i32;
        let value = adjust_brightness(mean, brightness);
        adjust_contrast(value, value, contrast)
    });

    Ok(Rgba([tone[0], tone[1], tone[2], 255]))
}

fn adjust_brightness(value: i32, brightness: i32) -> i32 {
    value.saturating_add(brightness).clamp(0, 255)
}

fn adjust_contrast(value: i32, mean: i32, contrast: f32) -> u8 {
    (mean as f32 + (value - mean) as f32 * contrast).clamp(0.0, 255.0) as u8
}
