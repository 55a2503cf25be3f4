use image::{imageops, imageops::FilterType, ImageBuffer, Rgba, RgbaImage};

use crate::errors::{Result, TokenError};
use crate::tokenops::{edge_coverage, get_max_value};

type Premultiplied = ImageBuffer<Rgba<u16>, Vec<u16>>;

/// Resamples `image` to a `scale x scale` square with Lanczos-3 and strokes a
/// ring of `border_width` in `color` whose centerline sits at
/// `(scale - border_width) / 2` from the center.
pub fn scale_and_border(
    image: &RgbaImage,
    scale: f32,
    border_width: f32,
    color: Rgba<u8>,
) -> Result<RgbaImage> {
    validate_geometry(scale, border_width)?;
    if image.width() == 0 || image.height() == 0 {
        return Err(TokenError::validation("image", "has no pixels to resample"));
    }

    let side = scale as u32;
    let mut scaled = resample(image, side)?;

    let radius = (scale - border_width).min(scale - border_width) / 2.0;
    let center = scale / 2.0;
    stroke_circle(&mut scaled, (center, center), radius, border_width, color);
    Ok(scaled)
}

pub fn validate_geometry(scale: f32, border_width: f32) -> Result<()> {
    if !scale.is_finite() || scale < 1.0 {
        return Err(TokenError::validation(
            "scale",
            format!("must be a finite value of at least 1, got {scale}"),
        ));
    }
    if !border_width.is_finite() || border_width < 0.0 {
        return Err(TokenError::validation(
            "borderWidth",
            format!("must be a finite non-negative value, got {border_width}"),
        ));
    }
    if border_width >= scale {
        return Err(TokenError::validation(
            "borderWidth",
            format!("must be smaller than scale ({border_width} >= {scale})"),
        ));
    }
    Ok(())
}

/// Lanczos-3 resample through premultiplied 16-bit alpha, so the transparent
/// surroundings do not darken the circle's edge.
fn resample(image: &RgbaImage, side: u32) -> Result<RgbaImage> {
    let max = get_max_value::<u16>() as f32;

    let premultiplied: Premultiplied = ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
        let Rgba([r, g, b, a]) = *image.get_pixel(x, y);
        let alpha = a as f32 / 255.0;
        let channel = |c: u8| (c as f32 / 255.0 * alpha * max).round() as u16;
        Rgba([channel(r), channel(g), channel(b), (alpha * max).round() as u16])
    });

    let resized = imageops::resize(&premultiplied, side, side, FilterType::Lanczos3);

    let raw = resized
        .pixels()
        .flat_map(|&Rgba([r, g, b, a])| {
            if a == 0 {
                return [0, 0, 0, 0];
            }
            let alpha = a as f32;
            let channel = |c: u16| ((c as f32 / alpha).min(1.0) * 255.0).round() as u8;
            [
                channel(r),
                channel(g),
                channel(b),
                (alpha / max * 255.0).round() as u8,
            ]
        })
        .collect::<Vec<u8>>();

    ImageBuffer::from_raw(resized.width(), resized.height(), raw).ok_or(TokenError::PixelFormat {
        width: side,
        height: side,
    })
}

fn stroke_circle(
    image: &mut RgbaImage,
    (cx, cy): (f32, f32),
    radius: f32,
    line_width: f32,
    color: Rgba<u8>,
) {
    let outer = radius + line_width / 2.0;
    let inner = radius - line_width / 2.0;

    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let distance = (x as f32 + 0.5 - cx).hypot(y as f32 + 0.5 - cy);
        let coverage = edge_coverage(outer, distance) - edge_coverage(inner, distance);
        if coverage > 0.0 {
            blend_over(pixel, color, coverage);
        }
    }
}

/// Source-over on straight alpha, with the source alpha scaled by `coverage`.
fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>, coverage: f32) {
    let src_alpha = src[3] as f32 / 255.0 * coverage;
    let dst_alpha = dst[3] as f32 / 255.0;
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
    if out_alpha <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }

    let mix = |s: u8, d: u8| {
        ((s as f32 * src_alpha + d as f32 * dst_alpha * (1.0 - src_alpha)) / out_alpha)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    *dst = Rgba([
        mix(src[0], dst[0]),
        mix(src[1], dst[1]),
        mix(src[2], dst[2]),
        (out_alpha * 255.0).round() as u8,
    ]);
}
