use image::{GenericImageView, ImageBuffer, Rgba, RgbaImage};

/// Clips `image` to a circle of radius `min(W, H) / 2` centered on the canvas.
///
/// The source is drawn top-left aligned, so a non-square source is clipped
/// asymmetrically around the canvas center rather than recentered on its
/// content. Pixels whose center lies on or beyond the radius are fully
/// transparent, pixels a full pixel inside keep their color, and the last
/// pixel inside the edge is anti-aliased through alpha.
pub fn clip_to_circle<I>(image: &I) -> RgbaImage
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    let (width, height) = image.dimensions();
    let radius = width.min(height) as f32 / 2.0;
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);

    let mut canvas: RgbaImage = ImageBuffer::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    for (x, y, pixel) in canvas.enumerate_pixels_mut() {
        let distance = (x as f32 + 0.5 - cx).hypot(y as f32 + 0.5 - cy);
        let coverage = (radius - distance).clamp(0.0, 1.0);
        if coverage <= 0.0 {
            continue;
        }

        let Rgba([r, g, b, a]) = image.get_pixel(x, y);
        let alpha = (a as f32 * coverage).round() as u8;
        *pixel = Rgba([r, g, b, alpha]);
    }
    canvas
}
