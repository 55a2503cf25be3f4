pub mod border;
pub mod circle;
pub mod color;
pub mod tone;

pub use border::scale_and_border;
pub use circle::clip_to_circle;
pub use color::parse_hex_color;
pub use tone::average_tone;

use image::{GenericImageView, Rgba, RgbaImage};
use num_traits::{Bounded, NumCast};
use std::any::TypeId;

use crate::errors::Result;

pub const DEFAULT_SCALE: f32 = 300.0;
pub const DEFAULT_BORDER_WIDTH: f32 = 10.0;
pub const DEFAULT_BRIGHTNESS: i32 = 100;
pub const DEFAULT_CONTRAST: f32 = 10.0;

pub fn is_floating_point<T: 'static>() -> bool {
    TypeId::of::<T>() == TypeId::of::<f32>()
}

pub fn get_max_value<T: Bounded + NumCast + 'static>() -> T {
    if is_floating_point::<T>() {
        T::from(1.0).unwrap()
    } else {
        T::max_value()
    }
}

/// Anti-aliased coverage of a pixel whose center lies `distance` away from an
/// edge at `radius`, counting the inside of the edge as covered.
pub(crate) fn edge_coverage(radius: f32, distance: f32) -> f32 {
    (radius - distance + 0.5).clamp(0.0, 1.0)
}

/// Parameters for one token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenParams {
    /// Side length of the square output.
    pub scale: f32,
    /// Ring stroke width.
    pub border_width: f32,
    /// Ring color; `None` derives it from the source's average tone.
    pub border_color: Option<Rgba<u8>>,
    pub brightness: i32,
    pub contrast: f32,
}

impl Default for TokenParams {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            border_width: DEFAULT_BORDER_WIDTH,
            border_color: None,
            brightness: DEFAULT_BRIGHTNESS,
            contrast: DEFAULT_CONTRAST,
        }
    }
}

/// Runs the whole transform: circle clip, optional tint from the untouched
/// source, resample, ring.
pub fn make_token<I>(source: &I, params: &TokenParams) -> Result<RgbaImage>
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    let clipped = clip_to_circle(source);
    let color = match params.border_color {
        Some(color) => color,
        None => average_tone(source, params.brightness, params.contrast)?,
    };
    scale_and_border(&clipped, params.scale, params.border_width, color)
}
