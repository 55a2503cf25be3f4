use image::Rgba;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Parses `#RRGGBB` (the `#` is optional) into an opaque color.
///
/// Anything other than exactly six hex digits yields opaque black.
pub fn parse_hex_color(hex: &str) -> Rgba<u8> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return BLACK;
    }

    let component = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).unwrap_or(0);
    Rgba([component(0), component(2), component(4), 255])
}
