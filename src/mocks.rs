use std::collections::HashMap;

use image::{DynamicImage, Rgba, RgbaImage};

use crate::errors::{Result, TokenError};
use crate::traits::{ImageSource, SourceImage};

/// In-memory image source for tests: inputs are keys into a fixed table.
#[derive(Debug, Clone, Default)]
pub struct MockImageSource {
    images: HashMap<String, DynamicImage>,
}

impl MockImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, input: &str, image: DynamicImage) -> Self {
        self.images.insert(input.to_string(), image);
        self
    }

    pub fn with_solid(self, input: &str, width: u32, height: u32, color: [u8; 4]) -> Self {
        let image = RgbaImage::from_pixel(width, height, Rgba(color));
        self.with_image(input, DynamicImage::ImageRgba8(image))
    }
}

impl ImageSource for MockImageSource {
    fn accepts(&self, _input: &str) -> bool {
        true
    }

    fn load(&self, input: &str) -> Result<SourceImage> {
        let image = self
            .images
            .get(input)
            .cloned()
            .ok_or_else(|| TokenError::input(input, "file not found"))?;
        Ok(SourceImage {
            image,
            name: input.to_string(),
        })
    }
}

/// Creates a mock holding one 64x64 opaque red image under `red.png`.
pub fn create_mock_source() -> MockImageSource {
    MockImageSource::new().with_solid("red.png", 64, 64, [255, 0, 0, 255])
}
