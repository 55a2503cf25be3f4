use crate::errors::Result;
use image::DynamicImage;

/// A decoded image and the file name its token is named after.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub image: DynamicImage,
    pub name: String,
}

/// Anything that can turn a batch input (a path, a URL) into a decoded image.
///
/// The batch runner only sees this trait, so tests can feed it in-memory
/// images and production can mix local files with downloads.
pub trait ImageSource: Send + Sync {
    /// Whether this source is responsible for `input`.
    fn accepts(&self, input: &str) -> bool;

    /// Fetches and decodes `input`.
    fn load(&self, input: &str) -> Result<SourceImage>;
}
