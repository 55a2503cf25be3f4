use std::path::{Path, PathBuf};
use std::time::Duration;

use image::ImageFormat;
use tracing::{debug, warn};
use ureq::Agent;
use walkdir::WalkDir;

use crate::errors::{Result, TokenError};
use crate::traits::{ImageSource, SourceImage};

pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp"];

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);
const DOWNLOAD_LIMIT: u64 = 50 * 1024 * 1024;

pub fn is_supported_image_format(path: &Path) -> bool {
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        SUPPORTED_EXTENSIONS.contains(&extension.to_lowercase().as_str())
    } else {
        false
    }
}

pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Replaces every directory among `inputs` with the supported images below it.
/// Files and URLs pass through untouched so they are still reported on.
pub fn expand_inputs(inputs: &[String]) -> Vec<String> {
    let mut expanded = Vec::with_capacity(inputs.len());
    for input in inputs {
        let path = Path::new(input);
        if is_url(input) || !path.is_dir() {
            expanded.push(input.clone());
            continue;
        }

        let mut found: Vec<_> = WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| is_supported_image_format(e.path()))
            .map(|e| e.path().display().to_string())
            .collect();
        found.sort();
        if found.is_empty() {
            warn!("No supported images found in {}", path.display());
        }
        debug!("Expanded {} into {} images", path.display(), found.len());
        expanded.extend(found);
    }
    expanded
}

/// Images on the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSource;

impl ImageSource for LocalFileSource {
    fn accepts(&self, input: &str) -> bool {
        !is_url(input)
    }

    fn load(&self, input: &str) -> Result<SourceImage> {
        let path = PathBuf::from(input);
        if !path.exists() {
            return Err(TokenError::input(input, "file not found"));
        }
        if !is_supported_image_format(&path) {
            return Err(TokenError::input(input, "not an image file"));
        }

        let image = image::open(&path).map_err(|e| TokenError::ImageProcessing {
            path: input.to_string(),
            operation: "decode".to_string(),
            source: Box::new(e),
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.to_string());

        Ok(SourceImage { image, name })
    }
}

/// PNG and JPEG images fetched over http(s).
pub struct UrlSource {
    agent: Agent,
}

impl UrlSource {
    pub fn new() -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(DOWNLOAD_TIMEOUT))
            .build()
            .into();
        Self { agent }
    }
}

impl Default for UrlSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageSource for UrlSource {
    fn accepts(&self, input: &str) -> bool {
        is_url(input)
    }

    fn load(&self, input: &str) -> Result<SourceImage> {
        let name = url_file_name(input);
        let mut response = self.agent.get(input).call().map_err(|e| TokenError::Download {
            url: input.to_string(),
            source: Box::new(e),
        })?;

        let content_type = response
            .headers()
            .get(ureq::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let format = detect_download_format(content_type.as_deref(), &name).ok_or_else(|| {
            TokenError::input(
                input,
                format!(
                    "not a PNG or JPEG image (content type {})",
                    content_type.as_deref().unwrap_or("missing")
                ),
            )
        })?;

        let bytes = response
            .body_mut()
            .with_config()
            .limit(DOWNLOAD_LIMIT)
            .read_to_vec()
            .map_err(|e| TokenError::Download {
                url: input.to_string(),
                source: Box::new(e),
            })?;
        debug!("Downloaded {} bytes from {}", bytes.len(), input);

        let image = image::load_from_memory_with_format(&bytes, format).map_err(|e| {
            TokenError::ImageProcessing {
                path: input.to_string(),
                operation: "decode".to_string(),
                source: Box::new(e),
            }
        })?;

        Ok(SourceImage { image, name })
    }
}

/// Picks the decoder for a download. A declared image type must be PNG or
/// JPEG; without a usable type the URL's extension decides.
pub fn detect_download_format(content_type: Option<&str>, name: &str) -> Option<ImageFormat> {
    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase());

    match mime.as_deref() {
        Some("image/png") => Some(ImageFormat::Png),
        Some("image/jpeg") | Some("image/jpg") => Some(ImageFormat::Jpeg),
        None | Some("") | Some("application/octet-stream") => {
            match Path::new(name)
                .extension()
                .and_then(|ext| ext.to_str())
                .map(str::to_ascii_lowercase)
                .as_deref()
            {
                Some("png") => Some(ImageFormat::Png),
                Some("jpg") | Some("jpeg") => Some(ImageFormat::Jpeg),
                _ => None,
            }
        }
        Some(_) => None,
    }
}

/// Last path segment of a URL, without query or fragment.
pub fn url_file_name(url: &str) -> String {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = without_scheme
        .split(['?', '#'])
        .next()
        .unwrap_or(without_scheme);
    match path.split_once('/') {
        Some((_, path)) => path
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or("download")
            .to_string(),
        None => "download".to_string(),
    }
}
