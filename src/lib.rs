pub mod config;
pub mod errors;
pub mod source;
pub mod tokenops;
pub mod traits;

pub mod mocks;

mod progress_tracker;

use parking_lot::Mutex;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub use config::{Cli, Settings};
pub use errors::{Result, TokenError};
pub use source::{LocalFileSource, UrlSource};
pub use tokenops::{make_token, TokenParams};
pub use traits::*;

#[cfg(test)]
pub use mocks::*;

/// Runs the token pipeline over a batch of inputs and writes one PNG per
/// input into the configured output directory.
pub struct TokenProcessor {
    sources: Vec<Box<dyn ImageSource>>,
    settings: Settings,
    params: TokenParams,
}

impl TokenProcessor {
    /// Processor reading local files and http(s) URLs.
    pub fn new(settings: Settings) -> Self {
        Self::with_sources(
            settings,
            vec![Box::new(UrlSource::new()), Box::new(LocalFileSource)],
        )
    }

    /// Sources are tried in order; the first that accepts an input loads it.
    pub fn with_sources(settings: Settings, sources: Vec<Box<dyn ImageSource>>) -> Self {
        let params = settings.token_params();
        Self {
            sources,
            settings,
            params,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Processes every input independently. The outer error is only for an
    /// output directory that cannot be created; each item gets its own result,
    /// in input order, and a failed item never stops the others. Inputs that
    /// map to the same output file do not overwrite each other: only the first
    /// to claim the file writes it, the rest fail with `TokenError::Input`.
    pub fn process_inputs(&self, inputs: &[String]) -> Result<Vec<Result<PathBuf>>> {
        self.ensure_output_dir()?;

        let claimed = Mutex::new(HashSet::new());
        let pb = progress_tracker::batch_progress(inputs.len());
        let results = inputs
            .par_iter()
            .map(|input| {
                let result = self.process_item(input, Some(&claimed));
                pb.suspend(|| match &result {
                    Ok(path) => info!("Image processed {} -> {}", input, path.display()),
                    Err(e) => warn!("Failed to process {}: {}", input, e),
                });
                pb.inc(1);
                result
            })
            .collect::<Vec<_>>();
        pb.finish_and_clear();

        Ok(results)
    }

    /// Processes one input, creating the output directory if needed.
    pub fn process_single(&self, input: &str) -> Result<PathBuf> {
        self.ensure_output_dir()?;
        self.process_item(input, None)
    }

    fn ensure_output_dir(&self) -> Result<()> {
        let output_dir = &self.settings.output_dir;
        fs::create_dir_all(output_dir).map_err(|e| TokenError::FileSystem {
            path: output_dir.clone(),
            operation: "create output directory".to_string(),
            source: e,
        })
    }

    fn process_item(
        &self,
        input: &str,
        claimed: Option<&Mutex<HashSet<PathBuf>>>,
    ) -> Result<PathBuf> {
        let source = self
            .sources
            .iter()
            .find(|source| source.accepts(input))
            .ok_or_else(|| TokenError::input(input, "no source accepts this input"))?;
        let loaded = source.load(input)?;

        let output_file = self.output_path(&loaded.name);
        if let Some(claimed) = claimed {
            if !claimed.lock().insert(output_file.clone()) {
                return Err(TokenError::input(
                    input,
                    format!(
                        "output {} is already written by another input",
                        output_file.display()
                    ),
                ));
            }
        }

        let token = make_token(&loaded.image.to_rgba8(), &self.params).map_err(|e| match e {
            TokenError::PixelFormat { .. } => e,
            other => TokenError::ImageProcessing {
                path: input.to_string(),
                operation: "make token".to_string(),
                source: Box::new(other),
            },
        })?;

        token
            .save_with_format(&output_file, image::ImageFormat::Png)
            .map_err(|e| TokenError::ImageProcessing {
                path: output_file.display().to_string(),
                operation: "save".to_string(),
                source: Box::new(e),
            })?;

        Ok(output_file)
    }

    /// `<outputDir>/<namePrefix><stem>.png`, with `stripPrefix` removed once
    /// from the stem.
    pub fn output_path(&self, name: &str) -> PathBuf {
        let stem = Path::new(name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
        let stem = match self.settings.strip_prefix.as_deref() {
            Some(strip) if !strip.is_empty() => stem.replacen(strip, "", 1),
            _ => stem,
        };
        self.settings
            .output_dir
            .join(format!("{}{}.png", self.settings.name_prefix, stem))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;
    use tempfile::TempDir;

    fn settings_in(dir: &Path) -> Settings {
        Settings {
            output_dir: dir.join("out"),
            ..Settings::default()
        }
    }

    #[test]
    fn test_output_path_naming() {
        let settings = Settings {
            output_dir: PathBuf::from("tokens"),
            strip_prefix: Some("danimalsound_".to_string()),
            ..Settings::default()
        };
        let processor = TokenProcessor::with_sources(settings, vec![]);

        assert_eq!(
            processor.output_path("danimalsound_goblin.jpg"),
            Path::new("tokens/token_goblin.png")
        );
        assert_eq!(
            processor.output_path("orc.png"),
            Path::new("tokens/token_orc.png")
        );
    }

    #[test]
    fn test_process_single_with_mock() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let settings = Settings {
            scale: 48.0,
            border_width: 4.0,
            color: Some("#0000FF".to_string()),
            ..settings_in(temp_dir.path())
        };
        let processor =
            TokenProcessor::with_sources(settings, vec![Box::new(create_mock_source())]);

        let results = processor.process_inputs(&["red.png".to_string()])?;
        let output = results.into_iter().next().unwrap()?;
        assert_eq!(output, temp_dir.path().join("out").join("token_red.png"));

        let token = image::open(&output)?;
        assert_eq!(token.dimensions(), (48, 48));
        assert_eq!(token.get_pixel(0, 0)[3], 0);
        Ok(())
    }

    #[test]
    fn test_failures_do_not_stop_the_batch() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let source = create_mock_source().with_solid("green.png", 20, 30, [0, 255, 0, 255]);
        let processor =
            TokenProcessor::with_sources(settings_in(temp_dir.path()), vec![Box::new(source)]);

        let inputs = vec![
            "missing.png".to_string(),
            "red.png".to_string(),
            "green.png".to_string(),
        ];
        let results = processor.process_inputs(&inputs)?;

        assert_eq!(results.len(), 3);
        assert!(matches!(results[0], Err(TokenError::Input { .. })));
        assert!(results[1].is_ok());
        assert!(results[2].is_ok());
        Ok(())
    }

    #[test]
    fn test_process_single_creates_output_dir() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let settings = Settings {
            scale: 16.0,
            border_width: 2.0,
            output_dir: temp_dir.path().join("fresh").join("out"),
            ..Settings::default()
        };
        let processor =
            TokenProcessor::with_sources(settings, vec![Box::new(create_mock_source())]);

        let output = processor.process_single("red.png")?;
        assert!(output.is_file());
        assert_eq!(output.parent(), Some(temp_dir.path().join("fresh/out").as_path()));
        Ok(())
    }

    #[test]
    fn test_same_stem_inputs_do_not_overwrite_each_other() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let source = MockImageSource::new()
            .with_solid("hero.png", 20, 20, [255, 0, 0, 255])
            .with_solid("hero.jpg", 20, 20, [0, 255, 0, 255]);
        let settings = Settings {
            scale: 16.0,
            border_width: 2.0,
            ..settings_in(temp_dir.path())
        };
        let processor = TokenProcessor::with_sources(settings, vec![Box::new(source)]);

        let results =
            processor.process_inputs(&["hero.png".to_string(), "hero.jpg".to_string()])?;

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(TokenError::Input { .. }))));
        assert_eq!(fs::read_dir(temp_dir.path().join("out"))?.count(), 1);
        Ok(())
    }

    #[test]
    fn test_no_matching_source() {
        let processor = TokenProcessor::with_sources(Settings::default(), vec![]);
        assert!(matches!(
            processor.process_single("anything.png"),
            Err(TokenError::Input { .. })
        ));
    }
}
