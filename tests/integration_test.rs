use image::{GenericImageView, Rgba, RgbaImage};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use token_forge::{LocalFileSource, Settings, TokenError, TokenProcessor};

fn local_processor(settings: Settings) -> TokenProcessor {
    TokenProcessor::with_sources(settings, vec![Box::new(LocalFileSource)])
}

fn write_solid_png(path: &Path, width: u32, height: u32, color: [u8; 4]) {
    RgbaImage::from_pixel(width, height, Rgba(color))
        .save(path)
        .unwrap();
}

fn distance_from_center(x: u32, y: u32) -> f32 {
    (x as f32 + 0.5 - 150.0).hypot(y as f32 + 0.5 - 150.0)
}

#[test]
fn test_red_source_becomes_blue_ringed_token() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("red.png");
    write_solid_png(&input, 500, 500, [255, 0, 0, 255]);

    let settings = Settings {
        output_dir: temp_dir.path().join("tokens"),
        color: Some("#0000FF".to_string()),
        ..Settings::default()
    };
    let processor = local_processor(settings);
    let output = processor
        .process_single(input.to_str().unwrap())
        .unwrap();
    assert_eq!(output, temp_dir.path().join("tokens").join("token_red.png"));

    let token = image::open(&output).unwrap().to_rgba8();
    assert_eq!(token.dimensions(), (300, 300));

    for (x, y, pixel) in token.enumerate_pixels() {
        let distance = distance_from_center(x, y);
        // Lanczos ringing may leak a few pixels past the ring's outer edge at 150.
        if distance > 155.0 {
            assert_eq!(pixel[3], 0, "pixel ({x}, {y}) should be transparent");
        } else if (141.0..=149.0).contains(&distance) {
            assert_eq!(*pixel, Rgba([0, 0, 255, 255]), "pixel ({x}, {y}) should be ring");
        } else if distance < 137.0 {
            let Rgba([r, g, b, a]) = *pixel;
            assert!(
                r >= 250 && g <= 5 && b <= 5 && a >= 250,
                "pixel ({x}, {y}) should be red, got {:?}",
                pixel
            );
        }
    }
}

#[test]
fn test_batch_reports_each_failure_and_keeps_going() {
    let temp_dir = TempDir::new().unwrap();
    let valid = temp_dir.path().join("valid.png");
    write_solid_png(&valid, 40, 40, [12, 34, 56, 255]);
    let unsupported = temp_dir.path().join("scan.tiff");
    fs::write(&unsupported, b"II*\0").unwrap();
    let missing = temp_dir.path().join("missing.png");

    let settings = Settings {
        scale: 64.0,
        border_width: 4.0,
        output_dir: temp_dir.path().join("out"),
        ..Settings::default()
    };
    let processor = local_processor(settings);

    let inputs = vec![
        missing.display().to_string(),
        valid.display().to_string(),
        unsupported.display().to_string(),
    ];
    let results = processor.process_inputs(&inputs).unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(matches!(results[0], Err(TokenError::Input { .. })));
    assert!(matches!(results[2], Err(TokenError::Input { .. })));

    let output = results[1].as_ref().unwrap();
    assert!(output.exists());
    assert_eq!(image::open(output).unwrap().dimensions(), (64, 64));
}

#[test]
fn test_output_directory_is_created() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("a.png");
    write_solid_png(&input, 30, 20, [200, 100, 0, 255]);

    let output_dir = temp_dir.path().join("deep").join("nested").join("out");
    let settings = Settings {
        scale: 32.0,
        border_width: 2.0,
        output_dir: output_dir.clone(),
        ..Settings::default()
    };

    let results = local_processor(settings)
        .process_inputs(&[input.display().to_string()])
        .unwrap();
    assert!(output_dir.is_dir());
    assert_eq!(
        results[0].as_ref().unwrap(),
        &output_dir.join("token_a.png")
    );
}

#[test]
fn test_tinted_border_follows_source_tone() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("tone.png");
    write_solid_png(&input, 100, 100, [20, 40, 60, 255]);

    let settings = Settings {
        scale: 100.0,
        border_width: 10.0,
        brightness: 50,
        output_dir: temp_dir.path().join("out"),
        ..Settings::default()
    };
    let output = local_processor(settings)
        .process_single(input.to_str().unwrap())
        .unwrap();

    let token = image::open(output).unwrap().to_rgba8();
    // radius (100 - 10) / 2 = 45, so (50, 5) lies on the ring.
    assert_eq!(*token.get_pixel(50, 5), Rgba([70, 90, 110, 255]));
}

#[test]
fn test_settings_file_drives_processing() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("config.json");
    let output_dir = temp_dir.path().join("from-config");
    fs::write(
        &config,
        format!(
            r##"{{"scale": 80, "borderWidth": 6, "outputDir": {:?}, "color": "#FF00FF", "namePrefix": "avatar_"}}"##,
            output_dir.display().to_string()
        ),
    )
    .unwrap();

    let settings = Settings::from_file(&config).unwrap();
    assert_eq!(settings.output_dir, output_dir);

    let input = temp_dir.path().join("hero.png");
    write_solid_png(&input, 50, 50, [0, 0, 0, 255]);
    let output = local_processor(settings)
        .process_single(input.to_str().unwrap())
        .unwrap();

    assert_eq!(output, output_dir.join("avatar_hero.png"));
    let token = image::open(output).unwrap().to_rgba8();
    assert_eq!(token.dimensions(), (80, 80));
    // radius 37, (40, 3) sits on the ring centerline.
    assert_eq!(*token.get_pixel(40, 3), Rgba([255, 0, 255, 255]));
}
