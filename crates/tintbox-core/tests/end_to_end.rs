//! Photo edit flow from decode through export.
//!
//! Run with: `cargo test -p tintbox-core`

use std::io::Cursor;

use image::{Rgba, RgbaImage};
use tintbox_core::render::ExportTarget;
use tintbox_core::{
    EditCommand, EditSession, ExportConfig, ExportRenderer, PresetRegistry, SessionError,
    SessionState, Slider, SourceImage,
};

fn png_bytes(image: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("encode test png");
    bytes
}

/// A small gradient with varying alpha.
fn test_photo() -> RgbaImage {
    RgbaImage::from_fn(12, 9, |x, y| {
        Rgba([(x * 21) as u8, (y * 28) as u8, ((x * y) % 256) as u8, 128 + (x as u8)])
    })
}

fn export_config(dir: &std::path::Path) -> ExportConfig {
    ExportConfig {
        output_dir: dir.to_path_buf(),
        ..ExportConfig::default()
    }
}

#[test]
fn test_original_export_is_byte_equivalent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = EditSession::new(PresetRegistry::builtin());
    session.load_bytes(&png_bytes(&test_photo())).expect("load photo");
    session
        .apply(EditCommand::SelectFilter {
            id: "original".into(),
        })
        .expect("select original");

    let mut renderer = ExportRenderer::new(export_config(dir.path()));
    let exported = session.confirm(&mut renderer).expect("export");

    assert!(exported.path.starts_with(dir.path()));
    assert!(exported.uri.starts_with("file://"));
    let written = image::open(&exported.path).expect("reopen export").to_rgba8();
    assert_eq!(written, test_photo());
    assert_eq!(session.state(), SessionState::Empty);
}

#[test]
fn test_grayscale_red_exports_as_76() {
    let dir = tempfile::tempdir().expect("tempdir");
    let red = RgbaImage::from_pixel(3, 3, Rgba([255, 0, 0, 255]));
    let mut session = EditSession::new(PresetRegistry::builtin());
    session.load_bytes(&png_bytes(&red)).expect("load photo");
    session
        .apply(EditCommand::SelectFilter {
            id: "grayscale".into(),
        })
        .expect("select grayscale");

    let target = dir.path().join("gray.png");
    let mut renderer = ExportRenderer::new(export_config(dir.path()))
        .with_target(ExportTarget::Path(target.clone()));
    let exported = session.confirm(&mut renderer).expect("export");
    assert_eq!(exported.path, target);

    let written = image::open(&target).expect("reopen export").to_rgba8();
    for px in written.pixels() {
        assert_eq!(px.0, [76, 76, 76, 255]);
    }
}

#[test]
fn test_brightness_pushes_mid_gray_to_white() {
    let dir = tempfile::tempdir().expect("tempdir");
    let gray = RgbaImage::from_pixel(2, 2, Rgba([128, 128, 128, 255]));
    let mut session = EditSession::new(PresetRegistry::builtin());
    session.load_bytes(&png_bytes(&gray)).expect("load photo");
    session
        .apply(EditCommand::SetSlider {
            slider: Slider::Brightness,
            value: 1.0,
        })
        .expect("set brightness");

    let mut renderer = ExportRenderer::new(export_config(dir.path()));
    let exported = session.confirm(&mut renderer).expect("export");
    let written = image::open(&exported.path).expect("reopen export").to_rgba8();
    assert_eq!(written.get_pixel(0, 0).0, [255, 255, 255, 255]);
}

#[test]
fn test_decode_failure_keeps_previous_image() {
    let mut session = EditSession::new(PresetRegistry::builtin());
    session.load_bytes(&png_bytes(&test_photo())).expect("load photo");

    let err = session
        .apply(EditCommand::LoadPhoto {
            path: "/nonexistent/tintbox/missing.png".into(),
        })
        .unwrap_err();
    assert!(matches!(err, SessionError::Decode(_)));
    assert_eq!(session.state(), SessionState::Editing);
    assert_eq!(session.source().map(SourceImage::dimensions), Some((12, 9)));

    let corrupt = session.load_bytes(b"GIF89a not really");
    assert!(corrupt.is_err());
    assert_eq!(session.source().map(SourceImage::dimensions), Some((12, 9)));
}

#[test]
fn test_export_failure_keeps_state_for_retry() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("occupied");
    std::fs::write(&blocker, b"a file, not a directory").expect("write blocker");

    let mut session = EditSession::new(PresetRegistry::builtin());
    session.load_bytes(&png_bytes(&test_photo())).expect("load photo");
    session
        .apply(EditCommand::SetSlider {
            slider: Slider::Saturation,
            value: 0.5,
        })
        .expect("set saturation");

    let mut failing = ExportRenderer::new(export_config(&blocker));
    assert!(session.confirm(&mut failing).is_err());
    assert_eq!(session.state(), SessionState::Editing);
    assert_eq!(session.adjustments().map(|a| a.saturation()), Some(0.5));

    let mut working = ExportRenderer::new(export_config(dir.path()));
    session.confirm(&mut working).expect("retry export");
    assert_eq!(session.state(), SessionState::Empty);
}

#[test]
fn test_jpeg_export_by_extension() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = SourceImage::from_image(test_photo()).expect("source");
    let target = dir.path().join("nested").join("out.jpeg");
    let mut session = EditSession::new(PresetRegistry::builtin());
    session.load_image(source);

    let mut renderer = ExportRenderer::new(export_config(dir.path()))
        .with_target(ExportTarget::Path(target.clone()));
    let exported = session.confirm(&mut renderer).expect("export");
    assert_eq!(exported.format, tintbox_core::render::OutputFormat::Jpeg);
    let written = image::open(&target).expect("reopen jpeg");
    assert_eq!((written.width(), written.height()), (12, 9));
}

#[tokio::test]
async fn test_async_confirm_writes_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = EditSession::new(PresetRegistry::builtin());
    session.load_bytes(&png_bytes(&test_photo())).expect("load photo");
    session
        .apply(EditCommand::SelectFilter { id: "sepia".into() })
        .expect("select sepia");

    let exported = session
        .confirm_async(ExportRenderer::new(export_config(dir.path())))
        .await
        .expect("async export");
    assert!(exported.path.exists());
    assert_eq!((exported.width, exported.height), (12, 9));
    assert_eq!(session.state(), SessionState::Empty);
}

#[cfg(target_os = "linux")]
#[test]
fn test_export_to_full_device_fails_and_keeps_state() {
    let dir = tempfile::tempdir().expect("tempdir");
    for name in ["full.png", "full.jpg"] {
        let link = dir.path().join(name);
        std::os::unix::fs::symlink("/dev/full", &link).expect("symlink /dev/full");

        let mut session = EditSession::new(PresetRegistry::builtin());
        session.load_bytes(&png_bytes(&test_photo())).expect("load photo");
        session
            .apply(EditCommand::SetSlider {
                slider: Slider::Contrast,
                value: 0.3,
            })
            .expect("set contrast");

        let mut renderer = ExportRenderer::new(export_config(dir.path()))
            .with_target(ExportTarget::Path(link.clone()));
        let err = session.confirm(&mut renderer).unwrap_err();
        assert!(matches!(err, SessionError::Render(_)), "{name}: {err}");
        assert_eq!(session.state(), SessionState::Editing, "{name}");
        assert_eq!(session.adjustments().map(|a| a.contrast()), Some(0.3));
    }
}

#[test]
fn test_exported_uri_is_percent_encoded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("my photo#1.png");
    let mut session = EditSession::new(PresetRegistry::builtin());
    session.load_bytes(&png_bytes(&test_photo())).expect("load photo");

    let mut renderer = ExportRenderer::new(export_config(dir.path()))
        .with_target(ExportTarget::Path(target.clone()));
    let exported = session.confirm(&mut renderer).expect("export");

    assert!(exported.uri.ends_with("/my%20photo%231.png"), "{}", exported.uri);
    assert!(!exported.uri.contains(' '));
    assert!(target.exists());
}
