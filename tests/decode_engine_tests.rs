//! End-to-end decode tests
//!
//! Images are rendered in memory (or written to a temp dir when the loader
//! path is under test) and run through the public engine API.

mod common;

use barscan::{
    BarcodeFormat, BinarizerKind, DecodeConfig, DecodeError, Engine, ImageLoadError, PixelBuffer,
    SymbologySet,
};
use common::{WHITE, bars_image, code128_modules, ean_modules, qr_image, save_png};
use image::{DynamicImage, GrayImage, Luma};

fn qr_only() -> DecodeConfig {
    DecodeConfig::new().with_formats(SymbologySet::only(BarcodeFormat::QrCode))
}

#[test]
fn test_large_png_is_downsampled_and_decoded() {
    let dir = tempfile::tempdir().unwrap();
    let path = save_png(dir.path(), "hello.png", &qr_image("HELLO", 30, 1200, 0, 255));

    let decoded = Engine::new(qr_only()).decode_path(&path).unwrap();
    assert_eq!(decoded.text, "HELLO");
    assert_eq!(decoded.raw, b"HELLO");
    assert_eq!(decoded.format, BarcodeFormat::QrCode);
    assert_eq!(decoded.sample_factor, 3);
    assert_eq!(decoded.binarizer, BinarizerKind::Hybrid);
}

#[test]
fn test_blank_image_reports_not_found() {
    let image = GrayImage::from_pixel(300, 300, Luma([WHITE]));
    let err = Engine::default()
        .decode_image(DynamicImage::ImageLuma8(image))
        .unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
}

#[test]
fn test_low_contrast_needs_global_histogram() {
    // 22 grey levels between dark and light: below the adaptive minimum range.
    let image = qr_image("HELLO", 8, 232, 100, 122);
    let decoded = Engine::new(qr_only())
        .decode_image(DynamicImage::ImageLuma8(image))
        .unwrap();
    assert_eq!(decoded.text, "HELLO");
    assert_eq!(decoded.binarizer, BinarizerKind::GlobalHistogram);
}

#[test]
fn test_repeated_decodes_agree() {
    let engine = Engine::default();
    let image = DynamicImage::ImageLuma8(qr_image("same every time", 6, 300, 0, 255));
    let first = engine.decode_image(image.clone()).unwrap();
    for _ in 0..3 {
        assert_eq!(engine.decode_image(image.clone()).unwrap(), first);
    }
}

#[test]
fn test_symbology_restriction() {
    let image = DynamicImage::ImageLuma8(qr_image("restricted", 6, 300, 0, 255));

    let config = DecodeConfig::new().with_formats(SymbologySet::new([BarcodeFormat::Ean13, BarcodeFormat::Code128]));
    let err = Engine::new(config).decode_image(image.clone()).unwrap_err();
    assert!(err.is_not_found());

    let err = Engine::new(DecodeConfig::new().with_formats(SymbologySet::new(std::iter::empty())))
        .decode_image(image)
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_concurrent_decodes_share_engine() {
    let engine = Engine::new(qr_only());
    let texts = ["thread one", "thread two", "thread three", "thread four"];
    let images: Vec<_> = texts
        .iter()
        .map(|text| DynamicImage::ImageLuma8(qr_image(text, 6, 300, 0, 255)))
        .collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = images
            .iter()
            .map(|image| {
                let engine = engine.clone();
                scope.spawn(move || engine.decode_image(image.clone()).map(|d| d.text))
            })
            .collect();
        for (handle, expected) in handles.into_iter().zip(texts) {
            assert_eq!(handle.join().unwrap().unwrap(), expected);
        }
    });
}

#[test]
fn test_argb_buffer() {
    let gray = qr_image("ARGB", 5, 200, 0, 255);
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    let pixels: Vec<u32> = gray
        .pixels()
        .map(|p| {
            let v = p.0[0] as u32;
            0xFF00_0000 | (v << 16) | (v << 8) | v
        })
        .collect();
    let buffer = PixelBuffer::from_argb32(w, h, &pixels).unwrap();

    let decoded = Engine::new(qr_only()).decode_buffer(&buffer).unwrap();
    assert_eq!(decoded.text, "ARGB");
    assert_eq!(decoded.sample_factor, 1);
}

#[test]
fn test_ean13_image() {
    let image = bars_image(&ean_modules("5901234123457"), 3, 80);
    let decoded = Engine::default()
        .decode_image(DynamicImage::ImageLuma8(image))
        .unwrap();
    assert_eq!(decoded.format, BarcodeFormat::Ean13);
    assert_eq!(decoded.text, "5901234123457");
}

#[test]
fn test_ean8_image() {
    let image = bars_image(&ean_modules("96385074"), 3, 80);
    let decoded = Engine::default()
        .decode_image(DynamicImage::ImageLuma8(image))
        .unwrap();
    assert_eq!((decoded.format, decoded.text.as_str()), (BarcodeFormat::Ean8, "96385074"));
}

#[test]
fn test_code128_image() {
    let image = bars_image(&code128_modules("barscan-128"), 2, 80);
    let decoded = Engine::default()
        .decode_image(DynamicImage::ImageLuma8(image))
        .unwrap();
    assert_eq!(decoded.format, BarcodeFormat::Code128);
    assert_eq!(decoded.text, "barscan-128");
}

#[test]
fn test_missing_file_is_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Engine::default()
        .decode_path(dir.path().join("absent.png"))
        .unwrap_err();
    assert!(!err.is_not_found());
    assert!(matches!(err, DecodeError::ImageLoad(ImageLoadError::NotFound(_))));
}

#[test]
fn test_garbage_file_is_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("noise.png");
    std::fs::write(&path, b"definitely not a png").unwrap();
    let err = Engine::default().decode_path(&path).unwrap_err();
    assert!(matches!(err, DecodeError::ImageLoad(_)), "unexpected error: {err}");
}

#[test]
fn test_convenience_entry_points() {
    let dir = tempfile::tempdir().unwrap();
    let image = qr_image("entry", 6, 300, 0, 255);
    let path = save_png(dir.path(), "entry.png", &image);
    assert_eq!(barscan::decode_file(&path).unwrap().text, "entry");

    let (w, h) = (image.width() as usize, image.height() as usize);
    let buffer = PixelBuffer::from_luma8(w, h, image.into_raw()).unwrap();
    assert_eq!(barscan::decode_pixels(&buffer).unwrap().text, "entry");
}
