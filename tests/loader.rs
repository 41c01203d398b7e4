use std::path::Path;
use std::time::Duration;

use egui::Vec2;
use lightbox_viewer::error::LoadError;
use lightbox_viewer::geometry::ImageSize;
use lightbox_viewer::loader::ImageLoader;
use lightbox_viewer::ViewerSession;

const TIMEOUT: Duration = Duration::from_secs(10);

fn write_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 120, 255]));
    img.save(path).unwrap();
}

#[test]
fn decodes_png_with_natural_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.png");
    write_png(&path, 64, 32);

    let loader = ImageLoader::spawn(None).unwrap();
    let session = ViewerSession::new(0, Vec2::new(800.0, 600.0));
    loader.request(session.ticket(), &path).unwrap();

    let outcome = loader.wait(TIMEOUT).expect("loader answered");
    assert_eq!(outcome.ticket, session.ticket());
    let decoded = outcome.result.unwrap();
    assert_eq!(decoded.natural, ImageSize::new(64, 32));
    assert_eq!(decoded.texture_size, [64, 32]);
    assert_eq!(decoded.pixels.len(), 64 * 32 * 4);
}

#[test]
fn oversized_textures_are_downscaled_but_report_natural_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wide.png");
    write_png(&path, 400, 100);

    let mut loader = ImageLoader::spawn(None).unwrap();
    loader.set_max_texture_side(200);
    let session = ViewerSession::new(0, Vec2::new(800.0, 600.0));
    loader.request(session.ticket(), &path).unwrap();

    let decoded = loader.wait(TIMEOUT).unwrap().result.unwrap();
    assert_eq!(decoded.natural, ImageSize::new(400, 100));
    assert_eq!(decoded.texture_size, [200, 50]);
}

#[test]
fn failures_come_back_as_outcomes() {
    let dir = tempfile::tempdir().unwrap();
    let garbage = dir.path().join("broken.png");
    std::fs::write(&garbage, b"not a png").unwrap();

    let loader = ImageLoader::spawn(None).unwrap();
    let session = ViewerSession::new(0, Vec2::new(800.0, 600.0));

    loader.request(session.ticket(), &garbage).unwrap();
    let outcome = loader.wait(TIMEOUT).unwrap();
    assert!(matches!(outcome.result, Err(LoadError::Decode { .. })));

    loader.request(session.ticket(), dir.path().join("missing.png")).unwrap();
    let outcome = loader.wait(TIMEOUT).unwrap();
    assert!(matches!(outcome.result, Err(LoadError::Io { .. })));
}

#[test]
fn late_result_for_previous_index_is_rejected_by_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("first.png");
    write_png(&path, 3000, 3000);

    let loader = ImageLoader::spawn(None).unwrap();
    let mut session = ViewerSession::new(0, Vec2::new(800.0, 600.0));
    loader.request(session.ticket(), &path).unwrap();
    session.reset_on_index_change(1);

    let outcome = loader.wait(TIMEOUT).unwrap();
    let natural = outcome.result.unwrap().natural;
    assert!(!session.apply_load(outcome.ticket, Some(natural)));
    assert!(!session.is_loaded());
    assert_eq!(session.natural_size(), ImageSize::ZERO);
}
