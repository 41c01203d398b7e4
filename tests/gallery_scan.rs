use lightbox_viewer::gallery::scan_directory;

#[test]
fn lists_images_in_natural_order_with_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    for (name, w, h) in [("shot10.png", 10, 10), ("shot2.png", 40, 30), ("shot1.png", 1, 1)] {
        image::RgbaImage::new(w, h).save(dir.path().join(name)).unwrap();
    }
    std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();
    std::fs::write(dir.path().join("corrupt.jpg"), "garbage").unwrap();

    let records = scan_directory(dir.path()).unwrap();
    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, ["corrupt", "shot1", "shot2", "shot10"]);

    let shot2 = &records[2];
    assert_eq!(shot2.dimensions.as_deref(), Some("40 x 30 pixels"));
    assert_eq!(shot2.megapixels.as_deref(), Some("0.0 MP"));
    assert!(shot2.src.ends_with("shot2.png"));
    assert_eq!(shot2.display_src(), shot2.src);

    assert_eq!(records[0].dimensions, None);
}

#[test]
fn missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(scan_directory(&dir.path().join("nope")).is_err());
}
