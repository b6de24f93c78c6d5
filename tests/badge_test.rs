//! バッジ保存の統合テスト

use ecopulse::badge::{save_badge, BadgeLevel, BadgeSpec, BADGE_HEIGHT, BADGE_WIDTH};
use tempfile::tempdir;

#[test]
fn test_save_badge_writes_png() {
    let dir = tempdir().expect("Failed to create temp dir");
    let spec = BadgeSpec::new("Jane  Doe", Some(BadgeLevel::C));

    let path = save_badge(&spec, None, dir.path()).unwrap().expect("badge should be drawn");
    assert_eq!(path.file_name().unwrap(), "ecopulse-badge-Jane-Doe.png");

    let image = image::open(&path).unwrap();
    assert_eq!(image.width(), BADGE_WIDTH);
    assert_eq!(image.height(), BADGE_HEIGHT);
}

#[test]
fn test_save_badge_creates_directory() {
    let dir = tempdir().expect("Failed to create temp dir");
    let nested = dir.path().join("downloads").join("badges");

    let path = save_badge(&BadgeSpec::new("", None), None, &nested).unwrap().unwrap();
    assert!(path.starts_with(&nested));
    assert_eq!(path.file_name().unwrap(), "ecopulse-badge-Eco-Hero.png");
}

#[test]
fn test_save_badge_overwrites_existing_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let spec = BadgeSpec::new("Alex", None);

    std::fs::write(dir.path().join(spec.file_name()), b"old").unwrap();
    let path = save_badge(&spec, None, dir.path()).unwrap().unwrap();
    assert!(image::open(path).is_ok());
}
