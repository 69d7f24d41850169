use std::collections::HashMap;

use super::*;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |k| map.get(k).cloned()
}

#[test]
fn defaults_are_valid() {
    let cfg = CompositorConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.max_upload_bytes, 5_242_880);
    assert_eq!(cfg.decode_limits().max_bytes, cfg.max_upload_bytes);
}

#[test]
fn json_file_overrides_some_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("camagru.json");
    std::fs::write(&path, r#"{"upload_dir":"/srv/img","max_layers":4}"#).unwrap();

    let cfg = CompositorConfig::from_json_file(&path).unwrap();
    assert_eq!(cfg.upload_dir, PathBuf::from("/srv/img"));
    assert_eq!(cfg.max_layers, 4);
    assert_eq!(cfg.sticker_dir, CompositorConfig::default().sticker_dir);
}

#[test]
fn json_unknown_field_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("camagru.json");
    std::fs::write(&path, r#"{"upload_directory":"x"}"#).unwrap();
    assert!(matches!(
        CompositorConfig::from_json_file(&path),
        Err(CamagruError::Validation(_))
    ));
}

#[test]
fn missing_json_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(CompositorConfig::from_json_file(&dir.path().join("nope.json")).is_err());
}

#[test]
fn env_overrides_apply() {
    let mut cfg = CompositorConfig::default();
    cfg.apply_env(env(&[
        ("CAMAGRU_STICKER_DIR", "/opt/stickers"),
        ("CAMAGRU_MAX_UPLOAD_BYTES", " 1024 "),
        ("CAMAGRU_PUBLIC_PREFIX", ""),
    ]))
    .unwrap();
    assert_eq!(cfg.sticker_dir, PathBuf::from("/opt/stickers"));
    assert_eq!(cfg.max_upload_bytes, 1024);
    assert_eq!(cfg.public_prefix, "uploads/images");
}

#[test]
fn env_bad_number_is_validation_error() {
    let mut cfg = CompositorConfig::default();
    let err = cfg
        .apply_env(env(&[("CAMAGRU_MAX_LAYERS", "many")]))
        .unwrap_err();
    assert!(err.to_string().contains("CAMAGRU_MAX_LAYERS"));
}

#[test]
fn validate_rejects_zero_limits() {
    let cfg = CompositorConfig {
        max_layers: 0,
        ..CompositorConfig::default()
    };
    assert!(cfg.validate().is_err());

    let cfg = CompositorConfig {
        max_upload_bytes: 0,
        ..CompositorConfig::default()
    };
    assert!(cfg.validate().is_err());
}
