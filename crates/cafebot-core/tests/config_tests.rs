use std::fs;

use cafebot_core::config::{resolve_with_base, Config, EmbeddingBackend, Settings};
use cafebot_core::error::Error;
use tempfile::TempDir;

#[test]
fn defaults_are_valid() {
    let settings = Settings::default();
    settings.validate().expect("defaults validate");
    assert_eq!(settings.retrieval.k, 10);
    assert!((settings.retrieval.alpha - 0.6).abs() < 1e-6);
    assert_eq!(settings.chunking.chunk_size, 200);
    assert_eq!(settings.chunking.overlap, 50);
}

#[test]
fn env_overlay_overrides_base_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        "[retrieval]\nk = 6\nalpha = 0.5\n\n[embedding]\nbackend = \"hash\"\ndim = 64\n",
    )
    .unwrap();
    fs::write(tmp.path().join("config.test.toml"), "[retrieval]\nalpha = 0.9\n").unwrap();

    let config = Config::load_from(tmp.path(), "test").expect("load");
    let settings = config.settings().expect("settings");
    assert_eq!(settings.retrieval.k, 6);
    assert!((settings.retrieval.alpha - 0.9).abs() < 1e-6);
    assert_eq!(settings.embedding.backend, EmbeddingBackend::Hash);
    assert_eq!(settings.embedding.dim, 64);
    assert_eq!(settings.retrieval.rerank_top, 8, "untouched keys keep defaults");
    let k: usize = config.get("retrieval.k").expect("get");
    assert_eq!(k, 6);
}

#[test]
fn invalid_values_are_rejected() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[chunking]\nchunk_size = 40\noverlap = 40\n").unwrap();
    let config = Config::load_from(tmp.path(), "none").expect("load");
    assert!(matches!(config.settings(), Err(Error::ChunkingConfig { .. })));

    let mut settings = Settings::default();
    settings.retrieval.alpha = 1.5;
    assert!(matches!(settings.validate(), Err(Error::InvalidConfig(_))));
}

#[test]
fn relative_paths_resolve_against_base() {
    let tmp = TempDir::new().unwrap();
    assert_eq!(resolve_with_base(tmp.path(), "data/items.json"), tmp.path().join("data/items.json"));
    assert_eq!(resolve_with_base(tmp.path(), "/abs/items.json"), std::path::PathBuf::from("/abs/items.json"));
}
