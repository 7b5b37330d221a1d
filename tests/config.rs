use mesh_raytracer::config::{AppConfig, ModelSource};
use mesh_raytracer::error::LoadError;
use std::path::PathBuf;

#[test]
fn no_path_gives_stock_scene() {
    assert_eq!(AppConfig::load(None).unwrap(), AppConfig::default());
}

#[test]
fn file_paths_resolve_next_to_the_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.json");
    std::fs::write(
        &path,
        r#"{
            "textures": { "picture": "textures/mona.png" },
            "models": [ { "source": { "gltf": "models/bunny.glb" }, "material": 0 } ],
            "light": { "intensity": 8.0 }
        }"#,
    )
    .unwrap();

    let config = AppConfig::load(Some(&path)).unwrap();
    assert_eq!(
        config.textures.picture,
        Some(dir.path().join("textures/mona.png"))
    );
    assert_eq!(
        config.models[0].source,
        ModelSource::Gltf(dir.path().join("models/bunny.glb"))
    );
    assert_eq!(config.light.intensity, 8.0);
    assert_eq!(config.light.size, [3.0, 3.0]);
}

#[test]
fn absolute_paths_are_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.json");
    let wall = if cfg!(windows) { "C:\\assets\\wall.png" } else { "/assets/wall.png" };
    std::fs::write(
        &path,
        serde_json::json!({ "textures": { "wall": wall } }).to_string(),
    )
    .unwrap();

    let config = AppConfig::load(Some(&path)).unwrap();
    assert_eq!(config.textures.wall, Some(PathBuf::from(wall)));
}

#[test]
fn malformed_json_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ \"window\": ").unwrap();
    assert!(matches!(
        AppConfig::load(Some(&path)),
        Err(LoadError::Config { .. })
    ));
}

#[test]
fn missing_config_is_an_io_error() {
    let err = AppConfig::load(Some(PathBuf::from("nope.json").as_path())).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
}

#[test]
fn degenerate_numbers_are_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flat.json");
    std::fs::write(
        &path,
        r#"{
            "light": { "size": [0, 0] },
            "camera": { "fov": 0.0 },
            "box": { "transform": { "scale": [0, 0, 0] } }
        }"#,
    )
    .unwrap();

    let err = AppConfig::load(Some(&path)).unwrap_err();
    match err {
        LoadError::InvalidConfig { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
}

#[test]
fn inverted_clip_planes_are_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.json");
    std::fs::write(&path, r#"{ "camera": { "near": 10.0, "far": 1.0 } }"#).unwrap();

    let err = AppConfig::load(Some(&path)).unwrap_err();
    assert!(matches!(err, LoadError::InvalidConfig { .. }));
    assert!(err.to_string().contains("near"));
}
