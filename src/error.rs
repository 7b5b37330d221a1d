use std::path::PathBuf;
use thiserror::Error;

/// Failure to bring an external asset into the application.
///
/// Every variant aborts initialisation; the demo has no partial-scene mode.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to import model {path}")]
    Model {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    #[error("model {0} contains no triangles")]
    EmptyModel(PathBuf),

    #[error("failed to decode texture {path}")]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid config file {path}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config file {path}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    #[error("texture {name} is {width}x{height}, device allows at most {max} per side")]
    TextureTooLarge {
        name: String,
        width: u32,
        height: u32,
        max: u32,
    },
}
