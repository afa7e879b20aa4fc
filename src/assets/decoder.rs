use std::path::Path;

use crate::assets::prefab::ModelPrefab;
use crate::errors::{Error, Result};

/// Decodes one model file format into a [`ModelPrefab`].
///
/// Decoders run on loader threads and must not touch the scene or the GPU.
pub trait ModelDecoder: Send + Sync {
    /// Lowercase file extensions this decoder handles.
    fn extensions(&self) -> &[&str];

    fn decode(&self, path: &Path, name: &str) -> Result<ModelPrefab>;
}

/// Extension-keyed decoder lookup. glTF/GLB ships built in; applications
/// register additional formats before constructing the loader.
pub struct DecoderRegistry {
    decoders: Vec<Box<dyn ModelDecoder>>,
}

impl DecoderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            decoders: vec![Box::new(crate::assets::gltf::GltfDecoder)],
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            decoders: Vec::new(),
        }
    }

    pub fn register(&mut self, decoder: Box<dyn ModelDecoder>) {
        self.decoders.push(decoder);
    }

    /// Decodes `path`, dispatching on its extension.
    pub fn decode(&self, path: &Path, name: &str) -> Result<ModelPrefab> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let decoder = self
            .decoders
            .iter()
            .find(|d| d.extensions().contains(&extension.as_str()))
            .ok_or(Error::UnsupportedFormat {
                extension: extension.clone(),
            })?;

        decoder.decode(path, name)
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_extension_is_rejected() {
        let registry = DecoderRegistry::new();
        let err = registry
            .decode(Path::new("assets/fbx/Samba Dancing.fbx"), "Samba Dancing")
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { extension } if extension == "fbx"));
    }

    #[test]
    fn empty_registry_rejects_everything() {
        let registry = DecoderRegistry::empty();
        let err = registry
            .decode(Path::new("model.glb"), "model")
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
    }
}
