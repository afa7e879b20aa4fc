//! Asset loading: name resolution, format decoders, and the asynchronous
//! loader that delivers decoded prefabs back to the main thread.

pub mod decoder;
pub mod gltf;
pub mod loader;
pub mod prefab;
pub mod resolver;

pub use decoder::{DecoderRegistry, ModelDecoder};
pub use gltf::GltfDecoder;
pub use loader::{AssetLoader, LoadMessage};
pub use prefab::{ModelPrefab, PrefabNode, PrefabSkeleton};
pub use resolver::AssetResolver;
