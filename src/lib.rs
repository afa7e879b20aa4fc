//! marionette — a minimal animated-model viewer.
//!
//! Builds a fixed stage (camera, lights, ground, fog), loads a skinned
//! model asynchronously, plays its animation clips, and renders through
//! wgpu. The [`viewer::Viewer`] owns the whole lifecycle; [`app::run`]
//! hosts it in a winit window.
//!
//! Lint levels live in the `[lints]` table of Cargo.toml.

pub mod animation;
pub mod app;
pub mod assets;
pub mod clock;
pub mod errors;
pub mod render;
pub mod resources;
pub mod scene;
pub mod viewer;

pub use animation::{AnimationAction, AnimationClip, AnimationMixer, LoopMode};
pub use assets::{AssetLoader, AssetResolver, DecoderRegistry, ModelDecoder, ModelPrefab};
pub use clock::Clock;
pub use errors::{Error, Result};
pub use render::Renderer;
pub use resources::{Geometry, Material, Mesh};
pub use scene::{build_stage, Camera, Light, Node, Scene, Stage, StageSettings};
pub use viewer::{Viewer, ViewerOptions, DEFAULT_ASSET, DEFAULT_PLAYBACK_RATE};
