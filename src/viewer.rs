//! The viewer lifecycle manager: owns the scene, renderer, loader, and
//! clock, and ties them together once per redraw.

use std::path::PathBuf;
use std::sync::Arc;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::animation::{AnimationClip, AnimationMixer};
use crate::assets::{AssetLoader, AssetResolver, DecoderRegistry, ModelPrefab};
use crate::clock::Clock;
use crate::errors::{Error, Result};
use crate::render::Renderer;
use crate::scene::{build_stage, NodeHandle, Scene, Stage, StageSettings};

/// The model loaded when [`ViewerOptions`] does not name one.
pub const DEFAULT_ASSET: &str = "Samba Dancing";

/// Playback rate applied to loaded clips by default.
pub const DEFAULT_PLAYBACK_RATE: f32 = 0.65;

pub struct ViewerOptions {
    /// Initial model to load; `None` means [`DEFAULT_ASSET`].
    pub initial_asset: Option<String>,
    /// Clip playback rate multiplier.
    pub playback_rate: f32,
    /// Directory the [`AssetResolver`] resolves against.
    pub asset_root: PathBuf,
    pub stage: StageSettings,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            initial_asset: None,
            playback_rate: DEFAULT_PLAYBACK_RATE,
            asset_root: PathBuf::from("assets"),
            stage: StageSettings::default(),
        }
    }
}

/// The model currently in the scene.
struct AttachedAsset {
    name: String,
    root: NodeHandle,
    clips: Vec<Arc<AnimationClip>>,
}

/// Couples a mixer to the subtree it was bound against. Dropped whole on
/// detach, so a mixer can never outlive its target nodes.
struct AnimationBinding {
    root: NodeHandle,
    mixer: AnimationMixer,
}

/// Scene, renderer, loader, and clock under one lifecycle.
///
/// States: constructed GPU-free, `mount` brings the surface up, loads swap
/// the attached model between frames, `dispose` tears everything down and
/// cancels the render loop (observed as `frame() == false`).
pub struct Viewer {
    scene: Scene,
    renderer: Renderer,
    loader: AssetLoader,
    clock: Clock,
    stage: Stage,
    playback_rate: f32,

    asset: Option<AttachedAsset>,
    binding: Option<AnimationBinding>,
    disposed: bool,
}

impl Viewer {
    /// Builds the stage and fires the initial asset load. No GPU work
    /// happens until [`mount`](Self::mount).
    #[must_use]
    pub fn new(options: ViewerOptions) -> Self {
        let mut scene = Scene::new();
        let stage = build_stage(&mut scene, &options.stage);

        let resolver = AssetResolver::new(options.asset_root);
        let mut loader = AssetLoader::new(resolver, DecoderRegistry::new());

        let initial = options
            .initial_asset
            .unwrap_or_else(|| DEFAULT_ASSET.to_string());
        loader.request(&initial);

        Self {
            scene,
            renderer: Renderer::new(),
            loader,
            clock: Clock::new(),
            stage,
            playback_rate: options.playback_rate,
            asset: None,
            binding: None,
            disposed: false,
        }
    }

    /// Initializes the GPU surface against `window`. Blocks on adapter and
    /// device acquisition.
    pub fn mount<W>(&mut self, window: W, width: u32, height: u32) -> Result<()>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        if self.disposed {
            return Err(Error::Disposed);
        }
        pollster::block_on(self.renderer.init(window, width, height))?;
        if let Some(aspect) = self.renderer.aspect_ratio() {
            self.scene.set_camera_aspect(aspect);
        }
        Ok(())
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Name of the currently attached model, if any.
    #[must_use]
    pub fn current_asset(&self) -> Option<&str> {
        self.asset.as_ref().map(|a| a.name.as_str())
    }

    /// Clips of the attached model.
    #[must_use]
    pub fn attached_clips(&self) -> &[Arc<AnimationClip>] {
        self.asset.as_ref().map_or(&[], |a| a.clips.as_slice())
    }

    /// Clip names of the attached model, in clip order.
    #[must_use]
    pub fn clip_names(&self) -> Vec<&str> {
        self.binding
            .as_ref()
            .map(|b| b.mixer.clip_names())
            .unwrap_or_default()
    }

    /// Starts the named clip on the attached model.
    pub fn play(&mut self, name: &str) -> Result<()> {
        match &mut self.binding {
            Some(binding) => binding.mixer.play(name),
            None => Err(Error::ClipNotFound { clip: name.into() }),
        }
    }

    /// Stops the named clip on the attached model.
    pub fn stop(&mut self, name: &str) -> Result<()> {
        match &mut self.binding {
            Some(binding) => binding.mixer.stop(name),
            None => Err(Error::ClipNotFound { clip: name.into() }),
        }
    }

    /// Begins loading a new model. The previous model keeps animating
    /// until the load resolves; a failed load leaves it untouched.
    /// Ignored after disposal.
    pub fn request_asset(&mut self, name: &str) {
        if self.disposed {
            return;
        }
        self.loader.request(name);
    }

    /// Updates the surface and camera aspect. Degenerate dimensions and
    /// post-disposal calls are no-ops.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.disposed || width == 0 || height == 0 {
            return;
        }
        self.renderer.resize(width, height);
        if let Some(aspect) = self.renderer.aspect_ratio() {
            self.scene.set_camera_aspect(aspect);
        }
    }

    /// One tick of the render loop: apply finished loads, advance the
    /// animation, refresh matrices, draw. Returns `false` once disposed —
    /// the shell stops scheduling redraws on that signal.
    pub fn frame(&mut self) -> bool {
        if self.disposed {
            return false;
        }

        self.apply_finished_loads();

        let dt = self.clock.tick();
        if let Some(binding) = &mut self.binding {
            binding.mixer.advance(dt, &mut self.scene);
        }

        self.scene.update();

        if let Err(err) = self.renderer.render(&self.scene) {
            log::error!("Render failed: {err}");
        }

        true
    }

    /// Tears the viewer down: cancels the loop, detaches the model, and
    /// releases every GPU resource. Idempotent; late load resolutions and
    /// events after this are ignored.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        self.loader.invalidate();
        self.binding = None;
        self.detach_asset();
        self.renderer.release();

        log::info!("Viewer disposed");
    }

    fn apply_finished_loads(&mut self) {
        while let Some(message) = self.loader.poll() {
            match message.result {
                Ok(prefab) => self.apply_load(message.name, &prefab),
                Err(err) => {
                    // Previous model stays attached.
                    log::error!("{err}");
                }
            }
        }
    }

    /// Swaps the attached model: unbind, detach, instantiate, rebind. Runs
    /// strictly between two frames.
    pub(crate) fn apply_load(&mut self, name: String, prefab: &ModelPrefab) {
        self.binding = None;
        self.detach_asset();

        let root = prefab.instantiate(&mut self.scene);

        let mut mixer = AnimationMixer::bind(&self.scene, root, &prefab.clips);
        mixer.time_scale = self.playback_rate;

        log::info!(
            "Attached '{name}' ({} clips: {:?})",
            prefab.clips.len(),
            mixer.clip_names()
        );

        self.binding = Some(AnimationBinding { root, mixer });
        self.asset = Some(AttachedAsset {
            name,
            root,
            clips: prefab.clips.clone(),
        });
    }

    fn detach_asset(&mut self) {
        // A binding must never outlive its subtree.
        if let Some(binding) = self.binding.take() {
            debug_assert!(self.asset.as_ref().is_none_or(|a| a.root == binding.root));
        }
        if let Some(asset) = self.asset.take() {
            self.scene.remove_node(asset.root);
        }
    }
}
