use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use crate::assets::decoder::DecoderRegistry;
use crate::assets::prefab::ModelPrefab;
use crate::assets::resolver::AssetResolver;
use crate::errors::{Error, Result};

/// A finished load, tagged with the generation it was requested under.
pub struct LoadMessage {
    pub generation: u64,
    pub name: String,
    pub result: Result<ModelPrefab>,
}

/// Asynchronous model loader.
///
/// Each [`request`](Self::request) spawns a worker thread that resolves,
/// reads, and decodes the file, then posts a [`LoadMessage`] back over a
/// channel. The owner polls once per frame with [`poll`](Self::poll).
///
/// Requests carry a monotonically increasing generation; only the most
/// recent request is live. Results from superseded requests are dropped
/// inside `poll`, which makes rapid model swaps and loads resolving after
/// [`invalidate`](Self::invalidate) safe by construction.
pub struct AssetLoader {
    resolver: Arc<AssetResolver>,
    registry: Arc<DecoderRegistry>,
    sender: mpsc::Sender<LoadMessage>,
    receiver: mpsc::Receiver<LoadMessage>,
    generation: u64,
}

impl AssetLoader {
    #[must_use]
    pub fn new(resolver: AssetResolver, registry: DecoderRegistry) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            resolver: Arc::new(resolver),
            registry: Arc::new(registry),
            sender,
            receiver,
            generation: 0,
        }
    }

    /// The generation of the most recent request.
    #[must_use]
    pub fn current_generation(&self) -> u64 {
        self.generation
    }

    /// Starts loading `name` on a background thread and returns the new
    /// request's generation. Any earlier in-flight request is superseded.
    pub fn request(&mut self, name: &str) -> u64 {
        self.generation += 1;
        let generation = self.generation;

        let name = name.to_string();
        let path = self.resolver.resolve(&name);
        let registry = Arc::clone(&self.registry);
        let sender = self.sender.clone();

        log::info!("Loading '{name}' from {} (generation {generation})", path.display());

        thread::spawn(move || {
            let result = registry.decode(&path, &name).map_err(|cause| match cause {
                err @ Error::AssetLoad { .. } => err,
                other => Error::AssetLoad {
                    name: name.clone(),
                    cause: Box::new(other),
                },
            });

            // The receiver may be gone if the loader was dropped mid-load.
            let _ = sender.send(LoadMessage {
                generation,
                name,
                result,
            });
        });

        generation
    }

    /// Drains finished loads, returning the first message belonging to the
    /// live generation. Superseded results are logged and discarded.
    pub fn poll(&mut self) -> Option<LoadMessage> {
        while let Ok(message) = self.receiver.try_recv() {
            if message.generation == self.generation {
                return Some(message);
            }
            log::debug!(
                "Discarding superseded load '{}' (generation {} < {})",
                message.name,
                message.generation,
                self.generation
            );
        }
        None
    }

    /// Invalidates all in-flight requests without starting a new one.
    /// Their results will be discarded when they arrive.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::decoder::ModelDecoder;
    use std::path::Path;
    use std::time::{Duration, Instant};

    struct StubDecoder;

    impl ModelDecoder for StubDecoder {
        fn extensions(&self) -> &[&str] {
            &["stub"]
        }

        fn decode(&self, _path: &Path, name: &str) -> Result<ModelPrefab> {
            Ok(ModelPrefab {
                name: name.to_string(),
                nodes: Vec::new(),
                roots: Vec::new(),
                meshes: Vec::new(),
                skins: Vec::new(),
                clips: Vec::new(),
            })
        }
    }

    fn stub_loader() -> AssetLoader {
        let mut registry = DecoderRegistry::empty();
        registry.register(Box::new(StubDecoder));
        AssetLoader::new(AssetResolver::new("assets"), registry)
    }

    fn poll_until(loader: &mut AssetLoader) -> Option<LoadMessage> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Some(message) = loader.poll() {
                return Some(message);
            }
            thread::sleep(Duration::from_millis(1));
        }
        None
    }

    #[test]
    fn load_completes_and_is_delivered() {
        let mut loader = stub_loader();
        let generation = loader.request("model.stub");

        let message = poll_until(&mut loader).expect("load should complete");
        assert_eq!(message.generation, generation);
        assert_eq!(message.result.unwrap().name, "model.stub");
    }

    #[test]
    fn superseded_request_is_discarded() {
        let mut loader = stub_loader();
        loader.request("first.stub");
        let second = loader.request("second.stub");

        let message = poll_until(&mut loader).expect("live load should complete");
        assert_eq!(message.generation, second);
        assert_eq!(message.name, "second.stub");

        // The first result must never surface.
        thread::sleep(Duration::from_millis(20));
        assert!(loader.poll().is_none());
    }

    #[test]
    fn invalidate_drops_in_flight_results() {
        let mut loader = stub_loader();
        loader.request("model.stub");
        loader.invalidate();

        thread::sleep(Duration::from_millis(20));
        assert!(loader.poll().is_none());
    }

    #[test]
    fn unsupported_format_surfaces_as_asset_load_error() {
        let mut loader = stub_loader();
        loader.request("Samba Dancing");

        let message = poll_until(&mut loader).expect("failure should be delivered");
        let err = message.result.unwrap_err();
        assert!(matches!(err, Error::AssetLoad { ref name, .. } if name == "Samba Dancing"));
    }
}
