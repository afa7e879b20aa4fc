//! Error Types
//!
//! The main error type [`Error`] covers all failure modes of the viewer:
//! GPU initialization, asset loading and decoding, and animation lookups.
//! Public APIs return [`Result<T>`], an alias for `std::result::Result<T, Error>`.

use thiserror::Error;

/// The main error type for the viewer.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // GPU & Windowing Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Window system error.
    #[error("Window system error: {0}")]
    WindowError(#[from] raw_window_handle::HandleError),

    /// Event loop error (winit).
    #[error("Event loop error: {0}")]
    EventLoopError(#[from] winit::error::EventLoopError),

    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// An asset failed to load or decode. Carries the requested asset name
    /// and the underlying cause. Recovered locally: the previously displayed
    /// asset stays attached.
    #[error("Failed to load asset {name:?}: {cause}")]
    AssetLoad {
        /// The asset name as requested through the lifecycle manager.
        name: String,
        /// The underlying I/O or decode failure.
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No decoder is registered for the file extension.
    #[error("No decoder registered for extension {extension:?}")]
    UnsupportedFormat {
        /// The offending file extension (may be empty).
        extension: String,
    },

    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// glTF parsing or decoding error.
    #[error("glTF error: {0}")]
    GltfError(String),

    // ========================================================================
    // Animation Errors
    // ========================================================================
    /// A named clip was requested but is absent from the bound asset.
    #[error("Animation clip not found: {clip:?}")]
    ClipNotFound {
        /// The requested clip name.
        clip: String,
    },

    // ========================================================================
    // Lifecycle Errors
    // ========================================================================
    /// An operation was attempted on a disposed viewer. External signals
    /// arriving after disposal are ignored rather than surfaced; this
    /// variant exists for callers that want to observe the race explicitly.
    #[error("Viewer has been disposed")]
    Disposed,
}

impl From<gltf::Error> for Error {
    fn from(err: gltf::Error) -> Self {
        Error::GltfError(err.to_string())
    }
}

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
