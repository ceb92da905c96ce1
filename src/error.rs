//! Error type for renderer construction and resource creation.
//!
//! Drawing itself is infallible; only setup paths return [`RenderResult`].

use thiserror::Error;

/// Errors raised while creating the renderer or its GPU resources.
#[derive(Error, Debug)]
pub enum RenderError {
    /// A shader stage failed to compile.
    #[error("shader compile error: {0}")]
    ShaderCompile(String),
    /// The shader program failed to link.
    #[error("program link error: {0}")]
    ProgramLink(String),
    /// The graphics device could not create an object (context lost, out of
    /// memory, ...).
    #[error("failed to create {kind}: {message}")]
    ResourceCreation {
        /// What was being created (`"buffer"`, `"texture"`, ...).
        kind: &'static str,
        /// Driver-provided message.
        message: String,
    },
    /// The active shader program has no attribute with this name.
    #[error("vertex attribute `{0}` not found in shader program")]
    MissingAttribute(&'static str),
    /// The batch configuration cannot be honored.
    #[error("invalid batch configuration: {0}")]
    InvalidConfig(String),
    /// Encoded image data could not be decoded.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),
    /// Raw pixel data does not match the declared dimensions.
    #[error("texture data is {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    TextureSize {
        /// Declared width in pixels.
        width: u32,
        /// Declared height in pixels.
        height: u32,
        /// `width * height * 4`.
        expected: usize,
        /// Length of the slice that was passed.
        actual: usize,
    },
    /// More texture slots were requested than the device exposes.
    #[error("{requested} texture slots requested, device supports {available}")]
    TooManyTextureSlots {
        /// Configured slot count.
        requested: u32,
        /// Texture image units available to the fragment stage.
        available: u32,
    },
}

impl RenderError {
    /// Shorthand for [`RenderError::ResourceCreation`].
    pub(crate) fn creation(kind: &'static str, message: impl Into<String>) -> Self {
        Self::ResourceCreation {
            kind,
            message: message.into(),
        }
    }
}

/// Result alias used across the crate.
pub type RenderResult<T> = Result<T, RenderError>;
