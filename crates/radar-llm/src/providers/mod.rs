//! Concrete generation provider implementations

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::{DEFAULT_GEMINI_MODEL, GeminiConfig, GeminiProvider, chunk_stream};
