//! # jobsage-model
//!
//! Generation backend clients for the jobsage assistant.
//!
//! The crate defines the [`GenerationModel`] trait — a single synchronous
//! (non-streaming) completion call — and [`OllamaClient`], an implementation
//! backed by a local Ollama server's `/api/generate` endpoint.
//!
//! ```rust,ignore
//! use jobsage_model::{GenerationModel, OllamaClient, OllamaConfig};
//!
//! let client = OllamaClient::new(OllamaConfig::default())?;
//! match client.generate("Say hello").await? {
//!     Generation::Text(text) => println!("{text}"),
//!     Generation::Empty => println!("(no answer generated)"),
//! }
//! ```

mod error;
mod ollama;

pub use error::{ModelError, Result};
pub use ollama::{Generation, GenerationModel, OllamaClient, OllamaConfig};
