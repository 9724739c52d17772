//! Speech-to-text adapter.
//!
//! [`OpenAiTranscriber`] talks to any service exposing the OpenAI
//! `/audio/transcriptions` endpoint. Calls are single-attempt.

mod config;
mod error;
mod openai;
mod traits;

pub use config::TranscriberConfig;
pub use error::TranscriptionError;
pub use openai::OpenAiTranscriber;
pub use traits::Transcriber;
