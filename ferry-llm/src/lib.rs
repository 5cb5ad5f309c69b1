//! Ferry LLM - language model access for repo-ferry
//!
//! Provides a Gemini `generateContent` client that implements
//! [`ferry_core::LanguageModel`].

mod error;
mod gemini;

pub use error::{Error, Result};
pub use gemini::{GeminiClient, GEMINI_API_URL};
