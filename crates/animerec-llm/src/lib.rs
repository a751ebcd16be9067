//! # Animerec LLM
//!
//! Text generation for the recommender through any OpenAI-compatible chat
//! completions API.
//!
//! ```rust,no_run
//! use animerec_llm::{LlmConfig, OpenAiClient};
//!
//! let client = OpenAiClient::new(LlmConfig::new("sk-...").with_model("gpt-4o-mini")).unwrap();
//! println!("{}", client.chat("Recommend one short mecha series.").unwrap());
//! ```
pub mod client;
pub mod error;

pub use client::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT, LlmConfig, OpenAiClient};
pub use error::{LlmError, Result};
