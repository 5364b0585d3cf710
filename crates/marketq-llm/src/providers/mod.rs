//! Concrete completion provider implementations

mod openai;

pub use openai::{OpenAiConfig, OpenAiProvider};
