mod assets;
mod provider;

pub mod completion;
pub mod config;
pub mod model;
pub mod ocr;
pub mod session;
pub mod summary;
pub mod text;
pub mod web;

#[cfg(test)]
mod test_utils;

pub use crate::assets::get_data_dir;
pub use crate::provider::llm::get_completion_llm;
pub use crate::provider::ollama::{DEFAULT_OLLAMA_HOST, OllamaModel};
