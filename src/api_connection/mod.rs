pub mod connection;
pub mod endpoints;

pub use connection::{CompletionModel, ModelError, OllamaClient};
