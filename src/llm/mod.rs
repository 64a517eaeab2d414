pub mod openai;
pub mod provider;

pub use openai::OpenAiAdapter;
pub use provider::{CompletionProvider, EmbeddingProvider};
