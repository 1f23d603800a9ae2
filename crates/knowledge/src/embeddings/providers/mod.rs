pub mod ollama;
pub mod openai;
pub mod trigram;

pub use ollama::OllamaProvider;
pub use openai::OpenAIProvider;
pub use trigram::TrigramProvider;
