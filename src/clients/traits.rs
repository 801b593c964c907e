use async_trait::async_trait;
use thiserror::Error;

/// Failures from the generation backend. All of these are transient from the
/// pipeline's point of view: the engine retries the generation step once.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("provider returned an empty response")]
    Empty,
}

/// The generation capability: a prompt in, raw model text out. The text is
/// untrusted; parsing and contract validation happen in the caller.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;

    /// Model name for logging.
    fn model(&self) -> &str;
}
