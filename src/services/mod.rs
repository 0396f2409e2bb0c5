//! Vendor adapters for local inference servers
//!
//! Every adapter implements [`Vendor`], so hosting code can keep a
//! heterogeneous set of vendors behind `Box<dyn Vendor>`:
//! - LM Studio
//! - Other OpenAI-compatible local servers (llama.cpp server, LocalAI, etc.)

pub mod context;
pub mod lmstudio;

use async_trait::async_trait;
use tokio::sync::mpsc;

pub use self::context::RequestContext;
use crate::{
    error::Result,
    messages::{ChatOptions, Message},
};

/// Capability interface shared by all vendor adapters
#[async_trait]
pub trait Vendor: Send + Sync {
    /// Display label (e.g. "LM Studio")
    fn name(&self) -> &str;

    /// Whether the vendor has the settings it needs to make requests
    fn is_configured(&self) -> bool;

    /// Run the vendor's configure routine
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be initialized
    fn configure(&mut self) -> Result<()>;

    /// Entry point for the generic setup flow
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails
    fn setup(&mut self) -> Result<()> {
        self.configure()
    }

    /// Append the vendor's `ENV=value` lines to `buffer`
    fn fill_env_file_content(&self, buffer: &mut String);

    /// List the model identifiers the server has loaded
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Single-shot chat; returns the assistant reply
    async fn send(
        &self,
        ctx: &RequestContext,
        messages: &[Message],
        options: &ChatOptions,
    ) -> Result<String>;

    /// Streaming chat, delivering text fragments through `channel`
    async fn send_stream(
        &self,
        messages: &[Message],
        options: &ChatOptions,
        channel: mpsc::Sender<String>,
    ) -> Result<()>;

    /// Plain text completion of `prompt`
    async fn complete(
        &self,
        ctx: &RequestContext,
        prompt: &str,
        options: &ChatOptions,
    ) -> Result<String>;

    /// Embedding vector of `input`
    async fn embeddings(
        &self,
        ctx: &RequestContext,
        input: &str,
        options: &ChatOptions,
    ) -> Result<Vec<f64>>;
}
