//! LM Studio adapter
//!
//! Talks to the OpenAI-style REST dialect LM Studio serves on
//! `http://localhost:1234/v1`. Any server speaking the same dialect can reuse
//! the adapter through [`LmStudioClient::compatible`].

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header::CONTENT_TYPE, Client, Request, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tracing::debug;

use super::{RequestContext, Vendor};
use crate::{
    config::VendorConfig,
    error::{Operation, Result, VendorError},
    messages::{ChatOptions, Message},
};

/// Custom configure routine producing the shared transport
pub type ConfigureFn = Arc<dyn Fn() -> Result<Client> + Send + Sync>;

/// LM Studio vendor adapter
pub struct LmStudioClient {
    config: VendorConfig,
    api_base_url: usize,
    http: Option<Client>,
    configure_custom: Option<ConfigureFn>,
}

impl LmStudioClient {
    /// Vendor display label
    pub const NAME: &'static str = "LM Studio";

    /// Address LM Studio's local server listens on by default
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:1234/v1";

    /// Create an LM Studio adapter with the default base URL
    #[must_use]
    pub fn new() -> Self {
        Self::compatible(Self::NAME, Self::DEFAULT_BASE_URL, None)
    }

    /// Create an adapter for any server speaking the LM Studio dialect
    ///
    /// Without `configure_custom`, [`Vendor::configure`] builds a plain
    /// `reqwest::Client`.
    #[must_use]
    pub fn compatible(
        vendor_name: &str,
        default_base_url: &str,
        configure_custom: Option<ConfigureFn>,
    ) -> Self {
        let mut config = VendorConfig::new(vendor_name);
        let api_base_url = config.add_setup_question("API Base URL", false);
        config.question_mut(api_base_url).value = default_base_url.to_string();

        Self {
            config,
            api_base_url,
            http: None,
            configure_custom,
        }
    }

    /// Current base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.question(self.api_base_url).value
    }

    /// Replace the base URL
    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.config.question_mut(self.api_base_url).value = base_url.into();
    }

    /// Override settings from `{PREFIX}_*` environment variables
    ///
    /// Returns the number of settings that changed.
    pub fn apply_env(&mut self) -> usize {
        self.config.apply_env()
    }

    fn default_transport(&self) -> Result<Client> {
        Client::builder()
            .build()
            .map_err(|e| VendorError::Configuration {
                vendor: self.config.label().to_string(),
                reason: e.to_string(),
            })
    }

    /// Resolve the transport and the absolute URL of `path`
    fn endpoint(&self, operation: Operation, path: &str) -> Result<(&Client, String)> {
        let base_url = self.base_url();
        if base_url.is_empty() {
            return Err(VendorError::MissingBaseUrl {
                vendor: self.config.label().to_string(),
                operation,
            });
        }

        let http = self.http.as_ref().ok_or_else(|| VendorError::NotConfigured {
            vendor: self.config.label().to_string(),
            operation,
        })?;

        Ok((http, format!("{}/{path}", base_url.trim_end_matches('/'))))
    }

    async fn post_json<B: Serialize + Sync>(
        &self,
        ctx: &RequestContext,
        operation: Operation,
        path: &str,
        body: &B,
    ) -> Result<Bytes> {
        let (http, url) = self.endpoint(operation, path)?;

        let payload =
            serde_json::to_vec(body).map_err(|source| VendorError::Serialize { operation, source })?;

        let request = http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .build()
            .map_err(|source| VendorError::Request { operation, source })?;

        execute(http, ctx, operation, request).await
    }
}

impl Default for LmStudioClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LmStudioClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LmStudioClient")
            .field("config", &self.config)
            .field("transport_ready", &self.http.is_some())
            .field("custom_configure", &self.configure_custom.is_some())
            .finish()
    }
}

#[async_trait]
impl Vendor for LmStudioClient {
    fn name(&self) -> &str {
        self.config.label()
    }

    fn is_configured(&self) -> bool {
        !self.base_url().is_empty()
    }

    fn configure(&mut self) -> Result<()> {
        let client = match &self.configure_custom {
            Some(configure) => configure()?,
            None => self.default_transport()?,
        };
        self.http = Some(client);
        Ok(())
    }

    fn fill_env_file_content(&self, buffer: &mut String) {
        self.config.fill_env_file_content(buffer);
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let operation = Operation::ListModels;
        let (http, url) = self.endpoint(operation, "models")?;

        let request = http
            .get(url)
            .build()
            .map_err(|source| VendorError::Request { operation, source })?;

        let body = execute(http, &RequestContext::new(), operation, request).await?;
        parse_model_list(&body)
    }

    async fn send(
        &self,
        ctx: &RequestContext,
        messages: &[Message],
        options: &ChatOptions,
    ) -> Result<String> {
        let request = ChatRequest {
            messages,
            model: &options.model,
        };
        let body = self
            .post_json(ctx, Operation::Send, "chat/completions", &request)
            .await?;
        parse_chat_response(&body)
    }

    async fn send_stream(
        &self,
        _messages: &[Message],
        _options: &ChatOptions,
        _channel: mpsc::Sender<String>,
    ) -> Result<()> {
        Err(VendorError::Unsupported {
            vendor: self.config.label().to_string(),
            capability: "streaming",
        })
    }

    async fn complete(
        &self,
        ctx: &RequestContext,
        prompt: &str,
        options: &ChatOptions,
    ) -> Result<String> {
        let request = CompletionRequest {
            prompt,
            model: &options.model,
        };
        let body = self
            .post_json(ctx, Operation::Complete, "completions", &request)
            .await?;
        parse_completion_response(&body)
    }

    async fn embeddings(
        &self,
        ctx: &RequestContext,
        input: &str,
        options: &ChatOptions,
    ) -> Result<Vec<f64>> {
        let request = EmbeddingRequest {
            input,
            model: &options.model,
        };
        let body = self
            .post_json(ctx, Operation::Embeddings, "embeddings", &request)
            .await?;
        parse_embedding_response(&body)
    }
}

/// Send `request` under `ctx` and return the body of a 200 response
async fn execute(
    http: &Client,
    ctx: &RequestContext,
    operation: Operation,
    request: Request,
) -> Result<Bytes> {
    debug!(%operation, method = %request.method(), url = %request.url(), "sending request");

    let exchange = async {
        let response = http
            .execute(request)
            .await
            .map_err(|source| VendorError::Http { operation, source })?;

        let status = response.status();
        debug!(%operation, status = status.as_u16(), "received response");
        if status != StatusCode::OK {
            return Err(VendorError::Status {
                operation,
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .await
            .map_err(|source| VendorError::Http { operation, source })
    };

    ctx.run(operation, exchange).await
}

// Response validation

/// Decode `body` as a JSON object into the schema `T`
fn decode<T: DeserializeOwned>(operation: Operation, body: &[u8]) -> Result<T> {
    let object: Map<String, Value> =
        serde_json::from_slice(body).map_err(|source| VendorError::Decode { operation, source })?;
    serde_json::from_value(Value::Object(object))
        .map_err(|source| VendorError::Decode { operation, source })
}

/// Convert a raw schema field into `T`, naming the field on failure
fn require<T: DeserializeOwned>(
    operation: Operation,
    field: &'static str,
    expected: &'static str,
    value: Option<Value>,
) -> Result<T> {
    let value = value.ok_or(VendorError::MissingField { operation, field })?;
    serde_json::from_value(value).map_err(|_| VendorError::InvalidField {
        operation,
        field,
        expected,
    })
}

fn first_choice<T: DeserializeOwned>(operation: Operation, choices: Option<Value>) -> Result<T> {
    let choices: Vec<Value> = require(operation, "choices", "an array", choices)?;
    let first = choices
        .into_iter()
        .next()
        .ok_or(VendorError::EmptyChoices { operation })?;
    require(operation, "choices[0]", "an object", Some(first))
}

pub(crate) fn parse_model_list(body: &[u8]) -> Result<Vec<String>> {
    let operation = Operation::ListModels;
    let list: ModelList = decode(operation, body)?;
    let entries: Vec<ModelEntry> = require(operation, "data", "an array of objects", list.data)?;

    entries
        .into_iter()
        .map(|entry| require(operation, "data[].id", "a string", entry.id))
        .collect()
}

pub(crate) fn parse_chat_response(body: &[u8]) -> Result<String> {
    let operation = Operation::Send;
    let response: ChoicesResponse = decode(operation, body)?;
    let choice: ChatChoice = first_choice(operation, response.choices)?;
    let message: ChatChoiceMessage =
        require(operation, "choices[0].message", "an object", choice.message)?;
    require(operation, "choices[0].message.content", "a string", message.content)
}

pub(crate) fn parse_completion_response(body: &[u8]) -> Result<String> {
    let operation = Operation::Complete;
    let response: ChoicesResponse = decode(operation, body)?;
    let choice: TextChoice = first_choice(operation, response.choices)?;
    require(operation, "choices[0].text", "a string", choice.text)
}

pub(crate) fn parse_embedding_response(body: &[u8]) -> Result<Vec<f64>> {
    let operation = Operation::Embeddings;
    let response: EmbeddingList = decode(operation, body)?;
    let data: Vec<EmbeddingEntry> =
        require(operation, "data", "an array of objects", response.data)?;
    let first = data
        .into_iter()
        .next()
        .ok_or(VendorError::NoEmbeddings { operation })?;
    require(
        operation,
        "data[0].embedding",
        "an array of numbers",
        first.embedding,
    )
}

// LM Studio API types

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: &'a [Message],
    model: &'a str,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    model: &'a str,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    #[serde(default)]
    id: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChoicesResponse {
    #[serde(default)]
    choices: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct TextChoice {
    #[serde(default)]
    text: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingList {
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingEntry {
    #[serde(default)]
    embedding: Option<Value>,
}
