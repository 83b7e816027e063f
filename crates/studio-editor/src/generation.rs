//! Image generation: request/response wire types, the client seam and the
//! studio-side request state.
//!
//! The request is the only asynchronous step in the editor. `Studio` splits
//! it into `begin_generation` (validate, mark busy) and `finish_generation`
//! (insert the layer or record the error) so the document is only ever
//! touched synchronously.

use crate::config::GenerationConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use studio_core::NewLayer;
use thiserror::Error;
use url::Url;

/// Size used when the service does not report one.
pub const DEFAULT_IMAGE_SIZE: f64 = 1024.0;

/// Characters of the prompt kept in the generated layer's name.
const NAME_PROMPT_CHARS: usize = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    #[default]
    Med,
    High,
}

// ─── Wire format ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub user_prompt: String,
    pub creative_mode: String,
    pub context: String,
    pub modifiers: BTreeMap<String, String>,
    pub quality: Quality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub url: String,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationMetadata {
    pub prompt_used: String,
    pub seed: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub images: Vec<GeneratedImage>,
    #[serde(default)]
    pub metadata: GenerationMetadata,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("a generation request is already in progress")]
    Busy,

    #[error("creative mode, context and prompt are required")]
    MissingInput,

    #[error("invalid generation endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Service { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Pull a human-readable message out of a failed response body: the
/// `detail` field, else `error`, else a generic message.
pub fn service_error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| v.get("detail").or_else(|| v.get("error")))
        .filter(|v| !v.is_null())
        .map(|v| match v.as_str() {
            Some(s) => s.to_string(),
            None => v.to_string(),
        })
        .unwrap_or_else(|| "image generation failed".to_string())
}

// ─── Client seam ─────────────────────────────────────────────────────────

#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError>;
}

/// JSON-over-HTTP client for the generation service.
#[derive(Debug, Clone)]
pub struct HttpGenerationClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpGenerationClient {
    pub fn new(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let endpoint = Url::parse(&config.endpoint)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        log::debug!("POST {} ({:?} quality)", self.endpoint, request.quality);
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GenerationError::Service {
                status: status.as_u16(),
                message: service_error_message(&body),
            });
        }
        serde_json::from_str(&body).map_err(|e| GenerationError::Malformed(e.to_string()))
    }
}

// ─── Studio-side state ───────────────────────────────────────────────────

/// Inputs and status of the generation panel. Not historized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationState {
    pub prompt: String,
    pub creative_mode: Option<String>,
    pub context: Option<String>,
    pub modifiers: BTreeMap<String, String>,
    pub quality: Quality,

    pub is_generating: bool,
    /// Display message of the last failure, cleared when a request starts.
    pub error: Option<String>,
    /// Every image returned by the last successful request.
    pub variations: Vec<GeneratedImage>,
    pub selected_variation: Option<usize>,
}

impl GenerationState {
    pub fn set_modifier(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.modifiers.insert(key.into(), value.into());
    }

    pub fn remove_modifier(&mut self, key: &str) {
        self.modifiers.remove(key);
    }

    /// Build the wire request, or `MissingInput` if prompt, mode or context
    /// is empty.
    pub fn request(&self) -> Result<GenerationRequest, GenerationError> {
        let present = |s: &Option<String>| {
            s.as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string)
        };
        let (Some(creative_mode), Some(context)) =
            (present(&self.creative_mode), present(&self.context))
        else {
            return Err(GenerationError::MissingInput);
        };
        if self.prompt.trim().is_empty() {
            return Err(GenerationError::MissingInput);
        }
        Ok(GenerationRequest {
            user_prompt: self.prompt.clone(),
            creative_mode,
            context,
            modifiers: self.modifiers.clone(),
            quality: self.quality,
        })
    }
}

/// Layer description for a generated image.
pub fn generated_layer(prompt: &str, image: &GeneratedImage) -> NewLayer {
    let head: String = prompt.chars().take(NAME_PROMPT_CHARS).collect();
    NewLayer::image(image.url.clone())
        .named(format!("AI: {head}..."))
        .at(50.0, 50.0)
        .sized(
            image.width.unwrap_or(DEFAULT_IMAGE_SIZE),
            image.height.unwrap_or(DEFAULT_IMAGE_SIZE),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filled() -> GenerationState {
        GenerationState {
            prompt: "a red bicycle leaning on a brick wall".into(),
            creative_mode: Some("Product".into()),
            context: Some("Studio Photography".into()),
            ..GenerationState::default()
        }
    }

    #[test]
    fn request_serializes_wire_fields() {
        let mut state = filled();
        state.set_modifier("Style", "Noir");
        state.quality = Quality::High;
        let json = serde_json::to_value(state.request().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "user_prompt": "a red bicycle leaning on a brick wall",
                "creative_mode": "Product",
                "context": "Studio Photography",
                "modifiers": { "Style": "Noir" },
                "quality": "high",
            })
        );
    }

    #[test]
    fn request_requires_all_inputs() {
        let mut state = filled();
        state.context = None;
        assert!(matches!(state.request(), Err(GenerationError::MissingInput)));
        let mut state = filled();
        state.prompt = "   ".into();
        assert!(matches!(state.request(), Err(GenerationError::MissingInput)));
    }

    #[test]
    fn response_sizes_are_optional() {
        let response: GenerationResponse = serde_json::from_str(
            r#"{ "images": [{ "url": "https://cdn/x.png" }], "metadata": { "prompt_used": "{}" } }"#,
        )
        .unwrap();
        let layer = generated_layer("short", &response.images[0]);
        assert_eq!(layer.width, Some(1024.0));
        assert_eq!(layer.name.as_deref(), Some("AI: short..."));
        assert_eq!(response.metadata.seed, None);
    }

    #[test]
    fn layer_name_truncates_prompt() {
        let image = GeneratedImage {
            url: "u".into(),
            width: Some(640.0),
            height: Some(480.0),
        };
        let layer = generated_layer("a red bicycle leaning on a brick wall", &image);
        assert_eq!(layer.name.as_deref(), Some("AI: a red bicycle leanin..."));
        assert_eq!((layer.x, layer.y), (Some(50.0), Some(50.0)));
        assert_eq!((layer.width, layer.height), (Some(640.0), Some(480.0)));
    }

    #[test]
    fn error_message_prefers_detail() {
        assert_eq!(
            service_error_message(r#"{"detail": "quota exceeded", "error": "x"}"#),
            "quota exceeded"
        );
        assert_eq!(service_error_message(r#"{"error": "bad prompt"}"#), "bad prompt");
        assert_eq!(service_error_message("<html>502</html>"), "image generation failed");
        assert_eq!(
            service_error_message(r#"{"detail": [{"loc": "quality"}]}"#),
            r#"[{"loc":"quality"}]"#
        );
    }

    #[test]
    fn http_client_rejects_bad_endpoint() {
        let config = GenerationConfig {
            endpoint: "not a url".into(),
            ..GenerationConfig::default()
        };
        assert!(matches!(
            HttpGenerationClient::new(&config),
            Err(GenerationError::Endpoint(_))
        ));
    }
}
