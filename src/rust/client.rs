use std::collections::HashMap;
use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::preprocess::{PreprocessedText, PreprocessingPipeline, ProductInput};

#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("Scoring service unavailable (503): {body}")]
    ServiceUnavailable { body: String },
    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Scoring service reported an error: {0}")]
    Remote(String),
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Connection error: {0}")]
    Transport(reqwest::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl From<reqwest::Error> for ScoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScoreError::Timeout(err.to_string())
        } else {
            ScoreError::Transport(err)
        }
    }
}

/// Coarse failure category shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    ServiceUnavailable,
    HttpError,
    Unexpected,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Timeout => "timeout",
            Self::ServiceUnavailable => "service-unavailable",
            Self::HttpError => "http-error",
            Self::Unexpected => "unexpected",
        };
        f.write_str(label)
    }
}

impl ScoreError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout(_) => FailureKind::Timeout,
            Self::ServiceUnavailable { .. } => FailureKind::ServiceUnavailable,
            Self::Http { .. } => FailureKind::HttpError,
            Self::Remote(_) | Self::MalformedResponse(_) | Self::Transport(_) | Self::Image(_) => {
                FailureKind::Unexpected
            }
        }
    }
}

/// JSON body posted to the scoring endpoint.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PredictionRequest {
    /// Base64 JPEG
    pub image: String,
    pub text: String,
    pub product_keywords: Option<String>,
}

/// Attention payload returned alongside a prediction. Absent fields decode as empty.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AttentionResult {
    pub heatmap: Vec<Vec<f32>>,
    pub keywords: Vec<String>,
    pub keyword_similarities: HashMap<String, f32>,
    pub top_keywords: Vec<(String, f32)>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Prediction {
    pub predicted_category: String,
    /// Always within [0, 1]
    pub confidence: f32,
    #[serde(default)]
    pub category_scores: Option<HashMap<String, f32>>,
    #[serde(default)]
    pub attention_result: Option<AttentionResult>,
    #[serde(default)]
    pub source: Option<String>,
}

impl Prediction {
    /// Category scores, highest first
    pub fn ranked_scores(&self) -> Vec<(&str, f32)> {
        let mut scores: Vec<(&str, f32)> = self
            .category_scores
            .iter()
            .flatten()
            .map(|(label, score)| (label.as_str(), *score))
            .collect();
        scores.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        scores
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceStatus {
    Healthy,
    Unhealthy(u16),
    Unreachable(String),
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Unhealthy(status) => write!(f, "unhealthy (HTTP {})", status),
            Self::Unreachable(msg) => write!(f, "unreachable: {}", msg),
        }
    }
}

/// Client for the remote image/text scoring service.
///
/// Product text always goes through the pipeline before it is sent, so requests carry
/// the same keyword form the model was trained on. Failures are returned as they are;
/// the client never retries and never substitutes a local guess.
#[derive(Debug, Clone)]
pub struct ScoringClient {
    config: ClientConfig,
    pipeline: PreprocessingPipeline,
    http: reqwest::Client,
}

impl ScoringClient {
    pub fn new(config: ClientConfig, pipeline: PreprocessingPipeline) -> Result<Self, ScoreError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, pipeline, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &PreprocessingPipeline {
        &self.pipeline
    }

    /// Converts an encoded image to RGB, caps its longest edge, and returns it as base64 JPEG.
    pub fn prepare_image(&self, bytes: &[u8]) -> Result<String, ScoreError> {
        let rgb = image::load_from_memory(bytes)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        let longest = width.max(height);
        let max_edge = self.config.max_image_edge;

        let rgb = if longest > max_edge {
            let ratio = max_edge as f64 / longest as f64;
            let target_width = ((width as f64 * ratio) as u32).max(1);
            let target_height = ((height as f64 * ratio) as u32).max(1);
            log::debug!(
                "Resizing image {}x{} -> {}x{}",
                width, height, target_width, target_height
            );
            image::imageops::resize(&rgb, target_width, target_height, FilterType::Lanczos3)
        } else {
            rgb
        };

        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, self.config.jpeg_quality).encode_image(&rgb)?;
        Ok(BASE64_STANDARD.encode(&buffer))
    }

    pub fn build_request(
        &self,
        image_bytes: &[u8],
        product: &ProductInput,
        product_keywords: Option<&str>,
    ) -> Result<PredictionRequest, ScoreError> {
        let text = self.pipeline.prepare(product);
        if let PreprocessedText::Raw(_) = text {
            log::warn!("Sending unnormalized product text");
        }
        Ok(PredictionRequest {
            image: self.prepare_image(image_bytes)?,
            text: text.to_string(),
            product_keywords: product_keywords.map(str::to_string),
        })
    }

    /// Preprocesses the product, uploads it with the image, and decodes the prediction.
    pub async fn predict(
        &self,
        image_bytes: &[u8],
        product: &ProductInput,
        product_keywords: Option<&str>,
    ) -> Result<Prediction, ScoreError> {
        let request = self.build_request(image_bytes, product, product_keywords)?;
        log::info!("Requesting prediction with text: {}", request.text);
        self.send(&request).await
    }

    pub async fn send(&self, request: &PredictionRequest) -> Result<Prediction, ScoreError> {
        let mut builder = self.http.post(&self.config.endpoint_url).json(request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let result = async {
            let response = builder.send().await?;
            let status = response.status();
            let body = response.text().await?;
            log::debug!("Scoring response status: {}", status);
            interpret_response(status, &body)
        }
        .await;

        if let Err(e) = &result {
            log::error!("Prediction failed ({}): {}", e.kind(), e);
        }
        result
    }

    /// Probes the service's health endpoint.
    pub async fn service_status(&self) -> ServiceStatus {
        let url = self.config.health_url();
        log::info!("Checking service health at {}", url);
        match self
            .http
            .get(&url)
            .timeout(self.config.health_timeout)
            .send()
            .await
        {
            Ok(response) if response.status() == StatusCode::OK => ServiceStatus::Healthy,
            Ok(response) => ServiceStatus::Unhealthy(response.status().as_u16()),
            Err(e) => ServiceStatus::Unreachable(e.to_string()),
        }
    }
}

/// Maps a scoring response to a prediction or a structured failure.
pub fn interpret_response(status: StatusCode, body: &str) -> Result<Prediction, ScoreError> {
    match status {
        StatusCode::OK => parse_prediction(body),
        StatusCode::SERVICE_UNAVAILABLE => Err(ScoreError::ServiceUnavailable {
            body: body.to_string(),
        }),
        other => Err(ScoreError::Http {
            status: other.as_u16(),
            body: body.to_string(),
        }),
    }
}

fn parse_prediction(body: &str) -> Result<Prediction, ScoreError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ScoreError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    if value.get("predicted_category").is_none() {
        if let Some(err) = value.get("error") {
            let msg = err.as_str().map(str::to_string).unwrap_or_else(|| err.to_string());
            return Err(ScoreError::Remote(msg));
        }
        return Err(ScoreError::MalformedResponse("missing predicted_category".into()));
    }

    let prediction: Prediction =
        serde_json::from_value(value).map_err(|e| ScoreError::MalformedResponse(e.to_string()))?;
    if !(0.0..=1.0).contains(&prediction.confidence) {
        return Err(ScoreError::MalformedResponse(format!(
            "confidence {} outside [0, 1]",
            prediction.confidence
        )));
    }
    Ok(prediction)
}
