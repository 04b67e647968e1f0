//! Product text preprocessing for an image/text product classifier, plus a client for the
//! remote scoring service.
//!
//! The model behind the service was trained on keyword strings produced by a fixed
//! normalization rule table. This crate reproduces that preprocessing so that requests look
//! like the training data, then ships them with a size-capped JPEG of the product image.
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use prodclass::{PreprocessingPipeline, ProductInput};
//!
//! let pipeline = PreprocessingPipeline::new()?;
//! let product = ProductInput::new("Men's Analog Watch")
//!     .with_brand("Escort")
//!     .with_description("Stainless steel water resistant watch")
//!     .with_specifications(r#"{"key"=>"Display", "value"=>"Analog"}"#);
//!
//! let text = pipeline.prepare(&product);
//! println!("Text sent to the model: {}", text);
//! # Ok(())
//! # }
//! ```
//!
//! # Scoring
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use prodclass::{ClientConfig, PreprocessingPipeline, ProductInput, ScoringClient};
//!
//! let client = ScoringClient::new(ClientConfig::from_env()?, PreprocessingPipeline::new()?)?;
//! let image = std::fs::read("watch.jpg")?;
//! let prediction = client.predict(&image, &ProductInput::new("Analog watch"), None).await?;
//! println!("{} ({:.1}%)", prediction.predicted_category, prediction.confidence * 100.0);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! [`PreprocessingPipeline`] only holds read-only state behind `Arc`s and can be shared
//! across threads with `Arc` or by cloning.

pub mod client;
pub mod config;
pub mod preprocess;

pub use client::{
    interpret_response, AttentionResult, FailureKind, Prediction, PredictionRequest, ScoreError,
    ScoringClient, ServiceStatus,
};
pub use config::{ClientConfig, ConfigError};
pub use preprocess::{
    KeywordExtractor, KeywordList, PipelineBuilder, PreprocessError, PreprocessedText,
    PreprocessingPipeline, ProductInput, SpecBlobParser, SpecEntry, TextNormalizer,
    NO_KEYWORDS_SENTINEL, UNSPECIFIED_BRAND,
};

pub fn init_logger() {
    env_logger::init();
}
