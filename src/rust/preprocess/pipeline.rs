use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use log::{debug, info, warn};

use super::error::PreprocessError;
use super::keywords::{KeywordExtractor, KeywordList, DEFAULT_MAX_KEYWORDS, DEFAULT_MIN_TOKEN_LEN};
use super::normalizer::TextNormalizer;
use super::spec_blob::SpecBlobParser;

/// Sent to the model when extraction ran and found nothing.
pub const NO_KEYWORDS_SENTINEL: &str = "no_keywords_found";

/// Brand value the dashboard fills in when the catalogue has no brand.
pub const UNSPECIFIED_BRAND: &str = "Marque non spécifiée";

/// Raw product fields as entered by the user or read from the catalogue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductInput {
    pub brand: Option<String>,
    pub name: String,
    pub description: String,
    pub specifications: String,
}

impl ProductInput {
    /// Creates an input with only a product name set
    ///
    /// # Example
    /// ```
    /// use prodclass::ProductInput;
    ///
    /// let product = ProductInput::new("Men's Analog Watch")
    ///     .with_brand("Escort")
    ///     .with_description("Stainless steel water resistant watch")
    ///     .with_specifications(r#"{"key"=>"Display", "value"=>"Analog"}"#);
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_specifications(mut self, specifications: impl Into<String>) -> Self {
        self.specifications = specifications.into();
        self
    }
}

/// The text field of an outbound prediction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreprocessedText {
    /// Keywords extracted from the normalized text
    Keywords(KeywordList),
    /// Extraction ran and kept nothing
    NoKeywords,
    /// Preprocessing failed; the raw product fields are sent instead
    Raw(String),
}

impl PreprocessedText {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Raw(_))
    }

    pub fn keywords(&self) -> Option<&KeywordList> {
        match self {
            Self::Keywords(keywords) => Some(keywords),
            _ => None,
        }
    }
}

impl fmt::Display for PreprocessedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keywords(keywords) => write!(f, "{}", keywords),
            Self::NoKeywords => f.write_str(NO_KEYWORDS_SENTINEL),
            Self::Raw(text) => f.write_str(text),
        }
    }
}

/// Turns [`ProductInput`] into the keyword string the remote model was trained on.
///
/// The pipeline holds only read-only, shared state, so it can be cloned freely or wrapped
/// in an `Arc` and used from several threads. Every call to [`prepare`](Self::prepare) is a
/// pure function of its input.
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use prodclass::{PreprocessingPipeline, ProductInput};
///
/// let pipeline = PreprocessingPipeline::new()?;
/// let product = ProductInput::new("Men's Analog Watch")
///     .with_brand("Escort")
///     .with_description("Stainless steel water resistant watch");
///
/// let text = pipeline.prepare(&product);
/// assert!(text.to_string().starts_with("watch, men, analog"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PreprocessingPipeline {
    spec_parser: SpecBlobParser,
    normalizer: TextNormalizer,
    extractor: KeywordExtractor,
    unspecified_brand: String,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<PreprocessingPipeline>();
    }
};

impl PreprocessingPipeline {
    /// Builds a pipeline with the default settings
    pub fn new() -> Result<Self, PreprocessError> {
        PipelineBuilder::new().build()
    }

    /// Creates a new PipelineBuilder for fluent construction
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    pub fn extractor(&self) -> &KeywordExtractor {
        &self.extractor
    }

    pub fn fingerprint(&self) -> String {
        self.normalizer.fingerprint()
    }

    fn brand_segment<'a>(&self, brand: Option<&'a str>) -> Option<&'a str> {
        let brand = brand?.trim();
        if brand.is_empty() || brand.to_lowercase() == self.unspecified_brand {
            return None;
        }
        Some(brand)
    }

    /// Assembles the combined text, `name. [brand. ]specs. description`, lowercased.
    ///
    /// Specifications are parsed as a spec blob first and used verbatim when the blob
    /// yields no entries. Empty segments are skipped.
    pub fn assemble(&self, product: &ProductInput) -> String {
        let parsed_specs = self.spec_parser.parse(&product.specifications);
        let specs = if parsed_specs.is_empty() {
            product.specifications.trim().to_string()
        } else {
            parsed_specs
        };

        let segments = [
            Some(product.name.trim()),
            self.brand_segment(product.brand.as_deref()),
            Some(specs.as_str()),
            Some(product.description.trim()),
        ];

        segments
            .into_iter()
            .flatten()
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join(". ")
            .to_lowercase()
    }

    /// Assembles and normalizes the product text without extracting keywords.
    pub fn normalize(&self, product: &ProductInput) -> String {
        self.normalizer.normalize(&self.assemble(product))
    }

    fn run(&self, product: &ProductInput) -> PreprocessedText {
        let normalized = self.normalize(product);
        debug!("Normalized text: {}", normalized);

        let keywords = self.extractor.extract(&normalized);
        if keywords.is_empty() {
            return PreprocessedText::NoKeywords;
        }
        PreprocessedText::Keywords(keywords)
    }

    /// Runs the whole pipeline, reporting a failed step instead of degrading.
    ///
    /// Input of any length is processed in full; the keyword cap bounds the output.
    pub fn try_prepare(&self, product: &ProductInput) -> Result<PreprocessedText, PreprocessError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.run(product)))
            .map_err(|payload| PreprocessError::StepFailed(panic_message(&*payload)))
    }

    /// Produces the text sent to the model. Never fails.
    ///
    /// If a step fails the raw product fields are returned as
    /// [`PreprocessedText::Raw`] so a prediction can still be requested.
    pub fn prepare(&self, product: &ProductInput) -> PreprocessedText {
        Self::or_raw(product, self.try_prepare(product))
    }

    fn or_raw(
        product: &ProductInput,
        result: Result<PreprocessedText, PreprocessError>,
    ) -> PreprocessedText {
        match result {
            Ok(text) => text,
            Err(e) => {
                warn!("Preprocessing failed, sending raw product text: {}", e);
                Self::raw_fallback(product)
            }
        }
    }

    fn raw_fallback(product: &ProductInput) -> PreprocessedText {
        let raw = [
            product.name.as_str(),
            product.brand.as_deref().unwrap_or_default(),
            product.specifications.as_str(),
            product.description.as_str(),
        ]
        .iter()
        .map(|field| field.trim())
        .filter(|field| !field.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        if raw.is_empty() {
            PreprocessedText::NoKeywords
        } else {
            PreprocessedText::Raw(raw)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// A builder for constructing a [`PreprocessingPipeline`].
///
/// The defaults match the settings the model was trained with; change them only for
/// a model trained with different ones.
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    max_keywords: usize,
    min_token_len: usize,
    unspecified_brand: String,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            max_keywords: DEFAULT_MAX_KEYWORDS,
            min_token_len: DEFAULT_MIN_TOKEN_LEN,
            unspecified_brand: UNSPECIFIED_BRAND.to_string(),
        }
    }

    pub fn with_max_keywords(mut self, max_keywords: usize) -> Self {
        self.max_keywords = max_keywords;
        self
    }

    pub fn with_min_token_len(mut self, min_token_len: usize) -> Self {
        self.min_token_len = min_token_len;
        self
    }

    /// Brand value treated as "no brand"; compared case-insensitively after trimming
    pub fn with_unspecified_brand(mut self, brand: impl Into<String>) -> Self {
        self.unspecified_brand = brand.into();
        self
    }

    /// Compiles the rules and returns the pipeline
    ///
    /// # Returns
    /// * `Result<PreprocessingPipeline, PreprocessError>` - The pipeline, or an error if:
    ///   - `max_keywords` or `min_token_len` is zero
    ///   - A rule or the spec entry pattern fails to compile
    pub fn build(self) -> Result<PreprocessingPipeline, PreprocessError> {
        if self.max_keywords == 0 {
            return Err(PreprocessError::ValidationError("max_keywords must be at least 1".into()));
        }
        if self.min_token_len == 0 {
            return Err(PreprocessError::ValidationError("min_token_len must be at least 1".into()));
        }

        let normalizer = TextNormalizer::new()?;
        let spec_parser = SpecBlobParser::new()?;
        info!(
            "Preprocessing pipeline ready: {} rules, fingerprint {}",
            normalizer.rule_count(),
            normalizer.fingerprint()
        );

        Ok(PreprocessingPipeline {
            spec_parser,
            normalizer,
            extractor: KeywordExtractor::new(self.max_keywords, self.min_token_len),
            unspecified_brand: self.unspecified_brand.trim().to_lowercase(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> PreprocessingPipeline {
        PreprocessingPipeline::new().unwrap()
    }

    #[test]
    fn test_assembly_order() {
        let product = ProductInput::new("Shirt")
            .with_brand("Acme")
            .with_description("Cotton shirt")
            .with_specifications(r#"{"key"=>"Fit", "value"=>"Slim"}"#);
        assert_eq!(pipeline().assemble(&product), "shirt. acme. fit slim. cotton shirt");
    }

    #[test]
    fn test_unspecified_brand_omitted() {
        let product = ProductInput::new("Shirt")
            .with_brand("  marque NON spécifiée ")
            .with_description("Cotton shirt")
            .with_specifications("Slim fit");
        let combined = pipeline().assemble(&product);
        assert_eq!(combined, "shirt. slim fit. cotton shirt");
        assert!(!combined.contains(". ."));
        assert!(!combined.contains(".."));
    }

    #[test]
    fn test_raw_specs_fallback() {
        let product = ProductInput::new("Phone").with_specifications("6.1 inch, 128GB");
        assert_eq!(pipeline().assemble(&product), "phone. 6.1 inch, 128gb");
    }

    #[test]
    fn test_builder_validation() {
        assert!(PreprocessingPipeline::builder().with_max_keywords(0).build().is_err());
        assert!(PreprocessingPipeline::builder().with_min_token_len(0).build().is_err());
    }

    #[test]
    fn test_long_input_is_fully_processed() {
        let product = ProductInput::new("Watch")
            .with_description("stainless steel analog watch ".repeat(3500));
        assert!(pipeline().assemble(&product).chars().count() > 100_000);

        let text = pipeline().try_prepare(&product).unwrap();
        assert!(!text.is_degraded());
        assert_eq!(text.to_string(), "watch, stainless, steel, analog");
    }

    #[test]
    fn test_failed_step_degrades_to_raw() {
        let product = ProductInput::new(" Analog watch ").with_brand("Escort");
        let failure = Err(PreprocessError::StepFailed("boom".into()));

        let text = PreprocessingPipeline::or_raw(&product, failure);
        assert!(text.is_degraded());
        assert_eq!(text.to_string(), "Analog watch Escort");

        let empty = Err(PreprocessError::StepFailed("boom".into()));
        let text = PreprocessingPipeline::or_raw(&ProductInput::default(), empty);
        assert_eq!(text, PreprocessedText::NoKeywords);
    }

    #[test]
    fn test_panic_message() {
        let payload = panic::catch_unwind(|| panic!("bad rule {}", 7)).unwrap_err();
        assert_eq!(panic_message(&*payload), "bad rule 7");

        let payload = panic::catch_unwind(|| panic!("static")).unwrap_err();
        assert_eq!(panic_message(&*payload), "static");
    }

    #[test]
    fn test_empty_product() {
        let text = pipeline().prepare(&ProductInput::default());
        assert_eq!(text, PreprocessedText::NoKeywords);
        assert_eq!(text.to_string(), NO_KEYWORDS_SENTINEL);
    }
}
