mod error;
mod keywords;
mod normalizer;
mod pipeline;
pub mod rules;
mod spec_blob;

pub use error::PreprocessError;
pub use keywords::{
    is_stopword, KeywordExtractor, KeywordList, DEFAULT_MAX_KEYWORDS, DEFAULT_MIN_TOKEN_LEN,
};
pub use normalizer::TextNormalizer;
pub use pipeline::{
    PipelineBuilder, PreprocessedText, PreprocessingPipeline, ProductInput, NO_KEYWORDS_SENTINEL,
    UNSPECIFIED_BRAND,
};
pub use rules::{NormalizationRule, NORMALIZATION_PASSES};
pub use spec_blob::{SpecBlobParser, SpecEntry};
