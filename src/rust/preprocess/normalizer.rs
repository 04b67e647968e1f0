use std::sync::Arc;

use log::debug;
use sha2::{Digest, Sha256};

use super::error::PreprocessError;
use super::rules::{compile_rules, NormalizationRule, NORMALIZATION_PASSES};

/// Rewrites raw product text with the training-time rule table.
///
/// The compiled table is shared behind an `Arc`, so clones are cheap and a single
/// normalizer can serve any number of threads.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    rules: Arc<[NormalizationRule]>,
}

impl TextNormalizer {
    /// Compiles the rule table. Fails only if a pattern in the table is invalid.
    pub fn new() -> Result<Self, PreprocessError> {
        let rules = compile_rules()?;
        if rules.is_empty() {
            return Err(PreprocessError::RuleError("Rule table is empty".into()));
        }
        Ok(Self { rules: rules.into() })
    }

    /// Applies every rule in order, [`NORMALIZATION_PASSES`] times, and trims the result.
    ///
    /// # Example
    /// ```
    /// use prodclass::TextNormalizer;
    ///
    /// let normalizer = TextNormalizer::new().unwrap();
    /// assert_eq!(normalizer.normalize("256GB SSD"), "byte solid state drive");
    /// ```
    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let mut text = text.to_string();
        for pass in 0..NORMALIZATION_PASSES {
            for rule in self.rules.iter() {
                text = rule.apply(&text);
            }
            debug!("Normalization pass {} produced {} chars", pass + 1, text.len());
        }
        text.trim().to_string()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// SHA-256 over the ordered (pattern, replacement) table and the pass count.
    ///
    /// Two normalizers with the same fingerprint produce identical output for every input.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update((NORMALIZATION_PASSES as u64).to_le_bytes());
        for rule in self.rules.iter() {
            hasher.update(rule.pattern().as_bytes());
            hasher.update([0u8]);
            hasher.update(rule.replacement().as_bytes());
            hasher.update([0u8]);
        }
        format!("{:x}", hasher.finalize())
    }
}
