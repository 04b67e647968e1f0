use regex::Regex;

use super::error::PreprocessError;

/// Matches one `{"key"=>"K", "value"=>"V"}` entry of a serialized specification list.
const SPEC_ENTRY_PATTERN: &str =
    r#"\{\s*"key"\s*=>\s*"([^"]*)"\s*,\s*"value"\s*=>\s*"([^"]*)"\s*\}"#;

/// A single key/value pair pulled out of a spec blob, already lowercased and trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecEntry {
    pub key: String,
    pub value: String,
}

/// Extracts key/value pairs from the hash-rocket specification strings found in product
/// catalogues, e.g. `{"product_specification"=>[{"key"=>"Color", "value"=>"Red"}]}`.
///
/// The blob is not JSON, so it is scanned for entries rather than deserialized. Anything
/// that does not look like an entry is ignored, which makes parsing total: malformed input
/// yields no entries instead of an error.
#[derive(Debug, Clone)]
pub struct SpecBlobParser {
    entry: Regex,
}

impl SpecBlobParser {
    pub fn new() -> Result<Self, PreprocessError> {
        Ok(Self {
            entry: Regex::new(SPEC_ENTRY_PATTERN)?,
        })
    }

    /// Returns every entry with a non-empty key and value, in blob order.
    pub fn entries(&self, blob: &str) -> Vec<SpecEntry> {
        self.entry
            .captures_iter(blob)
            .filter_map(|caps| {
                let key = caps.get(1)?.as_str().trim().to_lowercase();
                let value = caps.get(2)?.as_str().trim().to_lowercase();
                if key.is_empty() || value.is_empty() {
                    return None;
                }
                Some(SpecEntry { key, value })
            })
            .collect()
    }

    /// Renders the blob as `"k1 v1. k2 v2"`, or an empty string when nothing usable matched.
    pub fn parse(&self, blob: &str) -> String {
        self.entries(blob)
            .iter()
            .map(|entry| format!("{} {}", entry.key, entry.value))
            .collect::<Vec<_>>()
            .join(". ")
    }
}
