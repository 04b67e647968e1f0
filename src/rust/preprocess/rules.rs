//! The ordered rewrite table used to normalize product text.
//!
//! Every entry is matched case-insensitively and its replacement is inserted literally.
//! Order is significant: several rules consume text produced by earlier ones (unit phrases
//! turned into words, words turned into phrases), and the final whitespace rule must stay
//! last. The table is the same one the remote model's training data went through, so
//! entries must not be reordered, merged, or "fixed" without retraining.

use regex::{NoExpand, Regex, RegexBuilder};

use super::error::PreprocessError;

/// Number of times the whole table is applied.
pub const NORMALIZATION_PASSES: usize = 2;

/// (pattern, replacement) pairs in application order.
pub const RULE_TABLE: &[(&str, &str)] = &[
    // Punctuation spacing
    (r"\(", " ( "),
    (r"\)", " ) "),
    (r"\.", " . "),
    (r"!", " ! "),
    (r"\?", " ? "),
    (r":", " : "),
    (r",", ", "),
    // Baby care
    (r"\b(\d+)\s*[-~to]?\s*(\d+)\s*(m|mth|mths|month|months?)\b", "month"),
    (r"\bnewborn\s*[-~to]?\s*(\d+)\s*(m|mth|months?)\b", "month"),
    (r"\b(nb|newborn|baby|bb|bby|babie|babies)\b", "baby"),
    (r"\b(diaper|diapr|nappy)\b", "diaper"),
    (r"\b(stroller|pram|buggy)\b", "stroller"),
    (r"\b(bpa\s*free|non\s*bpa)\b", "bisphenol a free"),
    (r"\b(\d+)\s*(oz|ounce)\b", "ounce"),
    // Computer hardware
    (r"\b(rtx\s*\d+)\b", "ray tracing graphics"),
    (r"\b(gtx\s*\d+)\b", "geforce graphics"),
    (r"\bnvidia\b", "nvidia"),
    (r"\b(amd\s*radeon\s*rx\s*\d+)\b", "amd radeon graphics"),
    (r"\b(intel\s*(core|xeon)\s*[i\d-]+)\b", "intel processor"),
    (r"\b(amd\s*ryzen\s*[\d]+)\b", "amd ryzen processor"),
    (r"\bssd\b", "solid state drive"),
    (r"\bhdd\b", "hard disk drive"),
    (r"\bwifi\s*([0-9])\b", "wi-fi standard"),
    (r"\bbluetooth\s*(\d\.\d)\b", "bluetooth version"),
    (r"\bethernet\b", "ethernet"),
    (r"\bfhd\b", "full high definition"),
    (r"\buhd\b", "ultra high definition"),
    (r"\bqhd\b", "quad high definition"),
    (r"\boled\b", "organic light emitting diode"),
    (r"\bips\b", "in-plane switching"),
    (r"\bram\b", "random access memory"),
    (r"\bcpu\b", "central processing unit"),
    (r"\bgpu\b", "graphics processing unit"),
    (r"\bhdmi\b", "high definition multimedia interface"),
    (r"\busb\s*([a-z0-9]*)\b", "universal serial bus"),
    (r"\brgb\b", "red green blue"),
    // Appliances
    (r"\bfridge\b", "refrigerator"),
    (r"\bwashing\s*machine\b", "clothes washer"),
    (r"\bdishwasher\b", "dish washing machine"),
    (r"\boven\b", "cooking oven"),
    (r"\bmicrowave\b", "microwave oven"),
    (r"\bhoover\b", "vacuum cleaner"),
    (r"\btumble\s*dryer\b", "clothes dryer"),
    (r"\b(a\+\++)\b", "energy efficiency class"),
    (r"\b(\d+)\s*btu\b", "british thermal unit"),
    // Textiles and materials
    (r"\bpoly\b", "polyester"),
    (r"\bacrylic\b", "acrylic fiber"),
    (r"\bnylon\b", "nylon fiber"),
    (r"\bspandex\b", "spandex fiber"),
    (r"\blycra\b", "lycra fiber"),
    (r"\bpvc\b", "polyvinyl chloride"),
    (r"\bvinyl\b", "vinyl material"),
    (r"\bstainless\s*steel\b", "stainless steel"),
    (r"\baluminum\b", "aluminum metal"),
    (r"\bplexiglass\b", "acrylic glass"),
    (r"\bpu\s*leather\b", "polyurethane leather"),
    (r"\bsynthetic\s*leather\b", "synthetic leather"),
    (r"\bfaux\s*leather\b", "faux leather"),
    (r"\bwaterproof\b", "water resistant"),
    (r"\bbreathable\b", "air permeable"),
    (r"\bwrinkle-free\b", "wrinkle resistant"),
    // Cosmetics
    (r"\bSPF\b", "sun protection factor"),
    (r"\bUV\b", "ultraviolet"),
    (r"\bBB\s*cream\b", "blemish balm cream"),
    (r"\bCC\s*cream\b", "color correcting cream"),
    (r"\bHA\b", "hyaluronic acid"),
    (r"\bAHA\b", "alpha hydroxy acid"),
    (r"\bBHA\b", "beta hydroxy acid"),
    (r"\bPHA\b", "polyhydroxy acid"),
    (r"\bNMF\b", "natural moisturizing factor"),
    (r"\bEGF\b", "epidermal growth factor"),
    (r"\bVit\s*C\b", "vitamin c"),
    (r"\bVit\s*E\b", "vitamin e"),
    (r"\bVit\s*B3\b", "niacinamide vitamin b3"),
    (r"\bVit\s*B5\b", "panthenol vitamin b5"),
    (r"\bSOD\b", "superoxide dismutase"),
    (r"\bQ10\b", "coenzyme q10"),
    (r"\bFoam\s*cl\b", "foam cleanser"),
    (r"\bMic\s*H2O\b", "micellar water"),
    (r"\bToner\b", "skin toner"),
    (r"\bEssence\b", "skin essence"),
    (r"\bAmpoule\b", "concentrated serum"),
    (r"\bCF\b", "cruelty free"),
    (r"\bPF\b", "paraben free"),
    (r"\bSF\b", "sulfate free"),
    (r"\bGF\b", "gluten free"),
    (r"\bHF\b", "hypoallergenic formula"),
    (r"\bNT\b", "non-comedogenic tested"),
    (r"\bAM\b", "morning"),
    (r"\bPM\b", "night"),
    (r"\bBID\b", "twice daily"),
    (r"\bQD\b", "once daily"),
    (r"\bAIR\b", "airless pump bottle"),
    (r"\bD-C\b", "dropper container"),
    (r"\bT-C\b", "tube container"),
    (r"\bPDO\b", "polydioxanone"),
    (r"\bPCL\b", "polycaprolactone"),
    (r"\bPLLA\b", "poly-l-lactic acid"),
    (r"\bHIFU\b", "high-intensity focused ultrasound"),
    (r"\b(\d+)\s*fl\s*oz\b", "fluid ounce"),
    (r"\bpH\s*bal\b", "ph balanced"),
    // Units
    (r"\b(\d+)\s*(gb|tb|mb|go|to|mo)\b", "byte"),
    (r"\boctet\b", "byte"),
    (r"\b(\d+)\s*y\b", "year"),
    (r"\b(\d+)\s*mth\b", "month"),
    (r"\b(\d+)\s*d\b", "day"),
    (r"\b(\d+)\s*h\b", "hour"),
    (r"\b(\d+)\s*min\b", "minute"),
    (r"\b(\d+)\s*rpm\b", "revolution per minute"),
    (r"\b(\d+)\s*(mw|cw|kw)\b", "watt"),
    (r"\b(\d+)\s*(ma|ca|ka)\b", "ampere"),
    (r"\b(\d+)\s*(mv|cv|kv)\b", "volt"),
    (r"\b(\d+)\s*(mm|cm|m|km)\b", "meter"),
    (r"\binch\b", "meter"),
    (r"\b(\d+)\s*(ml|cl|dl|l|oz|gal)\b", "liter"),
    (r"\b(gallon|ounce)\b", "liter"),
    (r"\b(\d+)\s*(mg|cg|dg|g|kg|lb)\b", "gram"),
    (r"\bpound\b", "gram"),
    (r"\b(\d+)\s*(°c|°f)\b", "celsius"),
    (r"\bfahrenheit\b", "celsius"),
    // Boilerplate
    (r"\bflipkart\.com\b", ""),
    (r"\bapprox\.?\b", "approximately"),
    (r"\bw/o\b", "without"),
    (r"\bw/\b", "with"),
    (r"\bant-\b", "anti"),
    (r"\byes\b", ""),
    (r"\bno\b", ""),
    (r"\bna\b", ""),
    (r"\brs\.?\b", ""),
    // Whitespace, always last
    (r"\s+", " "),
];

/// One compiled entry of [`RULE_TABLE`].
#[derive(Debug, Clone)]
pub struct NormalizationRule {
    pattern: Regex,
    replacement: &'static str,
}

impl NormalizationRule {
    pub fn compile(pattern: &str, replacement: &'static str) -> Result<Self, PreprocessError> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                PreprocessError::RuleError(format!("invalid pattern {:?}: {}", pattern, e))
            })?;
        Ok(Self { pattern, replacement })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn replacement(&self) -> &'static str {
        self.replacement
    }

    /// Replaces every non-overlapping match. Returns the input untouched when nothing matches.
    pub fn apply(&self, text: &str) -> String {
        self.pattern.replace_all(text, NoExpand(self.replacement)).into_owned()
    }
}

/// Compiles the full table in order.
pub fn compile_rules() -> Result<Vec<NormalizationRule>, PreprocessError> {
    RULE_TABLE
        .iter()
        .map(|&(pattern, replacement)| NormalizationRule::compile(pattern, replacement))
        .collect()
}
