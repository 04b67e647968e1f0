use env_logger::{Builder, Env};
use prodclass::{
    KeywordExtractor, PreprocessedText, PreprocessingPipeline, ProductInput, SpecBlobParser,
    TextNormalizer, NO_KEYWORDS_SENTINEL, UNSPECIFIED_BRAND,
};
use std::sync::Arc;
use std::thread;

fn init() {
    let _ = Builder::from_env(Env::default().default_filter_or("warn")).try_init();
}

fn watch_product() -> ProductInput {
    ProductInput::new("Men's Analog Watch")
        .with_brand("Escort")
        .with_description("Stainless steel water resistant watch")
        .with_specifications(r#"{"key"=>"Display", "value"=>"Analog"}"#)
}

#[test]
fn test_end_to_end_watch() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let pipeline = PreprocessingPipeline::new()?;
    let product = watch_product();

    let normalized = pipeline.normalize(&product);
    assert!(normalized.contains("stainless steel"));
    for token in ["analog", "resistant"] {
        assert!(normalized.split_whitespace().any(|t| t == token), "missing {}", token);
    }

    let text = pipeline.prepare(&product);
    let keywords = text.keywords().expect("keywords extracted");
    for expected in ["watch", "steel", "analog", "resistant", "escort"] {
        assert!(keywords.contains(expected), "missing keyword {}", expected);
    }
    // analog and watch occur twice, the rest once in order of appearance
    assert_eq!(
        text.to_string(),
        "analog, watch, men, escort, display, stainless, steel, water, resistant"
    );
    Ok(())
}

#[test]
fn test_deterministic() -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = PreprocessingPipeline::new()?;
    let product = watch_product();
    let first = pipeline.prepare(&product);
    for _ in 0..10 {
        assert_eq!(pipeline.prepare(&product), first);
    }
    // A separately built pipeline agrees too
    assert_eq!(PreprocessingPipeline::new()?.prepare(&product), first);
    Ok(())
}

#[test]
fn test_normalizer_fixed_point() -> Result<(), Box<dyn std::error::Error>> {
    let normalizer = TextNormalizer::new()?;
    let pipeline = PreprocessingPipeline::new()?;
    let once = pipeline.normalize(&watch_product());
    assert_eq!(normalizer.normalize(&once), once);
    Ok(())
}

#[test]
fn test_spec_blob() -> Result<(), Box<dyn std::error::Error>> {
    let parser = SpecBlobParser::new()?;
    assert_eq!(
        parser.parse(r#"{"key"=>"Color", "value"=>"Red"}{"key"=>"Size", "value"=>"M"}"#),
        "color red. size m"
    );
    Ok(())
}

#[test]
fn test_storage_unit() -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = PreprocessingPipeline::new()?;
    let normalized = pipeline.normalize(&ProductInput::new("256gb storage"));
    assert!(normalized.contains("byte"));
    assert!(!normalized.contains("gb"));
    assert!(!normalized.contains("256"));
    Ok(())
}

#[test]
fn test_stopwords_never_returned() -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = PreprocessingPipeline::new()?;
    let product = ProductInput::new("a a a a an an an is is is x x x x q q")
        .with_description("an apple is a fruit");
    let text = pipeline.prepare(&product);
    let keywords = text.keywords().expect("keywords extracted");
    for banned in ["a", "an", "is", "x", "q"] {
        assert!(!keywords.contains(banned), "{} should be filtered", banned);
    }
    assert!(keywords.iter().all(|k| k.len() >= 2));
    assert_eq!(text.to_string(), "apple, fruit");
    Ok(())
}

#[test]
fn test_cap_and_ordering() {
    // 30 distinct tokens, token i occurring i + 1 times
    let tokens: Vec<String> = ('a'..='z')
        .map(|c| format!("q{}", c))
        .chain(('a'..='d').map(|c| format!("z{}", c)))
        .collect();
    assert_eq!(tokens.len(), 30);

    let mut text = String::new();
    for (i, token) in tokens.iter().enumerate() {
        for _ in 0..=i {
            text.push_str(token);
            text.push(' ');
        }
    }

    let keywords = KeywordExtractor::default().extract(&text);
    assert_eq!(keywords.len(), 15);
    let expected: Vec<&str> = tokens.iter().rev().take(15).map(String::as_str).collect();
    assert_eq!(keywords.iter().collect::<Vec<_>>(), expected);
}

#[test]
fn test_empty_input_sentinel() -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = PreprocessingPipeline::new()?;
    let text = pipeline.prepare(&ProductInput::default());
    assert_eq!(text, PreprocessedText::NoKeywords);
    assert_eq!(text.to_string(), NO_KEYWORDS_SENTINEL);

    // Only filtered tokens
    let text = pipeline.prepare(&ProductInput::new("the 42 of a"));
    assert_eq!(text.to_string(), NO_KEYWORDS_SENTINEL);
    Ok(())
}

#[test]
fn test_brand_omission() -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = PreprocessingPipeline::new()?;
    let product = ProductInput::new("Analog Watch")
        .with_brand(UNSPECIFIED_BRAND)
        .with_description("Steel strap")
        .with_specifications(r#"{"key"=>"Type", "value"=>"Analog"}"#);

    let combined = pipeline.assemble(&product);
    assert_eq!(combined, "analog watch. type analog. steel strap");
    assert!(!combined.contains(". ."));
    assert!(!combined.contains("marque"));

    let without_brand = ProductInput { brand: None, ..product.clone() };
    assert_eq!(pipeline.prepare(&without_brand), pipeline.prepare(&product));
    Ok(())
}

#[test]
fn test_shared_across_threads() -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Arc::new(PreprocessingPipeline::new()?);
    let expected = pipeline.prepare(&watch_product()).to_string();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let pipeline = Arc::clone(&pipeline);
            thread::spawn(move || pipeline.prepare(&watch_product()).to_string())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
    Ok(())
}
