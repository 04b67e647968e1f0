use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use log::info;
use prodclass::{ClientConfig, PreprocessingPipeline, ProductInput, ScoringClient};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the text that would be sent to the model
    Prepare {
        #[command(flatten)]
        product: ProductArgs,
        /// Also print the normalized combined text
        #[arg(long)]
        normalized: bool,
    },
    /// Send an image and product text to the scoring service
    Predict {
        /// Path to the product image
        #[arg(short, long)]
        image: PathBuf,
        #[command(flatten)]
        product: ProductArgs,
        /// Raw comma-separated keywords from the catalogue, forwarded as-is
        #[arg(long)]
        keywords: Option<String>,
        /// Scoring endpoint; overrides PRODCLASS_ENDPOINT_URL
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Check the scoring service's health endpoint
    Status {
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Show the normalization rule table's size and fingerprint
    Rules,
}

#[derive(ClapArgs)]
struct ProductArgs {
    #[arg(short, long)]
    name: String,
    #[arg(short, long)]
    brand: Option<String>,
    #[arg(short, long, default_value = "")]
    description: String,
    /// Specification blob, e.g. {"key"=>"Color", "value"=>"Red"}
    #[arg(short, long, default_value = "")]
    specifications: String,
}

impl From<ProductArgs> for ProductInput {
    fn from(args: ProductArgs) -> Self {
        let mut product = ProductInput::new(args.name)
            .with_description(args.description)
            .with_specifications(args.specifications);
        product.brand = args.brand;
        product
    }
}

fn client_config(endpoint: Option<String>) -> Result<ClientConfig> {
    let config = ClientConfig::from_env().context("Failed to read client configuration")?;
    Ok(match endpoint {
        Some(url) => config.with_endpoint(url),
        None => config,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let pipeline = PreprocessingPipeline::new().context("Failed to build preprocessing pipeline")?;

    match args.command {
        Command::Prepare { product, normalized } => {
            let product = ProductInput::from(product);
            if normalized {
                println!("Normalized: {}", pipeline.normalize(&product));
            }
            println!("{}", pipeline.prepare(&product));
        }
        Command::Predict {
            image,
            product,
            keywords,
            endpoint,
        } => {
            let client = ScoringClient::new(client_config(endpoint)?, pipeline)?;
            let bytes = std::fs::read(&image)
                .with_context(|| format!("Failed to read image {}", image.display()))?;
            let product = ProductInput::from(product);

            let start_time = Instant::now();
            info!("Requesting prediction from {}", client.config().endpoint_url);
            match client.predict(&bytes, &product, keywords.as_deref()).await {
                Ok(prediction) => {
                    println!("\nResults:");
                    println!("  Predicted category: {}", prediction.predicted_category);
                    println!("  Confidence: {:.1}%", prediction.confidence * 100.0);
                    let scores = prediction.ranked_scores();
                    if !scores.is_empty() {
                        println!("  Category scores (sorted):");
                        for (label, score) in scores {
                            println!("    {}: {:.1}%", label, score * 100.0);
                        }
                    }
                    info!("Prediction took {:.2?}", start_time.elapsed());
                }
                Err(e) => {
                    eprintln!("\nPrediction failed [{}]: {}", e.kind(), e);
                    std::process::exit(1);
                }
            }
        }
        Command::Status { endpoint } => {
            let client = ScoringClient::new(client_config(endpoint)?, pipeline)?;
            println!("{}", client.service_status().await);
        }
        Command::Rules => {
            let normalizer = pipeline.normalizer();
            println!("Rules: {}", normalizer.rule_count());
            println!("Passes: {}", prodclass::preprocess::NORMALIZATION_PASSES);
            println!("Fingerprint: {}", normalizer.fingerprint());
        }
    }

    Ok(())
}
