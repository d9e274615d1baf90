use anyhow::Result;
use base64::Engine as _;
use clap::Parser;
use promo_image_studio::api::EditImageRequest;
use promo_image_studio::app::{download_file_name, Studio};
use promo_image_studio::models::{Config, GenerationMode};
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "promo-image-studio")]
#[command(about = "Generate AI image variations for promotional use")]
struct CliArgs {
    /// Generation mode: edit, generate, text-only, or combined.
    #[arg(value_name = "MODE", value_parser = parse_mode_arg)]
    mode: GenerationMode,

    /// Source image file (required for edit, text-only, and combined).
    #[arg(long, value_name = "PATH")]
    image: Option<PathBuf>,

    /// Edit instruction, or background description in combined mode.
    #[arg(long)]
    prompt: Option<String>,

    /// Description of the image to generate (generate mode only).
    #[arg(long)]
    text_prompt: Option<String>,

    /// Number of variations to request (1-3, default 3).
    #[arg(long, value_name = "N")]
    count: Option<u8>,

    /// Directory the generated variations are written to.
    #[arg(long, value_name = "DIR", default_value = "output")]
    output: PathBuf,
}

fn parse_mode_arg(input: &str) -> std::result::Result<GenerationMode, String> {
    match input {
        "edit" => Ok(GenerationMode::Edit),
        "generate" => Ok(GenerationMode::Generate),
        "text-only" => Ok(GenerationMode::TextOnly),
        "combined" => Ok(GenerationMode::Combined),
        _ => Err(format!(
            "Invalid mode '{}'. Expected edit, generate, text-only, or combined",
            input
        )),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "promo_image_studio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let image = match &args.image {
        Some(path) => {
            let bytes = fs::read(path)?;
            Some(base64::engine::general_purpose::STANDARD.encode(bytes))
        }
        None => None,
    };

    let request = EditImageRequest {
        mode: args.mode,
        image,
        prompt: args.prompt,
        text_prompt: args.text_prompt,
        image_count: args.count,
    };

    let studio = Studio::new(&config);
    match studio.generate(&request).await {
        Ok(variations) => {
            fs::create_dir_all(&args.output)?;
            for variation in &variations {
                let bytes =
                    base64::engine::general_purpose::STANDARD.decode(&variation.data)?;
                let path = args.output.join(download_file_name(variation));
                fs::write(&path, bytes)?;
                info!("Saved {}", path.display());
            }
            info!("Generated {} variations", variations.len());
            Ok(())
        }
        Err(e) => {
            error!("Generation failed: {}", e);
            std::process::exit(1);
        }
    }
}
