use std::path::PathBuf;

use anyhow::{anyhow, Result};
use dotenvy::dotenv;
use tracing::{error, info};

mod config;
mod headshot;
mod llm;
mod state;
mod utils;

use config::CONFIG;
use headshot::colors::BlazerColor;
use headshot::files::{read_photo, save_headshot};
use headshot::{Studio, TransformationClient};
use llm::GeminiImageApi;
use utils::logging::init_logging;
use utils::timing::CommandTimer;

#[derive(Debug, Clone, PartialEq, Eq)]
struct GenerateArgs {
    photo: PathBuf,
    color: Option<BlazerColor>,
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Generate(GenerateArgs),
    Colors,
    Help,
}

fn usage() -> &'static str {
    "Usage:\n  headshot-studio generate --photo <path> [--color <name>] [--output <path>]\n  headshot-studio colors\n  headshot-studio --help"
}

fn parse_generate_args(args: &[String]) -> Result<GenerateArgs> {
    let mut photo: Option<PathBuf> = None;
    let mut color: Option<BlazerColor> = None;
    let mut output: Option<PathBuf> = None;

    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--photo" | "-p" => {
                index += 1;
                let value = args
                    .get(index)
                    .ok_or_else(|| anyhow!("Missing value for --photo"))?;
                photo = Some(PathBuf::from(value));
            }
            "--color" | "-c" => {
                index += 1;
                let value = args
                    .get(index)
                    .ok_or_else(|| anyhow!("Missing value for --color"))?;
                color = Some(value.parse::<BlazerColor>()?);
            }
            "--output" | "-o" => {
                index += 1;
                let value = args
                    .get(index)
                    .ok_or_else(|| anyhow!("Missing value for --output"))?;
                output = Some(PathBuf::from(value));
            }
            other => {
                return Err(anyhow!(
                    "Unknown generate argument: {other}\n{}",
                    usage()
                ));
            }
        }
        index += 1;
    }

    let photo = photo.ok_or_else(|| anyhow!("--photo is required\n{}", usage()))?;
    Ok(GenerateArgs {
        photo,
        color,
        output,
    })
}

fn parse_cli_args(args: &[String]) -> Result<Command> {
    match args.get(1).map(|value| value.as_str()) {
        None | Some("--help") | Some("-h") | Some("help") => Ok(Command::Help),
        Some("colors") => Ok(Command::Colors),
        Some("generate") => Ok(Command::Generate(parse_generate_args(&args[2..])?)),
        Some(other) => Err(anyhow!("Unknown command: {other}\n{}", usage())),
    }
}

fn print_colors(default_color: BlazerColor) {
    for color in BlazerColor::ALL {
        let marker = if color == default_color { " (default)" } else { "" };
        println!("{}{}", color, marker);
    }
}

async fn run_generate(args: GenerateArgs) -> Result<PathBuf> {
    if !CONFIG.has_gemini_api_key() {
        return Err(anyhow!("GEMINI_API_KEY is required to generate a headshot"));
    }

    let client = TransformationClient::new(GeminiImageApi::from_config(&CONFIG));
    let mut studio = Studio::new(client, CONFIG.default_blazer_color);

    let photo = read_photo(&args.photo).await?;
    studio.select_image(&photo);
    if let Some(color) = args.color {
        studio.select_color(color);
    }

    let session = studio.generate().await;
    if let Some(message) = &session.error {
        return Err(anyhow!(message.clone()));
    }
    let processed = session
        .processed_image
        .as_deref()
        .ok_or_else(|| anyhow!("No headshot was produced"))?;

    save_headshot(
        processed,
        session.selected_color,
        args.output.as_deref(),
        &CONFIG.output_dir,
    )
    .await
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let _guards = init_logging();
    CONFIG.log_warnings();

    let args: Vec<String> = std::env::args().collect();
    match parse_cli_args(&args)? {
        Command::Help => println!("{}", usage()),
        Command::Colors => print_colors(CONFIG.default_blazer_color),
        Command::Generate(generate_args) => {
            let mut timer =
                CommandTimer::start("generate", Some(generate_args.photo.display().to_string()));
            match run_generate(generate_args).await {
                Ok(path) => {
                    timer.complete("success", Some(path.display().to_string()));
                    info!("Headshot saved to {}", path.display());
                    println!("{}", path.display());
                }
                Err(err) => {
                    timer.complete("error", Some(err.to_string()));
                    error!("generate failed: {err}");
                    return Err(err);
                }
            }
        }
    }
    Ok(())
}
