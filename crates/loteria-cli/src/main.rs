mod cycle;
mod display;
mod intake;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use loteria_ai::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use loteria_ai::{GeminiClient, GeminiConfig};
use loteria_core::GameProfile;
use loteria_export::DEFAULT_FILE_NAME;

use cycle::{CycleOptions, Session};
use intake::IntakeBuffer;

#[derive(Parser)]
#[command(name = "loteria")]
#[command(about = "Read lottery games from ticket photos and export them to a spreadsheet")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the supported lottery formats
    Profiles,

    /// Show which files would be sent, as `name - size bytes`
    List {
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },

    /// Read ticket photos with the vision model and export the games
    Process {
        /// Lottery format of the tickets
        #[arg(long, short, default_value = "LotoFacil", value_parser = parse_profile)]
        profile: &'static GameProfile,

        /// Ticket photos (png, gif, jpeg, jpg), in game order
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Spreadsheet to write
        #[arg(long, short, default_value = DEFAULT_FILE_NAME)]
        output: PathBuf,

        /// Also save the model's raw reply to this file
        #[arg(long)]
        raw_out: Option<PathBuf>,

        #[command(flatten)]
        gemini: GeminiArgs,
    },

    /// Export a saved raw model reply without calling the model
    Export {
        /// File holding the raw reply text
        #[arg(long, short)]
        input: PathBuf,

        /// Check game lengths against this lottery format
        #[arg(long, short, value_parser = parse_profile)]
        profile: Option<&'static GameProfile>,

        /// Spreadsheet to write
        #[arg(long, short, default_value = DEFAULT_FILE_NAME)]
        output: PathBuf,
    },
}

#[derive(Args)]
struct GeminiArgs {
    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Gemini model identifier
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Gemini API base URL
    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
}

impl From<GeminiArgs> for GeminiConfig {
    fn from(args: GeminiArgs) -> Self {
        Self {
            api_key: args.api_key,
            model: args.model,
            base_url: args.base_url,
        }
    }
}

fn parse_profile(name: &str) -> Result<&'static GameProfile, String> {
    GameProfile::find(name)
        .ok_or_else(|| format!("unknown profile '{name}' (known: {})", GameProfile::names()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Profiles => {
            display::print_profiles(GameProfile::catalog());
        }

        Command::List { images } => {
            let mut intake = IntakeBuffer::new();
            let rejected = intake.add_all(&images).await;
            display::print_intake(&intake, &rejected);
        }

        Command::Process {
            profile,
            images,
            output,
            raw_out,
            gemini,
        } => {
            let mut intake = IntakeBuffer::new();
            for e in intake.add_all(&images).await {
                tracing::warn!(error = %e, "skipping file");
            }
            anyhow::ensure!(!intake.is_empty(), "no accepted images to process");

            let client = GeminiClient::new(gemini.into());
            eprintln!(
                "  Reading {} image(s) as {} with {}...",
                intake.len(),
                profile.name,
                client.model()
            );

            let options = CycleOptions { output, raw_out };
            let report = Session::new()
                .process(&client, profile, intake.files(), &options)
                .await
                .context("processing tickets")?;

            eprintln!(
                "  Wrote {} game(s) to {}",
                report.games,
                report.output.display()
            );
            if report.irregular > 0 {
                eprintln!(
                    "  {} game(s) do not have {} numbers; check them by hand",
                    report.irregular, profile.numbers_per_game
                );
            }
        }

        Command::Export {
            input,
            profile,
            output,
        } => {
            let raw = tokio::fs::read_to_string(&input)
                .await
                .with_context(|| format!("reading {}", input.display()))?;
            let report = Session::new()
                .export_reply(&raw, profile, &output)
                .await
                .context("exporting saved reply")?;
            eprintln!(
                "  Wrote {} game(s) to {}",
                report.games,
                report.output.display()
            );
        }
    }

    Ok(())
}
