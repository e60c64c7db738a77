//! Command-line interface parsing and handling
//!
//! This module parses command-line arguments and dispatches into the session
//! layer.

pub mod chat;
pub mod detect;
pub mod model_list;
pub mod training;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::config::Config;

#[derive(Parser)]
#[command(name = "roadwatch")]
#[command(about = "Terminal client for a roadside-issue detection service")]
#[command(
    long_about = "Roadwatch drives an object-detection demo backend from the terminal: upload an \
image or video, activate a trained model, stream live detection results, inspect training \
artifacts, and chat with an AI assistant about training metrics or detection output.\n\n\
Environment Variables:\n\
  ROADWATCH_API_KEY   API key for the assistant's completion endpoint\n\
  RUST_LOG            Diagnostic filter (e.g. roadwatch=debug)"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend base URL (overrides the config file)
    #[arg(short = 'b', long, global = true, value_name = "URL")]
    pub backend: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the detection models available on the backend
    Models,
    /// Upload a file, start detection, and stream live results
    Detect {
        /// Image or video file to upload
        file: PathBuf,
        /// Treat the upload as a video instead of a single image
        #[arg(long)]
        video: bool,
        /// Detection model to activate before starting
        #[arg(short, long, value_name = "MODEL")]
        model: Option<String>,
        /// Directory the latest frames are written into
        #[arg(short, long, default_value = "results")]
        out: PathBuf,
    },
    /// Fetch and display the training artifacts for a run
    Training {
        /// Training folder name (as listed by `models`)
        folder: String,
        /// Show every CSV row instead of the first ten
        #[arg(long)]
        full: bool,
    },
    /// Chat with the results assistant
    Chat {
        /// Training folder whose results seed the conversation
        #[arg(short, long, value_name = "FOLDER")]
        training_folder: Option<String>,
        /// Annotated detection frame grounding a detection-results chat
        #[arg(short, long, value_name = "FILE", conflicts_with = "training_folder")]
        image: Option<PathBuf>,
        /// Enable transcript logging to the given file
        #[arg(short, long, value_name = "FILE")]
        log: Option<String>,
    },
    /// Print the current configuration
    Config,
}

pub async fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let mut config = Config::load()?;
    if let Some(backend) = args.backend {
        config.backend_url = Some(backend);
    }

    match args.command {
        Commands::Models => model_list::list_models(&config).await,
        Commands::Detect {
            file,
            video,
            model,
            out,
        } => detect::run_detect(&config, &file, video, model.as_deref(), &out).await,
        Commands::Training { folder, full } => {
            training::show_training_results(&config, &folder, full).await
        }
        Commands::Chat {
            training_folder,
            image,
            log,
        } => chat::run_chat(&config, training_folder, image, log).await,
        Commands::Config => {
            config.print_all();
            Ok(())
        }
    }
}
