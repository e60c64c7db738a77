//! Line-oriented assistant REPL.
//!
//! Seeds a training-context chat (fetching `results.csv` and `args.yaml`
//! when a training folder is given), then reads user lines from stdin and
//! prints replies as they reveal. Ctrl+C during a reveal stops the typing
//! and keeps the prefix, like the on-screen stop control.

use std::error::Error;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::backend::is_sentinel_folder;
use crate::core::chat::{AttachedImage, ChatOptions, ChatSession};
use crate::core::chunking::SeedContext;
use crate::core::completion::OpenAiCompatClient;
use crate::core::config::{Config, API_KEY_ENV};
use crate::core::message::MessageContent;
use crate::core::training::TrainingResultsSession;
use crate::utils::logging::LoggingState;
use crate::utils::url::websocket_url;

pub async fn run_chat(
    config: &Config,
    training_folder: Option<String>,
    image: Option<PathBuf>,
    log: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let api_key = config.api_key().ok_or_else(|| {
        format!("No assistant API key found. Set the {API_KEY_ENV} environment variable.")
    })?;

    let client = Arc::new(OpenAiCompatClient::new(
        reqwest::Client::new(),
        config.assistant_base_url().to_string(),
        api_key,
        config.text_model().to_string(),
        config.vision_model().to_string(),
        config.max_tokens(),
    ));
    let options = ChatOptions {
        chunk_limit: config.chunk_limit(),
        reveal_interval: Duration::from_millis(config.reveal_interval_ms()),
    };
    let mut logging = LoggingState::new(log)?;

    let mut training_session = None;
    let mut session = if let Some(image_path) = image {
        let frame = load_detection_frame(&image_path).await?;
        ChatSession::detection(client, options, Some(frame))
    } else {
        let context = match training_folder {
            Some(folder) if !is_sentinel_folder(&folder) => {
                let mut results = TrainingResultsSession::new(websocket_url(config.backend_url()));
                let context = match results.request(&folder).await {
                    Ok(Some(bundle)) => SeedContext {
                        project_brief: config.project_brief_text(),
                        csv: bundle
                            .get("results.csv")
                            .map(|a| a.data.clone())
                            .unwrap_or_default(),
                        yaml: bundle
                            .get("args.yaml")
                            .map(|a| a.data.clone())
                            .unwrap_or_default(),
                    },
                    Ok(None) => brief_only_context(config),
                    Err(error) => {
                        eprintln!("Warning: failed to fetch training results: {error}");
                        brief_only_context(config)
                    }
                };
                training_session = Some(results);
                context
            }
            _ => brief_only_context(config),
        };
        ChatSession::training(client, options, &context)
    };

    for message in session.visible_transcript() {
        if let Some(text) = message.content.as_text() {
            println!("Assistant: {text}");
        }
    }
    println!();
    println!("Type your message, /explain <artifact> to attach an image, /quit to leave.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        match line.as_str() {
            "/quit" | "/exit" => break,
            "/log" => match logging.toggle_logging() {
                Ok(status) => println!("{status}"),
                Err(error) => println!("{error}"),
            },
            _ if line.starts_with("/explain") => {
                handle_explain(&line, training_session.as_mut(), &mut session);
            }
            _ => {
                if let Err(error) = logging.log_message(&format!("User: {line}")) {
                    eprintln!("Failed to log message: {error}");
                }
                match session.send(&line).await {
                    Ok(()) => {
                        let reply = print_reveal(&mut session).await?;
                        if let Err(error) = logging.log_message(&format!("Assistant: {reply}")) {
                            eprintln!("Failed to log response: {error}");
                        }
                    }
                    Err(error) => println!("{error}"),
                }
            }
        }
    }

    Ok(())
}

fn brief_only_context(config: &Config) -> SeedContext {
    SeedContext {
        project_brief: config.project_brief_text(),
        ..Default::default()
    }
}

async fn load_detection_frame(path: &Path) -> Result<AttachedImage, Box<dyn Error>> {
    if !path.is_file() {
        return Err(format!("No such file: {}", path.display()).into());
    }
    let bytes = tokio::fs::read(path).await?;
    let description = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "detection frame".to_string());
    Ok(AttachedImage {
        data: BASE64.encode(&bytes),
        description,
    })
}

fn handle_explain(
    line: &str,
    training_session: Option<&mut TrainingResultsSession>,
    session: &mut ChatSession,
) {
    let Some(training_session) = training_session else {
        println!("No training results loaded; start with --training-folder to attach artifacts.");
        return;
    };
    let name = line.trim_start_matches("/explain").trim();
    if name.is_empty() {
        println!("Usage: /explain <artifact name>");
        return;
    }

    match training_session.explain(name) {
        Some(update) => {
            session.apply_explain(update);
            match training_session.attached() {
                Some(attached) => println!("Attached {attached}."),
                None => println!("Detached."),
            }
        }
        None => println!("No such image artifact: {name}"),
    }
}

/// Print the revealing reply incrementally; returns the final text. Ctrl+C
/// stops the reveal and keeps the emitted prefix.
async fn print_reveal(session: &mut ChatSession) -> Result<String, Box<dyn Error>> {
    print!("Assistant: ");
    std::io::stdout().flush()?;

    let mut printed = 0usize;
    loop {
        let text = last_assistant_text(session);
        if text.len() > printed {
            print!("{}", &text[printed..]);
            std::io::stdout().flush()?;
            printed = text.len();
        }
        if !session.is_typing() {
            let text = last_assistant_text(session);
            if text.len() > printed {
                print!("{}", &text[printed..]);
            }
            println!();
            return Ok(text);
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                session.stop();
            }
            _ = tokio::time::sleep(Duration::from_millis(10)) => {}
        }
    }
}

fn last_assistant_text(session: &ChatSession) -> String {
    session
        .visible_transcript()
        .iter()
        .rev()
        .find(|m| m.role.is_assistant())
        .and_then(|m| match &m.content {
            MessageContent::Text { text } => Some(text.clone()),
            MessageContent::ImageRef { .. } => None,
        })
        .unwrap_or_default()
}
