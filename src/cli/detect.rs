//! Detection workflow: upload, start, stream.
//!
//! Runs the full demo loop headlessly. The latest raw and annotated frames
//! are written into the output directory (each write replaces the previous
//! frame, mirroring the session's latest-value channels) and structured
//! detection payloads are printed as they arrive.

use std::error::Error;
use std::path::Path;

use crate::api::backend::{set_model, start_process, upload_file};
use crate::core::config::Config;
use crate::core::stream::ResultStreamSession;
use crate::utils::url::websocket_url;

pub async fn run_detect(
    config: &Config,
    file: &Path,
    video: bool,
    model: Option<&str>,
    out: &Path,
) -> Result<(), Box<dyn Error>> {
    let client = reqwest::Client::new();
    let base_url = config.backend_url();

    if let Some(model) = model {
        set_model(&client, base_url, model).await?;
        println!("Models were set successfully.");
    }

    let file_key = upload_file(&client, base_url, file).await?;
    println!("File uploaded successfully (file key: {file_key}).");

    start_process(&client, base_url, &file_key, !video).await?;
    println!("Detection process started successfully.");

    tokio::fs::create_dir_all(out).await?;

    let session = ResultStreamSession::new(websocket_url(base_url));
    session.open(&file_key).await;

    let mut raw = session.raw_frames();
    let mut annotated = session.annotated_frames();
    let mut results = session.results();

    println!("Streaming results into {}; press Ctrl+C to stop.", out.display());
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = raw.changed() => {
                if changed.is_err() {
                    break;
                }
                let frame = raw.borrow_and_update().clone();
                if let Some(frame) = frame {
                    tokio::fs::write(out.join("frame.jpg"), &frame.bytes).await?;
                }
            }
            changed = annotated.changed() => {
                if changed.is_err() {
                    break;
                }
                let frame = annotated.borrow_and_update().clone();
                if let Some(frame) = frame {
                    tokio::fs::write(out.join("detection_frame.jpg"), &frame.bytes).await?;
                }
            }
            changed = results.changed() => {
                if changed.is_err() {
                    break;
                }
                let payload = results.borrow_and_update().clone();
                if let Some(payload) = payload {
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                }
            }
        }
    }

    session.close();
    Ok(())
}
