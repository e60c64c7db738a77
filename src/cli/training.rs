//! Training-results display.

use std::error::Error;

use crate::api::backend::is_sentinel_folder;
use crate::core::config::Config;
use crate::core::training::artifacts::{grouped, ArtifactKind, CsvTable, TableView};
use crate::core::training::TrainingResultsSession;
use crate::utils::url::websocket_url;

pub async fn show_training_results(
    config: &Config,
    folder: &str,
    full: bool,
) -> Result<(), Box<dyn Error>> {
    if is_sentinel_folder(folder) {
        println!("No training folder selected.");
        return Ok(());
    }

    let mut session = TrainingResultsSession::new(websocket_url(config.backend_url()));
    let Some(bundle) = session.request(folder).await? else {
        println!("No training results available for {folder}.");
        return Ok(());
    };

    if bundle.is_empty() {
        println!("No training results available. Please wait or choose a different folder.");
        return Ok(());
    }

    let view = if full {
        TableView::Fullscreen
    } else {
        TableView::Default
    };

    println!("Training Results for {folder}");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for (group, entries) in grouped(bundle) {
        if entries.is_empty() {
            continue;
        }
        println!();
        println!("{group}");
        for (name, artifact) in entries {
            match artifact.kind {
                ArtifactKind::Image => {
                    println!("  {name}  (image, {} base64 bytes)", artifact.data.len());
                }
                ArtifactKind::Text if name.ends_with(".csv") => {
                    println!("  {name}:");
                    print_csv_table(&artifact.data, view);
                }
                ArtifactKind::Text => {
                    println!("  {name}:");
                    for line in artifact.data.lines() {
                        println!("    {line}");
                    }
                }
            }
        }
    }
    Ok(())
}

fn print_csv_table(data: &str, view: TableView) {
    let table = CsvTable::parse(data);
    if table.header.is_empty() {
        println!("    (empty)");
        return;
    }

    println!("    {}", table.header.join(" | "));
    for row in table.visible_rows(view) {
        println!("    {}", row.join(" | "));
    }
    let hidden = table.rows.len() - table.visible_rows(view).len();
    if hidden > 0 {
        println!("    ... {hidden} more rows (pass --full to show all)");
    }
}
