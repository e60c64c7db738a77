//! Model listing
//!
//! Lists the detection models the backend can activate, with the training
//! folder each one derives from.

use std::error::Error;

use crate::api::backend::{fetch_models, training_folder};
use crate::core::config::Config;

pub async fn list_models(config: &Config) -> Result<(), Box<dyn Error>> {
    let client = reqwest::Client::new();
    let models = fetch_models(&client, config.backend_url()).await?;

    if models.detection_models.is_empty() {
        println!("No detection models available on {}", config.backend_url());
        return Ok(());
    }

    println!("Available detection models on {}", config.backend_url());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for model in &models.detection_models {
        println!("  {model}  (training folder: {})", training_folder(model));
    }
    Ok(())
}
