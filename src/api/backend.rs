//! REST client for the detection backend.
//!
//! Thin request/response wrappers over the backend's four endpoints. Errors
//! are reported to the caller; no retry policy is built in.

use std::path::Path;

use crate::api::{
    ListModelsResponse, SetModelRequest, StartProcessRequest, UploadResponse,
};
use crate::utils::url::construct_api_url;

/// Derive the training folder from a model path of the form
/// `<trainingFolder>/<name>`. A path without a separator is its own folder.
pub fn training_folder(model_path: &str) -> &str {
    model_path.split('/').next().unwrap_or(model_path)
}

/// Folder values that mean "no training run selected".
pub fn is_sentinel_folder(training_folder: &str) -> bool {
    training_folder.is_empty() || training_folder == "None"
}

pub async fn fetch_models(
    client: &reqwest::Client,
    base_url: &str,
) -> Result<ListModelsResponse, Box<dyn std::error::Error>> {
    let url = construct_api_url(base_url, "list_models");
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(format!("list_models failed with status {status}: {body}").into());
    }

    Ok(response.json::<ListModelsResponse>().await?)
}

pub async fn set_model(
    client: &reqwest::Client,
    base_url: &str,
    model_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if model_path.is_empty() {
        return Err("No detection model selected.".into());
    }

    let url = construct_api_url(base_url, "set_model");
    let response = client
        .post(url)
        .json(&SetModelRequest {
            yolo: model_path.to_string(),
        })
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(format!("set_model failed with status {}", response.status()).into());
    }

    Ok(())
}

/// Upload an image or video; the returned file key joins the upload to its
/// result stream. Keys do not survive a backend restart.
pub async fn upload_file(
    client: &reqwest::Client,
    base_url: &str,
    path: &Path,
) -> Result<String, Box<dyn std::error::Error>> {
    if !path.is_file() {
        return Err(format!("No such file: {}", path.display()).into());
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let bytes = tokio::fs::read(path).await?;

    let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
    let form = reqwest::multipart::Form::new().part("video_source", part);

    let url = construct_api_url(base_url, "upload");
    let response = client.post(url).multipart(form).send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(format!("upload failed with status {status}: {body}").into());
    }

    let upload = response.json::<UploadResponse>().await?;
    Ok(upload.file_key)
}

pub async fn start_process(
    client: &reqwest::Client,
    base_url: &str,
    file_key: &str,
    is_image: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if file_key.is_empty() {
        return Err("Please upload a file first.".into());
    }

    let url = construct_api_url(base_url, "start_process");
    let response = client
        .post(url)
        .json(&StartProcessRequest {
            file_key: file_key.to_string(),
            is_image,
        })
        .send()
        .await?;

    if !response.status().is_success() {
        return Err("Failed to start the detection process".into());
    }

    Ok(())
}
