//! `atc-portal upload` – send an image and print its access path.

use std::path::Path;

use crate::cli::Context;
use crate::dto::api::ImageUpload;
use crate::services::server_config::ServerConfigStore;
use crate::services::upload::ImageUploader;
use crate::services::{ServiceError, ServiceResult};

fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}

pub async fn run_upload(context: &Context, path: &Path) -> ServiceResult<()> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| ServiceError::Upload(format!("cannot read {}: {err}", path.display())))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string();

    let mut limits = ServerConfigStore::new();
    limits.load(&context.api).await?;

    let image = ImageUpload {
        file_name,
        content_type: content_type(path).to_string(),
        bytes,
    };
    let access_path = ImageUploader::new()
        .upload(&context.api, &limits.config().image_limit, image)
        .await?;
    println!("{access_path}");
    Ok(())
}
