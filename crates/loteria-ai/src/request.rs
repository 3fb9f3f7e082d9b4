//! Request builder: prompt text plus one base64 inline part per image.

use std::path::PathBuf;

use base64::Engine;
use futures::future::try_join_all;
use loteria_core::GameProfile;
use thiserror::Error;
use tracing::{debug, info};

use crate::image::ImageFile;

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("failed to read image {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Base64-encoded image content paired with its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImagePart {
    pub data: String,
    pub mime_type: String,
}

/// Everything sent to the model for one processing cycle.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub prompt: String,
    /// Same order as the input images; the prompt's game ranges are positional.
    pub parts: Vec<EncodedImagePart>,
}

/// Read an image fully and encode it as standard padded base64.
pub async fn encode_image(image: &ImageFile) -> Result<EncodedImagePart, RequestError> {
    let bytes = tokio::fs::read(&image.path)
        .await
        .map_err(|source| RequestError::FileRead {
            path: image.path.clone(),
            source,
        })?;
    debug!(name = %image.name, bytes = bytes.len(), "encoded image");
    Ok(EncodedImagePart {
        data: base64::engine::general_purpose::STANDARD.encode(&bytes),
        mime_type: image.mime_type.clone(),
    })
}

/// Build the prompt for `profile` and encode every image.
///
/// All reads run concurrently and are joined in input order. The first read
/// failure fails the whole request.
pub async fn build_request(
    profile: &GameProfile,
    image_count: usize,
    images: &[ImageFile],
) -> Result<ModelRequest, RequestError> {
    let prompt = profile.render_prompt(image_count);
    let parts = try_join_all(images.iter().map(encode_image)).await?;

    info!(
        profile = profile.name,
        images = parts.len(),
        prompt_len = prompt.len(),
        "built model request"
    );
    Ok(ModelRequest { prompt, parts })
}
