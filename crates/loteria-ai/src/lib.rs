//! Vision model layer: image encoding, request building, and the Gemini client.

pub mod gemini;
mod image;
mod request;

pub use gemini::{GeminiClient, GeminiConfig, GeminiError, ModelReply, UsageMetadata, VisionModel};
pub use image::{ImageFile, media_type_for};
pub use request::{EncodedImagePart, ModelRequest, RequestError, build_request, encode_image};
