// src/models/html.rs

use serde::{Deserialize, Serialize};
use url::Url;
use validator::Validate;

/// DTO carrying a fragment of editor HTML.
/// `html` may be `null`; the handlers keep `null` distinct from `""`.
#[derive(Debug, Deserialize, Validate)]
pub struct HtmlRequest {
    #[validate(length(max = 500000, message = "HTML must be at most 500000 chars"))]
    pub html: Option<String>,
}

/// DTO for the normalize endpoint.
#[derive(Debug, Deserialize, Validate)]
pub struct NormalizeRequest {
    #[validate(length(max = 500000, message = "HTML must be at most 500000 chars"))]
    pub html: Option<String>,

    /// Run the ammonia whitelist before normalizing.
    #[serde(default)]
    pub sanitize: bool,
}

#[derive(Debug, Serialize)]
pub struct NormalizeResponse {
    pub html: Option<String>,
}

/// Where an `<img>` source points to, as far as an email sender cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    /// `data:` URI embedded in the markup.
    Inline,
    /// `cid:` reference to a MIME part.
    Attachment,
    /// `http` / `https` URL fetched by the mail client.
    Remote,
    /// Anything else, including paths that are not absolute URLs.
    Relative,
}

/// A single image source found in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    pub src: String,
    pub kind: ImageKind,
}

impl ImageRef {
    pub fn from_src(src: String) -> Self {
        let kind = match Url::parse(src.trim()) {
            Ok(url) => match url.scheme() {
                "data" => ImageKind::Inline,
                "cid" => ImageKind::Attachment,
                "http" | "https" => ImageKind::Remote,
                _ => ImageKind::Relative,
            },
            Err(_) => ImageKind::Relative,
        };
        Self { src, kind }
    }
}

#[derive(Debug, Serialize)]
pub struct ImagesResponse {
    pub images: Vec<ImageRef>,
}
