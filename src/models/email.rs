// src/models/email.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{models::html::ImageRef, utils::html::HtmlAnalysis};

/// DTO for preparing an outbound email body composed in the rich-text editor.
#[derive(Debug, Deserialize, Validate)]
pub struct PrepareEmailRequest {
    /// RFC 5322 caps a header line at 998 characters.
    #[validate(
        length(min = 1, max = 998, message = "Subject length must be between 1 and 998 chars"),
        custom(function = validate_subject)
    )]
    pub subject: String,

    #[validate(length(
        min = 1,
        max = 500000,
        message = "HTML length must be between 1 and 500000 chars"
    ))]
    pub html: String,

    #[serde(default)]
    pub sanitize: bool,
}

/// Rejects blank subjects and subjects that would break the header onto a new line.
fn validate_subject(subject: &str) -> Result<(), validator::ValidationError> {
    if subject.trim().is_empty() {
        return Err(validator::ValidationError::new("subject_cannot_be_blank"));
    }
    if subject.contains(['\r', '\n']) {
        return Err(validator::ValidationError::new("subject_cannot_contain_newlines"));
    }
    Ok(())
}

/// Email body ready to be handed to the sender.
#[derive(Debug, Serialize)]
pub struct PreparedEmail {
    pub subject: String,
    pub html: String,
    pub images: Vec<ImageRef>,

    /// Analysis of the submitted HTML, i.e. what cleaning removed.
    pub cleaned: HtmlAnalysis,
}
