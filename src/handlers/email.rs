// src/handlers/email.rs

use axum::{Json, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        email::{PrepareEmailRequest, PreparedEmail},
        html::ImageRef,
    },
    utils::html::{analyze, clean_quill_html_for_email, extract_image_srcs, sanitize_email_html},
};

/// Turns a composed email into a body ready for the sender.
///
/// 1. Validate subject and body.
/// 2. Analyze the raw editor HTML (reported back as `cleaned`).
/// 3. Optionally sanitize, then normalize.
/// 4. Collect the images the sender has to inline, attach or leave remote.
///
/// Nothing is sent from here.
pub async fn prepare_email(
    Json(payload): Json<PrepareEmailRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let cleaned = analyze(&payload.html);

    let html = if payload.sanitize {
        clean_quill_html_for_email(&sanitize_email_html(&payload.html))
    } else {
        clean_quill_html_for_email(&payload.html)
    };

    if html.is_empty() {
        return Err(AppError::BadRequest(
            "Email body is empty after cleaning".to_string(),
        ));
    }

    let images: Vec<ImageRef> = extract_image_srcs(&html)
        .into_iter()
        .map(ImageRef::from_src)
        .collect();

    tracing::debug!(
        subject_len = payload.subject.len(),
        bytes_in = payload.html.len(),
        bytes_out = html.len(),
        images = images.len(),
        empty_paragraphs = cleaned.empty_paragraph_count,
        break_runs = cleaned.break_run_count,
        "Prepared email body"
    );

    Ok(Json(PreparedEmail {
        subject: payload.subject.trim().to_string(),
        html,
        images,
        cleaned,
    }))
}
