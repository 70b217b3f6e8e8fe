// src/handlers/html.rs

use axum::{Json, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    models::html::{HtmlRequest, ImageRef, ImagesResponse, NormalizeRequest, NormalizeResponse},
    utils::html::{analyze, extract_image_srcs_opt, normalize, sanitize_email_html},
};

/// Cleans editor HTML for inclusion in an email body.
///
/// `{"html": null}` comes back as `{"html": null}`, `""` as `""`.
/// With `sanitize: true` the ammonia whitelist runs first.
pub async fn normalize_html(
    Json(payload): Json<NormalizeRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let input = match (payload.html, payload.sanitize) {
        (Some(html), true) => Some(sanitize_email_html(&html)),
        (html, _) => html,
    };
    let html = normalize(input.as_deref());

    tracing::debug!(
        bytes_in = input.as_deref().map_or(0, str::len),
        bytes_out = html.as_deref().map_or(0, str::len),
        sanitized = payload.sanitize,
        "Normalized HTML"
    );

    Ok(Json(NormalizeResponse { html }))
}

/// Lists image sources in document order, duplicates included.
pub async fn list_images(
    Json(payload): Json<HtmlRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let images: Vec<ImageRef> = extract_image_srcs_opt(payload.html.as_deref())
        .into_iter()
        .map(ImageRef::from_src)
        .collect();

    tracing::debug!(count = images.len(), "Extracted image sources");

    Ok(Json(ImagesResponse { images }))
}

/// Reports what normalizing would remove, without modifying anything.
/// A `null` document analyzes as empty.
pub async fn analyze_html(
    Json(payload): Json<HtmlRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let analysis = analyze(payload.html.as_deref().unwrap_or_default());

    tracing::debug!(
        bytes_in = payload.html.as_deref().map_or(0, str::len),
        paragraphs = analysis.paragraph_count,
        empty_paragraphs = analysis.empty_paragraph_count,
        break_runs = analysis.break_run_count,
        "Analyzed HTML"
    );

    Ok(Json(analysis))
}
