// src/utils/html.rs

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;

/// Outer container Quill wraps the document in: `<div class="ql-editor">...</div>`.
static EDITOR_WRAPPER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?is)<div\b(?:[^<>"']|"[^"]*"|'[^']*')*?\sclass\s*=\s*"#,
        r#"(?:"[^"]*\bql-editor\b[^"]*"|'[^']*\bql-editor\b[^']*')"#,
        r#"(?:[^<>"']|"[^"]*"|'[^']*')*>(.*?)</div\s*>"#,
    ))
    .expect("editor wrapper regex")
});

/// Any opening (or self-closing) tag. Quoted attribute values may contain `>`.
static OPENING_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<[A-Za-z](?:[^<>"']|"[^"]*"|'[^']*')*>"#).expect("opening tag regex")
});

/// `class` attribute whose value carries an editor class (`ql-align-center`, `ql-indent-1`, ...).
static EDITOR_CLASS_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+class\s*=\s*(?:"[^"]*\bql-[^"]*"|'[^']*\bql-[^']*')"#)
        .expect("editor class regex")
});

static DATA_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+data-[\w\-.:]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?"#)
        .expect("data attribute regex")
});

/// ASCII whitespace only: U+00A0 between tags is visible content.
static INTER_TAG_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">[ \t\r\n\x0C]+<").expect("inter-tag whitespace regex"));

static NBSP_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)&nbsp;|&#160;|&#x0*a0;").expect("nbsp entity regex"));

/// A paragraph holding nothing but whitespace, non-breaking spaces and line breaks.
/// The raw entities are accepted too so the predicate works on un-normalized input.
static EMPTY_PARAGRAPH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<p(?:\s(?:[^<>"']|"[^"]*"|'[^']*')*)?>(?:\s|\x{A0}|&nbsp;|&#160;|&#x0*a0;|<br\s*/?>)*</p\s*>"#)
        .expect("empty paragraph regex")
});

static PARAGRAPH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<p(\s(?:[^<>"']|"[^"]*"|'[^']*')*)?>(.*?)</p\s*>"#).expect("paragraph regex")
});

static PARAGRAPH_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<p(?:\s(?:[^<>"']|"[^"]*"|'[^']*')*)?>"#).expect("paragraph open regex")
});

/// Two or more `<br>` tags with nothing but ASCII whitespace between them.
static BREAK_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>(?:[ \t\r\n\x0C]*<br\s*/?>)+").expect("break run regex")
});

static IMAGE_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<img\b(?:[^<>"']|"[^"]*"|'[^']*')*?\ssrc\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'<>`]+))"#)
        .expect("image src regex")
});

/// Converts Quill editor HTML into HTML that survives email clients.
///
/// Absent input stays absent and empty input stays empty. Everything else goes
/// through a fixed sequence of textual rewrites:
///
/// 1. unwrap the `ql-editor` root `<div>`;
/// 2. drop `ql-*` class attributes and every `data-*` attribute;
/// 3. collapse whitespace sitting between tags;
/// 4. turn `&nbsp;` into U+00A0;
/// 5. remove paragraphs that only contain whitespace and `<br>`s;
/// 6. trim the content of the remaining paragraphs;
/// 7. collapse `<br>` runs into a single `<br>`;
/// 8. trim the result.
///
/// Note:
/// 1. No DOM is built. Markup a pattern does not recognise is passed through as-is,
///    so malformed fragments degrade to "unchanged" instead of failing.
/// 2. The steps are order dependent; e.g. empty-paragraph detection relies on the
///    entity and whitespace passes having run first.
pub fn normalize(html: Option<&str>) -> Option<String> {
    html.map(clean_quill_html_for_email)
}

/// Non-optional form of [`normalize`].
pub fn clean_quill_html_for_email(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let html = EDITOR_WRAPPER.replace(html, "$1");
    let html = OPENING_TAG.replace_all(&html, |caps: &Captures| strip_editor_attributes(&caps[0]));
    let html = INTER_TAG_WHITESPACE.replace_all(&html, "><");
    let html = NBSP_ENTITY.replace_all(&html, "\u{A0}");
    let html = EMPTY_PARAGRAPH.replace_all(&html, "");
    let html = PARAGRAPH.replace_all(&html, |caps: &Captures| {
        let attrs = caps.get(1).map_or("", |m| m.as_str());
        format!("<p{}>{}</p>", attrs, caps[2].trim())
    });
    let html = BREAK_RUN.replace_all(&html, "<br>");

    html.trim().to_string()
}

fn strip_editor_attributes(tag: &str) -> String {
    let tag = EDITOR_CLASS_ATTR.replace_all(tag, "");
    DATA_ATTR.replace_all(&tag, "").into_owned()
}

/// Returns every `<img>` source in document order, duplicates included.
///
/// Double-quoted, single-quoted and bare attribute values are all accepted.
/// Blank values (`src=""`) point nowhere and are skipped.
pub fn extract_image_srcs(html: &str) -> Vec<String> {
    IMAGE_SRC
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| m.as_str())
        .filter(|src| !src.trim().is_empty())
        .map(str::to_string)
        .collect()
}

pub fn extract_image_srcs_opt(html: Option<&str>) -> Vec<String> {
    html.map(extract_image_srcs).unwrap_or_default()
}

/// Paragraph and line-break statistics of a document, before any cleaning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HtmlAnalysis {
    pub paragraph_count: usize,
    /// Paragraphs that [`normalize`] would drop as empty.
    pub empty_paragraph_count: usize,
    /// Runs of two or more consecutive `<br>` tags.
    pub break_run_count: usize,
}

/// Reports what [`normalize`] would remove from `html` without modifying it.
pub fn analyze(html: &str) -> HtmlAnalysis {
    HtmlAnalysis {
        paragraph_count: PARAGRAPH_OPEN.find_iter(html).count(),
        empty_paragraph_count: EMPTY_PARAGRAPH.find_iter(html).count(),
        break_run_count: BREAK_RUN.find_iter(html).count(),
    }
}

/// Clean HTML content using the ammonia library before it goes out in an email.
///
/// Whitelist-based: safe formatting tags (<b>, <p>, <img>, ...) are kept while
/// <script>, <iframe>, event handlers and the like are stripped. On top of ammonia's
/// defaults, `data:` and `cid:` URLs are allowed so inline images survive, and
/// `class` is kept so [`normalize`] can still find the editor wrapper.
///
/// Note: ammonia re-serializes the document, so run this *before* [`normalize`],
/// otherwise non-breaking spaces come back as `&nbsp;` entities.
pub fn sanitize_email_html(html: &str) -> String {
    ammonia::Builder::default()
        .add_url_schemes(["data", "cid"])
        .add_generic_attributes(["class"])
        .clean(html)
        .to_string()
}
