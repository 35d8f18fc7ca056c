//! Markdown subset used by study buddy replies.
//!
//! Supported: `**bold**`, `*italic*`, `` `code` ``, and `* item` bullet lines.
//! Everything else passes through escaped, with newlines as `<br />`.

use regex_lite::Regex;
use std::sync::LazyLock;

static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.*?)\*").unwrap());
static CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());
static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\* (.*)$").unwrap());
static ADJACENT_LISTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</ul>\s?<ul>").unwrap());
static BREAK_BEFORE_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<br />(\s*<ul)").unwrap());

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Render reply text to HTML.
pub fn render_markdown(text: &str) -> String {
    let html = escape_html(text);
    // Bullets first so the leading "* " is not read as an italic opener.
    let html = BULLET.replace_all(&html, "<ul><li>${1}</li></ul>");
    let html = BOLD.replace_all(&html, "<strong>${1}</strong>");
    let html = ITALIC.replace_all(&html, "<em>${1}</em>");
    let html = CODE.replace_all(&html, "<code>${1}</code>");
    let html = ADJACENT_LISTS.replace_all(&html, "");
    let html = html.replace('\n', "<br />");
    BREAK_BEFORE_LIST.replace_all(&html, "${1}").into_owned()
}
