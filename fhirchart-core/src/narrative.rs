//! XHTML narrative fragments used in `text.div` elements

use regex::Regex;
use std::sync::LazyLock;

const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

static FIRST_DIV: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<div\b[^>]*>(.*?)</div>").expect("valid div pattern"));

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag pattern"));

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]+);").expect("valid entity pattern")
});

/// Wrap plain text in a single XHTML div, escaping markup characters.
pub fn xhtml_div(text: &str) -> String {
    format!(
        "<div xmlns=\"{}\">{}</div>",
        XHTML_NAMESPACE,
        escape(text)
    )
}

/// Text content of the first `<div>...</div>` in a narrative.
///
/// Nested tags are dropped and entities decoded. Markup without a div is
/// returned unchanged.
pub fn extract_text(div: &str) -> String {
    match FIRST_DIV.captures(div).and_then(|c| c.get(1)) {
        Some(inner) => unescape(&TAG.replace_all(inner.as_str(), "")),
        None => div.to_string(),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Single pass, so `&amp;lt;` decodes to `&lt;`. Unknown or invalid
/// references are left as written.
fn unescape(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_entity(name: &str) -> Option<String> {
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)?
        }
    };
    Some(ch.to_string())
}
