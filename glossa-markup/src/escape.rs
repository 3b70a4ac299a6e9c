//! HTML escaping, tag stripping and URL sanitizing.

use crate::segment::segments;

/// Escape `&`, `<`, `>`, `"` and `'` for HTML text.
///
/// Existing character references (`&amp;`, `&#39;`, `&#x2F;`) are kept as
/// they are, so escaping twice gives the same result as escaping once.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for (i, c) in input.char_indices() {
        match c {
            '&' if is_char_reference(&input[i..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape for a double-quoted attribute value.
///
/// Same as [`escape_html`], with line breaks encoded so the value stays on
/// one line.
pub fn escape_attr(input: &str) -> String {
    let escaped = escape_html(input);
    if !escaped.contains(&['\n', '\r'][..]) {
        return escaped;
    }
    escaped.replace('\r', "&#13;").replace('\n', "&#10;")
}

/// `s` starts with `&` followed by a named, decimal or hex reference and `;`.
fn is_char_reference(s: &str) -> bool {
    let body = &s.as_bytes()[1..];
    let (digits, len) = match body {
        [b'#', b'x' | b'X', rest @ ..] => (rest, count_leading(rest, u8::is_ascii_hexdigit)),
        [b'#', rest @ ..] => (rest, count_leading(rest, u8::is_ascii_digit)),
        [first, ..] if first.is_ascii_alphabetic() => {
            (body, count_leading(body, u8::is_ascii_alphanumeric))
        }
        _ => return false,
    };
    len > 0 && digits.get(len) == Some(&b';')
}

fn count_leading(bytes: &[u8], pred: impl Fn(&u8) -> bool) -> usize {
    bytes.iter().take_while(|b| pred(*b)).count()
}

/// Remove tags and comments, keeping text segments only.
pub fn strip_tags(input: &str) -> String {
    segments(input)
        .filter(|s| s.is_text())
        .map(|s| s.text)
        .collect()
}

const ALLOWED_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Sanitize a link for use in an attribute.
///
/// Absolute URLs are kept only for `http`, `https` and `mailto`; relative
/// links pass through. Anything else (`javascript:`, `data:`) becomes an
/// empty string. Control characters are dropped and spaces encoded.
pub fn sanitize_url(url: &str) -> String {
    let mut cleaned = String::with_capacity(url.len());
    for c in url.trim().chars().filter(|c| !c.is_control()) {
        match c {
            ' ' => cleaned.push_str("%20"),
            _ => cleaned.push(c),
        }
    }

    if cleaned.is_empty() {
        return cleaned;
    }

    let allowed = match scheme(&cleaned) {
        None => true,
        Some(scheme) => ALLOWED_SCHEMES
            .iter()
            .any(|allowed| scheme.eq_ignore_ascii_case(allowed)),
    };

    if allowed {
        cleaned
    } else {
        String::new()
    }
}

/// The scheme of `url`, if it has one before any path, query or fragment.
fn scheme(url: &str) -> Option<&str> {
    let colon = url.find(':')?;
    let boundary = url.find(&['/', '?', '#'][..]).unwrap_or(url.len());
    if colon > boundary {
        return None;
    }
    Some(&url[..colon])
}
