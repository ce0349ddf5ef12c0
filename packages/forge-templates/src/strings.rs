//! String, hashing and URL helpers exposed to templates.

use ec4rs::property::TabWidth;
use ec4rs::{ConfigParser, Properties, PropertiesSource};
use md5::Md5;
use mime::Mime;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;
use sha1::{Digest, Sha1};
use url::{Position, Url};

/// Bytes escaped inside one path segment: everything except unreserved
/// characters and the sub-delimiters `$ & + : = @`
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b':')
    .remove(b'=')
    .remove(b'@');

/// Truncate to `length` characters, replacing the tail with `...`
pub fn ellipsis_string(s: &str, length: usize) -> String {
    if length <= 3 {
        return "...".to_string();
    }
    if s.chars().count() <= length {
        return s.to_string();
    }
    let mut out: String = s.chars().take(length - 3).collect();
    out.push_str("...");
    out
}

/// Character-based substring; `length == -1` reads to the end.
///
/// A start past the string gives an empty result. Otherwise, when the
/// requested end lies past the string the whole string is returned.
pub fn substr(s: &str, start: i64, length: i64) -> String {
    if s.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len() as i64;
    if start >= len {
        return String::new();
    }
    let end = if length == -1 {
        len
    } else {
        start.saturating_add(length)
    };
    if len < end {
        return s.to_string();
    }
    let start = start.clamp(0, len);
    if end <= start {
        return String::new();
    }
    chars[start as usize..end as usize].iter().collect()
}

/// First ten characters of a commit id
pub fn short_sha(sha: &str) -> String {
    sha.chars().take(10).collect()
}

pub fn sha1_hex(s: &str) -> String {
    hex::encode(Sha1::digest(s.as_bytes()))
}

pub fn md5_hex(s: &str) -> String {
    hex::encode(Md5::digest(s.as_bytes()))
}

/// Percent-encode a single path segment
pub fn path_escape(s: &str) -> String {
    utf8_percent_encode(s, PATH_SEGMENT).to_string()
}

/// Percent-encode each `/`-separated segment of a path
pub fn path_escape_segments(path: &str) -> String {
    path.split('/').map(path_escape).collect::<Vec<_>>().join("/")
}

/// Escape the characters that break a URL fragment or query (`% # space ?`)
pub fn escape_pound(s: &str) -> String {
    s.replace('%', "%25")
        .replace('#', "%23")
        .replace(' ', "%20")
        .replace('?', "%3F")
}

/// Lexically clean a slash-separated path
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            part => parts.push(part),
        }
    }
    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Join path elements onto a base URL, which may be absolute or relative
///
/// Returns an empty string when either side cannot be parsed.
pub fn url_join(base: &str, elems: &[&str]) -> String {
    let mut base = base.to_string();
    if !base.ends_with('/') {
        base.push('/');
    }

    let non_empty: Vec<&str> = elems.iter().copied().filter(|e| !e.is_empty()).collect();
    let joined = if non_empty.is_empty() {
        String::new()
    } else {
        clean_path(&non_empty.join("/"))
    };

    if let Ok(base_url) = Url::parse(&base) {
        return match base_url.join(&joined) {
            Ok(u) => u.to_string(),
            Err(_) => String::new(),
        };
    }

    // Relative base: resolve against a placeholder origin and keep the path part
    let resolved = Url::parse("http://localhost/")
        .and_then(|origin| origin.join(&base))
        .and_then(|base_url| base_url.join(&joined));
    match resolved {
        Ok(u) => {
            let path = &u[Position::BeforePath..];
            if base.starts_with('/') {
                path.to_string()
            } else {
                path.trim_start_matches('/').to_string()
            }
        }
        Err(_) => String::new(),
    }
}

/// Split a path at its last `/` into the directory (with slash) and base name
pub fn sub_jumpable_path(path: &str) -> Vec<String> {
    match path.rfind('/') {
        Some(index) => vec![path[..=index].to_string(), path[index + 1..].to_string()],
        None => vec![path.to_string()],
    }
}

/// Split a `date|time` deadline value
pub fn parse_deadline(deadline: &str) -> Vec<String> {
    deadline.split('|').map(|s| s.to_string()).collect()
}

/// MIME type registered for a file extension (without the dot)
pub fn mime_for_extension(ext: &str) -> Option<Mime> {
    let mime = match ext.to_lowercase().as_str() {
        "png" => mime::IMAGE_PNG,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "gif" => mime::IMAGE_GIF,
        "bmp" => mime::IMAGE_BMP,
        "svg" => mime::IMAGE_SVG,
        "webp" => "image/webp".parse().ok()?,
        "ico" => "image/x-icon".parse().ok()?,
        "tif" | "tiff" => "image/tiff".parse().ok()?,
        "avif" => "image/avif".parse().ok()?,
        "txt" => mime::TEXT_PLAIN,
        "htm" | "html" => mime::TEXT_HTML,
        "css" => mime::TEXT_CSS,
        "js" => mime::TEXT_JAVASCRIPT,
        "json" => mime::APPLICATION_JSON,
        "pdf" => mime::APPLICATION_PDF,
        _ => return None,
    };
    Some(mime)
}

pub fn filename_is_image(filename: &str) -> bool {
    let ext = match filename.rsplit_once('.') {
        Some((_, ext)) if !ext.contains('/') => ext,
        _ => return false,
    };
    mime_for_extension(ext)
        .map(|m| m.type_() == mime::IMAGE)
        .unwrap_or(false)
}

/// Tab width an `.editorconfig` assigns to a repository file
///
/// `filename` is relative to the repository root. Sections match by path
/// suffix, and `indent_size` stands in for a missing `tab_width`.
pub fn editorconfig_tab_width(editorconfig: &str, filename: &str) -> Option<usize> {
    let path = format!("/{}", filename.trim_start_matches('/'));
    let mut parser = match ConfigParser::new_buffered(editorconfig.as_bytes()) {
        Ok(parser) => parser,
        Err(e) => {
            tracing::warn!("Invalid .editorconfig: {}", e);
            return None;
        }
    };
    let mut props = Properties::new();
    if let Err(e) = (&mut parser).apply_to(&mut props, &path) {
        tracing::warn!("Invalid .editorconfig for {}: {}", filename, e);
        return None;
    }
    props.use_fallbacks();
    match props.get::<TabWidth>() {
        Ok(TabWidth::Value(width)) => Some(width),
        Err(_) => None,
    }
}

/// CSS class for the editor tab width of `filename`, defaulting to 8
pub fn tab_size_class(editorconfig: Option<&str>, filename: &str) -> String {
    match editorconfig.and_then(|ec| editorconfig_tab_width(ec, filename)) {
        Some(width) if width > 0 => format!("tab-size-{}", width),
        _ => "tab-size-8".to_string(),
    }
}

fn printf_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "<nil>".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Minimal printf supporting `%s`, `%d`, `%v` and `%%`
pub fn printf(format: &str, args: &[Value]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut args = args.iter();
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some(verb @ ('s' | 'd' | 'v')) => match args.next() {
                Some(value) => out.push_str(&printf_value(value)),
                None => out.push_str(&format!("%!{}(MISSING)", verb)),
            },
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }
    out
}
