use super::{is_header_row, Line, M3U_HEADER_TAG};
use crate::errors::{PlaylistError, Result};
use crate::playlist::PlaylistAttributes;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::error;

/// `key="value"`, `key=value` or a bare `key`
static HEADER_ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s=,"]+)(?:=(?:"([^"]*)"|([^\s,"]*)))?"#).expect("header attribute pattern")
});

/// Decode the `#EXTM3U` line. Keys are kept as written, bare keys map to "".
pub fn parse_header(line: &Line) -> Result<PlaylistAttributes> {
    let row = line.text.trim();
    if !is_header_row(row) {
        error!(
            "the playlist's first row should start with \"{}\", but it's \"{}\"",
            M3U_HEADER_TAG, row
        );
        return Err(PlaylistError::MalformedPlaylist(format!(
            "Missing or misplaced {} row (line {})",
            M3U_HEADER_TAG, line.number
        )));
    }

    let rest = &row[M3U_HEADER_TAG.len()..];
    let attributes = HEADER_ATTR_RE
        .captures_iter(rest)
        .map(|caps| {
            let key = caps[1].to_string();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            (key, value)
        })
        .collect();
    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> Line {
        Line {
            number: 1,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_plain_header() {
        assert!(parse_header(&line("#EXTM3U")).unwrap().is_empty());
    }

    #[test]
    fn test_header_attributes() {
        let attrs = parse_header(&line(
            r#"#EXTM3U url-tvg="http://epg.example/a b.xml" tvg-shift=2 refresh"#,
        ))
        .unwrap();
        assert_eq!(attrs.get("url-tvg").map(String::as_str), Some("http://epg.example/a b.xml"));
        assert_eq!(attrs.get("tvg-shift").map(String::as_str), Some("2"));
        assert_eq!(attrs.get("refresh").map(String::as_str), Some(""));
        assert_eq!(attrs.len(), 3);
    }

    #[test]
    fn test_unknown_keys_kept_verbatim() {
        let attrs = parse_header(&line(r#"#EXTM3U X-Custom-Key="1""#)).unwrap();
        assert_eq!(attrs.get("X-Custom-Key").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_header_is_case_sensitive() {
        let err = parse_header(&line("#extm3u")).unwrap_err();
        assert!(matches!(err, PlaylistError::MalformedPlaylist(_)));
    }

    #[test]
    fn test_missing_header() {
        let err = parse_header(&line("#EXTINF:-1,News")).unwrap_err();
        assert!(err.is_malformed());
    }
}
