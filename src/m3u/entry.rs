use super::{is_directive_row, is_extinf_row, Line, M3U_EXTINF_TAG};
use crate::errors::{PlaylistError, Result};
use crate::playlist::ChannelRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::ops::Range;
use tracing::{debug, warn};

/// Inline `key="value"` (or unquoted `key=value`) attributes of an `#EXTINF` line
static EXTINF_ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s=,"]+)=(?:"([^"]*)"|([^\s,"]*))"#).expect("extinf attribute pattern")
});

/// Metadata decoded from a single `#EXTINF` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtinfData {
    pub duration: i64,
    pub attributes: BTreeMap<String, String>,
    pub name: String,
}

/// Decode `#EXTINF:<duration> [key="value" ...],<name>`.
///
/// The name is whatever follows the last comma outside quotes. A missing or
/// unparseable duration becomes -1.
pub fn parse_extinf(row: &str) -> ExtinfData {
    let rest = row.strip_prefix(M3U_EXTINF_TAG).unwrap_or(row);
    let rest = rest.strip_prefix(':').unwrap_or(rest);

    let (meta, name) = match last_unquoted_comma(rest) {
        Some(pos) => (&rest[..pos], rest[pos + 1..].trim()),
        None => (rest, ""),
    };

    let meta = meta.trim_start();
    let token_end = meta
        .find(|c: char| c.is_whitespace() || c == ',')
        .unwrap_or(meta.len());
    let token = &meta[..token_end];

    let (duration, attrs_src) = match token.parse::<i64>() {
        Ok(d) => (d, &meta[token_end..]),
        Err(_) => {
            if token.is_empty() {
                debug!("no duration in \"{}\", defaulting to -1", row);
            } else if !token.contains('=') {
                warn!("unparseable duration \"{}\", defaulting to -1", token);
            }
            (-1, meta)
        }
    };

    let attributes = EXTINF_ATTR_RE
        .captures_iter(attrs_src)
        .map(|caps| {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            (caps[1].to_lowercase(), value)
        })
        .collect();

    ExtinfData {
        duration,
        attributes,
        name: name.to_string(),
    }
}

fn last_unquoted_comma(s: &str) -> Option<usize> {
    let mut in_quotes = false;
    let mut last = None;
    for (idx, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => last = Some(idx),
            _ => {}
        }
    }
    last
}

struct OpenEntry {
    line: usize,
    directive: String,
    data: ExtinfData,
    extras: Vec<String>,
}

/// Parse the channel entries of `body[range]`, in source order.
///
/// Directive rows written ahead of an `#EXTINF` and those between it and its
/// URL both end up in `extras`. A bare URL with no `#EXTINF` is kept as a plain
/// M3U entry. An `#EXTINF` whose URL never arrives inside the range is an error.
pub fn parse_chunk(body: &[Line], range: Range<usize>) -> Result<Vec<ChannelRecord>> {
    let rows = &body[range.clone()];
    let mut channels = Vec::new();
    let mut pending: Vec<String> = Vec::new();
    let mut open: Option<OpenEntry> = None;

    for row in rows {
        let text = row.text.as_str();
        if is_extinf_row(text) {
            if let Some(unfinished) = open.take() {
                return Err(missing_url(body, &range, unfinished));
            }
            open = Some(OpenEntry {
                line: row.number,
                directive: text.to_string(),
                data: parse_extinf(text),
                extras: std::mem::take(&mut pending),
            });
        } else if is_directive_row(text) {
            match open.as_mut() {
                Some(entry) => entry.extras.push(text.to_string()),
                None => pending.push(text.to_string()),
            }
        } else {
            let channel = match open.take() {
                Some(entry) => ChannelRecord {
                    duration: entry.data.duration,
                    attributes: entry.data.attributes,
                    extras: entry.extras,
                    name: entry.data.name,
                    url: text.to_string(),
                },
                None => {
                    debug!("line {}: URL without #EXTINF, keeping as plain entry", row.number);
                    ChannelRecord {
                        extras: std::mem::take(&mut pending),
                        ..ChannelRecord::new("", text)
                    }
                }
            };
            channels.push(channel);
        }
    }

    if let Some(unfinished) = open {
        return Err(missing_url(body, &range, unfinished));
    }
    if !pending.is_empty() {
        debug!("ignoring {} trailing directive row(s) with no channel", pending.len());
    }
    Ok(channels)
}

fn missing_url(body: &[Line], range: &Range<usize>, entry: OpenEntry) -> PlaylistError {
    let first = body[range.start].number;
    let last = body[range.end - 1].number;
    tracing::error!(
        "line {}: \"{}\" is not followed by a URL (chunk lines {}..{})",
        entry.line,
        entry.directive,
        first,
        last + 1
    );
    PlaylistError::MissingUrl {
        line: entry.line,
        directive: entry.directive,
        chunk: first..last + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(rows: &[&str]) -> Vec<Line> {
        rows.iter()
            .enumerate()
            .map(|(i, r)| Line {
                number: i + 2,
                text: r.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_parse_extinf_full() {
        let data = parse_extinf(
            r#"#EXTINF:-1 tvg-id="ntv.ru" TVG-Name="НТВ" group-title="Эфир, общие" tvg-logo="http://l/x.png?a=1",НТВ HD orig"#,
        );
        assert_eq!(data.duration, -1);
        assert_eq!(data.name, "НТВ HD orig");
        assert_eq!(data.attributes.get("tvg-id").map(String::as_str), Some("ntv.ru"));
        assert_eq!(data.attributes.get("tvg-name").map(String::as_str), Some("НТВ"));
        assert_eq!(data.attributes.get("group-title").map(String::as_str), Some("Эфир, общие"));
        assert_eq!(data.attributes.get("tvg-logo").map(String::as_str), Some("http://l/x.png?a=1"));
    }

    #[test]
    fn test_parse_extinf_minimal() {
        let data = parse_extinf("#EXTINF:10,Intro");
        assert_eq!(data.duration, 10);
        assert!(data.attributes.is_empty());
        assert_eq!(data.name, "Intro");
    }

    #[test]
    fn test_parse_extinf_lenient_duration() {
        assert_eq!(parse_extinf("#EXTINF:abc,X").duration, -1);
        assert_eq!(parse_extinf("#EXTINF:,X").duration, -1);
        let data = parse_extinf(r#"#EXTINF:tvg-id="a",X"#);
        assert_eq!(data.duration, -1);
        assert_eq!(data.attributes.get("tvg-id").map(String::as_str), Some("a"));
    }

    #[test]
    fn test_name_after_last_comma() {
        assert_eq!(parse_extinf("#EXTINF:-1,Foo, Bar").name, "Bar");
        assert_eq!(parse_extinf("#EXTINF:-1").name, "");
    }

    #[test]
    fn test_extras_before_and_after_extinf() {
        let b = body(&[
            "#EXTVLCOPT:http-user-agent=x",
            "#EXTINF:-1,A",
            "#EXTGRP:News",
            "http://a",
            "#EXTINF:-1,B",
            "http://b",
        ]);
        let channels = parse_chunk(&b, 0..b.len()).unwrap();
        assert_eq!(channels.len(), 2);
        assert_eq!(
            channels[0].extras,
            vec!["#EXTVLCOPT:http-user-agent=x".to_string(), "#EXTGRP:News".to_string()]
        );
        assert!(channels[1].extras.is_empty());
    }

    #[test]
    fn test_bare_url_is_plain_entry() {
        let b = body(&["http://plain", "#EXTINF:-1,A", "http://a"]);
        let channels = parse_chunk(&b, 0..b.len()).unwrap();
        assert_eq!(channels[0].name, "");
        assert_eq!(channels[0].duration, -1);
        assert_eq!(channels[0].url, "http://plain");
        assert_eq!(channels[1].name, "A");
    }

    #[test]
    fn test_extinf_followed_by_extinf_fails() {
        let b = body(&["#EXTINF:-1,A", "#EXTINF:-1,B", "http://b"]);
        match parse_chunk(&b, 0..b.len()).unwrap_err() {
            PlaylistError::MissingUrl { line, directive, chunk } => {
                assert_eq!(line, 2);
                assert_eq!(directive, "#EXTINF:-1,A");
                assert_eq!(chunk, 2..5);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_extinf_at_end_of_range_fails() {
        let b = body(&["#EXTINF:-1,A", "http://a", "#EXTINF:-1,B", "#EXTGRP:x"]);
        let err = parse_chunk(&b, 0..b.len()).unwrap_err();
        assert!(matches!(err, PlaylistError::MissingUrl { line: 4, .. }));
    }

    #[test]
    fn test_only_scans_inside_range() {
        let b = body(&["#EXTINF:-1,A", "http://a", "#EXTINF:-1,B", "http://b"]);
        let channels = parse_chunk(&b, 2..4).unwrap();
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].name, "B");
    }
}
