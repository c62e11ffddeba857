//! M3U / M3U+ reading and writing.
//!
//! Reading goes through a fixed pipeline: blank lines are dropped and line
//! endings normalized, the `#EXTM3U` header is decoded, the body is cut into
//! chunks that never split a channel entry, every chunk is parsed on the rayon
//! pool and the per-chunk channels are concatenated back in chunk order.

pub mod chunker;
pub mod entry;
pub mod header;
pub mod writer;

use crate::errors::{PlaylistError, Result};
use crate::playlist::{ChannelRecord, Playlist, PlaylistAttributes};
use rayon::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, error};

pub use writer::{dumpf, to_m3u_plus_playlist};

pub const M3U_HEADER_TAG: &str = "#EXTM3U";
pub const M3U_EXTINF_TAG: &str = "#EXTINF";

/// A non-blank source line together with its 1-based line number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub number: usize,
    pub text: String,
}

pub fn is_header_row(row: &str) -> bool {
    row.starts_with(M3U_HEADER_TAG)
}

pub fn is_extinf_row(row: &str) -> bool {
    row.starts_with(M3U_EXTINF_TAG)
}

/// Any `#` line: entry directives, `#EXTGRP`, `#EXTVLCOPT`, comments
pub fn is_directive_row(row: &str) -> bool {
    row.starts_with('#')
}

pub fn is_url_row(row: &str) -> bool {
    !is_directive_row(row)
}

/// Drop blank and whitespace-only rows, strip a UTF-8 BOM and surrounding
/// whitespace (including `\r`), and remember where each surviving row came from.
pub fn normalize_lines<I, S>(rows: I) -> Vec<Line>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    rows.into_iter()
        .enumerate()
        .filter_map(|(idx, row)| {
            let row = row.as_ref();
            let row = if idx == 0 { row.trim_start_matches('\u{feff}') } else { row };
            let text = row.trim();
            if text.is_empty() {
                None
            } else {
                Some(Line {
                    number: idx + 1,
                    text: text.to_string(),
                })
            }
        })
        .collect()
}

/// Playlist reader with a configurable degree of chunking
#[derive(Debug, Clone)]
pub struct PlaylistParser {
    chunks: usize,
}

impl Default for PlaylistParser {
    fn default() -> Self {
        Self {
            chunks: rayon::current_num_threads(),
        }
    }
}

impl PlaylistParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split the body into (at most) `chunks` pieces; 0 is treated as 1
    pub fn with_chunks(chunks: usize) -> Self {
        Self {
            chunks: chunks.max(1),
        }
    }

    pub fn chunks(&self) -> usize {
        self.chunks
    }

    pub fn parse_lines<S: AsRef<str>>(&self, rows: &[S]) -> Result<Playlist> {
        let lines = normalize_lines(rows);
        self.parse_normalized(lines)
    }

    pub fn parse_str(&self, text: &str) -> Result<Playlist> {
        self.parse_normalized(normalize_lines(text.split('\n')))
    }

    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Playlist> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            error!("expected UTF-8 text, got invalid bytes: {}", e);
            PlaylistError::WrongType(format!("UTF-8 text expected ({})", e))
        })?;
        self.parse_str(text)
    }

    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Playlist> {
        let path = path.as_ref();
        debug!("reading playlist from {}", path.display());
        let bytes = std::fs::read(path)?;
        self.parse_bytes(&bytes)
    }

    fn parse_normalized(&self, lines: Vec<Line>) -> Result<Playlist> {
        let Some((header, body)) = lines.split_first() else {
            error!("a playlist should have at least 1 row");
            return Err(PlaylistError::MalformedPlaylist(
                "a playlist should have at least 1 row".to_string(),
            ));
        };

        let attributes = header::parse_header(header)?;
        if body.is_empty() {
            debug!("header-only playlist, no channels to parse");
            return Ok(Playlist::with_attributes(attributes));
        }

        let ranges = chunker::chunk_body(body, self.chunks);
        debug!(
            "parsing {} body rows in {} chunk(s) (requested {})",
            body.len(),
            ranges.len(),
            self.chunks
        );

        // Chunks after the lowest failing one are skipped; every chunk before
        // it has run, so the first Err in index order is the one reported.
        let first_failed = AtomicUsize::new(usize::MAX);
        let results: Vec<Option<Result<Vec<ChannelRecord>>>> = ranges
            .into_par_iter()
            .enumerate()
            .map(|(idx, range)| {
                if idx > first_failed.load(Ordering::Relaxed) {
                    debug!("skipping chunk {} after an earlier failure", idx);
                    return None;
                }
                debug!("parsing chunk (beginning: {}, end: {})", range.start, range.end);
                let result = entry::parse_chunk(body, range);
                if result.is_err() {
                    first_failed.fetch_min(idx, Ordering::Relaxed);
                }
                Some(result)
            })
            .collect();

        let mut per_chunk = Vec::with_capacity(results.len());
        for result in results.into_iter().flatten() {
            per_chunk.push(result?);
        }

        Ok(aggregate(attributes, per_chunk))
    }
}

/// Concatenate per-chunk channel lists, in chunk order, under one header
pub fn aggregate(attributes: PlaylistAttributes, per_chunk: Vec<Vec<ChannelRecord>>) -> Playlist {
    let mut playlist = Playlist::with_attributes(attributes);
    for channels in per_chunk {
        playlist.append_channels(channels);
    }
    debug!("aggregated {} channels", playlist.len());
    playlist
}

/// Parse an ordered sequence of rows (e.g. the lines of a file)
pub fn loadl<S: AsRef<str>>(rows: &[S]) -> Result<Playlist> {
    PlaylistParser::new().parse_lines(rows)
}

/// Parse a whole playlist held in memory
pub fn loads(text: &str) -> Result<Playlist> {
    PlaylistParser::new().parse_str(text)
}

/// Parse raw bytes, failing with `WrongType` when they are not UTF-8
pub fn loadb(bytes: &[u8]) -> Result<Playlist> {
    PlaylistParser::new().parse_bytes(bytes)
}

/// Read and parse a playlist file
pub fn loadf<P: AsRef<Path>>(path: P) -> Result<Playlist> {
    PlaylistParser::new().parse_file(path)
}
