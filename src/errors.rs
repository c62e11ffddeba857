use std::ops::Range;
use thiserror::Error;

/// Error type for playlist ingestion and curation
#[derive(Debug, Error)]
pub enum PlaylistError {
    /// Input is not the expected shape (e.g. bytes that are not UTF-8)
    #[error("Wrong type: {0}")]
    WrongType(String),

    /// Missing or misplaced header, or an otherwise unusable playlist
    #[error("Malformed playlist: {0}")]
    MalformedPlaylist(String),

    /// A channel entry directive that is never followed by its URL
    #[error("Malformed playlist: line {line} has no URL line (chunk lines {}..{})", .chunk.start, .chunk.end)]
    MissingUrl {
        line: usize,
        directive: String,
        chunk: Range<usize>,
    },

    /// Reading or writing a playlist file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlaylistError {
    /// True for every variant that means "the text is not a valid playlist"
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            PlaylistError::MalformedPlaylist(_) | PlaylistError::MissingUrl { .. }
        )
    }

    /// Get detailed diagnostic information about the error
    pub fn diagnostics(&self) -> String {
        match self {
            PlaylistError::WrongType(reason) => {
                format!("Wrong Input Type\nReason: {}\nSuggestion: Make sure the playlist is UTF-8 text", reason)
            }
            PlaylistError::MalformedPlaylist(reason) => {
                format!("Malformed Playlist\nReason: {}\nSuggestion: The first non-blank line must start with #EXTM3U", reason)
            }
            PlaylistError::MissingUrl { line, directive, chunk } => {
                format!(
                    "Malformed Playlist\nLine: {}\nDirective: {}\nChunk: lines {}..{}\nSuggestion: Every #EXTINF line must be followed by a URL line",
                    line, directive, chunk.start, chunk.end
                )
            }
            PlaylistError::Io(source) => {
                format!("IO Error\nError: {}\nSuggestion: Check the file path and permissions", source)
            }
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, PlaylistError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_url_display_names_line_and_range() {
        let err = PlaylistError::MissingUrl {
            line: 7,
            directive: "#EXTINF:-1,News".to_string(),
            chunk: 4..9,
        };
        assert_eq!(
            err.to_string(),
            "Malformed playlist: line 7 has no URL line (chunk lines 4..9)"
        );
        assert!(err.is_malformed());
        assert!(err.diagnostics().contains("#EXTINF:-1,News"));
    }

    #[test]
    fn test_io_is_not_malformed() {
        let err = PlaylistError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(!err.is_malformed());
    }
}
