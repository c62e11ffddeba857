use super::{is_url_row, Line};
use std::ops::Range;

/// Cut the body into at most `chunks` contiguous, non-empty ranges.
///
/// A cut is only placed right after a URL row, i.e. where a new channel entry
/// (its `#EXTINF` plus any directives written ahead of it) begins. An entry is
/// therefore never split between two chunks. The ranges cover every row with
/// no gaps or overlaps; a short body yields fewer, larger chunks.
pub fn chunk_body(body: &[Line], chunks: usize) -> Vec<Range<usize>> {
    let len = body.len();
    if len == 0 {
        return Vec::new();
    }
    let chunks = chunks.clamp(1, len);

    let mut ranges = Vec::with_capacity(chunks);
    let mut begin = 0;
    for k in 1..chunks {
        let target = (k * len / chunks).max(begin + 1);
        match next_boundary(body, target) {
            Some(cut) => {
                ranges.push(begin..cut);
                begin = cut;
            }
            None => break,
        }
    }
    ranges.push(begin..len);
    ranges
}

/// First index `>= from` at which a new channel entry starts
fn next_boundary(body: &[Line], from: usize) -> Option<usize> {
    (from.max(1)..body.len()).find(|&i| is_url_row(&body[i - 1].text))
}
