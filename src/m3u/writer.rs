use super::{M3U_EXTINF_TAG, M3U_HEADER_TAG};
use crate::errors::Result;
use crate::playlist::{ChannelRecord, Playlist};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

fn push_attributes(out: &mut String, attributes: &BTreeMap<String, String>) {
    for (key, value) in attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(value);
        out.push('"');
    }
}

pub fn header_line(playlist: &Playlist) -> String {
    let mut out = String::from(M3U_HEADER_TAG);
    push_attributes(&mut out, playlist.attributes());
    out
}

pub fn extinf_line(channel: &ChannelRecord) -> String {
    let mut out = format!("{}:{}", M3U_EXTINF_TAG, channel.duration);
    push_attributes(&mut out, &channel.attributes);
    out.push(',');
    out.push_str(&channel.name);
    out
}

/// Render a playlist as M3U+ text: header, then per channel the `#EXTINF`
/// line, its extras verbatim and the URL. Always ends with a newline.
pub fn to_m3u_plus_playlist(playlist: &Playlist) -> String {
    let mut out = header_line(playlist);
    out.push('\n');
    for channel in playlist.channels() {
        out.push_str(&extinf_line(channel));
        out.push('\n');
        for extra in &channel.extras {
            out.push_str(extra);
            out.push('\n');
        }
        out.push_str(&channel.url);
        out.push('\n');
    }
    out
}

/// Write the serialized playlist to `path`
pub fn dumpf<P: AsRef<Path>>(playlist: &Playlist, path: P) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, to_m3u_plus_playlist(playlist))?;
    debug!("wrote {} channels to {}", playlist.len(), path.display());
    Ok(())
}
