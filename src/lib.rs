pub mod config;
pub mod curation;
pub mod errors;
pub mod m3u;
pub mod parser;
pub mod playlist;

pub use config::CurationConfig;
pub use curation::{Curated, CurationEngine, CurationReport};
pub use errors::{PlaylistError, Result};
pub use m3u::{dumpf, loadb, loadf, loadl, loads, to_m3u_plus_playlist, PlaylistParser};
pub use parser::{classify_name, Classification, ClassifiedFields, Quality};
pub use playlist::{ChannelRecord, Playlist, PlaylistAttributes};
