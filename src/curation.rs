use crate::config::CurationConfig;
use crate::parser::{classify_name, Classification};
use crate::playlist::{ChannelRecord, Playlist};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Why a channel was left out of the curated playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DropReason {
    Region,
    Name,
    CountryCode,
}

/// Outcome for a single channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Drop(DropReason),
    /// Kept; `slot` is its catalog position, `None` means overflow
    Keep {
        slot: Option<usize>,
        classification: Classification,
    },
}

/// Counters and observations collected during one curation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CurationReport {
    pub source_channels: usize,
    pub kept: usize,
    pub dropped_region: usize,
    pub dropped_name: usize,
    pub dropped_country_code: usize,
    pub catalog_slots_filled: usize,
    pub overflow: usize,
    /// First-extra lines seen on kept channels
    pub regions_seen: BTreeSet<String>,
    /// Country codes classified from kept channel names
    pub country_codes_seen: BTreeSet<String>,
}

#[derive(Debug, Clone)]
pub struct Curated {
    pub playlist: Playlist,
    pub report: CurationReport,
}

/// Filters a playlist and orders the survivors by a canonical catalog
#[derive(Debug, Clone)]
pub struct CurationEngine {
    catalog: Vec<String>,
    catalog_index: HashMap<String, usize>,
    exclude_regions: HashSet<String>,
    exclude_name_substrings: Vec<String>,
    exclude_country_codes: HashSet<String>,
}

impl CurationEngine {
    pub fn new(config: CurationConfig) -> Self {
        let mut catalog_index = HashMap::with_capacity(config.catalog.len());
        for (idx, name) in config.catalog.iter().enumerate() {
            catalog_index.entry(name.clone()).or_insert(idx);
        }
        let mut exclude_name_substrings: Vec<String> =
            config.exclude_name_substrings.into_iter().collect();
        exclude_name_substrings.sort();

        Self {
            catalog: config.catalog,
            catalog_index,
            exclude_regions: config.exclude_regions,
            exclude_name_substrings,
            exclude_country_codes: config.exclude_country_codes,
        }
    }

    /// Only the first extra is compared; a channel without extras is never skipped here.
    pub fn skip_region(&self, channel: &ChannelRecord) -> bool {
        channel
            .first_extra()
            .is_some_and(|extra| self.exclude_regions.contains(extra))
    }

    pub fn skip_name(&self, channel: &ChannelRecord) -> bool {
        self.exclude_name_substrings
            .iter()
            .any(|needle| channel.name.contains(needle.as_str()))
    }

    pub fn skip_country_code(&self, classification: &Classification) -> bool {
        classification
            .country_code()
            .is_some_and(|cc| self.exclude_country_codes.contains(cc))
    }

    /// Exact, case-sensitive lookup of the unmodified display name
    pub fn catalog_slot(&self, name: &str) -> Option<usize> {
        self.catalog_index.get(name).copied()
    }

    /// Run the filters in priority order, stopping at the first that applies
    pub fn decide(&self, channel: &ChannelRecord) -> Decision {
        if self.skip_region(channel) {
            return Decision::Drop(DropReason::Region);
        }
        if self.skip_name(channel) {
            return Decision::Drop(DropReason::Name);
        }
        let classification = classify_name(&channel.name);
        if self.skip_country_code(&classification) {
            return Decision::Drop(DropReason::CountryCode);
        }
        Decision::Keep {
            slot: self.catalog_slot(&channel.name),
            classification,
        }
    }

    /// Build a new playlist: filled catalog slots in catalog order, then the
    /// unmatched channels in the order they were met. A later channel with
    /// the same catalog name replaces an earlier one.
    pub fn curate(&self, source: &Playlist) -> Curated {
        let mut report = CurationReport {
            source_channels: source.len(),
            ..Default::default()
        };
        let mut slots: Vec<Option<&ChannelRecord>> = vec![None; self.catalog.len()];
        let mut overflow: Vec<&ChannelRecord> = Vec::new();

        for (index, channel) in source.channels().iter().enumerate() {
            match self.decide(channel) {
                Decision::Drop(reason) => {
                    debug!("{}\t{} -> dropped ({:?})", index, channel.name, reason);
                    match reason {
                        DropReason::Region => report.dropped_region += 1,
                        DropReason::Name => report.dropped_name += 1,
                        DropReason::CountryCode => report.dropped_country_code += 1,
                    }
                }
                Decision::Keep { slot, classification } => {
                    debug!("{}\t{} -> {}", index, channel.name, classification);
                    if let Some(extra) = channel.first_extra() {
                        report.regions_seen.insert(extra.to_string());
                    }
                    if let Some(cc) = classification.country_code() {
                        report.country_codes_seen.insert(cc.to_string());
                    }
                    match slot {
                        Some(slot) => slots[slot] = Some(channel),
                        None => overflow.push(channel),
                    }
                }
            }
        }

        let mut playlist = Playlist::with_attributes(source.attributes().clone());
        playlist.append_channels(slots.into_iter().flatten().cloned());
        report.catalog_slots_filled = playlist.len();
        report.overflow = overflow.len();
        playlist.append_channels(overflow.into_iter().cloned());
        report.kept = playlist.len();

        Curated { playlist, report }
    }
}
