use std::collections::BTreeMap;

/// Attributes decoded from the `#EXTM3U` header line (e.g. `url-tvg`)
pub type PlaylistAttributes = BTreeMap<String, String>;

/// One channel entry: the `#EXTINF` metadata, its extra directives and the URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRecord {
    /// Duration in seconds, -1 for live streams
    pub duration: i64,
    /// Inline attributes, keys lower-cased (tvg-id, tvg-name, group-title, tvg-logo...)
    pub attributes: BTreeMap<String, String>,
    /// Raw directive lines attached to the entry, kept verbatim (e.g. `#EXTGRP:News`)
    pub extras: Vec<String>,
    pub name: String,
    pub url: String,
}

impl ChannelRecord {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            duration: -1,
            attributes: BTreeMap::new(),
            extras: Vec::new(),
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extras.push(extra.into());
        self
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(key.to_lowercase(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(&key.to_lowercase()).map(String::as_str)
    }

    /// The `group-title` attribute, if any
    pub fn group_title(&self) -> Option<&str> {
        self.attribute("group-title")
    }

    pub fn first_extra(&self) -> Option<&str> {
        self.extras.first().map(String::as_str)
    }
}

/// A parsed playlist: header attributes plus channels in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    attributes: PlaylistAttributes,
    channels: Vec<ChannelRecord>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attributes(attributes: PlaylistAttributes) -> Self {
        Self {
            attributes,
            channels: Vec::new(),
        }
    }

    pub fn append_channel(&mut self, channel: ChannelRecord) {
        self.channels.push(channel);
    }

    pub fn append_channels<I>(&mut self, channels: I)
    where
        I: IntoIterator<Item = ChannelRecord>,
    {
        self.channels.extend(channels);
    }

    pub fn attributes(&self) -> &PlaylistAttributes {
        &self.attributes
    }

    pub fn channels(&self) -> &[ChannelRecord] {
        &self.channels
    }

    pub fn channel(&self, index: usize) -> Option<&ChannelRecord> {
        self.channels.get(index)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_lookup_is_case_insensitive() {
        let ch = ChannelRecord::new("News", "http://x/1").with_attribute("Group-Title", "Info");
        assert_eq!(ch.group_title(), Some("Info"));
        assert_eq!(ch.attribute("GROUP-TITLE"), Some("Info"));
    }

    #[test]
    fn test_append_keeps_order() {
        let mut pl = Playlist::new();
        pl.append_channel(ChannelRecord::new("B", "http://x/b"));
        pl.append_channels(vec![
            ChannelRecord::new("A", "http://x/a"),
            ChannelRecord::new("C", "http://x/c"),
        ]);
        let names: Vec<_> = pl.channels().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
        assert_eq!(pl.len(), 3);
        assert!(pl.channel(3).is_none());
    }
}
