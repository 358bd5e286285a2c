//! Canonical "Artist - Title" keys used for sorting and duplicate detection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::normalize::{normalize, title_case};
use crate::Entry;

/// Description suffix the provider appends to auto-generated uploads.
pub const AUTO_GENERATED_MARKER: &str = "\n\nAuto-generated by YouTube.";

/// Suffix of auto-generated artist channels, after normalization.
pub const TOPIC_SUFFIX: &str = " - topic";

/// Data driving artist attribution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HashingConfig {
    /// Description suffix identifying auto-generated uploads.
    pub auto_generated_marker: String,
    /// Normalized channel-name suffix stripped from official artist channels.
    pub topic_suffix: String,
    /// Channel IDs whose uploads are treated as official.
    pub official_channels: Vec<String>,
    /// Normalized artist names mapped to their canonical spelling.
    pub artist_aliases: BTreeMap<String, String>,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            auto_generated_marker: AUTO_GENERATED_MARKER.to_string(),
            topic_suffix: TOPIC_SUFFIX.to_string(),
            official_channels: vec![
                "UCus8EVJ7Oc9zINhs-fg8l1Q".to_string(), // Turbo
                "UC9EzN5XNxhxqHZevM9kSuaw".to_string(), // Approaching Nirvana
                "UCZU9T1ceaOgwfLRq7OKFU4Q".to_string(), // Linkin Park
            ],
            artist_aliases: BTreeMap::from([
                (
                    "approachingnirvana".to_string(),
                    "approaching nirvana".to_string(),
                ),
                ("planetsaxon".to_string(), "saxon".to_string()),
            ]),
        }
    }
}

/// Builds canonical keys from entries.
#[derive(Debug, Clone, Default)]
pub struct SongHasher {
    config: HashingConfig,
}

impl SongHasher {
    pub const fn new(config: HashingConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &HashingConfig {
        &self.config
    }

    /// Whether the entry was uploaded by the rights-holder's own pipeline.
    pub fn is_official(&self, entry: &Entry) -> bool {
        self.is_auto_generated(entry)
            || entry
                .channel_id
                .as_ref()
                .is_some_and(|id| self.config.official_channels.contains(id))
    }

    /// Whether the entry is an auto-generated upload.
    pub fn is_auto_generated(&self, entry: &Entry) -> bool {
        entry.description.ends_with(&self.config.auto_generated_marker)
    }

    /// Normalized artist name for an official channel.
    fn artist(&self, channel_name: &str) -> String {
        let artist = normalize(channel_name);
        let artist = artist
            .strip_suffix(&self.config.topic_suffix)
            .map_or(artist.as_str(), str::trim_end);

        self.config
            .artist_aliases
            .get(artist)
            .cloned()
            .unwrap_or_else(|| artist.to_string())
    }

    /// Canonical key of an entry, ignoring any memoized value.
    pub fn canonical_key(&self, entry: &Entry) -> String {
        let mut title = normalize(&entry.title);

        if self.is_official(entry) {
            let artist = entry
                .channel_name
                .as_deref()
                .map(|name| self.artist(name))
                .unwrap_or_default();

            if !artist.is_empty() {
                // Official videos sometimes carry the artist at the end
                let suffix = format!(" - {artist}");
                if let Some(stripped) = title.strip_suffix(&suffix) {
                    title = stripped.to_string();
                }
                title = format!("{artist} - {title}");
            }
        }

        title_case(&title)
    }

    /// Memoize canonical keys on every entry.
    pub fn annotate(&self, entries: &mut [Entry]) {
        for entry in entries {
            entry.canonical_key = Some(self.canonical_key(entry));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const APPROACHING_NIRVANA: &str = "UC9EzN5XNxhxqHZevM9kSuaw";

    fn hasher() -> SongHasher {
        SongHasher::default()
    }

    #[test]
    fn test_official_channel_prefixes_artist() {
        let entry = Entry::new("v1", "p1", "Dead Planet", 0)
            .with_channel(APPROACHING_NIRVANA, "Approaching Nirvana");
        assert_eq!(
            hasher().canonical_key(&entry),
            "Approaching Nirvana - Dead Planet"
        );
    }

    #[test]
    fn test_alias_applied() {
        let entry = Entry::new("v1", "p1", "Dead Planet", 0)
            .with_channel(APPROACHING_NIRVANA, "ApproachingNirvana");
        assert_eq!(
            hasher().canonical_key(&entry),
            "Approaching Nirvana - Dead Planet"
        );
    }

    #[test]
    fn test_non_official_title_unchanged() {
        let entry = Entry::new("v1", "p1", "Artist - Song", 0).with_channel("UCother", "Someone");
        assert_eq!(hasher().canonical_key(&entry), "Artist - Song");
    }

    #[test]
    fn test_auto_generated_topic_channel() {
        let entry = Entry::new("v1", "p1", "Breaking the Law", 0)
            .with_description(format!("Provided to YouTube{AUTO_GENERATED_MARKER}"))
            .with_channel("UCtopic", "Judas Priest - Topic");
        assert_eq!(
            hasher().canonical_key(&entry),
            "Judas Priest - Breaking The Law"
        );
    }

    #[test]
    fn test_trailing_artist_not_repeated() {
        let entry = Entry::new("v1", "p1", "Numb - Linkin Park", 0)
            .with_channel("UCZU9T1ceaOgwfLRq7OKFU4Q", "Linkin Park");
        assert_eq!(hasher().canonical_key(&entry), "Linkin Park - Numb");
    }

    #[test]
    fn test_official_and_uploader_copies_collapse() {
        let official = Entry::new("v1", "p1", "Painkiller (Official Audio)", 0)
            .with_description(format!("Painkiller{AUTO_GENERATED_MARKER}"))
            .with_channel("UCjp", "Judas Priest - Topic");
        let fan = Entry::new("v2", "p2", "JUDAS PRIEST: Painkiller [HD]", 1)
            .with_channel("UCfan", "Metal Uploads");
        assert_eq!(
            hasher().canonical_key(&official),
            hasher().canonical_key(&fan)
        );
    }

    #[test]
    fn test_cosmetic_variation_same_key() {
        let a = Entry::new("v1", "p1", "Daft Punk - Around the World (Official Video)", 0);
        let b = Entry::new("v2", "p2", "DAFT PUNK - Around The World!", 1);
        assert_eq!(hasher().canonical_key(&a), hasher().canonical_key(&b));
    }

    #[test]
    fn test_official_without_channel_name() {
        let entry = Entry::new("v1", "p1", "Song", 0)
            .with_description(format!("x{AUTO_GENERATED_MARKER}"));
        assert_eq!(hasher().canonical_key(&entry), "Song");
    }

    #[test]
    fn test_annotate_memoizes() {
        let mut entries = vec![Entry::new("v1", "p1", "a - b", 0)];
        hasher().annotate(&mut entries);
        assert_eq!(entries[0].key(), "A - B");
    }
}
