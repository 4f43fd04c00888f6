//! Audio stream variants and best-variant selection
//!
//! A play-url document lists audio tracks in three places:
//! - `dash.audio[]` - the regular 64K/132K/192K tracks
//! - `dash.dolby.audio[]` - Dolby Atmos tracks (optional)
//! - `dash.flac.audio` - the Hi-Res lossless track (optional, a single object)
//!
//! Documents using the legacy single-file layout (`durl`) carry no separate
//! audio track and yield no variants.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Audio quality tier
///
/// Declaration order is the selection order (lowest first). The platform's
/// numeric ids are opaque and are only used for lookup, never compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AudioQuality {
    /// 64 kbps
    #[serde(rename = "64K")]
    K64,
    /// 132 kbps
    #[serde(rename = "132K")]
    K132,
    /// 192 kbps
    #[serde(rename = "192K")]
    K192,
    /// Hi-Res lossless
    #[serde(rename = "HI_RES")]
    HiRes,
    /// Dolby Atmos
    #[serde(rename = "DOLBY")]
    Dolby,
}

impl AudioQuality {
    /// All tiers, highest first (the scan order used by [`StreamSource::best_variant`])
    pub const PRIORITY: [AudioQuality; 5] = [
        AudioQuality::Dolby,
        AudioQuality::HiRes,
        AudioQuality::K192,
        AudioQuality::K132,
        AudioQuality::K64,
    ];

    /// Map a platform quality id to a tier
    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            30216 => Some(AudioQuality::K64),
            30232 => Some(AudioQuality::K132),
            30280 => Some(AudioQuality::K192),
            30251 => Some(AudioQuality::HiRes),
            30250 => Some(AudioQuality::Dolby),
            _ => None,
        }
    }

    /// The platform quality id of this tier
    pub fn id(&self) -> i64 {
        match self {
            AudioQuality::K64 => 30216,
            AudioQuality::K132 => 30232,
            AudioQuality::K192 => 30280,
            AudioQuality::HiRes => 30251,
            AudioQuality::Dolby => 30250,
        }
    }

    /// Short label used in file names ("64K", "HI_RES", ...)
    pub fn name(&self) -> &'static str {
        match self {
            AudioQuality::K64 => "64K",
            AudioQuality::K132 => "132K",
            AudioQuality::K192 => "192K",
            AudioQuality::HiRes => "HI_RES",
            AudioQuality::Dolby => "DOLBY",
        }
    }
}

impl std::fmt::Display for AudioQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for AudioQuality {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "64K" => Ok(AudioQuality::K64),
            "132K" => Ok(AudioQuality::K132),
            "192K" => Ok(AudioQuality::K192),
            "HI_RES" | "HIRES" | "FLAC" => Ok(AudioQuality::HiRes),
            "DOLBY" => Ok(AudioQuality::Dolby),
            other => Err(crate::error::Error::InvalidInput(format!(
                "unknown audio quality: {}",
                other
            ))),
        }
    }
}

/// One downloadable audio track
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamVariant {
    /// Primary URL
    pub url: String,
    /// Mirror URLs listed by the platform
    pub backup_urls: Vec<String>,
    /// Raw platform quality id
    pub quality_id: i64,
    /// Tier, when the id is a known one
    pub quality: Option<AudioQuality>,
}

impl StreamVariant {
    /// Label for file names; unknown tiers use the raw id
    pub fn quality_label(&self) -> String {
        match self.quality {
            Some(q) => q.name().to_string(),
            None => self.quality_id.to_string(),
        }
    }
}

/// Audio variants extracted from one play-url document
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamSource {
    variants: Vec<StreamVariant>,
}

impl StreamSource {
    /// Extract audio variants from a play-url document
    ///
    /// Accepts either the full response envelope or its `data` object.
    pub fn from_document(document: &Value) -> Self {
        let data = document
            .get("data")
            .filter(|d| d.is_object())
            .unwrap_or(document);

        let Some(dash) = data.get("dash").filter(|d| d.is_object()) else {
            if data.get("durl").is_some() {
                tracing::debug!("play-url document uses the legacy durl layout, no audio tracks");
            }
            return Self::default();
        };

        let mut variants = Vec::new();

        if let Some(tracks) = dash.get("audio").and_then(Value::as_array) {
            variants.extend(tracks.iter().filter_map(parse_track));
        }
        if let Some(tracks) = dash
            .get("dolby")
            .and_then(|d| d.get("audio"))
            .and_then(Value::as_array)
        {
            variants.extend(tracks.iter().filter_map(parse_track));
        }
        if let Some(track) = dash
            .get("flac")
            .and_then(|f| f.get("audio"))
            .filter(|a| a.is_object())
        {
            variants.extend(parse_track(track));
        }

        Self { variants }
    }

    /// Build a source from already-parsed variants
    pub fn from_variants(variants: Vec<StreamVariant>) -> Self {
        Self { variants }
    }

    /// All variants in document order
    pub fn list_variants(&self) -> &[StreamVariant] {
        &self.variants
    }

    /// Consume the source, returning its variants
    pub fn into_variants(self) -> Vec<StreamVariant> {
        self.variants
    }

    /// Whether the document had no audio tracks
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// First variant of exactly the given tier
    pub fn variant_for(&self, quality: AudioQuality) -> Option<&StreamVariant> {
        self.variants.iter().find(|v| v.quality == Some(quality))
    }

    /// Best variant at or below `ceiling`
    ///
    /// Tiers are scanned from highest to lowest; within a tier the first variant
    /// in document order wins. When no known tier qualifies, the first variant
    /// with an unrecognised tier is returned. A known tier above the ceiling is
    /// never returned.
    pub fn best_variant(&self, ceiling: Option<AudioQuality>) -> Option<&StreamVariant> {
        for tier in AudioQuality::PRIORITY {
            if ceiling.is_some_and(|c| tier > c) {
                continue;
            }
            if let Some(v) = self.variant_for(tier) {
                return Some(v);
            }
        }
        self.variants.iter().find(|v| v.quality.is_none())
    }
}

fn parse_track(track: &Value) -> Option<StreamVariant> {
    let quality_id = track.get("id").and_then(Value::as_i64)?;

    let backup_urls: Vec<String> = track
        .get("backupUrl")
        .or_else(|| track.get("backup_url"))
        .and_then(Value::as_array)
        .map(|urls| {
            urls.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let url = track
        .get("baseUrl")
        .or_else(|| track.get("base_url"))
        .and_then(Value::as_str)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .or_else(|| backup_urls.first().cloned())?;

    Some(StreamVariant {
        url,
        backup_urls,
        quality_id,
        quality: AudioQuality::from_id(quality_id),
    })
}
