use serde::Deserialize;

use crate::error::{Result, SubtradError};

/// Kind of a container track as reported by mkvmerge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
    Subtitles,
    Other,
}

impl TrackKind {
    fn from_mkvmerge(kind: &str) -> Self {
        match kind {
            "video" => Self::Video,
            "audio" => Self::Audio,
            "subtitles" => Self::Subtitles,
            _ => Self::Other,
        }
    }
}

/// Immutable snapshot of one track of a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: u64,
    pub kind: TrackKind,
    /// Lowercase language code, empty when unknown
    pub language: String,
    /// Free-text track name, empty when unset
    pub track_name: String,
    pub hearing_impaired: bool,
    pub forced: bool,
    /// Codec id as reported by mkvmerge, e.g. "SubRip/SRT"
    pub codec: String,
}

impl Track {
    /// Convenience constructor for a subtitle track
    pub fn subtitles(id: u64, language: &str, track_name: &str) -> Self {
        Self {
            id,
            kind: TrackKind::Subtitles,
            language: language.to_lowercase(),
            track_name: track_name.to_string(),
            hearing_impaired: false,
            forced: false,
            codec: "SubRip/SRT".to_string(),
        }
    }

    pub fn hearing_impaired(mut self, value: bool) -> Self {
        self.hearing_impaired = value;
        self
    }

    pub fn forced(mut self, value: bool) -> Self {
        self.forced = value;
        self
    }
}

/// mkvmerge `-J` identification output (only the fields we read)
#[derive(Debug, Deserialize)]
struct Identification {
    tracks: Option<Vec<RawTrack>>,
}

#[derive(Debug, Deserialize)]
struct RawTrack {
    id: u64,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    codec: Option<String>,
    #[serde(default)]
    properties: RawProperties,
}

#[derive(Debug, Default, Deserialize)]
struct RawProperties {
    language: Option<String>,
    track_name: Option<String>,
    hearing_impaired: Option<bool>,
    forced_track: Option<bool>,
}

/// Parse the JSON printed by `mkvmerge -J` into track snapshots
pub fn parse_identification(json: &str) -> Result<Vec<Track>> {
    let identification: Identification = serde_json::from_str(json)
        .map_err(|e| SubtradError::Metadata(format!("Failed to parse mkvmerge JSON: {}", e)))?;

    let tracks = identification
        .tracks
        .ok_or_else(|| SubtradError::Metadata("No 'tracks' entry in mkvmerge JSON".to_string()))?;

    Ok(tracks
        .into_iter()
        .map(|raw| Track {
            id: raw.id,
            kind: TrackKind::from_mkvmerge(&raw.kind),
            language: raw.properties.language.unwrap_or_default().to_lowercase(),
            track_name: raw.properties.track_name.unwrap_or_default(),
            hearing_impaired: raw.properties.hearing_impaired.unwrap_or(false),
            forced: raw.properties.forced_track.unwrap_or(false),
            codec: raw.codec.unwrap_or_default(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "container": {"type": "Matroska", "recognized": true},
        "tracks": [
            {"id": 0, "type": "video", "codec": "AVC/H.264/MPEG-4p10",
             "properties": {"language": "und"}},
            {"id": 1, "type": "audio", "codec": "AAC",
             "properties": {"language": "eng", "track_name": "Stereo"}},
            {"id": 2, "type": "subtitles", "codec": "SubRip/SRT",
             "properties": {"language": "SPA", "track_name": "Castellano",
                            "hearing_impaired": false, "forced_track": false}},
            {"id": 3, "type": "subtitles", "codec": "SubRip/SRT",
             "properties": {"language": "eng", "hearing_impaired": true}}
        ]
    }"#;

    #[test]
    fn test_parse_identification() {
        let tracks = parse_identification(SAMPLE).unwrap();
        assert_eq!(tracks.len(), 4);
        assert_eq!(tracks[0].kind, TrackKind::Video);

        let spanish = &tracks[2];
        assert_eq!(spanish.kind, TrackKind::Subtitles);
        assert_eq!(spanish.language, "spa");
        assert_eq!(spanish.track_name, "Castellano");
        assert_eq!(spanish.codec, "SubRip/SRT");
        assert!(!spanish.forced);

        let english = &tracks[3];
        assert!(english.hearing_impaired);
        assert!(english.track_name.is_empty());
    }

    #[test]
    fn test_missing_tracks_is_metadata_error() {
        let err = parse_identification(r#"{"container": {}}"#).unwrap_err();
        assert!(matches!(err, SubtradError::Metadata(_)));

        let err = parse_identification("not json").unwrap_err();
        assert!(matches!(err, SubtradError::Metadata(_)));
    }
}
