//! Subtitle track selection.
//!
//! Picks the track to translate from a container's metadata: subtitle tracks
//! only, language preference sets tried in order, SDH, forced and commentary
//! tracks rejected.

use tracing::debug;

use crate::config::{LanguagePreference, SelectionConfig};
use crate::media::{Track, TrackKind};

/// Track chosen for extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedTrack {
    pub id: u64,
    /// Canonical code of the preference set that matched, e.g. "spa"
    pub language: String,
}

/// Return the first valid track of the first preference set with a match
pub fn select_track(tracks: &[Track], policy: &SelectionConfig) -> Option<SelectedTrack> {
    for preference in &policy.languages {
        let found = tracks
            .iter()
            .filter(|t| t.kind == TrackKind::Subtitles)
            .find(|t| is_valid(t, preference, policy));

        if let Some(track) = found {
            debug!(
                "Selected subtitle track {} ({}, {}, '{}') for {}",
                track.id, track.language, track.codec, track.track_name, preference.code
            );
            return Some(SelectedTrack {
                id: track.id,
                language: preference.code.clone(),
            });
        }
    }

    None
}

/// Whether `track` is acceptable for one language preference set
pub fn is_valid(track: &Track, preference: &LanguagePreference, policy: &SelectionConfig) -> bool {
    let language = track.language.to_lowercase();
    if !preference
        .prefixes
        .iter()
        .any(|prefix| language.starts_with(&prefix.to_lowercase()))
    {
        return false;
    }

    if track.hearing_impaired {
        return false;
    }

    if policy.reject_forced && track.forced {
        return false;
    }

    let name = track.track_name.to_lowercase();
    !policy
        .blocked_name_tokens
        .iter()
        .any(|token| name.contains(&token.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> SelectionConfig {
        SelectionConfig::default()
    }

    #[test]
    fn test_spanish_preferred_over_english() {
        let tracks = vec![
            Track::subtitles(3, "eng", "English"),
            Track::subtitles(5, "spa", "Español"),
        ];
        let selected = select_track(&tracks, &policy()).unwrap();
        assert_eq!(selected.id, 5);
        assert_eq!(selected.language, "spa");
    }

    #[test]
    fn test_falls_back_to_english() {
        let tracks = vec![
            Track::subtitles(2, "spa", "Español (SDH)"),
            Track::subtitles(4, "eng", ""),
        ];
        let selected = select_track(&tracks, &policy()).unwrap();
        assert_eq!(selected, SelectedTrack { id: 4, language: "eng".to_string() });
    }

    #[test]
    fn test_first_valid_track_wins() {
        let tracks = vec![
            Track::subtitles(6, "spa", "Director's Commentary"),
            Track::subtitles(7, "spa", "Castellano"),
            Track::subtitles(8, "spa", "Latino"),
        ];
        assert_eq!(select_track(&tracks, &policy()).unwrap().id, 7);
    }

    #[test]
    fn test_rejects_flags_and_blocked_names() {
        let tracks = vec![
            Track::subtitles(1, "spa", "").hearing_impaired(true),
            Track::subtitles(2, "spa", "Forzados").forced(true),
            Track::subtitles(3, "eng", "HEARING impaired"),
            Track::subtitles(4, "eng", "Comentarios del director"),
            Track::subtitles(5, "eng", "Per a persones amb discapacitat auditiva"),
        ];
        assert_eq!(select_track(&tracks, &policy()), None);
    }

    #[test]
    fn test_only_subtitle_tracks_considered() {
        let mut audio = Track::subtitles(0, "spa", "");
        audio.kind = TrackKind::Audio;
        assert_eq!(select_track(&[audio], &policy()), None);
    }

    #[test]
    fn test_strict_and_loose_language_codes() {
        let tracks = vec![Track::subtitles(9, "es", "")];
        assert_eq!(select_track(&tracks, &policy()), None);

        let selected = select_track(&tracks, &SelectionConfig::loose()).unwrap();
        assert_eq!(selected, SelectedTrack { id: 9, language: "spa".to_string() });
    }

    #[test]
    fn test_loose_policy_accepts_forced() {
        let tracks = vec![Track::subtitles(1, "eng", "").forced(true)];
        assert_eq!(select_track(&tracks, &policy()), None);
        assert_eq!(select_track(&tracks, &SelectionConfig::loose()).unwrap().id, 1);
    }

    #[test]
    fn test_selection_is_idempotent_and_never_picks_rejected() {
        let tracks = vec![
            Track::subtitles(0, "eng", "English SDH").hearing_impaired(true),
            Track::subtitles(1, "spa", "sdh"),
            Track::subtitles(2, "spa", "Castellano"),
            Track::subtitles(3, "eng", "English"),
        ];
        let first = select_track(&tracks, &policy());
        let second = select_track(&tracks, &policy());
        assert_eq!(first, second);

        let chosen = first.unwrap();
        let track = tracks.iter().find(|t| t.id == chosen.id).unwrap();
        assert!(!track.hearing_impaired);
        assert!(!track.track_name.to_lowercase().contains("sdh"));
        assert_eq!(chosen.id, 2);
    }
}
