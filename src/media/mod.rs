// Container tooling
//
// The workflow talks to mkvtoolnix only through the MediaToolkit trait:
// - Tracks: track metadata model and mkvmerge JSON parsing
// - Commands: command builders for mkvmerge / mkvextract
// - Processor: the mkvtoolnix-backed implementation

pub mod commands;
pub mod processor;
pub mod tracks;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub use commands::*;
pub use processor::*;
pub use tracks::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Container operations the translation workflow depends on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaToolkit: Send + Sync {
    /// Check that the external tools can be executed
    async fn check_availability(&self) -> Result<()>;

    /// List the tracks of a container
    async fn list_tracks(&self, container: &Path) -> Result<Vec<Track>>;

    /// Extract one track next to the container and return the written path
    async fn extract_track(&self, container: &Path, track_id: u64) -> Result<PathBuf>;

    /// Mux `subtitles` into a copy of `container` and return the new path
    async fn embed_subtitles(
        &self,
        container: &Path,
        subtitles: &Path,
        language: &str,
    ) -> Result<PathBuf>;
}

/// Factory for media toolkit instances
pub struct MediaToolkitFactory;

impl MediaToolkitFactory {
    /// Create the default toolkit (mkvtoolnix-based)
    pub fn create_toolkit(config: MediaConfig, subtitle_extension: &str, embedded_suffix: &str) -> Box<dyn MediaToolkit> {
        Box::new(MkvToolnixProcessor::new(config, subtitle_extension, embedded_suffix))
    }
}

/// `dir/name.mkv` -> `dir/name.<extension>`
pub fn subtitle_path_for(container: &Path, extension: &str) -> PathBuf {
    container.with_extension(extension)
}

/// `dir/name.mkv` -> `dir/name_<suffix>.<extension>`
pub fn suffixed_path(path: &Path, suffix: &str, extension: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}_{}.{}", stem, suffix, extension))
}

/// `dir/name.mkv` -> `dir/name_<suffix>.mkv`
pub fn embedded_path_for(container: &Path, suffix: &str) -> PathBuf {
    let extension = container
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mkv".to_string());
    suffixed_path(container, suffix, &extension)
}
