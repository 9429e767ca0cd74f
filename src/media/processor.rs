use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::MediaConfig;
use crate::error::{Result, SubtradError};
use super::{
    embedded_path_for, parse_identification, subtitle_path_for, MediaCommandBuilder, MediaToolkit,
    Track,
};

/// Concrete media toolkit backed by mkvmerge / mkvextract
pub struct MkvToolnixProcessor {
    command_builder: MediaCommandBuilder,
    subtitle_extension: String,
    embedded_suffix: String,
}

impl MkvToolnixProcessor {
    /// Create a new mkvtoolnix processor
    pub fn new(config: MediaConfig, subtitle_extension: &str, embedded_suffix: &str) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.mkvmerge_path, &config.mkvextract_path);

        Self {
            command_builder,
            subtitle_extension: subtitle_extension.to_string(),
            embedded_suffix: embedded_suffix.to_string(),
        }
    }
}

#[async_trait]
impl MediaToolkit for MkvToolnixProcessor {
    async fn check_availability(&self) -> Result<()> {
        for command in self.command_builder.version_checks() {
            let version = command.execute_capture().await?;
            debug!("{}", version.lines().next().unwrap_or("Unknown version"));
        }
        info!("mkvtoolnix is available");
        Ok(())
    }

    async fn list_tracks(&self, container: &Path) -> Result<Vec<Track>> {
        debug!("Reading track metadata of {}", container.display());

        let json = self
            .command_builder
            .identify(container)
            .execute_capture()
            .await
            .map_err(|e| SubtradError::Metadata(e.to_string()))?;

        parse_identification(&json)
    }

    async fn extract_track(&self, container: &Path, track_id: u64) -> Result<PathBuf> {
        let output = subtitle_path_for(container, &self.subtitle_extension);
        info!("Extracting track {} of {} to {}", track_id, container.display(), output.display());

        self.command_builder
            .extract_track(container, track_id, &output)
            .execute()
            .await
            .map_err(|e| SubtradError::Extraction(e.to_string()))?;

        if !output.is_file() {
            return Err(SubtradError::Extraction(format!(
                "mkvextract reported success but {} was not written",
                output.display()
            )));
        }

        Ok(output)
    }

    async fn embed_subtitles(
        &self,
        container: &Path,
        subtitles: &Path,
        language: &str,
    ) -> Result<PathBuf> {
        let output = embedded_path_for(container, &self.embedded_suffix);
        info!(
            "Embedding subtitles from {} into {} -> {}",
            subtitles.display(),
            container.display(),
            output.display()
        );

        self.command_builder
            .embed_subtitles(container, subtitles, language, &output)
            .execute()
            .await?;

        info!("Subtitle embedding completed successfully");
        Ok(output)
    }
}
