use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SubtradError};

/// Abstract media tool command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media tool command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add a file path argument
    pub fn path<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Set mkvmerge output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-o").path(path)
    }

    /// Set the language of a track in the next input file
    pub fn language<S: AsRef<str>>(self, track_id: u64, language: S) -> Self {
        self.arg("--language").arg(format!("{}:{}", track_id, language.as_ref()))
    }

    /// Execute the command, discarding its output
    pub async fn execute(&self) -> Result<()> {
        self.execute_capture().await.map(|_| ())
    }

    /// Execute the command and return its stdout
    pub async fn execute_capture(&self) -> Result<String> {
        debug!("Executing media command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| SubtradError::Media(format!(
                "Failed to execute {}: {}", self.binary_path, e
            )))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            // mkvtoolnix reports most errors on stdout
            let detail = if stderr.trim().is_empty() { stdout } else { stderr };
            return Err(SubtradError::Media(format!(
                "{} failed ({}): {}",
                self.description,
                output.status,
                detail.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Builder for the mkvtoolnix operations the workflow needs
pub struct MediaCommandBuilder {
    mkvmerge_path: String,
    mkvextract_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S1: Into<String>, S2: Into<String>>(mkvmerge_path: S1, mkvextract_path: S2) -> Self {
        Self {
            mkvmerge_path: mkvmerge_path.into(),
            mkvextract_path: mkvextract_path.into(),
        }
    }

    /// Build track identification command (`mkvmerge -J`)
    pub fn identify<P: AsRef<Path>>(&self, container: P) -> MediaCommand {
        MediaCommand::new(&self.mkvmerge_path, "Track identification")
            .arg("-J")
            .path(container)
    }

    /// Build track extraction command
    pub fn extract_track(&self, container: &Path, track_id: u64, output: &Path) -> MediaCommand {
        MediaCommand::new(&self.mkvextract_path, format!("Extraction of track {}", track_id))
            .arg("tracks")
            .path(container)
            .arg(format!("{}:{}", track_id, output.to_string_lossy()))
    }

    /// Build subtitle embedding command
    pub fn embed_subtitles(
        &self,
        container: &Path,
        subtitles: &Path,
        language: &str,
        output: &Path,
    ) -> MediaCommand {
        MediaCommand::new(&self.mkvmerge_path, "Subtitle embedding")
            .output(output)
            .path(container)
            .language(0, language)
            .path(subtitles)
    }

    /// Build version check commands for both tools
    pub fn version_checks(&self) -> Vec<MediaCommand> {
        vec![
            MediaCommand::new(&self.mkvmerge_path, "mkvmerge version check").arg("--version"),
            MediaCommand::new(&self.mkvextract_path, "mkvextract version check").arg("--version"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> MediaCommandBuilder {
        MediaCommandBuilder::new("mkvmerge", "mkvextract")
    }

    #[test]
    fn test_identify_command() {
        let cmd = builder().identify("/media/Episode 1.mkv");
        assert_eq!(cmd.binary_path, "mkvmerge");
        assert_eq!(cmd.args, vec!["-J", "/media/Episode 1.mkv"]);
    }

    #[test]
    fn test_extract_command() {
        let cmd = builder().extract_track(Path::new("/m/a.mkv"), 2, Path::new("/m/a.srt"));
        assert_eq!(cmd.binary_path, "mkvextract");
        assert_eq!(cmd.args, vec!["tracks", "/m/a.mkv", "2:/m/a.srt"]);
    }

    #[test]
    fn test_embed_command() {
        let cmd = builder().embed_subtitles(
            Path::new("/m/a.mkv"),
            Path::new("/m/a_cat.srt"),
            "cat",
            Path::new("/m/a_CAT.mkv"),
        );
        assert_eq!(
            cmd.args,
            vec!["-o", "/m/a_CAT.mkv", "/m/a.mkv", "--language", "0:cat", "/m/a_cat.srt"]
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_media_error() {
        let cmd = MediaCommand::new("/nonexistent/mkvmerge-binary", "Track identification").arg("-J");
        let err = cmd.execute_capture().await.unwrap_err();
        assert!(matches!(err, SubtradError::Media(_)));
    }
}
