use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Result, SubtradError};
use crate::media::{suffixed_path, MediaToolkit, MediaToolkitFactory};
use crate::selector::select_track;
use crate::subtitle::{assemble, read_blocks, write_document};
use crate::translate::{BlockTranslator, TranslatorFactory};

/// Outcome of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessReport {
    /// Containers whose translated subtitles were written
    pub processed: Vec<PathBuf>,
    /// Containers skipped, with the reason
    pub skipped: Vec<(PathBuf, String)>,
    /// Blocks that came back empty across all containers
    pub failed_blocks: usize,
    /// New containers written with the translated track
    pub embedded: Vec<PathBuf>,
}

/// Result of one container's pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerOutcome {
    pub translated_path: PathBuf,
    pub failed_blocks: usize,
    pub embedded_path: Option<PathBuf>,
}

pub struct Workflow {
    config: Config,
    media: Box<dyn MediaToolkit>,
    translator: BlockTranslator,
}

impl Workflow {
    pub async fn new(config: Config) -> Result<Self> {
        let media = MediaToolkitFactory::create_toolkit(
            config.media.clone(),
            &config.output.subtitle_extension,
            &config.output.embedded_suffix,
        );
        let translator = TranslatorFactory::create_translator(&config.translate)?;

        // Missing tools only cost the containers that need them
        if let Err(e) = media.check_availability().await {
            warn!("mkvtoolnix check failed, containers will likely be skipped: {}", e);
        }

        Ok(Self::with_components(config, media, translator))
    }

    /// Build a workflow from explicit collaborators
    pub fn with_components(config: Config, media: Box<dyn MediaToolkit>, translator: BlockTranslator) -> Self {
        Self { config, media, translator }
    }

    /// Process every container in a folder, one at a time
    pub async fn process_directory<P: AsRef<Path>>(&self, input_dir: P) -> Result<ProcessReport> {
        let input_dir = input_dir.as_ref();
        info!("Processing directory: {}", input_dir.display());

        if !input_dir.is_dir() {
            return Err(SubtradError::InvalidInput(format!(
                "{} is not a valid folder",
                input_dir.display()
            )));
        }

        let containers = self.find_containers(input_dir);
        let mut report = ProcessReport::default();

        if containers.is_empty() {
            warn!("No container files found in {}", input_dir.display());
            return Ok(report);
        }

        info!("Found {} container files to process", containers.len());

        let progress = ProgressBar::new(containers.len() as u64);
        progress.set_style(progress_style("Containers"));

        for container in containers {
            progress.set_message(display_name(&container));

            match self.process_container(&container).await {
                Ok(outcome) => {
                    info!("  -> Translated file saved to: {}", outcome.translated_path.display());
                    report.failed_blocks += outcome.failed_blocks;
                    if let Some(embedded) = outcome.embedded_path {
                        report.embedded.push(embedded);
                    }
                    report.processed.push(container);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", container.display(), e);
                    report.skipped.push((container, e.to_string()));
                }
            }

            progress.inc(1);
        }

        progress.finish_and_clear();

        info!(
            "Finished: {} processed, {} skipped, {} failed blocks, {} embedded",
            report.processed.len(),
            report.skipped.len(),
            report.failed_blocks,
            report.embedded.len()
        );

        Ok(report)
    }

    /// Run the full pipeline for one container
    pub async fn process_container(&self, container: &Path) -> Result<ContainerOutcome> {
        info!("Processing container: {}", container.display());

        // Step 1: Pick the subtitle track
        let tracks = self.media.list_tracks(container).await?;
        let selected = select_track(&tracks, &self.config.selection)
            .ok_or_else(|| SubtradError::TrackNotFound(container.display().to_string()))?;
        info!("Using subtitle track {} ({})", selected.id, selected.language);

        // Step 2: Extract it next to the container
        let subtitle_path = self.media.extract_track(container, selected.id).await?;

        // Step 3: Split and translate block by block
        let block_size = self.config.translate.effective_block_size();
        let blocks = read_blocks(&subtitle_path, block_size).await?;

        let progress = ProgressBar::new(blocks.len() as u64);
        progress.set_style(progress_style("Blocks"));
        progress.set_message(display_name(&subtitle_path));
        let block_report = self
            .translator
            .translate_blocks(&blocks, &selected.language, &progress)
            .await;
        progress.finish_and_clear();

        // Step 4: Write the translated document once
        let translated_path = suffixed_path(
            &subtitle_path,
            &self.config.translate.target_language.to_lowercase(),
            &self.config.output.subtitle_extension,
        );
        write_document(&translated_path, &assemble(&block_report.outputs))?;

        // Step 5: Optionally mux it into a new container
        let embedded_path = if self.config.output.embed_subtitles {
            match self
                .media
                .embed_subtitles(container, &translated_path, &self.config.translate.target_language)
                .await
            {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!("Failed to embed subtitles into {}: {}", container.display(), e);
                    None
                }
            }
        } else {
            None
        };

        Ok(ContainerOutcome {
            translated_path,
            failed_blocks: block_report.failed_blocks,
            embedded_path,
        })
    }

    /// Containers directly inside `input_dir`, sorted by path
    fn find_containers(&self, input_dir: &Path) -> Vec<PathBuf> {
        // Symlinked containers count as inputs
        let mut containers: Vec<PathBuf> = WalkDir::new(input_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| {
                        self.config
                            .media
                            .container_extensions
                            .iter()
                            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
                    })
                    .unwrap_or(false)
            })
            .filter(|path| !self.is_generated_container(path))
            .collect();

        containers.sort();
        containers
    }

    /// Containers written by an earlier embedding run are not inputs
    fn is_generated_container(&self, path: &Path) -> bool {
        let suffix = format!("_{}", self.config.output.embedded_suffix);
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .map(|stem| stem.ends_with(&suffix))
            .unwrap_or(false)
    }
}

fn progress_style(prefix: &str) -> ProgressStyle {
    ProgressStyle::with_template(&format!(
        "{} {{bar:40.cyan/blue}} {{pos}}/{{len}} {{msg}}",
        prefix
    ))
    .unwrap_or_else(|_| ProgressStyle::default_bar())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{MockMediaToolkit, Track};
    use crate::translate::TranslationBackend;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct UppercaseBackend;

    #[async_trait]
    impl TranslationBackend for UppercaseBackend {
        fn name(&self) -> &str {
            "uppercase"
        }

        async fn translate(&self, block_text: &str, _source_language: &str) -> Result<String> {
            Ok(block_text.to_uppercase())
        }
    }

    const SUBTITLES: &str = "1\n00:00:01,000 --> 00:00:02,000\nhola\n\n2\n00:00:03,000 --> 00:00:04,000\nadios\n\n";

    fn workflow(media: MockMediaToolkit, embed: bool) -> Workflow {
        let mut config = Config::default();
        config.output.embed_subtitles = embed;
        Workflow::with_components(config, Box::new(media), BlockTranslator::single(Arc::new(UppercaseBackend)))
    }

    fn extracting_toolkit(srt_path: PathBuf) -> MockMediaToolkit {
        let mut media = MockMediaToolkit::new();
        media.expect_list_tracks().returning(|_| {
            Ok(vec![
                Track::subtitles(0, "eng", "English SDH").hearing_impaired(true),
                Track::subtitles(2, "spa", "Castellano"),
            ])
        });
        media
            .expect_extract_track()
            .withf(|_, id| *id == 2)
            .times(1)
            .returning(move |_, _| {
                std::fs::write(&srt_path, SUBTITLES)?;
                Ok(srt_path.clone())
            });
        media
    }

    #[tokio::test]
    async fn test_process_container_writes_translation() {
        let dir = tempfile::tempdir().unwrap();
        let container = dir.path().join("movie.mkv");
        let mut media = extracting_toolkit(dir.path().join("movie.srt"));
        media.expect_embed_subtitles().never();

        let outcome = workflow(media, false).process_container(&container).await.unwrap();

        assert_eq!(outcome.translated_path, dir.path().join("movie_cat.srt"));
        assert_eq!(outcome.failed_blocks, 0);
        assert_eq!(outcome.embedded_path, None);
        assert_eq!(
            std::fs::read_to_string(&outcome.translated_path).unwrap(),
            SUBTITLES.to_uppercase()
        );
    }

    #[tokio::test]
    async fn test_embedding_failure_keeps_subtitles() {
        let dir = tempfile::tempdir().unwrap();
        let container = dir.path().join("movie.mkv");
        let mut media = extracting_toolkit(dir.path().join("movie.srt"));
        media
            .expect_embed_subtitles()
            .withf(|_, _, language| language.to_string() == "cat")
            .times(1)
            .returning(|_, _, _| Err(SubtradError::Media("mkvmerge exploded".to_string())));

        let outcome = workflow(media, true).process_container(&container).await.unwrap();
        assert_eq!(outcome.embedded_path, None);
        assert!(outcome.translated_path.is_file());
    }

    #[tokio::test]
    async fn test_no_matching_track_skips_container() {
        let mut media = MockMediaToolkit::new();
        media
            .expect_list_tracks()
            .returning(|_| Ok(vec![Track::subtitles(0, "fre", "Français")]));
        media.expect_extract_track().never();

        let err = workflow(media, false)
            .process_container(Path::new("/tmp/film.mkv"))
            .await
            .unwrap_err();
        assert!(matches!(err, SubtradError::TrackNotFound(_)));
    }

    #[tokio::test]
    async fn test_directory_run_continues_after_failures() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.mkv", "a.MKV", "a_CAT.mkv", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let b_srt = dir.path().join("b.srt");

        let mut media = MockMediaToolkit::new();
        media.expect_list_tracks().returning(|path| {
            if path.ends_with("a.MKV") {
                Err(SubtradError::Metadata("mkvmerge -J failed".to_string()))
            } else {
                Ok(vec![Track::subtitles(3, "eng", "")])
            }
        });
        media.expect_extract_track().times(1).returning(move |_, _| {
            std::fs::write(&b_srt, SUBTITLES)?;
            Ok(b_srt.clone())
        });

        let report = workflow(media, false).process_directory(dir.path()).await.unwrap();

        assert_eq!(report.processed, vec![dir.path().join("b.mkv")]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].0, dir.path().join("a.MKV"));
        assert!(dir.path().join("b_cat.srt").is_file());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinked_container_is_processed() {
        let media_dir = tempfile::tempdir().unwrap();
        let target = media_dir.path().join("real.mkv");
        std::fs::write(&target, b"matroska").unwrap();

        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("linked.mkv");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let srt = dir.path().join("linked.srt");
        let mut media = extracting_toolkit(srt);
        media.expect_embed_subtitles().never();

        let report = workflow(media, false).process_directory(dir.path()).await.unwrap();

        assert_eq!(report.processed, vec![link]);
        assert!(report.skipped.is_empty());
        assert!(dir.path().join("linked_cat.srt").is_file());
    }

    #[tokio::test]
    async fn test_non_directory_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = workflow(MockMediaToolkit::new(), false)
            .process_directory(file.path())
            .await
            .unwrap_err();
        assert!(matches!(err, SubtradError::InvalidInput(_)));
    }
}
