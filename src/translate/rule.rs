use async_trait::async_trait;
use std::collections::BTreeMap;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::config::RuleBasedConfig;
use crate::error::{Result, SubtradError};
use super::TranslationBackend;

/// Local rule-based machine translation (apertium style: `<binary> <pipeline>`,
/// text on stdin, translation on stdout)
pub struct RuleBasedBackend {
    binary_path: String,
    pipelines: BTreeMap<String, String>,
}

impl RuleBasedBackend {
    pub fn new(config: &RuleBasedConfig) -> Self {
        Self {
            binary_path: config.binary_path.clone(),
            pipelines: config.pipelines.clone(),
        }
    }

    /// Engine arguments for a source language
    fn pipeline_args(&self, source_language: &str) -> Result<Vec<String>> {
        let pipeline = self
            .pipelines
            .get(&source_language.to_lowercase())
            .ok_or_else(|| SubtradError::Translation(format!(
                "No rule-based pipeline configured for source language '{}'",
                source_language
            )))?;

        Ok(pipeline.split_whitespace().map(str::to_string).collect())
    }
}

#[async_trait]
impl TranslationBackend for RuleBasedBackend {
    fn name(&self) -> &str {
        "rule-based"
    }

    async fn translate(&self, block_text: &str, source_language: &str) -> Result<String> {
        let args = self.pipeline_args(source_language)?;
        debug!("Running {} {:?}", self.binary_path, args);

        let mut child = Command::new(&self.binary_path)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SubtradError::Translation(format!(
                "Failed to execute {}: {}", self.binary_path, e
            )))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| SubtradError::Translation("Engine stdin unavailable".to_string()))?;
        let input = block_text.as_bytes().to_vec();
        let writer = tokio::spawn(async move {
            stdin.write_all(&input).await?;
            stdin.shutdown().await
        });

        let output = child.wait_with_output().await?;
        let written = writer.await;

        if !output.status.success() {
            return Err(SubtradError::Translation(format!(
                "{} {} failed ({}): {}",
                self.binary_path,
                args.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        written
            .map_err(|e| SubtradError::Translation(format!("Engine input task failed: {}", e)))??;

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn backend(binary: &str, pipeline: &str) -> RuleBasedBackend {
        let mut pipelines = BTreeMap::new();
        pipelines.insert("spa".to_string(), pipeline.to_string());
        RuleBasedBackend::new(&RuleBasedConfig {
            binary_path: binary.to_string(),
            pipelines,
        })
    }

    #[tokio::test]
    async fn test_pipes_block_through_engine() {
        let engine = backend("tr", "a-z A-Z");
        let text = engine.translate("1\n00:00:01,000 --> 00:00:02,000\nhola\n\n", "SPA").await.unwrap();
        assert_eq!(text, "1\n00:00:01,000 --> 00:00:02,000\nHOLA");
    }

    #[tokio::test]
    async fn test_unknown_source_language() {
        let err = backend("tr", "a-z A-Z").translate("hello", "eng").await.unwrap_err();
        assert!(err.to_string().contains("eng"));
    }

    #[tokio::test]
    async fn test_engine_failure() {
        tokio_test::assert_err!(backend("false", "spa-cat").translate("hola", "spa").await);
        tokio_test::assert_err!(backend("/nonexistent/apertium", "spa-cat").translate("hola", "spa").await);
    }
}
