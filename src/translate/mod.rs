// Block translation
//
// Backends sit behind two narrow capabilities:
// - TranslationBackend: one block in, translated block out (chat, rule-based)
// - Reconciler: two candidate translations in, one merged block out
//
// BlockTranslator drives them per block and turns any backend failure into an
// empty block so the rest of the file keeps going.

pub mod llm;
pub mod prompts;
pub mod rule;

use async_trait::async_trait;
use indicatif::ProgressBar;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{TranslateConfig, TranslationMode};
use crate::error::Result;
use crate::subtitle::{Block, BLOCK_SEPARATOR};

pub use llm::ChatCompletionBackend;
pub use prompts::PromptBuilder;
pub use rule::RuleBasedBackend;

/// Uniform call contract over translation services
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Short name used in diagnostics
    fn name(&self) -> &str;

    /// Translate one block of raw subtitle text
    async fn translate(&self, block_text: &str, source_language: &str) -> Result<String>;
}

/// Merges two candidate translations of the same block
#[async_trait]
pub trait Reconciler: Send + Sync {
    async fn reconcile(&self, first: &str, second: &str) -> Result<String>;
}

/// Backends used for a run
#[derive(Clone)]
pub enum TranslationStrategy {
    /// One chat completion call per block
    Single {
        backend: Arc<dyn TranslationBackend>,
    },
    /// Rule-based and chat candidates merged by the reconciler
    Dual {
        rule_based: Arc<dyn TranslationBackend>,
        chat: Arc<dyn TranslationBackend>,
        reconciler: Arc<dyn Reconciler>,
    },
}

/// Output of translating every block of one file
#[derive(Debug, Clone, Default)]
pub struct BlockReport {
    /// Per-block output in source order, empty for failed blocks
    pub outputs: Vec<String>,
    /// Blocks whose translation came back empty
    pub failed_blocks: usize,
}

pub struct BlockTranslator {
    strategy: TranslationStrategy,
}

impl BlockTranslator {
    pub fn new(strategy: TranslationStrategy) -> Self {
        Self { strategy }
    }

    pub fn single(backend: Arc<dyn TranslationBackend>) -> Self {
        Self::new(TranslationStrategy::Single { backend })
    }

    pub fn dual(
        rule_based: Arc<dyn TranslationBackend>,
        chat: Arc<dyn TranslationBackend>,
        reconciler: Arc<dyn Reconciler>,
    ) -> Self {
        Self::new(TranslationStrategy::Dual { rule_based, chat, reconciler })
    }

    /// Translate one block. Returns the cleaned translation followed by a
    /// blank line, or an empty string when the backends failed.
    pub async fn translate_block(&self, block_text: &str, source_language: &str) -> String {
        let raw = match &self.strategy {
            TranslationStrategy::Single { backend } => {
                call_backend(backend.as_ref(), block_text, source_language).await
            }
            TranslationStrategy::Dual { rule_based, chat, reconciler } => {
                let first = call_backend(rule_based.as_ref(), block_text, source_language).await;
                let second = call_backend(chat.as_ref(), block_text, source_language).await;

                match (first.trim().is_empty(), second.trim().is_empty()) {
                    (true, true) => String::new(),
                    (false, true) => {
                        debug!("Only the rule-based candidate is available, skipping reconciliation");
                        first
                    }
                    (true, false) => {
                        debug!("Only the chat candidate is available, skipping reconciliation");
                        second
                    }
                    (false, false) => match reconciler.reconcile(&first, &second).await {
                        Ok(merged) => merged,
                        Err(e) => {
                            warn!("Reconciliation failed: {}", e);
                            String::new()
                        }
                    },
                }
            }
        };

        finalize_block(&raw)
    }

    /// Translate blocks strictly in order, one at a time
    pub async fn translate_blocks(
        &self,
        blocks: &[Block],
        source_language: &str,
        progress: &ProgressBar,
    ) -> BlockReport {
        let mut report = BlockReport::default();

        for (idx, block) in blocks.iter().enumerate() {
            let text = block.text();
            let output = self.translate_block(&text, source_language).await;

            if output.is_empty() && !text.trim().is_empty() {
                warn!("Block {}/{} produced no translation", idx + 1, blocks.len());
                report.failed_blocks += 1;
            }

            report.outputs.push(output);
            progress.inc(1);
        }

        info!(
            "Translated {} blocks ({} failed)",
            blocks.len(),
            report.failed_blocks
        );
        report
    }
}

/// Call a backend, logging and swallowing any failure as an empty result
async fn call_backend(
    backend: &dyn TranslationBackend,
    block_text: &str,
    source_language: &str,
) -> String {
    match backend.translate(block_text, source_language).await {
        Ok(text) => text,
        Err(e) => {
            warn!("{} backend failed: {}", backend.name(), e);
            String::new()
        }
    }
}

/// Strip echo artifacts and normalize the trailing separator
pub fn finalize_block(raw: &str) -> String {
    let cleaned = raw.replace("'''", "").replace("\"\"\"", "");

    let body: String = cleaned
        .split_inclusive('\n')
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect();

    let body = body.trim_start_matches(['\r', '\n']).trim_end();
    if body.is_empty() {
        return String::new();
    }

    format!("{}{}", body, BLOCK_SEPARATOR)
}

/// Factory for block translators
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// Create a block translator for the configured mode
    pub fn create_translator(config: &TranslateConfig) -> Result<BlockTranslator> {
        let chat = Arc::new(ChatCompletionBackend::new(config)?);
        info!("Using chat completion model {}", chat.model());

        let translator = match config.mode {
            TranslationMode::Single => BlockTranslator::single(chat),
            TranslationMode::Dual => {
                let rule_based = Arc::new(RuleBasedBackend::new(&config.rule_based));
                BlockTranslator::dual(rule_based, chat.clone(), chat)
            }
        };

        Ok(translator)
    }
}
