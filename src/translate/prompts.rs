use crate::config::{GlossaryEntry, TranslateConfig};

/// Builds the chat prompts for block translation and reconciliation
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    language_name: String,
    glossary: Vec<GlossaryEntry>,
    extra_instructions: Vec<String>,
}

impl PromptBuilder {
    pub fn new(config: &TranslateConfig) -> Self {
        Self {
            language_name: config.target_language_name.clone(),
            glossary: config.glossary.clone(),
            extra_instructions: config.extra_instructions.clone(),
        }
    }

    pub fn translation_system(&self) -> String {
        format!("You are an expert subtitle translator into {}.", self.language_name)
    }

    pub fn translation_user(&self, block_text: &str) -> String {
        let mut prompt = format!(
            "Translate the following subtitles into {}:\n\
             {}\n\
             \n\
             Do not change the subtitle numbering or the timecodes, translate only the text.\n\
             Do not translate personal proper names.\n\
             Answer only with the translated text, not a single word more.\n",
            self.language_name, block_text
        );

        if !self.glossary.is_empty() {
            prompt.push_str("\nAlways use these translations:\n");
            for entry in &self.glossary {
                prompt.push_str(&format!("- '{}' -> '{}'\n", entry.source, entry.target));
            }
        }

        for instruction in &self.extra_instructions {
            prompt.push_str(instruction.trim());
            prompt.push('\n');
        }

        prompt
    }

    pub fn reconcile_system(&self) -> String {
        format!(
            "You are an expert {} subtitle editor merging two translations of the same subtitles.",
            self.language_name
        )
    }

    pub fn reconcile_user(&self, first: &str, second: &str) -> String {
        format!(
            "Below are two {lang} translations of the same block of subtitles.\n\
             \n\
             For every subtitle:\n\
             1. Keep the translation that is more linguistically correct in {lang}. \
             If both are equally good, keep the one from TRANSLATION 1.\n\
             2. Remove stray emphasis markers such as *, ** or _.\n\
             3. Write every timecode line exactly as HH:MM:SS,mmm --> HH:MM:SS,mmm.\n\
             4. Keep the subtitle numbers, the timecodes and the blank line between subtitles.\n\
             \n\
             Answer only with the merged subtitles, without comments.\n\
             \n\
             [TRANSLATION 1]\n\
             {first}\n\
             \n\
             [TRANSLATION 2]\n\
             {second}\n",
            lang = self.language_name,
            first = first.trim_end(),
            second = second.trim_end(),
        )
    }
}
