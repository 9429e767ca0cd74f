use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::error::{Result, SubtradError};

/// Separator appended after every translated block
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// A run of whole cues, kept as the exact original lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    /// Original lines including their line terminators
    pub lines: Vec<String>,
    /// Number of cue index lines in the block
    pub cue_count: usize,
}

impl Block {
    /// Raw block text, byte-identical to the source lines
    pub fn text(&self) -> String {
        self.lines.concat()
    }
}

/// A line is a cue index iff, once trimmed, it is a non-empty run of ASCII digits
pub fn is_index_line(line: &str) -> bool {
    let trimmed = line.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit())
}

/// Split subtitle lines into blocks of at most `block_size` cues.
///
/// When the running cue counter already equals `block_size` at an index line,
/// the accumulated lines are flushed and the index line opens the next block.
/// Lines preceding the first index line stay in the first block. A
/// `block_size` of zero behaves like one.
pub fn split_into_blocks<S: AsRef<str>>(lines: &[S], block_size: usize) -> Vec<Block> {
    let block_size = block_size.max(1);
    let mut blocks = Vec::new();
    let mut current = Block::default();

    for line in lines {
        let line = line.as_ref();
        if is_index_line(line) {
            if current.cue_count == block_size {
                blocks.push(std::mem::take(&mut current));
            }
            current.cue_count += 1;
        }
        current.lines.push(line.to_string());
    }

    if !current.lines.is_empty() {
        blocks.push(current);
    }

    blocks
}

/// Split raw subtitle text, keeping line terminators
pub fn split_text(content: &str, block_size: usize) -> Vec<Block> {
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    split_into_blocks(&lines, block_size)
}

/// Read a subtitle file and split it into blocks
pub async fn read_blocks<P: AsRef<Path>>(path: P, block_size: usize) -> Result<Vec<Block>> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        SubtradError::InvalidInput(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let blocks = split_text(&content, block_size);
    info!(
        "Read {} cues in {} blocks from {}",
        blocks.iter().map(|b| b.cue_count).sum::<usize>(),
        blocks.len(),
        path.display()
    );
    Ok(blocks)
}

/// Join per-block results into one document.
///
/// Order is preserved and nothing is deduplicated. Empty results contribute
/// nothing; every other result ends with exactly one blank line.
pub fn assemble<S: AsRef<str>>(results: &[S]) -> String {
    let mut document = String::new();

    for result in results {
        let text = result.as_ref().trim_end_matches(['\r', '\n']);
        if text.trim().is_empty() {
            continue;
        }
        document.push_str(text);
        document.push_str(BLOCK_SEPARATOR);
    }

    document
}

/// Write a finished document in one step.
///
/// The text goes to a temporary file in the destination directory which is
/// renamed over `path` only once fully written.
pub fn write_document<P: AsRef<Path>>(path: P, text: &str) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".subtrad").suffix(".tmp");
    // Same mode a plain create would get once the umask applies
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }

    let mut file = builder.tempfile_in(dir)?;
    file.write_all(text.as_bytes())?;
    file.flush()?;
    file.persist(path).map_err(|e| SubtradError::Io(e.error))?;

    info!("Subtitle file written: {}", path.display());
    Ok(())
}
