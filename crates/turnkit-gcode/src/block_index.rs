//! Program text and the block label index.

use crate::tokenizer::{tokenize_line, TokenizedLine};
use std::collections::HashMap;
use tracing::trace;
use turnkit_core::GcodeError;

/// Raw program text split into lines. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    lines: Vec<String>,
}

impl Program {
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Trimmed text of a line
    pub fn source_text(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(|l| l.trim())
    }

    /// Trimmed text of the first non-blank line after `index`
    pub fn next_non_blank_after(&self, index: usize) -> Option<&str> {
        self.lines
            .iter()
            .skip(index + 1)
            .map(|l| l.trim())
            .find(|l| !l.is_empty())
    }
}

/// Label (`N` address) to line index map. Later declarations replace earlier ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockIndex {
    labels: HashMap<u32, usize>,
}

impl BlockIndex {
    pub fn build(lines: &[TokenizedLine]) -> Self {
        let mut labels = HashMap::new();
        for line in lines {
            if let Some(label) = line.label() {
                labels.insert(label, line.line_index);
            }
        }
        Self { labels }
    }

    /// Line index declaring `label`
    pub fn resolve(&self, label: u32) -> Option<usize> {
        self.labels.get(&label).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// A program after tokenization: one entry per source line plus the label index.
#[derive(Debug, Clone, Default)]
pub struct ParsedProgram {
    pub lines: Vec<TokenizedLine>,
    pub index: BlockIndex,
}

impl ParsedProgram {
    /// Tokenize every line. Any malformed literal fails the whole program.
    pub fn parse(program: &Program) -> Result<Self, GcodeError> {
        let lines = program
            .lines()
            .iter()
            .enumerate()
            .map(|(i, l)| tokenize_line(i, l))
            .collect::<Result<Vec<_>, _>>()?;
        let index = BlockIndex::build(&lines);
        trace!(
            lines = lines.len(),
            labels = index.len(),
            "Tokenized program"
        );
        Ok(Self { lines, index })
    }

    pub fn line(&self, index: usize) -> Option<&TokenizedLine> {
        self.lines.get(index)
    }
}
