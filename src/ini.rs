//! Lossless INI documents.
//!
//! Dolphin stores bindings, hotkeys and settings as INI files. Every line of
//! a parsed document is kept together with its line terminator and the exact
//! text around each value, so changing one key rewrites only that line and
//! writing an untouched document reproduces the input byte for byte.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use tracing::trace;

use crate::error::{Result, SwapError};

/// A syntax error at a 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub reason: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LineKind {
    /// Blank line or comment, kept verbatim.
    Verbatim(String),
    Section { name: String, raw: String },
    Entry {
        key: String,
        value: String,
        /// Everything before the value, including the `=` and padding.
        prefix: String,
        /// Trailing whitespace after the value.
        suffix: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    kind: LineKind,
    eol: &'static str,
}

impl Line {
    fn entry(key: &str, value: &str) -> Self {
        Self {
            kind: LineKind::Entry {
                key: key.to_string(),
                value: value.to_string(),
                prefix: format!("{key} = "),
                suffix: String::new(),
            },
            eol: "\n",
        }
    }

    fn section(name: &str) -> Self {
        Self {
            kind: LineKind::Section {
                name: name.to_string(),
                raw: format!("[{name}]"),
            },
            eol: "\n",
        }
    }

    fn blank() -> Self {
        Self {
            kind: LineKind::Verbatim(String::new()),
            eol: "\n",
        }
    }
}

/// An INI document that round-trips unchanged content exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    lines: Vec<Line>,
}

impl IniDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse INI text.
    ///
    /// Keys are case-sensitive. Duplicate sections, duplicate keys within a
    /// section, entries before the first section and lines that are not a
    /// section header, `key = value`, comment or blank are rejected.
    pub fn parse(text: &str) -> std::result::Result<Self, ParseError> {
        let mut lines = Vec::new();
        let mut seen_sections = HashSet::new();
        let mut seen_keys: Option<HashSet<String>> = None;

        for (idx, chunk) in text.split_inclusive('\n').enumerate() {
            let line_no = idx + 1;
            let (content, eol) = if let Some(rest) = chunk.strip_suffix("\r\n") {
                (rest, "\r\n")
            } else if let Some(rest) = chunk.strip_suffix('\n') {
                (rest, "\n")
            } else {
                (chunk, "")
            };
            let err = |reason: &str| ParseError {
                line: line_no,
                reason: reason.to_string(),
            };

            let trimmed = content.trim();
            let kind = if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';')
            {
                LineKind::Verbatim(content.to_string())
            } else if let Some(header) = trimmed.strip_prefix('[') {
                let name = header
                    .strip_suffix(']')
                    .ok_or_else(|| err("unterminated section header"))?
                    .trim();
                if name.is_empty() {
                    return Err(err("empty section name"));
                }
                if !seen_sections.insert(name.to_string()) {
                    return Err(err(&format!("duplicate section [{name}]")));
                }
                seen_keys = Some(HashSet::new());
                LineKind::Section {
                    name: name.to_string(),
                    raw: content.to_string(),
                }
            } else if let Some(eq) = content.find('=') {
                let key = content[..eq].trim();
                if key.is_empty() {
                    return Err(err("entry has an empty key"));
                }
                let keys = seen_keys
                    .as_mut()
                    .ok_or_else(|| err("entry outside of any section"))?;
                if !keys.insert(key.to_string()) {
                    return Err(err(&format!("duplicate key '{key}'")));
                }

                let raw_value = &content[eq + 1..];
                let lead = raw_value.len() - raw_value.trim_start().len();
                let value = raw_value.trim();
                let value_end = eq + 1 + lead + value.len();
                LineKind::Entry {
                    key: key.to_string(),
                    value: value.to_string(),
                    prefix: content[..eq + 1 + lead].to_string(),
                    suffix: content[value_end..].to_string(),
                }
            } else {
                return Err(err("expected 'key = value'"));
            };

            lines.push(Line { kind, eol });
        }

        trace!(lines = lines.len(), "Parsed INI document");
        Ok(Self { lines })
    }

    /// Read and parse a file, attributing syntax errors to `path`.
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text).map_err(|e| SwapError::IniParse {
            path: path.display().to_string(),
            line: e.line,
            reason: e.reason,
        })
    }

    /// Section names in file order.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match &line.kind {
            LineKind::Section { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.section_index(section).is_some()
    }

    /// `(key, value)` pairs of a section in file order.
    pub fn entries(&self, section: &str) -> Vec<(&str, &str)> {
        let Some(range) = self.section_range(section) else {
            return Vec::new();
        };
        self.lines[range]
            .iter()
            .filter_map(|line| match &line.kind {
                LineKind::Entry { key, value, .. } => Some((key.as_str(), value.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Value of `key` in `section`.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.entry_index(section, key).and_then(|idx| match &self.lines[idx].kind {
            LineKind::Entry { value, .. } => Some(value.as_str()),
            _ => None,
        })
    }

    /// Append a section header. Sections after the first are separated by a
    /// blank line. Does nothing if the section already exists.
    pub fn add_section(&mut self, section: &str) {
        if self.has_section(section) {
            return;
        }
        if !self.lines.is_empty() {
            self.terminate_last_line();
            self.lines.push(Line::blank());
        }
        self.lines.push(Line::section(section));
    }

    /// Set `key` in `section`, creating either when missing.
    ///
    /// An existing entry keeps its original spacing; only the value changes.
    /// A new entry is placed after the last entry of its section. A missing
    /// section is appended without a separator line so that
    /// [`remove_section`](Self::remove_section) undoes it exactly.
    pub fn set(&mut self, section: &str, key: &str, new_value: &str) {
        if let Some(idx) = self.entry_index(section, key) {
            if let LineKind::Entry { value, .. } = &mut self.lines[idx].kind {
                *value = new_value.to_string();
            }
            return;
        }

        let insert_at = if let Some(range) = self.section_range(section) {
            let last_entry = self.lines[range.clone()]
                .iter()
                .rposition(|line| matches!(line.kind, LineKind::Entry { .. }));
            last_entry.map_or(range.start, |offset| range.start + offset + 1)
        } else {
            self.terminate_last_line();
            self.lines.push(Line::section(section));
            self.lines.len()
        };

        if insert_at > 0 && self.lines[insert_at - 1].eol.is_empty() {
            self.lines[insert_at - 1].eol = "\n";
        }
        self.lines.insert(insert_at, Line::entry(key, new_value));
    }

    /// Remove `key` from `section`, returning its value.
    pub fn remove(&mut self, section: &str, key: &str) -> Option<String> {
        let idx = self.entry_index(section, key)?;
        match self.lines.remove(idx).kind {
            LineKind::Entry { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Remove a section header and every line up to the next section.
    pub fn remove_section(&mut self, section: &str) -> bool {
        let Some(header) = self.section_index(section) else {
            return false;
        };
        let end = self.section_range(section).map_or(header + 1, |range| range.end);
        self.lines.drain(header..end);
        true
    }

    /// Whether the last line carries a line terminator. An empty document
    /// counts as terminated.
    pub fn ends_with_newline(&self) -> bool {
        self.lines.last().is_none_or(|line| !line.eol.is_empty())
    }

    /// Drop the line terminator of the last line.
    pub fn strip_final_newline(&mut self) {
        if let Some(last) = self.lines.last_mut() {
            last.eol = "";
        }
    }

    /// Render the document back to text.
    pub fn render(&self) -> String {
        self.to_string()
    }

    fn terminate_last_line(&mut self) {
        if let Some(last) = self.lines.last_mut() {
            if last.eol.is_empty() {
                last.eol = "\n";
            }
        }
    }

    fn section_index(&self, section: &str) -> Option<usize> {
        self.lines.iter().position(
            |line| matches!(&line.kind, LineKind::Section { name, .. } if name == section),
        )
    }

    /// Line range holding the body of `section`, excluding its header.
    fn section_range(&self, section: &str) -> Option<std::ops::Range<usize>> {
        let start = self.section_index(section)? + 1;
        let end = self.lines[start..]
            .iter()
            .position(|line| matches!(line.kind, LineKind::Section { .. }))
            .map_or(self.lines.len(), |offset| start + offset);
        Some(start..end)
    }

    fn entry_index(&self, section: &str, wanted: &str) -> Option<usize> {
        let range = self.section_range(section)?;
        let start = range.start;
        self.lines[range]
            .iter()
            .position(|line| matches!(&line.kind, LineKind::Entry { key, .. } if key == wanted))
            .map(|offset| start + offset)
    }
}

impl fmt::Display for IniDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            match &line.kind {
                LineKind::Verbatim(raw) | LineKind::Section { raw, .. } => f.write_str(raw)?,
                LineKind::Entry {
                    value,
                    prefix,
                    suffix,
                    ..
                } => {
                    f.write_str(prefix)?;
                    f.write_str(value)?;
                    f.write_str(suffix)?;
                }
            }
            f.write_str(line.eol)?;
        }
        Ok(())
    }
}
