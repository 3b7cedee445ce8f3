//! Idempotent editing of marked blocks in line based configuration files such
//! as `/etc/fstab`.
//!
//! A block is a run of lines framed by a begin and an end marker line:
//!
//! ```text
//! # BEGIN hsbt backup
//! u123456@u123456.your-storagebox.de:/ /mnt/backup fuse.sshfs ... 0 0
//! # END hsbt backup
//! ```
//!
//! Everything outside of the blocks owned by this editor is kept byte for
//! byte.

use std::{
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use snafu::{ResultExt, Snafu};

use crate::PROJECT_NAME;

const DEFAULT_COMMENT_PREFIX: &str = "#";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Failed to read {}, error: {source}", path.display()))]
    ReadFile { path: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to write {}, error: {source}", path.display()))]
    WriteFile { path: PathBuf, source: std::io::Error },

    #[snafu(display("Invalid block marker '{marker}'"))]
    InvalidMarker { marker: String },

    #[snafu(display("Block '{marker}' starting at line {line} is never closed"))]
    UnterminatedBlock { marker: String, line: usize },

    #[snafu(display("Block '{marker}' appears twice, second time at line {line}"))]
    DuplicateBlock { marker: String, line: usize },

    #[snafu(display("End of block '{marker}' at line {line} has no matching begin"))]
    UnexpectedEndMarker { marker: String, line: usize },
}

/// Location of a block, as indices into the lines of a text.
#[derive(Clone, Debug, PartialEq, Eq)]
struct BlockSpan {
    marker: String,
    begin: usize,
    end: usize,
}

#[derive(Clone, Debug)]
pub struct ConfigFileEditor {
    path: PathBuf,
    comment_prefix: String,
    tag: String,
}

impl ConfigFileEditor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            comment_prefix: DEFAULT_COMMENT_PREFIX.to_string(),
            tag: PROJECT_NAME.to_string(),
        }
    }

    #[must_use]
    pub fn with_comment_prefix(mut self, comment_prefix: impl Into<String>) -> Self {
        self.comment_prefix = comment_prefix.into();
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path { &self.path }

    /// Reads the file. A missing file reads as empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadFile`] for any I/O error other than `NotFound`.
    pub fn read(&self) -> Result<String, Error> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(text),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(source) => Err(Error::ReadFile { path: self.path.clone(), source }),
        }
    }

    /// Replaces the file content through a uniquely named sibling temporary
    /// file, keeping the permissions of the existing file. The temporary file
    /// is removed if anything fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WriteFile`] if the temporary file cannot be written or
    /// moved into place.
    pub fn write(&self, text: &str) -> Result<(), Error> {
        let context = || WriteFileSnafu { path: self.path.clone() };

        let parent = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                std::fs::create_dir_all(parent).with_context(|_| context())?;
                parent
            }
            None => Path::new("."),
        };
        let mut temp_file = tempfile::Builder::new()
            .prefix(&format!(".{PROJECT_NAME}."))
            .suffix(".tmp")
            .tempfile_in(parent)
            .with_context(|_| context())?;
        temp_file.write_all(text.as_bytes()).with_context(|_| context())?;
        if let Ok(metadata) = std::fs::metadata(&self.path) {
            temp_file
                .as_file()
                .set_permissions(metadata.permissions())
                .with_context(|_| context())?;
        }
        let _unused =
            temp_file.persist(&self.path).map_err(|err| err.error).with_context(|_| context())?;
        tracing::debug!("Wrote {}", self.path.display());
        Ok(())
    }

    /// # Errors
    ///
    /// Fails if the file cannot be read or its blocks are malformed.
    pub fn list_blocks(&self) -> Result<Vec<String>, Error> {
        self.list_blocks_in(&self.read()?)
    }

    /// # Errors
    ///
    /// Fails if the file cannot be read or its blocks are malformed.
    pub fn get_block(&self, marker: &str) -> Result<Option<String>, Error> {
        self.get_block_in(&self.read()?, marker)
    }

    /// Inserts or replaces the block `marker`. The file is only rewritten
    /// when its content changes.
    ///
    /// Returns whether the file changed.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or written, or if its blocks are
    /// malformed.
    pub fn upsert_block(&self, marker: &str, content: &str) -> Result<bool, Error> {
        let (text, changed) = self.upsert_block_in(&self.read()?, marker, content)?;
        if changed {
            self.write(&text)?;
            tracing::info!("Updated block '{marker}' in {}", self.path.display());
        }
        Ok(changed)
    }

    /// Removes the block `marker`. Returns whether the file changed.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or written, or if its blocks are
    /// malformed.
    pub fn remove_block(&self, marker: &str) -> Result<bool, Error> {
        let (text, changed) = self.remove_block_in(&self.read()?, marker)?;
        if changed {
            self.write(&text)?;
            tracing::info!("Removed block '{marker}' from {}", self.path.display());
        }
        Ok(changed)
    }

    /// # Errors
    ///
    /// Fails if the blocks in `text` are malformed.
    pub fn list_blocks_in(&self, text: &str) -> Result<Vec<String>, Error> {
        let lines = text.split_inclusive('\n').collect::<Vec<_>>();
        Ok(self.parse_blocks(&lines)?.into_iter().map(|span| span.marker).collect())
    }

    /// Returns the content between the markers of block `marker`.
    ///
    /// # Errors
    ///
    /// Fails if the blocks in `text` are malformed.
    pub fn get_block_in(&self, text: &str, marker: &str) -> Result<Option<String>, Error> {
        let lines = text.split_inclusive('\n').collect::<Vec<_>>();
        Ok(self
            .parse_blocks(&lines)?
            .into_iter()
            .find(|span| span.marker == marker)
            .map(|span| lines[span.begin + 1..span.end].concat()))
    }

    /// # Errors
    ///
    /// Fails if `marker` is invalid or the blocks in `text` are malformed.
    pub fn upsert_block_in(
        &self,
        text: &str,
        marker: &str,
        content: &str,
    ) -> Result<(String, bool), Error> {
        validate_marker(marker)?;
        let content = normalize_content(content);
        let lines = text.split_inclusive('\n').collect::<Vec<_>>();
        let spans = self.parse_blocks(&lines)?;

        let rendered = format!(
            "{begin}\n{content}{end}\n",
            begin = self.begin_line(marker),
            end = self.end_line(marker)
        );

        if let Some(span) = spans.into_iter().find(|span| span.marker == marker) {
            if lines[span.begin + 1..span.end].concat() == content {
                return Ok((text.to_string(), false));
            }
            let mut output = lines[..span.begin].concat();
            output.push_str(&rendered);
            output.push_str(&lines[span.end + 1..].concat());
            return Ok((output, true));
        }

        let mut output = text.to_string();
        if !output.is_empty() && !output.ends_with('\n') {
            output.push('\n');
        }
        output.push_str(&rendered);
        Ok((output, true))
    }

    /// # Errors
    ///
    /// Fails if the blocks in `text` are malformed.
    pub fn remove_block_in(&self, text: &str, marker: &str) -> Result<(String, bool), Error> {
        let lines = text.split_inclusive('\n').collect::<Vec<_>>();
        let Some(span) =
            self.parse_blocks(&lines)?.into_iter().find(|span| span.marker == marker)
        else {
            return Ok((text.to_string(), false));
        };
        let mut output = lines[..span.begin].concat();
        output.push_str(&lines[span.end + 1..].concat());
        Ok((output, true))
    }

    fn parse_blocks(&self, lines: &[&str]) -> Result<Vec<BlockSpan>, Error> {
        let begin_prefix = format!("{} BEGIN {} ", self.comment_prefix, self.tag);
        let end_prefix = format!("{} END {} ", self.comment_prefix, self.tag);

        let mut spans: Vec<BlockSpan> = Vec::new();
        let mut open: Option<(String, usize)> = None;
        for (index, line) in lines.iter().enumerate() {
            let line = line.trim();
            if let Some(marker) = line.strip_prefix(&begin_prefix) {
                if let Some((marker, begin)) = open {
                    return UnterminatedBlockSnafu { marker, line: begin + 1 }.fail();
                }
                if spans.iter().any(|span| span.marker == marker) {
                    return DuplicateBlockSnafu { marker, line: index + 1 }.fail();
                }
                open = Some((marker.to_string(), index));
            } else if let Some(marker) = line.strip_prefix(&end_prefix) {
                match open.take() {
                    Some((open_marker, begin)) if open_marker == marker => {
                        spans.push(BlockSpan { marker: open_marker, begin, end: index });
                    }
                    _ => return UnexpectedEndMarkerSnafu { marker, line: index + 1 }.fail(),
                }
            }
        }
        if let Some((marker, begin)) = open {
            return UnterminatedBlockSnafu { marker, line: begin + 1 }.fail();
        }
        Ok(spans)
    }

    fn begin_line(&self, marker: &str) -> String {
        format!("{} BEGIN {} {marker}", self.comment_prefix, self.tag)
    }

    fn end_line(&self, marker: &str) -> String {
        format!("{} END {} {marker}", self.comment_prefix, self.tag)
    }
}

fn validate_marker(marker: &str) -> Result<(), Error> {
    if marker.trim().is_empty() || marker.trim() != marker || marker.contains(['\n', '\r']) {
        return InvalidMarkerSnafu { marker }.fail();
    }
    Ok(())
}

fn normalize_content(content: &str) -> String {
    if content.is_empty() || content.ends_with('\n') {
        content.to_string()
    } else {
        format!("{content}\n")
    }
}
