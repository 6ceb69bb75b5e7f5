// ============================================================
// Layer 4 — TSV Loader
// ============================================================
// Reads a `label<TAB>text` file and tokenises each line with
// the label and text fields.
//
// Rules:
//   - one example per line, UTF-8, no header row
//   - exactly two tab-separated columns, otherwise Error::Parse
//     carrying the file path and 1-based line number
//   - blank lines have one column and are rejected too
//   - a trailing '\r' (Windows line ending) is stripped

use std::{
    fs,
    path::PathBuf,
};

use crate::data::field::Field;
use crate::domain::example::Example;
use crate::domain::traits::ExampleSource;
use crate::error::{Error, Result};

/// Loads examples from one tab-separated file.
/// Implements the ExampleSource trait from Layer 3.
pub struct TsvLoader {
    path: PathBuf,
    label: Field,
    text: Field,
}

impl TsvLoader {
    pub fn new(path: impl Into<PathBuf>, label: Field, text: Field) -> Self {
        Self {
            path: path.into(),
            label,
            text,
        }
    }

    /// Parse already-read file contents. `self.path` is only used for
    /// error messages.
    pub fn parse(&self, contents: &str) -> Result<Vec<Example>> {
        let mut examples = Vec::new();

        for (i, line) in contents.lines().enumerate() {
            let line_no = i + 1;
            let line = line.strip_suffix('\r').unwrap_or(line);

            let columns: Vec<&str> = line.split('\t').collect();
            let [label, text] = columns.as_slice() else {
                return Err(Error::Parse {
                    path: self.path.clone(),
                    line: line_no,
                    found: columns.len(),
                });
            };

            let label = self.label.tokenize(label).concat();
            examples.push(Example::new(line_no, label, self.text.tokenize(text)));
        }

        Ok(examples)
    }
}

impl ExampleSource for TsvLoader {
    fn load_all(&self) -> Result<Vec<Example>> {
        let contents = fs::read_to_string(&self.path).map_err(|source| Error::Io {
            path: self.path.clone(),
            source,
        })?;

        let examples = self.parse(&contents)?;
        tracing::debug!(
            "Read {} examples from '{}'",
            examples.len(),
            self.path.display()
        );
        Ok(examples)
    }
}
