//! Script-to-statement conversion.
//!
//! # Invariants
//! - A comment starts at `-- ` and runs through the end of its line.
//! - Returned statements are trimmed, non-empty and carry no trailing `;`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

static LINE_COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-- [^\n]*\n?").expect("valid comment regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Failure to read a script from disk.
#[derive(Debug)]
pub enum ScriptError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read script `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ScriptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
        }
    }
}

/// Reads a SQL script file into memory.
pub fn load_script_file(path: impl AsRef<Path>) -> Result<String, ScriptError> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Splits script text into executable statements.
///
/// Rules:
/// - `-- ` comments are removed up to and including their line break.
/// - Whitespace runs collapse to a single space.
/// - Statements are separated by `;`; a trailing fragment without `;` is
///   kept when it is not blank.
pub fn split_sql_script(content: &str) -> Vec<String> {
    let without_comments = LINE_COMMENT_RE.replace_all(content, "");
    let collapsed = WHITESPACE_RE.replace_all(&without_comments, " ");

    collapsed
        .split(';')
        .map(str::trim)
        .filter(|statement| !statement.is_empty())
        .map(str::to_string)
        .collect()
}
