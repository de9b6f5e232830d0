//! Arcade title corrections.
//!
//! Arcade ROMs are named after their short set name (`sf2ce.zip`), which
//! sorts nowhere near the title a player expects.  Device vendors ship a
//! comma-separated table mapping set names to display titles:
//!
//! ```text
//! sf2ce,Capcom,1992,"Street Fighter II' - Champion Edition"
//! ```
//!
//! The first field is the key.  Of the remaining fields, the last one that is
//! wrapped in double quotes becomes the value (quotes removed).  A line with
//! no quoted field maps its key to the empty string.  When a key repeats, the
//! later line wins.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Set name (file name without extension) → corrected display title.
pub type TitleCorrections = HashMap<String, String>;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to open file for reading: {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("Failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
}

/// Load a correction table from `path`.
pub fn load_title_corrections<P: AsRef<Path>>(path: P) -> Result<TitleCorrections, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_owned(),
        source,
    })?;
    parse_title_corrections(BufReader::new(file)).map_err(|source| LoadError::Read {
        path: path.to_owned(),
        source,
    })
}

/// Parse a correction table from any buffered reader.
///
/// A trailing `\r` is dropped from every line, so CRLF tables give the same
/// values as LF ones instead of losing their last quoted field.  Bytes that
/// are not valid UTF-8 are replaced on their own line only.
pub fn parse_title_corrections<R: BufRead>(reader: R) -> io::Result<TitleCorrections> {
    let mut corrections = TitleCorrections::new();
    for line in reader.split(b'\n') {
        let line = line?;
        let line = String::from_utf8_lossy(&line);
        let line = line.strip_suffix('\r').unwrap_or(&line);
        if line.is_empty() {
            continue;
        }
        let (key, value) = parse_line(line);
        corrections.insert(key.to_owned(), value.to_owned());
    }
    Ok(corrections)
}

fn parse_line(line: &str) -> (&str, &str) {
    let mut fields = line.split(',');
    let key = fields.next().unwrap_or_default();
    let value = fields.filter_map(unquote).last().unwrap_or_default();
    (key, value)
}

/// A field counts as quoted when it starts and ends with `"`; a lone `"`
/// is quoted and empty.
fn unquote(field: &str) -> Option<&str> {
    let inner = field.strip_prefix('"')?;
    if inner.is_empty() {
        return Some(inner);
    }
    inner.strip_suffix('"')
}
