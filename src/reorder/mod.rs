//! Sort or shuffle a favorites list in place.
//!
//! ```no_run
//! use favsort::reorder::{reorder_file, Operation, ReorderOptions};
//!
//! let summary = reorder_file("/mnt/data/misc/.favorite", Operation::Sort, &ReorderOptions::default())?;
//! println!("{} favorites, checksum {:08x}", summary.entries, summary.checksum);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The whole file is read and validated before anything is written.  The
//! rewrite itself truncates and overwrites the original path; there is no
//! backup and no temporary file, so an interrupted write leaves a damaged
//! list behind.

use rand::seq::SliceRandom;
use rand::Rng;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::corrections::{load_title_corrections, TitleCorrections};
use crate::favorites::{FavoritesError, FavoritesFile};

/// Where the device keeps its favorites list.
pub const DEFAULT_FAVORITES_PATH: &str = "/mnt/data/misc/.favorite";
/// Where the vendor firmware ships its arcade title table.
pub const DEFAULT_CORRECTIONS_PATH: &str = "/mnt/vendor/bin/arcade-plus.csv";

// ── Operation ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operation {
    #[default]
    Sort,
    Shuffle,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::Sort    => "sort",
            Operation::Shuffle => "shuffle",
        }
    }
}

// ── ReorderOptions ───────────────────────────────────────────────────────────

/// Configuration for [`reorder_file`].
#[derive(Debug, Clone)]
pub struct ReorderOptions {
    /// Title correction table consulted when sorting.  `None` sorts by the
    /// raw file names.
    pub corrections_path: Option<PathBuf>,
}

impl Default for ReorderOptions {
    fn default() -> Self {
        Self {
            corrections_path: Some(PathBuf::from(DEFAULT_CORRECTIONS_PATH)),
        }
    }
}

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum ReorderError {
    #[error("Failed to open file for reading: {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed to write file: {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Format(#[from] FavoritesError),
}

/// Outcome of a successful [`reorder_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderSummary {
    pub entries:  usize,
    pub checksum: u32,
}

// ── Core ─────────────────────────────────────────────────────────────────────

/// Reorder `file` in memory and renumber its index fields.
///
/// Sorting orders entries by [`Entry::sort_key`](crate::favorites::Entry::sort_key),
/// byte-wise, keeping the original order of equal keys.  Shuffling draws a
/// uniform permutation from `rng`; `corrections` is not consulted.
pub fn reorder<R: Rng + ?Sized>(
    file:        &mut FavoritesFile,
    operation:   Operation,
    corrections: &TitleCorrections,
    rng:         &mut R,
) {
    match operation {
        Operation::Shuffle => file.entries.shuffle(rng),
        Operation::Sort => file
            .entries
            .sort_by_cached_key(|entry| entry.sort_key(corrections).to_vec()),
    }
    file.renumber();
}

/// Parse a file image, reorder it, and return the new file.
pub fn reorder_bytes<R: Rng + ?Sized>(
    data:        &[u8],
    operation:   Operation,
    corrections: &TitleCorrections,
    rng:         &mut R,
) -> Result<FavoritesFile, FavoritesError> {
    let mut file = FavoritesFile::parse(data)?;
    if !file.footer_valid() {
        debug!(stored = ?file.stored_checksum(), "input footer does not match its contents");
    }
    reorder(&mut file, operation, corrections, rng);
    Ok(file)
}

/// Load the correction table named by `options`, or an empty one.
///
/// A missing or unreadable table is not an error: the sort simply falls
/// back to file names.
pub fn load_corrections(options: &ReorderOptions) -> TitleCorrections {
    let Some(path) = options.corrections_path.as_deref() else {
        debug!("title corrections disabled");
        return TitleCorrections::new();
    };
    match load_title_corrections(path) {
        Ok(corrections) => {
            info!("Loaded {} arcade title fixes", corrections.len());
            corrections
        }
        Err(err) => {
            warn!("{err}. Not applying arcade title fixes");
            TitleCorrections::new()
        }
    }
}

/// Sort or shuffle the favorites file at `path`, rewriting it in place.
pub fn reorder_file<P: AsRef<Path>>(
    path:      P,
    operation: Operation,
    options:   &ReorderOptions,
) -> Result<ReorderSummary, ReorderError> {
    let path = path.as_ref();
    debug!(path = %path.display(), operation = operation.name(), "reading favorites");
    let data = fs::read(path).map_err(|source| ReorderError::Read {
        path: path.to_owned(),
        source,
    })?;

    let corrections = match operation {
        Operation::Sort    => load_corrections(options),
        Operation::Shuffle => TitleCorrections::new(),
    };
    let file = reorder_bytes(&data, operation, &corrections, &mut rand::thread_rng())?;

    let write_err = |source| ReorderError::Write { path: path.to_owned(), source };
    let out = File::create(path).map_err(write_err)?;
    let checksum = file.write_to(BufWriter::new(out)).map_err(write_err)?;

    info!("Wrote {} favorites ({})", file.entries.len(), operation.name());
    Ok(ReorderSummary { entries: file.entries.len(), checksum })
}
