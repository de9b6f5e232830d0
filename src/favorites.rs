//! On-disk favorites list.
//!
//! # Layout
//! ```text
//! Version=1\n
//! <entry>\n
//! <entry>\n
//! ...
//! <checksum: u32 LE>
//! ```
//! Entries are colon-delimited text the firmware writes; this crate only
//! interprets two parts of them:
//!   - the *title*, everything before the first colon, used for sorting;
//!   - the *index field*, the text between the second-to-last and the last
//!     colon, holding the 1-based position of the entry in the list.
//!
//! Everything else is preserved byte for byte.  The checksum is the JAMCRC
//! (see [`crate::checksum`]) of every byte before it, stored little-endian
//! with no separator after the final line break.

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use std::io::{self, Write};
use std::ops::Range;
use thiserror::Error;

use crate::checksum::{jamcrc, JamCrc};
use crate::corrections::TitleCorrections;

/// The only header this crate understands.
pub const HEADER: &str = "Version=1";
/// Size of the trailing checksum in bytes.
pub const FOOTER_LEN: usize = 4;

#[derive(Error, Debug)]
pub enum FavoritesError {
    #[error("Invalid file format: file is empty, expected 'Version=1'")]
    MissingHeader,
    #[error("Invalid file format: first line must be 'Version=1', found '{found}'")]
    InvalidHeader { found: String },
    #[error("Invalid file format: not enough lines to process")]
    NotEnoughLines,
}

// ── Entry ────────────────────────────────────────────────────────────────────

/// One favorites line, without its line break.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
    raw: Vec<u8>,
}

impl Entry {
    pub fn new(raw: impl Into<Vec<u8>>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.raw
    }

    /// Text before the first colon, or `None` when the line has no colon.
    pub fn title(&self) -> Option<&[u8]> {
        let colon = self.raw.iter().position(|&b| b == b':')?;
        Some(&self.raw[..colon])
    }

    /// Key this entry is ordered by.
    ///
    /// The title with its extension removed, replaced by its correction when
    /// `corrections` has one.  A line with no colon sorts by the whole line.
    pub fn sort_key<'a>(&'a self, corrections: &'a TitleCorrections) -> &'a [u8] {
        let Some(title) = self.title() else {
            return &self.raw;
        };
        let stem = strip_extension(title);
        std::str::from_utf8(stem)
            .ok()
            .and_then(|s| corrections.get(s))
            .map_or(stem, |fixed| fixed.as_bytes())
    }

    /// Byte range of the index field, if the line has one.
    ///
    /// The field sits strictly between the last colon and the colon before
    /// it.  A line with fewer than two colons has no index field.
    pub fn index_range(&self) -> Option<Range<usize>> {
        let last = self.raw.iter().rposition(|&b| b == b':')?;
        let prev = self.raw[..last].iter().rposition(|&b| b == b':')?;
        Some(prev + 1..last)
    }

    pub fn index(&self) -> Option<&[u8]> {
        self.index_range().map(|r| &self.raw[r])
    }

    /// Overwrite the index field with `index`.  Returns `false` (and leaves
    /// the line alone) when there is no index field.
    pub fn set_index(&mut self, index: usize) -> bool {
        match self.index_range() {
            Some(range) => {
                self.raw.splice(range, index.to_string().into_bytes());
                true
            }
            None => false,
        }
    }
}

fn strip_extension(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|&b| b == b'.') {
        Some(dot) => &name[..dot],
        None => name,
    }
}

// ── FavoritesFile ────────────────────────────────────────────────────────────

/// A parsed favorites list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoritesFile {
    pub entries: Vec<Entry>,
    /// Checksum found in the input footer, when it was four bytes long.
    stored_checksum: Option<u32>,
    /// JAMCRC of the input bytes preceding the footer.
    body_checksum: u32,
}

impl FavoritesFile {
    pub fn new(entries: Vec<Entry>) -> Self {
        let mut file = Self { entries, stored_checksum: None, body_checksum: 0 };
        file.body_checksum = file.checksum();
        file.stored_checksum = Some(file.body_checksum);
        file
    }

    /// Parse a complete file image, footer included.
    ///
    /// The footer is the trailing four bytes when they directly follow a
    /// line break.  Anything else is treated the way the firmware's own line
    /// reader would see it: the last line is the footer and is dropped.
    pub fn parse(data: &[u8]) -> Result<Self, FavoritesError> {
        if data.is_empty() {
            return Err(FavoritesError::MissingHeader);
        }
        let (header, rest_start) = match data.iter().position(|&b| b == b'\n') {
            Some(nl) => (&data[..nl], nl + 1),
            None => (data, data.len()),
        };
        if header != HEADER.as_bytes() {
            return Err(FavoritesError::InvalidHeader {
                found: String::from_utf8_lossy(header).into_owned(),
            });
        }

        let rest = &data[rest_start..];
        let body_len = if has_binary_footer(rest) {
            rest.len() - FOOTER_LEN
        } else {
            last_line_start(rest)
        };

        let entries: Vec<Entry> = split_lines(&rest[..body_len])
            .into_iter()
            .map(Entry::new)
            .collect();
        if entries.is_empty() {
            return Err(FavoritesError::NotEnoughLines);
        }

        let footer = &rest[body_len..];
        let stored_checksum = (footer.len() == FOOTER_LEN).then(|| LittleEndian::read_u32(footer));
        Ok(Self {
            entries,
            stored_checksum,
            body_checksum: jamcrc(&data[..rest_start + body_len]),
        })
    }

    pub fn stored_checksum(&self) -> Option<u32> {
        self.stored_checksum
    }

    /// Whether the parsed footer matched the bytes before it.
    pub fn footer_valid(&self) -> bool {
        self.stored_checksum == Some(self.body_checksum)
    }

    /// Rewrite every index field so entry `i` holds `i + 1`.
    pub fn renumber(&mut self) {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.set_index(i + 1);
        }
    }

    /// Header and entries, each terminated by a line break.
    pub fn body_bytes(&self) -> Vec<u8> {
        let len = HEADER.len() + 1 + self.entries.iter().map(|e| e.raw.len() + 1).sum::<usize>();
        let mut out = Vec::with_capacity(len);
        out.extend_from_slice(HEADER.as_bytes());
        out.push(b'\n');
        for entry in &self.entries {
            out.extend_from_slice(&entry.raw);
            out.push(b'\n');
        }
        out
    }

    /// JAMCRC of the current [`body_bytes`](Self::body_bytes).
    pub fn checksum(&self) -> u32 {
        let mut crc = JamCrc::new().update(HEADER.as_bytes()).update(b"\n");
        for entry in &self.entries {
            crc = crc.update(&entry.raw).update(b"\n");
        }
        crc.finalize()
    }

    /// Full file image: body followed by its checksum.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.body_bytes();
        let crc = jamcrc(&out);
        out.extend_from_slice(&crc.to_le_bytes());
        out
    }

    /// Write the full file image and return the checksum written.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<u32> {
        let body = self.body_bytes();
        let crc = jamcrc(&body);
        writer.write_all(&body)?;
        writer.write_u32::<LittleEndian>(crc)?;
        writer.flush()?;
        Ok(crc)
    }
}

fn has_binary_footer(rest: &[u8]) -> bool {
    match rest.len() {
        n if n < FOOTER_LEN => false,
        n if n == FOOTER_LEN => true,
        n => rest[n - FOOTER_LEN - 1] == b'\n',
    }
}

/// Offset of the last line in `data`, where a trailing line break does not
/// start a new (empty) line.
fn last_line_start(data: &[u8]) -> usize {
    let content = data.strip_suffix(b"\n").unwrap_or(data);
    content.iter().rposition(|&b| b == b'\n').map_or(0, |nl| nl + 1)
}

/// Split on `\n`; a trailing line break does not produce an empty line.
fn split_lines(data: &[u8]) -> Vec<&[u8]> {
    if data.is_empty() {
        return Vec::new();
    }
    let content = data.strip_suffix(b"\n").unwrap_or(data);
    content.split(|&b| b == b'\n').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(body: &str) -> Vec<u8> {
        let mut out = body.as_bytes().to_vec();
        out.extend_from_slice(&jamcrc(body.as_bytes()).to_le_bytes());
        out
    }

    #[test]
    fn parses_entries_and_footer() {
        let data = image("Version=1\nGameA.rom:path:1:\nGameB.rom:path:2:\n");
        let file = FavoritesFile::parse(&data).unwrap();
        assert_eq!(file.entries.len(), 2);
        assert_eq!(file.entries[0].as_bytes(), b"GameA.rom:path:1:");
        assert!(file.footer_valid());
        assert_eq!(file.to_bytes(), data);
    }

    #[test]
    fn detects_stale_footer() {
        let mut data = b"Version=1\nA:x:1:\n".to_vec();
        data.extend_from_slice(&[1, 2, 3, 4]);
        let file = FavoritesFile::parse(&data).unwrap();
        assert_eq!(file.stored_checksum(), Some(0x0403_0201));
        assert!(!file.footer_valid());
    }

    #[test]
    fn footer_containing_line_break_is_not_an_entry() {
        let mut data = b"Version=1\nA:x:1:\n".to_vec();
        data.extend_from_slice(&[0x41, b'\n', 0x42, 0x43]);
        let file = FavoritesFile::parse(&data).unwrap();
        assert_eq!(file.entries, vec![Entry::new("A:x:1:")]);
    }

    #[test]
    fn missing_footer_drops_last_line() {
        let file = FavoritesFile::parse(b"Version=1\nA:x:1:\nB:x:2:\nC:x:3:\n").unwrap();
        assert_eq!(file.entries.len(), 2);
        assert_eq!(file.stored_checksum(), None);
    }

    #[test]
    fn rejects_empty_file() {
        assert!(matches!(FavoritesFile::parse(b""), Err(FavoritesError::MissingHeader)));
    }

    #[test]
    fn rejects_wrong_header() {
        let err = FavoritesFile::parse(b"Version=2\nA:x:1:\nabcd").unwrap_err();
        assert!(matches!(err, FavoritesError::InvalidHeader { ref found } if found == "Version=2"));
        assert!(FavoritesFile::parse(b"Version=1\r\nA:x:1:\nabcd").is_err());
    }

    #[test]
    fn header_and_footer_only_is_not_enough() {
        let data = image("Version=1\n");
        assert!(matches!(FavoritesFile::parse(&data), Err(FavoritesError::NotEnoughLines)));
        assert!(matches!(FavoritesFile::parse(b"Version=1\n"), Err(FavoritesError::NotEnoughLines)));
        assert!(matches!(FavoritesFile::parse(b"Version=1"), Err(FavoritesError::NotEnoughLines)));
        assert!(matches!(FavoritesFile::parse(b"Version=1\nA:1:\n"), Err(FavoritesError::NotEnoughLines)));
    }

    #[test]
    fn preserves_non_utf8_entries() {
        let mut body = b"Version=1\n".to_vec();
        body.extend_from_slice(b"\xffrom.bin:\xfe:7:\n");
        let crc = jamcrc(&body);
        body.extend_from_slice(&crc.to_le_bytes());
        let file = FavoritesFile::parse(&body).unwrap();
        assert_eq!(file.entries[0].index(), Some(&b"7"[..]));
        assert_eq!(file.to_bytes(), body);
    }

    #[test]
    fn sort_key_strips_extension_and_applies_corrections() {
        let mut fixes = TitleCorrections::new();
        fixes.insert("GameA".into(), "Zeta Quest".into());
        assert_eq!(Entry::new("GameA.rom:p:1:").sort_key(&fixes), b"Zeta Quest");
        assert_eq!(Entry::new("GameB.rom:p:1:").sort_key(&fixes), b"GameB");
        assert_eq!(Entry::new("my.game.zip:p:1:").sort_key(&fixes), b"my.game");
        assert_eq!(Entry::new("noext:p:1:").sort_key(&fixes), b"noext");
        assert_eq!(Entry::new("GameA.rom").sort_key(&fixes), b"GameA.rom");
    }

    #[test]
    fn set_index_rewrites_between_last_two_colons() {
        let mut e = Entry::new("/roms/GBA/Game.gba:GBA:17:extra");
        assert!(e.set_index(3));
        assert_eq!(e.as_bytes(), b"/roms/GBA/Game.gba:GBA:3:extra");

        let mut e = Entry::new("Game.gba:p::");
        assert!(e.set_index(12));
        assert_eq!(e.as_bytes(), b"Game.gba:p:12:");
    }

    #[test]
    fn set_index_without_field_leaves_line() {
        for line in ["plain", ":leading", "one:colon"] {
            let mut e = Entry::new(line);
            assert!(!e.set_index(5));
            assert_eq!(e.as_bytes(), line.as_bytes());
        }
    }

    #[test]
    fn checksum_matches_body() {
        let file = FavoritesFile::new(vec![Entry::new("A:x:1:"), Entry::new("B:x:2:")]);
        assert_eq!(file.checksum(), jamcrc(&file.body_bytes()));

        let mut out = Vec::new();
        let crc = file.write_to(&mut out).unwrap();
        assert_eq!(crc, file.checksum());
        assert_eq!(out, file.to_bytes());
    }
}
