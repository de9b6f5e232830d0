//! CRC-32/JAMCRC checksum used in the favorites footer.
//!
//! The firmware runs the reflected CRC-32 table (polynomial `0xEDB88320`)
//! byte-at-a-time starting from a zero register, and stores the register
//! as-is.  Unlike conventional CRC-32 there is no final complement.
//!
//! The 256-entry table is built on first use and shared for the lifetime of
//! the process.

use std::sync::OnceLock;

/// Reflected CRC-32 polynomial.
pub const POLYNOMIAL: u32 = 0xEDB8_8320;
/// Number of entries in the lookup table (one per byte value).
pub const TABLE_SIZE: usize = 256;

static TABLE: OnceLock<[u32; TABLE_SIZE]> = OnceLock::new();

fn build_table() -> [u32; TABLE_SIZE] {
    let mut table = [0u32; TABLE_SIZE];
    for (i, slot) in table.iter_mut().enumerate() {
        let mut crc = i as u32;
        for _ in 0..8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ POLYNOMIAL } else { crc >> 1 };
        }
        *slot = crc;
    }
    table
}

/// The shared lookup table, computed exactly once.
#[inline]
pub fn table() -> &'static [u32; TABLE_SIZE] {
    TABLE.get_or_init(build_table)
}

/// Compute the JAMCRC of `data`.
pub fn jamcrc(data: &[u8]) -> u32 {
    JamCrc::new().update(data).finalize()
}

// ── Incremental hasher ───────────────────────────────────────────────────────

/// Incremental JAMCRC state, for callers that produce the body in pieces.
#[derive(Debug, Clone, Copy, Default)]
pub struct JamCrc {
    state: u32,
}

impl JamCrc {
    pub fn new() -> Self {
        Self { state: 0 }
    }

    pub fn update(mut self, data: &[u8]) -> Self {
        let table = table();
        let mut crc = self.state;
        for &byte in data {
            crc = table[((crc ^ byte as u32) & 0xFF) as usize] ^ (crc >> 8);
        }
        self.state = crc;
        self
    }

    pub fn finalize(self) -> u32 {
        self.state
    }
}
