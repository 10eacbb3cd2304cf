//! Line/column mapping for diagnostics and offset conversion for ESTree input.

use serde::Serialize;

/// A 1-based line and 0-based column in a module's source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

/// Precomputed line starts for one source text.
#[derive(Clone, Debug, Default)]
pub struct LineMap {
    line_starts: Vec<u32>,
}

impl LineMap {
    #[must_use]
    pub fn build(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(memchr::memchr_iter(b'\n', source.as_bytes()).map(|i| i as u32 + 1));
        Self { line_starts }
    }

    /// Map a byte offset to its location. Offsets past the end map onto the last line.
    #[must_use]
    pub fn locate(&self, offset: u32) -> Location {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line).copied().unwrap_or(0);
        Location {
            line: line as u32 + 1,
            column: offset.saturating_sub(line_start),
        }
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// Converts UTF-16 code-unit offsets (the unit ESTree producers such as acorn
/// report) into byte offsets. ASCII sources map onto themselves without a table.
#[derive(Clone, Debug)]
pub struct Utf16Offsets {
    table: Option<Vec<u32>>,
    byte_len: u32,
}

impl Utf16Offsets {
    #[must_use]
    pub fn new(source: &str) -> Self {
        let byte_len = source.len() as u32;
        if source.is_ascii() {
            return Self {
                table: None,
                byte_len,
            };
        }
        let mut table = Vec::with_capacity(source.len() + 1);
        for (byte_index, ch) in source.char_indices() {
            for _ in 0..ch.len_utf16() {
                table.push(byte_index as u32);
            }
        }
        table.push(byte_len);
        Self {
            table: Some(table),
            byte_len,
        }
    }

    #[must_use]
    pub fn to_byte(&self, utf16_offset: u32) -> u32 {
        match &self.table {
            None => utf16_offset.min(self.byte_len),
            Some(table) => table
                .get(utf16_offset as usize)
                .copied()
                .unwrap_or(self.byte_len),
        }
    }
}

#[cfg(test)]
#[path = "../tests/position.rs"]
mod tests;
