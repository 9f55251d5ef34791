//! Facilities for walking a buffer of machine code and writing out a
//! disassembly listing.

use crate::dis::mos6502::{Decoded, decode};
use std::io::{self, Write};

//===========================================================================//

/// Width of the raw-bytes column in a listing: up to three bytes, each
/// written as two hex digits plus a separating space.
const BYTES_COLUMN_WIDTH: usize = 10;

//===========================================================================//

/// One decoded instruction (or undecodable fragment) within a buffer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Line {
    /// The offset of the first byte within the buffer.
    pub offset: usize,
    /// The CPU address of the first byte.
    pub address: u16,
    /// What the bytes at this position decoded to.
    pub decoded: Decoded,
}

impl Line {
    /// Returns the slice of `buffer` that this line covers.
    ///
    /// # Panics
    ///
    /// Panics if `buffer` is shorter than the buffer this line was decoded
    /// from.
    pub fn bytes<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        &buffer[self.offset..(self.offset + self.decoded.size())]
    }

    /// Formats this line as it should appear in a listing (without a
    /// trailing newline).
    pub fn format(&self, buffer: &[u8], options: ListingOptions) -> String {
        let mut string = String::new();
        if options.show_address {
            string.push_str(&format!("{:04X}  ", self.address));
        }
        if options.show_bytes {
            let bytes: Vec<String> = self
                .bytes(buffer)
                .iter()
                .map(|byte| format!("{byte:02X}"))
                .collect();
            string.push_str(&format!(
                "{:<width$}",
                bytes.join(" "),
                width = BYTES_COLUMN_WIDTH
            ));
        }
        string.push_str(&self.decoded.format(self.address));
        string
    }
}

//===========================================================================//

/// An iterator that walks a buffer from a starting offset to the end,
/// decoding one instruction at a time.
///
/// Every step consumes at least one byte, so iteration always terminates.
pub struct Disassembler<'a> {
    buffer: &'a [u8],
    origin: u16,
    offset: usize,
}

impl<'a> Disassembler<'a> {
    /// Returns a disassembler for the whole of `buffer`, whose first byte is
    /// mapped to the CPU address `origin`.
    pub fn new(buffer: &'a [u8], origin: u16) -> Disassembler<'a> {
        Disassembler::starting_at(buffer, origin, 0)
    }

    /// Like `new`, but begins decoding at `offset` within `buffer`.
    pub fn starting_at(
        buffer: &'a [u8],
        origin: u16,
        offset: usize,
    ) -> Disassembler<'a> {
        Disassembler { buffer, origin, offset }
    }
}

impl Iterator for Disassembler<'_> {
    type Item = Line;

    fn next(&mut self) -> Option<Line> {
        if self.offset >= self.buffer.len() {
            return None;
        }
        let decoded = decode(self.buffer, self.offset).ok()?;
        let line = Line {
            offset: self.offset,
            address: self.origin.wrapping_add(self.offset as u16),
            decoded,
        };
        self.offset += line.decoded.size();
        Some(line)
    }
}

//===========================================================================//

/// Layout options for a listing.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct ListingOptions {
    /// Prefix each line with the CPU address of the instruction.
    pub show_address: bool,
    /// Prefix each line with the raw bytes of the instruction.
    pub show_bytes: bool,
}

/// Counts of what was found while writing a listing.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Summary {
    /// The total number of bytes disassembled.
    pub bytes: usize,
    /// The number of documented instructions decoded.
    pub instructions: usize,
    /// The number of undefined opcode bytes.
    pub undefined: usize,
    /// The number of instructions cut off by the end of the buffer.
    pub truncated: usize,
}

impl Summary {
    fn record(&mut self, decoded: &Decoded) {
        self.bytes += decoded.size();
        match decoded {
            Decoded::Complete { .. } => self.instructions += 1,
            Decoded::Undefined { .. } => self.undefined += 1,
            Decoded::Truncated { .. } => self.truncated += 1,
        }
    }
}

/// Writes a listing of `buffer`, starting at `offset`, to `writer`, one line
/// per instruction.  `origin` is the CPU address of the first byte of
/// `buffer`.
pub fn write_listing<W: Write>(
    writer: &mut W,
    buffer: &[u8],
    origin: u16,
    offset: usize,
    options: ListingOptions,
) -> io::Result<Summary> {
    let mut summary = Summary::default();
    for line in Disassembler::starting_at(buffer, origin, offset) {
        match &line.decoded {
            Decoded::Complete { .. } => {}
            Decoded::Undefined { opcode } => {
                log::debug!(
                    "undefined opcode ${:02X} at ${:04X}",
                    opcode,
                    line.address
                );
            }
            Decoded::Truncated { opcode, .. } => {
                log::warn!(
                    "opcode ${:02X} at ${:04X} is truncated by the end of \
                     the image",
                    opcode,
                    line.address
                );
            }
        }
        summary.record(&line.decoded);
        writeln!(writer, "{}", line.format(buffer, options))?;
    }
    Ok(summary)
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{Disassembler, Line, ListingOptions, Summary, write_listing};

    fn listing(code: &[u8], origin: u16, options: ListingOptions) -> String {
        let mut output = Vec::<u8>::new();
        write_listing(&mut output, code, origin, 0, options).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn walk_resynchronizes_after_every_instruction() {
        let code = [0xa9, 0x42, 0x8d, 0x00, 0x20, 0x8a, 0x02, 0xd0, 0xf7];
        let lines: Vec<(usize, usize)> = Disassembler::new(&code, 0x8000)
            .map(|line| (line.offset, line.decoded.size()))
            .collect();
        assert_eq!(lines, vec![(0, 2), (2, 3), (5, 1), (6, 1), (7, 2)]);
    }

    #[test]
    fn walk_from_offset() {
        let code = [0xea, 0xea, 0x60];
        let addresses: Vec<u16> = Disassembler::starting_at(&code, 0xc000, 1)
            .map(|line| line.address)
            .collect();
        assert_eq!(addresses, vec![0xc001, 0xc002]);
    }

    #[test]
    fn plain_listing() {
        let code = [0xa9, 0x42, 0x8d, 0x00, 0x20, 0xd0, 0xf9, 0x02];
        assert_eq!(
            listing(&code, 0x8000, ListingOptions::default()),
            "LDA #$42\nSTA $2000\nBNE $8000\n???\n"
        );
    }

    #[test]
    fn listing_with_address_and_bytes() {
        let code = [0xa9, 0x42, 0x20, 0x00, 0x80, 0x60, 0x4c, 0x00];
        let options = ListingOptions { show_address: true, show_bytes: true };
        assert_eq!(
            listing(&code, 0xc000, options),
            "C000  A9 42     LDA #$42\n\
             C002  20 00 80  JSR $8000\n\
             C005  60        RTS\n\
             C006  4C 00     .BYTE $4C, $00 ; truncated JMP\n"
        );
    }

    #[test]
    fn summary_counts() {
        let code = [0xa9, 0x42, 0x02, 0x03, 0xea, 0x20, 0x00];
        let mut output = Vec::<u8>::new();
        let summary = write_listing(
            &mut output,
            &code,
            0,
            0,
            ListingOptions::default(),
        )
        .unwrap();
        assert_eq!(
            summary,
            Summary { bytes: 7, instructions: 2, undefined: 2, truncated: 1 }
        );
    }

    #[test]
    fn line_bytes_cover_the_decoded_instruction() {
        let code = [0xea, 0x20, 0x00, 0x80];
        let lines: Vec<Line> = Disassembler::new(&code, 0).collect();
        assert_eq!(lines[0].bytes(&code), &[0xea]);
        assert_eq!(lines[1].bytes(&code), &[0x20, 0x00, 0x80]);
    }

    #[test]
    #[should_panic]
    fn line_bytes_from_a_shorter_buffer() {
        let code = [0x20, 0x00, 0x80];
        let line = Disassembler::new(&code, 0).next().unwrap();
        line.bytes(&code[..2]);
    }

    #[test]
    fn empty_buffer_writes_nothing() {
        assert_eq!(listing(&[], 0, ListingOptions::default()), "");
    }
}

//===========================================================================//
