//! Facilities for disassembling binary code.

use thiserror::Error;

pub mod mos6502;

//===========================================================================//

/// An error that prevents any instruction from being decoded at all.
///
/// Malformed machine code is never an error; undefined opcodes and truncated
/// operands are reported as ordinary decode results.  This type only covers
/// requests that have no byte to decode.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum DecodeError {
    /// The buffer to decode from was empty.
    #[error("cannot decode an instruction from an empty buffer")]
    EmptyBuffer,
    /// The requested offset lies outside the buffer.
    #[error("offset {offset} is out of range for a buffer of {len} bytes")]
    OffsetOutOfRange {
        /// The requested offset.
        offset: usize,
        /// The length of the buffer.
        len: usize,
    },
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::DecodeError;

    #[test]
    fn error_messages() {
        assert_eq!(
            DecodeError::EmptyBuffer.to_string(),
            "cannot decode an instruction from an empty buffer"
        );
        assert_eq!(
            DecodeError::OffsetOutOfRange { offset: 7, len: 4 }.to_string(),
            "offset 7 is out of range for a buffer of 4 bytes"
        );
    }
}

//===========================================================================//
