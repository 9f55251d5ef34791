//! Disassembler for MOS 6502 machine code and NES ROM images.

#![warn(missing_docs)]

pub mod dis;
pub mod listing;
pub mod rom;
