//! Facilities for loading ROM images to disassemble.

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use std::io::{self, Read};

//===========================================================================//

macro_rules! invalid_data {
    ($e:expr) => {
        return Err(::std::io::Error::new(::std::io::ErrorKind::InvalidData,
                                         $e))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err(::std::io::Error::new(::std::io::ErrorKind::InvalidData,
                                         format!($fmt, $($arg)+)))
    };
}

//===========================================================================//

const INES_MAGIC: &[u8; 4] = b"NES\x1a";
const INES_HEADER_SIZE: usize = 16;
const TRAINER_SIZE: usize = 0x200;
const PRG_ROM_BANK_SIZE: usize = 0x4000;
const CHR_ROM_BANK_SIZE: usize = 0x2000;

//===========================================================================//

/// How to interpret the contents of a ROM file.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum RomFormat {
    /// Use iNES if the file starts with an iNES header, and raw otherwise.
    #[default]
    Auto,
    /// Require an iNES header, and disassemble only the PRG ROM.
    Ines,
    /// Disassemble the whole file, header and all.
    Raw,
}

//===========================================================================//

/// The fields of an iNES header that matter for disassembly.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct InesHeader {
    /// The number of 16 KiB PRG ROM banks.
    pub prg_banks: u8,
    /// The number of 8 KiB CHR ROM banks (zero means the cartridge uses CHR
    /// RAM).
    pub chr_banks: u8,
    /// The iNES mapper number.
    pub mapper: u8,
    /// Whether a 512-byte trainer sits between the header and the PRG ROM.
    pub has_trainer: bool,
    /// Whether the header is in NES 2.0 format.
    pub is_nes2: bool,
}

impl InesHeader {
    fn parse(header: &[u8]) -> io::Result<InesHeader> {
        let mut reader = io::Cursor::new(header);
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != INES_MAGIC {
            invalid_data!("missing iNES header");
        }
        let prg_banks = reader.read_u8()?;
        let chr_banks = reader.read_u8()?;
        let flags6 = reader.read_u8()?;
        let flags7 = reader.read_u8()?;
        if prg_banks == 0 {
            invalid_data!("iNES header declares no PRG ROM");
        }
        Ok(InesHeader {
            prg_banks,
            chr_banks,
            mapper: (flags7 & 0xf0) | (flags6 >> 4),
            has_trainer: (flags6 & 0x04) != 0,
            is_nes2: (flags7 & 0x0c) == 0x08,
        })
    }

    /// Returns the size of the PRG ROM, in bytes.
    pub fn prg_size(&self) -> usize {
        usize::from(self.prg_banks) * PRG_ROM_BANK_SIZE
    }

    /// Returns the size of the CHR ROM, in bytes.
    pub fn chr_size(&self) -> usize {
        usize::from(self.chr_banks) * CHR_ROM_BANK_SIZE
    }
}

//===========================================================================//

/// The interrupt vectors stored at the top of the CPU address space.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Vectors {
    /// The NMI handler address (stored at `$FFFA`).
    pub nmi: u16,
    /// The reset handler address (stored at `$FFFC`).
    pub reset: u16,
    /// The IRQ/BRK handler address (stored at `$FFFE`).
    pub irq: u16,
}

//===========================================================================//

/// A block of machine code to disassemble, along with the CPU address that
/// its first byte is mapped to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RomImage {
    header: Option<InesHeader>,
    code: Vec<u8>,
    origin: u16,
}

impl RomImage {
    /// Reads a ROM file.  `origin` gives the load address to use for raw
    /// images; iNES images always map their PRG ROM so that it ends at
    /// `$FFFF`.
    pub fn read_from<R: Read>(
        mut reader: R,
        format: RomFormat,
        origin: u16,
    ) -> io::Result<RomImage> {
        let mut data = Vec::<u8>::new();
        reader.read_to_end(&mut data)?;
        if data.is_empty() {
            invalid_data!("ROM file is empty");
        }
        let has_magic = data.starts_with(INES_MAGIC);
        match format {
            RomFormat::Raw => Ok(RomImage::raw(data, origin)),
            RomFormat::Auto if !has_magic => Ok(RomImage::raw(data, origin)),
            RomFormat::Ines if !has_magic => {
                invalid_data!("missing iNES header")
            }
            RomFormat::Auto | RomFormat::Ines => RomImage::from_ines(&data),
        }
    }

    /// Wraps a raw block of machine code loaded at `origin`.
    pub fn raw(code: Vec<u8>, origin: u16) -> RomImage {
        RomImage { header: None, code, origin }
    }

    fn from_ines(data: &[u8]) -> io::Result<RomImage> {
        if data.len() < INES_HEADER_SIZE {
            invalid_data!("truncated iNES header ({} bytes)", data.len());
        }
        let header = InesHeader::parse(&data[..INES_HEADER_SIZE])?;
        let prg_start = INES_HEADER_SIZE
            + if header.has_trainer { TRAINER_SIZE } else { 0 };
        let prg_end = prg_start + header.prg_size();
        if data.len() < prg_end {
            invalid_data!(
                "iNES header declares {} bytes of PRG ROM, but only {} are \
                 present",
                header.prg_size(),
                data.len().saturating_sub(prg_start)
            );
        }
        let chr_end = prg_end + header.chr_size();
        if data.len() < chr_end {
            log::warn!(
                "iNES header declares {} bytes of CHR ROM, but only {} are \
                 present",
                header.chr_size(),
                data.len() - prg_end
            );
        }
        // A single 16 KiB bank is mirrored into both $8000 and $C000; use
        // the upper copy so that the vectors land at $FFFA.
        let origin = if header.prg_size() == PRG_ROM_BANK_SIZE {
            0xc000
        } else {
            0x8000
        };
        let code = data[prg_start..prg_end].to_vec();
        log::debug!(
            "loaded {} bytes of PRG ROM from offset {:#x}",
            code.len(),
            prg_start
        );
        Ok(RomImage { header: Some(header), code, origin })
    }

    /// Returns the iNES header, if this image was loaded from an iNES file.
    pub fn header(&self) -> Option<&InesHeader> {
        self.header.as_ref()
    }

    /// Returns the machine code to disassemble.
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// Returns the CPU address of the first byte of code.
    pub fn origin(&self) -> u16 {
        self.origin
    }

    /// Returns the interrupt vectors stored in the last six bytes of PRG
    /// ROM.  Raw images have no known layout, so this returns `None` for
    /// them.
    pub fn vectors(&self) -> Option<Vectors> {
        if self.header.is_none() {
            return None;
        }
        let len = self.code.len();
        if len < 6 {
            return None;
        }
        let table = &self.code[(len - 6)..];
        Some(Vectors {
            nmi: LittleEndian::read_u16(&table[0..2]),
            reset: LittleEndian::read_u16(&table[2..4]),
            irq: LittleEndian::read_u16(&table[4..6]),
        })
    }

    /// Converts a CPU address into an offset into the code, if the address
    /// falls within the image.
    ///
    /// Addresses are assigned linearly from the origin and wrap past `$FFFF`,
    /// the same way a listing numbers them, so in an image larger than the
    /// space above its origin (e.g. a banked iNES image over 32 KiB) a low
    /// address such as `$0000` refers to the byte the listing shows there.
    /// Where an address occurs more than once, the first occurrence wins.
    pub fn offset_of(&self, addr: u16) -> Option<usize> {
        let offset = usize::from(addr.wrapping_sub(self.origin));
        if offset < self.code.len() { Some(offset) } else { None }
    }

    /// Returns a human-readable description of this image.
    pub fn description(&self) -> String {
        match self.header {
            None => format!(
                "raw image, {} at ${:04X}",
                format_size(self.code.len()),
                self.origin
            ),
            Some(header) => {
                let mut string = format!(
                    "iNES mapper {}, {} PRG, {} CHR",
                    header.mapper,
                    format_size(header.prg_size()),
                    format_size(header.chr_size())
                );
                if header.has_trainer {
                    string.push_str(", trainer");
                }
                if header.is_nes2 {
                    string.push_str(" (NES 2.0)");
                }
                string
            }
        }
    }
}

fn format_size(size: usize) -> String {
    if size < 1024 {
        format!("{size}B")
    } else if size < 1024 * 1024 {
        format!("{}kB", size >> 10)
    } else {
        format!("{}MB", size >> 20)
    }
}

//===========================================================================//


//===========================================================================//
