//! Facilities for disassembling 6502 machine code.

use super::DecodeError;
use byteorder::{ByteOrder, LittleEndian};
use std::fmt;
use std::sync::LazyLock;

//===========================================================================//

/// The mnemonic string used for opcodes that have no documented meaning.
pub const UNDEFINED_MNEMONIC: &str = "???";

/// Every documented NMOS 6502 opcode, in opcode order.
const OPCODES: [(u8, Mnemonic, AddrMode); 151] = [
    (0x00, Mnemonic::Brk, AddrMode::Implied),
    (0x01, Mnemonic::Ora, AddrMode::IndirectX),
    (0x05, Mnemonic::Ora, AddrMode::ZeroPage),
    (0x06, Mnemonic::Asl, AddrMode::ZeroPage),
    (0x08, Mnemonic::Php, AddrMode::Implied),
    (0x09, Mnemonic::Ora, AddrMode::Immediate),
    (0x0a, Mnemonic::Asl, AddrMode::Accumulator),
    (0x0d, Mnemonic::Ora, AddrMode::Absolute),
    (0x0e, Mnemonic::Asl, AddrMode::Absolute),
    (0x10, Mnemonic::Bpl, AddrMode::Relative),
    (0x11, Mnemonic::Ora, AddrMode::IndirectY),
    (0x15, Mnemonic::Ora, AddrMode::ZeroPageX),
    (0x16, Mnemonic::Asl, AddrMode::ZeroPageX),
    (0x18, Mnemonic::Clc, AddrMode::Implied),
    (0x19, Mnemonic::Ora, AddrMode::AbsoluteY),
    (0x1d, Mnemonic::Ora, AddrMode::AbsoluteX),
    (0x1e, Mnemonic::Asl, AddrMode::AbsoluteX),
    (0x20, Mnemonic::Jsr, AddrMode::Absolute),
    (0x21, Mnemonic::And, AddrMode::IndirectX),
    (0x24, Mnemonic::Bit, AddrMode::ZeroPage),
    (0x25, Mnemonic::And, AddrMode::ZeroPage),
    (0x26, Mnemonic::Rol, AddrMode::ZeroPage),
    (0x28, Mnemonic::Plp, AddrMode::Implied),
    (0x29, Mnemonic::And, AddrMode::Immediate),
    (0x2a, Mnemonic::Rol, AddrMode::Accumulator),
    (0x2c, Mnemonic::Bit, AddrMode::Absolute),
    (0x2d, Mnemonic::And, AddrMode::Absolute),
    (0x2e, Mnemonic::Rol, AddrMode::Absolute),
    (0x30, Mnemonic::Bmi, AddrMode::Relative),
    (0x31, Mnemonic::And, AddrMode::IndirectY),
    (0x35, Mnemonic::And, AddrMode::ZeroPageX),
    (0x36, Mnemonic::Rol, AddrMode::ZeroPageX),
    (0x38, Mnemonic::Sec, AddrMode::Implied),
    (0x39, Mnemonic::And, AddrMode::AbsoluteY),
    (0x3d, Mnemonic::And, AddrMode::AbsoluteX),
    (0x3e, Mnemonic::Rol, AddrMode::AbsoluteX),
    (0x40, Mnemonic::Rti, AddrMode::Implied),
    (0x41, Mnemonic::Eor, AddrMode::IndirectX),
    (0x45, Mnemonic::Eor, AddrMode::ZeroPage),
    (0x46, Mnemonic::Lsr, AddrMode::ZeroPage),
    (0x48, Mnemonic::Pha, AddrMode::Implied),
    (0x49, Mnemonic::Eor, AddrMode::Immediate),
    (0x4a, Mnemonic::Lsr, AddrMode::Accumulator),
    (0x4c, Mnemonic::Jmp, AddrMode::Absolute),
    (0x4d, Mnemonic::Eor, AddrMode::Absolute),
    (0x4e, Mnemonic::Lsr, AddrMode::Absolute),
    (0x50, Mnemonic::Bvc, AddrMode::Relative),
    (0x51, Mnemonic::Eor, AddrMode::IndirectY),
    (0x55, Mnemonic::Eor, AddrMode::ZeroPageX),
    (0x56, Mnemonic::Lsr, AddrMode::ZeroPageX),
    (0x58, Mnemonic::Cli, AddrMode::Implied),
    (0x59, Mnemonic::Eor, AddrMode::AbsoluteY),
    (0x5d, Mnemonic::Eor, AddrMode::AbsoluteX),
    (0x5e, Mnemonic::Lsr, AddrMode::AbsoluteX),
    (0x60, Mnemonic::Rts, AddrMode::Implied),
    (0x61, Mnemonic::Adc, AddrMode::IndirectX),
    (0x65, Mnemonic::Adc, AddrMode::ZeroPage),
    (0x66, Mnemonic::Ror, AddrMode::ZeroPage),
    (0x68, Mnemonic::Pla, AddrMode::Implied),
    (0x69, Mnemonic::Adc, AddrMode::Immediate),
    (0x6a, Mnemonic::Ror, AddrMode::Accumulator),
    (0x6c, Mnemonic::Jmp, AddrMode::Indirect),
    (0x6d, Mnemonic::Adc, AddrMode::Absolute),
    (0x6e, Mnemonic::Ror, AddrMode::Absolute),
    (0x70, Mnemonic::Bvs, AddrMode::Relative),
    (0x71, Mnemonic::Adc, AddrMode::IndirectY),
    (0x75, Mnemonic::Adc, AddrMode::ZeroPageX),
    (0x76, Mnemonic::Ror, AddrMode::ZeroPageX),
    (0x78, Mnemonic::Sei, AddrMode::Implied),
    (0x79, Mnemonic::Adc, AddrMode::AbsoluteY),
    (0x7d, Mnemonic::Adc, AddrMode::AbsoluteX),
    (0x7e, Mnemonic::Ror, AddrMode::AbsoluteX),
    (0x81, Mnemonic::Sta, AddrMode::IndirectX),
    (0x84, Mnemonic::Sty, AddrMode::ZeroPage),
    (0x85, Mnemonic::Sta, AddrMode::ZeroPage),
    (0x86, Mnemonic::Stx, AddrMode::ZeroPage),
    (0x88, Mnemonic::Dey, AddrMode::Implied),
    (0x8a, Mnemonic::Txa, AddrMode::Implied),
    (0x8c, Mnemonic::Sty, AddrMode::Absolute),
    (0x8d, Mnemonic::Sta, AddrMode::Absolute),
    (0x8e, Mnemonic::Stx, AddrMode::Absolute),
    (0x90, Mnemonic::Bcc, AddrMode::Relative),
    (0x91, Mnemonic::Sta, AddrMode::IndirectY),
    (0x94, Mnemonic::Sty, AddrMode::ZeroPageX),
    (0x95, Mnemonic::Sta, AddrMode::ZeroPageX),
    (0x96, Mnemonic::Stx, AddrMode::ZeroPageY),
    (0x98, Mnemonic::Tya, AddrMode::Implied),
    (0x99, Mnemonic::Sta, AddrMode::AbsoluteY),
    (0x9a, Mnemonic::Txs, AddrMode::Implied),
    (0x9d, Mnemonic::Sta, AddrMode::AbsoluteX),
    (0xa0, Mnemonic::Ldy, AddrMode::Immediate),
    (0xa1, Mnemonic::Lda, AddrMode::IndirectX),
    (0xa2, Mnemonic::Ldx, AddrMode::Immediate),
    (0xa4, Mnemonic::Ldy, AddrMode::ZeroPage),
    (0xa5, Mnemonic::Lda, AddrMode::ZeroPage),
    (0xa6, Mnemonic::Ldx, AddrMode::ZeroPage),
    (0xa8, Mnemonic::Tay, AddrMode::Implied),
    (0xa9, Mnemonic::Lda, AddrMode::Immediate),
    (0xaa, Mnemonic::Tax, AddrMode::Implied),
    (0xac, Mnemonic::Ldy, AddrMode::Absolute),
    (0xad, Mnemonic::Lda, AddrMode::Absolute),
    (0xae, Mnemonic::Ldx, AddrMode::Absolute),
    (0xb0, Mnemonic::Bcs, AddrMode::Relative),
    (0xb1, Mnemonic::Lda, AddrMode::IndirectY),
    (0xb4, Mnemonic::Ldy, AddrMode::ZeroPageX),
    (0xb5, Mnemonic::Lda, AddrMode::ZeroPageX),
    (0xb6, Mnemonic::Ldx, AddrMode::ZeroPageY),
    (0xb8, Mnemonic::Clv, AddrMode::Implied),
    (0xb9, Mnemonic::Lda, AddrMode::AbsoluteY),
    (0xba, Mnemonic::Tsx, AddrMode::Implied),
    (0xbc, Mnemonic::Ldy, AddrMode::AbsoluteX),
    (0xbd, Mnemonic::Lda, AddrMode::AbsoluteX),
    (0xbe, Mnemonic::Ldx, AddrMode::AbsoluteY),
    (0xc0, Mnemonic::Cpy, AddrMode::Immediate),
    (0xc1, Mnemonic::Cmp, AddrMode::IndirectX),
    (0xc4, Mnemonic::Cpy, AddrMode::ZeroPage),
    (0xc5, Mnemonic::Cmp, AddrMode::ZeroPage),
    (0xc6, Mnemonic::Dec, AddrMode::ZeroPage),
    (0xc8, Mnemonic::Iny, AddrMode::Implied),
    (0xc9, Mnemonic::Cmp, AddrMode::Immediate),
    (0xca, Mnemonic::Dex, AddrMode::Implied),
    (0xcc, Mnemonic::Cpy, AddrMode::Absolute),
    (0xcd, Mnemonic::Cmp, AddrMode::Absolute),
    (0xce, Mnemonic::Dec, AddrMode::Absolute),
    (0xd0, Mnemonic::Bne, AddrMode::Relative),
    (0xd1, Mnemonic::Cmp, AddrMode::IndirectY),
    (0xd5, Mnemonic::Cmp, AddrMode::ZeroPageX),
    (0xd6, Mnemonic::Dec, AddrMode::ZeroPageX),
    (0xd8, Mnemonic::Cld, AddrMode::Implied),
    (0xd9, Mnemonic::Cmp, AddrMode::AbsoluteY),
    (0xdd, Mnemonic::Cmp, AddrMode::AbsoluteX),
    (0xde, Mnemonic::Dec, AddrMode::AbsoluteX),
    (0xe0, Mnemonic::Cpx, AddrMode::Immediate),
    (0xe1, Mnemonic::Sbc, AddrMode::IndirectX),
    (0xe4, Mnemonic::Cpx, AddrMode::ZeroPage),
    (0xe5, Mnemonic::Sbc, AddrMode::ZeroPage),
    (0xe6, Mnemonic::Inc, AddrMode::ZeroPage),
    (0xe8, Mnemonic::Inx, AddrMode::Implied),
    (0xe9, Mnemonic::Sbc, AddrMode::Immediate),
    (0xea, Mnemonic::Nop, AddrMode::Implied),
    (0xec, Mnemonic::Cpx, AddrMode::Absolute),
    (0xed, Mnemonic::Sbc, AddrMode::Absolute),
    (0xee, Mnemonic::Inc, AddrMode::Absolute),
    (0xf0, Mnemonic::Beq, AddrMode::Relative),
    (0xf1, Mnemonic::Sbc, AddrMode::IndirectY),
    (0xf5, Mnemonic::Sbc, AddrMode::ZeroPageX),
    (0xf6, Mnemonic::Inc, AddrMode::ZeroPageX),
    (0xf8, Mnemonic::Sed, AddrMode::Implied),
    (0xf9, Mnemonic::Sbc, AddrMode::AbsoluteY),
    (0xfd, Mnemonic::Sbc, AddrMode::AbsoluteX),
    (0xfe, Mnemonic::Inc, AddrMode::AbsoluteX),
];

static DECODE_TABLE: LazyLock<[Option<Operation>; 256]> = LazyLock::new(|| {
    let mut table = [None; 256];
    for &(opcode, mnemonic, addr_mode) in OPCODES.iter() {
        debug_assert!(table[usize::from(opcode)].is_none());
        table[usize::from(opcode)] = Some(Operation { mnemonic, addr_mode });
    }
    table
});

//===========================================================================//

/// An operation (as defined by the instruction opcode, but without the
/// parameter values) that can be performed on a 6502 processor.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Operation {
    /// The kind of operation to be performed.
    pub mnemonic: Mnemonic,
    /// The addressing mode to use for this operation.
    pub addr_mode: AddrMode,
}

impl Operation {
    /// Looks up a 6502 opcode, returning its mnemonic and addressing mode, or
    /// `None` if the opcode is not a documented 6502 instruction.
    pub fn from_opcode(opcode: u8) -> Option<Operation> {
        DECODE_TABLE[usize::from(opcode)]
    }

    /// Returns the number of documented opcodes.
    pub fn num_documented() -> usize {
        OPCODES.len()
    }
}

//===========================================================================//

/// An operation mnemonic (ignoring the addressing mode) for a 6502 processor.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Mnemonic {
    /// Add with carry.
    Adc,
    /// Bitwise AND with accumulator.
    And,
    /// Arithmetic shift left.
    Asl,
    /// Branch if carry clear.
    Bcc,
    /// Branch if carry set.
    Bcs,
    /// Branch if equal (zero flag set).
    Beq,
    /// Bit test.
    Bit,
    /// Branch if minus.
    Bmi,
    /// Branch if not equal (zero flag clear).
    Bne,
    /// Branch if plus.
    Bpl,
    /// Software interrupt.
    Brk,
    /// Branch if overflow clear.
    Bvc,
    /// Branch if overflow set.
    Bvs,
    /// Clear carry flag.
    Clc,
    /// Clear decimal flag.
    Cld,
    /// Clear interrupt disable flag.
    Cli,
    /// Clear overflow flag.
    Clv,
    /// Compare with accumulator.
    Cmp,
    /// Compare with index X.
    Cpx,
    /// Compare with index Y.
    Cpy,
    /// Decrement memory.
    Dec,
    /// Decrement index X.
    Dex,
    /// Decrement index Y.
    Dey,
    /// Exclusive OR with accumulator.
    Eor,
    /// Increment memory.
    Inc,
    /// Increment index X.
    Inx,
    /// Increment index Y.
    Iny,
    /// Jump.
    Jmp,
    /// Jump to subroutine.
    Jsr,
    /// Load accumulator.
    Lda,
    /// Load index X.
    Ldx,
    /// Load index Y.
    Ldy,
    /// Logical shift right.
    Lsr,
    /// No operation.
    Nop,
    /// Bitwise OR with accumulator.
    Ora,
    /// Push accumulator.
    Pha,
    /// Push processor status.
    Php,
    /// Pull accumulator.
    Pla,
    /// Pull processor status.
    Plp,
    /// Rotate left.
    Rol,
    /// Rotate right.
    Ror,
    /// Return from interrupt.
    Rti,
    /// Return from subroutine.
    Rts,
    /// Subtract with borrow.
    Sbc,
    /// Set carry flag.
    Sec,
    /// Set decimal flag.
    Sed,
    /// Set interrupt disable flag.
    Sei,
    /// Store accumulator.
    Sta,
    /// Store index X.
    Stx,
    /// Store index Y.
    Sty,
    /// Transfer accumulator to index X.
    Tax,
    /// Transfer accumulator to index Y.
    Tay,
    /// Transfer stack pointer to index X.
    Tsx,
    /// Transfer index X to accumulator.
    Txa,
    /// Transfer index X to stack pointer.
    Txs,
    /// Transfer index Y to accumulator.
    Tya,
}

impl Mnemonic {
    /// Returns the assembler string for this mnemonic.
    pub fn string(self) -> &'static str {
        match self {
            Mnemonic::Adc => "ADC",
            Mnemonic::And => "AND",
            Mnemonic::Asl => "ASL",
            Mnemonic::Bcc => "BCC",
            Mnemonic::Bcs => "BCS",
            Mnemonic::Beq => "BEQ",
            Mnemonic::Bit => "BIT",
            Mnemonic::Bmi => "BMI",
            Mnemonic::Bne => "BNE",
            Mnemonic::Bpl => "BPL",
            Mnemonic::Brk => "BRK",
            Mnemonic::Bvc => "BVC",
            Mnemonic::Bvs => "BVS",
            Mnemonic::Clc => "CLC",
            Mnemonic::Cld => "CLD",
            Mnemonic::Cli => "CLI",
            Mnemonic::Clv => "CLV",
            Mnemonic::Cmp => "CMP",
            Mnemonic::Cpx => "CPX",
            Mnemonic::Cpy => "CPY",
            Mnemonic::Dec => "DEC",
            Mnemonic::Dex => "DEX",
            Mnemonic::Dey => "DEY",
            Mnemonic::Eor => "EOR",
            Mnemonic::Inc => "INC",
            Mnemonic::Inx => "INX",
            Mnemonic::Iny => "INY",
            Mnemonic::Jmp => "JMP",
            Mnemonic::Jsr => "JSR",
            Mnemonic::Lda => "LDA",
            Mnemonic::Ldx => "LDX",
            Mnemonic::Ldy => "LDY",
            Mnemonic::Lsr => "LSR",
            Mnemonic::Nop => "NOP",
            Mnemonic::Ora => "ORA",
            Mnemonic::Pha => "PHA",
            Mnemonic::Php => "PHP",
            Mnemonic::Pla => "PLA",
            Mnemonic::Plp => "PLP",
            Mnemonic::Rol => "ROL",
            Mnemonic::Ror => "ROR",
            Mnemonic::Rti => "RTI",
            Mnemonic::Rts => "RTS",
            Mnemonic::Sbc => "SBC",
            Mnemonic::Sec => "SEC",
            Mnemonic::Sed => "SED",
            Mnemonic::Sei => "SEI",
            Mnemonic::Sta => "STA",
            Mnemonic::Stx => "STX",
            Mnemonic::Sty => "STY",
            Mnemonic::Tax => "TAX",
            Mnemonic::Tay => "TAY",
            Mnemonic::Tsx => "TSX",
            Mnemonic::Txa => "TXA",
            Mnemonic::Txs => "TXS",
            Mnemonic::Tya => "TYA",
        }
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(self.string())
    }
}

//===========================================================================//

/// An addressing mode for a 6502 processor instruction.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AddrMode {
    /// No additional arguments to the opcode.
    Implied,
    /// Operate on the A register.
    Accumulator,
    /// Operate on a constant byte immediately following the opcode.
    Immediate,
    /// Operate on the 8-bit zero page address following the opcode.
    ZeroPage,
    /// Zero page address, offset by index X.
    ZeroPageX,
    /// Zero page address, offset by index Y.
    ZeroPageY,
    /// Branch to an address that is offset (by the signed byte following the
    /// opcode) from the address of the next instruction.
    Relative,
    /// Operate on the absolute 16-bit address following the opcode.
    Absolute,
    /// Absolute address, offset by index X.
    AbsoluteX,
    /// Absolute address, offset by index Y.
    AbsoluteY,
    /// Treat the 16-bit address following the opcode as a pointer to the
    /// address to operate on.  Only used by `JMP`.
    Indirect,
    /// Operate on the 16-bit address stored in the zero page, at the address
    /// following the opcode offset by index X.
    IndirectX,
    /// Operate on the 16-bit address stored in the zero page at the address
    /// following the opcode, offset by index Y.
    IndirectY,
}

impl AddrMode {
    /// Returns the number of operand bytes that follow the opcode for this
    /// addressing mode.
    pub fn operand_size(self) -> usize {
        match self {
            AddrMode::Implied | AddrMode::Accumulator => 0,
            AddrMode::Immediate
            | AddrMode::ZeroPage
            | AddrMode::ZeroPageX
            | AddrMode::ZeroPageY
            | AddrMode::Relative
            | AddrMode::IndirectX
            | AddrMode::IndirectY => 1,
            AddrMode::Absolute
            | AddrMode::AbsoluteX
            | AddrMode::AbsoluteY
            | AddrMode::Indirect => 2,
        }
    }
}

//===========================================================================//

/// An addressing mode and argument value for a 6502 processor instruction.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operand {
    /// No additional arguments to the opcode.
    Implied,
    /// Operate on the A register.
    Accumulator,
    /// Operate on the given constant byte.
    Immediate(u8),
    /// Operate on the given zero page address.
    ZeroPage(u8),
    /// Operate on the given zero page address, offset by index X.
    ZeroPageX(u8),
    /// Operate on the given zero page address, offset by index Y.
    ZeroPageY(u8),
    /// Branch by the given signed offset from the next instruction.
    Relative(i8),
    /// Operate on the given absolute address.
    Absolute(u16),
    /// Operate on the given absolute address, offset by index X.
    AbsoluteX(u16),
    /// Operate on the given absolute address, offset by index Y.
    AbsoluteY(u16),
    /// Jump through the pointer stored at the given absolute address.
    Indirect(u16),
    /// Indexed indirect through the given zero page address.
    IndirectX(u8),
    /// Indirect indexed through the given zero page address.
    IndirectY(u8),
}

impl Operand {
    /// Builds an operand from the bytes that follow the opcode.  `bytes` must
    /// hold exactly `addr_mode.operand_size()` bytes; 16-bit values are
    /// little-endian.
    fn from_bytes(addr_mode: AddrMode, bytes: &[u8]) -> Operand {
        debug_assert_eq!(bytes.len(), addr_mode.operand_size());
        match addr_mode {
            AddrMode::Implied => Operand::Implied,
            AddrMode::Accumulator => Operand::Accumulator,
            AddrMode::Immediate => Operand::Immediate(bytes[0]),
            AddrMode::ZeroPage => Operand::ZeroPage(bytes[0]),
            AddrMode::ZeroPageX => Operand::ZeroPageX(bytes[0]),
            AddrMode::ZeroPageY => Operand::ZeroPageY(bytes[0]),
            AddrMode::Relative => Operand::Relative(bytes[0] as i8),
            AddrMode::Absolute => {
                Operand::Absolute(LittleEndian::read_u16(bytes))
            }
            AddrMode::AbsoluteX => {
                Operand::AbsoluteX(LittleEndian::read_u16(bytes))
            }
            AddrMode::AbsoluteY => {
                Operand::AbsoluteY(LittleEndian::read_u16(bytes))
            }
            AddrMode::Indirect => {
                Operand::Indirect(LittleEndian::read_u16(bytes))
            }
            AddrMode::IndirectX => Operand::IndirectX(bytes[0]),
            AddrMode::IndirectY => Operand::IndirectY(bytes[0]),
        }
    }

    /// Returns the addressing mode of this operand.
    pub fn addr_mode(self) -> AddrMode {
        match self {
            Operand::Implied => AddrMode::Implied,
            Operand::Accumulator => AddrMode::Accumulator,
            Operand::Immediate(_) => AddrMode::Immediate,
            Operand::ZeroPage(_) => AddrMode::ZeroPage,
            Operand::ZeroPageX(_) => AddrMode::ZeroPageX,
            Operand::ZeroPageY(_) => AddrMode::ZeroPageY,
            Operand::Relative(_) => AddrMode::Relative,
            Operand::Absolute(_) => AddrMode::Absolute,
            Operand::AbsoluteX(_) => AddrMode::AbsoluteX,
            Operand::AbsoluteY(_) => AddrMode::AbsoluteY,
            Operand::Indirect(_) => AddrMode::Indirect,
            Operand::IndirectX(_) => AddrMode::IndirectX,
            Operand::IndirectY(_) => AddrMode::IndirectY,
        }
    }

    /// Returns the size of this operand, in bytes.
    pub fn size(self) -> usize {
        self.addr_mode().operand_size()
    }

    /// Returns the encoded operand bytes, in memory order.
    pub fn bytes(self) -> Vec<u8> {
        match self {
            Operand::Implied | Operand::Accumulator => Vec::new(),
            Operand::Immediate(byte)
            | Operand::ZeroPage(byte)
            | Operand::ZeroPageX(byte)
            | Operand::ZeroPageY(byte)
            | Operand::IndirectX(byte)
            | Operand::IndirectY(byte) => vec![byte],
            Operand::Relative(offset) => vec![offset as u8],
            Operand::Absolute(abs)
            | Operand::AbsoluteX(abs)
            | Operand::AbsoluteY(abs)
            | Operand::Indirect(abs) => {
                let mut buf = vec![0u8; 2];
                LittleEndian::write_u16(&mut buf, abs);
                buf
            }
        }
    }

    /// Formats this operand.  `pc` gives the address of the start of the
    /// instruction.
    fn format(self, pc: u16) -> String {
        match self {
            Operand::Implied => String::new(),
            Operand::Accumulator => " A".to_string(),
            Operand::Immediate(byte) => format!(" #${byte:02X}"),
            Operand::ZeroPage(zp) => format!(" ${zp:02X}"),
            Operand::ZeroPageX(zp) => format!(" ${zp:02X}, X"),
            Operand::ZeroPageY(zp) => format!(" ${zp:02X}, Y"),
            Operand::Relative(offset) => {
                let dest = pc.wrapping_add(2).wrapping_add(offset as u16);
                format!(" ${dest:04X}")
            }
            Operand::Absolute(abs) => format!(" ${abs:04X}"),
            Operand::AbsoluteX(abs) => format!(" ${abs:04X}, X"),
            Operand::AbsoluteY(abs) => format!(" ${abs:04X}, Y"),
            Operand::Indirect(abs) => format!(" (${abs:04X})"),
            Operand::IndirectX(zp) => format!(" (${zp:02X}, X)"),
            Operand::IndirectY(zp) => format!(" (${zp:02X}), Y"),
        }
    }
}

//===========================================================================//

/// A complete instruction, including parameter values, for a 6502 processor.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Instruction {
    /// The kind of operation to be performed.
    pub mnemonic: Mnemonic,
    /// The addressing mode parameter value.
    pub operand: Operand,
}

impl Instruction {
    /// Returns the size of this instruction, in bytes.
    pub fn size(self) -> usize {
        1 + self.operand.size()
    }

    /// Formats the instruction as a human-readable string.  `pc` specifies
    /// the address of the start of the instruction, and is only used to
    /// resolve branch destinations.
    pub fn format(self, pc: u16) -> String {
        format!("{}{}", self.mnemonic, self.operand.format(pc))
    }
}

//===========================================================================//

/// The result of decoding the bytes at one position of a byte stream.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Decoded {
    /// A documented instruction with all of its operand bytes present.
    Complete {
        /// The opcode byte.
        opcode: u8,
        /// The decoded instruction.
        instruction: Instruction,
    },
    /// An opcode byte with no documented meaning.
    Undefined {
        /// The opcode byte.
        opcode: u8,
    },
    /// A documented opcode whose operand runs past the end of the stream.
    Truncated {
        /// The opcode byte.
        opcode: u8,
        /// What the opcode would mean, had its operand been complete.
        operation: Operation,
        /// The operand bytes that were actually present (fewer than the
        /// addressing mode requires).
        available: Vec<u8>,
    },
}

impl Decoded {
    /// Returns the opcode byte.
    pub fn opcode(&self) -> u8 {
        match *self {
            Decoded::Complete { opcode, .. }
            | Decoded::Undefined { opcode }
            | Decoded::Truncated { opcode, .. } => opcode,
        }
    }

    /// Returns the mnemonic, or `None` for an undefined opcode.
    pub fn mnemonic(&self) -> Option<Mnemonic> {
        match self {
            Decoded::Complete { instruction, .. } => Some(instruction.mnemonic),
            Decoded::Undefined { .. } => None,
            Decoded::Truncated { operation, .. } => Some(operation.mnemonic),
        }
    }

    /// Returns the mnemonic string, using [UNDEFINED_MNEMONIC] for undefined
    /// opcodes.
    pub fn mnemonic_str(&self) -> &'static str {
        self.mnemonic().map_or(UNDEFINED_MNEMONIC, Mnemonic::string)
    }

    /// Returns the addressing mode, or `None` for an undefined opcode.
    pub fn addr_mode(&self) -> Option<AddrMode> {
        match self {
            Decoded::Complete { instruction, .. } => {
                Some(instruction.operand.addr_mode())
            }
            Decoded::Undefined { .. } => None,
            Decoded::Truncated { operation, .. } => Some(operation.addr_mode),
        }
    }

    /// Returns the operand bytes consumed after the opcode, in memory order.
    pub fn operand_bytes(&self) -> Vec<u8> {
        match self {
            Decoded::Complete { instruction, .. } => {
                instruction.operand.bytes()
            }
            Decoded::Undefined { .. } => Vec::new(),
            Decoded::Truncated { available, .. } => available.clone(),
        }
    }

    /// Returns the total number of bytes consumed, including the opcode.
    /// This is always at least 1.
    pub fn size(&self) -> usize {
        match self {
            Decoded::Complete { instruction, .. } => instruction.size(),
            Decoded::Undefined { .. } => 1,
            Decoded::Truncated { available, .. } => 1 + available.len(),
        }
    }

    /// Returns true if this is an undefined opcode.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Decoded::Undefined { .. })
    }

    /// Returns true if the operand was cut short by the end of the stream.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Decoded::Truncated { .. })
    }

    /// Formats the decoded bytes as a line of assembly (without a trailing
    /// newline).  `pc` specifies the address of the opcode byte.
    ///
    /// Truncated instructions are emitted as a `.BYTE` directive holding the
    /// bytes that were present, followed by a comment naming the instruction
    /// they would have started.
    pub fn format(&self, pc: u16) -> String {
        match self {
            Decoded::Complete { instruction, .. } => instruction.format(pc),
            Decoded::Undefined { .. } => UNDEFINED_MNEMONIC.to_string(),
            Decoded::Truncated { opcode, operation, available } => {
                let mut string = format!(".BYTE ${opcode:02X}");
                for byte in available {
                    string.push_str(&format!(", ${byte:02X}"));
                }
                string.push_str(" ; truncated ");
                string.push_str(operation.mnemonic.string());
                string
            }
        }
    }
}

/// Formats as though the instruction were at address zero, which only
/// affects the destinations shown for branches.
impl fmt::Display for Decoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(&self.format(0))
    }
}

//===========================================================================//

/// Decodes the 6502 instruction that starts at `offset` within `buffer`.
///
/// Never reads past the end of `buffer`.  Undefined opcodes and operands that
/// run off the end of the buffer are reported as [Decoded::Undefined] and
/// [Decoded::Truncated] respectively; either way, the returned record's
/// `size()` is the number of bytes to advance by to reach the next
/// instruction.
pub fn decode(buffer: &[u8], offset: usize) -> Result<Decoded, DecodeError> {
    if buffer.is_empty() {
        return Err(DecodeError::EmptyBuffer);
    }
    let opcode = *buffer
        .get(offset)
        .ok_or(DecodeError::OffsetOutOfRange { offset, len: buffer.len() })?;
    let Some(operation) = Operation::from_opcode(opcode) else {
        return Ok(Decoded::Undefined { opcode });
    };
    let rest = &buffer[(offset + 1)..];
    let operand_size = operation.addr_mode.operand_size();
    if rest.len() < operand_size {
        return Ok(Decoded::Truncated {
            opcode,
            operation,
            available: rest.to_vec(),
        });
    }
    let operand =
        Operand::from_bytes(operation.addr_mode, &rest[..operand_size]);
    let instruction = Instruction { mnemonic: operation.mnemonic, operand };
    Ok(Decoded::Complete { opcode, instruction })
}

//===========================================================================//


//===========================================================================//
