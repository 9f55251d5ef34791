use nesdis::dis::DecodeError;
use nesdis::dis::mos6502::{AddrMode, Decoded, decode};
use nesdis::listing::Disassembler;

//===========================================================================//

/// Reference table of every documented NMOS 6502 opcode: opcode, mnemonic,
/// addressing mode, and total instruction length.
const DOCUMENTED: [(u8, &str, AddrMode, usize); 151] = [
    (0x00, "BRK", AddrMode::Implied, 1),
    (0x01, "ORA", AddrMode::IndirectX, 2),
    (0x05, "ORA", AddrMode::ZeroPage, 2),
    (0x06, "ASL", AddrMode::ZeroPage, 2),
    (0x08, "PHP", AddrMode::Implied, 1),
    (0x09, "ORA", AddrMode::Immediate, 2),
    (0x0a, "ASL", AddrMode::Accumulator, 1),
    (0x0d, "ORA", AddrMode::Absolute, 3),
    (0x0e, "ASL", AddrMode::Absolute, 3),
    (0x10, "BPL", AddrMode::Relative, 2),
    (0x11, "ORA", AddrMode::IndirectY, 2),
    (0x15, "ORA", AddrMode::ZeroPageX, 2),
    (0x16, "ASL", AddrMode::ZeroPageX, 2),
    (0x18, "CLC", AddrMode::Implied, 1),
    (0x19, "ORA", AddrMode::AbsoluteY, 3),
    (0x1d, "ORA", AddrMode::AbsoluteX, 3),
    (0x1e, "ASL", AddrMode::AbsoluteX, 3),
    (0x20, "JSR", AddrMode::Absolute, 3),
    (0x21, "AND", AddrMode::IndirectX, 2),
    (0x24, "BIT", AddrMode::ZeroPage, 2),
    (0x25, "AND", AddrMode::ZeroPage, 2),
    (0x26, "ROL", AddrMode::ZeroPage, 2),
    (0x28, "PLP", AddrMode::Implied, 1),
    (0x29, "AND", AddrMode::Immediate, 2),
    (0x2a, "ROL", AddrMode::Accumulator, 1),
    (0x2c, "BIT", AddrMode::Absolute, 3),
    (0x2d, "AND", AddrMode::Absolute, 3),
    (0x2e, "ROL", AddrMode::Absolute, 3),
    (0x30, "BMI", AddrMode::Relative, 2),
    (0x31, "AND", AddrMode::IndirectY, 2),
    (0x35, "AND", AddrMode::ZeroPageX, 2),
    (0x36, "ROL", AddrMode::ZeroPageX, 2),
    (0x38, "SEC", AddrMode::Implied, 1),
    (0x39, "AND", AddrMode::AbsoluteY, 3),
    (0x3d, "AND", AddrMode::AbsoluteX, 3),
    (0x3e, "ROL", AddrMode::AbsoluteX, 3),
    (0x40, "RTI", AddrMode::Implied, 1),
    (0x41, "EOR", AddrMode::IndirectX, 2),
    (0x45, "EOR", AddrMode::ZeroPage, 2),
    (0x46, "LSR", AddrMode::ZeroPage, 2),
    (0x48, "PHA", AddrMode::Implied, 1),
    (0x49, "EOR", AddrMode::Immediate, 2),
    (0x4a, "LSR", AddrMode::Accumulator, 1),
    (0x4c, "JMP", AddrMode::Absolute, 3),
    (0x4d, "EOR", AddrMode::Absolute, 3),
    (0x4e, "LSR", AddrMode::Absolute, 3),
    (0x50, "BVC", AddrMode::Relative, 2),
    (0x51, "EOR", AddrMode::IndirectY, 2),
    (0x55, "EOR", AddrMode::ZeroPageX, 2),
    (0x56, "LSR", AddrMode::ZeroPageX, 2),
    (0x58, "CLI", AddrMode::Implied, 1),
    (0x59, "EOR", AddrMode::AbsoluteY, 3),
    (0x5d, "EOR", AddrMode::AbsoluteX, 3),
    (0x5e, "LSR", AddrMode::AbsoluteX, 3),
    (0x60, "RTS", AddrMode::Implied, 1),
    (0x61, "ADC", AddrMode::IndirectX, 2),
    (0x65, "ADC", AddrMode::ZeroPage, 2),
    (0x66, "ROR", AddrMode::ZeroPage, 2),
    (0x68, "PLA", AddrMode::Implied, 1),
    (0x69, "ADC", AddrMode::Immediate, 2),
    (0x6a, "ROR", AddrMode::Accumulator, 1),
    (0x6c, "JMP", AddrMode::Indirect, 3),
    (0x6d, "ADC", AddrMode::Absolute, 3),
    (0x6e, "ROR", AddrMode::Absolute, 3),
    (0x70, "BVS", AddrMode::Relative, 2),
    (0x71, "ADC", AddrMode::IndirectY, 2),
    (0x75, "ADC", AddrMode::ZeroPageX, 2),
    (0x76, "ROR", AddrMode::ZeroPageX, 2),
    (0x78, "SEI", AddrMode::Implied, 1),
    (0x79, "ADC", AddrMode::AbsoluteY, 3),
    (0x7d, "ADC", AddrMode::AbsoluteX, 3),
    (0x7e, "ROR", AddrMode::AbsoluteX, 3),
    (0x81, "STA", AddrMode::IndirectX, 2),
    (0x84, "STY", AddrMode::ZeroPage, 2),
    (0x85, "STA", AddrMode::ZeroPage, 2),
    (0x86, "STX", AddrMode::ZeroPage, 2),
    (0x88, "DEY", AddrMode::Implied, 1),
    (0x8a, "TXA", AddrMode::Implied, 1),
    (0x8c, "STY", AddrMode::Absolute, 3),
    (0x8d, "STA", AddrMode::Absolute, 3),
    (0x8e, "STX", AddrMode::Absolute, 3),
    (0x90, "BCC", AddrMode::Relative, 2),
    (0x91, "STA", AddrMode::IndirectY, 2),
    (0x94, "STY", AddrMode::ZeroPageX, 2),
    (0x95, "STA", AddrMode::ZeroPageX, 2),
    (0x96, "STX", AddrMode::ZeroPageY, 2),
    (0x98, "TYA", AddrMode::Implied, 1),
    (0x99, "STA", AddrMode::AbsoluteY, 3),
    (0x9a, "TXS", AddrMode::Implied, 1),
    (0x9d, "STA", AddrMode::AbsoluteX, 3),
    (0xa0, "LDY", AddrMode::Immediate, 2),
    (0xa1, "LDA", AddrMode::IndirectX, 2),
    (0xa2, "LDX", AddrMode::Immediate, 2),
    (0xa4, "LDY", AddrMode::ZeroPage, 2),
    (0xa5, "LDA", AddrMode::ZeroPage, 2),
    (0xa6, "LDX", AddrMode::ZeroPage, 2),
    (0xa8, "TAY", AddrMode::Implied, 1),
    (0xa9, "LDA", AddrMode::Immediate, 2),
    (0xaa, "TAX", AddrMode::Implied, 1),
    (0xac, "LDY", AddrMode::Absolute, 3),
    (0xad, "LDA", AddrMode::Absolute, 3),
    (0xae, "LDX", AddrMode::Absolute, 3),
    (0xb0, "BCS", AddrMode::Relative, 2),
    (0xb1, "LDA", AddrMode::IndirectY, 2),
    (0xb4, "LDY", AddrMode::ZeroPageX, 2),
    (0xb5, "LDA", AddrMode::ZeroPageX, 2),
    (0xb6, "LDX", AddrMode::ZeroPageY, 2),
    (0xb8, "CLV", AddrMode::Implied, 1),
    (0xb9, "LDA", AddrMode::AbsoluteY, 3),
    (0xba, "TSX", AddrMode::Implied, 1),
    (0xbc, "LDY", AddrMode::AbsoluteX, 3),
    (0xbd, "LDA", AddrMode::AbsoluteX, 3),
    (0xbe, "LDX", AddrMode::AbsoluteY, 3),
    (0xc0, "CPY", AddrMode::Immediate, 2),
    (0xc1, "CMP", AddrMode::IndirectX, 2),
    (0xc4, "CPY", AddrMode::ZeroPage, 2),
    (0xc5, "CMP", AddrMode::ZeroPage, 2),
    (0xc6, "DEC", AddrMode::ZeroPage, 2),
    (0xc8, "INY", AddrMode::Implied, 1),
    (0xc9, "CMP", AddrMode::Immediate, 2),
    (0xca, "DEX", AddrMode::Implied, 1),
    (0xcc, "CPY", AddrMode::Absolute, 3),
    (0xcd, "CMP", AddrMode::Absolute, 3),
    (0xce, "DEC", AddrMode::Absolute, 3),
    (0xd0, "BNE", AddrMode::Relative, 2),
    (0xd1, "CMP", AddrMode::IndirectY, 2),
    (0xd5, "CMP", AddrMode::ZeroPageX, 2),
    (0xd6, "DEC", AddrMode::ZeroPageX, 2),
    (0xd8, "CLD", AddrMode::Implied, 1),
    (0xd9, "CMP", AddrMode::AbsoluteY, 3),
    (0xdd, "CMP", AddrMode::AbsoluteX, 3),
    (0xde, "DEC", AddrMode::AbsoluteX, 3),
    (0xe0, "CPX", AddrMode::Immediate, 2),
    (0xe1, "SBC", AddrMode::IndirectX, 2),
    (0xe4, "CPX", AddrMode::ZeroPage, 2),
    (0xe5, "SBC", AddrMode::ZeroPage, 2),
    (0xe6, "INC", AddrMode::ZeroPage, 2),
    (0xe8, "INX", AddrMode::Implied, 1),
    (0xe9, "SBC", AddrMode::Immediate, 2),
    (0xea, "NOP", AddrMode::Implied, 1),
    (0xec, "CPX", AddrMode::Absolute, 3),
    (0xed, "SBC", AddrMode::Absolute, 3),
    (0xee, "INC", AddrMode::Absolute, 3),
    (0xf0, "BEQ", AddrMode::Relative, 2),
    (0xf1, "SBC", AddrMode::IndirectY, 2),
    (0xf5, "SBC", AddrMode::ZeroPageX, 2),
    (0xf6, "INC", AddrMode::ZeroPageX, 2),
    (0xf8, "SED", AddrMode::Implied, 1),
    (0xf9, "SBC", AddrMode::AbsoluteY, 3),
    (0xfd, "SBC", AddrMode::AbsoluteX, 3),
    (0xfe, "INC", AddrMode::AbsoluteX, 3),
];

fn is_documented(opcode: u8) -> bool {
    DOCUMENTED.iter().any(|&(op, _, _, _)| op == opcode)
}

//===========================================================================//

#[test]
fn every_documented_opcode_decodes_canonically() {
    for &(opcode, mnemonic, addr_mode, length) in DOCUMENTED.iter() {
        let code = [opcode, 0x34, 0x12];
        let decoded = decode(&code, 0).unwrap();
        assert!(
            matches!(decoded, Decoded::Complete { .. }),
            "opcode ${opcode:02X} did not decode completely: {decoded:?}"
        );
        assert_eq!(decoded.opcode(), opcode);
        assert_eq!(decoded.mnemonic_str(), mnemonic, "opcode ${opcode:02X}");
        assert_eq!(
            decoded.addr_mode(),
            Some(addr_mode),
            "opcode ${opcode:02X}"
        );
        assert_eq!(decoded.size(), length, "opcode ${opcode:02X}");
        assert_eq!(decoded.operand_bytes(), &code[1..length]);
    }
}

#[test]
fn length_does_not_depend_on_operand_values() {
    for &(opcode, _, addr_mode, length) in DOCUMENTED.iter() {
        for filler in [0x00, 0x7f, 0x80, 0xff] {
            let decoded = decode(&[opcode, filler, filler], 0).unwrap();
            assert_eq!(decoded.size(), length);
            assert_eq!(1 + addr_mode.operand_size(), length);
        }
    }
}

#[test]
fn every_opcode_makes_progress() {
    for opcode in 0..=255u8 {
        let decoded = decode(&[opcode], 0).unwrap();
        assert!(decoded.size() >= 1, "opcode ${opcode:02X}");
        let decoded = decode(&[opcode, 0, 0], 0).unwrap();
        assert!(decoded.size() >= 1, "opcode ${opcode:02X}");
    }
}

#[test]
fn undocumented_opcodes_are_undefined() {
    let mut count = 0;
    for opcode in (0..=255u8).filter(|&op| !is_documented(op)) {
        let decoded = decode(&[opcode, 0xa9, 0x42], 0).unwrap();
        assert_eq!(decoded, Decoded::Undefined { opcode });
        assert_eq!(decoded.size(), 1);
        assert_eq!(decoded.format(0), "???");
        count += 1;
    }
    assert_eq!(count, 105);
    for opcode in [0x02, 0x03, 0x04, 0x0b, 0x0c, 0x1a, 0x80, 0xff] {
        assert!(decode(&[opcode], 0).unwrap().is_undefined());
    }
}

#[test]
fn truncated_instructions_consume_only_available_bytes() {
    let code = [0xea, 0xea, 0x4c];
    let decoded = decode(&code, 2).unwrap();
    assert!(decoded.is_truncated());
    assert_eq!(decoded.size(), 1);
    assert_eq!(decoded.operand_bytes(), Vec::<u8>::new());

    let code = [0xea, 0x4c, 0x00];
    let decoded = decode(&code, 1).unwrap();
    assert!(decoded.is_truncated());
    assert_eq!(decoded.size(), 2);
    assert_eq!(decoded.operand_bytes(), vec![0x00]);

    let decoded = decode(&[0xa9], 0).unwrap();
    assert!(decoded.is_truncated());
    assert_eq!(decoded.size(), 1);
    assert_eq!(decoded.format(0), ".BYTE $A9 ; truncated LDA");
}

#[test]
fn invalid_input_is_an_error() {
    assert_eq!(decode(&[], 0), Err(DecodeError::EmptyBuffer));
    assert_eq!(
        decode(&[0xea, 0xea], 2),
        Err(DecodeError::OffsetOutOfRange { offset: 2, len: 2 })
    );
}

//===========================================================================//

#[test]
fn example_nop() {
    let decoded = decode(&[0xea], 0).unwrap();
    assert_eq!(decoded.mnemonic_str(), "NOP");
    assert_eq!(decoded.operand_bytes(), Vec::<u8>::new());
    assert_eq!(decoded.size(), 1);
    assert_eq!(decoded.format(0), "NOP");
}

#[test]
fn example_lda_immediate() {
    let decoded = decode(&[0xa9, 0x42], 0).unwrap();
    assert_eq!(decoded.mnemonic_str(), "LDA");
    assert_eq!(decoded.addr_mode(), Some(AddrMode::Immediate));
    assert_eq!(decoded.format(0), "LDA #$42");
    assert_eq!(decoded.size(), 2);
}

#[test]
fn example_jsr_absolute() {
    let decoded = decode(&[0x20, 0x00, 0x80], 0).unwrap();
    assert_eq!(decoded.mnemonic_str(), "JSR");
    assert_eq!(decoded.addr_mode(), Some(AddrMode::Absolute));
    assert_eq!(decoded.format(0), "JSR $8000");
    assert_eq!(decoded.size(), 3);
}

#[test]
fn example_lda_indexed_indirect() {
    let decoded = decode(&[0xa1, 0x10], 0).unwrap();
    assert_eq!(decoded.mnemonic_str(), "LDA");
    assert_eq!(decoded.addr_mode(), Some(AddrMode::IndirectX));
    assert_eq!(decoded.format(0), "LDA ($10, X)");
    assert_eq!(decoded.size(), 2);
}

#[test]
fn example_undefined() {
    let decoded = decode(&[0x02], 0).unwrap();
    assert!(decoded.is_undefined());
    assert_eq!(decoded.size(), 1);
}

//===========================================================================//

#[test]
fn scan_covers_every_byte_exactly_once() {
    // Every byte value, in order, ending mid-instruction.
    let code: Vec<u8> = (0..=255u8).collect();
    let mut expected_offset = 0;
    for line in Disassembler::new(&code, 0x8000) {
        assert_eq!(line.offset, expected_offset);
        assert_eq!(line.address, 0x8000 + line.offset as u16);
        expected_offset += line.decoded.size();
    }
    assert_eq!(expected_offset, code.len());
}

#[test]
fn scan_of_small_program() {
    // Clear the zero page, then spin.
    let code = [
        0xa9, 0x00, // LDA #$00
        0xa2, 0x00, // LDX #$00
        0x95, 0x00, // STA $00, X
        0xe8, // INX
        0xd0, 0xfb, // BNE loop
        0x4c, 0x09, 0x06, // JMP $0609
    ];
    let lines: Vec<String> = Disassembler::new(&code, 0x0600)
        .map(|line| line.decoded.format(line.address))
        .collect();
    assert_eq!(
        lines,
        vec![
            "LDA #$00",
            "LDX #$00",
            "STA $00, X",
            "INX",
            "BNE $0604",
            "JMP $0609",
        ]
    );
}

//===========================================================================//
