//! Codec round-trip properties.
//!
//! For every format, encoding a field set that fits the format's widths and
//! decoding the word with the same format yields the original fields, and
//! every 32-bit word survives decode-then-encode unchanged.

use mipsim_core::isa::codec::{Fields, Format, decode, decode_detected, encode, sign_extend};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const FORMATS: [Format; 8] = [
    Format::R,
    Format::I,
    Format::I11,
    Format::I26,
    Format::J,
    Format::Ri,
    Format::RFpu,
    Format::RSop,
];

fn opcode() -> impl Strategy<Value = u8> {
    0u8..64
}

fn reg() -> impl Strategy<Value = u8> {
    0u8..32
}

fn funct() -> impl Strategy<Value = u8> {
    0u8..64
}

fn fields() -> impl Strategy<Value = Fields> {
    prop_oneof![
        (opcode(), reg(), reg(), reg(), reg(), funct()).prop_map(|(opcode, rs, rt, rd, shamt, funct)| {
            Fields::R {
                opcode,
                rs,
                rt,
                rd,
                shamt,
                funct,
            }
        }),
        (opcode(), reg(), reg(), any::<i16>()).prop_map(|(opcode, rs, rt, imm)| Fields::I { opcode, rs, rt, imm }),
        (opcode(), reg(), reg(), reg(), -1024i16..1024).prop_map(|(opcode, function, rt, base, offset)| {
            Fields::I11 {
                opcode,
                function,
                rt,
                base,
                offset,
            }
        }),
        (opcode(), -(1i32 << 25)..(1i32 << 25)).prop_map(|(opcode, offset)| Fields::I26 { opcode, offset }),
        (opcode(), 0u32..(1 << 26)).prop_map(|(opcode, target)| Fields::J { opcode, target }),
        (opcode(), reg(), reg(), any::<i16>()).prop_map(|(opcode, rs, function, imm)| Fields::Ri {
            opcode,
            rs,
            function,
            imm,
        }),
        (opcode(), reg(), reg(), reg(), reg(), funct()).prop_map(|(opcode, fmt, ft, fs, fd, funct)| {
            Fields::RFpu {
                opcode,
                fmt,
                ft,
                fs,
                fd,
                funct,
            }
        }),
        (opcode(), reg(), reg(), reg(), reg(), funct()).prop_map(|(opcode, rs, rt, rd, sop, funct)| {
            Fields::RSop {
                opcode,
                rs,
                rt,
                rd,
                sop,
                funct,
            }
        }),
    ]
}

proptest! {
    #[test]
    fn fields_survive_encode_then_decode(fields in fields()) {
        let word = encode(&fields);
        prop_assert_eq!(decode(word, fields.format()), fields);
    }

    #[test]
    fn every_word_survives_decode_then_encode(word in any::<u32>(), idx in 0usize..FORMATS.len()) {
        prop_assert_eq!(encode(&decode(word, FORMATS[idx])), word);
    }

    #[test]
    fn sign_extension_matches_native_casts(value in any::<u16>()) {
        prop_assert_eq!(sign_extend(u32::from(value), 16), i32::from(value as i16));
    }
}

#[test]
fn sixteen_bit_immediates_are_signed() {
    assert_eq!(sign_extend(0xFFFF, 16), -1);
    assert_eq!(sign_extend(0x7FFF, 16), 32767);
    assert_eq!(sign_extend(0x8000, 16), -32768);

    // addiu $t0, $zero, 0xFFFF
    let word = 0x2408_FFFF;
    assert_eq!(decode(word, Format::I).imm(), -1);
    let word = 0x2408_7FFF;
    assert_eq!(decode(word, Format::I).imm(), 32767);
}

#[test]
fn narrow_offsets_sign_extend_at_their_width() {
    let i11 = Fields::I11 {
        opcode: 0x12,
        function: 0x0A,
        rt: 1,
        base: 2,
        offset: -1024,
    };
    assert_eq!(decode(encode(&i11), Format::I11), i11);

    let i26 = Fields::I26 {
        opcode: 0x32,
        offset: -1,
    };
    assert_eq!(encode(&i26) & 0x03FF_FFFF, 0x03FF_FFFF);
    assert_eq!(decode(encode(&i26), Format::I26).imm(), -1);
}

#[test]
fn jump_targets_are_unsigned() {
    let word = encode(&Fields::J {
        opcode: 0x02,
        target: 0x03FF_FFFF,
    });
    assert_eq!(decode(word, Format::J).imm(), 0x03FF_FFFF);
}

#[test]
fn detection_picks_the_layout_from_the_opcode() {
    assert_eq!(Format::detect(0x0000_0000), Format::R);
    assert_eq!(Format::detect(0x0000_0098), Format::RSop); // mul $zero, $zero, $zero
    assert_eq!(Format::detect(0x0800_0000), Format::J);
    assert_eq!(Format::detect(0x0400_0000), Format::Ri);
    assert_eq!(Format::detect(0xC800_0000), Format::I26);
    assert_eq!(Format::detect(0x4600_0000), Format::RFpu); // add.s
    assert_eq!(Format::detect(0x4800_0000), Format::I);
    assert_eq!(Format::detect(0x4940_0000), Format::I11);
    assert!(matches!(decode_detected(0x2408_0005), Fields::I { imm: 5, .. }));
}
