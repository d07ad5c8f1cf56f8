use std::io::Write;

use mipsim_core::common::error::ProgramError;
use mipsim_core::config::Config;
use mipsim_core::isa::codec::Format;
use mipsim_core::isa::instruction::Origin;
use mipsim_core::sim::Program;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::TestContext;
use crate::common::asm::{self, S0, T0, T1};

const TEXT: u32 = 0x0040_0000;
const DATA: u32 = 0x1001_0000;

fn image() -> serde_json::Value {
    json!({
        "entry": TEXT + 4,
        "text": [
            { "address": TEXT, "word": asm::li(T1, 5) },
            {
                "address": TEXT + 4,
                "word": asm::lui(S0, 0x1001),
                "origin": { "Pseudo": { "mnemonic": "la", "index": 0, "count": 1 } }
            },
            {
                "address": TEXT + 8,
                "word": asm::lw(T0, 4, S0),
                "origin": { "Basic": { "mnemonic": "lw" } }
            }
        ],
        "data": [ { "address": DATA, "bytes": [1, 0, 0, 0, 42, 0, 0, 0] } ],
        "symbols": { "main": TEXT + 4, "values": DATA }
    })
}

#[test]
fn json_image_loads_and_runs() {
    let program = Program::from_json(&image().to_string()).unwrap();
    assert_eq!(program.entry_point(), TEXT + 4);
    assert_eq!(program.symbols["values"], DATA);
    assert_eq!(
        program.text[1].origin,
        Origin::Pseudo {
            mnemonic: "la".to_owned(),
            index: 0,
            count: 1,
        }
    );

    let mut ctx = TestContext::with_program(&Config::default(), &program);
    assert_eq!(ctx.run_to_exit(), 0);
    assert_eq!(ctx.reg(T0), 42);
    // Execution started past the first word.
    assert_eq!(ctx.reg(T1), 0);
}

#[test]
fn images_are_read_from_files() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(image().to_string().as_bytes()).unwrap();

    let program = Program::from_json_file(file.path()).unwrap();
    assert_eq!(program.text.len(), 3);
    assert_eq!(program.data[0].bytes.len(), 8);
}

#[test]
fn missing_and_malformed_images_are_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = Program::from_json_file(dir.path().join("absent.json"));
    assert!(matches!(missing, Err(ProgramError::Io(_))));

    let malformed = Program::from_json(r#"{ "text": [ { "address": "main" } ] }"#);
    assert!(matches!(malformed, Err(ProgramError::Json(_))));
}

#[test]
fn entry_defaults_to_the_lowest_text_address() {
    let program = Program::from_json(r#"{ "text": [ { "address": 4194312, "word": 0 }, { "address": 4194308, "word": 0 } ] }"#)
        .unwrap();
    assert_eq!(program.entry_point(), TEXT + 4);
    assert_eq!(Program::default().entry_point(), TEXT);
}

#[test]
fn kernel_text_installs_a_handler() {
    // The handler ends the program with the exception code as exit status.
    let mut handler = vec![
        asm::mfc0(asm::A0, (13, 0)),
        asm::srl(asm::A0, asm::A0, 2),
        asm::andi(asm::A0, asm::A0, 0x1F),
    ];
    handler.extend(asm::call(17));
    let program = Program::from_words(&[asm::brk()]).with_exception_handler(&handler);
    let mut ctx = TestContext::with_program(&Config::default(), &program);
    assert_eq!(ctx.run_to_exit(), 9);
}

#[test]
fn instructions_are_decoded_for_display() {
    let program = Program::from_json(&image().to_string()).unwrap();
    let listing: Vec<_> = program.instructions().collect();
    assert_eq!(listing.len(), 3);
    assert_eq!(listing[2].0, TEXT + 8);
    assert_eq!(listing[2].1.format(), Format::I);
    assert_eq!(listing[2].1.word(), asm::lw(T0, 4, S0));
}
