//! Instruction-set plumbing.
//!
//! The simulator does not hardcode opcode semantics. Instead it consults an
//! [`InstructionSet`] passed at construction, which maps each word to an
//! [`InstructionHandler`]. A handler declares its format, computes the control
//! signals the pipeline needs, and performs the pure computation of the
//! instruction. Register and memory effects are applied by the pipeline stages.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::codec::{Fields, Format};
use super::instruction::InstructionBits;
use crate::common::error::Fault;
use crate::core::pipeline::signals::ControlSignals;

/// Inputs handed to a handler in the EX stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExecInput {
    /// Address of the instruction.
    pub pc: u32,
    /// Decoded fields.
    pub fields: Fields,
    /// Values of the source registers named by the control signals.
    pub operands: [u32; 2],
    /// Return address to link, already adjusted for delay slots.
    pub link: u32,
}

/// Result of the EX stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// Result value, or the effective address of a memory access.
    pub value: u32,
    /// Data to store.
    pub store: u32,
    /// Target of a taken control transfer.
    pub branch: Option<u32>,
}

impl ExecOutput {
    /// Output carrying only a result value.
    pub const fn value(value: u32) -> Self {
        Self {
            value,
            store: 0,
            branch: None,
        }
    }
}

/// Semantics of one instruction.
pub trait InstructionHandler: Send + Sync + fmt::Debug {
    /// Mnemonic for tracing.
    fn mnemonic(&self) -> &str;

    /// Layout used to decode words handled by this instruction.
    fn format(&self) -> Format;

    /// Whether this handler implements `word`.
    fn matches(&self, word: u32) -> bool;

    /// Control signals for the decoded fields.
    fn signals(&self, fields: &Fields) -> ControlSignals;

    /// Pure computation performed in the EX stage.
    fn execute(&self, input: &ExecInput) -> Result<ExecOutput, Fault>;
}

/// A lookup table from instruction words to handlers.
pub trait InstructionSet: Send + Sync + fmt::Debug {
    /// Finds the handler implementing `word`.
    fn lookup(&self, word: u32) -> Option<Arc<dyn InstructionHandler>>;

    /// Name of the instruction set.
    fn name(&self) -> &str {
        "custom"
    }
}

/// Instruction set backed by a list of handlers bucketed by primary opcode.
#[derive(Clone, Default)]
pub struct HandlerTable {
    name: String,
    handlers: Vec<Arc<dyn InstructionHandler>>,
    by_opcode: HashMap<u32, Vec<usize>>,
}

impl HandlerTable {
    /// Creates an empty table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handlers: Vec::new(),
            by_opcode: HashMap::new(),
        }
    }

    /// Registers a handler for words with the given primary opcode.
    ///
    /// Handlers registered earlier win when several match the same word.
    pub fn register(&mut self, opcode: u32, handler: Arc<dyn InstructionHandler>) {
        let idx = self.handlers.len();
        self.handlers.push(handler);
        self.by_opcode.entry(opcode).or_default().push(idx);
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Finds a handler by mnemonic.
    pub fn by_mnemonic(&self, mnemonic: &str) -> Option<Arc<dyn InstructionHandler>> {
        self.handlers
            .iter()
            .find(|handler| handler.mnemonic() == mnemonic)
            .cloned()
    }
}

impl InstructionSet for HandlerTable {
    fn lookup(&self, word: u32) -> Option<Arc<dyn InstructionHandler>> {
        self.by_opcode
            .get(&word.opcode())?
            .iter()
            .map(|&idx| &self.handlers[idx])
            .find(|handler| handler.matches(word))
            .cloned()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerTable")
            .field("name", &self.name)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
