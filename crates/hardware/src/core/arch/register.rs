//! Architectural register cell.
//!
//! A `Register` carries an identifier, its assembler aliases, a 32-bit value,
//! a reset value and a flag telling whether software may modify it.

/// One architectural register.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Register {
    id: u8,
    names: &'static [&'static str],
    value: u32,
    default: u32,
    modifiable: bool,
}

impl Register {
    /// Creates a register holding its default value.
    ///
    /// # Arguments
    ///
    /// * `id` - Register number within its bank.
    /// * `names` - Assembler aliases; the first is the canonical name.
    /// * `default` - Reset value.
    /// * `modifiable` - Whether writes take effect.
    pub const fn new(id: u8, names: &'static [&'static str], default: u32, modifiable: bool) -> Self {
        Self {
            id,
            names,
            value: default,
            default,
            modifiable,
        }
    }

    /// Register number within its bank.
    pub const fn id(&self) -> u8 {
        self.id
    }

    /// Canonical name, or an empty string for anonymous registers.
    pub fn name(&self) -> &'static str {
        self.names.first().copied().unwrap_or("")
    }

    /// All aliases of this register.
    pub const fn names(&self) -> &'static [&'static str] {
        self.names
    }

    /// Current value.
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Reset value.
    pub const fn default_value(&self) -> u32 {
        self.default
    }

    /// Whether software writes take effect.
    pub const fn is_modifiable(&self) -> bool {
        self.modifiable
    }

    /// Writes a value.
    ///
    /// # Returns
    ///
    /// The previous value when the register changed, `None` when the write was
    /// ignored or stored the same value.
    pub fn set(&mut self, value: u32) -> Option<u32> {
        if !self.modifiable || self.value == value {
            return None;
        }
        let old = self.value;
        self.value = value;
        Some(old)
    }

    /// Restores the reset value.
    pub fn reset(&mut self) {
        self.value = self.default;
    }

    /// Returns whether bit `pos` is set.
    pub const fn bit(&self, pos: u32) -> bool {
        (self.value >> pos) & 1 == 1
    }

    /// Extracts `len` bits starting at `from`.
    pub const fn section(&self, from: u32, len: u32) -> u32 {
        (self.value >> from) & low_mask(len)
    }

    /// Returns whether this register answers to `name`.
    pub fn answers_to(&self, name: &str) -> bool {
        self.names.iter().any(|alias| *alias == name)
    }
}

/// Mask with the `len` low bits set.
pub const fn low_mask(len: u32) -> u32 {
    if len >= 32 { u32::MAX } else { (1 << len) - 1 }
}
