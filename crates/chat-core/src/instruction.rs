//! Two-slot system instruction: the user's durable instruction plus a
//! transient override carried by an archived conversation that captured
//! its own instruction at save time.
//!
//! `activate_override` and `end_override` are the only mutators of the
//! override slot and both are idempotent, so ending an override twice can
//! never corrupt the durable instruction.

pub struct SystemInstruction {
    durable: String,
    override_slot: Option<String>,
}

impl SystemInstruction {
    pub fn new(durable: impl Into<String>) -> Self {
        Self {
            durable: durable.into(),
            override_slot: None,
        }
    }

    /// The instruction currently in effect.
    pub fn active(&self) -> &str {
        self.override_slot.as_deref().unwrap_or(&self.durable)
    }

    pub fn durable(&self) -> &str {
        &self.durable
    }

    pub fn has_override(&self) -> bool {
        self.override_slot.is_some()
    }

    /// Update the durable instruction. The override, if active, keeps
    /// shadowing it until it ends.
    pub fn set_durable(&mut self, text: impl Into<String>) {
        self.durable = text.into();
    }

    /// Shadow the durable instruction with a captured one. Replaces any
    /// override already active; the durable slot is untouched.
    pub fn activate_override(&mut self, text: impl Into<String>) {
        self.override_slot = Some(text.into());
    }

    /// Drop the override and fall back to the durable instruction.
    /// Returns whether an override was actually active.
    pub fn end_override(&mut self) -> bool {
        self.override_slot.take().is_some()
    }
}
