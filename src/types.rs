//! Small shared types used across the power layer and the UI.

use strum_macros::{Display, EnumIter};

/// Which control discipline the power layer follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, Display)]
pub enum Mode {
    /// Output voltage is one of the source's fixed profiles.
    #[strum(serialize = "FIX")]
    Fixed,
    /// Output voltage and current limit are programmed within a PPS envelope.
    #[default]
    #[strum(serialize = "PPS")]
    Adjustable,
}

/// Used to be less ambiguous about whether something is on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, Display)]
pub enum State {
    /// Disabled.
    #[default]
    #[strum(serialize = "OFF")]
    Off,
    /// Enabled.
    #[strum(serialize = "ON")]
    On,
}

impl From<State> for bool {
    fn from(value: State) -> Self {
        match value {
            State::Off => false,
            State::On => true,
        }
    }
}

impl From<bool> for State {
    fn from(value: bool) -> Self {
        match value {
            true => State::On,
            false => State::Off,
        }
    }
}

impl core::ops::Not for State {
    type Output = State;

    fn not(self) -> Self::Output {
        match self {
            State::Off => State::On,
            State::On => State::Off,
        }
    }
}
