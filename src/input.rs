//! Debounced button handling for editing setpoints.
//!
//! Three buttons drive the UI: decrement, increment and select. Holding a directional button past
//! the debounce threshold steps the setpoint being edited once per tick for as long as it is held.
//! Holding both directional buttons together switches between editing voltage and current; while
//! both are held neither one steps the setpoint, and their runs start over from zero.
//! Holding select toggles the output.

use embedded_hal::digital::OutputPin;
use log::debug;
use strum_macros::{Display, EnumIter};

use crate::{
    config::{Config, Limits},
    controller::PdController,
    error::Result,
    psu::PowerSupply,
};

/// Button levels sampled in one tick. `true` means pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonSample {
    pub decrement: bool,
    pub increment: bool,
    pub select: bool,
}

impl ButtonSample {
    pub const RELEASED: ButtonSample = ButtonSample {
        decrement: false,
        increment: false,
        select: false,
    };
    pub const DECREMENT: ButtonSample = ButtonSample {
        decrement: true,
        ..Self::RELEASED
    };
    pub const INCREMENT: ButtonSample = ButtonSample {
        increment: true,
        ..Self::RELEASED
    };
    pub const SELECT: ButtonSample = ButtonSample {
        select: true,
        ..Self::RELEASED
    };
    pub const COMBO: ButtonSample = ButtonSample {
        decrement: true,
        increment: true,
        select: false,
    };
}

/// Which setpoint the directional buttons change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, Display)]
pub enum EditMode {
    #[default]
    #[strum(serialize = "V")]
    Voltage,
    #[strum(serialize = "C")]
    Current,
}

impl EditMode {
    pub fn toggled(self) -> Self {
        match self {
            EditMode::Voltage => EditMode::Current,
            EditMode::Current => EditMode::Voltage,
        }
    }
}

/// Counts consecutive pressed samples of one button.
#[derive(Debug, Clone, Copy, Default)]
struct PressRun {
    count: u16,
}

impl PressRun {
    /// Record a sample and return the run length so far.
    fn sample(&mut self, pressed: bool) -> u16 {
        if pressed {
            self.count = self.count.saturating_add(1);
        } else {
            self.count = 0;
        }
        self.count
    }

    fn reset(&mut self) {
        self.count = 0;
    }
}

/// What one tick of the state machine decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub edit_mode: EditMode,
    pub voltage_mv: u32,
    pub current_ma: u32,
    /// The edit mode flipped this tick.
    pub edit_mode_toggled: bool,
    /// Select fired this tick; the output should be inverted.
    pub toggle_output: bool,
}

pub struct InputStateMachine {
    decrement: PressRun,
    increment: PressRun,
    combo: PressRun,
    select: PressRun,
    edit_mode: EditMode,
    threshold: u16,
    voltage_step_mv: u32,
    current_step_ma: u32,
    voltage_mv: u32,
    current_ma: u32,
}

impl InputStateMachine {
    pub fn new(config: &Config) -> Self {
        Self {
            decrement: PressRun::default(),
            increment: PressRun::default(),
            combo: PressRun::default(),
            select: PressRun::default(),
            edit_mode: EditMode::default(),
            threshold: config.debounce_threshold,
            voltage_step_mv: config.voltage_step_mv,
            current_step_ma: config.current_step_ma,
            voltage_mv: config.initial_voltage_mv,
            current_ma: config.initial_current_ma,
        }
    }

    pub fn edit_mode(&self) -> EditMode {
        self.edit_mode
    }

    pub fn voltage_mv(&self) -> u32 {
        self.voltage_mv
    }

    pub fn current_ma(&self) -> u32 {
        self.current_ma
    }

    /// Pull the setpoints into `limits`, e.g. after the envelope changed.
    pub fn clamp_to(&mut self, limits: &Limits) {
        self.voltage_mv = limits.clamp_voltage_mv(self.voltage_mv);
        self.current_ma = limits.clamp_current_ma(self.current_ma);
    }

    /// Advance one tick without touching hardware.
    ///
    /// While both directional buttons are held only the combo counts: single steps are
    /// suppressed and their runs restart from zero once the combo is released.
    pub fn update(&mut self, sample: ButtonSample, limits: &Limits) -> TickOutcome {
        let threshold = self.threshold;
        let mut edit_mode_toggled = false;

        if sample.decrement && sample.increment {
            self.decrement.reset();
            self.increment.reset();
            if self.combo.sample(true) > threshold {
                self.edit_mode = self.edit_mode.toggled();
                self.combo.reset();
                edit_mode_toggled = true;
                debug!("Editing {:?}", self.edit_mode);
            }
        } else {
            self.combo.reset();
            // Runs are not reset after firing, so a held button repeats every tick.
            if self.increment.sample(sample.increment) > threshold {
                self.step(limits, true);
            }
            if self.decrement.sample(sample.decrement) > threshold {
                self.step(limits, false);
            }
        }

        let toggle_output = self.select.sample(sample.select) > threshold;
        if toggle_output {
            self.select.reset();
        }

        TickOutcome {
            edit_mode: self.edit_mode,
            voltage_mv: self.voltage_mv,
            current_ma: self.current_ma,
            edit_mode_toggled,
            toggle_output,
        }
    }

    /// Advance one tick and push the result to the power supply.
    ///
    /// The output is inverted first if select fired, then the current and voltage setpoints are
    /// sent, every tick.
    pub fn apply<C: PdController, SW: OutputPin>(
        &mut self,
        sample: ButtonSample,
        psu: &mut PowerSupply<C, SW>,
    ) -> Result<TickOutcome, C::Error> {
        let limits = psu.get_limits()?;
        let outcome = self.update(sample, &limits);

        if outcome.toggle_output {
            let state = psu.get_output_state()?;
            psu.set_output_state(!state)?;
        }
        psu.set_target_current_ma(outcome.current_ma)?;
        psu.set_target_voltage_mv(outcome.voltage_mv)?;

        Ok(outcome)
    }

    fn step(&mut self, limits: &Limits, up: bool) {
        match self.edit_mode {
            EditMode::Voltage => {
                let next = if up {
                    self.voltage_mv.saturating_add(self.voltage_step_mv)
                } else {
                    self.voltage_mv.saturating_sub(self.voltage_step_mv)
                };
                self.voltage_mv = limits.clamp_voltage_mv(next);
            }
            EditMode::Current => {
                let next = if up {
                    self.current_ma.saturating_add(self.current_step_ma)
                } else {
                    self.current_ma.saturating_sub(self.current_step_ma)
                };
                self.current_ma = limits.clamp_current_ma(next);
            }
        }
    }
}
