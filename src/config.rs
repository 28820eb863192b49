//! Tunable constants for the supply and its button UI.
//!
//! [`Config::default`] reproduces the behaviour of the reference board. Use the `with_*` methods to
//! override individual values.

use fugit::MillisDurationU32;

/// Voltage and current bounds that setpoint editing must stay within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub min_voltage_mv: u32,
    pub max_voltage_mv: u32,
    pub min_current_ma: u32,
    pub max_current_ma: u32,
}

impl Limits {
    pub const fn new(min_voltage_mv: u32, max_voltage_mv: u32, max_current_ma: u32) -> Self {
        Self {
            min_voltage_mv,
            max_voltage_mv,
            min_current_ma: 0,
            max_current_ma,
        }
    }

    /// Pull a voltage into `[min, max]`. An inverted range resolves to the maximum.
    pub fn clamp_voltage_mv(&self, voltage_mv: u32) -> u32 {
        voltage_mv.max(self.min_voltage_mv).min(self.max_voltage_mv)
    }

    /// Pull a current into `[min, max]`. An inverted range resolves to the maximum.
    pub fn clamp_current_ma(&self, current_ma: u32) -> u32 {
        current_ma.max(self.min_current_ma).min(self.max_current_ma)
    }
}

impl Default for Limits {
    /// 3.3 - 10 V at up to 3 A.
    fn default() -> Self {
        Limits::new(3300, 10_000, 3000)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Consecutive pressed samples required before a button acts.
    pub debounce_threshold: u16,
    /// Voltage change per step, in millivolts.
    pub voltage_step_mv: u32,
    /// Current change per step, in milliamps.
    pub current_step_ma: u32,
    /// Voltage setpoint the UI starts from.
    pub initial_voltage_mv: u32,
    /// Current setpoint the UI starts from.
    pub initial_current_ma: u32,
    /// Bounds used in adjustable mode when the source advertises no PPS profile.
    pub default_limits: Limits,
    /// How many times negotiation is polled before giving up.
    pub negotiation_attempts: u32,
    /// Wait between two negotiation polls.
    pub negotiation_retry_interval: MillisDurationU32,
    /// Wait between two control loop ticks.
    pub cycle_period: MillisDurationU32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            debounce_threshold: 5,
            voltage_step_mv: 100,
            current_step_ma: 20,
            initial_voltage_mv: 3300,
            initial_current_ma: 3000,
            default_limits: Limits::default(),
            negotiation_attempts: 50,
            negotiation_retry_interval: MillisDurationU32::millis(100),
            cycle_period: MillisDurationU32::millis(100),
        }
    }
}

impl Config {
    pub fn with_debounce_threshold(mut self, threshold: u16) -> Self {
        self.debounce_threshold = threshold;
        self
    }

    pub fn with_steps(mut self, voltage_step_mv: u32, current_step_ma: u32) -> Self {
        self.voltage_step_mv = voltage_step_mv;
        self.current_step_ma = current_step_ma;
        self
    }

    pub fn with_initial_setpoints(mut self, voltage_mv: u32, current_ma: u32) -> Self {
        self.initial_voltage_mv = voltage_mv;
        self.initial_current_ma = current_ma;
        self
    }

    pub fn with_default_limits(mut self, limits: Limits) -> Self {
        self.default_limits = limits;
        self
    }

    /// Bound the startup negotiation wait. At least one poll is always made.
    pub fn with_negotiation_retry(mut self, attempts: u32, interval: MillisDurationU32) -> Self {
        self.negotiation_attempts = attempts;
        self.negotiation_retry_interval = interval;
        self
    }

    pub fn with_cycle_period(mut self, period: MillisDurationU32) -> Self {
        self.cycle_period = period;
        self
    }
}
