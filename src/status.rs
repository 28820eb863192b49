//! Text rendering of the supply state, for the display and the serial console.

use core::fmt::{self, Write as _};

use embedded_hal::digital::OutputPin;
use heapless::{String, Vec};
use log::warn;

use crate::{
    controller::PdController,
    error::Result,
    input::{ButtonSample, EditMode},
    profile::{MAX_PROFILES, Profile},
    psu::PowerSupply,
    types::Mode,
};

/// Longest line we render; longer content is dropped with a warning.
pub const LINE_CAPACITY: usize = 32;

/// Header, one line per profile and the four readouts.
pub const MAX_LINES: usize = 1 + MAX_PROFILES + 4;

pub type StatusLine = String<LINE_CAPACITY>;

/// One frame of status text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    lines: Vec<StatusLine, MAX_LINES>,
}

impl StatusReport {
    /// Render the state of `psu` together with this tick's buttons and edit mode.
    ///
    /// Reads the measured voltage and current, so this talks to the controller.
    pub fn capture<C: PdController, SW: OutputPin>(
        psu: &mut PowerSupply<C, SW>,
        sample: ButtonSample,
        edit_mode: EditMode,
    ) -> Result<Self, C::Error> {
        let mut report = Self::default();
        let mode = psu.get_mode()?;

        report.push_line(format_args!(
            "{}{}{}[{}][{}][{}]",
            indicator(sample.decrement),
            indicator(sample.select),
            indicator(sample.increment),
            edit_mode,
            psu.get_output_state()?,
            mode
        ));

        let selected = psu.get_selected_fixed_profile()?;
        let catalog = psu.catalog()?;
        match mode {
            Mode::Adjustable => {
                for (position, profile) in catalog.adjustable() {
                    if let Profile::Adjustable {
                        min_voltage_mv,
                        max_voltage_mv,
                        max_current_ma,
                    } = profile
                    {
                        report.push_line(format_args!(
                            "[{}]:{}V~{}V@{}A",
                            position,
                            Milli::from(min_voltage_mv),
                            Milli::from(max_voltage_mv),
                            Milli::from(max_current_ma)
                        ));
                    }
                }
            }
            Mode::Fixed => {
                for (index, (position, profile)) in catalog.fixed().enumerate() {
                    if let Profile::Fixed {
                        voltage_mv,
                        max_current_ma,
                    } = profile
                    {
                        let marker = if index == selected { '>' } else { ' ' };
                        report.push_line(format_args!(
                            "{}[{}]:{}V@{}A",
                            marker,
                            position,
                            Milli::from(voltage_mv),
                            Milli::from(max_current_ma)
                        ));
                    }
                }
            }
        }

        let limits = psu.get_limits()?;
        report.push_line(format_args!(
            "W (V): {}:{}",
            Milli::from(psu.get_target_voltage_mv()?),
            Milli::from(limits.min_voltage_mv)
        ));
        report.push_line(format_args!(
            "W (A): {}",
            Milli::from(psu.get_target_current_ma()?)
        ));
        report.push_line(format_args!("R (V): {}", Milli::from(psu.read_voltage_mv()?)));
        report.push_line(format_args!("R (A): {}", Milli::from(psu.read_current_ma()?)));

        Ok(report)
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|line| line.as_str())
    }

    /// Write every line followed by `\n`, then flush.
    pub fn write_to<W: embedded_io::Write>(
        &self,
        sink: &mut W,
    ) -> core::result::Result<(), W::Error> {
        for line in &self.lines {
            sink.write_all(line.as_bytes())?;
            sink.write_all(b"\n")?;
        }
        sink.flush()
    }

    fn push_line(&mut self, args: fmt::Arguments<'_>) {
        let mut line = StatusLine::new();
        if line.write_fmt(args).is_err() {
            warn!("Status line too long, dropping: {}", line);
            return;
        }
        if self.lines.push(line).is_err() {
            warn!("Status report full, dropping line");
        }
    }
}

fn indicator(pressed: bool) -> char {
    if pressed { 'x' } else { 'o' }
}

/// A milli-unit value shown in whole units with two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Milli(i64);

impl From<u32> for Milli {
    fn from(value: u32) -> Self {
        Milli(i64::from(value))
    }
}

impl From<i32> for Milli {
    fn from(value: i32) -> Self {
        Milli(i64::from(value))
    }
}

impl fmt::Display for Milli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hundredths = (self.0.unsigned_abs() + 5) / 10;
        let sign = if self.0 < 0 && hundredths > 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, hundredths / 100, hundredths % 100)
    }
}
