//! The cycle-driven front panel: buttons in, power commands out, status text to a sink.

use embedded_hal::{
    delay::DelayNs,
    digital::{Error as _, InputPin, OutputPin},
};
use embedded_io::Error as _;
use fugit::MillisDurationU32;
use log::{info, warn};

use crate::{
    config::Config,
    controller::PdController,
    error::{Error, Result},
    input::{ButtonSample, InputStateMachine, TickOutcome},
    psu::PowerSupply,
    status::StatusReport,
    types::Mode,
};

/// The three front panel buttons. Pressed pulls the line low.
pub struct Buttons<B: InputPin> {
    pub decrement: B,
    pub increment: B,
    pub select: B,
}

impl<B: InputPin> Buttons<B> {
    pub fn new(decrement: B, increment: B, select: B) -> Self {
        Self {
            decrement,
            increment,
            select,
        }
    }

    pub fn sample(&mut self) -> core::result::Result<ButtonSample, B::Error> {
        Ok(ButtonSample {
            decrement: self.decrement.is_low()?,
            increment: self.increment.is_low()?,
            select: self.select.is_low()?,
        })
    }
}

/// Owns every piece of hardware the bench supply touches.
pub struct ControlLoop<C, SW, B, LED, W>
where
    C: PdController,
    SW: OutputPin,
    B: InputPin,
    LED: OutputPin,
    W: embedded_io::Write,
{
    psu: PowerSupply<C, SW>,
    buttons: Buttons<B>,
    power_led: LED,
    console: W,
    input: InputStateMachine,
    cycle_period: MillisDurationU32,
}

impl<C, SW, B, LED, W> ControlLoop<C, SW, B, LED, W>
where
    C: PdController,
    SW: OutputPin,
    B: InputPin,
    LED: OutputPin,
    W: embedded_io::Write,
{
    pub fn new(
        psu: PowerSupply<C, SW>,
        buttons: Buttons<B>,
        power_led: LED,
        console: W,
        config: &Config,
    ) -> Self {
        Self {
            psu,
            buttons,
            power_led,
            console,
            input: InputStateMachine::new(config),
            cycle_period: config.cycle_period,
        }
    }

    /// Negotiate with the source and pick a starting mode.
    ///
    /// Adjustable mode is used when the source offers PPS, otherwise the first fixed profile. A
    /// source offering neither stays in adjustable mode within [Config::default_limits].
    /// The power LED is lit once everything succeeded.
    pub fn start(&mut self, delay: &mut impl DelayNs) -> Result<(), C::Error> {
        self.psu.initialize(delay)?;

        let catalog = self.psu.catalog()?;
        let mode = if catalog.adjustable_envelope().is_none() && catalog.count() > 0 {
            Mode::Fixed
        } else {
            Mode::Adjustable
        };
        self.psu.set_mode(mode)?;
        if mode == Mode::Fixed {
            self.psu.select_fixed_profile(0)?;
        }

        let limits = self.psu.get_limits()?;
        self.input.clamp_to(&limits);

        self.power_led
            .set_high()
            .map_err(|e| Error::Indicator(e.kind()))?;

        info!(
            "Started in {} mode, {} mV / {} mA",
            mode,
            self.input.voltage_mv(),
            self.input.current_ma()
        );
        Ok(())
    }

    /// Run one cycle: sample buttons, update the supply, write the status frame.
    pub fn tick(&mut self) -> Result<TickOutcome, C::Error> {
        let sample = self
            .buttons
            .sample()
            .map_err(|e| Error::Button(e.kind()))?;
        let outcome = self.input.apply(sample, &mut self.psu)?;

        let report = StatusReport::capture(&mut self.psu, sample, outcome.edit_mode)?;
        report
            .write_to(&mut self.console)
            .map_err(|e| Error::Console(e.kind()))?;

        Ok(outcome)
    }

    /// Tick forever, one [Config::cycle_period] apart. Failed ticks are logged and skipped.
    pub fn run(&mut self, delay: &mut impl DelayNs) -> ! {
        loop {
            if let Err(err) = self.tick() {
                warn!("Control tick failed: {:?}", err);
            }
            delay.delay_ms(self.cycle_period.to_millis());
        }
    }

    pub fn psu(&self) -> &PowerSupply<C, SW> {
        &self.psu
    }

    pub fn psu_mut(&mut self) -> &mut PowerSupply<C, SW> {
        &mut self.psu
    }

    pub fn input(&self) -> &InputStateMachine {
        &self.input
    }

    pub fn console(&self) -> &W {
        &self.console
    }

    pub fn release(self) -> (PowerSupply<C, SW>, Buttons<B>, LED, W) {
        (self.psu, self.buttons, self.power_led, self.console)
    }
}
