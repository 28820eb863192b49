use crate::{
    config::{Config, Limits},
    controller::PdController,
    error::{Error, Result},
    profile::ProfileCatalog,
    types::{Mode, State},
};
use embedded_hal::{
    delay::DelayNs,
    digital::{Error as _, OutputPin},
};
use log::{debug, info, warn};

/// You can create a PowerSupply from any [PdController] and the [OutputPin] driving the load switch.
///
/// For its methods, we generally use the nomenclature that "set" means to change a control value and
/// "get" means to read back a control value. Whereas "read" means to get a measured value.
///
/// Every method other than [Self::initialize] fails with [Error::NotInitialized] until the
/// source has advertised its profiles.
pub struct PowerSupply<C: PdController, SW: OutputPin> {
    controller: C,
    load_switch: SW,
    config: Config,
    catalog: ProfileCatalog,
    mode: Mode,
    output: State,
    target_voltage_mv: u32,
    target_current_ma: u32,
    /// Current reading captured at start up, subtracted from every later reading.
    baseline_current_ma: i32,
    /// Index among the fixed profiles used in [Mode::Fixed].
    selected_fixed: usize,
    initialized: bool,
}

impl<C: PdController, SW: OutputPin> PowerSupply<C, SW> {
    /// Create a new, uninitialized PowerSupply.
    pub fn new(controller: C, load_switch: SW, config: Config) -> Self {
        Self {
            controller,
            load_switch,
            config,
            catalog: ProfileCatalog::new(),
            mode: Mode::default(),
            output: State::Off,
            target_voltage_mv: 0,
            target_current_ma: 0,
            baseline_current_ma: 0,
            selected_fixed: 0,
            initialized: false,
        }
    }

    /// Wait for the source to advertise its profiles, then capture the current baseline.
    ///
    /// The load switch is opened before anything else. Negotiation is polled up to
    /// [Config::negotiation_attempts] times, [Config::negotiation_retry_interval] apart, and a
    /// poll that errors counts as not ready. Returns [Error::NegotiationTimeout] once attempts
    /// run out.
    ///
    /// Initializing twice is not supported: a second call logs a warning and returns without
    /// negotiating again.
    pub fn initialize(&mut self, delay: &mut impl DelayNs) -> Result<(), C::Error> {
        if self.initialized {
            warn!("Power supply already initialized, ignoring");
            return Ok(());
        }

        self.load_switch
            .set_low()
            .map_err(|e| Error::LoadSwitch(e.kind()))?;

        let attempts = self.config.negotiation_attempts.max(1);
        let mut attempt = 0;
        let count = loop {
            attempt += 1;
            match self.controller.negotiate() {
                Ok(count) if count > 0 => break count,
                Ok(_) => debug!("No source profiles yet ({}/{})", attempt, attempts),
                Err(err) => debug!("Negotiation poll failed ({}/{}): {:?}", attempt, attempts, err),
            }
            if attempt >= attempts {
                warn!("PD negotiation timed out after {} polls", attempts);
                return Err(Error::NegotiationTimeout);
            }
            delay.delay_ms(self.config.negotiation_retry_interval.to_millis());
        };

        self.catalog = ProfileCatalog::from_descriptors(self.controller.source_profiles());

        // Commanded current is still zero here.
        let raw = self.controller.read_current_ma().map_err(Error::Controller)?;
        self.baseline_current_ma = to_signed(raw);
        self.initialized = true;

        info!(
            "Negotiated {} profiles ({} fixed), baseline current {} mA",
            count,
            self.catalog.count(),
            self.baseline_current_ma
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Switch control discipline. Output is always turned off.
    ///
    /// Returns [Error::InvalidMode] for [Mode::Fixed] when the source advertised no fixed
    /// profiles; nothing changes in that case.
    pub fn set_mode(&mut self, mode: Mode) -> Result<(), C::Error> {
        self.ensure_initialized()?;
        if mode == Mode::Fixed && self.catalog.count() == 0 {
            warn!("No fixed profiles, staying in {} mode", self.mode);
            return Err(Error::InvalidMode);
        }
        info!("Mode {} -> {}, output off", self.mode, mode);
        self.mode = mode;
        self.output = State::Off;
        self.apply_control()
    }

    /// Get the active control discipline.
    pub fn get_mode(&self) -> Result<Mode, C::Error> {
        self.ensure_initialized()?;
        Ok(self.mode)
    }

    /// Connect or disconnect the load.
    pub fn set_output_state(&mut self, state: impl Into<State>) -> Result<(), C::Error> {
        self.ensure_initialized()?;
        self.output = state.into();
        info!("Output {}", self.output);
        self.apply_control()
    }

    /// Read back whether the load is connected.
    pub fn get_output_state(&self) -> Result<State, C::Error> {
        self.ensure_initialized()?;
        Ok(self.output)
    }

    /// Set the current limit in milliamps.
    ///
    /// The value is not checked against [Self::get_limits]; the controller clamps or rejects.
    pub fn set_target_current_ma(&mut self, current_ma: u32) -> Result<(), C::Error> {
        self.ensure_initialized()?;
        self.target_current_ma = current_ma;
        self.apply_control()
    }

    /// Get the current limit in milliamps.
    pub fn get_target_current_ma(&self) -> Result<u32, C::Error> {
        self.ensure_initialized()?;
        Ok(self.target_current_ma)
    }

    /// Set the output voltage in millivolts.
    ///
    /// The value is not checked against [Self::get_limits]; the controller clamps or rejects.
    pub fn set_target_voltage_mv(&mut self, voltage_mv: u32) -> Result<(), C::Error> {
        self.ensure_initialized()?;
        self.target_voltage_mv = voltage_mv;
        self.apply_control()
    }

    /// Get the output voltage setpoint in millivolts.
    pub fn get_target_voltage_mv(&self) -> Result<u32, C::Error> {
        self.ensure_initialized()?;
        Ok(self.target_voltage_mv)
    }

    /// Return the measured output current in milliamps, net of the start up baseline.
    ///
    /// Can be negative when the sensor reads below its baseline.
    pub fn read_current_ma(&mut self) -> Result<i32, C::Error> {
        self.ensure_initialized()?;
        let raw = self.controller.read_current_ma().map_err(Error::Controller)?;
        Ok(to_signed(raw) - self.baseline_current_ma)
    }

    /// Return the measured output voltage in millivolts.
    pub fn read_voltage_mv(&mut self) -> Result<u32, C::Error> {
        self.ensure_initialized()?;
        self.controller.read_voltage_mv().map_err(Error::Controller)
    }

    /// Number of fixed profiles the source advertised.
    pub fn get_fixed_profile_count(&self) -> Result<usize, C::Error> {
        self.ensure_initialized()?;
        Ok(self.catalog.count())
    }

    /// Voltage of a fixed profile in millivolts.
    pub fn get_fixed_profile_voltage_mv(&self, index: usize) -> Result<u32, C::Error> {
        self.ensure_initialized()?;
        Ok(self.catalog.at(index)?)
    }

    /// Target the fixed profile at `index`. Only valid in [Mode::Fixed].
    pub fn select_fixed_profile(&mut self, index: usize) -> Result<(), C::Error> {
        self.ensure_initialized()?;
        if self.mode != Mode::Fixed {
            return Err(Error::InvalidMode);
        }
        let voltage_mv = self.catalog.at(index)?;
        debug!("Selecting fixed profile {} ({} mV)", index, voltage_mv);
        self.selected_fixed = index;
        self.target_voltage_mv = voltage_mv;
        self.apply_control()
    }

    /// Get the index of the fixed profile used in [Mode::Fixed].
    pub fn get_selected_fixed_profile(&self) -> Result<usize, C::Error> {
        self.ensure_initialized()?;
        Ok(self.selected_fixed)
    }

    /// Bounds setpoints should respect in the active mode.
    ///
    /// Adjustable mode uses the last PPS profile, or [Config::default_limits] without one. Fixed
    /// mode pins the voltage to the selected profile; [Self::set_mode] refuses fixed mode on a
    /// source without fixed profiles, so the fallback never applies there.
    pub fn get_limits(&self) -> Result<Limits, C::Error> {
        self.ensure_initialized()?;
        let limits = match self.mode {
            Mode::Adjustable => self.catalog.adjustable_envelope(),
            Mode::Fixed => self
                .catalog
                .fixed_profile(self.selected_fixed)
                .ok()
                .map(|profile| profile.limits()),
        };
        Ok(limits.unwrap_or(self.config.default_limits))
    }

    /// The profiles the source advertised.
    pub fn catalog(&self) -> Result<&ProfileCatalog, C::Error> {
        self.ensure_initialized()?;
        Ok(&self.catalog)
    }

    /// Give back the controller and load switch.
    pub fn release(self) -> (C, SW) {
        (self.controller, self.load_switch)
    }

    fn ensure_initialized(&self) -> Result<(), C::Error> {
        if self.initialized {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    /// Push local state to the hardware.
    ///
    /// Disconnect first when turning off, program current then voltage, connect last when
    /// turning on. The load never sees a setpoint that is still changing. If any step fails the
    /// output falls back to off.
    fn apply_control(&mut self) -> Result<(), C::Error> {
        let result = self.sequence_control();
        if result.is_err() && self.output == State::On {
            warn!("Applying control failed, forcing output off");
            self.output = State::Off;
            // Best effort: `result` already carries the first error.
            let _ = self.load_switch.set_low();
        }
        result
    }

    fn sequence_control(&mut self) -> Result<(), C::Error> {
        if self.output == State::Off {
            self.load_switch
                .set_low()
                .map_err(|e| Error::LoadSwitch(e.kind()))?;
        }

        debug!(
            "Requesting {} mV, {} mA",
            self.target_voltage_mv, self.target_current_ma
        );
        self.controller
            .set_current_limit_ma(self.target_current_ma)
            .map_err(Error::Controller)?;
        self.controller
            .set_voltage_mv(self.target_voltage_mv)
            .map_err(Error::Controller)?;

        if self.output == State::On {
            self.load_switch
                .set_high()
                .map_err(|e| Error::LoadSwitch(e.kind()))?;
        }
        Ok(())
    }
}

fn to_signed(raw: u32) -> i32 {
    i32::try_from(raw).unwrap_or(i32::MAX)
}
