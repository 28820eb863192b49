//! We use this mocking module in unit tests to emulate the PD controller and GPIO lines.
//!
//! The controller and the load switch push into one shared [`EventLog`] so tests can check the
//! order in which the hardware was touched.

use std::{cell::Cell, cell::RefCell, collections::VecDeque, rc::Rc, vec::Vec};

use crate::pdo::RawPdo;

/// An externally observable hardware effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    SwitchOff,
    SwitchOn,
    CurrentLimit(u32),
    Voltage(u32),
}

pub type EventLog = Rc<RefCell<Vec<Event>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockControllerError {
    /// Simulated bus NACK.
    Nack,
}

/// Our mock type used to emulate a PD controller.
pub struct MockController {
    log: EventLog,
    profiles: Vec<RawPdo>,
    /// Number of polls that report nothing before the profiles become visible.
    polls_until_ready: usize,
    polls: Rc<Cell<usize>>,
    /// Current readings returned in order; the last one repeats.
    current_readings: VecDeque<u32>,
    voltage_reading: u32,
    should_error_on_command: Rc<Cell<bool>>,
    should_error_on_poll: bool,
}

impl MockController {
    /// A controller whose source advertises `profiles` on the first poll.
    pub fn new(log: EventLog, profiles: &[RawPdo]) -> Self {
        Self {
            log,
            profiles: profiles.to_vec(),
            polls_until_ready: 0,
            polls: Rc::new(Cell::new(0)),
            current_readings: VecDeque::from([0]),
            voltage_reading: 0,
            should_error_on_command: Rc::new(Cell::new(false)),
            should_error_on_poll: false,
        }
    }

    /// Report no profiles for the first `polls` polls.
    pub fn ready_after(mut self, polls: usize) -> Self {
        self.polls_until_ready = polls;
        self
    }

    /// Never finish negotiating.
    pub fn never_ready(self) -> Self {
        self.ready_after(usize::MAX)
    }

    pub fn with_current_readings(mut self, readings: &[u32]) -> Self {
        self.current_readings = readings.iter().copied().collect();
        self
    }

    pub fn with_voltage_reading(mut self, voltage_mv: u32) -> Self {
        self.voltage_reading = voltage_mv;
        self
    }

    /// Shared counter of how often [`PdController::negotiate`] was called.
    pub fn poll_counter(&self) -> Rc<Cell<usize>> {
        self.polls.clone()
    }

    /// Configure whether voltage/current commands should fail.
    pub fn set_command_error(&mut self, should_error: bool) {
        self.should_error_on_command.set(should_error);
    }

    /// Shared flag behind [`Self::set_command_error`], for flipping it after the mock is moved.
    pub fn command_error_flag(&self) -> Rc<Cell<bool>> {
        self.should_error_on_command.clone()
    }

    /// Configure whether polls should fail.
    pub fn set_poll_error(&mut self, should_error: bool) {
        self.should_error_on_poll = should_error;
    }
}

impl crate::controller::PdController for MockController {
    type Error = MockControllerError;

    fn negotiate(&mut self) -> Result<usize, Self::Error> {
        self.polls.set(self.polls.get() + 1);
        if self.should_error_on_poll {
            return Err(MockControllerError::Nack);
        }
        if self.polls.get() > self.polls_until_ready {
            Ok(self.profiles.len())
        } else {
            Ok(0)
        }
    }

    fn source_profiles(&self) -> &[RawPdo] {
        &self.profiles
    }

    fn set_current_limit_ma(&mut self, current_ma: u32) -> Result<(), Self::Error> {
        if self.should_error_on_command.get() {
            return Err(MockControllerError::Nack);
        }
        self.log.borrow_mut().push(Event::CurrentLimit(current_ma));
        Ok(())
    }

    fn set_voltage_mv(&mut self, voltage_mv: u32) -> Result<(), Self::Error> {
        if self.should_error_on_command.get() {
            return Err(MockControllerError::Nack);
        }
        self.log.borrow_mut().push(Event::Voltage(voltage_mv));
        Ok(())
    }

    fn read_current_ma(&mut self) -> Result<u32, Self::Error> {
        let reading = if self.current_readings.len() > 1 {
            self.current_readings.pop_front()
        } else {
            self.current_readings.front().copied()
        };
        Ok(reading.unwrap_or(0))
    }

    fn read_voltage_mv(&mut self) -> Result<u32, Self::Error> {
        Ok(self.voltage_reading)
    }
}

/// Simulated GPIO fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockPinError;

impl embedded_hal::digital::Error for MockPinError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

/// Load switch that records every level it is successfully driven to.
pub struct MockLoadSwitch {
    log: EventLog,
    should_error: Rc<Cell<bool>>,
}

impl MockLoadSwitch {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            should_error: Rc::new(Cell::new(false)),
        }
    }

    /// Shared flag making every write fail while set.
    pub fn error_flag(&self) -> Rc<Cell<bool>> {
        self.should_error.clone()
    }

    fn drive(&mut self, event: Event) -> Result<(), MockPinError> {
        if self.should_error.get() {
            return Err(MockPinError);
        }
        self.log.borrow_mut().push(event);
        Ok(())
    }
}

impl embedded_hal::digital::ErrorType for MockLoadSwitch {
    type Error = MockPinError;
}

impl embedded_hal::digital::OutputPin for MockLoadSwitch {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(Event::SwitchOff)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(Event::SwitchOn)
    }
}

/// Active-low push button whose state the test flips between ticks.
#[derive(Clone, Default)]
pub struct MockButton {
    pressed: Rc<Cell<bool>>,
}

impl MockButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self) {
        self.pressed.set(true);
    }

    pub fn release(&self) {
        self.pressed.set(false);
    }
}

impl embedded_hal::digital::ErrorType for MockButton {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::InputPin for MockButton {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.pressed.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.pressed.get())
    }
}

/// Output pin that only remembers its level.
#[derive(Clone, Default)]
pub struct MockLed {
    lit: Rc<Cell<bool>>,
}

impl MockLed {
    pub fn is_lit(&self) -> bool {
        self.lit.get()
    }
}

impl embedded_hal::digital::ErrorType for MockLed {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for MockLed {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.lit.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.lit.set(true);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::PdController;
    use embedded_hal::digital::{InputPin, OutputPin};

    #[test]
    fn negotiation_becomes_ready() {
        let mut mock = MockController::new(event_log(), &[RawPdo::fixed(100, 300)]).ready_after(2);
        assert_eq!(mock.negotiate(), Ok(0));
        assert_eq!(mock.negotiate(), Ok(0));
        assert_eq!(mock.negotiate(), Ok(1));
        assert_eq!(mock.poll_counter().get(), 3);
    }

    #[test]
    fn current_readings_repeat_last() {
        let mut mock = MockController::new(event_log(), &[]).with_current_readings(&[1, 2]);
        assert_eq!(mock.read_current_ma(), Ok(1));
        assert_eq!(mock.read_current_ma(), Ok(2));
        assert_eq!(mock.read_current_ma(), Ok(2));
    }

    #[test]
    fn shared_log_orders_events() {
        let log = event_log();
        let mut mock = MockController::new(log.clone(), &[]);
        let mut switch = MockLoadSwitch::new(log.clone());

        switch.set_low().unwrap();
        mock.set_current_limit_ma(100).unwrap();
        mock.set_voltage_mv(5000).unwrap();
        switch.set_high().unwrap();

        assert_eq!(
            *log.borrow(),
            [
                Event::SwitchOff,
                Event::CurrentLimit(100),
                Event::Voltage(5000),
                Event::SwitchOn
            ]
        );
    }

    #[test]
    fn command_error_simulation() {
        let log = event_log();
        let mut mock = MockController::new(log.clone(), &[]);
        mock.set_command_error(true);
        assert_eq!(mock.set_voltage_mv(5000), Err(MockControllerError::Nack));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn load_switch_error_simulation() {
        let log = event_log();
        let mut switch = MockLoadSwitch::new(log.clone());
        switch.error_flag().set(true);
        assert_eq!(switch.set_high(), Err(MockPinError));
        assert!(log.borrow().is_empty());

        switch.error_flag().set(false);
        assert_eq!(switch.set_high(), Ok(()));
        assert_eq!(*log.borrow(), [Event::SwitchOn]);
    }

    #[test]
    fn button_is_active_low() {
        let mut button = MockButton::new();
        let handle = button.clone();
        assert_eq!(button.is_low(), Ok(false));
        handle.press();
        assert_eq!(button.is_low(), Ok(true));
        assert_eq!(button.is_high(), Ok(false));
        handle.release();
        assert_eq!(button.is_low(), Ok(false));
    }
}
