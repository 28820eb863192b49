//! The interface this crate needs from a PD sink controller driver.

use crate::pdo::RawPdo;

/// A PD sink controller such as the AP33772.
///
/// Implementations own the bus to the chip and its wire protocol. Voltage and current are in
/// millivolts and milliamps; the driver converts to and from its native register units.
pub trait PdController {
    type Error: core::fmt::Debug;

    /// Poll the source for its capabilities.
    ///
    /// Returns the number of descriptors now available from [`Self::source_profiles`], `0` while
    /// negotiation has not completed.
    fn negotiate(&mut self) -> Result<usize, Self::Error>;

    /// Descriptors in the order the source advertised them.
    fn source_profiles(&self) -> &[RawPdo];

    /// Program the operating current limit.
    fn set_current_limit_ma(&mut self, current_ma: u32) -> Result<(), Self::Error>;

    /// Program the requested output voltage.
    fn set_voltage_mv(&mut self, voltage_mv: u32) -> Result<(), Self::Error>;

    /// Return the measured current, uncorrected.
    fn read_current_ma(&mut self) -> Result<u32, Self::Error>;

    /// Return the measured VBUS voltage.
    fn read_voltage_mv(&mut self) -> Result<u32, Self::Error>;
}
