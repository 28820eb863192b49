//! Raw power data objects (PDOs) as reported by the PD controller.
//!
//! Each advertised source capability is a 32-bit little-endian word. The top two bits select the
//! supply type; augmented PDOs (type `0b11`) carry a further two bit sub-type where `0b00` is a
//! programmable power supply (PPS).
//!
//! Field units are chip native. See the `*_UNIT_*` constants for the factors used to convert them
//! into millivolts and milliamps.

use modular_bitfield::{bitfield, specifiers::*};

/// Fixed supply voltage, in millivolts per LSB.
pub const FIXED_VOLTAGE_UNIT_MV: u32 = 50;
/// Fixed supply maximum current, in milliamps per LSB.
pub const FIXED_CURRENT_UNIT_MA: u32 = 10;
/// PPS minimum and maximum voltage, in millivolts per LSB.
pub const PPS_VOLTAGE_UNIT_MV: u32 = 100;
/// PPS maximum current, in milliamps per LSB.
pub const PPS_CURRENT_UNIT_MA: u32 = 50;

/// Value of the supply type bits for a fixed supply.
const SUPPLY_FIXED: u8 = 0b00;
/// Value of the supply type bits for an augmented PDO.
const SUPPLY_AUGMENTED: u8 = 0b11;
/// Value of the augmented sub-type bits for a PPS APDO.
const AUGMENTED_PPS: u8 = 0b00;

/// Fixed supply PDO layout.
#[bitfield(bits = 32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPdo {
    /// Maximum current in 10 mA units.
    pub max_current: B10,
    /// Voltage in 50 mV units.
    pub voltage: B10,
    #[skip]
    __: B10,
    pub supply: B2,
}

/// PPS augmented PDO layout.
#[bitfield(bits = 32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PpsPdo {
    /// Maximum current in 50 mA units.
    pub max_current: B7,
    #[skip]
    __: B1,
    /// Minimum voltage in 100 mV units.
    pub min_voltage: B8,
    #[skip]
    __: B1,
    /// Maximum voltage in 100 mV units.
    pub max_voltage: B8,
    #[skip]
    __: B3,
    pub augmented: B2,
    pub supply: B2,
}

/// The kinds of descriptor the catalog knows how to interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdoKind {
    Fixed(FixedPdo),
    Pps(PpsPdo),
    /// Battery, variable or any augmented type other than PPS.
    Other,
}

/// One raw 32-bit source capability, as read out of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawPdo(pub [u8; 4]);

impl RawPdo {
    /// Create a descriptor from its little-endian byte representation.
    pub const fn from_le_bytes(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Create a descriptor from the full 32-bit word.
    pub const fn from_word(word: u32) -> Self {
        Self(word.to_le_bytes())
    }

    /// Return the 32-bit word.
    pub const fn word(&self) -> u32 {
        u32::from_le_bytes(self.0)
    }

    /// Build a fixed supply descriptor. Units are chip native: 50 mV and 10 mA.
    pub fn fixed(voltage: u16, max_current: u16) -> Self {
        let pdo = FixedPdo::new()
            .with_voltage(voltage)
            .with_max_current(max_current)
            .with_supply(SUPPLY_FIXED);
        Self(pdo.into_bytes())
    }

    /// Build a PPS descriptor. Units are chip native: 100 mV and 50 mA.
    pub fn pps(min_voltage: u8, max_voltage: u8, max_current: u8) -> Self {
        let pdo = PpsPdo::new()
            .with_min_voltage(min_voltage)
            .with_max_voltage(max_voltage)
            .with_max_current(max_current)
            .with_augmented(AUGMENTED_PPS)
            .with_supply(SUPPLY_AUGMENTED);
        Self(pdo.into_bytes())
    }

    /// Interpret the descriptor based on its type bits.
    pub fn kind(&self) -> PdoKind {
        let fixed = FixedPdo::from_bytes(self.0);
        match fixed.supply() {
            SUPPLY_FIXED => PdoKind::Fixed(fixed),
            SUPPLY_AUGMENTED => {
                let pps = PpsPdo::from_bytes(self.0);
                if pps.augmented() == AUGMENTED_PPS {
                    PdoKind::Pps(pps)
                } else {
                    PdoKind::Other
                }
            }
            _ => PdoKind::Other,
        }
    }
}

impl FixedPdo {
    /// Voltage in millivolts.
    pub fn voltage_mv(&self) -> u32 {
        self.voltage() as u32 * FIXED_VOLTAGE_UNIT_MV
    }

    /// Maximum current in milliamps.
    pub fn max_current_ma(&self) -> u32 {
        self.max_current() as u32 * FIXED_CURRENT_UNIT_MA
    }
}

impl PpsPdo {
    /// Minimum voltage in millivolts.
    pub fn min_voltage_mv(&self) -> u32 {
        self.min_voltage() as u32 * PPS_VOLTAGE_UNIT_MV
    }

    /// Maximum voltage in millivolts.
    pub fn max_voltage_mv(&self) -> u32 {
        self.max_voltage() as u32 * PPS_VOLTAGE_UNIT_MV
    }

    /// Maximum current in milliamps.
    pub fn max_current_ma(&self) -> u32 {
        self.max_current() as u32 * PPS_CURRENT_UNIT_MA
    }
}
