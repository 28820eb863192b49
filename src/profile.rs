//! The catalog of power profiles advertised by the source.

use log::{debug, warn};

use crate::{
    config::Limits,
    error::CatalogError,
    pdo::{PdoKind, RawPdo},
};

/// USB PD sources advertise at most seven capabilities in SPR mode.
pub const MAX_PROFILES: usize = 7;

/// One advertised power option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Fixed {
        voltage_mv: u32,
        max_current_ma: u32,
    },
    Adjustable {
        min_voltage_mv: u32,
        max_voltage_mv: u32,
        max_current_ma: u32,
    },
}

impl Profile {
    /// The editing bounds this profile allows.
    pub fn limits(&self) -> Limits {
        match *self {
            Profile::Fixed {
                voltage_mv,
                max_current_ma,
            } => Limits::new(voltage_mv, voltage_mv, max_current_ma),
            Profile::Adjustable {
                min_voltage_mv,
                max_voltage_mv,
                max_current_ma,
            } => Limits::new(min_voltage_mv, max_voltage_mv, max_current_ma),
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, Profile::Fixed { .. })
    }
}

/// Profiles in the order the source advertised them, with their PDO position (starting at 1).
///
/// Fixed profiles are addressed by their index among fixed profiles only, see [`Self::at`].
#[derive(Debug, Clone, Default)]
pub struct ProfileCatalog {
    profiles: heapless::Vec<(usize, Profile), MAX_PROFILES>,
}

impl ProfileCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from raw descriptors.
    pub fn from_descriptors(descriptors: &[RawPdo]) -> Self {
        let mut catalog = Self::new();
        catalog.populate(descriptors);
        catalog
    }

    /// Decode and append descriptors in order.
    ///
    /// Descriptors that are neither fixed nor PPS are skipped. A source that only offers PPS
    /// leaves the fixed list empty, which is not an error here.
    pub fn populate(&mut self, descriptors: &[RawPdo]) {
        for (index, raw) in descriptors.iter().enumerate() {
            let profile = match raw.kind() {
                PdoKind::Fixed(pdo) => Profile::Fixed {
                    voltage_mv: pdo.voltage_mv(),
                    max_current_ma: pdo.max_current_ma(),
                },
                PdoKind::Pps(pdo) => Profile::Adjustable {
                    min_voltage_mv: pdo.min_voltage_mv(),
                    max_voltage_mv: pdo.max_voltage_mv(),
                    max_current_ma: pdo.max_current_ma(),
                },
                PdoKind::Other => {
                    debug!("Skipping PDO {:#010x}", raw.word());
                    continue;
                }
            };
            if self.profiles.push((index + 1, profile)).is_err() {
                warn!("Profile catalog full, dropping PDO {}", index + 1);
                break;
            }
        }
    }

    /// Number of fixed profiles.
    pub fn count(&self) -> usize {
        self.fixed().count()
    }

    /// Voltage of the fixed profile at `index`, in millivolts.
    pub fn at(&self, index: usize) -> Result<u32, CatalogError> {
        match self.fixed_profile(index)? {
            Profile::Fixed { voltage_mv, .. } => Ok(voltage_mv),
            Profile::Adjustable { .. } => Err(CatalogError::OutOfRange),
        }
    }

    /// The fixed profile at `index`.
    pub fn fixed_profile(&self, index: usize) -> Result<Profile, CatalogError> {
        self.fixed()
            .nth(index)
            .map(|(_, profile)| profile)
            .ok_or(CatalogError::OutOfRange)
    }

    /// All profiles with their PDO position.
    pub fn profiles(&self) -> impl Iterator<Item = (usize, Profile)> + '_ {
        self.profiles.iter().copied()
    }

    /// Fixed profiles with their PDO position.
    pub fn fixed(&self) -> impl Iterator<Item = (usize, Profile)> + '_ {
        self.profiles().filter(|(_, profile)| profile.is_fixed())
    }

    /// Adjustable profiles with their PDO position.
    pub fn adjustable(&self) -> impl Iterator<Item = (usize, Profile)> + '_ {
        self.profiles().filter(|(_, profile)| !profile.is_fixed())
    }

    /// Bounds of the last advertised PPS profile, if any.
    pub fn adjustable_envelope(&self) -> Option<Limits> {
        self.adjustable().last().map(|(_, profile)| profile.limits())
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
