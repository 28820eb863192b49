//! This crate provides power control for a USB Power Delivery bench supply.
//!
//! A PD sink controller (such as the AP33772) negotiates with the source; this crate sits on top
//! of its driver and turns the advertised profiles into a safe, mode-aware supply with a load
//! switch. A debounced three-button front panel edits the setpoints and the supply state is
//! rendered as text lines for a display or serial console.
//!
//! It supports `no-std` environments by use of the `no-std` feature flag.
//!
//! Two modes are supported:
//! * Adjustable (PPS): voltage in 100 mV steps and current in 20 mA steps, within the envelope of
//!   the source's PPS profile
//! * Fixed: one of the fixed voltages the source advertised
//!
//! The hardware is handed over as owned values:
//! * a [controller::PdController] implementation for the PD chip
//! * `embedded-hal` pins for the load switch, the buttons (active-low) and the power LED
//! * an `embedded-hal` delay
//! * an `embedded-io` writer for status output

#![cfg_attr(feature = "no-std", no_std)]

pub mod config;
pub mod control_loop;
pub mod controller;
pub mod error;
pub mod input;
pub mod pdo;
pub mod profile;
pub mod psu;
pub mod status;
pub mod types;

#[cfg(test)]
mod mock_controller;
