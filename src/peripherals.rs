//! HAL wrappers around raw PAC peripherals.
//!
//! The APIs presented only implement basic functionality.
//! For more complex things, consult `drivers`.
//!
//! In an RTIC setup, RTIC owns the PAC peripherals, so here use
//! ```ignore
//! use lpc55_prince as hal;
//!
//! let syscon = hal::Syscon::from(device::SYSCON);
//! ```

pub mod anactrl;
pub mod flash;
pub mod prince;
pub mod rng;
pub mod syscon;
