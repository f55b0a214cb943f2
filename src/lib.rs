#![cfg_attr(not(test), no_std)]

//! PRINCE and ANACTRL for the LPC55S6x, in the layered style of `lpc55-hal`.
//!
//! 1. raw PAC peripherals
//! 1. HAL peripheral wrappers (under `peripherals`)
//! 1. HAL drivers (under `drivers`, typically take ownership of one or more peripherals)
//!
//! The interesting part is `drivers::prince`: flash erase and program calls
//! are gated by a checker that refuses to touch only part of an encrypted
//! PRINCE sub-region run, and regenerates the region's IV when a whole run
//! is erased.
//!
//! Without RTIC, something like:
//! ```ignore
//! let hal = hal::Peripherals::take().unwrap();
//!
//! let mut syscon = hal.syscon;
//! let flash = hal::FlashGordon::new(hal.flash.enabled(&mut syscon));
//! let rng = hal.rng.enabled(&mut syscon);
//! let prince = hal.prince.enabled(&rng);
//!
//! let engine = unsafe { hal::drivers::romapi::RomCryptoEngine::new(96) }.unwrap();
//! let mut flash = hal::CheckedFlash::new(flash, prince, engine);
//!
//! flash.erase(0x8_0000, 0x2_0000, hal::drivers::flash::ERASE_KEY).unwrap();
//! ```

#[macro_use]
extern crate delog;
generate_macros!();

pub extern crate lpc55_pac as raw;

#[macro_use]
pub mod macros;

pub mod traits;

pub mod typestates;
pub use typestates::init_state::Enabled;

pub mod peripherals;
pub use peripherals::{
    anactrl::Anactrl,
    flash::Flash,
    prince::Prince,
    rng::Rng,
    syscon::Syscon,
};

pub mod drivers;
pub use drivers::{
    CheckedFlash,
    FlashGordon,
    SubRegionChecker,
};

/// Entry point to the HAL API.
///
/// Only the peripherals this crate wraps are taken out of the PAC.
pub struct Peripherals {
    /// Analog control
    pub anactrl: Anactrl,

    /// Flash
    pub flash: Flash,

    /// PRINCE bus encryption engine
    pub prince: Prince,

    /// Random number generator
    pub rng: Rng,

    /// System configuration
    pub syscon: Syscon,
}

impl From<raw::Peripherals> for Peripherals {
    fn from(p: raw::Peripherals) -> Self {
        Peripherals {
            anactrl: Anactrl::from(p.ANACTRL),
            flash: Flash::from(p.FLASH),
            prince: Prince::from(p.PRINCE),
            rng: Rng::from(p.RNG),
            syscon: Syscon::from(p.SYSCON),
        }
    }
}

impl Peripherals {
    pub fn take() -> Option<Self> {
        Some(Self::from(raw::Peripherals::take()?))
    }

    pub unsafe fn steal() -> Self {
        Self::from(raw::Peripherals::steal())
    }
}
