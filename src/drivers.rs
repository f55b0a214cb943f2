//! Drivers for device functionality.
//!
//! Typically, these drivers take ownership of one or more HAL peripherals,
//! and expose functionality defined in a separate trait.

pub mod flash;
pub use flash::FlashGordon;

pub mod prince;
pub use prince::{
    CheckedFlash,
    SubRegionChecker,
};

pub mod romapi;
pub use romapi::RomCryptoEngine;
