//! General interfaces implemented by the drivers, and by test doubles.

pub mod flash;
pub mod prince;
