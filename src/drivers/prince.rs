//! Flash erase/program gated by the PRINCE sub-region configuration.
//!
//! Each PRINCE region covers 32 sub-regions of 8KB starting at its base
//! address. Enabled sub-regions must form a single run, and the flash
//! behind that run may only be erased or programmed as a whole: the data is
//! encrypted with the region's IV, and erasing the run also requires a new
//! IV, which is generated (and persisted in the key store) before the erase
//! is let through.

use crate::{
    drivers::flash::check_erase_arguments,
    traits::{
        flash::{self, EraseProgram},
        prince::{self, CryptoEngine, IvCode, Region, RegionConfig, IV_CODE_SIZE},
    },
};

pub const SUBREGION_SIZE: u32 = 8 * 1024;
pub const SUBREGION_COUNT: u32 = 32;
pub const REGION_SIZE: u32 = SUBREGION_SIZE * SUBREGION_COUNT;

/// Addresses above this are not covered by PRINCE.
pub const FLASH_CEILING: u32 = 0xA_0000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    Erase,
    Write,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// Shape of a sub-region enable mask.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Contiguity {
    Empty,
    /// Sub-regions `start..end` are enabled, nothing else.
    Contiguous { start: u32, end: u32 },
    /// More than one run of enabled sub-regions.
    Scattered,
}

impl Contiguity {
    pub fn classify(mask: u32) -> Self {
        if mask == 0 {
            return Contiguity::Empty;
        }
        let start = mask.trailing_zeros();
        let run = (mask >> start).trailing_ones();
        let end = start + run;
        if end < 32 && mask >> end != 0 {
            return Contiguity::Scattered;
        }
        Contiguity::Contiguous { start, end }
    }
}

/// Decides whether an erase or write may touch a flash range.
pub struct SubRegionChecker<E> {
    engine: E,
}

impl<E: CryptoEngine> SubRegionChecker<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Reads the region configuration afresh and decides on
    /// `[address, address + length)`.
    ///
    /// An erase covering a whole run first gets a new IV for its region;
    /// if that fails, the erase is denied.
    pub fn check(&mut self, regions: &impl RegionConfig, address: u32, length: u32, operation: Operation) -> Decision {
        if address > FLASH_CEILING {
            return Decision::Allow;
        }

        let request_start = address as u64;
        let request_end = request_start + length as u64;

        for &region in Region::ALL.iter() {
            let mask = regions.sub_region_enable(region);
            if mask == 0 {
                continue;
            }

            let base = regions.base_address(region) as u64;
            if request_end <= base || request_start >= base + REGION_SIZE as u64 {
                continue;
            }

            let (run_start, run_end) = match Contiguity::classify(mask) {
                Contiguity::Contiguous { start, end } => (
                    base + (start * SUBREGION_SIZE) as u64,
                    base + (end as u64) * SUBREGION_SIZE as u64,
                ),
                _ => {
                    warn!("{:?}: sub-region mask {:#010x} is not contiguous", region, mask);
                    return Decision::Deny;
                }
            };

            if request_start <= run_start && request_end >= run_end {
                return match operation {
                    Operation::Write => Decision::Allow,
                    Operation::Erase => self.renew_iv(region),
                };
            }

            if request_end <= run_start || request_start >= run_end {
                continue;
            }

            warn!("{:?} of {:#x}+{:#x} covers only part of {:?} [{:#x}, {:#x})",
                operation, address, length, region, run_start, run_end);
            return Decision::Deny;
        }

        Decision::Allow
    }

    fn renew_iv(&mut self, region: Region) -> Decision {
        let mut iv_code: IvCode = [0u8; IV_CODE_SIZE];

        if self.engine.generate_iv(region, &mut iv_code, true).is_err() {
            warn!("{:?}: generating new IV failed", region);
            return Decision::Deny;
        }
        if self.engine.load_iv(region, &iv_code).is_err() {
            warn!("{:?}: loading new IV failed", region);
            return Decision::Deny;
        }

        info!("{:?}: new IV in place", region);
        Decision::Allow
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn release(self) -> E {
        self.engine
    }
}

/// Flash primitive behind a `SubRegionChecker`.
///
/// Denied requests never reach the primitive.
pub struct CheckedFlash<F, R, E> {
    flash: F,
    regions: R,
    checker: SubRegionChecker<E>,
}

impl<F, R, E> CheckedFlash<F, R, E>
where
    F: EraseProgram,
    R: RegionConfig,
    E: CryptoEngine,
{
    pub fn new(flash: F, regions: R, engine: E) -> Self {
        Self {
            flash,
            regions,
            checker: SubRegionChecker::new(engine),
        }
    }

    /// A wrong key or length is refused before the checker can renew an IV.
    pub fn erase(&mut self, start: u32, length: u32, key: u32) -> flash::Result {
        check_erase_arguments(length, key)?;
        match self.checker.check(&self.regions, start, length, Operation::Erase) {
            Decision::Allow => self.flash.erase(start, length, key),
            Decision::Deny => Err(flash::Error::EncryptedRegionsEraseNotDoneAtOnce),
        }
    }

    pub fn program(&mut self, start: u32, data: &[u8]) -> flash::Result {
        // slices longer than the address space cannot be in flash anyway
        let length = if data.len() > u32::MAX as usize { u32::MAX } else { data.len() as u32 };
        match self.checker.check(&self.regions, start, length, Operation::Write) {
            Decision::Allow => self.flash.program(start, data),
            Decision::Deny => Err(flash::Error::SizeError),
        }
    }

    /// Enables encryption of `[start, start + length)` in `region`.
    pub fn set_encrypt_range(&mut self, region: Region, start: u32, length: u32) -> prince::Result {
        debug!("{:?}: encrypting {:#x}+{:#x}", region, start, length);
        self.checker.engine_mut().set_encrypt_range(region, start, length)
    }

    pub fn regions(&self) -> &R {
        &self.regions
    }

    pub fn release(self) -> (F, R, E) {
        (self.flash, self.regions, self.checker.release())
    }
}
