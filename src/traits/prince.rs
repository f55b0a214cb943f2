//! Interfaces around the PRINCE bus encryption engine.
//!
//! `CryptoEngine` is what the ROM bootloader offers (new IVs, loading IVs,
//! configuring encrypted ranges), `RegionConfig` is the live region setup
//! as found in the PRINCE registers.

use core::convert::TryFrom;

/// Size in bytes of an IV code, the key store encoding of a region's IV.
pub const IV_CODE_SIZE: usize = 52;

/// IV code as exchanged with the ROM.
pub type IvCode = [u8; IV_CODE_SIZE];

/// PRINCE operation error
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Region selector out of range
    InvalidArgument,
    /// Crypto engine call did not succeed
    Fail,
}

pub type Result<T = ()> = core::result::Result<T, Error>;

/// One of the three PRINCE regions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Region {
    Region0 = 0,
    Region1 = 1,
    Region2 = 2,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Region0, Region::Region1, Region::Region2];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u32> for Region {
    type Error = Error;

    fn try_from(index: u32) -> Result<Self> {
        match index {
            0 => Ok(Region::Region0),
            1 => Ok(Region::Region1),
            2 => Ok(Region::Region2),
            _ => Err(Error::InvalidArgument),
        }
    }
}

/// The bus crypto engine services of the ROM bootloader.
pub trait CryptoEngine {
    /// Generate a new IV code for `region`, storing it in the key store
    /// if `store` is set.
    fn generate_iv(&mut self, region: Region, iv_code: &mut IvCode, store: bool) -> Result;

    /// Load an IV code into the PRINCE registers of `region`.
    fn load_iv(&mut self, region: Region, iv_code: &IvCode) -> Result;

    /// Enable encryption of `[start, start + length)` in `region`.
    fn set_encrypt_range(&mut self, region: Region, start: u32, length: u32) -> Result;
}

impl<T: CryptoEngine + ?Sized> CryptoEngine for &mut T {
    fn generate_iv(&mut self, region: Region, iv_code: &mut IvCode, store: bool) -> Result {
        (**self).generate_iv(region, iv_code, store)
    }

    fn load_iv(&mut self, region: Region, iv_code: &IvCode) -> Result {
        (**self).load_iv(region, iv_code)
    }

    fn set_encrypt_range(&mut self, region: Region, start: u32, length: u32) -> Result {
        (**self).set_encrypt_range(region, start, length)
    }
}

/// Current region configuration. Implementations must not cache.
pub trait RegionConfig {
    fn base_address(&self, region: Region) -> u32;
    fn sub_region_enable(&self, region: Region) -> u32;
}

impl<T: RegionConfig + ?Sized> RegionConfig for &T {
    fn base_address(&self, region: Region) -> u32 {
        (**self).base_address(region)
    }

    fn sub_region_enable(&self, region: Region) -> u32 {
        (**self).sub_region_enable(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_from_index() {
        assert_eq!(Region::try_from(0), Ok(Region::Region0));
        assert_eq!(Region::try_from(1), Ok(Region::Region1));
        assert_eq!(Region::try_from(2), Ok(Region::Region2));
        assert_eq!(Region::try_from(3), Err(Error::InvalidArgument));
        assert_eq!(Region::try_from(u32::MAX), Err(Error::InvalidArgument));
    }

    #[test]
    fn region_index_matches_table_order() {
        for (i, region) in Region::ALL.iter().enumerate() {
            assert_eq!(region.index(), i);
        }
    }
}
