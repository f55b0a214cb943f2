use bitflags::bitflags;

use crate::{
    raw::{
        self,
        prince::RegisterBlock,
    },
    peripherals::{
        rng::Rng,
    },
    traits::prince::{
        Region,
        RegionConfig,
    },
    typestates::{
        init_state,
    }
};

bitflags! {
    /// Register groups that can be locked against further writes until reset.
    pub struct LockFlags: u32 {
        const REGION0 = 1 << 0;
        const REGION1 = 1 << 1;
        const REGION2 = 1 << 2;
        const MASK = 1 << 8;
    }
}

const LOCK_MASK: u32 = 0x1ff;

/// Accessors for the registers of one region.
struct RegionRegisters {
    base_address: fn(&RegisterBlock) -> u32,
    set_base_address: fn(&RegisterBlock, u32),
    sub_region_enable: fn(&RegisterBlock) -> u32,
    set_sub_region_enable: fn(&RegisterBlock, u32),
    set_iv: fn(&RegisterBlock, u32, u32),
}

/// Indexed by `Region::index`.
static REGIONS: [RegionRegisters; 3] = [
    crate::prince_region_registers!(base_addr0, sr_enable0, iv_lsb0, iv_msb0),
    crate::prince_region_registers!(base_addr1, sr_enable1, iv_lsb1, iv_msb1),
    crate::prince_region_registers!(base_addr2, sr_enable2, iv_lsb2, iv_msb2),
];

/// Splits a little-endian 64-bit IV into its (LSB, MSB) register words.
pub(crate) fn split_iv(iv: &[u8; 8]) -> (u32, u32) {
    let lsb = u32::from_le_bytes([iv[0], iv[1], iv[2], iv[3]]);
    let msb = u32::from_le_bytes([iv[4], iv[5], iv[6], iv[7]]);
    (lsb, msb)
}

pub struct Prince<State = init_state::Unknown> {
    pub(crate) raw: raw::PRINCE,
    pub _state: State,
}

impl core::convert::From<raw::PRINCE> for Prince {
    fn from(raw: raw::PRINCE) -> Self {
        Prince::new(raw)
    }
}

impl Prince {

    pub fn new(raw: raw::PRINCE) -> Self {
        Prince { raw , _state: init_state::Unknown }
    }

    pub unsafe fn steal() -> Self {
        Self::new(raw::Peripherals::steal().PRINCE)
    }

    // PRINCE doesn't actually get enabled or disabled,
    // but am using this pattern to enforce that random numbers get written to the mask registers.
    pub fn enabled(self, rng: &Rng<init_state::Enabled>) -> Prince<init_state::Enabled> {

        // "It is a good practice to set this register to a different random value each time the system is booted."
        self.raw.mask_lsb.write(|w| unsafe {w.bits( rng.get_random_u32() )});
        self.raw.mask_msb.write(|w| unsafe {w.bits( rng.get_random_u32() )});

        // Disable encrypted writes
        self.raw.enc_enable.write(|w| w.en().clear_bit());

        self.raw.base_addr2.write(|w| unsafe{w.bits(0x80000)});
        self.raw.base_addr1.write(|w| unsafe{w.bits(0x40000)});

        // Default is 0.
        // self.raw.base_addr0.write(|w| unsafe{w.bits(0x00000)});

        Prince {
            raw: self.raw,
            _state: init_state::Enabled(()),
        }
    }
}

impl<State> Prince<State> {
    pub fn release(self) -> raw::PRINCE {
        self.raw
    }
}

impl Prince<init_state::Enabled> {

    #[inline]
    fn registers(&self) -> &RegisterBlock {
        &*self.raw
    }

    pub fn base_address(&self, region: Region) -> u32 {
        (REGIONS[region.index()].base_address)(self.registers())
    }

    pub fn set_base_address(&mut self, region: Region, address: u32) {
        (REGIONS[region.index()].set_base_address)(self.registers(), address)
    }

    pub fn sub_region_enable(&self, region: Region) -> u32 {
        (REGIONS[region.index()].sub_region_enable)(self.registers())
    }

    pub fn set_sub_region_enable(&mut self, region: Region, enable: u32) {
        (REGIONS[region.index()].set_sub_region_enable)(self.registers(), enable)
    }

    /// Sets the 64-bit IV of `region`, given in little-endian byte order.
    pub fn set_iv(&mut self, region: Region, iv: &[u8; 8]) {
        let (lsb, msb) = split_iv(iv);
        (REGIONS[region.index()].set_iv)(self.registers(), lsb, msb)
    }

    /// Sets the mask applied to decrypted data.
    pub fn set_mask(&mut self, mask: u64) {
        self.raw.mask_lsb.write(|w| unsafe { w.bits(mask as u32) });
        self.raw.mask_msb.write(|w| unsafe { w.bits((mask >> 32) as u32) });
    }

    /// Locks the given register groups until the next reset.
    pub fn set_lock(&mut self, lock: LockFlags) {
        self.raw.lock.write(|w| unsafe { w.bits(lock.bits() & LOCK_MASK) });
    }

    #[inline]
    pub fn enable_all_region_2(&self) {
        self.raw.sr_enable2.write(|w| unsafe{w.bits(0xffffffff)});
    }
    #[inline]
    pub fn enable_all_region_1(&self) {
        self.raw.sr_enable1.write(|w| unsafe{w.bits(0xffffffff)});
    }
    #[inline]
    pub fn enable_all_region_0(&self) {
        self.raw.sr_enable0.write(|w| unsafe{w.bits(0xffffffff)});
    }

    #[inline]
    pub fn disable_all_region_2(&self) {
        self.raw.sr_enable2.write(|w| unsafe{w.bits(0x0)});
    }
    #[inline]
    pub fn disable_all_region_1(&self) {
        self.raw.sr_enable1.write(|w| unsafe{w.bits(0x0)});
    }
    #[inline]
    pub fn disable_all_region_0(&self) {
        self.raw.sr_enable0.write(|w| unsafe{w.bits(0x0)});
    }

    pub fn enable_region_2_for<R>(&self, f: impl FnOnce() -> R) -> R {
        self.enable_all_region_2();
        let result = f();
        self.disable_all_region_2();
        result
    }

    pub fn enable_region_1_for<R>(&self, f: impl FnOnce() -> R) -> R {
        self.enable_all_region_1();
        let result = f();
        self.disable_all_region_1();
        result
    }

    pub fn enable_region_0_for<R>(&self, f: impl FnOnce() -> R) -> R {
        self.enable_all_region_0();
        let result = f();
        self.disable_all_region_0();
        result
    }

    pub fn write_encrypted<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        // Immediately prior to flash programming, set the ENC_ENABLE.EN bit
        unsafe { self.enable_encrypted_write(); }

        let result = f(self);

        // After completion of flash programming clear ENC_ENABLE.EN, to prevent
        // unintended PRINCE encryption of writes
        unsafe { self.disable_encrypted_write(); }
        result
    }

    /// marked unsafe to discourage unpaired use; prefer `write_encrypted`
    pub unsafe fn enable_encrypted_write(&mut self) {
        self.raw.enc_enable.write(|w| w.en().set_bit());
    }

    /// marked unsafe to discourage unpaired use; prefer `write_encrypted`
    pub unsafe fn disable_encrypted_write(&mut self) {
        self.raw.enc_enable.write(|w| w.en().clear_bit());
    }

}

impl RegionConfig for Prince<init_state::Enabled> {
    fn base_address(&self, region: Region) -> u32 {
        Prince::base_address(self, region)
    }

    fn sub_region_enable(&self, region: Region) -> u32 {
        Prince::sub_region_enable(self, region)
    }
}
