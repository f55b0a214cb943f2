//! The bus crypto engine services of the ROM bootloader.
//!
//! The bootloader publishes a tree of function tables, the address of which
//! is stored at `0x1300_0020`. We need the flash driver table (to set up the
//! flash context the crypto services write the key store through) and the
//! bus crypto engine table.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::traits::prince::{self, CryptoEngine, IvCode, Region};

const BOOTLOADER_TREE_POINTER: *const *const BootloaderTree = 0x1300_0020 as *const *const BootloaderTree;

#[repr(u32)]
#[derive(Debug, FromPrimitive, PartialEq)]
enum SkbootStatus {
    Success = 0x5ac3c35a,
    Fail = 0xc35ac35a,
    InvalidArgument = 0xc35a5ac3,
    KeyStoreMarkerInvalid = 0xc3c35a5a,
}

#[repr(u32)]
#[derive(Debug, FromPrimitive, PartialEq)]
enum SecureBool {
    SecureFalse = 0x5aa55aa5,
    SecureTrue = 0xc33cc33c,
}

impl From<bool> for SecureBool {
    fn from(b: bool) -> Self {
        if b { SecureBool::SecureTrue } else { SecureBool::SecureFalse }
    }
}

/// kStatus_Success of the ROM flash driver
const FLASH_SUCCESS: u32 = 0;

fn handle_skboot_status(ret: u32) -> prince::Result {
    match SkbootStatus::from_u32(ret) {
        Some(SkbootStatus::Success) => Ok(()),
        status => {
            warn!("ROM returned {:?} ({:#010x})", status, ret);
            Err(prince::Error::Fail)
        }
    }
}

fn handle_flash_status(ret: u32) -> prince::Result {
    if ret == FLASH_SUCCESS {
        Ok(())
    } else {
        warn!("ROM flash driver returned {}", ret);
        Err(prince::Error::Fail)
    }
}

#[repr(C)]
#[derive(Default, Debug)]
struct StandardVersion {
    bugfix: u8,
    minor: u8,
    major: u8,
    name: u8,
}

#[repr(C)]
#[derive(Default, Debug)]
struct ReadSingleWord {
    field: u32,
}

#[repr(C)]
#[derive(Default, Debug)]
struct SetWriteMode {
    program_ramp_control: u8,
    erase_ramp_control: u8,
    reserved: [u8; 2],
}

#[repr(C)]
#[derive(Default, Debug)]
struct SetReadMode {
    read_interface_timing_trim: u16,
    read_controller_timing_trim: u16,
    read_wait_states: u8,
    reserved: [u8; 3],
}

#[repr(C)]
#[derive(Default, Debug)]
struct FlashModeConfig {
    /// Input, the flash refresh rate is derived from it
    sys_freq_in_mhz: u32,
    read_single_word: ReadSingleWord,
    set_write_mode: SetWriteMode,
    set_read_mode: SetReadMode,
}

#[repr(C)]
#[derive(Default, Debug)]
struct FlashFfrConfig {
    ffr_block_base: u32,
    ffr_total_size: u32,
    ffr_page_size: u32,
    cfpa_page_version: u32,
    cfpa_page_offset: u32,
}

/// Flash driver context, filled in by `flash_init` and `ffr_init`.
#[repr(C)]
#[derive(Default, Debug)]
pub struct FlashConfig {
    pflash_block_base: u32,
    pflash_total_size: u32,
    pflash_block_count: u32,
    pflash_page_size: u32,
    pflash_sector_size: u32,
    ffr_config: FlashFfrConfig,
    mode_config: FlashModeConfig,
}

/// Leading part of the v1 flash driver table, up to what we call.
#[repr(C)]
struct Version1DriverInterface {
    version: StandardVersion,
    flash_init: unsafe extern "C" fn(config: &mut FlashConfig) -> u32,
    // flash_erase, flash_program, flash_verify_erase,
    // flash_verify_program, flash_get_property
    flash_functions: [usize; 5],
    reserved: [u32; 3],
    ffr_init: unsafe extern "C" fn(config: &mut FlashConfig) -> u32,
}

#[repr(C)]
struct BusCryptoEngineInterface {
    gen_new_iv: unsafe extern "C" fn(
        region: u32,
        iv_code: *mut u8,
        store: u32,
        config: *mut FlashConfig,
    ) -> u32,
    load_iv: unsafe extern "C" fn(region: u32, iv_code: *mut u8) -> u32,
    set_encrypt_for_address_range: unsafe extern "C" fn(
        region: u32,
        start_address: u32,
        length: u32,
        config: *mut FlashConfig,
    ) -> u32,
}

#[repr(C)]
struct BootloaderTree {
    bootloader_fn: unsafe extern "C" fn(*const u8),
    version: StandardVersion,
    copyright: *const u8,
    reserved: u32,
    flash_driver: &'static Version1DriverInterface,
    iap_driver: usize,
    reserved1: u32,
    reserved2: u32,
    low_power: usize,
    crypto: &'static BusCryptoEngineInterface,
    skboot: usize,
}

/// `CryptoEngine` backed by the ROM bootloader.
pub struct RomCryptoEngine {
    interface: &'static BusCryptoEngineInterface,
    flash_config: FlashConfig,
}

impl RomCryptoEngine {
    /// Looks up the ROM tables and initializes the flash context.
    ///
    /// `system_frequency_mhz` must be the current core clock.
    ///
    /// # Safety
    /// Dereferences ROM addresses, only valid on an LPC55S6x.
    pub unsafe fn new(system_frequency_mhz: u32) -> prince::Result<Self> {
        let tree: &'static BootloaderTree = &**BOOTLOADER_TREE_POINTER;
        let flash_driver = tree.flash_driver;

        let mut flash_config = FlashConfig::default();
        flash_config.mode_config.sys_freq_in_mhz = system_frequency_mhz;

        cortex_m::interrupt::free(|_| {
            handle_flash_status((flash_driver.flash_init)(&mut flash_config))?;
            handle_flash_status((flash_driver.ffr_init)(&mut flash_config))
        })?;

        info!("ROM v{}.{}.{} crypto engine ready",
            tree.version.major, tree.version.minor, tree.version.bugfix);

        Ok(Self {
            interface: tree.crypto,
            flash_config,
        })
    }
}

impl CryptoEngine for RomCryptoEngine {
    fn generate_iv(&mut self, region: Region, iv_code: &mut IvCode, store: bool) -> prince::Result {
        let interface = self.interface;
        let config: *mut FlashConfig = &mut self.flash_config;
        let ret = cortex_m::interrupt::free(|_| unsafe {
            (interface.gen_new_iv)(
                region as u32,
                iv_code.as_mut_ptr(),
                SecureBool::from(store) as u32,
                config,
            )
        });
        handle_skboot_status(ret)
    }

    fn load_iv(&mut self, region: Region, iv_code: &IvCode) -> prince::Result {
        // the ROM does not write through the pointer
        let mut iv_code = *iv_code;
        let interface = self.interface;
        let ret = cortex_m::interrupt::free(|_| unsafe {
            (interface.load_iv)(region as u32, iv_code.as_mut_ptr())
        });
        handle_skboot_status(ret)
    }

    fn set_encrypt_range(&mut self, region: Region, start: u32, length: u32) -> prince::Result {
        let interface = self.interface;
        let config: *mut FlashConfig = &mut self.flash_config;
        let ret = cortex_m::interrupt::free(|_| unsafe {
            (interface.set_encrypt_for_address_range)(region as u32, start, length, config)
        });
        handle_skboot_status(ret)
    }
}
