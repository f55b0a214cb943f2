use std::cell::Cell;

use lpc55_prince::{
    drivers::{
        flash::{ERASE_KEY, PAGE_SIZE},
        prince::{REGION_SIZE, SUBREGION_SIZE},
    },
    traits::{
        flash::{self, EraseProgram},
        prince::{self, CryptoEngine, IvCode, Region, RegionConfig},
    },
    CheckedFlash,
};

/// RAM standing in for the first 640KB of flash.
struct RamFlash {
    memory: Vec<u8>,
    erases: usize,
    programs: usize,
}

impl RamFlash {
    fn new() -> Self {
        Self { memory: vec![0u8; 0xA_0000], erases: 0, programs: 0 }
    }

    fn calls(&self) -> usize {
        self.erases + self.programs
    }
}

impl EraseProgram for RamFlash {
    fn erase(&mut self, start: u32, length: u32, key: u32) -> flash::Result {
        self.erases += 1;
        if key != ERASE_KEY {
            return Err(flash::Error::EraseKeyError);
        }
        let start = start as usize;
        let end = start + length as usize;
        if end > self.memory.len() {
            return Err(flash::Error::AddressError);
        }
        self.memory[start..end].iter_mut().for_each(|byte| *byte = 0xff);
        Ok(())
    }

    fn program(&mut self, start: u32, data: &[u8]) -> flash::Result {
        self.programs += 1;
        let start = start as usize;
        let end = start + data.len();
        if end > self.memory.len() {
            return Err(flash::Error::AddressError);
        }
        self.memory[start..end].copy_from_slice(data);
        Ok(())
    }
}

/// Region registers, counting how often they are looked at.
#[derive(Default)]
struct Registers {
    base: [u32; 3],
    mask: [u32; 3],
    reads: Cell<usize>,
}

impl Registers {
    fn with(region: Region, base: u32, mask: u32) -> Self {
        let mut registers = Self::default();
        registers.set(region, base, mask);
        registers
    }

    fn set(&mut self, region: Region, base: u32, mask: u32) {
        self.base[region.index()] = base;
        self.mask[region.index()] = mask;
    }
}

impl RegionConfig for Registers {
    fn base_address(&self, region: Region) -> u32 {
        self.reads.set(self.reads.get() + 1);
        self.base[region.index()]
    }

    fn sub_region_enable(&self, region: Region) -> u32 {
        self.reads.set(self.reads.get() + 1);
        self.mask[region.index()]
    }
}

#[derive(Default)]
struct Engine {
    fail_generate: bool,
    fail_load: bool,
    generated: Vec<Region>,
    loaded: Vec<Region>,
    encrypted: Vec<(Region, u32, u32)>,
    next_iv: u8,
}

impl CryptoEngine for Engine {
    fn generate_iv(&mut self, region: Region, iv_code: &mut IvCode, store: bool) -> prince::Result {
        assert!(store, "new IVs must be persisted");
        self.generated.push(region);
        if self.fail_generate {
            return Err(prince::Error::Fail);
        }
        self.next_iv = self.next_iv.wrapping_add(1);
        iv_code.iter_mut().for_each(|byte| *byte = self.next_iv);
        Ok(())
    }

    fn load_iv(&mut self, region: Region, iv_code: &IvCode) -> prince::Result {
        assert!(iv_code.iter().all(|&byte| byte == self.next_iv));
        self.loaded.push(region);
        if self.fail_load {
            return Err(prince::Error::Fail);
        }
        Ok(())
    }

    fn set_encrypt_range(&mut self, region: Region, start: u32, length: u32) -> prince::Result {
        self.encrypted.push((region, start, length));
        Ok(())
    }
}

fn checked(registers: Registers, engine: Engine) -> CheckedFlash<RamFlash, Registers, Engine> {
    CheckedFlash::new(RamFlash::new(), registers, engine)
}

#[test]
fn whole_run_erase_renews_iv() {
    // sub-regions 1..5 of region 2
    let registers = Registers::with(Region::Region2, 0x8_0000, 0b11110);
    let mut flash = checked(registers, Engine::default());

    let start = 0x8_0000 + SUBREGION_SIZE;
    assert_eq!(flash.erase(start, 4 * SUBREGION_SIZE, ERASE_KEY), Ok(()));

    let (flash, _, engine) = flash.release();
    assert_eq!(flash.erases, 1);
    assert_eq!(engine.generated, vec![Region::Region2]);
    assert_eq!(engine.loaded, vec![Region::Region2]);
    assert!(flash.memory[start as usize..(start + 4 * SUBREGION_SIZE) as usize].iter().all(|&b| b == 0xff));
}

#[test]
fn whole_run_program_needs_no_iv() {
    let registers = Registers::with(Region::Region1, 0x4_0000, 0b11110 << 8);
    let mut flash = checked(registers, Engine::default());

    let data = vec![0xa5u8; 4 * SUBREGION_SIZE as usize];
    assert_eq!(flash.program(0x4_0000 + 9 * SUBREGION_SIZE, &data), Ok(()));

    let (flash, _, engine) = flash.release();
    assert_eq!(flash.programs, 1);
    assert!(engine.generated.is_empty());
}

#[test]
fn erase_larger_than_run_is_allowed() {
    let registers = Registers::with(Region::Region0, 0, 0b0110);
    let mut flash = checked(registers, Engine::default());

    assert_eq!(flash.erase(0, 8 * SUBREGION_SIZE, ERASE_KEY), Ok(()));
    let (_, _, engine) = flash.release();
    assert_eq!(engine.generated.len(), 1);
}

#[test]
fn partial_overlap_is_refused() {
    let registers = Registers::with(Region::Region2, 0x8_0000, 0b11110);
    let mut flash = checked(registers, Engine::default());

    // first page of the run only
    let start = 0x8_0000 + SUBREGION_SIZE;
    assert_eq!(
        flash.erase(start, PAGE_SIZE as u32, ERASE_KEY),
        Err(flash::Error::EncryptedRegionsEraseNotDoneAtOnce),
    );
    assert_eq!(
        flash.program(start, &[0u8; PAGE_SIZE]),
        Err(flash::Error::SizeError),
    );
    // straddling the end of the run
    assert_eq!(
        flash.erase(start + 3 * SUBREGION_SIZE, 2 * SUBREGION_SIZE, ERASE_KEY),
        Err(flash::Error::EncryptedRegionsEraseNotDoneAtOnce),
    );

    let (flash, _, engine) = flash.release();
    assert_eq!(flash.calls(), 0);
    assert!(engine.generated.is_empty());
}

#[test]
fn outside_of_run_is_allowed() {
    let registers = Registers::with(Region::Region2, 0x8_0000, 0b11110);
    let mut flash = checked(registers, Engine::default());

    // sub-region 0 of the same region, not enabled
    assert_eq!(flash.erase(0x8_0000, SUBREGION_SIZE, ERASE_KEY), Ok(()));
    // sub-region 5, just past the run
    assert_eq!(flash.program(0x8_0000 + 5 * SUBREGION_SIZE, &[1u8; PAGE_SIZE]), Ok(()));
    // some other region's window altogether
    assert_eq!(flash.erase(0x1_0000, PAGE_SIZE as u32, ERASE_KEY), Ok(()));

    let (flash, _, engine) = flash.release();
    assert_eq!(flash.calls(), 3);
    assert!(engine.generated.is_empty());
}

#[test]
fn zero_masks_never_deny() {
    let mut registers = Registers::default();
    registers.set(Region::Region0, 0, 0);
    registers.set(Region::Region1, 0x4_0000, 0);
    registers.set(Region::Region2, 0x8_0000, 0);
    let mut flash = checked(registers, Engine::default());

    assert_eq!(flash.erase(0x4_0000 + 512, PAGE_SIZE as u32, ERASE_KEY), Ok(()));
    assert_eq!(flash.program(0x8_0000, &[0u8; PAGE_SIZE]), Ok(()));
    let (flash, _, _) = flash.release();
    assert_eq!(flash.calls(), 2);
}

#[test]
fn above_ceiling_reads_no_registers() {
    let registers = Registers::with(Region::Region2, 0x8_0000, 0xffff_ffff);
    let mut flash = checked(registers, Engine::default());

    assert_eq!(flash.erase(0xA_0200, PAGE_SIZE as u32, ERASE_KEY), Err(flash::Error::AddressError));
    assert_eq!(flash.regions().reads.get(), 0);

    let (flash, _, _) = flash.release();
    assert_eq!(flash.erases, 1);
}

#[test]
fn failing_iv_generation_blocks_erase() {
    let registers = Registers::with(Region::Region1, 0x4_0000, 0xffff_ffff);
    let engine = Engine { fail_generate: true, ..Default::default() };
    let mut flash = checked(registers, engine);

    assert_eq!(
        flash.erase(0x4_0000, REGION_SIZE, ERASE_KEY),
        Err(flash::Error::EncryptedRegionsEraseNotDoneAtOnce),
    );

    let (flash, _, engine) = flash.release();
    assert_eq!(flash.erases, 0);
    assert_eq!(engine.generated.len(), 1);
    assert!(engine.loaded.is_empty());
}

#[test]
fn failing_iv_load_blocks_erase() {
    let registers = Registers::with(Region::Region1, 0x4_0000, 0xffff_ffff);
    let engine = Engine { fail_load: true, ..Default::default() };
    let mut flash = checked(registers, engine);

    assert_eq!(
        flash.erase(0x4_0000, REGION_SIZE, ERASE_KEY),
        Err(flash::Error::EncryptedRegionsEraseNotDoneAtOnce),
    );

    let (flash, _, engine) = flash.release();
    assert_eq!(flash.erases, 0);
    assert_eq!(engine.loaded, vec![Region::Region1]);
}

#[test]
fn scattered_mask_is_refused() {
    let registers = Registers::with(Region::Region0, 0, 0b1011);
    let mut flash = checked(registers, Engine::default());

    // covers every enabled sub-region, still refused
    assert_eq!(
        flash.erase(0, REGION_SIZE, ERASE_KEY),
        Err(flash::Error::EncryptedRegionsEraseNotDoneAtOnce),
    );
    assert_eq!(
        flash.program(0, &vec![0u8; 4 * SUBREGION_SIZE as usize]),
        Err(flash::Error::SizeError),
    );
    // but flash beyond the region window is not its business
    assert_eq!(flash.program(REGION_SIZE, &[0u8; PAGE_SIZE]), Ok(()));

    let (flash, _, _) = flash.release();
    assert_eq!(flash.programs, 1);
}

#[test]
fn later_region_still_checked() {
    // region 0's window overlaps but its run does not,
    // region 1's run is only partly covered
    let mut registers = Registers::with(Region::Region0, 0x2_0000, 0b1);
    registers.set(Region::Region1, 0x4_0000, 0b11);
    let mut flash = checked(registers, Engine::default());

    assert_eq!(
        flash.erase(0x4_0000, SUBREGION_SIZE, ERASE_KEY),
        Err(flash::Error::EncryptedRegionsEraseNotDoneAtOnce),
    );
    let (flash, _, _) = flash.release();
    assert_eq!(flash.erases, 0);
}

#[test]
fn primitive_errors_pass_through() {
    let mut flash = checked(Registers::default(), Engine::default());
    assert_eq!(flash.erase(0xA_0200, PAGE_SIZE as u32, ERASE_KEY), Err(flash::Error::AddressError));
    let (flash, _, _) = flash.release();
    assert_eq!(flash.erases, 1);
}

#[test]
fn bad_erase_arguments_keep_old_iv() {
    let registers = Registers::with(Region::Region2, 0x8_0000, 0b11110);
    let mut flash = checked(registers, Engine::default());
    let start = 0x8_0000 + SUBREGION_SIZE;

    assert_eq!(flash.erase(start, 4 * SUBREGION_SIZE, 0xdead_beef), Err(flash::Error::EraseKeyError));
    assert_eq!(flash.erase(start, 4 * SUBREGION_SIZE + 2, ERASE_KEY), Err(flash::Error::AlignmentError));
    assert_eq!(flash.erase(start, 0, ERASE_KEY), Err(flash::Error::AlignmentError));

    let (flash, _, engine) = flash.release();
    assert_eq!(flash.erases, 0);
    assert!(engine.generated.is_empty());
    assert!(engine.loaded.is_empty());
}

#[test]
fn first_decision_wins() {
    // the request covers region 0's run entirely,
    // but only the first half of region 1's run
    let mut registers = Registers::with(Region::Region0, 0, 0b1);
    registers.set(Region::Region1, 0x2000, 0b11);
    let mut flash = checked(registers, Engine::default());

    assert_eq!(flash.erase(0, 2 * SUBREGION_SIZE, ERASE_KEY), Ok(()));
    assert_eq!(flash.program(0, &vec![0u8; 2 * SUBREGION_SIZE as usize]), Ok(()));

    let (flash, _, engine) = flash.release();
    assert_eq!(flash.calls(), 2);
    assert_eq!(engine.generated, vec![Region::Region0]);
}

#[test]
fn encrypt_range_reaches_engine() {
    let mut flash = checked(Registers::default(), Engine::default());
    assert_eq!(flash.set_encrypt_range(Region::Region2, 0x8_0000, 0x1_0000), Ok(()));

    let (_, _, engine) = flash.release();
    assert_eq!(engine.encrypted, vec![(Region::Region2, 0x8_0000, 0x1_0000)]);
}

#[test]
fn error_codes() {
    assert_eq!(flash::Error::EncryptedRegionsEraseNotDoneAtOnce.code(), 134);
    assert_eq!(flash::Error::SizeError.code(), 100);
    assert_eq!(flash::Error::EraseKeyError.code(), 107);
}
