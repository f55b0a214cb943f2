use core::convert::TryInto;

use crate::{
    peripherals::flash::Flash,
    typestates::init_state::Enabled,
    traits::flash::{
        EraseProgram,
        Error,
        Result,
        WriteErase,
    },
};

pub use generic_array::{
    GenericArray,
    typenum::U512,
};

// one physical word of Flash consists of 128 bits (or 4 u32, or 16 bytes)
// one page is 32 physical words, or 128 u32s, or 512 bytes)

// write must be page aligned (512 bytes)

pub const WRITE_SIZE: usize = 512;
pub const PAGE_SIZE: usize = 512;

/// End of the program flash usable by applications, 631.5KB.
pub const PROGRAM_FLASH_END: u32 = 631 * 1024 + 512;

/// Has to be passed to `EraseProgram::erase`, same value as the ROM flash driver expects.
pub const ERASE_KEY: u32 = 0x6b65666c;

/// Key and length rules every erase must satisfy, wherever it starts.
pub fn check_erase_arguments(length: u32, key: u32) -> Result {
    if key != ERASE_KEY {
        return Err(Error::EraseKeyError);
    }
    if length == 0 || length % 4 != 0 {
        return Err(Error::AlignmentError);
    }
    Ok(())
}

/// First and last page touched by an erase of `[start, start + length)`.
///
/// `start` need not be page aligned, `length` must be word aligned.
pub(crate) fn erase_page_span(start: u32, length: u32, key: u32) -> core::result::Result<(usize, usize), Error> {
    check_erase_arguments(length, key)?;
    let end = start as u64 + length as u64;
    if end > PROGRAM_FLASH_END as u64 {
        return Err(Error::AddressError);
    }
    let first = start as usize / PAGE_SIZE;
    let last = (end - 1) as usize / PAGE_SIZE;
    Ok((first, last))
}

pub(crate) fn check_program_range(start: u32, length: usize) -> Result {
    if length == 0 || length % WRITE_SIZE != 0 || start as usize % WRITE_SIZE != 0 {
        return Err(Error::AlignmentError);
    }
    if start as u64 + length as u64 > PROGRAM_FLASH_END as u64 {
        return Err(Error::AddressError);
    }
    Ok(())
}

pub struct FlashGordon {
    flash: Flash<Enabled>,
}

impl FlashGordon {
    pub fn new(flash: Flash<Enabled>) -> Self {

        flash.raw.event.write(|w| w.rst().set_bit());
        // seems immediate
        while flash.raw.int_status.read().done().bit_is_clear() {}

        // first thing to check! illegal command
        debug_assert!(flash.raw.int_status.read().err().bit_is_clear());
        // first thing to check! legal command failed
        debug_assert!(flash.raw.int_status.read().fail().bit_is_clear());

        FlashGordon {
            flash,
        }
    }

    pub fn release(self) -> Flash<Enabled> {
        self.flash
    }

    fn clear_status(&self) {
        self.flash.raw.int_clr_status.write(|w| w
            .done().set_bit()
            .ecc_err().set_bit()
            .err().set_bit()
            .fail().set_bit()
        );

    }

    fn status(&self) -> Result {
        let status = self.flash.raw.int_status.read();
        if status.err().bit_is_set() {
            return Err(Error::Illegal);
        }
        if status.ecc_err().bit_is_set() {
            return Err(Error::EccError);
        }
        if status.fail().bit_is_set() {
            return Err(Error::Failure);
        }

        Ok(())
    }

    /// Erases pages `first..=last` with a single command.
    fn erase_range(&mut self, first: usize, last: usize) -> Result {
        // starta/stopa are in flash words, of which a page has 32
        let starta = first * 32;
        let stopa = last * 32;

        let flash = &self.flash.raw;
        self.ensure_idle()?;
        self.clear_status();

        flash.starta.write(|w| unsafe { w.starta().bits(starta as u32) } );
        flash.stopa.write(|w| unsafe { w.stopa().bits(stopa as u32) } );
        flash.cmd.write(|w| unsafe { w.bits(FlashCommands::EraseRange as u32) });
        while flash.int_status.read().done().bit_is_clear() {}

        self.status()
    }

    fn ensure_idle(&self) -> Result {
        if self.flash.raw.int_status.read().done().bit_is_clear() {
            return Err(Error::Busy);
        }
        Ok(())
    }
}

impl WriteErase<U512, U512> for FlashGordon {

    fn status(&self) -> Result {
        self.status()
    }

    fn erase_page(&mut self, page: usize) -> Result {
        self.erase_range(page, page)
    }

    fn write_native(
        &mut self,
        address: usize,
        array: &GenericArray<u8, U512>,
    ) -> Result {

        let flash = &self.flash.raw;
        self.ensure_idle()?;
        self.clear_status();

        // write one physical word (16 bytes) at a time
        for (i, chunk) in array.chunks(16).enumerate() {
            let starta = (address >> 4) + i;
            flash.starta.write(|w| unsafe { w.starta().bits(starta as u32) } );

            for (j, word) in chunk.chunks_exact(4).enumerate() {
                // chunks_exact(4) hands out 4 byte slices
                let word: [u8; 4] = word.try_into().map_err(|_| Error::InvalidArgument)?;
                flash.dataw[j].write(|w| unsafe { w.bits(u32::from_ne_bytes(word)) } );
            }

            flash.cmd.write(|w| unsafe { w.bits(FlashCommands::Write as u32) });
            while flash.int_status.read().done().bit_is_clear() {}
            self.status()?;
        }
        self.clear_status();

        let starta = address >> 4;
        flash.starta.write(|w| unsafe { w.starta().bits(starta as u32) } );
        flash.cmd.write(|w| unsafe { w.bits(FlashCommands::Program as u32) });
        while flash.int_status.read().done().bit_is_clear() {}
        self.status()
    }
}

impl EraseProgram for FlashGordon {
    fn erase(&mut self, start: u32, length: u32, key: u32) -> Result {
        let (first, last) = erase_page_span(start, length, key)?;
        debug!("erasing pages {}..={}", first, last);
        self.erase_range(first, last)
    }

    fn program(&mut self, start: u32, data: &[u8]) -> Result {
        check_program_range(start, data.len())?;
        debug!("programming {} bytes at {:#x}", data.len(), start);
        self.write(start as usize, data)
    }
}

#[allow(dead_code)]
#[repr(C)]
pub enum FlashCommands {
    Init = 0x0,
    PowerDown = 0x1,
    SetReadMode = 0x2,
    ReadSingleWord = 0x3,
    EraseRange = 0x4,
    BlankCheck = 0x5,
    MarginCheck = 0x6,
    Checksum = 0x7,
    Write = 0x8,
    WriteProgram = 0xA,
    Program = 0xC,
    /// report ECC error (correction) count
    ReportEcc= 0xD,
}
