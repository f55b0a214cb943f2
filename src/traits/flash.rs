use generic_array::{
    ArrayLength,
    GenericArray,
};

/// Flash operation error
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Flash controller is not done yet
    Busy,
    /// Error detected (by command execution, or because no command could be executed)
    Illegal,
    /// Set during read if ECC decoding logic detects correctable or uncorrectable error
    EccError,
    /// (Legal) command failed
    Failure,
    /// An invalid argument was passed
    InvalidArgument,
    /// Start address or length not aligned to what the operation requires
    AlignmentError,
    /// Range lies (partly) outside of program flash
    AddressError,
    /// Erase called without the erase key
    EraseKeyError,
    /// Refused by the PRINCE checker: an erase would cover only part of an
    /// encrypted sub-region run
    EncryptedRegionsEraseNotDoneAtOnce,
    /// Refused by the PRINCE checker: a program would cover only part of an
    /// encrypted sub-region run
    SizeError,
}

impl Error {
    /// Numeric status code, as returned by the ROM flash driver.
    ///
    /// Controller errors without a ROM equivalent report as command failure.
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidArgument => 4,
            Error::SizeError => 100,
            Error::AlignmentError => 101,
            Error::AddressError => 102,
            Error::Illegal => 103,
            Error::Busy | Error::Failure => 105,
            Error::EraseKeyError => 107,
            Error::EccError => 116,
            Error::EncryptedRegionsEraseNotDoneAtOnce => 134,
        }
    }
}

/// A type alias for the result of a Flash operation.
pub type Result = core::result::Result<(), Error>;

pub trait WriteErase<EraseSize: ArrayLength<u8>, WriteSize: ArrayLength<u8>> {

    /// check flash status
    fn status(&self) -> Result;

    /// Erase specified flash page.
    fn erase_page(&mut self, page: usize) -> Result;

    /// The smallest possible write, depends on platform
    fn write_native(&mut self,
                    address: usize,
                    array: &GenericArray<u8, WriteSize>,
                    ) -> Result;

    fn write(&mut self, address: usize, data: &[u8]) -> Result {
        let write_size = WriteSize::to_usize();
        assert!(data.len() % write_size == 0);
        assert!(address % write_size == 0);

        for i in (0..data.len()).step_by(write_size) {
            self.write_native(
                address + i,
                GenericArray::from_slice(&data[i..i + write_size]),
                )?;
        }
        Ok(())
    }
}

/// Range based erase and program, the primitive the PRINCE-gated
/// operations delegate to.
///
/// Unlike `WriteErase`, arguments are validated and reported as errors
/// instead of asserted.
pub trait EraseProgram {
    /// Erase the pages encompassing `[start, start + length)`.
    ///
    /// `key` must be `drivers::flash::ERASE_KEY`.
    fn erase(&mut self, start: u32, length: u32, key: u32) -> Result;

    /// Program `data` at `start`.
    fn program(&mut self, start: u32, data: &[u8]) -> Result;
}

impl<T: EraseProgram + ?Sized> EraseProgram for &mut T {
    fn erase(&mut self, start: u32, length: u32, key: u32) -> Result {
        (**self).erase(start, length, key)
    }

    fn program(&mut self, start: u32, data: &[u8]) -> Result {
        (**self).program(start, data)
    }
}
