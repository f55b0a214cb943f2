//! API for analog control (ANACTRL) - always on
//!
//! Oscillator configuration, frequency measurement and the brown-out /
//! DC-DC interrupt and status flags.

use core::convert::TryFrom;

use bitflags::bitflags;

use crate::peripherals::syscon::Syscon;

// UM says:
// NOTE: The clock to analog controller module is enabled during boot time
// by the boot loader and it should always stay enabled
crate::wrap_always_on_peripheral!(Anactrl, ANACTRL);

// FRO192M_CTRL
const ENA_12MHZCLK: u32 = 1 << 14;
const ENA_96MHZCLK: u32 = 1 << 30;
// XO32M_CTRL
const ACBUF_PASS_ENABLE: u32 = 1 << 22;
const ENABLE_PLL_USB_OUT: u32 = 1 << 23;
const ENABLE_SYSTEM_CLK_OUT: u32 = 1 << 24;
// FREQ_ME_CTRL
const FREQ_ME_PROG: u32 = 1 << 31;
const FREQ_ME_CAPVAL_SCALE: u32 = 0x7fff_ffff;

bitflags! {
    /// BOD_DCDC_INT_STATUS
    pub struct InterruptFlags: u32 {
        /// BOD VBAT status before interrupt enable
        const BOD_VBAT = 1 << 0;
        /// BOD VBAT status after interrupt enable
        const BOD_VBAT_INTERRUPT = 1 << 1;
        /// current value of BOD VBAT power status output
        const BOD_VBAT_POWER = 1 << 2;
        const BOD_CORE = 1 << 3;
        const BOD_CORE_INTERRUPT = 1 << 4;
        const BOD_CORE_POWER = 1 << 5;
        const DCDC = 1 << 6;
        const DCDC_INTERRUPT = 1 << 7;
        const DCDC_POWER = 1 << 8;
    }
}

bitflags! {
    /// BOD_DCDC_INT_CTRL
    ///
    /// The `*_CLEAR` bits self-clear.
    pub struct InterruptControl: u32 {
        const BOD_VBAT_ENABLE = 1 << 0;
        const BOD_VBAT_CLEAR = 1 << 1;
        const BOD_CORE_ENABLE = 1 << 2;
        const BOD_CORE_CLEAR = 1 << 3;
        const DCDC_ENABLE = 1 << 4;
        const DCDC_CLEAR = 1 << 5;

        const ALL_ENABLE = Self::BOD_VBAT_ENABLE.bits | Self::BOD_CORE_ENABLE.bits | Self::DCDC_ENABLE.bits;
        const ALL_CLEAR = Self::BOD_VBAT_CLEAR.bits | Self::BOD_CORE_CLEAR.bits | Self::DCDC_CLEAR.bits;
    }
}

bitflags! {
    /// ANALOG_CTRL_STATUS
    pub struct StatusFlags: u32 {
        const FLASH_POWER_DOWN = 1 << 12;
        const FLASH_INIT_ERROR = 1 << 13;
    }
}

bitflags! {
    /// FRO192M_STATUS in the low half, XO32M_STATUS in the high half.
    pub struct OscStatusFlags: u32 {
        const FRO192M_CLK_VALID = 1 << 0;
        /// CCO threshold voltage detector output
        const FRO192M_VCCO_OK = 1 << 1;
        const XO32M_READY = 1 << 16;
    }
}

/// On-chip high-speed free running oscillator outputs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Fro192mConfig {
    pub enable_12mhz: bool,
    pub enable_96mhz: bool,
}

impl Default for Fro192mConfig {
    fn default() -> Self {
        Self { enable_12mhz: true, enable_96mhz: false }
    }
}

impl Fro192mConfig {
    fn apply(&self, ctrl: u32) -> u32 {
        let mut ctrl = ctrl & !(ENA_12MHZCLK | ENA_96MHZCLK);
        if self.enable_12mhz {
            ctrl |= ENA_12MHZCLK;
        }
        if self.enable_96mhz {
            ctrl |= ENA_96MHZCLK;
        }
        ctrl
    }
}

/// 32 MHz crystal oscillator outputs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Xo32mConfig {
    /// XO AC buffer bypass in PLL and top level
    pub ac_buffer_bypass: bool,
    /// 32 MHz output to the USB HS PLL
    pub pll_usb_output: bool,
    /// 32 MHz output to CPU system, SCT and CLKOUT
    pub system_clock_output: bool,
}

impl Xo32mConfig {
    fn apply(&self, ctrl: u32) -> u32 {
        let mut ctrl = ctrl & !(ACBUF_PASS_ENABLE | ENABLE_PLL_USB_OUT | ENABLE_SYSTEM_CLK_OUT);
        if self.ac_buffer_bypass {
            ctrl |= ACBUF_PASS_ENABLE;
        }
        if self.pll_usb_output {
            ctrl |= ENABLE_PLL_USB_OUT;
        }
        if self.system_clock_output {
            ctrl |= ENABLE_SYSTEM_CLK_OUT;
        }
        ctrl
    }
}

/// Reference counter widths the measurement block supports.
pub const FREQ_ME_SCALE_RANGE: core::ops::RangeInclusive<u8> = 2..=31;

/// `f_target = capval * f_reference / (2^scale - 1)`
///
/// `None` for a `scale` outside `FREQ_ME_SCALE_RANGE`, or a result beyond `u32`.
pub(crate) fn frequency_from_capval(capval: u32, scale: u8, reference_hz: u32) -> Option<u32> {
    if !FREQ_ME_SCALE_RANGE.contains(&scale) {
        return None;
    }
    let divisor = (1u64 << scale) - 1;
    let frequency = (capval as u64 * reference_hz as u64) / divisor;
    u32::try_from(frequency).ok()
}

pub(crate) fn merge_osc_status(fro192m_status: u32, xo32m_status: u32) -> OscStatusFlags {
    OscStatusFlags::from_bits_truncate((fro192m_status & 0xff) | ((xo32m_status & 0xff) << 16))
}

impl Anactrl {
    /// Turns on the analog controller clock, should it have been gated.
    pub fn init(&mut self, syscon: &mut Syscon) {
        syscon.enable_clock(&mut self.raw);
    }

    pub fn deinit(&mut self, syscon: &mut Syscon) {
        syscon.disable_clock(&mut self.raw);
    }

    pub fn is_12mhzclk_enabled(&self) -> bool {
        self.raw.fro192m_ctrl.read().ena_12mhzclk().is_enable()
    }

    /// Supposedly, this is needed for Flash, hence enabled by default
    pub fn is_48mhzclk_enabled(&self) -> bool {
        self.raw.fro192m_ctrl.read().ena_48mhzclk().is_enable()
    }

    /// UM says not enabled by default, empiricially seems it is
    pub fn is_96mhzclk_enabled(&self) -> bool {
        // ewww this hard-faults if 12MHz clock is main clock?!
        self.raw.fro192m_ctrl.read().ena_96mhzclk().is_enable() &&
        self.raw.fro192m_status.read().clk_valid().is_clkout()
    }

    pub fn set_fro192m(&mut self, config: &Fro192mConfig) {
        self.raw.fro192m_ctrl.modify(|r, w| unsafe { w.bits(config.apply(r.bits())) });
    }

    pub fn set_xo32m(&mut self, config: &Xo32mConfig) {
        self.raw.xo32m_ctrl.modify(|r, w| unsafe { w.bits(config.apply(r.bits())) });
    }

    /// Measures the target clock against the reference clock selected in
    /// INPUTMUX, in Hz. `scale` is the power of two the reference counter
    /// counts to, in `FREQ_ME_SCALE_RANGE`.
    ///
    /// Returns `None` without starting a measurement if `scale` is out of range.
    pub fn measure_frequency(&mut self, scale: u8, reference_hz: u32) -> Option<u32> {
        if !FREQ_ME_SCALE_RANGE.contains(&scale) {
            warn!("frequency measurement scale {} out of range", scale);
            return None;
        }
        self.raw.freq_me_ctrl.write(|w| unsafe { w.bits(FREQ_ME_PROG | scale as u32) });
        while self.raw.freq_me_ctrl.read().bits() & FREQ_ME_PROG != 0 {}

        let capval = self.raw.freq_me_ctrl.read().bits() & FREQ_ME_CAPVAL_SCALE;
        let frequency = frequency_from_capval(capval, scale, reference_hz);
        debug!("measured {:?} Hz (capval {}, scale {})", frequency, capval, scale);
        frequency
    }

    pub fn enable_interrupts(&mut self, interrupts: InterruptControl) {
        let mask = (interrupts & InterruptControl::ALL_ENABLE).bits();
        self.raw.bod_dcdc_int_ctrl.modify(|r, w| unsafe { w.bits(r.bits() | mask) });
    }

    pub fn disable_interrupts(&mut self, interrupts: InterruptControl) {
        let mask = (interrupts & InterruptControl::ALL_ENABLE).bits();
        self.raw.bod_dcdc_int_ctrl.modify(|r, w| unsafe { w.bits(r.bits() & !mask) });
    }

    pub fn clear_interrupts(&mut self, interrupts: InterruptControl) {
        let mask = (interrupts & InterruptControl::ALL_CLEAR).bits();
        self.raw.bod_dcdc_int_ctrl.modify(|r, w| unsafe { w.bits(r.bits() | mask) });
    }

    pub fn status_flags(&self) -> StatusFlags {
        StatusFlags::from_bits_truncate(self.raw.analog_ctrl_status.read().bits())
    }

    pub fn osc_status_flags(&self) -> OscStatusFlags {
        merge_osc_status(
            self.raw.fro192m_status.read().bits(),
            self.raw.xo32m_status.read().bits(),
        )
    }

    pub fn interrupt_status_flags(&self) -> InterruptFlags {
        InterruptFlags::from_bits_truncate(self.raw.bod_dcdc_int_status.read().bits())
    }
}
