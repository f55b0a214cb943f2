#[macro_export]
macro_rules! wrap_always_on_peripheral {
    ($hal_name:ident, $pac_name:ident) => {
        use crate::raw;

        pub struct $hal_name {
            pub(crate) raw: raw::$pac_name,
        }

        impl core::convert::From<raw::$pac_name> for $hal_name {
            fn from(raw: raw::$pac_name) -> Self {
                $hal_name::new(raw)
            }
        }

        impl $hal_name {
            fn new(raw: raw::$pac_name) -> Self {
                $hal_name { raw }
            }

            pub unsafe fn steal() -> Self {
                // seems a little wasteful to steal the full peripherals but ok..
                Self::new(raw::Peripherals::steal().$pac_name)
            }

            pub fn release(self) -> raw::$pac_name {
                self.raw
            }
        }
    };
}

#[macro_export]
macro_rules! wrap_stateful_peripheral {
    ($hal_name:ident, $pac_name:ident) => {
        pub struct $hal_name<State = init_state::Unknown> {
            pub(crate) raw: raw::$pac_name,
            pub _state: State,
        }

        impl core::convert::From<raw::$pac_name> for $hal_name {
            fn from(raw: raw::$pac_name) -> Self {
                $hal_name::new(raw)
            }
        }

        impl $hal_name {
            fn new(raw: raw::$pac_name) -> Self {
                $hal_name {
                    raw,
                    _state: init_state::Unknown,
                }
            }

            pub unsafe fn steal() -> Self {
                // seems a little wasteful to steal the full peripherals but ok..
                Self::new(raw::Peripherals::steal().$pac_name)
            }
        }

        impl<State> $hal_name<State> {
            pub fn release(self) -> raw::$pac_name {
                self.raw
            }
        }
    };
}

#[macro_export]
macro_rules! stateful_peripheral_enable_disable {
    ($hal_name:ident) => {
        impl<State> $hal_name<State> {
            /// Consumes $hal_name, returns an enabled one
            pub fn enabled(mut self, syscon: &mut syscon::Syscon) -> $hal_name<init_state::Enabled> {
                syscon.enable_clock(&mut self.raw);

                $hal_name {
                    raw: self.raw,
                    _state: init_state::Enabled(()),
                }
            }

            /// Consumes $hal_name, returns a disabled one
            pub fn disabled(mut self, syscon: &mut syscon::Syscon) -> $hal_name<init_state::Disabled> {
                syscon.disable_clock(&mut self.raw);

                $hal_name {
                    raw: self.raw,
                    _state: init_state::Disabled,
                }
            }
        }
    }
}

/// Builds one entry of the PRINCE per-region register table.
///
/// The PAC gives every region its own register types, so each entry carries
/// plain function pointers that reach into the right fields.
#[macro_export]
macro_rules! prince_region_registers {
    ($base_addr:ident, $sr_enable:ident, $iv_lsb:ident, $iv_msb:ident) => {{
        fn base_address(rb: &RegisterBlock) -> u32 {
            rb.$base_addr.read().bits()
        }
        fn set_base_address(rb: &RegisterBlock, value: u32) {
            rb.$base_addr.write(|w| unsafe { w.bits(value) });
        }
        fn sub_region_enable(rb: &RegisterBlock) -> u32 {
            rb.$sr_enable.read().bits()
        }
        fn set_sub_region_enable(rb: &RegisterBlock, value: u32) {
            rb.$sr_enable.write(|w| unsafe { w.bits(value) });
        }
        fn set_iv(rb: &RegisterBlock, lsb: u32, msb: u32) {
            rb.$iv_lsb.write(|w| unsafe { w.bits(lsb) });
            rb.$iv_msb.write(|w| unsafe { w.bits(msb) });
        }

        RegionRegisters {
            base_address,
            set_base_address,
            sub_region_enable,
            set_sub_region_enable,
            set_iv,
        }
    }};
}
