use crate::{
    raw,
    peripherals::{
        syscon,
    },
    typestates::{
        init_state,
    }
};

crate::wrap_stateful_peripheral!(Rng, RNG);
crate::stateful_peripheral_enable_disable!(Rng);

impl Rng<init_state::Enabled> {
    pub fn get_random_u32(&self) -> u32 {
        for _ in 0..32 {
            while self.raw.counter_val.read().refresh_cnt().bits() == 0 {}
        }
        self.raw.random_number.read().bits()
    }

    pub fn get_random_u64(&self) -> u64 {
        (self.get_random_u32() as u64) << 32 | self.get_random_u32() as u64
    }
}
