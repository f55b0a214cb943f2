use crate::{
    raw,
    peripherals::{
        syscon,
    },
    typestates::{
        init_state,
    }
};

crate::wrap_stateful_peripheral!(Flash, FLASH);
crate::stateful_peripheral_enable_disable!(Flash);
