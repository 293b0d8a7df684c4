//! Compile-time configuration
//!
//! These constants control priorities, tick rate and timeout sentinels.

use crate::types::{OsPrio, OsTick};

/// Number of priority levels
pub const CFG_PRIO_MAX: usize = 256;

/// System tick rate in Hz
pub const CFG_TICK_RATE_HZ: u32 = 1000;

/// Idle task priority
pub const CFG_PRIO_IDLE: OsPrio = (CFG_PRIO_MAX - 1) as OsPrio;

/// Pend timeout that never expires
pub const OS_WAIT_FOREVER: OsTick = 0xFFFF_FFFF;

/// Pend timeout that never blocks
pub const OS_NO_WAIT: OsTick = 0;
