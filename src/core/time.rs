//! Tick conversions
//!
//! Pend timeouts are expressed in kernel ticks; these helpers convert from
//! and to wall-clock milliseconds at [`CFG_TICK_RATE_HZ`].

use crate::config::{CFG_TICK_RATE_HZ, OS_WAIT_FOREVER};
use crate::error::{OsError, OsResult};
use crate::types::OsTick;

/// Convert milliseconds to ticks, rounding down
///
/// # Returns
/// * `Ok(ticks)` - Converted value
/// * `Err(OsError::TimeOvf)` - Result would collide with [`OS_WAIT_FOREVER`]
pub fn ms_to_ticks(ms: u32) -> OsResult<OsTick> {
    let ticks = u64::from(ms) * u64::from(CFG_TICK_RATE_HZ) / 1000;
    if ticks >= u64::from(OS_WAIT_FOREVER) {
        return Err(OsError::TimeOvf);
    }
    Ok(ticks as OsTick)
}

/// Convert ticks to milliseconds
pub fn ticks_to_ms(ticks: OsTick) -> u64 {
    u64::from(ticks) * 1000 / u64::from(CFG_TICK_RATE_HZ)
}
