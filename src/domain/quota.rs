// Per-user draw quota and its time-driven reset.

use serde::{Deserialize, Serialize};

pub const SECONDS_PER_HOUR: u64 = 60 * 60;

/// Remaining draws and the instant (epoch seconds) they replenish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaState {
    pub remaining: u32,
    pub next_reset_at: u64,
}

impl QuotaState {
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Takes one draw. Leaves the state untouched and returns false when none remain.
    pub fn consume(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

/// Quota policy: how many draws a window allows and how long a window lasts.
///
/// Windows are aligned to multiples of the interval since the Unix epoch, so a
/// 24 hour interval rolls over at UTC midnight for every user at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaManager {
    daily_quota: u32,
    reset_interval_secs: u64,
}

impl QuotaManager {
    pub fn new(daily_quota: u32, reset_interval_hours: u32) -> Self {
        Self {
            daily_quota,
            reset_interval_secs: (u64::from(reset_interval_hours) * SECONDS_PER_HOUR).max(1),
        }
    }

    pub fn daily_quota(&self) -> u32 {
        self.daily_quota
    }

    pub fn reset_interval_secs(&self) -> u64 {
        self.reset_interval_secs
    }

    /// First window boundary strictly after `now`.
    pub fn next_boundary_after(&self, now: u64) -> u64 {
        (now / self.reset_interval_secs + 1) * self.reset_interval_secs
    }

    /// Quota for a user that has never drawn.
    pub fn initial(&self, now: u64) -> QuotaState {
        QuotaState {
            remaining: self.daily_quota,
            next_reset_at: self.next_boundary_after(now),
        }
    }

    /// Applies the lazy reset. Returns true when a boundary was crossed.
    pub fn refresh(&self, state: &mut QuotaState, now: u64) -> bool {
        if now < state.next_reset_at {
            return false;
        }
        state.remaining = self.daily_quota;
        state.next_reset_at = self.next_boundary_after(now);
        true
    }

    /// Read-only view of a user's quota at `now`.
    pub fn status(&self, stored: Option<QuotaState>, now: u64) -> QuotaState {
        match stored {
            Some(mut state) => {
                self.refresh(&mut state, now);
                state
            }
            None => self.initial(now),
        }
    }
}
