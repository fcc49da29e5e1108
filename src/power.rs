//! Screen power management - inactivity-driven sleep and wake.
//!
//! Two states, Awake and Asleep. Only direct user interaction wakes the
//! screen; inbound sensor messages never do, so a chattering sensor cannot
//! keep the panel lit. Time comes in as a monotonic millisecond count so
//! the controller stays host-testable.

use crate::power_logic;

/// Screen power state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    Awake,
    Asleep,
}

/// Transition reported to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerTransition {
    /// Woke up - repaint everything.
    Woke,
    /// Went to sleep - blank the panel and stop rendering.
    Slept,
}

/// Tracks activity and decides when the screen sleeps.
pub struct PowerController {
    state: PowerState,
    last_activity_ms: u64,
    timeout_ms: u64,
}

impl PowerController {
    pub fn new(now_ms: u64, timeout_ms: u64) -> Self {
        Self {
            state: PowerState::Awake,
            last_activity_ms: now_ms,
            timeout_ms,
        }
    }

    /// Record user activity (any button edge).
    pub fn on_activity(&mut self, now_ms: u64) -> Option<PowerTransition> {
        self.last_activity_ms = now_ms;
        if self.state == PowerState::Asleep {
            info!("Power: screen woke on user input");
            self.state = PowerState::Awake;
            return Some(PowerTransition::Woke);
        }
        None
    }

    /// Periodic check against the inactivity timeout.
    pub fn on_tick(&mut self, now_ms: u64, alert_active: bool) -> Option<PowerTransition> {
        let idle_ms = now_ms.saturating_sub(self.last_activity_ms);
        if power_logic::screen_should_sleep(self.is_awake(), alert_active, idle_ms, self.timeout_ms)
        {
            info!("Power: screen asleep after {} ms idle", idle_ms);
            self.state = PowerState::Asleep;
            return Some(PowerTransition::Slept);
        }
        None
    }

    /// Sleep right away (user chose Exit). Refused while an alert is active.
    pub fn force_sleep(&mut self, alert_active: bool) -> Option<PowerTransition> {
        if alert_active || self.state == PowerState::Asleep {
            return None;
        }
        info!("Power: screen asleep on request");
        self.state = PowerState::Asleep;
        Some(PowerTransition::Slept)
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    pub fn is_awake(&self) -> bool {
        self.state == PowerState::Awake
    }

    pub fn last_activity_ms(&self) -> u64 {
        self.last_activity_ms
    }
}
