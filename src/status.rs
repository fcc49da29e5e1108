//! Door sensor status and the alert condition derived from it.
//!
//! Pure data + derivation, no I/O. Each sensor latches the last value its
//! topic delivered. The alert is active iff at least one sensor is open;
//! when several are open the most recently changed one names the alert.

use core::fmt::Write;

use heapless::String;

use crate::config::{FREEZER_STATUS_TOPIC, FRIDGE_STATUS_TOPIC, SENSOR_OPEN_PAYLOAD};

/// Monitored door sensors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorId {
    Fridge,
    Freezer,
}

pub const SENSOR_COUNT: usize = 2;

impl SensorId {
    pub const ALL: [SensorId; SENSOR_COUNT] = [SensorId::Fridge, SensorId::Freezer];

    fn index(self) -> usize {
        match self {
            SensorId::Fridge => 0,
            SensorId::Freezer => 1,
        }
    }

    pub fn status_topic(self) -> &'static str {
        match self {
            SensorId::Fridge => FRIDGE_STATUS_TOPIC,
            SensorId::Freezer => FREEZER_STATUS_TOPIC,
        }
    }

    pub fn alert_text(self) -> &'static str {
        match self {
            SensorId::Fridge => "Fridge Door Open!",
            SensorId::Freezer => "Freezer Door Open!",
        }
    }

    /// Short label for the status bar.
    pub fn short_label(self) -> &'static str {
        match self {
            SensorId::Fridge => "FRDG",
            SensorId::Freezer => "FRZR",
        }
    }

    /// Map an inbound topic to its sensor. Unknown topics yield `None`.
    pub fn from_topic(topic: &str) -> Option<SensorId> {
        Self::ALL.into_iter().find(|s| s.status_topic() == topic)
    }
}

/// Decode a sensor payload: trimmed, case-insensitive `OPEN` means open.
pub fn payload_is_open(payload: &[u8]) -> bool {
    match core::str::from_utf8(payload) {
        Ok(text) => text.trim().eq_ignore_ascii_case(SENSOR_OPEN_PAYLOAD),
        Err(_) => false,
    }
}

/// Derived alert condition. Never stored on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlertState {
    source: Option<SensorId>,
}

impl AlertState {
    pub const CLEAR: AlertState = AlertState { source: None };

    pub fn is_active(&self) -> bool {
        self.source.is_some()
    }

    /// The sensor that names the alert, if any.
    pub fn source(&self) -> Option<SensorId> {
        self.source
    }

    /// Alert text; empty iff no sensor is open.
    pub fn message(&self) -> &'static str {
        self.source.map(SensorId::alert_text).unwrap_or("")
    }
}

/// Latched per-sensor state.
#[derive(Clone, Copy, Debug, Default)]
struct SensorState {
    is_open: bool,
    /// Sequence number of the last open/closed transition.
    changed_at: u32,
}

pub struct StatusModel {
    sensors: [SensorState; SENSOR_COUNT],
    seq: u32,
}

impl StatusModel {
    pub const fn new() -> Self {
        Self {
            sensors: [SensorState {
                is_open: false,
                changed_at: 0,
            }; SENSOR_COUNT],
            seq: 0,
        }
    }

    /// Topics to subscribe after every broker (re)connect.
    pub fn subscriptions(&self) -> impl Iterator<Item = &'static str> {
        SensorId::ALL.into_iter().map(SensorId::status_topic)
    }

    pub fn is_open(&self, sensor: SensorId) -> bool {
        self.sensors[sensor.index()].is_open
    }

    /// Latch a sensor value and return the new derived alert.
    pub fn update_sensor(&mut self, sensor: SensorId, is_open: bool) -> AlertState {
        let state = &mut self.sensors[sensor.index()];
        if state.is_open != is_open {
            self.seq = self.seq.wrapping_add(1);
            state.is_open = is_open;
            state.changed_at = self.seq;
            info!(
                "Status: {} {}",
                sensor.short_label(),
                if is_open { "OPEN" } else { "CLOSED" }
            );
        }
        self.alert()
    }

    /// Route an inbound message. Returns `None` for topics we don't watch.
    pub fn apply_message(&mut self, topic: &str, payload: &[u8]) -> Option<AlertState> {
        let sensor = SensorId::from_topic(topic)?;
        Some(self.update_sensor(sensor, payload_is_open(payload)))
    }

    /// Current alert: the open sensor with the newest transition wins.
    pub fn alert(&self) -> AlertState {
        let source = SensorId::ALL
            .into_iter()
            .filter(|s| self.sensors[s.index()].is_open)
            .max_by_key(|s| self.sensors[s.index()].changed_at);
        AlertState { source }
    }

    /// Status bar text, e.g. `FRZR:OPEN FRDG:CLOSED`.
    pub fn status_line(&self) -> String<32> {
        let mut line = String::new();
        for (i, sensor) in [SensorId::Freezer, SensorId::Fridge].into_iter().enumerate() {
            let state = if self.is_open(sensor) { "OPEN" } else { "CLOSED" };
            let sep = if i == 0 { "" } else { " " };
            // 32 bytes always fits two labels.
            let _ = write!(line, "{}{}:{}", sep, sensor.short_label(), state);
        }
        line
    }
}

impl Default for StatusModel {
    fn default() -> Self {
        Self::new()
    }
}
