use heapless::{Deque, String, Vec};

use crate::net::at::AtEvent;

/// Owned form of [`AtEvent`] that can cross a channel.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModemEvent {
    Ok,
    Error,
    Busy,
    WifiUp,
    WifiDown,
    BrokerUp,
    BrokerDown,
    /// Modem rebooted; Wi-Fi and broker sessions are gone.
    Reset,
    Message {
        topic: String<64>,
        payload: Vec<u8, 32>,
    },
}

impl ModemEvent {
    /// Convert a parsed line. `WIFI CONNECTED` (association without an
    /// address yet) and oversized messages yield `None`.
    pub fn from_at(event: AtEvent<'_>) -> Option<Self> {
        let owned = match event {
            AtEvent::Ok => ModemEvent::Ok,
            AtEvent::Error => ModemEvent::Error,
            AtEvent::Busy => ModemEvent::Busy,
            AtEvent::WifiConnected => return None,
            AtEvent::WifiGotIp => ModemEvent::WifiUp,
            AtEvent::WifiDisconnected => ModemEvent::WifiDown,
            AtEvent::MqttConnected => ModemEvent::BrokerUp,
            AtEvent::MqttDisconnected => ModemEvent::BrokerDown,
            AtEvent::Ready => ModemEvent::Reset,
            AtEvent::Message { topic, payload } => {
                let mut t = String::new();
                let mut p = Vec::new();
                if t.push_str(topic).is_err() || p.extend_from_slice(payload).is_err() {
                    warn!("Modem: dropping oversized message on {}", topic);
                    return None;
                }
                ModemEvent::Message {
                    topic: t,
                    payload: p,
                }
            }
        };
        Some(owned)
    }

    /// The broker link is gone and must be re-established.
    pub fn is_link_lost(&self) -> bool {
        matches!(
            self,
            ModemEvent::WifiDown | ModemEvent::BrokerDown | ModemEvent::Reset
        )
    }
}

/// Drop everything but inbound messages, keeping their order.
///
/// Called once a connect sequence has succeeded: link transitions seen
/// while it ran (the drop that triggered it, the disconnect `AT+CWJAP`
/// reports on an associated station) are already superseded.
pub fn retain_messages<const N: usize>(events: &mut Deque<ModemEvent, N>) {
    for _ in 0..events.len() {
        if let Some(event) = events.pop_front() {
            if matches!(event, ModemEvent::Message { .. }) {
                // One slot was just freed.
                let _ = events.push_back(event);
            }
        }
    }
}
