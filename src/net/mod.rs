//! Network subsystem - MQTT through an ESP-AT Wi-Fi co-processor.
//!
//! The nRF52840 has no Wi-Fi of its own. An ESP32 running Espressif's AT
//! firmware sits on UARTE0 and does Wi-Fi + MQTT for us:
//!
//! 1. **RX task** - assembles UART bytes into lines, parses them with
//!    [`homepanel::net::at`] and forwards owned [`homepanel::net::ModemEvent`]s.
//! 2. **Modem** - sends commands, waits for `OK`/`ERROR`, and runs the
//!    Wi-Fi join / broker connect / subscribe sequence.
//!
//! Publishes are queued in [`homepanel::net::Outbox`] by the dashboard and
//! flushed here by the control loop.

pub mod modem;
