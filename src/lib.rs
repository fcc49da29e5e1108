//! Host-testable core of homepanel.
//!
//! Everything that decides *what* the dashboard does lives here: menu
//! navigation, door-sensor alerts, screen power, and the orchestrator that
//! ties them together, plus the ESP-AT codec used to reach the broker.
//! None of it touches hardware, so it builds and tests on the host.
//!
//! Usage: `cargo test --lib`
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and links against this library for all of its logic.

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are in scope for every module.
#[macro_use]
mod fmt;

pub mod alert;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod menu;
pub mod power;
pub mod power_logic;
pub mod status;

// Internal module paths for the implementations shared with the firmware's
// `ui` and `net` trees.
#[path = "ui/frame.rs"]
mod ui_frame_impl;
#[path = "ui/input_logic.rs"]
mod ui_input_logic_impl;

#[path = "net/at_parser.rs"]
mod net_at_parser_impl;
#[path = "net/outbox.rs"]
mod net_outbox_impl;
#[path = "net/event.rs"]
mod net_event_impl;

pub mod ui {
    pub use crate::ui_frame_impl::{ButtonEvent, Frame, Renderer};

    pub mod input_logic {
        pub use crate::ui_input_logic_impl::{scroll_to_show, step_wrapping};
    }
}

pub mod net {
    pub use crate::net_event_impl::{retain_messages, ModemEvent};
    pub use crate::net_outbox_impl::{Outbox, Publish, Transport};

    pub mod at {
        pub use crate::net_at_parser_impl::*;
    }
}

pub use dashboard::{Dashboard, DashboardConfig};
pub use error::Error;

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════
