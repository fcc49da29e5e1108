//! Application-wide constants and compile-time configuration.
//!
//! Topics, the device/scene catalogs, timing parameters and the
//! hardware pin map all live here so they can be tuned in one place.
//! Credentials are read from the build environment so they never end up
//! in the source tree.

use crate::catalog::DeviceSpec;

// Credentials

const fn env_or(value: Option<&'static str>, default: &'static str) -> &'static str {
    match value {
        Some(v) => v,
        None => default,
    }
}

/// Wi-Fi network joined by the modem (`HOMEPANEL_WIFI_SSID`).
pub const WIFI_SSID: &str = env_or(option_env!("HOMEPANEL_WIFI_SSID"), "");
pub const WIFI_PASSWORD: &str = env_or(option_env!("HOMEPANEL_WIFI_PASSWORD"), "");

/// MQTT broker host name or IP (`HOMEPANEL_MQTT_HOST`).
pub const MQTT_HOST: &str = env_or(option_env!("HOMEPANEL_MQTT_HOST"), "192.168.1.10");

/// MQTT broker port as text (`HOMEPANEL_MQTT_PORT`), parsed at connect time.
pub const MQTT_PORT: &str = env_or(option_env!("HOMEPANEL_MQTT_PORT"), "1883");

/// Empty user means an anonymous broker connection.
pub const MQTT_USER: &str = env_or(option_env!("HOMEPANEL_MQTT_USER"), "");
pub const MQTT_PASSWORD: &str = env_or(option_env!("HOMEPANEL_MQTT_PASSWORD"), "");

/// Client identifier presented to the broker.
pub const MQTT_CLIENT_ID: &str = "homepanel";

// Topics

pub const FRIDGE_STATUS_TOPIC: &str = "home/m5stack/core2/fridge_door/status";
pub const FREEZER_STATUS_TOPIC: &str = "home/m5stack/core2/freezer_door/status";
pub const SCENES_CONTROL_TOPIC: &str = "home/m5stack/core2/scenes/control";

/// Payload that marks a door sensor as open (compared case-insensitively).
pub const SENSOR_OPEN_PAYLOAD: &str = "OPEN";

pub const DEVICE_ON_PAYLOAD: &str = "ON";
pub const DEVICE_OFF_PAYLOAD: &str = "OFF";

// Catalogs

/// Upper bound on catalog sizes (menus are sized at compile time).
pub const MAX_DEVICES: usize = 8;
pub const MAX_SCENES: usize = 16;

pub const DEVICES: [DeviceSpec; 6] = [
    DeviceSpec::new("Hallway Lights", "home/m5stack/core2/devices/hallway/control"),
    DeviceSpec::new("Living Room Tree", "home/m5stack/core2/devices/living_tree/control"),
    DeviceSpec::new("Left Lamp", "home/m5stack/core2/devices/left_lamp/control"),
    DeviceSpec::new("Right Lamp 1", "home/m5stack/core2/devices/right_lamp1/control"),
    DeviceSpec::new("Right Lamp 2", "home/m5stack/core2/devices/right_lamp2/control"),
    DeviceSpec::new("Spotlight", "home/m5stack/core2/devices/spotlight/control"),
];

pub const SCENES: [&str; 10] = [
    "Bright/Normal",
    "Christmas",
    "Freezer/Fridge",
    "Seahawks",
    "Sounders",
    "Vibes",
    "Warm",
    "Warm Bright",
    "Custom Scene 1",
    "Custom Scene 2",
];

// Screen & timing

/// Inactivity before the OLED is put to sleep (ms).
pub const SCREEN_TIMEOUT_MS: u64 = 30_000;

/// Menu rows that fit between the title line and the status bar
/// on the 128×64 panel with a 6×10 font.
pub const MAX_VISIBLE_ENTRIES: usize = 4;

/// Hard cap on the visible window (render buffers are sized to this).
pub const MAX_VISIBLE_CAPACITY: usize = 8;

/// How long action confirmations stay on screen (ms).
pub const TOGGLE_NOTICE_MS: u64 = 1_000;
pub const SCENE_NOTICE_MS: u64 = 2_000;
pub const POWER_OFF_NOTICE_MS: u64 = 2_000;

/// Delay between broker/Wi-Fi connection attempts (ms).
pub const RECONNECT_DELAY_MS: u64 = 5_000;

/// How long to wait for the modem to answer a single AT command (ms).
pub const MODEM_COMMAND_TIMEOUT_MS: u64 = 10_000;

/// Wi-Fi association can take a while on first boot (ms).
pub const WIFI_JOIN_TIMEOUT_MS: u64 = 20_000;

/// Control loop poll period (ms).
pub const LOOP_PERIOD_MS: u64 = 10;

/// Outbound publishes buffered between loop flushes.
pub const OUTBOX_CAPACITY: usize = 8;

// GPIO pin assignments (nRF52840-DK defaults)
//
// Logical names only; the `embassy_nrf::peripherals::*` types are picked
// in `main.rs`.
//
//   Button UP      → P0.11
//   Button DOWN    → P0.12
//   Button SELECT  → P0.24
//   I²C SDA        → P0.26
//   I²C SCL        → P0.27
//   Modem UART TX  → P0.06
//   Modem UART RX  → P0.08

/// Button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

/// ESP-AT firmware default baud rate.
pub const MODEM_BAUD: u32 = 115_200;
