//! User interface hardware - OLED display + physical buttons.
//!
//! The menu/alert state machine itself lives in the library
//! (`homepanel::dashboard`); this module only turns frames into pixels
//! and GPIO edges into [`homepanel::ui::ButtonEvent`]s.
//!
//! ## Components
//!
//! - **Display**: SSD1306 128×64 OLED via I²C
//! - **Buttons**: 3 tactile switches with debouncing (UP, DOWN, SELECT)

pub mod buttons;
pub mod display;
