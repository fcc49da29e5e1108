//! Chooses between the alert overlay, a notice and the menu.
//!
//! The view is derived from model state on every call. Acknowledging an
//! alert only hides the overlay: the sensor stays open in the model, the
//! footer still reports it, and the next sensor message re-raises it.

use crate::menu::MenuView;
use crate::status::AlertState;
use crate::ui::Frame;

#[derive(Default)]
pub struct AlertPresenter {
    acknowledged: bool,
}

impl AlertPresenter {
    pub const fn new() -> Self {
        Self {
            acknowledged: false,
        }
    }

    /// A sensor message arrived: an alert that is still active shows again.
    pub fn on_sensor_update(&mut self) {
        self.acknowledged = false;
    }

    /// User pressed a button while looking at the screen. Returns `true` if
    /// this hid a visible alert.
    pub fn acknowledge(&mut self, alert: AlertState) -> bool {
        if alert.is_active() && !self.acknowledged {
            self.acknowledged = true;
            return true;
        }
        false
    }

    /// Whether the overlay would be drawn for this alert.
    pub fn overlay_visible(&self, alert: AlertState) -> bool {
        alert.is_active() && !self.acknowledged
    }

    /// Pick the frame: blank > alert > notice > menu.
    pub fn present<'a>(
        &self,
        awake: bool,
        alert: AlertState,
        notice: Option<&'a str>,
        menu: MenuView<'a>,
    ) -> Frame<'a> {
        if !awake {
            return Frame::Blank;
        }
        if self.overlay_visible(alert) {
            return Frame::Alert(alert.message());
        }
        match notice {
            Some(text) => Frame::Notice(text),
            None => Frame::Menu(menu),
        }
    }
}
