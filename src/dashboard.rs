//! The orchestrator: owns all dashboard state and routes events.
//!
//! Three event sources feed it, always one at a time from the control
//! loop: button presses, inbound sensor messages and clock ticks. Each
//! event mutates the owning component, then the presenter picks a frame
//! and the renderer is called once. While the screen sleeps nothing is
//! drawn.

use core::fmt::Write;

use heapless::String;

use crate::alert::AlertPresenter;
use crate::catalog::Catalog;
use crate::config;
use crate::menu::{MenuAction, MenuController, NavigationState};
use crate::net::Transport;
use crate::power::{PowerController, PowerState, PowerTransition};
use crate::status::{AlertState, StatusModel};
use crate::ui::{ButtonEvent, Frame, Renderer};

/// Runtime knobs consumed once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DashboardConfig {
    pub screen_timeout_ms: u64,
    pub max_visible: usize,
    pub toggle_notice_ms: u64,
    pub scene_notice_ms: u64,
    pub power_off_notice_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            screen_timeout_ms: config::SCREEN_TIMEOUT_MS,
            max_visible: config::MAX_VISIBLE_ENTRIES,
            toggle_notice_ms: config::TOGGLE_NOTICE_MS,
            scene_notice_ms: config::SCENE_NOTICE_MS,
            power_off_notice_ms: config::POWER_OFF_NOTICE_MS,
        }
    }
}

/// Transient confirmation after an action.
struct Notice {
    text: String<48>,
    until_ms: u64,
}

pub struct Dashboard {
    cfg: DashboardConfig,
    catalog: Catalog,
    menu: MenuController,
    status: StatusModel,
    power: PowerController,
    presenter: AlertPresenter,
    notice: Option<Notice>,
    exit_requested: bool,
}

impl Dashboard {
    pub fn new(catalog: Catalog, cfg: DashboardConfig, now_ms: u64) -> Self {
        Self {
            cfg,
            catalog,
            menu: MenuController::new(cfg.max_visible),
            status: StatusModel::new(),
            power: PowerController::new(now_ms, cfg.screen_timeout_ms),
            presenter: AlertPresenter::new(),
            notice: None,
            exit_requested: false,
        }
    }

    /// First paint after boot.
    pub fn start<R: Renderer>(&mut self, renderer: &mut R) {
        renderer.set_power(true);
        self.render(renderer);
    }

    /// Route a button press: menu, then activity, then repaint.
    pub fn on_button<T, R>(&mut self, event: ButtonEvent, now_ms: u64, transport: &mut T, renderer: &mut R)
    where
        T: Transport,
        R: Renderer,
    {
        let was_awake = self.power.is_awake();
        // Any press dismisses a pending confirmation.
        self.notice = None;

        match event {
            ButtonEvent::Previous => self.menu.handle_direction(-1, &self.catalog),
            ButtonEvent::Next => self.menu.handle_direction(1, &self.catalog),
            ButtonEvent::Select => {
                let action = self.menu.handle_select(&self.catalog);
                self.perform(action, now_ms, transport);
            }
        }

        let transition = self.power.on_activity(now_ms);

        // The press that wakes the screen is not an acknowledgment: the
        // user has not seen the alert yet.
        if was_awake && self.presenter.acknowledge(self.status.alert()) {
            debug!("Alert acknowledged");
        }

        if transition == Some(PowerTransition::Woke) {
            renderer.set_power(true);
        }
        self.render(renderer);
    }

    /// Route an inbound message. Does not count as user activity.
    pub fn on_message<R: Renderer>(&mut self, topic: &str, payload: &[u8], renderer: &mut R) {
        let Some(alert) = self.status.apply_message(topic, payload) else {
            debug!("Ignoring message on {}", topic);
            return;
        };
        self.presenter.on_sensor_update();
        if alert.is_active() {
            info!("Alert: {}", alert.message());
        }
        self.render(renderer);
    }

    /// Periodic clock check: notice expiry and inactivity sleep.
    pub fn on_tick<R: Renderer>(&mut self, now_ms: u64, renderer: &mut R) {
        let notice_expired = match &self.notice {
            Some(notice) => now_ms >= notice.until_ms,
            None => false,
        };
        if notice_expired {
            self.notice = None;
        }

        match self.power.on_tick(now_ms, self.status.alert().is_active()) {
            Some(PowerTransition::Slept) => self.blank(renderer),
            _ if notice_expired => self.render(renderer),
            _ => {}
        }
    }

    /// Honor an Exit request: sleep now unless an alert is pending.
    pub fn suspend<R: Renderer>(&mut self, renderer: &mut R) {
        match self.power.force_sleep(self.status.alert().is_active()) {
            Some(PowerTransition::Slept) => self.blank(renderer),
            _ if self.status.alert().is_active() => warn!("Exit ignored while an alert is active"),
            _ => {}
        }
    }

    /// One-shot flag set when the user selects Exit.
    pub fn take_exit_request(&mut self) -> bool {
        core::mem::replace(&mut self.exit_requested, false)
    }

    /// Topics to subscribe after each broker (re)connect.
    pub fn subscriptions(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.status.subscriptions()
    }

    pub fn navigation(&self) -> NavigationState {
        self.menu.state()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn status(&self) -> &StatusModel {
        &self.status
    }

    pub fn alert(&self) -> AlertState {
        self.status.alert()
    }

    pub fn alert_visible(&self) -> bool {
        self.power.is_awake() && self.presenter.overlay_visible(self.status.alert())
    }

    pub fn power_state(&self) -> PowerState {
        self.power.state()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|n| n.text.as_str())
    }

    /// Current frame as the presenter sees it.
    pub fn frame(&self) -> Frame<'_> {
        let mut view = self.menu.view(&self.catalog);
        view.footer = Some(self.status.status_line());
        self.presenter.present(
            self.power.is_awake(),
            self.status.alert(),
            self.notice(),
            view,
        )
    }

    /// Repaint the current frame, e.g. after the firmware drew over it.
    pub fn refresh<R: Renderer>(&self, renderer: &mut R) {
        self.render(renderer);
    }

    fn render<R: Renderer>(&self, renderer: &mut R) {
        if !self.power.is_awake() {
            return;
        }
        renderer.render(&self.frame());
    }

    fn blank<R: Renderer>(&self, renderer: &mut R) {
        renderer.render(&Frame::Blank);
        renderer.set_power(false);
    }

    fn perform<T: Transport>(&mut self, action: MenuAction, now_ms: u64, transport: &mut T) {
        match action {
            MenuAction::Navigated => {}
            MenuAction::ToggleDevice(index) => {
                let Some(active) = self.catalog.toggle(index) else {
                    return;
                };
                let Some(device) = self.catalog.device(index) else {
                    return;
                };
                let payload = if active {
                    config::DEVICE_ON_PAYLOAD
                } else {
                    config::DEVICE_OFF_PAYLOAD
                };
                info!("Toggling device: {} {}", device.name, payload);
                publish(transport, device.control_topic, payload);

                let mut text = String::new();
                let _ = write!(text, "{} {}", device.name, payload);
                self.show_notice(text, now_ms + self.cfg.toggle_notice_ms);
            }
            MenuAction::ApplyScene(index) => {
                let Some(scene) = self.catalog.scene(index).copied() else {
                    return;
                };
                info!("Applying scene: {}", scene.name);
                publish(transport, config::SCENES_CONTROL_TOPIC, scene.name);

                let mut text = String::new();
                let _ = write!(text, "Scene: {}", scene.name);
                self.show_notice(text, now_ms + self.cfg.scene_notice_ms);
            }
            MenuAction::PowerOffAll => {
                self.catalog.deactivate_all();
                for device in self.catalog.devices() {
                    info!("Turning off device: {}", device.name);
                    publish(transport, device.control_topic, config::DEVICE_OFF_PAYLOAD);
                }

                let mut text = String::new();
                let _ = text.push_str("All Devices Off");
                self.show_notice(text, now_ms + self.cfg.power_off_notice_ms);
            }
            MenuAction::Exit => {
                info!("Exit requested");
                self.exit_requested = true;
            }
        }
    }

    fn show_notice(&mut self, text: String<48>, until_ms: u64) {
        self.notice = Some(Notice { text, until_ms });
    }
}

fn publish<T: Transport>(transport: &mut T, topic: &str, payload: &str) {
    if let Err(e) = transport.publish(topic, payload) {
        warn!("Publish to {} failed: {:?}", topic, e);
    }
}
