//! Integration tests for the dashboard state machine, driven through
//! recording fakes of the display and the transport.

use homepanel::catalog::Catalog;
use homepanel::config::{FREEZER_STATUS_TOPIC, FRIDGE_STATUS_TOPIC, SCENES_CONTROL_TOPIC};
use homepanel::menu::MenuId;
use homepanel::net::Transport;
use homepanel::power::PowerState;
use homepanel::ui::{ButtonEvent, Frame, Renderer};
use homepanel::{Dashboard, DashboardConfig, Error};

#[derive(Debug, Clone, PartialEq)]
enum Drawn {
    Menu {
        title: String,
        labels: Vec<String>,
        selected: Option<usize>,
        footer: Option<String>,
    },
    Alert(String),
    Notice(String),
    Blank,
}

#[derive(Default)]
struct RecordingRenderer {
    frames: Vec<Drawn>,
    power: Vec<bool>,
}

impl RecordingRenderer {
    fn last(&self) -> &Drawn {
        self.frames.last().expect("nothing rendered")
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, frame: &Frame<'_>) {
        let drawn = match frame {
            Frame::Menu(view) => Drawn::Menu {
                title: view.title.to_string(),
                labels: view.entries.iter().map(|e| e.label.to_string()).collect(),
                selected: view.entries.iter().position(|e| e.is_selected),
                footer: view.footer.as_ref().map(|f| f.to_string()),
            },
            Frame::Alert(message) => Drawn::Alert(message.to_string()),
            Frame::Notice(text) => Drawn::Notice(text.to_string()),
            Frame::Blank => Drawn::Blank,
        };
        self.frames.push(drawn);
    }

    fn set_power(&mut self, on: bool) {
        self.power.push(on);
    }
}

#[derive(Default)]
struct RecordingTransport {
    published: Vec<(String, String)>,
    fail: bool,
}

impl Transport for RecordingTransport {
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), Error> {
        if self.fail {
            return Err(Error::NotConnected);
        }
        self.published.push((topic.to_string(), payload.to_string()));
        Ok(())
    }
}

struct Rig {
    dash: Dashboard,
    display: RecordingRenderer,
    net: RecordingTransport,
    now: u64,
}

impl Rig {
    fn new() -> Self {
        let mut rig = Rig {
            dash: Dashboard::new(Catalog::default(), DashboardConfig::default(), 0),
            display: RecordingRenderer::default(),
            net: RecordingTransport::default(),
            now: 0,
        };
        rig.dash.start(&mut rig.display);
        rig
    }

    fn press(&mut self, event: ButtonEvent) {
        self.now += 100;
        self.dash
            .on_button(event, self.now, &mut self.net, &mut self.display);
    }

    fn message(&mut self, topic: &str, payload: &str) {
        self.dash
            .on_message(topic, payload.as_bytes(), &mut self.display);
    }

    fn advance(&mut self, ms: u64) {
        self.now += ms;
        self.dash.on_tick(self.now, &mut self.display);
    }
}

#[test]
fn boot_renders_main_menu_with_status_bar() {
    let rig = Rig::new();
    assert_eq!(rig.display.power, vec![true]);
    assert_eq!(
        rig.display.last(),
        &Drawn::Menu {
            title: "Main Menu".into(),
            labels: vec![
                "Devices".into(),
                "Scenes".into(),
                "Power Off All".into(),
                "Exit".into()
            ],
            selected: Some(0),
            footer: Some("FRZR:CLOSED FRDG:CLOSED".into()),
        }
    );
}

#[test]
fn each_button_press_renders_exactly_once() {
    let mut rig = Rig::new();
    let before = rig.display.frames.len();
    rig.press(ButtonEvent::Next);
    rig.press(ButtonEvent::Previous);
    rig.press(ButtonEvent::Select);
    assert_eq!(rig.display.frames.len(), before + 3);
}

#[test]
fn devices_menu_wraps_through_back_entry() {
    let mut rig = Rig::new();
    rig.press(ButtonEvent::Select); // Devices
    assert_eq!(rig.dash.navigation().menu, MenuId::Devices);

    for _ in 0..6 {
        rig.press(ButtonEvent::Next);
    }
    // Index 6 is Back; entryCount = 7.
    assert_eq!(rig.dash.navigation().selected, 6);
    rig.press(ButtonEvent::Next);
    assert_eq!(rig.dash.navigation().selected, 0);
    assert_eq!(rig.dash.navigation().scroll_offset, 0);
}

#[test]
fn toggling_a_device_publishes_on_then_off() {
    let mut rig = Rig::new();
    rig.press(ButtonEvent::Select); // Devices
    rig.press(ButtonEvent::Next);
    rig.press(ButtonEvent::Next);
    rig.press(ButtonEvent::Select); // Left Lamp

    let topic = "home/m5stack/core2/devices/left_lamp/control".to_string();
    assert_eq!(rig.net.published, vec![(topic.clone(), "ON".to_string())]);
    assert!(rig.dash.catalog().devices()[2].is_active);
    assert_eq!(rig.display.last(), &Drawn::Notice("Left Lamp ON".into()));

    // Selection resets to 0 after an action; walk back to index 2.
    rig.press(ButtonEvent::Next);
    rig.press(ButtonEvent::Next);
    rig.press(ButtonEvent::Select);
    assert_eq!(rig.net.published[1], (topic, "OFF".to_string()));
    assert!(!rig.dash.catalog().devices()[2].is_active);
    assert_eq!(rig.dash.navigation().menu, MenuId::Devices);
}

#[test]
fn power_off_all_publishes_off_everywhere_and_stays_on_main() {
    let mut rig = Rig::new();
    rig.press(ButtonEvent::Select); // Devices
    rig.press(ButtonEvent::Select); // Hallway Lights ON
    rig.press(ButtonEvent::Previous); // Back
    rig.press(ButtonEvent::Select);
    assert_eq!(rig.dash.navigation().menu, MenuId::Main);
    rig.net.published.clear();

    rig.press(ButtonEvent::Next);
    rig.press(ButtonEvent::Next);
    rig.press(ButtonEvent::Select); // Power Off All

    assert_eq!(rig.net.published.len(), 6);
    assert!(rig.net.published.iter().all(|(_, payload)| payload == "OFF"));
    assert!(rig.dash.catalog().devices().iter().all(|d| !d.is_active));
    assert_eq!(rig.dash.navigation().menu, MenuId::Main);
    assert_eq!(rig.display.last(), &Drawn::Notice("All Devices Off".into()));
}

#[test]
fn scene_name_is_published_verbatim() {
    let mut rig = Rig::new();
    rig.press(ButtonEvent::Next);
    rig.press(ButtonEvent::Select); // Scenes
    rig.press(ButtonEvent::Next);
    rig.press(ButtonEvent::Select); // Christmas

    assert_eq!(
        rig.net.published,
        vec![(SCENES_CONTROL_TOPIC.to_string(), "Christmas".to_string())]
    );
    assert_eq!(rig.display.last(), &Drawn::Notice("Scene: Christmas".into()));
}

#[test]
fn notice_expires_on_tick_and_menu_returns() {
    let mut rig = Rig::new();
    rig.press(ButtonEvent::Select); // Devices
    rig.press(ButtonEvent::Select); // toggle
    let frames = rig.display.frames.len();

    rig.advance(500);
    assert_eq!(rig.display.frames.len(), frames);
    rig.advance(600);
    assert_eq!(rig.display.frames.len(), frames + 1);
    assert!(matches!(rig.display.last(), Drawn::Menu { title, .. } if title == "Devices"));
    assert_eq!(rig.dash.notice(), None);
}

#[test]
fn button_press_dismisses_pending_notice() {
    let mut rig = Rig::new();
    rig.press(ButtonEvent::Select); // Devices
    rig.press(ButtonEvent::Select); // Hallway Lights ON
    assert_eq!(rig.dash.notice(), Some("Hallway Lights ON"));

    // Well inside the 1 s notice window.
    rig.press(ButtonEvent::Next);
    assert_eq!(rig.dash.notice(), None);
    assert_eq!(
        rig.display.last(),
        &Drawn::Menu {
            title: "Devices".into(),
            labels: vec![
                "Hallway Lights".into(),
                "Living Room Tree".into(),
                "Left Lamp".into(),
                "Right Lamp 1".into(),
            ],
            selected: Some(1),
            footer: Some("FRZR:CLOSED FRDG:CLOSED".into()),
        }
    );

    // Nothing left to expire.
    let frames = rig.display.frames.len();
    rig.advance(2_000);
    assert_eq!(rig.display.frames.len(), frames);
}

#[test]
fn publish_failure_still_updates_local_state() {
    let mut rig = Rig::new();
    rig.net.fail = true;
    rig.press(ButtonEvent::Select);
    rig.press(ButtonEvent::Select);
    assert!(rig.dash.catalog().devices()[0].is_active);
    assert!(rig.net.published.is_empty());
}

#[test]
fn fridge_open_in_any_case_raises_alert_and_closed_clears_it() {
    for payload in ["OPEN", "open", "Open"] {
        let mut rig = Rig::new();
        rig.message(FRIDGE_STATUS_TOPIC, payload);
        assert!(rig.dash.alert().is_active());
        assert_eq!(rig.dash.alert().message(), "Fridge Door Open!");
        assert_eq!(rig.display.last(), &Drawn::Alert("Fridge Door Open!".into()));

        rig.message(FRIDGE_STATUS_TOPIC, "CLOSED");
        assert!(!rig.dash.alert().is_active());
        assert_eq!(rig.dash.alert().message(), "");
        assert!(matches!(rig.display.last(), Drawn::Menu { .. }));
    }
}

#[test]
fn messages_on_unknown_topics_do_not_render() {
    let mut rig = Rig::new();
    let frames = rig.display.frames.len();
    rig.message("home/m5stack/core2/unknown", "OPEN");
    assert_eq!(rig.display.frames.len(), frames);
    assert!(!rig.dash.alert().is_active());
}

#[test]
fn messages_do_not_reset_inactivity_timer() {
    let mut rig = Rig::new();
    rig.advance(20_000);
    rig.message(FRIDGE_STATUS_TOPIC, "CLOSED");
    rig.advance(10_001);
    assert_eq!(rig.dash.power_state(), PowerState::Asleep);
    assert_eq!(rig.display.last(), &Drawn::Blank);
    assert_eq!(rig.display.power.last(), Some(&false));
}

#[test]
fn screen_never_sleeps_while_alert_is_active() {
    let mut rig = Rig::new();
    rig.message(FREEZER_STATUS_TOPIC, "OPEN");
    for _ in 0..100 {
        rig.advance(60_000);
        assert_eq!(rig.dash.power_state(), PowerState::Awake);
    }

    // Acknowledged alerts still keep the screen on.
    rig.press(ButtonEvent::Next);
    assert!(!rig.dash.alert_visible());
    rig.advance(120_000);
    assert_eq!(rig.dash.power_state(), PowerState::Awake);

    rig.message(FREEZER_STATUS_TOPIC, "CLOSED");
    rig.advance(30_001);
    assert_eq!(rig.dash.power_state(), PowerState::Asleep);
}

#[test]
fn button_press_acknowledges_alert_without_closing_sensor() {
    let mut rig = Rig::new();
    rig.message(FRIDGE_STATUS_TOPIC, "OPEN");
    rig.press(ButtonEvent::Next);

    assert!(rig.dash.alert().is_active());
    assert!(!rig.dash.alert_visible());
    assert_eq!(
        rig.display.last(),
        &Drawn::Menu {
            title: "Main Menu".into(),
            labels: vec![
                "Devices".into(),
                "Scenes".into(),
                "Power Off All".into(),
                "Exit".into()
            ],
            selected: Some(1),
            footer: Some("FRZR:CLOSED FRDG:OPEN".into()),
        }
    );

    // Same value again re-raises the overlay.
    rig.message(FRIDGE_STATUS_TOPIC, "OPEN");
    assert_eq!(rig.display.last(), &Drawn::Alert("Fridge Door Open!".into()));
}

#[test]
fn most_recent_open_sensor_wins_and_fallback_on_close() {
    let mut rig = Rig::new();
    rig.message(FRIDGE_STATUS_TOPIC, "OPEN");
    rig.message(FREEZER_STATUS_TOPIC, "OPEN");
    assert_eq!(rig.display.last(), &Drawn::Alert("Freezer Door Open!".into()));

    rig.message(FREEZER_STATUS_TOPIC, "CLOSED");
    assert_eq!(rig.display.last(), &Drawn::Alert("Fridge Door Open!".into()));
}

#[test]
fn sleep_then_wake_restores_menu_position() {
    let mut rig = Rig::new();
    rig.press(ButtonEvent::Next);
    rig.press(ButtonEvent::Select); // Scenes
    for _ in 0..5 {
        rig.press(ButtonEvent::Next);
    }
    let before = rig.dash.navigation();

    rig.advance(30_001);
    assert_eq!(rig.dash.power_state(), PowerState::Asleep);
    assert_eq!(rig.dash.navigation(), before);

    // Messages while asleep update the model but draw nothing.
    let frames = rig.display.frames.len();
    rig.message(FRIDGE_STATUS_TOPIC, "OPEN");
    assert_eq!(rig.display.frames.len(), frames);
    assert_eq!(rig.dash.power_state(), PowerState::Asleep);

    // The waking press shows the alert that arrived while asleep.
    rig.press(ButtonEvent::Previous);
    assert_eq!(rig.dash.power_state(), PowerState::Awake);
    assert_eq!(rig.display.power.last(), Some(&true));
    assert_eq!(rig.display.last(), &Drawn::Alert("Fridge Door Open!".into()));
    assert_eq!(rig.dash.navigation().menu, MenuId::Scenes);
    assert_eq!(rig.dash.navigation().selected, before.selected - 1);
}

#[test]
fn exit_request_suspends_the_screen() {
    let mut rig = Rig::new();
    rig.press(ButtonEvent::Previous); // Exit (wraps to index 3)
    rig.press(ButtonEvent::Select);
    assert!(rig.dash.take_exit_request());
    assert!(!rig.dash.take_exit_request());

    rig.dash.suspend(&mut rig.display);
    assert_eq!(rig.dash.power_state(), PowerState::Asleep);
    assert_eq!(rig.display.last(), &Drawn::Blank);

    rig.press(ButtonEvent::Next);
    assert_eq!(rig.dash.power_state(), PowerState::Awake);
}

#[test]
fn exit_is_refused_while_alert_is_active() {
    let mut rig = Rig::new();
    rig.message(FRIDGE_STATUS_TOPIC, "OPEN");
    rig.dash.suspend(&mut rig.display);
    assert_eq!(rig.dash.power_state(), PowerState::Awake);
}
