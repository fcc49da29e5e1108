use crate::menu::MenuView;

/// Logical button events (after debouncing).
///
/// Three buttons: Previous/Next move the cursor, Select acts on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    Previous,
    Select,
    Next,
}

/// What the screen should show. Exactly one frame is drawn per event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame<'a> {
    /// Normal menu with status footer.
    Menu(MenuView<'a>),
    /// Full-screen alert overlay; replaces the menu entirely.
    Alert(&'static str),
    /// Short-lived action confirmation.
    Notice(&'a str),
    /// Screen blanked for sleep.
    Blank,
}

/// Display collaborator. The dashboard is its only caller.
pub trait Renderer {
    fn render(&mut self, frame: &Frame<'_>);

    /// Panel power; `false` puts the display to sleep.
    fn set_power(&mut self, on: bool);
}
