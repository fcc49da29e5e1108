//! Menu tree and the navigation state machine.
//!
//! [`MenuTree`] is the single place that knows what each menu contains;
//! [`MenuController`] owns the cursor (menu, selection, scroll offset) and
//! turns button presses into navigation or into a [`MenuAction`] for the
//! dashboard to carry out.

use heapless::{String, Vec};

use crate::catalog::Catalog;
use crate::config::MAX_VISIBLE_CAPACITY;
use crate::ui::input_logic::{scroll_to_show, step_wrapping};

pub const BACK_LABEL: &str = "< Back";

const MAIN_ENTRIES: [(&str, EntryKind); 4] = [
    ("Devices", EntryKind::Open(MenuId::Devices)),
    ("Scenes", EntryKind::Open(MenuId::Scenes)),
    ("Power Off All", EntryKind::PowerOffAll),
    ("Exit", EntryKind::Exit),
];

/// The three menus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuId {
    Main,
    Devices,
    Scenes,
}

/// What a menu entry does when selected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EntryKind {
    Open(MenuId),
    PowerOffAll,
    Exit,
    Device(usize),
    Scene(usize),
    Back,
}

/// `{title, entries}` for one menu, resolved against the catalog.
#[derive(Clone, Copy)]
pub struct MenuDescriptor<'a> {
    pub menu: MenuId,
    pub title: &'static str,
    catalog: &'a Catalog,
}

impl<'a> MenuDescriptor<'a> {
    pub fn entry_count(&self) -> usize {
        match self.menu {
            MenuId::Main => MAIN_ENTRIES.len(),
            MenuId::Devices => self.catalog.devices().len() + 1,
            MenuId::Scenes => self.catalog.scenes().len() + 1,
        }
    }

    pub fn entry(&self, index: usize) -> Option<EntryKind> {
        if index >= self.entry_count() {
            return None;
        }
        let kind = match self.menu {
            MenuId::Main => MAIN_ENTRIES[index].1,
            _ if index + 1 == self.entry_count() => EntryKind::Back,
            MenuId::Devices => EntryKind::Device(index),
            MenuId::Scenes => EntryKind::Scene(index),
        };
        Some(kind)
    }

    pub fn label(&self, index: usize) -> Option<&'a str> {
        let label = match self.entry(index)? {
            EntryKind::Back => BACK_LABEL,
            EntryKind::Device(i) => self.catalog.device(i)?.name,
            EntryKind::Scene(i) => self.catalog.scene(i)?.name,
            _ => MAIN_ENTRIES[index].0,
        };
        Some(label)
    }
}

/// Static description of the menu hierarchy.
pub struct MenuTree;

impl MenuTree {
    pub fn describe(menu: MenuId, catalog: &Catalog) -> MenuDescriptor<'_> {
        let title = match menu {
            MenuId::Main => "Main Menu",
            MenuId::Devices => "Devices",
            MenuId::Scenes => "Scenes",
        };
        MenuDescriptor {
            menu,
            title,
            catalog,
        }
    }
}

/// Cursor position. Only [`MenuController`] mutates it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NavigationState {
    pub menu: MenuId,
    pub selected: usize,
    pub scroll_offset: usize,
}

impl NavigationState {
    pub const fn root() -> Self {
        Self {
            menu: MenuId::Main,
            selected: 0,
            scroll_offset: 0,
        }
    }
}

/// Side effect requested by a selection; navigation itself is already done.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuAction {
    /// Moved to another menu (or nothing further to do).
    Navigated,
    ToggleDevice(usize),
    ApplyScene(usize),
    PowerOffAll,
    Exit,
}

/// One visible row of a menu.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewEntry<'a> {
    pub label: &'a str,
    pub is_selected: bool,
}

/// Render request for a menu: title, visible rows, optional status footer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuView<'a> {
    pub title: &'static str,
    pub entries: Vec<ViewEntry<'a>, MAX_VISIBLE_CAPACITY>,
    pub footer: Option<String<32>>,
}

pub struct MenuController {
    nav: NavigationState,
    max_visible: usize,
}

impl MenuController {
    pub fn new(max_visible: usize) -> Self {
        Self {
            nav: NavigationState::root(),
            max_visible: max_visible.clamp(1, MAX_VISIBLE_CAPACITY),
        }
    }

    pub fn state(&self) -> NavigationState {
        self.nav
    }

    pub fn max_visible(&self) -> usize {
        self.max_visible
    }

    /// Move the selection by `step` (±1), wrapping, and keep it in view.
    pub fn handle_direction(&mut self, step: i32, catalog: &Catalog) {
        let count = MenuTree::describe(self.nav.menu, catalog).entry_count();
        self.nav.selected = step_wrapping(self.nav.selected, step, count);
        self.nav.scroll_offset =
            scroll_to_show(self.nav.selected, self.nav.scroll_offset, self.max_visible, count);
    }

    /// Apply the transition table for the selected entry.
    ///
    /// The cursor always ends at index 0 of the resulting menu.
    pub fn handle_select(&mut self, catalog: &Catalog) -> MenuAction {
        let descriptor = MenuTree::describe(self.nav.menu, catalog);
        let (menu, action) = match descriptor.entry(self.nav.selected) {
            Some(EntryKind::Open(target)) => (target, MenuAction::Navigated),
            Some(EntryKind::Back) => (MenuId::Main, MenuAction::Navigated),
            Some(EntryKind::PowerOffAll) => (self.nav.menu, MenuAction::PowerOffAll),
            Some(EntryKind::Exit) => (self.nav.menu, MenuAction::Exit),
            Some(EntryKind::Device(i)) => (self.nav.menu, MenuAction::ToggleDevice(i)),
            Some(EntryKind::Scene(i)) => (self.nav.menu, MenuAction::ApplyScene(i)),
            None => (self.nav.menu, MenuAction::Navigated),
        };

        self.nav = NavigationState {
            menu,
            selected: 0,
            scroll_offset: 0,
        };
        action
    }

    /// Rows currently visible, with the selection marked.
    pub fn view<'a>(&self, catalog: &'a Catalog) -> MenuView<'a> {
        let descriptor = MenuTree::describe(self.nav.menu, catalog);
        let end = (self.nav.scroll_offset + self.max_visible).min(descriptor.entry_count());

        let mut entries = Vec::new();
        for index in self.nav.scroll_offset..end {
            if let Some(label) = descriptor.label(index) {
                // max_visible is clamped to the buffer capacity.
                let _ = entries.push(ViewEntry {
                    label,
                    is_selected: index == self.nav.selected,
                });
            }
        }

        MenuView {
            title: descriptor.title,
            entries,
            footer: None,
        }
    }
}
