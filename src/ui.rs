//! Search / settings panel state.
//!
//! At most one panel is open at any time. Every operation that opens a
//! panel closes the other one.

/// Which panels are open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiState {
    search_open: bool,
    settings_open: bool,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State requested by a `?panel=search|settings` query parameter.
    ///
    /// Lets pages render with a panel already open when scripts are off.
    pub fn from_panel_query(panel: Option<&str>) -> Self {
        let mut state = Self::new();
        match panel {
            Some("search") => state.open_search(),
            Some("settings") => state.open_settings(),
            _ => {}
        }
        state
    }

    pub fn is_search_open(&self) -> bool {
        self.search_open
    }

    pub fn is_settings_open(&self) -> bool {
        self.settings_open
    }

    pub fn open_search(&mut self) {
        self.search_open = true;
        self.settings_open = false;
    }

    #[allow(unused)]
    pub fn close_search(&mut self) {
        self.search_open = false;
    }

    pub fn open_settings(&mut self) {
        self.settings_open = true;
        self.search_open = false;
    }

    #[allow(unused)]
    pub fn close_settings(&mut self) {
        self.settings_open = false;
    }

    #[allow(unused)]
    pub fn toggle_search(&mut self) {
        if self.search_open {
            self.close_search();
        } else {
            self.open_search();
        }
    }
}
