//! Reader preferences: site theme, typography and code appearance.
//!
//! [`SettingsStore`] owns the current [`Settings`] plus a storage backend and
//! a presentation surface. While it observes (interactive context, not
//! detached), every batch of changes is committed as `save()` then
//! `apply()`, exactly once per batch and only if something changed.
//!
//! In a server context the store is inert: nothing is loaded and mutations
//! never persist. Page rendering calls `load()` + `apply()` explicitly.

pub mod storage;
pub mod surface;

pub use storage::{FileStorage, SettingsStorage, StorageError};
#[cfg(test)]
pub use storage::MemoryStorage;
pub use surface::{PresentationSurface, RootElement};

use crate::log;
use clap::ValueEnum;
use educe::Educe;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::{fmt, str::FromStr};
use thiserror::Error;

mod defaults {
    use super::ThemeMode;

    pub fn theme() -> ThemeMode {
        ThemeMode::Light
    }
    pub fn font_size() -> f64 {
        16.0
    }
    pub fn letter_spacing() -> f64 {
        0.0
    }
    pub fn line_height() -> f64 {
        1.5
    }
    pub fn code_theme() -> ThemeMode {
        ThemeMode::Dark
    }
    pub fn code_scheme() -> String {
        "monokai".into()
    }
    pub fn code_font_size() -> f64 {
        14.0
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("failed to serialize settings")]
    Json(#[from] serde_json::Error),

    #[error("invalid value `{value}` for `{field}`")]
    InvalidValue { field: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(()),
        }
    }
}

/// The nine persisted fields. Site and code typography are independent.
#[derive(Debug, Clone, PartialEq, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[educe(Default = defaults::theme())]
    pub theme: ThemeMode,

    /// px
    #[educe(Default = defaults::font_size())]
    pub font_size: f64,

    /// px
    #[educe(Default = defaults::letter_spacing())]
    pub letter_spacing: f64,

    /// Unitless multiplier.
    #[educe(Default = defaults::line_height())]
    pub line_height: f64,

    #[educe(Default = defaults::code_theme())]
    pub code_theme: ThemeMode,

    /// Named color scheme for code blocks.
    #[educe(Default = defaults::code_scheme())]
    pub code_scheme: String,

    #[educe(Default = defaults::code_font_size())]
    pub code_font_size: f64,

    #[educe(Default = defaults::letter_spacing())]
    pub code_letter_spacing: f64,

    #[educe(Default = defaults::line_height())]
    pub code_line_height: f64,
}

impl Settings {
    /// Rebuild settings from a stored JSON object.
    ///
    /// Each field is taken when present, non-null and well-typed, otherwise
    /// it keeps its default. Unknown keys are ignored.
    pub fn from_stored(map: &Map<String, Value>) -> Self {
        let defaults = Self::default();
        Self {
            theme: stored(map, "theme").unwrap_or(defaults.theme),
            font_size: stored_number(map, "fontSize").unwrap_or(defaults.font_size),
            letter_spacing: stored_number(map, "letterSpacing").unwrap_or(defaults.letter_spacing),
            line_height: stored_number(map, "lineHeight").unwrap_or(defaults.line_height),
            code_theme: stored(map, "codeTheme").unwrap_or(defaults.code_theme),
            code_scheme: stored(map, "codeScheme").unwrap_or(defaults.code_scheme),
            code_font_size: stored_number(map, "codeFontSize").unwrap_or(defaults.code_font_size),
            code_letter_spacing: stored_number(map, "codeLetterSpacing")
                .unwrap_or(defaults.code_letter_spacing),
            code_line_height: stored_number(map, "codeLineHeight")
                .unwrap_or(defaults.code_line_height),
        }
    }
}

fn stored<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Option<T> {
    let value = map.get(key).filter(|value| !value.is_null())?;
    match serde_json::from_value(value.clone()) {
        Ok(value) => Some(value),
        Err(_) => {
            log!("settings"; "ignoring stored `{key}`: {value}");
            None
        }
    }
}

fn stored_number(map: &Map<String, Value>, key: &str) -> Option<f64> {
    stored::<f64>(map, key).filter(|n| n.is_finite())
}

/// Field selector for `lectern settings set <field> <value>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SettingField {
    Theme,
    FontSize,
    LetterSpacing,
    LineHeight,
    CodeTheme,
    CodeScheme,
    CodeFontSize,
    CodeLetterSpacing,
    CodeLineHeight,
}

impl SettingField {
    /// Key in the persisted object.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Theme => "theme",
            Self::FontSize => "fontSize",
            Self::LetterSpacing => "letterSpacing",
            Self::LineHeight => "lineHeight",
            Self::CodeTheme => "codeTheme",
            Self::CodeScheme => "codeScheme",
            Self::CodeFontSize => "codeFontSize",
            Self::CodeLetterSpacing => "codeLetterSpacing",
            Self::CodeLineHeight => "codeLineHeight",
        }
    }
}

/// Where the store runs. Only an interactive context loads and observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionContext {
    Interactive,
    Server,
}

pub struct SettingsStore<S, P> {
    key: String,
    settings: Settings,
    storage: S,
    surface: P,
    observing: bool,
}

impl<S: SettingsStorage, P: PresentationSurface> SettingsStore<S, P> {
    /// Create the store.
    ///
    /// Interactive: load, start observing, then run the first commit so
    /// storage and surface reflect the loaded state. Server: do nothing.
    pub fn new(context: ExecutionContext, key: impl Into<String>, storage: S, surface: P) -> Self {
        let mut store = Self {
            key: key.into(),
            settings: Settings::default(),
            storage,
            surface,
            observing: false,
        };
        if context == ExecutionContext::Interactive {
            store.load();
            store.observing = true;
            store.commit();
        }
        store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[cfg(test)]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn surface(&self) -> &P {
        &self.surface
    }

    pub fn into_surface(self) -> P {
        self.surface
    }

    #[cfg(test)]
    pub fn is_observing(&self) -> bool {
        self.observing
    }

    /// Stop persisting and applying. Later mutations only change memory.
    #[allow(unused)]
    pub fn detach(&mut self) {
        self.observing = false;
    }

    /// Replace the current state with what storage holds.
    ///
    /// Missing blob keeps the current state. Unreadable storage or malformed
    /// JSON is logged and resets every field to its default.
    pub fn load(&mut self) {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(err) => {
                log!("settings"; "cannot read stored settings: {err}");
                self.settings = Settings::default();
                return;
            }
        };

        self.settings = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Settings::from_stored(&map),
            Ok(other) => {
                log!("settings"; "stored settings are not an object: {other}");
                Settings::default()
            }
            Err(err) => {
                log!("settings"; "malformed stored settings: {err}");
                Settings::default()
            }
        };
    }

    /// Write all nine fields, overwriting the stored blob.
    pub fn save(&mut self) -> Result<(), SettingsError> {
        let json = serde_json::to_string(&self.settings)?;
        self.storage.set_item(&self.key, &json)?;
        Ok(())
    }

    /// Push the current state onto the surface.
    pub fn apply(&mut self) {
        let s = &self.settings;
        let surface = &mut self.surface;

        surface.set_attribute("data-theme", s.theme.as_str());
        surface.set_attribute("data-code-theme", s.code_theme.as_str());
        surface.set_attribute("data-code-scheme", &s.code_scheme);

        surface.set_style_property("--base-font-size", &format!("{}px", s.font_size));
        surface.set_style_property("--base-letter-spacing", &format!("{}px", s.letter_spacing));
        surface.set_style_property("--base-line-height", &s.line_height.to_string());
        surface.set_style_property("--code-font-size", &format!("{}px", s.code_font_size));
        surface.set_style_property(
            "--code-letter-spacing",
            &format!("{}px", s.code_letter_spacing),
        );
        surface.set_style_property("--code-line-height", &s.code_line_height.to_string());

        surface.finish();
    }

    fn commit(&mut self) {
        if let Err(err) = self.save() {
            log!("settings"; "failed to save settings: {err}");
        }
        self.apply();
    }

    /// Mutate several fields as one batch. Returns whether anything changed.
    pub fn update(&mut self, f: impl FnOnce(&mut Settings)) -> bool {
        let before = self.settings.clone();
        f(&mut self.settings);
        let changed = self.settings != before;
        if changed && self.observing {
            self.commit();
        }
        changed
    }

    pub fn set_theme(&mut self, theme: ThemeMode) -> bool {
        self.update(|s| s.theme = theme)
    }

    pub fn set_font_size(&mut self, px: f64) -> bool {
        self.update(|s| s.font_size = px)
    }

    pub fn set_letter_spacing(&mut self, px: f64) -> bool {
        self.update(|s| s.letter_spacing = px)
    }

    pub fn set_line_height(&mut self, multiplier: f64) -> bool {
        self.update(|s| s.line_height = multiplier)
    }

    pub fn set_code_theme(&mut self, theme: ThemeMode) -> bool {
        self.update(|s| s.code_theme = theme)
    }

    pub fn set_code_scheme(&mut self, scheme: impl Into<String>) -> bool {
        let scheme = scheme.into();
        self.update(|s| s.code_scheme = scheme)
    }

    pub fn set_code_font_size(&mut self, px: f64) -> bool {
        self.update(|s| s.code_font_size = px)
    }

    pub fn set_code_letter_spacing(&mut self, px: f64) -> bool {
        self.update(|s| s.code_letter_spacing = px)
    }

    pub fn set_code_line_height(&mut self, multiplier: f64) -> bool {
        self.update(|s| s.code_line_height = multiplier)
    }

    /// Flip the site theme, returning the new mode.
    pub fn toggle_theme(&mut self) -> ThemeMode {
        self.update(|s| s.theme = s.theme.toggled());
        self.settings.theme
    }

    /// Flip the code theme, returning the new mode.
    pub fn toggle_code_theme(&mut self) -> ThemeMode {
        self.update(|s| s.code_theme = s.code_theme.toggled());
        self.settings.code_theme
    }

    /// Back to defaults. Returns whether anything changed.
    pub fn reset(&mut self) -> bool {
        self.update(|s| *s = Settings::default())
    }

    /// Set one field from its textual form.
    pub fn set_field(&mut self, field: SettingField, raw: &str) -> Result<bool, SettingsError> {
        let invalid = || SettingsError::InvalidValue {
            field: field.key(),
            value: raw.to_owned(),
        };
        let theme = || raw.parse::<ThemeMode>().map_err(|_| invalid());
        let number = |positive: bool| {
            raw.trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite() && (!positive || *n > 0.0))
                .ok_or_else(invalid)
        };

        let changed = match field {
            SettingField::Theme => self.set_theme(theme()?),
            SettingField::CodeTheme => self.set_code_theme(theme()?),
            SettingField::FontSize => self.set_font_size(number(true)?),
            SettingField::LetterSpacing => self.set_letter_spacing(number(false)?),
            SettingField::LineHeight => self.set_line_height(number(true)?),
            SettingField::CodeFontSize => self.set_code_font_size(number(true)?),
            SettingField::CodeLetterSpacing => self.set_code_letter_spacing(number(false)?),
            SettingField::CodeLineHeight => self.set_code_line_height(number(true)?),
            SettingField::CodeScheme => {
                let scheme = raw.trim();
                if scheme.is_empty() {
                    return Err(invalid());
                }
                self.set_code_scheme(scheme)
            }
        };
        Ok(changed)
    }
}
