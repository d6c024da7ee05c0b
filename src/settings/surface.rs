//! Presentation targets for applied settings.

use crate::render::escape_html;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Where `apply()` pushes settings: mode attributes plus CSS variables.
pub trait PresentationSurface {
    fn set_attribute(&mut self, name: &str, value: &str);
    fn set_style_property(&mut self, name: &str, value: &str);

    /// Called once after every full apply pass.
    fn finish(&mut self) {}
}

/// Server-side stand-in for the document root element.
///
/// Records what was applied and renders it onto `<html>`, so a page is
/// served already styled with the reader's settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootElement {
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    #[cfg(test)]
    passes: usize,
}

impl RootElement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes for the `<html>` tag, each with a leading space.
    ///
    /// `data-theme="dark" style="--base-font-size: 16px; ..."`
    pub fn html_attributes(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.attributes {
            let _ = write!(out, r#" {name}="{}""#, escape_html(value));
        }
        if !self.style.is_empty() {
            let style = self
                .style
                .iter()
                .map(|(name, value)| format!("{name}: {value}"))
                .collect::<Vec<_>>()
                .join("; ");
            let _ = write!(out, r#" style="{}""#, escape_html(&style));
        }
        out
    }
}

#[cfg(test)]
impl RootElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn style_property(&self, name: &str) -> Option<&str> {
        self.style.get(name).map(String::as_str)
    }

    /// Number of completed apply passes.
    pub fn passes(&self) -> usize {
        self.passes
    }
}

impl PresentationSurface for RootElement {
    fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_owned(), value.to_owned());
    }

    fn set_style_property(&mut self, name: &str, value: &str) {
        self.style.insert(name.to_owned(), value.to_owned());
    }

    #[cfg(test)]
    fn finish(&mut self) {
        self.passes += 1;
    }
}
