//! Document-wide text selection suppression.
//!
//! While a gesture is in progress the document's selection styles are set
//! to `none` so dragging does not highlight text. The values present right
//! before suppression are captured in a [`SavedSelection`] and restored
//! verbatim, including properties that were unset.

use std::collections::BTreeMap;

/// Style properties that control text selection.
pub const SELECTION_PROPERTIES: [&str; 2] = ["user-select", "-webkit-user-select"];

/// Value written to every selection property while suppressed.
pub const SUPPRESSED_VALUE: &str = "none";

/// The host document's root style, as far as the controller needs it.
pub trait Document {
    /// Current value of a style property, `None` when unset.
    fn style_property(&self, name: &str) -> Option<String>;

    /// Set (`Some`) or remove (`None`) a style property.
    fn set_style_property(&mut self, name: &str, value: Option<&str>);
}

/// A document that only tracks its root style properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryDocument {
    styles: BTreeMap<String, String>,
}

impl InMemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style preset of a style property.
    pub fn with_style(mut self, name: &str, value: &str) -> Self {
        self.styles.insert(name.to_string(), value.to_string());
        self
    }

    /// Borrowing accessor for assertions.
    pub fn style(&self, name: &str) -> Option<&str> {
        self.styles.get(name).map(String::as_str)
    }
}

impl Document for InMemoryDocument {
    fn style_property(&self, name: &str) -> Option<String> {
        self.styles.get(name).cloned()
    }

    fn set_style_property(&mut self, name: &str, value: Option<&str>) {
        match value {
            Some(value) => {
                self.styles.insert(name.to_string(), value.to_string());
            }
            None => {
                self.styles.remove(name);
            }
        }
    }
}

/// Selection style values captured right before suppression.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "dropping a SavedSelection leaves text selection suppressed"]
pub struct SavedSelection {
    values: Vec<(&'static str, Option<String>)>,
}

impl SavedSelection {
    /// Write the captured values back.
    pub fn restore(self, document: &mut dyn Document) {
        for (name, value) in self.values {
            document.set_style_property(name, value.as_deref());
        }
    }

    /// Captured value of a property.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(property, _)| *property == name)
            .and_then(|(_, value)| value.as_deref())
    }
}

/// Capture the current selection styles and suppress selection.
pub fn suppress_selection(document: &mut dyn Document) -> SavedSelection {
    let values = SELECTION_PROPERTIES
        .iter()
        .map(|name| (*name, document.style_property(name)))
        .collect();
    for name in SELECTION_PROPERTIES {
        document.set_style_property(name, Some(SUPPRESSED_VALUE));
    }
    SavedSelection { values }
}
