//! Element labels backed by string interning.
//!
//! Every stored element carries a [`Label`] such as `A`, `BB` or `c`. Labels
//! are compared and hashed constantly during lookups, so they are interned
//! once and then handled as a copyable symbol.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock, PoisonError},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner shared by all labels.
///
/// # Thread Safety
///
/// Access goes through a `Mutex`. A poisoned lock is recovered, since the
/// interner is append-only and cannot be left half-updated.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Interned element label.
///
/// # Examples
///
/// ```
/// use straightedge_core::identifier::Label;
///
/// let a = Label::new("A");
/// let b: Label = "A".into();
/// assert_eq!(a, b);
/// assert_eq!(a, "A");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(DefaultSymbol);

impl Label {
    /// Creates a `Label` from its text.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Returns the label text.
    pub fn as_string(&self) -> String {
        interner()
            .resolve(self.0)
            .map(str::to_owned)
            .unwrap_or_default()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.as_string();
        f.pad(&text)
    }
}

impl std::str::FromStr for Label {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Label {
    /// Allows direct comparison with string slices: `label == "A"`
    fn eq(&self, other: &str) -> bool {
        interner().resolve(self.0) == Some(other)
    }
}

impl PartialEq<&str> for Label {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_string())
    }
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Self::new(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let a1 = Label::new("A");
        let a2 = Label::new("A");
        let b = Label::new("B");

        assert_eq!(a1, a2);
        assert_ne!(a1, b);
        assert_eq!(a1, "A");
    }

    #[test]
    fn test_case_is_significant() {
        assert_ne!(Label::new("a"), Label::new("A"));
        assert!(Label::new("a") != "A");
    }

    #[test]
    fn test_display_pads() {
        let label = Label::new("BB");
        assert_eq!(format!("{label}"), "BB");
        assert_eq!(format!("{label:>4}"), "  BB");
    }

    #[test]
    fn test_hash_and_eq() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(Label::new("C"), 1);
        map.insert(Label::new("c"), 2);

        assert_eq!(map.get(&Label::new("C")), Some(&1));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_serde_as_string() {
        let label = Label::new("AA");
        let json = serde_json::to_string(&label).unwrap();
        assert_eq!(json, "\"AA\"");
        let back: Label = serde_json::from_str(&json).unwrap();
        assert_eq!(back, label);
    }
}
