//! Interned external element identifiers.
//!
//! Modeling tools hand out long string ids (usually UUIDs) for every element.
//! The same id is looked up many times while feedback is propagated, so ids
//! are interned once and passed around as a `Copy` symbol.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner shared by every diagram of the process.
///
/// # Thread Safety
///
/// Access is serialized through a `Mutex`; grading sessions on different
/// threads may intern ids concurrently.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn with_interner<R>(f: impl FnOnce(&mut DefaultStringInterner) -> R) -> R {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut interner)
}

/// External identifier of a diagram element.
///
/// Two diagrams never share element ids in practice, but nothing here relies
/// on that: an [`Id`] only names an element within the diagram that owns it.
///
/// # Examples
///
/// ```
/// use compass_core::identifier::Id;
///
/// let attribute = Id::new("6b2c1e0a-attr");
/// assert_eq!(attribute, "6b2c1e0a-attr");
/// assert_eq!(attribute, Id::new("6b2c1e0a-attr"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Interns `name` and returns its identifier.
    pub fn new(name: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(name)))
    }

    /// Returns the identifier's text.
    pub fn as_string(&self) -> String {
        with_interner(|interner| {
            interner
                .resolve(self.0)
                .map(str::to_owned)
                .unwrap_or_default()
        })
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| interner.resolve(self.0) == Some(other))
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl serde::Serialize for Id {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.as_string())
    }
}
