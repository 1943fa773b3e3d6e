use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Runtime tag for the type of value a key holds.
///
/// A `ValueType` is either a concrete Rust type (captured through
/// [`TypeId`] plus its type name for display), or [`ValueType::Unknown`],
/// the marker a key reports when its value type could not be resolved.
///
/// Equality and hashing use the `TypeId` only; the stored name is for
/// rendering and is not guaranteed to be stable across compiler versions.
#[derive(Clone, Copy)]
pub enum ValueType {
    /// A resolved, concrete value type.
    Known { id: TypeId, name: &'static str },
    /// The value type could not be resolved; any value is accepted.
    Unknown,
}

impl ValueType {
    /// The tag for `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::Known {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Returns `true` for the unresolved marker.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Returns `true` if this tag names exactly `T`.
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.type_id() == Some(TypeId::of::<T>())
    }

    /// The underlying `TypeId`, if resolved.
    pub fn type_id(&self) -> Option<TypeId> {
        match self {
            Self::Known { id, .. } => Some(*id),
            Self::Unknown => None,
        }
    }

    /// Whether a value with the given `TypeId` may be stored under this tag.
    ///
    /// The unknown marker accepts everything.
    pub fn accepts(&self, id: TypeId) -> bool {
        match self {
            Self::Known { id: own, .. } => *own == id,
            Self::Unknown => true,
        }
    }

    /// Fully qualified type name, e.g. `alloc::vec::Vec<alloc::string::String>`.
    pub fn full_name(&self) -> &'static str {
        match self {
            Self::Known { name, .. } => name,
            Self::Unknown => "?",
        }
    }

    /// Type name with module paths stripped, e.g. `Vec<String>`.
    pub fn simple_name(&self) -> String {
        simple_name(self.full_name())
    }
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id() == other.type_id()
    }
}

impl Eq for ValueType {}

impl Hash for ValueType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id().hash(state);
    }
}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known { name, .. } => write!(f, "ValueType({name})"),
            Self::Unknown => write!(f, "ValueType(?)"),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.simple_name())
    }
}

fn is_delimiter(c: char) -> bool {
    matches!(
        c,
        '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&' | '*'
    )
}

/// Strip the module path from every path segment of a type name.
fn simple_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    for piece in full.split_inclusive(is_delimiter) {
        let (path, delimiter) = match piece.char_indices().last() {
            Some((index, c)) if is_delimiter(c) => (&piece[..index], &piece[index..]),
            _ => (piece, ""),
        };
        out.push_str(path.rsplit("::").next().unwrap_or(path));
        out.push_str(delimiter);
    }
    out
}
