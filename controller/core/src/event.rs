use std::fmt;

/// The kind of change a watch delivered for an object.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Add,
    Update,
    Delete,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => "add".fmt(f),
            Self::Update => "update".fmt(f),
            Self::Delete => "delete".fmt(f),
        }
    }
}
