use crate::constraints::ConstraintKind;
use thiserror::Error;

/// Everything that can stop a compilation. There is no partial output: any of these
/// aborts the whole run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("could not read instance: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse instance xml: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("document ends inside <{tag}> opened at {row}:{col}")]
    Unclosed { tag: String, row: u32, col: u32 },

    #[error("instance has no <{0}> elements")]
    MissingElement(&'static str),

    #[error("{kind} is missing attribute `{attribute}`")]
    MissingAttribute {
        kind: ConstraintKind,
        attribute: &'static str,
    },

    #[error("{kind} has malformed attribute {attribute}=\"{value}\"")]
    MalformedAttribute {
        kind: ConstraintKind,
        attribute: &'static str,
        value: String,
    },

    /// A known constraint kind with an attribute value this compiler does not handle.
    #[error("unhandled {attribute}=\"{value}\" in {kind}")]
    UnsupportedAttribute {
        kind: ConstraintKind,
        attribute: &'static str,
        value: String,
    },

    #[error("invalid instance structure: {0}")]
    Structure(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn unsupported(kind: ConstraintKind, attribute: &'static str, value: impl ToString) -> Self {
        Error::UnsupportedAttribute {
            kind,
            attribute,
            value: value.to_string(),
        }
    }
}
