use core::fmt;

use crate::schema::{ColumnType, Precision};

pub type Result<T> = core::result::Result<T, Error>;

/// Where in a block a fault was detected.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Location {
    Block,
    Column(usize),
    Cell { column: usize, row: usize },
}

impl Location {
    pub fn column(&self) -> Option<usize> {
        match self {
            Location::Block => None,
            Location::Column(column) | Location::Cell { column, .. } => Some(*column),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Block => write!(f, "block header"),
            Location::Column(column) => write!(f, "column {column}"),
            Location::Cell { column, row } => write!(f, "column {column}, row {row}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A computed offset or length falls outside the block. Never retried.
    #[error("layout fault at {location}: {message}")]
    Layout { location: Location, message: String },

    #[error("unsupported column type code {code} at column {column}")]
    UnsupportedType { column: usize, code: u8 },

    #[error("invalid result schema at {location}: {message}")]
    Schema { location: Location, message: String },

    #[error("timestamp {ticks} out of range for {precision} precision at {location}")]
    Range {
        location: Location,
        ticks: i64,
        precision: Precision,
    },

    #[error("invalid {ty} payload at {location}: {message}")]
    Payload {
        location: Location,
        ty: ColumnType,
        message: String,
    },

    #[error("cannot encode value at {location}: {message}")]
    Encode { location: Location, message: String },

    /// Reported by the engine on fetch; passed through untouched.
    #[error("fetch failed with code {code}: {message}")]
    Fetch { code: i32, message: String },

}

impl Error {
    pub fn layout(location: Location, message: impl Into<String>) -> Self {
        Error::Layout {
            location,
            message: message.into(),
        }
    }

    pub fn schema(location: Location, message: impl Into<String>) -> Self {
        Error::Schema {
            location,
            message: message.into(),
        }
    }

    pub fn encode(location: Location, message: impl Into<String>) -> Self {
        Error::Encode {
            location,
            message: message.into(),
        }
    }

    pub fn fetch(code: i32, message: impl Into<String>) -> Self {
        Error::Fetch {
            code,
            message: message.into(),
        }
    }

    pub fn is_layout_fault(&self) -> bool {
        matches!(self, Error::Layout { .. })
    }

    pub fn location(&self) -> Option<Location> {
        match self {
            Error::Layout { location, .. }
            | Error::Schema { location, .. }
            | Error::Range { location, .. }
            | Error::Payload { location, .. }
            | Error::Encode { location, .. } => Some(*location),
            Error::UnsupportedType { column, .. } => Some(Location::Column(*column)),
            Error::Fetch { .. } => None,
        }
    }
}
