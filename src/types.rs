use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier for a pricing zone.
#[repr(transparent)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ZoneId(pub i32);

impl ZoneId {
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    pub const fn into_inner(self) -> i32 {
        self.0
    }
}

impl From<i32> for ZoneId {
    fn from(value: i32) -> Self {
        Self::new(value)
    }
}

impl From<ZoneId> for i32 {
    fn from(value: ZoneId) -> Self {
        value.into_inner()
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
