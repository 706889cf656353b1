//! Screen identifiers.

use std::fmt;

/// Each top-level screen, navigable by number keys 1-3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    #[default]
    Monitor, // 1
    Messages, // 2
    Sites,    // 3
}

impl ScreenId {
    /// All screens in tab-bar order.
    pub const ALL: [ScreenId; 3] = [Self::Monitor, Self::Messages, Self::Sites];

    pub fn number(self) -> u8 {
        match self {
            Self::Monitor => 1,
            Self::Messages => 2,
            Self::Sites => 3,
        }
    }

    /// Screen for a number key. `None` outside 1-3.
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Monitor),
            2 => Some(Self::Messages),
            3 => Some(Self::Sites),
            _ => None,
        }
    }

    /// Next screen in tab order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Self::Monitor => Self::Messages,
            Self::Messages => Self::Sites,
            Self::Sites => Self::Monitor,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Monitor => Self::Sites,
            Self::Messages => Self::Monitor,
            Self::Sites => Self::Messages,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Monitor => "Monitor",
            Self::Messages => "Messages",
            Self::Sites => "Sites",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
