//! Cursor suggestions: a reference-counted multiset of cursor kinds.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::ViewportError;

/// Cursor shapes the engine can ask the host to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CursorKind {
    None,
    NotAllowed,
    Help,
    Grabbing,
    Grab,
    Move,
    Pointer,
    Crosshair,
    Default,
}

impl CursorKind {
    /// Kinds in priority order: the first one with a nonzero count wins.
    pub const PRIORITY: [CursorKind; 9] = [
        CursorKind::None,
        CursorKind::NotAllowed,
        CursorKind::Help,
        CursorKind::Grabbing,
        CursorKind::Grab,
        CursorKind::Move,
        CursorKind::Pointer,
        CursorKind::Crosshair,
        CursorKind::Default,
    ];

    /// CSS-style name of this cursor.
    pub fn name(self) -> &'static str {
        match self {
            CursorKind::None => "none",
            CursorKind::NotAllowed => "not-allowed",
            CursorKind::Help => "help",
            CursorKind::Grabbing => "grabbing",
            CursorKind::Grab => "grab",
            CursorKind::Move => "move",
            CursorKind::Pointer => "pointer",
            CursorKind::Crosshair => "crosshair",
            CursorKind::Default => "default",
        }
    }
}

impl FromStr for CursorKind {
    type Err = ViewportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CursorKind::PRIORITY
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ViewportError::UnknownCursor(s.to_string()))
    }
}

/// Counts of outstanding suggestions per cursor kind.
#[derive(Debug, Clone)]
pub struct CursorSuggestions {
    counts: HashMap<CursorKind, u32>,
}

impl Default for CursorSuggestions {
    fn default() -> Self {
        Self {
            counts: HashMap::from([(CursorKind::Default, 1)]),
        }
    }
}

impl CursorSuggestions {
    /// Add `count` suggestions of `kind`.
    pub fn suggest(&mut self, kind: CursorKind, count: u32) {
        *self.counts.entry(kind).or_insert(0) += count;
    }

    /// Withdraw `count` suggestions of `kind`, stopping at zero. Returns
    /// false when fewer than `count` were outstanding.
    pub fn unsuggest(&mut self, kind: CursorKind, count: u32) -> bool {
        let current = self.count(kind);
        if current < count {
            log::warn!(
                "Cursor '{}' unsuggested {} times with only {} outstanding",
                kind.name(),
                count,
                current
            );
        }
        match current.saturating_sub(count) {
            0 => self.counts.remove(&kind),
            remaining => self.counts.insert(kind, remaining),
        };
        current >= count
    }

    /// Outstanding suggestions of `kind`.
    pub fn count(&self, kind: CursorKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// The cursor that should be shown.
    pub fn active(&self) -> CursorKind {
        CursorKind::PRIORITY
            .into_iter()
            .find(|kind| self.count(*kind) > 0)
            .unwrap_or(CursorKind::Default)
    }
}
