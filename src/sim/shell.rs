//! Shell types and the stack of shells a ball still contains

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Physical behavior of one concentric layer of a ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShellType {
    /// Innermost layer, never shot
    #[default]
    Center,
    /// Fully solid
    Normal,
    /// Passes through walls once it is no longer the player
    Ghost,
    /// Drifts without gravity once it is no longer the player
    Float,
    /// Duplicates the shooting ball instead of being consumed
    Clone,
}

impl ShellType {
    pub const ALL: [ShellType; 5] = [
        ShellType::Center,
        ShellType::Normal,
        ShellType::Ghost,
        ShellType::Float,
        ShellType::Clone,
    ];

    /// Id used by the level text format
    pub fn id(self) -> u8 {
        match self {
            ShellType::Center => 0,
            ShellType::Normal => 1,
            ShellType::Ghost => 2,
            ShellType::Float => 3,
            ShellType::Clone => 4,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|shell| shell.id() == id)
    }
}

/// Shells not yet exposed, outermost first.
///
/// Shooting peels from the front.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShellStack {
    shells: VecDeque<ShellType>,
}

impl ShellStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next shell to be exposed
    pub fn peek_next(&self) -> Option<ShellType> {
        self.shells.front().copied()
    }

    /// Remove and return the next shell to be exposed
    pub fn pop_next(&mut self) -> Option<ShellType> {
        self.shells.pop_front()
    }

    pub fn len(&self) -> usize {
        self.shells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shells.is_empty()
    }

    pub fn clear(&mut self) {
        self.shells.clear();
    }

    /// Number of Ghost shells at the front before anything else
    pub fn leading_ghosts(&self) -> usize {
        self.shells
            .iter()
            .take_while(|shell| **shell == ShellType::Ghost)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = ShellType> + '_ {
        self.shells.iter().copied()
    }
}

impl FromIterator<ShellType> for ShellStack {
    /// Collect outermost first
    fn from_iter<I: IntoIterator<Item = ShellType>>(iter: I) -> Self {
        Self {
            shells: iter.into_iter().collect(),
        }
    }
}
