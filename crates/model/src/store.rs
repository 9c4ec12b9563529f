use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Liveness of a storage node, ordered from least to most reachable.
///
/// Ordering is meaningful: a fan-out with a minimum state of `Offline`
/// includes `Offline` and `Normal` stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreState {
    /// Removed from the cluster for good.
    Tombstone,
    Disconnected,
    Offline,
    #[serde(alias = "up")]
    Normal,
}

impl StoreState {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreState::Tombstone => "tombstone",
            StoreState::Disconnected => "disconnected",
            StoreState::Offline => "offline",
            StoreState::Normal => "normal",
        }
    }
}

impl fmt::Display for StoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("Unknown value '{value}' for {kind}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl FromStr for StoreState {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tombstone" => Ok(StoreState::Tombstone),
            "disconnected" => Ok(StoreState::Disconnected),
            "offline" => Ok(StoreState::Offline),
            "normal" | "up" => Ok(StoreState::Normal),
            _ => Err(ParseEnumError {
                kind: "store state",
                value: s.to_string(),
            }),
        }
    }
}

/// Ingest mode a storage node can be switched into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchMode {
    Import,
    Normal,
}

impl SwitchMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SwitchMode::Import => "import",
            SwitchMode::Normal => "normal",
        }
    }
}

impl fmt::Display for SwitchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwitchMode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "import" => Ok(SwitchMode::Import),
            "normal" => Ok(SwitchMode::Normal),
            _ => Err(ParseEnumError {
                kind: "switch mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Point-in-time view of one storage node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub address: String,
    pub state: StoreState,
}

impl Store {
    pub fn new(address: impl Into<String>, state: StoreState) -> Self {
        Self {
            address: address.into(),
            state,
        }
    }
}

/// Minimum liveness a store needs to be included in a mode switch.
///
/// Reverting to normal mode should reach as many stores as possible, so the
/// normal threshold is never stricter than the import one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivenessThresholds {
    pub import: StoreState,
    pub normal: StoreState,
}

impl LivenessThresholds {
    pub fn new(import: StoreState, normal: StoreState) -> Self {
        Self { import, normal }
    }

    pub fn for_mode(&self, mode: SwitchMode) -> StoreState {
        match mode {
            SwitchMode::Import => self.import,
            SwitchMode::Normal => self.normal,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.normal <= self.import
    }
}

impl Default for LivenessThresholds {
    fn default() -> Self {
        Self {
            import: StoreState::Offline,
            normal: StoreState::Disconnected,
        }
    }
}
