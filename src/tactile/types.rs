use serde::{Deserialize, Serialize};
use std::fmt;

/// A key as voted on by the crowd.
///
/// `name` is the canonical lowercase key name (`"w"`, `"space"`) used for
/// remapping and injection. When the vote arrived as a numeric key code, the
/// code is kept so echoes go back exactly as received. Codes without a known
/// name get a `keycode N` name, which cannot collide with a real key name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LogicalKeyId {
    name: String,
    code: Option<u16>,
}

impl LogicalKeyId {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().trim().to_lowercase(),
            code: None,
        }
    }

    /// Key identified by a wire code, with its name if the code is known.
    pub fn from_code(code: u16, name: Option<&str>) -> Self {
        let name = match name {
            Some(name) => name.trim().to_lowercase(),
            None => format!("keycode {}", code),
        };
        Self {
            name,
            code: Some(code),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> Option<u16> {
        self.code
    }

    /// Lookup form used by remap tables.
    pub fn to_upper(&self) -> String {
        self.name.to_uppercase()
    }
}

impl fmt::Display for LogicalKeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} ({})", self.name, code),
            None => f.write_str(&self.name),
        }
    }
}

/// Key name handed to the actuator after remapping.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PhysicalKeyId(String);

impl PhysicalKeyId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&LogicalKeyId> for PhysicalKeyId {
    fn from(key: &LogicalKeyId) -> Self {
        Self(key.as_str().to_string())
    }
}

impl fmt::Display for PhysicalKeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Aggregate vote statistics for one key during one report interval.
#[derive(Debug, Clone, PartialEq)]
pub struct VoteRecord {
    pub key: LogicalKeyId,
    pub down_mean: Option<f64>,
    pub up_mean: Option<f64>,
}

impl VoteRecord {
    pub fn new(key: LogicalKeyId, down_mean: Option<f64>, up_mean: Option<f64>) -> Self {
        Self {
            key,
            down_mean,
            up_mean,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Report {
    pub votes: Vec<VoteRecord>,
    pub quorum: f64,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Press,
    Release,
    NoChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Tactile,
}

/// Acknowledgement of one actuation, sent back to the voting session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEcho {
    pub target: TargetType,
    pub code: LogicalKeyId,
    pub progress: u8,
    pub fired: bool,
}

impl ProgressEcho {
    pub fn new(code: LogicalKeyId, pressed: bool) -> Self {
        let progress = u8::from(pressed);
        Self {
            target: TargetType::Tactile,
            code,
            progress,
            fired: progress == 1,
        }
    }
}
