use serde::{Deserialize, Serialize};

use super::keycode;
use crate::tactile::{LogicalKeyId, ProgressEcho, Report, TargetType, VoteRecord};

/// Key identifier as it appears on the wire: a key code or a key name.
///
/// Echoes carry the identifier in the form it was received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireKey {
    Code(u16),
    Name(String),
}

impl WireKey {
    pub fn to_logical(&self) -> LogicalKeyId {
        match self {
            WireKey::Code(code) => {
                LogicalKeyId::from_code(*code, keycode::name_for(*code).as_deref())
            }
            WireKey::Name(name) => LogicalKeyId::new(name),
        }
    }

    pub fn from_logical(key: &LogicalKeyId) -> Self {
        match key.code() {
            Some(code) => WireKey::Code(code),
            None => WireKey::Name(key.as_str().to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteMean {
    pub mean: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TactileFrame {
    #[serde(alias = "code")]
    pub id: WireKey,
    #[serde(default)]
    pub down: Option<VoteMean>,
    #[serde(default)]
    pub up: Option<VoteMean>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressFrame {
    pub target: TargetType,
    pub code: WireKey,
    pub progress: u8,
    pub fired: bool,
}

impl From<&ProgressEcho> for ProgressFrame {
    fn from(echo: &ProgressEcho) -> Self {
        Self {
            target: echo.target,
            code: WireKey::from_logical(&echo.code),
            progress: echo.progress,
            fired: echo.fired,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RobotFrame {
    Handshake {
        channel: u64,
        key: String,
    },
    HandshakeAck,
    Report {
        #[serde(default)]
        tactile: Vec<TactileFrame>,
        #[serde(default)]
        quorum: f64,
    },
    Progress {
        progress: Vec<ProgressFrame>,
    },
    Error {
        message: String,
    },
}

impl RobotFrame {
    pub fn progress(echoes: &[ProgressEcho]) -> Self {
        RobotFrame::Progress {
            progress: echoes.iter().map(ProgressFrame::from).collect(),
        }
    }

    /// Converts a report frame into the core's report; other frames yield `None`.
    pub fn into_report(self) -> Option<Report> {
        match self {
            RobotFrame::Report { tactile, quorum } => Some(Report {
                votes: tactile
                    .into_iter()
                    .map(|t| {
                        VoteRecord::new(
                            t.id.to_logical(),
                            t.down.and_then(|d| d.mean),
                            t.up.and_then(|u| u.mean),
                        )
                    })
                    .collect(),
                quorum,
            }),
            _ => None,
        }
    }
}

/// Robot endpoint returned when joining a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinDetails {
    pub address: String,
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub id: u64,
    #[serde(default)]
    pub token: Option<String>,
}
