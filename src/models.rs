use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolVariant {
    Java,
    Bedrock,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerDescriptor {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub protocol: ProtocolVariant,
}

/// Outcome of a single status probe. `Offline` is a data state, not an
/// error: every network/protocol failure collapses into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    Online {
        online_players: u32,
        max_players: u32,
        latency_ms: u32,
    },
    Offline,
}

/// Complete outcome of one probing cycle. `entries` always has one entry
/// per configured server, in configuration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub entries: Vec<(ServerDescriptor, ProbeResult)>,
    pub total_players: u32,
}
