//! Rendu pur : (instantané, compte à rebours, seuil) -> document.
//! Aucune E/S, aucune horloge ; deux états identiques produisent deux
//! documents identiques. L'adaptation vers l'embed Discord vit dans
//! `refresh`.

use crate::config::DisplayConfig;
use crate::models::{ProbeResult, StatusSnapshot};

pub const COLOUR_OK: u32 = 0x00FF00;
pub const COLOUR_DEGRADED: u32 = 0xFFCC00;
pub const COLOUR_ALERT: u32 = 0xFF0000;

/// Classement du pire au meilleur via l'ordre de déclaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LatencyClass {
    Good,
    Medium,
    High,
    Warning,
}

impl LatencyClass {
    pub fn symbol(self) -> &'static str {
        match self {
            LatencyClass::Good => "🟢",
            LatencyClass::Medium => "🟡",
            LatencyClass::High => "🔴",
            LatencyClass::Warning => "⚠️",
        }
    }
}

/// Fonction totale : toute latence tombe dans exactement une classe.
/// Bornes : 50 inclus côté Good, 100 inclus côté Medium, le seuil inclus
/// côté High.
pub fn classify(latency_ms: u32, threshold_ms: u32) -> LatencyClass {
    if latency_ms > threshold_ms {
        LatencyClass::Warning
    } else if latency_ms > 100 {
        LatencyClass::High
    } else if latency_ms > 50 {
        LatencyClass::Medium
    } else {
        LatencyClass::Good
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RenderState<'a> {
    pub snapshot: &'a StatusSnapshot,
    pub countdown_secs: u32,
    pub threshold_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub name: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    pub colour: u32,
    pub blocks: Vec<Block>,
    pub total_name: String,
    pub total_value: String,
    pub footer: String,
}

pub fn render(state: &RenderState, display: &DisplayConfig) -> Document {
    let blocks = state
        .snapshot
        .entries
        .iter()
        .map(|(server, result)| Block {
            name: server.name.clone(),
            body: block_body(result, state.threshold_ms, display),
        })
        .collect();

    Document {
        title: display.title.clone(),
        colour: accent_colour(state.snapshot, state.threshold_ms),
        blocks,
        total_name: display.total_name.clone(),
        total_value: display
            .total_template
            .replace("{total}", &state.snapshot.total_players.to_string()),
        footer: display
            .footer_template
            .replace("{countdown}", &state.countdown_secs.to_string()),
    }
}

fn block_body(result: &ProbeResult, threshold_ms: u32, display: &DisplayConfig) -> String {
    match result {
        ProbeResult::Online {
            online_players,
            max_players,
            latency_ms,
        } => {
            let class = classify(*latency_ms, threshold_ms);
            format!(
                "{}：{}\n{}：{}/{}\n{}：{}ms {}",
                display.status_heading,
                display.online_label,
                display.players_heading,
                online_players,
                max_players,
                display.latency_heading,
                latency_ms,
                class.symbol(),
            )
        }
        ProbeResult::Offline => format!(
            "{}：{}\n{}：{na}/{na}\n{}：{na}",
            display.status_heading,
            display.offline_label,
            display.players_heading,
            display.latency_heading,
            na = display.offline_placeholder,
        ),
    }
}

/// Couleur d'accent dérivée du pire état du lot : déterministe pour un
/// même instantané et un même seuil.
fn accent_colour(snapshot: &StatusSnapshot, threshold_ms: u32) -> u32 {
    let mut worst = LatencyClass::Good;
    for (_, result) in &snapshot.entries {
        match result {
            ProbeResult::Online { latency_ms, .. } => {
                worst = worst.max(classify(*latency_ms, threshold_ms));
            }
            ProbeResult::Offline => return COLOUR_ALERT,
        }
    }
    match worst {
        LatencyClass::Good => COLOUR_OK,
        LatencyClass::Medium => COLOUR_DEGRADED,
        LatencyClass::High | LatencyClass::Warning => COLOUR_ALERT,
    }
}
