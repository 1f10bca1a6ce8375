/**
 * SERVER PROBE - Sonde de statut d'un serveur Minecraft
 *
 * RÔLE : Un appel = un aller-retour réseau borné dans le temps, qui produit
 * toujours un ProbeResult. Toute panne (DNS, connexion, timeout, réponse
 * malformée) est contenue ici et devient Offline : la couche d'affichage ne
 * voit jamais d'erreur.
 *
 * Deux variantes de protocole : Server List Ping (Java, TCP) et
 * unconnected ping RakNet (Bedrock, UDP). Même forme de résultat en sortie.
 */

mod bedrock;
mod java;

use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::models::{ProbeResult, ProtocolVariant, ServerDescriptor};

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("probe timed out")]
    Timeout,
    #[error("malformed response: {0}")]
    Protocol(&'static str),
    #[error("truncated response")]
    UnexpectedEof,
    #[error("unreadable status payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Résultat interne d'un échange réussi, avant conversion en ProbeResult.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PingOutcome {
    pub online_players: u32,
    pub max_players: u32,
    pub latency_ms: u32,
}

pub(crate) fn round_ms(elapsed: Duration) -> u32 {
    (elapsed.as_secs_f64() * 1000.0).round() as u32
}

/// Une sonde, un serveur. Ne lève jamais d'erreur au-delà de cette
/// frontière et ne retente pas : la prochaine tentative est le prochain
/// cycle.
pub async fn probe(server: &ServerDescriptor, timeout: Duration) -> ProbeResult {
    let outcome = match tokio::time::timeout(timeout, query(server)).await {
        Ok(result) => result,
        Err(_) => Err(ProbeError::Timeout),
    };

    match outcome {
        Ok(ping) => ProbeResult::Online {
            online_players: ping.online_players,
            max_players: ping.max_players,
            latency_ms: ping.latency_ms,
        },
        Err(e) => {
            debug!(server = %server.name, error = %e, "probe failed");
            ProbeResult::Offline
        }
    }
}

async fn query(server: &ServerDescriptor) -> Result<PingOutcome, ProbeError> {
    match server.protocol {
        ProtocolVariant::Java => java::query(&server.host, server.port).await,
        ProtocolVariant::Bedrock => bedrock::query(&server.host, server.port).await,
    }
}
