//! Fan-out concurrent des sondes et agrégation en un instantané unique.
//! Un lot ne peut pas échouer : au pire tous les serveurs sont Offline.

use futures::future::join_all;
use std::time::Duration;

use crate::models::{ProbeResult, ServerDescriptor, StatusSnapshot};
use crate::probe;

/// Sonde tous les serveurs en parallèle et rassemble les résultats dans
/// l'ordre de la configuration, quel que soit l'ordre d'arrivée. Chaque
/// sonde porte sa propre borne de temps : un serveur qui ne répond pas ne
/// retarde que lui-même.
pub async fn aggregate(
    servers: &[ServerDescriptor],
    probe_timeout: Duration,
    shared_playerbase: bool,
) -> StatusSnapshot {
    let results = join_all(servers.iter().map(|s| probe::probe(s, probe_timeout))).await;
    let total_players = total_players(&results, shared_playerbase);
    let entries = servers.iter().cloned().zip(results).collect();
    StatusSnapshot {
        entries,
        total_players,
    }
}

/// Somme des joueurs en ligne. Avec `shared_playerbase`, deux frontaux de
/// protocole exposent la même base de joueurs et chacun les compte : on
/// divise le total par 2.
fn total_players(results: &[ProbeResult], shared_playerbase: bool) -> u32 {
    let mut total: u32 = results
        .iter()
        .map(|r| match r {
            ProbeResult::Online { online_players, .. } => *online_players,
            ProbeResult::Offline => 0,
        })
        .sum();
    if shared_playerbase {
        total /= 2;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProtocolVariant;

    fn online(players: u32) -> ProbeResult {
        ProbeResult::Online {
            online_players: players,
            max_players: 40,
            latency_ms: 45,
        }
    }

    #[test]
    fn test_total_players_sums_online_only() {
        let results = [online(5), ProbeResult::Offline];
        assert_eq!(total_players(&results, false), 5);
    }

    #[test]
    fn test_total_players_halved_for_shared_playerbase() {
        let results = [online(8), online(8)];
        assert_eq!(total_players(&results, true), 8);
        // division entière, y compris sur un total impair
        let results = [online(8), online(7)];
        assert_eq!(total_players(&results, true), 7);
    }

    #[tokio::test]
    async fn test_snapshot_keeps_length_and_order_on_total_outage() {
        let servers = vec![
            ServerDescriptor {
                name: "java".into(),
                host: "127.0.0.1".into(),
                port: 1,
                protocol: ProtocolVariant::Java,
            },
            ServerDescriptor {
                name: "bedrock".into(),
                host: "127.0.0.1".into(),
                port: 1,
                protocol: ProtocolVariant::Bedrock,
            },
        ];

        let snapshot = aggregate(&servers, Duration::from_millis(300), false).await;

        assert_eq!(snapshot.entries.len(), servers.len());
        assert_eq!(snapshot.entries[0].0.name, "java");
        assert_eq!(snapshot.entries[1].0.name, "bedrock");
        assert!(snapshot
            .entries
            .iter()
            .all(|(_, result)| *result == ProbeResult::Offline));
        assert_eq!(snapshot.total_players, 0);
    }
}
