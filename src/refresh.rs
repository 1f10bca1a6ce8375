/**
 * REFRESH LOOP - Pilote du cycle sonde/rendu pendant toute la vie du process
 *
 * RÔLE : Machine à deux phases. Probe : un lot de sondes concurrentes,
 * un nouvel instantané. Render : une publication par seconde avec le compte
 * à rebours qui descend de l'intervalle à 1, puis retour à Probe.
 *
 * PUBLICATION : un seul message vivant par exécution, créé paresseusement
 * puis édité sur place. Si le message a été supprimé côté Discord, on en
 * recrée un qui devient le nouveau handle. Aucun échec de publication
 * n'arrête la boucle.
 */

use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::aggregate::aggregate;
use crate::models::StatusSnapshot;
use crate::render::{render, Document, RenderState};
use crate::state::Data;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Probe,
    Render { countdown: u32 },
}

impl Phase {
    /// Après un lot de sondes, le compte à rebours repart de l'intervalle.
    pub fn after_probe(interval_secs: u32) -> Phase {
        Phase::Render {
            countdown: interval_secs.max(1),
        }
    }

    /// Après une publication : décrément, ou retour en phase de sonde une
    /// fois la valeur 1 rendue.
    pub fn after_render(self) -> Phase {
        match self {
            Phase::Render { countdown } if countdown > 1 => Phase::Render {
                countdown: countdown - 1,
            },
            _ => Phase::Probe,
        }
    }
}

pub async fn run(http: Arc<serenity::Http>, data: Data) {
    let channel = serenity::ChannelId::new(data.config.channel_id);
    let interval = data.config.update_interval_secs;
    let probe_timeout = Duration::from_secs(data.config.probe_timeout_secs);

    info!(
        %channel,
        interval_secs = interval,
        servers = data.config.servers.len(),
        "refresh loop started"
    );

    let mut handle: Option<serenity::MessageId> = None;
    let mut snapshot = StatusSnapshot {
        entries: Vec::new(),
        total_players: 0,
    };
    let mut phase = Phase::Probe;

    loop {
        match phase {
            Phase::Probe => {
                snapshot = aggregate(
                    &data.config.servers,
                    probe_timeout,
                    data.config.shared_playerbase,
                )
                .await;
                phase = Phase::after_probe(interval);
            }
            Phase::Render { countdown } => {
                // seuil relu à chaque tick : la commande peut l'avoir changé
                let threshold_ms = *data.threshold.lock();
                let doc = render(
                    &RenderState {
                        snapshot: &snapshot,
                        countdown_secs: countdown,
                        threshold_ms,
                    },
                    &data.config.display,
                );
                publish(&http, channel, &mut handle, &doc).await;
                tokio::time::sleep(Duration::from_secs(1)).await;
                phase = phase.after_render();
            }
        }
    }
}

/// Crée ou édite l'unique message de statut. Un échec d'édition (message
/// supprimé à la main, erreur HTTP passagère) bascule sur une création ;
/// un échec de la création est loggé et on retentera au tick suivant.
async fn publish(
    http: &Arc<serenity::Http>,
    channel: serenity::ChannelId,
    handle: &mut Option<serenity::MessageId>,
    doc: &Document,
) {
    let embed = to_embed(doc);

    if let Some(message_id) = *handle {
        match channel
            .edit_message(http, message_id, serenity::EditMessage::new().embed(embed.clone()))
            .await
        {
            Ok(_) => return,
            Err(e) => {
                warn!(%channel, %message_id, error = %e,
                    "status message edit failed, recreating");
                *handle = None;
            }
        }
    }

    match channel
        .send_message(http, serenity::CreateMessage::new().embed(embed))
        .await
    {
        Ok(message) => *handle = Some(message.id),
        Err(e) => error!(%channel, error = %e, "status message publish failed"),
    }
}

fn to_embed(doc: &Document) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title(doc.title.clone())
        .colour(doc.colour);
    for block in &doc.blocks {
        embed = embed.field(block.name.clone(), block.body.clone(), false);
    }
    embed
        .field(doc.total_name.clone(), doc.total_value.clone(), false)
        .footer(serenity::CreateEmbedFooter::new(doc.footer.clone()))
}
