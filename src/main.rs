/**
 * NIMBUS-STATUS - Bot Discord de supervision de serveurs Minecraft
 *
 * RÔLE : Bootstrap complet : env, logging, config, seuil persisté, client
 * Discord, puis démarrage de la boucle de rafraîchissement.
 *
 * ARCHITECTURE : une boucle sonde/rendu pilotée par phases + une commande
 * slash qui partage uniquement le seuil de latence avec elle.
 * Tout échec de configuration au démarrage est fatal : sans token, sans
 * salon ou sans liste de serveurs le bot n'a rien d'utile à faire.
 */

mod aggregate;
mod commands;
mod config;
mod models;
mod probe;
mod refresh;
mod render;
mod state;
mod store;

use anyhow::{Context as _, Result};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::state::Data;
use crate::store::ThresholdStore;

#[tokio::main]
async fn main() -> Result<()> {
    // variables d'environnement depuis .env (s'il existe)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = config::load_config().await?;
    let token = std::env::var("DISCORD_TOKEN")
        .context("DISCORD_TOKEN is not set (export it or put it in a .env file)")?;

    let store = ThresholdStore::new(&cfg.threshold_file);
    let threshold = state::new_state(store.load().await);
    info!(
        threshold_ms = *threshold.lock(),
        servers = cfg.servers.len(),
        "configuration loaded"
    );

    let data = Data {
        config: Arc::new(cfg),
        threshold,
        store,
    };

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![commands::set_latency_threshold()],
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!(bot = %ready.user.name, "logged in to Discord");

                // le salon cible doit exister avant de démarrer la boucle
                let channel = serenity::ChannelId::new(data.config.channel_id);
                if let Err(e) = channel.to_channel(ctx).await {
                    error!(%channel, error = %e, "status channel cannot be resolved");
                    std::process::exit(1);
                }

                tokio::spawn(refresh::run(ctx.http.clone(), data.clone()));
                Ok(data)
            })
        })
        .build();

    let mut client =
        serenity::ClientBuilder::new(&token, serenity::GatewayIntents::non_privileged())
            .framework(framework)
            .await
            .context("failed to build Discord client")?;

    client
        .start()
        .await
        .context("Discord connection ended with an error")?;
    Ok(())
}
