//! Commande d'administration : réglage du seuil d'alerte de latence.
//! La validation et l'écriture passent par `apply_threshold`, testable
//! sans Discord ; la commande poise ne fait que traduire l'issue en
//! réponse localisée.

use tracing::{info, warn};

use crate::state::{Context, Error, Shared};
use crate::store::{ThresholdStore, MIN_LATENCY_THRESHOLD};

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ThresholdUpdate {
    /// Valeur sous le minimum : rien ne change, ni en mémoire ni sur disque.
    Rejected,
    Saved,
    /// La valeur est active pour cette exécution mais n'a pas pu être persistée.
    SavedMemoryOnly,
}

pub(crate) async fn apply_threshold(
    value: u32,
    threshold: &Shared<u32>,
    store: &ThresholdStore,
) -> ThresholdUpdate {
    if value < MIN_LATENCY_THRESHOLD {
        return ThresholdUpdate::Rejected;
    }

    // la mémoire d'abord : le comportement reste cohérent même si le
    // disque refuse l'écriture
    *threshold.lock() = value;

    match store.save(value).await {
        Ok(()) => {
            info!(threshold_ms = value, "latency threshold updated");
            ThresholdUpdate::Saved
        }
        Err(e) => {
            warn!(threshold_ms = value, error = %e, "latency threshold not persisted");
            ThresholdUpdate::SavedMemoryOnly
        }
    }
}

/// 修改延遲警告門檻（單位：毫秒）
#[poise::command(
    slash_command,
    guild_only,
    default_member_permissions = "MANAGE_GUILD"
)]
pub async fn set_latency_threshold(
    ctx: Context<'_>,
    #[description = "新的延遲警告門檻（毫秒，最低 100）"] value: u32,
) -> Result<(), Error> {
    let data = ctx.data();
    match apply_threshold(value, &data.threshold, &data.store).await {
        ThresholdUpdate::Rejected => {
            ctx.send(
                poise::CreateReply::default()
                    .content(format!(
                        "⚠️ 延遲警告門檻不可低於 {MIN_LATENCY_THRESHOLD}ms！"
                    ))
                    .ephemeral(true),
            )
            .await?;
        }
        ThresholdUpdate::Saved => {
            ctx.say(format!("✅ 延遲警告門檻已設定為 `{value}ms`！")).await?;
        }
        ThresholdUpdate::SavedMemoryOnly => {
            ctx.say(format!(
                "⚠️ 延遲警告門檻已更新為 `{value}ms`，但設定檔寫入失敗，重啟後將還原。"
            ))
            .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::new_state;
    use crate::store::DEFAULT_LATENCY_THRESHOLD;

    fn temp_store(name: &str) -> ThresholdStore {
        let path = std::env::temp_dir().join(format!(
            "nimbus-commands-{}-{}.json",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        ThresholdStore::new(path)
    }

    #[tokio::test]
    async fn test_rejection_below_minimum_changes_nothing() {
        let store = temp_store("reject");
        let threshold = new_state(DEFAULT_LATENCY_THRESHOLD);

        let outcome = apply_threshold(99, &threshold, &store).await;

        assert_eq!(outcome, ThresholdUpdate::Rejected);
        assert_eq!(*threshold.lock(), DEFAULT_LATENCY_THRESHOLD);
        // rien n'a été écrit : load retombe sur le défaut
        assert_eq!(store.load().await, DEFAULT_LATENCY_THRESHOLD);
    }

    #[tokio::test]
    async fn test_accepted_value_updates_memory_and_disk() {
        let store = temp_store("accept");
        let threshold = new_state(DEFAULT_LATENCY_THRESHOLD);

        let outcome = apply_threshold(250, &threshold, &store).await;

        assert_eq!(outcome, ThresholdUpdate::Saved);
        assert_eq!(*threshold.lock(), 250);
        assert_eq!(store.load().await, 250);
    }

    #[tokio::test]
    async fn test_minimum_is_accepted() {
        let store = temp_store("minimum");
        let threshold = new_state(DEFAULT_LATENCY_THRESHOLD);
        let outcome = apply_threshold(MIN_LATENCY_THRESHOLD, &threshold, &store).await;
        assert_eq!(outcome, ThresholdUpdate::Saved);
    }

    #[tokio::test]
    async fn test_save_failure_still_updates_memory() {
        // répertoire inexistant : save échoue, la mémoire reste à jour
        let store = ThresholdStore::new("/nonexistent-dir/nimbus/threshold.json");
        let threshold = new_state(DEFAULT_LATENCY_THRESHOLD);

        let outcome = apply_threshold(300, &threshold, &store).await;

        assert_eq!(outcome, ThresholdUpdate::SavedMemoryOnly);
        assert_eq!(*threshold.lock(), 300);
    }
}
