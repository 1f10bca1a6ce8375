use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};

pub const DEFAULT_LATENCY_THRESHOLD: u32 = 400;
pub const MIN_LATENCY_THRESHOLD: u32 = 100;

/// Fichier JSON à une seule clé reconnue ; les clés inconnues sont ignorées
/// en lecture.
#[derive(Debug, Serialize, Deserialize)]
struct ThresholdFile {
    latency_threshold: u32,
}

/// Persistance du seuil d'alerte de latence (ms). `load` ne peut pas
/// échouer ; `save` remonte l'erreur à l'appelant sans tuer le process.
#[derive(Debug, Clone)]
pub struct ThresholdStore {
    path: PathBuf,
}

impl ThresholdStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub async fn load(&self) -> u32 {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => match serde_json::from_str::<ThresholdFile>(&text) {
                Ok(file) => file.latency_threshold,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e,
                        "unreadable threshold file, using default");
                    DEFAULT_LATENCY_THRESHOLD
                }
            },
            Err(_) => {
                debug!(path = %self.path.display(), "no threshold file, using default");
                DEFAULT_LATENCY_THRESHOLD
            }
        }
    }

    /// Écriture atomique : fichier temporaire voisin puis rename, pour
    /// qu'une lecture concurrente ne voie jamais un fichier tronqué.
    pub async fn save(&self, value: u32) -> Result<()> {
        let payload = serde_json::to_string_pretty(&ThresholdFile {
            latency_threshold: value,
        })?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, payload)
            .await
            .with_context(|| format!("cannot write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("cannot replace {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> ThresholdStore {
        let path = std::env::temp_dir().join(format!(
            "nimbus-store-{}-{}.json",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        ThresholdStore::new(path)
    }

    #[tokio::test]
    async fn test_load_missing_file_returns_default() {
        let store = temp_store("missing");
        assert_eq!(store.load().await, DEFAULT_LATENCY_THRESHOLD);
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let store = temp_store("roundtrip");
        store.save(250).await.unwrap();
        assert_eq!(store.load().await, 250);
        store.save(MIN_LATENCY_THRESHOLD).await.unwrap();
        assert_eq!(store.load().await, MIN_LATENCY_THRESHOLD);
    }

    #[tokio::test]
    async fn test_corrupt_file_returns_default() {
        let store = temp_store("corrupt");
        tokio::fs::write(&store.path, "{not json")
            .await
            .unwrap();
        assert_eq!(store.load().await, DEFAULT_LATENCY_THRESHOLD);
    }

    #[tokio::test]
    async fn test_unknown_keys_ignored() {
        let store = temp_store("extra-keys");
        tokio::fs::write(
            &store.path,
            r#"{"latency_threshold": 300, "someday": true}"#,
        )
        .await
        .unwrap();
        assert_eq!(store.load().await, 300);
    }
}
