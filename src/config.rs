use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use tokio::fs;

use crate::models::ServerDescriptor;

pub const CONFIG_ENV: &str = "NIMBUS_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "nimbus.yaml";

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Salon Discord qui reçoit le message de statut
    pub channel_id: u64,
    /// Intervalle entre deux cycles de sonde (aussi la valeur de départ du compte à rebours)
    #[serde(default = "default_update_interval")]
    pub update_interval_secs: u32,
    /// Borne de temps individuelle de chaque sonde
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
    /// Les serveurs configurés exposent la même base de joueurs : le total est divisé par 2
    #[serde(default)]
    pub shared_playerbase: bool,
    #[serde(default = "default_threshold_file")]
    pub threshold_file: PathBuf,
    pub servers: Vec<ServerDescriptor>,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Textes affichés dans l'embed. Les défauts reprennent le bot d'origine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub title: String,
    pub online_label: String,
    pub offline_label: String,
    pub status_heading: String,
    pub players_heading: String,
    pub latency_heading: String,
    pub offline_placeholder: String,
    pub total_name: String,
    pub total_template: String,
    pub footer_template: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: "Minecraft 伺服器狀態".into(),
            online_label: "在線 🟢".into(),
            offline_label: "離線 🔴".into(),
            status_heading: "狀態".into(),
            players_heading: "玩家".into(),
            latency_heading: "延遲".into(),
            offline_placeholder: "N/A".into(),
            total_name: "總在線玩家".into(),
            total_template: "{total} 位玩家在線".into(),
            footer_template: "下次刷新: {countdown} 秒後".into(),
        }
    }
}

fn default_update_interval() -> u32 {
    10
}

fn default_probe_timeout() -> u64 {
    3
}

fn default_threshold_file() -> PathBuf {
    "latency_threshold.json".into()
}

impl BotConfig {
    fn validate(&self) -> Result<()> {
        if self.channel_id == 0 {
            bail!("channel_id must be a real Discord channel id");
        }
        if self.servers.is_empty() {
            bail!("server list is empty, nothing to monitor");
        }
        for server in &self.servers {
            if server.port == 0 {
                bail!("server '{}': port must be in 1-65535", server.name);
            }
        }
        if self.update_interval_secs == 0 {
            bail!("update_interval_secs must be at least 1");
        }
        Ok(())
    }
}

pub fn parse_config(text: &str) -> Result<BotConfig> {
    let cfg: BotConfig = serde_yaml::from_str(text)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Charge la configuration au démarrage. Contrairement au seuil de latence,
/// une config absente ou invalide est fatale : sans liste de serveurs ni
/// salon cible le bot n'a rien à faire.
pub async fn load_config() -> Result<BotConfig> {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let text = fs::read_to_string(&path)
        .await
        .with_context(|| format!("cannot read bot config '{path}'"))?;
    parse_config(&text).with_context(|| format!("invalid bot config '{path}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProtocolVariant;

    const FULL: &str = r#"
channel_id: 1335773767900594268
update_interval_secs: 15
probe_timeout_secs: 5
shared_playerbase: true
threshold_file: data/threshold.json
servers:
  - name: "Java 版"
    host: play.example.net
    port: 25565
    protocol: java
  - name: "Bedrock 版"
    host: be.example.net
    port: 19132
    protocol: bedrock
display:
  title: "My servers"
"#;

    #[test]
    fn test_full_config_parse() {
        let cfg = parse_config(FULL).unwrap();
        assert_eq!(cfg.channel_id, 1335773767900594268);
        assert_eq!(cfg.update_interval_secs, 15);
        assert_eq!(cfg.probe_timeout_secs, 5);
        assert!(cfg.shared_playerbase);
        assert_eq!(cfg.threshold_file, PathBuf::from("data/threshold.json"));
        assert_eq!(cfg.servers.len(), 2);
        assert_eq!(cfg.servers[0].protocol, ProtocolVariant::Java);
        assert_eq!(cfg.servers[1].protocol, ProtocolVariant::Bedrock);
        assert_eq!(cfg.display.title, "My servers");
        // champs display non fournis -> défauts
        assert_eq!(cfg.display.online_label, "在線 🟢");
    }

    #[test]
    fn test_defaults_applied() {
        let cfg = parse_config(
            "channel_id: 1\nservers:\n  - {name: a, host: h, port: 1, protocol: java}\n",
        )
        .unwrap();
        assert_eq!(cfg.update_interval_secs, 10);
        assert_eq!(cfg.probe_timeout_secs, 3);
        assert!(!cfg.shared_playerbase);
        assert_eq!(cfg.threshold_file, PathBuf::from("latency_threshold.json"));
        assert_eq!(cfg.display.footer_template, "下次刷新: {countdown} 秒後");
    }

    #[test]
    fn test_empty_server_list_rejected() {
        assert!(parse_config("channel_id: 1\nservers: []\n").is_err());
    }

    #[test]
    fn test_port_zero_rejected() {
        let err = parse_config(
            "channel_id: 1\nservers:\n  - {name: a, host: h, port: 0, protocol: java}\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("port"));
    }

    #[test]
    fn test_unknown_protocol_rejected() {
        assert!(parse_config(
            "channel_id: 1\nservers:\n  - {name: a, host: h, port: 1, protocol: ftp}\n",
        )
        .is_err());
    }

    #[test]
    fn test_zero_channel_id_rejected() {
        assert!(parse_config(
            "channel_id: 0\nservers:\n  - {name: a, host: h, port: 1, protocol: java}\n",
        )
        .is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(parse_config(
            "channel_id: 1\nupdate_interval_secs: 0\nservers:\n  - {name: a, host: h, port: 1, protocol: java}\n",
        )
        .is_err());
    }
}
