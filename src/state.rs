use parking_lot::Mutex;
use std::sync::Arc;

use crate::config::BotConfig;
use crate::store::ThresholdStore;

pub type Shared<T> = Arc<Mutex<T>>;

pub fn new_state<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}

/// État partagé entre la boucle de rafraîchissement et les commandes.
/// La boucle lit `threshold`, seule la commande l'écrit.
#[derive(Clone)]
pub struct Data {
    pub config: Arc<BotConfig>,
    pub threshold: Shared<u32>,
    pub store: ThresholdStore,
}

pub type Error = anyhow::Error;
pub type Context<'a> = poise::Context<'a, Data, Error>;
