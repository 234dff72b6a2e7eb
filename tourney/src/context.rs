//! Shared dependencies of the managers.

use std::sync::Arc;

use crate::{
    bracket::BracketManager,
    db::{MemoryStore, Store},
    matches::MatchManager,
    notify::{NoopWebhookSink, WebhookSink},
    ports::{Clock, IdGenerator, SystemClock, UuidGenerator},
    tournament::TournamentManager,
};

/// Storage plus injected capabilities, cheap to clone
#[derive(Clone)]
pub struct EngineContext {
    pub store: Arc<dyn Store>,
    pub ids: Arc<dyn IdGenerator>,
    pub clock: Arc<dyn Clock>,
    pub webhooks: Arc<dyn WebhookSink>,
}

impl EngineContext {
    /// Create a context with random ids, the system clock and no webhooks
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            ids: Arc::new(UuidGenerator),
            clock: Arc::new(SystemClock),
            webhooks: Arc::new(NoopWebhookSink),
        }
    }

    /// Context over a fresh [`MemoryStore`]
    pub fn in_memory() -> (Self, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Self::new(store.clone()), store)
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_webhooks(mut self, webhooks: Arc<dyn WebhookSink>) -> Self {
        self.webhooks = webhooks;
        self
    }
}

/// All managers over one context
#[derive(Clone)]
pub struct Engine {
    pub tournaments: TournamentManager,
    pub brackets: BracketManager,
    pub matches: MatchManager,
}

impl Engine {
    pub fn new(ctx: EngineContext) -> Self {
        Self {
            tournaments: TournamentManager::new(ctx.clone()),
            brackets: BracketManager::new(ctx.clone()),
            matches: MatchManager::new(ctx),
        }
    }
}
