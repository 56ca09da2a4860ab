use crate::{config::Config, db::Database, draft::DraftRegistry};
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Config,
    pub drafts: DraftRegistry,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> Self {
        let drafts = DraftRegistry::new(&config);
        Self { db, config, drafts }
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
