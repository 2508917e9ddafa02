use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{api, database, logger, server::Server};
use migration::{Migrator, MigratorTrait};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
}

impl AppState {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db: Arc::new(db) }
    }
}

pub async fn run() -> anyhow::Result<()> {
    let router = api::create_router();

    logger::init();

    tracing::info!("Starting application...");

    let db = database::init()
        .await
        .expect("Failed to initialize database");

    Migrator::up(&db, None).await?;

    let state = AppState::new(db);

    let server = Server::new(crate::config::get().server());

    server.start(state, router).await?;

    Ok(())
}
