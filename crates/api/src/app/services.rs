use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use faishion_core::Username;
use faishion_infra::store::{InMemoryStores, PostgresStore};
use faishion_infra::QnaService;

use crate::config::ApiConfig;

const DEMO_PRODUCTS: [i64; 3] = [1, 2, 3];
const DEMO_CUSTOMERS: [&str; 2] = ["alice", "bob"];
const DEMO_SELLERS: [&str; 1] = ["shop"];

#[derive(Clone)]
pub struct AppServices {
    pub qna: QnaService,
}

impl AppServices {
    pub fn from_in_memory(stores: &InMemoryStores) -> Self {
        Self {
            qna: stores.service(),
        }
    }

    pub fn from_postgres(store: PostgresStore) -> Self {
        let store = Arc::new(store);
        Self {
            qna: QnaService::new(store.clone(), store.clone(), store),
        }
    }
}

/// Pick the storage backend from configuration.
pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let Some(url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set; using in-memory stores with demo fixtures");
        let stores = InMemoryStores::new();
        seed_demo(&stores);
        return Ok(AppServices::from_in_memory(&stores));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(url)
        .await
        .context("failed to connect to Postgres")?;

    let store = PostgresStore::new(pool);
    store
        .apply_schema()
        .await
        .context("failed to apply qna schema")?;

    tracing::info!(
        max_connections = config.database_max_connections,
        "connected to Postgres"
    );
    Ok(AppServices::from_postgres(store))
}

/// Products 1..=3, customers `alice` and `bob`, seller `shop`.
pub fn seed_demo(stores: &InMemoryStores) {
    for id in DEMO_PRODUCTS {
        stores.add_product(id);
    }
    for name in DEMO_CUSTOMERS {
        if let Ok(username) = Username::parse(name) {
            stores.add_customer(username);
        }
    }
    for name in DEMO_SELLERS {
        if let Ok(username) = Username::parse(name) {
            stores.add_seller(username);
        }
    }
}
