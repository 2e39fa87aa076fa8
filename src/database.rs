use mongodb::{bson, Client, Collection};
use tracing::info;

use crate::campaign::db::{CampaignRecords, PersistedCampaign};
use crate::config::DatabaseConfig;
use crate::error::Error;

pub type MongoCampaignRecords = Collection<PersistedCampaign>;

/// A database connection held for the length of a run.
///
/// `release` shuts the client down; dropping the connection without
/// releasing it still closes the client's pools.
#[derive(Debug)]
pub struct ScopedConnection {
    campaigns: MongoCampaignRecords,
    client: Client,
}

impl ScopedConnection {
    #[tracing::instrument(skip(config), fields(database = %config.name, collection = %config.collection))]
    pub async fn connect(config: &DatabaseConfig) -> Result<ScopedConnection, Error> {
        let client = Client::with_uri_str(&config.uri).await?;
        let db = client.database(&config.name);

        // ping the database to ensure connection is established
        db.run_command(bson::doc! { "ping": 1 }, None).await?;
        info!("connected to db: {}", config.name);

        Ok(ScopedConnection {
            campaigns: db.collection(&config.collection),
            client,
        })
    }

    pub fn campaigns(&self) -> &dyn CampaignRecords {
        &self.campaigns
    }

    pub async fn release(self) {
        info!("releasing db connection");
        self.client.shutdown().await;
    }
}
