use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::ConsistencyConfig;
use crate::error::Error;

use super::db::CampaignRecords;

/// How long to keep looking for a campaign the service accepted but may not
/// have written yet.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub timeout: Duration,
}

impl From<&ConsistencyConfig> for PollPolicy {
    fn from(config: &ConsistencyConfig) -> PollPolicy {
        PollPolicy {
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }
}

/// Reads until a campaign named exactly `name` is visible, backing off
/// between attempts, and gives up once `policy.timeout` has passed.
#[tracing::instrument(skip(records))]
pub async fn await_campaign_persisted(
    records: &dyn CampaignRecords,
    name: &str,
    policy: &PollPolicy,
) -> Result<String, Error> {
    let started = Instant::now();
    let mut delay = policy.initial_delay;
    let mut attempts = 0;

    loop {
        attempts += 1;
        if let Some(stored) = records.find_campaign_by_name(name).await? {
            debug!(attempts, "campaign is persisted");
            return Ok(stored);
        }

        let elapsed = started.elapsed();
        if elapsed >= policy.timeout {
            return Err(Error::PersistenceTimeout {
                name: name.to_string(),
                attempts,
            });
        }

        let remaining = policy.timeout - elapsed;
        tokio::time::sleep(delay.min(remaining)).await;
        delay = (delay * 2).min(policy.max_delay);
    }
}
