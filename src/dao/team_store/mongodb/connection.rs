//! Connection bootstrap: builds the client and pings the database until it
//! answers, with a bounded doubling backoff.

use std::time::Duration;

use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use tokio::time::sleep;
use tracing::warn;

use super::error::{MongoDaoError, MongoResult};

const CONNECT_ATTEMPTS: u32 = 10;
const INITIAL_BACKOFF: Duration = Duration::from_millis(250);
const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// Open a handle to `database_name` and wait for it to respond to a ping.
///
/// The returned [`Database`] keeps its client alive internally. When the
/// attempt budget runs out, the last ping error is surfaced.
pub async fn establish_connection(
    options: &ClientOptions,
    database_name: &str,
) -> MongoResult<Database> {
    let client = Client::with_options(options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(database_name);

    let mut backoff = INITIAL_BACKOFF;
    let mut attempt = 0;
    loop {
        attempt += 1;
        match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => return Ok(database),
            Err(err) => {
                if attempt >= CONNECT_ATTEMPTS {
                    return Err(MongoDaoError::InitialPing {
                        attempts: attempt,
                        source: err,
                    });
                }
                warn!(attempt, error = %err, "MongoDB ping failed, retrying");
                sleep(backoff).await;
                backoff = next_backoff(backoff);
            }
        }
    }
}

fn next_backoff(current: Duration) -> Duration {
    (current * 2).min(MAX_BACKOFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps_out() {
        let mut delay = INITIAL_BACKOFF;
        let mut schedule = Vec::new();
        for _ in 0..6 {
            schedule.push(delay);
            delay = next_backoff(delay);
        }
        assert_eq!(
            schedule,
            vec![
                Duration::from_millis(250),
                Duration::from_millis(500),
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(5),
            ]
        );
        assert_eq!(next_backoff(MAX_BACKOFF), MAX_BACKOFF);
    }
}
