use std::collections::HashMap;
use std::time::Duration;

use roster_store::{PersistenceBackend, PlayerRecord, PlayerRecordStore};

pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Differences between two consecutive roster snapshots.
#[derive(Debug, Default, PartialEq)]
pub struct RosterChanges {
    pub joined: Vec<i64>,
    pub left: Vec<i64>,
    pub changed: Vec<i64>,
}

impl RosterChanges {
    pub fn between(previous: &[PlayerRecord], current: &[PlayerRecord]) -> Self {
        let before: HashMap<i64, &PlayerRecord> =
            previous.iter().map(|r| (r.user_id, r)).collect();
        let after: HashMap<i64, &PlayerRecord> = current.iter().map(|r| (r.user_id, r)).collect();

        let mut changes = Self::default();
        for record in current {
            match before.get(&record.user_id) {
                None => changes.joined.push(record.user_id),
                Some(old) if *old != record => changes.changed.push(record.user_id),
                Some(_) => {}
            }
        }
        for record in previous {
            if !after.contains_key(&record.user_id) {
                changes.left.push(record.user_id);
            }
        }
        changes
    }

    pub fn is_empty(&self) -> bool {
        self.joined.is_empty() && self.left.is_empty() && self.changed.is_empty()
    }
}

/// Polls the roster the way a game client does: a full snapshot every
/// `interval`, with no notification between polls. Runs forever when
/// `rounds` is `None`. Intervals shorter than a millisecond are raised to one.
pub async fn poll_roster<B: PersistenceBackend>(
    store: &PlayerRecordStore<B>,
    interval: Duration,
    rounds: Option<usize>,
) -> Vec<PlayerRecord> {
    let mut ticker = tokio::time::interval(interval.max(MIN_POLL_INTERVAL));
    let mut previous: Vec<PlayerRecord> = Vec::new();
    let mut round = 0;

    while rounds.map_or(true, |limit| round < limit) {
        ticker.tick().await;
        round += 1;

        let current = store.read_all().await;
        let changes = RosterChanges::between(&previous, &current);
        let polled_at = chrono::Utc::now().format("%H:%M:%S%.3f");
        if changes.is_empty() {
            log::debug!("[{polled_at}] round {round}: no changes");
        } else {
            log::info!(
                "[{polled_at}] round {round}: {} players, joined {:?}, left {:?}, changed {:?}",
                current.len(),
                changes.joined,
                changes.left,
                changes.changed
            );
        }
        previous = current;
    }
    previous
}
