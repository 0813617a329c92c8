use roster_types::{PlayerRecord, PlayerUpdate};
use tokio::sync::Mutex;

use crate::backend::{CellValue, PersistenceBackend};
use crate::schema::{
    decode_color, decode_row, encode_row_with_color, is_exact_integer, parse_key, COLOR_COL,
    COLUMN_COUNT, FIRST_DATA_ROW, USER_ID_COL,
};
use crate::StoreError;

/// Typed access to the player table.
///
/// The store keeps no state between calls: every read goes to the backend and
/// every update is a read-back of the store-owned color followed by one
/// full-row write. That pair is not atomic, so two concurrent updates of the
/// same key resolve last-writer-wins on the whole row.
///
/// The only lock it holds serialises the administrative path, so two
/// provisions in one process cannot both pass the duplicate check.
pub struct PlayerRecordStore<B> {
    backend: B,
    pub(crate) admin_lock: Mutex<()>,
}

impl<B: PersistenceBackend> PlayerRecordStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            admin_lock: Mutex::new(()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Full roster in table order. An unreachable backend yields an empty
    /// roster; use [`PlayerRecordStore::try_read_all`] to tell the two apart.
    pub async fn read_all(&self) -> Vec<PlayerRecord> {
        match self.try_read_all().await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read roster, returning empty roster");
                Vec::new()
            }
        }
    }

    pub async fn try_read_all(&self) -> Result<Vec<PlayerRecord>, StoreError> {
        let last_row = self.backend.row_count().await?;
        if last_row < FIRST_DATA_ROW {
            return Ok(Vec::new());
        }

        let rows = self
            .backend
            .get_rows(
                FIRST_DATA_ROW,
                USER_ID_COL,
                last_row - FIRST_DATA_ROW + 1,
                COLUMN_COUNT,
            )
            .await?;

        let records = rows
            .iter()
            .enumerate()
            .map(|(offset, cells)| {
                let (record, coerced) = decode_row(cells);
                for col in coerced {
                    tracing::warn!(
                        row = FIRST_DATA_ROW + offset,
                        col,
                        user_id = record.user_id,
                        "Malformed cell coerced to default"
                    );
                }
                record
            })
            .collect();
        Ok(records)
    }

    /// Pushes a client's caller-owned fields. Returns `false` when the key is
    /// unknown or the backend fails; the failure is logged, never retried.
    pub async fn update(&self, update: &PlayerUpdate) -> bool {
        match self.try_update(update).await {
            Ok(_) => true,
            Err(StoreError::KeyNotFound(user_id)) => {
                tracing::warn!(user_id, "Update rejected, no such player");
                false
            }
            Err(e) => {
                tracing::error!(user_id = update.user_id, error = %e, "Failed to update player");
                false
            }
        }
    }

    /// Same as [`PlayerRecordStore::update`], returning the record as written.
    pub async fn try_update(&self, update: &PlayerUpdate) -> Result<PlayerRecord, StoreError> {
        check_exact("userId", update.user_id)?;
        check_exact("notification", update.notification)?;

        let row = self
            .locate(update.user_id)
            .await?
            .ok_or(StoreError::KeyNotFound(update.user_id))?;

        // The raw color cell goes back verbatim; only the returned record sees
        // the decoded token.
        let color = self.backend.get_cell(row, COLOR_COL).await?;
        let record = update.into_record(decode_color(&color));

        self.backend
            .set_rows(row, USER_ID_COL, vec![encode_row_with_color(&record, color)])
            .await?;
        tracing::debug!(user_id = record.user_id, row, "Player updated");
        Ok(record)
    }

    pub async fn find(&self, user_id: i64) -> Result<Option<PlayerRecord>, StoreError> {
        let Some(row) = self.locate(user_id).await? else {
            return Ok(None);
        };
        let cells = self
            .backend
            .get_rows(row, USER_ID_COL, 1, COLUMN_COUNT)
            .await?;
        Ok(cells.first().map(|cells| decode_row(cells).0))
    }

    /// Row holding `user_id`, scanning the key column top to bottom. The first
    /// match wins; keys that are not integers never match.
    pub(crate) async fn locate(&self, user_id: i64) -> Result<Option<usize>, StoreError> {
        let keys = self.keys().await?;
        Ok(keys
            .iter()
            .position(|key| parse_key(key) == Some(user_id))
            .map(|offset| FIRST_DATA_ROW + offset))
    }

    /// Raw key column below the header.
    pub(crate) async fn keys(&self) -> Result<Vec<CellValue>, StoreError> {
        let last_row = self.backend.row_count().await?;
        if last_row < FIRST_DATA_ROW {
            return Ok(Vec::new());
        }
        let column = self
            .backend
            .get_rows(FIRST_DATA_ROW, USER_ID_COL, last_row - FIRST_DATA_ROW + 1, 1)
            .await?;
        Ok(column
            .into_iter()
            .map(|mut row| row.pop().unwrap_or_default())
            .collect())
    }
}

/// Integers beyond 2^53 would be rounded by a numeric cell, so they are
/// refused before anything is written.
pub(crate) fn check_exact(field: &'static str, value: i64) -> Result<(), StoreError> {
    if is_exact_integer(value) {
        Ok(())
    } else {
        Err(StoreError::ValueOutOfRange { field, value })
    }
}
