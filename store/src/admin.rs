//! Administrative operations on the player table.
//!
//! Onboarding a player and changing a player's color never go through
//! [`PlayerRecordStore::update`]; they live here so the generic update path
//! cannot reach the store-owned color.
//!
//! Admin operations on one [`PlayerRecordStore`] run one at a time. Nothing
//! coordinates separate processes writing the same table, so provisioning
//! must have a single writer per table.

use roster_types::{Color, PlayerRecord};

use crate::backend::PersistenceBackend;
use crate::schema::{encode_row, header_row, COLOR_COL, HEADER_ROW, USER_ID_COL};
use crate::store::check_exact;
use crate::{PlayerRecordStore, StoreError};

pub struct Provisioner<'a, B> {
    store: &'a PlayerRecordStore<B>,
}

impl<'a, B: PersistenceBackend> Provisioner<'a, B> {
    pub fn new(store: &'a PlayerRecordStore<B>) -> Self {
        Self { store }
    }

    /// Appends a fresh, offline record at the origin. Fails if the key is
    /// already present anywhere in the table.
    pub async fn provision(&self, user_id: i64, color: Color) -> Result<PlayerRecord, StoreError> {
        check_exact("userId", user_id)?;
        let _guard = self.store.admin_lock.lock().await;

        if self.store.locate(user_id).await?.is_some() {
            return Err(StoreError::DuplicateKey(user_id));
        }

        let backend = self.store.backend();
        let last_row = backend.row_count().await?;
        if last_row < HEADER_ROW {
            backend
                .set_rows(HEADER_ROW, USER_ID_COL, vec![header_row()])
                .await?;
        }

        let record = PlayerRecord {
            user_id,
            x: 0,
            y: 0,
            online: false,
            notification: 0,
            color,
        };
        let row = last_row.max(HEADER_ROW) + 1;
        backend
            .set_rows(row, USER_ID_COL, vec![encode_row(&record)])
            .await?;

        tracing::info!(user_id, row, color = %record.color, "Player provisioned");
        Ok(record)
    }

    /// The one operation allowed to change a player's color. Only the color
    /// cell is written.
    pub async fn assign_color(&self, user_id: i64, color: Color) -> Result<(), StoreError> {
        let _guard = self.store.admin_lock.lock().await;
        let row = self
            .store
            .locate(user_id)
            .await?
            .ok_or(StoreError::KeyNotFound(user_id))?;

        self.store
            .backend()
            .set_rows(row, COLOR_COL, vec![vec![color.as_str().into()]])
            .await?;

        tracing::info!(user_id, row, color = %color, "Player color assigned");
        Ok(())
    }
}
