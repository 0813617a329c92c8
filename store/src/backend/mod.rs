pub mod cell_value;
pub mod memory;
pub mod sqlite;
pub mod traits;

pub use cell_value::CellValue;
pub use memory::MemoryTable;
pub use sqlite::SqliteTable;
pub use traits::PersistenceBackend;

pub(crate) fn check_origin(row: usize, col: usize) -> Result<(), crate::BackendError> {
    if row == 0 || col == 0 {
        return Err(crate::BackendError::InvalidRange { row, col });
    }
    Ok(())
}
