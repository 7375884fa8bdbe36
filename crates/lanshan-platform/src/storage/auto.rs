//! Pick the best storage backend available in this context.
//!
//! IndexedDB when the page can open it, otherwise memory. Session history is
//! best-effort, so the fallback is logged and never fatal.

use std::rc::Rc;
use lanshan_core::ports::StoragePort;
use super::{IndexedDbStorage, MemoryStorage};

pub async fn auto_detect_storage() -> Rc<dyn StoragePort> {
    match IndexedDbStorage::open().await {
        Ok(idb) => {
            log::info!("storage backend: {}", idb.backend_name());
            Rc::new(idb)
        }
        Err(e) => {
            log::warn!("IndexedDB unavailable ({}), history will not persist", e);
            Rc::new(MemoryStorage::new())
        }
    }
}
