//! Persisted "has the dew heater run before" marker.
//!
//! Only its presence matters to the controller; the stored value is the
//! unix time of the first run, kept for inspection.  The core never
//! deletes it.

use super::ports::{StorageError, StoragePort};

pub const RUN_MARKER_NAMESPACE: &str = "dewheater";
pub const RUN_MARKER_KEY: &str = "lastrun";

pub fn exists(store: &impl StoragePort) -> bool {
    store.exists(RUN_MARKER_NAMESPACE, RUN_MARKER_KEY)
}

/// Timestamp stored by [`record`], if any.
pub fn load(store: &impl StoragePort) -> Result<Option<u64>, StorageError> {
    match store.read(RUN_MARKER_NAMESPACE, RUN_MARKER_KEY) {
        Ok(bytes) => postcard::from_bytes(&bytes)
            .map(Some)
            .map_err(|_| StorageError::Corrupted),
        Err(StorageError::NotFound) => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn record(store: &mut impl StoragePort, unix_secs: u64) -> Result<(), StorageError> {
    let bytes = postcard::to_allocvec(&unix_secs).map_err(|_| StorageError::Corrupted)?;
    store.write(RUN_MARKER_NAMESPACE, RUN_MARKER_KEY, &bytes)
}
