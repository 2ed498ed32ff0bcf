//! Record: the contract every persisted type fulfils.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A value that can be kept in a keyed store.
///
/// Each record type lives in its own collection and is addressed by a stable,
/// human-chosen string key.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Name of the durable container holding records of this type.
    const COLLECTION: &'static str;

    /// Key this record is stored under.
    fn key(&self) -> &str;
}
