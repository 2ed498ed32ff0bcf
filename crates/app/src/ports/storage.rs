//! Storage port: a keyed, durable collection of one record type.

use std::collections::HashSet;
use std::future::Future;
use std::iter::Filter;
use std::sync::Arc;
use std::vec::IntoIter;

use agenda_domain::error::AgendaError;
use agenda_domain::record::Record;

/// Durable keyed storage for records of type `T`.
///
/// Contract:
/// - `put` replaces any value under the key in full and is durable once the
///   returned future resolves.
/// - `get` of a missing key is `Ok(None)`; `Err` is reserved for
///   [`AgendaError::Storage`] faults.
/// - `delete` of a missing key is a no-op.
/// - Reads observe whole values per key, never a partially applied write.
pub trait EntityStore<T: Record>: Send + Sync {
    /// Insert or replace the record stored under `key`.
    fn put(&self, key: &str, record: T) -> impl Future<Output = Result<(), AgendaError>> + Send;

    /// Read the last value written under `key`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<T>, AgendaError>> + Send;

    /// Remove `key`.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), AgendaError>> + Send;

    /// All keys currently stored.
    fn keys(&self) -> impl Future<Output = Result<HashSet<String>, AgendaError>> + Send;

    /// Snapshot of every record currently stored.
    fn all(&self) -> impl Future<Output = Result<Vec<T>, AgendaError>> + Send;

    /// Records matching `predicate`, taken from a fresh snapshot.
    ///
    /// The predicate runs lazily as the returned iterator is consumed; the
    /// iterator is not a live view and never sees later writes.
    fn filter<P>(
        &self,
        predicate: P,
    ) -> impl Future<Output = Result<Filter<IntoIter<T>, P>, AgendaError>> + Send
    where
        P: FnMut(&T) -> bool + Send,
    {
        async move { Ok(self.all().await?.into_iter().filter(predicate)) }
    }
}

impl<T: Record, S: EntityStore<T>> EntityStore<T> for Arc<S> {
    fn put(&self, key: &str, record: T) -> impl Future<Output = Result<(), AgendaError>> + Send {
        (**self).put(key, record)
    }

    fn get(&self, key: &str) -> impl Future<Output = Result<Option<T>, AgendaError>> + Send {
        (**self).get(key)
    }

    fn delete(&self, key: &str) -> impl Future<Output = Result<(), AgendaError>> + Send {
        (**self).delete(key)
    }

    fn keys(&self) -> impl Future<Output = Result<HashSet<String>, AgendaError>> + Send {
        (**self).keys()
    }

    fn all(&self) -> impl Future<Output = Result<Vec<T>, AgendaError>> + Send {
        (**self).all()
    }
}
