//! In-memory [`EntityStore`] used by the service tests.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use agenda_domain::error::AgendaError;
use agenda_domain::record::Record;

use crate::ports::EntityStore;

pub struct InMemoryStore<T> {
    store: Mutex<HashMap<String, T>>,
    fail_puts: AtomicBool,
}

impl<T> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
            fail_puts: AtomicBool::new(false),
        }
    }
}

impl<T> InMemoryStore<T> {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every subsequent `put` fail with a storage error.
    pub fn fail_puts(&self) {
        self.fail_puts.store(true, Ordering::SeqCst);
    }
}

impl<T: Record> EntityStore<T> for InMemoryStore<T> {
    fn put(&self, key: &str, record: T) -> impl Future<Output = Result<(), AgendaError>> + Send {
        let result = if self.fail_puts.load(Ordering::SeqCst) {
            Err(AgendaError::Storage(Box::new(std::io::Error::other(
                "write refused",
            ))))
        } else {
            self.store.lock().unwrap().insert(key.to_string(), record);
            Ok(())
        };
        async { result }
    }

    fn get(&self, key: &str) -> impl Future<Output = Result<Option<T>, AgendaError>> + Send {
        let result = self.store.lock().unwrap().get(key).cloned();
        async { Ok(result) }
    }

    fn delete(&self, key: &str) -> impl Future<Output = Result<(), AgendaError>> + Send {
        self.store.lock().unwrap().remove(key);
        async { Ok(()) }
    }

    fn keys(&self) -> impl Future<Output = Result<HashSet<String>, AgendaError>> + Send {
        let result: HashSet<String> = self.store.lock().unwrap().keys().cloned().collect();
        async { Ok(result) }
    }

    fn all(&self) -> impl Future<Output = Result<Vec<T>, AgendaError>> + Send {
        let result: Vec<T> = self.store.lock().unwrap().values().cloned().collect();
        async { Ok(result) }
    }
}
