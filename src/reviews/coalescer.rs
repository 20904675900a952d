//! Single-flight execution of review jobs.
//!
//! Callers asking for the same key while a job is running share its result
//! instead of submitting another job. The job itself runs as a spawned task:
//! dropping a waiter never cancels the provider job, and the table entry is
//! removed when the task ends, whether it returned, failed or panicked.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::task::JoinError;

/// A pending result that any number of callers can await.
pub type SharedFlight<V, E> = Shared<BoxFuture<'static, Result<V, E>>>;

/// Whether a call started a new flight or joined an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flight {
    Started,
    Joined,
}

struct Entry<V, E> {
    generation: u64,
    future: SharedFlight<V, E>,
}

type Table<K, V, E> = Arc<Mutex<HashMap<K, Entry<V, E>>>>;

fn lock<K, V, E>(
    table: &Mutex<HashMap<K, Entry<V, E>>>,
) -> MutexGuard<'_, HashMap<K, Entry<V, E>>> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Removes a finished flight from the table when dropped.
struct EntryGuard<K: Eq + Hash, V, E> {
    table: Table<K, V, E>,
    key: K,
    generation: u64,
}

impl<K: Eq + Hash, V, E> Drop for EntryGuard<K, V, E> {
    fn drop(&mut self) {
        let mut table = lock(&self.table);
        if table
            .get(&self.key)
            .is_some_and(|entry| entry.generation == self.generation)
        {
            table.remove(&self.key);
        }
    }
}

/// In-flight job table keyed by `K`.
pub struct SingleFlight<K, V, E> {
    inflight: Table<K, V, E>,
    next_generation: AtomicU64,
}

impl<K, V, E> SingleFlight<K, V, E>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + From<JoinError> + 'static,
{
    pub fn new() -> Self {
        Self {
            inflight: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Join the flight running for `key`, or start `compute` as a new one.
    ///
    /// The lookup and the insertion happen under one lock, so two racing
    /// callers can never both start a flight for the same key. `compute`
    /// is only invoked when a new flight starts.
    pub fn get_or_create<F, Fut>(&self, key: K, compute: F) -> (Flight, SharedFlight<V, E>)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let mut table = lock(&self.inflight);

        if let Some(entry) = table.get(&key) {
            return (Flight::Joined, entry.future.clone());
        }

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let guard = EntryGuard {
            table: Arc::clone(&self.inflight),
            key: key.clone(),
            generation,
        };

        let work = compute();
        // Spawned while the table is locked: the guard cannot run before the
        // entry below is inserted.
        let handle = tokio::spawn(async move {
            let _guard = guard;
            work.await
        });

        let future = async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => Err(E::from(e)),
            }
        }
        .boxed()
        .shared();

        table.insert(
            key,
            Entry {
                generation,
                future: future.clone(),
            },
        );

        (Flight::Started, future)
    }

    /// Number of flights currently running.
    pub fn in_flight(&self) -> usize {
        lock(&self.inflight).len()
    }

    /// Whether a flight for `key` is running.
    #[cfg(test)]
    pub fn contains(&self, key: &K) -> bool {
        lock(&self.inflight).contains_key(key)
    }
}

impl<K, V, E> Default for SingleFlight<K, V, E>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + From<JoinError> + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
