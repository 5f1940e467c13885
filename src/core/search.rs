use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_MIN_QUERY_LENGTH: usize = 2;

/// Drops repeated queries and queries that are too short to search for.
///
/// A short query still counts as "the last value", so typing `ham`, `h`,
/// `ham` searches for `ham` twice.
#[derive(Debug, Clone)]
pub struct SearchGate {
    min_length: usize,
    last: Option<String>,
}

impl SearchGate {
    pub fn new(min_length: usize) -> Self {
        Self {
            min_length,
            last: None,
        }
    }

    pub fn accept(&mut self, query: &str) -> Option<String> {
        if self.last.as_deref() == Some(query) {
            return None;
        }
        self.last = Some(query.to_string());

        if query.chars().count() < self.min_length {
            tracing::trace!(query, "query too short, not searching");
            return None;
        }
        Some(query.to_string())
    }
}

impl Default for SearchGate {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_QUERY_LENGTH)
    }
}

/// Spawns a task that forwards a query once input has been quiet for
/// `period`, filtered through `gate`. The last pending query is flushed when
/// the input side closes.
pub fn spawn_debouncer(
    mut input: mpsc::Receiver<String>,
    period: Duration,
    mut gate: SearchGate,
) -> (mpsc::Receiver<String>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(16);

    let handle = tokio::spawn(async move {
        let mut pending: Option<String> = None;

        loop {
            let Some(value) = pending.take() else {
                match input.recv().await {
                    Some(value) => pending = Some(value),
                    None => break,
                }
                continue;
            };

            let closed = tokio::select! {
                next = input.recv() => match next {
                    Some(next) => {
                        pending = Some(next);
                        continue;
                    }
                    None => true,
                },
                _ = tokio::time::sleep(period) => false,
            };

            if let Some(query) = gate.accept(&value) {
                tracing::debug!(query = %query, "search query settled");
                if tx.send(query).await.is_err() {
                    break;
                }
            }
            if closed {
                break;
            }
        }
    });

    (rx, handle)
}
