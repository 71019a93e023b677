//! Background loading for views.
//!
//! A `Query<T>` runs its fetcher on a tokio task and hands the result back
//! through a channel. Views call `poll()` on every tick and read `state()`
//! when rendering, so the UI never blocks on the network.

use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Nothing requested yet
  Idle,
  Loading,
  Success(T),
  Error(String),
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send>>;
type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<T> + Send + Sync>;

pub struct Query<T> {
  state: QueryState<T>,
  fetcher: FetcherFn<T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, String>>>,
}

impl<T: Send + 'static> Query<T> {
  /// The fetcher is called again on every `fetch()`/`refetch()`.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move || Box::pin(fetcher())),
      receiver: None,
    }
  }

  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  pub fn data(&self) -> Option<&T> {
    match &self.state {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match &self.state {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }

  pub fn is_loading(&self) -> bool {
    matches!(self.state, QueryState::Loading)
  }

  /// Start loading unless a load is already running.
  pub fn fetch(&mut self) {
    if !self.is_loading() {
      self.spawn();
    }
  }

  /// Start a fresh load, discarding any result still in flight.
  pub fn refetch(&mut self) {
    self.receiver = None;
    self.spawn();
  }

  /// Pick up a finished result. Returns `true` when the state changed.
  pub fn poll(&mut self) -> bool {
    let Some(receiver) = self.receiver.as_mut() else {
      return false;
    };

    let next = match receiver.try_recv() {
      Ok(Ok(data)) => QueryState::Success(data),
      Ok(Err(error)) => QueryState::Error(error),
      Err(mpsc::error::TryRecvError::Empty) => return false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        QueryState::Error("Load was cancelled".to_string())
      }
    };

    self.state = next;
    self.receiver = None;
    true
  }

  fn spawn(&mut self) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.state = QueryState::Loading;

    let future = (self.fetcher)();
    tokio::spawn(async move {
      // Receiver is gone if the load was superseded.
      let _ = tx.send(future.await);
    });
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::sync::Arc;
  use std::time::Duration;

  #[tokio::test]
  async fn test_query_success() {
    let mut query = Query::new(|| async { Ok::<_, String>(vec!["Dune", "Piranesi"]) });
    assert!(matches!(query.state(), QueryState::Idle));

    query.fetch();
    assert!(query.is_loading());

    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(query.poll());
    assert_eq!(query.data(), Some(&vec!["Dune", "Piranesi"]));
    assert!(!query.poll());
  }

  #[tokio::test]
  async fn test_query_error() {
    let mut query: Query<u32> = Query::new(|| async { Err("shelf is private".to_string()) });

    query.fetch();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(query.poll());
    assert_eq!(query.error(), Some("shelf is private"));
    assert_eq!(query.data(), None);
  }

  #[tokio::test]
  async fn test_fetch_while_loading_is_noop() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();

    let mut query = Query::new(move || {
      counter.fetch_add(1, Ordering::SeqCst);
      async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok::<_, String>(())
      }
    });

    query.fetch();
    query.fetch();
    assert!(query.is_loading());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_refetch_discards_pending() {
    let counter = Arc::new(AtomicU32::new(0));
    let shared = counter.clone();

    let mut query = Query::new(move || {
      let counter = shared.clone();
      async move {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;
        Ok::<_, String>(n)
      }
    });

    query.fetch();
    tokio::time::sleep(Duration::from_millis(5)).await;
    query.refetch();
    tokio::time::sleep(Duration::from_millis(80)).await;

    query.poll();
    assert_eq!(query.data(), Some(&1));
  }
}
