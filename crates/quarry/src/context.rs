use quarry_core::{driver::Connection, Error, Result};

use indexmap::IndexMap;
use std::{
    future::pending,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};
use tokio::{sync::watch, time::Instant};
use tracing::warn;

/// State carried by one logical operation: a Load, a Save, a transaction
/// scope.
///
/// A context holds at most one connection per database key, so statements
/// issued through it run in program order on the same session. It is not
/// meant to be shared between tasks; create one per request.
#[derive(Debug)]
pub struct Context {
    id: u64,
    scopes: IndexMap<String, Scope>,
    cancel: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

/// Per database key state.
#[derive(Debug, Default)]
pub(crate) struct Scope {
    pub(crate) conn: Option<Box<dyn Connection>>,

    /// Nesting depth of `begin` calls
    pub(crate) depth: usize,

    /// A rollback was requested or a statement failed inside the transaction
    pub(crate) failed: bool,

    /// The connection carrying the transaction was torn down
    pub(crate) aborted: bool,
}

/// Cancels the context it was created from, and every in-flight driver call
/// made through it.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: std::sync::Arc<watch::Sender<bool>>,
}

/// Resolves when the context is cancelled or its deadline passes. Detached
/// from the context so it can race a call that borrows it.
#[derive(Debug, Clone)]
pub(crate) struct Signal {
    cancel: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

fn next_id() -> u64 {
    static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);
    NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed)
}

impl Context {
    pub fn new() -> Context {
        Context {
            id: next_id(),
            scopes: IndexMap::new(),
            cancel: None,
            deadline: None,
        }
    }

    /// Returns a handle that cancels this context.
    pub fn cancellable(&mut self) -> CancelHandle {
        let (tx, rx) = watch::channel(false);
        self.cancel = Some(rx);
        CancelHandle {
            tx: std::sync::Arc::new(tx),
        }
    }

    /// Cancels the context once `duration` has elapsed.
    pub fn with_timeout(mut self, duration: Duration) -> Context {
        self.deadline = Some(Instant::now() + duration);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Context {
        self.deadline = Some(deadline);
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::cancelled())
        } else {
            Ok(())
        }
    }

    /// Returns `true` if a transaction is open on the database `key`.
    pub fn in_transaction(&self, key: &str) -> bool {
        self.scopes.get(key).is_some_and(|scope| scope.depth > 0)
    }

    pub(crate) fn signal(&self) -> Signal {
        Signal {
            cancel: self.cancel.clone(),
            deadline: self.deadline,
        }
    }

    pub(crate) fn scope(&mut self, key: &str) -> &mut Scope {
        if !self.scopes.contains_key(key) {
            self.scopes.insert(key.to_string(), Scope::default());
        }
        &mut self.scopes[key]
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        for (key, scope) in &self.scopes {
            if scope.depth > 0 {
                warn!(
                    database = %key,
                    depth = scope.depth,
                    "context dropped with an open transaction; the connection is closed and the server rolls it back"
                );
            }
        }
    }
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Signal {
    pub(crate) async fn cancelled(self) {
        let Signal { cancel, deadline } = self;

        let cancel = async move {
            match cancel {
                Some(mut rx) => loop {
                    if *rx.borrow_and_update() {
                        return;
                    }
                    if rx.changed().await.is_err() {
                        pending::<()>().await;
                    }
                },
                None => pending::<()>().await,
            }
        };

        let deadline = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            _ = cancel => {}
            _ = deadline => {}
        }
    }
}
