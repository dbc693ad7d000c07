//! Server collaborator contract.
//!
//! The notebook bridge never looks inside the server. It only constructs
//! one from the model and dataset handles, asks it to serve, and hands the
//! resulting [`ServeHandle`] back to the caller.

use std::collections::BTreeMap;

use crate::config::ServerOptions;
use crate::error::Result;

/// Builds servers from named model and dataset handles.
pub trait ServerFactory {
    /// Opaque model handle.
    type Model;
    /// Opaque dataset handle.
    type Dataset;
    /// Server produced by this factory.
    type Server: AppServer;

    fn construct(
        &self,
        models: BTreeMap<String, Self::Model>,
        datasets: BTreeMap<String, Self::Dataset>,
        options: &ServerOptions,
    ) -> Result<Self::Server>;
}

/// A constructed server that has not started yet.
pub trait AppServer {
    /// Start serving and report the bound port.
    fn serve(self) -> Result<ServeHandle>;
}

/// Handle to a running server.
pub struct ServeHandle {
    port: u16,
    stop: Box<dyn FnOnce() + Send>,
}

impl ServeHandle {
    pub fn new(port: u16, stop: impl FnOnce() + Send + 'static) -> Self {
        Self {
            port,
            stop: Box::new(stop),
        }
    }

    /// Port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Stop the server.
    pub fn stop(self) {
        (self.stop)();
    }
}

impl std::fmt::Debug for ServeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServeHandle")
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_stop_runs_callback_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handle = ServeHandle::new(8080, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(handle.port(), 8080);
        handle.stop();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_does_not_stop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        drop(ServeHandle::new(1, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
