//! Start a server and embed it in the notebook output.

use std::collections::BTreeMap;
use std::io;

use crate::channel::{DisplayChannel, EvcxrChannel};
use crate::config::{DisplayOptions, ServerOptions};
use crate::environment::ExecutionEnvironment;
use crate::error::Result;
use crate::render::{self, DisplayRequest};
use crate::server::{AppServer, ServeHandle, ServerFactory};

/// Starts servers and embeds them into a notebook.
pub struct NotebookDisplay<F, C = EvcxrChannel<io::Stdout>> {
    factory: F,
    channel: C,
    environment: ExecutionEnvironment,
    server_options: ServerOptions,
}

impl<F: ServerFactory> NotebookDisplay<F> {
    /// Display through the kernel's stdout in the detected environment.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            channel: EvcxrChannel::stdout(),
            environment: ExecutionEnvironment::detect(),
            server_options: ServerOptions::default(),
        }
    }
}

impl<F: ServerFactory, C: DisplayChannel> NotebookDisplay<F, C> {
    /// Replace the display channel.
    pub fn with_channel<C2: DisplayChannel>(self, channel: C2) -> NotebookDisplay<F, C2> {
        NotebookDisplay {
            factory: self.factory,
            channel,
            environment: self.environment,
            server_options: self.server_options,
        }
    }

    /// Force an environment instead of the detected one.
    pub fn with_environment(mut self, environment: ExecutionEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_server_options(mut self, options: ServerOptions) -> Self {
        self.server_options = options;
        self
    }

    pub fn environment(&self) -> ExecutionEnvironment {
        self.environment
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn into_channel(self) -> C {
        self.channel
    }

    /// Start a server for the given models and datasets and embed it.
    ///
    /// The height is checked before anything is started or displayed. If
    /// displaying fails, the server is stopped before the error is returned.
    pub fn start_display(
        &mut self,
        models: BTreeMap<String, F::Model>,
        datasets: BTreeMap<String, F::Dataset>,
        options: &DisplayOptions,
    ) -> Result<StopHandle> {
        render::validate_height(options.height)?;

        let server = self
            .factory
            .construct(models, datasets, &self.server_options)?;
        let handle = server.serve()?;
        tracing::info!(
            port = handle.port(),
            environment = %self.environment,
            "Notebook server started"
        );

        let shown = DisplayRequest::new(handle.port(), options.height, options.proxy_url.clone())
            .and_then(|request| render::render(self.environment, &request, &mut self.channel));

        match shown {
            Ok(()) => Ok(StopHandle { handle }),
            Err(e) => {
                tracing::warn!(port = handle.port(), "Display failed, stopping server: {}", e);
                handle.stop();
                Err(e)
            }
        }
    }
}

/// Stops the server behind an embedded frame.
///
/// Stopping does not remove frames that were already rendered.
#[derive(Debug)]
#[must_use = "dropping the handle leaves the server running"]
pub struct StopHandle {
    handle: ServeHandle,
}

impl StopHandle {
    pub fn port(&self) -> u16 {
        self.handle.port()
    }

    /// Stop the server.
    pub fn stop(self) {
        let port = self.handle.port();
        self.handle.stop();
        tracing::info!(port, "Notebook server stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::channel::{DisplayPayload, MemoryChannel};
    use crate::error::Error;

    #[derive(Default, Clone)]
    struct Counters {
        constructed: Arc<AtomicUsize>,
        stopped: Arc<AtomicUsize>,
    }

    struct FakeFactory {
        port: u16,
        counters: Counters,
    }

    struct FakeServer {
        port: u16,
        counters: Counters,
    }

    impl ServerFactory for FakeFactory {
        type Model = ();
        type Dataset = ();
        type Server = FakeServer;

        fn construct(
            &self,
            _models: BTreeMap<String, ()>,
            _datasets: BTreeMap<String, ()>,
            _options: &ServerOptions,
        ) -> Result<FakeServer> {
            self.counters.constructed.fetch_add(1, Ordering::SeqCst);
            Ok(FakeServer {
                port: self.port,
                counters: self.counters.clone(),
            })
        }
    }

    impl AppServer for FakeServer {
        fn serve(self) -> Result<ServeHandle> {
            let stopped = self.counters.stopped;
            Ok(ServeHandle::new(self.port, move || {
                stopped.fetch_add(1, Ordering::SeqCst);
            }))
        }
    }

    struct ClosedChannel;

    impl DisplayChannel for ClosedChannel {
        fn display(&mut self, _payload: &DisplayPayload) -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed").into())
        }
    }

    fn display(counters: &Counters) -> NotebookDisplay<FakeFactory, MemoryChannel> {
        NotebookDisplay::new(FakeFactory {
            port: 4321,
            counters: counters.clone(),
        })
        .with_channel(MemoryChannel::new())
        .with_environment(ExecutionEnvironment::GenericLocal)
    }

    #[test]
    fn test_rejects_bad_height_before_serving() {
        let counters = Counters::default();
        let mut nb = display(&counters);

        for height in [0, -1] {
            let err = nb
                .start_display(BTreeMap::new(), BTreeMap::new(), &DisplayOptions::default().with_height(height))
                .unwrap_err();
            assert!(matches!(err, Error::InvalidHeight(h) if h == height));
        }

        assert_eq!(counters.constructed.load(Ordering::SeqCst), 0);
        assert!(nb.channel().payloads().is_empty());
    }

    #[test]
    fn test_one_payload_per_call() {
        let counters = Counters::default();
        let mut nb = display(&counters);

        let stop = nb
            .start_display(BTreeMap::new(), BTreeMap::new(), &DisplayOptions::default())
            .unwrap();
        assert_eq!(stop.port(), 4321);
        assert_eq!(nb.channel().payloads().len(), 1);
        assert_eq!(counters.stopped.load(Ordering::SeqCst), 0);

        stop.stop();
        assert_eq!(counters.stopped.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_hosted_environment_emits_script() {
        let counters = Counters::default();
        let mut nb = display(&counters).with_environment(ExecutionEnvironment::HostedProxyCapable);

        let _stop = nb
            .start_display(BTreeMap::new(), BTreeMap::new(), &DisplayOptions::default())
            .unwrap();
        assert!(matches!(nb.channel().payloads(), [DisplayPayload::Javascript(_)]));
    }

    #[test]
    fn test_display_failure_stops_server() {
        let counters = Counters::default();
        let mut nb = display(&counters).with_channel(ClosedChannel);

        let err = nb
            .start_display(BTreeMap::new(), BTreeMap::new(), &DisplayOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Display(_)));
        assert_eq!(counters.stopped.load(Ordering::SeqCst), 1);
    }
}
