//! Notebook display channel.
//!
//! Rust kernels display rich output by printing it between evcxr content
//! markers on stdout; the kernel forwards the body to the front-end as a
//! `display_data` message with the given MIME type.

use std::io::{self, Write};

use serde_json::json;

use crate::error::Result;

/// Rich output accepted by the notebook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayPayload {
    /// HTML fragment rendered into the output area.
    Html(String),
    /// Script executed by the front-end.
    Javascript(String),
}

impl DisplayPayload {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Html(_) => "text/html",
            Self::Javascript(_) => "application/javascript",
        }
    }

    pub fn body(&self) -> &str {
        match self {
            Self::Html(body) | Self::Javascript(body) => body,
        }
    }

    /// Jupyter MIME bundle for a `display_data` message.
    pub fn mime_bundle(&self) -> serde_json::Value {
        let mut bundle = serde_json::Map::new();
        bundle.insert(self.mime_type().to_string(), json!(self.body()));
        serde_json::Value::Object(bundle)
    }
}

/// Destination for rendered payloads.
///
/// Payloads are rendered in the order they are displayed.
pub trait DisplayChannel {
    fn display(&mut self, payload: &DisplayPayload) -> Result<()>;
}

impl<C: DisplayChannel + ?Sized> DisplayChannel for &mut C {
    fn display(&mut self, payload: &DisplayPayload) -> Result<()> {
        (**self).display(payload)
    }
}

impl<C: DisplayChannel + ?Sized> DisplayChannel for Box<C> {
    fn display(&mut self, payload: &DisplayPayload) -> Result<()> {
        (**self).display(payload)
    }
}

/// Channel speaking the evcxr rich-output protocol.
#[derive(Debug)]
pub struct EvcxrChannel<W> {
    writer: W,
}

impl EvcxrChannel<io::Stdout> {
    /// Channel writing to the kernel's stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> EvcxrChannel<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DisplayChannel for EvcxrChannel<W> {
    fn display(&mut self, payload: &DisplayPayload) -> Result<()> {
        write!(
            self.writer,
            "EVCXR_BEGIN_CONTENT {}\n{}\nEVCXR_END_CONTENT\n",
            payload.mime_type(),
            payload.body()
        )?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Channel that keeps every payload in memory.
#[derive(Debug, Default)]
pub struct MemoryChannel {
    payloads: Vec<DisplayPayload>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payloads displayed so far, oldest first.
    pub fn payloads(&self) -> &[DisplayPayload] {
        &self.payloads
    }

    pub fn into_payloads(self) -> Vec<DisplayPayload> {
        self.payloads
    }
}

impl DisplayChannel for MemoryChannel {
    fn display(&mut self, payload: &DisplayPayload) -> Result<()> {
        self.payloads.push(payload.clone());
        Ok(())
    }
}
