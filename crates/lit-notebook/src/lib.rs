//! Notebook embedding for the model-analysis server.
//!
//! This crate starts a server through a [`ServerFactory`] and embeds it as
//! a live frame in the notebook's output:
//! - **Environment**: detects whether the kernel runs in a hosted runtime
//!   with a port proxy (Colab) or in a local notebook (Jupyter)
//! - **Render**: builds the frame markup for that environment
//! - **Template**: escapes every interpolated value for its context
//! - **Channel**: writes the markup to the notebook's output area
//!
//! # Example
//!
//! ```rust,ignore
//! use lit_notebook::{DisplayOptions, NotebookDisplay};
//!
//! let mut display = NotebookDisplay::new(factory);
//! let stop = display.start_display(models, datasets, &DisplayOptions::default())?;
//! // ... later
//! stop.stop();
//! ```

pub mod channel;
pub mod config;
pub mod environment;
pub mod error;
pub mod frame;
pub mod notebook;
pub mod render;
pub mod server;
pub mod template;

pub use channel::{DisplayChannel, DisplayPayload, EvcxrChannel, MemoryChannel};
pub use config::{DEFAULT_HEIGHT, DisplayOptions, ServerOptions, ServerType};
pub use environment::ExecutionEnvironment;
pub use error::{Error, Result};
pub use frame::FrameId;
pub use notebook::{NotebookDisplay, StopHandle};
pub use render::{
    DisplayRequest, EmbedRenderer, FrameTarget, HostedProxyRenderer, LocalFrameRenderer,
    PORT_TOKEN, proxied_base_url,
};
pub use server::{AppServer, ServeHandle, ServerFactory};
