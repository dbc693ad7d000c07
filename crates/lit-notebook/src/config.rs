//! Server and display configuration.
//!
//! Configuration is passed down explicitly; nothing here is process-global.

use serde::{Deserialize, Serialize};

/// Default frame height in pixels.
pub const DEFAULT_HEIGHT: i64 = 1000;

/// How the server is hosted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerType {
    /// Background server owned by a notebook kernel.
    #[default]
    Notebook,
    /// Foreground server run from the command line.
    Standalone,
}

impl ServerType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Notebook => "notebook",
            Self::Standalone => "standalone",
        }
    }
}

/// Options handed to the server collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerOptions {
    pub server_type: ServerType,
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on; `None` picks a free port.
    pub port: Option<u16>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            server_type: ServerType::Notebook,
            host: "localhost".to_string(),
            port: None,
        }
    }
}

/// Options controlling how the frame is displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    /// Frame height in pixels; must be positive.
    pub height: i64,
    /// Proxy URL template for notebooks served behind a proxy.
    ///
    /// Every `%PORT%` is replaced with the server's port.
    pub proxy_url: Option<String>,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            height: DEFAULT_HEIGHT,
            proxy_url: None,
        }
    }
}

impl DisplayOptions {
    pub fn with_height(mut self, height: i64) -> Self {
        self.height = height;
        self
    }

    pub fn with_proxy_url(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }
}
