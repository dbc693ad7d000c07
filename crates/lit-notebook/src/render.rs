//! Embed markup for notebook front-ends.
//!
//! The [`EmbedRenderer`] trait turns a [`DisplayRequest`] into a
//! [`DisplayPayload`] that the notebook renders as a live frame pointing at
//! the running server. There is one renderer per
//! [`ExecutionEnvironment`](crate::ExecutionEnvironment):
//!
//! - [`HostedProxyRenderer`] asks the hosted runtime to proxy the port and
//!   builds the frame from script once the proxied URL is known.
//! - [`LocalFrameRenderer`] emits the frame directly and points it at the
//!   server relative to the notebook page, optionally through a proxy URL
//!   template.

use std::num::NonZeroU32;

use crate::channel::{DisplayChannel, DisplayPayload};
use crate::environment::ExecutionEnvironment;
use crate::error::{Error, Result};
use crate::frame::FrameId;
use crate::template::{Template, Value};

/// Placeholder token replaced by the decimal port in proxy URL templates.
pub const PORT_TOKEN: &str = "%PORT%";

/// What to embed and how tall to make it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRequest {
    port: u16,
    height: NonZeroU32,
    proxy_url: Option<String>,
}

impl DisplayRequest {
    /// Build a request, rejecting heights that are not positive pixel counts.
    pub fn new(port: u16, height: i64, proxy_url: Option<String>) -> Result<Self> {
        let height = validate_height(height)?;
        Ok(Self {
            port,
            height,
            proxy_url,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height.get()
    }

    /// Proxy URL template, if the front-end sits behind a proxy.
    pub fn proxy_url(&self) -> Option<&str> {
        self.proxy_url.as_deref()
    }
}

/// Check that a height is a positive pixel count that fits in a `u32`.
pub fn validate_height(height: i64) -> Result<NonZeroU32> {
    u32::try_from(height)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or(Error::InvalidHeight(height))
}

/// Produces environment-specific embed markup.
pub trait EmbedRenderer: Send + Sync {
    /// Environment this renderer targets.
    fn environment(&self) -> ExecutionEnvironment;

    /// Render the payload for a request.
    fn render(&self, request: &DisplayRequest) -> Result<DisplayPayload>;
}

/// Render the embed for `env` and write it to the display channel.
pub fn render(
    env: ExecutionEnvironment,
    request: &DisplayRequest,
    channel: &mut dyn DisplayChannel,
) -> Result<()> {
    let payload = env.renderer().render(request)?;
    tracing::debug!(
        environment = %env,
        mime = payload.mime_type(),
        bytes = payload.body().len(),
        "Rendered embed payload"
    );
    channel.display(&payload)
}

// =============================================================================
// Hosted proxy
// =============================================================================

const HOSTED_SCRIPT: Template = Template::new(
    r#"(async () => {
    const url = new URL(
        await google.colab.kernel.proxyPort(%PORT%, {'cache': true}));
    const iframe = document.createElement('iframe');
    iframe.src = url;
    iframe.setAttribute('width', '100%');
    iframe.setAttribute('height', '%HEIGHT%px');
    iframe.setAttribute('frameborder', 0);
    document.body.appendChild(iframe);
})();
"#,
);

/// Renderer for hosted runtimes with a port-proxying API.
///
/// The emitted script resolves the proxied URL asynchronously, so the frame
/// does not exist yet when the payload has been displayed.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostedProxyRenderer;

impl EmbedRenderer for HostedProxyRenderer {
    fn environment(&self) -> ExecutionEnvironment {
        ExecutionEnvironment::HostedProxyCapable
    }

    fn render(&self, request: &DisplayRequest) -> Result<DisplayPayload> {
        let script = HOSTED_SCRIPT.render(&[
            ("PORT", Value::Int(request.port().into())),
            ("HEIGHT", Value::Int(request.height().into())),
        ])?;
        Ok(DisplayPayload::Javascript(script))
    }
}

// =============================================================================
// Local frame
// =============================================================================

const LOCAL_FRAME: Template = Template::new(
    r#"<iframe id="%HTML_ID%" width="100%" height="%HEIGHT%" frameborder="0">
</iframe>
<script>
  (function() {
    const frame = document.getElementById(%JSON_ID%);
    const url = new URL(%URL%, window.location);
    const port = %PORT%;
    if (port) {
      url.port = port;
    }
    frame.src = url;
  })();
</script>
"#,
);

/// Where a local frame points, before the browser resolves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameTarget {
    /// Base URL, resolved against the notebook page location.
    pub base_url: String,
    /// Explicit port for the URL; `None` leaves the port untouched.
    pub port_override: Option<u16>,
}

impl FrameTarget {
    /// Resolve the target for a request.
    ///
    /// Behind a proxy the template already routes to the server, so the
    /// URL's port is left unset. Otherwise the frame loads `/` on the
    /// server's port.
    pub fn for_request(request: &DisplayRequest) -> Self {
        match request.proxy_url() {
            Some(template) => Self {
                base_url: proxied_base_url(template, request.port()),
                port_override: None,
            },
            None => Self {
                base_url: "/".to_string(),
                port_override: Some(request.port()),
            },
        }
    }
}

/// Substitute every `%PORT%` token in a proxy URL template.
pub fn proxied_base_url(template: &str, port: u16) -> String {
    template.replace(PORT_TOKEN, &port.to_string())
}

/// Renderer for local notebooks without a proxy API.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFrameRenderer;

impl LocalFrameRenderer {
    /// Render with a caller-supplied frame id.
    pub fn markup(&self, request: &DisplayRequest, frame_id: &FrameId) -> Result<String> {
        let target = FrameTarget::for_request(request);
        // Port 0 is the "unset" value the script skips.
        let port = target.port_override.unwrap_or(0);

        LOCAL_FRAME.render(&[
            ("HTML_ID", Value::Attr(frame_id.as_str())),
            ("JSON_ID", Value::Js(frame_id.as_str())),
            ("HEIGHT", Value::Int(request.height().into())),
            ("PORT", Value::Int(port.into())),
            ("URL", Value::Js(&target.base_url)),
        ])
    }
}

impl EmbedRenderer for LocalFrameRenderer {
    fn environment(&self) -> ExecutionEnvironment {
        ExecutionEnvironment::GenericLocal
    }

    fn render(&self, request: &DisplayRequest) -> Result<DisplayPayload> {
        self.markup(request, &FrameId::generate())
            .map(DisplayPayload::Html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(port: u16, height: i64, proxy: Option<&str>) -> DisplayRequest {
        DisplayRequest::new(port, height, proxy.map(String::from)).unwrap()
    }

    #[test]
    fn test_height_validation() {
        assert!(matches!(validate_height(0), Err(Error::InvalidHeight(0))));
        assert!(matches!(validate_height(-10), Err(Error::InvalidHeight(-10))));
        assert!(validate_height(i64::from(u32::MAX) + 1).is_err());
        assert_eq!(validate_height(1).unwrap().get(), 1);
    }

    #[test]
    fn test_hosted_script() {
        let payload = HostedProxyRenderer.render(&request(8080, 640, None)).unwrap();
        let DisplayPayload::Javascript(script) = payload else {
            panic!("hosted renderer must emit a script");
        };
        assert!(script.contains("google.colab.kernel.proxyPort(8080, {'cache': true})"));
        assert!(script.contains("iframe.setAttribute('height', '640px');"));
        assert!(script.contains("iframe.setAttribute('width', '100%');"));
        assert!(script.contains("document.body.appendChild(iframe);"));
    }

    #[test]
    fn test_hosted_ignores_proxy_template() {
        let payload = HostedProxyRenderer
            .render(&request(9000, 100, Some("https://x/%PORT%/")))
            .unwrap();
        assert!(!payload.body().contains("https://x/"));
    }

    #[test]
    fn test_local_direct_target() {
        let target = FrameTarget::for_request(&request(4321, 500, None));
        assert_eq!(target.base_url, "/");
        assert_eq!(target.port_override, Some(4321));
    }

    #[test]
    fn test_local_proxy_target() {
        let target = FrameTarget::for_request(&request(4321, 500, Some("https://host/proxy/%PORT%/")));
        assert_eq!(target.base_url, "https://host/proxy/4321/");
        assert_eq!(target.port_override, None);
    }

    #[test]
    fn test_proxied_base_url_keeps_other_characters() {
        assert_eq!(proxied_base_url("/a%20b/%PORT%?q=%P", 7), "/a%20b/7?q=%P");
        assert_eq!(proxied_base_url("/no-token/", 7), "/no-token/");
    }

    #[test]
    fn test_local_markup_direct() {
        let id = FrameId::from_string("lit-frame-test");
        let html = LocalFrameRenderer
            .markup(&request(4321, 500, None), &id)
            .unwrap();
        assert!(html.contains(r#"<iframe id="lit-frame-test" width="100%" height="500" frameborder="0">"#));
        assert!(html.contains(r#"document.getElementById("lit-frame-test")"#));
        assert!(html.contains(r#"new URL("/", window.location)"#));
        assert!(html.contains("const port = 4321;"));
    }

    #[test]
    fn test_local_markup_proxy_leaves_port_unset() {
        let id = FrameId::from_string("lit-frame-test");
        let html = LocalFrameRenderer
            .markup(&request(4321, 500, Some("https://host/proxy/%PORT%/")), &id)
            .unwrap();
        assert!(html.contains(r#"new URL("https://host/proxy/4321/", window.location)"#));
        assert!(html.contains("const port = 0;"));
    }

    #[test]
    fn test_local_markup_escapes_hostile_values() {
        let id = FrameId::from_string(r#"x" onload="alert(1)"#);
        let html = LocalFrameRenderer
            .markup(&request(1, 10, Some("</script><script>alert('%PORT%')")), &id)
            .unwrap();
        assert!(html.contains(r#"id="x&quot; onload=&quot;alert(1)""#));
        assert!(html.contains(r#"getElementById("x\" onload=\"alert(1)")"#));
        assert_eq!(html.matches("</script>").count(), 1);
    }

    #[test]
    fn test_local_render_uses_fresh_ids() {
        let req = request(1234, 100, None);
        let a = LocalFrameRenderer.render(&req).unwrap();
        let b = LocalFrameRenderer.render(&req).unwrap();
        assert_ne!(a, b);
    }
}
