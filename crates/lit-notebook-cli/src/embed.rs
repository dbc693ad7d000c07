//! Embed command implementation.
//!
//! Renders the notebook embed for a server started elsewhere, e.g. with
//! `lit-notebook serve` in a terminal next to the notebook.

use std::io::Write;

use lit_notebook::render::render;
use lit_notebook::{DisplayRequest, EvcxrChannel, ExecutionEnvironment, MemoryChannel};

/// Render the embed and write it to stdout.
pub fn execute(
    port: u16,
    height: i64,
    proxy_url: Option<String>,
    environment: ExecutionEnvironment,
    raw: bool,
) -> anyhow::Result<()> {
    let request = DisplayRequest::new(port, height, proxy_url)?;
    tracing::debug!(%environment, port, "Rendering embed");

    if raw {
        let mut channel = MemoryChannel::new();
        render(environment, &request, &mut channel)?;

        let mut stdout = std::io::stdout().lock();
        for payload in channel.payloads() {
            writeln!(stdout, "{}", payload.body())?;
        }
        stdout.flush()?;
    } else {
        render(environment, &request, &mut EvcxrChannel::stdout())?;
    }

    Ok(())
}
