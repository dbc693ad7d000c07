//! Serve command implementation.

use lit_notebook::{ServerOptions, ServerType};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";

/// Run the server in the foreground.
pub async fn execute(host: String, port: Option<u16>) -> anyhow::Result<()> {
    let options = ServerOptions {
        server_type: ServerType::Standalone,
        host,
        port,
    };

    println!("\n{BOLD}LIT Server{RESET} - Notebook Embedding");
    println!("{}", "─".repeat(50));
    match options.port {
        Some(port) => println!("{CYAN}  ◆ Server:{RESET} http://{}:{}", options.host, port),
        None => println!("{CYAN}  ◆ Server:{RESET} http://{}:<free port>", options.host),
    }
    println!("{}", "─".repeat(50));
    println!("{GREEN}Press Ctrl+C to stop{RESET}");
    println!();

    lit_notebook_server::serve_forever(options).await?;

    Ok(())
}
