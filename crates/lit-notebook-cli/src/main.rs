//! LIT notebook CLI - serve the app and print notebook embeds.

mod embed;
mod serve;

use clap::{Parser, Subcommand, ValueEnum};
use lit_notebook::{DEFAULT_HEIGHT, ExecutionEnvironment};

#[derive(Parser)]
#[command(name = "lit-notebook")]
#[command(about = "Serve LIT and embed it in Jupyter or Colab notebooks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the server in the foreground until Ctrl+C
    Serve {
        /// Host address to bind to
        #[arg(long, default_value = "localhost")]
        host: String,

        /// Port to listen on (a free port when omitted)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the notebook embed for a server that is already running
    Embed {
        /// Port the server listens on
        #[arg(short, long)]
        port: u16,

        /// Frame height in pixels
        #[arg(long, default_value_t = DEFAULT_HEIGHT, allow_negative_numbers = true)]
        height: i64,

        /// Proxy URL template; %PORT% is replaced with the port
        #[arg(long)]
        proxy_url: Option<String>,

        /// Target environment (detected when omitted)
        #[arg(long, value_enum)]
        environment: Option<EnvironmentArg>,

        /// Print the bare markup instead of kernel display output
        #[arg(long)]
        raw: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum EnvironmentArg {
    /// Hosted runtime with a port proxy (Colab)
    Hosted,
    /// Local notebook (Jupyter)
    Local,
}

impl From<EnvironmentArg> for ExecutionEnvironment {
    fn from(arg: EnvironmentArg) -> Self {
        match arg {
            EnvironmentArg::Hosted => ExecutionEnvironment::HostedProxyCapable,
            EnvironmentArg::Local => ExecutionEnvironment::GenericLocal,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    // Logs go to stderr so embed output on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Append recovery hints to lit-notebook errors
    let format_error = |err: anyhow::Error| -> anyhow::Error {
        if let Some(lit_err) = err.downcast_ref::<lit_notebook::Error>() {
            anyhow::anyhow!("{}", lit_err.with_hint())
        } else {
            err
        }
    };

    match cli.command {
        Commands::Serve { host, port } => {
            serve::execute(host, port).await.map_err(format_error)?;
        }

        Commands::Embed {
            port,
            height,
            proxy_url,
            environment,
            raw,
        } => {
            let environment = environment
                .map(ExecutionEnvironment::from)
                .unwrap_or_else(ExecutionEnvironment::detect);
            embed::execute(port, height, proxy_url, environment, raw).map_err(format_error)?;
        }
    }

    Ok(())
}
