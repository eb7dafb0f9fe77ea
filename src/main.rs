//! servlet-host
//!
//! Serves a web application described by a TOML file: servlets mapped by URL
//! pattern, filter chains, forwards/includes of resources and error pages.
//!
//! ```text
//!     Client Request
//!     ──────▶ http server ──▶ Host ──▶ filter chain ──▶ servlet
//!                                                         │
//!                                          dispatcher ◀───┘
//!     Client Response                          │
//!     ◀────── http server ◀── error pages ◀────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use servlet_host::lifecycle::startup::{self, StartupOptions};
use servlet_host::Registry;

#[derive(Debug, Parser)]
#[command(name = "servlet-host", version, about = "Servlet-style request pipeline host")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `application.base_path`.
    #[arg(long)]
    base_path: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(long)]
    bind: Option<String>,

    /// Reload the configuration when the file changes.
    #[arg(long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let options = StartupOptions {
        config_path: cli.config,
        base_path: cli.base_path,
        bind_address: cli.bind,
        watch: cli.watch,
    };
    startup::run(options, Registry::with_builtins()).await
}
