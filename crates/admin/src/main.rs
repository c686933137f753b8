//! `upbreed-admin` -- Upbreed admin console.
//!
//! Lists and edits courses, instructors and blog posts and prints the
//! dashboard summary against the admin API.
//!
//! # Environment variables
//!
//! | Variable               | Required | Default                 | Description                        |
//! |------------------------|----------|-------------------------|------------------------------------|
//! | `API_BASE_URL`         | no       | `http://localhost:3000` | Admin API base URL                 |
//! | `REQUEST_TIMEOUT_SECS` | no       | `30`                    | Per-request timeout                |
//! | `PAGE_LIMIT`           | no       | `9`                     | Items per list page                |
//! | `UPBREED_TOKEN`        | no       | --                      | Session token when `--token` is absent |

use anyhow::Context;
use clap::Parser;
use upbreed_admin::cli::{self, Cli};
use upbreed_admin::AdminApp;
use upbreed_client::ClientConfig;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "upbreed_admin=info,upbreed_query=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args = Cli::parse();
    if args.token.is_none() {
        args.token = std::env::var("UPBREED_TOKEN").ok().filter(|t| !t.is_empty());
    }

    let config = ClientConfig::from_env().context("Invalid configuration")?;
    tracing::debug!(base_url = %config.base_url, "Starting upbreed-admin");

    let app = AdminApp::new(config).context("Failed to build API client")?;
    cli::run(args, app).await
}
