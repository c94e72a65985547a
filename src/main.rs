use std::io;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use minicrm::api::{CrmApi, HttpApi};
use minicrm::config::ClientConfig;
use minicrm::console::{self, HELP, StdinConfirm};
use minicrm::routes::{Route, Section};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "minicrm=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = ClientConfig::new_from_env()?;
    let http = HttpApi::new(config)?;
    info!("Using CRM API at {}", http.base_url());
    let api: Arc<dyn CrmApi> = Arc::new(http);

    let start = std::env::args()
        .nth(1)
        .and_then(|path| Route::parse(&path))
        .unwrap_or_else(|| Route::list(Section::Customers));
    info!("Starting at {}", start);

    println!("{}", HELP);
    let mut input = io::stdin().lock();
    let mut output = io::stdout();
    console::run(api, start, &mut input, &mut output, &StdinConfirm).await?;

    Ok(())
}
