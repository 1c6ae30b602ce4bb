//! Basic example: one typed handler and its docs.
//!
//! ```text
//! cargo run -p portico --example basic
//! curl -i 'http://localhost:8080/hello/world?locale=zh-CN'
//! open http://localhost:8080/docs
//! ```
//!
//! Settings come from `PORTICO_*` environment variables, e.g.
//! `PORTICO_SERVER__HTTP_ADDR=127.0.0.1:3000`.

use chrono::{DateTime, Utc};
use portico::prelude::*;
use serde::{Deserialize, Serialize};

/// Holds my data.
#[derive(Debug, Serialize, Deserialize, Describe)]
#[param(crate = "portico::schema", title = "My Struct")]
struct HelloInput {
    #[param(path = "name", json = "-", min_length = 3)]
    name: String,
    #[param(
        query = "locale",
        json = "-",
        default = "en-US",
        pattern = "^[a-z]{2}-[A-Z]{2}$",
        enum = "zh-CN,en-US"
    )]
    locale: String,
}

#[derive(Debug, Serialize, Deserialize, Describe)]
#[param(crate = "portico::schema")]
struct HelloOutput {
    #[param(header = "X-Now", json = "-")]
    now: DateTime<Utc>,
    message: String,
}

fn hello() -> impl portico::server::Interactor {
    Handler::new(|_ctx: Context, input: HelloInput| async move {
        let message = match input.locale.as_str() {
            "zh-CN" => format!("你好, {}!", input.name),
            _ => format!("Hello, {}!", input.name),
        };
        Ok::<_, Error>(HelloOutput {
            now: Utc::now(),
            message,
        })
    })
    .summary("Say hello")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::new()
        .with_development()
        .with_env_prefix("PORTICO")
        .load()?;
    init_logging(&config.logging)?;

    let mut service = Service::from_config(&config);
    service.info("Basic Example", "1.0.0");
    service.get("/hello/:name", hello());

    tracing::info!(
        "docs at http://{}{}{}",
        config.server.http_addr,
        config.server.base_url,
        config.docs.path
    );
    service.run().await?;
    Ok(())
}
