use std::net::SocketAddr;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::core::{
    data::DocStore,
    settings::{Settings, STORE_URI_VAR},
    uploads::UploadStore,
};

mod core;
mod error;
mod server;
mod types;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env();
    let uploads = UploadStore::open(&settings.upload_dir)?;

    let store = match settings.store_uri.as_deref() {
        Some(uri) => match DocStore::connect(uri) {
            Ok(store) => {
                info!(uri, "connected to document store");
                store
            }
            Err(err) => {
                error!(uri, %err, "document store connection failed, data routes will error");
                DocStore::disconnected()
            }
        },
        None => {
            error!("{} is not set, data routes will error", STORE_URI_VAR);
            DocStore::disconnected()
        }
    };

    let addr = SocketAddr::new(settings.host, settings.port);
    info!(%addr, "server listening");
    server::start_server(addr, store, uploads).await
}
