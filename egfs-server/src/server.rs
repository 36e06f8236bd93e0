use crate::api::{create_router, AppState, SharedStore};
use egfs_core::{Backend, Config, Store};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tracing::info;

pub struct EgfsServer {
    store: SharedStore,
}

impl EgfsServer {
    pub fn new(store: Store<Box<dyn Backend + Send>>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    pub fn from_config(config: &Config, password: &[u8]) -> anyhow::Result<Self> {
        config.validate()?;
        let backend: Box<dyn Backend + Send> = Box::new(config.backend());
        let store = Store::new(backend, password).with_primary_branch(&config.primary_branch);
        info!("Serving repository at {:?}", config.workdir);
        Ok(Self::new(store))
    }

    pub async fn serve(self, addr: SocketAddr) -> anyhow::Result<()> {
        let app = create_router(AppState { store: self.store });

        info!("Server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
