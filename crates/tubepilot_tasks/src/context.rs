use std::sync::Arc;

use tubepilot_gateway::{
    CredentialStore, GatewayError, GatewaySettings, KeyValueStore, RemoteGateway, ReqwestGateway,
};

use crate::StateStore;

/// Explicit context handed to every task: the gateway plus the state store.
///
/// Built once when the client starts and dropped when it shuts down.
#[derive(Clone)]
pub struct TaskContext {
    gateway: Arc<dyn RemoteGateway>,
    store: Arc<StateStore>,
}

impl TaskContext {
    pub fn new(gateway: Arc<dyn RemoteGateway>, store: Arc<StateStore>) -> Self {
        Self { gateway, store }
    }

    /// Opens the store over `storage` and wires an HTTP gateway whose 401
    /// handling flips the store's authentication flag.
    pub fn connect(
        settings: GatewaySettings,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self, GatewayError> {
        let store = StateStore::open(storage.clone());
        let gateway = ReqwestGateway::new(settings, CredentialStore::new(storage))?
            .with_session_observer(store.clone());
        Ok(Self::new(Arc::new(gateway), store))
    }

    pub fn gateway(&self) -> &dyn RemoteGateway {
        self.gateway.as_ref()
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }
}
