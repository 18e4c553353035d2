//! Session manager: one open connection to the gateway

use std::sync::Arc;

use gateway_api::{ApiError, GatewayClient, GatewayOperation, SessionConnector};
use parking_lot::Mutex;

use crate::identity::DeviceIdentity;

/// An open session with the gateway, bound to (host, token)
///
/// Device I/O is blocking. Calls made through [`call`](Self::call) run on
/// tokio's blocking pool and are serialized through a single-slot mutex, so
/// at most one request is in flight on the connection at any time.
pub struct RadioSession {
    host: String,
    identity: DeviceIdentity,
    client: Arc<Mutex<Option<GatewayClient>>>,
}

impl RadioSession {
    /// Open a session and fetch the device identity (blocking).
    ///
    /// Do not call this from an async task; use [`open_async`](Self::open_async).
    pub fn open(
        connector: &dyn SessionConnector,
        host: &str,
        token: &str,
    ) -> Result<Self, ApiError> {
        let session = connector.open(host, token)?;
        let mut client = GatewayClient::new(session);

        let identity = match client.info() {
            Ok(info) => DeviceIdentity::from(info),
            Err(e) => {
                client.close();
                return Err(e);
            }
        };

        Ok(Self {
            host: host.to_string(),
            identity,
            client: Arc::new(Mutex::new(Some(client))),
        })
    }

    /// Open a session on the blocking pool
    pub async fn open_async(
        connector: Arc<dyn SessionConnector>,
        host: String,
        token: String,
    ) -> Result<Self, ApiError> {
        tokio::task::spawn_blocking(move || Self::open(connector.as_ref(), &host, &token))
            .await
            .map_err(|e| ApiError::NetworkError(format!("session worker failed: {}", e)))?
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// The identity fetched at open; never refreshed
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Whether the session still holds its client. A call in flight counts as open.
    pub fn is_open(&self) -> bool {
        match self.client.try_lock() {
            Some(client) => client.is_some(),
            None => true,
        }
    }

    /// Execute an operation on the blocking pool
    pub async fn call<Op>(&self, request: Op::Request) -> Result<Op::Response, ApiError>
    where
        Op: GatewayOperation + 'static,
        Op::Request: Send + 'static,
        Op::Response: Send + 'static,
    {
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || {
            let mut guard = client.lock();
            match guard.as_mut() {
                Some(client) => client.execute::<Op>(&request),
                None => Err(ApiError::SessionClosed),
            }
        })
        .await
        .map_err(|e| ApiError::NetworkError(format!("device worker failed: {}", e)))?
    }

    /// Release the connection. Calling this more than once is harmless.
    ///
    /// Blocks until an in-flight call finishes; use
    /// [`close_async`](Self::close_async) from async code.
    pub fn close(&self) {
        close_client(&self.client, &self.host);
    }

    /// Release the connection on the blocking pool
    pub async fn close_async(&self) {
        let client = Arc::clone(&self.client);
        let host = self.host.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || close_client(&client, &host)).await {
            tracing::warn!("Closing session with {} failed: {}", self.host, e);
        }
    }
}

fn close_client(client: &Mutex<Option<GatewayClient>>, host: &str) {
    let taken = client.lock().take();
    if let Some(mut client) = taken {
        client.close();
        tracing::debug!("Closed session with Xiaomi Gateway Radio at {}", host);
    }
}

impl Drop for RadioSession {
    fn drop(&mut self) {
        // A busy client is released when the in-flight call drops its handle
        let taken = self.client.try_lock().and_then(|mut client| client.take());
        if let Some(mut client) = taken {
            client.close();
        }
    }
}

impl std::fmt::Debug for RadioSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadioSession")
            .field("host", &self.host)
            .field("identity", &self.identity)
            .field("open", &self.is_open())
            .finish()
    }
}
