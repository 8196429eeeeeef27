//! An in-process [`Transport`](hamlink_client::Transport) backed directly by
//! a [`Server`], for tests that want to exercise the client's operation
//! surface without a real socket.

use std::sync::Arc;

use async_trait::async_trait;
use hamlink_core::NetworkError;
use hamlink_client::Transport;
use hamlink_proto::Encoding;

use crate::server::Server;

/// Decodes each call's request bytes, dispatches it to an in-process
/// [`Server`], and re-encodes the reply with the same [`Encoding`] the
/// client session negotiated.
pub struct ChannelTransport {
    server: Arc<Server>,
    encoding: Encoding,
}

impl ChannelTransport {
    /// A transport dispatching every call to `server`, speaking `encoding`.
    #[must_use]
    pub fn new(server: Arc<Server>, encoding: Encoding) -> Self {
        Self { server, encoding }
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn call(&self, request: &[u8]) -> Result<Vec<u8>, NetworkError> {
        let message = self.encoding.decode(request).map_err(|e| NetworkError::Closed(e.to_string()))?;
        let reply = self.server.handle(message);
        self.encoding.encode(&reply).map_err(|e| NetworkError::Closed(e.to_string()))
    }
}
