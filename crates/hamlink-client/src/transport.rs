//! Duplex transports carrying one encoded request/reply frame per call.
//!
//! Spec §4.3: "the transport is reliable, ordered, and connection-oriented,
//! and is free to be HTTP PUT/response, a TCP stream, or any equivalent."
//! [`Transport`] is the seam; [`QuicTransport`] and [`HttpTransport`] are
//! the two production implementations, gated behind features so a caller
//! that only needs one doesn't pull in the other's dependencies.
//! `hamlink-harness::ChannelTransport` provides an in-process third
//! implementation for tests.

use async_trait::async_trait;
use hamlink_core::NetworkError;

/// One request/reply round trip over an already-established connection.
///
/// A call takes already-framed bytes (envelope plus body) and returns the
/// framed reply bytes, unparsed; [`crate::session::Session`] owns encoding
/// and decoding. Implementations must not retry internally — the session
/// applies the single timeout/retry policy described in spec §5.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return the reply frame.
    async fn call(&self, request: &[u8]) -> Result<Vec<u8>, NetworkError>;
}

#[cfg(feature = "quic-transport")]
mod quic {
    use std::sync::Arc;

    use async_trait::async_trait;
    use hamlink_core::NetworkError;
    use quinn::Endpoint;
    use tokio::io::AsyncWriteExt;

    use super::Transport;

    /// Accepts every server certificate. Development/test use only — the
    /// production deployment terminates QUIC behind a certificate the
    /// caller configures separately.
    #[derive(Debug)]
    struct AcceptAnyServerCert;

    impl rustls::client::danger::ServerCertVerifier for AcceptAnyServerCert {
        fn verify_server_cert(
            &self,
            _end_entity: &rustls::pki_types::CertificateDer<'_>,
            _intermediates: &[rustls::pki_types::CertificateDer<'_>],
            _server_name: &rustls::pki_types::ServerName<'_>,
            _ocsp_response: &[u8],
            _now: rustls::pki_types::UnixTime,
        ) -> Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
            Ok(rustls::client::danger::ServerCertVerified::assertion())
        }

        fn verify_tls12_signature(
            &self,
            _message: &[u8],
            _cert: &rustls::pki_types::CertificateDer<'_>,
            _dss: &rustls::DigitallySignedStruct,
        ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
            Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
        }

        fn verify_tls13_signature(
            &self,
            _message: &[u8],
            _cert: &rustls::pki_types::CertificateDer<'_>,
            _dss: &rustls::DigitallySignedStruct,
        ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
            Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
        }

        fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
            rustls::crypto::ring::default_provider().signature_verification_algorithms.supported_schemes()
        }
    }

    /// QUIC transport: one bidirectional stream per call, request written
    /// and the send half finished, reply read to EOF.
    pub struct QuicTransport {
        connection: quinn::Connection,
    }

    impl QuicTransport {
        /// Connect to `addr`, presenting `server_name` for SNI/certificate
        /// validation. `insecure` skips certificate verification entirely
        /// (development use; see [`AcceptAnyServerCert`]).
        pub async fn connect(
            addr: std::net::SocketAddr,
            server_name: &str,
            insecure: bool,
        ) -> Result<Self, NetworkError> {
            let mut endpoint = Endpoint::client("0.0.0.0:0".parse().expect("valid unspecified addr"))
                .map_err(|e| NetworkError::ConnectFailed(e.to_string()))?;

            let crypto = if insecure {
                rustls::ClientConfig::builder()
                    .dangerous()
                    .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert))
                    .with_no_client_auth()
            } else {
                rustls::ClientConfig::builder()
                    .with_root_certificates(rustls::RootCertStore::empty())
                    .with_no_client_auth()
            };
            let quic_crypto = quinn::crypto::rustls::QuicClientConfig::try_from(crypto)
                .map_err(|e| NetworkError::ConnectFailed(e.to_string()))?;
            endpoint.set_default_client_config(quinn::ClientConfig::new(Arc::new(quic_crypto)));

            let connection = endpoint
                .connect(addr, server_name)
                .map_err(|e| NetworkError::ConnectFailed(e.to_string()))?
                .await
                .map_err(|e| NetworkError::ConnectFailed(e.to_string()))?;

            Ok(Self { connection })
        }
    }

    #[async_trait]
    impl Transport for QuicTransport {
        async fn call(&self, request: &[u8]) -> Result<Vec<u8>, NetworkError> {
            let (mut send, mut recv) = self
                .connection
                .open_bi()
                .await
                .map_err(|e| NetworkError::Closed(e.to_string()))?;
            send.write_all(request).await.map_err(|e| NetworkError::Closed(e.to_string()))?;
            send.finish().map_err(|e| NetworkError::Closed(e.to_string()))?;

            recv.read_to_end(16 * 1024 * 1024).await.map_err(|e| NetworkError::Closed(e.to_string()))
        }
    }
}

#[cfg(feature = "quic-transport")]
pub use quic::QuicTransport;

#[cfg(feature = "http-transport")]
mod http {
    use async_trait::async_trait;
    use hamlink_core::NetworkError;
    use reqwest::Client as HttpClient;

    use super::Transport;

    /// Legacy HTTP request/reply transport: one `PUT` per call, the
    /// framed bytes as the body, the framed reply as the response body.
    pub struct HttpTransport {
        client: HttpClient,
        endpoint: reqwest::Url,
    }

    impl HttpTransport {
        /// Build a transport posting every call to `endpoint`.
        #[must_use]
        pub fn new(endpoint: reqwest::Url) -> Self {
            Self { client: HttpClient::new(), endpoint }
        }
    }

    #[async_trait]
    impl Transport for HttpTransport {
        async fn call(&self, request: &[u8]) -> Result<Vec<u8>, NetworkError> {
            let response = self
                .client
                .put(self.endpoint.clone())
                .body(request.to_vec())
                .send()
                .await
                .map_err(|e| NetworkError::Closed(e.to_string()))?;

            if !response.status().is_success() {
                return Err(NetworkError::Closed(format!("http status {}", response.status())));
            }

            response.bytes().await.map(|b| b.to_vec()).map_err(|e| NetworkError::Closed(e.to_string()))
        }
    }
}

#[cfg(feature = "http-transport")]
pub use http::HttpTransport;
