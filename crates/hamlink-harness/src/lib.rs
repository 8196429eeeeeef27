//! An in-process reference server and transport for exercising
//! `hamlink-client` end-to-end without a real storage engine or socket.
//!
//! [`Server`] implements the same message catalog as the production engine
//! against an in-memory ordered store; [`ChannelTransport`] hands it
//! encoded frames directly, bypassing the network.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod server;
mod transport;

pub use server::Server;
pub use transport::ChannelTransport;
