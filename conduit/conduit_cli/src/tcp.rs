//! TCP-backed resources for the demonstration pool.

use conduit_pool::{Credentials, Endpoint, Resource, ResourceFactory};
use log::debug;
use std::io;
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;
use thiserror::Error;

/// Errors opening a TCP connection
#[derive(Error, Debug)]
pub enum TcpError {
    /// The endpoint could not be resolved to socket addresses
    #[error("failed to resolve {endpoint}: {source}")]
    Resolve {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    /// The endpoint resolved to no addresses at all
    #[error("{0} did not resolve to any address")]
    NoAddress(String),

    /// Every resolved address refused or timed out
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
}

/// An open TCP connection
#[derive(Debug)]
pub struct TcpConnection {
    stream: TcpStream,
    peer: SocketAddr,
}

impl TcpConnection {
    /// Address of the remote end
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl Resource for TcpConnection {
    type Error = io::Error;

    fn close(&mut self) -> io::Result<()> {
        match self.stream.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            // The peer already hung up
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Opens [`TcpConnection`]s with a bounded connect time
#[derive(Debug, Clone)]
pub struct TcpFactory {
    connect_timeout: Duration,
}

impl TcpFactory {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl ResourceFactory for TcpFactory {
    type Resource = TcpConnection;
    type Error = TcpError;

    fn create(
        &self,
        endpoint: &Endpoint,
        credentials: &Credentials,
    ) -> Result<TcpConnection, TcpError> {
        let addrs = endpoint
            .as_str()
            .to_socket_addrs()
            .map_err(|source| TcpError::Resolve {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => {
                    debug!("Connected to {} as '{}'", addr, credentials.user());
                    return Ok(TcpConnection { stream, peer: addr });
                }
                Err(source) => last_error = Some(TcpError::Connect { addr, source }),
            }
        }

        Err(last_error.unwrap_or_else(|| TcpError::NoAddress(endpoint.to_string())))
    }
}
