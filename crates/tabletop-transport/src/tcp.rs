//! TCP transport carrying newline-terminated text lines.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

use crate::{ConnectionId, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// A [`Transport`] that accepts plain TCP streams.
pub struct TcpLineTransport {
    listener: TcpListener,
}

impl TcpLineTransport {
    /// Binds and starts listening on the given address.
    pub async fn bind(addr: SocketAddr) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| TransportError::BindFailed { addr, source })?;
        tracing::info!(%addr, "TCP transport listening");
        Ok(Self { listener })
    }
}

impl Transport for TcpLineTransport {
    type Connection = PendingConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, peer) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, %peer, "accepted TCP connection");

        Ok(PendingConnection { id, stream, peer })
    }

    fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// An accepted socket that has not been bound to a player yet.
///
/// Dropping it closes the socket.
#[derive(Debug)]
pub struct PendingConnection {
    id: ConnectionId,
    stream: TcpStream,
    peer: SocketAddr,
}

impl PendingConnection {
    /// Returns the connection's log identifier.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the remote peer's address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Splits the socket into independently owned read and write halves.
    ///
    /// `max_line` bounds how many bytes a single [`LineReader::read_line`]
    /// call consumes.
    pub fn into_split(self, max_line: usize) -> (LineReader, LineWriter) {
        let (read, write) = self.stream.into_split();
        (
            LineReader {
                id: self.id,
                inner: BufReader::new(read),
                max_line,
            },
            LineWriter {
                id: self.id,
                inner: write,
            },
        )
    }
}

/// The read half of a connection, yielding one line per call.
#[derive(Debug)]
pub struct LineReader {
    id: ConnectionId,
    inner: BufReader<OwnedReadHalf>,
    max_line: usize,
}

impl LineReader {
    /// Returns the connection's log identifier.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Changes the per-read byte bound.
    pub fn set_max_line(&mut self, max_line: usize) {
        self.max_line = max_line;
    }

    /// Reads the next line without its terminator.
    ///
    /// Returns `Ok(None)` when the peer has closed the stream. A line
    /// longer than the bound is returned in pieces.
    pub async fn read_line(&mut self) -> Result<Option<String>, TransportError> {
        let mut buf = Vec::new();
        let read = (&mut self.inner)
            .take(self.max_line as u64)
            .read_until(b'\n', &mut buf)
            .await
            .map_err(TransportError::ReceiveFailed)?;

        if read == 0 {
            return Ok(None);
        }

        let text = String::from_utf8(buf).map_err(|e| {
            TransportError::ReceiveFailed(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                e,
            ))
        })?;
        Ok(Some(text.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Like [`read_line`](Self::read_line), but gives up after `limit`.
    pub async fn read_line_within(
        &mut self,
        limit: Duration,
    ) -> Result<Option<String>, TransportError> {
        match tokio::time::timeout(limit, self.read_line()).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::TimedOut(limit)),
        }
    }
}

/// The write half of a connection.
#[derive(Debug)]
pub struct LineWriter {
    id: ConnectionId,
    inner: OwnedWriteHalf,
}

impl LineWriter {
    /// Returns the connection's log identifier.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Writes one line, appending `\n` if it is missing.
    ///
    /// Returns the number of bytes put on the wire.
    pub async fn write_line(&mut self, line: &str) -> Result<usize, TransportError> {
        let mut bytes = line.as_bytes().to_vec();
        if !line.ends_with('\n') {
            bytes.push(b'\n');
        }
        self.inner
            .write_all(&bytes)
            .await
            .map_err(TransportError::SendFailed)?;
        self.inner.flush().await.map_err(TransportError::SendFailed)?;
        Ok(bytes.len())
    }

    /// Shuts down the write direction, signalling EOF to the peer.
    pub async fn close(mut self) -> Result<(), TransportError> {
        self.inner
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }
}
