//! Transport layer: dialing and stream splitting.
//!
//! The server is reachable over a Unix-domain socket or TCP. Both are
//! connection-oriented byte streams, so the rest of the client only ever
//! sees the two owned halves: the receiver task owns the read half, the
//! multiplexer owns the write half, and no lock is needed on the socket
//! itself.

use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};

use tokio::{
    io::{AsyncRead, AsyncWrite, ReadBuf},
    net::{TcpStream, UnixStream, tcp, unix},
    time,
};

use crate::error::ClientError;

/// Transport scheme for reaching the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// TCP stream socket
    Tcp,
    /// Unix-domain stream socket
    Unix,
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Scheme::Tcp => "tcp",
            Scheme::Unix => "unix",
        })
    }
}

/// A resolved server endpoint: scheme plus address (host:port for TCP,
/// filesystem path for Unix).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Transport scheme
    pub scheme: Scheme,
    /// Address in the scheme's own notation
    pub addr: String,
}

impl Endpoint {
    /// Open a stream to this endpoint, bounded by the optional dial
    /// timeout.
    pub(crate) async fn dial(&self, timeout: Option<Duration>) -> Result<ServerStream, ClientError> {
        let connect = async {
            match self.scheme {
                Scheme::Tcp => TcpStream::connect(self.addr.as_str()).await.map(ServerStream::Tcp),
                Scheme::Unix => {
                    UnixStream::connect(self.addr.as_str()).await.map(ServerStream::Unix)
                },
            }
        };

        let result = match timeout {
            Some(limit) => match time::timeout(limit, connect).await {
                Ok(result) => result,
                Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "dial timed out")),
            },
            None => connect.await,
        };

        result.map_err(|source| ClientError::Dial { addr: self.addr.clone(), source })
    }
}

/// A connected stream to the server.
pub(crate) enum ServerStream {
    Tcp(TcpStream),
    Unix(UnixStream),
}

impl ServerStream {
    /// Split into owned read and write halves.
    pub(crate) fn into_split(self) -> (RecvStream, SendStream) {
        match self {
            Self::Tcp(stream) => {
                let (recv, send) = stream.into_split();
                (RecvStream::Tcp(recv), SendStream::Tcp(send))
            },
            Self::Unix(stream) => {
                let (recv, send) = stream.into_split();
                (RecvStream::Unix(recv), SendStream::Unix(send))
            },
        }
    }
}

/// Read half of a server stream, owned by the receiver task.
pub(crate) enum RecvStream {
    Tcp(tcp::OwnedReadHalf),
    Unix(unix::OwnedReadHalf),
}

/// Write half of a server stream, owned by the multiplexer.
pub(crate) enum SendStream {
    Tcp(tcp::OwnedWriteHalf),
    Unix(unix::OwnedWriteHalf),
}

impl AsyncRead for RecvStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Tcp(inner) => Pin::new(inner).poll_read(cx, buf),
            Self::Unix(inner) => Pin::new(inner).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for SendStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Self::Tcp(inner) => Pin::new(inner).poll_write(cx, buf),
            Self::Unix(inner) => Pin::new(inner).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Tcp(inner) => Pin::new(inner).poll_flush(cx),
            Self::Unix(inner) => Pin::new(inner).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Tcp(inner) => Pin::new(inner).poll_shutdown(cx),
            Self::Unix(inner) => Pin::new(inner).poll_shutdown(cx),
        }
    }
}
