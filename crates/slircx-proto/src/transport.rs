//! Connected streams, plain TCP or TLS, split into framed halves.

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use socket2::{SockRef, TcpKeepalive};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf, ReadHalf, WriteHalf};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::ClientConfig;
use tokio_rustls::TlsConnector;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::warn;

use crate::codec::IrcCodec;
use crate::error::{ProtocolError, Result};
use crate::message::Message;

/// Read half of a transport, decoding [`Message`] frames.
pub type MessageReader = FramedRead<TransportReadHalf, IrcCodec>;

/// Write half of a transport, encoding [`Message`] frames.
pub type MessageWriter = FramedWrite<TransportWriteHalf, IrcCodec>;

/// A connected server stream, before framing.
pub enum Transport {
    /// Plain TCP stream.
    Tcp(TcpStream),
    /// TLS stream (boxed for size).
    Tls(Box<TlsStream<TcpStream>>),
}

impl Transport {
    /// Open a plain TCP connection to `addr`.
    pub async fn tcp(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        enable_keepalive(&stream);
        Ok(Self::Tcp(stream))
    }

    /// Open a TLS connection to `addr`, verifying the certificate
    /// against `domain`.
    pub async fn tls(addr: &str, domain: &str, config: Arc<ClientConfig>) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        enable_keepalive(&stream);
        let name = ServerName::try_from(domain.to_string())
            .map_err(|_| ProtocolError::InvalidServerName(domain.to_string()))?;
        let stream = TlsConnector::from(config).connect(name, stream).await?;
        Ok(Self::Tls(Box::new(stream)))
    }

    /// Split into framed read and write halves.
    pub fn split(self) -> (MessageReader, MessageWriter) {
        let (read, write) = match self {
            Self::Tcp(stream) => {
                let (r, w) = stream.into_split();
                (TransportReadHalf::Tcp(r), TransportWriteHalf::Tcp(w))
            }
            Self::Tls(stream) => {
                let (r, w) = tokio::io::split(*stream);
                (TransportReadHalf::Tls(r), TransportWriteHalf::Tls(w))
            }
        };
        (
            FramedRead::new(read, IrcCodec::new()),
            FramedWrite::new(write, IrcCodec::new()),
        )
    }
}

/// Turn on TCP keepalive probes so half-dead links surface as read
/// errors instead of hanging forever. Failure is not fatal.
fn enable_keepalive(stream: &TcpStream) {
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(120))
        .with_interval(Duration::from_secs(30));
    let sock = SockRef::from(stream);
    if let Err(error) = sock.set_tcp_keepalive(&keepalive) {
        warn!(%error, "failed to enable TCP keepalive");
    }
}

/// Read half of either transport flavor.
pub enum TransportReadHalf {
    /// TCP read half.
    Tcp(OwnedReadHalf),
    /// TLS read half.
    Tls(ReadHalf<TlsStream<TcpStream>>),
}

impl AsyncRead for TransportReadHalf {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Tcp(s) => Pin::new(s).poll_read(cx, buf),
            Self::Tls(s) => Pin::new(s).poll_read(cx, buf),
        }
    }
}

/// Write half of either transport flavor.
pub enum TransportWriteHalf {
    /// TCP write half.
    Tcp(OwnedWriteHalf),
    /// TLS write half.
    Tls(WriteHalf<TlsStream<TcpStream>>),
}

impl AsyncWrite for TransportWriteHalf {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Self::Tcp(s) => Pin::new(s).poll_write(cx, buf),
            Self::Tls(s) => Pin::new(s).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Tcp(s) => Pin::new(s).poll_flush(cx),
            Self::Tls(s) => Pin::new(s).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Tcp(s) => Pin::new(s).poll_shutdown(cx),
            Self::Tls(s) => Pin::new(s).poll_shutdown(cx),
        }
    }
}
