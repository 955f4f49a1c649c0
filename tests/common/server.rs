//! Mock IRC server.
//!
//! Accepts connections on a loopback port and exposes line-level
//! send/receive helpers for asserting on what the client puts on the
//! wire.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::io::{ReadHalf, WriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

/// A listening mock server handing out accepted connections.
pub struct TestServer {
    listener: TcpListener,
    addr: String,
}

impl TestServer {
    /// Bind an ephemeral loopback port.
    pub async fn bind() -> anyhow::Result<Self> {
        Self::bind_addr("127.0.0.1:0").await
    }

    /// Bind a specific address, used to bring a server back on the
    /// port a client is reconnecting to.
    pub async fn bind_addr(addr: &str) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?.to_string();
        Ok(Self { listener, addr })
    }

    /// Address clients should dial.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Accept the next connection, wrapped in line helpers.
    pub async fn accept(&self) -> anyhow::Result<ServerConn<TcpStream>> {
        Ok(ServerConn::new(self.accept_raw().await?))
    }

    /// Accept the next connection as a bare stream, for tests that
    /// wrap it themselves (e.g. TLS).
    pub async fn accept_raw(&self) -> anyhow::Result<TcpStream> {
        let (stream, _) = timeout(Duration::from_secs(5), self.listener.accept())
            .await
            .map_err(|_| anyhow::anyhow!("no client connected within 5s"))??;
        Ok(stream)
    }
}

/// One accepted client connection, line-oriented.
pub struct ServerConn<S> {
    reader: BufReader<ReadHalf<S>>,
    writer: WriteHalf<S>,
}

impl<S: AsyncRead + AsyncWrite + Unpin> ServerConn<S> {
    /// Wrap an accepted stream.
    pub fn new(stream: S) -> Self {
        let (read_half, write_half) = tokio::io::split(stream);
        Self {
            reader: BufReader::new(read_half),
            writer: write_half,
        }
    }

    /// Read one raw line, terminator included.
    pub async fn recv_line(&mut self) -> anyhow::Result<String> {
        let mut line = String::new();
        let n = timeout(Duration::from_secs(5), self.reader.read_line(&mut line))
            .await
            .map_err(|_| anyhow::anyhow!("no line received within 5s"))??;
        anyhow::ensure!(n > 0, "client closed the connection");
        Ok(line)
    }

    /// Write one raw line, appending CRLF when missing.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with("\r\n") {
            self.writer.write_all(b"\r\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    /// Read the registration lines the client sends right after
    /// connecting: `PASS`, `NICK`, `USER` when a password is
    /// configured, `NICK`, `USER` otherwise.
    pub async fn recv_handshake(&mut self, expect_pass: bool) -> anyhow::Result<Vec<String>> {
        let count = if expect_pass { 3 } else { 2 };
        let mut lines = Vec::with_capacity(count);
        for _ in 0..count {
            lines.push(self.recv_line().await?);
        }
        Ok(lines)
    }
}
