//! Transport layer for JSON-RPC communication
//!
//! LSP-style message framing with Content-Length headers over stdio or a
//! Unix domain socket.

use crate::jsonrpc::protocol::{JsonRpcRequest, JsonRpcResponse};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, trace};

/// Transport trait for different communication methods
#[async_trait]
pub trait Transport: Send {
    /// Read a JSON-RPC request from the transport
    async fn read_request(&mut self) -> Result<JsonRpcRequest>;

    /// Write a JSON-RPC response to the transport
    async fn write_response(&mut self, response: JsonRpcResponse) -> Result<()>;

    /// Close the transport connection
    async fn close(&mut self) -> Result<()>;

    /// Get transport description for logging
    fn description(&self) -> &'static str;

    /// Identifies the current peer. Changes when a new client replaces a
    /// disconnected one.
    fn connection_id(&self) -> u64 {
        0
    }
}

/// Raised when the peer closes its end; the server loop stops on it.
#[derive(Debug, thiserror::Error)]
#[error("Connection closed")]
pub struct ConnectionClosed;

/// Largest message body accepted from a peer.
pub const MAX_MESSAGE_BYTES: usize = 8 * 1024 * 1024;

/// Content-Length framing over any buffered reader and writer
///
/// Reads keep their progress in the transport itself, so a `read_message`
/// future dropped mid-frame (for example by `select!`) resumes where it
/// stopped on the next call.
pub struct FramedTransport<R, W> {
    reader: R,
    writer: W,
    description: &'static str,
    line: String,
    content_length: Option<usize>,
    body: Option<Vec<u8>>,
    expected: usize,
    discard: u64,
}

impl<R, W> FramedTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W, description: &'static str) -> Self {
        Self {
            reader,
            writer,
            description,
            line: String::new(),
            content_length: None,
            body: None,
            expected: 0,
            discard: 0,
        }
    }

    /// Read one LSP-style message body
    ///
    /// Bodies over [`MAX_MESSAGE_BYTES`] are rejected and their bytes
    /// skipped, so the stream stays in sync for the next frame.
    pub async fn read_message(&mut self) -> Result<String> {
        while self.discard > 0 {
            let chunk = self.reader.fill_buf().await?;
            if chunk.is_empty() {
                return Err(ConnectionClosed.into());
            }
            let skipped = chunk.len().min(usize::try_from(self.discard).unwrap_or(usize::MAX));
            self.reader.consume(skipped);
            self.discard -= skipped as u64;
        }

        loop {
            if let Some(body) = self.body.as_mut() {
                while body.len() < self.expected {
                    let chunk = self.reader.fill_buf().await?;
                    if chunk.is_empty() {
                        return Err(ConnectionClosed.into());
                    }
                    let take = chunk.len().min(self.expected - body.len());
                    body.extend_from_slice(&chunk[..take]);
                    self.reader.consume(take);
                }

                let buffer = self.body.take().unwrap_or_default();
                let content = String::from_utf8(buffer)?;
                debug!("Received message: {} bytes", content.len());
                trace!("Message content: {}", content);
                return Ok(content);
            }

            let bytes_read = self.reader.read_line(&mut self.line).await?;
            if bytes_read == 0 {
                return Err(ConnectionClosed.into());
            }

            let line = std::mem::take(&mut self.line);
            let header = line.trim_end();

            // Empty line ends the header block
            if header.is_empty() {
                let length = self
                    .content_length
                    .take()
                    .ok_or_else(|| anyhow!("Missing Content-Length header"))?;
                if length > MAX_MESSAGE_BYTES {
                    self.discard = length as u64;
                    return Err(anyhow!(
                        "Message of {} bytes exceeds the {} byte limit",
                        length,
                        MAX_MESSAGE_BYTES
                    ));
                }
                self.expected = length;
                self.body = Some(Vec::with_capacity(length));
                continue;
            }

            trace!("Received header: {}", header);
            if let Some(length) = lsp_format::content_length(header) {
                self.content_length = Some(length?);
            }
        }
    }

    /// Write one LSP-style message
    pub async fn write_message(&mut self, content: &str) -> Result<()> {
        self.writer
            .write_all(lsp_format::format_message(content).as_bytes())
            .await?;
        self.writer.flush().await?;

        debug!("Sent message: {} bytes", content.len());
        trace!("Message content: {}", content);
        Ok(())
    }
}

#[async_trait]
impl<R, W> Transport for FramedTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn read_request(&mut self) -> Result<JsonRpcRequest> {
        let content = self.read_message().await?;
        let request: JsonRpcRequest = serde_json::from_str(&content)?;
        Ok(request)
    }

    async fn write_response(&mut self, response: JsonRpcResponse) -> Result<()> {
        let content = serde_json::to_string(&response)?;
        self.write_message(&content).await
    }

    async fn close(&mut self) -> Result<()> {
        self.writer.shutdown().await?;
        debug!("{} closed", self.description);
        Ok(())
    }

    fn description(&self) -> &'static str {
        self.description
    }
}

pub type StdioTransport = FramedTransport<BufReader<tokio::io::Stdin>, tokio::io::Stdout>;

impl StdioTransport {
    pub fn stdio() -> Self {
        FramedTransport::new(
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            "JSON-RPC over stdin/stdout (LSP-style)",
        )
    }
}

pub type IpcTransport = FramedTransport<BufReader<tokio::net::unix::OwnedReadHalf>, tokio::net::unix::OwnedWriteHalf>;

impl IpcTransport {
    /// Wrap an accepted connection
    pub fn from_stream(stream: tokio::net::UnixStream) -> Self {
        let (read_half, write_half) = stream.into_split();
        FramedTransport::new(
            BufReader::new(read_half),
            write_half,
            "JSON-RPC over Unix domain socket (LSP-style)",
        )
    }
}

/// Unix domain socket server transport
///
/// Accepts connections one at a time. When a client disconnects the next
/// one is accepted; the dashboard state carries over between connections.
pub struct IpcServerTransport {
    listener: tokio::net::UnixListener,
    socket_path: String,
    current_connection: Option<IpcTransport>,
    connections: u64,
}

impl IpcServerTransport {
    /// Bind to a Unix socket path, replacing a stale socket file
    pub async fn bind<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let socket_path = path_ref.to_string_lossy().to_string();

        if path_ref.exists() {
            std::fs::remove_file(path_ref).map_err(|e| anyhow!("Failed to remove existing socket file: {}", e))?;
        }

        let listener = tokio::net::UnixListener::bind(path_ref)
            .map_err(|e| anyhow!("Failed to bind to socket {}: {}", socket_path, e))?;

        debug!("IPC server listening on: {}", socket_path);

        Ok(Self {
            listener,
            socket_path,
            current_connection: None,
            connections: 0,
        })
    }

    async fn accept_connection(&mut self) -> Result<()> {
        debug!("Waiting for client connection on {}", self.socket_path);

        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .map_err(|e| anyhow!("Failed to accept connection: {}", e))?;

        debug!("Client connected to {}", self.socket_path);
        self.current_connection = Some(IpcTransport::from_stream(stream));
        self.connections += 1;
        Ok(())
    }
}

#[async_trait]
impl Transport for IpcServerTransport {
    async fn read_request(&mut self) -> Result<JsonRpcRequest> {
        loop {
            if self.current_connection.is_none() {
                self.accept_connection().await?;
            }

            let Some(transport) = self.current_connection.as_mut() else {
                continue;
            };

            match transport.read_request().await {
                Ok(request) => return Ok(request),
                Err(e) if e.is::<ConnectionClosed>() => {
                    debug!("Client disconnected from {}", self.socket_path);
                    self.current_connection = None;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn write_response(&mut self, response: JsonRpcResponse) -> Result<()> {
        let transport = self
            .current_connection
            .as_mut()
            .ok_or_else(|| anyhow!("No active connection"))?;
        transport.write_response(response).await
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(ref mut transport) = self.current_connection {
            transport.close().await?;
        }

        if Path::new(&self.socket_path).exists() {
            std::fs::remove_file(&self.socket_path)?;
        }

        debug!("IPC server transport closed: {}", self.socket_path);
        Ok(())
    }

    fn description(&self) -> &'static str {
        "JSON-RPC server over Unix domain socket (LSP-style)"
    }

    fn connection_id(&self) -> u64 {
        self.connections
    }
}

/// Transport configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportConfig {
    /// Standard input/output with LSP message framing
    Stdio,
    /// Unix domain socket with specified path
    UnixSocket { path: String },
}

impl TransportConfig {
    /// Resolve a transport name ("stdio" or "socket") and optional socket path
    pub fn from_parts(transport: &str, socket_path: Option<&str>) -> Result<Self> {
        match transport {
            "stdio" => Ok(TransportConfig::Stdio),
            "socket" => {
                let path = socket_path
                    .filter(|p| !p.trim().is_empty())
                    .ok_or_else(|| anyhow!("Socket path is required when using socket transport"))?;
                Ok(TransportConfig::UnixSocket { path: path.to_string() })
            }
            other => Err(anyhow!("Unsupported transport type: {}", other)),
        }
    }

    /// Create a server-side transport
    pub async fn create_transport(&self) -> Result<Box<dyn Transport>> {
        match self {
            TransportConfig::Stdio => Ok(Box::new(StdioTransport::stdio())),
            TransportConfig::UnixSocket { path } => Ok(Box::new(IpcServerTransport::bind(path).await?)),
        }
    }

    pub fn description(&self) -> String {
        match self {
            TransportConfig::Stdio => "stdin/stdout".to_string(),
            TransportConfig::UnixSocket { path } => format!("Unix socket ({})", path),
        }
    }
}

/// Helper functions for working with LSP message format
pub mod lsp_format {
    use anyhow::{anyhow, Result};

    /// Content-Length value of a single header line, if it is that header
    pub fn content_length(header: &str) -> Option<Result<usize>> {
        let value = header.strip_prefix("Content-Length:")?.trim();
        Some(
            value
                .parse()
                .map_err(|e| anyhow!("Invalid Content-Length {:?}: {}", value, e)),
        )
    }

    /// Format message with LSP headers
    pub fn format_message(content: &str) -> String {
        format!("Content-Length: {}\r\n\r\n{}", content.len(), content)
    }
}
