//! Native-messaging transport between the browser extension and the
//! extension endpoint.
//!
//! Every message in either direction is a 32-bit length in native byte
//! order followed by that many bytes of UTF-8 JSON.

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::message::Acknowledgment;
use crate::storage::KeyValueStore;
use crate::view::ExtensionEndpoint;

/// Size of the length header in bytes.
const HEADER_LEN: usize = 4;

/// Read one frame. Returns `None` on a clean end of stream.
///
/// # Errors
///
/// Returns [`Error::FrameTooLarge`] when the header announces more than
/// `max_len` bytes, [`Error::TruncatedFrame`] when the stream ends inside a
/// frame, and I/O errors from the reader.
pub async fn read_frame<R>(reader: &mut R, max_len: usize) -> Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin + Send,
{
    let mut header = [0u8; HEADER_LEN];
    let mut filled = 0;
    while filled < HEADER_LEN {
        let n = reader.read(&mut header[filled..]).await?;
        if n == 0 {
            return if filled == 0 {
                Ok(None)
            } else {
                Err(Error::TruncatedFrame)
            };
        }
        filled += n;
    }

    let len = usize::try_from(u32::from_ne_bytes(header))
        .map_err(|_| Error::internal("frame length does not fit in memory"))?;
    if len > max_len {
        return Err(Error::FrameTooLarge { len, max: max_len });
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::TruncatedFrame
        } else {
            Error::Io(e)
        }
    })?;
    Ok(Some(body))
}

/// Write one frame and flush it.
///
/// # Errors
///
/// Returns an error if the body is longer than a frame can announce or the
/// writer fails.
pub async fn write_frame<W>(writer: &mut W, body: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    let len = u32::try_from(body.len()).map_err(|_| Error::FrameTooLarge {
        len: body.len(),
        max: u32::MAX as usize,
    })?;
    writer.write_all(&len.to_ne_bytes()).await?;
    writer.write_all(body).await?;
    writer.flush().await?;
    Ok(())
}

/// A bidirectional message transport.
#[async_trait]
pub trait MessageChannel: Send {
    /// Receive the next raw message, `None` when the peer is gone.
    async fn recv(&mut self) -> Result<Option<Vec<u8>>>;

    /// Send an acknowledgment.
    async fn send(&mut self, ack: &Acknowledgment) -> Result<()>;
}

/// [`MessageChannel`] over a reader/writer pair, normally stdin/stdout.
#[derive(Debug)]
pub struct NativeMessagingChannel<R, W> {
    reader: R,
    writer: W,
    max_message_bytes: usize,
}

impl<R, W> NativeMessagingChannel<R, W> {
    /// Wrap a reader and writer.
    pub fn new(reader: R, writer: W, max_message_bytes: usize) -> Self {
        Self {
            reader,
            writer,
            max_message_bytes,
        }
    }
}

impl NativeMessagingChannel<tokio::io::Stdin, tokio::io::Stdout> {
    /// The channel a browser opens when it launches a native host.
    #[must_use]
    pub fn stdio(max_message_bytes: usize) -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout(), max_message_bytes)
    }
}

#[async_trait]
impl<R, W> MessageChannel for NativeMessagingChannel<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn recv(&mut self) -> Result<Option<Vec<u8>>> {
        read_frame(&mut self.reader, self.max_message_bytes).await
    }

    async fn send(&mut self, ack: &Acknowledgment) -> Result<()> {
        let body = serde_json::to_vec(ack)?;
        write_frame(&mut self.writer, &body).await
    }
}

/// Serve extension messages until the channel closes.
///
/// Returns how many messages were acknowledged.
///
/// # Errors
///
/// Returns transport errors and store failures; undecodable messages are
/// skipped by the endpoint.
pub async fn serve<C, S>(channel: &mut C, endpoint: &mut ExtensionEndpoint<S>) -> Result<usize>
where
    C: MessageChannel + ?Sized,
    S: KeyValueStore,
{
    let mut acknowledged = 0;
    while let Some(raw) = channel.recv().await? {
        debug!("Received extension message of {} bytes", raw.len());
        if let Some(ack) = endpoint.handle_raw(&raw)? {
            channel.send(&ack).await?;
            acknowledged += 1;
        }
    }
    info!("Extension disconnected after {acknowledged} acknowledged messages");
    Ok(acknowledged)
}
