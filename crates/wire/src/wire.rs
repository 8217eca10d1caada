//! Length-prefixed JSON framing: 4-byte big-endian length + JSON payload.

use crate::{Request, Response};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message of {0} bytes exceeds the {1} byte limit")]
    TooLarge(usize, usize),
}

/// Caps a single frame's payload size so a malformed length prefix can't
/// make the reader allocate unbounded memory.
const MAX_MESSAGE_BYTES: usize = 64 * 1024 * 1024;

/// Serialize `value` to JSON bytes, without the length prefix.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(value)?)
}

/// Deserialize JSON bytes into `T`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Write `payload` prefixed with its big-endian `u32` length.
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    payload: &[u8],
) -> Result<(), ProtocolError> {
    if payload.len() > MAX_MESSAGE_BYTES {
        return Err(ProtocolError::TooLarge(payload.len(), MAX_MESSAGE_BYTES));
    }
    writer.write_all(&(payload.len() as u32).to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one length-prefixed message, returning its raw payload bytes.
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_BYTES {
        return Err(ProtocolError::TooLarge(len, MAX_MESSAGE_BYTES));
    }
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

/// Read one framed [`Request`] from the wire.
pub async fn read_request<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Request, ProtocolError> {
    let bytes = read_message(reader).await?;
    decode(&bytes)
}

/// Write one framed [`Response`] to the wire.
pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response,
) -> Result<(), ProtocolError> {
    let bytes = encode(response)?;
    write_message(writer, &bytes).await
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
