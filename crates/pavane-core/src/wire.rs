//! Framed reads from the socket.
//!
//! The read side probes the 4-byte body length first so that an oversize
//! declaration is rejected before any payload memory is allocated; the
//! remaining 16 descriptor bytes and the body follow. The descriptor
//! carries no routing information for control frames, so only the body is
//! handed onward.

use bytes::Bytes;
use pavane_proto::{Descriptor, ProtocolError};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::ClientError;

/// Read one frame and return its body.
///
/// # Errors
///
/// - [`ClientError::Protocol`] with an oversize-payload cause when the
///   declared body exceeds 16 MiB; the caller must tear the connection
///   down, the stream is no longer frame-aligned.
/// - [`ClientError::Transport`] when the peer closes mid-frame or the
///   read fails.
pub(crate) async fn read_frame<R>(reader: &mut R) -> Result<Bytes, ClientError>
where
    R: AsyncRead + Unpin,
{
    let mut length = [0u8; 4];
    reader.read_exact(&mut length).await?;
    let length = u32::from_be_bytes(length);

    if length > Descriptor::MAX_PAYLOAD_SIZE {
        return Err(ProtocolError::PayloadTooLarge {
            size: length as usize,
            max: Descriptor::MAX_PAYLOAD_SIZE as usize,
        }
        .into());
    }

    let mut descriptor_rest = [0u8; Descriptor::SIZE - 4];
    reader.read_exact(&mut descriptor_rest).await?;

    let mut body = vec![0u8; length as usize];
    reader.read_exact(&mut body).await?;
    Ok(Bytes::from(body))
}
