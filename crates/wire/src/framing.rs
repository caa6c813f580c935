// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Newline-delimited JSON framing (spec §4.6, §6): "each message is a
//! self-delimiting textual-object form (newline-delimited records, one
//! object per frame)". One `serde_json` object per line.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::WireError;

/// Read one frame from `reader`, deserializing it as `T`.
///
/// Returns `Ok(None)` on clean EOF (the peer closed the connection without
/// sending a next frame), which is the normal end for a one-shot request
/// connection after its response, or for a subscriber when the client
/// disconnects.
pub async fn read_frame<R, T>(reader: &mut BufReader<R>) -> Result<Option<T>, WireError>
where
    R: tokio::io::AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut line = String::new();
    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches(['\n', '\r']);
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value = serde_json::from_str(trimmed)?;
    Ok(Some(value))
}

/// Write one frame to `writer`: the JSON encoding of `value` followed by a
/// single `\n`, flushed immediately so the peer observes it without
/// buffering delay.
pub async fn write_frame<W, T>(writer: &mut W, value: &T) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut encoded = serde_json::to_vec(value)?;
    encoded.push(b'\n');
    writer.write_all(&encoded).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
#[path = "framing_tests.rs"]
mod tests;
