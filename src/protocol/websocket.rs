// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! WebSocket transport for push updates (`/ws`).
//!
//! After connecting, the device sends its full `state` and `info` and then a
//! new message after every change.

use std::fmt;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::error::ProtocolError;

type Stream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// An open WebSocket connection to a device.
pub struct WebSocketClient {
    url: String,
    write: SplitSink<Stream, Message>,
    read: SplitStream<Stream>,
}

impl fmt::Debug for WebSocketClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebSocketClient")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl WebSocketClient {
    /// Opens a connection to `url` (`ws://host/ws`).
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ConnectionFailed`] if the handshake fails.
    pub async fn connect(url: &str) -> Result<Self, ProtocolError> {
        tracing::debug!(url = %url, "Opening WebSocket");

        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| ProtocolError::ConnectionFailed(format!("{url}: {e}")))?;
        let (write, read) = stream.split();

        tracing::info!(url = %url, "WebSocket connected");

        Ok(Self {
            url: url.to_string(),
            write,
            read,
        })
    }

    /// Returns the URL this client is connected to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Waits for the next JSON message.
    ///
    /// Control frames and text that is not valid JSON are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ConnectionClosed`] when the device closes the
    /// connection, or the underlying WebSocket error.
    pub async fn receive(&mut self) -> Result<Value, ProtocolError> {
        loop {
            let message = self
                .read
                .next()
                .await
                .ok_or_else(|| ProtocolError::ConnectionClosed(self.url.clone()))??;

            match message {
                Message::Text(text) => match serde_json::from_str(&text) {
                    Ok(value) => return Ok(value),
                    Err(err) => {
                        tracing::debug!(error = %err, "Ignoring non-JSON WebSocket message");
                    }
                },
                Message::Close(frame) => {
                    let reason = frame.map_or_else(String::new, |f| f.reason.to_string());
                    tracing::debug!(url = %self.url, reason = %reason, "WebSocket closed by device");
                    return Err(ProtocolError::ConnectionClosed(self.url.clone()));
                }
                Message::Binary(_) | Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }

    /// Sends a JSON message, for example a state change.
    ///
    /// # Errors
    ///
    /// Returns the underlying WebSocket error.
    pub async fn send(&mut self, value: &Value) -> Result<(), ProtocolError> {
        self.write.send(Message::Text(value.to_string())).await?;
        Ok(())
    }

    /// Closes the connection.
    ///
    /// # Errors
    ///
    /// Returns the underlying WebSocket error.
    pub async fn close(&mut self) -> Result<(), ProtocolError> {
        tracing::debug!(url = %self.url, "Closing WebSocket");
        self.write.close().await?;
        Ok(())
    }
}
