// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the WLED library.
//!
//! This module provides the error hierarchy used across the library: value
//! validation, protocol communication, JSON parsing, and device operations.
//!
//! The device model itself only ever fails with two [`DeviceError`]s, both at
//! construction time: [`DeviceError::IncompleteData`] and
//! [`DeviceError::UnsupportedVersion`]. Everything else inside a payload that
//! is malformed is absorbed by per-field defaults.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred during protocol communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a response.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error occurred during device operations.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// No device data has been fetched yet, or the WebSocket is not open.
    #[error("device is not connected")]
    NotConnected,
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// A color string could not be decoded.
    #[error("invalid hex color: {0}")]
    InvalidHexColor(String),

    /// A name lookup (effect, palette, preset, playlist) found nothing.
    #[error("no {kind} named {name:?}")]
    UnknownName {
        /// What was looked up.
        kind: &'static str,
        /// The name that was requested.
        name: String,
    },
}

/// Errors related to protocol communication (HTTP/WebSocket).
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// WebSocket communication failed.
    #[cfg(feature = "websocket")]
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Connection to the device failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The device answered with an empty body where data was expected.
    #[error("empty response from {0}")]
    EmptyResponse(String),

    /// The WebSocket connection was closed by the remote end.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// The device answered with a 4xx/5xx status.
    #[error("HTTP {status}: {message}")]
    ResponseStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, JSON or plain text.
        message: serde_json::Value,
    },
}

impl ProtocolError {
    /// Returns `true` for transient failures worth another attempt.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            #[cfg(feature = "http")]
            Self::Http(err) => err.is_connect() || err.is_timeout() || err.is_request(),
            Self::ConnectionFailed(_) | Self::Timeout(_) | Self::EmptyResponse(_) => true,
            _ => false,
        }
    }
}

/// Errors related to parsing WLED responses.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unexpected response format.
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),
}

/// Errors related to device operations.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The initial payload lacks one of the required top-level sections.
    #[error("WLED data is incomplete, cannot construct device object: missing {missing}")]
    IncompleteData {
        /// Name of the first missing section.
        missing: &'static str,
    },

    /// The device runs firmware older than the minimum supported version.
    #[error("WLED version {version} is unsupported, minimum is {minimum}")]
    UnsupportedVersion {
        /// Version reported by the device.
        version: String,
        /// Minimum version this library supports.
        minimum: &'static str,
    },

    /// The firmware upgrade flow was refused or failed.
    #[error("upgrade failed: {0}")]
    UpgradeFailed(String),

    /// The device build has WebSockets disabled.
    #[error("device at {0} does not support WebSockets")]
    WebSocketUnsupported(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 0,
            max: 255,
            actual: 300,
        };
        assert_eq!(err.to_string(), "value 300 is out of range [0, 255]");
    }

    #[test]
    fn incomplete_data_display() {
        let err = DeviceError::IncompleteData { missing: "state" };
        assert_eq!(
            err.to_string(),
            "WLED data is incomplete, cannot construct device object: missing state"
        );
    }

    #[test]
    fn error_from_device_error() {
        let err: Error = DeviceError::UnsupportedVersion {
            version: "0.13.3".to_string(),
            minimum: "0.14.0",
        }
        .into();
        assert!(matches!(
            err,
            Error::Device(DeviceError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn transient_protocol_errors() {
        assert!(ProtocolError::Timeout(8000).is_transient());
        assert!(ProtocolError::EmptyResponse("/json".to_string()).is_transient());
        assert!(!ProtocolError::ConnectionClosed("ws".to_string()).is_transient());
        assert!(
            !ProtocolError::ResponseStatus {
                status: 400,
                message: serde_json::json!({"error": 9}),
            }
            .is_transient()
        );
    }
}
