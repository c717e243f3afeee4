// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transports for communicating with WLED devices.
//!
//! # Protocols
//!
//! - [`HttpClient`]: request/response over the JSON API, with retries
//! - [`WebSocketClient`]: push updates over `/ws`
//!
//! Both are configured through [`HttpConfig`]; transient HTTP failures are
//! retried according to its [`RetryPolicy`].

#[cfg(feature = "http")]
mod http;
mod retry;
#[cfg(feature = "websocket")]
mod websocket;

#[cfg(feature = "http")]
pub use http::{HttpClient, HttpConfig, STATE_PATH};
#[cfg(feature = "http")]
pub(crate) use http::read_response;
pub use retry::RetryPolicy;
#[cfg(feature = "websocket")]
pub use websocket::WebSocketClient;
