// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `WLED` Lib - A Rust library to control WLED lighting controllers.
//!
//! This library provides async APIs to read and change the state of
//! WLED-powered LED strips over the JSON HTTP API, and to follow live changes
//! over the device WebSocket.
//!
//! # Supported Features
//!
//! - **Device model**: info, state, segments, effects, palettes, presets and
//!   playlists reconciled into one [`Device`], refreshed by partial payloads
//! - **Master control**: power, brightness, transition, nightlight, UDP sync
//! - **Segment control**: colors, effect and palette by id or name, speed,
//!   intensity, bounds
//! - **Presets and playlists**: activation by id or name
//! - **Push updates**: WebSocket listener merging every message
//! - **Firmware**: latest release lookup and over-the-air upgrade
//!
//! Firmware older than [`MIN_SUPPORTED_VERSION`](types::MIN_SUPPORTED_VERSION)
//! is refused.
//!
//! # Quick Start
//!
//! ## Reading the device
//!
//! ```no_run
//! use wled_lib::Wled;
//!
//! #[tokio::main]
//! async fn main() -> wled_lib::Result<()> {
//!     let wled = Wled::new("192.168.1.50")?;
//!     let device = wled.update().await?;
//!
//!     println!("{} ({})", device.info().name, device.info().architecture);
//!     for segment in device.state().segments.values() {
//!         println!(
//!             "segment {}: {} running {}",
//!             segment.segment_id, segment.colors.primary, segment.effect.name
//!         );
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Sending commands
//!
//! ```no_run
//! use wled_lib::Wled;
//! use wled_lib::command::{MasterCommand, SegmentCommand};
//! use wled_lib::types::Color;
//!
//! #[tokio::main]
//! async fn main() -> wled_lib::Result<()> {
//!     let wled = Wled::new("192.168.1.50")?;
//!
//!     wled.master(MasterCommand::new().on(true).brightness(200)).await?;
//!     wled.segment(
//!         SegmentCommand::new(0)
//!             .primary_color(Color::rgb(255, 0, 0))
//!             .effect("Fireworks")
//!             .palette("Party"),
//!     )
//!     .await?;
//!     wled.preset("Evening").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Listening for changes
//!
//! ```no_run
//! use wled_lib::Wled;
//!
//! #[tokio::main]
//! async fn main() -> wled_lib::Result<()> {
//!     let wled = Wled::new("192.168.1.50")?;
//!     wled.connect().await?;
//!
//!     let listener = wled.clone();
//!     let task = tokio::spawn(async move {
//!         listener
//!             .listen(|device| println!("brightness is now {}", device.state().brightness))
//!             .await
//!     });
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(60)).await;
//!     wled.disconnect().await?;
//!     let _ = task.await;
//!     Ok(())
//! }
//! ```
//!
//! ## Working with payloads directly
//!
//! The model does not need a network connection:
//!
//! ```
//! use serde_json::json;
//! use wled_lib::Device;
//!
//! let mut device = Device::new(&json!({
//!     "effects": ["Solid", "Blink"],
//!     "palettes": ["Default"],
//!     "info": {"ver": "0.14.4", "leds": {"count": 30}},
//!     "state": {"on": true, "bri": 128, "seg": [{"start": 0, "stop": 30, "fx": 1}]},
//! }))?;
//! assert_eq!(device.state().segments[&0].effect.name, "Blink");
//!
//! device.update(&json!({"state": {"bri": 20}}));
//! assert_eq!(device.state().brightness, 20);
//! # Ok::<(), wled_lib::DeviceError>(())
//! ```

#[cfg(feature = "http")]
pub mod client;
pub mod command;
pub mod error;
pub mod model;
pub mod protocol;
pub mod types;

#[cfg(feature = "http")]
pub use client::{ReleasesClient, Wled, WledBuilder};
pub use command::{Command, Selector};
pub use error::{DeviceError, Error, ParseError, ProtocolError, Result, ValueError};
pub use model::{Device, Info, State};
#[cfg(feature = "http")]
pub use protocol::HttpConfig;
pub use types::{Color, Version};
