// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared by the device model and the command builders.
//!
//! # Types
//!
//! - [`Color`] / [`SegmentColors`] - RGB(W) colors, decoded from tuples or hex
//! - [`Version`] - Loosely formatted, cached, comparable firmware version
//! - [`LightCapability`] - Light capability bit flags
//! - [`SyncGroup`] - UDP sync group bit flags (groups 1-8)
//! - [`LiveDataOverride`] - Live data override mode
//! - [`NightlightMode`] - Nightlight mode

mod color;
mod flags;
mod mode;
mod version;

pub use color::{Color, SegmentColors};
pub use flags::{LightCapability, SyncGroup};
pub use mode::{LiveDataOverride, NightlightMode};
pub use version::{MIN_SUPPORTED_VERSION, Version};
