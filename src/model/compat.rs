// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Firmware compatibility rules.
//!
//! Each rule answers one question about a firmware version. A device that
//! reports no usable version is treated as current firmware, except where a
//! rule states otherwise.

use crate::types::Version;

/// First firmware with the nightlight `mode` field (replacing `fade`).
pub const NIGHTLIGHT_MODE_SINCE: &str = "0.10.2";

/// First firmware with per-segment `on` and `bri` fields.
pub const SEGMENT_STATE_SINCE: &str = "0.10.0";

/// First firmware shipping a dedicated Ethernet build for ESP32.
pub const ETHERNET_VARIANT_SINCE: &str = "0.10.0";

/// Compatibility flags derived once per mapping pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compat {
    /// `state.nl.mode` is reported.
    pub nightlight_mode: bool,
    /// `seg[].on` and `seg[].bri` are reported.
    pub segment_state: bool,
}

impl Compat {
    /// Rules for `version`, `None` when the device reported nothing usable.
    #[must_use]
    pub fn for_version(version: Option<&Version>) -> Self {
        Self {
            nightlight_mode: supports(version, NIGHTLIGHT_MODE_SINCE),
            segment_state: supports(version, SEGMENT_STATE_SINCE),
        }
    }
}

impl Default for Compat {
    fn default() -> Self {
        Self::for_version(None)
    }
}

/// Returns `true` when an Ethernet firmware build exists for `version`.
///
/// Unlike the other rules, an unknown version never qualifies.
#[must_use]
pub fn has_ethernet_variant(version: Option<&Version>) -> bool {
    version.is_some_and(|v| v.at_least(ETHERNET_VARIANT_SINCE))
}

fn supports(version: Option<&Version>, since: &str) -> bool {
    match version {
        Some(v) if v.is_valid() => v.at_least(since),
        _ => true,
    }
}
