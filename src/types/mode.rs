// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Enumerated modes of the WLED state API.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Live data override (`state.lor`).
///
/// Controls whether externally pushed realtime data overrides the local
/// effect rendering.
///
/// # Examples
///
/// ```
/// use wled_lib::types::LiveDataOverride;
///
/// assert_eq!(LiveDataOverride::from_num(2), Some(LiveDataOverride::UntilReboot));
/// assert_eq!(LiveDataOverride::On.as_num(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LiveDataOverride {
    /// Live data is applied when it arrives.
    #[default]
    Off,
    /// Local rendering wins until the live data stream ends.
    On,
    /// Local rendering wins until the controller reboots.
    UntilReboot,
}

impl LiveDataOverride {
    /// Maps the numeric API value.
    #[must_use]
    pub const fn from_num(value: u64) -> Option<Self> {
        match value {
            0 => Some(Self::Off),
            1 => Some(Self::On),
            2 => Some(Self::UntilReboot),
            _ => None,
        }
    }

    /// Returns the numeric API value.
    #[must_use]
    pub const fn as_num(&self) -> u8 {
        match self {
            Self::Off => 0,
            Self::On => 1,
            Self::UntilReboot => 2,
        }
    }
}

impl TryFrom<u8> for LiveDataOverride {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_num(u64::from(value)).ok_or(ValueError::OutOfRange {
            min: 0,
            max: 2,
            actual: u16::from(value),
        })
    }
}

impl From<LiveDataOverride> for u8 {
    fn from(value: LiveDataOverride) -> Self {
        value.as_num()
    }
}

impl fmt::Display for LiveDataOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Off => "off",
            Self::On => "on",
            Self::UntilReboot => "until reboot",
        })
    }
}

/// Nightlight mode (`state.nl.mode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum NightlightMode {
    /// Switch to the target brightness once the duration has elapsed.
    #[default]
    Instant,
    /// Dim gradually over the duration.
    Fade,
    /// Fade brightness and primary color towards the secondary color.
    ColorFade,
    /// Sunrise emulation.
    Sunrise,
}

impl NightlightMode {
    /// Maps the numeric API value.
    #[must_use]
    pub const fn from_num(value: u64) -> Option<Self> {
        match value {
            0 => Some(Self::Instant),
            1 => Some(Self::Fade),
            2 => Some(Self::ColorFade),
            3 => Some(Self::Sunrise),
            _ => None,
        }
    }

    /// Maps the pre-0.10.2 boolean `fade` flag.
    #[must_use]
    pub const fn from_fade(fade: bool) -> Self {
        if fade { Self::Fade } else { Self::Instant }
    }

    /// Returns the numeric API value.
    #[must_use]
    pub const fn as_num(&self) -> u8 {
        match self {
            Self::Instant => 0,
            Self::Fade => 1,
            Self::ColorFade => 2,
            Self::Sunrise => 3,
        }
    }
}

impl TryFrom<u8> for NightlightMode {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_num(u64::from(value)).ok_or(ValueError::OutOfRange {
            min: 0,
            max: 3,
            actual: u16::from(value),
        })
    }
}

impl From<NightlightMode> for u8 {
    fn from(value: NightlightMode) -> Self {
        value.as_num()
    }
}
