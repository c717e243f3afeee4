// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bit-flag values reported by WLED.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Capabilities of a light or segment (`info.leds.lc` / `info.leds.seglc`).
///
/// # Examples
///
/// ```
/// use wled_lib::types::LightCapability;
///
/// let caps = LightCapability::from_bits(3);
/// assert!(caps.contains(LightCapability::RGB_COLOR));
/// assert!(caps.contains(LightCapability::WHITE_CHANNEL));
/// assert!(!caps.contains(LightCapability::COLOR_TEMPERATURE));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LightCapability(u8);

impl LightCapability {
    /// No capabilities.
    pub const NONE: Self = Self(0);
    /// Supports RGB color.
    pub const RGB_COLOR: Self = Self(1);
    /// Has a dedicated white channel.
    pub const WHITE_CHANNEL: Self = Self(2);
    /// Supports color temperature adjustment.
    pub const COLOR_TEMPERATURE: Self = Self(4);
    /// Supports manual white channel control.
    pub const MANUAL_WHITE: Self = Self(8);

    /// Creates a capability set from raw bits. Reserved bits are kept.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Returns `true` if every bit of `other` is set.
    #[must_use]
    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for LightCapability {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// UDP sync group membership, groups 1 through 8 as bits 0 through 7.
///
/// # Examples
///
/// ```
/// use wled_lib::types::SyncGroup;
///
/// let groups = SyncGroup::group(1).unwrap() | SyncGroup::group(3).unwrap();
/// assert_eq!(groups.bits(), 0b101);
/// assert_eq!(groups.groups().collect::<Vec<_>>(), vec![1, 3]);
/// assert!(SyncGroup::group(9).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncGroup(u8);

impl SyncGroup {
    /// Member of no group.
    pub const NONE: Self = Self(0);
    /// Member of every group.
    pub const ALL: Self = Self(u8::MAX);

    /// Returns the flag for group `number` (1-8).
    #[must_use]
    pub const fn group(number: u8) -> Option<Self> {
        if number == 0 || number > 8 {
            return None;
        }
        Some(Self(1 << (number - 1)))
    }

    /// Creates a group set from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Returns `true` if every group of `other` is set.
    #[must_use]
    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Iterates the member group numbers in ascending order.
    pub fn groups(&self) -> impl Iterator<Item = u8> + '_ {
        (1..=8u8).filter(|n| self.0 & (1 << (n - 1)) != 0)
    }
}

impl BitOr for SyncGroup {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for SyncGroup {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for SyncGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups: Vec<String> = self.groups().map(|g| g.to_string()).collect();
        write!(f, "[{}]", groups.join(", "))
    }
}
