// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed device model built from WLED JSON payloads.
//!
//! Everything here is synchronous and free of I/O. Malformed substructures are
//! absorbed by per-field defaults; the only failures are the two
//! construction errors of [`Device::new`].
//!
//! Cross references (segment to effect, playlist to preset, state to preset)
//! are integer ids resolved against the id-keyed collections of the
//! [`Device`]. A reference that cannot be resolved becomes a placeholder
//! ([`Effect::unknown`], [`Palette::unknown`]) or `None`.

pub mod compat;
mod device;
mod effect;
mod info;
mod json;
mod preset;
mod releases;
mod state;

pub use device::Device;
pub use effect::{Effect, Palette, UNKNOWN_NAME, index_effects, index_palettes};
pub use info::{Filesystem, Info, Leds, UNASSOCIATED_BSSID, Wifi};
pub use preset::{Playlist, PlaylistEntry, Preset};
pub use releases::{Release, Releases};
pub use state::{ActiveId, Nightlight, Segment, State, UdpSync};
