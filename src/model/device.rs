// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The device aggregate.
//!
//! A [`Device`] is built once from a full payload and then kept up to date by
//! merging partial payloads into it with [`Device::update`]. Each top-level
//! section present in a payload replaces the value derived from it; absent
//! sections are left untouched.
//!
//! Merging is not synchronized. Callers sharing a device between tasks must
//! serialize updates themselves, as [`Wled`](crate::Wled) does with its lock.

use std::collections::BTreeMap;

use serde_json::Value;

use super::compat::Compat;
use super::effect::{Effect, Palette, ids_sorted_by_name, index_effects, index_palettes};
use super::info::Info;
use super::json::field;
use super::preset::{Playlist, Preset, resolve_presets};
use super::releases::Releases;
use super::state::{ActiveId, MappingContext, Segment, State};
use crate::error::DeviceError;
use crate::types::{MIN_SUPPORTED_VERSION, Version};

/// Sections that must be present (possibly empty) to build a device.
const REQUIRED_SECTIONS: [&str; 4] = ["effects", "palettes", "info", "state"];

/// Snapshot of a WLED device.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use wled_lib::model::Device;
///
/// let mut device = Device::new(&json!({
///     "effects": ["Solid", "Blink"],
///     "palettes": ["Default"],
///     "info": {"ver": "0.14.0"},
///     "state": {"on": true, "bri": 128, "seg": [{"fx": 1}]}
/// }))
/// .unwrap();
/// assert_eq!(device.state().segments[&0].effect.name, "Blink");
///
/// device.update(&json!({"state": {"on": false, "bri": 1, "seg": [{"fx": 0}]}}));
/// assert!(!device.state().on);
/// assert_eq!(device.effects().count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Device {
    info: Info,
    state: State,
    effects: BTreeMap<u32, Effect>,
    palettes: BTreeMap<u32, Palette>,
    presets: BTreeMap<u32, Preset>,
    playlists: BTreeMap<u32, Playlist>,
    effect_order: Vec<u32>,
    palette_order: Vec<u32>,
    preset_order: Vec<u32>,
    playlist_order: Vec<u32>,
}

impl Device {
    /// Builds a device from a full payload.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnsupportedVersion`] if `info.ver` is older than
    /// [`MIN_SUPPORTED_VERSION`]. This is checked first. Otherwise returns
    /// [`DeviceError::IncompleteData`] if `effects`, `palettes`, `info` or
    /// `state` is missing or `null`.
    pub fn new(data: &Value) -> Result<Self, DeviceError> {
        if let Some(raw) = data
            .get("info")
            .and_then(|info| info.get("ver"))
            .and_then(Value::as_str)
        {
            let version = Version::parse(raw);
            if version.older_than(MIN_SUPPORTED_VERSION) {
                return Err(DeviceError::UnsupportedVersion {
                    version: version.as_str().to_string(),
                    minimum: MIN_SUPPORTED_VERSION,
                });
            }
        }

        if let Some(missing) = REQUIRED_SECTIONS
            .into_iter()
            .find(|section| field(data, section).is_none())
        {
            return Err(DeviceError::IncompleteData { missing });
        }

        let mut device = Self::default();
        device.update(data);
        Ok(device)
    }

    /// Merges a partial payload and returns the updated device.
    ///
    /// Sections are applied in dependency order: effects, palettes, presets
    /// (split into presets and playlists), info, then state, which is resolved
    /// against the collections as they stand after this merge.
    pub fn update(&mut self, data: &Value) -> &mut Self {
        if let Some(effects) = field(data, "effects") {
            self.effects = index_effects(effects);
            self.effect_order = ids_sorted_by_name(&self.effects, |e| e.name.as_str());
        }

        if let Some(palettes) = field(data, "palettes") {
            self.palettes = index_palettes(palettes);
            self.palette_order = ids_sorted_by_name(&self.palettes, |p| p.name.as_str());
        }

        if let Some(presets) = field(data, "presets") {
            let ctx = self.mapping_context();
            let (presets, playlists) = resolve_presets(presets, &ctx);
            self.preset_order = ids_sorted_by_name(&presets, |p| p.name.as_str());
            self.playlist_order = ids_sorted_by_name(&playlists, |p| p.name.as_str());
            self.presets = presets;
            self.playlists = playlists;
        }

        if let Some(info) = field(data, "info") {
            let mut info = Info::from_json(info);
            info.version_latest_stable = self.info.version_latest_stable.take();
            info.version_latest_beta = self.info.version_latest_beta.take();
            self.info = info;
        }

        if let Some(state) = field(data, "state") {
            let ctx = self.mapping_context();
            self.state = State::from_json(state, &ctx, &self.presets, &self.playlists);
        }

        self
    }

    /// Records the latest firmware releases in [`Info`].
    pub fn set_latest_versions(&mut self, releases: &Releases) -> &mut Self {
        self.info.version_latest_stable.clone_from(&releases.stable);
        self.info.version_latest_beta.clone_from(&releases.beta);
        self
    }

    fn mapping_context(&self) -> MappingContext<'_> {
        MappingContext {
            effects: &self.effects,
            palettes: &self.palettes,
            compat: Compat::for_version(self.info.version.as_ref()),
        }
    }

    // ========== Sections ==========

    /// Returns the device information.
    #[must_use]
    pub fn info(&self) -> &Info {
        &self.info
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Effects ordered by name.
    pub fn effects(&self) -> impl Iterator<Item = &Effect> {
        self.effect_order.iter().map(|id| &self.effects[id])
    }

    /// Palettes ordered by name.
    pub fn palettes(&self) -> impl Iterator<Item = &Palette> {
        self.palette_order.iter().map(|id| &self.palettes[id])
    }

    /// Presets ordered by name.
    pub fn presets(&self) -> impl Iterator<Item = &Preset> {
        self.preset_order.iter().map(|id| &self.presets[id])
    }

    /// Playlists ordered by name.
    pub fn playlists(&self) -> impl Iterator<Item = &Playlist> {
        self.playlist_order.iter().map(|id| &self.playlists[id])
    }

    /// Effects by id.
    #[must_use]
    pub fn effects_by_id(&self) -> &BTreeMap<u32, Effect> {
        &self.effects
    }

    /// Palettes by id.
    #[must_use]
    pub fn palettes_by_id(&self) -> &BTreeMap<u32, Palette> {
        &self.palettes
    }

    /// Presets by id.
    #[must_use]
    pub fn presets_by_id(&self) -> &BTreeMap<u32, Preset> {
        &self.presets
    }

    /// Playlists by id.
    #[must_use]
    pub fn playlists_by_id(&self) -> &BTreeMap<u32, Playlist> {
        &self.playlists
    }

    // ========== Lookups ==========

    /// Returns the effect with the given id.
    #[must_use]
    pub fn effect(&self, effect_id: u32) -> Option<&Effect> {
        self.effects.get(&effect_id)
    }

    /// Returns the palette with the given id.
    #[must_use]
    pub fn palette(&self, palette_id: u32) -> Option<&Palette> {
        self.palettes.get(&palette_id)
    }

    /// Returns the preset with the given id.
    #[must_use]
    pub fn preset(&self, preset_id: u32) -> Option<&Preset> {
        self.presets.get(&preset_id)
    }

    /// Returns the playlist with the given id.
    #[must_use]
    pub fn playlist(&self, playlist_id: u32) -> Option<&Playlist> {
        self.playlists.get(&playlist_id)
    }

    /// Returns the segment with the given id.
    #[must_use]
    pub fn segment(&self, segment_id: u32) -> Option<&Segment> {
        self.state.segments.get(&segment_id)
    }

    /// Finds an effect by name, ignoring case.
    #[must_use]
    pub fn effect_by_name(&self, name: &str) -> Option<&Effect> {
        self.effects
            .values()
            .find(|e| e.name.eq_ignore_ascii_case(name))
    }

    /// Finds a palette by name, ignoring case.
    #[must_use]
    pub fn palette_by_name(&self, name: &str) -> Option<&Palette> {
        self.palettes
            .values()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Finds a preset by name, ignoring case.
    #[must_use]
    pub fn preset_by_name(&self, name: &str) -> Option<&Preset> {
        self.presets
            .values()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Finds a playlist by name, ignoring case.
    #[must_use]
    pub fn playlist_by_name(&self, name: &str) -> Option<&Playlist> {
        self.playlists
            .values()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Returns the running preset, if it is a stored one.
    #[must_use]
    pub fn active_preset(&self) -> Option<&Preset> {
        match self.state.preset? {
            ActiveId::Resolved(id) => self.presets.get(&id),
            ActiveId::Unresolved(_) => None,
        }
    }

    /// Returns the running playlist, if it is a stored one.
    #[must_use]
    pub fn active_playlist(&self) -> Option<&Playlist> {
        match self.state.playlist? {
            ActiveId::Resolved(id) => self.playlists.get(&id),
            ActiveId::Unresolved(_) => None,
        }
    }
}
