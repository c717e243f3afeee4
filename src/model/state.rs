// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dynamic device state (`/json/state`) and its segments.

use std::collections::BTreeMap;

use serde_json::Value;

use super::compat::Compat;
use super::effect::{Effect, Palette};
use super::json::{bool_at, field, i32_at, i64_at, str_at, u32_at, u64_at, u8_at};
use super::preset::{Playlist, Preset};
use crate::types::{LiveDataOverride, NightlightMode, SegmentColors, SyncGroup};

/// Default effect intensity and speed of a fresh segment.
const DEFAULT_EFFECT_PARAMETER: u8 = 128;

/// Lookup tables a segment or state is resolved against.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MappingContext<'a> {
    pub effects: &'a BTreeMap<u32, Effect>,
    pub palettes: &'a BTreeMap<u32, Palette>,
    pub compat: Compat,
}

/// Master values a segment falls back to when it has no `on`/`bri` of its own.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MasterState {
    pub on: bool,
    pub brightness: u8,
}

/// Reference from the state to the running preset or playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActiveId {
    /// Id of an entry in the device's preset or playlist collection.
    Resolved(u32),
    /// Id as reported, kept when the device has no stored presets at all.
    Unresolved(i64),
}

impl ActiveId {
    /// Returns the numeric id.
    #[must_use]
    pub fn id(&self) -> i64 {
        match self {
            Self::Resolved(id) => i64::from(*id),
            Self::Unresolved(id) => *id,
        }
    }

    fn resolve(raw: Option<i64>, has_storage: bool, exists: impl Fn(u32) -> bool) -> Option<Self> {
        let raw = raw?;
        if !has_storage {
            return Some(Self::Unresolved(raw));
        }
        u32::try_from(raw)
            .ok()
            .filter(|id| exists(*id))
            .map(Self::Resolved)
    }
}

/// Nightlight timer (`state.nl`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Nightlight {
    /// Timer length in minutes.
    pub duration: u32,
    /// How the target brightness is reached.
    pub mode: NightlightMode,
    /// Whether the timer is running.
    pub on: bool,
    /// Brightness at the end of the timer.
    pub target_brightness: u8,
}

impl Nightlight {
    pub(crate) fn from_json(value: &Value, compat: Compat) -> Self {
        let mode = compat
            .nightlight_mode
            .then(|| u64_at(value, "mode").and_then(NightlightMode::from_num))
            .flatten()
            .or_else(|| bool_at(value, "fade").map(NightlightMode::from_fade))
            .unwrap_or_default();

        Self {
            duration: u32_at(value, "dur").unwrap_or(1),
            mode,
            on: bool_at(value, "on").unwrap_or(false),
            target_brightness: u8_at(value, "tbri").unwrap_or(0),
        }
    }
}

/// UDP broadcast sync (`state.udpn`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UdpSync {
    /// Receive broadcasts.
    pub receive: bool,
    /// Groups received from.
    pub receive_groups: SyncGroup,
    /// Broadcast changes.
    pub send: bool,
    /// Groups broadcast to.
    pub send_groups: SyncGroup,
}

impl UdpSync {
    pub(crate) fn from_json(value: &Value) -> Self {
        Self {
            receive: bool_at(value, "recv").unwrap_or(false),
            receive_groups: SyncGroup::from_bits(u8_at(value, "rgrp").unwrap_or(0)),
            send: bool_at(value, "send").unwrap_or(false),
            send_groups: SyncGroup::from_bits(u8_at(value, "sgrp").unwrap_or(0)),
        }
    }
}

/// An addressable region of the LED strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Segment id.
    pub segment_id: u32,
    /// Optional user given name.
    pub name: Option<String>,
    /// First LED.
    pub start: u32,
    /// LED after the last one.
    pub stop: u32,
    /// Number of LEDs.
    pub length: u32,
    /// Brightness.
    pub brightness: u8,
    /// Power state.
    pub on: bool,
    /// Primary, secondary and tertiary colors.
    pub colors: SegmentColors,
    /// Running effect.
    pub effect: Effect,
    /// Active palette.
    pub palette: Palette,
    /// Effect intensity.
    pub intensity: u8,
    /// Effect speed.
    pub speed: u8,
    /// Effect runs backwards.
    pub reverse: bool,
    /// Selected for UI and API commands.
    pub selected: bool,
    /// Segment this one mirrors, -1 for none.
    pub clones: i32,
}

impl Segment {
    /// Returns `false` for segments the device considers deleted
    /// (`stop <= start`).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.stop > self.start
    }

    pub(crate) fn from_json(
        position: u32,
        value: &Value,
        master: MasterState,
        ctx: &MappingContext<'_>,
    ) -> Self {
        let start = u32_at(value, "start").unwrap_or(0);
        let stop = u32_at(value, "stop").unwrap_or(0);

        let (on, brightness) = if ctx.compat.segment_state {
            (
                bool_at(value, "on").unwrap_or(master.on),
                u8_at(value, "bri").unwrap_or(master.brightness),
            )
        } else {
            (master.on, master.brightness)
        };

        let effect = u32_at(value, "fx")
            .and_then(|id| ctx.effects.get(&id))
            .cloned()
            .unwrap_or_else(Effect::unknown);
        let palette = u32_at(value, "pal")
            .and_then(|id| ctx.palettes.get(&id))
            .cloned()
            .unwrap_or_else(Palette::unknown);

        Self {
            segment_id: u32_at(value, "id").unwrap_or(position),
            name: str_at(value, "n")
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            start,
            stop,
            length: u32_at(value, "len").unwrap_or_else(|| stop.saturating_sub(start)),
            brightness,
            on,
            colors: field(value, "col").map(SegmentColors::from_json).unwrap_or_default(),
            effect,
            palette,
            intensity: u8_at(value, "ix").unwrap_or(DEFAULT_EFFECT_PARAMETER),
            speed: u8_at(value, "sx").unwrap_or(DEFAULT_EFFECT_PARAMETER),
            reverse: bool_at(value, "rev").unwrap_or(false),
            selected: bool_at(value, "sel").unwrap_or(false),
            clones: i32_at(value, "cln").unwrap_or(-1),
        }
    }
}

/// Yields `(position, blob)` for a `seg` field that may be a list or, in
/// legacy payloads, a single object. Non-object entries are skipped.
pub(crate) fn segment_blobs(seg: Option<&Value>) -> impl Iterator<Item = (u32, &Value)> {
    let blobs: &[Value] = match seg {
        Some(Value::Array(items)) => items,
        Some(obj @ Value::Object(_)) => std::slice::from_ref(obj),
        _ => &[],
    };
    blobs
        .iter()
        .enumerate()
        .filter(|(_, blob)| blob.is_object())
        .filter_map(|(index, blob)| Some((u32::try_from(index).ok()?, blob)))
}

/// Live device state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct State {
    /// Master brightness, never 0 in a device response.
    pub brightness: u8,
    /// Master power.
    pub on: bool,
    /// Nightlight timer.
    pub nightlight: Nightlight,
    /// UDP sync settings.
    pub sync: UdpSync,
    /// Segments by id.
    pub segments: BTreeMap<u32, Segment>,
    /// Transition time in units of 100 ms.
    pub transition: u32,
    /// Live data override.
    pub live_data_override: LiveDataOverride,
    /// Running preset.
    pub preset: Option<ActiveId>,
    /// Running playlist.
    pub playlist: Option<ActiveId>,
}

impl State {
    pub(crate) fn from_json(
        value: &Value,
        ctx: &MappingContext<'_>,
        presets: &BTreeMap<u32, Preset>,
        playlists: &BTreeMap<u32, Playlist>,
    ) -> Self {
        let master = MasterState {
            on: bool_at(value, "on").unwrap_or(false),
            brightness: u8_at(value, "bri").unwrap_or(1),
        };

        let segments = segment_blobs(field(value, "seg"))
            .map(|(position, blob)| {
                let segment = Segment::from_json(position, blob, master, ctx);
                (segment.segment_id, segment)
            })
            .collect();

        let has_storage = !presets.is_empty() || !playlists.is_empty();

        Self {
            brightness: master.brightness,
            on: master.on,
            nightlight: field(value, "nl")
                .map(|nl| Nightlight::from_json(nl, ctx.compat))
                .unwrap_or_else(|| Nightlight::from_json(&Value::Null, ctx.compat)),
            sync: field(value, "udpn").map(UdpSync::from_json).unwrap_or_default(),
            segments,
            transition: u32_at(value, "transition").unwrap_or(0),
            live_data_override: u64_at(value, "lor")
                .and_then(LiveDataOverride::from_num)
                .unwrap_or_default(),
            preset: ActiveId::resolve(i64_at(value, "ps"), has_storage, |id| {
                presets.contains_key(&id)
            }),
            playlist: ActiveId::resolve(i64_at(value, "pl"), has_storage, |id| {
                playlists.contains_key(&id)
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::effect::{index_effects, index_palettes};
    use crate::types::{Color, Version};
    use serde_json::json;

    fn tables() -> (BTreeMap<u32, Effect>, BTreeMap<u32, Palette>) {
        (
            index_effects(&json!(["Solid", "Blink"])),
            index_palettes(&json!(["Default", "Party"])),
        )
    }

    fn map_state(value: &Value) -> State {
        let (effects, palettes) = tables();
        let ctx = MappingContext {
            effects: &effects,
            palettes: &palettes,
            compat: Compat::default(),
        };
        State::from_json(value, &ctx, &BTreeMap::new(), &BTreeMap::new())
    }

    #[test]
    fn segment_ids_follow_position_unless_explicit() {
        let state = map_state(&json!({"seg": [{"start": 0}, {"id": 5}, {"stop": 4}]}));
        let ids: Vec<u32> = state.segments.keys().copied().collect();
        assert_eq!(ids, vec![0, 2, 5]);
    }

    #[test]
    fn resolves_effect_and_palette() {
        let state = map_state(&json!({"seg": [{"fx": 1, "pal": 1}, {"fx": 9, "pal": "x"}]}));
        assert_eq!(state.segments[&0].effect.name, "Blink");
        assert_eq!(state.segments[&0].palette.name, "Party");
        assert_eq!(state.segments[&1].effect, Effect::unknown());
        assert_eq!(state.segments[&1].palette, Palette::unknown());
    }

    #[test]
    fn segment_inherits_master_values() {
        let state = map_state(&json!({
            "on": true,
            "bri": 200,
            "seg": [{"bri": 10}, {"on": false}]
        }));
        assert_eq!(state.segments[&0].brightness, 10);
        assert!(state.segments[&0].on);
        assert_eq!(state.segments[&1].brightness, 200);
        assert!(!state.segments[&1].on);
    }

    #[test]
    fn legacy_firmware_ignores_segment_state() {
        let (effects, palettes) = tables();
        let version = Version::parse("0.9.0");
        let ctx = MappingContext {
            effects: &effects,
            palettes: &palettes,
            compat: Compat::for_version(Some(&version)),
        };
        let state = State::from_json(
            &json!({"on": true, "bri": 50, "seg": [{"on": false, "bri": 3}]}),
            &ctx,
            &BTreeMap::new(),
            &BTreeMap::new(),
        );
        assert!(state.segments[&0].on);
        assert_eq!(state.segments[&0].brightness, 50);
    }

    #[test]
    fn length_and_validity() {
        let state = map_state(&json!({"seg": [
            {"start": 2, "stop": 10},
            {"start": 0, "stop": 10, "len": 4},
            {"start": 10, "stop": 0}
        ]}));
        assert_eq!(state.segments[&0].length, 8);
        assert_eq!(state.segments[&1].length, 4);
        assert_eq!(state.segments[&2].length, 0);
        assert!(!state.segments[&2].is_valid());
        assert!(state.segments[&0].is_valid());
    }

    #[test]
    fn mixed_color_encodings() {
        let state = map_state(&json!({"seg": [{"col": ["#FF0000", [0, 255, 0, 12]]}]}));
        let colors = state.segments[&0].colors;
        assert_eq!(colors.primary, Color::rgb(255, 0, 0));
        assert_eq!(colors.secondary, Color::rgbw(0, 255, 0, 12));
        assert_eq!(colors.tertiary, Color::BLACK);
    }

    #[test]
    fn active_ids_without_storage_are_kept() {
        let state = map_state(&json!({"ps": -1, "pl": 3}));
        assert_eq!(state.preset, Some(ActiveId::Unresolved(-1)));
        assert_eq!(state.playlist.map(|p| p.id()), Some(3));
        assert_eq!(map_state(&json!({})).preset, None);
    }

    #[test]
    fn nightlight_mode_and_fade() {
        let state = map_state(&json!({"nl": {"on": true, "dur": 30, "mode": 3, "tbri": 5}}));
        assert_eq!(state.nightlight.mode, NightlightMode::Sunrise);
        assert_eq!(state.nightlight.duration, 30);

        let state = map_state(&json!({"nl": {"fade": true}}));
        assert_eq!(state.nightlight.mode, NightlightMode::Fade);

        let nl = Nightlight::from_json(&json!({"mode": 2, "fade": false}), Compat {
            nightlight_mode: false,
            segment_state: true,
        });
        assert_eq!(nl.mode, NightlightMode::Instant);
        assert_eq!(map_state(&json!({})).nightlight.duration, 1);
    }

    #[test]
    fn sync_and_live_override() {
        let state = map_state(&json!({
            "udpn": {"send": true, "recv": 1, "sgrp": 5, "rgrp": 1},
            "lor": 2
        }));
        assert!(state.sync.send);
        assert!(state.sync.receive);
        assert_eq!(state.sync.send_groups.groups().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(state.live_data_override, LiveDataOverride::UntilReboot);
    }

    #[test]
    fn single_object_segment() {
        let fx = json!({"fx": 1});
        let blobs: Vec<_> = segment_blobs(Some(&fx)).collect();
        assert_eq!(blobs.len(), 1);
        assert_eq!(segment_blobs(Some(&json!([1, {}, "x"]))).count(), 1);
        assert_eq!(segment_blobs(None).count(), 0);
    }
}
