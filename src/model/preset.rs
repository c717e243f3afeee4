// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Presets and playlists (`/presets.json`).
//!
//! The device stores both in one object keyed by numeric-string id. A blob
//! whose `playlist.ps` is a non-empty list is a playlist, anything else is a
//! preset. [`resolve_presets`] splits the object into two typed collections;
//! presets are built first so playlist entries and the playlist `end` can be
//! resolved against them.

use std::collections::BTreeMap;

use serde_json::Value;

use super::json::{bool_at, field, id_key, str_at, u32_at, u8_at};
use super::state::{MappingContext, MasterState, Segment, segment_blobs};

/// A saved scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    /// Preset id (1-250).
    pub preset_id: u32,
    /// Name, the id as a string when unnamed.
    pub name: String,
    /// Short label for quick-load buttons.
    pub quick_label: Option<String>,
    /// Power state applied by the preset.
    pub on: bool,
    /// Transition time in units of 100 ms.
    pub transition: Option<u32>,
    /// Position of the main segment in [`Preset::segments`].
    pub main_segment_id: Option<u32>,
    /// Segments applied by the preset, in stored order.
    pub segments: Vec<Segment>,
}

impl Preset {
    /// Returns the main segment, if the preset names a valid one.
    #[must_use]
    pub fn main_segment(&self) -> Option<&Segment> {
        self.main_segment_id
            .and_then(|index| usize::try_from(index).ok())
            .and_then(|index| self.segments.get(index))
    }

    fn from_json(preset_id: u32, blob: &Value, ctx: &MappingContext<'_>) -> Self {
        let master = MasterState {
            on: bool_at(blob, "on").unwrap_or(false),
            brightness: u8_at(blob, "bri").unwrap_or(0),
        };
        let segments: Vec<Segment> = segment_blobs(field(blob, "seg"))
            .map(|(position, seg)| Segment::from_json(position, seg, master, ctx))
            .collect();
        let main_segment_id = u32_at(blob, "mainseg").filter(|index| {
            usize::try_from(*index).is_ok_and(|index| index < segments.len())
        });

        Self {
            preset_id,
            name: name_or_id(blob, preset_id),
            quick_label: str_at(blob, "ql")
                .filter(|ql| !ql.is_empty())
                .map(str::to_string),
            on: master.on,
            transition: u32_at(blob, "transition"),
            main_segment_id,
            segments,
        }
    }
}

/// One step of a playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaylistEntry {
    /// Position in the playlist.
    pub entry_id: u32,
    /// Preset shown in this step, `None` if it no longer exists.
    pub preset: Option<u32>,
    /// Step length in units of 100 ms.
    pub duration: u32,
    /// Transition into this step in units of 100 ms.
    pub transition: u32,
}

/// An ordered sequence of presets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    /// Playlist id, shares the id space with presets.
    pub playlist_id: u32,
    /// Name, the id as a string when unnamed.
    pub name: String,
    /// Steps, in order.
    pub entries: Vec<PlaylistEntry>,
    /// Preset applied when the playlist ends. `None` keeps the last step.
    pub end: Option<u32>,
    /// Number of runs, 0 for endless.
    pub repeat: u32,
    /// Steps play in random order.
    pub shuffle: bool,
}

impl Playlist {
    fn from_json(playlist_id: u32, blob: &Value, presets: &BTreeMap<u32, Preset>) -> Self {
        let playlist = field(blob, "playlist").unwrap_or(&Value::Null);
        let refs = field(playlist, "ps")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let durations = broadcast(field(playlist, "dur"), refs.len());
        let transitions = broadcast(field(playlist, "transition"), refs.len());
        let existing = |raw: &Value| {
            raw.as_u64()
                .and_then(|id| u32::try_from(id).ok())
                .filter(|id| presets.contains_key(id))
        };

        let entries = refs
            .iter()
            .zip(durations.into_iter().zip(transitions))
            .enumerate()
            .filter_map(|(index, (raw, (duration, transition)))| {
                Some(PlaylistEntry {
                    entry_id: u32::try_from(index).ok()?,
                    preset: existing(raw),
                    duration,
                    transition,
                })
            })
            .collect();

        Self {
            playlist_id,
            name: name_or_id(blob, playlist_id),
            entries,
            end: field(playlist, "end").and_then(existing),
            repeat: u32_at(playlist, "repeat").unwrap_or(0),
            shuffle: bool_at(playlist, "r").unwrap_or(false),
        }
    }
}

/// Splits the raw preset storage into presets and playlists.
///
/// Id `0` is reserved by the device and dropped. Keys that are not numeric
/// are ignored.
pub(crate) fn resolve_presets(
    raw: &Value,
    ctx: &MappingContext<'_>,
) -> (BTreeMap<u32, Preset>, BTreeMap<u32, Playlist>) {
    let Some(storage) = raw.as_object() else {
        return (BTreeMap::new(), BTreeMap::new());
    };

    let mut presets = BTreeMap::new();
    let mut playlist_blobs = Vec::new();
    for (key, blob) in storage {
        let Some(id) = id_key(key).filter(|id| *id != 0) else {
            continue;
        };
        if is_playlist(blob) {
            playlist_blobs.push((id, blob));
        } else {
            presets.insert(id, Preset::from_json(id, blob, ctx));
        }
    }

    let playlists = playlist_blobs
        .into_iter()
        .map(|(id, blob)| (id, Playlist::from_json(id, blob, &presets)))
        .collect();

    (presets, playlists)
}

fn is_playlist(blob: &Value) -> bool {
    field(blob, "playlist")
        .and_then(|playlist| field(playlist, "ps"))
        .and_then(Value::as_array)
        .is_some_and(|refs| !refs.is_empty())
}

fn name_or_id(blob: &Value, id: u32) -> String {
    str_at(blob, "n")
        .filter(|name| !name.is_empty())
        .map_or_else(|| id.to_string(), str::to_string)
}

/// Expands a scalar or list into exactly `len` values. Missing or malformed
/// values are 0.
fn broadcast(value: Option<&Value>, len: usize) -> Vec<u32> {
    let number = |v: &Value| v.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or(0);
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(number)
            .chain(std::iter::repeat(0))
            .take(len)
            .collect(),
        Some(scalar) => vec![number(scalar); len],
        None => vec![0; len],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::compat::Compat;
    use crate::model::effect::{Effect, Palette, index_effects};
    use serde_json::json;

    fn resolve(raw: &Value) -> (BTreeMap<u32, Preset>, BTreeMap<u32, Playlist>) {
        let effects: BTreeMap<u32, Effect> = index_effects(&json!(["Solid", "Blink"]));
        let palettes: BTreeMap<u32, Palette> = BTreeMap::new();
        let ctx = MappingContext {
            effects: &effects,
            palettes: &palettes,
            compat: Compat::default(),
        };
        resolve_presets(raw, &ctx)
    }

    #[test]
    fn splits_presets_and_playlists() {
        let (presets, playlists) = resolve(&json!({
            "0": {},
            "1": {"n": "Reading"},
            "2": {"playlist": {"ps": [1], "dur": [100]}}
        }));
        assert_eq!(presets.keys().copied().collect::<Vec<_>>(), vec![1]);
        assert_eq!(presets[&1].name, "Reading");
        assert_eq!(playlists.keys().copied().collect::<Vec<_>>(), vec![2]);
        assert_eq!(
            playlists[&2].entries,
            vec![PlaylistEntry {
                entry_id: 0,
                preset: Some(1),
                duration: 100,
                transition: 0,
            }]
        );
    }

    #[test]
    fn empty_playlist_is_a_preset() {
        let (presets, playlists) = resolve(&json!({
            "3": {"playlist": {"ps": []}},
            "4": {"playlist": {}},
            "5": {"playlist": {"ps": [3]}}
        }));
        assert!(presets.contains_key(&3));
        assert!(presets.contains_key(&4));
        assert_eq!(playlists.len(), 1);
    }

    #[test]
    fn names_default_to_id() {
        let (presets, playlists) = resolve(&json!({
            "7": {"n": ""},
            "8": {},
            "9": {"playlist": {"ps": [7]}}
        }));
        assert_eq!(presets[&7].name, "7");
        assert_eq!(presets[&8].name, "8");
        assert_eq!(playlists[&9].name, "9");
    }

    #[test]
    fn scalar_duration_and_transition_broadcast() {
        let (_, playlists) = resolve(&json!({
            "1": {},
            "2": {},
            "10": {"playlist": {"ps": [1, 2, 1], "dur": 50, "transition": [7]}}
        }));
        let entries = &playlists[&10].entries;
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.duration == 50));
        assert_eq!(
            entries.iter().map(|e| e.transition).collect::<Vec<_>>(),
            vec![7, 0, 0]
        );
        assert_eq!(entries[2].entry_id, 2);
    }

    #[test]
    fn dangling_references_are_absent() {
        let (_, playlists) = resolve(&json!({
            "1": {},
            "5": {"playlist": {"ps": [1, 42, 5, 6], "end": 99}},
            "6": {"playlist": {"ps": [1], "end": 1, "r": true, "repeat": 3}}
        }));
        let refs: Vec<_> = playlists[&5].entries.iter().map(|e| e.preset).collect();
        assert_eq!(refs, vec![Some(1), None, None, None]);
        assert_eq!(playlists[&5].end, None);
        assert_eq!(playlists[&6].end, Some(1));
        assert!(playlists[&6].shuffle);
        assert_eq!(playlists[&6].repeat, 3);
    }

    #[test]
    fn legacy_single_segment_object() {
        let (presets, _) = resolve(&json!({
            "1": {"on": true, "bri": 90, "seg": {"fx": 1, "stop": 10}, "mainseg": 0}
        }));
        let preset = &presets[&1];
        assert_eq!(preset.segments.len(), 1);
        assert_eq!(preset.segments[0].effect.name, "Blink");
        assert_eq!(preset.segments[0].brightness, 90);
        assert!(preset.on);
        assert_eq!(preset.main_segment().map(|s| s.segment_id), Some(0));
    }

    #[test]
    fn main_segment_out_of_range() {
        let (presets, _) = resolve(&json!({
            "1": {"seg": [{"stop": 1}], "mainseg": 3, "ql": "R", "transition": 12}
        }));
        let preset = &presets[&1];
        assert_eq!(preset.main_segment_id, None);
        assert!(preset.main_segment().is_none());
        assert_eq!(preset.quick_label.as_deref(), Some("R"));
        assert_eq!(preset.transition, Some(12));
    }

    #[test]
    fn malformed_storage() {
        let (presets, playlists) = resolve(&json!({"x": {}, "-1": {}, "2": 5}));
        assert_eq!(presets.keys().copied().collect::<Vec<_>>(), vec![2]);
        assert!(playlists.is_empty());
        assert_eq!(resolve(&json!([1, 2])).0.len(), 0);
    }
}
