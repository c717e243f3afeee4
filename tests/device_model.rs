// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device model tests driven by whole payloads, as a device would send them.

use serde_json::{Value, json};
use wled_lib::model::{ActiveId, Effect, UNKNOWN_NAME};
use wled_lib::types::{Color, NightlightMode, Version};
use wled_lib::{Device, DeviceError};

fn payload() -> Value {
    json!({
        "effects": ["Solid", "Blink", "Breathe"],
        "palettes": ["Default", "Party", "Ocean"],
        "info": {
            "ver": "0.14.4",
            "vid": 2_405_180,
            "arch": "esp32",
            "leds": {"count": 60, "fps": 42, "maxseg": 32},
            "name": "Desk",
            "ws": 1,
            "fs": {"u": 12, "t": 983, "pmt": 1_700_000_000},
            "wifi": {"bssid": "AA:BB:CC:DD:EE:FF", "rssi": -61, "signal": 78, "channel": 6},
        },
        "state": {
            "on": true,
            "bri": 127,
            "transition": 7,
            "ps": 1,
            "pl": -1,
            "nl": {"on": false, "dur": 60, "mode": 1, "tbri": 0},
            "udpn": {"send": false, "recv": true, "sgrp": 1, "rgrp": 3},
            "lor": 0,
            "seg": [
                {"start": 0, "stop": 30, "fx": 1, "pal": 2, "col": [[255, 0, 0], "00FF00"]},
                {"id": 4, "start": 30, "stop": 60, "on": false, "bri": 30, "fx": 9},
            ],
        },
        "presets": {
            "0": {},
            "1": {"n": "Reading", "on": true, "bri": 200, "seg": {"fx": 0}},
            "2": {"n": "", "playlist": {"ps": [1], "dur": [100]}},
        },
    })
}

// ============================================================================
// Construction
// ============================================================================

mod construction {
    use super::*;

    #[test]
    fn full_payload() {
        let device = Device::new(&payload()).unwrap();

        assert_eq!(device.info().name, "Desk");
        assert_eq!(
            device.info().version.as_ref().map(Version::as_str),
            Some("0.14.4")
        );
        assert_eq!(device.state().brightness, 127);
        assert_eq!(device.state().segments.len(), 2);
        assert_eq!(device.state().nightlight.mode, NightlightMode::Fade);
        assert_eq!(device.effects().count(), 3);
    }

    #[test]
    fn missing_state_is_incomplete() {
        let mut data = payload();
        data.as_object_mut().unwrap().remove("state");
        assert!(matches!(
            Device::new(&data),
            Err(DeviceError::IncompleteData { missing: "state" })
        ));

        data["state"] = Value::Null;
        assert!(matches!(
            Device::new(&data),
            Err(DeviceError::IncompleteData { missing: "state" })
        ));
    }

    #[test]
    fn empty_sections_are_enough() {
        let device = Device::new(&json!({
            "effects": [],
            "palettes": [],
            "info": {},
            "state": {},
        }))
        .unwrap();

        assert!(device.effects_by_id().is_empty());
        assert!(device.state().segments.is_empty());
        assert!(device.info().version.is_none());
    }

    #[test]
    fn malformed_info_field_keeps_version_and_websocket() {
        let mut data = payload();
        data["info"]["name"] = Value::Null;
        data["info"]["freeheap"] = json!(-5);
        data["info"]["lip"] = Value::Null;
        let device = Device::new(&data).unwrap();

        assert_eq!(
            device.info().version.as_ref().map(Version::as_str),
            Some("0.14.4")
        );
        assert!(device.info().supports_websocket());
        assert_eq!(device.info().architecture, "esp32");
        assert_eq!(device.info().name, "WLED Light");
        assert_eq!(device.state().nightlight.mode, NightlightMode::Fade);
    }

    #[test]
    fn old_firmware_is_refused_first() {
        let data = json!({"info": {"ver": "0.13.3"}});
        match Device::new(&data) {
            Err(DeviceError::UnsupportedVersion { version, minimum }) => {
                assert_eq!(version, "0.13.3");
                assert_eq!(minimum, "0.14.0");
            }
            other => panic!("expected unsupported version, got {other:?}"),
        }
    }
}

// ============================================================================
// Resolution
// ============================================================================

mod resolution {
    use super::*;

    #[test]
    fn effect_ids_resolve_or_fall_back() {
        let device = Device::new(&payload()).unwrap();
        let segments = &device.state().segments;

        assert_eq!(
            segments[&0].effect,
            Effect {
                effect_id: 1,
                name: "Blink".to_string()
            }
        );
        assert_eq!(segments[&4].effect, Effect::unknown());
        assert_eq!(segments[&4].effect.name, UNKNOWN_NAME);
        assert_eq!(segments[&0].palette.name, "Ocean");
    }

    #[test]
    fn segments_inherit_master_state() {
        let device = Device::new(&payload()).unwrap();
        let segments = &device.state().segments;

        assert!(segments[&0].on);
        assert_eq!(segments[&0].brightness, 127);
        assert!(!segments[&4].on);
        assert_eq!(segments[&4].brightness, 30);
        assert_eq!(segments[&4].length, 30);
    }

    #[test]
    fn colors_always_come_in_threes() {
        let device = Device::new(&payload()).unwrap();
        let first = device.state().segments[&0].colors;
        let second = device.state().segments[&4].colors;

        assert_eq!(first.primary, Color::rgb(255, 0, 0));
        assert_eq!(first.secondary, Color::rgb(0, 255, 0));
        assert_eq!(first.tertiary, Color::BLACK);
        assert_eq!(second.as_array(), [Color::BLACK; 3]);
    }

    #[test]
    fn presets_and_playlists_are_split() {
        let device = Device::new(&payload()).unwrap();

        let presets = device.presets_by_id();
        assert_eq!(presets.keys().copied().collect::<Vec<_>>(), vec![1]);
        assert_eq!(presets[&1].name, "Reading");
        assert_eq!(presets[&1].segments.len(), 1);
        assert_eq!(presets[&1].segments[0].brightness, 200);

        let playlists = device.playlists_by_id();
        assert_eq!(playlists.keys().copied().collect::<Vec<_>>(), vec![2]);
        let playlist = &playlists[&2];
        assert_eq!(playlist.name, "2");
        assert_eq!(playlist.entries.len(), 1);
        assert_eq!(playlist.entries[0].entry_id, 0);
        assert_eq!(playlist.entries[0].preset, Some(1));
        assert_eq!(playlist.entries[0].duration, 100);
        assert_eq!(playlist.entries[0].transition, 0);
    }

    #[test]
    fn active_preset_and_empty_playlist() {
        let device = Device::new(&payload()).unwrap();

        assert_eq!(device.state().preset, Some(ActiveId::Resolved(1)));
        assert_eq!(device.state().playlist, None);
        assert_eq!(device.active_preset().unwrap().name, "Reading");
        assert!(device.active_playlist().is_none());
    }

    #[test]
    fn active_ids_without_storage_are_kept() {
        let mut data = payload();
        data.as_object_mut().unwrap().remove("presets");
        let device = Device::new(&data).unwrap();

        assert_eq!(device.state().preset, Some(ActiveId::Unresolved(1)));
        assert_eq!(device.state().playlist, Some(ActiveId::Unresolved(-1)));
        assert_eq!(device.state().playlist.map(|id| id.id()), Some(-1));
    }

    #[test]
    fn lookups_by_name_ignore_case() {
        let device = Device::new(&payload()).unwrap();

        assert_eq!(device.effect_by_name("breathe").unwrap().effect_id, 2);
        assert_eq!(device.palette_by_name("PARTY").unwrap().palette_id, 1);
        assert_eq!(device.preset_by_name("reading").unwrap().preset_id, 1);
        assert_eq!(device.playlist_by_name("2").unwrap().playlist_id, 2);
        assert!(device.effect_by_name("Strobe").is_none());
    }

    #[test]
    fn listings_are_sorted_by_name() {
        let device = Device::new(&payload()).unwrap();
        let names: Vec<_> = device.palettes().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Default", "Ocean", "Party"]);
    }
}

// ============================================================================
// Merge
// ============================================================================

mod merge {
    use super::*;

    #[test]
    fn state_only_payload_leaves_other_sections() {
        let mut device = Device::new(&payload()).unwrap();
        let info = device.info().clone();
        let effects = device.effects_by_id().clone();
        let palettes = device.palettes_by_id().clone();
        let presets = device.presets_by_id().clone();
        let playlists = device.playlists_by_id().clone();

        device.update(&json!({"state": {"on": false, "bri": 5, "seg": []}}));

        assert_eq!(device.info(), &info);
        assert_eq!(device.effects_by_id(), &effects);
        assert_eq!(device.palettes_by_id(), &palettes);
        assert_eq!(device.presets_by_id(), &presets);
        assert_eq!(device.playlists_by_id(), &playlists);
        assert!(!device.state().on);
        assert_eq!(device.state().brightness, 5);
        assert!(device.state().segments.is_empty());
    }

    #[test]
    fn state_resolves_against_new_effects() {
        let mut device = Device::new(&payload()).unwrap();

        device.update(&json!({
            "effects": ["Solid", "Blink", "Breathe", "Wipe", "Scan", "Dual", "Fade", "Theater", "Chase", "Rainbow"],
            "state": {"seg": [{"start": 0, "stop": 10, "fx": 9}]},
        }));

        assert_eq!(device.state().segments[&0].effect.name, "Rainbow");
    }

    #[test]
    fn new_presets_replace_both_collections() {
        let mut device = Device::new(&payload()).unwrap();

        device.update(&json!({"presets": {"3": {"n": "Movie"}}}));

        assert_eq!(device.presets_by_id().len(), 1);
        assert_eq!(device.preset(3).unwrap().name, "Movie");
        assert!(device.playlists_by_id().is_empty());
    }

    #[test]
    fn info_merge_keeps_latest_versions() {
        let mut device = Device::new(&payload()).unwrap();
        let feed = vec![wled_lib::model::Release {
            tag_name: "v0.15.0".to_string(),
            prerelease: false,
        }];
        device.set_latest_versions(&wled_lib::model::Releases::from_feed(&feed));

        device.update(&json!({"info": {"ver": "0.14.4", "name": "Renamed"}}));

        assert_eq!(device.info().name, "Renamed");
        assert_eq!(
            device.info().version_latest_stable.as_ref().map(Version::as_str),
            Some("0.15.0")
        );
    }
}
