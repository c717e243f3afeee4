// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire format of `POST /json/state` bodies.
//!
//! Field names are the device's short keys; unset fields are omitted so the
//! device leaves them unchanged.

use serde::Serialize;

use crate::types::{Color, LiveDataOverride, NightlightMode, SyncGroup};

/// Body of a state change request.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StateRequest {
    /// Master power.
    pub on: Option<bool>,
    /// Master brightness.
    pub bri: Option<u8>,
    /// One-off transition for this request, 100 ms units.
    pub tt: Option<u32>,
    /// Default transition, 100 ms units.
    pub transition: Option<u32>,
    /// Preset or playlist to load.
    pub ps: Option<u32>,
    /// Live data override.
    pub lor: Option<LiveDataOverride>,
    /// Nightlight changes.
    pub nl: Option<NightlightRequest>,
    /// UDP sync changes.
    pub udpn: Option<SyncRequest>,
    /// Segment changes.
    pub seg: Option<Vec<SegmentRequest>>,
}

/// Nightlight part of a [`StateRequest`].
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NightlightRequest {
    /// Start or stop the timer.
    pub on: Option<bool>,
    /// Minutes.
    pub dur: Option<u8>,
    /// Dimming mode.
    pub mode: Option<NightlightMode>,
    /// Target brightness.
    pub tbri: Option<u8>,
}

/// UDP sync part of a [`StateRequest`].
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncRequest {
    /// Broadcast changes.
    pub send: Option<bool>,
    /// Apply received broadcasts.
    pub recv: Option<bool>,
    /// Groups to broadcast to.
    pub sgrp: Option<SyncGroup>,
    /// Groups to listen to.
    pub rgrp: Option<SyncGroup>,
}

/// One segment of a [`StateRequest`].
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SegmentRequest {
    /// Segment id.
    pub id: u32,
    /// Power.
    pub on: Option<bool>,
    /// Brightness.
    pub bri: Option<u8>,
    /// Colors in slot order.
    pub col: Option<Vec<Color>>,
    /// Effect id.
    pub fx: Option<u32>,
    /// Palette id.
    pub pal: Option<u32>,
    /// Effect intensity.
    pub ix: Option<u8>,
    /// Effect speed.
    pub sx: Option<u8>,
    /// Reverse effect direction.
    pub rev: Option<bool>,
    /// Selection flag.
    pub sel: Option<bool>,
    /// Segment to mirror.
    pub cln: Option<i32>,
    /// First LED.
    pub start: Option<u32>,
    /// LED after the last one.
    pub stop: Option<u32>,
    /// Number of LEDs.
    pub len: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn omits_unset_fields() {
        let request = StateRequest {
            on: Some(true),
            ..StateRequest::default()
        };
        assert_eq!(serde_json::to_value(&request).unwrap(), json!({"on": true}));
    }

    #[test]
    fn nested_fields_use_native_keys() {
        let request = StateRequest {
            lor: Some(LiveDataOverride::On),
            udpn: Some(SyncRequest {
                send: Some(false),
                sgrp: SyncGroup::group(2),
                ..SyncRequest::default()
            }),
            seg: Some(vec![SegmentRequest {
                id: 1,
                col: Some(vec![Color::rgb(255, 0, 0)]),
                ..SegmentRequest::default()
            }]),
            ..StateRequest::default()
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "lor": 1,
                "udpn": {"send": false, "sgrp": 2},
                "seg": [{"id": 1, "col": [[255, 0, 0]]}]
            })
        );
    }
}
