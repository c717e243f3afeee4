// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Static device description (`/json/info`).

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::model::json::lenient;
use crate::types::{LightCapability, Version};

/// BSSID reported by devices that are not associated with an access point.
pub const UNASSOCIATED_BSSID: &str = "00:00:00:00:00:00";

/// Device information.
///
/// Built with [`Info::from_json`], which never fails: missing, `null` or
/// mistyped fields take their defaults one by one, `ws: -1` becomes `None`,
/// and an unparseable `ver` becomes `None`.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use wled_lib::model::Info;
///
/// let info = Info::from_json(&json!({
///     "ver": "0.14.0",
///     "arch": "esp8266",
///     "ws": -1,
///     "fs": {"u": 12, "t": 256}
/// }));
/// assert_eq!(info.architecture, "esp01");
/// assert_eq!(info.websocket, None);
/// assert_eq!(info.version.unwrap().as_str(), "0.14.0");
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Info {
    /// Platform name (`esp32`, `esp8266`, refined to `esp01`/`esp02`).
    #[serde(rename = "arch")]
    pub architecture: String,

    /// Vendor brand.
    pub brand: String,

    /// Firmware build id.
    #[serde(rename = "vid", deserialize_with = "build_id")]
    pub build: String,

    /// SDK core version.
    #[serde(rename = "core")]
    pub arduino_core_version: String,

    /// Number of effects.
    #[serde(rename = "fxcount")]
    pub effect_count: u32,

    /// Filesystem usage.
    #[serde(rename = "fs", deserialize_with = "lenient_optional")]
    pub filesystem: Option<Filesystem>,

    /// Free heap in bytes.
    #[serde(rename = "freeheap")]
    pub free_heap: u64,

    /// Network address.
    pub ip: String,

    /// LED configuration.
    #[serde(deserialize_with = "lenient_record")]
    pub leds: Leds,

    /// Source address of the live data stream.
    #[serde(rename = "lip")]
    pub live_ip: String,

    /// Protocol of the live data stream.
    #[serde(rename = "lm")]
    pub live_mode: String,

    /// Whether live data is currently being received.
    pub live: bool,

    /// MAC address, lowercase hex without separators.
    #[serde(rename = "mac")]
    pub mac_address: String,

    /// Friendly device name.
    pub name: String,

    /// Number of palettes.
    #[serde(rename = "palcount")]
    pub palette_count: u32,

    /// Product name.
    pub product: String,

    /// UDP port used for sync.
    #[serde(rename = "udpport")]
    pub udp_port: u16,

    /// Time since boot.
    #[serde(deserialize_with = "uptime")]
    pub uptime: Duration,

    /// Installed firmware, `None` if the device reported something unparseable.
    #[serde(rename = "ver", deserialize_with = "firmware_version")]
    pub version: Option<Version>,

    /// Connected WebSocket clients, `None` when WebSockets are unsupported.
    #[serde(rename = "ws", deserialize_with = "websocket_clients")]
    pub websocket: Option<u32>,

    /// Wi-Fi details.
    #[serde(deserialize_with = "lenient_optional")]
    pub wifi: Option<Wifi>,

    /// Release name of the installed firmware build.
    pub release: Option<String>,

    /// Latest stable firmware, filled from the release feed.
    #[serde(skip)]
    pub version_latest_stable: Option<Version>,

    /// Latest beta firmware, filled from the release feed.
    #[serde(skip)]
    pub version_latest_beta: Option<Version>,
}

impl Default for Info {
    fn default() -> Self {
        Self {
            architecture: "Unknown".to_string(),
            brand: "WLED".to_string(),
            build: "Unknown".to_string(),
            arduino_core_version: "Unknown".to_string(),
            effect_count: 0,
            filesystem: None,
            free_heap: 0,
            ip: String::new(),
            leds: Leds::default(),
            live_ip: "Unknown".to_string(),
            live_mode: "Unknown".to_string(),
            live: false,
            mac_address: String::new(),
            name: "WLED Light".to_string(),
            palette_count: 0,
            product: "DIY Light".to_string(),
            udp_port: 0,
            uptime: Duration::ZERO,
            version: None,
            websocket: None,
            wifi: None,
            release: None,
            version_latest_stable: None,
            version_latest_beta: None,
        }
    }
}

impl Info {
    /// Maps an `info` section.
    ///
    /// A field that is `null` or has the wrong type keeps its default; the
    /// other fields are unaffected. A section that is not an object yields
    /// [`Info::default`].
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let mut info: Self = lenient(value);

        if info.architecture == "esp8266"
            && let Some(fs) = &info.filesystem
        {
            if fs.total <= 256 {
                info.architecture = "esp01".to_string();
            } else if fs.total <= 512 {
                info.architecture = "esp02".to_string();
            }
        }

        info
    }

    /// Returns `true` if the device accepts WebSocket connections.
    #[must_use]
    pub fn supports_websocket(&self) -> bool {
        self.websocket.is_some()
    }
}

fn lenient_record<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient(&Value::deserialize(deserializer)?))
}

fn lenient_optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.is_object().then(|| lenient(&value)))
}

fn build_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => "Unknown".to_string(),
    })
}

fn uptime<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_u64().map_or(Duration::ZERO, Duration::from_secs))
}

fn firmware_version<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Version>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .map(Version::parse)
        .filter(Version::is_valid))
}

fn websocket_clients<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_u64().and_then(|n| u32::try_from(n).ok()))
}

fn unix_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_i64()
        .filter(|secs| *secs > 0)
        .and_then(|secs| DateTime::from_timestamp(secs, 0)))
}

/// LED configuration (`info.leds`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Leds {
    /// Total number of LEDs.
    pub count: u32,
    /// Current frames per second.
    pub fps: u32,
    /// Capabilities of the whole light.
    #[serde(rename = "lc")]
    pub light_capabilities: LightCapability,
    /// Current limiter budget in milliamps, 0 when disabled.
    #[serde(rename = "maxpwr")]
    pub max_power: u32,
    /// Maximum number of segments.
    #[serde(rename = "maxseg")]
    pub max_segments: u32,
    /// Estimated current draw in milliamps.
    #[serde(rename = "pwr")]
    pub power: u32,
    /// Capabilities per segment.
    #[serde(rename = "seglc")]
    pub segment_light_capabilities: Vec<LightCapability>,
}

/// Wi-Fi connection details (`info.wifi`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Wifi {
    /// Access point BSSID.
    pub bssid: String,
    /// Radio channel.
    pub channel: u32,
    /// Received signal strength in dBm.
    pub rssi: i32,
    /// Signal quality in percent.
    pub signal: u8,
}

impl Default for Wifi {
    fn default() -> Self {
        Self {
            bssid: UNASSOCIATED_BSSID.to_string(),
            channel: 0,
            rssi: 0,
            signal: 0,
        }
    }
}

impl Wifi {
    /// Returns `true` if not associated with an access point, typically a
    /// wired (Ethernet) board.
    #[must_use]
    pub fn is_unassociated(&self) -> bool {
        self.bssid.is_empty() || self.bssid == UNASSOCIATED_BSSID
    }
}

/// Filesystem usage in kilobytes (`info.fs`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Filesystem {
    /// Time the presets file was last written.
    #[serde(rename = "pmt", deserialize_with = "unix_timestamp")]
    pub last_modified: Option<DateTime<Utc>>,
    /// Total capacity.
    #[serde(rename = "t")]
    pub total: u64,
    /// Space in use.
    #[serde(rename = "u")]
    pub used: u64,
}

impl Default for Filesystem {
    fn default() -> Self {
        Self {
            last_modified: None,
            total: 1,
            used: 1,
        }
    }
}

impl Filesystem {
    /// Free space.
    #[must_use]
    pub fn free(&self) -> u64 {
        self.total.saturating_sub(self.used)
    }

    /// Free space in percent, rounded.
    #[must_use]
    pub fn free_percentage(&self) -> u64 {
        percentage(self.free(), self.total)
    }

    /// Used space in percent, rounded.
    #[must_use]
    pub fn used_percentage(&self) -> u64 {
        percentage(self.used, self.total)
    }
}

fn percentage(part: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (part.saturating_mul(100) + total / 2) / total
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn websocket_sentinel_is_absent() {
        assert_eq!(Info::from_json(&json!({"ws": -1})).websocket, None);
        assert_eq!(Info::from_json(&json!({"ws": 2})).websocket, Some(2));
        assert!(!Info::from_json(&json!({})).supports_websocket());
    }

    #[test]
    fn refines_esp8266_by_flash_size() {
        let arch = |total: u64| {
            Info::from_json(&json!({"arch": "esp8266", "fs": {"t": total, "u": 1}})).architecture
        };
        assert_eq!(arch(256), "esp01");
        assert_eq!(arch(512), "esp02");
        assert_eq!(arch(1024), "esp8266");

        let info = Info::from_json(&json!({"arch": "esp32", "fs": {"t": 100}}));
        assert_eq!(info.architecture, "esp32");
    }

    #[test]
    fn invalid_version_is_none() {
        assert!(Info::from_json(&json!({"ver": "nightly"})).version.is_none());
        assert!(Info::from_json(&json!({"ver": 14})).version.is_none());
    }

    #[test]
    fn defaults_for_empty_section() {
        let info = Info::from_json(&json!({}));
        assert_eq!(info.brand, "WLED");
        assert_eq!(info.name, "WLED Light");
        assert_eq!(info.product, "DIY Light");
        assert_eq!(info.architecture, "Unknown");
        assert!(info.filesystem.is_none());

        assert_eq!(Info::from_json(&json!([1, 2])), Info::default());
    }

    #[test]
    fn numeric_build_id_and_uptime() {
        let info = Info::from_json(&json!({"vid": 2_310_130, "uptime": 3600}));
        assert_eq!(info.build, "2310130");
        assert_eq!(info.uptime, Duration::from_secs(3600));
    }

    #[test]
    fn broken_substructures_fall_back() {
        let info = Info::from_json(&json!({
            "name": "Desk",
            "leds": "nope",
            "wifi": 5,
            "fs": {"t": "big", "u": 3}
        }));
        assert_eq!(info.name, "Desk");
        assert_eq!(info.leds, Leds::default());
        assert!(info.wifi.is_none());
        let fs = info.filesystem.unwrap();
        assert_eq!(fs.total, 1);
        assert_eq!(fs.used, 3);
    }

    #[test]
    fn one_bad_field_keeps_the_rest() {
        let info = Info::from_json(&json!({
            "ver": "0.14.2",
            "ws": 1,
            "arch": "esp32",
            "mac": "aabbccddeeff",
            "lip": null,
            "freeheap": -5,
            "name": null,
            "leds": {"count": 60, "fps": null, "maxseg": "many"},
        }));
        assert_eq!(info.version.as_ref().unwrap().as_str(), "0.14.2");
        assert_eq!(info.websocket, Some(1));
        assert!(info.supports_websocket());
        assert_eq!(info.architecture, "esp32");
        assert_eq!(info.mac_address, "aabbccddeeff");
        assert_eq!(info.live_ip, "Unknown");
        assert_eq!(info.free_heap, 0);
        assert_eq!(info.name, "WLED Light");
        assert_eq!(info.leds.count, 60);
        assert_eq!(info.leds.max_segments, 0);
    }

    #[test]
    fn leds_and_wifi() {
        let info = Info::from_json(&json!({
            "leds": {"count": 30, "lc": 3, "seglc": [1, 3], "maxseg": 16},
            "wifi": {"bssid": "", "rssi": -60, "signal": 80, "channel": 6}
        }));
        assert_eq!(info.leds.count, 30);
        assert!(info.leds.light_capabilities.contains(LightCapability::WHITE_CHANNEL));
        assert_eq!(info.leds.segment_light_capabilities.len(), 2);
        let wifi = info.wifi.unwrap();
        assert_eq!(wifi.rssi, -60);
        assert!(wifi.is_unassociated());
    }

    #[test]
    fn filesystem_usage() {
        let fs: Filesystem =
            serde_json::from_value(json!({"t": 1000, "u": 250, "pmt": 1_700_000_000})).unwrap();
        assert_eq!(fs.free(), 750);
        assert_eq!(fs.free_percentage(), 75);
        assert_eq!(fs.used_percentage(), 25);
        assert_eq!(fs.last_modified.unwrap().timestamp(), 1_700_000_000);

        let empty = Filesystem {
            total: 0,
            ..Filesystem::default()
        };
        assert_eq!(empty.used_percentage(), 0);
    }
}
