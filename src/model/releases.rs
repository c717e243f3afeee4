// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Firmware release feed.

use serde::Deserialize;

use crate::types::Version;

/// One entry of the GitHub releases feed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    /// Git tag, usually `v0.14.0` or `v0.15.0-b3`.
    pub tag_name: String,
    /// Marked as pre-release on GitHub.
    #[serde(default)]
    pub prerelease: bool,
}

impl Release {
    /// Returns `true` for pre-releases and tags naming a beta.
    #[must_use]
    pub fn is_beta(&self) -> bool {
        self.prerelease || self.tag_name.to_ascii_lowercase().contains('b')
    }

    /// Returns the tag without its `v`/`V` prefix.
    #[must_use]
    pub fn version_string(&self) -> &str {
        self.tag_name.trim_start_matches(['v', 'V'])
    }
}

/// Latest stable and beta firmware.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Releases {
    /// Newest stable release.
    pub stable: Option<Version>,
    /// Newest beta or pre-release.
    pub beta: Option<Version>,
}

impl Releases {
    /// Picks the first stable and the first beta from a feed ordered newest
    /// first.
    ///
    /// # Examples
    ///
    /// ```
    /// use wled_lib::model::{Release, Releases};
    ///
    /// let feed = vec![
    ///     Release { tag_name: "v0.15.0-b2".into(), prerelease: true },
    ///     Release { tag_name: "v0.14.4".into(), prerelease: false },
    /// ];
    /// let releases = Releases::from_feed(&feed);
    /// assert_eq!(releases.stable.unwrap().as_str(), "0.14.4");
    /// assert_eq!(releases.beta.unwrap().as_str(), "0.15.0-b2");
    /// ```
    #[must_use]
    pub fn from_feed(feed: &[Release]) -> Self {
        let mut releases = Self::default();
        for release in feed {
            let slot = if release.is_beta() {
                &mut releases.beta
            } else {
                &mut releases.stable
            };
            if slot.is_none() {
                *slot = Some(Version::parse(release.version_string()));
            }
            if releases.stable.is_some() && releases.beta.is_some() {
                break;
            }
        }
        releases
    }
}
