//! OpenStack release and Ubuntu series resolution.

use std::fmt;

use crate::error::CouError;

/// OpenStack releases in upgrade order, with the charm channel track each one uses.
const RELEASES: &[(&str, &str)] = &[
    ("ussuri", "ussuri"),
    ("victoria", "victoria"),
    ("wallaby", "wallaby"),
    ("xena", "xena"),
    ("yoga", "yoga"),
    ("zed", "zed"),
    ("antelope", "2023.1"),
    ("bobcat", "2023.2"),
    ("caracal", "2024.1"),
];

/// Ubuntu series with their distro release and the last release available on them.
const SERIES: &[(&str, &str, &str)] = &[("focal", "ussuri", "yoga"), ("jammy", "yoga", "caracal")];

fn release_index(codename: &str) -> Option<usize> {
    RELEASES.iter().position(|(name, _)| *name == codename)
}

/// An OpenStack release as deployed on a given Ubuntu series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudRelease {
    series: &'static str,
    codename: &'static str,
    track: &'static str,
    distro: &'static str,
}

impl CloudRelease {
    /// Resolve a release codename on a series.
    pub fn new(series: &str, codename: &str) -> Result<Self, CouError> {
        let (series, distro, last) = SERIES
            .iter()
            .find(|(name, _, _)| *name == series)
            .copied()
            .ok_or_else(|| CouError::UnsupportedSeries(series.to_string()))?;

        let index = release_index(codename)
            .ok_or_else(|| CouError::InvalidRelease(format!("unknown release '{}'", codename)))?;

        let first = release_index(distro).unwrap_or_default();
        let last = release_index(last).unwrap_or(RELEASES.len() - 1);
        if index < first || index > last {
            return Err(CouError::InvalidRelease(format!(
                "{} is not available on {}",
                codename, series
            )));
        }

        let (codename, track) = RELEASES[index];
        Ok(Self {
            series,
            codename,
            track,
            distro,
        })
    }

    pub fn series(&self) -> &str {
        self.series
    }

    pub fn codename(&self) -> &str {
        self.codename
    }

    /// True when this is the release shipped by the series archive itself.
    pub fn is_distro(&self) -> bool {
        self.codename == self.distro
    }

    /// Value of the `openstack-origin` charm option for this release.
    pub fn origin(&self) -> String {
        if self.is_distro() {
            "distro".to_string()
        } else {
            format!("cloud:{}-{}", self.series, self.codename)
        }
    }

    /// Stable charm channel for this release.
    pub fn channel(&self) -> String {
        format!("{}/stable", self.track)
    }

    /// The release this one upgrades from, if any on the same series.
    pub fn previous(&self) -> Option<Self> {
        if self.is_distro() {
            return None;
        }
        let index = release_index(self.codename)?;
        let (codename, _) = RELEASES.get(index.checked_sub(1)?)?;
        Self::new(self.series, codename).ok()
    }
}

impl fmt::Display for CloudRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.series, self.codename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_victoria_on_focal() {
        let release = CloudRelease::new("focal", "victoria").unwrap();
        assert_eq!(release.origin(), "cloud:focal-victoria");
        assert_eq!(release.channel(), "victoria/stable");
        assert!(!release.is_distro());
        assert_eq!(release.to_string(), "focal/victoria");
    }

    #[test]
    fn test_distro_release_origin() {
        let release = CloudRelease::new("focal", "ussuri").unwrap();
        assert!(release.is_distro());
        assert_eq!(release.origin(), "distro");
        assert!(release.previous().is_none());
    }

    #[test]
    fn test_previous_release() {
        let release = CloudRelease::new("focal", "victoria").unwrap();
        let previous = release.previous().unwrap();
        assert_eq!(previous.codename(), "ussuri");
        assert_eq!(previous.origin(), "distro");

        let release = CloudRelease::new("jammy", "zed").unwrap();
        assert_eq!(release.previous().unwrap().origin(), "distro");

        let release = CloudRelease::new("jammy", "bobcat").unwrap();
        assert_eq!(release.previous().unwrap().origin(), "cloud:jammy-antelope");
    }

    #[test]
    fn test_numeric_channel_tracks() {
        let release = CloudRelease::new("jammy", "antelope").unwrap();
        assert_eq!(release.channel(), "2023.1/stable");
    }

    #[test]
    fn test_unknown_series() {
        let err = CloudRelease::new("bionic", "victoria").unwrap_err();
        assert!(matches!(err, CouError::UnsupportedSeries(_)));
    }

    #[test]
    fn test_unknown_release() {
        let err = CloudRelease::new("focal", "icehouse").unwrap_err();
        assert!(matches!(err, CouError::InvalidRelease(_)));
    }

    #[test]
    fn test_release_outside_series_range() {
        let err = CloudRelease::new("focal", "zed").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid OpenStack release: zed is not available on focal"
        );
        assert!(CloudRelease::new("jammy", "victoria").is_err());
    }
}
