// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

/// A parsed discipline key.
///
/// Keys containing a dot (`"구조.A"`) address a region of the discipline named
/// by the part before the first dot. Region keys are subordinate to their
/// prefix and are never offered as top-level disciplines.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DisciplineKey {
    /// A top-level discipline key.
    Direct(String),
    /// A region of the discipline `prefix`.
    Regioned {
        /// The owning discipline key.
        prefix: String,
        /// Everything after the first dot.
        region: String,
    },
}

impl DisciplineKey {
    /// Parses a raw key.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('.') {
            Some((prefix, region)) => Self::Regioned {
                prefix: prefix.to_owned(),
                region: region.to_owned(),
            },
            None => Self::Direct(raw.to_owned()),
        }
    }

    /// Returns `true` for region keys.
    #[must_use]
    pub fn is_region(&self) -> bool {
        matches!(self, Self::Regioned { .. })
    }

    /// The top-level discipline this key belongs to.
    #[must_use]
    pub fn prefix(&self) -> &str {
        match self {
            Self::Direct(key) => key,
            Self::Regioned { prefix, .. } => prefix,
        }
    }

    /// The region part, if any.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        match self {
            Self::Direct(_) => None,
            Self::Regioned { region, .. } => Some(region),
        }
    }
}

impl fmt::Display for DisciplineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(key) => f.write_str(key),
            Self::Regioned { prefix, region } => write!(f, "{prefix}.{region}"),
        }
    }
}

/// Returns `true` if `raw` is a region key.
#[must_use]
pub fn is_region_key(raw: &str) -> bool {
    raw.contains('.')
}

#[cfg(test)]
mod tests {
    use super::DisciplineKey;

    #[test]
    fn direct_keys() {
        let key = DisciplineKey::parse("건축");
        assert_eq!(key, DisciplineKey::Direct("건축".into()), "no dot");
        assert!(!key.is_region(), "not a region");
        assert_eq!(key.prefix(), "건축", "prefix is the key itself");
    }

    #[test]
    fn region_splits_on_first_dot() {
        let key = DisciplineKey::parse("구조.A.1");
        assert_eq!(key.prefix(), "구조", "prefix before the first dot");
        assert_eq!(key.region(), Some("A.1"), "rest is the region");
        assert_eq!(key.to_string(), "구조.A.1", "display restores the raw key");
    }
}
