//! Stable ordering of proxy groups.

use crate::model::ProxyGroup;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroupSort {
    SizeAsc,
    SizeDesc,
    #[default]
    NameAsc,
    NameDesc,
}

impl GroupSort {
    pub const KEYS: &'static [&'static str] = &["sizeasc", "sizedesc", "nameasc", "namedesc"];

    /// Unknown keys fall back to [`GroupSort::NameAsc`].
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl FromStr for GroupSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sizeasc" => Ok(Self::SizeAsc),
            "sizedesc" => Ok(Self::SizeDesc),
            "nameasc" | "" => Ok(Self::NameAsc),
            "namedesc" => Ok(Self::NameDesc),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

impl fmt::Display for GroupSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SizeAsc => "sizeasc",
            Self::SizeDesc => "sizedesc",
            Self::NameAsc => "nameasc",
            Self::NameDesc => "namedesc",
        })
    }
}

pub fn sort_groups(groups: &mut [ProxyGroup], by: GroupSort) {
    match by {
        GroupSort::SizeAsc => groups.sort_by_key(ProxyGroup::size),
        GroupSort::SizeDesc => groups.sort_by(|a, b| b.size().cmp(&a.size())),
        GroupSort::NameAsc => groups.sort_by(|a, b| a.name.cmp(&b.name)),
        GroupSort::NameDesc => groups.sort_by(|a, b| b.name.cmp(&a.name)),
    }
}
