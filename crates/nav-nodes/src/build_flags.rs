//! Node build modes

use std::fmt;
use std::str::FromStr;

use nav_common::{Error, Result};

bitflags::bitflags! {
    /// Which candidate generators run for every area
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(
        feature = "serialization",
        derive(serde::Serialize, serde::Deserialize)
    )]
    pub struct BuildFlags: u8 {
        /// `a`: flank points around every portal
        const CONNECTIONS = 0x01;
        /// `b`: both ends of every encounter path
        const ENCOUNTERS = 0x02;
        /// `c`: sample grid inside every area
        const INTERIOR = 0x04;
    }
}

impl Default for BuildFlags {
    fn default() -> Self {
        BuildFlags::INTERIOR
    }
}

/// A single candidate generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Connections,
    Encounters,
    Interior,
}

impl BuildMode {
    /// Flag character selecting this mode
    pub fn flag_char(self) -> char {
        match self {
            BuildMode::Connections => 'a',
            BuildMode::Encounters => 'b',
            BuildMode::Interior => 'c',
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            BuildMode::Connections => "Connections per area",
            BuildMode::Encounters => "Encounter spots per area",
            BuildMode::Interior => "Inside of area, if area too small, 1 at the center",
        }
    }

    fn flag(self) -> BuildFlags {
        match self {
            BuildMode::Connections => BuildFlags::CONNECTIONS,
            BuildMode::Encounters => BuildFlags::ENCOUNTERS,
            BuildMode::Interior => BuildFlags::INTERIOR,
        }
    }
}

impl BuildFlags {
    /// Parses a selector such as `"ca"`.
    ///
    /// Case-insensitive; duplicates and order don't matter. Any character
    /// other than `a`, `b` or `c` is an error.
    pub fn parse(selector: &str) -> Result<Self> {
        selector
            .chars()
            .try_fold(BuildFlags::empty(), |flags, c| match c.to_ascii_lowercase() {
                'a' => Ok(flags | BuildFlags::CONNECTIONS),
                'b' => Ok(flags | BuildFlags::ENCOUNTERS),
                'c' => Ok(flags | BuildFlags::INTERIOR),
                _ => Err(Error::InvalidBuildFlag(c)),
            })
    }

    /// Selected modes in the order they run for each area
    pub fn modes(self) -> impl Iterator<Item = BuildMode> {
        [
            BuildMode::Connections,
            BuildMode::Encounters,
            BuildMode::Interior,
        ]
        .into_iter()
        .filter(move |mode| self.contains(mode.flag()))
    }
}

impl FromStr for BuildFlags {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        BuildFlags::parse(s)
    }
}

impl fmt::Display for BuildFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for mode in self.modes() {
            write!(f, "{}", mode.flag_char())?;
        }
        Ok(())
    }
}
