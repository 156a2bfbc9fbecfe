//! Configuration for info_node generation

use glam::Vec3;

use super::build_flags::BuildFlags;
use nav_common::{Error, Result};
use nav_mesh::{HUMAN_HEIGHT_HALF, STEP_HEIGHT};

/// Spacing of interior samples
pub const AREA_INSIDE_SIZE: f32 = 200.0;

/// Height added to every generated origin
pub const ENTITY_OFFSET_Z_ADD: f32 = 4.0;

/// Distance of connection flank points from the portal
pub const CONNECTION_FLANK_DISTANCE: f32 = 5.0;

/// Node hull relative to its origin
pub const ENTITY_HULL_DEFAULT_MIN: Vec3 = Vec3::new(-16.0, -16.0, 0.0);
pub const ENTITY_HULL_DEFAULT_MAX: Vec3 = Vec3::new(16.0, 16.0, HUMAN_HEIGHT_HALF);

/// Parameters of a node build
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct NodeBuildConfig {
    /// Candidate generators to run
    pub build_flags: BuildFlags,
    /// Interior sample spacing along X and Y
    pub interior_sample_size: f32,
    /// Height added to connection and interior origins
    pub z_offset: f32,
    /// Distance of connection flank points from the portal center
    pub flank_distance: f32,
    /// Connections whose two ends differ more than this in Z are skipped
    pub step_height: f32,
    /// Depth encounter path ends are lowered by
    pub encounter_drop: f32,
    pub hull_mins: Vec3,
    pub hull_maxs: Vec3,
}

impl Default for NodeBuildConfig {
    fn default() -> Self {
        Self {
            build_flags: BuildFlags::default(),
            interior_sample_size: AREA_INSIDE_SIZE,
            z_offset: ENTITY_OFFSET_Z_ADD,
            flank_distance: CONNECTION_FLANK_DISTANCE,
            step_height: STEP_HEIGHT,
            encounter_drop: HUMAN_HEIGHT_HALF,
            hull_mins: ENTITY_HULL_DEFAULT_MIN,
            hull_maxs: ENTITY_HULL_DEFAULT_MAX,
        }
    }
}

impl NodeBuildConfig {
    /// Creates a new NodeBuildConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_build_flags(mut self, flags: BuildFlags) -> Self {
        self.build_flags = flags;
        self
    }

    /// Validates the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !(self.interior_sample_size > 0.0) || !self.interior_sample_size.is_finite() {
            return Err(Error::InvalidConfig(
                "interior sample size must be positive".to_string(),
            ));
        }

        if !(self.step_height >= 0.0) || !(self.flank_distance >= 0.0) {
            return Err(Error::InvalidConfig(
                "step height and flank distance must not be negative".to_string(),
            ));
        }

        if !self.z_offset.is_finite() || !self.encounter_drop.is_finite() {
            return Err(Error::InvalidConfig("invalid height offset".to_string()));
        }

        if !self.hull_mins.is_finite()
            || !self.hull_maxs.is_finite()
            || self.hull_mins.cmpgt(self.hull_maxs).any()
        {
            return Err(Error::InvalidConfig(format!(
                "invalid node hull {} .. {}",
                self.hull_mins, self.hull_maxs
            )));
        }

        Ok(())
    }
}
