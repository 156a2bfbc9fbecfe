//! Aggregate status codes for navigation mesh post-processing

/// Status of a post-load pass over the navigation mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavStatus {
    /// Every reference resolved
    #[default]
    Ok,
    /// At least one reference could not be resolved, or an area is malformed
    CorruptData,
}

impl NavStatus {
    /// Checks if the status is a success
    pub fn is_ok(&self) -> bool {
        *self == NavStatus::Ok
    }

    /// Checks if corruption was found
    pub fn is_corrupt(&self) -> bool {
        *self == NavStatus::CorruptData
    }

    /// Combines two statuses; corruption is sticky
    pub fn combine(self, other: NavStatus) -> NavStatus {
        if self.is_corrupt() || other.is_corrupt() {
            NavStatus::CorruptData
        } else {
            NavStatus::Ok
        }
    }
}

impl std::fmt::Display for NavStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NavStatus::Ok => write!(f, "OK"),
            NavStatus::CorruptData => write!(f, "Corrupt navigation data"),
        }
    }
}
