use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User role. Stored as a string column but closed on the Rust side so role
/// checks are exhaustive matches instead of string comparisons.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "staff")]
    Staff,
}

impl Role {
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Electrical phase of an installation, derived from system capacity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum Phase {
    #[sea_orm(string_value = "Single Phase")]
    #[serde(rename = "Single Phase")]
    Single,
    #[sea_orm(string_value = "Three Phase")]
    #[serde(rename = "Three Phase")]
    Three,
}

impl Phase {
    /// Installations of 5 kW and above run three-phase.
    #[must_use]
    pub fn from_capacity(capacity_kw: f64) -> Self {
        if capacity_kw >= 5.0 { Self::Three } else { Self::Single }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Single => "Single Phase",
            Self::Three => "Three Phase",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_boundary_is_five_kilowatts() {
        assert_eq!(Phase::from_capacity(3.0), Phase::Single);
        assert_eq!(Phase::from_capacity(4.5), Phase::Single);
        assert_eq!(Phase::from_capacity(5.0), Phase::Three);
        assert_eq!(Phase::from_capacity(10.0), Phase::Three);
    }
}
