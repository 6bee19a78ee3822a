use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Employee,
}

impl TryFrom<String> for Role {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Role {
    /// Admins and managers see the directory and review leave.
    pub fn is_supervisor(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}
