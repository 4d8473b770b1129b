//! Supply-chain participant roles.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::ValidationError;

/// Role a participant holds within the supply chain.
///
/// Roles gate who may perform which ledger mutations and which broadcast
/// audience a connection belongs to. Parsing is case-sensitive: the wire
/// format is the lowercase name and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Farmer,
    Distributor,
    Retailer,
    Customer,
}

impl UserRole {
    pub const ALL: [UserRole; 5] = [
        UserRole::Admin,
        UserRole::Farmer,
        UserRole::Distributor,
        UserRole::Retailer,
        UserRole::Customer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Farmer => "farmer",
            UserRole::Distributor => "distributor",
            UserRole::Retailer => "retailer",
            UserRole::Customer => "customer",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "farmer" => Ok(UserRole::Farmer),
            "distributor" => Ok(UserRole::Distributor),
            "retailer" => Ok(UserRole::Retailer),
            "customer" => Ok(UserRole::Customer),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("unknown role '{other}'"),
            )),
        }
    }
}
