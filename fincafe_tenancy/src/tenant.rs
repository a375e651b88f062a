//! Tenant identity and naming rules

use serde::{Deserialize, Serialize};

use crate::db::entities::farms;
use crate::error::TenancyError;

/// Postgres truncates identifiers beyond this length
const MAX_DATABASE_NAME_LEN: usize = 63;

/// A farm and the database holding its data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub code: String,
    pub name: String,
    pub database_name: String,
    pub is_active: bool,
}

impl Tenant {
    /// Tenant whose database name is derived from its code
    pub fn from_code(code: &str, name: &str, prefix: &str) -> Result<Self, TenancyError> {
        Ok(Self {
            code: code.to_string(),
            name: name.to_string(),
            database_name: database_name_for(prefix, code)?,
            is_active: true,
        })
    }
}

impl From<farms::Model> for Tenant {
    fn from(farm: farms::Model) -> Self {
        Self {
            code: farm.code,
            name: farm.name,
            database_name: farm.database_name,
            is_active: farm.is_active,
        }
    }
}

/// Farm codes are lowercase letters, digits and hyphens
pub fn validate_code(code: &str) -> Result<(), TenancyError> {
    let valid = !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(TenancyError::InvalidCode(code.to_string()))
    }
}

/// Database names are interpolated into DDL, so only `[a-z0-9_]` is accepted
pub fn validate_database_name(name: &str) -> Result<(), TenancyError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_DATABASE_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(TenancyError::InvalidDatabaseName(name.to_string()))
    }
}

/// `demo-farm` with prefix `customer_` becomes `customer_demo_farm`
pub fn database_name_for(prefix: &str, code: &str) -> Result<String, TenancyError> {
    validate_code(code)?;
    let name = format!("{prefix}{}", code.replace('-', "_"));
    validate_database_name(&name)?;
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_name_for() {
        assert_eq!(
            database_name_for("customer_", "demo-farm").unwrap(),
            "customer_demo_farm"
        );
        assert_eq!(database_name_for("customer_", "test").unwrap(), "customer_test");
    }

    #[test]
    fn test_invalid_codes() {
        for code in ["", "Demo", "demo_farm", "demo farm", "farm;drop"] {
            assert!(
                matches!(validate_code(code), Err(TenancyError::InvalidCode(_))),
                "{code:?}"
            );
        }
    }

    #[test]
    fn test_invalid_database_names() {
        assert!(validate_database_name("customer_test").is_ok());
        let too_long = "a".repeat(64);
        for name in ["", "customer-test", "Customer", "1farm", "x\"; DROP", too_long.as_str()] {
            assert!(validate_database_name(name).is_err(), "{name:?}");
        }
    }

    #[test]
    fn test_tenant_from_code() {
        let tenant = Tenant::from_code("north-ridge", "North Ridge", "customer_").unwrap();
        assert_eq!(tenant.database_name, "customer_north_ridge");
        assert!(tenant.is_active);
    }
}
