//! Initial operator account from environment variables.
//!
//! `KIOSKO_ADMIN_USER` and `KIOSKO_ADMIN_PASSWORD` are required for seeding;
//! `KIOSKO_ADMIN_EMAIL` and `KIOSKO_ADMIN_NAME` fall back to values derived from the user name.
//! Without them no operator is created and an existing database is used as is.

use crate::{backend::SeaOrmBackend, errors::Result};
use tracing::{info, warn};

/// Operator account to create on startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperatorSeed {
    /// Login name
    pub username: String,
    /// Login email
    pub email: String,
    /// Display name
    pub name: String,
    /// Plain-text password, hashed before storage
    pub password: String,
}

/// Reads the operator from the process environment.
#[must_use]
pub fn operator_from_env() -> Option<OperatorSeed> {
    operator_from(|key| std::env::var(key).ok())
}

fn operator_from(lookup: impl Fn(&str) -> Option<String>) -> Option<OperatorSeed> {
    let username = lookup("KIOSKO_ADMIN_USER").filter(|v| !v.trim().is_empty())?;
    let Some(password) = lookup("KIOSKO_ADMIN_PASSWORD").filter(|v| !v.is_empty()) else {
        warn!("KIOSKO_ADMIN_USER is set but KIOSKO_ADMIN_PASSWORD is not");
        return None;
    };
    let email = lookup("KIOSKO_ADMIN_EMAIL").unwrap_or_else(|| format!("{username}@kiosko.local"));
    let name = lookup("KIOSKO_ADMIN_NAME").unwrap_or_else(|| username.clone());
    Some(OperatorSeed {
        username,
        email,
        name,
        password,
    })
}

/// Registers the operator unless the user name is taken.
///
/// # Errors
/// Returns an error if the database write fails.
pub async fn seed_operator(backend: &SeaOrmBackend, seed: &OperatorSeed) -> Result<bool> {
    let created = backend
        .register_user(&seed.username, &seed.email, &seed.name, &seed.password)
        .await?;
    if created {
        info!(username = %seed.username, "Initial operator created");
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{backend::Backend, test_utils::*};
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_operator_defaults_from_username() {
        let seed = operator_from(env(&[
            ("KIOSKO_ADMIN_USER", "caja1"),
            ("KIOSKO_ADMIN_PASSWORD", "secreto"),
        ]))
        .unwrap();
        assert_eq!(seed.email, "caja1@kiosko.local");
        assert_eq!(seed.name, "caja1");
    }

    #[test]
    fn test_operator_requires_user_and_password() {
        assert!(operator_from(env(&[])).is_none());
        assert!(operator_from(env(&[("KIOSKO_ADMIN_USER", "caja1")])).is_none());
        assert!(operator_from(env(&[("KIOSKO_ADMIN_PASSWORD", "secreto")])).is_none());
    }

    #[tokio::test]
    async fn test_seed_operator_once() -> Result<()> {
        let backend = setup_backend().await?;
        let seed = operator_from(env(&[
            ("KIOSKO_ADMIN_USER", "admin"),
            ("KIOSKO_ADMIN_PASSWORD", "kiosko"),
            ("KIOSKO_ADMIN_NAME", "Encargada"),
        ]))
        .unwrap();
        assert!(seed_operator(&backend, &seed).await?);
        assert!(!seed_operator(&backend, &seed).await?);

        let session = backend.authenticate("admin", "kiosko").await?;
        assert_eq!(session.user.name, "Encargada");
        Ok(())
    }
}
