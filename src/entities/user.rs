//! User entity - Operators allowed to log into the register.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Backend-assigned identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name
    #[sea_orm(unique)]
    pub username: String,
    /// Login email, accepted as an alternative identity
    #[sea_orm(unique)]
    pub email: String,
    /// Display name shown in screen headers
    pub name: String,
    /// Hex-encoded SHA-256 digest of the password
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// When the operator was created
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
