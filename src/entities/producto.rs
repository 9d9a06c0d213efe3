//! Producto entity - The `productos` collection as the backend stores it.
//!
//! Field names follow the backend record shape (`nombre`, `codigo_de_barras`, ...).
//! Business code never touches this model directly; `backend::adapter` maps it
//! into the canonical [`crate::core::Product`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Producto database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "productos")]
pub struct Model {
    /// Backend-assigned identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub nombre: String,
    /// Barcode, unique among products
    #[sea_orm(unique)]
    pub codigo_de_barras: String,
    /// Sale unit price
    pub precio: f64,
    /// Acquisition cost, if known
    pub precio_costo: Option<f64>,
    /// Units currently available
    pub stock: i64,
    /// When the record was created
    pub created_at: DateTime,
    /// When the record was last modified
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
