//! Mapping between the bundled backend's record shapes and the canonical types.
//!
//! This is the only place where backend field names (`nombre`, `precio`,
//! `codigo_de_barras`, `precio_costo`) appear next to their canonical counterparts.

use super::{AuthUser, PRODUCTS};
use crate::{
    core::{Product, ProductDraft, ProductPatch, RecordId},
    entities::{producto, user},
    errors::{Error, Result},
};
use sea_orm::{ActiveValue, DbErr, SqlErr};

impl From<producto::Model> for Product {
    fn from(model: producto::Model) -> Self {
        Self {
            id: RecordId::new(model.id.to_string()),
            name: model.nombre,
            barcode: model.codigo_de_barras,
            price: model.precio,
            stock: model.stock,
            cost: model.precio_costo,
        }
    }
}

impl From<user::Model> for AuthUser {
    fn from(model: user::Model) -> Self {
        Self {
            id: RecordId::new(model.id.to_string()),
            username: model.username,
            name: model.name,
        }
    }
}

/// Parses a product id. Ids the store could never have issued are reported as missing.
pub fn product_key(id: &RecordId) -> Result<i64> {
    id.as_str().parse().map_err(|_| not_found(id))
}

/// `NotFound` for the products collection.
pub fn not_found(id: &RecordId) -> Error {
    Error::NotFound {
        collection: PRODUCTS.to_string(),
        id: id.to_string(),
    }
}

/// Insert model for a validated draft.
pub fn insert_model(draft: ProductDraft, now: chrono::NaiveDateTime) -> producto::ActiveModel {
    producto::ActiveModel {
        nombre: ActiveValue::Set(draft.name),
        codigo_de_barras: ActiveValue::Set(draft.barcode),
        precio: ActiveValue::Set(draft.price),
        precio_costo: ActiveValue::Set(draft.cost),
        stock: ActiveValue::Set(draft.stock),
        created_at: ActiveValue::Set(now),
        updated_at: ActiveValue::Set(now),
        ..Default::default()
    }
}

/// Update model carrying only the fields present in `patch`.
pub fn update_model(patch: ProductPatch, now: chrono::NaiveDateTime) -> producto::ActiveModel {
    producto::ActiveModel {
        nombre: maybe(patch.name),
        codigo_de_barras: maybe(patch.barcode),
        precio: maybe(patch.price),
        precio_costo: maybe(patch.cost.map(Some)),
        stock: maybe(patch.stock),
        updated_at: ActiveValue::Set(now),
        ..Default::default()
    }
}

fn maybe<V>(value: Option<V>) -> ActiveValue<V>
where
    V: Into<sea_orm::Value>,
{
    value.map_or(ActiveValue::NotSet, ActiveValue::Set)
}

/// Translates a write failure. A unique violation can only come from the barcode column.
pub fn write_error(err: DbErr) -> Error {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Error::validation(["barcode"]),
        _ => Error::Database(err),
    }
}
