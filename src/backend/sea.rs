//! Bundled backend - `SQLite` storage through `SeaORM`.
//!
//! Implements the [`Backend`] contract on top of the `productos` and `users` tables.
//! Stock writes that carry a guard are issued as a single conditional
//! `UPDATE productos SET ... WHERE id = ? AND stock = ?`, so a write computed from a stale
//! read is rejected instead of silently overwriting a concurrent register's decrement.

use super::{
    AuthSession, AuthUser, Backend, ListQuery, ProductFilter, RecordPage, SortOrder, USERS,
    adapter,
};
use crate::{
    core::{Product, ProductDraft, ProductPatch, RecordId},
    entities::{Producto, User, producto, user},
    errors::{Error, Result},
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{ActiveValue, Condition, PaginatorTrait, QueryOrder, prelude::*};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// [`Backend`] over a `SeaORM` connection.
///
/// Clones share the same connection.
#[derive(Clone, Debug)]
pub struct SeaOrmBackend {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmBackend {
    /// Wraps an open connection whose tables already exist.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db: Arc::new(db) }
    }

    /// The underlying connection.
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Stores a new operator. Returns `false` if the username is already taken.
    ///
    /// # Errors
    /// Returns an error if the database write fails.
    #[instrument(skip(self, password))]
    pub async fn register_user(
        &self,
        username: &str,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<bool> {
        let existing = User::find()
            .filter(user::Column::Username.eq(username))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            debug!("Operator already registered");
            return Ok(false);
        }

        let model = user::ActiveModel {
            username: ActiveValue::Set(username.to_string()),
            email: ActiveValue::Set(email.to_string()),
            name: ActiveValue::Set(name.to_string()),
            password_hash: ActiveValue::Set(hash_secret(password)?),
            created_at: ActiveValue::Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        };
        model.insert(&*self.db).await?;
        info!("Operator registered");
        Ok(true)
    }
}

/// Argon2 PHC string for a secret, with a fresh random salt.
///
/// # Errors
/// [`Error::Credential`] if the secret cannot be hashed.
pub fn hash_secret(secret: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Credential(e.to_string()))
}

/// Checks a secret against a stored PHC string. Unparsable hashes never verify.
#[must_use]
pub fn verify_secret(secret: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        warn!(collection = USERS, "Stored password hash is not a PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok()
}

fn session_token(user: &user::Model) -> String {
    let issued = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(user.id.to_le_bytes());
    hasher.update(issued.to_le_bytes());
    hasher.update(user.password_hash.as_bytes());
    hex::encode(hasher.finalize())
}

impl Backend for SeaOrmBackend {
    #[instrument(skip(self, secret))]
    async fn authenticate(&self, identity: &str, secret: &str) -> Result<AuthSession> {
        let identity = identity.trim();
        let found = User::find()
            .filter(
                Condition::any()
                    .add(user::Column::Username.eq(identity))
                    .add(user::Column::Email.eq(identity)),
            )
            .one(&*self.db)
            .await?;

        let Some(model) = found else {
            warn!(collection = USERS, "Unknown identity");
            return Err(Error::AuthenticationFailure);
        };
        if !verify_secret(secret, &model.password_hash) {
            warn!(collection = USERS, "Password mismatch");
            return Err(Error::AuthenticationFailure);
        }

        let token = session_token(&model);
        Ok(AuthSession {
            token,
            user: AuthUser::from(model),
        })
    }

    #[instrument(skip(self))]
    async fn list_products(
        &self,
        page: u64,
        per_page: u64,
        query: &ListQuery,
    ) -> Result<RecordPage<Product>> {
        if per_page == 0 {
            return Err(Error::validation(["perPage"]));
        }
        let page = page.max(1);
        let offset = (page - 1)
            .checked_mul(per_page)
            .and_then(|offset| i64::try_from(offset).ok());
        if offset.is_none() {
            return Err(Error::validation(["page"]));
        }

        let mut select = Producto::find();
        match &query.filter {
            Some(ProductFilter::Barcode(code)) => {
                select = select.filter(producto::Column::CodigoDeBarras.eq(code.as_str()));
            }
            Some(ProductFilter::NameContains(text)) => {
                select = select.filter(producto::Column::Nombre.contains(text.as_str()));
            }
            None => {}
        }
        select = match query.sort {
            Some(SortOrder::NameAsc) => select.order_by_asc(producto::Column::Nombre),
            Some(SortOrder::StockAsc) => select
                .order_by_asc(producto::Column::Stock)
                .order_by_asc(producto::Column::Nombre),
            None => select.order_by_asc(producto::Column::Id),
        };

        let paginator = select.paginate(&*self.db, per_page);
        let total_items = paginator.num_items().await?;
        let items = paginator
            .fetch_page(page - 1)
            .await?
            .into_iter()
            .map(Product::from)
            .collect();

        Ok(RecordPage {
            items,
            total_items,
            page,
            per_page,
        })
    }

    async fn get_product(&self, id: &RecordId) -> Result<Product> {
        let key = adapter::product_key(id)?;
        Producto::find_by_id(key)
            .one(&*self.db)
            .await?
            .map(Product::from)
            .ok_or_else(|| adapter::not_found(id))
    }

    #[instrument(skip(self))]
    async fn create_product(&self, draft: ProductDraft) -> Result<Product> {
        draft.validate()?;
        let model = adapter::insert_model(draft, chrono::Utc::now().naive_utc())
            .insert(&*self.db)
            .await
            .map_err(adapter::write_error)?;
        Ok(Product::from(model))
    }

    #[instrument(skip(self))]
    async fn update_product(&self, id: &RecordId, patch: ProductPatch) -> Result<Product> {
        patch.validate()?;
        let key = adapter::product_key(id)?;
        let current = Producto::find_by_id(key)
            .one(&*self.db)
            .await?
            .ok_or_else(|| adapter::not_found(id))?;

        let guard = patch.if_stock;
        let mut update = Producto::update_many()
            .set(adapter::update_model(patch, chrono::Utc::now().naive_utc()))
            .filter(producto::Column::Id.eq(key));
        if let Some(expected) = guard {
            update = update.filter(producto::Column::Stock.eq(expected));
        }
        let result = update.exec(&*self.db).await.map_err(adapter::write_error)?;

        if result.rows_affected == 0 {
            return Err(if guard.is_some() {
                warn!(product = %current.nombre, "Stock changed since it was read");
                Error::StockConflict {
                    product: current.nombre,
                }
            } else {
                adapter::not_found(id)
            });
        }

        Producto::find_by_id(key)
            .one(&*self.db)
            .await?
            .map(Product::from)
            .ok_or_else(|| adapter::not_found(id))
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, id: &RecordId) -> Result<()> {
        let key = adapter::product_key(id)?;
        let result = Producto::delete_by_id(key).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(adapter::not_found(id));
        }
        Ok(())
    }
}
