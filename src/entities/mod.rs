//! Entity module - SeaORM definitions for the bundled backend's collections.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod producto;
pub mod user;

pub use producto::{Column as ProductoColumn, Entity as Producto, Model as ProductoModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
