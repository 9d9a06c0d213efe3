//! Core business logic - framework-agnostic catalog, inventory and sales register operations.

/// Cart line items and totals
pub mod cart;
/// Catalog snapshot for scan lookups
pub mod catalog;
/// Dashboard summary figures
pub mod dashboard;
/// Inventory view, stock adjustments and stock intake
pub mod inventory;
/// Query-to-product resolution
pub mod matcher;
/// Canonical product types and catalog CRUD
pub mod product;
/// Sales register engine
pub mod register;
/// Keystroke-timing scanner discriminator
pub mod scanner;
/// Upsell hints
pub mod suggestion;

pub use cart::{Cart, CartLine};
pub use product::{Product, ProductDraft, ProductPatch, RecordId};
pub use register::{AutoConfirm, ConfirmationGate, FinalizeOutcome, SalesRegister};
