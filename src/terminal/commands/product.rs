//! Catalog management commands on `/productos`.
//!
//! Rows are numbered as last listed; `editar` and `borrar` address them by that number and
//! act on the product's record id, so a product deleted elsewhere in between reports as
//! not found.

use super::{parse_amount, parse_row, parse_units, unknown};
use crate::{
    backend::Backend,
    core::{ConfirmationGate, Product, ProductDraft, ProductPatch, cart::format_money, product},
    errors::{Error, Result},
    terminal::{Terminal, banner},
};

/// Dispatches a `/productos` command.
pub async fn handle<B: Backend + Clone, G: ConfirmationGate>(
    term: &mut Terminal<B>,
    command: &str,
    args: &str,
    gate: &mut G,
    out: &mut Vec<String>,
) -> Result<()> {
    match command.to_lowercase().as_str() {
        "ver" => {
            let page = if args.is_empty() {
                1
            } else {
                args.parse().map_err(|_| Error::validation(["page"]))?
            };
            list(term, page, out).await
        }
        "buscar" => search(term, args, out).await,
        "nuevo" => add(term, args, out).await,
        "editar" => edit(term, args, out).await,
        "borrar" => delete(term, args, gate, out).await,
        _ => Err(unknown(command)),
    }
}

/// Lists one page of products by name.
pub async fn list<B: Backend + Clone>(
    term: &mut Terminal<B>,
    page: u64,
    out: &mut Vec<String>,
) -> Result<()> {
    let per_page = term.ctx.settings.products_page_size;
    let listing = product::list_products(&term.ctx.backend, page, per_page).await?;
    out.push(format!(
        "📦 Products - page {} ({} total)",
        listing.page, listing.total_items
    ));
    show_rows(term, listing.items, out);
    Ok(())
}

async fn search<B: Backend + Clone>(
    term: &mut Terminal<B>,
    text: &str,
    out: &mut Vec<String>,
) -> Result<()> {
    if text.is_empty() {
        return Err(Error::validation(["text"]));
    }
    let per_page = term.ctx.settings.products_page_size;
    let listing = product::search_products(&term.ctx.backend, text, per_page).await?;
    out.push(format!("🔎 {} match(es) for '{text}'", listing.total_items));
    show_rows(term, listing.items, out);
    Ok(())
}

fn show_rows<B>(term: &mut Terminal<B>, products: Vec<Product>, out: &mut Vec<String>) {
    if products.is_empty() {
        out.push("No products. Add one with `nuevo`.".to_string());
    }
    for (i, p) in products.iter().enumerate() {
        let cost = p
            .cost
            .map_or_else(String::new, |cost| format!("  cost {}", format_money(cost)));
        out.push(format!(
            "  {:>3}. {}  [{}]  {}  stock {}{cost}",
            i + 1,
            p.name,
            p.barcode,
            format_money(p.price),
            p.stock
        ));
    }
    term.rows = products;
}

/// Parses `<barcode>; <name>; <price>; <stock>[; <cost>]`.
fn parse_draft(args: &str) -> Result<ProductDraft> {
    let parts: Vec<&str> = args.split(';').map(str::trim).collect();
    let [barcode, name, price, stock, rest @ ..] = parts.as_slice() else {
        return Err(Error::validation(["barcode", "name", "price", "stock"]));
    };
    let cost = match rest {
        [] => None,
        [cost] if cost.is_empty() => None,
        [cost] => Some(parse_amount(cost, "cost")?),
        _ => return Err(Error::validation(["cost"])),
    };
    Ok(ProductDraft {
        name: (*name).to_string(),
        barcode: (*barcode).to_string(),
        price: parse_amount(price, "price")?,
        stock: parse_units(stock, "stock")?,
        cost,
    })
}

async fn add<B: Backend + Clone>(
    term: &mut Terminal<B>,
    args: &str,
    out: &mut Vec<String>,
) -> Result<()> {
    let draft = parse_draft(args)?;
    let created = product::create_product(&term.ctx.backend, draft).await?;
    out.push(format!(
        "✅ Product '{}' added at {}.",
        created.name,
        format_money(created.price)
    ));
    Ok(())
}

/// Parses `<field> <value>` into a one-field patch.
fn parse_patch(field: &str, value: &str) -> Result<ProductPatch> {
    let mut patch = ProductPatch::default();
    match field.to_lowercase().as_str() {
        "nombre" | "name" => patch.name = Some(value.to_string()),
        "codigo" | "barcode" => patch.barcode = Some(value.to_string()),
        "precio" | "price" => patch.price = Some(parse_amount(value, "price")?),
        "stock" => patch.stock = Some(parse_units(value, "stock")?),
        "costo" | "cost" => patch.cost = Some(parse_amount(value, "cost")?),
        _ => return Err(Error::validation(["field"])),
    }
    Ok(patch)
}

async fn edit<B: Backend + Clone>(
    term: &mut Terminal<B>,
    args: &str,
    out: &mut Vec<String>,
) -> Result<()> {
    let mut parts = args.splitn(3, char::is_whitespace);
    let (Some(row), Some(field), Some(value)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(Error::validation(["row", "field", "value"]));
    };
    let index = parse_row(row, term.rows.len())?;
    let patch = parse_patch(field, value.trim())?;
    let id = term.rows[index].id.clone();

    match product::update_product(&term.ctx.backend, &id, patch).await {
        Ok(updated) => {
            out.push(format!("✅ Product '{}' updated.", updated.name));
            term.rows[index] = updated;
            Ok(())
        }
        Err(e) if e.is_not_found() => back_to_list(term, &e, out).await,
        Err(e) => Err(e),
    }
}

async fn delete<B: Backend + Clone, G: ConfirmationGate>(
    term: &mut Terminal<B>,
    args: &str,
    gate: &mut G,
    out: &mut Vec<String>,
) -> Result<()> {
    let index = parse_row(args, term.rows.len())?;
    let target = term.rows[index].clone();
    if !gate.confirm(&format!("Delete '{}'?", target.name)).await {
        out.push("Nothing deleted.".to_string());
        return Ok(());
    }
    match product::delete_product(&term.ctx.backend, &target.id).await {
        Ok(()) => {
            term.rows.remove(index);
            out.push(format!("✅ Product '{}' has been deleted.", target.name));
            Ok(())
        }
        Err(e) if e.is_not_found() => back_to_list(term, &e, out).await,
        Err(e) => Err(e),
    }
}

/// The row went stale: report it and show a fresh listing.
async fn back_to_list<B: Backend + Clone>(
    term: &mut Terminal<B>,
    error: &Error,
    out: &mut Vec<String>,
) -> Result<()> {
    out.push(banner(error));
    list(term, 1, out).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{core::AutoConfirm, terminal::tests::logged_in_terminal};

    #[test]
    fn test_parse_draft() {
        let draft = parse_draft("555; Agua 1L; $9.50; 12").ok();
        assert_eq!(draft.as_ref().map(|d| d.name.as_str()), Some("Agua 1L"));
        assert_eq!(draft.as_ref().map(|d| d.cost), Some(None));

        let with_cost = parse_draft("555;Agua 1L;9.5;12;6,25").ok();
        assert_eq!(with_cost.and_then(|d| d.cost), Some(6.25));

        assert!(parse_draft("555; Agua 1L; 9.5").is_err());
        assert!(parse_draft("555; Agua 1L; nueve; 12").is_err());
    }

    #[tokio::test]
    async fn test_product_screen_crud() -> Result<()> {
        let mut terminal = logged_in_terminal().await?;
        let gate = &mut AutoConfirm(true);
        let out = terminal.handle_line("go productos", gate).await;
        assert!(out[0].contains("2 total"));

        let out = terminal.handle_line("nuevo 555; Agua 1L; 9.50; 12", gate).await;
        assert_eq!(out, ["✅ Product 'Agua 1L' added at $9.50."]);
        let out = terminal.handle_line("nuevo 555; Otra; 9.50; 1", gate).await;
        assert_eq!(out, ["❌ Invalid fields: barcode"]);

        let out = terminal.handle_line("ver", gate).await;
        assert!(out[1].contains("Agua 1L"));
        let out = terminal.handle_line("editar 1 precio 10", gate).await;
        assert_eq!(out, ["✅ Product 'Agua 1L' updated."]);
        let out = terminal.handle_line("editar 1 nombre Agua Natural 1L", gate).await;
        assert_eq!(out, ["✅ Product 'Agua Natural 1L' updated."]);

        let out = terminal.handle_line("borrar 1", &mut AutoConfirm(false)).await;
        assert_eq!(out, ["Nothing deleted."]);
        let out = terminal.handle_line("borrar 1", gate).await;
        assert_eq!(out, ["✅ Product 'Agua Natural 1L' has been deleted."]);

        let out = terminal.handle_line("buscar sabritas", gate).await;
        assert!(out[0].contains("1 match"));
        assert!(out[1].contains("[67890]"));
        Ok(())
    }

    #[tokio::test]
    async fn test_edit_of_product_deleted_elsewhere() -> Result<()> {
        let mut terminal = logged_in_terminal().await?;
        let gate = &mut AutoConfirm(true);
        terminal.handle_line("go productos", gate).await;
        let id = terminal.rows[0].id.clone();
        product::delete_product(&terminal.ctx.backend, &id).await?;

        let out = terminal.handle_line("editar 1 stock 3", gate).await;
        assert!(out[0].starts_with("⚠️ Record"));
        assert_eq!(out[1], "📦 Products - page 1 (1 total)");
        assert_eq!(terminal.rows.len(), 1);
        let out = terminal.handle_line("editar 9 stock 3", gate).await;
        assert_eq!(out, ["❌ Invalid fields: row"]);
        Ok(())
    }
}
