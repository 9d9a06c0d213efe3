//! Sales register commands on `/ventas`.
//!
//! A bare line is a scanned barcode and must match exactly; `buscar` takes a name fragment.
//! A line equal to a catalog barcode is scanned even when it spells a command word.
//! Cart rows are numbered in the order products were first added.

use super::{parse_row, unknown};
use crate::{
    backend::Backend,
    core::{
        ConfirmationGate, FinalizeOutcome, SalesRegister, cart::format_money,
        catalog::CatalogSource, matcher::MatchMode,
    },
    errors::{Error, Result},
    terminal::Terminal,
};

/// Opens the register the first time the screen is entered and shows the cart.
pub async fn enter<B: Backend + Clone>(term: &mut Terminal<B>, out: &mut Vec<String>) {
    if term.register.is_none() {
        let mut register = SalesRegister::new(
            term.ctx.backend.clone(),
            term.ctx.settings.catalog_page_size,
        );
        if register.open().await == CatalogSource::Sample {
            out.push(
                "⚠️ Backend unavailable, showing sample products. Sales cannot be completed."
                    .to_string(),
            );
        }
        term.register = Some(register);
    }
    out.push("🛒 Ventas - scan a barcode or `buscar <text>`".to_string());
    if let Some(register) = &term.register {
        show_cart(register, out);
    }
}

/// Dispatches a `/ventas` command.
pub async fn handle<B: Backend + Clone, G: ConfirmationGate>(
    term: &mut Terminal<B>,
    command: &str,
    args: &str,
    line: &str,
    gate: &mut G,
    out: &mut Vec<String>,
) -> Result<()> {
    match command.to_lowercase().as_str() {
        "buscar" => search(term, args, out).await,
        "cant" => set_quantity(term, args, out),
        "quitar" => remove(term, args, out),
        "ver" => {
            let register = register_mut(term)?;
            show_cart(register, out);
            Ok(())
        }
        "f" => finalize(term, gate, out).await,
        "c" => cancel(term, gate, out).await,
        _ if args.is_empty() => scan(term, line, out).await,
        _ => Err(unknown(command)),
    }
}

fn register_mut<B>(term: &mut Terminal<B>) -> Result<&mut SalesRegister<B>> {
    term.register.as_mut().ok_or_else(|| Error::NotFound {
        collection: "screens".to_string(),
        id: "/ventas".to_string(),
    })
}

/// Whether `code` is the barcode of a product in the open register's catalog.
pub fn is_known_code<B: Backend>(term: &Terminal<B>, code: &str) -> bool {
    term.register
        .as_ref()
        .is_some_and(|register| register.catalog().find(code, MatchMode::Exact).is_some())
}

/// Adds one unit of the product whose barcode is `code`.
pub async fn scan<B: Backend + Clone>(
    term: &mut Terminal<B>,
    code: &str,
    out: &mut Vec<String>,
) -> Result<()> {
    term.ctx.session.require_user()?;
    let register = register_mut(term)?;
    let line = register.scan(code).await?;
    out.push(format!("✅ {} x{}", line.name, line.quantity));
    show_cart(register, out);
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
    let register = register_mut(term)?;
    let line = register.search_and_add(text).await?;
    out.push(format!("✅ {} x{}", line.name, line.quantity));
    show_cart(register, out);
    Ok(())
}

fn set_quantity<B: Backend>(term: &mut Terminal<B>, args: &str, out: &mut Vec<String>) -> Result<()> {
    let register = register_mut(term)?;
    let (row, raw) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
    let index = parse_row(row, register.cart().len())?;
    let id = register.cart().lines()[index].product_id.clone();
    register.set_quantity_input(&id, raw)?;
    show_cart(register, out);
    Ok(())
}

fn remove<B: Backend>(term: &mut Terminal<B>, args: &str, out: &mut Vec<String>) -> Result<()> {
    let register = register_mut(term)?;
    let index = parse_row(args, register.cart().len())?;
    let id = register.cart().lines()[index].product_id.clone();
    if let Some(line) = register.remove_line(&id) {
        out.push(format!("Removed {}.", line.name));
    }
    show_cart(register, out);
    Ok(())
}

async fn finalize<B: Backend + Clone, G: ConfirmationGate>(
    term: &mut Terminal<B>,
    gate: &mut G,
    out: &mut Vec<String>,
) -> Result<()> {
    let register = register_mut(term)?;
    let outcome = register.finalize(gate).await;
    let icon = match &outcome {
        FinalizeOutcome::Completed { .. } => "✅",
        FinalizeOutcome::Partial { .. } | FinalizeOutcome::AllFailed { .. } => "⚠️",
        FinalizeOutcome::EmptyCart | FinalizeOutcome::Declined => "ℹ️",
    };
    out.push(format!("{icon} {}", outcome.summary()));
    for result in outcome.results() {
        if let Err(e) = &result.outcome {
            out.push(format!("  {}: {e}", result.name));
        }
    }
    if !register.cart().is_empty() {
        show_cart(register, out);
    }
    Ok(())
}

async fn cancel<B: Backend + Clone, G: ConfirmationGate>(
    term: &mut Terminal<B>,
    gate: &mut G,
    out: &mut Vec<String>,
) -> Result<()> {
    let register = register_mut(term)?;
    if register.cancel(gate).await {
        out.push("Sale cancelled.".to_string());
    } else if register.cart().is_empty() {
        out.push("Cart is empty.".to_string());
    }
    Ok(())
}

fn show_cart<B: Backend>(register: &SalesRegister<B>, out: &mut Vec<String>) {
    for (i, line) in register.cart().lines().iter().enumerate() {
        out.push(format!(
            "  {:>3}. {} x{}  {}",
            i + 1,
            line.name,
            line.quantity,
            format_money(line.subtotal())
        ));
    }
    out.push(format!("  Total: {}", format_money(register.total())));
    if let Some(hint) = register.suggestion() {
        out.push(format!("💡 {hint}"));
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::{AutoConfirm, product::find_by_barcode},
        terminal::tests::logged_in_terminal,
        test_utils::create_test_product,
    };

    #[tokio::test]
    async fn test_scan_search_and_finalize() -> Result<()> {
        let mut terminal = logged_in_terminal().await?;
        let gate = &mut AutoConfirm(true);
        let out = terminal.handle_line("go /ventas", gate).await;
        assert!(out.contains(&"  Total: $0.00".to_string()));

        let out = terminal.handle_line("12345", gate).await;
        assert_eq!(out[0], "✅ Coca Cola 600ml x1");
        assert!(out.iter().any(|l| l.contains("chips")));

        // Scans must match a barcode exactly.
        let out = terminal.handle_line("sabritas", gate).await;
        assert!(out[0].starts_with("⚠️ Record 'sabritas'"));
        let out = terminal.handle_line("buscar sabritas", gate).await;
        assert_eq!(out[0], "✅ Sabritas 45g x1");

        let out = terminal.handle_line("cant 2 3", gate).await;
        assert!(out.contains(&"  Total: $51.50".to_string()));

        let out = terminal.handle_line("f", gate).await;
        assert_eq!(out[0], "✅ Sale completed. Stock updated for 2 products.");
        let backend = &terminal.ctx.backend;
        assert_eq!(find_by_barcode(backend, "12345").await?.unwrap().stock, 9);
        assert_eq!(find_by_barcode(backend, "67890").await?.unwrap().stock, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_stock_limit_and_cancel() -> Result<()> {
        let mut terminal = logged_in_terminal().await?;
        let gate = &mut AutoConfirm(true);
        terminal.handle_line("go ventas", gate).await;

        for _ in 0..5 {
            terminal.handle_line("67890", gate).await;
        }
        let out = terminal.handle_line("67890", gate).await;
        assert_eq!(
            out,
            ["⚠️ Insufficient stock for 'Sabritas 45g': available 5, needed 6"]
        );

        let out = terminal.handle_line("c", &mut AutoConfirm(false)).await;
        assert!(out.is_empty());
        let out = terminal.handle_line("c", gate).await;
        assert_eq!(out, ["Sale cancelled."]);
        let out = terminal.handle_line("c", gate).await;
        assert_eq!(out, ["Cart is empty."]);
        let out = terminal.handle_line("f", gate).await;
        assert_eq!(out[0], "ℹ️ Cart is empty, nothing to finalize.");
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_and_zero_quantity() -> Result<()> {
        let mut terminal = logged_in_terminal().await?;
        let gate = &mut AutoConfirm(true);
        terminal.handle_line("go ventas", gate).await;
        terminal.handle_line("12345", gate).await;
        terminal.handle_line("67890", gate).await;

        let out = terminal.handle_line("quitar 1", gate).await;
        assert_eq!(out[0], "Removed Coca Cola 600ml.");
        terminal.handle_line("cant 1 0", gate).await;
        assert!(terminal.register().unwrap().cart().is_empty());
        let out = terminal.handle_line("quitar 1", gate).await;
        assert_eq!(out, ["❌ Invalid fields: row"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_barcode_spelling_a_command_is_scanned() -> Result<()> {
        let mut terminal = logged_in_terminal().await?;
        let gate = &mut AutoConfirm(true);
        create_test_product(&terminal.ctx.backend, "Fritos 50g", "f", 9.0, 4).await?;
        create_test_product(&terminal.ctx.backend, "Vela", "ver", 5.0, 2).await?;
        terminal.handle_line("go ventas", gate).await;

        let out = terminal.handle_line("f", gate).await;
        assert_eq!(out[0], "✅ Fritos 50g x1");
        let out = terminal.handle_line("VER", gate).await;
        assert_eq!(out[0], "✅ Vela x1");
        assert_eq!(terminal.register().unwrap().cart().len(), 2);

        // Words that are not barcodes keep their command meaning.
        let out = terminal.handle_line("c", gate).await;
        assert_eq!(out, ["Sale cancelled."]);
        Ok(())
    }

    #[tokio::test]
    async fn test_quantity_text_keeps_leading_number() -> Result<()> {
        let mut terminal = logged_in_terminal().await?;
        let gate = &mut AutoConfirm(true);
        terminal.handle_line("go ventas", gate).await;
        terminal.handle_line("12345", gate).await;

        let out = terminal.handle_line("cant 1 2.5", gate).await;
        assert!(out.contains(&"  Total: $31.00".to_string()));
        let out = terminal.handle_line("cant 1 99999999999", gate).await;
        assert_eq!(out, ["❌ Invalid fields: quantity"]);
        assert_eq!(terminal.register().unwrap().cart().lines()[0].quantity, 2);
        Ok(())
    }
}
