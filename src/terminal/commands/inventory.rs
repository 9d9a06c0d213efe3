//! Inventory commands on `/inventario` - stock view, manual corrections and deliveries.

use super::{parse_amount, parse_row, parse_units, unknown};
use crate::{
    backend::Backend,
    core::{
        ConfirmationGate, RecordId,
        cart::format_money,
        inventory::{self, StockIntake},
        product,
    },
    errors::{Error, Result},
    terminal::Terminal,
};

const NO_DELIVERY: &str = "No delivery open. Start one with `entrada <provider>`.";

/// Dispatches an `/inventario` command. With a delivery open, a lone word is a scanned code.
pub async fn handle<B: Backend + Clone, G: ConfirmationGate>(
    term: &mut Terminal<B>,
    command: &str,
    args: &str,
    line: &str,
    gate: &mut G,
    out: &mut Vec<String>,
) -> Result<()> {
    match command.to_lowercase().as_str() {
        "ver" => show(term, out).await,
        "ajustar" => adjust(term, args, out).await,
        "entrada" => open_delivery(term, args, out),
        "lote" => scan_batch(term, args, out).await,
        "cant" => edit_line(term, args, out, |intake, id, raw| {
            intake.set_quantity(id, parse_units(raw, "quantity")?);
            Ok(())
        }),
        "costo" => edit_line(term, args, out, |intake, id, raw| {
            intake.set_cost(id, parse_amount(raw, "cost")?);
            Ok(())
        }),
        "quitar" => edit_line(term, args, out, |intake, id, _| {
            intake.remove(id);
            Ok(())
        }),
        "guardar" => commit(term, gate, out).await,
        "descartar" => discard(term, gate, out).await,
        _ if term.intake.is_some() && args.is_empty() => scan_batch(term, line, out).await,
        _ => Err(unknown(command)),
    }
}

/// Prints stock levels and the open delivery.
pub async fn show<B: Backend + Clone>(term: &mut Terminal<B>, out: &mut Vec<String>) -> Result<()> {
    let settings = &term.ctx.settings;
    let rows = inventory::inventory_rows(
        &term.ctx.backend,
        settings.products_page_size,
        settings.low_stock_threshold,
    )
    .await?;

    out.push("📋 Inventory".to_string());
    for (i, row) in rows.iter().enumerate() {
        let flag = if row.low_stock { "⚠️" } else { "  " };
        out.push(format!(
            "  {:>3}. {flag} {:<30} stock {}",
            i + 1,
            row.product.name,
            row.product.stock
        ));
    }
    term.rows = rows.into_iter().map(|row| row.product).collect();
    if let Some(intake) = &term.intake {
        show_delivery(intake, out);
    }
    Ok(())
}

fn show_delivery(intake: &StockIntake, out: &mut Vec<String>) {
    out.push(format!(
        "🚚 Delivery from {} ({})",
        intake.provider(),
        intake.received_at().format("%Y-%m-%d %H:%M")
    ));
    for (i, line) in intake.lines().iter().enumerate() {
        out.push(format!(
            "  {:>3}. {} x{} @ {}",
            i + 1,
            line.name,
            line.quantity,
            line.cost.map_or_else(|| "no cost".to_string(), format_money)
        ));
    }
    out.push(format!("  Total cost: {}", format_money(intake.total_cost())));
}

async fn adjust<B: Backend + Clone>(
    term: &mut Terminal<B>,
    args: &str,
    out: &mut Vec<String>,
) -> Result<()> {
    let Some((row, stock)) = args.split_once(char::is_whitespace) else {
        return Err(Error::validation(["row", "stock"]));
    };
    let index = parse_row(row, term.rows.len())?;
    let stock = parse_units(stock, "stock")?;
    let id = term.rows[index].id.clone();

    let updated = inventory::adjust_stock(&term.ctx.backend, &id, stock).await?;
    out.push(format!(
        "✅ Stock for '{}' set to {}.",
        updated.name, updated.stock
    ));
    term.rows[index] = updated;
    Ok(())
}

fn open_delivery<B>(term: &mut Terminal<B>, provider: &str, out: &mut Vec<String>) -> Result<()> {
    if provider.is_empty() {
        return Err(Error::validation(["provider"]));
    }
    if let Some(open) = &term.intake {
        out.push(format!(
            "⚠️ A delivery from {} is still open. `guardar` or `descartar` it first.",
            open.provider()
        ));
        return Ok(());
    }
    term.intake = Some(StockIntake::new(provider));
    out.push(format!(
        "🚚 Receiving from {provider}. Scan codes, then `guardar`."
    ));
    Ok(())
}

async fn scan_batch<B: Backend + Clone>(
    term: &mut Terminal<B>,
    codes: &str,
    out: &mut Vec<String>,
) -> Result<()> {
    if term.intake.is_none() {
        out.push(NO_DELIVERY.to_string());
        return Ok(());
    }
    let page_size = term.ctx.settings.catalog_page_size;
    let products = product::list_products(&term.ctx.backend, 1, page_size)
        .await?
        .items;
    let Some(intake) = term.intake.as_mut() else {
        return Ok(());
    };

    let batch = codes.split_whitespace().collect::<Vec<_>>().join("\n");
    let report = intake.process_batch(&products, &batch);
    out.push(format!(
        "✅ {} code(s) read, {} line(s) in the delivery.",
        report.processed,
        intake.lines().len()
    ));
    if !report.not_found.is_empty() {
        out.push(format!("⚠️ Not found: {}", report.not_found.join(", ")));
    }
    Ok(())
}

fn edit_line<B, F>(
    term: &mut Terminal<B>,
    args: &str,
    out: &mut Vec<String>,
    apply: F,
) -> Result<()>
where
    F: FnOnce(&mut StockIntake, &RecordId, &str) -> Result<()>,
{
    let Some(intake) = term.intake.as_mut() else {
        out.push(NO_DELIVERY.to_string());
        return Ok(());
    };
    let (row, value) = args
        .split_once(char::is_whitespace)
        .unwrap_or((args, ""));
    let index = parse_row(row, intake.lines().len())?;
    let id = intake.lines()[index].product_id.clone();
    apply(&mut *intake, &id, value)?;
    show_delivery(intake, out);
    Ok(())
}

async fn commit<B: Backend + Clone, G: ConfirmationGate>(
    term: &mut Terminal<B>,
    gate: &mut G,
    out: &mut Vec<String>,
) -> Result<()> {
    let Some(intake) = term.intake.as_ref() else {
        out.push(NO_DELIVERY.to_string());
        return Ok(());
    };
    let prompt = format!(
        "Receive {} product(s) from {} for {}?",
        intake.lines().len(),
        intake.provider(),
        format_money(intake.total_cost())
    );
    if !gate.confirm(&prompt).await {
        out.push("Delivery kept open.".to_string());
        return Ok(());
    }
    let Some(intake) = term.intake.take() else {
        return Ok(());
    };

    let results = intake.commit(&term.ctx.backend).await?;
    let failed: Vec<_> = results.iter().filter(|r| !r.succeeded()).collect();
    if failed.is_empty() {
        out.push(format!("✅ Stock received for {} product(s).", results.len()));
    } else {
        out.push(format!(
            "⚠️ Stock received for {} of {} product(s).",
            results.len() - failed.len(),
            results.len()
        ));
        for result in failed {
            if let Err(e) = &result.outcome {
                out.push(format!("  {}: {e}", result.name));
            }
        }
    }
    Ok(())
}

async fn discard<B, G: ConfirmationGate>(
    term: &mut Terminal<B>,
    gate: &mut G,
    out: &mut Vec<String>,
) -> Result<()> {
    if term.intake.is_none() {
        out.push(NO_DELIVERY.to_string());
        return Ok(());
    }
    if gate.confirm("Discard the delivery?").await {
        term.intake = None;
        out.push("Delivery discarded.".to_string());
    }
    Ok(())
}
