//! General commands - navigation, login, help and the dashboard.
//!
//! These work on every screen and are tried before the screen's own commands.

use crate::{
    backend::Backend,
    core::{cart::format_money, dashboard},
    errors::{Error, Result},
    terminal::{Screen, Terminal},
};
use tracing::info;

/// Shown whenever the login screen is entered.
pub const LOGIN_PROMPT: &str = "🔑 Log in with: <user or email> <password>";

/// Handles the commands available everywhere. Returns `false` if `command` is not one of them.
pub async fn handle<B: Backend + Clone>(
    term: &mut Terminal<B>,
    command: &str,
    args: &str,
    out: &mut Vec<String>,
) -> Result<bool> {
    match command.to_lowercase().as_str() {
        "go" => {
            let screen = Screen::from_path(args).ok_or_else(|| Error::NotFound {
                collection: "screens".to_string(),
                id: args.to_string(),
            })?;
            term.navigate(screen, out).await?;
        }
        "ayuda" | "help" => out.push(help_text(term.screen()).to_string()),
        "salir" | "logout" => {
            term.ctx.session.logout();
            term.reset_screens();
            out.push("✅ Logged out.".to_string());
            out.push(LOGIN_PROMPT.to_string());
        }
        "quit" | "exit" => {
            info!("Operator quit the terminal");
            term.stop();
        }
        _ => return Ok(false),
    }
    Ok(true)
}

/// Logs in with `<identity> <secret>` and opens the dashboard.
pub async fn login<B: Backend + Clone>(
    term: &mut Terminal<B>,
    line: &str,
    out: &mut Vec<String>,
) -> Result<()> {
    let mut words = line.split_whitespace();
    let (Some(identity), Some(secret), None) = (words.next(), words.next(), words.next()) else {
        return Err(Error::validation(["identity", "secret"]));
    };
    let user = term
        .ctx
        .session
        .login(&term.ctx.backend, identity, secret)
        .await?;
    out.push(format!("✅ Welcome, {}.", user.name));
    term.navigate(Screen::Dashboard, out).await
}

/// Prints the dashboard figures.
pub async fn dashboard<B: Backend + Clone>(
    term: &mut Terminal<B>,
    out: &mut Vec<String>,
) -> Result<()> {
    let user = term.ctx.session.require_user()?;
    let settings = &term.ctx.settings;
    let figures = dashboard::summary(
        &term.ctx.backend,
        settings.products_page_size,
        settings.low_stock_threshold,
    )
    .await?;

    out.push(format!("📊 Dashboard - {}", user.name));
    out.push(format!("  Products:        {}", figures.product_count));
    out.push(format!(
        "  Low stock (<{}): {}",
        settings.low_stock_threshold, figures.low_stock_count
    ));
    out.push(format!("  Units in stock:  {}", figures.units_in_stock));
    out.push(format!(
        "  Stock value:     {}",
        format_money(figures.stock_value)
    ));
    Ok(())
}

fn help_text(screen: Screen) -> &'static str {
    match screen {
        Screen::Login => {
            "**KioskoSmart**\n\
            • `<user> <password>` - Log in\n\
            • `quit` - Close the terminal"
        }
        Screen::Dashboard => {
            "**Dashboard**\n\
            • `ver` - Refresh the figures\n\
            • `go /productos | /inventario | /ventas` - Open a screen\n\
            • `salir` - Log out"
        }
        Screen::Productos => {
            "**Productos**\n\
            • `ver [page]` - List products\n\
            • `buscar <text>` - Search by name\n\
            • `nuevo <barcode>; <name>; <price>; <stock>[; <cost>]` - Add a product\n\
            • `editar <row> <field>=<value> ...` - Fields: nombre, codigo, precio, stock, costo\n\
            • `borrar <row>` - Delete a product"
        }
        Screen::Inventario => {
            "**Inventario**\n\
            • `ver` - Stock levels, ⚠️ marks low stock\n\
            • `ajustar <row> <stock>` - Correct a product's stock\n\
            • `entrada <provider>` - Start receiving a delivery\n\
            • `<code>` or `lote <code> <code> ...` - Add to the delivery\n\
            • `cant <line> <units>`, `costo <line> <amount>`, `quitar <line>` - Edit the delivery\n\
            • `guardar` / `descartar` - Commit or drop the delivery"
        }
        Screen::Ventas => {
            "**Ventas**\n\
            • `<barcode>` - Scan a product\n\
            • `buscar <text>` - Add by name\n\
            • `cant <line> <units>` - Change a quantity (0 removes)\n\
            • `quitar <line>` - Remove a line\n\
            • `f` - Finalize the sale\n\
            • `c` - Cancel the sale"
        }
    }
}
