//! Terminal front end - screens, navigation and command dispatch.
//!
//! The operator works one screen at a time. Every input line goes to [`Terminal::handle_line`],
//! which routes it to the current screen's commands and returns the lines to print. Failures
//! are turned into banners there and never leave the screen.

/// Screen commands (general, products, inventory, sales)
pub mod commands;
/// Stdin/stdout driver
pub mod console;

pub use console::{Console, run_terminal};

use crate::{
    backend::Backend,
    config::RegisterSettings,
    core::{
        ConfirmationGate, Product, SalesRegister,
        inventory::StockIntake,
        scanner::{Focus, KeyEvent, ScanAccumulator},
    },
    errors::{Error, Result},
    session::{Session, SessionContext},
};
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Everything a screen needs from the outside world.
#[derive(Clone, Debug)]
pub struct AppContext<B> {
    /// Data/auth store
    pub backend: B,
    /// Shared operator session
    pub session: SessionContext,
    /// Register tuning from config.toml
    pub settings: RegisterSettings,
}

/// Screens reachable with `go <path>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    /// Credentials entry
    Login,
    /// Headline figures
    Dashboard,
    /// Catalog management
    Productos,
    /// Stock levels and deliveries
    Inventario,
    /// Sales register
    Ventas,
}

impl Screen {
    /// Resolves a navigation path; the leading slash is optional.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim().trim_start_matches('/').to_lowercase().as_str() {
            "" | "login" => Some(Self::Login),
            "dashboard" => Some(Self::Dashboard),
            "productos" => Some(Self::Productos),
            "inventario" => Some(Self::Inventario),
            "ventas" => Some(Self::Ventas),
            _ => None,
        }
    }

    /// Canonical path.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
            Self::Productos => "/productos",
            Self::Inventario => "/inventario",
            Self::Ventas => "/ventas",
        }
    }

    /// Every screen except login needs a logged-in operator.
    #[must_use]
    pub const fn requires_session(self) -> bool {
        !matches!(self, Self::Login)
    }
}

/// One operator's terminal: current screen plus the per-screen state.
#[derive(Debug)]
pub struct Terminal<B> {
    pub(crate) ctx: AppContext<B>,
    pub(crate) screen: Screen,
    pub(crate) register: Option<SalesRegister<B>>,
    pub(crate) intake: Option<StockIntake>,
    pub(crate) scanner: ScanAccumulator,
    /// Products of the last listing, addressed by row number
    pub(crate) rows: Vec<Product>,
    session_rx: watch::Receiver<Session>,
    running: bool,
}

impl<B: Backend + Clone> Terminal<B> {
    /// Terminal on the login screen.
    #[must_use]
    pub fn new(ctx: AppContext<B>) -> Self {
        let session_rx = ctx.session.subscribe();
        let scanner = ScanAccumulator::new(ctx.settings.scanner_gap());
        Self {
            ctx,
            screen: Screen::Login,
            register: None,
            intake: None,
            scanner,
            rows: Vec::new(),
            session_rx,
            running: true,
        }
    }

    /// Screen currently shown.
    #[must_use]
    pub const fn screen(&self) -> Screen {
        self.screen
    }

    /// Whether the operator has not asked to quit.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// The open sales register, if the ventas screen was visited.
    #[must_use]
    pub const fn register(&self) -> Option<&SalesRegister<B>> {
        self.register.as_ref()
    }

    /// The open receiving list, if any.
    #[must_use]
    pub const fn intake(&self) -> Option<&StockIntake> {
        self.intake.as_ref()
    }

    pub(crate) fn stop(&mut self) {
        self.running = false;
    }

    /// Handles one input line and returns what to print.
    pub async fn handle_line<G: ConfirmationGate>(
        &mut self,
        line: &str,
        gate: &mut G,
    ) -> Vec<String> {
        let mut out = Vec::new();
        self.follow_session(&mut out);

        if let Err(e) = self.dispatch(line, gate, &mut out).await {
            debug!(error = %e, screen = self.screen.path(), "Command failed");
            out.push(banner(&e));
        }
        out
    }

    /// Feeds one keystroke from a raw key source.
    ///
    /// On the ventas screen a completed burst is scanned into the cart; elsewhere keys go to
    /// manual entry and are ignored here. Returns what to print.
    pub async fn handle_key(&mut self, key: KeyEvent, at: Instant) -> Vec<String> {
        let focus = if self.screen == Screen::Ventas {
            Focus::Scanner
        } else {
            Focus::ManualEntry
        };
        let Some(code) = self.scanner.feed(key, at, focus) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        self.follow_session(&mut out);
        if let Err(e) = commands::sales::scan(self, &code, &mut out).await {
            out.push(banner(&e));
        }
        out
    }

    async fn dispatch<G: ConfirmationGate>(
        &mut self,
        line: &str,
        gate: &mut G,
        out: &mut Vec<String>,
    ) -> Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }
        let (command, args) = split_command(line);

        // A scanned code wins over a command word that happens to spell it.
        if self.screen == Screen::Ventas
            && args.is_empty()
            && commands::sales::is_known_code(self, line)
        {
            return commands::sales::scan(self, line, out).await;
        }
        if commands::general::handle(self, command, args, out).await? {
            return Ok(());
        }
        if self.screen.requires_session() {
            self.ctx.session.require_user()?;
        }

        match self.screen {
            Screen::Login => commands::general::login(self, line, out).await,
            Screen::Dashboard => commands::general::dashboard(self, out).await,
            Screen::Productos => commands::product::handle(self, command, args, gate, out).await,
            Screen::Inventario => {
                commands::inventory::handle(self, command, args, line, gate, out).await
            }
            Screen::Ventas => commands::sales::handle(self, command, args, line, gate, out).await,
        }
    }

    /// Switches screens, entering the new one.
    pub(crate) async fn navigate(&mut self, screen: Screen, out: &mut Vec<String>) -> Result<()> {
        if screen.requires_session() && !self.ctx.session.is_valid() {
            warn!(path = screen.path(), "Navigation without a session");
            self.screen = Screen::Login;
            out.push(commands::general::LOGIN_PROMPT.to_string());
            return Err(Error::Unauthenticated);
        }
        info!(from = self.screen.path(), to = screen.path(), "Navigating");
        self.screen = screen;
        self.scanner.reset();
        self.rows.clear();

        match screen {
            Screen::Login => out.push(commands::general::LOGIN_PROMPT.to_string()),
            Screen::Dashboard => commands::general::dashboard(self, out).await?,
            Screen::Productos => commands::product::list(self, 1, out).await?,
            Screen::Inventario => commands::inventory::show(self, out).await?,
            Screen::Ventas => commands::sales::enter(self, out).await,
        }
        Ok(())
    }

    /// Drops per-screen state once the session ends elsewhere.
    fn follow_session(&mut self, out: &mut Vec<String>) {
        if !self.session_rx.has_changed().unwrap_or(false) {
            return;
        }
        let valid = self.session_rx.borrow_and_update().is_valid();
        if !valid && self.screen.requires_session() {
            self.reset_screens();
            out.push("⚠️ Session ended.".to_string());
            out.push(commands::general::LOGIN_PROMPT.to_string());
        }
    }

    pub(crate) fn reset_screens(&mut self) {
        self.register = None;
        self.intake = None;
        self.rows.clear();
        self.scanner.reset();
        self.screen = Screen::Login;
    }
}

/// Splits `"cmd rest of line"` into the lowercase command word and the trimmed rest.
fn split_command(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((command, args)) => (command, args.trim()),
        None => (line, ""),
    }
}

/// One-line message for a failed command.
#[must_use]
pub fn banner(error: &Error) -> String {
    match error {
        Error::Network(_) | Error::Database(_) => {
            format!("❌ {error}. Check the connection and try again.")
        }
        Error::NotFound { .. } | Error::InsufficientStock { .. } | Error::StockConflict { .. } => {
            format!("⚠️ {error}")
        }
        _ => format!("❌ {error}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{backend::SeaOrmBackend, core::AutoConfirm, test_utils::*};
    use std::time::Duration;

    pub(crate) async fn logged_in_terminal() -> Result<Terminal<SeaOrmBackend>> {
        init_test_tracing();
        let backend = setup_backend().await?;
        seed_sample_catalog(&backend).await?;
        backend
            .register_user("caja1", "caja1@kiosko.local", "Caja Uno", "secreto")
            .await?;
        let ctx = AppContext {
            backend,
            session: SessionContext::new(),
            settings: RegisterSettings::default(),
        };
        let mut terminal = Terminal::new(ctx);
        terminal
            .handle_line("caja1 secreto", &mut AutoConfirm(true))
            .await;
        Ok(terminal)
    }

    #[test]
    fn test_screen_paths() {
        assert_eq!(Screen::from_path("/ventas"), Some(Screen::Ventas));
        assert_eq!(Screen::from_path("Inventario"), Some(Screen::Inventario));
        assert_eq!(Screen::from_path("/"), Some(Screen::Login));
        assert_eq!(Screen::from_path("/reportes"), None);
        assert_eq!(Screen::Productos.path(), "/productos");
        assert!(!Screen::Login.requires_session());
    }

    #[test]
    fn test_split_command() {
        assert_eq!(split_command("buscar  coca cola "), ("buscar", "coca cola"));
        assert_eq!(split_command("f"), ("f", ""));
    }

    #[tokio::test]
    async fn test_screens_require_session() -> Result<()> {
        let backend = setup_backend().await?;
        let ctx = AppContext {
            backend,
            session: SessionContext::new(),
            settings: RegisterSettings::default(),
        };
        let mut terminal = Terminal::new(ctx);
        let out = terminal
            .handle_line("go /ventas", &mut AutoConfirm(true))
            .await;
        assert_eq!(terminal.screen(), Screen::Login);
        assert!(out.iter().any(|l| l.contains("No active session")));
        Ok(())
    }

    #[tokio::test]
    async fn test_logout_elsewhere_returns_to_login() -> Result<()> {
        let mut terminal = logged_in_terminal().await?;
        assert_eq!(terminal.screen(), Screen::Dashboard);
        terminal
            .handle_line("go ventas", &mut AutoConfirm(true))
            .await;
        assert!(terminal.register().is_some());

        // Another screen holding a clone of the session logs out.
        let other = terminal.ctx.session.clone();
        other.logout();

        let out = terminal.handle_line("12345", &mut AutoConfirm(true)).await;
        assert!(out.iter().any(|l| l.contains("Session ended")));
        assert_eq!(terminal.screen(), Screen::Login);
        assert!(terminal.register().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_key_burst_scans_on_ventas() -> Result<()> {
        let mut terminal = logged_in_terminal().await?;
        terminal
            .handle_line("go ventas", &mut AutoConfirm(true))
            .await;

        let start = Instant::now();
        let step = Duration::from_millis(5);
        let mut at = start;
        for c in "12345".chars() {
            assert!(terminal.handle_key(KeyEvent::Char(c), at).await.is_empty());
            at += step;
        }
        let out = terminal.handle_key(KeyEvent::Enter, at).await;
        assert!(out.iter().any(|l| l.contains("Coca Cola 600ml")));
        assert_eq!(terminal.register().map(|r| r.cart().len()), Some(1));

        // Slow typing never completes a scan.
        for c in "67890".chars() {
            at += Duration::from_millis(200);
            terminal.handle_key(KeyEvent::Char(c), at).await;
        }
        at += Duration::from_millis(200);
        assert!(terminal.handle_key(KeyEvent::Enter, at).await.is_empty());
        Ok(())
    }

    #[test]
    fn test_banner_levels() {
        assert!(banner(&Error::Network("down".to_string())).starts_with("❌"));
        assert!(banner(&Error::StockConflict {
            product: "x".to_string()
        })
        .starts_with("⚠️"));
    }
}
