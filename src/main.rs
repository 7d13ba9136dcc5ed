use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use daily_kanban::auth::{validate_login, validate_registration, AuthClient, Session};
use daily_kanban::config::Config;
use daily_kanban::kanban_board::{KanbanBoard, SystemClock};
use daily_kanban::schedule::ResetTicker;
use daily_kanban::store::FileStore;
use daily_kanban::ui::{self, BoardView};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Daily Kanban board that resets itself every morning.
#[derive(Parser)]
#[command(name = "daily-kanban", version, about)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Storage file (overrides config and environment).
    #[arg(long)]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and keep the session token.
    Login {
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Create a new account.
    Register,
    /// Forget the session token.
    Logout,
    /// Open the board (default).
    Board,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(storage) = cli.storage {
        config.storage_path = storage;
    }
    init_logging(&config.log_path)?;

    match cli.command.unwrap_or(Command::Board) {
        Command::Login { email } => login(&config, email),
        Command::Register => register(&config),
        Command::Logout => {
            Session::new(FileStore::new(&config.storage_path)).sign_out()?;
            println!("Logged out.");
            Ok(())
        }
        Command::Board => open_board(&config),
    }
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("daily_kanban=info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn prompt(message: &str) -> io::Result<String> {
    print!("{message}: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn login(config: &Config, email: Option<String>) -> anyhow::Result<()> {
    let mut session = Session::new(FileStore::new(&config.storage_path));
    if session.is_authenticated() {
        println!("Already logged in. Run `daily-kanban` to open the board.");
        return Ok(());
    }

    let email = match email {
        Some(email) => email,
        None => prompt("Email")?,
    };
    let password = rpassword::prompt_password("Password: ")?;
    let request = validate_login(&email, &password)?;

    let response = AuthClient::new(&config.api_base_url).login(&request)?;
    session.sign_in(&response.access_token)?;
    info!("logged in as {}", request.email);
    println!("Logged in successfully.");
    Ok(())
}

fn register(config: &Config) -> anyhow::Result<()> {
    let name = prompt("Name")?;
    let email = prompt("Email")?;
    let password = rpassword::prompt_password("Password: ")?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    let request = validate_registration(&name, &email, &password, &confirm)?;

    let user = AuthClient::new(&config.api_base_url).register(&request)?;
    info!("registered user {}", user.id);
    println!("Account created for {}. Run `daily-kanban login` to sign in.", user.email);
    Ok(())
}

fn open_board(config: &Config) -> anyhow::Result<()> {
    let session = Session::new(FileStore::new(&config.storage_path));
    if !session.is_authenticated() {
        anyhow::bail!("not logged in; run `daily-kanban login` first");
    }

    let board = KanbanBoard::load(FileStore::new(&config.storage_path), SystemClock);
    let mut view = BoardView::new(board);
    let mut ticker = ResetTicker::new(config.reset_check_interval(), Instant::now());

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run_app(&mut terminal, &mut view, &mut ticker);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result?;
    Ok(())
}
