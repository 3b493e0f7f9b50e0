use std::sync::Arc;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use reelsync::{
    SyncContext, cli,
    config::{self, Settings},
    error,
    management::FileStore,
    navigation::TerminalNavigator,
    types::StatusKind,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Log in and persist the session
    Login(LoginOptions),

    /// Create an account and log in
    Register(RegisterOptions),

    /// Drop the session and cached lists
    Logout,

    /// Show the persisted session
    Whoami,

    /// Show the server-side profile
    Profile,

    /// Load lists and ratings from the server
    Sync,

    /// Show one movie's lists and rating
    Status(MovieOption),

    /// Show every list
    Library,

    /// Toggle a movie in a list (liked, watch-later, watched)
    Toggle(ToggleOptions),

    /// Toggle a movie in the liked list
    Like(MovieOption),

    /// Toggle a movie in the watch-later list
    #[clap(alias = "watchlist")]
    WatchLater(MovieOption),

    /// Toggle a movie in the watched list
    Watched(MovieOption),

    /// Rate a movie from 1 to 10
    Rate(RateOptions),

    /// Show the server's rating for a movie
    Rating(MovieOption),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct LoginOptions {
    username: String,
    /// Password (falls back to REELSYNC_PASSWORD)
    #[clap(long, env = "REELSYNC_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Parser, Debug, Clone)]
pub struct RegisterOptions {
    username: String,
    #[clap(long)]
    email: String,
    /// Password (falls back to REELSYNC_PASSWORD)
    #[clap(long, env = "REELSYNC_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Parser, Debug, Clone)]
pub struct MovieOption {
    movie_id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct ToggleOptions {
    kind: StatusKind,
    movie_id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct RateOptions {
    movie_id: String,
    rating: f64,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }
    init_tracing("warn");

    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    let settings = Settings::from_env();
    let storage = Arc::new(FileStore::open(settings.store_path.clone()));
    let ctx = match SyncContext::new(settings, storage, Arc::new(TerminalNavigator)) {
        Ok(ctx) => ctx,
        Err(e) => error!("Cannot set up client. Err: {}", e),
    };
    if let Err(e) = ctx.init().await {
        error!("Cannot read stored session. Err: {}", e);
    }

    match cli.command {
        Command::Login(opt) => cli::login(&ctx, opt.username, opt.password).await,
        Command::Register(opt) => {
            cli::register(&ctx, opt.username, opt.email, opt.password).await
        }
        Command::Logout => cli::logout(&ctx).await,
        Command::Whoami => cli::whoami(&ctx).await,
        Command::Profile => cli::profile(&ctx).await,
        Command::Sync => cli::sync(&ctx).await,
        Command::Status(opt) => cli::status(&ctx, opt.movie_id).await,
        Command::Library => cli::library(&ctx).await,
        Command::Toggle(opt) => cli::toggle(&ctx, opt.kind, opt.movie_id).await,
        Command::Like(opt) => cli::toggle(&ctx, StatusKind::Liked, opt.movie_id).await,
        Command::WatchLater(opt) => {
            cli::toggle(&ctx, StatusKind::WatchLater, opt.movie_id).await
        }
        Command::Watched(opt) => cli::toggle(&ctx, StatusKind::Watched, opt.movie_id).await,
        Command::Rate(opt) => cli::rate(&ctx, opt.movie_id, opt.rating).await,
        Command::Rating(opt) => cli::rating(&ctx, opt.movie_id).await,
        Command::Completions(_) => {}
    }
}

/// Logs go to stderr so they never mix with tables on stdout.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
