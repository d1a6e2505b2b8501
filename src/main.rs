use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use crowdfund_client::config::{self, ClientConfig, ConfigError};
use crowdfund_client::net::api::ApiClient;
use crowdfund_client::net::cookies::{CookieFileError, CookieJar};
use crowdfund_client::net::transport::{ReqwestTransport, TransportError};
use crowdfund_client::pages::dashboard::DashboardPage;
use crowdfund_client::pages::login::{LoginForm, LoginPage};
use crowdfund_client::pages::signup::{SignupForm, SignupPage};
use crowdfund_client::routes::Route;
use crowdfund_client::shell::TerminalShell;
use crowdfund_client::state::session::SessionStore;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cookie file: {0}")]
    Cookies(#[from] CookieFileError),
    #[error("http client setup failed: {0}")]
    Transport(#[from] TransportError),
    #[error("password prompt failed: {0}")]
    Prompt(#[from] io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("backend base URL could not be resolved from {0}/api/config")]
    Unconfigured(String),
    #[error("not signed in; run `crowdfund login` first")]
    NotSignedIn,
    #[error("{0} failed")]
    Rejected(&'static str),
}

#[derive(Parser, Debug)]
#[command(name = "crowdfund", about = "Terminal client for the crowdfund points marketplace")]
struct Cli {
    /// Front-end origin serving `/api/config` (overrides CROWDFUND_ORIGIN).
    #[arg(long)]
    origin: Option<String>,

    /// Backend base URL; skips the runtime config fetch (overrides CROWDFUND_API_BASE_URL).
    #[arg(long)]
    api_base_url: Option<String>,

    /// Where session cookies persist between runs (overrides CROWDFUND_COOKIE_FILE).
    #[arg(long)]
    cookie_file: Option<PathBuf>,

    /// Log verbosity: -v for info, -vv for debug.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and show the dashboard route.
    Login(LoginArgs),
    /// Create an account and sign in with it.
    Signup(SignupArgs),
    /// End the session and clear local cookies.
    Logout,
    /// Print the signed-in user as JSON.
    Me,
    /// Show the profile card and point catalog.
    Dashboard,
    /// Print the point catalog as JSON.
    Items,
    /// Search the marketplace proxy.
    Search {
        keyword: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Navigate to a route and report where the session guard leaves you.
    Visit { route: Route },
}

#[derive(Args, Debug)]
struct LoginArgs {
    username: String,
    #[arg(long, env = "CROWDFUND_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Args, Debug)]
struct SignupArgs {
    username: String,
    #[arg(long)]
    email: String,
    /// Display name.
    #[arg(long)]
    name: String,
    #[arg(long, env = "CROWDFUND_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = resolve_config(&cli)?;
    let cookies = Arc::new(CookieJar::load(&config.cookie_file)?);
    let transport = Arc::new(ReqwestTransport::new(cookies.clone(), &config.user_agent)?);
    let api = Arc::new(ApiClient::new(transport, cookies.clone(), config.origin.clone()));
    if let Some(base) = config.api_base_url.clone() {
        api.set_base_url(base);
    }

    let shell = Arc::new(TerminalShell::new(initial_route(&cli.command)));
    let store = SessionStore::new(api, shell.clone(), shell);

    let result = run(&store, cli.command).await;

    if let Err(e) = cookies.save(&config.cookie_file) {
        tracing::error!(error = %e, path = %config.cookie_file.display(), "failed to persist cookies");
    }
    result
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt().with_max_level(level).with_writer(io::stderr).init();
}

fn resolve_config(cli: &Cli) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(origin) = &cli.origin {
        config.origin = config::parse_url("--origin", origin)?;
    }
    if let Some(base) = &cli.api_base_url {
        config.api_base_url = Some(config::parse_url("--api-base-url", base)?);
    }
    if let Some(path) = &cli.cookie_file {
        config.cookie_file.clone_from(path);
    }
    Ok(config)
}

fn initial_route(command: &Command) -> Route {
    match command {
        Command::Login(_) | Command::Logout => Route::Login,
        Command::Signup(_) => Route::Signup,
        Command::Visit { route } => route.clone(),
        Command::Me | Command::Dashboard | Command::Items | Command::Search { .. } => Route::Dashboard,
    }
}

fn password(arg: Option<String>) -> Result<String, CliError> {
    match arg {
        Some(p) => Ok(p),
        None => Ok(rpassword::prompt_password("Password: ")?),
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

async fn run(store: &SessionStore, command: Command) -> Result<(), CliError> {
    let route = initial_route(&command);
    let redirect = store.start(&route).await;
    if !store.api().is_ready() {
        return Err(CliError::Unconfigured(store.api().origin().as_str().trim_end_matches('/').to_owned()));
    }
    if requires_session(&command) {
        guard(redirect)?;
    }

    match command {
        Command::Login(args) => {
            let form = LoginForm::new(args.username, password(args.password)?);
            let page = LoginPage::new(store);
            page.on_load().await;
            if !page.submit(&form).await {
                return Err(CliError::Rejected("login"));
            }
            Ok(())
        }
        Command::Signup(args) => {
            let form = SignupForm {
                password: password(args.password)?,
                username: args.username,
                name: args.name,
                email: args.email,
            };
            if !SignupPage::new(store).submit(&form).await {
                return Err(CliError::Rejected("signup"));
            }
            Ok(())
        }
        Command::Logout => {
            store.logout().await;
            Ok(())
        }
        Command::Me => {
            let user = store.user().await.ok_or(CliError::NotSignedIn)?;
            println!("{}", serde_json::to_string_pretty(&user)?);
            Ok(())
        }
        Command::Dashboard => {
            let mut page = DashboardPage::new(store);
            page.load().await;
            print!("{}", page.view().await);
            Ok(())
        }
        Command::Items => {
            let mut page = DashboardPage::new(store);
            page.load().await;
            println!("{}", serde_json::to_string_pretty(page.items())?);
            Ok(())
        }
        Command::Search { keyword, page: n } => {
            if keyword.trim().is_empty() {
                return Ok(());
            }
            let mut page = DashboardPage::new(store);
            if !page.search(&keyword, n).await {
                return Err(CliError::Rejected("search"));
            }
            print!("{}", page.view().await);
            Ok(())
        }
        Command::Visit { .. } => {
            println!("{}", store.navigator().current());
            Ok(())
        }
    }
}

/// Commands that act on the signed-in user.
fn requires_session(command: &Command) -> bool {
    matches!(command, Command::Me | Command::Dashboard | Command::Items | Command::Search { .. })
}

/// Protected commands stop once the session guard has sent us to `/login`.
fn guard(redirect: Option<Route>) -> Result<(), CliError> {
    match redirect {
        Some(_) => Err(CliError::NotSignedIn),
        None => Ok(()),
    }
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
