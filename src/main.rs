
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use quizzapp::backend::{self, BackendError, config::BackendConfig};
use quizzapp::services::auth::{AuthGateway, IdentityGateway};
use quizzapp::session::SessionStore;
use quizzapp::state::auth::{AuthController, AuthViewState};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("identity backend setup failed: {0}")]
    Backend(#[from] BackendError),
    #[error("missing password; pass --password, set QUIZZAPP_PASSWORD, or type it on stdin")]
    MissingPassword,
    #[error("failed to read stdin: {0}")]
    Io(#[from] io::Error),
    #[error("auth request task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("{0}")]
    AuthFailed(String),
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "quizzapp", about = "Sign in to the quiz app from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in to an existing account.
    Login(CredentialArgs),
    /// Create an account and sign in.
    Register(CredentialArgs),
}

#[derive(Args, Debug)]
struct CredentialArgs {
    #[arg(long, env = "QUIZZAPP_EMAIL", default_value = "")]
    email: String,

    #[arg(long, env = "QUIZZAPP_PASSWORD", hide_env_values = true, help = "Read from stdin when absent")]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = BackendConfig::from_env()?;
    let backend = backend::connect(&config, SessionStore::new())?;
    let gateway: Arc<dyn AuthGateway> = Arc::new(IdentityGateway::new(backend));
    let controller = AuthController::new(gateway);

    // Sessions live in process memory, so the signed-in user is reported
    // by the same run that signed in.
    match cli.command {
        Command::Login(args) => run_flow(&controller, args, AuthController::login).await,
        Command::Register(args) => run_flow(&controller, args, AuthController::register).await,
    }
}

async fn run_flow(
    controller: &AuthController,
    args: CredentialArgs,
    submit: fn(&AuthController) -> Option<JoinHandle<()>>,
) -> Result<(), CliError> {
    let password = match args.password {
        Some(password) => password,
        None => read_password()?,
    };
    controller.on_email_change(args.email);
    controller.on_password_change(password);

    let mut rx = controller.subscribe();
    let handle = submit(controller);
    render(&rx.borrow_and_update());

    if let Some(handle) = handle {
        handle.await?;
        render(&rx.borrow_and_update());
    }

    if let Some(error) = controller.snapshot().error {
        return Err(CliError::AuthFailed(error));
    }
    print_current_user(controller)
}

fn read_password() -> Result<String, CliError> {
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Err(CliError::MissingPassword);
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

fn render(state: &AuthViewState) {
    if state.is_loading {
        println!("working...");
    } else if let Some(error) = &state.error {
        println!("error: {error}");
    } else if state.success {
        println!("signed in");
    }
}

fn print_current_user(controller: &AuthController) -> Result<(), CliError> {
    match controller.current_user() {
        Some(user) => println!("{}", serde_json::to_string_pretty(&user)?),
        None => println!("not signed in"),
    }
    Ok(())
}
