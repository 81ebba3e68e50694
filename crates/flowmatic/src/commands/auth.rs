//! Auth command - session management.

use std::io::Write;

use anyhow::{Result, anyhow};
use clap::{Args, Subcommand};
use flowmatic_session::{RegisterOutcome, SessionManager};

use super::Context;

/// Arguments for the auth command.
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Sign in with email and password
    Login(CredentialArgs),

    /// Create an account
    Register(CredentialArgs),

    /// Sign out and clear the stored session
    Logout,

    /// Show the stored session
    Status,

    /// Exchange the refresh token for new tokens
    Refresh,
}

/// Credentials; anything not given is prompted for.
#[derive(Args, Debug)]
pub struct CredentialArgs {
    /// Account email
    #[arg(short, long)]
    pub email: Option<String>,

    /// Account password (prompted without echo when omitted)
    #[arg(long, env = "FLOWMATIC_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Run the auth command.
pub async fn run(args: AuthArgs, ctx: &Context) -> Result<()> {
    match args.command {
        AuthCommand::Login(creds) => cmd_login(creds, ctx).await,
        AuthCommand::Register(creds) => cmd_register(creds, ctx).await,
        AuthCommand::Logout => cmd_logout(ctx).await,
        AuthCommand::Status => cmd_status(ctx),
        AuthCommand::Refresh => cmd_refresh(ctx).await,
    }
}

async fn cmd_login(creds: CredentialArgs, ctx: &Context) -> Result<()> {
    let session = ctx.online_session()?;

    let state = session.state();
    if state.is_authenticated
        && let Some(user) = &state.user
        && let Some(info) = session.token_info()
    {
        println!(
            "Already signed in as {} (expires in {})",
            user.email,
            info.expires_in_display()
        );
        println!("Run 'flowmatic auth logout' first to switch accounts.");
        return Ok(());
    }

    let (email, password) = read_credentials(creds)?;
    match session.login(&email, &password).await {
        Ok(user) => {
            if ctx.json_output {
                println!("{}", serde_json::to_string_pretty(&session.state())?);
            } else {
                println!("Signed in as {}", user.email);
                if let Some(info) = session.token_info() {
                    println!("Token expires in: {}", info.expires_in_display());
                }
            }
            Ok(())
        }
        Err(_) => Err(session_error(&session)),
    }
}

async fn cmd_register(creds: CredentialArgs, ctx: &Context) -> Result<()> {
    let session = ctx.online_session()?;
    let (email, password) = read_credentials(creds)?;

    match session.register(&email, &password).await {
        Ok(RegisterOutcome::Authenticated(user)) => {
            println!("Account created. Signed in as {}", user.email);
            Ok(())
        }
        Ok(RegisterOutcome::ConfirmationRequired { email }) => {
            println!("Account created. Check {} for a confirmation link,", email);
            println!("then run 'flowmatic auth login'.");
            Ok(())
        }
        Err(_) => Err(session_error(&session)),
    }
}

async fn cmd_logout(ctx: &Context) -> Result<()> {
    let session = ctx.session()?;
    let was_signed_in = session.state().is_authenticated;

    session.logout().await;

    if was_signed_in {
        println!("Signed out.");
    } else {
        println!("No stored session found.");
    }
    Ok(())
}

fn cmd_status(ctx: &Context) -> Result<()> {
    let session = ctx.session()?;
    let state = session.state();

    if ctx.json_output {
        let info = session.token_info();
        let status = serde_json::json!({
            "authenticated": state.is_authenticated,
            "user": state.user,
            "expiresAt": info.as_ref().and_then(|i| i.expires_at),
            "minutesRemaining": info.as_ref().map(|i| i.minutes_remaining()),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("Authentication Status");
    println!("---------------------");

    match (&state.user, session.token_info()) {
        (Some(user), Some(info)) if state.is_authenticated => {
            println!("Signed in as: {}", user.email);
            if let Some(name) = &user.name {
                println!("  Name: {}", name);
            }
            if let Some(role) = &user.role {
                println!("  Role: {}", role);
            }
            println!("  Expires: {}", info.expires_in_display());
            if ctx.verbose
                && let Some(at) = info.expires_at
            {
                println!("  Expires at: {}", at.to_rfc3339());
            }
        }
        _ => {
            println!("Not signed in");
            println!("  Run 'flowmatic auth login' to sign in");
        }
    }

    Ok(())
}

async fn cmd_refresh(ctx: &Context) -> Result<()> {
    let session = ctx.online_session()?;
    if !session.state().is_authenticated {
        return Err(anyhow!("Not signed in. Run 'flowmatic auth login' first."));
    }

    match session.refresh().await {
        Ok(_) => {
            if let Some(info) = session.token_info() {
                println!("Tokens refreshed (expires in {})", info.expires_in_display());
            }
            Ok(())
        }
        Err(_) => Err(session_error(&session)),
    }
}

/// The message the session manager recorded for the last failure.
fn session_error(session: &SessionManager) -> anyhow::Error {
    let message = session
        .state()
        .error
        .unwrap_or_else(|| flowmatic_session::error::FALLBACK_MESSAGE.to_string());
    anyhow!(message)
}

fn read_credentials(creds: CredentialArgs) -> Result<(String, String)> {
    let email = match creds.email {
        Some(email) => email,
        None => {
            print!("Email: ");
            std::io::stdout().flush()?;
            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;
            input.trim().to_string()
        }
    };
    if email.is_empty() {
        return Err(anyhow!("Email is required"));
    }

    let password = match creds.password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ")?,
    };
    if password.is_empty() {
        return Err(anyhow!("Password is required"));
    }

    Ok((email, password))
}
