//! Operator commands.

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;

use carechart_auth::password::{PasswordHasher, PasswordValidator};
use carechart_auth::{ClientOrigin, SecurityAudit};
use carechart_core::config::AppConfig;
use carechart_core::error::AppError;
use carechart_database::{DatabasePool, Stores};
use carechart_entity::account::{AccountRole, CreateAccount};
use carechart_entity::audit::{AuditAction, CreateAuditLogEntry};

/// Name recorded as the actor of operator commands.
const OPERATOR: &str = "cli";

/// CareChart clinical records server
#[derive(Debug, Parser)]
#[command(name = "carechart", version, about, long_about = None)]
pub struct Cli {
    /// Base configuration file (without extension)
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Environment overlay, loaded from `config/{env}.toml`
    #[arg(short, long, env = "CARECHART_ENV", default_value = "development")]
    pub env: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve,
    /// Apply pending database migrations
    Migrate,
    /// Create an administrator account
    CreateAdmin {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        display_name: Option<String>,
        /// Password (will prompt if not provided)
        #[arg(long)]
        password: Option<String>,
    },
    /// Clear the lockout of an account
    Unlock {
        username: String,
    },
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve => carechart_api::run_server(config).await,
            Commands::Migrate => migrate(&config).await,
            Commands::CreateAdmin {
                username,
                email,
                display_name,
                password,
            } => {
                create_admin(
                    &config,
                    username,
                    email.clone(),
                    display_name.clone(),
                    password.clone(),
                )
                .await
            }
            Commands::Unlock { username } => unlock(&config, username).await,
        }
    }
}

async fn migrate(config: &AppConfig) -> Result<(), AppError> {
    let db = DatabasePool::connect(&config.database).await?;
    println!("Running database migrations...");
    carechart_database::migration::run_migrations(db.pool()).await?;
    db.close().await;
    println!("All migrations applied successfully.");
    Ok(())
}

async fn create_admin(
    config: &AppConfig,
    username: &str,
    email: Option<String>,
    display_name: Option<String>,
    password: Option<String>,
) -> Result<(), AppError> {
    let password = match password {
        Some(p) => p,
        None => dialoguer::Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()
            .map_err(|e| AppError::internal(format!("Failed to read password: {e}")))?,
    };

    PasswordValidator::new(&config.auth).enforce(&password)?;
    let password_hash = PasswordHasher::new().hash_password(&password)?;

    let stores = Stores::from_config(&config.database).await?;
    let account = stores
        .accounts
        .create(&CreateAccount {
            username: username.trim().to_string(),
            email,
            password_hash,
            display_name,
            role: AccountRole::Admin,
            is_admin: true,
            must_change_password: false,
            created_by: None,
        })
        .await?;

    SecurityAudit::new(stores.audit.clone())
        .record(
            CreateAuditLogEntry::success(AuditAction::AccountCreate)
                .actor(None, Some(OPERATOR.to_string()))
                .target(account.id)
                .details(json!({ "username": account.username, "role": account.role })),
            &ClientOrigin::default(),
        )
        .await;

    info!(account_id = account.id, username = %account.username, "Administrator created");
    println!("Administrator '{}' created (id {}).", account.username, account.id);
    Ok(())
}

async fn unlock(config: &AppConfig, username: &str) -> Result<(), AppError> {
    let stores = Stores::from_config(&config.database).await?;
    let account = stores
        .accounts
        .find_by_username(username)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Account '{username}' not found")))?;

    let unlocked = stores.accounts.unlock(account.id).await?;

    SecurityAudit::new(stores.audit.clone())
        .record(
            CreateAuditLogEntry::success(AuditAction::AccountUnlock)
                .actor(None, Some(OPERATOR.to_string()))
                .target(account.id)
                .details(json!({
                    "was_locked": account.is_locked,
                    "failed_login_attempts": account.failed_login_attempts,
                })),
            &ClientOrigin::default(),
        )
        .await;

    info!(account_id = unlocked.id, "Account unlocked from the command line");
    println!("Account '{}' unlocked.", unlocked.username);
    Ok(())
}
