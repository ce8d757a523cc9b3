use std::path::PathBuf;

use advanced_sdk::config::{load_config, SdkConfig};
use advanced_sdk::observability::logging::init_logging;
use advanced_sdk::{AdvancedSdk, Credential, Page, SdkError};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "advanced-sdk")]
#[command(about = "Command-line client for the user API", long_about = None)]
struct Cli {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides `api.base_url`
    #[arg(short, long, env = "SDK_BASE_URL")]
    base_url: Option<String>,

    /// Overrides `storage.token_file`
    #[arg(long, env = "SDK_TOKEN_FILE")]
    token_file: Option<String>,

    #[arg(short, long, env = "SDK_EMAIL")]
    email: String,

    #[arg(short, long, env = "SDK_PASSWORD", hide_env_values = true)]
    password: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate with email and password
    Auth,
    /// Exchange the refresh token for a new access token
    Refresh,
    /// Single user operations
    #[command(subcommand)]
    User(UserCommand),
    /// List and batch operations
    #[command(subcommand)]
    Users(UsersCommand),
}

#[derive(Subcommand)]
enum UserCommand {
    Get { id: String },
    /// Create a user from a JSON object
    Create { data: String },
    /// Update a user from a JSON object
    Update { id: String, data: String },
    Delete { id: String },
}

#[derive(Subcommand)]
enum UsersCommand {
    List(ListArgs),
    BatchGet {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Update users from a JSON array of objects with `id`
    BatchUpdate { data: String },
    BatchDelete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Args)]
struct ListArgs {
    #[arg(long, requires = "limit")]
    page: Option<u32>,

    #[arg(long, requires = "page")]
    limit: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SdkConfig::default(),
    };
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }
    if let Some(token_file) = cli.token_file {
        config.storage.token_file = Some(token_file);
    }

    init_logging(&config.observability)?;
    tracing::debug!(base_url = %config.api.base_url, "Configuration loaded");

    let sdk = AdvancedSdk::new(config, Credential::new(cli.email, cli.password))?;

    match run(&sdk, cli.command).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Some(body) = e.downcast_ref::<SdkError>().and_then(SdkError::body) {
                eprintln!("Response: {}", body);
            }
            std::process::exit(1);
        }
    }
}

async fn run(sdk: &AdvancedSdk, command: Commands) -> Result<Value, Box<dyn std::error::Error>> {
    let users = sdk.users();
    match command {
        Commands::Auth => {
            sdk.auth().authenticate().await?;
            Ok(token_summary(sdk))
        }
        Commands::Refresh => {
            if sdk.auth().refresh_token().is_none() {
                sdk.auth().authenticate().await?;
            }
            sdk.auth().refresh().await?;
            Ok(token_summary(sdk))
        }
        Commands::User(UserCommand::Get { id }) => Ok(users.get_user_by_id(id).await?),
        Commands::User(UserCommand::Create { data }) => {
            Ok(users.create_user(serde_json::from_str(&data)?).await?)
        }
        Commands::User(UserCommand::Update { id, data }) => {
            Ok(users.update_user(id, serde_json::from_str(&data)?).await?)
        }
        Commands::User(UserCommand::Delete { id }) => Ok(users.delete_user(id).await?),
        Commands::Users(UsersCommand::List(args)) => {
            let page = match (args.page, args.limit) {
                (Some(page), Some(limit)) => Some(Page::new(page, limit)),
                _ => None,
            };
            Ok(users.get_users(page).await?)
        }
        Commands::Users(UsersCommand::BatchGet { ids }) => Ok(users.get_users_batch(&ids).await?),
        Commands::Users(UsersCommand::BatchUpdate { data }) => {
            Ok(users.update_users_batch(serde_json::from_str(&data)?).await?)
        }
        Commands::Users(UsersCommand::BatchDelete { ids }) => {
            Ok(users.delete_users_batch(&ids).await?)
        }
    }
}

fn token_summary(sdk: &AdvancedSdk) -> Value {
    let tokens = sdk.auth().tokens();
    json!({
        "state": format!("{:?}", sdk.auth().state()),
        "expiresAt": tokens.access_token_expiry,
        "hasRefreshToken": tokens.refresh_token.is_some(),
    })
}
