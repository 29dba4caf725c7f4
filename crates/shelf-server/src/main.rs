use anyhow::Context;
use clap::{Parser, Subcommand};
use shelf_core::{RegistrationForm, ShelfConfig};
use shelf_store::Database;
use shelf_web::ShelfServer;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "shelf", version, about = "Shelf product catalogue")]
struct Cli {
    /// Path to shelf.yaml. Defaults are used when the file does not exist.
    #[arg(long, global = true, env = "SHELF_CONFIG", default_value = "shelf.yaml")]
    config: PathBuf,

    /// Database URL, overriding `database.url`.
    #[arg(long, global = true, env = "SHELF_DATABASE_URL")]
    database_url: Option<String>,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web server.
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },

    /// Apply database migrations and exit.
    Migrate,

    /// Create an account from the command line.
    CreateUser {
        username: String,

        #[arg(long, env = "SHELF_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .context("invalid --log-level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = load_config(&cli.config)?;
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }

    match cli.cmd {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let db = open_database(&config).await?;
            ShelfServer::new(config, db).run().await?;
        }

        Command::Migrate => {
            let db = open_database(&config).await?;
            db.close().await;
            println!("Migrations applied to {}", config.database.url);
        }

        Command::CreateUser { username, password } => {
            let db = open_database(&config).await?;
            run_create_user(&db, username, password).await?;
            db.close().await;
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<ShelfConfig> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "No config file, using defaults");
    }
    ShelfConfig::load_or_default(path)
        .with_context(|| format!("failed to load config from {}", path.display()))
}

async fn open_database(config: &ShelfConfig) -> anyhow::Result<Database> {
    let db = Database::connect(&config.database)
        .await
        .with_context(|| format!("failed to open {}", config.database.url))?;
    db.migrate().await.context("failed to apply migrations")?;
    Ok(db)
}

async fn run_create_user(db: &Database, username: String, password: String) -> anyhow::Result<()> {
    let form = RegistrationForm {
        username,
        password1: password.clone(),
        password2: password,
        csrf_token: String::new(),
    };

    let account = match form.validate() {
        Ok(account) => account,
        Err(errors) => {
            let problems: Vec<String> = ["username", "password1", "password2"]
                .iter()
                .flat_map(|field| errors.field(field).iter().map(move |m| format!("{field}: {m}")))
                .collect();
            anyhow::bail!("invalid account: {}", problems.join("; "));
        }
    };

    let user = db.create_user(&account).await?;
    println!("Created user '{}' (id {})", user.username, user.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_flags_parse() {
        let cli = Cli::try_parse_from([
            "shelf", "serve", "--host", "0.0.0.0", "--port", "9000", "--config", "x.yaml",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("x.yaml"));
        match cli.cmd {
            Command::Serve { host, port } => {
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(9000));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn missing_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config.server.port, 8000);
    }

    #[tokio::test]
    async fn create_user_rejects_weak_password() {
        let db = Database::in_memory().await.unwrap();
        let err = run_create_user(&db, "carol".to_string(), "123".to_string())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("password2"));
        assert_eq!(db.count_users().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn create_user_stores_account() {
        let db = Database::in_memory().await.unwrap();
        run_create_user(&db, "carol".to_string(), "tr0ub4dor&3".to_string())
            .await
            .unwrap();
        assert!(db.find_user_by_username("carol").await.unwrap().is_some());
    }
}
