pub mod api;
pub mod config;
pub mod constants;
pub mod db;
pub mod entities;
pub mod services;
pub mod state;

use tokio::signal;

use anyhow::Context;
pub use config::Config;
use db::Store;
use entities::enums::Role;
use services::{AuthService, Identity, SeaOrmAuthService};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let (layer, task) = tracing_loki::builder()
            .label("app", "solardesk")?
            .extra_field("env", "production")?
            .build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        None | Some("serve" | "-d" | "--daemon") => run_server(config, prometheus_handle).await,

        Some("init" | "--init") => {
            Config::create_default_if_missing()?;
            println!("✓ Config file created. Edit config.toml and run again.");
            Ok(())
        }

        Some("user") => {
            let Some(subcommand) = args.get(2) else {
                println!("Usage: solardesk user <subcommand>");
                println!("Subcommands:");
                println!("  add <username> <password> [admin|staff]   Provision an account");
                println!("  list                                      List accounts");
                println!("  unlock <username>                         Clear a lockout");
                return Ok(());
            };

            match subcommand.as_str() {
                "add" => {
                    let (Some(username), Some(password)) = (args.get(3), args.get(4)) else {
                        println!("Usage: solardesk user add <username> <password> [admin|staff]");
                        return Ok(());
                    };
                    let role = match args.get(5).map(String::as_str) {
                        Some("admin") => Role::Admin,
                        None | Some("staff") => Role::Staff,
                        Some(other) => {
                            println!("Unknown role: {other} (expected admin or staff)");
                            return Ok(());
                        }
                    };
                    cmd_user_add(&config, username, password, role).await
                }
                "list" | "ls" => cmd_user_list(&config).await,
                "unlock" => {
                    let Some(username) = args.get(3) else {
                        println!("Usage: solardesk user unlock <username>");
                        return Ok(());
                    };
                    cmd_user_unlock(&config, username).await
                }
                _ => {
                    println!("Unknown user subcommand: {subcommand}");
                    println!("Use: add, list, unlock");
                    Ok(())
                }
            }
        }

        Some("help" | "-h" | "--help") => {
            print_help();
            Ok(())
        }

        Some(other) => {
            println!("Unknown command: {other}");
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!("solardesk v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: solardesk <command>");
    println!();
    println!("Commands:");
    println!("  serve            Run the web API (default)");
    println!("  init             Create a default config.toml");
    println!("  user add <username> <password> [admin|staff]");
    println!("  user list        List accounts and lock state");
    println!("  user unlock <username>");
    println!("  help             Show this help");
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!("solardesk v{} starting...", env!("CARGO_PKG_VERSION"));

    let port = config.server.port;
    let state = api::create_app_state_from_config(config, prometheus_handle).await?;

    let app = api::router(state).await;
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let server_handle = tokio::spawn(async move {
        info!("Web API running at http://0.0.0.0:{port}");
        if let Err(e) = axum::serve(listener, app).await {
            error!("Web server error: {}", e);
        }
    });

    info!("Server running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    server_handle.abort();
    info!("Server stopped");

    Ok(())
}

/// Acting identity for CLI maintenance commands, recorded in the audit trail.
fn cli_identity() -> Identity {
    Identity {
        username: "cli".to_string(),
        role: Role::Admin,
    }
}

async fn cmd_user_add(
    config: &Config,
    username: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let auth = SeaOrmAuthService::new(store, config.security.clone());

    match auth
        .create_user(&cli_identity(), username, password, role)
        .await
    {
        Ok(user) => {
            println!("✓ Created {} ({:?})", user.username, user.role);
            Ok(())
        }
        Err(e) => {
            println!("Failed to create user: {e}");
            Ok(())
        }
    }
}

async fn cmd_user_list(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let auth = SeaOrmAuthService::new(store, config.security.clone());

    let users = auth.list_users().await?;
    if users.is_empty() {
        println!("No users found.");
        return Ok(());
    }

    for user in users {
        let state = if user.locked {
            format!("LOCKED ({} fails)", user.failed_attempts)
        } else if user.active {
            "active".to_string()
        } else {
            "inactive".to_string()
        };
        println!(
            "{:<20} {:<6} {:<18} last login: {}",
            user.username,
            format!("{:?}", user.role).to_lowercase(),
            state,
            user.last_login.as_deref().unwrap_or("never"),
        );
    }

    Ok(())
}

async fn cmd_user_unlock(config: &Config, username: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let auth = SeaOrmAuthService::new(store.clone(), config.security.clone());

    let Some(user) = store.get_user_by_username(username).await? else {
        println!("User not found: {username}");
        return Ok(());
    };

    auth.unlock_user(&cli_identity(), user.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to unlock {username}: {e}"))?;
    println!("✓ Unlocked {username}");

    Ok(())
}
