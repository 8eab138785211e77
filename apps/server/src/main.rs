use std::net::SocketAddr;

use anyhow::Context;
use clap::{Parser, Subcommand};
use smartassist_api::{build_router, AppState};
use smartassist_config::{load as load_config, AppConfig};
use smartassist_database::{ChatLogFilter, ChatLogRepository, FaqFilter, FaqRepository};
use smartassist_runtime::{shutdown_signal, telemetry, BackendServices};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "smartassist-server")]
#[command(about = "GSU SmartAssist backend (serves HTTP by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Create the default administrator and the sample FAQs
    Seed,
    /// Print the knowledge base and the chat log
    Dump {
        /// Maximum number of chat log rows to print
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Delete every logged chat turn
    ClearLogs,
    /// Delete sessions whose expiry has passed
    PurgeSessions,
    /// Create an administrator, or promote and reset an existing account
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing().context("failed to initialise tracing")?;

    let config = load_config().context("failed to load configuration")?;
    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(&config, services).await,
        Commands::Seed => seed(&services).await,
        Commands::Dump { limit } => dump(&services, limit).await,
        Commands::ClearLogs => clear_logs(&services).await,
        Commands::PurgeSessions => purge_sessions(&services).await,
        Commands::CreateAdmin {
            email,
            name,
            password,
        } => create_admin(&services, &name, &email, &password).await,
    }
}

async fn run_server(config: &AppConfig, services: BackendServices) -> anyhow::Result<()> {
    info!("starting GSU SmartAssist");

    let state = AppState::new(
        services.db_pool.clone(),
        services.authenticator.clone(),
        services.orchestrator.clone(),
        config,
    );
    let app = build_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("http server error")?;

    info!("server shut down");
    Ok(())
}

async fn seed(services: &BackendServices) -> anyhow::Result<()> {
    let summary = services.seed().await?;
    println!(
        "Seeded administrator {} and {} sample FAQs",
        summary.admin_email, summary.faqs
    );
    Ok(())
}

async fn dump(services: &BackendServices, limit: Option<u32>) -> anyhow::Result<()> {
    let faqs = FaqRepository::new(services.db_pool.clone())
        .list(&FaqFilter::default())
        .await
        .context("failed to fetch knowledge base")?;

    println!("=== KNOWLEDGE BASE ===");
    if faqs.is_empty() {
        println!("No FAQ entries found in database");
    } else {
        println!("Found {} entries:", faqs.len());
        println!("{:<5} {:<15} {:<60} {:<30}", "ID", "Category", "Question", "Keywords");
        println!("{}", "-".repeat(112));
        for faq in faqs {
            println!(
                "{:<5} {:<15} {:<60} {:<30}",
                faq.id,
                faq.category,
                faq.question,
                faq.keywords.as_deref().unwrap_or("NULL")
            );
        }
    }

    let logs = ChatLogRepository::new(services.db_pool.clone())
        .list(&ChatLogFilter {
            limit,
            ..ChatLogFilter::default()
        })
        .await
        .context("failed to fetch chat logs")?;

    println!();
    println!("=== CHAT LOGS ===");
    if logs.is_empty() {
        println!("No chat turns found in database");
    } else {
        println!("Found {} turns (newest first):", logs.len());
        println!(
            "{:<6} {:<28} {:<20} {:<13} {:<50}",
            "ID", "Created At", "Session", "Source", "Message"
        );
        println!("{}", "-".repeat(120));
        for log in logs {
            println!(
                "{:<6} {:<28} {:<20} {:<13} {:<50}",
                log.id, log.created_at, log.session_id, log.source, log.message
            );
        }
    }

    Ok(())
}

async fn clear_logs(services: &BackendServices) -> anyhow::Result<()> {
    let removed = ChatLogRepository::new(services.db_pool.clone())
        .clear()
        .await
        .context("failed to clear chat logs")?;
    println!("Removed {removed} chat turns");
    Ok(())
}

async fn purge_sessions(services: &BackendServices) -> anyhow::Result<()> {
    let removed = services
        .authenticator
        .purge_expired_sessions()
        .await
        .context("failed to purge sessions")?;
    println!("Removed {removed} expired sessions");
    Ok(())
}

async fn create_admin(
    services: &BackendServices,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    let admin = services
        .authenticator
        .upsert_admin(name, email, password)
        .await
        .context("failed to create administrator")?;
    println!("Administrator {} <{}> is ready", admin.name, admin.email);
    Ok(())
}
