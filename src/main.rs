//! Testing dashboard - command line entry point.
//!
//! ## Commands
//!
//! - `import`: import a Playwright JSON report as a new run
//! - `serve`: start the read-only reporting API
//! - `migrate`: apply pending schema migrations
//! - `users`: manage the user directory that `import --user` resolves against

use std::path::PathBuf;
use std::process::ExitCode;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use clap::{Parser, Subcommand};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use testing_dashboard_lib::api::{self, ApiDoc, ReportingSettings};
use testing_dashboard_lib::config::Config;
use testing_dashboard_lib::db::DbPool;
use testing_dashboard_lib::error::AppError;
use testing_dashboard_lib::middleware::RequestLogger;
use testing_dashboard_lib::services::ImportPipeline;

#[derive(Parser)]
#[command(name = "testing-dashboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Import Playwright results and report on them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a Playwright JSON report as a new run
    Import {
        /// Report file (default: TSD_DEFAULT_REPORT_PATH)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Username to attribute the run to
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Start the reporting HTTP API
    Serve,

    /// Apply pending database migrations
    Migrate,

    /// Manage users
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Add a user
    Add {
        username: String,

        #[arg(long)]
        display_name: Option<String>,
    },

    /// List users
    List,
}

#[actix_web::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ExitCode::FAILURE;
    }

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be 'development' or 'production'");
            error!("  - In production, DATABASE_URL must be set to a non-default value");
            return ExitCode::FAILURE;
        }
    };

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode");
    }

    let result = match cli.command {
        Commands::Import { file, user } => run_import(&config, file, user.as_deref()).await,
        Commands::Serve => serve(config).await,
        Commands::Migrate => connect(&config).await.map(|_| ()),
        Commands::Users { action } => manage_users(&config, action).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Open the store and bring its schema up to date.
async fn connect(config: &Config) -> Result<DbPool, AppError> {
    let pool = DbPool::new(config).await?;
    info!("Database connection established");
    pool.run_migrations().await?;
    Ok(pool)
}

async fn run_import(
    config: &Config,
    file: Option<PathBuf>,
    user: Option<&str>,
) -> Result<(), AppError> {
    let path = file.unwrap_or_else(|| config.default_report_path.clone());

    // Missing files are rejected before touching the store.
    if !path.is_file() {
        return Err(AppError::NotFound(format!("Report file {}", path.display())));
    }

    let pool = connect(config).await?;
    let summary = ImportPipeline::new(&pool, &config.import_defaults)
        .import_file(&path, user)
        .await?;

    for warning in &summary.warnings {
        println!("warning: {}", warning);
    }
    println!(
        "Imported {} test cases into run {} ({} new suites)",
        summary.imported_cases,
        summary.run_id(),
        summary.suites_created
    );
    println!("Success rate: {:.2}%", summary.success_rate);

    Ok(())
}

async fn manage_users(config: &Config, action: UserAction) -> Result<(), AppError> {
    let pool = connect(config).await?;

    match action {
        UserAction::Add {
            username,
            display_name,
        } => {
            let user = pool.insert_user(&username, display_name).await?;
            println!("Created user {} ({})", user.username, user.id);
        }
        UserAction::List => {
            let users = pool.list_users().await?;
            if users.is_empty() {
                println!("No users");
            }
            for user in users {
                println!(
                    "{}\t{}\t{}",
                    user.username,
                    user.display_name.as_deref().unwrap_or("-"),
                    user.created_at.to_rfc3339()
                );
            }
        }
    }

    Ok(())
}

async fn serve(config: Config) -> Result<(), AppError> {
    let pool = connect(&config).await?;

    let bind_address = config.bind_address();
    let is_development = config.is_development();
    let settings = ReportingSettings {
        recent_window_days: config.recent_window_days,
    };

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!("Starting server at http://{} ({} workers)", bind_address, cpus);
        cpus
    };

    let server = HttpServer::new(move || {
        let cors = if is_development {
            Cors::default()
                .allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
                .allowed_methods(vec!["GET", "OPTIONS"])
                .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
                .max_age(3600)
        } else {
            // Same-origin only
            Cors::default()
                .allowed_methods(vec!["GET", "OPTIONS"])
                .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
                .max_age(3600)
        };

        App::new()
            .wrap(cors)
            .wrap(RequestLogger)
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(settings))
            .service(web::scope("/api/v1").configure(api::configure_routes))
            .service(
                SwaggerUi::new("/api/docs/{_:.*}")
                    .url("/api/docs/openapi.json", ApiDoc::openapi()),
            )
    });

    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await?;

    Ok(())
}
