//! Gazette - a small server-rendered blog

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gazette::{
    config::Config,
    db::{
        self,
        repositories::{
            SqlxArticleRepository, SqlxCommentRepository, SqlxSessionRepository,
            SqlxUserRepository,
        },
    },
    services::{ArticleService, CommentService, UserService},
    view::Templates,
    web::{self, AppState},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gazette=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Gazette...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Create repositories
    let article_repo = SqlxArticleRepository::boxed(pool.clone());
    let comment_repo = SqlxCommentRepository::boxed(pool.clone());
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());

    // Initialize services
    let user_service = Arc::new(UserService::new(user_repo, session_repo));
    let article_service = Arc::new(ArticleService::new(
        article_repo.clone(),
        comment_repo.clone(),
    ));
    let comment_service = Arc::new(CommentService::new(comment_repo, article_repo));

    // Bootstrap admin account, if configured
    if let Some(admin) = &config.admin {
        user_service
            .ensure_admin(&admin.username, &admin.password)
            .await?;
    }

    // Compile templates
    let templates = Arc::new(Templates::new()?);
    tracing::info!("Templates compiled");

    // Build application state
    let state = AppState {
        templates,
        site: config.site.clone(),
        user_service,
        article_service,
        comment_service,
    };

    // Build router
    let app = web::build_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
