//! 学生管理 API 服务入口

use axum::middleware;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

use student_mgmt::app::students::{handler, handler::AppState, service::StudentService};
use student_mgmt::core::middleware::request_logging_middleware;
use student_mgmt::infrastructure::{config::Config, database::init_database, logger::Logger};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    Logger::init();

    info!("Starting student management server...");

    let config = Config::load();
    info!("Connecting to database: {}", config.masked_database_url());

    // 记录存储不可达时快速失败，由编排层负责重启
    let db = init_database(&config.database_url()).await.map_err(|e| {
        error!("Failed to initialize database: {}", e);
        e
    })?;

    let state = AppState {
        student_service: StudentService::new(db),
    };

    let app = handler::routes()
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let address = format!("0.0.0.0:{}", config.server_port);
    let listener = TcpListener::bind(&address).await?;

    info!("🚀 Student management server running on http://{}", address);
    info!("📖 Available endpoints:");
    info!("   GET    /health            - Health check");
    info!("   GET    /api/students      - List all students");
    info!("   POST   /api/students      - Create student");
    info!("   GET    /api/students/:id  - Get student by ID");
    info!("   PUT    /api/students/:id  - Update student");
    info!("   DELETE /api/students/:id  - Delete student");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
