use actix_cors::Cors;
use actix_web::http::header;
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::{Data, JsonConfig, QueryConfig};
use actix_web::{App, HttpServer};
use anyhow::Context;
use std::str::FromStr;
use tracing::{Level, info};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use payroll_sheets::config::Config;
use payroll_sheets::db::init_db;
use payroll_sheets::docs::ApiDoc;
use payroll_sheets::error::AppError;
use payroll_sheets::routes;
use payroll_sheets::utils::item_classifier::ItemClassifier;

const JSON_LIMIT_BYTES: usize = 1024 * 1024;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let level = Level::from_str(&config.log_level)
        .with_context(|| format!("LOG_LEVEL `{}` is not a log level", config.log_level))?;

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(level)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    info!(
        addr = %config.server_addr,
        groups = ?config.item_groups,
        policy = ?config.unknown_item_policy,
        "Server starting..."
    );

    let pool = init_db(&config.database_url, config.db_max_connections)
        .await
        .context("failed to connect to the database")?;
    let classifier = ItemClassifier::from_config(&config);

    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .wrap(cors)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(Data::new(classifier.clone()))
            .app_data(
                JsonConfig::default()
                    .limit(JSON_LIMIT_BYTES)
                    .error_handler(|err, _| AppError::Validation(format!("invalid json body: {}", err)).into()),
            )
            .app_data(
                QueryConfig::default()
                    .error_handler(|err, _| AppError::Validation(err.to_string()).into()),
            )
            .configure(|cfg| routes::configure(cfg, config.clone()))
    })
    .bind(&server_addr)
    .with_context(|| format!("failed to bind {}", server_addr))?
    .run()
    .await?;

    Ok(())
}
