use crate::{
    api::{
        export, health, item_meta, lookups, period_window, salary_data, tax_certificate, upload,
    },
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Per-IP limiter allowing `requests_per_min` with a burst of the same size
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let requests_per_min = requests_per_min.max(1);
        let cfg = GovernorConfigBuilder::default()
            .milliseconds_per_request((60_000 / requests_per_min as u64).max(1))
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .expect("rate limit configuration is valid");
        Governor::new(&cfg)
    }

    let upload_limiter = Arc::new(build_limiter(config.rate_upload_per_min));
    let api_limiter = Arc::new(build_limiter(config.rate_api_per_min));

    // Liveness stays outside the limiter
    cfg.service(web::resource("/healthz").route(web::get().to(health::healthz)));

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(api_limiter)
            .service(
                web::resource("/upload_excel")
                    .wrap(upload_limiter)
                    .route(web::post().to(upload::upload_excel)),
            )
            .service(
                web::scope("/salary_data")
                    // /salary_data/data
                    .service(
                        web::resource("/data")
                            .route(web::get().to(salary_data::get_salary_data))
                            .route(web::post().to(salary_data::upsert_salary_data)),
                    )
                    // /salary_data/export
                    .service(
                        web::resource("/export").route(web::get().to(export::export_period)),
                    ),
            )
            .service(
                web::resource("/salary_items/meta/cache")
                    .route(web::delete().to(item_meta::clear_item_meta_cache)),
            )
            .service(
                web::resource("/salary_items/meta")
                    .route(web::get().to(item_meta::list_item_meta))
                    .route(web::post().to(item_meta::upsert_item_meta))
                    .route(web::delete().to(item_meta::delete_item_meta)),
            )
            .service(
                web::resource("/salary_sheets/api-window")
                    .route(web::get().to(period_window::list_windows))
                    .route(web::patch().to(period_window::patch_window)),
            )
            .service(
                web::resource("/50tawi/data")
                    .route(web::get().to(tax_certificate::get_certificate))
                    .route(web::post().to(tax_certificate::upsert_certificate)),
            )
            .service(
                web::scope("/salary")
                    .service(
                        web::resource("/employees").route(web::get().to(lookups::list_employees)),
                    )
                    .service(
                        web::resource("/month-years")
                            .route(web::get().to(lookups::list_month_years)),
                    ),
            ),
    );
}
