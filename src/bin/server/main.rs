use actix_web::http::header;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use env_logger::Env;
use std::time::Duration;
use taqyeem::app_config;
use taqyeem::db::init_db;
use taqyeem::throttle::Throttle;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_lib_mods();
    init_our_mods();
    init_db(std::env::var("DATABASE_URL").expect("DATABASE_URL must be set.")).await;

    let config = app_config::get();
    let throttle = Data::new(Throttle::in_memory(config.throttle.clone()));

    // Spawn throttle cleanup task
    let cleanup_throttle = throttle.clone();
    let cleanup_interval = config.throttle.cleanup_interval_seconds;
    actix_web::rt::spawn(async move {
        let mut interval =
            actix_web::rt::time::interval(Duration::from_secs(cleanup_interval));
        loop {
            interval.tick().await;
            cleanup_throttle.cleanup();
            log::debug!("Throttle cleanup completed");
        }
    });

    let bind_address = config.server.bind_address.clone();
    log::info!("Listening on {}", bind_address);

    HttpServer::new(move || {
        // Order of middleware IS IMPORTANT and is in REVERSE EXECUTION ORDER.
        // However, services are read top->down, higher traffic routes should be
        // placed higher
        App::new()
            .app_data(throttle.clone())
            // Security headers - applied to all responses
            .wrap(
                DefaultHeaders::new()
                    .add((header::X_FRAME_OPTIONS, "DENY"))
                    .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
                    .add(("Referrer-Policy", "strict-origin-when-cross-origin")),
            )
            .wrap(Logger::new("%a %{User-Agent}i"))
            .configure(taqyeem::web::configure)
    })
    .bind(bind_address)?
    .run()
    .await
}

/// Initialize third party crates we rely on but don't have control over.
pub fn init_lib_mods() {
    // This should be calls to crates without any transformative work applied.
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}

/// Initialize all local mods.
/// Panics
pub fn init_our_mods() {
    // This should be a list of simple function calls.
    // Each module should work mostly independent of others.
    // This way, we can unit test individual modules without loading the entire application.
    taqyeem::app_config::init();
}
