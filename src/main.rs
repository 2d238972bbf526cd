use std::io;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use taskdesk::auth::PasswordHasher;
use taskdesk::routes::{self, health};
use taskdesk::{AppState, Config};

fn io_error(err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(io_error)?;
    let hasher = PasswordHasher::new(config.bcrypt_cost);
    let sessions = config.session_config();

    let state = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await
                .map_err(io_error)?;
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(io_error)?;
            log::info!("Connected to Postgres, migrations applied");
            AppState::postgres(pool, hasher, &sessions)
        }
        None => {
            log::warn!("DATABASE_URL is not set; using the in-memory store, data is lost on exit");
            AppState::in_memory(hasher, &sessions)
        }
    };
    let state = web::Data::new(state);

    log::info!("Starting taskdesk server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .service(health::health)
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
