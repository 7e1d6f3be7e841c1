#[macro_use]
extern crate diesel;

mod appointment;
mod client;
mod config;
mod database;
mod error;
mod models;
mod notification;
mod procedure;
mod professional;
mod protocol;
mod reminder;
mod report;
mod schema;
mod utils;

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;

use crate::{
    config::Settings,
    database::DbPool,
    notification::{transport::build_mailer, Notifier},
    reminder::ReminderScheduler,
};

pub struct AppState {
    pub pool: DbPool,
    pub notifier: Notifier,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let settings = Settings::from_env()?;
    let pool = database::build_pool(&settings.database_url, settings.db_pool_size)?;
    database::run_migrations(&pool)?;

    let mailer = Arc::from(build_mailer(&settings.mail)?);
    let notifier = Notifier::new(mailer, &settings.mail);
    let scheduler = ReminderScheduler::start(
        pool.clone(),
        notifier.clone(),
        settings.reminder_poll_interval,
    );

    let state = web::Data::new(AppState { pool, notifier });

    log::info!("listening on {}", settings.bind_addr);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .service(web::scope("/client").configure(client::config))
            .service(web::scope("/professional").configure(professional::config))
            .service(web::scope("/procedure").configure(procedure::config))
            .service(web::scope("/appointment").configure(appointment::config))
            .service(web::scope("/report").configure(report::config))
    })
    .bind(&settings.bind_addr)
    .with_context(|| format!("Failed to bind {}", settings.bind_addr))?
    .run()
    .await
    .context("Server error")?;

    scheduler.shutdown();
    Ok(())
}
