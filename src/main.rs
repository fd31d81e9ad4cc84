use std::sync::Arc;

use actix_files as fs;
use actix_web::{web::Data, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};
use tera::Tera;

use twekee_site::config::AppConfig;
use twekee_site::model::OpenRouterClient;
use twekee_site::web::proxy::ChatProxy;
use twekee_site::web::routes;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting Twekee web application");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let provider = OpenRouterClient::new(&config.provider)?;
    info!("Using model {} at temperature {}", config.proxy.model, config.proxy.temperature);
    let proxy = Data::new(ChatProxy::new(config.proxy.clone(), Arc::new(provider)));

    // Initialize template engine
    let mut tera = match Tera::new(&format!("{}/**/*", config.templates_dir)) {
        Ok(t) => t,
        Err(e) => {
            error!("Template parsing error: {}", e);
            std::process::exit(1);
        }
    };
    tera.autoescape_on(vec![".html"]);
    let tera = Data::new(tera);

    let static_dir = config.static_dir.clone();
    info!("Listening on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(proxy.clone())
            .app_data(tera.clone())
            .configure(routes::configure)
            .service(fs::Files::new("/static", &static_dir))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
