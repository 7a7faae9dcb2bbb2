use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use dermaserve::config::{self, Settings};
use dermaserve::server::{routes, AppState};
use dermaserve::torch::TorchModel;
use std::io;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = Settings::from_env().expect("failed to load configuration");

    info!("loading model from {}", settings.model_path);
    let model = match TorchModel::new(&settings.model_path) {
        Ok(model) => {
            info!("model loaded");
            Some(model)
        }
        // Not fatal: the server starts anyway and refuses inference requests
        Err(err) => {
            error!("failed to load model: {err:#}");
            None
        }
    };

    let labels = config::load_labels(settings.labels_path.as_deref());
    let bind = (settings.host.clone(), settings.port);
    let state = web::Data::new(AppState {
        model,
        labels,
        settings,
    });

    info!("listening on {}:{}", bind.0, bind.1);
    HttpServer::new(move || {
        // The front end is served from a different origin
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .service(routes::predict)
    })
    .bind(bind)?
    .run()
    .await
}
