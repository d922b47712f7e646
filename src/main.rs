use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use viva_server::{
    app_state::AppState, config::Config, handlers, middleware::RequestIdMiddleware,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    let bind_address = (config.web_server_host.clone(), config.web_server_port);
    let max_upload_bytes = config.max_upload_bytes;
    let state = AppState::new(config);

    log::info!(
        "starting HTTP server on http://{}:{}",
        bind_address.0,
        bind_address.1
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::PayloadConfig::new(max_upload_bytes))
            .wrap(Logger::default())
            .wrap(RequestIdMiddleware)
            .wrap(Cors::permissive())
            .service(handlers::health_check)
            .service(handlers::create_session)
            .service(handlers::get_session)
            .service(handlers::delete_session)
            .service(handlers::upload_document)
            .service(handlers::generate_questions)
            .service(handlers::start_new_round)
            .service(handlers::set_answer)
            .service(handlers::transcribe_answer)
            .service(handlers::evaluate_answers)
    })
    .bind(bind_address)?
    .run()
    .await
}
