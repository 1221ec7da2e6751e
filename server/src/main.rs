use actix_web::{App, HttpServer};

use server::handlers;
use server::server::spawn_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let srv_tx = spawn_server();

    HttpServer::new(move || App::new().data(srv_tx.clone()).configure(handlers::root))
        .bind("0.0.0.0:8000")?
        .run()
        .await
}
