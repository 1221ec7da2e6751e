use actix_web::web;

use crate::connection::ws_index;

mod index;

pub fn root(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws/{client_id}").route(web::get().to(ws_index)));
    cfg.service(web::resource("/").route(web::get().to(index::index_page)));
}
