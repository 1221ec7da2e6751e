use actix_web::HttpResponse;

/// Embedded single-page whiteboard client.
pub async fn index_page() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(include_str!("../../static/index.html"))
}
