use actix_web::{HttpResponse, Responder, get, http::header::ContentType};

const INDEX_HTML: &str = include_str!("../../templates/index.html");

#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .insert_header(ContentType::html())
        .body(INDEX_HTML)
}
