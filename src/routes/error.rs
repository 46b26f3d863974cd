use rocket::Request;
use rocket::serde::json::Json;
use serde_json::{Value, json};

#[rocket::catch(401)]
pub fn unauthorized(_req: &Request) -> Json<Value> {
    Json(json!({ "error": "Authentication required" }))
}

#[rocket::catch(404)]
pub fn not_found(req: &Request) -> Json<Value> {
    Json(json!({ "error": format!("No route for {}", req.uri()) }))
}

#[rocket::catch(422)]
pub fn unprocessable(_req: &Request) -> Json<Value> {
    Json(json!({ "error": "Request body could not be parsed" }))
}

#[rocket::catch(500)]
pub fn internal_error(_req: &Request) -> Json<Value> {
    Json(json!({ "error": "Internal server error" }))
}
