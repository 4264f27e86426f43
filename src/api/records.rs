use actix_web::{HttpResponse, Responder, get, post, web};
use chrono::Utc;
use log::{debug, warn};
use serde_json::Value;

use super::models::{AppState, PendingResponse};

/// Submit a record into the mempool. The engine treats records as opaque;
/// shape validation (required `author` and `content`) lives here at the
/// transport boundary, and the server stamps the submission time.
#[post("/records/")]
pub async fn post_record(state: web::Data<AppState>, body: web::Json<Value>) -> impl Responder {
    let mut record = body.into_inner();
    let Some(fields) = record.as_object_mut() else {
        warn!("POST /records/ - rejected: not a JSON object");
        return HttpResponse::BadRequest().body("record must be a JSON object");
    };

    for required in ["author", "content"] {
        match fields.get(required) {
            Some(Value::String(s)) if !s.trim().is_empty() => {}
            _ => {
                warn!("POST /records/ - rejected: missing field {required}");
                return HttpResponse::BadRequest()
                    .body(format!("missing required field: {required}"));
            }
        }
    }
    fields.insert("timestamp".to_string(), Value::from(Utc::now().timestamp()));

    {
        let mut node = state.node.lock().expect("mutex poisoned");
        node.add_record(record.clone());
        debug!(
            "POST /records/ - record accepted into mempool (size now {})",
            node.mempool.len()
        );
    }

    HttpResponse::Created().json(record)
}

/// List the records waiting to be mined.
#[get("/records/pending/")]
pub async fn get_pending(state: web::Data<AppState>) -> impl Responder {
    let node = state.node.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(PendingResponse {
        size: node.mempool.len(),
        records: node.mempool.clone(),
    })
}
