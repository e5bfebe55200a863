use axum::response::Response;
use serde_json::Value;

use crate::records::{Record, RecordFields};

pub(crate) fn fields(value: Value) -> RecordFields {
    value.as_object().cloned().expect("object fields")
}

pub(crate) fn record(id: &str, value: Value) -> Record {
    Record::new(id, fields(value))
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
