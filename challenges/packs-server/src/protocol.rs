use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Body of a solve request: `{"quantity": 12001, "packSizes": [250, 500]}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Request {
    pub quantity: i64,
    #[serde(rename = "packSizes")]
    pub pack_sizes: Vec<i64>,
}

/// Lambda style invocation event; only the body is used. A connection line
/// carrying a string `body` is treated as one of these.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadRequest,
    InternalError,
}

impl Status {
    pub fn code(&self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::InternalError => 500,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// Lambda style response. The body is itself JSON, encoded as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl Response {
    fn new(status: Status, body: String) -> Response {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Response {
            status_code: status.code(),
            headers,
            body,
        }
    }

    /// 200 with the pack size to count mapping, e.g. `{"250":1,"5000":2}`.
    pub fn packs(packs: &packs::Packs) -> Response {
        // a map of integers always serializes
        let body = serde_json::to_string(packs.as_map()).unwrap_or_else(|_| "{}".to_string());
        Response::new(Status::Ok, body)
    }

    pub fn error(status: Status, message: &str) -> Response {
        let body = serde_json::to_string(&ErrorBody { error: message })
            .unwrap_or_else(|_| "{}".to_string());
        Response::new(status, body)
    }

    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
