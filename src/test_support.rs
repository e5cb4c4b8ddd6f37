//! Scripted collaborators shared by unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use futures::channel::oneshot;
use serde_json::{Value, json};

use crate::net::transport::{ApiRequest, ApiResponse, HttpTransport, TransportError};

pub const PAGE_ORIGIN: &str = "https://app.example.com";
pub const API_ROOT: &str = "https://app.example.com/api";

type Outcome = Result<ApiResponse, TransportError>;

enum Scripted {
    Ready(Outcome),
    Gated(oneshot::Receiver<Outcome>),
}

#[derive(Default)]
struct Script {
    responses: VecDeque<Scripted>,
    requests: Vec<ApiRequest>,
}

/// Transport answering from a FIFO script and recording every request.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Rc<RefCell<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_json(&self, status: u16, body: &Value) {
        self.push(Ok(ApiResponse { status, body: body.to_string() }));
    }

    pub fn push_status(&self, status: u16) {
        self.push(Ok(ApiResponse { status, body: String::new() }));
    }

    pub fn push_raw(&self, status: u16, body: &str) {
        self.push(Ok(ApiResponse { status, body: body.to_owned() }));
    }

    pub fn push_error(&self, message: &str) {
        self.push(Err(TransportError(message.to_owned())));
    }

    /// Queue a response that stays pending until the returned sender fires.
    pub fn push_gated(&self) -> oneshot::Sender<Outcome> {
        let (tx, rx) = oneshot::channel();
        self.script.borrow_mut().responses.push_back(Scripted::Gated(rx));
        tx
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.script.borrow().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.script.borrow().requests.len()
    }

    fn push(&self, outcome: Outcome) {
        self.script.borrow_mut().responses.push_back(Scripted::Ready(outcome));
    }
}

impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let next = {
            let mut script = self.script.borrow_mut();
            script.requests.push(request);
            script.responses.pop_front()
        };
        match next {
            Some(Scripted::Ready(outcome)) => outcome,
            Some(Scripted::Gated(rx)) => rx.await.unwrap_or_else(|_| Err(TransportError("gate dropped".to_owned()))),
            None => Err(TransportError("no scripted response".to_owned())),
        }
    }
}

/// Identity payload as returned by the auth endpoints.
pub fn claims_json(user_name: &str) -> Value {
    json!({
        "userId": format!("id-{user_name}"),
        "userName": user_name,
        "displayName": user_name.to_uppercase(),
        "roles": ["User"],
        "permissions": []
    })
}

/// Login payload carrying a bearer token.
pub fn login_json(user_name: &str, token: &str) -> Value {
    let mut body = claims_json(user_name);
    body["bearerToken"] = json!(token);
    body["refreshToken"] = json!(format!("refresh-{token}"));
    body
}

pub fn ok_outcome(body: &Value) -> Outcome {
    Ok(ApiResponse { status: 200, body: body.to_string() })
}

pub fn status_outcome(status: u16) -> Outcome {
    Ok(ApiResponse { status, body: String::new() })
}
