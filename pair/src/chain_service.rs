//! Chain service implementation
//!
//! JSON over HTTP front end of the executor. Every request is turned into a
//! `ChainCmd`, proposed to the executor node and answered with its reply.

use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Body, Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc::Sender;

use crate::config;
use crate::engine::chainengine::{ChainCmd, ChainReply};
use crate::engine::entry::{dev_accounts, Address, Call, Tx, View, ViewResult};
use crate::error::ChainError;
use crate::executor::{Proposal, ProposalResult};
use crate::metrics;

/// Body of `POST /tx`
#[derive(Debug, Deserialize)]
pub struct TxRequest {
    pub from: Address,
    #[serde(default)]
    pub to: Option<Address>,
    pub call: Call,
}

/// Body of `POST /call`
#[derive(Debug, Deserialize)]
pub struct CallRequest {
    pub to: Address,
    pub view: View,
}

#[derive(Debug, Serialize)]
struct ViewResponse {
    result: ViewResult,
}

#[derive(Debug, Serialize)]
struct AccountsResponse {
    accounts: Vec<Address>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Chain(#[from] ChainError),
}

impl ServiceError {
    fn status(&self) -> StatusCode {
        match self {
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Chain(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Body> {
    let (status, bytes) = match serde_json::to_vec(body) {
        Ok(bytes) => (status, bytes),
        Err(e) => {
            log::error!("failed to encode response: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, b"{}".to_vec())
        }
    };
    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

fn error_response(e: &ServiceError) -> Response<Body> {
    json_response(
        e.status(),
        &ErrorResponse {
            error: e.to_string(),
        },
    )
}

async fn read_json<T: serde::de::DeserializeOwned>(req: Request<Body>) -> Result<T, ServiceError> {
    let body = hyper::body::to_bytes(req.into_body())
        .await
        .map_err(|e| ServiceError::BadRequest(e.to_string()))?;
    serde_json::from_slice(&body).map_err(|e| ServiceError::BadRequest(e.to_string()))
}

async fn propose(
    proposals: &Sender<Proposal>,
    proposal: Proposal,
    rx: tokio::sync::oneshot::Receiver<ProposalResult>,
) -> Result<ChainReply, ServiceError> {
    proposals
        .send(proposal)
        .await
        .map_err(|_| ChainError::ExecutorStopped)?;
    let reply = rx.await.map_err(|_| ChainError::ExecutorStopped)??;
    let reply = bincode::deserialize(&reply).map_err(ChainError::from)?;
    Ok(reply)
}

fn unexpected(reply: ChainReply) -> ServiceError {
    match reply {
        ChainReply::Invalid(reason) => ServiceError::BadRequest(reason),
        other => ServiceError::Chain(ChainError::UnexpectedReply(format!("{:?}", other))),
    }
}

/// Executes a transaction and answers with its receipt
async fn send_tx(
    proposals: &Sender<Proposal>,
    req: Request<Body>,
) -> Result<Response<Body>, ServiceError> {
    let request: TxRequest = read_json(req).await?;
    log::info!("send tx {} from {}", request.call.method(), request.from);
    let tx = Tx {
        from: request.from,
        to: request.to,
        call: request.call,
    };
    let data = bincode::serialize(&ChainCmd::transact(tx)).map_err(ChainError::from)?;
    let (proposal, rx) = Proposal::normal(data);
    match propose(proposals, proposal, rx).await? {
        ChainReply::Receipt(receipt) => {
            metrics::record_tx(receipt.is_success());
            let events: Vec<&str> = receipt.events().map(|e| e.name()).collect();
            log::info!(
                "tx {} in block {}: {} [{}]",
                receipt.tx_hash(),
                receipt.block_number(),
                receipt.reason().as_deref().unwrap_or("success"),
                events.join(", ")
            );
            Ok(json_response(StatusCode::OK, &receipt))
        }
        other => Err(unexpected(other)),
    }
}

/// Answers a read-only view; a revert is reported as `{"error": reason}`
async fn call_view(
    proposals: &Sender<Proposal>,
    req: Request<Body>,
) -> Result<Response<Body>, ServiceError> {
    let request: CallRequest = read_json(req).await?;
    let data =
        bincode::serialize(&ChainCmd::view(request.to, request.view)).map_err(ChainError::from)?;
    let (proposal, rx) = Proposal::query(data);
    match propose(proposals, proposal, rx).await? {
        ChainReply::View(Ok(result)) => Ok(json_response(StatusCode::OK, &ViewResponse { result })),
        ChainReply::View(Err(revert)) => Ok(json_response(
            StatusCode::OK,
            &ErrorResponse {
                error: revert.to_string(),
            },
        )),
        other => Err(unexpected(other)),
    }
}

async fn status(proposals: &Sender<Proposal>) -> Result<Response<Body>, ServiceError> {
    let data = bincode::serialize(&ChainCmd::status()).map_err(ChainError::from)?;
    let (proposal, rx) = Proposal::query(data);
    match propose(proposals, proposal, rx).await? {
        ChainReply::Status(status) => Ok(json_response(StatusCode::OK, &status)),
        other => Err(unexpected(other)),
    }
}

fn accounts() -> Response<Body> {
    let accounts = config::current().accounts;
    json_response(
        StatusCode::OK,
        &AccountsResponse {
            accounts: dev_accounts(&accounts.seed, accounts.count),
        },
    )
}

/// Routes one API request
pub async fn handle(
    proposals: Sender<Proposal>,
    req: Request<Body>,
) -> Result<Response<Body>, hyper::Error> {
    let result = match (req.method(), req.uri().path()) {
        (&Method::POST, "/tx") => {
            metrics::record_metrics("send_tx", || send_tx(&proposals, req)).await
        }
        (&Method::POST, "/call") => {
            metrics::record_metrics("call", || call_view(&proposals, req)).await
        }
        (&Method::GET, "/status") => {
            metrics::record_metrics("status", || status(&proposals)).await
        }
        (&Method::GET, "/accounts") => Ok(accounts()),
        _ => Err(ServiceError::NotFound),
    };
    Ok(result.unwrap_or_else(|e| {
        if let ServiceError::Chain(ref err) = e {
            log::error!("request failed: {}", err);
        }
        error_response(&e)
    }))
}
