use crate::chain_service;
use crate::config;
use crate::error::ChainError;
use crate::executor::{Node, Proposal};
use crate::metrics;
use crate::state_chain::StateChain;

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use once_cell::sync::OnceCell;
use tokio::sync::mpsc::Sender;
use tokio::sync::Mutex;

static INSTANCE: OnceCell<Mutex<Server>> = OnceCell::new();
pub fn instance() -> &'static Mutex<Server> {
    INSTANCE.get_or_init(|| Mutex::new(Server::builder()))
}

pub struct Server {
    pub(crate) proposals: Option<Sender<Proposal>>, // -> executor node
}

fn parse_addr(addr: &str) -> Result<SocketAddr, ChainError> {
    addr.parse()
        .map_err(|e| ChainError::Config(format!("invalid listen address {}: {}", addr, e)))
}

impl Server {
    fn builder() -> Self {
        Server { proposals: None }
    }

    /// Starts the executor node, the API server and the metrics server
    pub async fn start(&mut self) -> Result<(), ChainError> {
        let config = config::current();
        let (proposals, _executor) = Node::start(
            Path::new(&config.base_path),
            StateChain::new(),
            Duration::from_secs(config.snapshot_interval_secs),
        )?;
        self.start_api_server(&config.addr, proposals.clone())?;
        self.start_metrics_server(&config.metrics_addr)?;
        self.proposals = Some(proposals);
        Ok(())
    }

    /// Persists a final snapshot
    pub async fn stop(&mut self) {
        log::info!("server stop");
        let (proposal, rx) = Proposal::snapshot();
        match self.add_proposal(proposal).await {
            Ok(()) => {
                if let Ok(Err(e)) = rx.await {
                    log::error!("final snapshot failed: {}", e);
                }
            }
            Err(e) => log::warn!("no final snapshot: {}", e),
        }
    }

    pub async fn add_proposal(&self, proposal: Proposal) -> Result<(), ChainError> {
        match &self.proposals {
            Some(proposals) => proposals
                .send(proposal)
                .await
                .map_err(|_| ChainError::ExecutorStopped),
            None => Err(ChainError::ExecutorStopped),
        }
    }

    fn start_api_server(
        &mut self,
        addr: &str,
        proposals: Sender<Proposal>,
    ) -> Result<(), ChainError> {
        let addr = parse_addr(addr)?;
        let make_svc = make_service_fn(move |_| {
            let proposals = proposals.clone();
            async move {
                Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                    chain_service::handle(proposals.clone(), req)
                }))
            }
        });
        let server = hyper::Server::try_bind(&addr)?.serve(make_svc);
        tokio::spawn(async move {
            if let Err(e) = server.await {
                log::error!("api server error: {}", e);
            }
        });
        log::info!("api server started on {}", addr);
        Ok(())
    }

    fn start_metrics_server(&mut self, addr: &str) -> Result<(), ChainError> {
        let addr = parse_addr(addr)?;
        let make_svc = make_service_fn(move |_| async move {
            Ok::<_, Infallible>(service_fn(move |_: Request<Body>| async move {
                Ok::<_, Infallible>(Response::new(Body::from(metrics::gather_text())))
            }))
        });
        metrics::init_registry();
        let server = hyper::Server::try_bind(&addr)?.serve(make_svc);
        tokio::spawn(async move {
            if let Err(e) = server.await {
                log::error!("metrics server error: {}", e);
            }
        });
        log::info!("metrics server started on {}", addr);
        Ok(())
    }
}
