//! Application state shared across API handlers

use std::sync::Arc;

use ledger_client::{RpcController, RpcLedger};
use peg_core::{AppConfig, SwapError};
use pegswap::{Deployment, SwapOrchestrator};

/// Orchestrator wired to the JSON-RPC ledger
pub type Orchestrator = SwapOrchestrator<RpcLedger, RpcController>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    orchestrator: Orchestrator,
}

impl AppState {
    /// Build the ledger connection and orchestrator for `config`
    ///
    /// Fails only when no deployment is known for the configured network; the
    /// node itself is not contacted here.
    pub fn new(config: AppConfig) -> Result<Self, SwapError> {
        let deployment = Deployment::resolve(&config)?;
        let ledger = RpcLedger::new(&config.node);
        let controller = ledger.controller(deployment.controller);

        tracing::info!(
            url = %config.node.url,
            network = %config.network,
            controller = %deployment.controller,
            "ledger client configured"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                orchestrator: SwapOrchestrator::new(ledger, controller, deployment),
                config,
            }),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.inner.orchestrator
    }

    pub fn ledger(&self) -> &RpcLedger {
        self.inner.orchestrator.ledger()
    }

    pub fn deployment(&self) -> &Deployment {
        self.inner.orchestrator.deployment()
    }
}
