//! Server bootstrap: bind, start the session sweep, serve.

use tokio::net::TcpListener;
use tracing::info;

use crate::config::WizardConfig;
use crate::error::Result;
use crate::onboarding::session::spawn_expiry_task;
use crate::onboarding::{WizardState, wizard_routes};

/// Run the wizard until the listener fails.
pub async fn run(config: WizardConfig) -> Result<()> {
    let addr = config.socket_addr()?;
    let state = WizardState::new(&config)?;

    let _expiry_handle = spawn_expiry_task(state.sessions.clone(), config.sweep_interval());

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Onboarding wizard listening");
    axum::serve(listener, wizard_routes(state)).await?;

    Ok(())
}
