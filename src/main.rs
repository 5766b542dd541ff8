use anyhow::Context;

use onboarding_wizard::config::WizardConfig;
use onboarding_wizard::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = WizardConfig::from_env().context("Failed to load configuration")?;

    eprintln!("Onboarding wizard v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Wizard: http://{}:{}/", config.bind_addr, config.port);
    eprintln!("   Status API: http://{}:{}/api/onboarding/status", config.bind_addr, config.port);
    eprintln!("   Session idle timeout: {} min", config.session_idle_minutes);
    eprintln!(
        "   Step order: {}\n",
        if config.enforce_step_order {
            "enforced"
        } else {
            "navigation only"
        }
    );

    server::run(config).await.context("Onboarding wizard stopped")?;

    Ok(())
}
