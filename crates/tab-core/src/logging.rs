use crate::Result;

/// Install a `RUST_LOG`-aware fmt subscriber when built with `tracing`.
///
/// Default builds compile this to a no-op and the bot stays silent, including
/// on discarded delivery failures. Errors if a global subscriber is already set.
pub fn init(service_name: &str) -> Result<()> {
    let _ = service_name;

    #[cfg(feature = "tracing")]
    {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "warn,tab=info,tab_core=info,tab_telegram=info,{service_name}=info"
            ))
        });

        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(true)
            .try_init()
            .map_err(|e| crate::Error::External(format!("logging init failed: {e}")))?;
    }

    Ok(())
}
