mod cli;
mod env;

use anyhow::Context;
use clap::Parser;

use cli::Cli;
use env::EnvSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tab_core::logging::init("tab")?;

    let settings = EnvSettings::load(cli.config.as_deref())?;

    let bot = tab_telegram::new_alert_bot(&settings.token, settings.config)
        .context("failed to configure alert bot")?;

    // Delivery failures are swallowed by the bot; only local errors surface here.
    bot.send_alert(cli.request()).await?;

    Ok(())
}
