use clap::Parser;
use perudo_bot::config::{DEFAULT_NAME, join_host_port};
use perudo_bot::{Bot, BotConfig, logging};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Game server host.
    #[arg(long, env = "PERUDO_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Game server port.
    #[arg(short, long, env = "PERUDO_PORT", default_value_t = 5942)]
    port: u16,

    /// Name to play under.
    #[arg(short, long, env = "PERUDO_NAME", default_value = DEFAULT_NAME)]
    name: String,

    /// Player uuid. A fresh one is generated when omitted.
    #[arg(long, env = "PERUDO_UUID")]
    uuid: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    let args = Args::parse();

    let mut config = BotConfig::default()
        .addr(join_host_port(&args.host, args.port))
        .name(args.name);
    if let Some(uuid) = args.uuid {
        config = config.uuid(uuid);
    }

    let outcome = Bot::new(config).run().await?;
    if outcome.won {
        tracing::info!("we won");
    } else {
        tracing::info!(winner = %outcome.winner, "we lost");
    }
    Ok(())
}
