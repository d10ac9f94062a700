use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use parley_gateway::api::{ApiServer, ApiState};
use parley_gateway::{ArtifactStore, Config, GroqClient, Orchestrator, Session, TurnInput};

/// Parley - Conversation gateway for voice and text AI assistants
#[derive(Parser)]
#[command(name = "parley", version, about)]
struct Cli {
    /// Port to listen on (overrides config)
    #[arg(long, env = "PARLEY_PORT")]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a single typed turn and print the reply
    Ask {
        /// Text to send
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,parley_gateway=info",
        1 => "info,parley_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Missing credential halts startup before anything else happens
    let config = Config::load()?;
    let client = Arc::new(GroqClient::new(
        config.api_key.clone(),
        config.remote.clone(),
    )?);

    if let Some(Command::Ask { text }) = cli.command {
        return ask(client, &config, &text).await;
    }

    let port = cli.port.unwrap_or(config.port);
    tracing::info!(port, chat_model = %config.remote.chat_model, "starting parley gateway");

    let state = Arc::new(ApiState::new(
        client,
        config.remote.clone(),
        config.speech_input_cap,
    )?);

    ApiServer::new(state, port).run().await?;

    Ok(())
}

/// Run one typed turn from the command line
async fn ask(client: Arc<GroqClient>, config: &Config, text: &str) -> anyhow::Result<()> {
    let artifacts = Arc::new(ArtifactStore::new()?);
    let orchestrator =
        Orchestrator::new(client, Arc::clone(&artifacts)).with_speech_cap(config.speech_input_cap);

    let mut session = Session::new("cli");
    let turn = orchestrator
        .run_turn(TurnInput::Typed(text.to_string()), &mut session)
        .await?;

    println!("{}", turn.output_text);

    if let Some(handle) = &turn.audio {
        let bytes = artifacts.read(handle)?;
        println!("\n[reply audio synthesized: {} bytes of WAV]", bytes.len());
    } else if !session.tts().is_available() {
        println!("\n[TTS rate limited: text-only mode]");
    }

    session.clear(&artifacts);
    Ok(())
}
