use std::io::Write;
use std::sync::Arc;

use log::{debug, info};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::app::controller::{FetchCoordinator, Intent};
use crate::app::state::RequestPhase;
use crate::cli::{self, Cli, Commands};
use crate::config::{validator::validate_config, Config};
use crate::error::{AppError, Context, Result};
use crate::fetch::{HttpQuoteClient, QuoteService};
use crate::ui::{parse_command, render_catalog, render_dashboard, Command, HELP_TEXT};

/// Entry point used by `main` to bootstrap the coordinator stack.
pub async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    let client = HttpQuoteClient::new(&config.service)?;
    let service: Arc<dyn QuoteService> = Arc::new(client);
    let mut coordinator = FetchCoordinator::new(service, &config.dashboard);

    match cli.command() {
        Commands::Interactive => run_interactive(&mut coordinator).await,
        Commands::Instruments => list_instruments(&mut coordinator).await,
        Commands::Query { symbol, minutes } => {
            query_once(&mut coordinator, &symbol, minutes).await
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(&cli.config).context("Failed to load configuration")?;
    if let Some(base_url) = cli.base_url.as_deref() {
        info!("Using base URL override {base_url}");
        config.service.base_url = base_url.to_string();
        validate_config(&config)?;
    }
    Ok(config)
}

async fn list_instruments(coordinator: &mut FetchCoordinator) -> Result<()> {
    coordinator.load_catalog().await;
    let state = coordinator.state();
    if let Some(message) = state.error_message() {
        return Err(AppError::message(message));
    }
    println!("{}", render_catalog(state.catalog(), None));
    Ok(())
}

async fn query_once(
    coordinator: &mut FetchCoordinator,
    symbol: &str,
    minutes: Option<i64>,
) -> Result<()> {
    coordinator.handle(Intent::SelectInstrument(symbol.to_string()))?;
    if let Some(minutes) = minutes {
        coordinator.handle(Intent::SetWindowMinutes(minutes))?;
    }
    coordinator.handle(Intent::Submit)?;
    coordinator.settle().await;

    let state = coordinator.state();
    println!("{}", render_dashboard(state));
    match (state.phase(), state.error_message()) {
        (RequestPhase::Failed, Some(message)) => Err(AppError::message(message)),
        _ => Ok(()),
    }
}

async fn run_interactive(coordinator: &mut FetchCoordinator) -> Result<()> {
    cli::show_banner();

    coordinator.load_catalog().await;
    println!("{}", render_catalog(coordinator.state().catalog(), None));
    if let Some(message) = coordinator.state().error_message() {
        println!("{message}");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read user input")? else {
                    break;
                };
                match parse_command(&line) {
                    Ok(Some(Command::Exit)) => {
                        println!("Exiting...");
                        break;
                    }
                    Ok(Some(command)) => execute(coordinator, command),
                    Ok(None) => {}
                    Err(err) => println!("{err}"),
                }
                prompt()?;
            }
            Some(event) = coordinator.next_event() => {
                debug!("Request for submission {} completed", event.submission);
                coordinator.apply(event);
                if coordinator.is_settled() {
                    println!();
                    println!("{}", render_dashboard(coordinator.state()));
                    prompt()?;
                }
            }
        }
    }

    Ok(())
}

fn execute(coordinator: &mut FetchCoordinator, command: Command) {
    match command {
        Command::List => {
            let state = coordinator.state();
            println!("{}", render_catalog(state.catalog(), state.selection()));
        }
        Command::Show => println!("{}", render_dashboard(coordinator.state())),
        Command::Help => println!("{HELP_TEXT}"),
        Command::Exit => {}
        command => {
            let Some(intent) = command.intent() else {
                return;
            };
            let submitting = intent == Intent::Submit;
            match coordinator.handle(intent) {
                Ok(()) if submitting => println!("Loading..."),
                Ok(()) => println!("{}", render_dashboard(coordinator.state())),
                Err(err) => println!("{err}"),
            }
        }
    }
}

fn prompt() -> Result<()> {
    print!("Waiting for command: ");
    std::io::stdout().flush()?;
    Ok(())
}
