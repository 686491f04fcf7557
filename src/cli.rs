use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;

#[derive(Debug, Parser)]
#[command(name = "quote-dashboard")]
#[command(about = "Query instrument prices and windowed averages from a remote quote service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Override `service.base_url` from the configuration
    #[arg(long)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Start the interactive dashboard (default)
    Interactive,

    /// Print the instrument catalog and exit
    Instruments,

    /// Fetch current price, history and average for one symbol
    Query {
        /// Instrument symbol, e.g. NVDA
        symbol: String,

        /// Averaging window in minutes; defaults to the configured window
        #[arg(short, long, allow_negative_numbers = true)]
        minutes: Option<i64>,
    },
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Interactive)
    }
}

pub fn show_banner() {
    println!("# ------------------------------------------------------------------------ #");
    println!("# Quote Dashboard");
    println!("# Executing date: {}", crate::utils::current_human_timestamp());
    println!("#");
    println!("# --------------------------- COMMAND LIST ------------------------------- #");
    println!("#");
    println!("#   list:                 Show the instrument catalog");
    println!("#   select [symbol]:      Choose the instrument to query");
    println!("#   window [minutes]:     Set the averaging window");
    println!("#   submit:               Fetch current price and price history");
    println!("#   show:                 Redraw the dashboard");
    println!("#   exit:                 Exit the program");
    println!("#");
    println!("# ------------------------------------------------------------------------ #");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_interactive() {
        let cli = Cli::try_parse_from(["quote-dashboard"]).unwrap();
        assert_eq!(cli.command(), Commands::Interactive);
        assert_eq!(cli.config, DEFAULT_CONFIG_PATH);
        assert_eq!(cli.base_url, None);
    }

    #[test]
    fn parses_query_with_overrides() {
        let cli = Cli::try_parse_from([
            "quote-dashboard",
            "--base-url",
            "http://localhost:8080",
            "query",
            "NVDA",
            "--minutes",
            "50",
        ])
        .unwrap();

        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(
            cli.command(),
            Commands::Query {
                symbol: "NVDA".to_string(),
                minutes: Some(50),
            }
        );
    }
}
