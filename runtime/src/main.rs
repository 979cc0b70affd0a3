use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use mf_scrape::audit::Diagnostics;
use mf_scrape::cli::output::Styled;
use mf_scrape::cli::{parse_cmd, scrape_cmd};
use mf_scrape::renderer::chromium::BrowserOptions;
use mf_scrape::CurrencyMode;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mf-scrape")]
#[command(about = "Extract cash, holdings and liabilities from MoneyForward as JSON")]
#[command(version)]
struct Cli {
    /// Log output format on stderr
    #[arg(long, value_enum, default_value = "text", global = true)]
    log_format: LogFormat,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Suppress the summary printed after the JSON
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in, fetch the three pages and print the snapshot
    Scrape {
        /// Account id (defaults to $MONEYFORWARD_ID)
        id: Option<String>,

        /// Account password (defaults to $MONEYFORWARD_PASSWORD)
        password: Option<String>,

        /// Portal base URL (defaults to $MONEYFORWARD_BASE_URL or https://moneyforward.com)
        #[arg(long)]
        base_url: Option<String>,

        /// Show the browser window
        #[arg(long)]
        headful: bool,

        /// Chrome/Chromium executable
        #[arg(long)]
        chrome: Option<PathBuf>,

        /// Fail on amounts without an explicit currency marker instead of guessing
        #[arg(long)]
        strict_currency: bool,

        /// Where failure captures are written (default ~/.mf-scrape/diagnostics)
        #[arg(long)]
        diagnostics_dir: Option<PathBuf>,

        /// Do not capture HTML and a screenshot on failure
        #[arg(long)]
        no_diagnostics: bool,

        /// Print JSON on a single line
        #[arg(long)]
        compact: bool,
    },

    /// Build a snapshot from saved page HTML
    Parse {
        #[arg(long)]
        dashboard: PathBuf,

        #[arg(long)]
        portfolio: PathBuf,

        #[arg(long)]
        liabilities: PathBuf,

        /// Fail on amounts without an explicit currency marker instead of guessing
        #[arg(long)]
        strict_currency: bool,

        /// Print JSON on a single line
        #[arg(long)]
        compact: bool,
    },
}

fn currency_mode(strict: bool) -> CurrencyMode {
    if strict {
        CurrencyMode::Strict
    } else {
        CurrencyMode::Heuristic
    }
}

fn init_tracing(format: LogFormat, verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::from_default_env().add_directive(format!("mf_scrape={level}").parse()?);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.log_format, cli.verbose) {
        eprintln!("failed to initialise logging: {e}");
    }

    let result = match cli.command {
        Command::Scrape {
            id,
            password,
            base_url,
            headful,
            chrome,
            strict_currency,
            diagnostics_dir,
            no_diagnostics,
            compact,
        } => {
            let diagnostics_dir = if no_diagnostics {
                None
            } else {
                Some(diagnostics_dir.unwrap_or_else(Diagnostics::default_dir))
            };
            scrape_cmd::run(scrape_cmd::ScrapeOptions {
                id,
                password,
                base_url,
                browser: BrowserOptions {
                    headful,
                    executable: chrome,
                },
                mode: currency_mode(strict_currency),
                diagnostics_dir,
                compact,
                quiet: cli.quiet,
            })
            .await
        }
        Command::Parse {
            dashboard,
            portfolio,
            liabilities,
            strict_currency,
            compact,
        } => parse_cmd::run(parse_cmd::ParseOptions {
            dashboard,
            portfolio,
            liabilities,
            mode: currency_mode(strict_currency),
            compact,
            quiet: cli.quiet,
        }),
    };

    if let Err(e) = result {
        let s = Styled::new();
        eprintln!("  {} {}", s.fail_sym(), s.red(&format!("{e:#}")));
        std::process::exit(1);
    }
}
