//! A command-line client for the market monitoring dashboard.
//!
//! Logs in, loads every dashboard panel for a month range and prints a
//! summary. With `--watch` it keeps the session countdown running until the
//! session expires or the user interrupts.

use anyhow::{Context, Result};
use chrono::Local;
use market_watch::{
    ClientConfig, DashboardClient, LogoutReason, Navigation,
    auth::LoginRequest,
    dashboard::{DateRange, YearMonth},
};
use mw_client::{logging, render};
use pico_args::Arguments;
use std::io::{self, Write};
use tokio::{sync::broadcast::error::RecvError, time::Instant};

const HELP: &str = "\
Show the market monitoring dashboard

USAGE:
  mw_client [OPTIONS]

OPTIONS:
  --server URL          REST base URL  [default: env API_BASE_URL or http://localhost:8080/api]
  --username NAME       Username for login  [default: prompt]
  --password PASS       Password for login  [default: prompt]
  --start YYYYMM        First month of the rate panels  [default: twelve months ago]
  --end YYYYMM          Last month of the rate panels  [default: current month]

FLAGS:
  --watch               Keep the session countdown running until expiry or Ctrl-C
  -h, --help            Print help information

ENVIRONMENT:
  API_BASE_URL          REST base URL
  API_TIMEOUT_SECS      Request timeout in seconds
  SESSION_WINDOW_SECS   Session length in seconds
  SESSION_ANCHOR        Countdown start: first-observation or issued-at
  CREDENTIALS_PATH      File persisting the session between runs
  (See .env file for all configuration options)
";

struct Args {
    server_url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    start: Option<YearMonth>,
    end: Option<YearMonth>,
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        server_url: pargs.opt_value_from_str("--server")?,
        username: pargs.opt_value_from_str("--username")?,
        password: pargs.opt_value_from_str("--password")?,
        start: pargs.opt_value_from_str("--start")?,
        end: pargs.opt_value_from_str("--end")?,
        watch: pargs.contains("--watch"),
    };

    logging::init();
    run(args).await
}

fn date_range(start: Option<YearMonth>, end: Option<YearMonth>) -> Result<DateRange> {
    let range = match (start, end) {
        (None, None) => DateRange::default(),
        (None, Some(end)) => DateRange::ending(end, 12),
        (Some(start), end) => DateRange::new(start, end.unwrap_or_else(YearMonth::current))?,
    };
    Ok(range)
}

fn prompt(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(value) => print!("{label} [{value}]: "),
        None => print!("{label}: "),
    }
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();
    Ok(match (input.is_empty(), default) {
        (true, Some(value)) => value.to_string(),
        _ => input.to_string(),
    })
}

async fn run(args: Args) -> Result<()> {
    let config = ClientConfig::from_env(args.server_url).context("Invalid configuration")?;
    config.validate().context("Invalid configuration")?;
    let range = date_range(args.start, args.end).context("Invalid month range")?;

    let client = DashboardClient::from_config(config).context("Failed to create client")?;
    tracing::info!("Using backend {}", client.gateway().base_url());

    if let Some(user) = client.current_user().filter(|_| client.is_authenticated()) {
        println!("Resuming session of {}", user.username);
    } else {
        let username = match args.username {
            Some(u) => u,
            None => prompt("Username", Some(&whoami::username()))?,
        };
        let password = match args.password {
            Some(p) => p,
            None => prompt("Password", None)?,
        };

        println!("Logging in as {username}...");
        let request = LoginRequest { username, password };
        if let Err(e) = client.login(&request).await {
            logging::log_security_event("failed_login", Some(&request.username), &e.message);
            for line in e.detail_lines() {
                eprintln!("  {line}");
            }
            anyhow::bail!("Login failed: {}", e.user_message());
        }
        println!("Login successful!");
    }

    // Started before the first load so a 401 during it is reported too.
    let monitor = client.start_session_monitor();
    let mut navigation = client.subscribe_navigation();

    let started = Instant::now();
    let data = client.dashboard().dashboard(&range).await;
    let status = data.status();
    let failed = [
        data.product_management.is_error,
        data.sales_persons.is_error,
        data.institutions.is_error,
        data.commission_status.is_error,
        data.exchange_rates.is_error,
        data.interest_rates.is_error,
        data.consumer_price_index.is_error,
    ]
    .into_iter()
    .filter(|failed| *failed)
    .count();
    logging::log_api_request(
        "dashboard_load",
        u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        failed,
    );

    println!(
        "\nDashboard {} (loaded {})\n",
        range,
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    print!("{}", render::dashboard(&data));
    if let Some(err) = status.error {
        eprintln!("\nFirst error: {}", err);
    }

    if !args.watch {
        return Ok(());
    }

    println!("\nWatching session (Ctrl-C to quit)");
    let mut countdown = monitor.subscribe();
    let username = client.current_user().map(|u| u.username);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!();
                client.logout().await;
                println!("Logged out.");
                break;
            }
            event = navigation.recv() => match event {
                Ok(Navigation::Root { reason }) => {
                    if reason != LogoutReason::UserLogout {
                        logging::log_security_event(
                            "forced_logout",
                            username.as_deref(),
                            &reason.to_string(),
                        );
                    }
                    println!("\nLogged out: {reason}");
                    break;
                }
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
            changed = countdown.changed() => {
                if changed.is_err() {
                    break;
                }
                let line = render::session_line(&countdown.borrow_and_update());
                print!("\r{line:<48}");
                io::stdout().flush()?;
            }
        }
    }

    Ok(())
}
