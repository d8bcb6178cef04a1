use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use relayping::config::{AppConfig, Cli, Mode, load_config};
use relayping::error::{AppError, report};
use relayping::output::prelude::*;
use relayping::probe::prelude::*;
use relayping::relays::prelude::*;

const DIRECTORY_TIMEOUT: Duration = Duration::from_secs(30);
const SEPARATOR_WIDTH: usize = 80;

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn print_table(table: &Table) {
    if table.is_empty() {
        println!("Nothing to list.");
    } else {
        print!("{}", table.render());
    }
}

fn print_separator() {
    println!("\n{}\n", "=".repeat(SEPARATOR_WIDTH));
}

fn print_listing(mode: &Mode, relays: &[Relay]) {
    match mode {
        Mode::ListCountries => print_table(&countries_table(&list_countries(relays))),
        Mode::ListCities => print_table(&cities_table(&list_cities(relays, None), None)),
        Mode::ListCitiesInCountry(code) => print_table(&cities_table(
            &list_cities(relays, Some(code.as_str())),
            Some(code.as_str()),
        )),
        Mode::ListProviders => print_table(&providers_table(&list_providers(relays))),
        Mode::Probe => {}
    }
}

fn print_report(config: &AppConfig, report: &RunReport) -> Result<(), AppError> {
    let Some(best) = report.best() else {
        return Ok(());
    };

    print_separator();
    if let Some(table) = fastest_table(report) {
        print!("{}", table.render());
    }
    if let Some(summary) = failure_summary(report) {
        println!("\n{summary}");
    }

    let mut selected = Some(best);
    if config.show_next_fastest {
        if let Some(table) = next_fastest_table(report, config.next_fastest_count) {
            print_separator();
            print!("{}", table.render());
            println!();
            selected = prompt_selection(
                report,
                config.next_fastest_count,
                io::stdin().lock(),
                io::stdout().lock(),
            )?;
        }
    }

    if let Some(entry) = selected {
        println!("\nYou selected the server: {}\n", entry.candidate.address);
        println!("Run the following command to connect to the selected server:");
        println!("{}", connect_hint(entry));
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = load_config(&cli)?;

    let client = build_client(DIRECTORY_TIMEOUT)?;
    let relays = fetch_relays(&client, &config.relay_list_url).await?;
    if relays.is_empty() {
        return Err(AppError::NoRelays);
    }

    if config.mode != Mode::Probe {
        print_listing(&config.mode, &relays);
        return Ok(());
    }

    let candidates = config
        .filter
        .apply(relays_to_candidates(&relays, &config.domain_suffix));
    if candidates.is_empty() {
        return Err(AppError::NothingToProbe);
    }

    let mut dispatcher = Dispatcher::new(config.prober());
    if !config.json && io::stderr().is_terminal() {
        dispatcher = dispatcher.with_progress(ProgressLine);
    }

    let report = dispatcher
        .run(&candidates, config.concurrency_limit, config.probe_timeout)
        .await?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&config, &report)?;
    }

    report.into_result()?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::Dispatch(DispatchError::AllFailed(failed))) => {
            eprintln!("No ping results were obtained ({} relays tried).", failed.total);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("relayping: {}", report(&e));
            e.exit_code()
        }
    }
}
