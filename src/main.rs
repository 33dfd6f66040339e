use std::process::ExitCode;

use employee_events_lib::cli::{parse_args, Command, USAGE};
use employee_events_lib::config::load_config;
use employee_events_lib::db::EventsDb;
use employee_events_lib::report::build_report;
use employee_events_lib::risk::{LogisticModel, RiskClassifier};
use employee_events_lib::views::{EntityView, SubjectSpec};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let invocation = match parse_args(std::env::args().skip(1)) {
        Ok(inv) => inv,
        Err(e) => {
            eprintln!("{e}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    let config = match load_config(invocation.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let db = EventsDb::new(&config.database_path);

    match run(&db, &config.model_path, invocation.command) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(
    db: &EventsDb,
    model_path: &std::path::Path,
    command: Command,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match command {
        Command::List(kind) => {
            let view = EntityView::new(db, SubjectSpec::for_kind(kind));
            print_json(&view.list_identities()?)?;
        }
        Command::Report(kind, id) => {
            let view = EntityView::new(db, SubjectSpec::for_kind(kind));
            let model = match LogisticModel::load(model_path) {
                Ok(model) => Some(model),
                Err(e) => {
                    log::warn!("Risk score unavailable: {e}");
                    None
                }
            };
            let classifier = model.as_ref().map(|m| m as &dyn RiskClassifier);
            print_json(&build_report(&view, classifier, id)?)?;
        }
        Command::Check => {
            let missing = db.missing_tables()?;
            print_json(&missing)?;
            if !missing.is_empty() {
                log::warn!("{} is missing tables: {}", db.path().display(), missing.join(", "));
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
