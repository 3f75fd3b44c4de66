use clap::{Arg, Command};
use dropflow::app_logic;
use tracing::Level;

fn main() {
    let matches = Command::new("Dropflow")
        .version("0.1.0")
        .about("Incremental rainflow cycle counting (ASTM E1049-85) for streamed load series")
        .arg(
            Arg::new("run")
                .short('r')
                .long("run")
                .value_name("CONFIG")
                .help("Run the counting job described by a YAML or TOML configuration file")
                .required(true),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log verbosity: error, warn, info, debug or trace")
                .default_value("info"),
        )
        .after_help("Cycles are reported as range, mean, count (1.0 for closed cycles, \
                     0.5 for half cycles), start index and end index.")
        .get_matches();

    let level = matches
        .get_one::<String>("log-level")
        .and_then(|l| l.parse::<Level>().ok())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Some(r) = matches.get_one::<String>("run") {
        if let Err(err) = app_logic::run(r) {
            tracing::error!("{:#}", err);
            std::process::exit(1);
        }
    }
}
