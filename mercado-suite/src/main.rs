use clap::{Arg, ArgAction, Command};
use console::Term;
use mercado_core::{get_config, ListReporter, Runner};

fn build_cli() -> Command {
    Command::new("mercado-suite")
        .about("End-to-end suite for the Mercado marketplace API")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .subcommand(
            Command::new("test")
                .about("Run the suite")
                .arg(
                    Arg::new("groups")
                        .short('g')
                        .long("groups")
                        .help("Run only the named groups, comma-separated. e.g. --groups Mercado,Doces")
                        .value_delimiter(',')
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("capture-checks")
                        .long("capture-checks")
                        .help("Print every evaluated expectation, not just case results")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("capture-rust")
                        .long("capture-rust")
                        .help("Capture tracing logs, including the request/response lines")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("ls").about("List groups and cases"))
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let matches = build_cli().get_matches();

    let mut runner = Runner::with_config(get_config().clone());
    mercado_suite::install(&mut runner);

    match matches.subcommand() {
        Some(("test", test_matches)) => {
            let groups = test_matches
                .get_many::<String>("groups")
                .map(|vals| vals.cloned().collect::<Vec<_>>())
                .unwrap_or_default();
            let capture_checks = test_matches.get_flag("capture-checks");

            if test_matches.get_flag("capture-rust") {
                runner.capture_rust();
            }
            runner.terminate_channel();
            runner.add_reporter(ListReporter::new(capture_checks));

            runner.run(&groups).await
        }
        Some(("ls", _)) => {
            let term = Term::stdout();
            for (group, cases) in runner.list() {
                term.write_line(&format!("* {group}"))?;
                for case in cases {
                    term.write_line(&format!("  - {group}::{case}"))?;
                }
            }
            Ok(())
        }
        _ => unreachable!("subcommand required is set to true"),
    }
}
