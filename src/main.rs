use clap::Command;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let matches = Command::new("ledgercoin")
        .about("LedgerCoin transaction settlement tools.")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(ledgercoin_lib::commands::epoch_command())
        .get_matches();

    if let Some(matches) = matches.subcommand_matches("epoch") {
        ledgercoin_lib::commands::run_epoch_command(matches)
    } else {
        panic!("Should report help.");
    }
}
