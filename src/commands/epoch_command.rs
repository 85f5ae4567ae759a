use crate::{EpochScenario, ScenarioParams, TxHandler};
use clap::{Arg, ArgMatches, Command};
use log::info;
use std::error::Error;

struct EpochCliOptions {
    params: ScenarioParams,
    enable_logging: bool,
}

impl EpochCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            params: ScenarioParams {
                owners: matches.value_of_t::<u32>("owners")?,
                coins_per_owner: matches.value_of_t::<u32>("coins")?,
                coin_value: matches.value_of_t::<f64>("value")?,
                conflicts: matches.value_of_t::<u32>("conflicts")?,
                invalid: matches.value_of_t::<u32>("invalid")?,
            },
            enable_logging: matches.is_present("enable_logging"),
        })
    }
}

pub fn epoch_command() -> Command<'static> {
    Command::new("epoch")
        .version("0.1")
        .about("Settles one epoch of generated transactions against a seeded UTXO pool.")
        .arg(
            Arg::new("owners")
                .long("owners")
                .value_name("N")
                .help("Number of key holders in the seeded pool.")
                .takes_value(true)
                .default_value("4"),
        )
        .arg(
            Arg::new("coins")
                .long("coins")
                .value_name("N")
                .help("Number of seeded unspent outputs per key holder.")
                .takes_value(true)
                .default_value("2"),
        )
        .arg(
            Arg::new("value")
                .long("value")
                .value_name("VALUE")
                .help("Value of each seeded unspent output.")
                .takes_value(true)
                .default_value("10.0"),
        )
        .arg(
            Arg::new("conflicts")
                .long("conflicts")
                .value_name("N")
                .help("Number of transactions that double-spend an output spent earlier in the batch.")
                .takes_value(true)
                .default_value("1"),
        )
        .arg(
            Arg::new("invalid")
                .long("invalid")
                .value_name("N")
                .help("Number of transactions that break a validation rule.")
                .takes_value(true)
                .default_value("1"),
        )
        .arg(
            Arg::new("enable_logging")
                .long("enable_logging")
                .help("If present, rejected transactions and pool updates are logged.")
                .takes_value(false)
                .required(false),
        )
}

pub fn run_epoch_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let options = EpochCliOptions::parse(matches)?;
    let default_filter = if options.enable_logging {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let scenario = EpochScenario::generate(&options.params)?;
    info!(
        "Generated {} candidates against {} unspent outputs",
        scenario.candidates().len(),
        scenario.utxo_pool().len()
    );

    let mut handler = TxHandler::new(scenario.utxo_pool());
    let accepted = handler.handle_txs(scenario.candidates());

    println!("Accepted transactions");
    for transaction in &accepted {
        println!("    {}", transaction);
    }

    // Sorted, so the output doesn't depend on the pool's iteration order.
    let mut utxos = handler.utxo_pool().iter().collect::<Vec<_>>();
    utxos.sort_by_key(|(utxo, _)| utxo.to_string());
    println!("Unspent outputs");
    for (utxo, output) in utxos {
        println!("    {} -> {}", utxo, output);
    }

    if accepted.len() != scenario.expected_accepted() {
        return Err(format!(
            "Expected {} accepted transactions, but got: {}",
            scenario.expected_accepted(),
            accepted.len()
        )
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults() {
        let matches = epoch_command().try_get_matches_from(vec!["epoch"]).unwrap();
        let options = EpochCliOptions::parse(&matches).unwrap();
        assert_eq!(options.params.owners, 4);
        assert_eq!(options.params.coins_per_owner, 2);
        assert_eq!(options.params.coin_value, 10.0);
        assert_eq!(options.params.conflicts, 1);
        assert_eq!(options.params.invalid, 1);
        assert!(!options.enable_logging);
    }

    #[test]
    fn parse_overrides() {
        let matches = epoch_command()
            .try_get_matches_from(vec![
                "epoch",
                "--owners",
                "7",
                "--value",
                "2.5",
                "--invalid",
                "10",
                "--enable_logging",
            ])
            .unwrap();
        let options = EpochCliOptions::parse(&matches).unwrap();
        assert_eq!(options.params.owners, 7);
        assert_eq!(options.params.coin_value, 2.5);
        assert_eq!(options.params.invalid, 10);
        assert!(options.enable_logging);
    }

    #[test]
    fn parse_rejects_non_numeric_values() {
        let matches = epoch_command()
            .try_get_matches_from(vec!["epoch", "--owners", "many"])
            .unwrap();
        assert!(EpochCliOptions::parse(&matches).is_err());
    }
}
