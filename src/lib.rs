pub mod commands;
pub mod crypto;
pub mod epoch_scenario;
pub mod hash;
pub mod public_key;
pub mod transaction;
pub mod tx_handler;
pub mod utxo_pool;

pub use self::{
    crypto::*, epoch_scenario::*, hash::*, public_key::*, transaction::*, tx_handler::*,
    utxo_pool::*,
};
