use crate::{Ed25519Verifier, OutputIndex, SignatureVerifier, Transaction, Utxo, UtxoPool};
use log::{debug, info, trace};
use std::collections::HashSet;

/// Maintains the public ledger of unspent outputs and settles batches of transactions
/// against it.
///
/// The handler owns a private copy of the pool it was created with. Every accepted
/// transaction is applied to that copy immediately, so later transactions in the same batch
/// are validated against a pool that already reflects the earlier ones.
pub struct TxHandler<V = Ed25519Verifier> {
    utxo_pool: UtxoPool,
    verifier: V,
}

impl TxHandler<Ed25519Verifier> {
    pub fn new(utxo_pool: &UtxoPool) -> Self {
        Self::with_verifier(utxo_pool, Ed25519Verifier)
    }
}

impl<V: SignatureVerifier> TxHandler<V> {
    pub fn with_verifier(utxo_pool: &UtxoPool, verifier: V) -> Self {
        Self {
            utxo_pool: utxo_pool.clone(),
            verifier,
        }
    }

    pub fn utxo_pool(&self) -> &UtxoPool {
        &self.utxo_pool
    }

    pub fn into_utxo_pool(self) -> UtxoPool {
        self.utxo_pool
    }

    /// Returns true if:
    ///   - all outputs claimed by the transaction are in the current UTXO pool,
    ///   - the signatures on each input of the transaction are valid,
    ///   - no UTXO is claimed multiple times by the transaction,
    ///   - all of the transaction's output values are non-negative,
    ///   - the sum of the input values is greater than or equal to the sum of the output
    ///     values.
    pub fn is_valid_tx(&self, transaction: &Transaction) -> bool {
        self.validate(transaction).is_ok()
    }

    /// Same checks as `is_valid_tx`, reporting the first violated one.
    pub fn validate(&self, transaction: &Transaction) -> Result<(), String> {
        let input_sum = self.validate_inputs_are_unspent_and_signed(transaction)?;
        Self::validate_no_utxo_claimed_twice(transaction)?;
        let output_sum = Self::validate_output_values_are_non_negative(transaction)?;
        Self::validate_inputs_cover_outputs(transaction, input_sum, output_sum)
    }

    /// Handles an epoch: checks each proposed transaction in the given order, applies the
    /// valid ones to the pool and returns them.
    /// A transaction that conflicts with one accepted earlier in the batch is rejected,
    /// because the output it claims is no longer in the pool.
    pub fn handle_txs(&mut self, possible_txs: &[Transaction]) -> Vec<Transaction> {
        let mut accepted = Vec::new();
        for transaction in possible_txs {
            match self.validate(transaction) {
                Ok(()) => {
                    self.apply(transaction);
                    accepted.push(transaction.clone());
                }
                Err(reason) => {
                    debug!("Rejected transaction {}: {}", transaction.id(), reason);
                }
            }
        }
        info!(
            "Settled epoch: {} candidates, {} accepted, {} rejected, {} unspent outputs",
            possible_txs.len(),
            accepted.len(),
            possible_txs.len() - accepted.len(),
            self.utxo_pool.len()
        );
        accepted
    }

    fn apply(&mut self, transaction: &Transaction) {
        for (index, output) in transaction.outputs().iter().enumerate() {
            let utxo = Utxo::new(*transaction.id(), OutputIndex::new(index as u32));
            trace!("Adding {} -> {}", utxo, output);
            self.utxo_pool.add(utxo, output.clone());
        }
        for input in transaction.inputs() {
            let utxo = Utxo::new(*input.utxo_id(), *input.output_index());
            trace!("Spending {}", utxo);
            self.utxo_pool.remove(&utxo);
        }
    }

    /// Returns the total value of the spent outputs.
    fn validate_inputs_are_unspent_and_signed(
        &self,
        transaction: &Transaction,
    ) -> Result<f64, String> {
        let mut input_sum = 0.0;
        for (index, input) in transaction.inputs().iter().enumerate() {
            let utxo = Utxo::new(*input.utxo_id(), *input.output_index());
            let output = self.utxo_pool.get(&utxo).ok_or_else(|| {
                format!("Input: {} claims {} which is not in the pool.", index, utxo)
            })?;
            input_sum += output.value();
            let data = transaction.raw_data_to_sign(index)?;
            if !self
                .verifier
                .verify(output.public_key(), &data, input.signature())
            {
                return Err(format!(
                    "Input: {} has an invalid signature for {} owned by: {}",
                    index,
                    utxo,
                    output.public_key()
                ));
            }
        }
        Ok(input_sum)
    }

    fn validate_no_utxo_claimed_twice(transaction: &Transaction) -> Result<(), String> {
        let mut claimed = HashSet::new();
        for input in transaction.inputs() {
            let utxo = Utxo::new(*input.utxo_id(), *input.output_index());
            if !claimed.insert(utxo) {
                return Err(format!("{} is claimed more than once.", utxo));
            }
        }
        Ok(())
    }

    /// Returns the total value of the outputs.
    fn validate_output_values_are_non_negative(transaction: &Transaction) -> Result<f64, String> {
        let mut output_sum = 0.0;
        for (index, output) in transaction.outputs().iter().enumerate() {
            // Written so that NaN is rejected as well.
            if !(output.value() >= 0.0) {
                return Err(format!(
                    "Output: {} has a negative value: {}",
                    index,
                    output.value()
                ));
            }
            output_sum += output.value();
        }
        Ok(output_sum)
    }

    fn validate_inputs_cover_outputs(
        transaction: &Transaction,
        input_sum: f64,
        output_sum: f64,
    ) -> Result<(), String> {
        if input_sum >= output_sum {
            Ok(())
        } else {
            Err(format!(
                "Transaction: {} spends {} but creates {}",
                transaction.id(),
                input_sum,
                output_sum
            ))
        }
    }
}
