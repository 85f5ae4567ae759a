use crate::{
    KeyPair, OutputIndex, Sha256, Transaction, TransactionId, TransactionOutput,
    UnsignedTransaction, Utxo, UtxoPool,
};

/// Ways in which a generated transaction breaks the validation rules.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Violation {
    UnknownInput,
    WrongSignature,
    ClaimedTwice,
    NegativeOutput,
    Overspend,
}

impl Violation {
    const ALL: [Violation; 5] = [
        Violation::UnknownInput,
        Violation::WrongSignature,
        Violation::ClaimedTwice,
        Violation::NegativeOutput,
        Violation::Overspend,
    ];

    pub fn nth(n: usize) -> Self {
        Self::ALL[n % Self::ALL.len()]
    }
}

#[derive(Debug, Copy, Clone)]
pub struct ScenarioParams {
    pub owners: u32,
    pub coins_per_owner: u32,
    pub coin_value: f64,
    pub conflicts: u32,
    pub invalid: u32,
}

/// A deterministic epoch: a seeded pool and a batch of candidates to settle against it.
///
/// The batch starts with the invalid transactions, continues with one transfer per seeded
/// coin to the next owner and ends with the conflicting transactions, each of which spends
/// a coin that one of the transfers has already spent.
pub struct EpochScenario {
    owners: Vec<KeyPair>,
    utxo_pool: UtxoPool,
    candidates: Vec<Transaction>,
    expected_accepted: usize,
}

impl EpochScenario {
    pub fn generate(params: &ScenarioParams) -> Result<Self, String> {
        if params.owners == 0 || params.coins_per_owner == 0 {
            return Err("A scenario needs at least one owner with at least one coin.".to_string());
        }
        if !(params.coin_value.is_finite() && params.coin_value >= 0.0) {
            return Err(format!(
                "Coin value must be a finite non-negative number, but got: {}",
                params.coin_value
            ));
        }
        let coin_count = params
            .owners
            .checked_mul(params.coins_per_owner)
            .ok_or_else(|| {
                format!(
                    "Too many coins: {} owners with {} coins each.",
                    params.owners, params.coins_per_owner
                )
            })?;
        let owners = (0..params.owners as u64)
            .map(KeyPair::from_seed)
            .collect::<Vec<KeyPair>>();
        let genesis_id = TransactionId::new(Sha256::digest(b"genesis"));
        let coins = (0..coin_count)
            .map(|index| {
                let owner = (index / params.coins_per_owner) as usize;
                (Utxo::new(genesis_id, OutputIndex::new(index)), owner)
            })
            .collect::<Vec<(Utxo, usize)>>();
        let utxo_pool = coins
            .iter()
            .map(|(utxo, owner)| {
                let output = TransactionOutput::new(params.coin_value, owners[*owner].public_key());
                (*utxo, output)
            })
            .collect::<UtxoPool>();

        let next_owner = |owner: usize, step: usize| &owners[(owner + step) % owners.len()];
        let mut candidates = Vec::new();

        for n in 0..params.invalid as usize {
            let (utxo, owner) = &coins[n % coins.len()];
            let from = &owners[*owner];
            let to = next_owner(*owner, 1).public_key();
            let mut unsigned = UnsignedTransaction::new();
            match Violation::nth(n) {
                Violation::UnknownInput => {
                    let unknown = TransactionId::new(Sha256::digest(&n.to_le_bytes()));
                    unsigned
                        .add_input(unknown, *utxo.output_index())
                        .add_output(params.coin_value, to)
                        .sign_input(0, from)?;
                }
                Violation::WrongSignature => {
                    // Owners are seeded from the low end, so this key owns nothing.
                    let stranger = KeyPair::from_seed(u64::MAX - n as u64);
                    unsigned
                        .add_input(*utxo.transaction_id(), *utxo.output_index())
                        .add_output(params.coin_value, to)
                        .sign_input(0, &stranger)?;
                }
                Violation::ClaimedTwice => {
                    unsigned
                        .add_input(*utxo.transaction_id(), *utxo.output_index())
                        .add_input(*utxo.transaction_id(), *utxo.output_index())
                        .add_output(2.0 * params.coin_value, to)
                        .sign_input(0, from)?
                        .sign_input(1, from)?;
                }
                Violation::NegativeOutput => {
                    unsigned
                        .add_input(*utxo.transaction_id(), *utxo.output_index())
                        .add_output(params.coin_value + 1.0, to)
                        .add_output(-1.0, from.public_key())
                        .sign_input(0, from)?;
                }
                Violation::Overspend => {
                    // Adding a constant is lost to rounding for large values.
                    unsigned
                        .add_input(*utxo.transaction_id(), *utxo.output_index())
                        .add_output(params.coin_value * 2.0 + 1.0, to)
                        .sign_input(0, from)?;
                }
            }
            candidates.push(unsigned.finalize()?);
        }

        for (utxo, owner) in &coins {
            let transfer = UnsignedTransaction::new()
                .add_input(*utxo.transaction_id(), *utxo.output_index())
                .add_output(params.coin_value, next_owner(*owner, 1).public_key())
                .sign_input(0, &owners[*owner])?
                .finalize()?;
            candidates.push(transfer);
        }

        for n in 0..params.conflicts as usize {
            let (utxo, owner) = &coins[n % coins.len()];
            // Differs from the transfer in the recipient and the value, so the ID differs too.
            let conflict = UnsignedTransaction::new()
                .add_input(*utxo.transaction_id(), *utxo.output_index())
                .add_output(params.coin_value / 2.0, next_owner(*owner, 2).public_key())
                .add_output(params.coin_value / 2.0, owners[*owner].public_key())
                .sign_input(0, &owners[*owner])?
                .finalize()?;
            candidates.push(conflict);
        }

        Ok(Self {
            owners,
            utxo_pool,
            candidates,
            expected_accepted: coins.len(),
        })
    }

    pub fn owners(&self) -> &Vec<KeyPair> {
        &self.owners
    }

    pub fn utxo_pool(&self) -> &UtxoPool {
        &self.utxo_pool
    }

    pub fn candidates(&self) -> &Vec<Transaction> {
        &self.candidates
    }

    /// Number of candidates that settle: one transfer per seeded coin.
    pub fn expected_accepted(&self) -> usize {
        self.expected_accepted
    }
}
