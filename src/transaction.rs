use crate::{KeyPair, PublicKey, Sha256};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A double SHA-256 hash of the transaction data.
#[derive(Debug, Hash, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct TransactionId(Sha256);

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TransactionId {
    pub fn new(data: Sha256) -> Self {
        Self(data)
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}

/// The index of the transaction output.
#[derive(Debug, Hash, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct OutputIndex(u32);

impl Display for OutputIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OutputIndex {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    // 32 bytes. A pointer to the transaction containing the UTXO to be spent.
    utxo_id: TransactionId,
    // 4 bytes. The number of UTXO to be spent, the first one is 0.
    output_index: OutputIndex,
    // Signature over the raw data to sign for this input, made with the key that owns
    // the referenced output.
    signature: Vec<u8>,
}

impl Display for TransactionInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.utxo_id, self.output_index)
    }
}

impl TransactionInput {
    pub fn new(utxo_id: TransactionId, output_index: OutputIndex, signature: Vec<u8>) -> Self {
        Self {
            utxo_id,
            output_index,
            signature,
        }
    }

    pub fn utxo_id(&self) -> &TransactionId {
        &self.utxo_id
    }

    pub fn output_index(&self) -> &OutputIndex {
        &self.output_index
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionOutput {
    value: f64,
    public_key: PublicKey,
}

impl Display for TransactionOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.value, self.public_key)
    }
}

impl TransactionOutput {
    pub fn new(value: f64, public_key: PublicKey) -> Self {
        Self { value, public_key }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    id: TransactionId,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl Transaction {
    pub fn new(
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
    ) -> Result<Self, String> {
        let id = Self::hash_transaction_data(&inputs, &outputs)?;
        Ok(Self {
            id,
            inputs,
            outputs,
        })
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn inputs(&self) -> &[TransactionInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TransactionOutput] {
        &self.outputs
    }

    /// Returns the bytes that the owner of the output referenced by the input at `index`
    /// signs. The data commits to the spent output and to every output of the transaction.
    pub fn raw_data_to_sign(&self, index: usize) -> Result<Vec<u8>, String> {
        raw_data_to_sign(&self.inputs, &self.outputs, index)
    }

    fn hash_transaction_data(
        inputs: &[TransactionInput],
        outputs: &[TransactionOutput],
    ) -> Result<TransactionId, String> {
        let data = bincode::serialize(&(inputs, outputs)).map_err(|e| e.to_string())?;
        Ok(TransactionId(Sha256::double_digest(&data)))
    }
}

impl Display for Transaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] => [{}]",
            self.id,
            self.inputs
                .iter()
                .map(TransactionInput::to_string)
                .collect::<Vec<String>>()
                .join(", "),
            self.outputs
                .iter()
                .map(TransactionOutput::to_string)
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}

fn raw_data_to_sign(
    inputs: &[TransactionInput],
    outputs: &[TransactionOutput],
    index: usize,
) -> Result<Vec<u8>, String> {
    let input = inputs.get(index).ok_or_else(|| {
        format!(
            "Input index: {} is out of range for a transaction with {} inputs.",
            index,
            inputs.len()
        )
    })?;
    bincode::serialize(&(input.utxo_id(), input.output_index(), outputs)).map_err(|e| e.to_string())
}

/// Collects inputs and outputs of a transaction before it gets its identity.
/// Each input is signed after all outputs are known, because the signed data includes them.
#[derive(Debug, Clone, Default)]
pub struct UnsignedTransaction {
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl UnsignedTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_input(&mut self, utxo_id: TransactionId, output_index: OutputIndex) -> &mut Self {
        self.inputs
            .push(TransactionInput::new(utxo_id, output_index, vec![]));
        self
    }

    pub fn add_output(&mut self, value: f64, public_key: PublicKey) -> &mut Self {
        self.outputs.push(TransactionOutput::new(value, public_key));
        self
    }

    pub fn sign_input(&mut self, index: usize, key_pair: &KeyPair) -> Result<&mut Self, String> {
        let data = raw_data_to_sign(&self.inputs, &self.outputs, index)?;
        self.inputs[index].signature = key_pair.sign(&data);
        Ok(self)
    }

    /// Overrides the signature of the input at `index` as is.
    pub fn set_signature(&mut self, index: usize, signature: Vec<u8>) -> Result<&mut Self, String> {
        let input = self
            .inputs
            .get_mut(index)
            .ok_or_else(|| format!("No input at index: {}", index))?;
        input.signature = signature;
        Ok(self)
    }

    pub fn finalize(&self) -> Result<Transaction, String> {
        Transaction::new(self.inputs.clone(), self.outputs.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genesis_id() -> TransactionId {
        TransactionId::new(Sha256::digest(b"genesis"))
    }

    fn spend(value: f64, to: &KeyPair, from: &KeyPair) -> Transaction {
        UnsignedTransaction::new()
            .add_input(genesis_id(), OutputIndex::new(0))
            .add_output(value, to.public_key())
            .sign_input(0, from)
            .unwrap()
            .finalize()
            .unwrap()
    }

    #[test]
    fn raw_data_to_sign_is_deterministic() {
        let alice = KeyPair::from_seed(1);
        let bob = KeyPair::from_seed(2);
        let lhs = spend(10.0, &bob, &alice);
        let rhs = spend(10.0, &bob, &alice);
        assert_eq!(lhs.raw_data_to_sign(0), rhs.raw_data_to_sign(0));
        assert_eq!(lhs.id(), rhs.id());
    }

    #[test]
    fn raw_data_to_sign_commits_to_outputs() {
        let alice = KeyPair::from_seed(1);
        let bob = KeyPair::from_seed(2);
        let lhs = spend(10.0, &bob, &alice);
        let rhs = spend(9.0, &bob, &alice);
        assert_ne!(lhs.raw_data_to_sign(0), rhs.raw_data_to_sign(0));
    }

    #[test]
    fn raw_data_to_sign_ignores_signature() {
        let alice = KeyPair::from_seed(1);
        let bob = KeyPair::from_seed(2);
        let signed = spend(10.0, &bob, &alice);
        let unsigned = UnsignedTransaction::new()
            .add_input(genesis_id(), OutputIndex::new(0))
            .add_output(10.0, bob.public_key())
            .finalize()
            .unwrap();
        assert_eq!(signed.raw_data_to_sign(0), unsigned.raw_data_to_sign(0));
        assert_ne!(signed.id(), unsigned.id());
    }

    #[test]
    fn raw_data_to_sign_out_of_range() {
        let alice = KeyPair::from_seed(1);
        let transaction = spend(10.0, &alice, &alice);
        assert!(transaction.raw_data_to_sign(1).is_err());
    }

    #[test]
    fn sign_input_out_of_range() {
        let alice = KeyPair::from_seed(1);
        let mut unsigned = UnsignedTransaction::new();
        unsigned.add_output(1.0, alice.public_key());
        assert!(unsigned.sign_input(0, &alice).is_err());
        assert!(unsigned.set_signature(0, vec![]).is_err());
    }

    #[test]
    fn display_lists_inputs_and_outputs() {
        let alice = KeyPair::from_seed(1);
        let transaction = spend(10.0, &alice, &alice);
        let display = transaction.to_string();
        assert!(display.starts_with(&transaction.id().to_string()));
        assert!(display.contains(&format!("{}:0", genesis_id())));
        assert!(display.contains(&format!("10 -> {}", alice.public_key())));
    }
}
