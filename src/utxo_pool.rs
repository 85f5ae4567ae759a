use crate::{OutputIndex, TransactionId, TransactionOutput};
use std::collections::hash_map::Iter;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::iter::FromIterator;

/// An unspent transaction output, identified by the transaction that created it and its
/// index in that transaction.
#[derive(Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub struct Utxo {
    transaction_id: TransactionId,
    output_index: OutputIndex,
}

impl Utxo {
    pub fn new(transaction_id: TransactionId, output_index: OutputIndex) -> Self {
        Self {
            transaction_id,
            output_index,
        }
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn output_index(&self) -> &OutputIndex {
        &self.output_index
    }
}

impl Display for Utxo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.transaction_id, self.output_index)
    }
}

/// A pool of confirmed and unspent transaction outputs.
/// An output that is not in the pool has either been spent or never existed.
#[derive(Debug, Clone, Default)]
pub struct UtxoPool {
    utxos: HashMap<Utxo, TransactionOutput>,
}

impl UtxoPool {
    pub fn new() -> Self {
        Self {
            utxos: HashMap::new(),
        }
    }

    pub fn contains(&self, utxo: &Utxo) -> bool {
        self.utxos.contains_key(utxo)
    }

    pub fn get(&self, utxo: &Utxo) -> Option<&TransactionOutput> {
        self.utxos.get(utxo)
    }

    /// Inserts the output, replacing the existing entry for the same UTXO.
    pub fn add(&mut self, utxo: Utxo, output: TransactionOutput) {
        self.utxos.insert(utxo, output);
    }

    pub fn remove(&mut self, utxo: &Utxo) -> Option<TransactionOutput> {
        self.utxos.remove(utxo)
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    pub fn utxos(&self) -> impl Iterator<Item = &Utxo> {
        self.utxos.keys()
    }

    pub fn iter(&self) -> Iter<'_, Utxo, TransactionOutput> {
        self.utxos.iter()
    }
}

impl FromIterator<(Utxo, TransactionOutput)> for UtxoPool {
    fn from_iter<T: IntoIterator<Item = (Utxo, TransactionOutput)>>(iter: T) -> Self {
        Self {
            utxos: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KeyPair, Sha256};

    fn utxo(seed: &[u8], index: u32) -> Utxo {
        Utxo::new(
            TransactionId::new(Sha256::digest(seed)),
            OutputIndex::new(index),
        )
    }

    #[test]
    fn add_then_get() {
        let owner = KeyPair::from_seed(1).public_key();
        let mut pool = UtxoPool::new();
        pool.add(utxo(b"a", 0), TransactionOutput::new(5.0, owner));

        assert!(pool.contains(&utxo(b"a", 0)));
        assert!(!pool.contains(&utxo(b"a", 1)));
        assert!(!pool.contains(&utxo(b"b", 0)));
        assert_eq!(
            pool.get(&utxo(b"a", 0)),
            Some(&TransactionOutput::new(5.0, owner))
        );
        assert_eq!(pool.get(&utxo(b"b", 0)), None);
    }

    #[test]
    fn add_overwrites_existing_entry() {
        let owner = KeyPair::from_seed(1).public_key();
        let mut pool = UtxoPool::new();
        pool.add(utxo(b"a", 0), TransactionOutput::new(5.0, owner));
        pool.add(utxo(b"a", 0), TransactionOutput::new(7.0, owner));

        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(&utxo(b"a", 0)).map(TransactionOutput::value), Some(7.0));
    }

    #[test]
    fn remove_is_noop_for_absent_entry() {
        let owner = KeyPair::from_seed(1).public_key();
        let mut pool = UtxoPool::new();
        pool.add(utxo(b"a", 0), TransactionOutput::new(5.0, owner));

        assert_eq!(pool.remove(&utxo(b"b", 0)), None);
        assert_eq!(pool.len(), 1);
        assert_eq!(
            pool.remove(&utxo(b"a", 0)),
            Some(TransactionOutput::new(5.0, owner))
        );
        assert!(pool.is_empty());
    }

    #[test]
    fn clone_is_independent() {
        let owner = KeyPair::from_seed(1).public_key();
        let original: UtxoPool = vec![(utxo(b"a", 0), TransactionOutput::new(5.0, owner))]
            .into_iter()
            .collect();
        let mut copy = original.clone();
        copy.remove(&utxo(b"a", 0));
        copy.add(utxo(b"b", 0), TransactionOutput::new(1.0, owner));

        assert!(original.contains(&utxo(b"a", 0)));
        assert!(!original.contains(&utxo(b"b", 0)));
        assert_eq!(copy.utxos().collect::<Vec<&Utxo>>(), vec![&utxo(b"b", 0)]);
    }
}
