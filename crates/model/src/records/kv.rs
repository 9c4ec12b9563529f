use serde::{Deserialize, Serialize};

/// A single encoded key/value pair, opaque to the import pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvPair {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl KvPair {
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.key.len() + self.value.len()
    }
}

/// Ordered sequence of key/value pairs written to a staging engine in one call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rows {
    pairs: Vec<KvPair>,
}

impl Rows {
    pub fn from_kv_pairs(pairs: Vec<KvPair>) -> Self {
        Self { pairs }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn size_bytes(&self) -> usize {
        self.pairs.iter().map(KvPair::size_bytes).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KvPair> {
        self.pairs.iter()
    }

    pub fn as_slice(&self) -> &[KvPair] {
        &self.pairs
    }
}

impl FromIterator<KvPair> for Rows {
    fn from_iter<I: IntoIterator<Item = KvPair>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Rows {
    type Item = &'a KvPair;
    type IntoIter = std::slice::Iter<'a, KvPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}
