//! Fixed-length embedding vector.
//!
//! Every path through the gateway (real backend or fallback) must produce
//! exactly [`EMBEDDING_DIM`] finite values. [`Embedding`] can only be built
//! through [`Embedding::try_from`], so holding one means the shape is valid.

use serde::{Deserialize, Serialize};

use crate::error::EmbeddingError;

/// Dimensionality of every embedding the gateway returns.
pub const EMBEDDING_DIM: usize = 128;

/// An ordered sequence of exactly [`EMBEDDING_DIM`] finite `f32` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct Embedding(Vec<f32>);

impl Embedding {
    /// The all-zeros embedding.
    pub fn zeros() -> Self {
        Self(vec![0.0; EMBEDDING_DIM])
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<f32>> for Embedding {
    type Error = EmbeddingError;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        if values.len() != EMBEDDING_DIM {
            return Err(EmbeddingError::WrongLength {
                expected: EMBEDDING_DIM,
                actual: values.len(),
            });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(EmbeddingError::NonFinite { index });
        }
        Ok(Self(values))
    }
}

impl From<Embedding> for Vec<f32> {
    fn from(embedding: Embedding) -> Self {
        embedding.0
    }
}

impl AsRef<[f32]> for Embedding {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_exact_dimension() {
        let emb = Embedding::try_from(vec![0.5; EMBEDDING_DIM]).unwrap();
        assert_eq!(emb.len(), EMBEDDING_DIM);
        assert!(!emb.is_empty());
    }

    #[test]
    fn test_rejects_wrong_length() {
        let err = Embedding::try_from(vec![0.0; 3]).unwrap_err();
        assert_eq!(
            err,
            EmbeddingError::WrongLength {
                expected: EMBEDDING_DIM,
                actual: 3
            }
        );
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut values = vec![1.0; EMBEDDING_DIM];
        values[7] = f32::NAN;
        let err = Embedding::try_from(values).unwrap_err();
        assert_eq!(err, EmbeddingError::NonFinite { index: 7 });
    }

    #[test]
    fn test_deserialize_enforces_shape() {
        let short: Result<Embedding, _> = serde_json::from_str("[1.0, 2.0]");
        assert!(short.is_err());

        let json = serde_json::to_string(&vec![0.25f32; EMBEDDING_DIM]).unwrap();
        let emb: Embedding = serde_json::from_str(&json).unwrap();
        assert_eq!(emb.as_slice()[0], 0.25);
    }
}
