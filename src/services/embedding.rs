use crate::core::collaborators::SimilarityService;
use crate::core::error::ContractViolation;
use crate::models::{Need, Provider};

/// Cosine similarity between two embedding vectors.
///
/// Returns a value in [-1, 1]; a zero-norm vector yields 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, ContractViolation> {
    if a.is_empty() || b.is_empty() {
        return Err(ContractViolation::EmptyEmbedding);
    }
    if a.len() != b.len() {
        return Err(ContractViolation::EmbeddingDimensionMismatch {
            need: a.len(),
            provider: b.len(),
        });
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a <= f64::EPSILON || norm_b <= f64::EPSILON {
        return Ok(0.0);
    }

    Ok((dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0))
}

/// Similarity over the embeddings stored on needs and providers.
///
/// Negative cosine values are clamped to 0 so the score lands in [0, 1].
#[derive(Debug, Clone, Copy, Default)]
pub struct CosineSimilarity;

impl SimilarityService for CosineSimilarity {
    fn similarity(&self, need: &Need, provider: &Provider) -> Result<f64, ContractViolation> {
        cosine_similarity(&need.embedding, &provider.embedding).map(|score| score.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_vectors() {
        let score = cosine_similarity(&[0.3, 0.4, 0.5], &[0.3, 0.4, 0.5]).unwrap();
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_orthogonal_vectors() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_opposite_vectors_clamp_to_zero() {
        let need = Need {
            id: "n".to_string(),
            major_category: "Famille".to_string(),
            sub_category: "Scolarité".to_string(),
            description: String::new(),
            city: None,
            urgency: None,
            embedding: vec![1.0, 0.0],
        };
        let provider = Provider {
            id: "p".to_string(),
            company_name: "Acme".to_string(),
            expertise_domains: vec![],
            description: String::new(),
            city: None,
            availability: String::new(),
            embedding: vec![-1.0, 0.0],
        };
        assert_eq!(CosineSimilarity.similarity(&need, &provider).unwrap(), 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        assert_eq!(
            cosine_similarity(&[1.0, 0.0], &[1.0]),
            Err(ContractViolation::EmbeddingDimensionMismatch { need: 2, provider: 1 })
        );
    }

    #[test]
    fn test_empty_and_zero_vectors() {
        assert_eq!(cosine_similarity(&[], &[1.0]), Err(ContractViolation::EmptyEmbedding));
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]).unwrap(), 0.0);
    }
}
