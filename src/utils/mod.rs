use std::cmp::Ordering;

pub mod metrics;
pub mod validation;

pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

/// Indices of the `k` highest scores, best first. Equal scores keep index order.
pub fn top_k_indices(scores: &[f64], k: usize) -> Vec<usize> {
    let mut indexed_scores: Vec<(usize, f64)> = scores.iter().copied().enumerate().collect();

    indexed_scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    indexed_scores
        .into_iter()
        .take(k)
        .map(|(i, _)| i)
        .collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);

        let a = vec![1.0, 1.0];
        let b = vec![2.0, 2.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-12);

        let zero = vec![0.0, 0.0];
        assert_eq!(cosine_similarity(&a, &zero), 0.0);
    }

    #[test]
    fn test_top_k_indices() {
        let scores = vec![0.1, 0.5, 0.3, 0.9, 0.2];
        assert_eq!(top_k_indices(&scores, 2), vec![3, 1]);
    }

    #[test]
    fn test_top_k_indices_ties_keep_order() {
        let scores = vec![0.5, 0.9, 0.5, 0.5];
        assert_eq!(top_k_indices(&scores, 3), vec![1, 0, 2]);
        assert_eq!(top_k_indices(&scores, 10).len(), 4);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[4.0, 8.0]), Some(6.0));
    }
}
