//! Score post‑processing: sigmoid + thresholding.

pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Elementwise sigmoid. Each probability is logged at debug level.
pub fn sigmoid_transform(scores: &[f32]) -> Vec<f32> {
    scores
        .iter()
        .map(|&s| {
            let p = sigmoid(s);
            log::debug!("model output {p}");
            p
        })
        .collect()
}

/// One output unit that cleared the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredClass {
    pub index: usize,
    pub probability: f32,
}

/// Raw model outputs next to their sigmoid probabilities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scores {
    pub raw: Vec<f32>,
    pub probabilities: Vec<f32>,
}

impl Scores {
    pub fn from_raw(raw: Vec<f32>) -> Self {
        let probabilities = sigmoid_transform(&raw);
        Self { raw, probabilities }
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Units with `probability >= threshold`, most probable first.
    pub fn above(&self, threshold: f32) -> Vec<ScoredClass> {
        let mut hits: Vec<ScoredClass> = self
            .probabilities
            .iter()
            .enumerate()
            .filter(|(_, p)| **p >= threshold)
            .map(|(index, &probability)| ScoredClass { index, probability })
            .collect();
        hits.sort_by(|a, b| b.probability.total_cmp(&a.probability).then(a.index.cmp(&b.index)));
        hits
    }

    pub fn best(&self) -> Option<ScoredClass> {
        self.above(f32::NEG_INFINITY).into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_maps_to_half() {
        assert_eq!(sigmoid_transform(&[0.0]), vec![0.5]);
    }

    #[test]
    fn empty_in_empty_out() {
        assert!(sigmoid_transform(&[]).is_empty());
        assert!(Scores::from_raw(vec![]).best().is_none());
    }

    #[test]
    fn large_magnitudes_saturate() {
        let out = sigmoid_transform(&[20.0, -20.0]);
        assert!((out[0] - 1.0).abs() < 1e-6);
        assert!(out[1].abs() < 1e-6);
        assert!(out[1] >= 0.0);
    }

    #[test]
    fn preserves_length_and_order() {
        let raw = [-3.0, -1.0, 0.0, 1.0, 3.0];
        let out = sigmoid_transform(&raw);
        assert_eq!(out.len(), raw.len());
        assert!(out.windows(2).all(|w| w[0] < w[1]));
        // symmetric: σ(-x) = 1 - σ(x)
        assert!((out[0] + out[4] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn above_sorts_by_probability() {
        let scores = Scores::from_raw(vec![0.0, 4.0, -4.0, 2.0]);
        let hits = scores.above(0.5);
        let idx: Vec<usize> = hits.iter().map(|h| h.index).collect();
        assert_eq!(idx, vec![1, 3, 0]);
        assert_eq!(scores.best().map(|b| b.index), Some(1));
        assert!(scores.above(0.999).is_empty());
    }
}
