use crate::error::app_error::AppError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

/// Comments scored per batch.
pub const PREDICT_BATCH_SIZE: usize = 32;

/// Serialized classifier artifact: a linear model over token ids with a
/// softmax head for {benign, judi}.
#[derive(Debug, Deserialize)]
pub struct ClassifierArtifact {
    pub vocab: HashMap<String, usize>,
    pub weights: Vec<[f32; 2]>,
    pub bias: [f32; 2],
    pub max_len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub is_judi: bool,
    pub confidence: f64,
}

pub struct Classifier {
    artifact: ClassifierArtifact,
}

impl Classifier {
    pub fn from_artifact(artifact: ClassifierArtifact) -> Result<Self, AppError> {
        let out_of_range = artifact.vocab.values().any(|&id| id >= artifact.weights.len());
        if out_of_range {
            return Err(AppError::Internal("Classifier vocab references a weight row that does not exist".to_string()));
        }
        if artifact.max_len == 0 {
            return Err(AppError::Internal("Classifier max_len must be positive".to_string()));
        }
        Ok(Self { artifact })
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read(path).map_err(|e| AppError::Internal(format!("Failed to read classifier artifact: {e}")))?;
        let artifact: ClassifierArtifact =
            serde_json::from_slice(&raw).map_err(|e| AppError::Internal(format!("Failed to parse classifier artifact: {e}")))?;
        Self::from_artifact(artifact)
    }

    /// Whitespace tokens to vocab ids; unknown tokens are skipped and the
    /// sequence is truncated at `max_len`. Over-long input is never
    /// rejected.
    fn token_ids(&self, normalized: &str) -> Vec<usize> {
        normalized
            .split_whitespace()
            .filter_map(|token| self.artifact.vocab.get(token).copied())
            .take(self.artifact.max_len)
            .collect()
    }

    /// Score one already-normalized text. Argmax label with the softmax
    /// probability of the winning class as confidence.
    pub fn score(&self, normalized: &str) -> Score {
        let mut logits = [f64::from(self.artifact.bias[0]), f64::from(self.artifact.bias[1])];
        for id in self.token_ids(normalized) {
            logits[0] += f64::from(self.artifact.weights[id][0]);
            logits[1] += f64::from(self.artifact.weights[id][1]);
        }

        let max = logits[0].max(logits[1]);
        let exp = [(logits[0] - max).exp(), (logits[1] - max).exp()];
        let sum = exp[0] + exp[1];

        let is_judi = logits[1] > logits[0];
        let confidence = if is_judi { exp[1] / sum } else { exp[0] / sum };

        Score { is_judi, confidence }
    }
}

/// Shared classifier state. A missing or unreadable artifact disables
/// classification but never the process; every other capability keeps
/// working.
#[derive(Clone)]
pub struct ClassifierHandle(Option<Arc<Classifier>>);

impl ClassifierHandle {
    pub fn from_path(path: &Path) -> Self {
        match Classifier::load(path) {
            Ok(classifier) => {
                info!(path = %path.display(), "classifier artifact loaded");
                ClassifierHandle(Some(Arc::new(classifier)))
            }
            Err(e) => {
                error!(error = ?e, path = %path.display(), "classifier artifact unavailable, prediction disabled");
                ClassifierHandle(None)
            }
        }
    }

    pub fn disabled() -> Self {
        ClassifierHandle(None)
    }

    #[cfg(test)]
    pub fn from_classifier(classifier: Classifier) -> Self {
        ClassifierHandle(Some(Arc::new(classifier)))
    }

    pub fn get(&self) -> Result<&Classifier, AppError> {
        self.0
            .as_deref()
            .ok_or_else(|| AppError::Internal("Classifier model is not loaded".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn test_classifier() -> Classifier {
        // "judi" and "gacor" push hard toward the positive class.
        let vocab = HashMap::from([
            ("judi".to_string(), 0),
            ("gacor".to_string(), 1),
            ("menang".to_string(), 2),
            ("video".to_string(), 3),
            ("bagus".to_string(), 4),
        ]);
        let weights = vec![[-2.0, 2.0], [-1.5, 1.5], [-0.5, 0.5], [1.0, -1.0], [1.0, -1.0]];
        Classifier::from_artifact(ClassifierArtifact {
            vocab,
            weights,
            bias: [0.2, -0.2],
            max_len: 4,
        })
        .unwrap()
    }

    #[test]
    fn scores_spam_and_benign_apart() {
        let model = test_classifier();

        let spam = model.score("judi gacor menang");
        assert!(spam.is_judi);
        assert!(spam.confidence > 0.9);

        let benign = model.score("video bagus");
        assert!(!benign.is_judi);
        assert!(benign.confidence > 0.5);
    }

    #[test]
    fn empty_text_falls_back_to_bias() {
        let model = test_classifier();
        let score = model.score("");
        assert!(!score.is_judi);
    }

    #[test]
    fn unknown_tokens_are_skipped() {
        let model = test_classifier();
        let with_noise = model.score("xyzzy judi qwerty gacor");
        let clean = model.score("judi gacor");
        assert_eq!(with_noise.is_judi, clean.is_judi);
        assert!((with_noise.confidence - clean.confidence).abs() < 1e-9);
    }

    #[test]
    fn long_input_is_truncated_not_rejected() {
        let model = test_classifier();
        // max_len is 4: the trailing "judi" repetitions must not count.
        let truncated = model.score("video bagus video bagus judi judi judi judi judi");
        let plain = model.score("video bagus video bagus");
        assert_eq!(truncated.is_judi, plain.is_judi);
        assert!(!truncated.is_judi);
    }

    #[test]
    fn confidence_is_a_probability() {
        let model = test_classifier();
        for text in ["judi", "video", "", "menang menang"] {
            let score = model.score(text);
            assert!(score.confidence >= 0.5 && score.confidence <= 1.0);
        }
    }

    #[test]
    fn rejects_vocab_pointing_past_weights() {
        let artifact = ClassifierArtifact {
            vocab: HashMap::from([("judi".to_string(), 9)]),
            weights: vec![[0.0, 0.0]],
            bias: [0.0, 0.0],
            max_len: 8,
        };
        assert!(Classifier::from_artifact(artifact).is_err());
    }

    #[test]
    fn handle_without_model_errors_on_use() {
        let handle = ClassifierHandle::disabled();
        assert!(handle.get().is_err());
    }
}
