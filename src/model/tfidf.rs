// src/model/tfidf.rs
use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{read_json, FeatureVector, ModelError, Vectorizer};

// Runs of two or more word characters.
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?u)\b\w\w+\b").expect("token regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}
fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}
fn default_lowercase() -> bool {
    true
}

/// JSON export of a fitted TF-IDF vectorizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfArtifact {
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f32>,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
    #[serde(default = "default_lowercase")]
    pub lowercase: bool,
}

/// Term-frequency × inverse-document-frequency transform over a fixed vocabulary.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    ngram_range: (usize, usize),
    sublinear_tf: bool,
    norm: Option<Norm>,
    lowercase: bool,
}

impl TfidfVectorizer {
    /// Unigram, L2-normalized vectorizer from a vocabulary and its idf weights.
    pub fn from_parts(
        vocabulary: HashMap<String, usize>,
        idf: Vec<f32>,
    ) -> Result<Self, ModelError> {
        Self::try_from(TfidfArtifact {
            vocabulary,
            idf,
            ngram_range: default_ngram_range(),
            sublinear_tf: false,
            norm: default_norm(),
            lowercase: true,
        })
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let artifact: TfidfArtifact = read_json(path, "tfidf vectorizer")?;
        Ok(Self::try_from(artifact)?)
    }

    fn vectorize_one(&self, text: &str) -> FeatureVector {
        let lowered;
        let text = if self.lowercase {
            lowered = text.to_lowercase();
            lowered.as_str()
        } else {
            text
        };
        let tokens: Vec<&str> = TOKEN_RE.find_iter(text).map(|m| m.as_str()).collect();

        let mut counts: HashMap<usize, f32> = HashMap::new();
        let (lo, hi) = self.ngram_range;
        for n in lo..=hi {
            if n > tokens.len() {
                break;
            }
            for window in tokens.windows(n) {
                let term = window.join(" ");
                if let Some(&col) = self.vocabulary.get(&term) {
                    *counts.entry(col).or_insert(0.0) += 1.0;
                }
            }
        }

        let mut data = vec![0.0f32; self.idf.len()];
        for (col, tf) in counts {
            let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
            data[col] = tf * self.idf[col];
        }

        let norm = match self.norm {
            Some(Norm::L2) => data.iter().map(|x| x * x).sum::<f32>().sqrt(),
            Some(Norm::L1) => data.iter().map(|x| x.abs()).sum::<f32>(),
            None => 0.0,
        };
        if norm > 0.0 {
            for x in &mut data {
                *x /= norm;
            }
        }
        FeatureVector::new(data)
    }
}

impl TryFrom<TfidfArtifact> for TfidfVectorizer {
    type Error = ModelError;

    fn try_from(a: TfidfArtifact) -> Result<Self, Self::Error> {
        if a.idf.is_empty() || a.vocabulary.is_empty() {
            return Err(ModelError::Unfitted("vectorizer has an empty vocabulary"));
        }
        if let Some((term, &col)) = a.vocabulary.iter().find(|(_, c)| **c >= a.idf.len()) {
            return Err(ModelError::InvalidArtifact(format!(
                "term '{term}' maps to column {col} but idf has {} entries",
                a.idf.len()
            )));
        }
        let (lo, hi) = a.ngram_range;
        if lo == 0 || lo > hi {
            return Err(ModelError::InvalidArtifact(format!(
                "bad ngram_range ({lo}, {hi})"
            )));
        }
        Ok(Self {
            vocabulary: a.vocabulary,
            idf: a.idf,
            ngram_range: a.ngram_range,
            sublinear_tf: a.sublinear_tf,
            norm: a.norm,
            lowercase: a.lowercase,
        })
    }
}

impl Vectorizer for TfidfVectorizer {
    fn transform(&self, texts: &[String]) -> Result<Vec<FeatureVector>, ModelError> {
        Ok(texts.iter().map(|t| self.vectorize_one(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.idf.len()
    }
}
