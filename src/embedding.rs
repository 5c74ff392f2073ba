use crate::windowing::WindowSequence;
use itertools::Itertools;
use ndarray::{Array1, Array2, ArrayView1};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding corpus is empty")]
    EmptyCorpus,
    #[error("cannot open {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("bad model state in {path}: {source}")]
    Codec {
        path: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct TrainParams {
    pub vector_size: usize,
    pub window: usize,
    pub min_count: usize,
    pub epochs: usize,
    pub negative: usize,
    pub learning_rate: f32,
    pub seed: u64,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            vector_size: 100,
            window: 5,
            min_count: 1,
            epochs: 5,
            negative: 5,
            learning_rate: 0.025,
            seed: 1,
        }
    }
}

/// Skip-gram embeddings over the event-id vocabulary, one row per id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventVectorModel {
    vector_size: usize,
    vocab: Vec<String>,
    index: BTreeMap<String, usize>,
    vectors: Array2<f32>,
}

impl EventVectorModel {
    /// Train skip-gram with negative sampling, each window sequence acting as
    /// one sentence. Deterministic for a fixed seed.
    pub fn train(
        sequences: &[WindowSequence],
        params: TrainParams,
    ) -> Result<Self, EmbeddingError> {
        // Frequency-ordered vocabulary, ties broken lexically for stability.
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for seq in sequences {
            for id in &seq.event_ids {
                *counts.entry(id.as_str()).or_insert(0) += 1;
            }
        }
        let vocab: Vec<String> = counts
            .iter()
            .filter(|(_, &c)| c >= params.min_count)
            .sorted_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)))
            .map(|(id, _)| (*id).to_string())
            .collect();
        if vocab.is_empty() {
            return Err(EmbeddingError::EmptyCorpus);
        }
        let index: BTreeMap<String, usize> = vocab
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        let dim = params.vector_size;
        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut input: Array2<f32> = Array2::from_shape_fn((vocab.len(), dim), |_| {
            (rng.gen::<f32>() - 0.5) / dim as f32
        });
        let mut output: Array2<f32> = Array2::zeros((vocab.len(), dim));

        // Unigram^0.75 negative-sampling distribution, as in word2vec.
        let weights: Vec<f64> = vocab
            .iter()
            .map(|id| (counts[id.as_str()] as f64).powf(0.75))
            .collect();
        let sampler = WeightedIndex::new(&weights).map_err(|_| EmbeddingError::EmptyCorpus)?;

        // Sentences as vocabulary indices, out-of-vocab ids dropped.
        let corpus: Vec<Vec<usize>> = sequences
            .iter()
            .map(|seq| {
                seq.event_ids
                    .iter()
                    .filter_map(|id| index.get(id).copied())
                    .collect()
            })
            .collect();

        for epoch in 0..params.epochs {
            let alpha =
                (params.learning_rate * (1.0 - epoch as f32 / params.epochs as f32)).max(1e-4);
            for sent in &corpus {
                for (pos, &center) in sent.iter().enumerate() {
                    // Dynamic context window, word2vec style.
                    let b = rng.gen_range(1..=params.window.max(1));
                    let lo = pos.saturating_sub(b);
                    let hi = (pos + b).min(sent.len().saturating_sub(1));
                    for ctx_pos in lo..=hi {
                        if ctx_pos == pos {
                            continue;
                        }
                        let ctx = sent[ctx_pos];
                        let v = input.row(center).to_owned();
                        let mut err: Array1<f32> = Array1::zeros(dim);
                        for k in 0..=params.negative {
                            let (target, label) = if k == 0 {
                                (ctx, 1.0)
                            } else {
                                let neg = sampler.sample(&mut rng);
                                if neg == ctx {
                                    continue;
                                }
                                (neg, 0.0)
                            };
                            let dot = v.dot(&output.row(target));
                            let g = (label - sigmoid(dot)) * alpha;
                            err.scaled_add(g, &output.row(target));
                            output.row_mut(target).scaled_add(g, &v);
                        }
                        input.row_mut(center).scaled_add(1.0, &err);
                    }
                }
            }
        }

        Ok(Self {
            vector_size: dim,
            vocab,
            index,
            vectors: input,
        })
    }

    /// Load the persisted model if it exists, otherwise train and persist.
    /// A file that exists but fails to decode triggers a retrain, matching the
    /// recovery behavior of the original pipeline.
    pub fn load_or_train(
        path: &Path,
        sequences: &[WindowSequence],
        params: TrainParams,
    ) -> Result<Self, EmbeddingError> {
        if path.exists() {
            match Self::load(path) {
                Ok(model) => {
                    info!(path = %path.display(), "embedding model loaded");
                    return Ok(model);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "stale model, retraining"),
            }
        }
        let model = Self::train(sequences, params)?;
        model.save(path)?;
        info!(path = %path.display(), vocab = model.vocab.len(), "embedding model trained and saved");
        Ok(model)
    }

    pub fn load(path: &Path) -> Result<Self, EmbeddingError> {
        let f = File::open(path).map_err(|source| EmbeddingError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(f)).map_err(|source| EmbeddingError::Codec {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), EmbeddingError> {
        let f = File::create(path).map_err(|source| EmbeddingError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::to_writer(BufWriter::new(f), self).map_err(|source| EmbeddingError::Codec {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn vector_size(&self) -> usize {
        self.vector_size
    }

    pub fn vocab(&self) -> &[String] {
        &self.vocab
    }

    pub fn vector(&self, event_id: &str) -> Option<ArrayView1<'_, f32>> {
        self.index.get(event_id).map(|&i| self.vectors.row(i))
    }

    /// Mean of the in-vocabulary embeddings of a sequence; the zero vector
    /// when none of its ids are known.
    pub fn sequence_vector(&self, event_ids: &[String]) -> Array1<f32> {
        let mut sum: Array1<f32> = Array1::zeros(self.vector_size);
        let mut n = 0usize;
        for id in event_ids {
            if let Some(v) = self.vector(id) {
                sum += &v;
                n += 1;
            }
        }
        if n > 0 {
            sum /= n as f32;
        }
        sum
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Stack one averaged vector per window into the sequence matrix.
pub fn sequence_matrix(model: &EventVectorModel, sequences: &[WindowSequence]) -> Array2<f32> {
    let mut m = Array2::zeros((sequences.len(), model.vector_size()));
    for (i, seq) in sequences.iter().enumerate() {
        m.row_mut(i).assign(&model.sequence_vector(&seq.event_ids));
    }
    m
}

pub fn save_matrix(matrix: &Array2<f32>, path: &Path) -> Result<(), EmbeddingError> {
    let f = File::create(path).map_err(|source| EmbeddingError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::to_writer(BufWriter::new(f), matrix).map_err(|source| EmbeddingError::Codec {
        path: path.display().to_string(),
        source,
    })
}

pub fn load_matrix(path: &Path) -> Result<Array2<f32>, EmbeddingError> {
    let f = File::open(path).map_err(|source| EmbeddingError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(f)).map_err(|source| EmbeddingError::Codec {
        path: path.display().to_string(),
        source,
    })
}
