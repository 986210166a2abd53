//! Training-group construction from scored retrieval candidates.
//!
//! Candidates scoring strictly above the per-query mean are positives, the rest
//! negatives. Up to half the group (rounded down) is filled with shuffled
//! positives, the remainder with shuffled negatives, and any shortfall is padded
//! by drawing negatives with replacement.

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use tracing::debug;

use crate::config::SampleConfig;
use crate::data::{Candidate, TrainingGroup};
use crate::errors::RerankDataError;
use crate::store::TableStore;
use crate::types::PassageIdx;
use crate::utils::format_sample;

/// Small deterministic RNG (splitmix64) used for reproducible group sampling.
#[derive(Debug, Clone)]
pub struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    /// Start a stream from `seed`; equal seeds replay equal streams.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64_internal(&mut self) -> u64 {
        let mut z = self.state.wrapping_add(0x9E3779B97F4A7C15);
        self.state = z;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }
}

impl rand::RngCore for DeterministicRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64_internal() as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next_u64_internal()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64_internal().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

/// Pair candidate ids with their scores.
///
/// Scores must be finite; a NaN or infinite score has no place relative to the mean.
pub fn zip_candidates(
    candidate_ids: &[PassageIdx],
    candidate_scores: &[f32],
) -> Result<Vec<Candidate>, RerankDataError> {
    if candidate_ids.len() != candidate_scores.len() {
        return Err(RerankDataError::LengthMismatch {
            ids: candidate_ids.len(),
            scores: candidate_scores.len(),
        });
    }
    candidate_ids
        .iter()
        .zip(candidate_scores)
        .map(|(&passage_idx, &score)| {
            if score.is_finite() {
                Ok(Candidate { passage_idx, score })
            } else {
                Err(RerankDataError::InvalidField {
                    field: "score".to_string(),
                    details: format!("candidate {passage_idx} has non-finite score {score}"),
                })
            }
        })
        .collect()
}

/// Arithmetic mean of finite candidate scores, kept within the observed range.
fn mean_score(candidates: &[Candidate]) -> f64 {
    let (sum, min, max) = candidates.iter().fold(
        (0.0f64, f64::INFINITY, f64::NEG_INFINITY),
        |(sum, min, max), c| {
            let score = f64::from(c.score);
            (sum + score, min.min(score), max.max(score))
        },
    );
    let mean = sum / candidates.len() as f64;
    if min > max {
        return mean;
    }
    // Summation rounding can land the mean just outside [min, max] when every
    // score is equal, which would turn the whole list into positives.
    mean.clamp(min, max)
}

/// Balanced selection in group order, plus how many leading entries are positives.
#[derive(Debug)]
struct Selection {
    picked: Vec<Candidate>,
    positives: usize,
    padded: usize,
}

fn balance<R: Rng + ?Sized>(
    mut positives: Vec<Candidate>,
    mut negatives: Vec<Candidate>,
    train_group_size: usize,
    rng: &mut R,
) -> Result<Selection, RerankDataError> {
    positives.shuffle(rng);
    negatives.shuffle(rng);

    let mut picked: Vec<Candidate> = positives.into_iter().take(train_group_size / 2).collect();
    let taken_positives = picked.len();
    picked.extend(
        negatives
            .iter()
            .take(train_group_size - taken_positives)
            .copied(),
    );

    let padded = train_group_size - picked.len();
    if padded > 0 && negatives.is_empty() {
        return Err(RerankDataError::InsufficientData(format!(
            "group needs {padded} more candidates but the negative pool is empty"
        )));
    }
    for _ in 0..padded {
        let extra = negatives.choose(rng).copied().ok_or_else(|| {
            RerankDataError::InsufficientData("negative pool is empty".to_string())
        })?;
        picked.push(extra);
    }

    Ok(Selection {
        picked,
        positives: taken_positives,
        padded,
    })
}

/// Build one training group for query row `query_idx`.
///
/// Returns exactly `config.train_group_size` formatted texts and their scores
/// in selection order: positives first, then negatives, then padding.
pub fn build_sample<Q, P, R>(
    query_idx: usize,
    candidate_ids: &[PassageIdx],
    candidate_scores: &[f32],
    query_store: &Q,
    passage_store: &P,
    config: &SampleConfig,
    rng: &mut R,
) -> Result<TrainingGroup, RerankDataError>
where
    Q: TableStore + ?Sized,
    P: TableStore + ?Sized,
    R: Rng + ?Sized,
{
    config.validate()?;
    let candidates = zip_candidates(candidate_ids, candidate_scores)?;
    if candidates.is_empty() {
        return Err(RerankDataError::EmptyInput(format!(
            "query {query_idx} has no candidates"
        )));
    }

    let query_text = query_store.lookup(query_idx)?.text(&config.keyword_field)?;

    let mean = mean_score(&candidates);
    let (positives, negatives): (Vec<Candidate>, Vec<Candidate>) = candidates
        .into_iter()
        .partition(|c| f64::from(c.score) > mean);
    debug!(
        "[rerank_data:sampler] query {} mean={:.6} positives={} negatives={}",
        query_idx,
        mean,
        positives.len(),
        negatives.len()
    );

    let selection = balance(positives, negatives, config.train_group_size, rng)?;
    if selection.padded > 0 {
        debug!(
            "[rerank_data:sampler] query {} padded {} slots from negatives",
            query_idx, selection.padded
        );
    }

    let mut texts = Vec::with_capacity(selection.picked.len());
    let mut scores = Vec::with_capacity(selection.picked.len());
    for candidate in &selection.picked {
        let passage = passage_store.lookup(candidate.passage_idx)?;
        let contents = config
            .content_fields
            .iter()
            .map(|field| passage.text(field))
            .collect::<Result<Vec<_>, _>>()?;
        texts.push(format_sample(
            &query_text,
            &contents,
            &config.query_prefix,
            &config.passage_prefix,
            &config.separator,
        )?);
        scores.push(candidate.score);
    }

    Ok(TrainingGroup {
        query_idx,
        texts,
        scores,
        positives: selection.positives,
    })
}

/// Builds training groups for successive queries from one seeded RNG stream.
pub struct GroupSampler {
    config: SampleConfig,
    rng: DeterministicRng,
}

impl GroupSampler {
    /// Validate `config` and seed the sampler's RNG from `config.seed`.
    pub fn new(config: SampleConfig) -> Result<Self, RerankDataError> {
        config.validate()?;
        let rng = DeterministicRng::new(config.seed);
        Ok(Self { config, rng })
    }

    /// Configuration every group is built with.
    pub fn config(&self) -> &SampleConfig {
        &self.config
    }

    /// Build the group for `query_idx`, advancing the sampler's RNG.
    pub fn build<Q, P>(
        &mut self,
        query_idx: usize,
        candidate_ids: &[PassageIdx],
        candidate_scores: &[f32],
        query_store: &Q,
        passage_store: &P,
    ) -> Result<TrainingGroup, RerankDataError>
    where
        Q: TableStore + ?Sized,
        P: TableStore + ?Sized,
    {
        build_sample(
            query_idx,
            candidate_ids,
            candidate_scores,
            query_store,
            passage_store,
            &self.config,
            &mut self.rng,
        )
    }
}
