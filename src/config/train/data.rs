//! Datasets for a configured run

use crate::config::schema::TrainSpec;
use crate::data::{ContextWindowDataset, EvalCase, UserHistories};
use crate::error::Result;
use crate::train::ItemBatch;
use crate::vocab::Vocabulary;

/// Everything a run reads from disk
pub(crate) struct RunData {
    pub vocab: Vocabulary,
    pub train: ContextWindowDataset,
    /// Validation batches in file order
    pub valid: Vec<ItemBatch>,
    /// Held-out ranking cases
    pub test: Vec<EvalCase>,
}

/// Load the vocabulary and every configured split
///
/// A configured vocabulary file is used when it exists; otherwise the
/// vocabulary is built from the training users.
pub(crate) fn load_run_data(spec: &TrainSpec) -> Result<RunData> {
    let data = &spec.data;
    let train_users = UserHistories::load(data.resolve(&data.train))?;

    let vocab = match data.vocab.as_ref().map(|p| data.resolve(p)) {
        Some(path) if path.is_file() => {
            tracing::info!(path = %path.display(), "loading vocabulary");
            Vocabulary::load(path)?
        }
        _ => Vocabulary::build(train_users.items(), data.min_count)?,
    };
    tracing::info!(items = vocab.len(), users = train_users.len(), "vocabulary ready");

    let train = ContextWindowDataset::new(&train_users, &vocab, data.window_size)?;

    let valid = match &data.valid {
        Some(path) => {
            let users = UserHistories::load(data.resolve(path))?;
            ContextWindowDataset::new(&users, &vocab, data.window_size)?.batches(data.batch_size, None)?
        }
        None => Vec::new(),
    };

    let test = match &data.test {
        Some(path) => {
            let users = UserHistories::load(data.resolve(path))?;
            EvalCase::from_histories(&users, &vocab, data.window_size)
        }
        None => Vec::new(),
    };

    tracing::info!(
        train_examples = train.len(),
        valid_batches = valid.len(),
        test_cases = test.len(),
        "datasets loaded"
    );
    Ok(RunData { vocab, train, valid, test })
}
