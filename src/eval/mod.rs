//! Offline evaluation of trained embeddings
//!
//! Held-out users are ranked by next-item retrieval: hit ratio and mean
//! reciprocal rank at a cutoff `k`.
//!
//! ## Example
//!
//! ```
//! use itemvec::data::EvalCase;
//! use itemvec::embedding::{Item2Vec, Item2VecConfig};
//! use itemvec::eval::evaluate_ranking;
//!
//! let model = Item2Vec::new(Item2VecConfig::new(6, 4).with_seed(1)).unwrap();
//! let cases = vec![EvalCase { context: vec![1, 2], target: 3 }];
//! let report = evaluate_ranking(&model, &cases, 5).unwrap();
//! assert!(report.hit_ratio >= 0.0 && report.hit_ratio <= 1.0);
//! ```

mod ranking;

pub use ranking::{evaluate_ranking, hit_ratio_at_k, mrr_at_k, RankingReport};
