//! Model checkpointing
//!
//! A [`ModelCheckpoint`] is a self-describing snapshot of both embedding
//! tables plus the loss hyper-parameters. [`CheckpointStore`] is the seam
//! the trainer persists through; [`FileCheckpointStore`] writes JSON or
//! YAML files and [`MemoryCheckpointStore`] keeps snapshots in memory.

mod checkpoint;
mod format;
mod store;

pub use checkpoint::{Checkpointable, ModelCheckpoint, ModelMetadata};
pub use format::CheckpointFormat;
pub use store::{CheckpointStore, FileCheckpointStore, MemoryCheckpointStore};
