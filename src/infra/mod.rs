// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence used by training and inference:
//
//   checkpoint.rs  — model weights (Burn's CompactRecorder),
//                    model architecture config, training config
//
//   vocab_store.rs — fields and vocabularies as JSON, so
//                    inference encodes text like training did
//
//   metrics.rs     — per-epoch loss/accuracy rows in a CSV file

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Field and vocabulary persistence
pub mod vocab_store;

/// Training metrics CSV logger
pub mod metrics;
