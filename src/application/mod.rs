// ============================================================
// Layer 2 — Application Layer
// ============================================================
// Use cases invoked by the CLI. Each one wires the data, ml and
// infra layers together for a single user-facing task.
//
//   train_use_case.rs    — load splits, build vocabularies,
//                          train and checkpoint the classifier
//   classify_use_case.rs — load a checkpoint and label raw text

pub mod train_use_case;
pub mod classify_use_case;
