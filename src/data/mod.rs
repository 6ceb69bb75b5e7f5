// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from a raw `label<TAB>text` file to tensor batches:
//
//   .tsv file
//       │
//       ▼
//   TsvLoader       → parses lines into tokenised Examples
//       │
//       ▼
//   Field/Vocabulary→ token ↔ index maps, built from train only
//       │
//       ▼
//   TextDataset     → encoded examples (Burn's Dataset trait)
//       │
//       ▼
//   BucketIterator  → length-bucketed, optionally shuffled passes
//       │
//       ▼
//   TextBatcher     → padded [batch, length] tensors (Burn's Batcher)
//
// DataLoader wires these together for a train/valid pair.

/// Column schemas and tokenisation
pub mod field;

/// Token ↔ index mapping
pub mod vocab;

/// Reads tab-separated label/text files
pub mod loader;

/// Implements Burn's Dataset trait for encoded examples
pub mod dataset;

/// Implements Burn's Batcher trait to create padded tensor batches
pub mod batcher;

/// Length-bucketed batch iteration
pub mod iterator;

/// Composition of the above for a train/valid pair
pub mod data_loader;
