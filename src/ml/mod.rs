// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
//
//   model.rs      — the CNN classifier:
//                   • token embedding
//                   • parallel convolution filters, one group per window size
//                   • zero padding of inputs shorter than the widest window
//                   • max-pool over time, concatenation
//                   • linear + log-softmax head
//
//   backend.rs    — backend aliases and DeviceTarget resolution
//
//   trainer.rs    — the epoch loop: forward, NLL loss, backward,
//                   Adam step, validation, checkpointing
//
//   inferencer.rs — rebuilds a checkpoint and ranks labels for raw text

/// CNN text classifier architecture
pub mod model;

/// Backend aliases and device placement
pub mod backend;

/// Training loop with validation and checkpointing
pub mod trainer;

/// Inference engine — loads checkpoint and predicts labels
pub mod inferencer;
