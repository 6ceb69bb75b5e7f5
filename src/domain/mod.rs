// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits that describe what the
// pipeline works with. No burn types and no file I/O here.
//
//   example.rs — one parsed (label, tokens) line of an input file
//   device.rs  — where tensors are placed (CPU or accelerator id)
//   traits.rs  — the seams implemented by the data and application layers

/// A single tokenised label/text pair
pub mod example;

/// Compute target for tensors
pub mod device;

/// Core abstractions (traits) that other layers implement
pub mod traits;
