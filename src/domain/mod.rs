// ============================================================
// Domain Layer
// ============================================================
// Pure Rust types that define what the system talks about.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain structs, enums, and traits
//
// Keeping this layer pure means it is unit-testable without a
// backend and readable without framework noise.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

/// Tokens, sequences, and the training corpus
pub mod corpus;

/// The external vocabulary collaborator
pub mod dictionary;
