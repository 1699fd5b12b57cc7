// docauth-memory: in-memory entity accessors.
//
// A HashMap-backed stand-in for the document store. Enforces the same
// uniqueness rules as the real indexes so adapter behavior matches.
// Ideal for tests and local development.

pub mod store;

pub use store::MemoryStore;
