pub mod merkle;
pub mod sparse_merkle;
