//! Commands run by the binary

pub mod sync;
