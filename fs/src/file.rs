pub mod copier;
pub mod writer;
