pub mod index_tuple;
pub mod sequence_hash;
pub mod twobit;
