use crate::new_types::sequence_hash::MAX_SEQ_LEN;
use derive_more::Display;

/// Why a vocabulary or template could not be built.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ComboError {
    #[display(
        fmt = "expecting one constant region more than the {} variable regions, got {}",
        variables,
        constants
    )]
    ShapeMismatch { constants: usize, variables: usize },

    #[display(fmt = "vocabulary has no barcodes")]
    EmptyVocabulary,

    #[display(
        fmt = "all barcodes should be of the same length: entry {} ({}) has length {}, expected {}",
        index,
        sequence,
        found,
        expected
    )]
    NonUniformVocabulary {
        index: usize,
        sequence: String,
        found: usize,
        expected: usize,
    },

    #[display(
        fmt = "duplicate barcode {}: entries {} and {}",
        sequence,
        first,
        second
    )]
    DuplicateVocabularyEntry {
        sequence: String,
        first: usize,
        second: usize,
    },

    #[display(
        fmt = "{} has length {}, at most {} is supported",
        region,
        len,
        MAX_SEQ_LEN
    )]
    SequenceTooLong { region: String, len: usize },
}

impl std::error::Error for ComboError {}
