#[macro_use]
extern crate derive_new;

#[macro_use]
extern crate lazy_static;

#[macro_use]
pub mod rdbg;
pub mod count;
pub mod count_threads;
pub mod error;
pub mod matcher;
pub mod new_types;
pub mod scanner;
pub mod tally;
pub mod template;
pub mod vocabulary;

pub use error::ComboError;
pub use matcher::{
    match_and_tally, match_read, match_read_with, search_read, tally_read, MatchOptions, Strand,
};
pub use new_types::{index_tuple::IndexTuple, sequence_hash::SequenceHash};
pub use tally::{Tally, TallyExport};
pub use template::Template;
pub use vocabulary::Vocabulary;

/// Barcodes for one variable region, indexed in the given order.
pub fn make_vocabulary<S: AsRef<[u8]>>(barcodes: &[S]) -> Result<Vocabulary, ComboError> {
    Vocabulary::build(barcodes)
}

/// Layout `C0 V0 C1 .. V(n-1) Cn`, one more constant than variable regions.
pub fn make_template<S: AsRef<[u8]>>(
    constants: &[S],
    variables: Vec<Vocabulary>,
) -> Result<Template, ComboError> {
    Template::build(constants, variables)
}

pub fn export_tally(tally: &Tally, nvariable: usize) -> TallyExport {
    tally.export(nvariable)
}
