use derive_more::{Deref, From};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Vocabulary index per variable region of one match. Ordered left to right,
/// ascending, which is the order of the exported tally.
#[derive(
    Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deref, From, Serialize, Deserialize,
)]
pub struct IndexTuple(SmallVec<[u32; 4]>);

impl FromIterator<u32> for IndexTuple {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        IndexTuple(iter.into_iter().collect())
    }
}

impl From<&[u32]> for IndexTuple {
    fn from(indices: &[u32]) -> Self {
        IndexTuple(SmallVec::from_slice(indices))
    }
}

impl fmt::Debug for IndexTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0.as_slice())
    }
}
