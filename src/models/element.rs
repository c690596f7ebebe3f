use std::fmt;

/// Identifies one element (graph node) of a layout.
///
/// The index carries no meaning for the spatial structures beyond identity and a total
/// order, which nearest-element queries use to break exact distance ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ElementId(pub usize);

impl ElementId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for ElementId {
    fn from(index: usize) -> Self {
        ElementId(index)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
