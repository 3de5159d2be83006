//! Transformation chain resolution over the table of direct conversions.

use std::collections::{HashMap, VecDeque};

use crate::types::DocumentKind;

/// One direct conversion step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hop {
    pub from: DocumentKind,
    pub to: DocumentKind,
}

impl Hop {
    pub const fn new(from: DocumentKind, to: DocumentKind) -> Self {
        Self { from, to }
    }

    /// Identity copy.
    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }
}

impl std::fmt::Display for Hop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

/// Direct conversions an external tool exists for. Order breaks ties
/// between equally short chains.
pub const DIRECT_CONVERSIONS: [Hop; 4] = [
    Hop::new(DocumentKind::PageDescription, DocumentKind::WordProcessor),
    Hop::new(DocumentKind::WordProcessor, DocumentKind::PageDescription),
    Hop::new(DocumentKind::WordProcessor, DocumentKind::Markup),
    Hop::new(DocumentKind::Presentation, DocumentKind::PageDescription),
];

/// Shortest chain of hops from `from` to `to`.
///
/// Same-kind requests resolve to a single identity hop. Returns `None` when
/// the table has no path between the two kinds.
pub fn resolve(from: DocumentKind, to: DocumentKind) -> Option<Vec<Hop>> {
    if from == to {
        return Some(vec![Hop::new(from, to)]);
    }

    let mut came_from: HashMap<DocumentKind, Hop> = HashMap::new();
    let mut queue = VecDeque::from([from]);

    while let Some(kind) = queue.pop_front() {
        if kind == to {
            break;
        }
        for hop in DIRECT_CONVERSIONS.iter().filter(|h| h.from == kind) {
            if hop.to != from && !came_from.contains_key(&hop.to) {
                came_from.insert(hop.to, *hop);
                queue.push_back(hop.to);
            }
        }
    }

    let mut chain = Vec::new();
    let mut cursor = to;
    while cursor != from {
        let hop = came_from.get(&cursor)?;
        chain.push(*hop);
        cursor = hop.from;
    }
    chain.reverse();
    Some(chain)
}
