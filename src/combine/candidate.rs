use crate::pattern::PatternId;

/// Eta pattern paired with an optional phi partner, both owned by the arena
/// of the running call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub eta: PatternId,
    pub phi: Option<PatternId>,
}

impl Candidate {
    pub fn new(eta: PatternId, phi: Option<PatternId>) -> Self {
        Self { eta, phi }
    }

    pub fn standalone(eta: PatternId) -> Self {
        Self { eta, phi: None }
    }

    pub fn has_phi(&self) -> bool {
        self.phi.is_some()
    }
}
