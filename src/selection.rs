/// What the player is currently holding.
///
/// The held chain is never copied out of its pile: `Holding` names the pile
/// and the position of the chain's first card, and the chain is that pile's
/// tail from there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Idle,
    Holding { pile: usize, pos: usize },
}

impl Selection {
    pub fn is_holding(&self) -> bool {
        matches!(self, Selection::Holding { .. })
    }

    /// `(pile, pos)` of the held chain's first card, for front ends that
    /// highlight the pickup point.
    #[allow(dead_code)]
    pub fn held(&self) -> Option<(usize, usize)> {
        match *self {
            Selection::Holding { pile, pos } => Some((pile, pos)),
            Selection::Idle => None,
        }
    }
}
