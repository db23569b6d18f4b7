//! Visual state resolution shared by every element representation.

use serde::{Deserialize, Serialize};

/// Display state of an element. Ordered by display precedence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualState {
    #[default]
    Normal,
    Selected,
    Highlighted,
}

impl VisualState {
    /// Resolve the state of an element. Highlight wins over selection.
    pub fn resolve(is_selected: bool, is_highlighted: bool) -> Self {
        if is_highlighted {
            VisualState::Highlighted
        } else if is_selected {
            VisualState::Selected
        } else {
            VisualState::Normal
        }
    }

    pub fn is_active(self) -> bool {
        self != VisualState::Normal
    }

    pub fn label(self) -> &'static str {
        match self {
            VisualState::Normal => "normal",
            VisualState::Selected => "selected",
            VisualState::Highlighted => "highlighted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_truth_table() {
        for selected in [false, true] {
            assert_eq!(
                VisualState::resolve(selected, true),
                VisualState::Highlighted
            );
        }
        assert_eq!(VisualState::resolve(true, false), VisualState::Selected);
        assert_eq!(VisualState::resolve(false, false), VisualState::Normal);
    }

    #[test]
    fn test_precedence_order() {
        assert!(VisualState::Highlighted > VisualState::Selected);
        assert!(VisualState::Selected > VisualState::Normal);
        assert_eq!(
            VisualState::Selected.max(VisualState::Highlighted),
            VisualState::Highlighted
        );
    }
}
