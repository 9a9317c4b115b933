//! Feature-selection state for the info panel
//!
//! At most one feature is selected at a time. Clicking a feature selects it,
//! clicking the same feature again or clicking empty map clears it, clicking
//! a different feature replaces it. Nothing here persists; the panel resets
//! with the map.

use towpath_core::SelectedFeature;

/// What a click did to the selection, so the panel knows whether to open,
/// close or re-render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Opened,
    Replaced,
    Cleared,
    Unchanged,
}

#[derive(Debug, Default)]
pub struct FeatureSelection {
    selected: Option<SelectedFeature>,
}

impl FeatureSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a click into the selection. `hit` is whichever selectable
    /// feature was under the pointer, if any.
    pub fn click(&mut self, hit: Option<SelectedFeature>) -> SelectionChange {
        match (self.selected.take(), hit) {
            (None, None) => SelectionChange::Unchanged,
            (None, Some(feature)) => {
                tracing::debug!(id = %feature.id, layer = %feature.layer, "feature selected");
                self.selected = Some(feature);
                SelectionChange::Opened
            }
            (Some(_), None) => SelectionChange::Cleared,
            (Some(previous), Some(feature)) => {
                if previous.id == feature.id && previous.layer == feature.layer {
                    // Re-click toggles the panel shut.
                    SelectionChange::Cleared
                } else {
                    self.selected = Some(feature);
                    SelectionChange::Replaced
                }
            }
        }
    }

    pub fn selected(&self) -> Option<&SelectedFeature> {
        self.selected.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    pub fn reset(&mut self) {
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(id: &str) -> SelectedFeature {
        SelectedFeature::new(id, "canals-line").with_property("name", id)
    }

    #[test]
    fn click_then_empty_clears() {
        let mut selection = FeatureSelection::new();
        assert_eq!(selection.click(Some(feature("f1"))), SelectionChange::Opened);
        assert!(selection.is_open());

        assert_eq!(selection.click(None), SelectionChange::Cleared);
        assert!(selection.selected().is_none());
    }

    #[test]
    fn second_feature_replaces_first() {
        let mut selection = FeatureSelection::new();
        selection.click(Some(feature("f1")));
        assert_eq!(
            selection.click(Some(feature("f2"))),
            SelectionChange::Replaced
        );
        assert_eq!(selection.selected().map(|f| f.id.as_str()), Some("f2"));
    }

    #[test]
    fn reclick_toggles_closed() {
        let mut selection = FeatureSelection::new();
        selection.click(Some(feature("f1")));
        assert_eq!(selection.click(Some(feature("f1"))), SelectionChange::Cleared);
        assert!(!selection.is_open());
    }

    #[test]
    fn empty_click_with_no_selection_changes_nothing() {
        let mut selection = FeatureSelection::new();
        assert_eq!(selection.click(None), SelectionChange::Unchanged);
    }

    #[test]
    fn reset_closes_the_panel() {
        let mut selection = FeatureSelection::new();
        selection.click(Some(feature("f1")));
        selection.reset();
        assert!(!selection.is_open());
    }
}
