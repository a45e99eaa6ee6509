//! Picks the single best editable target on the page.
//!
//! Explicit focus wins. Otherwise the document is scanned by category:
//! multi-line fields, then single-line text fields, then contenteditable
//! regions, taking the first visible match of the first category that has
//! one.

use echo_core::config::ResolverConfig;
use tracing::debug;

use crate::dom::Page;
use crate::target::{EditableTarget, TargetKind};
use crate::visibility::is_visible;

/// Scan order used when nothing editable holds focus.
const SCAN_ORDER: [TargetKind; 3] = [
    TargetKind::MultilineField,
    TargetKind::LinearField,
    TargetKind::RichTextRegion,
];

#[derive(Debug, Clone, Default)]
pub struct TargetResolver {
    config: ResolverConfig,
}

impl TargetResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Resolve the insertion target for `page`, reading its focus fresh.
    pub fn resolve<P: Page>(&self, page: &P) -> Option<EditableTarget<P::Element>> {
        self.resolve_from(page, page.active_element())
    }

    /// Resolve with an explicit focused element.
    pub fn resolve_from<P: Page>(
        &self,
        page: &P,
        active: Option<P::Element>,
    ) -> Option<EditableTarget<P::Element>> {
        if let Some(active) = active {
            if let Some(target) =
                EditableTarget::classify(page, &active, &self.config.focus_input_types)
            {
                debug!(kind = %target.kind(), "Using focused element as target");
                return Some(target);
            }
        }

        let candidates: Vec<EditableTarget<P::Element>> = page
            .editable_candidates()
            .iter()
            .filter_map(|el| EditableTarget::classify(page, el, &self.config.scan_input_types))
            .collect();

        for kind in SCAN_ORDER {
            let found = candidates
                .iter()
                .filter(|t| t.kind() == kind)
                .find(|t| is_visible(page, t.element()));
            if let Some(target) = found {
                debug!(kind = %kind, "Found target by document scan");
                return Some(target.clone());
            }
        }

        debug!(
            candidates = candidates.len(),
            "No visible editable target on page"
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::MemoryPage;

    fn resolver() -> TargetResolver {
        TargetResolver::default()
    }

    #[test]
    fn test_focused_element_wins() {
        let page = MemoryPage::new();
        let _ta = page.add_textarea("");
        let input = page.add_input(Some("search"), "");
        page.focus_element(input);

        let target = resolver().resolve(&page).unwrap();
        assert_eq!(target, EditableTarget::LinearField(input));
    }

    #[test]
    fn test_focused_element_wins_even_if_hidden() {
        let page = MemoryPage::new();
        let _ta = page.add_textarea("");
        let div = page.add_editable("");
        page.set_style(div, "opacity", "0");
        page.focus_element(div);

        let target = resolver().resolve(&page).unwrap();
        assert_eq!(target, EditableTarget::RichTextRegion(div));
    }

    #[test]
    fn test_blurred_field_falls_back_to_scan() {
        let page = MemoryPage::new();
        let input = page.add_input(Some("email"), "");
        let ta = page.add_textarea("");
        page.focus_element(input);
        assert_eq!(
            resolver().resolve(&page),
            Some(EditableTarget::LinearField(input))
        );

        page.blur();

        assert_eq!(page.active(), None);
        assert_eq!(
            resolver().resolve(&page),
            Some(EditableTarget::MultilineField(ta))
        );
    }

    #[test]
    fn test_category_order_beats_document_order() {
        let page = MemoryPage::new();
        let _input = page.add_input(Some("text"), "");
        let _div = page.add_editable("");
        let ta = page.add_textarea("");

        let target = resolver().resolve(&page).unwrap();
        assert_eq!(target, EditableTarget::MultilineField(ta));
    }

    #[test]
    fn test_first_visible_in_document_order_within_category() {
        let page = MemoryPage::new();
        let hidden = page.add_textarea("");
        page.set_style(hidden, "display", "none");
        let first_visible = page.add_textarea("");
        let _second_visible = page.add_textarea("");

        let target = resolver().resolve(&page).unwrap();
        assert_eq!(target, EditableTarget::MultilineField(first_visible));
    }

    #[test]
    fn test_falls_through_to_next_category() {
        let page = MemoryPage::new();
        let hidden = page.add_textarea("");
        page.set_style(hidden, "visibility", "hidden");
        let input = page.add_input(None, "");

        let target = resolver().resolve(&page).unwrap();
        assert_eq!(target, EditableTarget::LinearField(input));
    }

    #[test]
    fn test_contenteditable_is_last_resort() {
        let page = MemoryPage::new();
        let div = page.add_editable("notes");
        let checkbox = page.add_input(Some("checkbox"), "");
        page.focus_element(checkbox);

        let target = resolver().resolve(&page).unwrap();
        assert_eq!(target, EditableTarget::RichTextRegion(div));
    }

    #[test]
    fn test_scan_skips_non_text_input_types() {
        let page = MemoryPage::new();
        page.add_input(Some("button"), "");
        page.add_input(Some("checkbox"), "");
        // Accepted on focus, but not eligible for the scan.
        page.add_input(Some("email"), "");

        assert!(resolver().resolve(&page).is_none());
    }

    #[test]
    fn test_disabled_and_readonly_never_returned() {
        let page = MemoryPage::new();
        let disabled = page.add_textarea("");
        page.set_attr(disabled, "disabled", "");
        let readonly = page.add_input(Some("text"), "");
        page.set_attr(readonly, "readonly", "");
        page.focus_element(readonly);

        assert!(resolver().resolve(&page).is_none());
    }

    #[test]
    fn test_invisible_candidates_never_returned() {
        let page = MemoryPage::new();
        let ta = page.add_textarea("");
        page.set_style(ta, "display", "none");
        let input = page.add_input(Some("text"), "");
        page.set_style(input, "opacity", "0");
        let wrapper = page.append_element(page.body(), "section");
        page.set_style(wrapper, "display", "none");
        let nested = page.append_element(wrapper, "div");
        page.set_attr(nested, "contenteditable", "true");

        assert!(resolver().resolve(&page).is_none());
    }

    #[test]
    fn test_empty_page_resolves_to_none() {
        let page = MemoryPage::new();
        assert!(resolver().resolve(&page).is_none());
    }

    #[test]
    fn test_custom_scan_types() {
        let page = MemoryPage::new();
        let email = page.add_input(Some("email"), "");
        let resolver = TargetResolver::new(ResolverConfig {
            scan_input_types: vec!["text".into(), "email".into()],
            ..ResolverConfig::default()
        });

        let target = resolver.resolve(&page).unwrap();
        assert_eq!(target, EditableTarget::LinearField(email));
    }

    #[test]
    fn test_resolve_from_explicit_active() {
        let page = MemoryPage::new();
        let _ta = page.add_textarea("");
        let input = page.add_input(Some("text"), "");

        let target = resolver().resolve_from(&page, Some(input)).unwrap();
        assert_eq!(target, EditableTarget::LinearField(input));
    }
}
