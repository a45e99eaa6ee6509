//! Rendered-and-interactable check for candidate elements.
//!
//! An element counts as visible when its computed `display` is not `none`,
//! `visibility` is not `hidden`, `opacity` is not zero and it has a layout
//! parent. Elements pushed off-screen or clipped to zero size still pass;
//! that false positive is accepted.

use crate::dom::{ComputedStyle, Page};

/// Returns whether `element` is currently rendered.
pub fn is_visible<P: Page>(page: &P, element: &P::Element) -> bool {
    let Some(style) = page.computed_style(element) else {
        return false;
    };
    style_is_visible(&style) && page.has_offset_parent(element)
}

fn style_is_visible(style: &ComputedStyle) -> bool {
    style.display != "none" && style.visibility != "hidden" && !is_zero_opacity(&style.opacity)
}

fn is_zero_opacity(opacity: &str) -> bool {
    match opacity.trim().parse::<f64>() {
        Ok(value) => value == 0.0,
        Err(_) => opacity.trim() == "0",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::MemoryPage;

    #[test]
    fn test_plain_element_is_visible() {
        let page = MemoryPage::new();
        let ta = page.add_textarea("");
        assert!(is_visible(&page, &ta));
    }

    #[test]
    fn test_display_none_is_hidden() {
        let page = MemoryPage::new();
        let ta = page.add_textarea("");
        page.set_style(ta, "display", "none");
        assert!(!is_visible(&page, &ta));
    }

    #[test]
    fn test_visibility_hidden_is_hidden() {
        let page = MemoryPage::new();
        let input = page.add_input(Some("text"), "");
        page.set_style(input, "visibility", "hidden");
        assert!(!is_visible(&page, &input));
    }

    #[test]
    fn test_zero_opacity_is_hidden() {
        let page = MemoryPage::new();
        let a = page.add_textarea("");
        page.set_style(a, "opacity", "0");
        let b = page.add_textarea("");
        page.set_style(b, "opacity", "0.0");
        let c = page.add_textarea("");
        page.set_style(c, "opacity", "0.01");

        assert!(!is_visible(&page, &a));
        assert!(!is_visible(&page, &b));
        assert!(is_visible(&page, &c));
    }

    #[test]
    fn test_hidden_ancestor_removes_layout_parent() {
        let page = MemoryPage::new();
        let wrapper = page.append_element(page.body(), "div");
        page.set_style(wrapper, "display", "none");
        let ta = page.append_element(wrapper, "textarea");
        assert!(!is_visible(&page, &ta));
    }

    #[test]
    fn test_offscreen_element_still_passes() {
        let page = MemoryPage::new();
        let ta = page.add_textarea("");
        page.set_style(ta, "left", "-9999px");
        page.set_style(ta, "width", "0");
        assert!(is_visible(&page, &ta));
    }

    #[test]
    fn test_unparseable_opacity_is_not_zero() {
        assert!(!is_zero_opacity("inherit"));
        assert!(is_zero_opacity(" 0 "));
    }
}
