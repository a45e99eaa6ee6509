//! Native events fired after a mutation so host-page frameworks resync
//! their model from the DOM.

use tracing::debug;

use crate::dom::{EventKind, Page};
use crate::error::DomError;
use crate::target::{EditableTarget, TargetKind};

/// Events to fire for a target kind, in order. Rich-text regions have no
/// change-commit semantics, so they only get `input`.
pub fn events_for(kind: TargetKind) -> &'static [EventKind] {
    match kind {
        TargetKind::LinearField | TargetKind::MultilineField => {
            &[EventKind::Input, EventKind::Change]
        }
        TargetKind::RichTextRegion => &[EventKind::Input],
    }
}

/// Dispatch the bubbling events for a mutated target.
pub fn notify<P: Page>(page: &P, target: &EditableTarget<P::Element>) -> Result<(), DomError> {
    for kind in events_for(target.kind()) {
        page.dispatch_event(target.element(), *kind, true)?;
    }
    debug!(kind = %target.kind(), "Mutation events dispatched");
    Ok(())
}
