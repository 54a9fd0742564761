use std::collections::VecDeque;
use std::time::{Duration, Instant};

use revanki_types::ToastKind;

use crate::dom::{Document, DomError, NodeId};
use crate::selectors;

/// Transient notifications rendered into a fixed container on the page
pub struct Toaster {
    container: Option<NodeId>,
    duration: Duration,
    live: VecDeque<(NodeId, Instant)>,
}

impl Toaster {
    pub fn new(duration: Duration) -> Self {
        Self {
            container: None,
            duration,
            live: VecDeque::new(),
        }
    }

    pub fn info(&mut self, doc: &mut Document, message: &str) {
        self.show(doc, ToastKind::Info, message);
    }

    pub fn success(&mut self, doc: &mut Document, message: &str) {
        self.show(doc, ToastKind::Success, message);
    }

    pub fn error(&mut self, doc: &mut Document, message: &str) {
        self.show(doc, ToastKind::Error, message);
    }

    /// Never fails the caller; a toast that cannot be rendered is still logged
    pub fn show(&mut self, doc: &mut Document, kind: ToastKind, message: &str) {
        match kind {
            ToastKind::Error => tracing::error!("[toast] {message}"),
            ToastKind::Info | ToastKind::Success => tracing::info!("[toast] {message}"),
        }

        match self.render(doc, kind, message) {
            Ok(id) => self.live.push_back((id, Instant::now() + self.duration)),
            Err(e) => tracing::warn!("Could not render toast: {e}"),
        }
    }

    fn render(&mut self, doc: &mut Document, kind: ToastKind, message: &str) -> Result<NodeId, DomError> {
        let container = self.ensure_container(doc)?;

        let toast = doc.create_element("div");
        doc.add_class(toast, selectors::TOAST_CLASS)?;
        doc.add_class(toast, kind.class_name())?;
        doc.set_text(toast, message)?;
        doc.append_child(container, toast)?;

        Ok(toast)
    }

    /// The host page can wipe the container on re-render, so it is recreated
    fn ensure_container(&mut self, doc: &mut Document) -> Result<NodeId, DomError> {
        if let Some(id) = self.container.filter(|id| doc.is_connected(*id)) {
            return Ok(id);
        }

        let container = doc.create_element("div");
        doc.set_attr(container, "id", selectors::TOAST_CONTAINER_ID)?;
        doc.add_class(container, selectors::TOAST_CONTAINER_CLASS)?;
        let body = doc.body();
        doc.append_child(body, container)?;

        self.container = Some(container);
        Ok(container)
    }

    /// Dismiss toasts shown longer than the display duration ago
    pub fn expire(&mut self, doc: &mut Document, now: Instant) -> usize {
        let mut dismissed = 0;
        while let Some((id, deadline)) = self.live.front().copied() {
            if deadline > now {
                break;
            }
            self.live.pop_front();
            if let Err(e) = doc.remove(id) {
                tracing::debug!("Toast already gone: {e}");
            }
            dismissed += 1;
        }
        dismissed
    }

    /// Messages currently on screen, oldest first
    pub fn visible(&self, doc: &Document) -> Vec<String> {
        self.live
            .iter()
            .filter(|(id, _)| doc.is_connected(*id))
            .map(|(id, _)| doc.text_content(*id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toasts_render_and_expire() {
        let mut doc = Document::new("https://example.com");
        let mut toaster = Toaster::new(Duration::from_millis(3000));

        toaster.info(&mut doc, "Saving to Anki...");
        toaster.error(&mut doc, "Failed: deck not found");

        assert_eq!(
            toaster.visible(&doc),
            vec!["Saving to Anki...", "Failed: deck not found"]
        );
        let containers = doc.query_all(doc.body(), &selectors::TOAST_CONTAINER);
        assert_eq!(containers.len(), 1);

        assert_eq!(toaster.expire(&mut doc, Instant::now()), 0);
        assert_eq!(
            toaster.expire(&mut doc, Instant::now() + Duration::from_secs(4)),
            2
        );
        assert!(toaster.visible(&doc).is_empty());
    }

    #[test]
    fn test_container_recreated_after_host_rerender() {
        let mut doc = Document::new("https://example.com");
        let mut toaster = Toaster::new(Duration::from_millis(3000));

        toaster.info(&mut doc, "first");
        doc.replace_body("<div></div>");
        toaster.info(&mut doc, "second");

        assert_eq!(toaster.visible(&doc), vec!["second"]);
        assert_eq!(doc.query_all(doc.body(), &selectors::TOAST_CONTAINER).len(), 1);
    }
}
