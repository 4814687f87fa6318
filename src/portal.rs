use kuchiki::NodeRef;

use crate::vdom::{render_into, VNode};

/// Imperative mount point for content that lives in a foreign container,
/// typically one inside another document.
///
/// Each [`Portal::render`] replaces what the previous one mounted; nodes the
/// portal did not create are never touched.
#[derive(Debug, Default)]
pub struct Portal {
    container: Option<NodeRef>,
    mounted: Vec<NodeRef>,
}

impl Portal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, node: &VNode, container: &NodeRef) {
        self.unmount();
        self.mounted = render_into(node, container);
        self.container = Some(container.clone());
    }

    pub fn unmount(&mut self) {
        for node in self.mounted.drain(..) {
            node.detach();
        }
        self.container = None;
    }

    pub fn container(&self) -> Option<&NodeRef> {
        self.container.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.container.is_some()
    }
}

impl Drop for Portal {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;
    use crate::vdom::{el, text};

    #[test]
    fn rerender_replaces_previous_output_only() {
        let container = dom::create_element("div", []);
        container.append(dom::create_element("span", [("id", "existing")]));

        let mut portal = Portal::new();
        portal.render(&el("p").child("first").into(), &container);
        portal.render(&el("p").child("second").into(), &container);

        assert_eq!(
            dom::inner_html(&container),
            r#"<span id="existing"></span><p>second</p>"#
        );
    }

    #[test]
    fn moving_container_detaches_from_old_one() {
        let old = dom::create_element("div", []);
        let new = dom::create_element("div", []);
        let mut portal = Portal::new();

        portal.render(&text("hello"), &old);
        portal.render(&text("hello"), &new);

        assert_eq!(dom::inner_html(&old), "");
        assert_eq!(dom::inner_html(&new), "hello");
        assert_eq!(portal.container(), Some(&new));
    }

    #[test]
    fn unmount_and_drop_clear_container() {
        let container = dom::create_element("div", []);
        {
            let mut portal = Portal::new();
            portal.render(&text("transient"), &container);
            assert!(portal.is_mounted());
        }
        assert_eq!(dom::inner_html(&container), "");
    }
}
