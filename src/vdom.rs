//! Host content tree and its materialization into a document.

use std::fmt;
use std::rc::Rc;

use kuchiki::NodeRef;

use crate::context::{use_frame, FrameContext, FrameEnvironment};
use crate::dom;

pub type ConsumerFn = Rc<dyn Fn(&FrameEnvironment) -> VNode>;

#[derive(Clone)]
pub enum VNode {
    Element(Element),
    Text(String),
    Fragment(Vec<VNode>),
    /// Scopes `value` over `child` through the frame context channel.
    Provider {
        value: FrameEnvironment,
        child: Box<VNode>,
    },
    /// Rendered with whatever environment is in effect at its position.
    Consumer(ConsumerFn),
}

#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<VNode>,
}

pub fn el(tag: impl Into<String>) -> Element {
    Element {
        tag: tag.into(),
        ..Default::default()
    }
}

pub fn text(value: impl Into<String>) -> VNode {
    VNode::Text(value.into())
}

impl Element {
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
        self
    }

    pub fn child(mut self, child: impl Into<VNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<VNode>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }
}

impl From<Element> for VNode {
    fn from(element: Element) -> Self {
        VNode::Element(element)
    }
}

impl From<&str> for VNode {
    fn from(value: &str) -> Self {
        VNode::Text(value.to_string())
    }
}

impl From<String> for VNode {
    fn from(value: String) -> Self {
        VNode::Text(value)
    }
}

impl VNode {
    pub fn provider(value: FrameEnvironment, child: impl Into<VNode>) -> Self {
        VNode::Provider {
            value,
            child: Box::new(child.into()),
        }
    }
}

impl fmt::Debug for VNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VNode::Element(element) => element.fmt(f),
            VNode::Text(value) => f.debug_tuple("Text").field(value).finish(),
            VNode::Fragment(children) => f.debug_tuple("Fragment").field(children).finish(),
            VNode::Provider { value, child } => f
                .debug_struct("Provider")
                .field("value", value)
                .field("child", child)
                .finish(),
            VNode::Consumer(_) => f.write_str("Consumer(..)"),
        }
    }
}

/// Build `node` and append it under `parent`, returning the top-level DOM
/// nodes created.
pub fn render_into(node: &VNode, parent: &NodeRef) -> Vec<NodeRef> {
    let mut created = Vec::new();
    build(node, &mut created);
    for child in &created {
        parent.append(child.clone());
    }
    created
}

fn build(node: &VNode, out: &mut Vec<NodeRef>) {
    match node {
        VNode::Element(element) => {
            let attributes = element
                .attributes
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str()));
            let created = dom::create_element(&element.tag, attributes);
            let mut children = Vec::new();
            for child in &element.children {
                build(child, &mut children);
            }
            for child in children {
                created.append(child);
            }
            out.push(created);
        }
        VNode::Text(value) => out.push(NodeRef::new_text(value.as_str())),
        VNode::Fragment(children) => {
            for child in children {
                build(child, out);
            }
        }
        VNode::Provider { value, child } => {
            FrameContext::provide(value.clone(), || build(child, out));
        }
        VNode::Consumer(render) => {
            let rendered = render(&use_frame());
            build(&rendered, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, Window};
    use url::Url;

    fn container() -> NodeRef {
        dom::create_element("section", [])
    }

    #[test]
    fn renders_nested_elements_and_text() {
        let tree: VNode = el("ul")
            .attr("class", "list")
            .children(["one", "two"].map(|item| el("li").child(item)))
            .into();
        let parent = container();
        let created = render_into(&tree, &parent);
        assert_eq!(created.len(), 1);
        assert_eq!(
            dom::inner_html(&parent),
            r#"<ul class="list"><li>one</li><li>two</li></ul>"#
        );
    }

    #[test]
    fn fragments_flatten_into_siblings() {
        let tree = VNode::Fragment(vec![el("b").into(), text("mid"), el("i").into()]);
        let parent = container();
        assert_eq!(render_into(&tree, &parent).len(), 3);
        assert_eq!(dom::inner_html(&parent), "<b></b>mid<i></i>");
    }

    #[test]
    fn repeated_attributes_keep_last_value() {
        let element = el("div").attr("id", "a").attr("id", "b");
        assert_eq!(element.attributes, vec![("id".to_string(), "b".to_string())]);
    }

    #[test]
    fn consumers_see_provided_environment() {
        let window = Window::new("embedded");
        let document = Document::parse("", Url::parse("about:srcdoc").unwrap());
        window.navigate(document.clone());
        let environment = FrameEnvironment::new(document, Some(window));

        let consumer = VNode::Consumer(Rc::new(|env: &FrameEnvironment| {
            let url = env
                .document
                .as_ref()
                .map(|doc| doc.url().to_string())
                .unwrap_or_else(|| "none".to_string());
            text(url)
        }));
        let tree = VNode::Fragment(vec![
            VNode::provider(environment, consumer.clone()),
            consumer,
        ]);
        let parent = container();
        render_into(&tree, &parent);
        assert_eq!(parent.text_contents(), "about:srcdocnone");
    }
}
