//! Markup builder API.
//!
//! Blocks assemble an element tree and serialize it with
//! [`RenderElement::to_html`]. Text and attribute values are escaped on
//! output, so callers pass raw strings.

/// A node in the element tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(RenderElement),
    Text(String),
}

/// An HTML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderElement {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl RenderElement {
    /// Serialize the element and its subtree.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        self.write_html(&mut html);
        html
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&html_escape(value));
            out.push('"');
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(el) => el.write_html(out),
                Node::Text(text) => out.push_str(&html_escape(text)),
            }
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

/// Builder for constructing render elements.
pub struct ElementBuilder {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl ElementBuilder {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute. A repeated name replaces the earlier value.
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        if let Some(slot) = self.attributes.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value.into();
        } else {
            self.attributes.push((name.into(), value.into()));
        }
        self
    }

    pub fn child(mut self, element: RenderElement) -> Self {
        self.children.push(Node::Element(element));
        self
    }

    /// Append every element yielded by `elements`.
    pub fn children(mut self, elements: impl IntoIterator<Item = RenderElement>) -> Self {
        self.children.extend(elements.into_iter().map(Node::Element));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn build(self) -> RenderElement {
        RenderElement {
            tag: self.tag,
            attributes: self.attributes,
            children: self.children,
        }
    }
}

/// Create an empty element.
pub fn element(tag: &str) -> ElementBuilder {
    ElementBuilder::new(tag)
}

/// Create an element holding a single text node.
pub fn markup(tag: &str, text: &str) -> ElementBuilder {
    ElementBuilder::new(tag).text(text)
}

/// Escape text for embedding in HTML content or a quoted attribute.
pub fn html_escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
