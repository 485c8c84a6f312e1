//! Element tree for the Moodle XML output.

/// Element in the output tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    /// Element name.
    pub tag: String,
    /// Attributes in insertion order.
    pub attrs: Vec<(String, String)>,
    /// Text content, written before the children.
    pub text: String,
    /// Child elements.
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Create an element with the given tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Set text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Append an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Append a child element.
    #[must_use]
    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append child elements.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = XmlNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Append a child element in place.
    pub fn push(&mut self, child: XmlNode) {
        self.children.push(child);
    }

    /// `<tag><text>…</text></tag>`, the wrapper Moodle uses for most strings.
    #[must_use]
    pub fn text_wrapper(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(tag).with_child(Self::new("text").with_text(text))
    }

    /// Value of an attribute.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First direct child with the given tag.
    #[must_use]
    pub fn find(&self, tag: &str) -> Option<&XmlNode> {
        self.children.iter().find(|child| child.tag == tag)
    }

    /// All direct children with the given tag.
    pub fn find_all<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |child| child.tag == tag)
    }

    /// Text of the first child element at a `/`-separated path, e.g. `name/text`.
    #[must_use]
    pub fn text_at(&self, path: &str) -> Option<&str> {
        path.split('/')
            .try_fold(self, |node, tag| node.find(tag))
            .map(|node| node.text.as_str())
    }
}
