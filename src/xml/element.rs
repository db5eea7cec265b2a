//! @acp:module "XML Element Tree"
//! @acp:summary "Owned element tree with path queries and in-place editing"
//! @acp:domain xml
//! @acp:layer model

/// An XML element with ordered attributes, text and trailing text.
///
/// Mirrors the text/tail model: `text` is the character data before the first
/// child, `tail` is the character data following this element's end tag inside
/// its parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub tail: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    /// Create an empty element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: set the text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder: add an attribute
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Local part of the element name (prefix removed)
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// Text content, `None` when missing or empty
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    /// Get an attribute value
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Remove an attribute, returning its value
    pub fn remove_attr(&mut self, key: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|(k, _)| k == key)?;
        Some(self.attributes.remove(pos).1)
    }

    /// Reset text, tail, attributes and children
    pub fn clear(&mut self) {
        self.text = None;
        self.tail = None;
        self.attributes.clear();
        self.children.clear();
    }

    /// Append a child element
    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Append a new child element and return it
    pub fn add_child(&mut self, name: &str, text: &str, attrs: &[(&str, &str)]) -> &mut Element {
        let mut child = Element::new(name);
        if !text.is_empty() {
            child.text = Some(text.to_string());
        }
        for (k, v) in attrs {
            child.set_attr(*k, *v);
        }
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Direct children with the given name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Remove direct children matching the predicate, returning them in order
    pub fn take_children<F>(&mut self, mut pred: F) -> Vec<Element>
    where
        F: FnMut(&Element) -> bool,
    {
        let (taken, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.children).into_iter().partition(|c| pred(c));
        self.children = kept;
        taken
    }

    /// Remove the first direct child matching the predicate
    pub fn remove_first<F>(&mut self, pred: F) -> Option<Element>
    where
        F: Fn(&Element) -> bool,
    {
        let pos = self.children.iter().position(pred)?;
        Some(self.children.remove(pos))
    }

    /// First element matching a `a/b/c` path relative to this element
    pub fn find(&self, path: &str) -> Option<&Element> {
        self.find_all(path).into_iter().next()
    }

    /// All elements matching a `a/b/c` path relative to this element, in document order
    pub fn find_all(&self, path: &str) -> Vec<&Element> {
        let mut current: Vec<&Element> = vec![self];
        for step in split_path(path) {
            current = current
                .into_iter()
                .flat_map(|e| e.children.iter().filter(move |c| c.name == step))
                .collect();
            if current.is_empty() {
                break;
            }
        }
        current
    }

    /// Mutable access to the first element matching a path
    pub fn find_mut(&mut self, path: &str) -> Option<&mut Element> {
        let mut current = self;
        for step in split_path(path) {
            current = current.children.iter_mut().find(|c| c.name == step)?;
        }
        Some(current)
    }

    /// First descendant (excluding self) with the given name, depth first
    pub fn find_descendant(&self, name: &str) -> Option<&Element> {
        for child in &self.children {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(name) {
                return Some(found);
            }
        }
        None
    }

    /// Find a path, creating every missing step
    pub fn get_or_create(&mut self, path: &str) -> &mut Element {
        let mut current = self;
        for step in split_path(path) {
            let pos = match current.children.iter().position(|c| c.name == step) {
                Some(pos) => pos,
                None => {
                    current.children.push(Element::new(step));
                    current.children.len() - 1
                }
            };
            current = &mut current.children[pos];
        }
        current
    }

    /// Set the text of the element at `path`, creating it if needed.
    ///
    /// Existing attributes are kept unless `clear_attrs` is set; `attrs` are
    /// then applied on top.
    pub fn set_path_text(&mut self, path: &str, value: &str, attrs: &[(&str, &str)], clear_attrs: bool) {
        let element = self.get_or_create(path);
        if clear_attrs {
            element.attributes.clear();
        }
        element.text = Some(value.to_string());
        for (k, v) in attrs {
            element.set_attr(*k, *v);
        }
    }

    /// Remove every element matching `parent/name`
    pub fn remove_path(&mut self, path: &str) {
        let (parent, name) = match path.rsplit_once('/') {
            Some((parent, name)) => (Some(parent), name),
            None => (None, path),
        };
        let parent = match parent {
            Some(p) => self.find_mut(p),
            None => Some(self),
        };
        if let Some(parent) = parent {
            parent.children.retain(|c| c.name != name);
        }
    }

    /// Visit this element and every descendant
    pub fn walk_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut Element),
    {
        f(self);
        for child in &mut self.children {
            child.walk_mut(f);
        }
    }

    /// Namespace URI bound to this element's prefix (or the default namespace)
    pub fn namespace(&self) -> Option<&str> {
        let key = match self.name.split_once(':') {
            Some((prefix, _)) => format!("xmlns:{}", prefix),
            None => "xmlns".to_string(),
        };
        self.attr(&key).filter(|ns| !ns.is_empty())
    }

    /// Remove element prefixes and default namespace declarations from the tree
    pub fn strip_namespaces(&mut self) {
        self.walk_mut(&mut |e| {
            if let Some((_, local)) = e.name.split_once(':') {
                e.name = local.to_string();
            }
            e.remove_attr("xmlns");
        });
    }

    /// Pretty-print indentation, replacing only whitespace-only text and tails
    pub fn indent(&mut self, space: &str) {
        self.indent_children(space, 0);
    }

    fn indent_children(&mut self, space: &str, level: usize) {
        if self.children.is_empty() {
            return;
        }
        let child_indent = format!("\n{}", space.repeat(level + 1));
        if is_blank(self.text.as_deref()) {
            self.text = Some(child_indent.clone());
        }
        for child in &mut self.children {
            child.indent_children(space, level + 1);
            if is_blank(child.tail.as_deref()) {
                child.tail = Some(child_indent.clone());
            }
        }
        if let Some(last) = self.children.last_mut() {
            if is_blank(last.tail.as_deref()) {
                last.tail = Some(format!("\n{}", space.repeat(level)));
            }
        }
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty() && *s != ".")
}

fn is_blank(text: Option<&str>) -> bool {
    text.map(|t| t.trim().is_empty()).unwrap_or(true)
}
