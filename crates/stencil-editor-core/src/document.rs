//! Editable document tree.
//!
//! The document is an arena of nodes addressed by `NodeId`. Removing a node
//! vacates its slot permanently, so a `NodeId` captured before a mutation
//! either still refers to the same node or is detectably dead. Selection
//! restoration relies on this.
//!
//! Variable tokens and drop indicators are atomic leaves: positions never
//! point inside them, and every traversal treats them as one unit.

use smol_str::SmolStr;

use crate::variable::VariableDescriptor;

/// Handle to a node in a `Document`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Elements that never have children.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements that start a new line in the editable surface.
const BLOCK_ELEMENTS: &[&str] = &[
    "div", "p", "li", "ul", "ol", "blockquote", "pre", "h1", "h2", "h3", "h4", "h5", "h6",
];

/// An ordinary markup element: block container, inline wrapper or void element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: SmolStr,
    pub attrs: Vec<(SmolStr, String)>,
}

impl Element {
    pub fn new(tag: impl Into<SmolStr>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: impl Into<SmolStr>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|c| c.split_ascii_whitespace().any(|c| c == class))
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS
            .iter()
            .any(|t| self.tag.eq_ignore_ascii_case(t))
    }

    pub fn is_block(&self) -> bool {
        BLOCK_ELEMENTS
            .iter()
            .any(|t| self.tag.eq_ignore_ascii_case(t))
    }

    pub fn is_line_break(&self) -> bool {
        self.tag.eq_ignore_ascii_case("br")
    }
}

/// A placeholder rendered as a single non-editable unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableToken {
    /// Authoritative identifier; the only part that round-trips to raw text.
    pub name: SmolStr,
    /// Display text. Informational only.
    pub label: SmolStr,
    pub description: String,
}

impl VariableToken {
    pub fn new(name: impl Into<SmolStr>, label: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            description: String::new(),
        }
    }

    pub fn from_descriptor(descriptor: &VariableDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            label: descriptor.label.clone(),
            description: descriptor.description.clone(),
        }
    }

    /// A name is well formed when it is non-empty and can't close the placeholder early.
    pub fn has_valid_name(&self) -> bool {
        !self.name.is_empty() && !self.name.contains('}')
    }
}

/// Tagged node variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
    Variable(VariableToken),
    /// Transient marker showing where a dragged variable will land.
    DropIndicator,
}

impl NodeKind {
    /// Atomic nodes are never split and never contain a caret.
    pub fn is_atomic(&self) -> bool {
        match self {
            NodeKind::Variable(_) | NodeKind::DropIndicator => true,
            NodeKind::Element(el) => el.is_void(),
            NodeKind::Text(_) => false,
        }
    }

    /// Width of the node itself in caret stops, ignoring children.
    fn caret_width(&self) -> usize {
        match self {
            NodeKind::Text(text) => text.chars().count(),
            NodeKind::Variable(_) => 1,
            NodeKind::DropIndicator => 0,
            NodeKind::Element(el) if el.is_void() => 1,
            NodeKind::Element(_) => 0,
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A point in the document tree.
///
/// For text runs `offset` counts chars; for elements it is a child index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub node: NodeId,
    pub offset: usize,
}

impl Position {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// The editable document.
///
/// The root is a `div` container standing in for the editable host element;
/// only its children are content.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Option<Slot>>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let root = Slot {
            kind: NodeKind::Element(Element::new("div")),
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![Some(root)],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn slot(&self, id: NodeId) -> Option<&Slot> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Slot> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    // === Node creation ===

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(Slot {
            kind,
            parent: None,
            children: Vec::new(),
        }));
        id
    }

    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.alloc(NodeKind::Element(element))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text(text.into()))
    }

    pub fn create_variable(&mut self, token: VariableToken) -> NodeId {
        self.alloc(NodeKind::Variable(token))
    }

    pub fn create_drop_indicator(&mut self) -> NodeId {
        self.alloc(NodeKind::DropIndicator)
    }

    // === Inspection ===

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.slot(id).map(|s| &s.kind)
    }

    pub fn kind_mut(&mut self, id: NodeId) -> Option<&mut NodeKind> {
        self.slot_mut(id).map(|s| &mut s.kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).and_then(|s| s.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slot(id).map(|s| s.children.as_slice()).unwrap_or(&[])
    }

    /// Whether the node still exists (it may be detached).
    pub fn is_live(&self, id: NodeId) -> bool {
        self.slot(id).is_some()
    }

    /// Whether the node exists and is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    pub fn is_atomic(&self, id: NodeId) -> bool {
        self.kind(id).is_some_and(NodeKind::is_atomic)
    }

    /// Largest valid offset for a position in `id`.
    pub fn max_offset(&self, id: NodeId) -> usize {
        match self.kind(id) {
            Some(NodeKind::Text(text)) => text.chars().count(),
            Some(_) => self.children(id).len(),
            None => 0,
        }
    }

    /// Concatenated text, with token labels standing in for tokens.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            match self.kind(node) {
                Some(NodeKind::Text(text)) => out.push_str(text),
                Some(NodeKind::Variable(token)) => out.push_str(&token.label),
                _ => {}
            }
        }
        out
    }

    /// Pre-order traversal of `id` and its subtree.
    ///
    /// Atomic nodes have no children, so they are visited once and never entered.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if !self.is_live(node) {
                continue;
            }
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// All variable tokens in document order.
    pub fn variable_tokens(&self) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|id| matches!(self.kind(*id), Some(NodeKind::Variable(_))))
            .collect()
    }

    pub fn variable_names(&self) -> Vec<SmolStr> {
        self.variable_tokens()
            .into_iter()
            .filter_map(|id| match self.kind(id) {
                Some(NodeKind::Variable(token)) => Some(token.name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn drop_indicators(&self) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|id| matches!(self.kind(*id), Some(NodeKind::DropIndicator)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    // === Mutation ===

    /// Detach `child` from wherever it is and insert it at `index` under `parent`.
    ///
    /// `index` is clamped to the child count. Returns false if either node is
    /// dead, the parent is atomic, or the insertion would create a cycle.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> bool {
        if !self.is_live(child) || self.is_atomic(parent) || child == self.root {
            return false;
        }
        if !matches!(self.kind(parent), Some(NodeKind::Element(_))) {
            return false;
        }
        // Refuse to move a node under its own descendant.
        let mut ancestor = Some(parent);
        while let Some(a) = ancestor {
            if a == child {
                return false;
            }
            ancestor = self.parent(a);
        }

        let mut index = index;
        if let Some(old_parent) = self.parent(child) {
            if let Some(old_index) = self.index_in_parent(child) {
                if old_parent == parent && old_index < index {
                    index -= 1;
                }
            }
            self.detach(child);
        }

        let Some(slot) = self.slot_mut(parent) else {
            return false;
        };
        let index = index.min(slot.children.len());
        slot.children.insert(index, child);
        if let Some(slot) = self.slot_mut(child) {
            slot.parent = Some(parent);
        }
        true
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let len = self.children(parent).len();
        self.insert_child(parent, len, child)
    }

    /// Unlink a node from its parent, keeping it (and its subtree) alive.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(slot) = self.slot_mut(parent) {
            slot.children.retain(|c| *c != id);
        }
        if let Some(slot) = self.slot_mut(id) {
            slot.parent = None;
        }
    }

    /// Remove a node and its whole subtree. Its ids become dead.
    pub fn remove(&mut self, id: NodeId) {
        if id == self.root {
            return;
        }
        self.detach(id);
        for node in self.descendants(id) {
            if let Some(slot) = self.nodes.get_mut(node.index()) {
                *slot = None;
            }
        }
    }

    /// Remove every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        for child in self.children(id).to_vec() {
            self.remove(child);
        }
    }

    /// Merge runs of adjacent text children of `parent` and drop empty ones.
    pub fn merge_adjacent_text(&mut self, parent: NodeId) {
        let children = self.children(parent).to_vec();
        let mut previous_text: Option<NodeId> = None;
        for child in children {
            let text = match self.kind(child) {
                Some(NodeKind::Text(text)) => text.clone(),
                _ => {
                    previous_text = None;
                    continue;
                }
            };
            if text.is_empty() {
                self.remove(child);
                continue;
            }
            match previous_text {
                Some(prev) => {
                    if let Some(NodeKind::Text(prev_text)) = self.kind_mut(prev) {
                        prev_text.push_str(&text);
                    }
                    self.remove(child);
                }
                None => previous_text = Some(child),
            }
        }
    }

    /// Split a text run at a char offset, returning the new tail node.
    ///
    /// Returns None when `id` is not an attached text run or the offset is
    /// not strictly inside it.
    pub fn split_text(&mut self, id: NodeId, char_offset: usize) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        let tail = match self.kind_mut(id)? {
            NodeKind::Text(text) => {
                let len = text.chars().count();
                if char_offset == 0 || char_offset >= len {
                    return None;
                }
                let byte = text
                    .char_indices()
                    .nth(char_offset)
                    .map(|(b, _)| b)
                    .unwrap_or(text.len());
                text.split_off(byte)
            }
            _ => return None,
        };
        let tail_id = self.create_text(tail);
        self.insert_child(parent, index + 1, tail_id);
        Some(tail_id)
    }

    /// Move a position out of atomic nodes and reject stale ones.
    ///
    /// A position on an atomic node lands right after it. Returns None if
    /// the node is detached or the offset is out of range.
    pub fn resolve_position(&self, position: Position) -> Option<Position> {
        if !self.is_attached(position.node) {
            return None;
        }
        if self.is_atomic(position.node) {
            let parent = self.parent(position.node)?;
            let index = self.index_in_parent(position.node)?;
            return Some(Position::new(parent, index + 1));
        }
        if position.offset > self.max_offset(position.node) {
            return None;
        }
        Some(position)
    }

    /// Insert `node` at `position`, splitting a text run if needed.
    ///
    /// Returns false if the position doesn't resolve.
    pub fn insert_at(&mut self, position: Position, node: NodeId) -> bool {
        let Some(position) = self.resolve_position(position) else {
            return false;
        };
        match self.kind(position.node) {
            Some(NodeKind::Text(text)) => {
                let len = text.chars().count();
                let (Some(parent), Some(index)) = (
                    self.parent(position.node),
                    self.index_in_parent(position.node),
                ) else {
                    return false;
                };
                if position.offset == 0 {
                    self.insert_child(parent, index, node)
                } else if position.offset >= len {
                    self.insert_child(parent, index + 1, node)
                } else {
                    self.split_text(position.node, position.offset);
                    self.insert_child(parent, index + 1, node)
                }
            }
            Some(NodeKind::Element(_)) => self.insert_child(position.node, position.offset, node),
            _ => false,
        }
    }

    /// Position immediately after `id` in its parent.
    pub fn position_after(&self, id: NodeId) -> Option<Position> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        Some(Position::new(parent, index + 1))
    }

    // === Flat caret coordinates ===
    //
    // Each char of a text run is one stop, atomic nodes are one stop each and
    // drop indicators are zero width. Used to map pointer hits and to compare
    // positions across documents with different node identities.

    /// Caret width of a whole subtree.
    fn subtree_width(&self, id: NodeId) -> usize {
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.kind(n).map(NodeKind::caret_width))
            .sum()
    }

    /// Total caret stops in the document.
    pub fn caret_len(&self) -> usize {
        self.subtree_width(self.root)
    }

    /// Caret offset just before `target` in document order.
    fn caret_offset_before(&self, target: NodeId) -> Option<usize> {
        let mut acc = 0;
        for node in self.descendants(self.root) {
            if node == target {
                return Some(acc);
            }
            acc += self.kind(node).map(NodeKind::caret_width).unwrap_or(0);
        }
        None
    }

    /// Flat caret offset of a position.
    pub fn caret_offset_of(&self, position: Position) -> Option<usize> {
        let position = self.resolve_position(position)?;
        match self.kind(position.node)? {
            NodeKind::Text(_) => {
                Some(self.caret_offset_before(position.node)? + position.offset)
            }
            _ => {
                let children = self.children(position.node);
                match children.get(position.offset) {
                    Some(child) => self.caret_offset_before(*child),
                    None => Some(
                        self.caret_offset_before(position.node)?
                            + self.subtree_width(position.node),
                    ),
                }
            }
        }
    }

    /// Position for a flat caret offset.
    ///
    /// Offsets on a text boundary resolve into the earlier text run.
    pub fn position_at_caret_offset(&self, target: usize) -> Option<Position> {
        let mut acc = 0;
        self.find_caret_position(self.root, target, &mut acc)
            .or_else(|| {
                (target == acc).then(|| Position::new(self.root, self.children(self.root).len()))
            })
    }

    fn find_caret_position(&self, parent: NodeId, target: usize, acc: &mut usize) -> Option<Position> {
        for (index, child) in self.children(parent).iter().enumerate() {
            match self.kind(*child)? {
                NodeKind::Text(text) => {
                    let len = text.chars().count();
                    if target <= *acc + len {
                        return Some(Position::new(*child, target - *acc));
                    }
                    *acc += len;
                }
                NodeKind::DropIndicator => {}
                kind if kind.is_atomic() => {
                    if target == *acc {
                        return Some(Position::new(parent, index));
                    }
                    *acc += 1;
                }
                _ => {
                    if let Some(found) = self.find_caret_position(*child, target, acc) {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    // === Paths ===

    /// Child-index path from the root to `id`.
    pub fn path_of(&self, id: NodeId) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let mut current = id;
        while current != self.root {
            path.push(self.index_in_parent(current)?);
            current = self.parent(current)?;
        }
        path.reverse();
        Some(path)
    }

    pub fn node_at_path(&self, path: &[usize]) -> Option<NodeId> {
        let mut current = self.root;
        for index in path {
            current = *self.children(current).get(*index)?;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// "Hello " [userName] "world"
    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let hello = doc.create_text("Hello ");
        let token = doc.create_variable(VariableToken::new("userName", "用户姓名"));
        let world = doc.create_text("world");
        doc.append_child(root, hello);
        doc.append_child(root, token);
        doc.append_child(root, world);
        (doc, hello, token, world)
    }

    #[test]
    fn test_removed_nodes_are_detectably_dead() {
        let (mut doc, hello, token, _) = sample();
        doc.remove(token);
        assert!(!doc.is_live(token));
        assert!(!doc.is_attached(token));
        assert!(doc.is_attached(hello));
        // New nodes never reuse the slot.
        let fresh = doc.create_text("x");
        assert_ne!(fresh, token);
    }

    #[test]
    fn test_detached_subtree_is_not_attached() {
        let (mut doc, _, _, _) = sample();
        let wrapper = doc.create_element(Element::new("span"));
        let inner = doc.create_text("inner");
        doc.append_child(wrapper, inner);
        assert!(doc.is_live(inner));
        assert!(!doc.is_attached(inner));
        doc.append_child(doc.root(), wrapper);
        assert!(doc.is_attached(inner));
    }

    #[test]
    fn test_split_and_merge_text() {
        let (mut doc, hello, _, _) = sample();
        let tail = doc.split_text(hello, 3).unwrap();
        assert_eq!(doc.kind(hello), Some(&NodeKind::Text("Hel".into())));
        assert_eq!(doc.kind(tail), Some(&NodeKind::Text("lo ".into())));
        assert_eq!(doc.children(doc.root()).len(), 4);

        doc.merge_adjacent_text(doc.root());
        assert_eq!(doc.children(doc.root()).len(), 3);
        assert_eq!(doc.kind(hello), Some(&NodeKind::Text("Hello ".into())));
        assert!(!doc.is_live(tail));
    }

    #[test]
    fn test_split_text_is_char_based() {
        let mut doc = Document::new();
        let text = doc.create_text("你好世界");
        doc.append_child(doc.root(), text);
        let tail = doc.split_text(text, 2).unwrap();
        assert_eq!(doc.kind(text), Some(&NodeKind::Text("你好".into())));
        assert_eq!(doc.kind(tail), Some(&NodeKind::Text("世界".into())));
    }

    #[test]
    fn test_insert_inside_text_splits_it() {
        let mut doc = Document::new();
        let text = doc.create_text("Hello world");
        doc.append_child(doc.root(), text);
        let token = doc.create_variable(VariableToken::new("orderNo", "订单编号"));
        assert!(doc.insert_at(Position::new(text, 6), token));
        assert_eq!(doc.children(doc.root()).len(), 3);
        assert_eq!(doc.index_in_parent(token), Some(1));
        assert_eq!(doc.text_content(doc.root()), "Hello 订单编号world");
    }

    #[test]
    fn test_insert_at_text_edges_does_not_split() {
        let mut doc = Document::new();
        let text = doc.create_text("abc");
        doc.append_child(doc.root(), text);
        let a = doc.create_drop_indicator();
        let b = doc.create_drop_indicator();
        assert!(doc.insert_at(Position::new(text, 0), a));
        assert!(doc.insert_at(Position::new(text, 3), b));
        assert_eq!(doc.children(doc.root()), &[a, text, b]);
    }

    #[test]
    fn test_positions_never_enter_atomic_nodes() {
        let (doc, _, token, _) = sample();
        let resolved = doc.resolve_position(Position::new(token, 0)).unwrap();
        assert_eq!(resolved, Position::new(doc.root(), 2));
    }

    #[test]
    fn test_resolve_rejects_out_of_range() {
        let (doc, hello, _, _) = sample();
        assert!(doc.resolve_position(Position::new(hello, 6)).is_some());
        assert!(doc.resolve_position(Position::new(hello, 7)).is_none());
    }

    #[test]
    fn test_caret_offsets_treat_tokens_as_one_stop() {
        let (doc, hello, token, world) = sample();
        assert_eq!(doc.caret_len(), 6 + 1 + 5);
        assert_eq!(doc.position_at_caret_offset(6), Some(Position::new(hello, 6)));
        assert_eq!(doc.position_at_caret_offset(7), Some(Position::new(world, 0)));
        assert_eq!(doc.position_at_caret_offset(12), Some(Position::new(world, 5)));
        assert_eq!(doc.position_at_caret_offset(13), None);

        let after_token = doc.position_after(token).unwrap();
        assert_eq!(doc.caret_offset_of(after_token), Some(7));
        assert_eq!(doc.caret_offset_of(Position::new(world, 2)), Some(9));
    }

    #[test]
    fn test_caret_offset_skips_drop_indicator() {
        let (mut doc, hello, _, _) = sample();
        let indicator = doc.create_drop_indicator();
        doc.insert_at(Position::new(hello, 6), indicator);
        assert_eq!(doc.caret_len(), 12);
    }

    #[test]
    fn test_caret_offset_in_nested_blocks() {
        let mut doc = Document::new();
        let first = doc.create_element(Element::new("div"));
        let a = doc.create_text("ab");
        doc.append_child(first, a);
        let second = doc.create_element(Element::new("div"));
        let b = doc.create_text("cd");
        doc.append_child(second, b);
        doc.append_child(doc.root(), first);
        doc.append_child(doc.root(), second);

        assert_eq!(doc.position_at_caret_offset(3), Some(Position::new(b, 1)));
        assert_eq!(doc.caret_offset_of(Position::new(doc.root(), 1)), Some(2));
        assert_eq!(doc.caret_offset_of(Position::new(doc.root(), 2)), Some(4));
    }

    #[test]
    fn test_paths_round_trip() {
        let mut doc = Document::new();
        let block = doc.create_element(Element::new("div"));
        let text = doc.create_text("x");
        doc.append_child(doc.root(), block);
        doc.append_child(block, text);
        let path = doc.path_of(text).unwrap();
        assert_eq!(path, vec![0, 0]);
        assert_eq!(doc.node_at_path(&path), Some(text));
        assert_eq!(doc.node_at_path(&[]), Some(doc.root()));
        assert_eq!(doc.node_at_path(&[3]), None);
    }

    #[test]
    fn test_insert_child_refuses_cycles() {
        let mut doc = Document::new();
        let outer = doc.create_element(Element::new("span"));
        let inner = doc.create_element(Element::new("span"));
        doc.append_child(doc.root(), outer);
        doc.append_child(outer, inner);
        assert!(!doc.insert_child(inner, 0, outer));
        assert!(!doc.insert_child(inner, 0, doc.root()));
    }

    #[test]
    fn test_variable_names_in_document_order() {
        let (mut doc, _, _, world) = sample();
        let second = doc.create_variable(VariableToken::new("orderNo", "订单编号"));
        doc.insert_at(Position::new(world, 5), second);
        assert_eq!(doc.variable_names(), vec!["userName", "orderNo"]);
    }
}
