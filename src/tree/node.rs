//! Node types: NodeId, ElementKind, Dirty, Node.

use bitflags::bitflags;
use slotmap::new_key_type;

use crate::element::layout::DynamicWeight;
use crate::geometry::{Region, Size};

new_key_type! {
    /// Unique identifier for a tree node. Copy, lightweight (u64).
    ///
    /// Generational: an id of a destroyed node never resolves to a node
    /// created later in the same slot.
    pub struct NodeId;
}

/// The closed set of element kinds. Each maps to exactly one system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Vertical or horizontal container with optional scrolling.
    Series,
    /// Single line of text.
    Text,
    /// Word-wrapped multi-line text.
    TextBox,
    Button,
    Checkbox,
    /// Editable text, also used for numeric input.
    TextInput,
    Dropdown,
    /// Placeholder that keeps its position whether or not its subtree exists.
    Optional,
    /// Popup window laid out independently of its parent.
    Floating,
    /// Fixed-size canvas drawn by caller code.
    Viewport,
}

impl ElementKind {
    pub const ALL: [ElementKind; 10] = [
        Self::Series,
        Self::Text,
        Self::TextBox,
        Self::Button,
        Self::Checkbox,
        Self::TextInput,
        Self::Dropdown,
        Self::Optional,
        Self::Floating,
        Self::Viewport,
    ];

    /// Whether nodes of this kind have declared children.
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Series | Self::Optional | Self::Floating)
    }

    /// Whether nodes of this kind are laid out outside their parent's flow.
    pub const fn is_floating(self) -> bool {
        matches!(self, Self::Floating)
    }
}

bitflags! {
    /// Per-node invalidation state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Dirty: u8 {
        /// The node itself must be re-evaluated on its next visit.
        const SELF = 1 << 0;
        /// Some descendant must be re-evaluated.
        const CHILD = 1 << 1;
        /// Layout input must be recomputed for this node or a descendant.
        const LAYOUT = 1 << 2;
    }
}

/// Layout inputs and outputs stored on every node.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NodeLayout {
    /// Intrinsic size the node needs regardless of available space.
    pub fixed_size: Size,
    /// Share of leftover space requested along each axis.
    pub dynamic: DynamicWeight,
    /// Resolved box in unscrolled window coordinates.
    pub region: Region,
}

/// One widget instance in the tree.
///
/// Siblings form a doubly linked list threaded through `prev`/`next`; a
/// parent points at both ends of its child list.
#[derive(Debug, Clone)]
pub struct Node {
    /// Element kind; selects the system owning `state`.
    pub kind: ElementKind,
    /// Index into the kind's state storage.
    pub state: usize,
    /// Explicit reconciliation key.
    pub key: Option<String>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) prev: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
    /// Frame number of the last visit.
    pub visited: u64,
    pub dirty: Dirty,
    pub layout: NodeLayout,
}

impl Node {
    /// A detached node with no children.
    pub fn new(kind: ElementKind, state: usize, key: Option<String>) -> Self {
        Self {
            kind,
            state,
            key,
            parent: None,
            prev: None,
            next: None,
            first_child: None,
            last_child: None,
            visited: 0,
            dirty: Dirty::SELF | Dirty::LAYOUT,
            layout: NodeLayout::default(),
        }
    }

    /// Parent node, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Following sibling.
    pub fn next_sibling(&self) -> Option<NodeId> {
        self.next
    }

    /// Preceding sibling.
    pub fn prev_sibling(&self) -> Option<NodeId> {
        self.prev
    }

    /// First child.
    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    /// Whether the node has any children.
    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }

    /// Whether the key matches and the kind is the same.
    pub fn matches(&self, kind: ElementKind, key: Option<&str>) -> bool {
        self.kind == kind && self.key.as_deref() == key
    }
}
