use crate::domain::model::{Category, CategoryId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How a child toggle is reflected on its ancestors.
///
/// `Lenient` is what the storefront has always done: checking a child checks
/// the supplied parent (one level only) once all of its children are checked,
/// while unchecking a child unchecks the parent only when none of its
/// children are left checked, and then keeps walking up through `parent_id`.
///
/// `Strict` keeps "parent checked iff all children checked" at every level,
/// in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParentSync {
    #[default]
    Lenient,
    Strict,
}

/// Immutable category snapshot, fetched once per page load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTree {
    roots: Vec<Category>,
}

impl CategoryTree {
    pub fn new(roots: Vec<Category>) -> Self {
        Self { roots }
    }

    /// Depth-first lookup. Trees are a few dozen nodes, so no index is kept.
    pub fn find(&self, id: &CategoryId) -> Option<&Category> {
        fn walk<'a>(nodes: &'a [Category], id: &CategoryId) -> Option<&'a Category> {
            for node in nodes {
                if &node.id == id {
                    return Some(node);
                }
                if let Some(found) = walk(&node.children, id) {
                    return Some(found);
                }
            }
            None
        }

        walk(&self.roots, id)
    }

    pub fn len(&self) -> usize {
        fn count(nodes: &[Category]) -> usize {
            nodes.iter().map(|node| 1 + count(&node.children)).sum()
        }

        count(&self.roots)
    }
}

/// Checkbox cache plus the ordered selection that is sent to the backend.
///
/// Every operation is pure: it returns the next state and leaves `self` alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    checked: HashMap<CategoryId, bool>,
    selected: Vec<CategoryId>,
    parent_sync: ParentSync,
}

impl FilterState {
    pub fn new(parent_sync: ParentSync) -> Self {
        Self {
            parent_sync,
            ..Self::default()
        }
    }

    pub fn parent_sync(&self) -> ParentSync {
        self.parent_sync
    }

    /// Category ids in the order they were selected.
    pub fn selected(&self) -> &[CategoryId] {
        &self.selected
    }

    pub fn is_checked(&self, id: &CategoryId) -> bool {
        self.checked.get(id).copied().unwrap_or(false)
    }

    pub fn is_selected(&self, id: &CategoryId) -> bool {
        self.is_checked(id) || self.selected.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn cleared(&self) -> Self {
        Self::new(self.parent_sync)
    }

    /// A single category checkbox changed. `parent_id` is the parent the row
    /// was rendered under, if any.
    pub fn toggle(
        &self,
        tree: &CategoryTree,
        id: &CategoryId,
        parent_id: Option<&CategoryId>,
        checked: bool,
    ) -> Self {
        let Some(node) = tree.find(id) else {
            tracing::debug!(category = %id, "toggle ignored, category not in tree");
            return self.clone();
        };

        let mut next = self.clone();
        next.set(id, checked);
        next.set_descendants(node, checked);

        match self.parent_sync {
            ParentSync::Lenient => match (parent_id, checked) {
                (Some(parent_id), true) => next.check_parent_if_all_children_checked(tree, parent_id),
                (Some(parent_id), false) => {
                    next.uncheck_parent_if_no_children_checked(tree, parent_id)
                }
                (None, _) => {}
            },
            ParentSync::Strict => {
                let start = parent_id.or(node.parent_id.as_ref());
                next.sync_ancestors(tree, start);
            }
        }

        next
    }

    /// The checkbox on a parent row: sets the row and everything below it.
    /// Only `Strict` looks upward afterwards.
    pub fn select_with_subcategories(&self, tree: &CategoryTree, id: &CategoryId, checked: bool) -> Self {
        let Some(node) = tree.find(id) else {
            tracing::debug!(category = %id, "selection ignored, category not in tree");
            return self.clone();
        };

        let mut next = self.clone();
        next.set(id, checked);
        next.set_descendants(node, checked);
        if self.parent_sync == ParentSync::Strict {
            next.sync_ancestors(tree, node.parent_id.as_ref());
        }
        next
    }

    fn set(&mut self, id: &CategoryId, checked: bool) {
        self.checked.insert(id.clone(), checked);
        if checked {
            if !self.selected.contains(id) {
                self.selected.push(id.clone());
            }
        } else {
            self.selected.retain(|selected| selected != id);
        }
    }

    fn set_descendants(&mut self, node: &Category, checked: bool) {
        for child in &node.children {
            self.set(&child.id, checked);
            self.set_descendants(child, checked);
        }
    }

    fn all_children_checked(&self, node: &Category) -> bool {
        node.children.iter().all(|child| self.is_checked(&child.id))
    }

    fn check_parent_if_all_children_checked(&mut self, tree: &CategoryTree, parent_id: &CategoryId) {
        if let Some(parent) = tree.find(parent_id) {
            if self.all_children_checked(parent) {
                self.set(parent_id, true);
            }
        }
    }

    fn uncheck_parent_if_no_children_checked(&mut self, tree: &CategoryTree, parent_id: &CategoryId) {
        let mut current = Some(parent_id.clone());

        while let Some(id) = current.take() {
            let Some(parent) = tree.find(&id) else {
                break;
            };
            if parent.children.iter().any(|child| self.is_checked(&child.id)) {
                break;
            }
            self.set(&id, false);
            current = parent.parent_id.clone();
        }
    }

    fn sync_ancestors(&mut self, tree: &CategoryTree, start: Option<&CategoryId>) {
        let mut current = start.cloned();

        while let Some(id) = current.take() {
            let Some(parent) = tree.find(&id) else {
                break;
            };
            let all_checked = self.all_children_checked(parent);
            self.set(&id, all_checked);
            current = parent.parent_id.clone();
        }
    }
}
