//! Color-group index: named sets of cells that share one color.
//!
//! A cell belongs to at most one group. The index keeps a reverse map from
//! cell to group name alongside the groups themselves, so membership checks
//! and removals by exact coordinate stay O(log n). Groups with no members are
//! deleted as soon as they empty.

#[cfg(test)]
#[path = "groups_test.rs"]
mod groups_test;

use std::collections::{BTreeMap, HashMap};

use crate::grid::CellId;

/// A cell added to a group, with the color it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMember {
    pub cell: CellId,
    pub color: Option<String>,
}

impl GroupMember {
    #[must_use]
    pub fn new(cell: CellId, color: Option<String>) -> Self {
        Self { cell, color }
    }
}

/// Which cells a removal applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupCriteria {
    /// Every cell in this row.
    Row(i32),
    /// Every cell in this column.
    Column(i32),
    /// One exact cell.
    Cell(CellId),
}

impl GroupCriteria {
    #[must_use]
    pub fn matches(self, cell: CellId) -> bool {
        match self {
            Self::Row(row) => cell.row == row,
            Self::Column(column) => cell.column == column,
            Self::Cell(id) => cell == id,
        }
    }
}

/// A named group and its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorGroup {
    pub name: String,
    /// Color most recently applied to the whole group.
    pub color: Option<String>,
    members: BTreeMap<CellId, Option<String>>,
}

impl ColorGroup {
    fn new(name: &str) -> Self {
        Self { name: name.to_owned(), color: None, members: BTreeMap::new() }
    }

    /// Member cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellId> + '_ {
        self.members.keys().copied()
    }

    /// Members with the color each one carries.
    pub fn members(&self) -> impl Iterator<Item = GroupMember> + '_ {
        self.members.iter().map(|(cell, color)| GroupMember::new(*cell, color.clone()))
    }

    #[must_use]
    pub fn contains(&self, cell: CellId) -> bool {
        self.members.contains_key(&cell)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorGroups {
    groups: BTreeMap<String, ColorGroup>,
    owner: HashMap<CellId, String>,
}

impl ColorGroups {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Queries ---

    #[must_use]
    pub fn group(&self, name: &str) -> Option<&ColorGroup> {
        self.groups.get(name)
    }

    /// Name of the group holding `cell`, if any.
    #[must_use]
    pub fn group_of(&self, cell: CellId) -> Option<&str> {
        self.owner.get(&cell).map(String::as_str)
    }

    /// Groups in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ColorGroup> {
        self.groups.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    // --- Mutations ---

    /// Add `members` to the group `name`, creating it if absent.
    ///
    /// A member already held by another group is moved, never duplicated.
    pub fn append_to_group(&mut self, name: &str, members: impl IntoIterator<Item = GroupMember>) {
        for member in members {
            if self.owner.get(&member.cell).is_some_and(|current| current != name) {
                self.remove_from_group(GroupCriteria::Cell(member.cell));
            }
            self.groups
                .entry(name.to_owned())
                .or_insert_with(|| ColorGroup::new(name))
                .members
                .insert(member.cell, member.color);
            self.owner.insert(member.cell, name.to_owned());
        }
    }

    /// Remove every cell matching `criteria` from whichever group holds it.
    ///
    /// Returns the removed cells in row-major order. Groups left without
    /// members are deleted.
    pub fn remove_from_group(&mut self, criteria: GroupCriteria) -> Vec<CellId> {
        let mut removed: Vec<CellId> = match criteria {
            GroupCriteria::Cell(cell) if self.owner.contains_key(&cell) => vec![cell],
            GroupCriteria::Cell(_) => Vec::new(),
            GroupCriteria::Row(_) | GroupCriteria::Column(_) => {
                self.owner.keys().copied().filter(|cell| criteria.matches(*cell)).collect()
            }
        };
        removed.sort_unstable();
        for cell in &removed {
            let Some(name) = self.owner.remove(cell) else {
                continue;
            };
            if let Some(group) = self.groups.get_mut(&name) {
                group.members.remove(cell);
                if group.members.is_empty() {
                    self.groups.remove(&name);
                }
            }
        }
        removed
    }

    /// Set the color of group `name` and of every member.
    ///
    /// Returns `false` when no such group exists.
    pub fn change_group_color(&mut self, name: &str, color: Option<&str>) -> bool {
        let Some(group) = self.groups.get_mut(name) else {
            return false;
        };
        group.color = color.map(str::to_owned);
        for member_color in group.members.values_mut() {
            member_color.clone_from(&group.color);
        }
        true
    }

    pub fn clear(&mut self) {
        self.groups.clear();
        self.owner.clear();
    }
}
