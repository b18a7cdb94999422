//! Group name table.

use indexmap::IndexMap;

use crate::instr::GroupId;

/// Maps each group name to the groups carrying it, in definition order.
///
/// A name may be shared by several groups ("multiplexed"); resolution then
/// depends on which of them participated in a match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTable {
    entries: IndexMap<String, Vec<GroupId>>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, group: GroupId) {
        let groups = self.entries.entry(name.to_owned()).or_default();
        if !groups.contains(&group) {
            groups.push(group);
        }
    }

    /// All groups with `name`, ascending.
    pub fn groups(&self, name: &str) -> Option<&[GroupId]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// Resolves `name` to one group: the last one with a capture, if any.
    pub fn resolve(&self, name: &str, is_set: impl Fn(GroupId) -> bool) -> Option<GroupId> {
        let groups = self.groups(name)?;
        groups
            .iter()
            .rev()
            .copied()
            .find(|&g| is_set(g))
            .or_else(|| groups.last().copied())
    }

    /// Name of `group`, if it has one.
    pub fn name_of(&self, group: GroupId) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, groups)| groups.contains(&group))
            .map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[GroupId])> {
        self.entries.iter().map(|(n, g)| (n.as_str(), g.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrites group numbers through `map`, dropping groups mapped to `None`.
    pub fn renumber(&mut self, map: impl Fn(GroupId) -> Option<GroupId>) {
        for groups in self.entries.values_mut() {
            *groups = groups.iter().filter_map(|&g| map(g)).collect();
            groups.sort_unstable();
            groups.dedup();
        }
        self.entries.retain(|_, groups| !groups.is_empty());
    }
}
