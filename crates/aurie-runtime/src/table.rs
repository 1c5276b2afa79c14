//! Per-module interface tables

use aurie_api::{same_interface, InterfaceHandle, ModuleId};
use serde::{Deserialize, Serialize};

/// How interface names are compared during lookup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameComparison {
    /// ASCII case-insensitive comparison
    #[default]
    CaseInsensitive,

    /// Byte-for-byte comparison
    Exact,
}

impl NameComparison {
    /// Compare two names under this mode
    pub fn matches(self, a: &str, b: &str) -> bool {
        match self {
            NameComparison::CaseInsensitive => a.eq_ignore_ascii_case(b),
            NameComparison::Exact => a == b,
        }
    }
}

/// One published interface: its name, the object, and the owning module
///
/// Entries are never mutated once inserted; destruction removes them.
#[derive(Debug, Clone)]
pub struct InterfaceTableEntry {
    name: String,
    interface: InterfaceHandle,
    owner: ModuleId,
}

impl InterfaceTableEntry {
    pub(crate) fn new(name: String, interface: InterfaceHandle, owner: ModuleId) -> Self {
        Self {
            name,
            interface,
            owner,
        }
    }

    /// Name the interface was published under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The interface object
    pub fn interface(&self) -> &InterfaceHandle {
        &self.interface
    }

    /// Module that published the interface
    pub fn owner(&self) -> ModuleId {
        self.owner
    }
}

/// Serializable description of a published interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceInfo {
    /// Published name
    pub name: String,

    /// Owning module
    pub owner: ModuleId,

    /// Owning module's display name
    pub owner_name: String,

    /// Concrete type of the interface object
    pub type_name: String,
}

/// Ordered interface table of a single module
#[derive(Debug, Clone, Default)]
pub(crate) struct InterfaceTable {
    entries: Vec<InterfaceTableEntry>,
}

impl InterfaceTable {
    pub(crate) fn push(&mut self, entry: InterfaceTableEntry) {
        self.entries.push(entry);
    }

    /// First entry in insertion order whose name matches
    pub(crate) fn find(&self, name: &str, comparison: NameComparison) -> Option<&InterfaceTableEntry> {
        self.entries
            .iter()
            .find(|entry| comparison.matches(&entry.name, name))
    }

    /// Remove every entry referring to `interface`, returning how many went
    pub(crate) fn remove_interface(&mut self, interface: &InterfaceHandle) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|entry| !same_interface(&entry.interface, interface));
        before - self.entries.len()
    }

    /// True if any entry refers to `interface`
    pub(crate) fn contains(&self, interface: &InterfaceHandle) -> bool {
        self.entries
            .iter()
            .any(|entry| same_interface(&entry.interface, interface))
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &InterfaceTableEntry> {
        self.entries.iter()
    }

    /// Distinct interface objects, first occurrence order
    pub(crate) fn distinct_interfaces(&self) -> Vec<InterfaceHandle> {
        let mut distinct: Vec<InterfaceHandle> = Vec::new();
        for entry in &self.entries {
            if !distinct.iter().any(|seen| same_interface(seen, &entry.interface)) {
                distinct.push(entry.interface.clone());
            }
        }
        distinct
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.name.clone()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
