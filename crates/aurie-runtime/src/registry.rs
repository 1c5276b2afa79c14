//! Object manager: the cross-module interface registry
//!
//! All modules and their interface tables live behind one exclusive lock, so
//! name uniqueness across every table is serialized during publish and
//! destroy. Interface `create`/`destroy` calls run with the lock released;
//! they are free to call back into the object manager.
//!
//! Names are compared ASCII case-insensitively everywhere except
//! [`ObjectManager::lookup_owner`], which takes the comparison explicitly.

use crate::config::ObjectManagerConfig;
use crate::error::{ObjectError, Result};
use crate::table::{InterfaceInfo, InterfaceTable, InterfaceTableEntry, NameComparison};
use aurie_api::{
    downcast_interface, Interface, InterfaceHandle, ModuleCallback, ModuleId, ModuleState,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Registry of loaded modules and the interfaces they publish
///
/// Cloning is cheap and yields another handle to the same registry.
/// Independent registries can coexist in one process.
#[derive(Clone, Debug)]
pub struct ObjectManager {
    inner: Arc<RwLock<Registry>>,
    config: Arc<ObjectManagerConfig>,
}

#[derive(Debug, Default)]
pub(crate) struct Registry {
    /// Loaded modules in load order
    pub(crate) modules: Vec<ModuleRecord>,
    next_id: u64,
}

/// Registry-side record of one module
pub(crate) struct ModuleRecord {
    pub(crate) id: ModuleId,
    pub(crate) name: String,
    pub(crate) image_path: Option<PathBuf>,
    pub(crate) state: ModuleState,
    pub(crate) table: InterfaceTable,
    pub(crate) callback: Option<ModuleCallback>,
    pub(crate) loaded_at: Instant,
}

impl std::fmt::Debug for ModuleRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state)
            .field("table", &self.table)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

impl ModuleRecord {
    fn info(&self) -> ModuleInfo {
        ModuleInfo {
            id: self.id,
            name: self.name.clone(),
            image_path: self.image_path.clone(),
            state: self.state.clone(),
            interfaces: self.table.names(),
            has_callback: self.callback.is_some(),
            loaded_at: Some(self.loaded_at),
        }
    }
}

impl Registry {
    pub(crate) fn module(&self, id: ModuleId) -> Option<&ModuleRecord> {
        self.modules.iter().find(|record| record.id == id)
    }

    fn module_mut(&mut self, id: ModuleId) -> Option<&mut ModuleRecord> {
        self.modules.iter_mut().find(|record| record.id == id)
    }

    /// Scan modules in load order, then each table in insertion order
    fn find(&self, name: &str, comparison: NameComparison) -> Option<&InterfaceTableEntry> {
        self.modules
            .iter()
            .find_map(|record| record.table.find(name, comparison))
    }

    /// True if `interface` is published anywhere, under any name
    fn holds(&self, interface: &InterfaceHandle) -> bool {
        self.modules
            .iter()
            .any(|record| record.table.contains(interface))
    }

    fn interface_info(&self, entry: &InterfaceTableEntry) -> InterfaceInfo {
        InterfaceInfo {
            name: entry.name().to_string(),
            owner: entry.owner(),
            owner_name: self
                .module(entry.owner())
                .map(|record| record.name.clone())
                .unwrap_or_default(),
            type_name: entry.interface().type_name().to_string(),
        }
    }
}

/// Snapshot of a loaded module
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleInfo {
    /// Module id
    pub id: ModuleId,

    /// Display name
    pub name: String,

    /// Path of the module image, if the loader supplied one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,

    /// Lifecycle state
    pub state: ModuleState,

    /// Names of published interfaces, in publication order
    pub interfaces: Vec<String>,

    /// Whether a lifecycle callback is registered
    pub has_callback: bool,

    /// When the module was registered
    #[serde(skip)]
    pub loaded_at: Option<Instant>,
}

impl ObjectManager {
    /// Create a new object manager with default configuration
    pub fn new() -> Self {
        Self::with_config(ObjectManagerConfig::default())
    }

    /// Create a new object manager with the given configuration
    pub fn with_config(config: ObjectManagerConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Registry::default())),
            config: Arc::new(config),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ObjectManagerConfig {
        &self.config
    }

    pub(crate) fn registry(&self) -> &RwLock<Registry> {
        &self.inner
    }

    // ---- module membership -------------------------------------------------

    /// Register a loaded module and return its id
    ///
    /// The module starts with an empty interface table and no callback.
    pub fn register_module(&self, name: impl Into<String>) -> ModuleId {
        self.insert_module(name.into(), None)
    }

    /// Register a loaded module together with its image path
    pub fn register_module_with_path(
        &self,
        name: impl Into<String>,
        image_path: impl Into<PathBuf>,
    ) -> ModuleId {
        self.insert_module(name.into(), Some(image_path.into()))
    }

    fn insert_module(&self, name: String, image_path: Option<PathBuf>) -> ModuleId {
        let mut registry = self.inner.write();
        registry.next_id += 1;
        let id = ModuleId::from_raw(registry.next_id);

        registry.modules.push(ModuleRecord {
            id,
            name: name.clone(),
            image_path,
            state: ModuleState::Loaded,
            table: InterfaceTable::default(),
            callback: None,
            loaded_at: Instant::now(),
        });

        info!(module = %id, name = %name, "Module registered");
        id
    }

    /// Purge a module's interfaces and remove it from the registry
    pub fn unregister_module(&self, id: ModuleId) -> Result<ModuleInfo> {
        self.purge_module(id)?;

        let mut registry = self.inner.write();
        let position = registry
            .modules
            .iter()
            .position(|record| record.id == id)
            .ok_or(ObjectError::ModuleNotFound(id))?;
        let record = registry.modules.remove(position);

        info!(module = %id, name = %record.name, "Module unregistered");
        Ok(record.info())
    }

    /// Update a module's lifecycle state
    pub fn set_module_state(&self, id: ModuleId, state: ModuleState) -> Result<()> {
        let mut registry = self.inner.write();
        let record = registry
            .module_mut(id)
            .ok_or(ObjectError::ModuleNotFound(id))?;

        debug!(module = %id, from = %record.state, to = %state, "Module state changed");
        record.state = state;
        Ok(())
    }

    /// Snapshot of one module
    pub fn module(&self, id: ModuleId) -> Option<ModuleInfo> {
        self.inner.read().module(id).map(ModuleRecord::info)
    }

    /// Snapshots of all modules in load order
    pub fn modules(&self) -> Vec<ModuleInfo> {
        self.inner
            .read()
            .modules
            .iter()
            .map(ModuleRecord::info)
            .collect()
    }

    /// Number of registered modules
    pub fn module_count(&self) -> usize {
        self.inner.read().modules.len()
    }

    // ---- interface table ---------------------------------------------------

    /// Publish `interface` under `name` on behalf of `module`
    ///
    /// Fails with [`ObjectError::AlreadyExists`] without calling `create` if
    /// the name is taken anywhere in the registry (case-insensitively). If
    /// `create` fails its error is returned unchanged and nothing is
    /// registered.
    pub fn publish(
        &self,
        module: ModuleId,
        name: impl Into<String>,
        interface: InterfaceHandle,
    ) -> Result<()> {
        let name = name.into();

        {
            let registry = self.inner.read();
            if registry.find(&name, NameComparison::CaseInsensitive).is_some() {
                debug!(interface = %name, "Interface name already taken");
                return Err(ObjectError::already_exists(&name));
            }
            if registry.module(module).is_none() {
                return Err(ObjectError::ModuleNotFound(module));
            }
        }

        if let Err(e) = interface.create() {
            error!(interface = %name, module = %module, error = %e, "Interface creation failed");
            return Err(e.into());
        }

        let mut registry = self.inner.write();

        // Another publisher may have claimed the name while `create` ran.
        let conflict = if registry.find(&name, NameComparison::CaseInsensitive).is_some() {
            Some(ObjectError::already_exists(&name))
        } else if registry.module(module).is_none() {
            Some(ObjectError::ModuleNotFound(module))
        } else {
            None
        };
        if let Some(err) = conflict {
            // The same object may already be live under another name.
            let live = registry.holds(&interface);
            drop(registry);
            if live {
                warn!(interface = %name, module = %module, error = %err, "Publish lost a race, interface still published elsewhere");
            } else {
                warn!(interface = %name, module = %module, error = %err, "Publish lost a race, destroying interface");
                interface.destroy();
            }
            return Err(err);
        }

        if let Some(record) = registry.module_mut(module) {
            record
                .table
                .push(InterfaceTableEntry::new(name.clone(), interface, module));
        }

        info!(interface = %name, module = %module, "Interface published");
        Ok(())
    }

    /// Check whether any module publishes an interface called `name`
    pub fn exists(&self, name: &str) -> bool {
        self.lookup_owner(name, NameComparison::CaseInsensitive).is_ok()
    }

    /// Find the module owning `name` and the matching table entry
    ///
    /// Modules are scanned in load order and each table in insertion order;
    /// the first match wins.
    pub fn lookup_owner(
        &self,
        name: &str,
        comparison: NameComparison,
    ) -> Result<(ModuleId, InterfaceTableEntry)> {
        let registry = self.inner.read();
        let entry = registry
            .find(name, comparison)
            .ok_or_else(|| ObjectError::not_found(name))?;

        debug!(interface = %name, owner = %entry.owner(), "Interface owner resolved");
        Ok((entry.owner(), entry.clone()))
    }

    /// Get the interface published under `name`
    pub fn get(&self, name: &str) -> Result<InterfaceHandle> {
        self.lookup_owner(name, NameComparison::CaseInsensitive)
            .map(|(_, entry)| entry.interface().clone())
    }

    /// Get the interface published under `name` as its concrete type
    pub fn get_as<T: Interface>(&self, name: &str) -> Result<Arc<T>> {
        let handle = self.get(name)?;
        downcast_interface::<T>(&handle).ok_or_else(|| ObjectError::TypeMismatch {
            name: name.to_string(),
            expected: std::any::type_name::<T>(),
        })
    }

    /// Destroy `name` on behalf of `requester`, which must own it
    pub fn destroy_by_owner(&self, requester: ModuleId, name: &str) -> Result<()> {
        let (owner, entry) = self.lookup_owner(name, NameComparison::CaseInsensitive)?;

        if owner != requester {
            warn!(interface = %name, requester = %requester, owner = %owner, "Destroy denied");
            return Err(ObjectError::access_denied(entry.name(), requester, owner));
        }

        self.destroy_interface(owner, entry.interface(), true);
        Ok(())
    }

    /// Destroy `name` regardless of who owns it
    ///
    /// Privileged path for the host's forced cleanup.
    pub fn destroy_by_name(&self, name: &str) -> Result<()> {
        let (owner, entry) = self.lookup_owner(name, NameComparison::CaseInsensitive)?;
        self.destroy_interface(owner, entry.interface(), true);
        Ok(())
    }

    /// Remove `interface` from `module`'s table without any checks
    ///
    /// When `notify` is set, `destroy` is called on the object first. Every
    /// entry referring to the same object is removed. Returns how many
    /// entries were removed, which may be zero.
    pub fn destroy_interface(
        &self,
        module: ModuleId,
        interface: &InterfaceHandle,
        notify: bool,
    ) -> usize {
        if notify {
            interface.destroy();
        }

        let mut registry = self.inner.write();
        let removed = registry
            .module_mut(module)
            .map(|record| record.table.remove_interface(interface))
            .unwrap_or(0);

        if removed > 0 {
            info!(module = %module, removed, "Interface destroyed");
        }
        removed
    }

    /// Destroy every interface `module` publishes
    ///
    /// `destroy` is called once per distinct object when the configuration
    /// asks for it. Returns the number of table entries removed.
    pub fn purge_module(&self, module: ModuleId) -> Result<usize> {
        let interfaces = {
            let registry = self.inner.read();
            let record = registry
                .module(module)
                .ok_or(ObjectError::ModuleNotFound(module))?;
            record.table.distinct_interfaces()
        };

        let removed: usize = interfaces
            .iter()
            .map(|interface| {
                self.destroy_interface(module, interface, self.config.notify_on_purge)
            })
            .sum();

        if removed > 0 {
            info!(module = %module, removed, "Module interfaces purged");
        }
        Ok(removed)
    }

    /// Every published interface, in lookup order
    pub fn interfaces(&self) -> Vec<InterfaceInfo> {
        let registry = self.inner.read();
        registry
            .modules
            .iter()
            .flat_map(|record| record.table.iter())
            .map(|entry| registry.interface_info(entry))
            .collect()
    }

    /// Interfaces published by one module, in publication order
    pub fn module_interfaces(&self, module: ModuleId) -> Result<Vec<InterfaceInfo>> {
        let registry = self.inner.read();
        let record = registry
            .module(module)
            .ok_or(ObjectError::ModuleNotFound(module))?;

        Ok(record
            .table
            .iter()
            .map(|entry| registry.interface_info(entry))
            .collect())
    }

    /// Total number of table entries across all modules
    pub fn interface_count(&self) -> usize {
        self.inner
            .read()
            .modules
            .iter()
            .map(|record| record.table.len())
            .sum()
    }
}

impl Default for ObjectManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurie_api::InterfaceError;

    #[derive(Debug)]
    struct TestInterface {
        fail: bool,
    }

    impl Interface for TestInterface {
        fn create(&self) -> std::result::Result<(), InterfaceError> {
            if self.fail {
                return Err(InterfaceError::create("refused"));
            }
            Ok(())
        }

        fn destroy(&self) {}
    }

    fn ok_interface() -> InterfaceHandle {
        Arc::new(TestInterface { fail: false })
    }

    #[test]
    fn test_register_module() {
        let objects = ObjectManager::new();
        let a = objects.register_module("a");
        let b = objects.register_module_with_path("b", "/mods/b.dll");

        assert_ne!(a, b);
        assert_eq!(objects.module_count(), 2);

        let info = objects.module(b).unwrap();
        assert_eq!(info.name, "b");
        assert_eq!(info.image_path, Some(PathBuf::from("/mods/b.dll")));
        assert_eq!(info.state, ModuleState::Loaded);
        assert!(!info.has_callback);
    }

    #[test]
    fn test_publish_and_get() {
        let objects = ObjectManager::new();
        let module = objects.register_module("net");
        let handle = ok_interface();

        objects.publish(module, "Net", Arc::clone(&handle)).unwrap();

        let found = objects.get("net").unwrap();
        assert!(aurie_api::same_interface(&found, &handle));
        assert_eq!(objects.module(module).unwrap().interfaces, vec!["Net"]);
    }

    #[test]
    fn test_publish_to_unknown_module() {
        let objects = ObjectManager::new();
        let result = objects.publish(ModuleId::from_raw(42), "Net", ok_interface());
        assert!(matches!(result, Err(ObjectError::ModuleNotFound(_))));
        assert!(!objects.exists("Net"));
    }

    #[test]
    fn test_failed_create_leaves_no_trace() {
        let objects = ObjectManager::new();
        let module = objects.register_module("net");

        let result = objects.publish(module, "Net", Arc::new(TestInterface { fail: true }));
        assert!(matches!(
            result,
            Err(ObjectError::CreationFailed(InterfaceError::CreateError(_)))
        ));
        assert!(!objects.exists("Net"));
        assert_eq!(objects.interface_count(), 0);
    }

    #[test]
    fn test_get_as_type_mismatch() {
        #[derive(Debug)]
        struct Other;

        impl Interface for Other {
            fn create(&self) -> std::result::Result<(), InterfaceError> {
                Ok(())
            }

            fn destroy(&self) {}
        }

        let objects = ObjectManager::new();
        let module = objects.register_module("net");
        objects.publish(module, "Net", ok_interface()).unwrap();

        assert!(objects.get_as::<TestInterface>("Net").is_ok());
        assert!(matches!(
            objects.get_as::<Other>("Net"),
            Err(ObjectError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_lookups_agree_with_publish_uniqueness() {
        let objects = ObjectManager::new();
        let module = objects.register_module("net");
        objects.publish(module, "Net", ok_interface()).unwrap();

        assert!(objects.exists("NET"));
        assert!(objects.get("NET").is_ok());
        let result = objects.publish(module, "NET", ok_interface());
        assert!(matches!(result, Err(ObjectError::AlreadyExists(_))));

        // Only an explicit exact lookup tells the spellings apart.
        assert!(objects.lookup_owner("NET", NameComparison::Exact).is_err());
        objects.destroy_by_owner(module, "nEt").unwrap();
        assert!(!objects.exists("Net"));
    }

    #[test]
    fn test_interfaces_listing() {
        let objects = ObjectManager::new();
        let a = objects.register_module("a");
        let b = objects.register_module("b");
        objects.publish(b, "Disk", ok_interface()).unwrap();
        objects.publish(a, "Net", ok_interface()).unwrap();

        let names: Vec<String> = objects.interfaces().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["Net", "Disk"]);

        let listed = objects.module_interfaces(b).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].owner_name, "b");
        assert!(listed[0].type_name.ends_with("TestInterface"));
    }
}
