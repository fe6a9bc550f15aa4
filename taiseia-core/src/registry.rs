//! Service registry
//!
//! Read-only name/id tables for device types, device classes and the
//! per-family services. The registry is built once at start-up and shared
//! (`Arc`) with every component that renders or resolves identifiers; it is
//! never mutated afterwards, so it can be read from any task without locking.

use crate::device::{DeviceClass, DeviceType};
use crate::service::{DehumidifierService, RegisterService};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

static SHARED: Lazy<Arc<ServiceRegistry>> = Lazy::new(|| Arc::new(ServiceRegistry::new()));

/// Bidirectional id/name table
#[derive(Debug, Clone, Default)]
struct NameTable {
    by_id: HashMap<u8, &'static str>,
    by_name: HashMap<String, u8>,
}

impl NameTable {
    fn from_pairs(pairs: impl IntoIterator<Item = (u8, &'static str)>) -> Self {
        let mut table = Self::default();
        for (id, name) in pairs {
            table.by_id.insert(id, name);
            table.by_name.insert(name.to_ascii_lowercase(), id);
        }
        table
    }

    fn name(&self, id: u8) -> &'static str {
        self.by_id.get(&id).copied().unwrap_or("")
    }

    fn id(&self, name: &str) -> Option<u8> {
        self.by_name.get(&name.to_ascii_lowercase()).copied()
    }
}

/// Registry of TaiSEIA 101 identifiers
///
/// Unknown ids resolve to an empty name rather than failing, so decoded
/// frames from unfamiliar devices can still be logged.
#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    device_types: NameTable,
    device_classes: NameTable,
    services: HashMap<u8, NameTable>,
}

impl ServiceRegistry {
    /// Build the registry with every known table
    pub fn new() -> Self {
        let mut services = HashMap::new();
        services.insert(
            DeviceType::Register.id(),
            NameTable::from_pairs(RegisterService::ALL.iter().map(|s| (s.id(), s.name()))),
        );
        services.insert(
            DeviceType::Dehumidifier.id(),
            NameTable::from_pairs(DehumidifierService::ALL.iter().map(|s| (s.id(), s.name()))),
        );

        Self {
            device_types: NameTable::from_pairs(DeviceType::ALL.iter().map(|t| (t.id(), t.name()))),
            device_classes: NameTable::from_pairs(
                DeviceClass::ALL.iter().map(|c| (c.id(), c.name())),
            ),
            services,
        }
    }

    /// Process-wide instance, built on first use
    pub fn shared() -> Arc<ServiceRegistry> {
        SHARED.clone()
    }

    /// Name of a device type id, `""` when unknown
    pub fn device_type_name(&self, type_id: u8) -> &'static str {
        self.device_types.name(type_id)
    }

    /// Device type id by (case-insensitive) name
    pub fn device_type_id(&self, name: &str) -> Option<u8> {
        self.device_types.id(name)
    }

    /// Name of a device class id, `""` when unknown
    pub fn device_class_name(&self, class_id: u8) -> &'static str {
        self.device_classes.name(class_id)
    }

    /// Device class id by (case-insensitive) name
    pub fn device_class_id(&self, name: &str) -> Option<u8> {
        self.device_classes.id(name)
    }

    /// Name of a service within a device family, `""` when either is unknown
    pub fn service_name(&self, type_id: u8, service_id: u8) -> &'static str {
        self.services
            .get(&type_id)
            .map(|table| table.name(service_id))
            .unwrap_or("")
    }

    /// Service id by (case-insensitive) name within a device family
    pub fn service_id(&self, type_id: u8, name: &str) -> Option<u8> {
        self.services.get(&type_id).and_then(|table| table.id(name))
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_type_names() {
        let registry = ServiceRegistry::new();
        assert_eq!(registry.device_type_name(0x04), "Dehumidifier");
        assert_eq!(registry.device_type_name(0x00), "Register");
        assert_eq!(registry.device_type_name(0x42), "");
        assert_eq!(registry.device_type_id("dehumidifier"), Some(0x04));
        assert_eq!(registry.device_type_id("toaster"), None);
    }

    #[test]
    fn test_device_class_names() {
        let registry = ServiceRegistry::new();
        assert_eq!(registry.device_class_name(0), "HomeAppliances");
        assert_eq!(registry.device_class_name(3), "SensorEquipment");
        assert_eq!(registry.device_class_name(9), "");
        assert_eq!(registry.device_class_id("PowerEquipment"), Some(1));
    }

    #[test]
    fn test_service_names_are_scoped_by_family() {
        let registry = ServiceRegistry::new();
        assert_eq!(registry.service_name(0x04, 0x0e), "FanLevelConfig");
        assert_eq!(registry.service_name(0x00, 0x05), "ReadDeviceBrand");
        assert_eq!(registry.service_name(0x04, 0x05), "DryLevelConfig");
        // no table for air conditioners
        assert_eq!(registry.service_name(0x01, 0x00), "");
        assert_eq!(registry.service_name(0x04, 0x20), "");
        assert_eq!(registry.service_id(0x04, "powercontrol"), Some(0x00));
        assert_eq!(registry.service_id(0x04, "SAAControlSound"), Some(0x18));
    }

    #[test]
    fn test_shared_instance_is_reused() {
        let a = ServiceRegistry::shared();
        let b = ServiceRegistry::shared();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
