//! Request frames (host → appliance)

use crate::checksum::ChecksumCalc;
use bytes::Bytes;
use std::fmt;
use taiseia_core::service::{SERVICE_ID_MASK, WRITE_FLAG};
use taiseia_core::{DehumidifierService, DeviceType, RegisterService, to_hex_list};

/// Length of every non-register request frame
pub const REQUEST_LENGTH: u8 = 6;

/// Value carried by read requests
pub const READ_VALUE: u16 = 0xffff;

/// Request frame
///
/// Wire layout: `[6, type_id, service_id | write flag, value_hi, value_lo, xor]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestFrame {
    type_id: u8,
    is_read: bool,
    service_id: u8,
    value: u16,
}

impl RequestFrame {
    /// Create a new request frame
    pub fn new(type_id: u8, is_read: bool, service_id: u8, value: u16) -> Self {
        Self {
            type_id,
            is_read,
            service_id: service_id & SERVICE_ID_MASK,
            value,
        }
    }

    /// Read request for a service of the given family
    pub fn read(device_type: DeviceType, service_id: u8) -> Self {
        Self::new(device_type.id(), true, service_id, READ_VALUE)
    }

    /// Write request for a service of the given family
    pub fn write(device_type: DeviceType, service_id: u8, value: u16) -> Self {
        Self::new(device_type.id(), false, service_id, value)
    }

    /// Registration request, asks the appliance to describe itself
    pub fn register() -> Self {
        Self::read(DeviceType::Register, RegisterService::Register.id())
    }

    /// Read a dehumidifier service
    pub fn dehumidifier_read(service: DehumidifierService) -> Self {
        Self::read(DeviceType::Dehumidifier, service.id())
    }

    /// Write a dehumidifier service
    pub fn dehumidifier_write(service: DehumidifierService, value: u16) -> Self {
        Self::write(DeviceType::Dehumidifier, service.id(), value)
    }

    /// Encode to wire bytes
    pub fn encode(&self) -> [u8; 6] {
        let service_byte = if self.is_read {
            self.service_id & SERVICE_ID_MASK
        } else {
            self.service_id | WRITE_FLAG
        };
        let [high, low] = self.value.to_be_bytes();

        let mut pdu = [REQUEST_LENGTH, self.type_id, service_byte, high, low, 0];
        pdu[5] = ChecksumCalc::of(&pdu[..5]);
        pdu
    }

    /// Encode into a shareable buffer
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.encode())
    }

    /// Device type id
    pub fn type_id(&self) -> u8 {
        self.type_id
    }

    /// Whether this is a read request
    pub fn is_read(&self) -> bool {
        self.is_read
    }

    /// 7-bit service id
    pub fn service_id(&self) -> u8 {
        self.service_id
    }

    /// 16-bit value
    pub fn value(&self) -> u16 {
        self.value
    }
}

impl fmt::Display for RequestFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_hex_list(&self.encode()))
    }
}
