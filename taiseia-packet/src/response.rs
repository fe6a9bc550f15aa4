//! Response frames (appliance → host)
//!
//! Byte 0 of every response declares the total frame length and byte 1 the
//! device type. Registration responses (`type_id == Register`) carry the
//! appliance identity and its service table; everything else is a common
//! response addressed to a single service.

use crate::checksum::ChecksumCalc;
use bytes::Bytes;
use serde::Serialize;
use serde_json::{Value, json};
use taiseia_core::device::DeviceClass;
use taiseia_core::service::{SERVICE_ID_MASK, WRITE_FLAG};
use taiseia_core::{
    DehumidifierService, DeviceType, ServiceRegistry, TaiseiaError, TaiseiaResult,
    parse_hex_list, to_hex_list,
};

/// Offset of the brand string in a registration response
const BRAND_OFFSET: usize = 8;

/// Smallest well-formed common response: length, type, service, checksum
const MIN_COMMON_LENGTH: usize = 4;

/// Size of one entry in the registration service table
const SERVICE_ENTRY_LENGTH: usize = 3;

/// Decoded response frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseFrame {
    /// Reply or event for a single service
    Common(CommonResponseFrame),
    /// Appliance identity and service table
    Register(RegisterResponseFrame),
}

impl ResponseFrame {
    /// Decode a complete frame
    ///
    /// # Errors
    /// * `Length` if the declared length (byte 0) differs from the byte count
    /// * `Field` if the frame is too short for its type or a registration
    ///   string is malformed
    pub fn decode(data: &[u8]) -> TaiseiaResult<Self> {
        let declared = data.first().copied().map(usize::from).unwrap_or(0);
        if data.is_empty() || declared != data.len() {
            return Err(TaiseiaError::Length {
                declared,
                actual: data.len(),
            });
        }
        if data.len() < 2 {
            return Err(TaiseiaError::Field("frame carries no type id".to_string()));
        }

        let type_id = data[1];
        log::debug!("decoding response frame, type_id: 0x{:02x}", type_id);

        if type_id == DeviceType::Register.id() {
            RegisterResponseFrame::decode(data).map(ResponseFrame::Register)
        } else {
            CommonResponseFrame::decode(data).map(ResponseFrame::Common)
        }
    }

    /// Decode a frame given as a comma-separated hex list
    ///
    /// # Errors
    /// `Format` if any token is not a hex byte, otherwise as [`decode`](Self::decode)
    pub fn from_hex(hex: &str) -> TaiseiaResult<Self> {
        let data = parse_hex_list(hex)?;
        Self::decode(&data)
    }

    /// Raw frame bytes
    pub fn raw(&self) -> &Bytes {
        match self {
            ResponseFrame::Common(frame) => &frame.raw,
            ResponseFrame::Register(frame) => &frame.raw,
        }
    }

    /// Device type id (byte 1)
    pub fn type_id(&self) -> u8 {
        self.raw()[1]
    }

    /// Declared frame length (byte 0)
    pub fn length(&self) -> u8 {
        self.raw()[0]
    }

    /// Checksum byte carried by the frame
    pub fn checksum(&self) -> u8 {
        self.raw()[self.raw().len() - 1]
    }

    /// Whether the carried checksum matches the XOR of the preceding bytes
    ///
    /// Decoding never rejects a frame on mismatch; callers decide.
    pub fn checksum_valid(&self) -> bool {
        let raw = self.raw();
        ChecksumCalc::of(&raw[..raw.len() - 1]) == self.checksum()
    }

    /// Structured rendering with names resolved through the registry
    pub fn describe(&self, registry: &ServiceRegistry) -> Value {
        match self {
            ResponseFrame::Common(frame) => frame.describe(registry),
            ResponseFrame::Register(frame) => frame.describe(registry),
        }
    }
}

/// Response addressed to a single service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonResponseFrame {
    raw: Bytes,
    service_id: u8,
}

impl CommonResponseFrame {
    fn decode(data: &[u8]) -> TaiseiaResult<Self> {
        if data.len() < MIN_COMMON_LENGTH {
            return Err(TaiseiaError::Field(format!(
                "response of {} bytes has no room for a service id",
                data.len()
            )));
        }

        Ok(Self {
            raw: Bytes::copy_from_slice(data),
            service_id: data[2] & SERVICE_ID_MASK,
        })
    }

    /// Device type id
    pub fn type_id(&self) -> u8 {
        self.raw[1]
    }

    /// 7-bit service id
    pub fn service_id(&self) -> u8 {
        self.service_id
    }

    /// Bytes between the header and the checksum
    pub fn payload(&self) -> &[u8] {
        &self.raw[3..self.raw.len() - 1]
    }

    /// Big-endian service value, when the payload is exactly two bytes
    pub fn value(&self) -> Option<u16> {
        match self.payload() {
            [high, low] => Some(u16::from_be_bytes([*high, *low])),
            _ => None,
        }
    }

    /// Checksum byte
    pub fn checksum(&self) -> u8 {
        self.raw[self.raw.len() - 1]
    }

    fn describe(&self, registry: &ServiceRegistry) -> Value {
        let mut obj = json!({
            "length": self.raw[0],
            "type": {
                "id": self.type_id(),
                "name": registry.device_type_name(self.type_id()),
            },
            "service_id": self.service_id,
            "service_name": registry.service_name(self.type_id(), self.service_id),
            "data_hex": to_hex_list(self.payload()),
        });

        if let Some(value) = self.value() {
            obj["value"] = json!(value);
            let described = (self.type_id() == DeviceType::Dehumidifier.id())
                .then(|| DehumidifierService::from_id(self.service_id))
                .flatten()
                .and_then(|service| service.describe_value(value));
            if let Some(name) = described {
                obj["value_name"] = json!(name);
            }
        }
        obj
    }
}

/// Device class field of a registration response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceClassInfo {
    pub id: u8,
    pub multi_byte_type: bool,
}

/// Protocol version field of a registration response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProtocolVersion {
    pub major: u8,
    pub minor: u8,
}

/// One entry of the registration service table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceEntry {
    pub writable: bool,
    pub service_id: u8,
    pub high_byte: u8,
    pub low_byte: u8,
}

impl ServiceEntry {
    fn from_pdu(pdu: &[u8]) -> Self {
        Self {
            writable: pdu[0] & WRITE_FLAG != 0,
            service_id: pdu[0] & SERVICE_ID_MASK,
            high_byte: pdu[1],
            low_byte: pdu[2],
        }
    }

    /// Current value reported for the service
    pub fn value(&self) -> u16 {
        u16::from_be_bytes([self.high_byte, self.low_byte])
    }

    /// The entry as it appeared on the wire
    pub fn pdu(&self) -> [u8; 3] {
        let flag = if self.writable { WRITE_FLAG } else { 0 };
        [self.service_id | flag, self.high_byte, self.low_byte]
    }
}

/// Registration response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterResponseFrame {
    raw: Bytes,
    device_class: DeviceClassInfo,
    protocol: ProtocolVersion,
    fragment_offset: u8,
    device_type_id: u16,
    brand: String,
    model: String,
    services: Vec<ServiceEntry>,
}

impl RegisterResponseFrame {
    fn decode(data: &[u8]) -> TaiseiaResult<Self> {
        if data.len() <= BRAND_OFFSET {
            return Err(TaiseiaError::Field(format!(
                "registration frame of {} bytes ends before the brand field",
                data.len()
            )));
        }
        // The checksum byte never terminates a string.
        let body = &data[..data.len() - 1];

        let (class_id, multi_byte_type) = DeviceClass::split_class_byte(data[2]);
        let (brand, model_start) = read_nul_string(body, BRAND_OFFSET, "brand")?;
        let (model, mut pos) = read_nul_string(body, model_start, "model")?;

        let mut services = Vec::new();
        while pos + SERVICE_ENTRY_LENGTH < data.len() {
            services.push(ServiceEntry::from_pdu(&data[pos..pos + SERVICE_ENTRY_LENGTH]));
            pos += SERVICE_ENTRY_LENGTH;
        }

        Ok(Self {
            raw: Bytes::copy_from_slice(data),
            device_class: DeviceClassInfo {
                id: class_id,
                multi_byte_type,
            },
            protocol: ProtocolVersion {
                major: data[3],
                minor: data[4],
            },
            fragment_offset: data[5],
            device_type_id: u16::from_be_bytes([data[6], data[7]]),
            brand,
            model,
            services,
        })
    }

    pub fn device_class(&self) -> DeviceClassInfo {
        self.device_class
    }

    pub fn protocol(&self) -> ProtocolVersion {
        self.protocol
    }

    pub fn fragment_offset(&self) -> u8 {
        self.fragment_offset
    }

    /// Device type reported by the appliance (two bytes, big-endian)
    pub fn device_type_id(&self) -> u16 {
        self.device_type_id
    }

    /// Reported device type, when it is a known single-byte id
    pub fn device_type(&self) -> Option<DeviceType> {
        u8::try_from(self.device_type_id)
            .ok()
            .and_then(DeviceType::from_id)
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn services(&self) -> &[ServiceEntry] {
        &self.services
    }

    fn describe(&self, registry: &ServiceRegistry) -> Value {
        let type_id = u8::try_from(self.device_type_id).ok();
        let type_name = type_id.map(|id| registry.device_type_name(id)).unwrap_or("");
        let services: Vec<Value> = self
            .services
            .iter()
            .map(|entry| {
                json!({
                    "writable": entry.writable,
                    "service_id": entry.service_id,
                    "service_name": type_id
                        .map(|id| registry.service_name(id, entry.service_id))
                        .unwrap_or(""),
                    "high_byte": entry.high_byte,
                    "low_byte": entry.low_byte,
                    "pdu_hex": to_hex_list(&entry.pdu()),
                })
            })
            .collect();

        json!({
            "device_class": {
                "multi_byte_type": self.device_class.multi_byte_type,
                "id": self.device_class.id,
                "name": registry.device_class_name(self.device_class.id),
            },
            "protocol": self.protocol,
            "fragment_offset": self.fragment_offset,
            "type": {
                "id": self.device_type_id,
                "name": type_name,
            },
            "brand": self.brand,
            "model": self.model,
            "services": services,
        })
    }
}

/// Read a NUL-terminated UTF-8 string starting at `start`
///
/// Returns the string and the offset just past its terminator.
fn read_nul_string(body: &[u8], start: usize, field: &str) -> TaiseiaResult<(String, usize)> {
    let rest = body.get(start..).unwrap_or_default();
    let end = rest
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| TaiseiaError::Field(format!("{} is not NUL-terminated", field)))?;
    let text = std::str::from_utf8(&rest[..end])
        .map_err(|e| TaiseiaError::Field(format!("{} is not valid UTF-8: {}", field, e)))?;
    Ok((text.to_string(), start + end + 1))
}
