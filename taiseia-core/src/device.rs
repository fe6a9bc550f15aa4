//! Device type and device class identifiers

id_enum! {
    /// Protocol family of the addressed appliance (byte 1 of every frame)
    DeviceType: u8 {
        Register = 0x00 => "Register",
        AirConditioner = 0x01 => "AirConditioner",
        Refrigerator = 0x02 => "Refrigerator",
        WashingMachine = 0x03 => "WashingMachine",
        Dehumidifier = 0x04 => "Dehumidifier",
        Television = 0x05 => "Television",
        DryingMachine = 0x06 => "DryingMachine",
        HeatPumpWaterHeater = 0x07 => "HeatPumpWaterHeater",
        AirCleaner = 0x08 => "AirCleaner",
        ElectronicPot = 0x09 => "ElectronicPot",
        DrinkingMachine = 0x0a => "DrinkingMachine",
        InductionCooker = 0x0b => "InductionCooker",
        Dishwasher = 0x0c => "Dishwasher",
        MicrowaveOven = 0x0d => "MicrowaveOven",
        FullHeatSwitch = 0x0e => "FullHeatSwitch",
        Fan = 0x0f => "Fan",
        GasWaterHeater = 0x10 => "GasWaterHeater",
        Lamp = 0x11 => "Lamp",
        SmartMeterGateway = 0xe0 => "SmartMeterGateway",
        GeneralDevice = 0xf0 => "GeneralDevice",
        Error = 0xff => "Error",
    }
}

id_enum! {
    /// Device class reported in a registration frame
    DeviceClass: u8 {
        HomeAppliances = 0x00 => "HomeAppliances",
        PowerEquipment = 0x01 => "PowerEquipment",
        EnergyStorageEquipment = 0x02 => "EnergyStorageEquipment",
        SensorEquipment = 0x03 => "SensorEquipment",
    }
}

/// Bit 7 of the registration class byte
pub const MULTI_BYTE_TYPE_FLAG: u8 = 0x80;

/// Low nibble of the registration class byte
pub const DEVICE_CLASS_MASK: u8 = 0x0f;

impl DeviceClass {
    /// Split a registration class byte into `(class id, multi-byte flag)`
    pub fn split_class_byte(byte: u8) -> (u8, bool) {
        (byte & DEVICE_CLASS_MASK, byte & MULTI_BYTE_TYPE_FLAG != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_type_lookup() {
        assert_eq!(DeviceType::from_id(0x04), Some(DeviceType::Dehumidifier));
        assert_eq!(DeviceType::from_id(0xe0), Some(DeviceType::SmartMeterGateway));
        assert_eq!(DeviceType::from_id(0x12), None);
        assert_eq!(DeviceType::Dehumidifier.id(), 0x04);
        assert_eq!(DeviceType::Error.to_string(), "Error");
    }

    #[test]
    fn test_split_class_byte() {
        assert_eq!(DeviceClass::split_class_byte(0x00), (0, false));
        assert_eq!(DeviceClass::split_class_byte(0x83), (3, true));
        assert_eq!(DeviceClass::split_class_byte(0x71), (1, false));
    }

    #[test]
    fn test_all_is_id_ordered() {
        let ids: Vec<u8> = DeviceType::ALL.iter().map(|t| t.id()).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }
}
