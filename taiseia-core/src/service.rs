//! Service identifiers and value vocabularies
//!
//! Service ids are 7 bits wide and only meaningful together with a device
//! type. Bit 7 of the service byte is the write flag in requests and the
//! writable flag in registration service entries.

/// Write flag carried in bit 7 of a request's service byte
pub const WRITE_FLAG: u8 = 0x80;

/// Mask selecting the 7-bit service id
pub const SERVICE_ID_MASK: u8 = 0x7f;

id_enum! {
    /// Services of the `Register` device type
    RegisterService: u8 {
        Register = 0x00 => "Register",
        ReadDeviceClassId = 0x01 => "ReadDeviceClassID",
        ReadDeviceProtocolVersion = 0x02 => "ReadDeviceProtocolVer",
        Reserved = 0x03 => "Reserved",
        ReadDeviceTypeId = 0x04 => "ReadDeviceTypeID",
        ReadDeviceBrand = 0x05 => "ReadDeviceBrand",
        ReadDeviceModel = 0x06 => "ReadDeviceModel",
        ReadDeviceServices = 0x07 => "ReadDeviceServices",
        ReadDeviceServicesStatus = 0x08 => "ReadDeviceServicesStatus",
    }
}

id_enum! {
    /// Services of the `Dehumidifier` device type
    DehumidifierService: u8 {
        PowerControl = 0x00 => "PowerControl",
        OpModeConfig = 0x01 => "OpModeConfig",
        OpTimeHrConfig = 0x02 => "OpTimeHrConfig",
        RelativeHumidityConfig = 0x03 => "RelativeHumidityConfig",
        DehumidifierLevelConfig = 0x04 => "DehumidifierLevelConfig",
        DryLevelConfig = 0x05 => "DryLevelConfig",
        IndoorTempDisplay = 0x06 => "IndoorTempDisplay",
        IndoorHumidityDisplay = 0x07 => "IndoorHumidityDisplay",
        AutoSwingOnOff = 0x08 => "AutoSwingOnOff",
        SwingLevelConfig = 0x09 => "SwingLevelConfig",
        WaterFullDisplay = 0x0a => "WaterFullDisplay",
        CleanNotify = 0x0b => "CleanNotify",
        LightSceneConfig = 0x0c => "LightSceneConfig",
        AirCleanModeConfig = 0x0d => "AirCleanModeConfig",
        FanLevelConfig = 0x0e => "FanLevelConfig",
        SideFan = 0x0f => "SideFan",
        SoundConfig = 0x10 => "SoundConfig",
        DefrostingDisplay = 0x11 => "DefrostingDisplay",
        ErrTextDisplay = 0x12 => "ErrTextDisplay",
        Mildew = 0x13 => "Mildew",
        HumidityHighNotify = 0x14 => "HumidityHighNotify",
        HumidityHighValueConfig = 0x15 => "HumidityHighValueConfig",
        DashboardLock = 0x16 => "DashboardLock",
        ControlSuspend = 0x17 => "ControlSuspend",
        SaaControlSound = 0x18 => "SAAControlSound",
        OpCurrent = 0x19 => "OpCurrent",
        OpVoltage = 0x1a => "OpVoltage",
        OpWattFactor = 0x1b => "OpWattFactor",
        RealTimeWatt = 0x1c => "RealTimeWatt",
        TotalWatt = 0x1d => "TotalWatt",
        EngMode = 0x50 => "EngMode",
        Reserved = 0x7f => "Reserved",
    }
}

id_enum! {
    /// Values of `PowerControl`
    PowerState: u16 {
        Off = 0 => "Off",
        On = 1 => "On",
    }
}

id_enum! {
    /// Values of `OpModeConfig`
    OpMode: u16 {
        AutoDehumidify = 0 => "AutoDehumidify",
        ConfigDehumidify = 1 => "ConfigDehumidify",
        ContinueDehumidify = 2 => "ContinueDehumidify",
        DryClothes = 3 => "DryClothes",
        AirClean = 4 => "AirClean",
        Mildew = 5 => "Mildew",
        Fan = 6 => "Fan",
        HumanComfort = 7 => "HumanComfort",
        LowHumidityDry = 8 => "LowHumidityDry",
    }
}

id_enum! {
    /// Values of `SAAControlSound` (0 enables the buzzer)
    SaaSound: u16 {
        On = 0 => "On",
        Off = 1 => "Off",
    }
}

impl DehumidifierService {
    /// Human-readable rendering of a value read from or written to this service
    ///
    /// Only services with an enumerated vocabulary are rendered; everything
    /// else is left to the caller.
    pub fn describe_value(self, value: u16) -> Option<&'static str> {
        match self {
            DehumidifierService::PowerControl => PowerState::from_id(value).map(PowerState::name),
            DehumidifierService::OpModeConfig => OpMode::from_id(value).map(OpMode::name),
            DehumidifierService::SaaControlSound => SaaSound::from_id(value).map(SaaSound::name),
            _ => None,
        }
    }
}
