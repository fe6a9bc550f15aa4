//! Operator command grammar
//!
//! ```text
//! register                      registration request
//! power | poweron | poweroff    read / write 1 / write 0 of PowerControl
//! <keyword>                     read the keyword's service
//! <keyword>[ ]<integer>         write the integer to the keyword's service
//! 06,04,80,00,01,83             anything else: raw hex bytes, sent verbatim
//! ```
//!
//! Input is trimmed and case-insensitive. Integers are not checked against
//! the service's legal values; the appliance rejects what it does not accept.

use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use taiseia_core::{DehumidifierService, PowerState, TaiseiaError, TaiseiaResult, parse_hex_list};
use taiseia_packet::RequestFrame;

/// `<word>[ ]<digits>`
static COMMAND_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z]+)\s*([0-9]*)$").expect("command pattern is a valid literal")
});

/// Keywords addressing a dehumidifier service
pub const SERVICE_KEYWORDS: &[(&str, DehumidifierService)] = &[
    ("opmode", DehumidifierService::OpModeConfig),
    ("fanlevel", DehumidifierService::FanLevelConfig),
    ("swinglevel", DehumidifierService::SwingLevelConfig),
    ("timehr", DehumidifierService::OpTimeHrConfig),
    ("dehumidify", DehumidifierService::DehumidifierLevelConfig),
    ("airclean", DehumidifierService::AirCleanModeConfig),
    ("sound", DehumidifierService::SaaControlSound),
];

/// Parsed operator command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCommand {
    /// Ask the appliance to describe itself
    Register,
    /// Read a dehumidifier service
    Read(DehumidifierService),
    /// Write a value to a dehumidifier service
    Write(DehumidifierService, u16),
    /// Bytes sent to the appliance as given
    Raw(Vec<u8>),
}

impl ServiceCommand {
    /// Parse one line of operator input
    ///
    /// # Errors
    /// `CommandFormat` when the line is neither a known command nor a
    /// comma-separated list of hex bytes.
    pub fn parse(line: &str) -> TaiseiaResult<Self> {
        let line = line.trim().to_ascii_lowercase();
        if line.is_empty() {
            return Err(TaiseiaError::CommandFormat("empty command".to_string()));
        }

        if let Some(caps) = COMMAND_PATTERN.captures(&line) {
            if let Some(command) = Self::from_keyword(&caps[1], &caps[2])? {
                return Ok(command);
            }
        }

        parse_hex_list(&line).map(ServiceCommand::Raw).map_err(|e| {
            TaiseiaError::CommandFormat(format!(
                "'{}' is neither a command nor a hex byte list: {}",
                line, e
            ))
        })
    }

    /// Resolve a keyword with its (possibly empty) digit suffix
    ///
    /// `Ok(None)` means the word is not a keyword and the line should be tried
    /// as raw hex.
    fn from_keyword(keyword: &str, digits: &str) -> TaiseiaResult<Option<Self>> {
        let fixed = match keyword {
            "register" => Some(ServiceCommand::Register),
            "power" => Some(ServiceCommand::Read(DehumidifierService::PowerControl)),
            "poweron" => Some(ServiceCommand::Write(
                DehumidifierService::PowerControl,
                PowerState::On.id(),
            )),
            "poweroff" => Some(ServiceCommand::Write(
                DehumidifierService::PowerControl,
                PowerState::Off.id(),
            )),
            _ => None,
        };
        if let Some(command) = fixed {
            if !digits.is_empty() {
                return Err(TaiseiaError::CommandFormat(format!(
                    "'{}' takes no value, got '{}'",
                    keyword, digits
                )));
            }
            return Ok(Some(command));
        }

        let Some(service) = lookup_keyword(keyword) else {
            return Ok(None);
        };
        if digits.is_empty() {
            return Ok(Some(ServiceCommand::Read(service)));
        }
        let value = digits.parse::<u16>().map_err(|e| {
            TaiseiaError::CommandFormat(format!(
                "value '{}' for '{}' does not fit 16 bits: {}",
                digits, keyword, e
            ))
        })?;
        Ok(Some(ServiceCommand::Write(service, value)))
    }

    /// Wire bytes for this command
    pub fn to_frame(&self) -> Bytes {
        match self {
            ServiceCommand::Register => RequestFrame::register().to_bytes(),
            ServiceCommand::Read(service) => RequestFrame::dehumidifier_read(*service).to_bytes(),
            ServiceCommand::Write(service, value) => {
                RequestFrame::dehumidifier_write(*service, *value).to_bytes()
            }
            ServiceCommand::Raw(bytes) => Bytes::copy_from_slice(bytes),
        }
    }
}

impl fmt::Display for ServiceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceCommand::Register => f.write_str("register"),
            ServiceCommand::Read(service) => write!(f, "read {}", service),
            ServiceCommand::Write(service, value) => write!(f, "write {} = {}", service, value),
            ServiceCommand::Raw(bytes) => write!(f, "raw {} bytes", bytes.len()),
        }
    }
}

fn lookup_keyword(keyword: &str) -> Option<DehumidifierService> {
    SERVICE_KEYWORDS
        .iter()
        .find(|(name, _)| *name == keyword)
        .map(|(_, service)| *service)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register() {
        assert_eq!(ServiceCommand::parse("register").unwrap(), ServiceCommand::Register);
        assert_eq!(ServiceCommand::parse("  REGISTER\r\n").unwrap(), ServiceCommand::Register);
        assert!(ServiceCommand::parse("register1").is_err());
    }

    #[test]
    fn test_power_commands() {
        assert_eq!(
            ServiceCommand::parse("power").unwrap(),
            ServiceCommand::Read(DehumidifierService::PowerControl)
        );
        assert_eq!(
            ServiceCommand::parse("PowerOn").unwrap(),
            ServiceCommand::Write(DehumidifierService::PowerControl, 1)
        );
        assert_eq!(
            ServiceCommand::parse("poweroff").unwrap(),
            ServiceCommand::Write(DehumidifierService::PowerControl, 0)
        );
        assert!(matches!(
            ServiceCommand::parse("power2"),
            Err(TaiseiaError::CommandFormat(_))
        ));
    }

    #[test]
    fn test_keyword_read_and_write() {
        assert_eq!(
            ServiceCommand::parse("fanlevel").unwrap(),
            ServiceCommand::Read(DehumidifierService::FanLevelConfig)
        );
        assert_eq!(
            ServiceCommand::parse("fanlevel3").unwrap(),
            ServiceCommand::Write(DehumidifierService::FanLevelConfig, 3)
        );
        assert_eq!(
            ServiceCommand::parse("opmode 4").unwrap(),
            ServiceCommand::Write(DehumidifierService::OpModeConfig, 4)
        );
        assert_eq!(
            ServiceCommand::parse("sound1").unwrap(),
            ServiceCommand::Write(DehumidifierService::SaaControlSound, 1)
        );
        assert_eq!(
            ServiceCommand::parse("dehumidify").unwrap(),
            ServiceCommand::Read(DehumidifierService::DehumidifierLevelConfig)
        );
        // no domain validation at this layer
        assert_eq!(
            ServiceCommand::parse("timehr 999").unwrap(),
            ServiceCommand::Write(DehumidifierService::OpTimeHrConfig, 999)
        );
    }

    #[test]
    fn test_every_keyword_resolves() {
        for (keyword, service) in SERVICE_KEYWORDS {
            assert_eq!(
                ServiceCommand::parse(keyword).unwrap(),
                ServiceCommand::Read(*service)
            );
        }
    }

    #[test]
    fn test_value_must_fit_sixteen_bits() {
        assert!(ServiceCommand::parse("swinglevel 65535").is_ok());
        assert!(matches!(
            ServiceCommand::parse("swinglevel 65536"),
            Err(TaiseiaError::CommandFormat(_))
        ));
    }

    #[test]
    fn test_command_pattern() {
        let caps = COMMAND_PATTERN.captures("fanlevel 3").unwrap();
        assert_eq!(&caps[1], "fanlevel");
        assert_eq!(&caps[2], "3");
        let caps = COMMAND_PATTERN.captures("power").unwrap();
        assert_eq!(&caps[2], "");
        assert!(COMMAND_PATTERN.captures("06,04").is_none());
    }

    #[test]
    fn test_raw_hex() {
        assert_eq!(
            ServiceCommand::parse("06,04,80,00,01,83").unwrap(),
            ServiceCommand::Raw(vec![0x06, 0x04, 0x80, 0x00, 0x01, 0x83])
        );
        // a lone hex word is not a keyword
        assert_eq!(ServiceCommand::parse("ab").unwrap(), ServiceCommand::Raw(vec![0xab]));
    }

    #[test]
    fn test_malformed() {
        for line in ["zz,zz", "", "   ", "fanlevel3x", "soundx", "06,,04"] {
            assert!(
                matches!(ServiceCommand::parse(line), Err(TaiseiaError::CommandFormat(_))),
                "{:?} should be rejected",
                line
            );
        }
    }

    #[test]
    fn test_to_frame() {
        assert_eq!(
            &ServiceCommand::Write(DehumidifierService::PowerControl, 1).to_frame()[..],
            &[0x06, 0x04, 0x80, 0x00, 0x01, 0x83]
        );
        assert_eq!(
            &ServiceCommand::Register.to_frame()[..],
            &[0x06, 0x00, 0x00, 0xff, 0xff, 0x06]
        );
        assert_eq!(&ServiceCommand::Raw(vec![0x01, 0x02]).to_frame()[..], &[0x01, 0x02]);
    }
}
