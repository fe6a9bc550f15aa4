//! Command translator
//!
//! Turns one line of operator text into the bytes written to the serial port.

use crate::command::ServiceCommand;
use bytes::Bytes;
use std::sync::Arc;
use taiseia_core::{DeviceType, ServiceRegistry, TaiseiaResult, to_hex_list};

/// Translator from operator text to request frames
#[derive(Debug, Clone)]
pub struct CommandTranslator {
    registry: Arc<ServiceRegistry>,
}

impl CommandTranslator {
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self { registry }
    }

    /// Parse and encode one command line
    ///
    /// # Errors
    /// `CommandFormat` when the line is not a valid command; nothing should be
    /// written to the port in that case.
    pub fn translate(&self, line: &str) -> TaiseiaResult<Bytes> {
        let command = ServiceCommand::parse(line)?;
        let frame = command.to_frame();
        log::debug!(
            "{} ({}) -> {}",
            command,
            self.describe(&command),
            to_hex_list(&frame)
        );
        Ok(frame)
    }

    /// Registry name of the service a command addresses
    pub fn describe(&self, command: &ServiceCommand) -> &'static str {
        match command {
            ServiceCommand::Register => self.registry.service_name(DeviceType::Register.id(), 0),
            ServiceCommand::Read(service) | ServiceCommand::Write(service, _) => self
                .registry
                .service_name(DeviceType::Dehumidifier.id(), service.id()),
            ServiceCommand::Raw(_) => "raw",
        }
    }
}

impl Default for CommandTranslator {
    fn default() -> Self {
        Self::new(ServiceRegistry::shared())
    }
}
