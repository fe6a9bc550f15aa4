//! Operator commands for TaiSEIA 101 appliances
//!
//! Text commands typed by TCP clients (`poweron`, `fanlevel 3`, raw hex) are
//! parsed into [`ServiceCommand`]s and encoded as request frames.

pub mod command;
pub mod translator;

pub use command::{SERVICE_KEYWORDS, ServiceCommand};
pub use translator::CommandTranslator;
