//! taiseia - Rust implementation of the TaiSEIA 101 appliance protocol
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `taiseia-core`: Identifiers, service registry, error handling
//! - `taiseia-transport`: Serial port and TCP client transports
//! - `taiseia-packet`: Frame codec, checksum, frame assembler
//! - `taiseia-command`: Operator text commands
//! - `taiseia-bridge`: Serial to TCP command bridge
//!
//! # Implementation Status
//!
//! ## ✅ 已完成
//! - 设备类型、服务 ID 与名称表
//! - 请求帧编码、响应帧与注册帧解码
//! - 文本命令解析 (register / power / 关键字 / 原始十六进制)
//! - 串口读写任务与 TCP 命令监听
//!
//! ## 📋 待实现
//! - 除湿机以外的设备服务表
//! - 解码结果回传给 TCP 客户端
//!
//! # Usage
//!
//! ```
//! use taiseia::packet::ResponseFrame;
//!
//! let frame = ResponseFrame::from_hex("06,04,00,00,01,03").unwrap();
//! assert!(frame.checksum_valid());
//! ```

pub use taiseia_core::{DeviceType, ServiceRegistry, TaiseiaError, TaiseiaResult};
pub use taiseia_core::{DehumidifierService, RegisterService};

// Re-export packet codec
pub mod packet {
    pub use taiseia_packet::*;
}

// Re-export transports
pub mod transport {
    pub use taiseia_transport::*;
}

// Re-export operator commands
pub mod command {
    pub use taiseia_command::*;
}

// Re-export bridge
pub mod bridge {
    pub use taiseia_bridge::*;
}
