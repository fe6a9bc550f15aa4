//! Packet layer for the TaiSEIA 101 protocol
//!
//! This crate provides the binary codec (request encoding, response and
//! registration decoding), the XOR checksum, the length-prefixed frame
//! assembler used on the serial receive path, and link statistics.
//!
//! # TODO
//!
//! ## 编解码 (codec)
//! - [x] 请求帧编码 (6 字节, XOR 校验)
//! - [x] 通用响应帧解码
//! - [x] 注册响应帧解码 (品牌/型号/服务表)
//! - [x] 校验和检查 (仅报告, 不拒绝)
//! - [ ] multi_byte_type 注册帧: 服务表按多字节类型解析
//! - [ ] fragment_offset 非零时的分片重组
//!
//! ## 帧组装 (framing)
//! - [x] 长度前缀帧组装
//! - [ ] 长度字节损坏后的重新同步

pub mod assembler;
pub mod checksum;
pub mod request;
pub mod response;
pub mod statistics;

pub use assembler::{AssemblerState, FrameAssembler};
pub use checksum::ChecksumCalc;
pub use request::{READ_VALUE, REQUEST_LENGTH, RequestFrame};
pub use response::{
    CommonResponseFrame, DeviceClassInfo, ProtocolVersion, RegisterResponseFrame, ResponseFrame,
    ServiceEntry,
};
pub use statistics::LinkStatistics;
