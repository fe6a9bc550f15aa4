//! Serial to TCP command bridge for TaiSEIA 101 appliances
//!
//! Operator clients connect over TCP and send text commands. The bridge
//! translates them into request frames for the appliance on the serial
//! port and logs every frame the appliance sends back.
//!
//! # TODO
//!
//! ## 桥接 (bridge)
//! - [x] 串口写任务 (命令队列, 单写者)
//! - [x] 串口读任务 (帧组装, 解码, 观察者)
//! - [x] TCP 客户端管理 (keepalive, exit, 超时)
//! - [x] CancellationToken 关闭顺序
//! - [ ] 将解码后的帧回传给 TCP 客户端
//! - [ ] 命令队列上限

pub mod bridge;
pub mod config;
pub mod link;
pub mod listener;
pub mod queue;
pub mod reader;
pub mod writer;

pub use bridge::{Bridge, open_serial};
pub use config::{BridgeConfig, DEFAULT_LOCAL_PORT};
pub use link::LinkState;
pub use listener::{ClientHandler, ConnectionManager, EXIT_COMMAND, bind_listener};
pub use queue::{CommandReceiver, CommandSender, command_queue};
pub use reader::{FrameObserver, LogObserver, SerialReader};
pub use writer::SerialWriter;
