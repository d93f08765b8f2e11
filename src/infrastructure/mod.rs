//! Infrastructure Layer - 基础设施层
//!
//! - Adapters: 合成器客户端、播放、上传、记录
//! - HTTP: serve 模式的 API 服务器

pub mod adapters;
pub mod http;
