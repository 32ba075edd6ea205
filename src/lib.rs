//! # 学生管理系统
//!
//! 一个三层 Web 应用的教学示例，包括：
//! - 基于 Axum 的 REST API 服务（students 资源的 CRUD 操作）
//! - 基于 PostgreSQL 的记录存储（sqlx 连接池，邮箱唯一索引）
//! - 基于终端的交互式客户端（console_ui 二进制）

pub mod app;
pub mod core;
pub mod infrastructure;
