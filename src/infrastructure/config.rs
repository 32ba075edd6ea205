//! 服务配置
//!
//! 全部配置来自环境变量（由编排层注入），缺省值与本地开发环境一致。

use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

/// 服务配置结构
#[derive(Debug, Clone)]
pub struct Config {
    pub db_host: String,
    pub db_name: String,
    pub db_user: String,
    pub db_password: String,
    pub db_port: u16,
    pub server_port: u16,
}

impl Config {
    /// 从环境变量加载配置
    pub fn load() -> Self {
        Self {
            db_host: load_var("DB_HOST", "localhost"),
            db_name: load_var("DB_NAME", "student_db"),
            db_user: load_var("DB_USER", "postgres"),
            db_password: load_var("DB_PASSWORD", "password"),
            db_port: load_var("DB_PORT", "5432"),
            server_port: load_var("SERVER_PORT", "5000"),
        }
    }

    /// 拼接 PostgreSQL 连接串
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.db_user, self.db_password, self.db_host, self.db_port, self.db_name
        )
    }

    /// 可安全写入日志的连接串，口令以 *** 掩盖
    pub fn masked_database_url(&self) -> String {
        format!(
            "postgres://{}:***@{}:{}/{}",
            self.db_user, self.db_host, self.db_port, self.db_name
        )
    }
}

fn load_var<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{} not set, using default: {}", key, default);
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {} value: {}", key, e);
        })
        .expect("Environment misconfigured!")
}
