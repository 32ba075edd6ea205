//! 学生数据模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::error::ApiError;

/// 学生记录（对应 students 表的一行）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Student {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub course: String,
    pub created_at: DateTime<Utc>,
}

/// 创建/更新学生请求（POST 和 PUT 共用同一负载形状）
///
/// 字段全部为 Option：缺失字段由 [`StudentPayload::into_valid`] 报告为
/// `Missing required field: <name>`，取值校验由 validator 完成。
#[derive(Debug, Deserialize, Validate)]
pub struct StudentPayload {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,

    #[validate(length(min = 1, message = "Email must not be empty"))]
    pub email: Option<String>,

    #[validate(range(min = 1, max = 150, message = "Age must be between 1 and 150"))]
    pub age: Option<i32>,

    #[validate(length(min = 1, message = "Course must not be empty"))]
    pub course: Option<String>,
}

/// 校验通过的学生字段，可直接用于 SQL 绑定
#[derive(Debug)]
pub struct ValidStudent {
    pub name: String,
    pub email: String,
    pub age: i32,
    pub course: String,
}

impl StudentPayload {
    /// 先逐项检查必填字段，再执行取值校验
    pub fn into_valid(self) -> Result<ValidStudent, ApiError> {
        for (field, missing) in [
            ("name", self.name.is_none()),
            ("email", self.email.is_none()),
            ("age", self.age.is_none()),
            ("course", self.course.is_none()),
        ] {
            if missing {
                return Err(ApiError::Validation(format!(
                    "Missing required field: {}",
                    field
                )));
            }
        }

        self.validate()?;

        // 必填检查已通过，unwrap 不会失败
        Ok(ValidStudent {
            name: self.name.unwrap(),
            email: self.email.unwrap(),
            age: self.age.unwrap(),
            course: self.course.unwrap(),
        })
    }
}
