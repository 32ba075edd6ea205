//! 学生业务服务
//!
//! 所有 SQL 语句集中在这里，处理器保持轻薄。每个写操作都是
//! 单条原子语句，跨请求的并发控制完全交给数据库。

use sqlx::postgres::PgPool;
use tracing::info;

use super::model::{Student, ValidStudent};
use crate::core::error::ApiError;

#[derive(Clone)]
pub struct StudentService {
    pool: PgPool,
}

impl StudentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 按插入顺序返回全部学生，空表返回空列表
    pub async fn list(&self) -> Result<Vec<Student>, ApiError> {
        let students = sqlx::query_as::<_, Student>("SELECT * FROM students ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(students)
    }

    /// 根据 ID 获取学生
    pub async fn get(&self, id: i32) -> Result<Student, ApiError> {
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Student not found".to_string()))
    }

    /// 创建学生，id 和 created_at 由数据库分配
    pub async fn create(&self, student: ValidStudent) -> Result<Student, ApiError> {
        // 邮箱唯一性交给唯一索引，冲突由 From<sqlx::Error> 映射为 409，
        // 并发插入相同邮箱时只有一个写者成功
        let created = sqlx::query_as::<_, Student>(
            "INSERT INTO students (name, email, age, course) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&student.name)
        .bind(&student.email)
        .bind(student.age)
        .bind(&student.course)
        .fetch_one(&self.pool)
        .await?;

        info!("Created student: {} ({})", created.name, created.id);

        Ok(created)
    }

    /// 整体替换四个可变字段
    pub async fn update(&self, id: i32, student: ValidStudent) -> Result<Student, ApiError> {
        // 先区分 404 与 409：id 不存在优先于邮箱冲突
        sqlx::query("SELECT id FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("Student not found".to_string()))?;

        let email_conflict = sqlx::query("SELECT id FROM students WHERE email = $1 AND id != $2")
            .bind(&student.email)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        if email_conflict.is_some() {
            return Err(ApiError::Conflict("Email already exists".to_string()));
        }

        // 单条 UPDATE 原子替换；并发下的邮箱竞争仍由唯一索引兜底
        let updated = sqlx::query_as::<_, Student>(
            "UPDATE students SET name = $1, email = $2, age = $3, course = $4 WHERE id = $5 RETURNING *",
        )
        .bind(&student.name)
        .bind(&student.email)
        .bind(student.age)
        .bind(&student.course)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        info!("Updated student: {} ({})", updated.name, updated.id);

        Ok(updated)
    }

    /// 硬删除，无墓碑记录
    pub async fn delete(&self, id: i32) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Student not found".to_string()));
        }

        info!("Deleted student: {}", id);

        Ok(())
    }
}
