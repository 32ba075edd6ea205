//! 学生 HTTP 处理器

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};

use super::{
    model::{Student, StudentPayload},
    service::StudentService,
};
use crate::core::error::ApiError;

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    pub student_service: StudentService,
}

/// 学生资源路由（含健康检查）
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/students", get(list_students).post(create_student))
        .route(
            "/api/students/:id",
            get(get_student).put(update_student).delete(delete_student),
        )
}

/// 健康检查，不依赖记录存储，进程存活即成功
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "student-management-backend"
    }))
}

/// 获取全部学生
pub async fn list_students(
    State(state): State<AppState>,
) -> Result<Json<Vec<Student>>, ApiError> {
    let students = state.student_service.list().await?;
    Ok(Json(students))
}

/// 获取特定学生
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Student>, ApiError> {
    let student = state.student_service.get(id).await?;
    Ok(Json(student))
}

/// 创建学生
pub async fn create_student(
    State(state): State<AppState>,
    Json(payload): Json<StudentPayload>,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    let valid = payload.into_valid()?;
    let student = state.student_service.create(valid).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

/// 更新学生
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<StudentPayload>,
) -> Result<Json<Student>, ApiError> {
    let valid = payload.into_valid()?;
    let student = state.student_service.update(id, valid).await?;
    Ok(Json(student))
}

/// 删除学生
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    state.student_service.delete(id).await?;
    Ok(Json(json!({ "message": "Student deleted successfully" })))
}
