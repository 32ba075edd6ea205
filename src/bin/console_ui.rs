//! 学生管理终端客户端
//!
//! 表单驱动的交互式前端，通过 REST API 操作学生记录。
//! 客户端校验与服务端契约一致：姓名/课程非空，邮箱含 @，年龄在 1-150，
//! 校验失败直接提示，不发起网络请求。

use rustyline::{error::ReadlineError, DefaultEditor};
use serde::Serialize;
use thiserror::Error;

use student_mgmt::app::students::model::Student;

/// 客户端错误分类，决定界面上显示哪条提示
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Email already exists")]
    Conflict,
    #[error("Student not found")]
    NotFound,
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Request failed: {0}")]
    Transport(String),
}

/// 通过客户端校验后的提交负载
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StudentInput {
    pub name: String,
    pub email: String,
    pub age: i32,
    pub course: String,
}

/// API 访问抽象，测试中可替换为模拟实现
pub trait StudentApi {
    fn health(&self) -> Result<(), ClientError>;
    fn list(&self) -> Result<Vec<Student>, ClientError>;
    fn create(&self, input: &StudentInput) -> Result<Student, ClientError>;
    fn update(&self, id: i32, input: &StudentInput) -> Result<Student, ClientError>;
    fn delete(&self, id: i32) -> Result<(), ClientError>;
}

/// 基于 ureq 的 HTTP 实现
pub struct HttpApi {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: ureq::Agent::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 将 HTTP 状态映射为客户端错误分类，错误体形如
    /// {error, message, code, timestamp, request_id}
    fn handle_error(err: ureq::Error) -> ClientError {
        match err {
            ureq::Error::Status(code, resp) => {
                let message = resp
                    .into_json::<serde_json::Value>()
                    .ok()
                    .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                    .unwrap_or_default();

                match code {
                    409 => ClientError::Conflict,
                    404 => ClientError::NotFound,
                    400 => ClientError::Validation(message),
                    _ => ClientError::Transport(format!("API error {}: {}", code, message)),
                }
            }
            e => ClientError::Transport(e.to_string()),
        }
    }
}

impl StudentApi for HttpApi {
    fn health(&self) -> Result<(), ClientError> {
        self.agent
            .get(&self.url("/health"))
            .call()
            .map_err(Self::handle_error)?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<Student>, ClientError> {
        self.agent
            .get(&self.url("/api/students"))
            .call()
            .map_err(Self::handle_error)?
            .into_json()
            .map_err(|e| ClientError::Transport(e.to_string()))
    }

    fn create(&self, input: &StudentInput) -> Result<Student, ClientError> {
        self.agent
            .post(&self.url("/api/students"))
            .send_json(input)
            .map_err(Self::handle_error)?
            .into_json()
            .map_err(|e| ClientError::Transport(e.to_string()))
    }

    fn update(&self, id: i32, input: &StudentInput) -> Result<Student, ClientError> {
        self.agent
            .put(&self.url(&format!("/api/students/{}", id)))
            .send_json(input)
            .map_err(Self::handle_error)?
            .into_json()
            .map_err(|e| ClientError::Transport(e.to_string()))
    }

    fn delete(&self, id: i32) -> Result<(), ClientError> {
        self.agent
            .delete(&self.url(&format!("/api/students/{}", id)))
            .call()
            .map_err(Self::handle_error)?;
        Ok(())
    }
}

/// 表单原始输入，未经校验
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentForm {
    pub name: String,
    pub email: String,
    pub age: String,
    pub course: String,
}

impl StudentForm {
    /// 客户端校验；失败返回提示文本，此时不应发起任何网络请求
    pub fn validate(&self) -> Result<StudentInput, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Name must not be empty".to_string());
        }

        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err("Please provide a valid email address".to_string());
        }

        let age: i32 = self
            .age
            .trim()
            .parse()
            .map_err(|_| "Age must be a number".to_string())?;
        if !(1..=150).contains(&age) {
            return Err("Age must be between 1 and 150".to_string());
        }

        let course = self.course.trim();
        if course.is_empty() {
            return Err("Course must not be empty".to_string());
        }

        Ok(StudentInput {
            name: name.to_string(),
            email: email.to_string(),
            age,
            course: course.to_string(),
        })
    }
}

/// 消息种类
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MessageKind {
    Success,
    Error,
}

/// 客户端全部界面状态，集中在一个结构体里传递，不用全局变量
#[derive(Default)]
pub struct UiState {
    pub students: Vec<Student>,
    pub loading: bool,
    pub message: Option<(MessageKind, String)>,
    pub form: StudentForm,
    /// Some(id) 表示编辑模式，None 表示添加模式
    pub editing: Option<i32>,
}

impl UiState {
    /// 拉取最新列表；失败时保留上一次成功获取的列表
    pub fn refresh(&mut self, api: &dyn StudentApi) {
        self.loading = true;
        match api.list() {
            Ok(students) => {
                self.students = students;
            }
            Err(e) => {
                self.message = Some((
                    MessageKind::Error,
                    format!("Failed to fetch students: {}", e),
                ));
            }
        }
        self.loading = false;
    }

    /// 提交表单：添加模式走创建，编辑模式走更新。
    /// 失败时表单内容保持不变，供用户修正后重试。
    pub fn submit(&mut self, api: &dyn StudentApi) {
        let input = match self.form.validate() {
            Ok(input) => input,
            Err(msg) => {
                self.message = Some((MessageKind::Error, msg));
                return;
            }
        };

        let result = match self.editing {
            Some(id) => api.update(id, &input),
            None => api.create(&input),
        };

        match result {
            Ok(_) => {
                let verb = if self.editing.is_some() {
                    "updated"
                } else {
                    "added"
                };
                self.form = StudentForm::default();
                self.editing = None;
                self.refresh(api);
                self.message = Some((
                    MessageKind::Success,
                    format!("Student {} successfully", verb),
                ));
            }
            Err(ClientError::Conflict) => {
                self.message = Some((MessageKind::Error, "Email already exists".to_string()));
            }
            Err(_) => {
                self.message = Some((MessageKind::Error, "Failed to save student".to_string()));
            }
        }
    }

    /// 进入编辑模式并用当前记录预填表单
    pub fn start_edit(&mut self, id: i32) -> bool {
        match self.students.iter().find(|s| s.id == id) {
            Some(student) => {
                self.form = StudentForm {
                    name: student.name.clone(),
                    email: student.email.clone(),
                    age: student.age.to_string(),
                    course: student.course.clone(),
                };
                self.editing = Some(id);
                self.message = None;
                true
            }
            None => {
                self.message = Some((MessageKind::Error, format!("No student with id {}", id)));
                false
            }
        }
    }

    /// 删除须经确认；未确认则不发起请求
    pub fn delete(&mut self, api: &dyn StudentApi, id: i32, confirmed: bool) {
        if !confirmed {
            return;
        }

        match api.delete(id) {
            Ok(()) => {
                self.refresh(api);
                self.message = Some((
                    MessageKind::Success,
                    "Student deleted successfully".to_string(),
                ));
            }
            Err(ClientError::NotFound) => {
                self.message = Some((MessageKind::Error, "Student not found".to_string()));
            }
            Err(_) => {
                self.message = Some((MessageKind::Error, "Failed to delete student".to_string()));
            }
        }
    }

    /// 放弃编辑，回到添加模式并清空消息
    pub fn cancel_edit(&mut self) {
        if self.editing.is_some() {
            self.form = StudentForm::default();
            self.editing = None;
            self.message = None;
        }
    }
}

/// 打印当前列表、模式与消息
fn render(state: &UiState) {
    println!();

    if state.loading {
        println!("Loading...");
    }

    if state.students.is_empty() {
        println!("No students yet.");
    } else {
        println!(
            "{:<4} {:<20} {:<28} {:<4} {:<16} {}",
            "ID", "Name", "Email", "Age", "Course", "Created"
        );
        for s in &state.students {
            println!(
                "{:<4} {:<20} {:<28} {:<4} {:<16} {}",
                s.id,
                s.name,
                s.email,
                s.age,
                s.course,
                s.created_at.format("%Y-%m-%d %H:%M")
            );
        }
    }

    if let Some(id) = state.editing {
        println!("(editing student {})", id);
    }

    if let Some((kind, text)) = &state.message {
        match kind {
            MessageKind::Success => println!("✅ {}", text),
            MessageKind::Error => println!("❌ {}", text),
        }
    }

    println!("Commands: add | edit <id> | delete <id> | cancel | refresh | quit");
}

/// 读取单个表单字段；回车保留当前值，输入 :cancel 放弃本次填写
fn read_field(
    rl: &mut DefaultEditor,
    label: &str,
    current: &str,
) -> Result<Option<String>, ReadlineError> {
    let prompt = if current.is_empty() {
        format!("{}: ", label)
    } else {
        format!("{} [{}]: ", label, current)
    };

    let line = rl.readline(&prompt)?;
    let value = line.trim().to_string();

    if value == ":cancel" {
        return Ok(None);
    }

    Ok(Some(if value.is_empty() {
        current.to_string()
    } else {
        value
    }))
}

/// 逐项填写表单，返回是否完成（false 表示用户中途放弃）
fn fill_form(rl: &mut DefaultEditor, state: &mut UiState) -> Result<bool, ReadlineError> {
    let name = match read_field(rl, "Name", &state.form.name)? {
        Some(value) => value,
        None => {
            state.cancel_edit();
            return Ok(false);
        }
    };

    let email = match read_field(rl, "Email", &state.form.email)? {
        Some(value) => value,
        None => {
            state.cancel_edit();
            return Ok(false);
        }
    };

    let age = match read_field(rl, "Age", &state.form.age)? {
        Some(value) => value,
        None => {
            state.cancel_edit();
            return Ok(false);
        }
    };

    let course = match read_field(rl, "Course", &state.form.course)? {
        Some(value) => value,
        None => {
            state.cancel_edit();
            return Ok(false);
        }
    };

    state.form = StudentForm {
        name,
        email,
        age,
        course,
    };
    Ok(true)
}

fn main() -> rustyline::Result<()> {
    let base_url =
        std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string());
    let api = HttpApi::new(&base_url);
    let mut rl = DefaultEditor::new()?;
    let mut state = UiState::default();

    println!("🎓 Student Management Console ({})", base_url);
    if api.health().is_err() {
        println!("⚠️  API service is not reachable at {}", base_url);
    }

    state.refresh(&api);

    loop {
        render(&state);

        let line = match rl.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e),
        };

        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("a") | Some("add") => {
                if fill_form(&mut rl, &mut state)? {
                    state.submit(&api);
                }
            }
            Some("e") | Some("edit") => match parts.next().and_then(|s| s.parse().ok()) {
                Some(id) => {
                    if state.start_edit(id) && fill_form(&mut rl, &mut state)? {
                        state.submit(&api);
                    }
                }
                None => {
                    state.message = Some((MessageKind::Error, "Usage: edit <id>".to_string()));
                }
            },
            Some("d") | Some("delete") => match parts.next().and_then(|s| s.parse().ok()) {
                Some(id) => {
                    let answer = rl.readline(&format!("Delete student {}? [y/N] ", id))?;
                    let confirmed = matches!(answer.trim(), "y" | "Y" | "yes");
                    state.delete(&api, id, confirmed);
                }
                None => {
                    state.message = Some((MessageKind::Error, "Usage: delete <id>".to_string()));
                }
            },
            Some("c") | Some("cancel") => state.cancel_edit(),
            Some("r") | Some("refresh") => {
                state.message = None;
                state.refresh(&api);
            }
            Some("q") | Some("quit") => break,
            Some(_) => {
                state.message = Some((MessageKind::Error, "Unknown command".to_string()));
            }
            None => {}
        }
    }

    println!("Bye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::cell::RefCell;

    /// 写操作的预设失败模式
    #[derive(Clone, Copy, PartialEq)]
    enum Failure {
        None,
        Conflict,
        NotFound,
        Transport,
    }

    struct MockApi {
        students: RefCell<Vec<Student>>,
        calls: RefCell<Vec<String>>,
        write_failure: Failure,
        list_failure: bool,
        next_id: RefCell<i32>,
    }

    impl MockApi {
        fn new(students: Vec<Student>) -> Self {
            let next_id = students.iter().map(|s| s.id).max().unwrap_or(0) + 1;
            Self {
                students: RefCell::new(students),
                calls: RefCell::new(Vec::new()),
                write_failure: Failure::None,
                list_failure: false,
                next_id: RefCell::new(next_id),
            }
        }

        fn with_write_failure(mut self, failure: Failure) -> Self {
            self.write_failure = failure;
            self
        }

        fn with_list_failure(mut self) -> Self {
            self.list_failure = true;
            self
        }

        fn failure(&self) -> Option<ClientError> {
            match self.write_failure {
                Failure::None => None,
                Failure::Conflict => Some(ClientError::Conflict),
                Failure::NotFound => Some(ClientError::NotFound),
                Failure::Transport => Some(ClientError::Transport("boom".to_string())),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl StudentApi for MockApi {
        fn health(&self) -> Result<(), ClientError> {
            Ok(())
        }

        fn list(&self) -> Result<Vec<Student>, ClientError> {
            self.calls.borrow_mut().push("list".to_string());
            if self.list_failure {
                return Err(ClientError::Transport("connection refused".to_string()));
            }
            Ok(self.students.borrow().clone())
        }

        fn create(&self, input: &StudentInput) -> Result<Student, ClientError> {
            self.calls.borrow_mut().push("create".to_string());
            if let Some(e) = self.failure() {
                return Err(e);
            }

            let mut next_id = self.next_id.borrow_mut();
            let student = Student {
                id: *next_id,
                name: input.name.clone(),
                email: input.email.clone(),
                age: input.age,
                course: input.course.clone(),
                created_at: Utc::now(),
            };
            *next_id += 1;
            self.students.borrow_mut().push(student.clone());
            Ok(student)
        }

        fn update(&self, id: i32, input: &StudentInput) -> Result<Student, ClientError> {
            self.calls.borrow_mut().push(format!("update {}", id));
            if let Some(e) = self.failure() {
                return Err(e);
            }

            let mut students = self.students.borrow_mut();
            let student = students
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or(ClientError::NotFound)?;
            student.name = input.name.clone();
            student.email = input.email.clone();
            student.age = input.age;
            student.course = input.course.clone();
            Ok(student.clone())
        }

        fn delete(&self, id: i32) -> Result<(), ClientError> {
            self.calls.borrow_mut().push(format!("delete {}", id));
            if let Some(e) = self.failure() {
                return Err(e);
            }

            let mut students = self.students.borrow_mut();
            let before = students.len();
            students.retain(|s| s.id != id);
            if students.len() == before {
                return Err(ClientError::NotFound);
            }
            Ok(())
        }
    }

    fn student(id: i32, name: &str, email: &str, age: i32, course: &str) -> Student {
        Student {
            id,
            name: name.to_string(),
            email: email.to_string(),
            age,
            course: course.to_string(),
            created_at: Utc::now(),
        }
    }

    fn filled_form() -> StudentForm {
        StudentForm {
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            age: "20".to_string(),
            course: "CS".to_string(),
        }
    }

    #[test]
    fn age_zero_is_rejected_without_network_call() {
        let api = MockApi::new(vec![]);
        let mut state = UiState {
            form: StudentForm {
                age: "0".to_string(),
                ..filled_form()
            },
            ..UiState::default()
        };

        state.submit(&api);

        assert!(api.calls().is_empty());
        assert!(matches!(state.message, Some((MessageKind::Error, _))));
    }

    #[test]
    fn age_151_is_rejected_without_network_call() {
        let api = MockApi::new(vec![]);
        let mut state = UiState {
            form: StudentForm {
                age: "151".to_string(),
                ..filled_form()
            },
            ..UiState::default()
        };

        state.submit(&api);

        assert!(api.calls().is_empty());
        assert!(matches!(state.message, Some((MessageKind::Error, _))));
    }

    #[test]
    fn email_without_at_is_rejected() {
        let api = MockApi::new(vec![]);
        let mut state = UiState {
            form: StudentForm {
                email: "ann.example.com".to_string(),
                ..filled_form()
            },
            ..UiState::default()
        };

        state.submit(&api);

        assert!(api.calls().is_empty());
        let (_, text) = state.message.unwrap();
        assert!(text.contains("email"));
    }

    #[test]
    fn empty_name_is_rejected() {
        let api = MockApi::new(vec![]);
        let mut state = UiState {
            form: StudentForm {
                name: "  ".to_string(),
                ..filled_form()
            },
            ..UiState::default()
        };

        state.submit(&api);

        assert!(api.calls().is_empty());
    }

    #[test]
    fn successful_create_clears_form_and_refreshes() {
        let api = MockApi::new(vec![]);
        let mut state = UiState {
            form: filled_form(),
            ..UiState::default()
        };

        state.submit(&api);

        assert_eq!(api.calls(), vec!["create", "list"]);
        assert_eq!(state.form, StudentForm::default());
        assert_eq!(state.editing, None);
        assert_eq!(state.students.len(), 1);
        assert!(matches!(state.message, Some((MessageKind::Success, _))));
    }

    #[test]
    fn conflict_shows_specific_message_and_keeps_form() {
        let api = MockApi::new(vec![]).with_write_failure(Failure::Conflict);
        let mut state = UiState {
            form: filled_form(),
            ..UiState::default()
        };

        state.submit(&api);

        let (kind, text) = state.message.clone().unwrap();
        assert_eq!(kind, MessageKind::Error);
        assert_eq!(text, "Email already exists");
        // 提交失败时表单保持原样
        assert_eq!(state.form, filled_form());
    }

    #[test]
    fn transport_failure_shows_generic_save_message() {
        let api = MockApi::new(vec![]).with_write_failure(Failure::Transport);
        let mut state = UiState {
            form: filled_form(),
            ..UiState::default()
        };

        state.submit(&api);

        let (_, text) = state.message.unwrap();
        assert_eq!(text, "Failed to save student");
    }

    #[test]
    fn edit_prefills_form_from_record() {
        let existing = student(7, "Bob", "bob@x.com", 30, "Math");
        let api = MockApi::new(vec![existing.clone()]);
        let mut state = UiState::default();
        state.refresh(&api);

        assert!(state.start_edit(7));
        assert_eq!(state.editing, Some(7));
        assert_eq!(state.form.name, "Bob");
        assert_eq!(state.form.email, "bob@x.com");
        assert_eq!(state.form.age, "30");
        assert_eq!(state.form.course, "Math");
    }

    #[test]
    fn edit_unknown_id_sets_error() {
        let mut state = UiState::default();

        assert!(!state.start_edit(99));
        assert_eq!(state.editing, None);
        assert!(matches!(state.message, Some((MessageKind::Error, _))));
    }

    #[test]
    fn submit_in_edit_mode_issues_update() {
        let api = MockApi::new(vec![student(7, "Bob", "bob@x.com", 30, "Math")]);
        let mut state = UiState::default();
        state.refresh(&api);
        state.start_edit(7);
        state.form.age = "31".to_string();

        state.submit(&api);

        assert_eq!(api.calls(), vec!["list", "update 7", "list"]);
        assert_eq!(state.editing, None);
        assert_eq!(state.students[0].age, 31);
    }

    #[test]
    fn cancel_edit_restores_add_mode() {
        let api = MockApi::new(vec![student(7, "Bob", "bob@x.com", 30, "Math")]);
        let mut state = UiState::default();
        state.refresh(&api);
        state.start_edit(7);

        state.cancel_edit();

        assert_eq!(state.editing, None);
        assert_eq!(state.form, StudentForm::default());
        assert_eq!(state.message, None);
    }

    #[test]
    fn conflict_in_edit_mode_stays_in_edit_mode() {
        let api = MockApi::new(vec![student(7, "Bob", "bob@x.com", 30, "Math")])
            .with_write_failure(Failure::Conflict);
        let mut state = UiState::default();
        state.refresh(&api);
        state.start_edit(7);
        state.form.email = "taken@x.com".to_string();

        state.submit(&api);

        assert_eq!(state.editing, Some(7));
        assert_eq!(state.form.email, "taken@x.com");
        let (_, text) = state.message.unwrap();
        assert_eq!(text, "Email already exists");
    }

    #[test]
    fn delete_missing_student_shows_not_found() {
        let api = MockApi::new(vec![]).with_write_failure(Failure::NotFound);
        let mut state = UiState::default();

        state.delete(&api, 42, true);

        let (kind, text) = state.message.unwrap();
        assert_eq!(kind, MessageKind::Error);
        assert_eq!(text, "Student not found");
    }

    #[test]
    fn unconfirmed_delete_makes_no_request() {
        let api = MockApi::new(vec![student(7, "Bob", "bob@x.com", 30, "Math")]);
        let mut state = UiState::default();

        state.delete(&api, 7, false);

        assert!(api.calls().is_empty());
    }

    #[test]
    fn confirmed_delete_removes_and_refreshes() {
        let api = MockApi::new(vec![student(7, "Bob", "bob@x.com", 30, "Math")]);
        let mut state = UiState::default();
        state.refresh(&api);

        state.delete(&api, 7, true);

        assert_eq!(api.calls(), vec!["list", "delete 7", "list"]);
        assert!(state.students.is_empty());
        assert!(matches!(state.message, Some((MessageKind::Success, _))));
    }

    #[test]
    fn failed_fetch_keeps_previous_list() {
        let existing = student(7, "Bob", "bob@x.com", 30, "Math");
        let mut state = UiState {
            students: vec![existing],
            ..UiState::default()
        };
        let api = MockApi::new(vec![]).with_list_failure();

        state.refresh(&api);

        assert_eq!(state.students.len(), 1);
        assert!(matches!(state.message, Some((MessageKind::Error, _))));
        assert!(!state.loading);
    }

    #[test]
    fn form_validation_accepts_boundary_ages() {
        let mut form = filled_form();
        form.age = "1".to_string();
        assert!(form.validate().is_ok());

        form.age = "150".to_string();
        assert!(form.validate().is_ok());
    }
}
