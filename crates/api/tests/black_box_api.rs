use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};

use courseadmin_api::config::ApiConfig;

const JWT_SECRET: &str = "black-box-test-secret";
const ADMIN: (&str, &str) = ("root", "Root#2024");
const PASSWORD: &str = "Secret#123";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, bound to an ephemeral port.
        let config = ApiConfig::from_lookup(|name| match name {
            "JWT_SECRET" => Some(JWT_SECRET.to_string()),
            "BOOTSTRAP_ADMIN_USERNAME" => Some(ADMIN.0.to_string()),
            "BOOTSTRAP_ADMIN_PASSWORD" => Some(ADMIN.1.to_string()),
            _ => None,
        })
        .expect("test config");
        let app = courseadmin_api::app::build_app(&config).expect("failed to build app");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, client: reqwest::Client::new(), handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn register(&self, username: &str) -> i64 {
        let res = self
            .client
            .post(self.url("/api/v1/register"))
            .json(&json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": PASSWORD,
                "name": format!("{username} name"),
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = res.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }

    async fn login(&self, username: &str, password: &str) -> String {
        let res = self
            .client
            .post(self.url("/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    /// Registers `username` and has the bootstrap admin promote them to teacher.
    async fn teacher(&self, username: &str) -> (i64, String) {
        let id = self.register(username).await;
        let admin = self.login(ADMIN.0, ADMIN.1).await;
        let res = self
            .client
            .post(self.url(&format!("/api/v1/users/update_role/{id}")))
            .bearer_auth(&admin)
            .json(&json!(["TEACHER"]))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        (id, self.login(username, PASSWORD).await)
    }

    async fn post(&self, path: &str, token: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }

    /// Course -> module -> task owned by `token`'s user. Returns (course id, task id).
    async fn course_with_task(&self, token: &str, value: f64) -> (i64, String) {
        let res = self
            .post("/api/v1/courses", token, json!({ "title": "Rust 101" }))
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let course: Value = res.json().await.unwrap();
        let course_id = course["id"].as_i64().unwrap();

        let res = self
            .post(
                "/api/v1/modules",
                token,
                json!({ "courseId": course_id, "moduleName": "Ownership" }),
            )
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let module: Value = res.json().await.unwrap();

        let res = self
            .post(
                "/api/v1/tasks",
                token,
                json!({ "moduleId": module["id"], "title": "Borrow checker lab", "value": value }),
            )
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let task: Value = res.json().await.unwrap();

        (course_id, task["id"].as_str().unwrap().to_string())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(secret: &str, username: &str, user_id: i64, roles: &[&str], iat: i64, exp: i64) -> String {
    let claims = json!({
        "sub": username,
        "userId": user_id,
        "authorities": roles,
        "iat": iat,
        "exp": exp,
    });

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

#[tokio::test]
async fn student_submission_end_to_end() {
    let srv = TestServer::spawn().await;
    let (_teacher_id, teacher) = srv.teacher("gil").await;
    let (course_id, task_id) = srv.course_with_task(&teacher, 10.0).await;

    srv.register("ana").await;
    let ana = srv.login("ana", PASSWORD).await;

    let res = srv
        .post(&format!("/api/v1/enrollments/courses/{course_id}"), &ana, json!({}))
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = srv
        .post(
            &format!("/api/v1/assignments/tasks/{task_id}/submit"),
            &ana,
            json!({ "score": 8.0 }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let assignment: Value = res.json().await.unwrap();
    assert_eq!(assignment["status"], "COMPLETED");
    assert_eq!(assignment["score"], 8.0);
    assert!(assignment["submittedAt"].is_string());

    let res = srv
        .post(
            &format!("/api/v1/assignments/tasks/{task_id}/submit"),
            &ana,
            json!({ "score": 5.0 }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "assignment_already_exists");

    let res = srv.get("/api/v1/assignments/student", &ana).await;
    assert_eq!(res.status(), StatusCode::OK);
    let mine: Value = res.json().await.unwrap();
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_submission_body_is_rejected_without_recording_work() {
    let srv = TestServer::spawn().await;
    let (_, teacher) = srv.teacher("gil").await;
    let (course_id, task_id) = srv.course_with_task(&teacher, 10.0).await;

    srv.register("ana").await;
    let ana = srv.login("ana", PASSWORD).await;
    let res = srv
        .post(&format!("/api/v1/enrollments/courses/{course_id}"), &ana, json!({}))
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let submit = format!("/api/v1/assignments/tasks/{task_id}/submit");
    let res = srv.post(&submit, &ana, json!({ "score": "eleven" })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    let res = srv.get("/api/v1/assignments/student", &ana).await;
    let mine: Value = res.json().await.unwrap();
    assert!(mine.as_array().unwrap().is_empty());

    let res = srv
        .client
        .post(srv.url(&submit))
        .bearer_auth(&ana)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let assignment: Value = res.json().await.unwrap();
    assert_eq!(assignment["status"], "COMPLETED");
    assert!(assignment["score"].is_null());
}

#[tokio::test]
async fn submission_without_enrollment_looks_like_missing_task() {
    let srv = TestServer::spawn().await;
    let (_, teacher) = srv.teacher("gil").await;
    let (_, task_id) = srv.course_with_task(&teacher, 10.0).await;

    srv.register("ana").await;
    let ana = srv.login("ana", PASSWORD).await;

    let res = srv
        .post(&format!("/api/v1/assignments/tasks/{task_id}/submit"), &ana, json!({}))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let not_enrolled: Value = res.json().await.unwrap();

    let missing = "0190c0de-0000-7000-8000-000000000000";
    let res = srv
        .post(&format!("/api/v1/assignments/tasks/{missing}/submit"), &ana, json!({}))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let absent: Value = res.json().await.unwrap();

    assert_eq!(not_enrolled, absent);
    assert_eq!(absent["error"], "task_not_found");
}

#[tokio::test]
async fn teacher_of_another_course_sees_task_as_missing() {
    let srv = TestServer::spawn().await;
    let (_, gil) = srv.teacher("gil").await;
    let (_, eva) = srv.teacher("eva").await;
    let (course_id, task_id) = srv.course_with_task(&gil, 10.0).await;

    let ana_id = srv.register("ana").await;
    let ana = srv.login("ana", PASSWORD).await;
    srv.post(&format!("/api/v1/enrollments/courses/{course_id}"), &ana, json!({}))
        .await;

    // The owner may create it, with a score above the task value rejected.
    let res = srv
        .post(
            "/api/v1/assignments",
            &gil,
            json!({ "userId": ana_id, "taskId": task_id, "score": 11.0 }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_score");

    // A different teacher sees the same answer as for a task that does not exist.
    let res = srv
        .post(
            "/api/v1/assignments",
            &eva,
            json!({ "userId": ana_id, "taskId": task_id, "score": 11.0 }),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "task_not_found");
}

#[tokio::test]
async fn login_returns_bearer_header_and_body() {
    let srv = TestServer::spawn().await;
    srv.register("ana").await;

    let res = srv
        .client
        .post(srv.url("/login"))
        .json(&json!({ "username": "ana", "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let header = res
        .headers()
        .get(reqwest::header::AUTHORIZATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["username"], "ana");
    assert_eq!(header, format!("Bearer {}", body["token"].as_str().unwrap()));

    let res = srv.get("/whoami", body["token"].as_str().unwrap()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let me: Value = res.json().await.unwrap();
    assert_eq!(me["username"], "ana");
    assert_eq!(me["authorities"], json!(["ROLE_STUDENT"]));
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let srv = TestServer::spawn().await;
    srv.register("ana").await;

    let attempt = |username: &'static str, password: &'static str| {
        let client = srv.client.clone();
        let url = srv.url("/login");
        async move {
            let res = client
                .post(url)
                .json(&json!({ "username": username, "password": password }))
                .send()
                .await
                .unwrap();
            let status = res.status();
            let body: Value = res.json().await.unwrap();
            (status, body)
        }
    };

    let wrong_password = attempt("ana", "Wrong#123").await;
    let unknown_user = attempt("nobody", "Wrong#123").await;

    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_user);
    assert!(wrong_password.1["message"].is_string());
    assert!(wrong_password.1["error"].is_string());
}

#[tokio::test]
async fn anonymous_requests_get_401_or_403_by_route_kind() {
    let srv = TestServer::spawn().await;

    // Requires only authentication.
    let res = srv.client.get(srv.url("/whoami")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Requires a role.
    let res = srv.client.get(srv.url("/api/v1/users")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv
        .client
        .post(srv.url("/api/v1/courses"))
        .json(&json!({ "title": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn students_are_forbidden_from_staff_routes() {
    let srv = TestServer::spawn().await;
    srv.register("ana").await;
    let ana = srv.login("ana", PASSWORD).await;

    let res = srv.post("/api/v1/courses", &ana, json!({ "title": "Mine" })).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "no authorization");

    let res = srv.get("/api/v1/users", &ana).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let srv = TestServer::spawn().await;
    let now = Utc::now();
    let token = mint_jwt(
        JWT_SECRET,
        "ana",
        1,
        &["ROLE_STUDENT"],
        (now - ChronoDuration::hours(25)).timestamp(),
        (now - ChronoDuration::hours(1)).timestamp(),
    );

    let res = srv.get("/whoami", &token).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn foreign_or_tampered_tokens_are_rejected() {
    let srv = TestServer::spawn().await;
    let now = Utc::now().timestamp();

    let foreign = mint_jwt("some-other-secret", "ana", 1, &["ROLE_ADMIN"], now, now + 600);
    let res = srv.get("/whoami", &foreign).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Swap the payload for one claiming ADMIN, keeping the original signature.
    let genuine = mint_jwt(JWT_SECRET, "ana", 1, &["ROLE_STUDENT"], now, now + 600);
    let forged = mint_jwt(JWT_SECRET, "ana", 1, &["ROLE_ADMIN"], now, now + 600);
    let g: Vec<&str> = genuine.split('.').collect();
    let f: Vec<&str> = forged.split('.').collect();
    let tampered = format!("{}.{}.{}", g[0], f[1], g[2]);

    let res = srv.get("/api/v1/users", &tampered).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv.get("/whoami", "not-a-jwt").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn minted_token_reaches_role_gated_routes() {
    let srv = TestServer::spawn().await;
    let now = Utc::now().timestamp();
    // Short role names are canonicalized when the token is read.
    let token = mint_jwt(JWT_SECRET, "root", 1, &["admin"], now, now + 600);

    let res = srv.get("/api/v1/users", &token).await;
    assert_eq!(res.status(), StatusCode::OK);
    let users: Value = res.json().await.unwrap();
    assert!(users.as_array().unwrap().iter().any(|u| u["username"] == "root"));
}

#[tokio::test]
async fn registration_rejects_duplicates_and_weak_passwords() {
    let srv = TestServer::spawn().await;
    srv.register("ana").await;

    let res = srv
        .client
        .post(srv.url("/api/v1/register"))
        .json(&json!({
            "username": "ana",
            "email": "other@example.com",
            "password": PASSWORD,
            "name": "Ana Two",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "username_taken");

    let res = srv
        .client
        .post(srv.url("/api/v1/register"))
        .json(&json!({
            "username": "bob",
            "email": "bob@example.com",
            "password": "weakpass",
            "name": "Bob Bob",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn course_owner_grades_with_query_score() {
    let srv = TestServer::spawn().await;
    let (_, gil) = srv.teacher("gil").await;
    let (course_id, task_id) = srv.course_with_task(&gil, 20.0).await;

    let ana_id = srv.register("ana").await;
    let res = srv
        .post("/api/v1/enrollments", &gil, json!({ "userId": ana_id, "courseId": course_id }))
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = srv
        .post("/api/v1/assignments", &gil, json!({ "userId": ana_id, "taskId": task_id }))
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let assignment: Value = res.json().await.unwrap();
    assert_eq!(assignment["status"], "PENDING");
    let id = assignment["id"].as_str().unwrap();

    let res = srv
        .post(&format!("/api/v1/assignments/{id}/submit?score=25"), &gil, json!({}))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv
        .post(&format!("/api/v1/assignments/{id}/submit?score=17.5"), &gil, json!({}))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let graded: Value = res.json().await.unwrap();
    assert_eq!(graded["status"], "COMPLETED");
    assert_eq!(graded["score"], 17.5);
}
