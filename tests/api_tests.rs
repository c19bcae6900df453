// tests/api_tests.rs

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use quizroom::config::{Config, SessionBackend};
use reqwest::header;
use serde_json::{Value, json};
use tower::ServiceExt;

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let (app, _) = common::create_test_app().await;

    // Act
    let response = app
        .oneshot(
            Request::builder()
                .uri("/random_path_that_does_not_exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_reports_ok() {
    let (address, _) = common::spawn_app().await;

    let body: Value = reqwest::get(format!("{}/health", address))
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();

    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn api_requires_a_session() {
    // Arrange
    let (address, _) = common::spawn_app().await;
    let client = common::client();

    // Act
    let no_cookie = client
        .get(format!("{}/api/classrooms/teaching", address))
        .send()
        .await
        .expect("Failed to execute request");
    let unknown_cookie = client
        .get(format!("{}/api/me", address))
        .header(header::COOKIE, "quizroom_sid=not-a-session")
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(no_cookie.status().as_u16(), 403);
    let body: Value = no_cookie.json().await.unwrap();
    assert!(body["error"].is_string());
    assert_eq!(unknown_cookie.status().as_u16(), 403);
}

#[tokio::test]
async fn login_rejects_unknown_position() {
    let (address, _) = common::spawn_app().await;
    let client = common::client();

    for query in ["?position=admin", ""] {
        let response = client
            .get(format!("{}/auth/google{}", address, query))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 400);
    }
}

#[tokio::test]
async fn login_redirects_to_role_landing_page() {
    let (address, _) = common::spawn_app().await;

    let teacher = common::login_response(&address, "t@x.com", "teacher").await;
    assert_eq!(teacher.status().as_u16(), 303);
    assert_eq!(common::location(&teacher), "/teacher_classroom_list");

    let student = common::login_response(&address, "s@x.com", "student").await;
    assert_eq!(common::location(&student), "/student_classroom_list");
}

#[tokio::test]
async fn callback_without_matching_state_fails() {
    let (address, _) = common::spawn_app().await;
    let client = common::client();

    let start = client
        .get(format!("{}/auth/google?position=student", address))
        .send()
        .await
        .expect("Failed to execute request");
    let cookie = common::session_cookie(&start).unwrap();

    let response = client
        .get(format!(
            "{}/auth/google/callback?code=s@x.com&state=forged",
            address
        ))
        .header(header::COOKIE, cookie)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 303);
    assert_eq!(common::location(&response), "/?error=login_failed");
}

#[tokio::test]
async fn login_with_other_role_is_denied() {
    let (address, _) = common::spawn_app().await;
    common::login(&address, "t@x.com", "teacher").await;

    let response = common::login_response(&address, "t@x.com", "student").await;

    assert_eq!(common::location(&response), "/?error=login_failed");
}

#[tokio::test]
async fn login_without_email_is_denied() {
    let (address, _) = common::spawn_app().await;

    let response = common::login_response(&address, "no-email", "student").await;

    assert_eq!(common::location(&response), "/?error=login_failed");
}

#[tokio::test]
async fn logout_ends_the_session() {
    let (address, _) = common::spawn_app().await;
    let client = common::client();
    let cookie = common::login(&address, "t@x.com", "teacher").await;

    let me = client
        .get(format!("{}/api/me", address))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(me.status().as_u16(), 200);
    let body: Value = me.json().await.unwrap();
    assert_eq!(body["email"], "t@x.com");
    assert_eq!(body["position"], "teacher");

    let logout = client
        .get(format!("{}/auth/logout", address))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(logout.status().as_u16(), 303);

    let after = client
        .get(format!("{}/api/me", address))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(after.status().as_u16(), 403);
}

#[tokio::test]
async fn database_sessions_survive_requests_and_logout() {
    // Arrange
    let config = Config {
        session_backend: SessionBackend::Database,
        ..common::test_config()
    };
    let (address, pool) = common::spawn_app_with(config).await;
    let client = common::client();
    let session_rows = || {
        let pool = pool.clone();
        async move {
            let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions")
                .fetch_one(&pool)
                .await
                .unwrap();
            count
        }
    };

    // Act
    let cookie = common::login(&address, "s@x.com", "student").await;
    assert_eq!(session_rows().await, 1);

    let me = client
        .get(format!("{}/api/me", address))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(me.status().as_u16(), 200);
    let body: Value = me.json().await.unwrap();
    assert_eq!(body["email"], "s@x.com");
    assert_eq!(body["position"], "student");

    let logout = client
        .get(format!("{}/auth/logout", address))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(logout.status().as_u16(), 303);

    // Assert
    assert_eq!(session_rows().await, 0);
    let after = client
        .get(format!("{}/api/me", address))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(after.status().as_u16(), 403);
}

#[tokio::test]
async fn students_cannot_use_teacher_routes() {
    let (address, _) = common::spawn_app().await;
    let client = common::client();
    let cookie = common::login(&address, "s@x.com", "student").await;

    let list = client
        .get(format!("{}/api/classrooms/teaching", address))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .expect("Failed to execute request");
    let create = client
        .post(format!("{}/api/classrooms", address))
        .header(header::COOKIE, &cookie)
        .json(&json!({ "name": "Sneaky" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(list.status().as_u16(), 403);
    assert_eq!(create.status().as_u16(), 403);
}

#[tokio::test]
async fn classroom_validation_fails() {
    let (address, _) = common::spawn_app().await;
    let client = common::client();
    let cookie = common::login(&address, "t@x.com", "teacher").await;

    let empty_name = client
        .post(format!("{}/api/classrooms", address))
        .header(header::COOKIE, &cookie)
        .json(&json!({ "name": "" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(empty_name.status().as_u16(), 400);

    let created: Value = client
        .post(format!("{}/api/classrooms", address))
        .header(header::COOKIE, &cookie)
        .json(&json!({ "name": "Algebra" }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();

    let bad_email = client
        .post(format!("{}/api/classrooms/{}/students", address, created["id"]))
        .header(header::COOKIE, &cookie)
        .json(&json!({ "students": ["not-an-email"] }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(bad_email.status().as_u16(), 400);

    let bad_ids = client
        .get(format!("{}/api/responses?quiz_ids=1,abc", address))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(bad_ids.status().as_u16(), 400);
}

#[tokio::test]
async fn test_classroom_flow() {
    let (address, _) = common::spawn_app().await;
    let client = common::client();

    // 1. Teacher logs in and creates a classroom with a quiz
    let teacher = common::login(&address, "t@x.com", "teacher").await;

    let res = client
        .post(format!("{}/api/classrooms", address))
        .header(header::COOKIE, &teacher)
        .json(&json!({ "name": "Algebra" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(res.status().as_u16(), 201);
    let classroom: Value = res.json().await.unwrap();
    let classroom_id = classroom["id"].as_i64().unwrap();

    let res = client
        .post(format!("{}/api/classrooms/{}/quizzes", address, classroom_id))
        .header(header::COOKIE, &teacher)
        .json(&json!({
            "name": "Q1",
            "question": "Solve x + 2 = 4",
            "quiz_type": "plaintext",
            "max_points": 10
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(res.status().as_u16(), 201);
    let quiz: Value = res.json().await.unwrap();
    let quiz_id = quiz["id"].as_i64().unwrap();
    assert_eq!(quiz["open"], true);

    // 2. Enroll a student who has never logged in
    let res = client
        .post(format!("{}/api/classrooms/{}/students", address, classroom_id))
        .header(header::COOKIE, &teacher)
        .json(&json!({ "students": ["S@x.com"] }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(res.status().as_u16(), 201);
    let outcome: Value = res.json().await.unwrap();
    assert_eq!(outcome["added"], 1);
    assert_eq!(outcome["responses_created"], 1);

    // 3. Student logs in, sees the classroom and the quiz
    let student = common::login(&address, "s@x.com", "student").await;

    let enrolled: Value = client
        .get(format!("{}/api/classrooms/enrolled", address))
        .header(header::COOKIE, &student)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();
    assert_eq!(enrolled[0]["name"], "Algebra");

    let assigned: Value = client
        .get(format!("{}/api/classrooms/{}/my-quizzes", address, classroom_id))
        .header(header::COOKIE, &student)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();
    assert_eq!(assigned[0]["id"], quiz_id);

    // 4. Student answers
    let res = client
        .post(format!("{}/api/quizzes/{}/answer", address, quiz_id))
        .header(header::COOKIE, &student)
        .json(&json!({ "answer": "x = 2" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(res.status().as_u16(), 201);

    // 5. Teacher grades
    let res = client
        .post(format!("{}/api/quizzes/{}/grade", address, quiz_id))
        .header(header::COOKIE, &teacher)
        .json(&json!({ "student_email": "s@x.com", "comment": "Good", "points": 9 }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(res.status().as_u16(), 201);

    // 6. Student reads the graded response
    let response: Value = client
        .get(format!("{}/api/quizzes/{}/response", address, quiz_id))
        .header(header::COOKIE, &student)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();
    assert_eq!(response["answered"], true);
    assert_eq!(response["graded"], true);
    assert_eq!(response["answer"], "x = 2");
    assert_eq!(response["points"], 9);
    assert_eq!(response["max_points"], 10);

    let batch: Value = client
        .get(format!("{}/api/responses?quiz_ids={}", address, quiz_id))
        .header(header::COOKIE, &student)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();
    assert_eq!(batch[0]["points"], 9);

    let by_students: Value = client
        .get(format!(
            "{}/api/quizzes/{}/responses?students=s@x.com,nobody@x.com",
            address, quiz_id
        ))
        .header(header::COOKIE, &teacher)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();
    assert_eq!(by_students[0]["comment"], "Good");
    assert!(by_students[1].is_null());

    // 7. Teacher closes the quiz, later answers are refused
    let res = client
        .post(format!("{}/api/quizzes/{}/close", address, quiz_id))
        .header(header::COOKIE, &teacher)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(res.status().as_u16(), 200);

    let res = client
        .delete(format!("{}/api/quizzes/{}/answer", address, quiz_id))
        .header(header::COOKIE, &student)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(res.status().as_u16(), 500);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Failed to unsubmit quiz");

    // 8. Teacher deletes the classroom, the student loses it
    let res = client
        .delete(format!("{}/api/classrooms/{}", address, classroom_id))
        .header(header::COOKIE, &teacher)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(res.status().as_u16(), 200);
    let removed: Value = res.json().await.unwrap();
    assert_eq!(removed["removed"]["responses"], 1);

    let enrolled: Value = client
        .get(format!("{}/api/classrooms/enrolled", address))
        .header(header::COOKIE, &student)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();
    assert_eq!(enrolled, json!([]));
}

#[tokio::test]
async fn other_teachers_cannot_touch_a_classroom() {
    let (address, _) = common::spawn_app().await;
    let client = common::client();
    let owner = common::login(&address, "t@x.com", "teacher").await;
    let other = common::login(&address, "t2@x.com", "teacher").await;

    let classroom: Value = client
        .post(format!("{}/api/classrooms", address))
        .header(header::COOKIE, &owner)
        .json(&json!({ "name": "Algebra" }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();

    let res = client
        .delete(format!("{}/api/classrooms/{}", address, classroom["id"]))
        .header(header::COOKIE, &other)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(res.status().as_u16(), 403);

    let res = client
        .get(format!("{}/api/classrooms/{}/students", address, classroom["id"]))
        .header(header::COOKIE, &other)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(res.status().as_u16(), 403);

    let res = client
        .delete(format!("{}/api/classrooms/9999", address))
        .header(header::COOKIE, &owner)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(res.status().as_u16(), 500);
}
