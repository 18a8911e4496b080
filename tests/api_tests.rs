// tests/api_tests.rs

mod common;

use common::{client, spawn_app};
use serde_json::{Value, json};

#[tokio::test]
async fn unknown_path_is_404() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = client()
        .get(app.url("/random_path_that_does_not_exist"))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_works() {
    let app = spawn_app().await;

    let response = app.register(&client(), "asha", "student").await;

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Student registered successfully!");
    assert_eq!(app.count("users").await, 1);
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let app = spawn_app().await;
    let client = client();

    assert_eq!(app.register(&client, "asha", "student").await.status().as_u16(), 201);
    let second = app.register(&client, "asha", "admin").await;

    assert_eq!(second.status().as_u16(), 409);
    let body: Value = second.json().await.unwrap();
    assert_eq!(body["error"], "Username already exists. Choose a different one.");
    assert_eq!(app.count("users").await, 1);
}

#[tokio::test]
async fn register_fails_validation() {
    let app = spawn_app().await;

    // Username too short
    let response = app.register(&client(), "yo", "student").await;

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn password_is_stored_hashed() {
    let app = spawn_app().await;
    app.register(&client(), "asha", "student").await;

    let stored: String = sqlx::query_scalar("SELECT password FROM users WHERE username = 'asha'")
        .fetch_one(&app.pool)
        .await
        .unwrap();

    assert_ne!(stored, "password123");
    assert!(stored.starts_with("$argon2"));
}

#[tokio::test]
async fn login_establishes_session_with_stored_role() {
    let app = spawn_app().await;
    let client = client();
    app.register(&client, "root", "admin").await;

    let response = app.login(&client, "root", "password123").await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["role"], "admin");
    assert_eq!(body["redirect"], "/admin_dashboard");

    // The cookie now resolves to the same identity.
    let status: Value = client
        .get(app.url("/"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["authenticated"], true);
    assert_eq!(status["username"], "root");
    assert_eq!(status["role"], "admin");
    assert_eq!(app.count("sessions").await, 1);
}

#[tokio::test]
async fn wrong_password_and_unknown_user_look_the_same() {
    let app = spawn_app().await;
    let client = client();
    app.register(&client, "asha", "student").await;

    let wrong_password = app.login(&client, "asha", "not-the-password").await;
    assert_eq!(wrong_password.status().as_u16(), 401);
    let wrong_password: Value = wrong_password.json().await.unwrap();

    let unknown_user = app.login(&client, "nobody", "password123").await;
    assert_eq!(unknown_user.status().as_u16(), 401);
    let unknown_user: Value = unknown_user.json().await.unwrap();

    assert_eq!(wrong_password, unknown_user);
    assert_eq!(wrong_password["error"], "Invalid username or password.");
    assert_eq!(app.count("sessions").await, 0);
}

#[tokio::test]
async fn logout_clears_session() {
    let app = spawn_app().await;
    let client = app.signed_in("asha", "student").await;

    assert_eq!(
        client.get(app.url("/student_dashboard")).send().await.unwrap().status().as_u16(),
        200
    );

    let logout = client.get(app.url("/logout")).send().await.unwrap();
    assert_eq!(logout.status().as_u16(), 200);
    assert_eq!(app.count("sessions").await, 0);

    let after = client.get(app.url("/student_dashboard")).send().await.unwrap();
    assert_eq!(after.status().as_u16(), 303);
}

#[tokio::test]
async fn logout_without_session_is_fine() {
    let app = spawn_app().await;

    let response = client().get(app.url("/logout")).send().await.unwrap();

    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn expired_session_is_rejected() {
    let app = spawn_app().await;
    let client = app.signed_in("asha", "student").await;

    sqlx::query("UPDATE sessions SET expires_at = ?")
        .bind(chrono::Utc::now() - chrono::Duration::seconds(1))
        .execute(&app.pool)
        .await
        .unwrap();

    let response = client.get(app.url("/student_dashboard")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 303);
    assert_eq!(app.count("sessions").await, 0);
}

#[tokio::test]
async fn new_login_sweeps_expired_sessions() {
    // Arrange
    let app = spawn_app().await;
    app.register(&client(), "asha", "student").await;

    // Logins from clients that never come back.
    for _ in 0..5 {
        let response = app.login(&client(), "asha", "password123").await;
        assert_eq!(response.status().as_u16(), 200);
    }
    assert_eq!(app.count("sessions").await, 5);

    sqlx::query("UPDATE sessions SET expires_at = ?")
        .bind(chrono::Utc::now() - chrono::Duration::seconds(1))
        .execute(&app.pool)
        .await
        .unwrap();

    // Act
    let live = client();
    assert_eq!(app.login(&live, "asha", "password123").await.status().as_u16(), 200);

    // Assert
    assert_eq!(app.count("sessions").await, 1);
    let dashboard = live.get(app.url("/student_dashboard")).send().await.unwrap();
    assert_eq!(dashboard.status().as_u16(), 200);
}

#[tokio::test]
async fn anonymous_requests_to_gated_routes_redirect_to_login() {
    let app = spawn_app().await;
    let client = client();

    for path in [
        "/admin_dashboard",
        "/admin/add_exam",
        "/view_queries",
        "/publish_results/1",
        "/student_dashboard",
        "/take_exam/1",
        "/view_results/1",
        "/contact_admin",
    ] {
        let response = client.get(app.url(path)).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 303, "GET {}", path);
        assert_eq!(response.headers()["location"], "/login", "GET {}", path);
    }
}

#[tokio::test]
async fn anonymous_writes_redirect_and_mutate_nothing() {
    let app = spawn_app().await;
    let admin = app.signed_in("root", "admin").await;
    let exam_id = app.create_exam(&admin, &[]).await;
    let anonymous = client();

    let writes = [
        (
            "/admin/add_exam".to_string(),
            json!({
                "name": "Sneaky",
                "age_min": 1,
                "age_max": 99,
                "education_level": "any",
            }),
        ),
        (
            format!("/admin/set_mcqs/{}", exam_id),
            json!({
                "question": "q", "option1": "A", "option2": "B",
                "option3": "C", "option4": "D", "correct_answer": "A",
            }),
        ),
        (
            format!("/take_exam/{}", exam_id),
            json!({ "answers": {} }),
        ),
        ("/contact_admin".to_string(), json!({ "message": "hello" })),
    ];

    for (path, body) in &writes {
        let response = anonymous.post(app.url(path)).json(body).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 303, "POST {}", path);
        assert_eq!(response.headers()["location"], "/login", "POST {}", path);
    }

    assert_eq!(app.count("exams").await, 1);
    assert_eq!(app.count("mcqs").await, 0);
    assert_eq!(app.count("results").await, 0);
    assert_eq!(app.count("queries").await, 0);
}

#[tokio::test]
async fn wrong_role_cannot_mutate_state() {
    let app = spawn_app().await;
    let admin = app.signed_in("root", "admin").await;
    let student = app.signed_in("asha", "student").await;
    let exam_id = app.create_exam(&admin, &[]).await;

    // Student hitting admin routes
    let add_exam = student
        .post(app.url("/admin/add_exam"))
        .json(&json!({
            "name": "Sneaky",
            "age_min": 1,
            "age_max": 99,
            "education_level": "any",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(add_exam.status().as_u16(), 303);
    let body: Value = add_exam.json().await.unwrap();
    assert_eq!(body["error"], "Access unauthorized. Please log in as an admin.");

    let add_mcq = student
        .post(app.url(&format!("/admin/set_mcqs/{}", exam_id)))
        .json(&json!({
            "question": "q", "option1": "A", "option2": "B",
            "option3": "C", "option4": "D", "correct_answer": "A",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(add_mcq.status().as_u16(), 303);

    // Admin hitting student routes
    let submit = admin
        .post(app.url(&format!("/take_exam/{}", exam_id)))
        .json(&json!({ "answers": {} }))
        .send()
        .await
        .unwrap();
    assert_eq!(submit.status().as_u16(), 303);

    let contact = admin
        .post(app.url("/contact_admin"))
        .json(&json!({ "message": "hello" }))
        .send()
        .await
        .unwrap();
    assert_eq!(contact.status().as_u16(), 303);

    assert_eq!(app.count("exams").await, 1);
    assert_eq!(app.count("mcqs").await, 0);
    assert_eq!(app.count("results").await, 0);
    assert_eq!(app.count("queries").await, 0);
}
