use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use super::build_router;
use crate::auth::{PasswordService, TokenService};
use crate::models::{NewUser, UserType};
use crate::repository::memory::fixtures;
use crate::repository::{MemoryRepository, Repository};
use crate::state::AppState;
use crate::storage::MemoryBlobStore;

struct TestApp {
    router: Router,
    repo: Arc<MemoryRepository>,
    blobs: Arc<MemoryBlobStore>,
    tokens: TokenService,
}

struct Session {
    user_id: Uuid,
    token: String,
}

fn app() -> TestApp {
    let repo = Arc::new(MemoryRepository::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let tokens = TokenService::new(
        "router test secret",
        Duration::from_secs(300),
        Duration::from_secs(86400),
    )
    .unwrap();
    let state = AppState {
        repo: repo.clone(),
        blobs: blobs.clone(),
        tokens: tokens.clone(),
        passwords: PasswordService::fast(),
        max_upload_bytes: 1024 * 1024,
    };
    TestApp {
        router: build_router(state),
        repo,
        blobs,
        tokens,
    }
}

impl TestApp {
    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    async fn get(&self, uri: &str, session: &Session) -> (StatusCode, Value) {
        self.call(Method::GET, uri, Some(&session.token), None).await
    }

    async fn post(&self, uri: &str, session: &Session, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(&session.token), Some(body))
            .await
    }

    async fn register(&self, username: &str, user_type: &str) -> Session {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": "s3cure-password",
                    "password_confirm": "s3cure-password",
                    "user_type": user_type,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        Session {
            user_id: body["user"]["id"].as_str().unwrap().parse().unwrap(),
            token: body["access"].as_str().unwrap().to_string(),
        }
    }

    async fn staff(&self, username: &str) -> Session {
        let (user, _) = self
            .repo
            .create_user(
                NewUser {
                    is_staff: true,
                    ..fixtures::new_user(username)
                },
                UserType::Admin,
            )
            .await
            .unwrap();
        Session {
            user_id: user.id,
            token: self.tokens.issue(&user).unwrap().access,
        }
    }

    async fn company(&self, session: &Session, name: &str) -> String {
        let (status, body) = self
            .post("/api/jobs/companies", session, json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }

    async fn job(&self, session: &Session, company: &str, title: &str) -> String {
        let (status, body) = self
            .post(
                "/api/jobs/jobs",
                session,
                json!({
                    "title": title,
                    "company": company,
                    "description": "Build and run services",
                    "requirements": "Rust, SQL",
                    "location": "Remote",
                    "employment_type": "full_time",
                    "experience_level": "mid",
                    "status": "active",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }

    async fn apply(&self, session: &Session, job: &str) -> (StatusCode, Value) {
        self.post(
            "/api/jobs/applications",
            session,
            json!({
                "job": job,
                "cover_letter": "I am interested in this position",
                "resume": "resumes/cv.pdf",
            }),
        )
        .await
    }
}

fn ids(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "jobboard-api");
}

#[tokio::test]
async fn test_unauthenticated_requests_are_rejected() {
    let app = app();
    let id = Uuid::new_v4();
    let endpoints = [
        (Method::GET, "/api/auth/profile".to_string()),
        (Method::GET, "/api/auth/profiles".to_string()),
        (Method::GET, "/api/jobs/companies".to_string()),
        (Method::POST, "/api/jobs/companies".to_string()),
        (Method::GET, "/api/jobs/jobs".to_string()),
        (Method::POST, "/api/jobs/jobs".to_string()),
        (Method::GET, format!("/api/jobs/jobs/{id}")),
        (Method::GET, format!("/api/jobs/jobs/{id}/applications")),
        (Method::GET, "/api/jobs/applications".to_string()),
        (Method::GET, "/api/jobs/interviews".to_string()),
        (Method::DELETE, format!("/api/auth/users/{id}")),
        (Method::POST, "/api/uploads/resumes".to_string()),
    ];

    for (method, uri) in endpoints {
        let (status, body) = app
            .call(method.clone(), &uri, None, Some(json!({ "name": "Acme" })))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    let (status, _) = app
        .call(
            Method::GET,
            "/api/jobs/companies",
            Some("not-a-real-token"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(app.repo.list_companies().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let app = app();
    let (_, body) = app
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "username": "rita",
                "password": "s3cure-password",
                "password_confirm": "s3cure-password",
            })),
        )
        .await;
    let refresh = body["refresh"].as_str().unwrap().to_string();

    let (status, _) = app
        .call(Method::GET, "/api/auth/profile", Some(&refresh), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/token/refresh",
            None,
            Some(json!({ "refresh": refresh })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let access = body["access"].as_str().unwrap();
    let (status, _) = app
        .call(Method::GET, "/api/auth/profile", Some(access), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_employer_creates_exactly_one_profile() {
    let app = app();
    let employer = app.register("acme_hr", "employer").await;

    let (status, profile) = app.get("/api/auth/profile", &employer).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["user_type"], "employer");
    assert_eq!(profile["user"]["id"], employer.user_id.to_string());
    assert_eq!(profile["skills_list"], json!([]));

    let (_, profiles) = app.get("/api/auth/profiles", &employer).await;
    assert_eq!(profiles.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_register_password_mismatch_creates_nothing() {
    let app = app();
    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "username": "mallory",
                "password": "s3cure-password",
                "password_confirm": "another-password",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["fields"]["password_confirm"][0],
        "Passwords don't match"
    );
    assert!(app.repo.find_credentials("mallory").await.unwrap().is_none());

    let staff = app.staff("root").await;
    let (_, profiles) = app.get("/api/auth/profiles", &staff).await;
    assert_eq!(profiles.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let app = app();
    app.register("sam", "candidate").await;
    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "username": "sam",
                "password": "s3cure-password",
                "password_confirm": "s3cure-password",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["fields"]["username"].is_array());
}

#[tokio::test]
async fn test_login() {
    let app = app();
    let registered = app.register("lena", "candidate").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "lena", "password": "s3cure-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], registered.user_id.to_string());
    assert!(body["access"].is_string());
    assert!(body["refresh"].is_string());

    for credentials in [
        json!({ "username": "lena", "password": "wrong-password" }),
        json!({ "username": "nobody", "password": "s3cure-password" }),
        json!({ "username": "lena" }),
    ] {
        let (status, body) = app
            .call(Method::POST, "/api/auth/login", None, Some(credentials))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "Invalid credentials");
    }
}

#[tokio::test]
async fn test_job_posted_by_comes_from_actor() {
    let app = app();
    let employer = app.register("employer", "employer").await;
    let other = app.register("other", "employer").await;
    let company = app.company(&employer, "Acme").await;

    let (status, job) = app
        .post(
            "/api/jobs/jobs",
            &employer,
            json!({
                "title": "Backend Engineer",
                "company": company,
                "description": "Build services",
                "requirements": "Rust",
                "location": "Berlin",
                "employment_type": "full_time",
                "experience_level": "senior",
                "posted_by": other.user_id,
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(job["posted_by"]["id"], employer.user_id.to_string());
    assert_eq!(job["posted_by"]["username"], "employer");
    assert_eq!(job["company"]["name"], "Acme");
    assert_eq!(job["status"], "draft");
    assert_eq!(job["applications_count"], 0);
}

#[tokio::test]
async fn test_job_rejects_missing_company_reference() {
    let app = app();
    let employer = app.register("employer", "employer").await;
    let (status, body) = app
        .post(
            "/api/jobs/jobs",
            &employer,
            json!({
                "title": "Ghost",
                "company": Uuid::new_v4(),
                "description": "d",
                "requirements": "r",
                "location": "l",
                "employment_type": "contract",
                "experience_level": "entry",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["fields"]["company"].is_array());
}

#[tokio::test]
async fn test_applications_count_tracks_live_rows() {
    let app = app();
    let employer = app.register("employer", "employer").await;
    let company = app.company(&employer, "Acme").await;
    let job = app.job(&employer, &company, "Engineer").await;

    let ann = app.register("ann", "candidate").await;
    let bob = app.register("bob", "candidate").await;
    let (_, first) = app.apply(&ann, &job).await;
    app.apply(&bob, &job).await;

    let uri = format!("/api/jobs/jobs/{job}");
    let (_, body) = app.get(&uri, &employer).await;
    assert_eq!(body["applications_count"], 2);

    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/api/jobs/applications/{}", first["id"].as_str().unwrap()),
            Some(&ann.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app.get(&uri, &employer).await;
    assert_eq!(body["applications_count"], 1);
}

#[tokio::test]
async fn test_non_staff_only_see_their_own_applications() {
    let app = app();
    let employer = app.register("employer", "employer").await;
    let company = app.company(&employer, "Acme").await;
    let job = app.job(&employer, &company, "Engineer").await;
    let ann = app.register("ann", "candidate").await;
    let bob = app.register("bob", "candidate").await;
    let (_, ann_app) = app.apply(&ann, &job).await;
    let (_, bob_app) = app.apply(&bob, &job).await;
    let ann_app = ann_app["id"].as_str().unwrap().to_string();
    let bob_app = bob_app["id"].as_str().unwrap().to_string();

    // A filter cannot widen the scope.
    let (_, listed) = app
        .get("/api/jobs/applications?status=pending", &ann)
        .await;
    assert_eq!(ids(&listed), vec![ann_app.clone()]);
    for item in listed.as_array().unwrap() {
        assert_eq!(item["applicant"]["id"], ann.user_id.to_string());
    }

    let (status, _) = app
        .get(&format!("/api/jobs/applications/{bob_app}"), &ann)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, listed) = app.get("/api/jobs/applications", &employer).await;
    assert!(ids(&listed).is_empty());

    let (_, listed) = app
        .get(&format!("/api/jobs/jobs/{job}/applications"), &employer)
        .await;
    assert!(ids(&listed).is_empty());

    let (_, listed) = app
        .get(&format!("/api/jobs/jobs/{job}/applications"), &ann)
        .await;
    assert_eq!(ids(&listed), vec![ann_app]);

    let staff = app.staff("root").await;
    let (_, listed) = app.get("/api/jobs/applications", &staff).await;
    assert_eq!(ids(&listed).len(), 2);
    assert!(ids(&listed).contains(&bob_app));
}

#[tokio::test]
async fn test_job_applications_are_narrowed_for_the_poster() {
    let app = app();
    let employer = app.register("employer", "employer").await;
    let company = app.company(&employer, "Acme").await;
    let job = app.job(&employer, &company, "Engineer").await;
    let ann = app.register("ann", "candidate").await;
    app.apply(&ann, &job).await;

    let uri = format!("/api/jobs/jobs/{job}/applications");
    let (status, listed) = app.get(&uri, &employer).await;
    assert_eq!(status, StatusCode::OK);
    assert!(ids(&listed).is_empty());

    // Posting the job grants nothing; only the poster's own application shows.
    let (_, own) = app.apply(&employer, &job).await;
    let (_, listed) = app.get(&uri, &employer).await;
    assert_eq!(ids(&listed), vec![own["id"].as_str().unwrap().to_string()]);
    for item in listed.as_array().unwrap() {
        assert_eq!(item["applicant"]["id"], employer.user_id.to_string());
    }

    let staff = app.staff("root").await;
    let (_, listed) = app.get(&uri, &staff).await;
    assert_eq!(ids(&listed).len(), 2);
}

#[tokio::test]
async fn test_duplicate_application_is_rejected() {
    let app = app();
    let employer = app.register("employer", "employer").await;
    let company = app.company(&employer, "Acme").await;
    let job = app.job(&employer, &company, "Engineer").await;
    let ann = app.register("ann", "candidate").await;

    let (status, first) = app.apply(&ann, &job).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["status"], "pending");
    assert_eq!(first["applicant"]["id"], ann.user_id.to_string());
    assert_eq!(first["job"]["id"], job);

    let (status, body) = app.apply(&ann, &job).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["fields"]["non_field_errors"][0],
        "The fields job, applicant must make a unique set."
    );

    let (_, listed) = app.get("/api/jobs/applications", &ann).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], first["id"]);
    assert_eq!(listed[0]["cover_letter"], first["cover_letter"]);
}

#[tokio::test]
async fn test_application_resume_extension_is_checked() {
    let app = app();
    let employer = app.register("employer", "employer").await;
    let company = app.company(&employer, "Acme").await;
    let job = app.job(&employer, &company, "Engineer").await;
    let ann = app.register("ann", "candidate").await;

    let (status, body) = app
        .post(
            "/api/jobs/applications",
            &ann,
            json!({ "job": job, "resume": "resumes/cv.exe" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["fields"]["resume"].is_array());
}

#[tokio::test]
async fn test_company_delete_cascades() {
    let app = app();
    let employer = app.register("employer", "employer").await;
    let company = app.company(&employer, "Acme").await;
    let job = app.job(&employer, &company, "Engineer").await;
    let ann = app.register("ann", "candidate").await;
    let (_, application) = app.apply(&ann, &job).await;
    let application = application["id"].as_str().unwrap().to_string();

    let (status, interview) = app
        .post(
            "/api/jobs/interviews",
            &employer,
            json!({
                "application": application,
                "interview_type": "video",
                "scheduled_at": "2030-01-15T10:00:00Z",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(interview["interviewer"]["id"], employer.user_id.to_string());
    assert_eq!(interview["duration_minutes"], 60);
    assert_eq!(interview["application"]["job"]["company"]["name"], "Acme");

    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/api/jobs/companies/{company}"),
            Some(&employer.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let staff = app.staff("root").await;
    let (status, _) = app.get(&format!("/api/jobs/jobs/{job}"), &staff).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .get(&format!("/api/jobs/applications/{application}"), &staff)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, interviews) = app.get("/api/jobs/interviews", &staff).await;
    assert!(interviews.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_interviews_are_visible_to_every_actor() {
    let app = app();
    let employer = app.register("employer", "employer").await;
    let company = app.company(&employer, "Acme").await;
    let job = app.job(&employer, &company, "Engineer").await;
    let ann = app.register("ann", "candidate").await;
    let (_, application) = app.apply(&ann, &job).await;
    let application = application["id"].as_str().unwrap().to_string();

    let (status, created) = app
        .post(
            "/api/jobs/interviews",
            &employer,
            json!({
                "application": application,
                "interview_type": "technical",
                "scheduled_at": "2030-03-01T09:30:00Z",
                "duration_minutes": 90,
                "notes": "Pair on a small task",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let interview = created["id"].as_str().unwrap().to_string();
    let uri = format!("/api/jobs/interviews/{interview}");

    // bob is neither the applicant nor the interviewer.
    let bob = app.register("bob", "candidate").await;
    let (status, listed) = app.get("/api/jobs/interviews", &bob).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&listed), vec![interview.clone()]);
    let (status, fetched) = app.get(&uri, &bob).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["interviewer"]["id"], employer.user_id.to_string());
    assert_eq!(fetched["application"]["applicant"]["id"], ann.user_id.to_string());

    let (status, patched) = app
        .call(
            Method::PATCH,
            &uri,
            Some(&bob.token),
            Some(json!({ "status": "completed", "feedback": "Strong hire" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["status"], "completed");
    assert_eq!(patched["feedback"], "Strong hire");
    assert_eq!(patched["interviewer"]["id"], employer.user_id.to_string());
    assert_eq!(patched["interview_type"], "technical");
    assert_eq!(patched["scheduled_at"], created["scheduled_at"]);
    assert_eq!(patched["duration_minutes"], 90);
    assert_eq!(patched["notes"], "Pair on a small task");
    assert_eq!(patched["application"]["id"], application);

    let (status, body) = app
        .call(
            Method::PUT,
            &uri,
            Some(&employer.token),
            Some(json!({ "application": application, "interview_type": "phone" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["fields"]["scheduled_at"].is_array());

    let (status, replaced) = app
        .call(
            Method::PUT,
            &uri,
            Some(&employer.token),
            Some(json!({
                "application": application,
                "interview_type": "phone",
                "scheduled_at": "2030-03-02T14:00:00Z",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["interview_type"], "phone");
    assert_eq!(replaced["interviewer"]["id"], employer.user_id.to_string());
    assert_ne!(replaced["scheduled_at"], created["scheduled_at"]);

    let (status, _) = app
        .call(Method::DELETE, &uri, Some(&employer.token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&uri, &bob).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, listed) = app.get("/api/jobs/interviews", &bob).await;
    assert!(ids(&listed).is_empty());
}

#[tokio::test]
async fn test_profile_missing_is_not_found() {
    let app = app();
    let session = app.register("ghost", "candidate").await;
    let profile = app
        .repo
        .profile_for_user(session.user_id)
        .await
        .unwrap()
        .unwrap();
    app.repo.delete_profile(profile.id).await.unwrap();

    let (status, body) = app.get("/api/auth/profile", &session).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Profile not found");

    // A fresh profile can then be created for the same user, but only one.
    let (status, created) = app
        .post(
            "/api/auth/profiles",
            &session,
            json!({ "skills": "Python, Django, , React", "user": Uuid::new_v4() }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["user"]["id"], session.user_id.to_string());
    assert_eq!(created["skills_list"], json!(["Python", "Django", "React"]));

    let (status, _) = app.post("/api/auth/profiles", &session, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profiles_are_scoped_to_their_owner() {
    let app = app();
    let ann = app.register("ann", "candidate").await;
    let bob = app.register("bob", "candidate").await;
    let bob_profile = app
        .repo
        .profile_for_user(bob.user_id)
        .await
        .unwrap()
        .unwrap();

    let uri = format!("/api/auth/profiles/{}", bob_profile.id);
    let (status, _) = app.get(&uri, &ann).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .call(Method::PATCH, &uri, Some(&ann.token), Some(json!({ "bio": "hacked" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .call(
            Method::PATCH,
            &uri,
            Some(&bob.token),
            Some(json!({ "bio": "Rustacean", "github_url": "https://github.com/bob" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bio"], "Rustacean");
    assert_eq!(body["user_type"], "candidate");
}

#[tokio::test]
async fn test_job_filters() {
    let app = app();
    let employer = app.register("employer", "employer").await;
    let acme = app.company(&employer, "Acme Robotics").await;
    let globex = app.company(&employer, "Globex").await;
    let robot_job = app.job(&employer, &acme, "Firmware Engineer").await;
    let globex_job = app.job(&employer, &globex, "Accountant").await;

    let (_, listed) = app.get("/api/jobs/jobs?search=robotics", &employer).await;
    assert_eq!(ids(&listed), vec![robot_job.clone()]);

    let (_, listed) = app
        .get("/api/jobs/jobs?search=&status=&employment_type=", &employer)
        .await;
    assert_eq!(ids(&listed), vec![globex_job.clone(), robot_job.clone()]);

    let (status, body) = app
        .call(
            Method::PATCH,
            &format!("/api/jobs/jobs/{globex_job}"),
            Some(&employer.token),
            Some(json!({ "status": "closed" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "closed");
    assert_eq!(body["title"], "Accountant");

    let (_, listed) = app.get("/api/jobs/jobs?status=active", &employer).await;
    assert_eq!(ids(&listed), vec![robot_job]);

    let (status, body) = app.get("/api/jobs/jobs?status=archived", &employer).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["fields"]["status"].is_array());
}

#[tokio::test]
async fn test_delete_user_requires_self_or_staff() {
    let app = app();
    let ann = app.register("ann", "candidate").await;
    let bob = app.register("bob", "candidate").await;

    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/api/auth/users/{}", bob.user_id),
            Some(&ann.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/api/auth/users/{}", ann.user_id),
            Some(&ann.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(app.repo.find_credentials("ann").await.unwrap().is_none());
    assert!(app
        .repo
        .profile_for_user(ann.user_id)
        .await
        .unwrap()
        .is_none());
}

fn multipart(uri: &str, token: &str, file_name: &str, content: &[u8]) -> Request<Body> {
    let boundary = "jobboard-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_resume_upload() {
    let app = app();
    let ann = app.register("ann", "candidate").await;

    let (status, body) = app
        .send(multipart("/api/uploads/resumes", &ann.token, "My CV.pdf", b"%PDF-1.4"))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let reference = body["reference"].as_str().unwrap();
    assert!(reference.starts_with("resumes/"));
    assert!(reference.ends_with("-My_CV.pdf"));

    let (stored, content_type) = app.blobs.get(reference).unwrap();
    assert_eq!(&stored[..], b"%PDF-1.4");
    assert_eq!(content_type, "application/pdf");

    let (status, _) = app
        .send(multipart("/api/uploads/resumes", &ann.token, "cv.exe", b"MZ"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(multipart("/api/uploads/profile_pics", &ann.token, "cv.pdf", b"%PDF"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(multipart("/api/uploads/secrets", &ann.token, "cv.pdf", b"%PDF"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
