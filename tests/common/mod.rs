// tests/common/mod.rs

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use carpool_backend::{app, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "segredo123";

#[derive(Clone)]
pub struct TestApp {
    router: Router,
}

#[derive(Clone)]
pub struct TestEmployee {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            router: app(AppState::in_memory("integration-secret")),
        }
    }

    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    pub async fn get(&self, uri: &str, who: &TestEmployee) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(&who.token), None).await
    }

    pub async fn post(&self, uri: &str, who: &TestEmployee, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(&who.token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, who: &TestEmployee) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(&who.token), None).await
    }

    pub async fn delete(&self, uri: &str, who: &TestEmployee) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(&who.token), None).await
    }

    pub async fn employee(&self, name: &str) -> TestEmployee {
        let email = format!("{}.{}@empresa.pt", name.to_lowercase(), Uuid::new_v4().simple());
        let (status, body) = self
            .request(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({ "name": name, "email": email, "password": PASSWORD, "department": "Engenharia" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");

        let (status, login) = self
            .request(Method::POST, "/auth/login", None, Some(json!({ "email": email, "password": PASSWORD })))
            .await;
        assert_eq!(status, StatusCode::OK, "{login}");

        TestEmployee {
            id: body["id"].as_str().unwrap().parse().unwrap(),
            email,
            token: login["access_token"].as_str().unwrap().to_string(),
        }
    }

    pub async fn ride(&self, driver: &TestEmployee, seats: i64) -> Value {
        let (status, ride) = self
            .post(
                "/rides/",
                driver,
                json!({
                    "origin": "Lisboa - Sede",
                    "destination": "Porto - Escritório Norte",
                    "departure_time": "2026-02-10T08:30:00",
                    "available_seats": seats
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{ride}");
        ride
    }

    pub async fn reserve(&self, rider: &TestEmployee, ride_id: &str, seats: i64) -> (StatusCode, Value) {
        self.post("/reservations/", rider, json!({ "ride_id": ride_id, "seats_reserved": seats }))
            .await
    }
}

pub fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}
