//! Integration tests for the calculations CRUD surface. Every route sits
//! behind the JWT middleware, so tests register and log in a user first.

use std::net::TcpListener;
use std::sync::Arc;

use serde_json::{json, Value};

use calc_api::auth::RevocationList;
use calc_api::configuration::get_configuration;
use calc_api::repository::{InMemoryCalculationRepository, InMemoryUserRepository};
use calc_api::startup::run;
use calc_api::store::InMemoryTokenStore;

pub struct TestApp {
    pub address: String,
}

async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let configuration = get_configuration().expect("Failed to read configuration.");
    let revocations = RevocationList::new(Arc::new(InMemoryTokenStore::new()));

    let server = run(
        listener,
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(InMemoryCalculationRepository::new()),
        revocations,
        configuration.jwt,
    )
    .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp { address }
}

/// Register a user and return a valid access token.
async fn access_token_for(app: &TestApp, username: &str) -> String {
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/auth/register", &app.address))
        .json(&json!({
            "first_name": "Test",
            "last_name": "User",
            "email": format!("{}@example.com", username),
            "username": username,
            "password": "SecurePass1!",
            "confirm_password": "SecurePass1!"
        }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, response.status().as_u16());

    let response = client
        .post(&format!("{}/auth/login", &app.address))
        .json(&json!({ "username": username, "password": "SecurePass1!" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());

    let tokens: Value = response.json().await.expect("Failed to parse response");
    tokens["access_token"].as_str().unwrap().to_string()
}

async fn create_calculation(app: &TestApp, token: &str, body: Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(&format!("{}/calculations", &app.address))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.")
}

// --- Authentication boundary ---

#[tokio::test]
async fn calculations_require_authentication() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/calculations", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, response.status().as_u16());

    let response = client
        .post(&format!("{}/calculations", &app.address))
        .json(&json!({ "type": "addition", "inputs": [1.0, 2.0] }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, response.status().as_u16());
}

// --- Create ---

#[tokio::test]
async fn create_returns_201_with_computed_result() {
    let app = spawn_app().await;
    let token = access_token_for(&app, "alice").await;

    let response = create_calculation(
        &app,
        &token,
        json!({ "type": "addition", "inputs": [1.0, 2.0, 3.0] }),
    )
    .await;

    assert_eq!(201, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["type"], "addition");
    assert_eq!(body["result"], 6.0);
    assert_eq!(body["inputs"], json!([1.0, 2.0, 3.0]));
    assert!(body.get("id").is_some());
    assert!(body.get("created_at").is_some());
}

#[tokio::test]
async fn create_supports_all_five_operations() {
    let app = spawn_app().await;
    let token = access_token_for(&app, "alice").await;

    let cases = vec![
        ("addition", json!([1.0, 2.0, 3.0]), 6.0),
        ("subtraction", json!([10.0, 3.0, 2.0]), 5.0),
        ("multiplication", json!([2.0, 3.0, 4.0]), 24.0),
        ("division", json!([100.0, 5.0, 2.0]), 10.0),
        ("power", json!([2.0, 10.0]), 1024.0),
    ];

    for (operation, inputs, expected) in cases {
        let response = create_calculation(
            &app,
            &token,
            json!({ "type": operation, "inputs": inputs }),
        )
        .await;

        assert_eq!(201, response.status().as_u16(), "operation: {}", operation);

        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["result"], expected, "operation: {}", operation);
    }
}

#[tokio::test]
async fn create_returns_422_for_unknown_operation() {
    let app = spawn_app().await;
    let token = access_token_for(&app, "alice").await;

    let response = create_calculation(
        &app,
        &token,
        json!({ "type": "modulo", "inputs": [10.0, 3.0] }),
    )
    .await;

    assert_eq!(422, response.status().as_u16());
}

#[tokio::test]
async fn create_returns_422_for_wrong_power_arity() {
    let app = spawn_app().await;
    let token = access_token_for(&app, "alice").await;

    let response = create_calculation(
        &app,
        &token,
        json!({ "type": "power", "inputs": [2.0, 3.0, 4.0] }),
    )
    .await;
    assert_eq!(422, response.status().as_u16());

    let response =
        create_calculation(&app, &token, json!({ "type": "power", "inputs": [2.0] })).await;
    assert_eq!(422, response.status().as_u16());
}

#[tokio::test]
async fn create_returns_422_for_too_few_inputs() {
    let app = spawn_app().await;
    let token = access_token_for(&app, "alice").await;

    let response =
        create_calculation(&app, &token, json!({ "type": "addition", "inputs": [1.0] })).await;

    assert_eq!(422, response.status().as_u16());
}

#[tokio::test]
async fn create_returns_400_for_division_by_zero() {
    let app = spawn_app().await;
    let token = access_token_for(&app, "alice").await;

    let response = create_calculation(
        &app,
        &token,
        json!({ "type": "division", "inputs": [10.0, 0.0] }),
    )
    .await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn create_returns_422_for_malformed_body() {
    let app = spawn_app().await;
    let token = access_token_for(&app, "alice").await;

    let response = create_calculation(
        &app,
        &token,
        json!({ "type": "addition", "inputs": "not-a-list" }),
    )
    .await;
    assert_eq!(422, response.status().as_u16());

    let response = create_calculation(&app, &token, json!({ "type": "addition" })).await;
    assert_eq!(422, response.status().as_u16());
}

// --- Read ---

#[tokio::test]
async fn list_returns_own_calculations_newest_first() {
    let app = spawn_app().await;
    let token = access_token_for(&app, "alice").await;
    let client = reqwest::Client::new();

    for inputs in [json!([1.0, 1.0]), json!([2.0, 2.0]), json!([3.0, 3.0])] {
        let response =
            create_calculation(&app, &token, json!({ "type": "addition", "inputs": inputs }))
                .await;
        assert_eq!(201, response.status().as_u16());
        // Distinct creation timestamps keep the ordering assertion meaningful.
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let response = client
        .get(&format!("{}/calculations", &app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());

    let body: Vec<Value> = response.json().await.expect("Failed to parse response");
    assert_eq!(body.len(), 3);
    assert_eq!(body[0]["result"], 6.0);
    assert_eq!(body[2]["result"], 2.0);
}

#[tokio::test]
async fn get_returns_a_single_calculation() {
    let app = spawn_app().await;
    let token = access_token_for(&app, "alice").await;
    let client = reqwest::Client::new();

    let created: Value = create_calculation(
        &app,
        &token,
        json!({ "type": "multiplication", "inputs": [6.0, 7.0] }),
    )
    .await
    .json()
    .await
    .expect("Failed to parse response");
    let id = created["id"].as_str().unwrap();

    let response = client
        .get(&format!("{}/calculations/{}", &app.address, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["id"], *id);
    assert_eq!(body["result"], 42.0);
}

#[tokio::test]
async fn get_returns_404_for_unknown_id() {
    let app = spawn_app().await;
    let token = access_token_for(&app, "alice").await;

    let response = reqwest::Client::new()
        .get(&format!(
            "{}/calculations/{}",
            &app.address,
            uuid::Uuid::new_v4()
        ))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn get_returns_400_for_malformed_id() {
    let app = spawn_app().await;
    let token = access_token_for(&app, "alice").await;

    let response = reqwest::Client::new()
        .get(&format!("{}/calculations/not-a-uuid", &app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn calculations_are_scoped_per_user() {
    let app = spawn_app().await;
    let alice_token = access_token_for(&app, "alice").await;
    let bob_token = access_token_for(&app, "bob").await;
    let client = reqwest::Client::new();

    let created: Value = create_calculation(
        &app,
        &alice_token,
        json!({ "type": "addition", "inputs": [1.0, 2.0] }),
    )
    .await
    .json()
    .await
    .expect("Failed to parse response");
    let id = created["id"].as_str().unwrap();

    // Bob cannot see, update, or delete Alice's calculation.
    let response = client
        .get(&format!("{}/calculations/{}", &app.address, id))
        .bearer_auth(&bob_token)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(404, response.status().as_u16());

    let response = client
        .delete(&format!("{}/calculations/{}", &app.address, id))
        .bearer_auth(&bob_token)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(404, response.status().as_u16());

    let body: Vec<Value> = client
        .get(&format!("{}/calculations", &app.address))
        .bearer_auth(&bob_token)
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .expect("Failed to parse response");
    assert!(body.is_empty());
}

// --- Update ---

#[tokio::test]
async fn update_recomputes_the_result() {
    let app = spawn_app().await;
    let token = access_token_for(&app, "alice").await;
    let client = reqwest::Client::new();

    let created: Value = create_calculation(
        &app,
        &token,
        json!({ "type": "addition", "inputs": [1.0, 2.0] }),
    )
    .await
    .json()
    .await
    .expect("Failed to parse response");
    let id = created["id"].as_str().unwrap();

    let response = client
        .put(&format!("{}/calculations/{}", &app.address, id))
        .bearer_auth(&token)
        .json(&json!({ "inputs": [10.0, 20.0, 30.0] }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["type"], "addition");
    assert_eq!(body["result"], 60.0);

    // Changing only the operation also recomputes against stored inputs.
    let response = client
        .put(&format!("{}/calculations/{}", &app.address, id))
        .bearer_auth(&token)
        .json(&json!({ "type": "multiplication" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["result"], 6000.0);
}

#[tokio::test]
async fn update_returns_400_for_division_by_zero() {
    let app = spawn_app().await;
    let token = access_token_for(&app, "alice").await;
    let client = reqwest::Client::new();

    let created: Value = create_calculation(
        &app,
        &token,
        json!({ "type": "division", "inputs": [10.0, 2.0] }),
    )
    .await
    .json()
    .await
    .expect("Failed to parse response");
    let id = created["id"].as_str().unwrap();

    let response = client
        .put(&format!("{}/calculations/{}", &app.address, id))
        .bearer_auth(&token)
        .json(&json!({ "inputs": [10.0, 0.0] }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn update_returns_404_for_unknown_id() {
    let app = spawn_app().await;
    let token = access_token_for(&app, "alice").await;

    let response = reqwest::Client::new()
        .put(&format!(
            "{}/calculations/{}",
            &app.address,
            uuid::Uuid::new_v4()
        ))
        .bearer_auth(&token)
        .json(&json!({ "inputs": [1.0, 2.0] }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(404, response.status().as_u16());
}

// --- Delete ---

#[tokio::test]
async fn delete_removes_the_calculation() {
    let app = spawn_app().await;
    let token = access_token_for(&app, "alice").await;
    let client = reqwest::Client::new();

    let created: Value = create_calculation(
        &app,
        &token,
        json!({ "type": "addition", "inputs": [1.0, 2.0] }),
    )
    .await
    .json()
    .await
    .expect("Failed to parse response");
    let id = created["id"].as_str().unwrap();

    let response = client
        .delete(&format!("{}/calculations/{}", &app.address, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(204, response.status().as_u16());

    let response = client
        .get(&format!("{}/calculations/{}", &app.address, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(404, response.status().as_u16());

    // Deleting again reports not found.
    let response = client
        .delete(&format!("{}/calculations/{}", &app.address, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(404, response.status().as_u16());
}
