use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use fire_scenario::client::{HttpProjectionClient, ProjectionService};
use fire_scenario::config::ServiceConfig;
use fire_scenario::core::{AssetBreakdown, Composer, Plan, ScenarioState};
use fire_scenario::error::ClientError;

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    body: Value,
    seen: Arc<Mutex<Vec<Value>>>,
}

async fn record(State(stub): State<Stub>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    stub.seen.lock().expect("lock").push(body);
    (stub.status, Json(stub.body.clone()))
}

async fn spawn_stub(status: StatusCode, body: Value) -> (ServiceConfig, Arc<Mutex<Vec<Value>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let stub = Stub {
        status,
        body,
        seen: Arc::clone(&seen),
    };
    let app = Router::new()
        .route("/api/fire/projection", post(record))
        .route("/api/fire/monte-carlo", post(record))
        .with_state(stub);

    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server");
    });

    let config = ServiceConfig {
        base_url: format!("http://{addr}"),
        ..ServiceConfig::default()
    };
    (config, seen)
}

fn scenario(liquid: f64) -> ScenarioState {
    ScenarioState {
        plan: Some(Plan {
            birth_year: 1986,
            monthly_expenses: 5_000.0,
            monthly_investment: Some(2_000.0),
            ..Plan::default()
        }),
        assets: AssetBreakdown {
            liquid,
            non_spendable: 0.0,
            is_ready: liquid > 0.0,
        },
        ..ScenarioState::default()
    }
}

#[tokio::test]
async fn project_posts_effective_request_and_parses_response() {
    let (config, seen) = spawn_stub(
        StatusCode::OK,
        json!({
            "fiMetrics": {"fiNumber": 1500000, "fiProgress": 20.0},
            "yearlyProjections": [{"age": 40, "year": 2026, "totalBalance": 300000}],
            "fiAchievementAge": 55
        }),
    )
    .await;
    let client = HttpProjectionClient::new(&config);
    let request = Composer::new(2026)
        .compose_state(&scenario(300_000.0))
        .expect("plan present");

    let projection = client.project(&request).await.expect("projection");

    assert_eq!(projection.fi_achievement_age, Some(55));
    assert_eq!(projection.fi_metrics.fi_number, 1_500_000.0);
    assert_eq!(projection.yearly_projections.len(), 1);

    let bodies = seen.lock().expect("lock").clone();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["currentAge"], 40);
    assert_eq!(bodies[0]["monthlyExpenses"], 5000.0);
    assert_eq!(bodies[0]["liquidAssets"], 300000.0);
}

#[tokio::test]
async fn zero_assets_are_left_out_of_the_body() {
    let (config, seen) = spawn_stub(StatusCode::OK, json!({})).await;
    let client = HttpProjectionClient::new(&config);
    let request = Composer::new(2026)
        .compose_state(&scenario(0.0))
        .expect("plan present");

    client.project(&request).await.expect("projection");

    let bodies = seen.lock().expect("lock").clone();
    let body = bodies[0].as_object().expect("object body");
    assert!(!body.contains_key("liquidAssets"));
    assert!(!body.contains_key("nonSpendableAssets"));
}

#[tokio::test]
async fn non_success_status_is_reported_with_body() {
    let (config, _) = spawn_stub(
        StatusCode::SERVICE_UNAVAILABLE,
        json!({"error": "calculator offline"}),
    )
    .await;
    let client = HttpProjectionClient::new(&config);
    let request = Composer::new(2026)
        .compose_state(&scenario(1_000.0))
        .expect("plan present");

    let err = client.project(&request).await.expect_err("503 must fail");
    match err {
        ClientError::Status { status, body } => {
            assert_eq!(status, 503);
            assert!(body.contains("calculator offline"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn simulate_sends_iterations_alongside_request_fields() {
    let (config, seen) = spawn_stub(
        StatusCode::OK,
        json!({"iterations": 2500, "successRate": 88.4, "medianFinalBalance": 2100000}),
    )
    .await;
    let client = HttpProjectionClient::new(&config);
    let request = Composer::new(2026)
        .compose_monte_carlo(&scenario(50_000.0), 2_500)
        .expect("plan present");

    let result = client.simulate(&request).await.expect("simulation");

    assert_eq!(result.iterations, 2_500);
    assert_eq!(result.success_rate, 88.4);
    let bodies = seen.lock().expect("lock").clone();
    assert_eq!(bodies[0]["iterations"], 2500);
    assert_eq!(bodies[0]["monthlyContribution"], 2000.0);
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let client = HttpProjectionClient::new(&ServiceConfig {
        base_url: format!("http://{addr}"),
        ..ServiceConfig::default()
    });
    let request = Composer::new(2026)
        .compose_state(&scenario(0.0))
        .expect("plan present");

    let err = client.project(&request).await.expect_err("nothing listening");
    assert!(matches!(err, ClientError::Transport(_)));
}
