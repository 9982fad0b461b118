use std::sync::Arc;

use actix_web::{App, http::StatusCode, test, web::Data};
use fluxdash::config::DashboardConfig;
use fluxdash::routes::configure;
use fluxdash::startup::AppState;
use fluxdash_k8s_backend::TriggerConvention;
use fluxdash_k8s_backend::testing::{
    FakeCall, FakeClusterClient, FakeOperation, deployment, kustomization, pod, replica_set,
    service, stateful_set,
};
use serde_json::{Value, json};

fn test_config() -> DashboardConfig {
    DashboardConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        control_namespace: "flux-system".to_string(),
        kustomization_version: "v1beta2".to_string(),
        default_kustomization: "web-app".to_string(),
        request_timeout_secs: 5,
        trigger: TriggerConvention::Force,
        patchable_fields: vec!["suspend".to_string(), "force".to_string(), "path".to_string()],
    }
}

fn state(client: Arc<FakeClusterClient>) -> Data<AppState> {
    Data::new(AppState::new(client, &test_config()))
}

async fn send(client: Arc<FakeClusterClient>, req: test::TestRequest) -> (StatusCode, Value) {
    let app = test::init_service(App::new().app_data(state(client)).configure(configure)).await;
    let resp = test::call_service(&app, req.to_request()).await;
    let status = resp.status();
    let body = test::read_body(resp).await;

    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn web_app() -> FakeClusterClient {
    FakeClusterClient::default().with_kustomization(kustomization(
        "web-app",
        json!({ "targetNamespace": "web" }),
        json!({ "conditions": [{
            "type": "Ready",
            "status": "True",
            "message": "Applied revision: main@sha1:abc"
        }] }),
    ))
}

#[actix_web::test]
async fn index_serves_operator_page() {
    let app = test::init_service(
        App::new()
            .app_data(state(Arc::new(FakeClusterClient::default())))
            .configure(configure),
    )
    .await;
    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert!(resp.status().is_success());
    let body = test::read_body(resp).await;
    assert!(std::str::from_utf8(&body).unwrap().contains("fluxdash"));
}

#[actix_web::test]
async fn health_check_returns_ok() {
    let app = test::init_service(
        App::new()
            .app_data(state(Arc::new(FakeClusterClient::default())))
            .configure(configure),
    )
    .await;
    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/health_check").to_request(),
    )
    .await;

    assert!(resp.status().is_success());
    assert_eq!(test::read_body(resp).await, "ok");
}

#[actix_web::test]
async fn cluster_status_with_no_workloads_has_empty_arrays() {
    let (status, body) = send(
        Arc::new(web_app()),
        test::TestRequest::get().uri("/cluster-status"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["targetNamespace"], "web");
    for key in ["pods", "services", "deployments", "replicasets", "statefulsets"] {
        assert_eq!(body[key], json!([]), "{key}");
    }
}

#[actix_web::test]
async fn cluster_status_reports_named_kustomization_workloads() {
    let client = web_app()
        .with_kustomization(kustomization(
            "infra",
            json!({ "targetNamespace": "infra" }),
            json!(null),
        ))
        .with_pod(pod("infra", "ingress-0", "Running"))
        .with_service(service("infra", "ingress", &[80, 443]))
        .with_deployment(deployment("infra", "ingress", Some(2), None))
        .with_pod(pod("web", "web-0", "Running"));

    let (status, body) = send(
        Arc::new(client),
        test::TestRequest::get().uri("/cluster-status?name=infra"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["targetNamespace"], "infra");
    assert_eq!(body["pods"][0]["name"], "ingress-0");
    assert_eq!(body["pods"].as_array().unwrap().len(), 1);
    assert_eq!(body["services"][0]["ports"], json!(["80/TCP", "443/TCP"]));
    assert_eq!(
        body["deployments"][0],
        json!({ "name": "ingress", "replicas": 2, "readyReplicas": 0, "availableReplicas": 0 })
    );
}

#[actix_web::test]
async fn cluster_status_reports_replica_counts_in_api_order() {
    let client = web_app()
        .with_replica_set(replica_set("web", "rs-b", Some(3)))
        .with_replica_set(replica_set("web", "rs-a", None))
        .with_stateful_set(stateful_set("web", "db"));

    let (status, body) = send(
        Arc::new(client),
        test::TestRequest::get().uri("/cluster-status"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["replicasets"],
        json!([
            { "name": "rs-b", "replicas": 3, "readyReplicas": 0 },
            { "name": "rs-a", "replicas": 0, "readyReplicas": 0 }
        ])
    );
    assert_eq!(
        body["statefulsets"],
        json!([{ "name": "db", "replicas": 0, "readyReplicas": 0 }])
    );
}

#[actix_web::test]
async fn cluster_status_for_unknown_kustomization_is_an_error() {
    let client = Arc::new(web_app());
    let (status, body) = send(
        client.clone(),
        test::TestRequest::get().uri("/cluster-status?name=missing"),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("missing"));
    assert!(
        client
            .calls()
            .iter()
            .all(|call| call.operation == FakeOperation::GetCustomObject)
    );
}

#[actix_web::test]
async fn transport_failure_returns_500_and_server_keeps_serving() {
    let client =
        Arc::new(web_app().failing(FakeOperation::ListServices, "connection reset by peer"));
    let app = test::init_service(App::new().app_data(state(client)).configure(configure)).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/cluster-status").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "error");
    assert!(!body["message"].as_str().unwrap().is_empty());

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/platforms").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn platforms_fall_back_to_unknown() {
    let client = web_app().with_kustomization(kustomization("infra", json!({}), json!(null)));
    let (status, body) = send(Arc::new(client), test::TestRequest::get().uri("/platforms")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "status": "success",
            "platforms": [
                {
                    "name": "web-app",
                    "targetNamespace": "web",
                    "status": "True",
                    "message": "Applied revision: main@sha1:abc"
                },
                {
                    "name": "infra",
                    "targetNamespace": "flux-system",
                    "status": "Unknown",
                    "message": ""
                }
            ]
        })
    );
}

#[actix_web::test]
async fn deploy_without_name_is_rejected() {
    let client = Arc::new(web_app());
    let (status, body) = send(
        client.clone(),
        test::TestRequest::post().uri("/deploy").set_json(json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "status": "error", "message": "Missing 'name' in request" })
    );
    assert!(client.patches().is_empty());
}

#[actix_web::test]
async fn deploy_with_empty_body_is_rejected() {
    let client = Arc::new(web_app());
    let (status, _) = send(client.clone(), test::TestRequest::post().uri("/deploy")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(client.calls().is_empty());
}

#[actix_web::test]
async fn deploy_twice_issues_two_identical_patches() {
    let client = Arc::new(web_app());
    let app = test::init_service(
        App::new()
            .app_data(state(client.clone()))
            .configure(configure),
    )
    .await;

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/deploy")
            .set_json(json!({ "name": "web-app" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "success");
        assert!(body["message"].as_str().unwrap().contains("web-app"));
    }

    let patches = client.patches();
    assert_eq!(patches.len(), 2);
    assert_eq!(patches[0], patches[1]);
    assert_eq!(
        patches[0].2,
        json!({ "spec": { "suspend": false, "force": true } })
    );
}

#[actix_web::test]
async fn deploy_surfaces_api_errors() {
    let client = Arc::new(web_app().failing(
        FakeOperation::MergePatch,
        "kustomizations.kustomize.toolkit.fluxcd.io is forbidden",
    ));
    let (status, body) = send(
        client,
        test::TestRequest::post()
            .uri("/deploy")
            .set_json(json!({ "name": "web-app" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].as_str().unwrap().contains("forbidden"));
}

#[actix_web::test]
async fn edit_sends_exactly_one_spec_patch() {
    let client = Arc::new(web_app());
    let (status, body) = send(
        client.clone(),
        test::TestRequest::post()
            .uri("/edit")
            .set_json(json!({ "name": "web-app", "patch": { "suspend": true } })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(
        client.calls(),
        vec![FakeCall::new(FakeOperation::MergePatch, "flux-system", "web-app")]
    );
    assert_eq!(
        client.patches(),
        vec![(
            "flux-system".to_string(),
            "web-app".to_string(),
            json!({ "spec": { "suspend": true } })
        )]
    );
}

#[actix_web::test]
async fn edit_requires_name_and_patch() {
    let client = Arc::new(web_app());

    let (status, body) = send(
        client.clone(),
        test::TestRequest::post()
            .uri("/edit")
            .set_json(json!({ "patch": { "suspend": true } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing 'name' in request");

    let (status, body) = send(
        client.clone(),
        test::TestRequest::post()
            .uri("/edit")
            .set_json(json!({ "name": "web-app" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing 'patch' in request");

    let (status, _) = send(
        client.clone(),
        test::TestRequest::post()
            .uri("/edit")
            .set_json(json!({ "name": "web-app", "patch": {} })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(client.patches().is_empty());
}

#[actix_web::test]
async fn edit_rejects_fields_outside_the_allow_list() {
    let client = Arc::new(web_app());
    let (status, body) = send(
        client.clone(),
        test::TestRequest::post().uri("/edit").set_json(json!({
            "name": "web-app",
            "patch": { "sourceRef": { "kind": "GitRepository", "name": "evil" } }
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "field 'sourceRef' is not patchable");
    assert!(client.patches().is_empty());
}
