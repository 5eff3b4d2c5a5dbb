use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::integration::common::{POOL_SIZE, setup_guarded_app, setup_test_app};

fn get_jobs_request(urls: &[String]) -> Request<Body> {
    Request::post("/get_jobs")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(urls).unwrap()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn sorted_urls(json: &serde_json::Value) -> Vec<String> {
    let mut urls: Vec<String> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["url"].as_str().unwrap().to_string())
        .collect();
    urls.sort();
    urls
}

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app().await;

    let response = app
        .router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["pool_size"], POOL_SIZE);
    assert_eq!(json["schema"], "indeed");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failed_url_is_dropped_from_the_response() {
    let app = setup_test_app().await;
    let good = app.posting_url("a");
    let bad = app.posting_url("missing");

    let response = app
        .router
        .clone()
        .oneshot(get_jobs_request(&[good.clone(), bad]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-failed-urls"], "1");
    assert_eq!(
        response.headers()["content-type"],
        "application/json"
    );

    let json = json_body(response).await;
    assert_eq!(
        json,
        serde_json::json!([{
            "title": "Engineer",
            "location": "Remote",
            "company": "Acme",
            "url": good,
        }])
    );
}

#[tokio::test]
async fn empty_batch_returns_empty_array() {
    let app = setup_test_app().await;

    let response = app.router.oneshot(get_jobs_request(&[])).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-failed-urls"], "0");
    assert_eq!(json_body(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn missing_markup_gives_empty_strings() {
    let app = setup_test_app().await;
    let url = app.posting_url("partial");

    let response = app
        .router
        .clone()
        .oneshot(get_jobs_request(&[url.clone()]))
        .await
        .unwrap();

    let json = json_body(response).await;
    assert_eq!(json[0]["title"], "Partial");
    assert_eq!(json[0]["location"], "");
    assert_eq!(json[0]["company"], "");
    assert_eq!(json[0]["url"], url);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn large_batch_returns_one_record_per_url() {
    let app = setup_test_app().await;
    let mut urls: Vec<String> = (0..POOL_SIZE * 4)
        .map(|i| app.posting_url(&format!("job-{i}")))
        .collect();
    urls.push(app.posting_url("missing"));

    let response = app
        .router
        .clone()
        .oneshot(get_jobs_request(&urls))
        .await
        .unwrap();

    assert_eq!(response.headers()["x-failed-urls"], "1");
    let json = json_body(response).await;

    urls.pop();
    urls.sort();
    assert_eq!(sorted_urls(&json), urls);
}

#[tokio::test]
async fn unreachable_host_is_dropped() {
    let app = setup_test_app().await;
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead = format!("http://{}/jobs/a", listener.local_addr().unwrap());
    drop(listener);
    let good = app.posting_url("b");

    let response = app
        .router
        .clone()
        .oneshot(get_jobs_request(&[dead, good.clone()]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(sorted_urls(&json), vec![good]);
}

#[tokio::test]
async fn private_urls_are_refused_by_default() {
    let router = setup_guarded_app();

    let response = router
        .oneshot(get_jobs_request(&["http://127.0.0.1:9/jobs/a".to_string()]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-failed-urls"], "1");
    assert_eq!(json_body(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let app = setup_test_app().await;

    let response = app
        .router
        .oneshot(
            Request::post("/get_jobs")
                .header("content-type", "application/json")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_on_get_jobs_is_not_allowed() {
    let app = setup_test_app().await;

    let response = app
        .router
        .oneshot(Request::get("/get_jobs").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn openapi_document_lists_get_jobs() {
    let app = setup_test_app().await;

    let response = app
        .router
        .oneshot(
            Request::get("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert!(json["paths"]["/get_jobs"]["post"].is_object());
}
