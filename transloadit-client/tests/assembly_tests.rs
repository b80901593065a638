//! Assembly creation, retries and the assembly listing endpoints

mod common;

use common::{transloadit, ScriptedTransport};
use serde_json::{json, Map, Value};
use std::io::Write;
use std::time::Duration;
use tokio::time::Instant;
use transloadit_client::transport::HttpMethod;
use transloadit_client::{
    AssemblyOptions, AssemblyStatusExt, CancellationToken, CreateParams, Step, Steps,
    TransloaditError, Upload,
};

fn rate_limited(retry_in: u64) -> Value {
    json!({"error": "RATE_LIMIT_REACHED", "info": {"retryIn": retry_in}})
}

fn executing() -> Value {
    json!({
        "ok": "ASSEMBLY_EXECUTING",
        "assembly_id": "abc123",
        "assembly_ssl_url": "https://api2.jane.transloadit.com/assemblies/abc123"
    })
}

#[tokio::test(start_paused = true)]
async fn test_create_retries_after_rate_limits() {
    let transport = ScriptedTransport::new();
    transport.reply(413, rate_limited(5));
    transport.reply(413, rate_limited(7));
    transport.reply(200, json!({"ok": "ASSEMBLY_COMPLETED", "assembly_id": "abc123"}));

    let assembly = transloadit(transport.clone(), Some("my-secret"))
        .assembly(AssemblyOptions::new().template_id("tpl").tries(3))
        .unwrap();

    let start = Instant::now();
    let handle = assembly.create(&[]).await.unwrap();

    assert!(handle.is_completed());
    assert_eq!(handle.assembly_id(), Some("abc123"));
    assert_eq!(transport.requests().len(), 3);
    // Slept exactly the advertised retryIn values
    assert_eq!(start.elapsed(), Duration::from_secs(12));
}

#[tokio::test(start_paused = true)]
async fn test_create_single_try_raises_rate_limit() {
    let transport = ScriptedTransport::new();
    transport.reply(413, rate_limited(5));

    let assembly = transloadit(transport.clone(), None)
        .assembly(AssemblyOptions::new().tries(1))
        .unwrap();

    let start = Instant::now();
    match assembly.create(&[]).await {
        Err(TransloaditError::RateLimitReached {
            wait_time_secs,
            response,
        }) => {
            assert_eq!(wait_time_secs, 5.0);
            assert_eq!(response.status(), 413);
            assert!(response.is_rate_limited());
        }
        other => panic!("expected RateLimitReached, got {:?}", other.map(|h| h.into_response())),
    }
    assert_eq!(transport.requests().len(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_create_exhausts_tries() {
    let transport = ScriptedTransport::new();
    transport.reply(413, rate_limited(1));
    transport.reply(413, rate_limited(1));

    let assembly = transloadit(transport.clone(), None)
        .assembly(AssemblyOptions::new().tries(2))
        .unwrap();

    let result = assembly.create(&[]).await;
    assert!(matches!(result, Err(TransloaditError::RateLimitReached { .. })));
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_create_cancelled_while_waiting() {
    let transport = ScriptedTransport::new();
    transport.reply(413, rate_limited(30));

    let assembly = transloadit(transport.clone(), None)
        .assembly(AssemblyOptions::new())
        .unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = assembly
        .create_with(&[], CreateParams::default(), &cancel)
        .await;
    assert!(matches!(result, Err(TransloaditError::Cancelled)));
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_non_rate_limit_error_is_returned() {
    let transport = ScriptedTransport::new();
    transport.reply(400, json!({"error": "INVALID_FORM_DATA", "message": "bad"}));

    let handle = transloadit(transport.clone(), None)
        .assembly(AssemblyOptions::new())
        .unwrap()
        .create(&[])
        .await
        .unwrap();

    assert_eq!(handle.status(), 400);
    assert!(handle.is_error());
    assert!(handle.is_finished());
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_create_body_order() {
    let transport = ScriptedTransport::new();
    transport.reply(200, executing());

    let assembly = transloadit(transport.clone(), Some("my-secret"))
        .assembly(
            AssemblyOptions::new()
                .template_id("tpl")
                .notify_url("https://example.com/notify")
                .field("tag", "ninja-cat"),
        )
        .unwrap();

    let uploads = [
        Upload::bytes("one.jpg", &b"one"[..]),
        Upload::bytes("two.jpg", &b"two"[..]),
    ];
    let handle = assembly.create(&uploads).await.unwrap();
    assert!(handle.is_executing());

    let requests = transport.requests();
    let request = &requests[0];
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.url, "https://api2.transloadit.com/assemblies");
    assert_eq!(
        request.form_names(),
        vec!["params", "signature", "tag", "file_0", "file_1"]
    );
    assert_eq!(request.form_value("tag"), Some("ninja-cat"));
    assert_eq!(request.form_value("file_1"), Some("two.jpg"));
    assert!(request
        .form_value("signature")
        .unwrap()
        .starts_with("sha384:"));

    let params = request.params();
    assert_eq!(params["auth"]["key"], "my-key");
    assert!(params["auth"]["expires"].is_string());
    assert_eq!(params["template_id"], "tpl");
    assert_eq!(params["notify_url"], "https://example.com/notify");
    assert_eq!(params["fields"]["tag"], "ninja-cat");
}

#[tokio::test]
async fn test_path_uploads_are_reopened_per_attempt() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"frame data").unwrap();

    let transport = ScriptedTransport::new();
    transport.reply(413, rate_limited(0));
    transport.reply(200, executing());

    let assembly = transloadit(transport.clone(), None)
        .assembly(AssemblyOptions::new())
        .unwrap();

    let handle = assembly.create(&[Upload::path(file.path())]).await.unwrap();
    assert!(handle.is_executing());

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        assert_eq!(request.form_names(), vec!["params", "file_0"]);
    }
}

#[tokio::test]
async fn test_missing_upload_fails_before_sending() {
    let transport = ScriptedTransport::new();

    let assembly = transloadit(transport.clone(), None)
        .assembly(AssemblyOptions::new())
        .unwrap();

    let result = assembly
        .create(&[Upload::path("/nonexistent/transloadit/upload.jpg")])
        .await;
    assert!(matches!(result, Err(TransloaditError::Io(_))));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_steps_in_params() {
    let transport = ScriptedTransport::new();
    transport.reply(200, executing());

    let resize = Step::new("resize", "/image/resize").option("width", 70);
    let assembly = transloadit(transport.clone(), None)
        .assembly(AssemblyOptions::new().steps(resize))
        .unwrap();
    assembly.create(&[]).await.unwrap();

    let params = transport.requests()[0].params();
    assert_eq!(
        params["steps"],
        json!({"resize": {"robot": "/image/resize", "width": 70}})
    );
}

#[tokio::test]
async fn test_create_time_steps_override() {
    let transport = ScriptedTransport::new();
    transport.reply(200, executing());

    let assembly = transloadit(transport.clone(), None)
        .assembly(AssemblyOptions::new().steps(Step::new("resize", "/image/resize")))
        .unwrap();

    let overrides = CreateParams {
        steps: Some(Steps::from(Step::new("encode", "/video/encode"))),
        extra: Map::new(),
    };
    assembly
        .create_with(&[], overrides, &CancellationToken::new())
        .await
        .unwrap();

    let params = transport.requests()[0].params();
    assert_eq!(params["steps"], json!({"encode": {"robot": "/video/encode"}}));
}

#[test]
fn test_duplicate_steps_rejected_at_construction() {
    let transport = ScriptedTransport::new();
    let steps = vec![
        Step::new("thumbs", "/video/thumbs"),
        Step::new("thumbs", "/image/resize"),
    ];

    let result = transloadit(transport.clone(), None).assembly(AssemblyOptions::new().steps(steps));
    assert!(matches!(result, Err(TransloaditError::DuplicateStepName(name)) if name == "thumbs"));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_list_sends_params_in_query() {
    let transport = ScriptedTransport::new();
    transport.reply(200, json!({"items": [], "count": 0}));

    let assembly = transloadit(transport.clone(), None)
        .assembly(AssemblyOptions::new())
        .unwrap();

    let mut params = Map::new();
    params.insert("page".to_string(), json!(2));
    let response = assembly.list(params).await.unwrap();
    assert_eq!(response["count"], 0);

    let requests = transport.requests();
    let request = &requests[0];
    assert_eq!(request.method, HttpMethod::Get);
    assert_eq!(request.url, "https://api2.transloadit.com/assemblies");
    assert_eq!(
        request.query_value("params"),
        Some(r#"{"auth":{"key":"my-key"},"page":2}"#)
    );
    assert_eq!(request.query_value("signature"), None);
    assert!(request.form.is_empty());
}

#[tokio::test]
async fn test_get_assembly_by_id() {
    let transport = ScriptedTransport::new();
    transport.reply(200, executing());

    let handle = transloadit(transport.clone(), None)
        .assembly(AssemblyOptions::new())
        .unwrap()
        .get("abc123")
        .await
        .unwrap();
    assert_eq!(handle.assembly_id(), Some("abc123"));

    let requests = transport.requests();
    let request = &requests[0];
    assert_eq!(request.url, "https://api2.transloadit.com/assemblies/abc123");
    assert!(request.query.is_empty());
}

#[tokio::test]
async fn test_replay_does_not_wait() {
    let transport = ScriptedTransport::new();
    transport.reply(200, json!({"ok": "ASSEMBLY_REPLAYING", "assembly_id": "def456"}));

    let handle = transloadit(transport.clone(), None)
        .assembly(AssemblyOptions::new())
        .unwrap()
        .replay("abc123", Map::new())
        .await
        .unwrap();
    assert!(handle.is_replaying());

    let requests = transport.requests();
    let request = &requests[0];
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(
        request.url,
        "https://api2.transloadit.com/assemblies/abc123/replay"
    );
    assert_eq!(request.params()["wait"], false);
}

#[tokio::test]
async fn test_notification_endpoints() {
    let transport = ScriptedTransport::new();
    transport.reply(200, json!({"items": []}));
    transport.reply(200, json!({"ok": "ASSEMBLY_NOTIFICATION_REPLAYED"}));

    let assembly = transloadit(transport.clone(), None)
        .assembly(AssemblyOptions::new())
        .unwrap();
    assembly.notifications(Map::new()).await.unwrap();
    let replayed = assembly
        .replay_notification("abc123", Map::new())
        .await
        .unwrap();
    assert_eq!(replayed["ok"], "ASSEMBLY_NOTIFICATION_REPLAYED");

    let requests = transport.requests();
    assert_eq!(requests[0].method, HttpMethod::Get);
    assert_eq!(
        requests[0].url,
        "https://api2.transloadit.com/assembly_notifications"
    );
    assert_eq!(requests[1].method, HttpMethod::Post);
    assert_eq!(
        requests[1].url,
        "https://api2.transloadit.com/assembly_notifications/abc123/replay"
    );
}
