//! Template management

mod common;

use common::{transloadit, ScriptedTransport};
use serde_json::{json, Map, Value};
use transloadit_client::transport::HttpMethod;

fn params(pairs: Value) -> Map<String, Value> {
    pairs.as_object().cloned().unwrap_or_default()
}

#[tokio::test]
async fn test_create_then_update_and_delete() {
    let transport = ScriptedTransport::new();
    transport.reply(200, json!({"ok": "TEMPLATE_CREATED", "id": "t1", "name": "resize"}));
    transport.reply(200, json!({"ok": "TEMPLATE_UPDATED"}));
    transport.reply(200, json!({"ok": "TEMPLATE_DELETED"}));

    let templates = transloadit(transport.clone(), Some("my-secret")).templates();
    let mut template = templates
        .create(params(json!({
            "name": "resize",
            "template": {"steps": {"resize": {"robot": "/image/resize"}}}
        })))
        .await
        .unwrap();

    assert!(template.is_created());
    assert_eq!(template.template_id(), Some("t1"));

    template
        .update(params(json!({"name": "resize-small"})))
        .await
        .unwrap();
    // The update reply carries no id; the handle still knows it
    assert_eq!(template.template_id(), Some("t1"));

    let deleted = template.delete().await.unwrap();
    assert_eq!(deleted["ok"], "TEMPLATE_DELETED");

    let requests = transport.requests();
    assert_eq!(requests[0].method, HttpMethod::Post);
    assert_eq!(requests[0].url, "https://api2.transloadit.com/templates");
    assert_eq!(requests[0].params()["name"], "resize");
    assert_eq!(requests[1].method, HttpMethod::Put);
    assert_eq!(requests[1].url, "https://api2.transloadit.com/templates/t1");
    assert_eq!(requests[2].method, HttpMethod::Delete);
    assert_eq!(requests[2].url, "https://api2.transloadit.com/templates/t1");
}

#[tokio::test]
async fn test_list_and_get() {
    let transport = ScriptedTransport::new();
    transport.reply(200, json!({"items": [{"id": "t1"}], "count": 1}));
    transport.reply(200, json!({"ok": "TEMPLATE_FOUND", "id": "t1"}));

    let templates = transloadit(transport.clone(), None).templates();
    let listed = templates.list(params(json!({"page": 1}))).await.unwrap();
    assert_eq!(listed["count"], 1);

    let template = templates.get("t1", Map::new()).await.unwrap();
    assert_eq!(template.template_id(), Some("t1"));
    assert!(!template.is_created());

    let requests = transport.requests();
    assert_eq!(requests[0].method, HttpMethod::Get);
    assert_eq!(requests[0].params()["page"], 1);
    assert_eq!(requests[1].url, "https://api2.transloadit.com/templates/t1");
}
