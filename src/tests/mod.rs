use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::refresher::{refresh, ListKind, RefreshOutcome, Refresher};
use crate::response::{self, ResponseItem};
use crate::transport::{ClientOptions, HttpListSource, ListQuery, ListSource, TransportError};
use crate::view::{MemoryPage, TableBody};

/// Serves queued bodies in order; an `Err` answers with that HTTP status.
#[derive(Default)]
struct CannedSource {
    replies: Mutex<VecDeque<Result<Value, u16>>>,
    queries: Mutex<Vec<String>>,
}

impl CannedSource {
    fn new(replies: Vec<Result<Value, u16>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            queries: Mutex::new(Vec::new()),
        }
    }

    fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl ListSource for CannedSource {
    async fn fetch(&self, query: &ListQuery) -> Result<Vec<ResponseItem>, TransportError> {
        self.queries.lock().unwrap().push(query.to_relative());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(503));
        match reply {
            Ok(body) => {
                let bytes = serde_json::to_vec(&body).unwrap();
                response::parse_list_response(&bytes).map_err(|e| TransportError::Decode {
                    url: "canned".to_string(),
                    source: e,
                })
            }
            Err(code) => Err(TransportError::Status {
                url: "canned".to_string(),
                status: reqwest::StatusCode::from_u16(code).unwrap(),
            }),
        }
    }
}

fn runtimeenvs(names: &[&str]) -> Value {
    let records: Vec<Value> = names
        .iter()
        .map(|name| {
            json!({
                "name": name,
                "description": format!("{name} runtime"),
                "resource_count": 2,
                "providers": ["dido.imada.sdu.dk", "n1.example"],
                "created": "2024-03-01",
                "viewruntimeenvlink": {"destination": format!("showre.py?re_name={name}"),
                                       "text": "view"},
                "ownerlink": {"destination": format!("deletere.py?re_name={name}"),
                              "class": "removelink", "text": "del"}
            })
        })
        .collect();
    json!({"object_type": "runtimeenvironments", "runtimeenvironments": records})
}

fn cells(row: &str) -> usize {
    row.matches("<td").count()
}

#[tokio::test]
async fn rows_follow_record_order() {
    let source = CannedSource::new(vec![Ok(json!([runtimeenvs(&["PYTHON-3", "JAVA", "R"])]))]);
    let page = MemoryPage::new();
    let outcome = refresh(&source, &page, &ListKind::RuntimeEnvs).await;

    assert_eq!(outcome, RefreshOutcome::Rendered { rows: 3, server_error: None });
    let rows = page.rows(TableBody::RuntimeEnvs);
    assert_eq!(rows.len(), 3);
    assert!(rows[0].as_str().contains("PYTHON-3"));
    assert!(rows[1].as_str().contains("JAVA"));
    assert!(rows[2].as_str().contains("<td>R</td>"));
    assert!(page.status().is_empty());
    assert!(!page.is_busy());
    assert_eq!(page.snapshot().notifications, vec![TableBody::RuntimeEnvs]);
    assert_eq!(source.queries(), vec!["?output_format=json;operation=list"]);
}

#[tokio::test]
async fn server_errors_show_without_dropping_rows() {
    let source = CannedSource::new(vec![Ok(json!([
        {"object_type": "error_text", "text": "Quota nearly exhausted."},
        runtimeenvs(&["A", "B"]),
        {"object_type": "error_text", "text": "Retry later."}
    ]))]);
    let page = MemoryPage::new();
    let outcome = refresh(&source, &page, &ListKind::RuntimeEnvs).await;

    assert_eq!(outcome.rows(), 2);
    assert_eq!(outcome.error(), Some("Quota nearly exhausted.Retry later."));
    assert_eq!(page.rows(TableBody::RuntimeEnvs).len(), 2);
    assert_eq!(
        page.status(),
        "<span class='errortext'>Error: Quota nearly exhausted.Retry later.</span>"
    );
}

#[tokio::test]
async fn malformed_link_keeps_its_row_and_server_errors() {
    let mut listing = runtimeenvs(&["GOOD", "BAD"]);
    listing["runtimeenvironments"][1]["ownerlink"] = json!({"text": "del"});
    let source = CannedSource::new(vec![Ok(json!([
        {"object_type": "error_text", "text": "Quota nearly exhausted."},
        listing
    ]))]);
    let page = MemoryPage::new();
    let outcome = refresh(&source, &page, &ListKind::RuntimeEnvs).await;

    assert_eq!(
        outcome,
        RefreshOutcome::Rendered {
            rows: 2,
            server_error: Some("Quota nearly exhausted.".to_string()),
        }
    );
    let rows = page.rows(TableBody::RuntimeEnvs);
    assert!(rows[0].as_str().contains("deletere.py?re_name=GOOD"));
    assert!(rows[1].as_str().contains("BAD"));
    assert!(!rows[1].as_str().contains("deletere.py"));
    assert_eq!(cells(rows[0].as_str()), cells(rows[1].as_str()));
    assert!(page.status().contains("Quota nearly exhausted."));
}

#[tokio::test]
async fn unknown_vgrid_key_is_spaced_from_server_text() {
    let source = CannedSource::new(vec![Ok(json!([
        {"object_type": "error_text", "text": "Partial listing."},
        {"object_type": "vgrid_list", "vgrids": [{"name": "A"}]}
    ]))]);
    let page = MemoryPage::new();
    let kind = ListKind::Vgrids {
        label: "VGrid".to_string(),
        links: vec!["wiki".to_string()],
    };
    let outcome = refresh(&source, &page, &kind).await;

    assert_eq!(
        outcome.error(),
        Some("Partial listing. unknown vgrid link: wiki")
    );
}

#[tokio::test]
async fn archive_detail_fills_both_tables_and_spaces_errors() {
    let source = CannedSource::new(vec![Ok(json!([
        {"object_type": "error_text", "text": "first"},
        {"object_type": "frozenarchive", "id": "archive-x1", "name": "Results",
         "description": "final data", "publish": false, "creator": "alice",
         "created": "2024-01-02",
         "frozenfiles": [
            {"name": "a.txt", "size": 12, "md5sum": "abc"},
            {"name": "b.txt", "size": 7, "md5sum": "def"}
         ]},
        {"object_type": "error_text", "text": "second"}
    ]))]);
    let page = MemoryPage::new();
    let kind = ListKind::ArchiveDetail {
        freeze_id: "archive-x1".to_string(),
        checksum: "md5".to_string(),
    };
    let outcome = refresh(&source, &page, &kind).await;

    assert_eq!(outcome.rows(), 2);
    assert_eq!(outcome.error(), Some(" first second"));
    assert_eq!(page.rows(TableBody::ArchiveFiles).len(), 2);
    assert!(page.rows(TableBody::ArchiveDetails).len() >= 6);
    assert_eq!(page.snapshot().notifications, vec![TableBody::ArchiveFiles]);
    assert_eq!(
        source.queries(),
        vec!["?freeze_id=archive-x1;checksum=md5;output_format=json;operation=list"]
    );
}

#[tokio::test]
async fn missing_link_keeps_cell_count() {
    let source = CannedSource::new(vec![Ok(json!([{
        "object_type": "resource_list",
        "resources": [
            {"name": "full.example.org", "SANDBOX": false,
             "resdetailslink": {"destination": "viewres.py?unique_resource_name=full"},
             "resownerlink": {"destination": "javascript: rmresowner0();"},
             "NODECOUNT": 4, "CPUCOUNT": 8, "MEMORY": 1024, "DISK": 100,
             "ARCHITECTURE": "X86"},
            {"name": "bare.example.org", "SANDBOX": true}
        ]
    }]))]);
    let page = MemoryPage::new();
    refresh(&source, &page, &ListKind::Resources).await;

    let rows = page.rows(TableBody::Resources);
    assert_eq!(rows.len(), 2);
    assert_eq!(cells(rows[0].as_str()), cells(rows[1].as_str()));
    assert!(rows[1].as_str().contains("sandboxres"));
}

#[tokio::test]
async fn vgrid_columns_follow_configured_keys() {
    let source = CannedSource::new(vec![Ok(json!([{
        "object_type": "vgrid_list",
        "components": ["files", "web", "scm", "tracker", "forum", "workflows", "monitor"],
        "vgrids": [{
            "name": "Physics",
            "viewvgridlink": {"destination": "viewvgrid.py?vgrid_name=Physics"},
            "sharedfolderlink": {"destination": "fileman.py?path=vgrid_shared/Physics/",
                                 "text": "files"},
            "privatemonitorlink": {"destination": "showvgridmonitor.py?vgrid_name=Physics",
                                   "text": "monitor"},
            "enterpubliclink": {"destination": "/vgrid/Physics/path/index.html",
                                "text": "web"}
        }]
    }]))]);
    let page = MemoryPage::new();
    let kind = ListKind::Vgrids {
        label: "VGrid".to_string(),
        links: vec!["files".to_string(), "monitor".to_string()],
    };
    refresh(&source, &page, &kind).await;

    let rows = page.rows(TableBody::Vgrids);
    assert_eq!(rows.len(), 1);
    let row = rows[0].as_str();
    let files = row.find("fileman.py").unwrap();
    let monitor = row.find("showvgridmonitor.py").unwrap();
    assert!(files < monitor);
    assert!(!row.contains("/vgrid/Physics/path/"));
    // name, view, admin and member cells, then one per configured key
    assert_eq!(cells(row), 6);
}

#[tokio::test]
async fn vgrid_columns_fall_back_to_backend_components() {
    let body = json!([{
        "object_type": "vgrid_list",
        "components": ["files", "monitor"],
        "vgrids": [{"name": "Physics"}, {"name": "Chemistry"}]
    }]);
    let source = CannedSource::new(vec![Ok(body.clone()), Ok(body)]);
    let fallback = MemoryPage::new();
    let explicit = MemoryPage::new();
    let no_links = ListKind::Vgrids {
        label: "Workgroup".to_string(),
        links: vec![],
    };
    let with_links = ListKind::Vgrids {
        label: "Workgroup".to_string(),
        links: vec!["files".to_string(), "monitor".to_string()],
    };
    refresh(&source, &fallback, &no_links).await;
    refresh(&source, &explicit, &with_links).await;

    assert_eq!(fallback.rows(TableBody::Vgrids), explicit.rows(TableBody::Vgrids));
}

#[tokio::test]
async fn unknown_vgrid_key_is_reported_once() {
    let source = CannedSource::new(vec![Ok(json!([{
        "object_type": "vgrid_list",
        "vgrids": [{"name": "A"}, {"name": "B"}]
    }]))]);
    let page = MemoryPage::new();
    let kind = ListKind::Vgrids {
        label: "VGrid".to_string(),
        links: vec!["files".to_string(), "wiki".to_string()],
    };
    let outcome = refresh(&source, &page, &kind).await;

    assert_eq!(outcome.rows(), 2);
    let error = outcome.error().unwrap();
    assert_eq!(error.matches("wiki").count(), 1);
    assert_eq!(page.rows(TableBody::Vgrids).len(), 2);
}

#[tokio::test]
async fn people_show_placeholder_for_missing_protocol() {
    let source = CannedSource::new(vec![Ok(json!([{
        "object_type": "user_list",
        "users": [{
            "name": "alice",
            "userdetailslink": {"destination": "viewuser.py?cert_id=alice"},
            "sendemaillink": {"destination": "javascript: confirmDialog(sendemail0);",
                              "class": "sendemaillink", "text": "email"}
        }]
    }]))]);
    let page = MemoryPage::new();
    let kind = ListKind::People {
        protocols: vec!["email".to_string(), "sms".to_string()],
    };
    refresh(&source, &page, &kind).await;

    let rows = page.rows(TableBody::Users);
    let row = rows[0].as_str();
    let email = row.find("confirmDialog(sendemail0)").unwrap();
    let placeholder = row.find(">---<").unwrap();
    assert!(email < placeholder);
    assert_eq!(cells(row), 4);
}

#[tokio::test]
async fn helpers_are_injected_only_when_they_match() {
    let source = CannedSource::new(vec![Ok(json!([
        {"object_type": "html_form",
         "text": "<script>function delete0() { confirmDialog(); }</script>"},
        {"object_type": "html_form", "text": "<p>unrelated</p>"},
        {"object_type": "action_helper", "name": "delete1",
         "script": "<script>function delete1() {}</script>"},
        {"object_type": "action_helper", "name": "rmvgridowner0",
         "script": "<script>function rmvgridowner0() {}</script>"},
        {"object_type": "frozenarchives", "frozenarchives": []}
    ]))]);
    let page = MemoryPage::new();
    let outcome = refresh(&source, &page, &ListKind::Archives { permanent_freeze: false }).await;

    assert_eq!(outcome.rows(), 0);
    let helpers = page.snapshot().helpers;
    assert_eq!(helpers.len(), 2);
    assert_eq!(helpers[0].name, None);
    assert_eq!(helpers[1].name.as_deref(), Some("delete1"));
}

#[tokio::test]
async fn transport_failure_then_retry_repopulates() {
    let source = Arc::new(CannedSource::new(vec![
        Ok(json!([runtimeenvs(&["OLD"])])),
        Err(502),
        Ok(json!([runtimeenvs(&["A", "B"])])),
    ]));
    let page = Arc::new(MemoryPage::new());
    let refresher = Refresher::new(Arc::clone(&source), Arc::clone(&page));

    refresher.refresh(&ListKind::RuntimeEnvs).await;
    assert_eq!(page.rows(TableBody::RuntimeEnvs).len(), 1);

    let failed = refresher.refresh(&ListKind::RuntimeEnvs).await;
    assert!(matches!(failed, RefreshOutcome::Failed { .. }));
    assert!(page.rows(TableBody::RuntimeEnvs).is_empty());
    assert!(!page.is_busy());
    assert!(page.status().contains("errortext"));
    assert!(page.status().contains("502"));
    assert_eq!(page.snapshot().notifications.len(), 1);

    let retried = refresher.spawn(ListKind::RuntimeEnvs).await.unwrap();
    assert_eq!(retried.rows(), 2);
    assert_eq!(page.rows(TableBody::RuntimeEnvs).len(), 2);
    assert!(page.status().is_empty());
}

fn proxy_env_set() -> bool {
    ["http_proxy", "HTTP_PROXY", "all_proxy", "ALL_PROXY"]
        .iter()
        .any(|key| std::env::var_os(key).is_some())
}

async fn answer(stream: &mut tokio::net::TcpStream, status: &str, body: &str) {
    let mut buf = vec![0u8; 4096];
    let mut seen = Vec::new();
    while !seen.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        seen.extend_from_slice(&buf[..n]);
    }
    let reply = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(reply.as_bytes()).await.unwrap();
    stream.shutdown().await.ok();
}

#[tokio::test]
async fn http_source_recovers_after_server_error() {
    if proxy_env_set() {
        return;
    }
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let body = serde_json::to_string(&json!([runtimeenvs(&["PYTHON-3"])])).unwrap();
    let server = tokio::spawn(async move {
        let (mut first, _) = listener.accept().await.unwrap();
        answer(&mut first, "500 Internal Server Error", "").await;
        let (mut second, _) = listener.accept().await.unwrap();
        answer(&mut second, "200 OK", &body).await;
    });

    let source = HttpListSource::new(&ClientOptions {
        page_url: format!("http://{addr}/cgi-bin/redb.py"),
        timeout_seconds: 5,
        ..ClientOptions::default()
    })
    .unwrap();
    let page = Arc::new(MemoryPage::new());
    let refresher = Refresher::new(Arc::new(source), Arc::clone(&page));

    let failed = refresher.refresh(&ListKind::RuntimeEnvs).await;
    assert!(matches!(failed, RefreshOutcome::Failed { ref reason } if reason.contains("500")));
    assert!(page.rows(TableBody::RuntimeEnvs).is_empty());

    let ok = refresher.refresh(&ListKind::RuntimeEnvs).await;
    assert_eq!(ok.rows(), 1);
    assert!(page.rows(TableBody::RuntimeEnvs)[0]
        .as_str()
        .contains("PYTHON-3"));

    server.await.unwrap();
}
