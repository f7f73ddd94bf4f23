//! End-to-end scenarios driving the full path: TCP publisher → request
//! intake → dispatcher → store → audit file.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tempfile::NamedTempFile;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use item_registry::client::{Requester, TcpPublisher};
use item_registry::common::messages::{OperationKind, Request};
use item_registry::server::{ClientStore, Dispatcher, Recorder, StoreService, TcpQueue};

struct TestServer {
    address: String,
    store: Arc<ClientStore>,
    audit: NamedTempFile,
    shutdown: CancellationToken,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    async fn start() -> Self {
        let queue = TcpQueue::bind("127.0.0.1:0").await.unwrap();
        let address = queue.local_addr().unwrap().to_string();

        let audit = NamedTempFile::new().unwrap();
        let writer = tokio::fs::File::create(audit.path()).await.unwrap();

        let store = Arc::new(ClientStore::new());
        let service = Arc::new(StoreService::new(
            Arc::clone(&store),
            Recorder::new(writer),
        ));

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn({
            let shutdown = shutdown.clone();
            async move { Dispatcher::new(service).run(queue, shutdown).await }
        });

        TestServer {
            address,
            store,
            audit,
            shutdown,
            handle,
        }
    }

    async fn publish(&self, client_id: Uuid, kind: &str, value: Option<&str>) {
        let publisher = TcpPublisher::connect(&self.address).await.unwrap();
        let request = Request {
            client_id,
            value: value.map(str::to_string),
            request_type: kind.to_string(),
        };
        Requester::new(publisher).request(&request).await.unwrap();
    }

    /// Wait until the audit file holds `count` lines, then return them.
    async fn wait_for_audit_lines(&self, count: usize) -> Vec<String> {
        for _ in 0..100 {
            let lines = audit_lines(self.audit.path());
            if lines.len() >= count {
                return lines;
            }
            sleep(Duration::from_millis(20)).await;
        }
        panic!(
            "audit file never reached {} line(s): {:?}",
            count,
            audit_lines(self.audit.path())
        );
    }

    async fn stop(self) -> (Arc<ClientStore>, Vec<String>) {
        self.shutdown.cancel();
        self.handle.await.unwrap().unwrap();
        let lines = audit_lines(self.audit.path());
        (self.store, lines)
    }
}

fn audit_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn add_add_list_reports_both_values_in_order() {
    let server = TestServer::start().await;
    let client_id = Uuid::new_v4();

    server
        .publish(client_id, OperationKind::Add.as_str(), Some("x"))
        .await;
    server.wait_for_audit_lines(1).await;

    server
        .publish(client_id, OperationKind::Add.as_str(), Some("y"))
        .await;
    server.wait_for_audit_lines(2).await;

    server
        .publish(client_id, OperationKind::ListAll.as_str(), None)
        .await;
    let lines = server.wait_for_audit_lines(3).await;

    assert!(lines[2].contains("request type: 'GetAllItems'"));
    assert!(lines[2].ends_with("current state: '[\"x\", \"y\"]'"));

    let (store, _) = server.stop().await;
    assert_eq!(store.snapshot(client_id).await, ["x", "y"]);
}

#[tokio::test]
async fn add_remove_list_reports_empty_state() {
    let server = TestServer::start().await;
    let client_id = Uuid::new_v4();

    server
        .publish(client_id, OperationKind::Add.as_str(), Some("x"))
        .await;
    server.wait_for_audit_lines(1).await;

    server
        .publish(client_id, OperationKind::Remove.as_str(), Some("x"))
        .await;
    server.wait_for_audit_lines(2).await;

    server
        .publish(client_id, OperationKind::ListAll.as_str(), None)
        .await;
    let lines = server.wait_for_audit_lines(3).await;

    assert!(lines[2].ends_with("current state: '[]'"));

    let (store, _) = server.stop().await;
    assert!(store.snapshot(client_id).await.is_empty());
}

#[tokio::test]
async fn unrecognized_request_type_leaves_no_trace() {
    let server = TestServer::start().await;
    let client_id = Uuid::new_v4();

    server.publish(client_id, "Foo", Some("x")).await;

    // A recorded operation afterwards proves the bad one was processed and
    // dropped rather than still in flight.
    server
        .publish(client_id, OperationKind::ListAll.as_str(), None)
        .await;
    let lines = server.wait_for_audit_lines(1).await;

    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("request type: 'GetAllItems'"));

    let (store, lines) = server.stop().await;
    assert_eq!(lines.len(), 1);
    assert!(store.snapshot(client_id).await.is_empty());
}

#[tokio::test]
async fn remove_without_prior_add_records_nothing() {
    let server = TestServer::start().await;
    let client_id = Uuid::new_v4();

    server
        .publish(client_id, OperationKind::Remove.as_str(), Some("z"))
        .await;

    server
        .publish(client_id, OperationKind::ListAll.as_str(), None)
        .await;
    let lines = server.wait_for_audit_lines(1).await;

    // Only the ListAll line exists, and it shows untouched (empty) state.
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("current state: '[]'"));

    let (store, _) = server.stop().await;
    assert!(store.snapshot(client_id).await.is_empty());
}

#[tokio::test]
async fn several_clients_interleave_without_corruption() {
    let server = TestServer::start().await;
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    // Alternate between the clients; in-flight operations carry no ordering
    // guarantee, so wait each one out before publishing the next.
    let schedule = [
        (alice, "a1"),
        (bob, "b1"),
        (alice, "a2"),
        (bob, "b2"),
        (alice, "a3"),
    ];
    for (published, (client, value)) in schedule.into_iter().enumerate() {
        server
            .publish(client, OperationKind::Add.as_str(), Some(value))
            .await;
        server.wait_for_audit_lines(published + 1).await;
    }

    let (store, _) = server.stop().await;
    assert_eq!(store.snapshot(alice).await, ["a1", "a2", "a3"]);
    assert_eq!(store.snapshot(bob).await, ["b1", "b2"]);
}
