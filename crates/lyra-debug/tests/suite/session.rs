use std::sync::Arc;

use lyra_debug::session::serve_session;
use lyra_debug::DEBUGGER_MODULE;
use lyra_host::{HostError, MockScriptHost};
use serde_json::json;
use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio_util::sync::CancellationToken;

fn spawn_session(
    host: &Arc<MockScriptHost>,
    cancel: CancellationToken,
) -> (DuplexStream, tokio::task::JoinHandle<()>) {
    let (client, server) = duplex(4096);
    let task = tokio::spawn(serve_session(server, host.clone(), 4096, cancel));
    (client, task)
}

async fn read_ack(client: &mut DuplexStream) -> String {
    let mut buf = vec![0u8; 4096];
    let n = client.read(&mut buf).await.unwrap();
    String::from_utf8(buf[..n].to_vec()).unwrap()
}

#[tokio::test]
async fn successful_scripts_ack_with_the_rendered_value() {
    let host = Arc::new(MockScriptHost::new());
    host.push_run_result(Ok(json!(17)));
    let (mut client, task) = spawn_session(&host, CancellationToken::new());

    client.write_all(b"ldb.get_startline(7)").await.unwrap();
    assert_eq!(read_ack(&mut client).await, "OK17");

    // The payload reaches the engine untouched, addressed to the fixed
    // debugger entry module.
    let calls = host.run_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, DEBUGGER_MODULE);
    assert_eq!(calls[0].1, b"ldb.get_startline(7)".to_vec());

    drop(client);
    task.await.unwrap();
}

#[tokio::test]
async fn string_values_render_unquoted() {
    let host = Arc::new(MockScriptHost::new());
    host.push_run_result(Ok(json!("3")));
    let (mut client, task) = spawn_session(&host, CancellationToken::new());

    client.write_all(b"return '3'").await.unwrap();
    assert_eq!(read_ack(&mut client).await, "OK3");

    drop(client);
    task.await.unwrap();
}

#[tokio::test]
async fn failing_scripts_ack_failed() {
    let host = Arc::new(MockScriptHost::new());
    host.push_run_result(Err(HostError::Script("syntax error".into())));
    let (mut client, task) = spawn_session(&host, CancellationToken::new());

    client.write_all(b"not a script").await.unwrap();
    assert_eq!(read_ack(&mut client).await, "Failed");

    drop(client);
    task.await.unwrap();
}

#[tokio::test]
async fn one_ack_per_message_in_arrival_order() {
    let host = Arc::new(MockScriptHost::new());
    host.push_run_result(Ok(json!(1)));
    host.push_run_result(Ok(json!(2)));
    let (mut client, task) = spawn_session(&host, CancellationToken::new());

    client.write_all(b"first").await.unwrap();
    assert_eq!(read_ack(&mut client).await, "OK1");
    client.write_all(b"second").await.unwrap();
    assert_eq!(read_ack(&mut client).await, "OK2");

    assert_eq!(host.run_calls().len(), 2);

    drop(client);
    task.await.unwrap();
}

#[tokio::test]
async fn cancellation_ends_the_session() {
    let host = Arc::new(MockScriptHost::new());
    let cancel = CancellationToken::new();
    let (mut client, task) = spawn_session(&host, cancel.clone());

    cancel.cancel();
    task.await.unwrap();

    // The server half is gone; the client observes EOF.
    let mut buf = [0u8; 8];
    assert_eq!(client.read(&mut buf).await.unwrap(), 0);
}
