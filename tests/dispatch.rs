//! Dispatch loop: handler fan-out, ordering, and the sender handed to
//! handlers.

mod common;

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;

use slircx::{
    Client, ClientError, Config, Handler, HandlerResult, Message, Sender,
};

use common::server::TestServer;

/// PING responder used by most tests here.
fn register_pong(client: &mut Client) {
    client.register_fn("PING", |sender, message| async move {
        let token = message.trailing.clone().unwrap_or_default();
        sender.send(&Message::pong(token)).await?;
        Ok(())
    });
}

#[tokio::test]
async fn test_handler_replies_through_queue() -> anyhow::Result<()> {
    let server = TestServer::bind().await?;
    let mut client = Client::new(Config::new(server.addr(), "test-bot"));
    register_pong(&mut client);
    client.connect().await?;
    let handle = tokio::spawn(async move { client.run().await });

    let mut conn = server.accept().await?;
    conn.recv_handshake(false).await?;
    conn.send_raw("PING :12345").await?;
    assert_eq!(conn.recv_line().await?, "PONG :12345\r\n");

    // Server-side close with reconnect disabled is a planned shutdown.
    drop(conn);
    handle.await??;
    Ok(())
}

#[tokio::test]
async fn test_handlers_issued_in_registration_order() -> anyhow::Result<()> {
    let server = TestServer::bind().await?;
    let mut client = Client::new(
        Config::new(server.addr(), "test-bot").with_handler_concurrency(1),
    );

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<&'static str>();
    let tx_first = tx.clone();
    client.register_fn("PRIVMSG", move |_sender, _message| {
        let tx = tx_first.clone();
        async move {
            tx.send("first").unwrap();
            Ok(())
        }
    });
    // Lower-case key on purpose; lookups are case-insensitive.
    let tx_second = tx;
    client.register_fn("privmsg", move |_sender, _message| {
        let tx = tx_second.clone();
        async move {
            tx.send("second").unwrap();
            Ok(())
        }
    });

    client.connect().await?;
    let handle = tokio::spawn(async move { client.run().await });

    let mut conn = server.accept().await?;
    conn.recv_handshake(false).await?;
    conn.send_raw("PRIVMSG #test :hello").await?;

    let first = timeout(Duration::from_secs(5), rx.recv()).await?.unwrap();
    let second = timeout(Duration::from_secs(5), rx.recv()).await?.unwrap();
    assert_eq!((first, second), ("first", "second"));

    drop(conn);
    handle.await??;
    Ok(())
}

#[tokio::test]
async fn test_unhandled_command_is_dropped() -> anyhow::Result<()> {
    let server = TestServer::bind().await?;
    let mut client = Client::new(Config::new(server.addr(), "test-bot"));
    register_pong(&mut client);
    client.connect().await?;
    let handle = tokio::spawn(async move { client.run().await });

    let mut conn = server.accept().await?;
    conn.recv_handshake(false).await?;
    // Nothing is registered for WHISPER; the loop must carry on to the
    // PING behind it.
    conn.send_raw("WHISPER :nobody listens").await?;
    conn.send_raw("PING :after").await?;
    assert_eq!(conn.recv_line().await?, "PONG :after\r\n");

    drop(conn);
    handle.await??;
    Ok(())
}

struct EchoHandler;

#[async_trait]
impl Handler for EchoHandler {
    async fn handle(&self, sender: Sender, message: Message) -> HandlerResult {
        let text = message.trailing.clone().unwrap_or_default();
        sender.send(&Message::notice("#echo", text)).await?;
        Ok(())
    }
}

#[tokio::test]
async fn test_named_handler_object() -> anyhow::Result<()> {
    let server = TestServer::bind().await?;
    let mut client = Client::new(Config::new(server.addr(), "test-bot"));
    client.register("PRIVMSG", EchoHandler);
    client.connect().await?;
    let handle = tokio::spawn(async move { client.run().await });

    let mut conn = server.accept().await?;
    conn.recv_handshake(false).await?;
    conn.send_raw("PRIVMSG #echo :bounce").await?;
    assert_eq!(conn.recv_line().await?, "NOTICE #echo :bounce\r\n");

    drop(conn);
    handle.await??;
    Ok(())
}

#[tokio::test]
async fn test_handler_gets_live_sender_after_reconnect() -> anyhow::Result<()> {
    let server = TestServer::bind().await?;
    let mut client = Client::new(Config::new(server.addr(), "test-bot").with_max_retries(2));
    register_pong(&mut client);
    client.connect().await?;
    let handle = tokio::spawn(async move { client.run().await });

    let mut conn = server.accept().await?;
    conn.recv_handshake(false).await?;
    drop(conn);

    // After the reconnect, replies must land on the new transport.
    let mut conn = server.accept().await?;
    conn.recv_handshake(false).await?;
    conn.send_raw("PING :alive").await?;
    assert_eq!(conn.recv_line().await?, "PONG :alive\r\n");

    drop(server);
    drop(conn);
    let result = handle.await?;
    assert!(matches!(
        result,
        Err(ClientError::TooManyReconnects { attempts: 2 })
    ));
    Ok(())
}
