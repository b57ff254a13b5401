use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serial_test::serial;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio_util::codec::Framed;

use rustdis_async::codec::FrameCodec;
use rustdis_async::tcp::{Config, TcpClient};
use rustdis_async::{Commands, Error, Expiration, Forwarder, Frame};

enum Action {
    Reply(Frame),
    ReplyAndClose(Frame),
    Close,
    Ignore,
}

/// Just enough of a Redis server: transactions, a failing INCR, and a few commands that
/// misbehave on purpose.
#[derive(Default)]
struct FakeServer {
    queued: Option<Vec<Vec<Bytes>>>,
    discard: bool,
}

impl FakeServer {
    fn handle(&mut self, cmd: Vec<Bytes>) -> Action {
        let name = String::from_utf8_lossy(&cmd[0]).to_uppercase();

        if self.queued.is_some() {
            return match name.as_str() {
                "EXEC" => {
                    let queued = self.queued.take().unwrap();
                    if std::mem::take(&mut self.discard) {
                        Action::Reply(Frame::Error(
                            "EXECABORT Transaction discarded because of previous errors."
                                .to_string(),
                        ))
                    } else if queued.iter().any(|cmd| cmd[0] == "SPOIL") {
                        Action::Reply(Frame::Null)
                    } else {
                        Action::Reply(Frame::Array(queued.iter().map(|cmd| execute(cmd)).collect()))
                    }
                }
                "NOPE" => {
                    self.discard = true;
                    Action::Reply(Frame::Error("ERR unknown command 'NOPE'".to_string()))
                }
                _ => {
                    self.queued.as_mut().unwrap().push(cmd);
                    Action::Reply(Frame::Simple("QUEUED".to_string()))
                }
            };
        }

        match name.as_str() {
            "MULTI" => {
                self.queued = Some(Vec::new());
                Action::Reply(Frame::ok())
            }
            "QUIT" => Action::ReplyAndClose(Frame::ok()),
            "CLOSE" => Action::Close,
            "HANG" => Action::Ignore,
            _ => Action::Reply(execute(&cmd)),
        }
    }
}

fn execute(cmd: &[Bytes]) -> Frame {
    match String::from_utf8_lossy(&cmd[0]).to_uppercase().as_str() {
        "PING" => Frame::Simple("PONG".to_string()),
        "ECHO" | "GET" => Frame::Bulk(cmd[1].clone()),
        "INCR" => Frame::Error("ERR value is not an integer or out of range".to_string()),
        "AUTH" if cmd.last().unwrap() != "secret" => Frame::Error(
            "WRONGPASS invalid username-password pair or user is disabled.".to_string(),
        ),
        "EXISTS" => Frame::Integer(0),
        _ => Frame::ok(),
    }
}

fn parts(frame: Frame) -> Vec<Bytes> {
    match frame {
        Frame::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Frame::Bulk(bytes) => bytes,
                other => panic!("expected a bulk string, got {:?}", other),
            })
            .collect(),
        other => panic!("expected a command array, got {:?}", other),
    }
}

/// Starts a fake server for a single connection. Every command it receives is also sent
/// through the returned channel.
async fn start_server() -> (Config, mpsc::UnboundedReceiver<Vec<Bytes>>) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let Ok((socket, _)) = listener.accept().await else {
            return;
        };
        let mut framed = Framed::new(socket, FrameCodec::default());
        let mut server = FakeServer::default();

        while let Some(Ok(frame)) = framed.next().await {
            let cmd = parts(frame);
            let _ = tx.send(cmd.clone());

            match server.handle(cmd) {
                Action::Reply(frame) => {
                    if framed.send(frame).await.is_err() {
                        break;
                    }
                }
                Action::ReplyAndClose(frame) => {
                    let _ = framed.send(frame).await;
                    break;
                }
                Action::Close => break,
                Action::Ignore => {}
            }
        }
    });

    let config = Config {
        port,
        ..Config::default()
    };
    (config, rx)
}

async fn connect() -> Forwarder<TcpClient> {
    let (config, _) = start_server().await;
    Forwarder::new(TcpClient::connect(config).await.unwrap())
}

fn strings(cmd: &[Bytes]) -> Vec<String> {
    cmd.iter()
        .map(|part| String::from_utf8_lossy(part).into_owned())
        .collect()
}

#[tokio::test]
async fn test_command_encoding_matches_redis_crate() {
    let expected = redis::cmd("SET")
        .arg("key")
        .arg("va lue")
        .arg("EX")
        .arg(10)
        .get_packed_command();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = oneshot::channel();
    let len = expected.len();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = vec![0; len];
        socket.read_exact(&mut received).await.unwrap();
        socket.write_all(b"+OK\r\n").await.unwrap();
        tx.send(received).unwrap();
    });

    let config = Config {
        port,
        ..Config::default()
    };
    let redis = Forwarder::new(TcpClient::connect(config).await.unwrap());

    let reply = redis.set("key", "va lue", Expiration::Ex(10)).await.unwrap();

    assert_eq!(reply, Frame::ok());
    assert_eq!(rx.await.unwrap(), expected);
}

#[tokio::test]
async fn test_pipelined_replies_arrive_in_order() {
    let redis = connect().await;

    let (a, incr, b, ping) = tokio::join!(
        redis.echo("a"),
        redis.incr("x"),
        redis.echo("b"),
        redis.ping(())
    );

    assert_eq!(a.unwrap(), Frame::Bulk(Bytes::from("a")));
    assert_eq!(
        incr.unwrap_err().detail(),
        Some("ERR value is not an integer or out of range")
    );
    assert_eq!(b.unwrap(), Frame::Bulk(Bytes::from("b")));
    assert_eq!(ping.unwrap(), Frame::Simple("PONG".to_string()));
}

#[tokio::test]
async fn test_binary_safe_arguments() {
    let redis = connect().await;
    let payload = Bytes::from_static(b"line\r\nbreak\0");

    let reply = redis.echo(payload.clone()).await.unwrap();

    assert_eq!(reply, Frame::Bulk(payload));
}

#[tokio::test]
async fn test_pipeline_keeps_failures_in_position() {
    let redis = connect().await;

    let mut batch = redis.batch();
    batch.echo("one").incr("two").echo("three");

    let replies = redis.exec(batch).await.unwrap();

    assert_eq!(replies.len(), 3);
    assert_eq!(replies[0].as_ref().unwrap(), &Frame::Bulk(Bytes::from("one")));
    assert!(matches!(&replies[1], Err(Error::Reply(_))));
    assert_eq!(
        replies[2].as_ref().unwrap(),
        &Frame::Bulk(Bytes::from("three"))
    );
}

#[tokio::test]
async fn test_empty_pipeline() {
    let redis = connect().await;

    let replies = redis.exec(redis.batch()).await.unwrap();

    assert!(replies.is_empty());
}

#[tokio::test]
async fn test_transaction() {
    let (config, mut seen) = start_server().await;
    let redis = Forwarder::new(TcpClient::connect(config).await.unwrap());

    let mut tx = redis.multi();
    tx.echo("a").incr("b").echo("c");

    let replies = redis.exec(tx).await.unwrap();

    assert_eq!(replies.len(), 3);
    assert_eq!(replies[0].as_ref().unwrap(), &Frame::Bulk(Bytes::from("a")));
    assert!(replies[1].is_err());
    assert_eq!(replies[2].as_ref().unwrap(), &Frame::Bulk(Bytes::from("c")));

    let mut names = Vec::new();
    while let Ok(cmd) = seen.try_recv() {
        names.push(String::from_utf8_lossy(&cmd[0]).into_owned());
    }
    assert_eq!(names, ["MULTI", "ECHO", "INCR", "ECHO", "EXEC"]);
}

#[tokio::test]
async fn test_transaction_discarded_at_queue_time() {
    let redis = connect().await;

    let mut tx = redis.multi();
    tx.echo("a").call("NOPE", ()).echo("c");

    let err = redis.exec(tx).await.unwrap_err();

    assert!(err.detail().unwrap().starts_with("EXECABORT"));

    // The connection stays usable.
    assert_eq!(redis.ping(()).await.unwrap(), Frame::Simple("PONG".to_string()));
}

#[tokio::test]
async fn test_transaction_aborted_by_watch() {
    let redis = connect().await;

    let mut tx = redis.multi();
    tx.call("SPOIL", ()).echo("a");

    let err = redis.exec(tx).await.unwrap_err();

    assert!(matches!(err, Error::TransactionAborted));
}

#[tokio::test]
async fn test_disconnect_fails_in_flight_requests() {
    let redis = connect().await;

    let earlier = redis.get("k");
    let err = redis.forward("CLOSE", Vec::new()).await.unwrap_err();

    assert!(matches!(err, Error::ConnectionClosed));
    assert_eq!(earlier.await.unwrap(), Frame::Bulk(Bytes::from("k")));
    assert!(matches!(
        redis.get("k").await.unwrap_err(),
        Error::ConnectionClosed
    ));
}

#[tokio::test]
async fn test_quit() {
    let redis = connect().await;

    assert_eq!(redis.quit().await.unwrap(), Frame::ok());
    assert!(matches!(
        redis.ping(()).await.unwrap_err(),
        Error::ConnectionClosed
    ));
}

#[tokio::test]
async fn test_end_fails_unanswered_requests() {
    let redis = connect().await;

    let hanging = redis.forward("HANG", Vec::new());
    redis.end();

    assert!(matches!(hanging.await.unwrap_err(), Error::ConnectionClosed));
}

#[tokio::test]
async fn test_handshake_authenticates_and_selects() {
    let (config, mut seen) = start_server().await;
    let config = Config {
        username: Some("app".to_string()),
        password: Some("secret".to_string()),
        db: 3,
        ..config
    };

    let redis = Forwarder::new(TcpClient::connect(config).await.unwrap());
    redis.ping(()).await.unwrap();

    assert_eq!(strings(&seen.recv().await.unwrap()), ["AUTH", "app", "secret"]);
    assert_eq!(strings(&seen.recv().await.unwrap()), ["SELECT", "3"]);
    assert_eq!(strings(&seen.recv().await.unwrap()), ["PING"]);
}

#[tokio::test]
async fn test_handshake_rejects_wrong_password() {
    let (config, _) = start_server().await;
    let config = Config {
        password: Some("guess".to_string()),
        ..config
    };

    let err = TcpClient::connect(config).await.unwrap_err();

    assert!(err.detail().unwrap().starts_with("WRONGPASS"));
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = Config {
        port,
        ..Config::default()
    };

    assert!(matches!(
        TcpClient::connect(config).await.unwrap_err(),
        Error::Io(_)
    ));
}

fn random_key() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();
    format!("rustdis-async:{}", suffix)
}

async fn live() -> (Forwarder<TcpClient>, redis::aio::MultiplexedConnection) {
    let config: Config = "redis://127.0.0.1:6379".parse().unwrap();
    let ours = Forwarder::new(TcpClient::connect(config).await.unwrap());

    let reference = redis::Client::open("redis://127.0.0.1:6379/")
        .unwrap()
        .get_multiplexed_async_connection()
        .await
        .unwrap();

    (ours, reference)
}

#[tokio::test]
#[serial]
#[ignore = "needs a Redis server on 127.0.0.1:6379"]
async fn test_live_set_get_and_exists() {
    use redis::AsyncCommands;

    let (redis, mut reference) = live().await;
    let key = random_key();

    assert_eq!(redis.set(&key, "v", ()).await.unwrap(), Frame::ok());
    assert_eq!(
        redis.get(&key).await.unwrap(),
        Frame::Bulk(Bytes::from("v"))
    );
    assert_eq!(
        redis.exists(["missing-key"]).await.unwrap(),
        Frame::Integer(0)
    );

    let value: String = reference.get(&key).await.unwrap();
    assert_eq!(value, "v");

    redis.del([&key]).await.unwrap();
}

#[tokio::test]
#[serial]
#[ignore = "needs a Redis server on 127.0.0.1:6379"]
async fn test_live_errors_match_reference_client() {
    use redis::AsyncCommands;

    let (redis, mut reference) = live().await;
    let key = random_key();

    let _: () = reference.set(&key, "not a number").await.unwrap();

    let ours = redis.incr(&key).await.unwrap_err();
    let theirs: redis::RedisResult<i64> = reference.incr(&key, 1).await;

    assert_eq!(ours.detail(), Some("ERR value is not an integer or out of range"));
    assert!(theirs.is_err());

    let mut batch = redis.batch();
    batch.set(&key, "1", ()).incr(&key).get(&key);
    let replies = redis.exec(batch).await.unwrap();
    assert_eq!(replies[1].as_ref().unwrap(), &Frame::Integer(2));
    assert_eq!(
        replies[2].as_ref().unwrap(),
        &Frame::Bulk(Bytes::from("2"))
    );

    redis.del([&key]).await.unwrap();
}
