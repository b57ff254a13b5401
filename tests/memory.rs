use bytes::Bytes;
use tokio::time::{self, Duration};

use rustdis_async::memory::MemoryClient;
use rustdis_async::{Commands, Condition, Error, Expiration, ForwardError, Forwarder, Frame};

fn bulk(s: &str) -> Frame {
    Frame::Bulk(Bytes::from(s.to_string()))
}

fn forwarder() -> Forwarder<MemoryClient> {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    Forwarder::new(MemoryClient::new())
}

#[tokio::test]
async fn test_set_then_get() {
    let redis = forwarder();

    assert_eq!(redis.set("k", "v", ()).await.unwrap(), Frame::ok());
    assert_eq!(redis.get("k").await.unwrap(), bulk("v"));
}

#[tokio::test]
async fn test_exists_missing_key() {
    let redis = forwarder();

    assert_eq!(
        redis.exists(["missing-key"]).await.unwrap(),
        Frame::Integer(0)
    );
}

#[tokio::test]
async fn test_error_reply_rejects() {
    let redis = forwarder();

    redis.set("word", "hello", ()).await.unwrap();
    let err = redis.incr("word").await.unwrap_err();

    assert_eq!(
        err.detail(),
        Some("ERR value is not an integer or out of range")
    );
}

#[tokio::test]
async fn test_pipeline_keeps_failures_in_position() {
    let redis = forwarder();
    redis.set("word", "hello", ()).await.unwrap();

    let mut batch = redis.batch();
    batch.set("a", "1", ()).incr("word").get("a");

    let replies = redis.exec(batch).await.unwrap();

    assert_eq!(replies.len(), 3);
    assert_eq!(replies[0].as_ref().unwrap(), &Frame::ok());
    assert!(matches!(&replies[1], Err(Error::Reply(msg)) if msg.starts_with("ERR value")));
    assert_eq!(replies[2].as_ref().unwrap(), &bulk("1"));
}

#[tokio::test]
async fn test_transaction_runtime_errors_are_inline() {
    let redis = forwarder();
    redis.set("word", "hello", ()).await.unwrap();

    let mut tx = redis.multi();
    tx.incr("n").incr("word").incr("n");

    let replies = redis.exec(tx).await.unwrap();

    assert_eq!(replies[0].as_ref().unwrap(), &Frame::Integer(1));
    assert!(replies[1].is_err());
    assert_eq!(replies[2].as_ref().unwrap(), &Frame::Integer(2));
}

#[tokio::test]
async fn test_transaction_queue_error_discards_everything() {
    let redis = forwarder();

    let mut tx = redis.multi();
    tx.set("a", "1", ()).call("NOPE", ["x"]).set("b", "2", ());

    let err = redis.exec(tx).await.unwrap_err();

    assert!(err.detail().unwrap().starts_with("EXECABORT"));
    assert_eq!(redis.exists(["a", "b"]).await.unwrap(), Frame::Integer(0));
}

#[tokio::test]
async fn test_expiration() {
    time::pause();
    let redis = forwarder();

    redis
        .set("session", "data", Expiration::Ex(10))
        .await
        .unwrap();
    assert_eq!(redis.ttl("session").await.unwrap(), Frame::Integer(10));

    time::advance(Duration::from_secs(11)).await;
    time::sleep(Duration::from_millis(1)).await;

    assert_eq!(redis.get("session").await.unwrap(), Frame::Null);
    assert_eq!(redis.ttl("session").await.unwrap(), Frame::Integer(-2));
}

#[tokio::test]
async fn test_registered_command() {
    let redis = forwarder();

    let err = redis.call("JSON.SET", ("doc", "$", "{}")).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Forward(ForwardError::UnknownCommand(name)) if name == "JSON.SET"
    ));

    assert!(redis.register("JSON.SET"));

    // Forwarded under the registered name; this client then rejects it as unknown.
    let err = redis.call("json.set", ("doc", "$", "{}")).await.unwrap_err();
    assert!(err
        .detail()
        .unwrap()
        .starts_with("ERR unknown command 'JSON.SET'"));
}

#[tokio::test]
async fn test_generated_commands_are_callable_by_name() {
    let redis = forwarder();

    assert_eq!(redis.call("setnx", ("k", "v")).await.unwrap(), Frame::Integer(1));
    assert_eq!(redis.call("SETNX", ("k", "w")).await.unwrap(), Frame::Integer(0));
    assert_eq!(redis.get("k").await.unwrap(), bulk("v"));
}

#[tokio::test]
async fn test_unsupported_command_reaches_the_client() {
    let redis = forwarder();

    let err = redis.hset("h", [("f", "v")]).await.unwrap_err();

    assert!(err.detail().unwrap().starts_with("ERR unknown command 'HSET'"));
}

#[tokio::test]
async fn test_quit_closes_the_client() {
    let redis = forwarder();

    assert_eq!(redis.quit().await.unwrap(), Frame::ok());
    assert!(matches!(
        redis.ping(()).await.unwrap_err(),
        Error::ConnectionClosed
    ));
}

#[tokio::test]
async fn test_end_closes_the_client() {
    let redis = forwarder();

    redis.end();

    assert!(matches!(
        redis.get("k").await.unwrap_err(),
        Error::ConnectionClosed
    ));
}

#[tokio::test]
async fn test_huge_expirations_are_refused_and_the_store_stays_usable() {
    let redis = forwarder();
    redis.set("k", "v", ()).await.unwrap();

    let err = redis.expire("k", i64::MAX, ()).await.unwrap_err();
    assert_eq!(
        err.detail(),
        Some("ERR invalid expire time in 'expire' command")
    );

    let err = redis
        .set("k", "w", Expiration::Ex(u64::MAX / 2))
        .await
        .unwrap_err();
    assert_eq!(err.detail(), Some("ERR invalid expire time in 'set' command"));

    assert_eq!(redis.get("k").await.unwrap(), bulk("v"));
    assert_eq!(redis.ttl("k").await.unwrap(), Frame::Integer(-1));
}

#[tokio::test]
async fn test_expire_condition_is_honored() {
    let redis = forwarder();
    redis.set("k", "v", ()).await.unwrap();

    assert_eq!(
        redis.expire("k", 100, Condition::Xx).await.unwrap(),
        Frame::Integer(0)
    );
    assert_eq!(redis.ttl("k").await.unwrap(), Frame::Integer(-1));
    assert_eq!(
        redis.expire("k", 100, Condition::Nx).await.unwrap(),
        Frame::Integer(1)
    );

    let err = redis.call("EXPIRE", ("k", 100, "BOGUS")).await.unwrap_err();
    assert_eq!(err.detail(), Some("ERR syntax error"));
}
