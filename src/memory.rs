//! An in-process [`Client`] that executes commands against a [`Store`].
//!
//! It answers like a Redis server would for the string, key and server commands it knows, and
//! with an `unknown command` error reply for the rest. Callbacks run synchronously, before the
//! forwarding call returns.

use std::str::{self, FromStr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use std::vec;

use bytes::{Bytes, BytesMut};
use glob_match::glob_match;
use itertools::Itertools;
use strum_macros::{AsRefStr, EnumString};
use tokio::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::batch::{BatchMode, QueuedCommand};
use crate::client::{BatchReplies, Callback, Client};
use crate::frame::Frame;
use crate::store::{self, IncrError, InnerStoreLocked, Store};
use crate::Error;

const NOT_AN_INTEGER: &str = "ERR value is not an integer or out of range";
const NOT_A_FLOAT: &str = "ERR value is not a valid float";
const OVERFLOW: &str = "ERR increment or decrement would overflow";
const SYNTAX: &str = "ERR syntax error";
const EXECABORT: &str = "EXECABORT Transaction discarded because of previous errors.";

/// Redis' `proto-max-bulk-len` default.
const MAX_STRING_LEN: usize = 512 * 1024 * 1024;

#[derive(Clone)]
pub struct MemoryClient {
    store: Store,
    closed: Arc<AtomicBool>,
}

impl MemoryClient {
    /// Must be called from within a tokio runtime, see [`Store::new`].
    pub fn new() -> MemoryClient {
        MemoryClient::with_store(Store::new())
    }

    pub fn with_store(store: Store) -> MemoryClient {
        MemoryClient {
            store,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::ConnectionClosed);
        }
        Ok(())
    }
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Client for MemoryClient {
    type Error = Error;

    fn send_command(
        &self,
        name: &str,
        args: Vec<Bytes>,
        callback: Callback<Frame, Error>,
    ) -> Result<(), Error> {
        self.ensure_open()?;

        let reply = {
            let mut store = self.store.lock();
            execute(&mut store, name, args)
        };
        callback(reply);

        Ok(())
    }

    fn exec_batch(
        &self,
        commands: Vec<QueuedCommand>,
        mode: BatchMode,
        callback: Callback<BatchReplies<Error>, Error>,
    ) -> Result<(), Error> {
        self.ensure_open()?;

        // A transaction is discarded as a whole when a command could not be queued.
        if mode == BatchMode::Transaction {
            if let Some(rejected) = commands.iter().find(|cmd| queue_error(cmd).is_some()) {
                debug!(command = %rejected.name, "discarding transaction");
                callback(Err(Error::reply(EXECABORT)));
                return Ok(());
            }
        }

        let replies = {
            let mut store = self.store.lock();
            commands
                .into_iter()
                .map(|cmd| execute(&mut store, &cmd.name, cmd.args))
                .collect()
        };
        callback(Ok(replies));

        Ok(())
    }

    fn quit(&self, callback: Callback<Frame, Error>) -> Result<(), Error> {
        self.ensure_open()?;
        self.closed.store(true, Ordering::SeqCst);
        callback(Ok(Frame::ok()));
        Ok(())
    }

    fn end(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[derive(Debug, PartialEq, EnumString, AsRefStr)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
enum Op {
    Ping,
    Echo,
    Select,
    Dbsize,
    Flushdb,
    Flushall,
    Del,
    Unlink,
    Exists,
    Expire,
    Pexpire,
    Expireat,
    Pexpireat,
    Ttl,
    Pttl,
    Persist,
    Keys,
    Type,
    Rename,
    Renamenx,
    Append,
    Decr,
    Decrby,
    Get,
    Getdel,
    Getex,
    Getrange,
    Getset,
    Incr,
    Incrby,
    Incrbyfloat,
    Lcs,
    Mget,
    Mset,
    Msetnx,
    Set,
    Setex,
    Psetex,
    Setnx,
    Setrange,
    Strlen,
}

impl Op {
    /// Smallest and largest argument count, `None` when unbounded.
    fn arity(&self) -> (usize, Option<usize>) {
        match self {
            Op::Dbsize => (0, Some(0)),
            Op::Ping | Op::Flushdb | Op::Flushall => (0, Some(1)),
            Op::Echo | Op::Select | Op::Ttl | Op::Pttl | Op::Persist | Op::Keys | Op::Type => {
                (1, Some(1))
            }
            Op::Decr | Op::Get | Op::Getdel | Op::Incr | Op::Strlen => (1, Some(1)),
            Op::Del | Op::Unlink | Op::Exists | Op::Mget | Op::Getex => (1, None),
            Op::Expire | Op::Pexpire | Op::Expireat | Op::Pexpireat => (2, None),
            Op::Set | Op::Lcs | Op::Mset | Op::Msetnx => (2, None),
            Op::Rename | Op::Renamenx | Op::Append | Op::Decrby | Op::Getset => (2, Some(2)),
            Op::Incrby | Op::Incrbyfloat | Op::Setnx => (2, Some(2)),
            Op::Getrange | Op::Setex | Op::Psetex | Op::Setrange => (3, Some(3)),
        }
    }
}

/// Why a command could not even be queued: unknown name or wrong number of arguments.
fn queue_error(cmd: &QueuedCommand) -> Option<Frame> {
    match Op::from_str(&cmd.name) {
        Ok(op) => check_arity(&op, &cmd.name, cmd.args.len()).err(),
        Err(_) => Some(unknown_command(&cmd.name, &cmd.args)),
    }
}

fn check_arity(op: &Op, name: &str, given: usize) -> Result<(), Frame> {
    let (min, max) = op.arity();
    if given < min || max.is_some_and(|max| given > max) {
        return Err(Frame::Error(format!(
            "ERR wrong number of arguments for '{}' command",
            name.to_lowercase()
        )));
    }
    Ok(())
}

fn unknown_command(name: &str, args: &[Bytes]) -> Frame {
    let args = args
        .iter()
        .map(|arg| format!("'{}'", String::from_utf8_lossy(arg)))
        .join(" ");
    Frame::Error(format!(
        "ERR unknown command '{}', with args beginning with: {}",
        name, args
    ))
}

/// Runs one command. Error replies become `Err(Error::Reply)`, as a network client reports
/// them.
fn execute(store: &mut InnerStoreLocked<'_>, name: &str, args: Vec<Bytes>) -> Result<Frame, Error> {
    trace!(command = name, args = args.len(), "executing");

    let reply = match Op::from_str(name) {
        Ok(op) => check_arity(&op, name, args.len()).and_then(|()| {
            let mut parser = ArgParser {
                parts: args.into_iter(),
            };
            run(store, op, &mut parser)
        }),
        Err(_) => Err(unknown_command(name, &args)),
    };

    match reply {
        Ok(Frame::Error(msg)) | Err(Frame::Error(msg)) => Err(Error::Reply(msg)),
        Ok(frame) => Ok(frame),
        Err(frame) => Ok(frame),
    }
}

fn run(store: &mut InnerStoreLocked<'_>, op: Op, args: &mut ArgParser) -> Result<Frame, Frame> {
    let frame = match op {
        Op::Ping => match args.next_bytes_opt() {
            Some(message) => Frame::Bulk(message),
            None => Frame::Simple("PONG".to_string()),
        },
        Op::Echo => Frame::Bulk(args.next_bytes()?),
        Op::Select => match args.next_integer()? {
            0 => Frame::ok(),
            _ => Frame::Error("ERR DB index is out of range".to_string()),
        },
        Op::Dbsize => Frame::Integer(store.size() as i64),
        Op::Flushdb | Op::Flushall => {
            if let Some(mode) = args.next_string_opt()? {
                if !mode.eq_ignore_ascii_case("ASYNC") && !mode.eq_ignore_ascii_case("SYNC") {
                    return Err(syntax_error());
                }
            }
            store.clear();
            Frame::ok()
        }
        Op::Del | Op::Unlink => {
            let removed = args
                .rest_strings()?
                .iter()
                .filter(|key| store.remove(key).is_some())
                .count();
            Frame::Integer(removed as i64)
        }
        Op::Exists => {
            let found = args
                .rest_strings()?
                .iter()
                .filter(|key| store.exists(key))
                .count();
            Frame::Integer(found as i64)
        }
        Op::Expire | Op::Pexpire | Op::Expireat | Op::Pexpireat => expire(store, op, args)?,
        Op::Ttl | Op::Pttl => {
            let key = args.next_string()?;
            let remaining = match store.ttl(&key) {
                None => -2,
                Some(None) => -1,
                Some(Some(ttl)) if op == Op::Ttl => ((ttl.as_millis() + 500) / 1000) as i64,
                Some(Some(ttl)) => ttl.as_millis() as i64,
            };
            Frame::Integer(remaining)
        }
        Op::Persist => {
            let key = args.next_string()?;
            Frame::Integer(store.remove_ttl(&key) as i64)
        }
        Op::Keys => {
            let pattern = args.next_string()?;
            let keys = store
                .keys()
                .filter(|key| glob_match(&pattern, key))
                .sorted()
                .map(|key| Frame::Bulk(Bytes::from(key.clone())))
                .collect();
            Frame::Array(keys)
        }
        Op::Type => {
            let key = args.next_string()?;
            let kind = if store.exists(&key) { "string" } else { "none" };
            Frame::Simple(kind.to_string())
        }
        Op::Rename | Op::Renamenx => {
            let key = args.next_string()?;
            let new_key = args.next_string()?;
            if !store.exists(&key) {
                return Err(Frame::Error("ERR no such key".to_string()));
            }
            if op == Op::Renamenx {
                if store.exists(&new_key) {
                    return Ok(Frame::Integer(0));
                }
                rename(store, &key, new_key);
                Frame::Integer(1)
            } else {
                rename(store, &key, new_key);
                Frame::ok()
            }
        }
        Op::Append => {
            let key = args.next_string()?;
            let suffix = args.next_bytes()?;
            let mut value = BytesMut::from(&store.get(&key).unwrap_or_default()[..]);
            value.extend_from_slice(&suffix);
            let len = value.len();
            store.set_keep_ttl(key, value.freeze());
            Frame::Integer(len as i64)
        }
        Op::Incr | Op::Decr | Op::Incrby | Op::Decrby => {
            let key = args.next_string()?;
            let by = match op {
                Op::Incr => 1,
                Op::Decr => -1,
                Op::Incrby => args.next_integer()?,
                _ => args
                    .next_integer()?
                    .checked_neg()
                    .ok_or_else(|| Frame::Error(OVERFLOW.to_string()))?,
            };
            match store.incr_by(&key, by) {
                Ok(value) => Frame::Integer(value),
                Err(IncrError::NotANumber) => Frame::Error(NOT_AN_INTEGER.to_string()),
                Err(IncrError::Overflow) => Frame::Error(OVERFLOW.to_string()),
            }
        }
        Op::Incrbyfloat => {
            let key = args.next_string()?;
            let by = args.next_float()?;
            let current = match store.get(&key) {
                Some(value) => parse_float(&value)?,
                None => 0.0,
            };
            let value = current + by;
            if !value.is_finite() {
                return Err(Frame::Error(
                    "ERR increment would produce NaN or Infinity".to_string(),
                ));
            }
            let value = Bytes::from(value.to_string());
            store.set_keep_ttl(key, value.clone());
            Frame::Bulk(value)
        }
        Op::Get => {
            let key = args.next_string()?;
            bulk_or_null(store.get(&key))
        }
        Op::Getdel => {
            let key = args.next_string()?;
            bulk_or_null(store.remove(&key).map(|value| value.data))
        }
        Op::Getex => getex(store, args)?,
        Op::Getrange => {
            let key = args.next_string()?;
            let start = args.next_integer()?;
            let end = args.next_integer()?;
            let value = store.get(&key).unwrap_or_default();
            Frame::Bulk(substring(&value, start, end))
        }
        Op::Getset => {
            let key = args.next_string()?;
            let value = args.next_bytes()?;
            let previous = store.get(&key);
            store.set(key, value);
            bulk_or_null(previous)
        }
        Op::Lcs => {
            let a = store.get(&args.next_string()?).unwrap_or_default();
            let b = store.get(&args.next_string()?).unwrap_or_default();
            let mut len_only = false;
            while let Some(option) = args.next_string_opt()? {
                match option.to_uppercase().as_str() {
                    "LEN" => len_only = true,
                    _ => return Err(syntax_error()),
                }
            }

            let common = longest_common_subsequence(&a, &b);
            if len_only {
                Frame::Integer(common.len() as i64)
            } else {
                Frame::Bulk(Bytes::from(common))
            }
        }
        Op::Mget => {
            let values = args
                .rest_strings()?
                .iter()
                .map(|key| bulk_or_null(store.get(key)))
                .collect();
            Frame::Array(values)
        }
        Op::Mset | Op::Msetnx => {
            let pairs = args.rest_pairs(op.as_ref())?;
            if op == Op::Msetnx && pairs.iter().any(|(key, _)| store.exists(key)) {
                return Ok(Frame::Integer(0));
            }
            for (key, value) in pairs {
                store.set(key, value);
            }
            match op {
                Op::Mset => Frame::ok(),
                _ => Frame::Integer(1),
            }
        }
        Op::Set => set(store, args)?,
        Op::Setex | Op::Psetex => {
            let key = args.next_string()?;
            let amount = args.next_integer()?;
            let value = args.next_bytes()?;
            if amount <= 0 {
                return Err(invalid_expire_time(op.as_ref()));
            }
            let unit = match op {
                Op::Setex => Unit::Seconds,
                _ => Unit::Millis,
            };
            let expires_at = resolve_expiry(unit, amount, op.as_ref())?;
            store.set_until(key, value, expires_at);
            Frame::ok()
        }
        Op::Setnx => {
            let key = args.next_string()?;
            let value = args.next_bytes()?;
            if store.exists(&key) {
                Frame::Integer(0)
            } else {
                store.set(key, value);
                Frame::Integer(1)
            }
        }
        Op::Setrange => {
            let key = args.next_string()?;
            let offset = usize::try_from(args.next_integer()?)
                .map_err(|_| Frame::Error("ERR offset is out of range".to_string()))?;
            let value = args.next_bytes()?;
            let current = store.get(&key);

            if value.is_empty() {
                return Ok(Frame::Integer(current.map_or(0, |v| v.len()) as i64));
            }
            let end = offset.saturating_add(value.len());
            if end > MAX_STRING_LEN {
                return Err(Frame::Error(
                    "ERR string exceeds maximum allowed size (proto-max-bulk-len)".to_string(),
                ));
            }

            let mut buf = BytesMut::from(&current.unwrap_or_default()[..]);
            if buf.len() < end {
                buf.resize(end, 0);
            }
            buf[offset..end].copy_from_slice(&value);
            let len = buf.len();
            store.set_keep_ttl(key, buf.freeze());
            Frame::Integer(len as i64)
        }
        Op::Strlen => {
            let key = args.next_string()?;
            Frame::Integer(store.get(&key).map(|v| v.len()).unwrap_or(0) as i64)
        }
    };

    Ok(frame)
}

/// `SET key value [NX | XX] [GET] [EX s | PX ms | EXAT ts | PXAT ts-ms | KEEPTTL]`
fn set(store: &mut InnerStoreLocked<'_>, args: &mut ArgParser) -> Result<Frame, Frame> {
    enum Ttl {
        At(Instant),
        Keep,
    }

    let key = args.next_string()?;
    let value = args.next_bytes()?;

    let mut condition: Option<bool> = None;
    let mut get = false;
    let mut ttl: Option<Ttl> = None;

    while let Some(option) = args.next_string_opt()? {
        let option = option.to_uppercase();
        match (option.as_str(), Unit::parse(&option)) {
            ("NX", _) if condition.is_none() => condition = Some(false),
            ("XX", _) if condition.is_none() => condition = Some(true),
            ("GET", _) => get = true,
            ("KEEPTTL", _) if ttl.is_none() => ttl = Some(Ttl::Keep),
            (_, Some(unit)) if ttl.is_none() => {
                let amount = args.next_integer()?;
                if amount <= 0 {
                    return Err(invalid_expire_time("set"));
                }
                ttl = Some(Ttl::At(resolve_expiry(unit, amount, "set")?));
            }
            _ => return Err(syntax_error()),
        }
    }

    let previous = store.get(&key);
    let reply_previous = |previous: Option<Bytes>| {
        if get {
            bulk_or_null(previous)
        } else {
            Frame::Null
        }
    };

    if let Some(must_exist) = condition {
        if previous.is_some() != must_exist {
            return Ok(reply_previous(previous));
        }
    }

    match ttl {
        Some(Ttl::At(expires_at)) if expires_at <= Instant::now() => {
            store.remove(&key);
        }
        Some(Ttl::At(expires_at)) => store.set_until(key, value, expires_at),
        Some(Ttl::Keep) => store.set_keep_ttl(key, value),
        None => store.set(key, value),
    }

    if get {
        Ok(bulk_or_null(previous))
    } else {
        Ok(Frame::ok())
    }
}

/// `GETEX key [EX s | PX ms | EXAT ts | PXAT ts-ms | PERSIST]`
fn getex(store: &mut InnerStoreLocked<'_>, args: &mut ArgParser) -> Result<Frame, Frame> {
    enum Change {
        At(Instant),
        Persist,
    }

    let key = args.next_string()?;
    let mut change: Option<Change> = None;

    while let Some(option) = args.next_string_opt()? {
        let option = option.to_uppercase();
        match Unit::parse(&option) {
            Some(unit) if change.is_none() => {
                let amount = args.next_integer()?;
                if amount <= 0 {
                    return Err(invalid_expire_time("getex"));
                }
                change = Some(Change::At(resolve_expiry(unit, amount, "getex")?));
            }
            None if change.is_none() && option == "PERSIST" => change = Some(Change::Persist),
            _ => return Err(syntax_error()),
        }
    }

    let Some(value) = store.get(&key) else {
        return Ok(Frame::Null);
    };

    match change {
        Some(Change::At(expires_at)) if expires_at <= Instant::now() => {
            store.remove(&key);
        }
        Some(Change::At(expires_at)) => {
            store.expire_at(&key, expires_at);
        }
        Some(Change::Persist) => {
            store.remove_ttl(&key);
        }
        None => {}
    }

    Ok(Frame::Bulk(value))
}

/// `EXPIRE key amount [NX | XX | GT | LT]` and its millisecond and unix time variants.
/// Replies 1 when the expiration was applied.
fn expire(store: &mut InnerStoreLocked<'_>, op: Op, args: &mut ArgParser) -> Result<Frame, Frame> {
    let key = args.next_string()?;
    let amount = args.next_integer()?;

    let (mut nx, mut xx, mut gt, mut lt) = (false, false, false, false);
    while let Some(option) = args.next_string_opt()? {
        match option.to_uppercase().as_str() {
            "NX" => nx = true,
            "XX" => xx = true,
            "GT" => gt = true,
            "LT" => lt = true,
            _ => return Err(syntax_error()),
        }
    }
    if nx && (xx || gt || lt) {
        return Err(Frame::Error(
            "ERR NX and XX, GT or LT options at the same time are not compatible".to_string(),
        ));
    }
    if gt && lt {
        return Err(Frame::Error(
            "ERR GT and LT options at the same time are not compatible".to_string(),
        ));
    }

    let unit = match op {
        Op::Expire => Unit::Seconds,
        Op::Pexpire => Unit::Millis,
        Op::Expireat => Unit::UnixSeconds,
        _ => Unit::UnixMillis,
    };
    let expires_at = resolve_expiry(unit, amount, op.as_ref())?;

    let Some(current) = store.ttl(&key) else {
        return Ok(Frame::Integer(0));
    };

    let now = Instant::now();
    let ttl = expires_at.saturating_duration_since(now);
    // A key without a time to live counts as never expiring.
    let applies = match current {
        None => !xx && !gt,
        Some(current) => !nx && (!gt || ttl > current) && (!lt || ttl < current),
    };
    if !applies {
        return Ok(Frame::Integer(0));
    }

    if expires_at <= now {
        store.remove(&key);
    } else {
        store.expire_at(&key, expires_at);
    }
    Ok(Frame::Integer(1))
}

/// Moves `key` to `new_key` with its time to live, replacing whatever `new_key` held.
fn rename(store: &mut InnerStoreLocked<'_>, key: &str, new_key: String) {
    if let Some(value) = store.remove(key) {
        match value.expires_at {
            Some(expires_at) => store.set_until(new_key, value.data, expires_at),
            None => store.set(new_key, value.data),
        }
    }
}

#[derive(Clone, Copy)]
enum Unit {
    Seconds,
    Millis,
    UnixSeconds,
    UnixMillis,
}

impl Unit {
    fn parse(token: &str) -> Option<Unit> {
        match token {
            "EX" => Some(Unit::Seconds),
            "PX" => Some(Unit::Millis),
            "EXAT" => Some(Unit::UnixSeconds),
            "PXAT" => Some(Unit::UnixMillis),
            _ => None,
        }
    }
}

/// The instant an expiration argument points at. Amounts that are not positive, or unix
/// times in the past, resolve to now or earlier. Amounts whose unix time in milliseconds
/// overflows are rejected like Redis does.
fn resolve_expiry(unit: Unit, amount: i64, command: &str) -> Result<Instant, Frame> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|since| since.as_millis() as i64)
        .unwrap_or_default();

    let at = match unit {
        Unit::Seconds => amount.checked_mul(1000).and_then(|ms| ms.checked_add(now)),
        Unit::Millis => amount.checked_add(now),
        Unit::UnixSeconds => amount.checked_mul(1000),
        Unit::UnixMillis => Some(amount),
    }
    .ok_or_else(|| invalid_expire_time(command))?;

    let ttl = Duration::from_millis(u64::try_from(at.saturating_sub(now)).unwrap_or(0));
    store::deadline(ttl).ok_or_else(|| invalid_expire_time(command))
}

fn invalid_expire_time(command: &str) -> Frame {
    Frame::Error(format!("ERR invalid expire time in '{}' command", command))
}

fn syntax_error() -> Frame {
    Frame::Error(SYNTAX.to_string())
}

/// Longest common subsequence of two byte strings, by dynamic programming.
fn longest_common_subsequence(a: &[u8], b: &[u8]) -> Vec<u8> {
    // lengths[i][j] is the length of the longest common subsequence of a[..i] and b[..j].
    let mut lengths = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            lengths[i + 1][j + 1] = if x == y {
                lengths[i][j] + 1
            } else {
                lengths[i][j + 1].max(lengths[i + 1][j])
            };
        }
    }

    let mut common = Vec::with_capacity(lengths[a.len()][b.len()]);
    let (mut i, mut j) = (a.len(), b.len());
    while i > 0 && j > 0 {
        if a[i - 1] == b[j - 1] {
            common.push(a[i - 1]);
            i -= 1;
            j -= 1;
        } else if lengths[i - 1][j] > lengths[i][j - 1] {
            i -= 1;
        } else {
            j -= 1;
        }
    }
    common.reverse();
    common
}

fn bulk_or_null(value: Option<Bytes>) -> Frame {
    match value {
        Some(value) => Frame::Bulk(value),
        None => Frame::Null,
    }
}

fn parse_float(value: &[u8]) -> Result<f64, Frame> {
    str::from_utf8(value)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|f| f.is_finite())
        .ok_or_else(|| Frame::Error(NOT_A_FLOAT.to_string()))
}

/// Inclusive range with negative offsets counting from the end, as GETRANGE does.
fn substring(value: &Bytes, start: i64, end: i64) -> Bytes {
    let len = value.len() as i64;
    if len == 0 {
        return Bytes::new();
    }

    let resolve = |offset: i64| if offset < 0 { (len + offset).max(0) } else { offset };
    let start = resolve(start);
    let end = resolve(end).min(len - 1);

    if start > end {
        return Bytes::new();
    }
    value.slice(start as usize..=end as usize)
}

/// Pulls typed values out of a command's arguments. Failures are error replies.
struct ArgParser {
    parts: vec::IntoIter<Bytes>,
}

impl ArgParser {
    fn next_bytes(&mut self) -> Result<Bytes, Frame> {
        self.parts.next().ok_or_else(syntax_error)
    }

    fn next_bytes_opt(&mut self) -> Option<Bytes> {
        self.parts.next()
    }

    fn next_string(&mut self) -> Result<String, Frame> {
        let bytes = self.next_bytes()?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| Frame::Error("ERR invalid UTF-8 argument".to_string()))
    }

    fn next_string_opt(&mut self) -> Result<Option<String>, Frame> {
        match self.parts.as_slice().is_empty() {
            true => Ok(None),
            false => self.next_string().map(Some),
        }
    }

    fn next_integer(&mut self) -> Result<i64, Frame> {
        let bytes = self.next_bytes()?;
        str::from_utf8(&bytes)
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or_else(|| Frame::Error(NOT_AN_INTEGER.to_string()))
    }

    fn next_float(&mut self) -> Result<f64, Frame> {
        let bytes = self.next_bytes()?;
        parse_float(&bytes)
    }

    fn rest_strings(&mut self) -> Result<Vec<String>, Frame> {
        let mut strings = Vec::new();
        while let Some(s) = self.next_string_opt()? {
            strings.push(s);
        }
        Ok(strings)
    }

    fn rest_pairs(&mut self, command: &str) -> Result<Vec<(String, Bytes)>, Frame> {
        let rest: Vec<Bytes> = self.parts.by_ref().collect();
        if rest.len() % 2 != 0 {
            return Err(Frame::Error(format!(
                "ERR wrong number of arguments for '{}' command",
                command
            )));
        }

        rest.into_iter()
            .tuples()
            .map(|(key, value)| {
                String::from_utf8(key.to_vec())
                    .map(|key| (key, value))
                    .map_err(|_| Frame::Error("ERR invalid UTF-8 argument".to_string()))
            })
            .collect()
    }
}
