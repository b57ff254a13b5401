//! The generated command surface.
//!
//! Each entry below is data: the command name, its group, the version that introduced it, its
//! documented complexity and its argument slots. The `commands!` macro turns the table into the
//! [`COMMANDS`] descriptor slice and one provided method per entry on [`Commands`], all of which
//! funnel into the implementor's single `dispatch`.
//!
//! Every argument is `impl ToArgs`: optional slots take `()` or an `Option`, variadic slots a
//! `Vec`, slice or array, and blocks a tuple (or a sequence of tuples).

#[macro_use]
mod macros;

use bytes::Bytes;

use crate::args::ToArgs;
use crate::descriptor::{ArgumentDescriptor, ArgumentKind, CommandDescriptor, Group};

commands! {
    // Connection

    /// Returns `PONG`, or a copy of `message`.
    ping => "PING", Connection, since "1.0.0", complexity "O(1)" (
        message: String [optional],
    );
    /// Returns `message`.
    echo => "ECHO", Connection, since "1.0.0", complexity "O(1)" (
        message: String,
    );
    /// Changes the selected database.
    select => "SELECT", Connection, since "1.0.0", complexity "O(1)" (
        index: Integer,
    );
    /// Authenticates the connection.
    auth => "AUTH", Connection, since "1.0.0", complexity "O(N) where N is the number of passwords defined for the user" (
        username: String [optional],
        password: String,
    );

    // Server

    /// Returns the number of keys in the selected database.
    dbsize => "DBSIZE", Server, since "1.0.0", complexity "O(1)" ();
    /// Removes every key from the selected database.
    flushdb => "FLUSHDB", Server, since "1.0.0", complexity "O(N) where N is the number of keys in the selected database" (
        mode: OneOf [optional],
    );
    /// Removes every key from every database.
    flushall => "FLUSHALL", Server, since "1.0.0", complexity "O(N) where N is the total number of keys in all databases" (
        mode: OneOf [optional],
    );
    /// Returns information and statistics about the server.
    info => "INFO", Server, since "1.0.0", complexity "O(1)" (
        sections: String [optional_multiple],
    );
    /// Returns the server time as a unix timestamp and the microseconds elapsed in the
    /// current second.
    time => "TIME", Server, since "2.6.0", complexity "O(1)" ();
    /// Returns the unix time of the last successful save to disk.
    lastsave => "LASTSAVE", Server, since "1.0.0", complexity "O(1)" ();

    // Generic

    /// Removes the given keys, returning how many existed.
    del => "DEL", Generic, since "1.0.0", complexity "O(N) where N is the number of keys that will be removed" (
        keys: Key [multiple],
    );
    /// Removes the given keys, reclaiming memory in the background.
    unlink => "UNLINK", Generic, since "4.0.0", complexity "O(1) for each key removed regardless of its size" (
        keys: Key [multiple],
    );
    /// Returns how many of the given keys exist.
    exists => "EXISTS", Generic, since "3.0.3", complexity "O(N) where N is the number of keys to check" (
        keys: Key [multiple],
    );
    /// Sets a timeout on `key`, in seconds.
    expire => "EXPIRE", Generic, since "1.0.0", complexity "O(1)" (
        key: Key,
        seconds: Integer,
        condition: OneOf [optional],
    );
    /// Sets a timeout on `key`, in milliseconds.
    pexpire => "PEXPIRE", Generic, since "2.6.0", complexity "O(1)" (
        key: Key,
        milliseconds: Integer,
        condition: OneOf [optional],
    );
    /// Sets the expiration of `key` to a unix timestamp in seconds.
    expireat => "EXPIREAT", Generic, since "1.2.0", complexity "O(1)" (
        key: Key,
        unix_time_seconds: UnixTime,
        condition: OneOf [optional],
    );
    /// Sets the expiration of `key` to a unix timestamp in milliseconds.
    pexpireat => "PEXPIREAT", Generic, since "2.6.0", complexity "O(1)" (
        key: Key,
        unix_time_milliseconds: UnixTime,
        condition: OneOf [optional],
    );
    /// Returns the remaining time to live of `key`, in seconds.
    ttl => "TTL", Generic, since "1.0.0", complexity "O(1)" (
        key: Key,
    );
    /// Returns the remaining time to live of `key`, in milliseconds.
    pttl => "PTTL", Generic, since "2.6.0", complexity "O(1)" (
        key: Key,
    );
    /// Removes the expiration from `key`.
    persist => "PERSIST", Generic, since "2.2.0", complexity "O(1)" (
        key: Key,
    );
    /// Returns every key matching `pattern`.
    keys => "KEYS", Generic, since "1.0.0", complexity "O(N) with N being the number of keys in the database" (
        pattern: Pattern,
    );
    /// Returns the type of the value stored at `key`.
    type_ => "TYPE", Generic, since "1.0.0", complexity "O(1)" (
        key: Key,
    );
    /// Renames `key` to `newkey`.
    rename => "RENAME", Generic, since "1.0.0", complexity "O(1)" (
        key: Key,
        newkey: Key,
    );
    /// Renames `key` to `newkey` only when `newkey` does not exist.
    renamenx => "RENAMENX", Generic, since "1.0.0", complexity "O(1)" (
        key: Key,
        newkey: Key,
    );
    /// Returns a random key from the selected database.
    randomkey => "RANDOMKEY", Generic, since "1.0.0", complexity "O(1)" ();
    /// Iterates the key space.
    scan => "SCAN", Generic, since "2.8.0", complexity "O(1) for every call. O(N) for a complete iteration" (
        cursor: Integer,
        options: Block [optional],
    );
    /// Alters the last access time of the given keys.
    touch => "TOUCH", Generic, since "3.2.1", complexity "O(N) where N is the number of keys that will be touched" (
        keys: Key [multiple],
    );
    /// Copies the value stored at `source` to `destination`.
    copy => "COPY", Generic, since "6.2.0", complexity "O(N) worst case for collections, where N is the number of nested items" (
        source: Key,
        destination: Key,
        options: Block [optional],
    );

    // String

    /// Appends `value` to the string stored at `key`.
    append => "APPEND", String, since "2.0.0", complexity "O(1)" (
        key: Key,
        value: String,
    );
    /// Decrements the integer stored at `key` by one.
    decr => "DECR", String, since "1.0.0", complexity "O(1)" (
        key: Key,
    );
    /// Decrements the integer stored at `key` by `decrement`.
    decrby => "DECRBY", String, since "1.0.0", complexity "O(1)" (
        key: Key,
        decrement: Integer,
    );
    /// Returns the string stored at `key`, or nil.
    get => "GET", String, since "1.0.0", complexity "O(1)" (
        key: Key,
    );
    /// Returns the string stored at `key` and deletes it.
    getdel => "GETDEL", String, since "6.2.0", complexity "O(1)" (
        key: Key,
    );
    /// Returns the string stored at `key`, optionally changing its expiration.
    getex => "GETEX", String, since "6.2.0", complexity "O(1)" (
        key: Key,
        expiration: OneOf [optional],
    );
    /// Returns the substring between offsets `start` and `end`, both inclusive.
    getrange => "GETRANGE", String, since "2.4.0", complexity "O(N) where N is the length of the returned string" (
        key: Key,
        start: Integer,
        end: Integer,
    );
    /// Sets `key` to `value`, returning the previous string.
    getset => "GETSET", String, since "1.0.0", complexity "O(1)" (
        key: Key,
        value: String,
    );
    /// Increments the integer stored at `key` by one.
    incr => "INCR", String, since "1.0.0", complexity "O(1)" (
        key: Key,
    );
    /// Increments the integer stored at `key` by `increment`.
    incrby => "INCRBY", String, since "1.0.0", complexity "O(1)" (
        key: Key,
        increment: Integer,
    );
    /// Increments the number stored at `key` by a floating point `increment`.
    incrbyfloat => "INCRBYFLOAT", String, since "2.6.0", complexity "O(1)" (
        key: Key,
        increment: Double,
    );
    /// Returns the values of every given key, nil for missing ones.
    mget => "MGET", String, since "1.0.0", complexity "O(N) where N is the number of keys to retrieve" (
        keys: Key [multiple],
    );
    /// Sets every given key/value pair.
    mset => "MSET", String, since "1.0.1", complexity "O(N) where N is the number of keys to set" (
        data: Block [multiple],
    );
    /// Sets every given key/value pair, only if none of the keys exist.
    msetnx => "MSETNX", String, since "1.0.1", complexity "O(N) where N is the number of keys to set" (
        data: Block [multiple],
    );
    /// Sets `key` to `value`. `options` takes the condition, `GET` and expiration groups.
    set => "SET", String, since "1.0.0", complexity "O(1)" (
        key: Key,
        value: String,
        options: Block [optional],
    );
    /// Sets `key` to `value` with a timeout in seconds.
    setex => "SETEX", String, since "2.0.0", complexity "O(1)" (
        key: Key,
        seconds: Integer,
        value: String,
    );
    /// Sets `key` to `value` with a timeout in milliseconds.
    psetex => "PSETEX", String, since "2.6.0", complexity "O(1)" (
        key: Key,
        milliseconds: Integer,
        value: String,
    );
    /// Sets `key` to `value` only when it does not exist.
    setnx => "SETNX", String, since "1.0.0", complexity "O(1)" (
        key: Key,
        value: String,
    );
    /// Overwrites part of the string stored at `key`, starting at `offset`.
    setrange => "SETRANGE", String, since "2.2.0", complexity "O(1), not counting the time taken to copy the new string in place" (
        key: Key,
        offset: Integer,
        value: String,
    );
    /// Returns the length of the string stored at `key`.
    strlen => "STRLEN", String, since "2.2.0", complexity "O(1)" (
        key: Key,
    );
    /// Finds the longest common subsequence of two strings.
    lcs => "LCS", String, since "7.0.0", complexity "O(N*M) where N and M are the lengths of s1 and s2, respectively" (
        key1: Key,
        key2: Key,
        options: Block [optional],
    );

    // Hash

    /// Removes fields from the hash stored at `key`.
    hdel => "HDEL", Hash, since "2.0.0", complexity "O(N) where N is the number of fields to be removed" (
        key: Key,
        fields: String [multiple],
    );
    /// Returns whether `field` exists in the hash stored at `key`.
    hexists => "HEXISTS", Hash, since "2.0.0", complexity "O(1)" (
        key: Key,
        field: String,
    );
    /// Returns the value of `field` in the hash stored at `key`.
    hget => "HGET", Hash, since "2.0.0", complexity "O(1)" (
        key: Key,
        field: String,
    );
    /// Returns every field and value of the hash stored at `key`.
    hgetall => "HGETALL", Hash, since "2.0.0", complexity "O(N) where N is the size of the hash" (
        key: Key,
    );
    /// Increments the integer value of `field` by `increment`.
    hincrby => "HINCRBY", Hash, since "2.0.0", complexity "O(1)" (
        key: Key,
        field: String,
        increment: Integer,
    );
    /// Increments the floating point value of `field` by `increment`.
    hincrbyfloat => "HINCRBYFLOAT", Hash, since "2.6.0", complexity "O(1)" (
        key: Key,
        field: String,
        increment: Double,
    );
    /// Returns every field of the hash stored at `key`.
    hkeys => "HKEYS", Hash, since "2.0.0", complexity "O(N) where N is the size of the hash" (
        key: Key,
    );
    /// Returns the number of fields in the hash stored at `key`.
    hlen => "HLEN", Hash, since "2.0.0", complexity "O(1)" (
        key: Key,
    );
    /// Returns the values of the given fields.
    hmget => "HMGET", Hash, since "2.0.0", complexity "O(N) where N is the number of fields being requested" (
        key: Key,
        fields: String [multiple],
    );
    /// Sets the given field/value pairs.
    hset => "HSET", Hash, since "2.0.0", complexity "O(1) for each field/value pair added, so O(N) to add N field/value pairs" (
        key: Key,
        data: Block [multiple],
    );
    /// Sets `field` only when it does not exist yet.
    hsetnx => "HSETNX", Hash, since "2.0.0", complexity "O(1)" (
        key: Key,
        field: String,
        value: String,
    );
    /// Returns the length of the value of `field`.
    hstrlen => "HSTRLEN", Hash, since "3.2.0", complexity "O(1)" (
        key: Key,
        field: String,
    );
    /// Returns every value of the hash stored at `key`.
    hvals => "HVALS", Hash, since "2.0.0", complexity "O(N) where N is the size of the hash" (
        key: Key,
    );

    // List

    /// Returns the element at `index`.
    lindex => "LINDEX", List, since "1.0.0", complexity "O(N) where N is the number of elements to traverse to get to the element at index" (
        key: Key,
        index: Integer,
    );
    /// Inserts `element` before or after `pivot`.
    linsert => "LINSERT", List, since "2.2.0", complexity "O(N) where N is the number of elements to traverse before seeing the value pivot" (
        key: Key,
        position: OneOf,
        pivot: String,
        element: String,
    );
    /// Returns the length of the list stored at `key`.
    llen => "LLEN", List, since "1.0.0", complexity "O(1)" (
        key: Key,
    );
    /// Moves an element from one end of `source` to one end of `destination`.
    lmove => "LMOVE", List, since "6.2.0", complexity "O(1)" (
        source: Key,
        destination: Key,
        wherefrom: OneOf,
        whereto: OneOf,
    );
    /// Removes and returns the first elements of the list.
    lpop => "LPOP", List, since "1.0.0", complexity "O(N) where N is the number of elements returned" (
        key: Key,
        count: Integer [optional],
    );
    /// Prepends elements to the list stored at `key`.
    lpush => "LPUSH", List, since "1.0.0", complexity "O(1) for each element added, so O(N) to add N elements" (
        key: Key,
        elements: String [multiple],
    );
    /// Prepends elements only when the list exists.
    lpushx => "LPUSHX", List, since "2.2.0", complexity "O(1) for each element added, so O(N) to add N elements" (
        key: Key,
        elements: String [multiple],
    );
    /// Returns the elements between `start` and `stop`, both inclusive.
    lrange => "LRANGE", List, since "1.0.0", complexity "O(S+N) where S is the distance of start offset from HEAD and N is the number of elements in the range" (
        key: Key,
        start: Integer,
        stop: Integer,
    );
    /// Removes `count` occurrences of `element`.
    lrem => "LREM", List, since "1.0.0", complexity "O(N+M) where N is the length of the list and M is the number of elements removed" (
        key: Key,
        count: Integer,
        element: String,
    );
    /// Sets the element at `index`.
    lset => "LSET", List, since "1.0.0", complexity "O(N) where N is the length of the list" (
        key: Key,
        index: Integer,
        element: String,
    );
    /// Trims the list to the range between `start` and `stop`.
    ltrim => "LTRIM", List, since "1.0.0", complexity "O(N) where N is the number of elements to be removed by the operation" (
        key: Key,
        start: Integer,
        stop: Integer,
    );
    /// Removes and returns the last elements of the list.
    rpop => "RPOP", List, since "1.0.0", complexity "O(N) where N is the number of elements returned" (
        key: Key,
        count: Integer [optional],
    );
    /// Removes the last element of `source` and prepends it to `destination`.
    rpoplpush => "RPOPLPUSH", List, since "1.2.0", complexity "O(1)" (
        source: Key,
        destination: Key,
    );
    /// Appends elements to the list stored at `key`.
    rpush => "RPUSH", List, since "1.0.0", complexity "O(1) for each element added, so O(N) to add N elements" (
        key: Key,
        elements: String [multiple],
    );
    /// Appends elements only when the list exists.
    rpushx => "RPUSHX", List, since "2.2.0", complexity "O(1) for each element added, so O(N) to add N elements" (
        key: Key,
        elements: String [multiple],
    );

    // Set

    /// Adds members to the set stored at `key`.
    sadd => "SADD", Set, since "1.0.0", complexity "O(1) for each element added, so O(N) to add N elements" (
        key: Key,
        members: String [multiple],
    );
    /// Returns the number of members in the set.
    scard => "SCARD", Set, since "1.0.0", complexity "O(1)" (
        key: Key,
    );
    /// Returns the members of the first set that are in none of the others.
    sdiff => "SDIFF", Set, since "1.0.0", complexity "O(N) where N is the total number of elements in all given sets" (
        keys: Key [multiple],
    );
    /// Returns the members present in every given set.
    sinter => "SINTER", Set, since "1.0.0", complexity "O(N*M) worst case where N is the cardinality of the smallest set and M is the number of sets" (
        keys: Key [multiple],
    );
    /// Returns whether `member` belongs to the set.
    sismember => "SISMEMBER", Set, since "1.0.0", complexity "O(1)" (
        key: Key,
        member: String,
    );
    /// Returns every member of the set.
    smembers => "SMEMBERS", Set, since "1.0.0", complexity "O(N) where N is the set cardinality" (
        key: Key,
    );
    /// Moves `member` from `source` to `destination`.
    smove => "SMOVE", Set, since "1.0.0", complexity "O(1)" (
        source: Key,
        destination: Key,
        member: String,
    );
    /// Removes and returns random members.
    spop => "SPOP", Set, since "1.0.0", complexity "Without the count argument O(1), otherwise O(N) where N is the value of the passed count" (
        key: Key,
        count: Integer [optional],
    );
    /// Returns random members without removing them.
    srandmember => "SRANDMEMBER", Set, since "1.0.0", complexity "Without the count argument O(1), otherwise O(N) where N is the absolute value of the passed count" (
        key: Key,
        count: Integer [optional],
    );
    /// Removes members from the set.
    srem => "SREM", Set, since "1.0.0", complexity "O(N) where N is the number of members to be removed" (
        key: Key,
        members: String [multiple],
    );
    /// Returns the members of every given set.
    sunion => "SUNION", Set, since "1.0.0", complexity "O(N) where N is the total number of elements in all given sets" (
        keys: Key [multiple],
    );

    // Sorted set

    /// Adds members with their scores. `data` is a sequence of `(score, member)` pairs.
    zadd => "ZADD", SortedSet, since "1.2.0", complexity "O(log(N)) for each item added, where N is the number of elements in the sorted set" (
        key: Key,
        options: Block [optional],
        data: Block [multiple],
    );
    /// Returns the number of members in the sorted set.
    zcard => "ZCARD", SortedSet, since "1.2.0", complexity "O(1)" (
        key: Key,
    );
    /// Counts the members with a score between `min` and `max`.
    zcount => "ZCOUNT", SortedSet, since "2.0.0", complexity "O(log(N)) with N being the number of elements in the sorted set" (
        key: Key,
        min: Double,
        max: Double,
    );
    /// Increments the score of `member` by `increment`.
    zincrby => "ZINCRBY", SortedSet, since "1.2.0", complexity "O(log(N)) where N is the number of elements in the sorted set" (
        key: Key,
        increment: Double,
        member: String,
    );
    /// Returns the members in a range.
    zrange => "ZRANGE", SortedSet, since "1.2.0", complexity "O(log(N)+M) with N being the number of elements in the sorted set and M the number of elements returned" (
        key: Key,
        start: String,
        stop: String,
        options: Block [optional],
    );
    /// Returns the rank of `member`, scores ordered low to high.
    zrank => "ZRANK", SortedSet, since "2.0.0", complexity "O(log(N))" (
        key: Key,
        member: String,
    );
    /// Removes members from the sorted set.
    zrem => "ZREM", SortedSet, since "1.2.0", complexity "O(M*log(N)) with N being the number of elements in the sorted set and M the number of elements to be removed" (
        key: Key,
        members: String [multiple],
    );
    /// Returns the rank of `member`, scores ordered high to low.
    zrevrank => "ZREVRANK", SortedSet, since "2.0.0", complexity "O(log(N))" (
        key: Key,
        member: String,
    );
    /// Returns the score of `member`.
    zscore => "ZSCORE", SortedSet, since "1.2.0", complexity "O(1)" (
        key: Key,
        member: String,
    );

    // Pub/Sub

    /// Posts `message` to `channel`, returning the number of receivers.
    publish => "PUBLISH", Pubsub, since "2.0.0", complexity "O(N+M) where N is the number of clients subscribed to the receiving channel and M is the total number of subscribed patterns" (
        channel: String,
        message: String,
    );
}

/// Finds the descriptor of a command, ignoring case.
pub fn lookup(name: &str) -> Option<&'static CommandDescriptor> {
    COMMANDS
        .iter()
        .find(|descriptor| descriptor.name.eq_ignore_ascii_case(name))
}

/// Descriptors belonging to `group`, in table order.
pub fn group(group: Group) -> impl Iterator<Item = &'static CommandDescriptor> {
    COMMANDS
        .iter()
        .filter(move |descriptor| descriptor.group == group)
}
