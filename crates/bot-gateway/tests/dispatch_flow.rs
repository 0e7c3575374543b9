//! End-to-end dispatch flow
//!
//! Feeds a realistic envelope sequence through the dispatcher the way the
//! read loop would and checks the cache and the emitted event stream.

use bot_core::{Snowflake, UserStatus};
use bot_gateway::cache::CacheStore;
use bot_gateway::dispatch::EventDispatcher;
use bot_gateway::events::{EventSink, SemanticEvent};
use bot_gateway::heartbeat::HeartbeatState;
use bot_gateway::protocol::{ClientProperties, Envelope, OpCode};
use bot_gateway::session::{Session, SessionMachine, SessionState};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Default)]
struct CollectorSink {
    events: Mutex<Vec<SemanticEvent>>,
}

impl CollectorSink {
    fn names(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .map(|e| e.name().to_string())
            .collect()
    }
}

impl EventSink for CollectorSink {
    fn emit(&self, event: SemanticEvent) {
        self.events.lock().push(event);
    }
}

struct Flow {
    dispatcher: EventDispatcher,
    cache: Arc<CacheStore>,
    session: Arc<Session>,
    heartbeat: Arc<HeartbeatState>,
    sink: Arc<CollectorSink>,
    outbound: mpsc::UnboundedReceiver<Envelope>,
}

fn flow() -> Flow {
    let cache = Arc::new(CacheStore::new());
    let session = Arc::new(Session::new());
    let heartbeat = Arc::new(HeartbeatState::new());
    let sink = Arc::new(CollectorSink::default());
    let (tx, outbound) = mpsc::unbounded_channel();
    session.attach_outbound(tx);

    let machine = SessionMachine::new(
        "token123".to_string(),
        ClientProperties::new("test-bot"),
        session.clone(),
        heartbeat.clone(),
    );
    let mut dispatcher =
        EventDispatcher::new(cache.clone(), sink.clone(), heartbeat.clone(), machine);
    dispatcher.machine_mut().on_open();

    Flow {
        dispatcher,
        cache,
        session,
        heartbeat,
        sink,
        outbound,
    }
}

fn hello(interval: u64) -> Envelope {
    Envelope {
        op: OpCode::Hello,
        d: Some(json!({ "heartbeat_interval": interval })),
        s: None,
        t: None,
    }
}

#[test]
fn fresh_session_builds_cache_and_emits_in_order() {
    let mut f = flow();

    f.dispatcher.handle(hello(41_250));
    let first = f.outbound.try_recv().unwrap();
    assert_eq!(first.op, OpCode::Identify);

    f.dispatcher.handle(Envelope::dispatch(
        "READY",
        1,
        json!({
            "session_id": "sess-1",
            "user": {"id": "1", "username": "bot", "discriminator": "0000"}
        }),
    ));
    assert_eq!(f.dispatcher.machine_mut().state(), SessionState::Connected);

    f.dispatcher.handle(Envelope::dispatch(
        "GUILD_CREATE",
        2,
        json!({
            "id": "1",
            "name": "Test Guild",
            "channels": [{"id": "10", "type": 0, "name": "general", "topic": "chatter"}],
            "members": [
                {"user": {"id": "5", "username": "timmy", "discriminator": "0001"}},
                {"user": {"id": "6", "username": "pal", "discriminator": "0002"}}
            ],
            "presences": [{"user": {"id": "5"}, "status": "online"}]
        }),
    ));

    // Presence: pal comes online, then goes idle while starting a game
    f.dispatcher.handle(Envelope::dispatch(
        "PRESENCE_UPDATE",
        3,
        json!({"guild_id": "1", "user": {"id": "6"}, "status": "online"}),
    ));
    f.dispatcher.handle(Envelope::dispatch(
        "PRESENCE_UPDATE",
        4,
        json!({
            "guild_id": "1",
            "user": {"id": "6"},
            "status": "idle",
            "game": {"name": "Factory Builder"}
        }),
    ));

    // Member: timmy gets a nickname
    f.dispatcher.handle(Envelope::dispatch(
        "GUILD_MEMBER_UPDATE",
        5,
        json!({
            "guild_id": "1",
            "user": {"id": "5", "username": "timmy", "discriminator": "0001"},
            "nick": "Bob"
        }),
    ));

    // Channel rename plus a message
    f.dispatcher.handle(Envelope::dispatch(
        "CHANNEL_UPDATE",
        6,
        json!({
            "id": "10",
            "type": 0,
            "guild_id": "1",
            "name": "lounge",
            "topic": "chatter",
            "position": 0
        }),
    ));
    f.dispatcher.handle(Envelope::dispatch(
        "MESSAGE_CREATE",
        7,
        json!({
            "id": "100",
            "channel_id": "10",
            "content": "hello",
            "author": {"id": "5", "username": "timmy", "discriminator": "0001"}
        }),
    ));

    assert_eq!(
        f.sink.names(),
        vec![
            "CONNECTED",
            "GUILD_CREATE",
            "PRESENCE_GO_ONLINE",
            "PRESENCE_UPDATE_STATUS",
            "PRESENCE_UPDATE_GAME",
            "MEMBER_UPDATE_NICK",
            "CHANNEL_UPDATE_NAME",
            "MESSAGE_CREATE",
        ]
    );

    let guild = f.cache.guild(Snowflake::new(1)).unwrap();
    assert_eq!(guild.member(Snowflake::new(5)).unwrap().nick.as_deref(), Some("Bob"));
    assert_eq!(
        guild.presence(Snowflake::new(6)).unwrap().status,
        UserStatus::Idle
    );
    let channel = guild.channel(Snowflake::new(10)).unwrap();
    assert_eq!(channel.name.as_deref(), Some("lounge"));
    assert_eq!(channel.last_message_id, Some(Snowflake::new(100)));

    assert_eq!(f.heartbeat.seq(), 7);
    assert_eq!(f.session.id().as_deref(), Some("sess-1"));
}

#[test]
fn resumed_session_keeps_cache_and_flushes_queue() {
    let mut f = flow();

    // Previously recorded session state
    f.session.set_id("sess-1".to_string());
    f.heartbeat.record_seq(42);
    f.cache.insert_guild(
        serde_json::from_value(json!({"id": "1", "name": "Kept Guild"})).unwrap(),
    );

    // Something queued while disconnected
    f.session.send(Envelope::heartbeat(42));

    f.dispatcher.handle(hello(41_250));
    let resume = f.outbound.try_recv().unwrap();
    assert_eq!(resume.op, OpCode::Resume);
    let d = resume.d.clone().unwrap();
    assert_eq!(d["session_id"], "sess-1");
    assert_eq!(d["seq"], 42);

    f.dispatcher
        .handle(Envelope::dispatch("RESUMED", 43, json!({})));

    // Cache survived the resume, CONNECTED fired, queue flushed
    assert!(f.cache.guild(Snowflake::new(1)).is_some());
    assert_eq!(f.sink.names(), vec!["CONNECTED"]);
    let flushed = f.outbound.try_recv().unwrap();
    assert_eq!(flushed.op, OpCode::Heartbeat);
}

#[test]
fn guild_member_remove_drops_member_and_presence() {
    let mut f = flow();
    f.dispatcher.handle(hello(41_250));
    f.dispatcher.handle(Envelope::dispatch(
        "READY",
        1,
        json!({
            "session_id": "sess-1",
            "user": {"id": "1", "username": "bot", "discriminator": "0000"}
        }),
    ));
    f.dispatcher.handle(Envelope::dispatch(
        "GUILD_CREATE",
        2,
        json!({
            "id": "1",
            "name": "Test Guild",
            "members": [{"user": {"id": "5", "username": "timmy", "discriminator": "0001"}}],
            "presences": [{"user": {"id": "5"}, "status": "online"}]
        }),
    ));

    f.dispatcher.handle(Envelope::dispatch(
        "GUILD_MEMBER_REMOVE",
        3,
        json!({
            "guild_id": "1",
            "user": {"id": "5", "username": "timmy", "discriminator": "0001"}
        }),
    ));

    let guild = f.cache.guild(Snowflake::new(1)).unwrap();
    assert!(guild.member(Snowflake::new(5)).is_none());
    assert!(guild.presence(Snowflake::new(5)).is_none());
    assert_eq!(
        f.sink.names().last().map(String::as_str),
        Some("USER_REMOVE")
    );
}
