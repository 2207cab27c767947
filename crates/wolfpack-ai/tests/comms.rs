use wolfpack_ai::comms::{broadcast, Inbox, Message, MessageKind, Outgoing, Payload, Recipient};
use wolfpack_ai::config::CommsConfig;
use wolfpack_ai::{AgentKey, SimRng, Vec2};

fn outgoing(kind: MessageKind, origin: Vec2) -> Outgoing {
    Outgoing {
        kind,
        sender: AgentKey(0),
        origin,
        payload: Payload::Position(origin),
    }
}

fn message(kind: MessageKind, arrival: f32) -> Message {
    Message {
        kind,
        sender: AgentKey(9),
        origin: Vec2::ZERO,
        payload: Payload::Urgency(1.0),
        send_time: arrival - 0.1,
        arrival_time: arrival,
    }
}

#[test]
fn attack_now_arrives_within_latency_window() {
    let config = CommsConfig::default();
    let mut rng = SimRng::new(12345);
    let mut inbox = Inbox::new(config.inbox_capacity);
    let now = 3.0;

    for _ in 0..200 {
        inbox.clear();
        let delivery = broadcast(
            outgoing(MessageKind::AttackNow, Vec2::new(0.5, 0.5)),
            now,
            [Recipient {
                id: AgentKey(1),
                position: Vec2::new(0.6, 0.5),
                inbox: &mut inbox,
            }],
            &mut rng,
            &config,
        );
        assert_eq!(delivery.delivered, 1);
        let m = inbox.iter().next().unwrap();
        assert_eq!(m.kind, MessageKind::AttackNow);
        assert_eq!(m.send_time, now);
        assert!(m.arrival_time >= now + 0.08 - 1e-6, "early: {}", m.arrival_time);
        assert!(m.arrival_time <= now + 0.16 + 1e-6, "late: {}", m.arrival_time);
        assert!(!m.has_arrived(now));
    }
    // Close recipients cost exactly one latency draw each.
    assert_eq!(rng.draws(), 200);
}

#[test]
fn long_range_drop_rate_matches_configuration() {
    let config = CommsConfig::default();
    let mut rng = SimRng::new(777);
    let mut inbox = Inbox::new(config.inbox_capacity);
    let mut dropped = 0;

    for _ in 0..1000 {
        let delivery = broadcast(
            outgoing(MessageKind::NeedHelp, Vec2::new(0.1, 0.5)),
            0.0,
            [Recipient {
                id: AgentKey(1),
                position: Vec2::new(0.48, 0.5),
                inbox: &mut inbox,
            }],
            &mut rng,
            &config,
        );
        dropped += delivery.dropped;
    }

    let rate = dropped as f32 / 1000.0;
    assert!((0.02..=0.06).contains(&rate), "drop rate {rate}");
}

#[test]
fn out_of_range_and_sender_are_skipped() {
    let config = CommsConfig::default();
    let mut rng = SimRng::new(1);
    let mut own = Inbox::new(4);
    let mut far = Inbox::new(4);
    let mut near = Inbox::new(4);

    let delivery = broadcast(
        outgoing(MessageKind::Regroup, Vec2::new(0.1, 0.1)),
        0.0,
        [
            Recipient {
                id: AgentKey(0),
                position: Vec2::new(0.1, 0.1),
                inbox: &mut own,
            },
            Recipient {
                id: AgentKey(1),
                position: Vec2::new(0.9, 0.9),
                inbox: &mut far,
            },
            Recipient {
                id: AgentKey(2),
                position: Vec2::new(0.2, 0.1),
                inbox: &mut near,
            },
        ],
        &mut rng,
        &config,
    );

    assert_eq!(delivery.delivered, 1);
    assert_eq!(delivery.out_of_range, 1);
    assert!(own.is_empty());
    assert!(far.is_empty());
    assert_eq!(near.len(), 1);
    assert_eq!(rng.draws(), 1);
}

#[test]
fn full_inbox_evicts_oldest() {
    let mut inbox = Inbox::new(2);
    inbox.push(message(MessageKind::TargetSpotted, 1.0));
    inbox.push(message(MessageKind::Regroup, 2.0));
    inbox.push(message(MessageKind::Retreat, 3.0));

    let kinds: Vec<MessageKind> = inbox.iter().map(|m| m.kind).collect();
    assert_eq!(kinds, vec![MessageKind::Regroup, MessageKind::Retreat]);
    assert_eq!(inbox.capacity(), 2);
}

#[test]
fn messages_expire_one_second_after_arrival() {
    let ttl = CommsConfig::default().message_ttl;
    let mut inbox = Inbox::new(8);
    inbox.push(message(MessageKind::TargetSpotted, 1.0));
    inbox.push(message(MessageKind::Retreat, 1.8));

    inbox.purge_expired(2.5, ttl);

    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox.iter().next().unwrap().kind, MessageKind::Retreat);
}

#[test]
fn take_actionable_skips_pending_and_rejected_messages() {
    let ttl = 1.0;
    let mut inbox = Inbox::new(8);
    inbox.push(message(MessageKind::TargetSpotted, 1.0));
    inbox.push(message(MessageKind::AttackNow, 1.1));
    inbox.push(message(MessageKind::Retreat, 5.0));

    let taken = inbox.take_actionable(1.5, ttl, |m| m.kind != MessageKind::TargetSpotted);
    assert_eq!(taken.map(|m| m.kind), Some(MessageKind::AttackNow));
    // The rejected message stays queued; the future one is not yet readable.
    assert_eq!(inbox.len(), 2);
    assert!(inbox.take_actionable(1.5, ttl, |m| m.kind == MessageKind::Retreat).is_none());
}
