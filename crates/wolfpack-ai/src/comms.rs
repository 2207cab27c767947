//! Range- and latency-limited messaging inside a pack.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use wolfpack_core::{AgentKey, SimRng, Vec2};

use crate::config::CommsConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum MessageKind {
    TargetSpotted = 0,
    AttackNow = 1,
    Retreat = 2,
    Regroup = 3,
    FlankLeft = 4,
    FlankRight = 5,
    NeedHelp = 6,
}

impl MessageKind {
    pub const ALL: [MessageKind; 7] = [
        MessageKind::TargetSpotted,
        MessageKind::AttackNow,
        MessageKind::Retreat,
        MessageKind::Regroup,
        MessageKind::FlankLeft,
        MessageKind::FlankRight,
        MessageKind::NeedHelp,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            MessageKind::TargetSpotted => "target_spotted",
            MessageKind::AttackNow => "attack_now",
            MessageKind::Retreat => "retreat",
            MessageKind::Regroup => "regroup",
            MessageKind::FlankLeft => "flank_left",
            MessageKind::FlankRight => "flank_right",
            MessageKind::NeedHelp => "need_help",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Payload {
    Position(Vec2),
    Urgency(f32),
}

impl Payload {
    pub fn position(self) -> Option<Vec2> {
        match self {
            Payload::Position(p) => Some(p),
            Payload::Urgency(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Message {
    pub kind: MessageKind,
    pub sender: AgentKey,
    /// Where the sender was when it spoke.
    pub origin: Vec2,
    pub payload: Payload,
    pub send_time: f32,
    pub arrival_time: f32,
}

impl Message {
    pub fn has_arrived(&self, now: f32) -> bool {
        self.arrival_time <= now
    }

    pub fn is_expired(&self, now: f32, ttl: f32) -> bool {
        now > self.arrival_time + ttl
    }
}

/// Bounded inbox; pushing into a full inbox evicts the oldest message.
#[derive(Debug, Clone, PartialEq)]
pub struct Inbox {
    messages: Vec<Message>,
    capacity: usize,
}

impl Inbox {
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: Vec::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, message: Message) {
        if self.messages.len() >= self.capacity {
            self.messages.remove(0);
        }
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn purge_expired(&mut self, now: f32, ttl: f32) {
        self.messages.retain(|m| !m.is_expired(now, ttl));
    }

    /// Removes and returns the oldest arrived, unexpired message accepted by `actionable`.
    ///
    /// Messages the predicate rejects stay queued until they expire.
    pub fn take_actionable(
        &mut self,
        now: f32,
        ttl: f32,
        mut actionable: impl FnMut(&Message) -> bool,
    ) -> Option<Message> {
        let index = self
            .messages
            .iter()
            .position(|m| m.has_arrived(now) && !m.is_expired(now, ttl) && actionable(m))?;
        Some(self.messages.remove(index))
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// A message about to be sent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outgoing {
    pub kind: MessageKind,
    pub sender: AgentKey,
    pub origin: Vec2,
    pub payload: Payload,
}

/// A candidate recipient: a live packmate of the sender.
pub struct Recipient<'a> {
    pub id: AgentKey,
    pub position: Vec2,
    pub inbox: &'a mut Inbox,
}

/// Result of one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    pub delivered: u32,
    pub dropped: u32,
    pub out_of_range: u32,
}

/// Sends one message to every recipient in range.
///
/// Recipients are visited in the order given (member order). Each one in range costs one latency
/// draw, and past `drop_distance` two more draws: the drop probability and the drop roll.
pub fn broadcast<'a>(
    outgoing: Outgoing,
    now: f32,
    recipients: impl IntoIterator<Item = Recipient<'a>>,
    rng: &mut SimRng,
    config: &CommsConfig,
) -> Delivery {
    let Outgoing {
        kind,
        sender,
        origin,
        payload,
    } = outgoing;
    let mut delivery = Delivery::default();
    for recipient in recipients {
        if recipient.id == sender {
            continue;
        }
        let distance = origin.distance(recipient.position);
        if distance > config.range {
            delivery.out_of_range += 1;
            continue;
        }
        let latency = config.latency.sample(rng);
        if distance > config.drop_distance {
            let drop_probability = config.drop_chance.sample(rng);
            if rng.chance(drop_probability) {
                delivery.dropped += 1;
                continue;
            }
        }
        recipient.inbox.push(Message {
            kind,
            sender,
            origin,
            payload,
            send_time: now,
            arrival_time: now + latency,
        });
        delivery.delivered += 1;
    }
    delivery
}
