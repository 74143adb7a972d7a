use std::collections::{BTreeSet, HashMap};

use super::domain::{ConversationSummary, Message};
use crate::marketplace::domain::{CampaignId, UserId};

struct Thread {
    last_message: Message,
    last_position: usize,
    participants: BTreeSet<UserId>,
    message_count: usize,
}

/// Group `user_id`'s messages by campaign, most recent thread first.
///
/// `messages` must be in log order. Messages not involving the user are ignored. Within a
/// thread the latest timestamp wins, with later log position breaking ties, and threads are
/// ordered the same way.
pub fn project_conversations<I>(user_id: &UserId, messages: I) -> Vec<ConversationSummary>
where
    I: IntoIterator<Item = Message>,
{
    let mut threads: HashMap<CampaignId, Thread> = HashMap::new();

    for (position, message) in messages.into_iter().enumerate() {
        if !message.involves(user_id) {
            continue;
        }

        match threads.get_mut(&message.campaign_id) {
            Some(thread) => {
                thread.participants.insert(message.sender_id.clone());
                thread.participants.insert(message.receiver_id.clone());
                thread.message_count += 1;
                if message.timestamp >= thread.last_message.timestamp {
                    thread.last_message = message;
                    thread.last_position = position;
                }
            }
            None => {
                let participants =
                    BTreeSet::from([message.sender_id.clone(), message.receiver_id.clone()]);
                threads.insert(
                    message.campaign_id.clone(),
                    Thread {
                        last_message: message,
                        last_position: position,
                        participants,
                        message_count: 1,
                    },
                );
            }
        }
    }

    let mut threads: Vec<(CampaignId, Thread)> = threads.into_iter().collect();
    threads.sort_by(|(_, a), (_, b)| {
        b.last_message
            .timestamp
            .cmp(&a.last_message.timestamp)
            .then_with(|| b.last_position.cmp(&a.last_position))
    });

    threads
        .into_iter()
        .map(|(campaign_id, thread)| ConversationSummary {
            campaign_id,
            last_message: thread.last_message,
            participants: thread.participants,
            message_count: thread.message_count,
        })
        .collect()
}
