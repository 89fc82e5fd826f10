use std::{collections::HashMap, sync::Arc, time::Duration};

use futures::future::join_all;
use road_reports::database::Database;
use telegram::{model::Update, TelegramClient};
use tokio::task::JoinSet;

use crate::{
    command::Command,
    dispatcher::{Content, Dispatcher, Incoming, Reply},
    BotSettings,
};

const RETRY_DELAY: Duration = Duration::from_secs(5);
const EVICTION_INTERVAL: Duration = Duration::from_secs(60);
const MIN_EVICTION_INTERVAL: Duration = Duration::from_secs(1);

impl Incoming {
    /// `None` for updates that carry nothing the bot reacts to.
    pub fn from_update(update: Update) -> Option<Self> {
        let message = update.message?;
        let user = message.from.map(|from| from.id).unwrap_or(message.chat.id);
        let content = if let Some(location) = message.location {
            Content::Location {
                latitude: location.latitude,
                longitude: location.longitude,
            }
        } else {
            let text = message.text?;
            match Command::parse(&text) {
                Some(command) => Content::Command(command),
                None => Content::Text(text),
            }
        };
        Some(Self {
            user,
            chat: message.chat.id,
            content,
        })
    }
}

/// Messages of one batch grouped by user, in the order they arrived.
fn group_by_user(updates: Vec<Update>) -> Vec<Vec<Incoming>> {
    let mut order = Vec::new();
    let mut groups: HashMap<i64, Vec<Incoming>> = HashMap::new();
    for incoming in updates.into_iter().filter_map(Incoming::from_update) {
        let user = incoming.user;
        groups
            .entry(user)
            .or_insert_with(|| {
                order.push(user);
                Vec::new()
            })
            .push(incoming);
    }
    order
        .into_iter()
        .filter_map(|user| groups.remove(&user))
        .collect()
}

/// Sweeps at least once per session timeout so stale sessions do not pile up.
fn eviction_interval(session_timeout: Duration) -> Duration {
    EVICTION_INTERVAL
        .min(session_timeout)
        .max(MIN_EVICTION_INTERVAL)
}

/// Offset that confirms every update of the batch.
fn next_offset(current: Option<i64>, updates: &[Update]) -> Option<i64> {
    updates
        .iter()
        .map(|update| update.update_id + 1)
        .max()
        .max(current)
}

pub struct Bot<D>
where
    D: Database,
{
    telegram: TelegramClient,
    dispatcher: Arc<Dispatcher<D>>,
    settings: BotSettings,
}

impl<D> Bot<D>
where
    D: Database,
{
    pub fn new(telegram: TelegramClient, dispatcher: Dispatcher<D>, settings: BotSettings) -> Self {
        Self {
            telegram,
            dispatcher: Arc::new(dispatcher),
            settings,
        }
    }

    /// Polls telegram until the future is dropped. Users are served
    /// concurrently, the messages of a single user strictly in order.
    pub async fn run(self) {
        // dropping the set aborts the sweep together with the polling loop
        let mut background = JoinSet::new();
        background.spawn(Self::evict_sessions(self.dispatcher.clone()));
        let mut offset = None;
        log::info!("bot started polling");
        loop {
            let updates = match self
                .telegram
                .get_updates(offset, self.settings.poll_timeout.as_secs())
                .await
            {
                Ok(updates) => updates,
                Err(why) => {
                    log::error!("failed to poll updates: {}", why);
                    tokio::time::sleep(RETRY_DELAY).await;
                    continue;
                }
            };
            if updates.is_empty() {
                continue;
            }
            log::debug!("received {} update(s)", updates.len());
            offset = next_offset(offset, &updates);

            join_all(
                group_by_user(updates)
                    .into_iter()
                    .map(|messages| self.serve_user(messages)),
            )
            .await;
        }
    }

    async fn serve_user(&self, messages: Vec<Incoming>) {
        for incoming in messages {
            let chat = incoming.chat;
            for reply in self.dispatcher.handle(incoming).await {
                self.send(chat, reply).await;
            }
        }
    }

    async fn send(&self, chat: i64, reply: Reply) {
        let result = match &reply {
            Reply::Text { text, markup } => {
                self.telegram
                    .send_message(chat, text, markup.as_ref())
                    .await
            }
            Reply::Photo { url, markup } => {
                self.telegram
                    .send_photo(chat, url, markup.as_ref())
                    .await
            }
        };
        if let Err(why) = result {
            log::error!("failed to reply to chat {}: {}", chat, why);
        }
    }

    async fn evict_sessions(dispatcher: Arc<Dispatcher<D>>) {
        let period = eviction_interval(dispatcher.sessions().timeout());
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let removed = dispatcher
                .sessions()
                .evict_expired(std::time::Instant::now())
                .await;
            if removed > 0 {
                log::debug!("evicted {} expired session(s)", removed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use database::{DatabaseConnectionInfo, SqliteDatabase};
    use model::report::ReportKind;
    use road_reports::server::Server;
    use serde_json::json;
    use telegram::TelegramCredentials;

    use super::*;
    use crate::{map::NoMap, session::SessionStore};

    fn update(id: i64, user: i64, message: serde_json::Value) -> Update {
        let mut message = message;
        message["message_id"] = json!(id);
        message["from"] = json!({"id": user, "is_bot": false, "first_name": "Test"});
        message["chat"] = json!({"id": user + 1000, "type": "private"});
        serde_json::from_value(json!({"update_id": id, "message": message})).unwrap()
    }

    #[test]
    fn converts_updates() {
        let incoming = Incoming::from_update(update(1, 7, json!({"text": "/hazard"}))).unwrap();
        assert_eq!(
            incoming,
            Incoming {
                user: 7,
                chat: 1007,
                content: Content::Command(Command::Report(ReportKind::Hazard)),
            }
        );

        let incoming = Incoming::from_update(update(
            2,
            7,
            json!({"location": {"latitude": 40.0, "longitude": -73.0}}),
        ))
        .unwrap();
        assert_eq!(
            incoming.content,
            Content::Location {
                latitude: 40.0,
                longitude: -73.0
            }
        );

        let incoming = Incoming::from_update(update(3, 7, json!({"text": "hello"}))).unwrap();
        assert_eq!(incoming.content, Content::Text("hello".to_owned()));
    }

    #[test]
    fn skips_updates_without_content() {
        assert_eq!(Incoming::from_update(update(1, 7, json!({}))), None);
        let empty: Update = serde_json::from_value(json!({"update_id": 5})).unwrap();
        assert_eq!(Incoming::from_update(empty), None);
    }

    #[test]
    fn groups_keep_arrival_order() {
        let groups = group_by_user(vec![
            update(1, 7, json!({"text": "/roadblock"})),
            update(2, 8, json!({"text": "/traffic"})),
            update(3, 7, json!({"location": {"latitude": 1.0, "longitude": 2.0}})),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[0][0].user, 7);
        assert!(matches!(groups[0][1].content, Content::Location { .. }));
        assert_eq!(groups[1][0].user, 8);
    }

    #[test]
    fn offset_moves_past_last_update() {
        let updates = vec![
            update(10, 7, json!({"text": "/help"})),
            update(12, 7, json!({"text": "/help"})),
        ];
        assert_eq!(next_offset(None, &updates), Some(13));
        assert_eq!(next_offset(Some(20), &updates), Some(20));
        assert_eq!(next_offset(Some(4), &[]), Some(4));
    }

    #[test]
    fn sweep_follows_short_session_timeouts() {
        assert_eq!(eviction_interval(Duration::from_secs(600)), EVICTION_INTERVAL);
        assert_eq!(
            eviction_interval(Duration::from_secs(10)),
            Duration::from_secs(10)
        );
        assert_eq!(eviction_interval(Duration::ZERO), MIN_EVICTION_INTERVAL);
    }

    #[tokio::test]
    async fn stopping_the_bot_stops_the_sweep() {
        let database = SqliteDatabase::connect(DatabaseConnectionInfo::in_memory())
            .await
            .unwrap();
        let dispatcher = Arc::new(Dispatcher::new(
            Server::new(database).client("polling-test"),
            Arc::new(SessionStore::new(Duration::from_secs(600))),
            Arc::new(NoMap),
        ));
        let bot = Bot {
            telegram: TelegramClient::with_base_url(
                TelegramCredentials::new("1:test"),
                "http://127.0.0.1:1",
            ),
            dispatcher: dispatcher.clone(),
            settings: BotSettings::default(),
        };

        let stopped = tokio::time::timeout(Duration::from_millis(100), bot.run()).await;
        assert!(stopped.is_err());
        // aborted tasks are released by the runtime on its next turn
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(Arc::strong_count(&dispatcher), 1);
    }
}
