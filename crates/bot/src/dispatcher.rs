use std::{fmt::Write as _, sync::Arc, time::Instant};

use model::report::{HazardMarker, Report, ReportDraft, ReportKind};
use model::{WithDistance, WithId};
use road_reports::{client::Client, database::Database, ReportError};
use telegram::model::ReplyMarkup;

use crate::{
    command::Command,
    map::MapRenderer,
    session::{PendingRequest, SessionStore},
};

pub const WELCOME_TEXT: &str =
    "Welcome to the Driver Assistant Bot! 🚗\nUse /help to see available commands.";

pub const HELP_TEXT: &str = "Here are the commands you can use:\n\
    /start - Start the bot\n\
    /help - Show help message\n\
    /roadblock - Report a roadblock\n\
    /hazard - Report a hazard\n\
    /traffic - Get traffic updates";

pub const SHARE_LOCATION_LABEL: &str = "Share Location";
pub const NO_HAZARDS_TEXT: &str = "No nearby hazards reported. Drive safely!";
pub const UNSOLICITED_LOCATION_TEXT: &str = "Location received. Thank you!";
pub const STORAGE_UNAVAILABLE_TEXT: &str =
    "Sorry, that didn't work right now. Please try again later.";

/// One message from a user, stripped of everything the dispatcher ignores.
#[derive(Debug, Clone, PartialEq)]
pub struct Incoming {
    pub user: i64,
    pub chat: i64,
    pub content: Content,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Command(Command),
    Location { latitude: f64, longitude: f64 },
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text {
        text: String,
        markup: Option<ReplyMarkup>,
    },
    Photo {
        url: String,
        markup: Option<ReplyMarkup>,
    },
}

impl Reply {
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self::Text {
            text: text.into(),
            markup: None,
        }
    }

    fn ask_for_location<S: Into<String>>(text: S) -> Self {
        Self::Text {
            text: text.into(),
            markup: Some(ReplyMarkup::request_location(SHARE_LOCATION_LABEL)),
        }
    }

    /// Hides the location keyboard once the location it asked for arrived.
    fn closing_keyboard(self) -> Self {
        let remove = Some(ReplyMarkup::remove());
        match self {
            Self::Text { text, markup: None } => Self::Text {
                text,
                markup: remove,
            },
            Self::Photo { url, markup: None } => Self::Photo {
                url,
                markup: remove,
            },
            other => other,
        }
    }
}

/// Maps user messages onto the report store. Holds no transport; replies are
/// returned to the caller, which sends them.
pub struct Dispatcher<D>
where
    D: Database,
{
    client: Client<D>,
    sessions: Arc<SessionStore>,
    renderer: Arc<dyn MapRenderer>,
}

impl<D> Dispatcher<D>
where
    D: Database,
{
    pub fn new(client: Client<D>, sessions: Arc<SessionStore>, renderer: Arc<dyn MapRenderer>) -> Self {
        Self {
            client,
            sessions,
            renderer,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub async fn handle(&self, incoming: Incoming) -> Vec<Reply> {
        self.handle_at(incoming, Instant::now()).await
    }

    pub async fn handle_at(&self, incoming: Incoming, now: Instant) -> Vec<Reply> {
        match incoming.content {
            Content::Command(command) => self.on_command(incoming.user, command, now).await,
            Content::Location {
                latitude,
                longitude,
            } => self.on_location(incoming.user, latitude, longitude, now).await,
            // free text is not part of the conversation
            Content::Text(_) => vec![],
        }
    }

    async fn on_command(&self, user: i64, command: Command, now: Instant) -> Vec<Reply> {
        match command {
            Command::Start => {
                self.sessions.cancel(user).await;
                vec![Reply::text(WELCOME_TEXT)]
            }
            Command::Help => vec![Reply::text(HELP_TEXT)],
            Command::Report(kind) => {
                self.sessions
                    .await_location(user, PendingRequest::Report(kind), now)
                    .await;
                vec![Reply::ask_for_location(format!(
                    "Please share your location to report the {}.",
                    kind
                ))]
            }
            Command::Traffic => {
                self.sessions
                    .await_location(user, PendingRequest::Traffic, now)
                    .await;
                vec![Reply::ask_for_location(
                    "Please share your location to get real-time traffic updates.",
                )]
            }
            Command::Unknown(name) => vec![Reply::text(format!(
                "Unknown command /{}. Use /help to see available commands.",
                name
            ))],
        }
    }

    async fn on_location(
        &self,
        user: i64,
        latitude: f64,
        longitude: f64,
        now: Instant,
    ) -> Vec<Reply> {
        match self.sessions.take_pending(user, now).await {
            Some(PendingRequest::Report(kind)) => {
                vec![self.report(kind, latitude, longitude).await.closing_keyboard()]
            }
            Some(PendingRequest::Traffic) => {
                vec![self.traffic(latitude, longitude).await.closing_keyboard()]
            }
            None => vec![Reply::text(UNSOLICITED_LOCATION_TEXT)],
        }
    }

    async fn report(&self, kind: ReportKind, latitude: f64, longitude: f64) -> Reply {
        let draft = ReportDraft::new(
            kind.as_str(),
            Some(format!("User-reported {}", kind)),
            Some(latitude),
            Some(longitude),
        );
        match self.client.save_report(draft).await {
            Ok(_) => Reply::text(format!(
                "{} reported at Latitude: {}, Longitude: {}.",
                kind.title(),
                latitude,
                longitude
            )),
            Err(why) => error_reply(why),
        }
    }

    async fn traffic(&self, latitude: f64, longitude: f64) -> Reply {
        let nearby = match self.client.find_nearby(latitude, longitude).await {
            Ok(nearby) => nearby,
            Err(why) => return error_reply(why),
        };
        if nearby.is_empty() {
            return Reply::text(NO_HAZARDS_TEXT);
        }
        let markers = nearby
            .iter()
            .map(|report| report.content.content.marker())
            .collect::<Vec<HazardMarker>>();
        match self.renderer.render(&markers) {
            Some(url) => Reply::Photo { url, markup: None },
            None => Reply::text(hazard_list(&nearby)),
        }
    }
}

fn error_reply(why: ReportError) -> Reply {
    match why {
        ReportError::Validation(why) => {
            Reply::text(format!("That location can't be used: {}.", why))
        }
        other => {
            log::error!("request failed: {}", other);
            Reply::text(STORAGE_UNAVAILABLE_TEXT)
        }
    }
}

/// Text version of the traffic map.
fn hazard_list(nearby: &[WithDistance<WithId<Report>>]) -> String {
    let mut text = format!("{} nearby report(s):", nearby.len());
    for report in nearby {
        let content = &report.content.content;
        let _ = write!(
            text,
            "\n- {} at {}, {} ({:.2} km)",
            content.kind.title(),
            content.location.latitude(),
            content.location.longitude(),
            report.distance_km
        );
        if let Some(details) = &content.details {
            let _ = write!(text, ": {}", details);
        }
    }
    text
}
