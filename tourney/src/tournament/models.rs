//! Tournament data models and the tournament lifecycle state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::errors::{EngineError, EngineResult};

/// Tournament ID type
pub type TournamentId = Uuid;

/// Participant ID type
pub type ParticipantId = Uuid;

/// Tournament lifecycle state
///
/// ```text
/// DRAFT -> PUBLISHED -> STARTED -> COMPLETED
///   \__________\___________\______> CANCELLED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentStatus {
    /// Being set up, not visible for registration
    Draft,
    /// Accepting registrations
    Published,
    /// Bracket generated, matches being played
    Started,
    /// Final match scored
    Completed,
    /// Called off by the organizer
    Cancelled,
}

impl TournamentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentStatus::Draft => "DRAFT",
            TournamentStatus::Published => "PUBLISHED",
            TournamentStatus::Started => "STARTED",
            TournamentStatus::Completed => "COMPLETED",
            TournamentStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TournamentStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(TournamentStatus::Draft),
            "PUBLISHED" => Ok(TournamentStatus::Published),
            "STARTED" => Ok(TournamentStatus::Started),
            "COMPLETED" => Ok(TournamentStatus::Completed),
            "CANCELLED" => Ok(TournamentStatus::Cancelled),
            other => Err(EngineError::Corrupt(format!(
                "unknown tournament status '{other}'"
            ))),
        }
    }
}

/// Competition format
///
/// Only single elimination brackets can be generated; the other formats can
/// be stored but not played through this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentFormat {
    SingleElimination,
    DoubleElimination,
    RoundRobin,
    GroupStage,
}

impl TournamentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentFormat::SingleElimination => "SINGLE_ELIMINATION",
            TournamentFormat::DoubleElimination => "DOUBLE_ELIMINATION",
            TournamentFormat::RoundRobin => "ROUND_ROBIN",
            TournamentFormat::GroupStage => "GROUP_STAGE",
        }
    }
}

impl fmt::Display for TournamentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TournamentFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SINGLE_ELIMINATION" => Ok(TournamentFormat::SingleElimination),
            "DOUBLE_ELIMINATION" => Ok(TournamentFormat::DoubleElimination),
            "ROUND_ROBIN" => Ok(TournamentFormat::RoundRobin),
            "GROUP_STAGE" => Ok(TournamentFormat::GroupStage),
            other => Err(EngineError::Corrupt(format!(
                "unknown tournament format '{other}'"
            ))),
        }
    }
}

/// Kind of participant a tournament accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantType {
    Player,
    Team,
}

impl ParticipantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantType::Player => "PLAYER",
            ParticipantType::Team => "TEAM",
        }
    }
}

impl FromStr for ParticipantType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PLAYER" => Ok(ParticipantType::Player),
            "TEAM" => Ok(ParticipantType::Team),
            other => Err(EngineError::Corrupt(format!(
                "unknown participant type '{other}'"
            ))),
        }
    }
}

/// A player or team as seen by the engine. Owned by an external registry;
/// the engine only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    pub participant_type: ParticipantType,
    pub display_name: String,
}

/// Input for creating a tournament
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTournament {
    pub name: String,
    pub discipline: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_format")]
    pub format: TournamentFormat,
    /// Initial status, DRAFT or PUBLISHED
    #[serde(default = "default_status")]
    pub status: TournamentStatus,
    #[serde(default)]
    pub allow_mixed_participants: bool,
    #[serde(default)]
    pub participant_type: Option<ParticipantType>,
    #[serde(default)]
    pub max_participants: Option<u32>,
    #[serde(default)]
    pub webhook_url: Option<String>,
}

fn default_format() -> TournamentFormat {
    TournamentFormat::SingleElimination
}

fn default_status() -> TournamentStatus {
    TournamentStatus::Draft
}

impl NewTournament {
    /// A single elimination tournament for players, created as a draft
    pub fn single_elimination(name: impl Into<String>, discipline: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            discipline: discipline.into(),
            description: None,
            format: TournamentFormat::SingleElimination,
            status: TournamentStatus::Draft,
            allow_mixed_participants: false,
            participant_type: Some(ParticipantType::Player),
            max_participants: None,
            webhook_url: None,
        }
    }

    pub fn published(mut self) -> Self {
        self.status = TournamentStatus::Published;
        self
    }

    pub fn with_max_participants(mut self, max: u32) -> Self {
        self.max_participants = Some(max);
        self
    }

    pub fn with_webhook(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    pub fn mixed(mut self) -> Self {
        self.allow_mixed_participants = true;
        self.participant_type = None;
        self
    }

    /// Check creation rules
    pub fn validate(&self) -> EngineResult<()> {
        if self.name.trim().is_empty() {
            return Err(EngineError::Validation("name must not be empty".to_string()));
        }

        if !self.allow_mixed_participants && self.participant_type.is_none() {
            return Err(EngineError::Validation(
                "participantType is required when mixed participants are disabled".to_string(),
            ));
        }

        if !matches!(
            self.status,
            TournamentStatus::Draft | TournamentStatus::Published
        ) {
            return Err(EngineError::transition("create a tournament", self.status));
        }

        if let Some(max) = self.max_participants
            && max < 2
        {
            return Err(EngineError::Validation(
                "maxParticipants must be at least 2".to_string(),
            ));
        }

        if let Some(url) = &self.webhook_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(EngineError::Validation(
                "webhookUrl must be an http(s) URL".to_string(),
            ));
        }

        Ok(())
    }
}

/// Tournament aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub discipline: String,
    pub description: Option<String>,
    pub format: TournamentFormat,
    pub(crate) status: TournamentStatus,
    pub allow_mixed_participants: bool,
    pub participant_type: Option<ParticipantType>,
    pub max_participants: Option<u32>,
    pub webhook_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency counter, bumped on every persisted update
    pub version: i64,
}

impl Tournament {
    /// Build a tournament from validated input
    pub fn create(id: TournamentId, input: NewTournament, now: DateTime<Utc>) -> EngineResult<Self> {
        input.validate()?;

        Ok(Self {
            id,
            name: input.name,
            discipline: input.discipline,
            description: input.description,
            format: input.format,
            status: input.status,
            allow_mixed_participants: input.allow_mixed_participants,
            participant_type: input.participant_type,
            max_participants: input.max_participants,
            webhook_url: input.webhook_url,
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }

    pub fn status(&self) -> TournamentStatus {
        self.status
    }

    pub fn can_enroll(&self) -> bool {
        self.status == TournamentStatus::Published
    }

    pub fn can_withdraw(&self) -> bool {
        self.status == TournamentStatus::Published
    }

    pub fn can_generate_bracket(&self) -> bool {
        self.status == TournamentStatus::Published
    }

    pub fn can_start_matches(&self) -> bool {
        self.status == TournamentStatus::Started
    }

    /// Whether a participant of this type may enter
    pub fn accepts(&self, participant_type: ParticipantType) -> bool {
        self.allow_mixed_participants || self.participant_type == Some(participant_type)
    }

    pub fn publish(&mut self, now: DateTime<Utc>) -> EngineResult<()> {
        self.transition("publish", TournamentStatus::Draft, TournamentStatus::Published, now)
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> EngineResult<()> {
        self.transition("start", TournamentStatus::Published, TournamentStatus::Started, now)
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> EngineResult<()> {
        self.transition("complete", TournamentStatus::Started, TournamentStatus::Completed, now)
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> EngineResult<()> {
        if matches!(
            self.status,
            TournamentStatus::Completed | TournamentStatus::Cancelled
        ) {
            return Err(EngineError::transition("cancel", self.status));
        }

        self.status = TournamentStatus::Cancelled;
        self.updated_at = now;
        Ok(())
    }

    fn transition(
        &mut self,
        action: &'static str,
        from: TournamentStatus,
        to: TournamentStatus,
        now: DateTime<Utc>,
    ) -> EngineResult<()> {
        if self.status != from {
            return Err(EngineError::transition(action, self.status));
        }

        self.status = to;
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tournament(status: TournamentStatus) -> Tournament {
        let mut t = Tournament::create(
            Uuid::new_v4(),
            NewTournament::single_elimination("Spring Open", "chess"),
            Utc::now(),
        )
        .unwrap();
        t.status = status;
        t
    }

    #[test]
    fn test_happy_path_lifecycle() {
        let now = Utc::now();
        let mut t = tournament(TournamentStatus::Draft);

        t.publish(now).unwrap();
        assert_eq!(t.status(), TournamentStatus::Published);
        t.start(now).unwrap();
        assert_eq!(t.status(), TournamentStatus::Started);
        t.complete(now).unwrap();
        assert_eq!(t.status(), TournamentStatus::Completed);
    }

    #[test]
    fn test_publish_only_from_draft() {
        let mut t = tournament(TournamentStatus::Started);
        let err = t.publish(Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidStateTransition { action: "publish", .. }
        ));
        assert_eq!(t.status(), TournamentStatus::Started);
    }

    #[test]
    fn test_complete_only_from_started() {
        let mut t = tournament(TournamentStatus::Published);
        assert!(t.complete(Utc::now()).is_err());
        assert_eq!(t.status(), TournamentStatus::Published);
    }

    #[test]
    fn test_cancel_from_any_state_but_completed() {
        for status in [
            TournamentStatus::Draft,
            TournamentStatus::Published,
            TournamentStatus::Started,
        ] {
            let mut t = tournament(status);
            t.cancel(Utc::now()).unwrap();
            assert_eq!(t.status(), TournamentStatus::Cancelled);
        }

        let mut t = tournament(TournamentStatus::Completed);
        assert!(t.cancel(Utc::now()).is_err());
        assert_eq!(t.status(), TournamentStatus::Completed);
    }

    #[test]
    fn test_guards_follow_status() {
        let t = tournament(TournamentStatus::Published);
        assert!(t.can_enroll());
        assert!(t.can_withdraw());
        assert!(t.can_generate_bracket());
        assert!(!t.can_start_matches());

        let t = tournament(TournamentStatus::Started);
        assert!(!t.can_enroll());
        assert!(!t.can_withdraw());
        assert!(!t.can_generate_bracket());
        assert!(t.can_start_matches());
    }

    #[test]
    fn test_participant_type_required_unless_mixed() {
        let mut input = NewTournament::single_elimination("Cup", "go");
        input.participant_type = None;
        assert!(matches!(input.validate(), Err(EngineError::Validation(_))));

        assert!(input.mixed().validate().is_ok());
    }

    #[test]
    fn test_cannot_create_started_tournament() {
        let mut input = NewTournament::single_elimination("Cup", "go");
        input.status = TournamentStatus::Started;
        assert!(matches!(
            input.validate(),
            Err(EngineError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_webhook_url_must_be_http() {
        let input = NewTournament::single_elimination("Cup", "go").with_webhook("ftp://example.com");
        assert!(input.validate().is_err());

        let input =
            NewTournament::single_elimination("Cup", "go").with_webhook("https://example.com/hook");
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_accepts_participant_type() {
        let t = tournament(TournamentStatus::Published);
        assert!(t.accepts(ParticipantType::Player));
        assert!(!t.accepts(ParticipantType::Team));
    }

    #[test]
    fn test_status_round_trips_through_storage_form() {
        for status in [
            TournamentStatus::Draft,
            TournamentStatus::Published,
            TournamentStatus::Started,
            TournamentStatus::Completed,
            TournamentStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<TournamentStatus>().unwrap(), status);
        }
        assert!("RUNNING".parse::<TournamentStatus>().is_err());
    }
}
