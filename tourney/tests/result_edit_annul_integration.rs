//! Integration tests for correcting results
//!
//! Edits and annulments pull a retracted winner back out of the next round,
//! and are refused once that next round has been played.

use tourney::{
    Engine, EngineContext, EngineError, Match, NewTournament, Participant,
    ParticipantId, ParticipantType, ScoreInput, Slot, TournamentId, bracket::Advancement,
};
use uuid::Uuid;

struct Bracket {
    engine: Engine,
    id: TournamentId,
    /// Index 0 is seed 1
    seeds: Vec<ParticipantId>,
}

async fn four_player_bracket() -> Bracket {
    let (ctx, store) = EngineContext::in_memory();
    let engine = Engine::new(ctx);
    let t = engine
        .tournaments
        .create_tournament(NewTournament::single_elimination("Corrections Cup", "chess").published())
        .await
        .unwrap();

    let mut seeds = Vec::new();
    for n in 1..=4 {
        let id = Uuid::new_v4();
        store
            .insert_participant(Participant {
                id,
                participant_type: ParticipantType::Player,
                display_name: format!("Seed {n}"),
            })
            .await;
        engine.tournaments.register_entry(t.id, id, None).await.unwrap();
        seeds.push(id);
    }
    engine.brackets.generate_bracket(t.id).await.unwrap();

    Bracket {
        engine,
        id: t.id,
        seeds,
    }
}

impl Bracket {
    fn seed(&self, n: usize) -> ParticipantId {
        self.seeds[n - 1]
    }

    async fn at(&self, round: u32, position: u32) -> Match {
        self.engine
            .matches
            .list_matches(self.id)
            .await
            .unwrap()
            .into_iter()
            .find(|m| m.round_number == round && m.position() == position)
            .unwrap()
    }

    fn scores(&self, first: (usize, i64), second: (usize, i64)) -> [ScoreInput; 2] {
        [
            ScoreInput::new(self.seed(first.0), first.1),
            ScoreInput::new(self.seed(second.0), second.1),
        ]
    }

    /// Plays both semi-finals: 1 beats 4, 2 beats 3
    async fn play_round_one(&self) -> (Match, Match) {
        let a = self.at(1, 1).await;
        let b = self.at(1, 2).await;
        self.engine
            .matches
            .record_result(a.id, self.scores((1, 3), (4, 1)))
            .await
            .unwrap();
        self.engine
            .matches
            .record_result(b.id, self.scores((2, 3), (3, 1)))
            .await
            .unwrap();
        (a, b)
    }
}

#[tokio::test]
async fn test_edit_swaps_winner_in_next_round() {
    let b = four_player_bracket().await;
    let (first, _) = b.play_round_one().await;

    let update = b
        .engine
        .matches
        .edit_result(first.id, b.scores((1, 1), (4, 3)))
        .await
        .unwrap();
    assert!(matches!(update.advancement, Advancement::Seated { .. }));
    assert_eq!(update.scored.winner(), Some(b.seed(4)));

    let final_match = b.at(2, 1).await;
    assert_eq!(final_match.participants[0].slot, Slot::Participant(b.seed(4)));
    assert_eq!(final_match.participants[1].slot, Slot::Participant(b.seed(2)));
}

#[tokio::test]
async fn test_edit_with_same_winner_only_changes_scores() {
    let b = four_player_bracket().await;
    let (first, _) = b.play_round_one().await;
    let before = b.at(2, 1).await;

    let update = b
        .engine
        .matches
        .edit_result(first.id, b.scores((1, 5), (4, 0)))
        .await
        .unwrap();
    assert_eq!(update.advancement, Advancement::Unchanged);
    assert_eq!(update.scored.participants[0].score, Some(5));

    let after = b.at(2, 1).await;
    assert_eq!(after.participants, before.participants);
}

#[tokio::test]
async fn test_edit_to_draw_reopens_slot() {
    let b = four_player_bracket().await;
    let (first, _) = b.play_round_one().await;

    b.engine
        .matches
        .edit_result(first.id, b.scores((1, 2), (4, 2)))
        .await
        .unwrap();

    let final_match = b.at(2, 1).await;
    assert_eq!(final_match.participants[0].slot, Slot::Pending(first.id));
    assert_eq!(final_match.participants[1].slot, Slot::Participant(b.seed(2)));
    assert!(!final_match.is_playable());
}

#[tokio::test]
async fn test_annul_reopens_match_and_slot() {
    let b = four_player_bracket().await;
    let (_, second) = b.play_round_one().await;

    let update = b.engine.matches.annul_result(second.id).await.unwrap();
    assert!(!update.scored.is_completed());
    assert!(
        update
            .scored
            .participants
            .iter()
            .all(|p| p.score.is_none() && p.result.is_none())
    );

    let final_match = b.at(2, 1).await;
    assert_eq!(final_match.participants[0].slot, Slot::Participant(b.seed(1)));
    assert_eq!(final_match.participants[1].slot, Slot::Pending(second.id));

    // Replaying the annulled match fills the final again
    b.engine
        .matches
        .record_result(second.id, b.scores((3, 2), (2, 0)))
        .await
        .unwrap();
    let final_match = b.at(2, 1).await;
    assert_eq!(final_match.participants[1].slot, Slot::Participant(b.seed(3)));
}

#[tokio::test]
async fn test_annul_before_partner_finishes() {
    let b = four_player_bracket().await;
    let first = b.at(1, 1).await;
    b.engine
        .matches
        .record_result(first.id, b.scores((1, 3), (4, 1)))
        .await
        .unwrap();

    b.engine.matches.annul_result(first.id).await.unwrap();

    let final_match = b.at(2, 1).await;
    assert!(final_match.participants.iter().all(|p| p.slot.is_pending()));
    assert!(!b.at(1, 1).await.is_completed());
}

#[tokio::test]
async fn test_annul_twice_fails() {
    let b = four_player_bracket().await;
    let (first, _) = b.play_round_one().await;

    b.engine.matches.annul_result(first.id).await.unwrap();
    let err = b.engine.matches.annul_result(first.id).await.unwrap_err();
    assert!(matches!(err, EngineError::MatchNotCompleted(_)));
}

#[tokio::test]
async fn test_corrections_refused_after_next_round_played() {
    // Eight players so the tournament is still running after a semi-final
    let (ctx, store) = EngineContext::in_memory();
    let engine = Engine::new(ctx);
    let t = engine
        .tournaments
        .create_tournament(NewTournament::single_elimination("Deep Cup", "chess").published())
        .await
        .unwrap();
    let mut seeds = Vec::new();
    for n in 1..=8 {
        let id = Uuid::new_v4();
        store
            .insert_participant(Participant {
                id,
                participant_type: ParticipantType::Player,
                display_name: format!("Seed {n}"),
            })
            .await;
        engine.tournaments.register_entry(t.id, id, None).await.unwrap();
        seeds.push(id);
    }
    let matches = engine.brackets.generate_bracket(t.id).await.unwrap();
    let find = |ms: &[Match], r: u32, p: u32| {
        ms.iter()
            .find(|m| m.round_number == r && m.position() == p)
            .cloned()
            .unwrap()
    };

    // (1,8) and (4,5) feed semi-final 1
    let qf1 = find(&matches, 1, 1);
    let qf2 = find(&matches, 1, 2);
    engine
        .matches
        .record_result(qf1.id, [ScoreInput::new(seeds[0], 2), ScoreInput::new(seeds[7], 0)])
        .await
        .unwrap();
    engine
        .matches
        .record_result(qf2.id, [ScoreInput::new(seeds[3], 2), ScoreInput::new(seeds[4], 0)])
        .await
        .unwrap();

    let matches = engine.matches.list_matches(t.id).await.unwrap();
    let sf1 = find(&matches, 2, 1);
    engine
        .matches
        .record_result(sf1.id, [ScoreInput::new(seeds[0], 2), ScoreInput::new(seeds[3], 1)])
        .await
        .unwrap();

    let err = engine
        .matches
        .edit_result(qf1.id, [ScoreInput::new(seeds[0], 0), ScoreInput::new(seeds[7], 2)])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::DownstreamMatchCompleted(id) if id == sf1.id));

    let err = engine.matches.annul_result(qf2.id).await.unwrap_err();
    assert!(matches!(err, EngineError::DownstreamMatchCompleted(_)));

    // Nothing moved
    let still = engine.matches.get_match(qf1.id).await.unwrap();
    assert_eq!(still.winner(), Some(seeds[0]));
    let sf1_after = engine.matches.get_match(sf1.id).await.unwrap();
    assert!(sf1_after.is_completed());

    // Score-only edits are still fine
    engine
        .matches
        .edit_result(qf1.id, [ScoreInput::new(seeds[0], 3), ScoreInput::new(seeds[7], 0)])
        .await
        .unwrap();
}
