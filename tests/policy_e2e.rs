use wumpus_agent::knowledge::{ArrowOutcome, Hazard};
use wumpus_agent::{
    Action, Agent, DecisionRule, Direction, Environment, Episode, EpisodeConfig, Percept,
    PerceptSet, Position, Predicate, ThreatLevel, WumpusWorld,
};

fn stench() -> PerceptSet {
    PerceptSet::empty().with(Percept::Stench)
}

#[test]
fn first_move_from_clear_origin_is_right() {
    let world = WumpusWorld::parse("--P\n---\n---\n").unwrap();
    let mut episode = Episode::new(EpisodeConfig::default(), Some(world)).unwrap();

    let record = episode.step().unwrap();
    assert_eq!(record.decision.action, Action::Move(Direction::Right));
    assert_eq!(record.decision.rule, DecisionRule::ExploreSafe);
    assert_eq!(record.decision.rule_label, "Safe(1,0) → Move_RIGHT");
    assert_eq!(episode.position(), Position::new(1, 0));
}

#[test]
fn breeze_turns_agent_back_to_safe_ground() {
    let world = WumpusWorld::parse("--P\n---\n---\n").unwrap();
    let mut episode = Episode::new(EpisodeConfig::default(), Some(world)).unwrap();
    episode.step().unwrap();

    let record = episode.step().unwrap();
    assert!(record.percepts.contains(Percept::Breeze));
    assert_eq!(record.decision.rule, DecisionRule::PathToUnvisited);
    assert_eq!(record.decision.action, Action::Move(Direction::Left));
}

#[test]
fn definite_pit_is_never_chosen() {
    let mut agent = Agent::new(3).unwrap();
    let pit = Position::new(2, 0);
    let world = WumpusWorld::parse("--P\n---\n---\n").unwrap();

    let route = [
        Position::ORIGIN,
        Position::new(0, 1),
        Position::new(1, 0),
        Position::new(1, 1),
        Position::new(2, 1),
    ];
    for position in route {
        let decision = agent
            .ingest_percepts_and_decide(position, &world.percepts(position), 3)
            .unwrap();
        if let Action::Move(direction) = decision.action {
            assert_ne!(position.step(direction, 3), Some(pit), "moved into the pit from {position}");
        }
    }
    assert_eq!(agent.knowledge().level(pit, Hazard::Pit), ThreatLevel::Certain);
}

#[test]
fn arrow_hit_clears_the_target() {
    let mut agent = Agent::new(3).unwrap();
    let decision = agent
        .ingest_percepts_and_decide(Position::ORIGIN, &stench(), 3)
        .unwrap();
    assert_eq!(decision.action, Action::Shoot(Direction::Right));
    assert_eq!(decision.rule, DecisionRule::Shoot);
    assert_eq!(decision.rule_label, "NoSafePath ∧ HasArrow → ShootArrow_RIGHT");

    let decision = agent
        .ingest_percepts_and_decide(
            Position::ORIGIN,
            &PerceptSet::empty().with(Percept::Scream),
            3,
        )
        .unwrap();
    assert_eq!(decision.arrow_outcome, Some(ArrowOutcome::Killed));
    assert_eq!(decision.action, Action::Move(Direction::Right));

    let kb = agent.knowledge();
    let target = Position::new(1, 0);
    assert_eq!(kb.confidence(target, Hazard::Wumpus), 0.0);
    assert!(kb.holds(&Predicate::WumpusKilled.at(target)));
    assert!(kb.arrow().used);
    assert!(!kb.arrow().available);
}

#[test]
fn arrow_miss_marks_target_safe() {
    let mut agent = Agent::new(3).unwrap();
    agent
        .ingest_percepts_and_decide(Position::ORIGIN, &stench(), 3)
        .unwrap();

    let decision = agent
        .ingest_percepts_and_decide(Position::ORIGIN, &stench(), 3)
        .unwrap();
    assert_eq!(decision.arrow_outcome, Some(ArrowOutcome::Missed));
    assert!(agent.knowledge().is_safe(Position::new(1, 0)));
    assert_eq!(decision.action, Action::Move(Direction::Right));
}

#[test]
fn ambiguous_breeze_backtracks_toward_safe_ground() {
    let mut agent = Agent::new(3).unwrap();
    let decision = agent
        .ingest_percepts_and_decide(
            Position::ORIGIN,
            &PerceptSet::empty().with(Percept::Breeze),
            3,
        )
        .unwrap();

    // (2,0) behind (1,0) is the nearest unsuspected cell.
    assert_eq!(decision.rule, DecisionRule::Backtrack);
    assert_eq!(decision.action, Action::Move(Direction::Right));
    assert_eq!(decision.rule_label, "RiskyMove → Move_RIGHT");
}
