use trustline::{EngineConfig, EvaluationInput, Evaluator, Pick, TeamSide};

const SAMPLE: &str = include_str!("../demos/sample_contest.json");

/// The bundled sample parses and evaluates end to end.
#[test]
fn sample_input_evaluates() {
    let input: EvaluationInput = EvaluationInput::from_json(SAMPLE).unwrap();
    assert_eq!(input.quotes.len(), 6);

    let decision = Evaluator::new(EngineConfig::default()).unwrap().evaluate(&input).unwrap();
    assert_eq!(decision.snapshot.favorite.name, "Alabama");
    assert_eq!(decision.snapshot.favorite_line, -6.5);
    assert_eq!(decision.snapshot.provenance.book, "draftkings");
    assert_eq!(decision.spread.side, Some(Pick::Team(TeamSide::Away)));
    assert_eq!(decision.total.side, Some(Pick::Over));
    assert_eq!(decision.snapshot.moneyline_favorite, Some(-245.0));
    assert_eq!(decision.snapshot.moneyline_underdog, Some(200.0));
}

/// Quotes and model fields may be omitted; the contest alone is enough to parse.
#[test]
fn minimal_input_parses_with_defaults() {
    let json = r#"{
        "contest": {
            "id": "g1",
            "home": { "id": "h", "name": "Home" },
            "away": { "id": "a", "name": "Away" }
        }
    }"#;
    let input: EvaluationInput = EvaluationInput::from_json(json).unwrap();
    assert!(input.quotes.is_empty());
    assert!(input.model.spread.is_none());
    assert!(input.contest.home.power_rating.is_none());

    let err = Evaluator::new(EngineConfig::default()).unwrap().evaluate(&input).unwrap_err();
    assert!(err.to_string().contains("g1"));
}

/// Decisions serialize with lower-case enums and tagged picks.
#[test]
fn decision_serializes_to_json() {
    let input: EvaluationInput = EvaluationInput::from_json(SAMPLE).unwrap();
    let decision = Evaluator::new(EngineConfig::default()).unwrap().evaluate(&input).unwrap();

    let value = serde_json::to_value(&decision).unwrap();
    assert_eq!(value["spread"]["market"], "spread");
    assert_eq!(value["spread"]["side"]["team"], "away");
    assert_eq!(value["total"]["side"], "over");
    assert!(value["diagnostics"]["snapshot_id"]
        .as_str()
        .unwrap()
        .starts_with("snap_"));
}
