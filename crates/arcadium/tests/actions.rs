//! Action surfaces: the numeric table, the structured record, tie
//! breaks, frame-skip, and the monotonic counters they drive.

use ac_rng::GameRng;
use arcadium::{AleAction, GAME_LIST, Input, Session};

#[test]
fn test_out_of_range_codes_are_reported_not_raised() {
    for game in GAME_LIST {
        let mut session = Session::with_seed(game, 1).unwrap();
        let before = session.state_to_json();
        assert!(!session.apply_ale_action(-1), "{}", game);
        assert!(!session.apply_ale_action(18), "{}", game);
        assert!(!session.apply_ale_action(1_000), "{}", game);
        // A rejected code must not take a tick.
        assert_eq!(session.state_to_json(), before, "{}", game);
    }
}

#[test]
fn test_every_table_code_is_accepted() {
    for game in GAME_LIST {
        let mut session = Session::with_seed(game, 1).unwrap();
        for code in 0..18 {
            assert!(session.apply_ale_action(code), "{}: code {}", game, code);
        }
    }
}

#[test]
fn test_legal_action_sets_are_sorted_subsets() {
    for game in GAME_LIST {
        let session = Session::with_seed(game, 1).unwrap();
        let actions = session.legal_action_set();
        assert!(!actions.is_empty(), "{}", game);
        assert!(
            actions.windows(2).all(|w| w[0] < w[1]),
            "{}: set is not sorted",
            game
        );
        assert!(
            actions.iter().all(|a| (0..18).contains(&a.to_int())),
            "{}",
            game
        );
    }
}

#[test]
fn test_both_action_surfaces_have_the_same_effect() {
    let mut by_code = Session::with_seed("breakout", 6).unwrap();
    let mut by_buttons = Session::with_seed("breakout", 6).unwrap();
    for (code, buttons) in [
        (1, AleAction::Fire.to_input()),
        (3, AleAction::Right.to_input()),
        (4, AleAction::Left.to_input()),
        (11, AleAction::RightFire.to_input()),
    ] {
        by_code.apply_ale_action(code);
        by_buttons.apply_action(buttons);
    }
    assert_eq!(by_code.state_to_json(), by_buttons.state_to_json());
}

#[test]
fn test_opposite_directions_cancel() {
    let mut session = Session::with_seed("breakout", 2).unwrap();
    let x_before = session
        .query(".state.paddle.position.x", &serde_json::Value::Null)
        .unwrap();
    let both = Input {
        left: true,
        right: true,
        ..Input::default()
    };
    session.apply_action(both);
    let x_after = session
        .query(".state.paddle.position.x", &serde_json::Value::Null)
        .unwrap();
    assert_eq!(x_before, x_after);
}

#[test]
fn test_frameskip_is_plain_repetition() {
    let mut skipping = Session::with_seed("amidar", 8).unwrap();
    skipping.set_frameskip(3);
    skipping.apply_ale_action(2);

    let mut manual = Session::with_seed("amidar", 8).unwrap();
    for _ in 0..4 {
        manual.apply_ale_action(2);
    }
    assert_eq!(skipping.state_to_json(), manual.state_to_json());
}

#[test]
fn test_score_and_level_never_decrease() {
    for game in GAME_LIST {
        let mut session = Session::with_seed(game, 13).unwrap();
        let actions = session.legal_action_set();
        let mut rng = GameRng::new(77);
        let (mut score, mut level) = (session.score(), session.level());
        for _ in 0..300 {
            let action = actions[rng.below(actions.len() as u32) as usize];
            session.apply_ale_action(action.to_int());
            assert!(session.score() >= score, "{}: score decreased", game);
            assert!(session.level() >= level, "{}: level decreased", game);
            score = session.score();
            level = session.level();
        }
    }
}

#[test]
fn test_game_over_freezes_score_and_level() {
    // Swap in a one-step-death maze through the config surface.
    let mut session = Session::with_seed("gridworld", 1).unwrap();
    let mut config: serde_json::Value =
        serde_json::from_str(&session.config_to_json()).unwrap();
    config["grid"] = serde_json::json!(["11111", "1AX01", "11111"]);
    session.write_config_json(&config.to_string()).unwrap();

    session.apply_ale_action(3);
    assert!(session.game_over());
    assert!(session.lives() < 0);

    let (score, level) = (session.score(), session.level());
    let dump = session.state_to_json();
    for code in [0, 1, 2, 3, 4, 5] {
        assert!(session.apply_ale_action(code));
    }
    assert_eq!(session.score(), score);
    assert_eq!(session.level(), level);
    assert_eq!(session.state_to_json(), dump, "terminal state drifted");
}
