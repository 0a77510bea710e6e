use plop::game::GameSession;
use plop::highscore::{BestScoreStore, FileBestScoreStore};
use plop::session::SessionConfig;
use tempfile::tempdir;

fn file_session(path: &std::path::Path, seed: u64) -> GameSession {
    GameSession::with_seed(
        SessionConfig::default(),
        Box::new(FileBestScoreStore::with_path(path)),
        seed,
    )
}

fn play_and_pop(session: &mut GameSession, pops: usize) {
    session.start();
    let mut done = 0;
    // Step the round along, popping the oldest live bubble as they appear
    for _ in 0..300 {
        session.advance(100);
        if done < pops {
            if let Some(b) = session.bubbles().iter().find(|b| !b.popped) {
                let (cx, cy) = b.center();
                session.pointer_down(cx, cy);
                done += 1;
            }
        }
    }
    session.end();
}

#[test]
fn best_score_survives_across_sessions() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("best_score.json");

    // Seed the store the way a previous install would have
    FileBestScoreStore::with_path(&path).save(10).unwrap();

    let mut first = file_session(&path, 3);
    play_and_pop(&mut first, 12);
    let first_best = first.hud().best;
    assert!(
        first_best > 10,
        "a dozen pops should beat the seeded best of 10"
    );
    assert_eq!(FileBestScoreStore::with_path(&path).load(), first_best);

    // A later, lower-scoring session leaves the record alone
    let mut second = file_session(&path, 4);
    play_and_pop(&mut second, 1);
    assert_eq!(second.hud().best, first_best);
    assert_eq!(FileBestScoreStore::with_path(&path).load(), first_best);
}

#[test]
fn fresh_install_starts_from_zero() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("best_score.json");

    let session = file_session(&path, 1);
    assert_eq!(session.hud().best, 0);
}

#[test]
fn new_best_is_written_as_it_happens_not_only_at_end() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("best_score.json");

    let mut session = file_session(&path, 5);
    session.start();
    for _ in 0..10 {
        session.advance(100);
    }
    let (cx, cy) = session.bubbles()[0].center();
    session.pointer_down(cx, cy);

    // Round still running, but the record is already on disk
    assert!(session.is_active());
    assert_eq!(
        FileBestScoreStore::with_path(&path).load(),
        session.hud().best
    );
    assert!(session.hud().best >= 1);
}
