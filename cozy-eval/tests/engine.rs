use std::time::{Duration, Instant};

use cozy_eval::engine::{EngineState, EngineTiming};
use cozy_eval::{Engine, EngineConfig, EngineError, Evaluation, SearchBudget};
use futures_util::TryStreamExt;
use pretty_assertions::assert_eq;

const STUB: &str = env!("CARGO_BIN_EXE_stub_engine");

fn stub(mode: &str) -> EngineConfig {
    EngineConfig::new(STUB).with_args([mode])
}

async fn spawn_stub(mode: &str) -> Engine {
    Engine::new(stub(mode)).await.unwrap()
}

fn eval(best_move: &str, score: i32) -> Evaluation {
    Evaluation { best_move: best_move.to_owned(), score }
}

#[tokio::test]
async fn reports_best_move_and_latest_score() {
    let mut engine = spawn_stub("scored").await;
    assert_eq!(engine.state(), EngineState::Ready);

    let budget = SearchBudget::from_millis(3000);
    let start = Instant::now();
    let evaluation = engine
        .set_position(&["e2e4", "e7e5"])
        .await
        .unwrap()
        .evaluate(budget)
        .await
        .unwrap();

    assert!(start.elapsed() >= budget.duration());
    assert_eq!(evaluation, eval("e2e4", 42));
    assert_eq!(engine.state(), EngineState::Idle);
    engine.quit().await.unwrap();
}

#[tokio::test]
async fn no_move_means_zero_score() {
    let mut engine = spawn_stub("none").await;
    engine.set_position::<&str>(&[]).await.unwrap();
    let evaluation = engine.evaluate(SearchBudget::from_millis(200)).await.unwrap();
    assert_eq!(evaluation, eval("(none)", 0));
    engine.quit().await.unwrap();
}

#[tokio::test]
async fn silent_engine_degrades_to_defaults() {
    let mut engine = spawn_stub("silent").await;
    engine.set_position(&["d2d4"]).await.unwrap();

    let budget = SearchBudget::from_millis(200);
    let start = Instant::now();
    let evaluation = engine.evaluate(budget).await.unwrap();

    assert!(start.elapsed() >= budget.duration());
    assert_eq!(evaluation, Evaluation::default());
    assert_eq!(engine.state(), EngineState::Searching);
    engine.quit().await.unwrap();
}

#[tokio::test]
async fn session_is_reused_across_positions() {
    let mut engine = spawn_stub("counting").await;
    let budget = SearchBudget::from_millis(100);

    let moves = ["e2e4", "c7c5", "g1f3"];
    let first = engine.set_position(&moves).await.unwrap().evaluate(budget).await.unwrap();
    assert_eq!(first, eval("g1f3", 3));

    let moves: Vec<String> = vec!["d2d4".into()];
    let second = engine.set_position(&moves).await.unwrap().evaluate(budget).await.unwrap();
    assert_eq!(second, eval("d2d4", 1));

    let third = engine.set_position::<&str>(&[]).await.unwrap().evaluate(budget).await.unwrap();
    assert_eq!(third, eval("(none)", 0));
    engine.quit().await.unwrap();
}

#[tokio::test]
async fn search_without_position_uses_engine_position() {
    let mut engine = spawn_stub("counting").await;
    let evaluation = engine.evaluate(SearchBudget::from_millis(100)).await.unwrap();
    assert_eq!(evaluation, eval("(none)", 0));
}

#[tokio::test]
async fn cancel_stops_search_early() {
    let mut engine = spawn_stub("scored").await;
    engine.set_position(&["e2e4"]).await.unwrap();

    let start = Instant::now();
    let cancel = tokio::time::sleep(Duration::from_millis(200));
    let evaluation = engine
        .evaluate_until(SearchBudget::from_millis(30_000), cancel)
        .await
        .unwrap();

    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(evaluation, eval("e2e4", 42));
    assert_eq!(engine.state(), EngineState::Idle);
}

#[tokio::test]
async fn abandoned_search_is_resynchronised() {
    let mut engine = spawn_stub("counting").await;
    engine.set_position(&["e2e4", "e7e5", "g1f3"]).await.unwrap();

    let abandoned = tokio::time::timeout(
        Duration::from_millis(100),
        engine.evaluate(SearchBudget::from_millis(10_000)),
    )
    .await;
    assert!(abandoned.is_err());
    assert_eq!(engine.state(), EngineState::Searching);

    let evaluation = engine
        .set_position(&["d2d4"])
        .await
        .unwrap()
        .evaluate(SearchBudget::from_millis(100))
        .await
        .unwrap();
    assert_eq!(evaluation, eval("d2d4", 1));
}

#[tokio::test]
async fn collect_streams_raw_lines() {
    let mut engine = spawn_stub("scored").await;
    engine.set_position(&["e2e4"]).await.unwrap();
    let budget = SearchBudget::from_millis(100);
    engine.start_search(budget).await.unwrap();

    let lines: Vec<String> = engine
        .collect(budget, std::future::pending::<()>())
        .try_collect()
        .await
        .unwrap();

    assert_eq!(lines.len(), 4);
    assert!(lines[1].contains("score cp 42"));
    assert_eq!(lines[3], "bestmove e2e4 ponder e7e5");
}

#[tokio::test]
async fn unacknowledged_readiness_is_fatal() {
    let timing = EngineTiming {
        ready_timeout: Duration::from_millis(300),
        ..EngineTiming::default()
    };
    let err = Engine::new(stub("deaf").with_timing(timing)).await.unwrap_err();
    assert!(matches!(err, EngineError::NotReady(t) if t == timing.ready_timeout));
}

#[tokio::test]
async fn missing_executable_fails_to_spawn() {
    let config = EngineConfig::new("./definitely/not/an/engine");
    let err = Engine::new(config).await.unwrap_err();
    assert!(matches!(err, EngineError::Spawn { .. }));
}

#[tokio::test]
async fn exit_before_readyok_is_unexpected_termination() {
    let err = Engine::new(stub("crash")).await.unwrap_err();
    assert!(matches!(err, EngineError::UnexpectedTermination));
}

#[tokio::test]
async fn quit_kills_engine_that_ignores_it() {
    let timing = EngineTiming {
        quit_timeout: Duration::from_millis(300),
        ..EngineTiming::default()
    };
    let mut engine = Engine::new(stub("stubborn").with_timing(timing)).await.unwrap();
    engine.set_position(&["e2e4"]).await.unwrap();
    let evaluation = engine.evaluate(SearchBudget::from_millis(100)).await.unwrap();
    assert_eq!(evaluation, eval("e2e4", 42));

    let start = Instant::now();
    engine.quit().await.unwrap();
    let elapsed = start.elapsed();
    assert!(elapsed >= timing.quit_timeout);
    assert!(elapsed < Duration::from_secs(5));
}
