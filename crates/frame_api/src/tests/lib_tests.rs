use super::*;

async fn ctx_with(database_url: &str) -> ApiContext {
    ApiContext {
        storage: Storage::new(database_url).await.expect("db"),
        renderer: Renderer::new(),
        frames: FrameConfig {
            public_url: Some("https://maze.example".to_string()),
            demo_image_url: "https://img.example/demo.png".to_string(),
            frame_size: 120,
        },
    }
}

async fn test_ctx() -> ApiContext {
    ctx_with("sqlite::memory:").await
}

#[tokio::test]
async fn press_right_from_spawn_moves_and_persists() {
    let ctx = test_ctx().await;
    let player = PlayerId(10);

    let cycle = advance(&ctx, player, Some(Action::Right))
        .await
        .expect("cycle");
    assert_eq!(
        cycle.outcome,
        Some(Transition::Moved(Position::new(3, 2)))
    );
    assert_eq!(cycle.position, Position::new(3, 2));
    assert!(cycle.image_data_url.starts_with("data:image/png;base64,"));

    let stored = ctx.storage.position(player).await.expect("read");
    assert_eq!(stored, Some(Position::new(3, 2)));
}

#[tokio::test]
async fn blocked_press_keeps_position() {
    let ctx = test_ctx().await;
    let player = PlayerId(11);

    // The cell below spawn is a wall.
    let cycle = advance(&ctx, player, Some(Action::Down))
        .await
        .expect("cycle");
    assert_eq!(cycle.outcome, Some(Transition::Blocked(grid::SPAWN)));

    let stored = ctx.storage.position(player).await.expect("read");
    assert_eq!(stored, Some(grid::SPAWN));
}

#[tokio::test]
async fn probe_renders_without_mutating() {
    let ctx = test_ctx().await;
    let player = PlayerId(12);

    let first = advance(&ctx, player, None).await.expect("cycle");
    assert_eq!(first.position, grid::SPAWN);
    assert_eq!(first.outcome, None);

    advance(&ctx, player, Some(Action::Up)).await.expect("move");
    let probe = advance(&ctx, player, None).await.expect("probe");
    assert_eq!(probe.position, Position::new(2, 3));

    let stored = ctx.storage.position(player).await.expect("read");
    assert_eq!(stored, Some(Position::new(2, 3)));
}

#[tokio::test]
async fn players_keep_separate_positions() {
    let ctx = test_ctx().await;

    advance(&ctx, PlayerId(20), Some(Action::Right))
        .await
        .expect("cycle");
    let other = advance(&ctx, PlayerId(21), None).await.expect("cycle");
    assert_eq!(other.position, grid::SPAWN);
}

#[tokio::test]
async fn concurrent_presses_serialize_to_both_moves() {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = std::env::temp_dir().join(format!("frame_api_cas_test_{suffix}"));
    let database_url = format!(
        "sqlite://{}",
        temp_root
            .join("cas.db")
            .to_string_lossy()
            .replace('\\', "/")
    );
    let ctx = ctx_with(&database_url).await;
    let player = PlayerId(30);

    // From spawn, Up and Right commute: either serial order ends at (3, 3).
    // A lost update would leave (2, 3) or (3, 2) instead.
    let (up, right) = tokio::join!(
        advance(&ctx, player, Some(Action::Up)),
        advance(&ctx, player, Some(Action::Right)),
    );
    up.expect("up press");
    right.expect("right press");

    let stored = ctx.storage.position(player).await.expect("read");
    assert_eq!(stored, Some(Position::new(3, 3)));

    std::fs::remove_dir_all(temp_root).expect("cleanup");
}

#[tokio::test]
async fn maze_frame_carries_four_buttons_and_post_url() {
    let ctx = test_ctx().await;
    let cycle = advance(&ctx, PlayerId(40), None).await.expect("cycle");

    let props = maze_frame(&ctx, &cycle);
    assert_eq!(props.buttons, vec!["up", "down", "left", "right"]);
    assert_eq!(
        props.post_url.as_deref(),
        Some("https://maze.example/frame")
    );
    assert_eq!(props.image, cycle.image_data_url);
}

#[tokio::test]
async fn demo_frame_is_static_with_two_buttons_and_no_post_url() {
    let ctx = test_ctx().await;
    let props = demo_frame(&ctx);
    assert_eq!(props.buttons.len(), 2);
    assert_eq!(props.image, "https://img.example/demo.png");
    assert_eq!(props.post_url, None);
    frame_html(&props).expect("static frame assembles");
}
