//! End-to-end tests of the client commands over the bundled demo data

use lyra_cli::{App, CliError, LyraConfig, OutgoingMessage, PlayRequest};
use lyra_playback::LoopMode;

fn demo_app() -> App {
    App::new(LyraConfig::default()).unwrap()
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn album_lists_tracks_and_listeners() {
    let report = demo_app().album("low-light").await.unwrap();

    assert!(report.starts_with("Low Light\n"));
    assert!(report.contains("by Mira Vale (2 listeners)"));
    assert!(report.contains("3 tracks, 10:12"));
    let tide = report.find("1. Tide").unwrap();
    let harbour = report.find("3. Harbour").unwrap();
    assert!(tide < harbour);
}

#[tokio::test]
async fn unknown_album_is_not_found() {
    let err = demo_app().album("missing").await.unwrap_err();
    assert!(matches!(err, CliError::NotFound(_)));
}

#[tokio::test]
async fn artist_shows_albums_and_tracks() {
    let report = demo_app().artist("mira").await.unwrap();

    assert!(report.contains("Mira Vale"));
    assert!(report.contains("2 listeners"));
    assert!(report.contains("Low Light (3 tracks)"));
    assert!(report.contains("  Lanterns"));
}

#[tokio::test]
async fn reports_resolve_people() {
    let report = demo_app().reports().await.unwrap();
    assert!(report.contains("[pending] comment r1: spam (reported by Mira Vale, against Noor)"));
}

// ============================================================================
// Playback
// ============================================================================

#[tokio::test]
async fn play_advances_through_the_album() {
    let report = demo_app()
        .play(PlayRequest {
            album: "low-light".to_string(),
            start: Some("lanterns".to_string()),
            loop_mode: None,
            advance: 1,
        })
        .await
        .unwrap();

    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines[0], "> Lanterns");
    assert_eq!(lines[1], "  finished Lanterns");
    assert_eq!(lines[2], "> Harbour");
    assert!(lines[3].starts_with("Now: Harbour"));
}

#[tokio::test]
async fn loop_one_replays_the_same_track() {
    let report = demo_app()
        .play(PlayRequest {
            album: "low-light".to_string(),
            start: None,
            loop_mode: Some(LoopMode::LoopOne),
            advance: 2,
        })
        .await
        .unwrap();

    assert_eq!(report.matches("> Tide").count(), 3);
    assert!(report.contains("Now: Tide"));
    assert!(report.contains("loop LoopOne"));
}

// ============================================================================
// Chats and session
// ============================================================================

#[tokio::test]
async fn chats_show_history_and_sent_message() {
    let report = demo_app()
        .chats(
            "mira",
            Some(OutgoingMessage {
                to: "noor".to_string(),
                text: "Glad it stuck.".to_string(),
            }),
        )
        .await
        .unwrap();

    assert!(report.contains("Chat with Noor:"));
    let earlier = report.find("Noor: Low Light is on repeat here.").unwrap();
    let reply = report.find("Mira Vale: Glad it stuck.").unwrap();
    assert!(earlier < reply);
}

#[tokio::test]
async fn messaging_a_new_peer_starts_a_chat() {
    let report = demo_app()
        .chats(
            "noor",
            Some(OutgoingMessage {
                to: "admin".to_string(),
                text: "Question about a report".to_string(),
            }),
        )
        .await
        .unwrap();

    assert!(report.contains("Chat with Moderator:"));
    assert!(report.contains("Chat with Mira Vale:"));
}

#[tokio::test]
async fn login_reports_profile() {
    let report = demo_app()
        .login("admin@example.com", "secret1")
        .await
        .unwrap();
    assert!(report.starts_with("Signed in as Moderator (Admin)"));
}

#[tokio::test]
async fn theme_toggle_is_saved() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = LyraConfig::default();
    config.session.preferences_path = dir.path().join("prefs.json");

    let app = App::new(config.clone()).unwrap();
    assert_eq!(app.theme(false).unwrap(), "Theme: dark\n");
    assert_eq!(app.theme(true).unwrap(), "Theme changed.\nTheme: light\n");

    let reopened = App::new(config).unwrap();
    assert_eq!(reopened.theme(false).unwrap(), "Theme: light\n");
}
