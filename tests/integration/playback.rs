use crate::common::fixtures::{guild, track, voice_channel};
use crate::common::mocks::{DriverCall, Notice};
use crate::common::{Harness, fast_settings};
use crate::{assert_eq, assert_matches};
use poise::serenity_prelude::{ChannelId, GuildId};
use tokio_test::{assert_err, assert_ok};
use tunebot::{Enqueued, MusicError, PlaybackOutcome, StopOutcome};

#[tokio::test]
async fn enqueue_while_idle_starts_the_track() {
    let h = Harness::connected(fast_settings()).await;

    let enqueued = h.music.enqueue(track("a")).await.unwrap();

    assert_eq!(enqueued, Enqueued::NowPlaying(track("a")));
    assert_eq!(h.driver.played(), vec!["a"]);
    assert_eq!(h.notifier.notices(), vec![Notice::NowPlaying("a".to_string())]);
}

#[tokio::test]
async fn next_track_starts_when_the_current_one_finishes() {
    let h = Harness::connected(fast_settings()).await;

    h.music.enqueue(track("a")).await.unwrap();
    let enqueued = h.music.enqueue(track("b")).await.unwrap();

    assert_eq!(enqueued, Enqueued::Queued { position: 1 });
    assert_eq!(h.now_playing_title().await.as_deref(), Some("a"));
    assert_eq!(h.queued_titles().await, vec!["b"]);

    h.driver.finish(PlaybackOutcome::Finished).await;

    assert_eq!(h.now_playing_title().await.as_deref(), Some("b"));
    assert!(h.queued_titles().await.is_empty());
    assert_eq!(h.driver.played(), vec!["a", "b"]);
}

#[tokio::test]
async fn tracks_play_in_fifo_order() {
    let h = Harness::connected(fast_settings()).await;

    for title in ["a", "b", "c", "d"] {
        h.music.enqueue(track(title)).await.unwrap();
    }
    assert_eq!(h.queued_titles().await, vec!["b", "c", "d"]);

    for _ in 0..4 {
        h.driver.finish(PlaybackOutcome::Finished).await;
    }

    assert_eq!(h.driver.played(), vec!["a", "b", "c", "d"]);
    assert_eq!(h.now_playing_title().await, None);
}

#[tokio::test]
async fn enqueue_after_the_queue_ran_dry_starts_that_track() {
    let h = Harness::connected(fast_settings()).await;

    h.music.enqueue(track("a")).await.unwrap();
    h.driver.finish(PlaybackOutcome::Finished).await;
    assert_eq!(h.now_playing_title().await, None);

    let enqueued = h.music.enqueue(track("c")).await.unwrap();

    assert_eq!(enqueued, Enqueued::NowPlaying(track("c")));
    assert_eq!(h.driver.played(), vec!["a", "c"]);
}

#[tokio::test]
async fn enqueue_needs_a_connection() {
    let h = Harness::new(fast_settings());

    assert_matches!(
        h.music.enqueue(track("a")).await,
        Err(MusicError::NotConnected)
    );
    assert!(h.driver.calls().is_empty());
}

#[tokio::test]
async fn skip_while_idle_changes_nothing() {
    let h = Harness::connected(fast_settings()).await;

    assert_matches!(h.music.skip().await, Err(MusicError::NothingPlaying));
    assert_eq!(h.driver.calls(), vec![DriverCall::Connect(voice_channel())]);
    assert_eq!(h.now_playing_title().await, None);
}

#[tokio::test]
async fn skip_stops_and_the_completion_advances() {
    let h = Harness::connected(fast_settings()).await;
    h.music.enqueue(track("a")).await.unwrap();
    h.music.enqueue(track("b")).await.unwrap();

    let skipped = h.music.skip().await.unwrap();

    assert_eq!(skipped.title, "a");
    assert!(h.driver.calls().contains(&DriverCall::Stop));

    h.driver.finish(PlaybackOutcome::Finished).await;
    assert_eq!(h.now_playing_title().await.as_deref(), Some("b"));
}

#[tokio::test]
async fn stop_clears_queue_and_ignores_the_late_completion() {
    let h = Harness::connected(fast_settings()).await;
    h.music.enqueue(track("a")).await.unwrap();
    h.music.enqueue(track("b")).await.unwrap();
    let hook_a = h.driver.hook_for("a").unwrap();

    assert_eq!(h.music.stop_and_clear().await, Ok(StopOutcome::Stopped));
    assert_eq!(h.now_playing_title().await, None);
    assert!(h.queued_titles().await.is_empty());

    // The driver reports the stopped track after the fact
    hook_a.notify(PlaybackOutcome::Finished).await;
    assert_eq!(h.driver.played(), vec!["a"]);

    h.music.enqueue(track("c")).await.unwrap();
    hook_a.notify(PlaybackOutcome::Finished).await;

    assert_eq!(h.now_playing_title().await.as_deref(), Some("c"));
    assert_eq!(h.driver.played(), vec!["a", "c"]);
}

#[tokio::test]
async fn stop_with_nothing_to_stop() {
    let h = Harness::connected(fast_settings()).await;

    assert_eq!(
        h.music.stop_and_clear().await,
        Err(MusicError::NothingPlaying)
    );
    assert!(!h.driver.calls().contains(&DriverCall::Stop));
}

#[tokio::test]
async fn stop_on_an_idle_session_with_pending_tracks_clears_the_queue() {
    let h = Harness::connected(tunebot::PlaybackSettings {
        max_retries: 1,
        ..fast_settings()
    })
    .await;
    h.music.enqueue(track("a")).await.unwrap();
    h.music.enqueue(track("b")).await.unwrap();

    // A single failure exhausts the budget and leaves "b" waiting
    h.driver
        .finish(PlaybackOutcome::Errored("decoder died".to_string()))
        .await;
    assert_eq!(h.now_playing_title().await, None);
    assert_eq!(h.queued_titles().await, vec!["b"]);

    assert_eq!(h.music.stop_and_clear().await, Ok(StopOutcome::QueueCleared));
    assert!(h.queued_titles().await.is_empty());
}

#[tokio::test]
async fn pause_and_resume_keep_the_queue() {
    let h = Harness::connected(fast_settings()).await;
    h.music.enqueue(track("a")).await.unwrap();
    h.music.enqueue(track("b")).await.unwrap();

    assert_eq!(h.music.pause().await.map(|t| t.title), Ok("a".to_string()));
    assert!(h.music.is_paused().await);
    assert_eq!(h.music.pause().await, Err(MusicError::NothingPlaying));

    assert_eq!(h.music.resume().await.map(|t| t.title), Ok("a".to_string()));
    assert!(!h.music.is_paused().await);
    assert_eq!(h.music.resume().await, Err(MusicError::NotPaused));

    assert_eq!(h.now_playing_title().await.as_deref(), Some("a"));
    assert_eq!(h.queued_titles().await, vec!["b"]);
    assert_eq!(
        h.driver
            .calls()
            .into_iter()
            .filter(|call| matches!(call, DriverCall::Pause | DriverCall::Resume))
            .collect::<Vec<_>>(),
        vec![DriverCall::Pause, DriverCall::Resume]
    );
}

#[tokio::test]
async fn pause_and_resume_need_a_current_track() {
    let h = Harness::connected(fast_settings()).await;

    assert_eq!(h.music.pause().await, Err(MusicError::NothingPlaying));
    assert_eq!(h.music.resume().await, Err(MusicError::NothingPlaying));
}

#[tokio::test]
async fn connect_twice_is_rejected() {
    let h = Harness::connected(fast_settings()).await;

    assert_err!(h.music.connect(guild(), voice_channel()).await);
    assert_eq!(
        h.music.connect(guild(), ChannelId::new(42)).await,
        Err(MusicError::AlreadyConnected)
    );
}

#[tokio::test]
async fn ensure_connected_reuses_or_joins() {
    let h = Harness::new(fast_settings());

    assert_eq!(
        h.music.ensure_connected(guild(), None).await,
        Err(MusicError::NotInVoiceChannel)
    );

    let first = assert_ok!(h.music.ensure_connected(guild(), Some(voice_channel())).await);
    let second = assert_ok!(h.music.ensure_connected(guild(), None).await);
    assert_eq!(first, second);

    assert_eq!(
        h.music
            .ensure_connected(GuildId::new(7), Some(ChannelId::new(8)))
            .await,
        Err(MusicError::AlreadyConnected)
    );
    assert_eq!(
        h.driver.calls(),
        vec![DriverCall::Connect(voice_channel())]
    );
}

#[tokio::test]
async fn failed_join_leaves_the_session_disconnected() {
    let h = Harness::new(fast_settings());
    h.driver.refuse_connect();

    assert_matches!(
        h.music.connect(guild(), voice_channel()).await,
        Err(MusicError::JoinError(_))
    );
    assert_eq!(h.music.connection().await, None);
}

#[tokio::test]
async fn disconnect_stops_and_clears() {
    let h = Harness::connected(fast_settings()).await;
    h.music.enqueue(track("a")).await.unwrap();
    h.music.enqueue(track("b")).await.unwrap();

    assert_ok!(h.music.disconnect().await);

    assert_eq!(h.music.connection().await, None);
    assert_eq!(h.now_playing_title().await, None);
    assert!(h.queued_titles().await.is_empty());
    assert!(h.driver.calls().ends_with(&[DriverCall::Stop, DriverCall::Disconnect]));

    // Completion of the track that was playing is stale now
    h.driver.finish(PlaybackOutcome::Finished).await;
    assert_eq!(h.driver.played(), vec!["a"]);
}

#[tokio::test]
async fn disconnect_without_connection() {
    let h = Harness::new(fast_settings());

    assert_eq!(h.music.disconnect().await, Err(MusicError::NotConnected));
}

#[tokio::test]
async fn losing_the_connection_resets_the_session() {
    let h = Harness::connected(fast_settings()).await;
    h.music.enqueue(track("a")).await.unwrap();
    h.music.enqueue(track("b")).await.unwrap();

    let lost = h.music.connection_lost(guild()).await;

    assert_eq!(lost.map(|connection| connection.channel_id), Some(voice_channel()));
    assert_eq!(h.music.connection().await, None);
    assert_eq!(h.now_playing_title().await, None);
    assert!(h.queued_titles().await.is_empty());
    assert_eq!(
        h.music.enqueue(track("c")).await,
        Err(MusicError::NotConnected)
    );

    // The dropped call's completion must not start anything
    h.driver.finish(PlaybackOutcome::Finished).await;
    assert_eq!(h.driver.played(), vec!["a"]);

    // Joining works again instead of reporting a stale connection
    assert_ok!(h.music.connect(guild(), voice_channel()).await);
}

#[tokio::test]
async fn connection_loss_in_another_guild_is_ignored() {
    let h = Harness::connected(fast_settings()).await;
    h.music.enqueue(track("a")).await.unwrap();

    assert_eq!(h.music.connection_lost(GuildId::new(424242)).await, None);

    assert!(h.music.connection().await.is_some());
    assert_eq!(h.now_playing_title().await.as_deref(), Some("a"));
}
