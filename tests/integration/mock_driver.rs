use std::sync::Arc;

use mockall::Sequence;
use mockall::predicate::eq;
use tunebot::{Enqueued, MusicError, VoiceConnection};

use crate::assert_eq;
use crate::common::fixtures::{guild, track, voice_channel};
use crate::common::manager_with;
use crate::common::mocks::{MockDriver, Notice};

fn connecting_driver() -> MockDriver {
    let mut driver = MockDriver::new();
    driver
        .expect_connect()
        .with(eq(guild()), eq(voice_channel()))
        .times(1)
        .returning(|guild_id, channel_id| {
            Ok(VoiceConnection {
                guild_id,
                channel_id,
            })
        });
    driver
}

#[tokio::test]
async fn first_track_is_played_at_the_default_volume() {
    let mut driver = connecting_driver();
    driver
        .expect_play()
        .withf(|conn, track, volume, hook| {
            conn.channel_id == voice_channel()
                && track.title == "a"
                && *volume == 1.0
                && hook.generation() > 0
        })
        .times(1)
        .returning(|_, _, _, _| Ok(()));

    let (music, notifier) = manager_with(Arc::new(driver));
    music.connect(guild(), voice_channel()).await.unwrap();

    assert_eq!(
        music.enqueue(track("a")).await,
        Ok(Enqueued::NowPlaying(track("a")))
    );
    assert_eq!(notifier.notices(), vec![Notice::NowPlaying("a".to_string())]);
}

#[tokio::test]
async fn driver_errors_surface_from_skip() {
    let mut driver = connecting_driver();
    driver.expect_play().returning(|_, _, _, _| Ok(()));
    driver
        .expect_stop()
        .times(1)
        .returning(|_| Err(MusicError::PlaybackError("handle is gone".to_string())));

    let (music, _) = manager_with(Arc::new(driver));
    music.connect(guild(), voice_channel()).await.unwrap();
    music.enqueue(track("a")).await.unwrap();

    assert_eq!(
        music.skip().await,
        Err(MusicError::PlaybackError("handle is gone".to_string()))
    );
    // The track is still considered current until the driver reports its end
    assert_eq!(music.now_playing().await, Some(track("a")));
}

#[tokio::test]
async fn disconnect_only_stops_a_playing_track() {
    let mut driver = connecting_driver();
    let mut seq = Sequence::new();
    driver
        .expect_is_playing()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| false);
    driver.expect_stop().never();
    driver
        .expect_disconnect()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));

    let (music, _) = manager_with(Arc::new(driver));
    music.connect(guild(), voice_channel()).await.unwrap();

    assert_eq!(music.disconnect().await, Ok(()));
    assert_eq!(music.connection().await, None);
}
