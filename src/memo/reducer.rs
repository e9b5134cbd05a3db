use std::path::{Path, PathBuf};

use futures::StreamExt;

use crate::arch::{Effect, EffectId, Effects, Reducer};
use crate::memo::action::MemoAction;
use crate::memo::environment::MemoEnvironment;
use crate::memo::state::{Mode, VoiceMemo};

/// Id of the progress timer of the memo recorded at `url`.
pub fn timer_id(url: &Path) -> EffectId {
    EffectId::scoped("voice-memo.timer", url.display())
}

/// Id of the playback of the memo recorded at `url`.
pub fn player_id(url: &Path) -> EffectId {
    EffectId::scoped("voice-memo.player", url.display())
}

pub struct VoiceMemoReducer;

impl Reducer for VoiceMemoReducer {
    type State = VoiceMemo;
    type Action = MemoAction;
    type Environment = MemoEnvironment;

    fn reduce(
        &self,
        memo: &mut VoiceMemo,
        action: MemoAction,
        _environment: &MemoEnvironment,
    ) -> Effects<MemoAction, MemoEnvironment> {
        match action {
            MemoAction::AudioPlayer(outcome) => {
                if let Err(err) = &outcome {
                    tracing::warn!(url = %memo.url.display(), error = %err, "playback failed");
                }
                memo.mode = Mode::NotPlaying;
                vec![Effect::cancel(timer_id(&memo.url))]
            }

            MemoAction::PlayButtonTapped => match memo.mode {
                Mode::NotPlaying => {
                    memo.mode = Mode::Playing { progress: 0.0 };
                    vec![play(memo.url.clone()), progress_timer(&memo.url)]
                }
                Mode::Playing { .. } => {
                    memo.mode = Mode::NotPlaying;
                    vec![
                        Effect::cancel(player_id(&memo.url)),
                        Effect::cancel(timer_id(&memo.url)),
                        stop(),
                    ]
                }
            },

            MemoAction::Delete => vec![
                Effect::cancel(player_id(&memo.url)),
                Effect::cancel(timer_id(&memo.url)),
                stop(),
            ],

            MemoAction::TimerUpdated(elapsed) => {
                if let Mode::Playing { progress } = &mut memo.mode {
                    *progress = if memo.duration > 0.0 {
                        (elapsed / memo.duration).min(1.0)
                    } else {
                        0.0
                    };
                }
                Vec::new()
            }

            MemoAction::TitleChanged(title) => {
                memo.title = title;
                Vec::new()
            }
        }
    }
}

fn play(url: PathBuf) -> Effect<MemoAction, MemoEnvironment> {
    let id = player_id(&url);
    Effect::result(
        move |env: MemoEnvironment| env.player.play(&url),
        MemoAction::AudioPlayer,
    )
    .cancellable(id)
    .labeled("play")
}

fn progress_timer(url: &Path) -> Effect<MemoAction, MemoEnvironment> {
    Effect::stream(|env: MemoEnvironment| {
        let started = env.clock.now();
        env.clock
            .ticks(env.tick)
            .map(move |now| MemoAction::TimerUpdated(now.saturating_sub(started).as_secs_f64()))
    })
    .cancellable(timer_id(url))
    .labeled("timer")
}

fn stop() -> Effect<MemoAction, MemoEnvironment> {
    Effect::fire_and_forget(|env: MemoEnvironment| env.player.stop()).labeled("stop")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::EffectKind;
    use crate::env::{AudioPlayer, AudioPlayerError, PlayerEvent, TestClock};
    use futures::future::{self, BoxFuture, FutureExt};
    use std::sync::Arc;
    use std::time::{Duration, SystemTime};

    struct SilentPlayer;

    impl AudioPlayer for SilentPlayer {
        fn play(&self, _url: &Path) -> BoxFuture<'static, Result<PlayerEvent, AudioPlayerError>> {
            future::pending().boxed()
        }

        fn stop(&self) {}
    }

    fn environment() -> MemoEnvironment {
        MemoEnvironment {
            player: Arc::new(SilentPlayer),
            clock: Arc::new(TestClock::new()),
            tick: Duration::from_millis(500),
        }
    }

    fn memo(duration: f64) -> VoiceMemo {
        VoiceMemo::new("/tmp/memo.m4a", SystemTime::UNIX_EPOCH, duration)
    }

    #[test]
    fn play_progress_and_stop() {
        let env = environment();
        let mut state = memo(30.0);
        let url = state.url.clone();

        let effects = VoiceMemoReducer.reduce(&mut state, MemoAction::PlayButtonTapped, &env);
        assert_eq!(state.mode, Mode::Playing { progress: 0.0 });
        let labels: Vec<_> = effects.iter().filter_map(|e| e.label()).collect();
        assert_eq!(labels, vec!["play", "timer"]);
        assert_eq!(effects[0].kind(), EffectKind::Cancellable(&player_id(&url)));
        assert_eq!(effects[1].kind(), EffectKind::Cancellable(&timer_id(&url)));

        let effects = VoiceMemoReducer.reduce(&mut state, MemoAction::TimerUpdated(15.0), &env);
        assert_eq!(state.mode, Mode::Playing { progress: 0.5 });
        assert!(effects.is_empty());

        let effects = VoiceMemoReducer.reduce(&mut state, MemoAction::PlayButtonTapped, &env);
        assert_eq!(state.mode, Mode::NotPlaying);
        let kinds: Vec<_> = effects.iter().map(Effect::kind).collect();
        assert_eq!(
            kinds,
            vec![
                EffectKind::Cancel(&player_id(&url)),
                EffectKind::Cancel(&timer_id(&url)),
                EffectKind::Run,
            ]
        );
        assert_eq!(effects[2].label(), Some("stop"));
    }

    #[test]
    fn zero_duration_keeps_progress_at_zero() {
        let env = environment();
        let mut state = memo(0.0);
        VoiceMemoReducer.reduce(&mut state, MemoAction::PlayButtonTapped, &env);
        VoiceMemoReducer.reduce(&mut state, MemoAction::TimerUpdated(2.0), &env);
        assert_eq!(state.mode, Mode::Playing { progress: 0.0 });
    }

    #[test]
    fn timer_update_while_stopped_is_ignored() {
        let env = environment();
        let mut state = memo(10.0);
        let effects = VoiceMemoReducer.reduce(&mut state, MemoAction::TimerUpdated(5.0), &env);
        assert_eq!(state, memo(10.0));
        assert!(effects.is_empty());
    }

    #[test]
    fn playback_end_or_failure_stops_and_cancels_timer() {
        let env = environment();
        let outcomes = [
            Ok(PlayerEvent::DidFinishPlaying { successfully: true }),
            Err(AudioPlayerError::Decode {
                path: "/tmp/memo.m4a".into(),
            }),
        ];
        for outcome in outcomes {
            let mut state = memo(10.0);
            state.mode = Mode::Playing { progress: 0.4 };
            let effects = VoiceMemoReducer.reduce(&mut state, MemoAction::AudioPlayer(outcome), &env);
            assert_eq!(state.mode, Mode::NotPlaying);
            assert_eq!(effects.len(), 1);
            assert_eq!(effects[0].kind(), EffectKind::Cancel(&timer_id(&state.url)));
        }
    }

    #[test]
    fn delete_cancels_player_and_timer() {
        let env = environment();
        let mut state = memo(10.0);
        let url = state.url.clone();
        let effects = VoiceMemoReducer.reduce(&mut state, MemoAction::Delete, &env);
        let kinds: Vec<_> = effects.iter().map(Effect::kind).collect();
        assert_eq!(
            kinds,
            vec![
                EffectKind::Cancel(&player_id(&url)),
                EffectKind::Cancel(&timer_id(&url)),
                EffectKind::Run,
            ]
        );
        assert_eq!(effects[2].label(), Some("stop"));
    }

    #[test]
    fn reduce_is_deterministic() {
        let env = environment();
        for action in [
            MemoAction::PlayButtonTapped,
            MemoAction::TimerUpdated(3.0),
            MemoAction::TitleChanged("Groceries".into()),
        ] {
            let (mut first, mut second) = (memo(12.0), memo(12.0));
            let a = VoiceMemoReducer.reduce(&mut first, action.clone(), &env);
            let b = VoiceMemoReducer.reduce(&mut second, action, &env);
            assert_eq!(first, second);
            assert_eq!(format!("{a:?}"), format!("{b:?}"));
        }
    }
}
