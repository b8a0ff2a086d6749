// padseq demo - plays a short drum groove on a thread-driven clock and logs what fires
//
// RUST_LOG=debug also shows the MIDI events produced by the trigger player.

use padseq::messaging::channels::create_notification_channel;
use padseq::sequencer::ControlEvent;
use padseq::{
    Direction, DrumSequencer, Notification, SequencerConfig, SequencerResult, StepParam,
    TimingDivision, TriggerPlayer,
};
use ringbuf::traits::Consumer;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

const DEMO_BPM: f64 = 120.0;
const DEMO_BARS: u64 = 4;

// Pads of the demo kit
const KICK: usize = 0;
const SNARE: usize = 1;
const HAT: usize = 2;
const PERC: usize = 3;

fn build_kit(sequencer: &mut DrumSequencer) -> SequencerResult<()> {
    // Four on the floor
    for step in [0, 4, 8, 12] {
        sequencer.toggle_step(KICK, step)?;
    }

    for step in [4, 12] {
        sequencer.toggle_step(SNARE, step)?;
        sequencer.set_step_param(SNARE, step, StepParam::Accent(true))?;
    }

    sequencer.fill_euclidean(HAT, 7)?;
    for step in [3, 10] {
        sequencer.set_step_param(HAT, step, StepParam::Probability(60))?;
        sequencer.set_step_param(HAT, step, StepParam::Velocity(70))?;
    }

    sequencer.set_pattern_length(PERC, 6)?;
    sequencer.set_timing_division(PERC, TimingDivision::Eighth)?;
    sequencer.set_direction(PERC, Direction::Bounce)?;
    sequencer.fill_euclidean(PERC, 2)?;
    sequencer.set_step_param(PERC, 0, StepParam::Pan(20))?;
    // Stays straight when the second half swings
    sequencer.set_track_swing(PERC, false)?;

    Ok(())
}

fn log_notification(notification: Notification) {
    match notification {
        Notification::Trigger(intent) => tracing::info!(
            track = intent.track,
            step = intent.step,
            tick = intent.tick,
            velocity = intent.velocity,
            accented = intent.accented,
            "trigger"
        ),
        Notification::Highlight(highlight) => tracing::trace!(
            track = highlight.track,
            current = highlight.current,
            "highlight"
        ),
        Notification::Control(ControlEvent::Transport(state)) => {
            tracing::info!(?state, "transport")
        }
        Notification::Control(event) => tracing::warn!(?event, "control event"),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = SequencerConfig {
        random_seed: Some(0x5eed),
        ..SequencerConfig::default()
    };
    let mut sequencer = DrumSequencer::new(config.clone());
    if let Err(e) = build_kit(&mut sequencer) {
        tracing::error!(error = %e, "failed to build demo kit");
        return;
    }

    let mut handle = sequencer.connect();
    let (notification_tx, mut notification_rx) =
        create_notification_channel(config.notification_capacity);

    let ticks_per_beat = sequencer.config().ticks_per_beat;
    let total_ticks = DEMO_BARS * 4 * ticks_per_beat as u64;
    let tick_interval = Duration::from_secs_f64(60.0 / DEMO_BPM / ticks_per_beat as f64);
    let player = TriggerPlayer::new(sequencer.track_count(), config.base_note);

    let running = Arc::new(AtomicBool::new(true));
    let engine_running = Arc::clone(&running);

    // Engine thread: owns the sequencer and the clock
    let engine = thread::spawn(move || {
        let mut sink = (player, notification_tx);
        let mut deadline = Instant::now();

        while engine_running.load(Ordering::Relaxed) {
            let tick = sequencer.absolute_tick();
            sequencer.tick(&mut sink);

            let player = &mut sink.0;
            if sequencer.is_playing() {
                player.advance(tick);
            } else {
                player.stop_all_notes(tick);
            }
            for event in player.drain_events() {
                tracing::debug!(event = ?event.event, tick = event.tick, offset_ms = event.offset_ms, "midi");
            }

            deadline += tick_interval;
            if let Some(wait) = deadline.checked_duration_since(Instant::now()) {
                thread::sleep(wait);
            }
        }
    });

    tracing::info!(bpm = DEMO_BPM, bars = DEMO_BARS, ticks_per_beat, "starting demo");
    handle.start();

    let mut swing_sent = false;
    while handle.absolute_tick() < total_ticks {
        while let Some(notification) = notification_rx.try_pop() {
            log_notification(notification);
        }

        // Second half swings
        if !swing_sent && handle.absolute_tick() >= total_ticks / 2 {
            swing_sent = handle.set_swing(62, true);
        }

        thread::sleep(Duration::from_millis(5));
    }

    handle.stop();
    thread::sleep(tick_interval * 2);
    running.store(false, Ordering::Relaxed);
    if engine.join().is_err() {
        tracing::error!("engine thread panicked");
    }

    while let Some(notification) = notification_rx.try_pop() {
        log_notification(notification);
    }
    tracing::info!("demo finished");
}
