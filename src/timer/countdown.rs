//! Countdown-and-submission controller

use rand::Rng;
use tracing::{debug, info, warn};

use crate::{
    config::TimerSettings,
    error::TimerError,
    services::{AnswerForm, PlayerState, StateListener, TimerDisplay, VideoPlayer},
    state::{SubmissionKind, TimerSnapshot, TimerState, REMAINING_TIME_FIELD, TIMEOUT_FLAG_FIELD},
};

use super::scheduler::{ManualScheduler, TickScheduler};

/// Render remaining milliseconds as seconds with one decimal place.
pub fn format_remaining(millis: u64) -> String {
    format!("{:.1}", millis as f64 / 1000.0)
}

/// Quiz timer bound to one player, one display and one answer form.
///
/// Goes `Idle -> Counting -> Submitted`. Counting starts on the first
/// `Playing` notification; the form is submitted exactly once, either by
/// the user or when the countdown runs out.
pub struct QuizTimer<P, D, F, S: TickScheduler> {
    settings: TimerSettings,
    state: TimerState<S::Handle>,
    player: P,
    display: D,
    form: F,
    scheduler: S,
}

impl<P, D, F, S> QuizTimer<P, D, F, S>
where
    P: VideoPlayer,
    D: TimerDisplay,
    F: AnswerForm,
    S: TickScheduler,
{
    /// Bind a timer to its collaborators.
    ///
    /// Fails when the form has no `remaining_time` field.
    pub fn new(
        settings: TimerSettings,
        player: P,
        display: D,
        form: F,
        scheduler: S,
    ) -> Result<Self, TimerError> {
        if settings.step_millis == 0 {
            return Err(TimerError::ZeroStep);
        }
        if !form.has_field(REMAINING_TIME_FIELD) {
            return Err(TimerError::MissingField(REMAINING_TIME_FIELD));
        }

        Ok(Self {
            state: TimerState::new(settings.duration_millis),
            settings,
            player,
            display,
            form,
            scheduler,
        })
    }

    /// The player has been constructed: seek, set volume and subscribe.
    pub fn on_player_ready<R: Rng>(&mut self, listener: StateListener, rng: &mut R) {
        if self.state.is_player_ready {
            warn!("Player ready notified twice, ignoring");
            return;
        }
        self.state.is_player_ready = true;

        let media_secs = self.player.duration_secs();
        let offset = self
            .settings
            .start
            .resolve(rng, media_secs, self.settings.duration_secs());
        info!("Player ready, seeking to {}s of {}s", offset, media_secs);

        self.player.seek_to(offset, true);
        self.player.set_volume(self.settings.volume);
        self.player.add_state_listener(listener);
    }

    /// Handle a player state transition.
    pub fn on_player_state_changed(&mut self, new_state: PlayerState) {
        if self.state.is_submitted {
            debug!("Player state {:?} after submission ignored", new_state);
            return;
        }
        if new_state != PlayerState::Playing || self.state.is_counting {
            debug!("Player state {:?} ignored", new_state);
            return;
        }

        self.state.is_counting = true;
        self.display.remove_loading_indicator();
        info!("Playback started, counting down from {} ms", self.state.remaining_millis);
        // The first step is taken as playback starts; `tick` re-arms itself.
        self.tick();
    }

    fn schedule_tick(&mut self) {
        let handle = self.scheduler.schedule(self.settings.step());
        self.state.tick_handle = Some(handle);
    }

    /// Advance the countdown by one step.
    ///
    /// Runs once when playback starts, then each time the scheduled tick
    /// fires. Ticks arriving before counting or after submission are ignored.
    pub fn tick(&mut self) {
        if !self.state.may_tick() {
            debug!("Stale tick ignored in phase {:?}", self.state.phase());
            return;
        }
        self.state.tick_handle = None;

        let step = self.settings.step_millis;
        self.state.remaining_millis = self.state.remaining_millis.saturating_sub(step);
        self.state.ticks += 1;

        let text = format_remaining(self.state.remaining_millis);
        self.display.set_text(&text);
        self.form.set_field(REMAINING_TIME_FIELD, &text);

        if self.state.remaining_millis < self.settings.warning_threshold_millis {
            self.display.set_color(&self.settings.warning_color);
            if !self.state.warning {
                debug!("Remaining time {} below warning threshold", text);
                self.state.warning = true;
            }
        }

        if self.state.remaining_millis >= step {
            self.schedule_tick();
        } else {
            self.submit_by_timeout();
        }
    }

    /// Submit on explicit user action.
    ///
    /// Returns false when the form was already submitted.
    pub fn submit_by_user(&mut self) -> bool {
        if self.state.is_submitted {
            debug!("Form already submitted, user submission ignored");
            return false;
        }
        self.state.is_submitted = true;
        self.state.submission = Some(SubmissionKind::User);

        if let Some(handle) = self.state.tick_handle.take() {
            self.scheduler.cancel(handle);
        }
        self.stop_player();
        self.form.submit();
        info!("Submitted by user with {} ms left", self.state.remaining_millis);
        true
    }

    // Only reached from `tick`, which already checked the submission guard.
    fn submit_by_timeout(&mut self) {
        self.stop_player();
        if self.settings.timeout_flag && self.form.has_field(TIMEOUT_FLAG_FIELD) {
            self.form.set_field(TIMEOUT_FLAG_FIELD, "true");
        } else {
            debug!("No timeout flag field, submitting without it");
        }
        self.state.is_submitted = true;
        self.state.submission = Some(SubmissionKind::Timeout);
        self.form.submit();
        info!("Time is up after {} ticks, form submitted", self.state.ticks);
    }

    fn stop_player(&mut self) {
        if self.player.can_stop() {
            self.player.stop_video();
        } else {
            debug!("Player cannot stop, leaving playback running");
        }
    }

    pub fn state(&self) -> &TimerState<S::Handle> {
        &self.state
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        self.state.snapshot()
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn is_submitted(&self) -> bool {
        self.state.is_submitted
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut F {
        &mut self.form
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}

impl<P, D, F> QuizTimer<P, D, F, ManualScheduler>
where
    P: VideoPlayer,
    D: TimerDisplay,
    F: AnswerForm,
{
    /// Fire the pending tick, if any. Returns whether a tick ran.
    pub fn advance(&mut self) -> bool {
        if self.scheduler.fire().is_none() {
            return false;
        }
        self.tick();
        true
    }

    /// Fire ticks until none is pending; returns how many ran.
    pub fn run_to_end(&mut self) -> u32 {
        let mut fired = 0;
        while self.advance() {
            fired += 1;
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StartPosition;
    use rand::{rngs::StdRng, SeedableRng};
    use std::{
        collections::BTreeMap,
        sync::{Arc, Mutex},
    };

    #[derive(Default)]
    struct FakePlayer {
        seeks: Vec<(u32, bool)>,
        volume: Option<u8>,
        stops: u32,
        unstoppable: bool,
        listener: Option<StateListener>,
    }

    impl VideoPlayer for FakePlayer {
        fn duration_secs(&self) -> u32 {
            200
        }
        fn seek_to(&mut self, offset_secs: u32, allow_seek_ahead: bool) {
            self.seeks.push((offset_secs, allow_seek_ahead));
        }
        fn set_volume(&mut self, percent: u8) {
            self.volume = Some(percent);
        }
        fn can_stop(&self) -> bool {
            !self.unstoppable
        }
        fn stop_video(&mut self) {
            self.stops += 1;
        }
        fn add_state_listener(&mut self, listener: StateListener) {
            self.listener = Some(listener);
        }
    }

    #[derive(Default)]
    struct FakePage {
        text: String,
        texts_written: u32,
        loading_removed: u32,
        color: Option<String>,
        fields: BTreeMap<String, String>,
        submitted: Vec<BTreeMap<String, String>>,
    }

    impl FakePage {
        fn with_fields(names: &[&str]) -> Self {
            Self {
                fields: names.iter().map(|n| (n.to_string(), String::new())).collect(),
                ..Self::default()
            }
        }
    }

    impl TimerDisplay for FakePage {
        fn set_text(&mut self, text: &str) {
            self.text = text.to_string();
            self.texts_written += 1;
        }
        fn remove_loading_indicator(&mut self) {
            self.loading_removed += 1;
        }
        fn set_color(&mut self, color: &str) {
            self.color = Some(color.to_string());
        }
    }

    // The display and the form are one fake; the timer sees two views of it.
    #[derive(Clone)]
    struct Shared(Arc<Mutex<FakePage>>);

    impl TimerDisplay for Shared {
        fn set_text(&mut self, text: &str) {
            self.0.lock().unwrap().set_text(text)
        }
        fn remove_loading_indicator(&mut self) {
            self.0.lock().unwrap().remove_loading_indicator()
        }
        fn set_color(&mut self, color: &str) {
            self.0.lock().unwrap().set_color(color)
        }
    }

    impl AnswerForm for Shared {
        fn has_field(&self, name: &str) -> bool {
            self.0.lock().unwrap().fields.contains_key(name)
        }
        fn set_field(&mut self, name: &str, value: &str) {
            if let Some(field) = self.0.lock().unwrap().fields.get_mut(name) {
                *field = value.to_string();
            }
        }
        fn submit(&mut self) {
            let mut page = self.0.lock().unwrap();
            let fields = page.fields.clone();
            page.submitted.push(fields);
        }
    }

    type TestTimer = QuizTimer<FakePlayer, Shared, Shared, ManualScheduler>;

    fn timer_with(settings: TimerSettings, fields: &[&str]) -> (TestTimer, Arc<Mutex<FakePage>>) {
        let page = Arc::new(Mutex::new(FakePage::with_fields(fields)));
        let shared = Shared(Arc::clone(&page));
        let timer = QuizTimer::new(
            settings,
            FakePlayer::default(),
            shared.clone(),
            shared,
            ManualScheduler::new(),
        )
        .expect("valid timer");
        (timer, page)
    }

    fn timer() -> (TestTimer, Arc<Mutex<FakePage>>) {
        timer_with(TimerSettings::default(), &[REMAINING_TIME_FIELD, TIMEOUT_FLAG_FIELD])
    }

    fn started() -> (TestTimer, Arc<Mutex<FakePage>>) {
        let (mut timer, page) = timer();
        timer.on_player_state_changed(PlayerState::Playing);
        (timer, page)
    }

    #[test]
    fn missing_remaining_time_field_is_a_configuration_error() {
        let page = Shared(Arc::new(Mutex::new(FakePage::with_fields(&[TIMEOUT_FLAG_FIELD]))));
        let result = QuizTimer::new(
            TimerSettings::default(),
            FakePlayer::default(),
            page.clone(),
            page,
            ManualScheduler::new(),
        );
        assert_eq!(result.err(), Some(TimerError::MissingField(REMAINING_TIME_FIELD)));
    }

    #[test]
    fn zero_step_is_rejected() {
        let page = Shared(Arc::new(Mutex::new(FakePage::with_fields(&[REMAINING_TIME_FIELD]))));
        let settings = TimerSettings { step_millis: 0, ..TimerSettings::default() };
        let result = QuizTimer::new(settings, FakePlayer::default(), page.clone(), page, ManualScheduler::new());
        assert_eq!(result.err(), Some(TimerError::ZeroStep));
    }

    #[test]
    fn player_ready_seeks_sets_volume_and_subscribes() {
        let settings = TimerSettings {
            start: StartPosition::Fixed { offset_secs: 17 },
            ..TimerSettings::default()
        };
        let (mut timer, _) = timer_with(settings, &[REMAINING_TIME_FIELD]);
        let mut rng = StdRng::seed_from_u64(3);
        timer.on_player_ready(Box::new(|_| {}), &mut rng);

        assert_eq!(timer.player().seeks, vec![(17, true)]);
        assert_eq!(timer.player().volume, Some(100));
        assert!(timer.player().listener.is_some());
        assert!(timer.snapshot().player_ready);

        // A repeated ready notification does not seek again.
        timer.on_player_ready(Box::new(|_| {}), &mut rng);
        assert_eq!(timer.player().seeks.len(), 1);
    }

    #[test]
    fn random_start_stays_within_media() {
        let (mut timer, _) = timer();
        timer.on_player_ready(Box::new(|_| {}), &mut StdRng::seed_from_u64(11));
        let (offset, _) = timer.player().seeks[0];
        assert!(offset <= 180);
    }

    #[test]
    fn countdown_starts_once_on_first_playing() {
        let (mut timer, page) = timer();
        for state in [PlayerState::Unstarted, PlayerState::Buffering, PlayerState::VideoCued] {
            timer.on_player_state_changed(state);
        }
        assert_eq!(timer.scheduler().scheduled(), 0);
        assert!(!timer.snapshot().tick_pending);

        timer.on_player_state_changed(PlayerState::Playing);
        timer.on_player_state_changed(PlayerState::Paused);
        timer.on_player_state_changed(PlayerState::Playing);

        assert_eq!(timer.scheduler().scheduled(), 1);
        assert_eq!(timer.state().ticks(), 1);
        assert_eq!(page.lock().unwrap().loading_removed, 1);
        assert_eq!(timer.snapshot().phase, crate::state::Phase::Counting);
    }

    #[test]
    fn first_step_is_shown_as_playback_starts() {
        let (mut timer, page) = timer();
        timer.on_player_state_changed(PlayerState::Playing);

        assert_eq!(timer.state().remaining_millis(), 19_900);
        assert_eq!(timer.state().ticks(), 1);
        assert!(timer.snapshot().tick_pending);
        let page = page.lock().unwrap();
        assert_eq!(page.text, "19.9");
        assert_eq!(page.fields[REMAINING_TIME_FIELD], "19.9");
        assert_eq!(page.loading_removed, 1);
    }

    #[test]
    fn playing_after_submission_does_not_start_countdown() {
        let (mut timer, page) = timer();
        assert!(timer.submit_by_user());
        timer.on_player_state_changed(PlayerState::Playing);

        assert_eq!(timer.scheduler().scheduled(), 0);
        assert_eq!(page.lock().unwrap().loading_removed, 0);
        assert_eq!(page.lock().unwrap().submitted.len(), 1);
    }

    #[test]
    fn remaining_time_drops_one_step_per_tick() {
        let (mut timer, page) = started();
        for n in 2..=57u64 {
            assert!(timer.advance());
            assert_eq!(timer.state().remaining_millis(), 20_000 - n * 100);
        }
        let page = page.lock().unwrap();
        assert_eq!(page.text, "14.3");
        assert_eq!(page.fields[REMAINING_TIME_FIELD], "14.3");
        assert_eq!(timer.scheduler().pending(), 1);
    }

    #[test]
    fn warning_color_applies_from_first_tick_below_threshold() {
        let (mut timer, page) = started();
        // 100 ticks reach exactly 10000 ms, which is not below the threshold.
        for _ in 1..100 {
            timer.advance();
        }
        assert_eq!(timer.state().remaining_millis(), 10_000);
        assert_eq!(page.lock().unwrap().color, None);
        assert!(!timer.snapshot().warning);

        timer.advance();
        assert_eq!(page.lock().unwrap().color.as_deref(), Some("#CC0000"));
        assert!(timer.snapshot().warning);

        for _ in 0..20 {
            timer.advance();
            assert_eq!(page.lock().unwrap().color.as_deref(), Some("#CC0000"));
        }
    }

    #[test]
    fn full_countdown_times_out_after_200_ticks() {
        let (mut timer, page) = started();
        let fired = timer.run_to_end();

        assert_eq!(fired, 199);
        assert_eq!(timer.state().ticks(), 200);
        assert_eq!(timer.state().remaining_millis(), 0);
        assert_eq!(timer.snapshot().submission, Some(SubmissionKind::Timeout));
        assert_eq!(timer.player().stops, 1);

        let page = page.lock().unwrap();
        assert_eq!(page.text, "0.0");
        assert_eq!(page.submitted.len(), 1);
        assert_eq!(page.submitted[0][REMAINING_TIME_FIELD], "0.0");
        assert_eq!(page.submitted[0][TIMEOUT_FLAG_FIELD], "true");
    }

    #[test]
    fn user_submit_mid_countdown_cancels_the_tick() {
        let (mut timer, page) = started();
        for _ in 1..47 {
            timer.advance();
        }
        assert_eq!(timer.state().remaining_millis(), 15_300);

        assert!(timer.submit_by_user());
        assert_eq!(timer.scheduler().cancelled(), 1);
        assert_eq!(timer.scheduler().pending(), 0);
        assert_eq!(timer.player().stops, 1);

        let page = page.lock().unwrap();
        assert_eq!(page.submitted.len(), 1);
        assert_eq!(page.submitted[0][REMAINING_TIME_FIELD], "15.3");
        assert_eq!(page.submitted[0][TIMEOUT_FLAG_FIELD], "");
    }

    #[test]
    fn second_submission_has_no_effect_in_either_order() {
        let (mut timer, page) = started();
        timer.advance();
        assert!(timer.submit_by_user());
        assert!(!timer.submit_by_user());
        timer.tick();
        assert_eq!(timer.player().stops, 1);
        assert_eq!(page.lock().unwrap().submitted.len(), 1);

        let (mut timer, page) = started();
        timer.run_to_end();
        assert!(!timer.submit_by_user());
        assert_eq!(timer.player().stops, 1);
        assert_eq!(timer.scheduler().cancelled(), 0);
        assert_eq!(page.lock().unwrap().submitted.len(), 1);
        assert_eq!(timer.snapshot().submission, Some(SubmissionKind::Timeout));
    }

    #[test]
    fn stale_tick_after_submission_changes_nothing() {
        let (mut timer, page) = started();
        timer.advance();
        timer.submit_by_user();
        let written = page.lock().unwrap().texts_written;

        timer.tick();
        timer.tick();

        assert_eq!(timer.state().remaining_millis(), 19_800);
        assert_eq!(timer.state().ticks(), 2);
        assert_eq!(page.lock().unwrap().texts_written, written);
    }

    #[test]
    fn tick_before_playback_is_ignored() {
        let (mut timer, page) = timer();
        timer.tick();
        assert_eq!(timer.state().remaining_millis(), 20_000);
        assert_eq!(page.lock().unwrap().texts_written, 0);
    }

    #[test]
    fn timeout_without_flag_field_still_submits() {
        let (mut timer, page) = timer_with(TimerSettings::default(), &[REMAINING_TIME_FIELD]);
        timer.on_player_state_changed(PlayerState::Playing);
        timer.run_to_end();

        let page = page.lock().unwrap();
        assert_eq!(page.submitted.len(), 1);
        assert!(!page.submitted[0].contains_key(TIMEOUT_FLAG_FIELD));
    }

    #[test]
    fn disabled_timeout_flag_leaves_field_untouched() {
        let settings = TimerSettings { timeout_flag: false, ..TimerSettings::default() };
        let (mut timer, page) = timer_with(settings, &[REMAINING_TIME_FIELD, TIMEOUT_FLAG_FIELD]);
        timer.on_player_state_changed(PlayerState::Playing);
        timer.run_to_end();

        assert_eq!(page.lock().unwrap().submitted[0][TIMEOUT_FLAG_FIELD], "");
    }

    #[test]
    fn unstoppable_player_is_tolerated() {
        let page = Shared(Arc::new(Mutex::new(FakePage::with_fields(&[REMAINING_TIME_FIELD]))));
        let player = FakePlayer { unstoppable: true, ..FakePlayer::default() };
        let mut timer = QuizTimer::new(
            TimerSettings::default(),
            player,
            page.clone(),
            page.clone(),
            ManualScheduler::new(),
        )
        .unwrap();
        timer.on_player_state_changed(PlayerState::Playing);

        assert!(timer.submit_by_user());
        assert_eq!(timer.player().stops, 0);
        assert_eq!(page.0.lock().unwrap().submitted.len(), 1);
    }

    #[test]
    fn uneven_duration_never_goes_negative() {
        let settings = TimerSettings { duration_millis: 1_050, ..TimerSettings::default() };
        let (mut timer, page) = timer_with(settings, &[REMAINING_TIME_FIELD]);
        timer.on_player_state_changed(PlayerState::Playing);
        let fired = timer.run_to_end();

        assert_eq!(fired, 9);
        assert_eq!(timer.state().remaining_millis(), 50);
        assert_eq!(page.lock().unwrap().submitted.len(), 1);
    }

    #[test]
    fn formats_tenths_of_a_second() {
        assert_eq!(format_remaining(20_000), "20.0");
        assert_eq!(format_remaining(15_300), "15.3");
        assert_eq!(format_remaining(100), "0.1");
        assert_eq!(format_remaining(0), "0.0");
    }
}
