//! Quiz page session: one hosted page and its countdown task

use chrono::{DateTime, Utc};
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    config::TimerSettings,
    error::TimerError,
    services::{PlayerState, PlayerView, RemotePage, RemotePlayer},
    tasks::{countdown_task, TimerEvent, TokioTickScheduler},
    timer::QuizTimer,
};

use super::{PageView, TimerSnapshot};

/// A hosted quiz page.
///
/// Dropping the session ends its countdown task.
#[derive(Debug)]
pub struct QuizSession {
    pub id: Uuid,
    pub video_code: String,
    pub created_at: DateTime<Utc>,
    pub settings: TimerSettings,
    pub player: RemotePlayer,
    pub page: RemotePage,
    events: mpsc::UnboundedSender<TimerEvent>,
    timer_rx: watch::Receiver<TimerSnapshot>,
    task: JoinHandle<()>,
}

impl QuizSession {
    /// Create the page's collaborators and start its countdown task
    pub fn spawn(
        video_code: String,
        media_duration_secs: u32,
        settings: TimerSettings,
    ) -> Result<Self, TimerError> {
        let id = Uuid::new_v4();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let player = RemotePlayer::new(media_duration_secs);
        let page = RemotePage::new(settings.timeout_flag);

        let timer = QuizTimer::new(
            settings.clone(),
            player.clone(),
            page.clone(),
            page.clone(),
            TokioTickScheduler::new(events_tx.clone()),
        )?;
        let (timer_tx, timer_rx) = watch::channel(timer.snapshot());
        let task = tokio::spawn(countdown_task(id, timer, events_tx.clone(), events_rx, timer_tx));

        info!("Created quiz page {} for video {}", id, video_code);
        Ok(Self {
            id,
            video_code,
            created_at: Utc::now(),
            settings,
            player,
            page,
            events: events_tx,
            timer_rx,
            task,
        })
    }

    /// Latest published timer state
    pub fn timer(&self) -> TimerSnapshot {
        self.timer_rx.borrow().clone()
    }

    pub fn view(&self) -> PageView {
        self.page.view()
    }

    pub fn player_view(&self) -> PlayerView {
        self.player.view()
    }

    /// When the form was submitted, if it was
    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.page.view().submission.map(|submission| submission.submitted_at)
    }

    // Once the form is submitted the task has ended and events go nowhere;
    // the latest snapshot is then the answer.
    async fn request(&self, event: TimerEvent, reply: oneshot::Receiver<TimerSnapshot>) -> TimerSnapshot {
        if self.events.send(event).is_err() {
            debug!("Page {} no longer counting, event dropped", self.id);
            return self.timer();
        }
        reply.await.unwrap_or_else(|_| self.timer())
    }

    /// The embedded player has been constructed
    pub async fn player_ready(&self) -> TimerSnapshot {
        let (tx, rx) = oneshot::channel();
        self.request(TimerEvent::PlayerReady { reply: Some(tx) }, rx).await
    }

    /// The player reported a state change; false if nobody listens yet
    pub fn player_state(&self, state: PlayerState) -> bool {
        self.player.notify(state)
    }

    /// The user pressed submit
    pub async fn submit(&self, answer: Option<String>) -> TimerSnapshot {
        let (tx, rx) = oneshot::channel();
        self.request(TimerEvent::UserSubmit { answer, reply: Some(tx) }, rx).await
    }
}

impl Drop for QuizSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}
