//! Countdown background task: one per quiz page

use std::time::Duration;

use tokio::{
    sync::{mpsc, oneshot, watch},
    task::AbortHandle,
    time::sleep,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    services::{AnswerForm, PlayerState, RemotePage, RemotePlayer},
    state::{TimerSnapshot, ANSWER_FIELD},
    timer::{QuizTimer, TickScheduler},
};

/// Events processed by a page's countdown task, one at a time
#[derive(Debug)]
pub enum TimerEvent {
    PlayerReady {
        reply: Option<oneshot::Sender<TimerSnapshot>>,
    },
    PlayerStateChanged(PlayerState),
    Tick,
    UserSubmit {
        answer: Option<String>,
        reply: Option<oneshot::Sender<TimerSnapshot>>,
    },
}

/// Arms ticks as tokio sleeps that post `TimerEvent::Tick` back to the task
#[derive(Debug, Clone)]
pub struct TokioTickScheduler {
    events: mpsc::UnboundedSender<TimerEvent>,
}

impl TokioTickScheduler {
    pub fn new(events: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Self { events }
    }
}

impl TickScheduler for TokioTickScheduler {
    type Handle = AbortHandle;

    fn schedule(&mut self, after: Duration) -> AbortHandle {
        let events = self.events.clone();
        tokio::spawn(async move {
            sleep(after).await;
            // The page may already be gone.
            let _ = events.send(TimerEvent::Tick);
        })
        .abort_handle()
    }

    fn cancel(&mut self, handle: AbortHandle) {
        handle.abort();
    }
}

/// Quiz timer as hosted for a remote page
pub type PageTimer = QuizTimer<RemotePlayer, RemotePage, RemotePage, TokioTickScheduler>;

fn send_reply(to: Option<oneshot::Sender<TimerSnapshot>>, snapshot: &TimerSnapshot) {
    if let Some(to) = to {
        let _ = to.send(snapshot.clone());
    }
}

/// Drive a page timer until its form is submitted.
///
/// `events_tx` is the sender side of `events`; it is handed to the player as
/// its state listener once the player is ready.
pub async fn countdown_task(
    page_id: Uuid,
    mut timer: PageTimer,
    events_tx: mpsc::UnboundedSender<TimerEvent>,
    mut events: mpsc::UnboundedReceiver<TimerEvent>,
    snapshot_tx: watch::Sender<TimerSnapshot>,
) {
    info!("Starting countdown task for page {}", page_id);

    while let Some(event) = events.recv().await {
        let reply_to = match event {
            TimerEvent::PlayerReady { reply } => {
                let listener_tx = events_tx.clone();
                timer.on_player_ready(
                    Box::new(move |state| {
                        let _ = listener_tx.send(TimerEvent::PlayerStateChanged(state));
                    }),
                    &mut rand::rng(),
                );
                reply
            }
            TimerEvent::PlayerStateChanged(state) => {
                timer.on_player_state_changed(state);
                None
            }
            TimerEvent::Tick => {
                timer.tick();
                None
            }
            TimerEvent::UserSubmit { answer, reply } => {
                if let (Some(answer), false) = (answer, timer.is_submitted()) {
                    timer.form_mut().set_field(ANSWER_FIELD, &answer);
                }
                timer.submit_by_user();
                reply
            }
        };

        let snapshot = timer.snapshot();
        snapshot_tx.send_replace(snapshot.clone());
        send_reply(reply_to, &snapshot);

        if snapshot.is_finished() {
            break;
        }
    }

    debug!("Countdown task for page {} finished", page_id);
}
