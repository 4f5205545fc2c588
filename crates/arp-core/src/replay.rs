//! Onboarding playback of a [`GestureScript`].
//!
//! The replayer is a small state machine (step index plus a released flag)
//! advanced by scheduler tasks. It never touches sessions itself: every
//! transition yields a [`ReplayEvent`] shaped like real input, which the
//! instrument feeds through the same controller calls a pointer would.
//!
//! Cadence: start delivers step 0 as the gesture start; after the initial
//! delay each step is delivered on an animation frame, with a short timer
//! between steps; after the last step a hold timer releases the gesture.

use crate::config::ReplayConfig;
use crate::scheduler::{Scheduler, Task};
use crate::script::{GestureScript, Viewport};
use crate::state::Position;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplayTask {
    /// Initial delay elapsed; begin stepping.
    Begin(u32),
    /// Inter-step delay elapsed; wait for the next frame.
    Delay(u32),
    /// Deliver the current step (runs on an animation frame).
    Step(u32),
    /// Hold after the last step elapsed; release.
    Release(u32),
}

impl ReplayTask {
    fn run(self) -> u32 {
        match self {
            ReplayTask::Begin(r) | ReplayTask::Delay(r) | ReplayTask::Step(r) | ReplayTask::Release(r) => r,
        }
    }
}

/// Input synthesized by the replay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReplayEvent {
    Start(Position),
    Move(Position),
    End,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplayState {
    Idle,
    Waiting,
    Playing,
    Holding,
    Finished,
    Cancelled,
}

pub struct GestureReplayer {
    script: &'static GestureScript,
    config: ReplayConfig,
    state: ReplayState,
    run: u32,
    step: usize,
    released: bool,
}

impl GestureReplayer {
    pub fn new(script: &'static GestureScript, config: ReplayConfig) -> Self {
        Self {
            script,
            config,
            state: ReplayState::Idle,
            run: 0,
            step: 0,
            released: false,
        }
    }

    /// Begin a playback run, returning the gesture start for step 0.
    ///
    /// Returns `None` while a run is still in progress; a finished or
    /// cancelled replayer starts a fresh run.
    pub fn start(&mut self, viewport: Viewport, scheduler: &mut Scheduler) -> Option<ReplayEvent> {
        if self.is_running() {
            return None;
        }
        let first = self.script.absolute(0, viewport)?;
        self.run = self.run.wrapping_add(1);
        self.state = ReplayState::Waiting;
        self.step = 0;
        self.released = false;
        scheduler.schedule_after(
            self.config.initial_delay,
            Task::Replay(ReplayTask::Begin(self.run)),
        );
        log::info!("[replay] run {} started ({} steps)", self.run, self.script.len());
        Some(ReplayEvent::Start(first))
    }

    /// Advance on a scheduler task. Tasks from earlier runs, or arriving after a cancel, do nothing.
    pub fn handle(
        &mut self,
        task: ReplayTask,
        viewport: Viewport,
        scheduler: &mut Scheduler,
    ) -> Option<ReplayEvent> {
        if task.run() != self.run || !self.is_running() {
            return None;
        }
        match task {
            ReplayTask::Begin(run) | ReplayTask::Delay(run) => {
                scheduler.request_frame(Task::Replay(ReplayTask::Step(run)));
                if self.state == ReplayState::Waiting {
                    self.state = ReplayState::Playing;
                }
                None
            }
            ReplayTask::Step(run) => {
                let position = self.script.absolute(self.step, viewport)?;
                if self.step >= self.script.last_index() {
                    self.state = ReplayState::Holding;
                    scheduler.schedule_after(self.config.hold, Task::Replay(ReplayTask::Release(run)));
                } else {
                    self.step += 1;
                    scheduler.schedule_after(self.config.step_delay, Task::Replay(ReplayTask::Delay(run)));
                }
                Some(ReplayEvent::Move(position))
            }
            ReplayTask::Release(_) => {
                self.state = ReplayState::Finished;
                log::info!("[replay] run {} finished", self.run);
                self.release()
            }
        }
    }

    /// Interrupt playback. Yields the release if it has not been delivered yet.
    pub fn cancel(&mut self) -> Option<ReplayEvent> {
        if !self.is_running() {
            return None;
        }
        self.state = ReplayState::Cancelled;
        log::info!("[replay] run {} interrupted at step {}", self.run, self.step);
        self.release()
    }

    fn release(&mut self) -> Option<ReplayEvent> {
        if self.released {
            return None;
        }
        self.released = true;
        Some(ReplayEvent::End)
    }

    pub fn is_running(&self) -> bool {
        matches!(
            self.state,
            ReplayState::Waiting | ReplayState::Playing | ReplayState::Holding
        )
    }

    pub fn state(&self) -> ReplayState {
        self.state
    }

    /// Index of the next step to deliver.
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn script(&self) -> &'static GestureScript {
        self.script
    }
}
