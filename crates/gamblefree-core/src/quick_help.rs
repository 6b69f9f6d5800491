//! The guided urge-management flow: rate the urge, pick a trigger and a
//! distraction, ride out a ten-minute timer, then reflect.
//!
//! Everything here is plain, serialisable state. A client holds the
//! [`UrgeSession`] between steps and sends it back with each [`FlowAction`];
//! [`UrgeSession::apply`] updates it in place and hands back the
//! [`NewEvent`]s the caller should log.

use serde::{Deserialize, Serialize};

use crate::event::{EventKind, NewEvent};

/// Distraction activities offered during the flow.
pub const ACTIVITIES: [&str; 12] = [
  "20 push-ups or jumping jacks",
  "Cold shower or face wash",
  "Call or text a friend",
  "Fast walk around the block",
  "Play your favorite song LOUD",
  "Watch a funny video",
  "Do 10 burpees",
  "Clean something for 10 minutes",
  "Play a mobile game",
  "Journal for 5 minutes",
  "Practice box breathing (4-4-4-4)",
  "Stretch for 5 minutes",
];

/// How many activities the first step shows.
pub const FEATURED_ACTIVITIES: usize = 6;

pub const TRIGGERS: [&str; 6] =
  ["Saw an ad", "Payday", "Stressed", "Bored", "Friends betting", "Other"];

/// Length of one delay period.
pub const TIMER_SECONDS: u32 = 600;

/// In-flow urge intensity runs 1..=5, defaulting to the top.
pub const MAX_FLOW_URGE: u8 = 5;

// ─── Timer ───────────────────────────────────────────────────────────────────

/// A one-second-resolution countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgeTimer {
  remaining: u32,
}

impl Default for UrgeTimer {
  fn default() -> Self { Self { remaining: TIMER_SECONDS } }
}

impl UrgeTimer {
  pub fn remaining(&self) -> u32 { self.remaining }

  pub fn is_finished(&self) -> bool { self.remaining == 0 }

  /// Advance by one second. Returns `true` on the tick that reaches zero.
  pub fn tick(&mut self) -> bool {
    if self.remaining == 0 {
      return false;
    }
    self.remaining -= 1;
    self.remaining == 0
  }

  /// "Add 10 more minutes": start a fresh full period.
  pub fn restart(&mut self) { self.remaining = TIMER_SECONDS; }

  /// `m:ss`
  pub fn display(&self) -> String {
    format!("{}:{:02}", self.remaining / 60, self.remaining % 60)
  }
}

// ─── Session ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
  Assess,
  Riding,
  Complete,
  /// Reflection submitted; no further transitions.
  Closed,
}

/// Where the user goes after reflecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStop {
  Home,
  Coach,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
  #[error("pick a distraction activity before starting the timer")]
  NoActivity,
  #[error("urge level {0} is outside the 1-5 scale")]
  UrgeOutOfRange(u8),
  #[error("not allowed from the {0:?} step")]
  WrongStep(Step),
}

/// One user action in the flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FlowAction {
  SetUrge { level: u8 },
  SetTrigger { trigger: String },
  ChooseActivity { activity: String },
  StartTimer,
  /// Seconds the client counted down since its last report.
  Elapsed { seconds: u32 },
  AddTenMinutes,
  FinishEarly,
  Finish { still_have_urge: bool },
}

/// The outcome of [`UrgeSession::apply`].
#[derive(Debug, Clone, Default)]
pub struct Transition {
  pub events: Vec<NewEvent>,
  /// Set once the flow closes.
  pub next:   Option<NextStop>,
}

/// One pass through the guided flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgeSession {
  user_id:  String,
  step:     Step,
  urge:     u8,
  trigger:  Option<String>,
  activity: Option<String>,
  timer:    UrgeTimer,
}

impl UrgeSession {
  /// Open the flow. The returned event records that quick help was reached.
  pub fn open(user_id: impl Into<String>) -> (Self, NewEvent) {
    let user_id = user_id.into();
    let event = NewEvent::new(user_id.clone(), EventKind::QuickHelpAccessed);
    let session = Self {
      user_id,
      step: Step::Assess,
      urge: MAX_FLOW_URGE,
      trigger: None,
      activity: None,
      timer: UrgeTimer::default(),
    };
    (session, event)
  }

  pub fn user_id(&self) -> &str { &self.user_id }

  pub fn step(&self) -> Step { self.step }

  pub fn timer(&self) -> &UrgeTimer { &self.timer }

  pub fn set_urge(&mut self, level: u8) -> Result<(), FlowError> {
    if !(1..=MAX_FLOW_URGE).contains(&level) {
      return Err(FlowError::UrgeOutOfRange(level));
    }
    self.urge = level;
    Ok(())
  }

  pub fn set_trigger(&mut self, trigger: impl Into<String>) {
    self.trigger = Some(trigger.into());
  }

  pub fn choose_activity(&mut self, activity: impl Into<String>) {
    self.activity = Some(activity.into());
  }

  pub fn start_timer(&mut self) -> Result<NewEvent, FlowError> {
    if self.step != Step::Assess {
      return Err(FlowError::WrongStep(self.step));
    }
    let activity = self.activity.clone().ok_or(FlowError::NoActivity)?;
    self.step = Step::Riding;
    self.timer = UrgeTimer::default();
    Ok(
      NewEvent::new(self.user_id.clone(), EventKind::TimerStarted)
        .with("urge_level", self.urge)
        .with("trigger", self.trigger.clone().unwrap_or_default())
        .with("activity", activity),
    )
  }

  /// Advance the timer one second. When it runs out the session moves to
  /// reflection and the completion event is returned.
  pub fn tick(&mut self) -> Option<NewEvent> {
    if self.step != Step::Riding || !self.timer.tick() {
      return None;
    }
    self.step = Step::Complete;
    Some(
      NewEvent::new(self.user_id.clone(), EventKind::TimerCompleted)
        .with("initial_urge", self.urge)
        .with("trigger", self.trigger.clone().unwrap_or_default())
        .with("activity", self.activity.clone().unwrap_or_default()),
    )
  }

  pub fn add_ten_minutes(&mut self) -> Result<(), FlowError> {
    if self.step != Step::Riding {
      return Err(FlowError::WrongStep(self.step));
    }
    self.timer.restart();
    Ok(())
  }

  /// "I'm good now": skip the rest of the timer.
  pub fn finish_early(&mut self) -> Result<(), FlowError> {
    if self.step != Step::Riding {
      return Err(FlowError::WrongStep(self.step));
    }
    self.step = Step::Complete;
    Ok(())
  }

  /// Close the flow. A lingering urge routes the user to the coach.
  pub fn finish(&mut self, still_have_urge: bool) -> Result<(NextStop, NewEvent), FlowError> {
    if self.step != Step::Complete {
      return Err(FlowError::WrongStep(self.step));
    }
    self.step = Step::Closed;
    let next = if still_have_urge { NextStop::Coach } else { NextStop::Home };
    let event = NewEvent::new(self.user_id.clone(), EventKind::QuickHelpCompleted)
      .with("success", !still_have_urge)
      .with("initial_urge", self.urge)
      .with("trigger", self.trigger.clone().unwrap_or_default());
    Ok((next, event))
  }

  /// Apply one action. On error the session is left unchanged.
  pub fn apply(&mut self, action: FlowAction) -> Result<Transition, FlowError> {
    let mut transition = Transition::default();
    match action {
      FlowAction::SetUrge { level } => self.set_urge(level)?,
      FlowAction::SetTrigger { trigger } => self.set_trigger(trigger),
      FlowAction::ChooseActivity { activity } => self.choose_activity(activity),
      FlowAction::StartTimer => transition.events.push(self.start_timer()?),
      FlowAction::Elapsed { seconds } => {
        if self.step != Step::Riding {
          return Err(FlowError::WrongStep(self.step));
        }
        for _ in 0..seconds.min(TIMER_SECONDS) {
          if let Some(event) = self.tick() {
            transition.events.push(event);
            break;
          }
        }
      }
      FlowAction::AddTenMinutes => self.add_ten_minutes()?,
      FlowAction::FinishEarly => self.finish_early()?,
      FlowAction::Finish { still_have_urge } => {
        let (next, event) = self.finish(still_have_urge)?;
        transition.events.push(event);
        transition.next = Some(next);
      }
    }
    Ok(transition)
  }
}
