//! Line commands for the headless console front end.
//!
//! [`Command::parse`] turns one input line into a command and
//! [`Session::handle_line`] executes it against a [`Console`], returning
//! the lines to print. A `delete` leaves the session waiting for a
//! `yes`/`no` answer on the next line.

use std::fmt::Write as _;
use std::str::FromStr;

use scriptdeck_core::detail::DetailState;
use scriptdeck_core::error::CoreError;
use scriptdeck_core::schedule::{ScheduleConfig, ScheduleTime, Weekday};
use scriptdeck_core::task::Task;
use scriptdeck_core::types::TaskId;

use crate::launcher::SubmitOutcome;
use crate::schedules::PendingDelete;
use crate::state::Console;

pub const HELP: &str = "\
commands:
  scripts                         list the script catalog
  add [script]                    append a script (default: first in catalog)
  remove <index>                  remove the script at a position
  clear                           empty the sequence
  sequence                        show the sequence being composed
  run                             run the sequence now
  schedule daily <HH:MM>          run the sequence every day
  schedule weekly <HH:MM> <days>  run it weekly (e.g. mon, fri)
  tasks                           list known tasks
  detail <task_id>                follow a task's output
  close                           close the detail view
  stop <task_id>                  ask the service to stop a task
  schedules                       list schedules
  panel                           show or hide the schedule panel
  toggle <schedule_id>            enable or disable a schedule
  delete <schedule_id>            delete a schedule (asks to confirm)
  help                            show this text
  quit                            exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Scripts,
    Add(Option<String>),
    Remove(usize),
    Clear,
    Sequence,
    Run,
    Schedule(ScheduleConfig),
    Tasks,
    Detail(String),
    Close,
    Stop(String),
    Schedules,
    Panel,
    Toggle(String),
    Delete(String),
    Help,
    Quit,
}

impl Command {
    /// Parse a non-empty input line.
    pub fn parse(line: &str) -> Result<Self, CoreError> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(CoreError::Validation("empty command".into()));
        };
        let args: Vec<&str> = words.collect();

        let cmd = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("scripts", []) => Self::Scripts,
            ("add", []) => Self::Add(None),
            ("add", [script]) => Self::Add(Some(script.to_string())),
            ("remove", [index]) => Self::Remove(index.parse().map_err(|_| {
                CoreError::Validation(format!("'{index}' is not a position"))
            })?),
            ("clear", []) => Self::Clear,
            ("sequence", []) => Self::Sequence,
            ("run", []) => Self::Run,
            ("schedule", ["daily", time]) => {
                Self::Schedule(ScheduleConfig::daily(ScheduleTime::from_str(time)?))
            }
            ("schedule", ["weekly", time, days @ ..]) if !days.is_empty() => {
                Self::Schedule(ScheduleConfig::weekly(
                    ScheduleTime::from_str(time)?,
                    parse_days(&days.join(","))?,
                ))
            }
            ("tasks", []) => Self::Tasks,
            ("detail", [id]) => Self::Detail(id.to_string()),
            ("close", []) => Self::Close,
            ("stop", [id]) => Self::Stop(id.to_string()),
            ("schedules", []) => Self::Schedules,
            ("panel", []) => Self::Panel,
            ("toggle", [id]) => Self::Toggle(id.to_string()),
            ("delete", [id]) => Self::Delete(id.to_string()),
            ("help", _) => Self::Help,
            ("quit" | "exit", []) => Self::Quit,
            _ => {
                return Err(CoreError::Validation(format!(
                    "unrecognised command '{}', try 'help'",
                    line.trim()
                )))
            }
        };
        Ok(cmd)
    }
}

fn parse_days(raw: &str) -> Result<Vec<Weekday>, CoreError> {
    raw.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(Weekday::from_str)
        .collect()
}

/// What the front end should do after a line was handled.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Print(Vec<String>),
    Quit,
}

impl Reply {
    fn line(text: impl Into<String>) -> Self {
        Self::Print(vec![text.into()])
    }

    fn none() -> Self {
        Self::Print(Vec::new())
    }
}

/// One interactive session over a [`Console`].
pub struct Session {
    console: Console,
    pending_delete: Option<PendingDelete>,
    /// Task being tailed and how many output chunks were shown.
    tail: Option<(TaskId, usize)>,
}

impl Session {
    pub fn new(console: Console) -> Self {
        Self {
            console,
            pending_delete: None,
            tail: None,
        }
    }

    pub fn awaiting_confirmation(&self) -> bool {
        self.pending_delete.is_some()
    }

    pub async fn handle_line(&mut self, line: &str) -> Reply {
        let line = line.trim();

        if let Some(pending) = self.pending_delete.take() {
            return self.answer_delete(pending, line).await;
        }
        if line.is_empty() {
            return Reply::none();
        }

        match Command::parse(line) {
            Ok(cmd) => self.execute(cmd).await,
            Err(e) => Reply::line(e.to_string()),
        }
    }

    async fn answer_delete(&self, pending: PendingDelete, answer: &str) -> Reply {
        match answer.to_ascii_lowercase().as_str() {
            "y" | "yes" => {
                // Outcome is reported through the notification sink.
                let _ = self.console.schedules.confirm_delete(pending).await;
                Reply::none()
            }
            _ => Reply::line(format!("Kept schedule {}", pending.schedule_id())),
        }
    }

    async fn execute(&mut self, cmd: Command) -> Reply {
        let console = &self.console;
        match cmd {
            Command::Scripts => {
                let _ = console.catalog.refresh().await;
                let scripts = console.catalog.scripts().await;
                if scripts.is_empty() {
                    return Reply::line("No scripts available");
                }
                Reply::Print(scripts)
            }
            Command::Add(script) => {
                let script = match script {
                    Some(s) => s,
                    None => match console.catalog.default_selection().await {
                        Some(s) => s,
                        None => return Reply::line("Catalog is empty, name a script"),
                    },
                };
                if !console.catalog.is_empty().await && !console.catalog.contains(&script).await {
                    return Reply::line(format!("Unknown script '{script}'"));
                }
                let _ = console.sequence.add(script).await;
                Reply::none()
            }
            Command::Remove(index) => match console.sequence.remove_at(index).await {
                Ok(removed) => Reply::line(format!("Removed {removed}")),
                Err(e) => Reply::line(e.to_string()),
            },
            Command::Clear => {
                console.sequence.clear().await;
                Reply::line("Sequence cleared")
            }
            Command::Sequence => {
                let scripts = console.sequence.scripts().await;
                if scripts.is_empty() {
                    return Reply::line("Sequence is empty");
                }
                Reply::Print(
                    scripts
                        .iter()
                        .enumerate()
                        .map(|(i, s)| format!("{i}. {s}"))
                        .collect(),
                )
            }
            Command::Run => self.submit(None).await,
            Command::Schedule(config) => self.submit(Some(config)).await,
            Command::Tasks => {
                let tasks = console.monitor.tasks().await;
                if tasks.is_empty() {
                    return Reply::line("No tasks");
                }
                Reply::Print(tasks.iter().map(task_line).collect())
            }
            Command::Detail(task_id) => {
                console.monitor.track_detail(task_id.clone()).await;
                Reply::line(format!("Following task {task_id}"))
            }
            Command::Close => {
                console.monitor.clear_detail().await;
                Reply::none()
            }
            Command::Stop(task_id) => {
                let _ = console.monitor.stop(&task_id).await;
                Reply::none()
            }
            Command::Schedules => {
                let schedules = console.schedules.schedules().await;
                if schedules.is_empty() {
                    return Reply::line("No schedules");
                }
                Reply::Print(
                    schedules
                        .iter()
                        .map(|s| {
                            let mut line = format!(
                                "{} [{}] {} -> {}",
                                s.id,
                                if s.enabled { "on" } else { "off" },
                                s.describe(),
                                s.scripts.join(", ")
                            );
                            if let Some(next) = s.next_run {
                                let _ = write!(line, " (next {})", next.format("%Y-%m-%d %H:%M"));
                            }
                            line
                        })
                        .collect(),
                )
            }
            Command::Panel => {
                let visible = console.schedules.toggle_panel();
                Reply::line(if visible {
                    "Schedule panel shown"
                } else {
                    "Schedule panel hidden"
                })
            }
            Command::Toggle(schedule_id) => {
                let _ = console.schedules.toggle(&schedule_id).await;
                Reply::none()
            }
            Command::Delete(schedule_id) => {
                let pending = console.schedules.request_delete(schedule_id);
                let prompt = format!("Delete schedule {}? (yes/no)", pending.schedule_id());
                self.pending_delete = Some(pending);
                Reply::line(prompt)
            }
            Command::Help => Reply::line(HELP),
            Command::Quit => Reply::Quit,
        }
    }

    async fn submit(&self, schedule: Option<ScheduleConfig>) -> Reply {
        match self.console.launcher.submit(schedule).await {
            Ok(SubmitOutcome::Started(handle)) => {
                Reply::line(format!("Following task {}", handle.id))
            }
            Ok(SubmitOutcome::Scheduled(_)) | Err(_) => Reply::none(),
        }
    }

    /// Detail output not yet shown. Restarts from the top when the
    /// detail view moves to another task.
    pub async fn tail_detail(&mut self) -> Vec<String> {
        let DetailState::Tracking { task_id, .. } = self.console.monitor.detail().await else {
            self.tail = None;
            return Vec::new();
        };
        let offset = match &self.tail {
            Some((tailed, offset)) if *tailed == task_id => *offset,
            _ => 0,
        };
        let chunks = self.console.monitor.output_since(offset).await;
        self.tail = Some((task_id, offset + chunks.len()));
        chunks
    }
}

fn task_line(task: &Task) -> String {
    let mut line = format!("{} {} [{}]", task.id, task.status, task.scripts.join(", "));
    if let Some(current) = &task.current_script {
        let _ = write!(line, " at {current}");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parses_simple_commands() {
        assert_eq!(Command::parse("scripts").unwrap(), Command::Scripts);
        assert_eq!(Command::parse("  RUN ").unwrap(), Command::Run);
        assert_eq!(Command::parse("add").unwrap(), Command::Add(None));
        assert_eq!(
            Command::parse("add backup").unwrap(),
            Command::Add(Some("backup".into()))
        );
        assert_eq!(Command::parse("remove 2").unwrap(), Command::Remove(2));
        assert_eq!(Command::parse("clear").unwrap(), Command::Clear);
        assert_eq!(
            Command::parse("delete s-1").unwrap(),
            Command::Delete("s-1".into())
        );
        assert_eq!(Command::parse("quit").unwrap(), Command::Quit);
    }

    #[test]
    fn parses_weekly_schedule() {
        let cmd = Command::parse("schedule weekly 09:00 mon,friday").unwrap();
        let Command::Schedule(config) = cmd else {
            panic!("expected schedule command");
        };
        assert!(config.enabled);
        assert_eq!(config.describe(), "weekly on monday, friday at 09:00");
    }

    #[test]
    fn weekly_days_may_be_spaced() {
        for line in [
            "schedule weekly 09:00 mon, fri",
            "schedule weekly 09:00 mon fri",
            "schedule weekly 09:00 mon , fri",
        ] {
            let cmd = Command::parse(line).unwrap();
            assert_matches!(
                cmd,
                Command::Schedule(ref c) if c.describe() == "weekly on monday, friday at 09:00",
                "{line}"
            );
        }
        assert_matches!(
            Command::parse("schedule weekly 09:00"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn parses_daily_schedule() {
        let cmd = Command::parse("schedule daily 7:30").unwrap();
        assert_matches!(cmd, Command::Schedule(c) if c.describe() == "daily at 07:30");
    }

    #[test]
    fn rejects_bad_input() {
        assert_matches!(Command::parse("remove two"), Err(CoreError::Validation(_)));
        assert_matches!(
            Command::parse("schedule daily 25:00"),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            Command::parse("schedule weekly 09:00 someday"),
            Err(CoreError::Validation(_))
        );
        assert_matches!(Command::parse("launch"), Err(CoreError::Validation(_)));
    }
}
