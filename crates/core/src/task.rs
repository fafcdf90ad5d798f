// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A synchronization specification binding a local path to a Connection.

use crate::connection::ConnectionId;
use crate::schedule::parse_schedule;
use crate::validate::{validate_name, ValidationError};
use crate::{define_id, IdGen};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

define_id! {
    pub struct TaskId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Upload,
    Download,
    Bidirectional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictResolution {
    Local,
    Remote,
    Newer,
}

impl Default for ConflictResolution {
    fn default() -> Self {
        ConflictResolution::Newer
    }
}

/// Ordered include/exclude glob pattern. Ordering matters: the first matching
/// pattern wins, exactly as rclone's `--filter-from` evaluates rules top to bottom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub include: bool,
    pub pattern: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOptions {
    #[serde(default)]
    pub conflict_resolution: ConflictResolution,
    /// Empty list behaves as "no filter": every path matches.
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub no_delete: bool,
    #[serde(default = "default_transfers")]
    pub transfers: u32,
}

fn default_transfers() -> u32 {
    4
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            conflict_resolution: ConflictResolution::default(),
            filters: Vec::new(),
            no_delete: false,
            transfers: default_transfers(),
        }
    }
}

impl TaskOptions {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.transfers == 0 {
            return Err(ValidationError::InvalidTransfers);
        }
        Ok(())
    }

    /// Whether `path` survives the filter chain. An empty filter list always matches.
    pub fn path_included(&self, path: &str) -> bool {
        if self.filters.is_empty() {
            return true;
        }
        for filter in &self.filters {
            if glob_match(&filter.pattern, path) {
                return filter.include;
            }
        }
        // No rule matched: rclone's default is to include.
        true
    }
}

/// Minimal glob matcher supporting `*` (any run of characters) and `**` (any
/// run including path separators), sufficient for include/exclude filter rules.
fn glob_match(pattern: &str, path: &str) -> bool {
    fn helper(p: &[u8], s: &[u8]) -> bool {
        match (p.first(), s.first()) {
            (None, None) => true,
            (Some(b'*'), _) => {
                if p.get(1) == Some(&b'*') {
                    helper(&p[2..], s) || (!s.is_empty() && helper(p, &s[1..]))
                } else {
                    helper(&p[1..], s) || (!s.is_empty() && helper(p, &s[1..]))
                }
            }
            (Some(pc), Some(sc)) if pc == sc => helper(&p[1..], &s[1..]),
            _ => false,
        }
    }
    helper(pattern.as_bytes(), path.as_bytes())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub source_path: PathBuf,
    pub connection_id: ConnectionId,
    pub remote_path: String,
    pub direction: Direction,
    /// Empty string means "never scheduled" (not "run every minute").
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub realtime: bool,
    #[serde(default)]
    pub options: TaskOptions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewTask {
    pub name: String,
    pub source_path: PathBuf,
    pub connection_id: ConnectionId,
    pub remote_path: String,
    pub direction: Direction,
    pub schedule: String,
    pub realtime: bool,
    pub options: TaskOptions,
}

impl Task {
    pub fn new(id_gen: &impl IdGen, fields: NewTask, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        validate_name(&fields.name)?;
        if fields.source_path.as_os_str().is_empty() {
            return Err(ValidationError::EmptySourcePath);
        }
        if fields.remote_path.is_empty() {
            return Err(ValidationError::EmptyRemotePath);
        }
        if !fields.schedule.is_empty() {
            parse_schedule(&fields.schedule)
                .map_err(|e| ValidationError::InvalidCron(fields.schedule.clone(), e.0))?;
        }
        fields.options.validate()?;

        Ok(Self {
            id: TaskId::from(id_gen.next()),
            name: fields.name,
            source_path: fields.source_path,
            connection_id: fields.connection_id,
            remote_path: fields.remote_path,
            direction: fields.direction,
            schedule: fields.schedule,
            realtime: fields.realtime,
            options: fields.options,
            created_at: now,
            updated_at: now,
        })
    }

    /// True if this task's schedule/realtime registration must change when the
    /// Scheduler/Watcher compare an old and new revision of the task.
    pub fn trigger_config_changed(&self, other: &Task) -> bool {
        self.schedule != other.schedule
            || self.realtime != other.realtime
            || self.source_path != other.source_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SequentialIdGen;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn new_task_fields() -> NewTask {
        NewTask {
            name: "t1".into(),
            source_path: PathBuf::from("/tmp/src"),
            connection_id: ConnectionId::new(),
            remote_path: "/tmp/dst".into(),
            direction: Direction::Upload,
            schedule: String::new(),
            realtime: false,
            options: TaskOptions::default(),
        }
    }

    #[test]
    fn empty_schedule_means_never_scheduled() {
        let gen = SequentialIdGen::new();
        let task = Task::new(&gen, new_task_fields(), now()).unwrap();
        assert_eq!(task.schedule, "");
    }

    #[test]
    fn rejects_invalid_cron() {
        let gen = SequentialIdGen::new();
        let mut fields = new_task_fields();
        fields.schedule = "not a cron".into();
        assert!(matches!(
            Task::new(&gen, fields, now()),
            Err(ValidationError::InvalidCron(_, _))
        ));
    }

    #[test]
    fn accepts_valid_cron() {
        let gen = SequentialIdGen::new();
        let mut fields = new_task_fields();
        fields.schedule = "@every 1s".into();
        assert!(Task::new(&gen, fields, now()).is_ok());
    }

    #[test]
    fn rejects_empty_source_path() {
        let gen = SequentialIdGen::new();
        let mut fields = new_task_fields();
        fields.source_path = PathBuf::new();
        assert_eq!(
            Task::new(&gen, fields, now()).unwrap_err(),
            ValidationError::EmptySourcePath
        );
    }

    #[test]
    fn rejects_zero_transfers() {
        let gen = SequentialIdGen::new();
        let mut fields = new_task_fields();
        fields.options.transfers = 0;
        assert_eq!(
            Task::new(&gen, fields, now()).unwrap_err(),
            ValidationError::InvalidTransfers
        );
    }

    #[test]
    fn empty_filter_list_includes_everything() {
        let options = TaskOptions::default();
        assert!(options.path_included("anything/at/all.txt"));
    }

    #[test]
    fn first_matching_filter_wins() {
        let options = TaskOptions {
            filters: vec![
                Filter { include: false, pattern: "*.tmp".into() },
                Filter { include: true, pattern: "*".into() },
            ],
            ..TaskOptions::default()
        };
        assert!(!options.path_included("cache.tmp"));
        assert!(options.path_included("report.pdf"));
    }

    #[test]
    fn trigger_config_changed_detects_schedule_and_path_changes() {
        let gen = SequentialIdGen::new();
        let task = Task::new(&gen, new_task_fields(), now()).unwrap();
        let mut other = task.clone();
        assert!(!task.trigger_config_changed(&other));
        other.schedule = "@hourly".into();
        assert!(task.trigger_config_changed(&other));
    }
}
