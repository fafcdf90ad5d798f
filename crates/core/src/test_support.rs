// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test builders shared across crates. Gated behind `test-support` so production
//! builds never link them in, mirroring the teacher's `oj-core` test-support feature.

use crate::connection::{Connection, ConnectionId};
use crate::id::{IdGen, SequentialIdGen};
use crate::job::{Job, JobId, JobTrigger};
use crate::job_log::{JobLog, JobLogLevel, JobLogWhat};
use crate::task::{Direction, NewTask, Task, TaskId, TaskOptions};
use chrono::{DateTime, Utc};

pub fn epoch(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

pub struct ConnectionBuilder {
    name: String,
    r#type: String,
}

impl ConnectionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), r#type: "local".into() }
    }

    pub fn r#type(mut self, t: impl Into<String>) -> Self {
        self.r#type = t.into();
        self
    }

    pub fn build(self) -> Connection {
        let gen = SequentialIdGen::new();
        Connection::new(&gen, self.name, self.r#type, vec![], epoch(1_700_000_000)).expect("valid connection")
    }

    pub fn build_with_id(self, id: ConnectionId) -> Connection {
        let mut c = self.build();
        c.id = id;
        c
    }
}

pub struct TaskBuilder {
    name: String,
    connection_id: ConnectionId,
    source_path: std::path::PathBuf,
    remote_path: String,
    direction: Direction,
    schedule: String,
    realtime: bool,
    options: TaskOptions,
}

impl TaskBuilder {
    pub fn new(name: impl Into<String>, connection_id: ConnectionId) -> Self {
        Self {
            name: name.into(),
            connection_id,
            source_path: "/tmp/src".into(),
            remote_path: "/tmp/dst".into(),
            direction: Direction::Upload,
            schedule: String::new(),
            realtime: false,
            options: TaskOptions::default(),
        }
    }

    pub fn source_path(mut self, p: impl Into<std::path::PathBuf>) -> Self {
        self.source_path = p.into();
        self
    }

    pub fn schedule(mut self, s: impl Into<String>) -> Self {
        self.schedule = s.into();
        self
    }

    pub fn realtime(mut self, r: bool) -> Self {
        self.realtime = r;
        self
    }

    pub fn direction(mut self, d: Direction) -> Self {
        self.direction = d;
        self
    }

    pub fn build(self) -> Task {
        let gen = SequentialIdGen::new();
        Task::new(
            &gen,
            NewTask {
                name: self.name,
                source_path: self.source_path,
                connection_id: self.connection_id,
                remote_path: self.remote_path,
                direction: self.direction,
                schedule: self.schedule,
                realtime: self.realtime,
                options: self.options,
            },
            epoch(1_700_000_000),
        )
        .expect("valid task")
    }

    pub fn build_with_id(self, id: TaskId) -> Task {
        let mut t = self.build();
        t.id = id;
        t
    }
}

pub fn pending_job(task_id: TaskId) -> Job {
    Job::new_pending(JobId::new(), task_id, JobTrigger::Manual, epoch(1_700_000_000))
}

pub fn job_log(job_id: JobId, what: JobLogWhat, size: i64) -> JobLog {
    JobLog::new(job_id, epoch(1_700_000_000), JobLogLevel::Info, what, "path", size)
}
