#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use anyhow::{anyhow, Result};
use memlive::db;
use memlive::query::{AccessPoint, ResultSet, Scalar};
use rusqlite::Connection;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    db::open_memory_database().unwrap()
}

/// A scripted access point: each call pops the next queued response, and
/// repeats the last one once the queue is down to a single entry.
#[derive(Default)]
pub struct FakeAccess {
    responses: RefCell<VecDeque<Result<Vec<ResultSet>, String>>>,
    calls: Cell<usize>,
    log: RefCell<Vec<(String, Vec<Scalar>)>>,
}

impl FakeAccess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn returning(sets: Vec<ResultSet>) -> Self {
        let fake = Self::new();
        fake.push_ok(sets);
        fake
    }

    pub fn failing(message: &str) -> Self {
        let fake = Self::new();
        fake.push_err(message);
        fake
    }

    pub fn push_ok(&self, sets: Vec<ResultSet>) {
        self.responses.borrow_mut().push_back(Ok(sets));
    }

    pub fn push_err(&self, message: &str) {
        self.responses.borrow_mut().push_back(Err(message.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn last_call(&self) -> Option<(String, Vec<Scalar>)> {
        self.log.borrow().last().cloned()
    }
}

impl AccessPoint for FakeAccess {
    fn execute(&self, query: &str, params: &[Scalar]) -> Result<Vec<ResultSet>> {
        self.calls.set(self.calls.get() + 1);
        self.log
            .borrow_mut()
            .push((query.to_string(), params.to_vec()));

        let mut responses = self.responses.borrow_mut();
        let next = if responses.len() > 1 {
            responses.pop_front()
        } else {
            responses.front().cloned()
        };
        match next {
            Some(Ok(sets)) => Ok(sets),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Ok(Vec::new()),
        }
    }
}

/// `columns` × `rows` as a single result set.
pub fn result_set(columns: &[&str], rows: Vec<Vec<Scalar>>) -> ResultSet {
    ResultSet::new(columns.iter().copied(), rows)
}

/// The `id, name, count` fixture with two rows.
pub fn people() -> ResultSet {
    result_set(
        &["id", "name", "count"],
        vec![
            vec!["1".into(), "Alice".into(), 10.into()],
            vec!["2".into(), "Bob".into(), 20.into()],
        ],
    )
}

pub fn tags(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}
