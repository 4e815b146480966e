#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::io;
use std::sync::{Arc, Mutex};
use transport_ocr_ops::core::{CommandOutput, CommandRunner, HttpProber};
use transport_ocr_ops::OpsError;

/// How the fake answers one command line.
pub enum Reply {
    Ok(String),
    Fail(String),
    NotFound,
}

type Responder = dyn Fn(&str) -> Reply + Send + Sync;

/// Records every command line and answers through a closure.
#[derive(Clone)]
pub struct FakeRunner {
    calls: Arc<Mutex<Vec<String>>>,
    responder: Arc<Responder>,
}

impl FakeRunner {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Reply + Send + Sync + 'static,
    {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            responder: Arc::new(responder),
        }
    }

    /// Every tool is installed and every command succeeds with empty output.
    pub fn all_ok() -> Self {
        Self::new(|_| Reply::Ok(String::new()))
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_matching(&self, needle: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.contains(needle))
            .collect()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, program: &str, args: &[&str]) -> transport_ocr_ops::Result<CommandOutput> {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().unwrap().push(line.clone());

        match (self.responder)(&line) {
            Reply::Ok(stdout) => Ok(CommandOutput {
                success: true,
                status: "exit status: 0".to_string(),
                stdout,
                stderr: String::new(),
            }),
            Reply::Fail(stderr) => Ok(CommandOutput {
                success: false,
                status: "exit status: 1".to_string(),
                stdout: String::new(),
                stderr,
            }),
            Reply::NotFound => Err(OpsError::IoError(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{}: not found", program),
            ))),
        }
    }
}

/// `docker ps` answers listing only the names in `running`.
pub fn docker_with_running(running: &[&str]) -> impl Fn(&str) -> Option<Reply> + Send + Sync + 'static {
    let running: HashSet<String> = running.iter().map(|s| s.to_string()).collect();
    move |line: &str| {
        if !line.starts_with("docker ps") {
            return None;
        }
        let listed: Vec<&String> = running
            .iter()
            .filter(|name| line.contains(&format!("name={} ", name)))
            .collect();
        Some(Reply::Ok(
            listed
                .iter()
                .map(|name| format!("{}\n", name))
                .collect::<String>(),
        ))
    }
}

/// Static answers for readiness polling, without a network.
pub struct FakeProber {
    reachable: HashSet<String>,
}

impl FakeProber {
    pub fn reaching(urls: &[&str]) -> Self {
        Self {
            reachable: urls.iter().map(|u| u.to_string()).collect(),
        }
    }

    pub fn nothing() -> Self {
        Self::reaching(&[])
    }
}

#[async_trait]
impl HttpProber for FakeProber {
    async fn is_reachable(&self, url: &str) -> bool {
        self.reachable.contains(url)
    }
}
