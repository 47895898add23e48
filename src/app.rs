use crate::config::AppConfig;
use crate::gateway::{FileGateway, GatewayError, SyncGateway};
use crate::model::TopicNode;
use crate::reorganize::{ReorganizeError, Reorganizer};
use crate::session::{ReorganizeRequest, Session};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

#[derive(Debug, Clone, PartialEq)]
pub enum AppMode {
    Normal,
    /// `cursor_pos` counts chars, not bytes. `naming_new` marks the label of
    /// a node that was just added.
    Editing {
        buffer: String,
        cursor_pos: usize,
        naming_new: bool,
    },
    Help,
}

type ReorganizeOutcome = (Box<dyn Reorganizer>, Result<TopicNode, ReorganizeError>);

// A reorganize running on its worker thread. The reorganizer travels with
// the job and comes back with the answer.
struct PendingReorganize {
    request: ReorganizeRequest,
    receiver: Receiver<ReorganizeOutcome>,
}

pub struct AppState {
    pub running: bool,
    pub mode: AppMode,
    pub session: Session<FileGateway>,
    /// `None` while a reorganize is in flight.
    pub reorganizer: Option<Box<dyn Reorganizer>>,
    pub config: AppConfig,
    reorganizing: Option<PendingReorganize>,

    // Viewport state
    pub viewport_top: f64,
    pub viewport_left: f64,
    pub terminal_width: u16,
    pub terminal_height: u16,

    // Message for status line
    pub message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let gateway = FileGateway::new(config.data_dir.clone());
        let session = Session::new(gateway, config.session_options());
        let reorganizer: Box<dyn Reorganizer> = Box::new(config.reorganizer());

        Self {
            running: true,
            mode: AppMode::Normal,
            session,
            reorganizer: Some(reorganizer),
            config,
            reorganizing: None,
            viewport_top: 0.0,
            viewport_left: 0.0,
            terminal_width: 80,
            terminal_height: 24,
            message: None,
        }
    }

    /// Switches to `project` and focuses its root. The previous project
    /// stays open when loading fails.
    pub fn open_project(&mut self, project: &str) -> Result<(), GatewayError> {
        let result = self.session.switch_project(project);
        match &result {
            Ok(()) => {
                self.session.select_root();
                self.viewport_top = 0.0;
                self.viewport_left = 0.0;
                self.set_message(format!("Opened {project}"));
            }
            Err(_) => self.sync_notices(),
        }
        result
    }

    /// Known projects, always including the open one.
    pub fn projects(&self) -> Vec<String> {
        let mut projects = match self.session.gateway().projects() {
            Ok(projects) => projects,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list projects");
                Vec::new()
            }
        };
        if let Some(current) = self.session.project() {
            if !projects.iter().any(|p| p == current) {
                projects.push(current.to_string());
                projects.sort();
            }
        }
        projects
    }

    /// Hands the inbox and a copy of the map to the reorganizer on a worker
    /// thread. The UI keeps running; `poll_reorganize` applies the answer.
    pub fn start_reorganize(&mut self) {
        if self.reorganizing.is_some() {
            self.set_message("Reorganize already running");
            return;
        }
        let Some(request) = self.session.begin_reorganize() else {
            self.sync_notices();
            return;
        };

        let mut reorganizer = match self.reorganizer.take() {
            Some(reorganizer) => reorganizer,
            None => Box::new(self.config.reorganizer()),
        };
        let (sender, receiver) = mpsc::channel();
        let (tree, ideas) = (request.tree.clone(), request.ideas.clone());
        let spawned = thread::Builder::new()
            .name("reorganize".to_string())
            .spawn(move || {
                let result = reorganizer.transform(&tree, &ideas);
                // The receiver is gone only if the app already quit.
                let _ = sender.send((reorganizer, result));
            });

        match spawned {
            Ok(_) => {
                tracing::info!(ideas = request.ideas.len(), "reorganize started");
                self.reorganizing = Some(PendingReorganize { request, receiver });
            }
            Err(e) => {
                self.reorganizer = Some(Box::new(self.config.reorganizer()));
                let result = Err(ReorganizeError::Spawn(e));
                self.session.finish_reorganize(&request, result);
                self.sync_notices();
            }
        }
    }

    /// Applies a finished reorganize, if any. Answers wait while a label is
    /// being edited so the buffer never targets a replaced tree.
    pub fn poll_reorganize(&mut self) {
        if matches!(self.mode, AppMode::Editing { .. }) {
            return;
        }
        let Some(pending) = self.reorganizing.take() else {
            return;
        };

        match pending.receiver.try_recv() {
            Ok((reorganizer, result)) => {
                self.reorganizer = Some(reorganizer);
                self.session.finish_reorganize(&pending.request, result);
                self.sync_notices();
            }
            Err(TryRecvError::Empty) => self.reorganizing = Some(pending),
            Err(TryRecvError::Disconnected) => {
                tracing::warn!("reorganize worker exited without an answer");
                self.reorganizer = Some(Box::new(self.config.reorganizer()));
                self.set_message("Reorganize failed: worker stopped");
            }
        }
    }

    pub fn is_reorganizing(&self) -> bool {
        self.reorganizing.is_some()
    }

    /// Moves the newest session notice, if any, onto the status line.
    pub fn sync_notices(&mut self) {
        while let Some(notice) = self.session.take_notice() {
            self.message = Some(notice.to_string());
        }
    }

    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }
}
