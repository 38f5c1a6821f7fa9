//! Suite orchestrator. A group owns one setup step and an ordered list of
//! cases; setup runs exactly once before any case, cases run strictly
//! sequentially in declaration order, and a failing case never blocks the
//! cases after it. If setup fails, every case in the group is reported
//! blocked without execution. Groups themselves run concurrently.

use futures::{future::BoxFuture, stream::FuturesUnordered, FutureExt, StreamExt};
use once_cell::sync::Lazy;
use std::{
    ops::Deref,
    sync::{Arc, Mutex},
};
use tokio::sync::broadcast;
use tracing::*;

use crate::{
    config::{get_config, Config},
    http::Client,
    reporter::Reporter,
    store::{BindKey, Bindings},
    CaseName, GroupName,
};

pub static CHANNEL: Lazy<Mutex<Option<broadcast::Sender<Message>>>> =
    Lazy::new(|| Mutex::new(Some(broadcast::channel(1000).0)));

tokio::task_local! {
    static CURRENT: (GroupName, CaseName);
}

/// Name used for the setup step in events and check attribution.
const SETUP_STEP: &str = "setup";

/// Publish a message to the runner channel. A message published while no
/// reporter is subscribed is silently dropped.
pub fn publish(msg: Message) {
    let Ok(guard) = CHANNEL.lock() else {
        return;
    };
    if let Some(tx) = guard.deref() {
        let _ = tx.send(msg);
    }
}

/// Subscribe to the channel to see the real-time execution events.
pub fn subscribe() -> eyre::Result<broadcast::Receiver<Message>> {
    let Ok(guard) = CHANNEL.lock() else {
        eyre::bail!("failed to acquire runner channel lock");
    };
    let Some(tx) = guard.deref() else {
        eyre::bail!("runner channel has been already closed");
    };

    Ok(tx.subscribe())
}

/// Publish a per-step check event attributed to the currently running group
/// and case, if any.
pub(crate) fn publish_check(check: Check) {
    let (group, case) = CURRENT.try_with(|cur| cur.clone()).unwrap_or_default();
    publish(Message::Check(group, case, check));
}

/// Outcome of a single evaluated expectation within a step.
#[derive(Debug, Clone)]
pub struct Check {
    pub passed: bool,
    pub message: String,
}

impl Check {
    pub fn passed(message: impl Into<String>) -> Check {
        Check {
            passed: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Check {
        Check {
            passed: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    GroupStarted(GroupName),
    /// The group's setup step failed; every case of the group is blocked.
    SetupFailed(GroupName, String),
    CaseStarted(GroupName, CaseName),
    Check(GroupName, CaseName, Check),
    CaseFinished(GroupName, CaseName, CaseStatus),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseStatus {
    Passed,
    Failed(String),
    /// Never executed because the group's setup failed.
    Blocked,
}

/// Lifecycle of a group run. Setup runs exactly once, between `Pending` and
/// `Ready`; the group bounces between `Ready` and `CaseRunning` until every
/// case has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    Pending,
    SetupRunning,
    Ready,
    CaseRunning,
    Done,
}

/// The future produced by one step. Sending the request is the step's only
/// suspension point.
pub type StepFuture = BoxFuture<'static, crate::Result<()>>;

type StepFn<K> = Arc<dyn Fn(Client, Bindings<K>) -> StepFuture + Send + Sync>;

struct Case<K> {
    name: CaseName,
    run: StepFn<K>,
}

/// A test group: a name, an optional setup step and an ordered list of
/// cases. The setup's bindings are handed to every case through a shared
/// [`Bindings`] handle created fresh per run.
pub struct Group<K> {
    name: GroupName,
    setup: Option<StepFn<K>>,
    cases: Vec<Case<K>>,
    state: GroupState,
}

impl<K: BindKey> Group<K> {
    pub fn new(name: impl Into<GroupName>) -> Group<K> {
        Group {
            name: name.into(),
            setup: None,
            cases: Vec::new(),
            state: GroupState::Pending,
        }
    }

    /// Set the step that runs once before any case of the group.
    pub fn setup<F>(mut self, f: F) -> Group<K>
    where
        F: Fn(Client, Bindings<K>) -> StepFuture + Send + Sync + 'static,
    {
        self.setup = Some(Arc::new(f));
        self
    }

    /// Append a case. Cases run in declaration order.
    pub fn case<F>(mut self, name: impl Into<CaseName>, f: F) -> Group<K>
    where
        F: Fn(Client, Bindings<K>) -> StepFuture + Send + Sync + 'static,
    {
        self.cases.push(Case {
            name: name.into(),
            run: Arc::new(f),
        });
        self
    }

    pub fn state(&self) -> GroupState {
        self.state
    }
}

/// Object-safe face of [`Group`], so a runner can hold groups with different
/// binding key types.
#[async_trait::async_trait]
pub trait GroupExec: Send {
    fn name(&self) -> &str;
    fn case_names(&self) -> Vec<CaseName>;
    async fn run(&mut self, client: Client) -> GroupReport;
}

#[async_trait::async_trait]
impl<K: BindKey> GroupExec for Group<K> {
    fn name(&self) -> &str {
        &self.name
    }

    fn case_names(&self) -> Vec<CaseName> {
        self.cases.iter().map(|case| case.name.clone()).collect()
    }

    async fn run(&mut self, client: Client) -> GroupReport {
        let group = self.name.clone();
        let bindings = Bindings::new();
        let mut report = GroupReport {
            group: group.clone(),
            cases: Vec::new(),
        };

        publish(Message::GroupStarted(group.clone()));

        if let Some(setup) = &self.setup {
            self.state = GroupState::SetupRunning;
            let scope = (group.clone(), SETUP_STEP.to_string());
            let fut = CURRENT.scope(scope, setup(client.clone(), bindings.clone()));
            let res = std::panic::AssertUnwindSafe(fut).catch_unwind().await;
            if let Some(reason) = failure_reason(res) {
                warn!("setup of group \"{group}\" failed: {reason}");
                publish(Message::SetupFailed(group.clone(), reason));
                for case in &self.cases {
                    publish(Message::CaseFinished(
                        group.clone(),
                        case.name.clone(),
                        CaseStatus::Blocked,
                    ));
                    report.cases.push((case.name.clone(), CaseStatus::Blocked));
                }
                self.state = GroupState::Done;
                return report;
            }
        }
        self.state = GroupState::Ready;

        for case in &self.cases {
            self.state = GroupState::CaseRunning;
            publish(Message::CaseStarted(group.clone(), case.name.clone()));

            let scope = (group.clone(), case.name.clone());
            let fut = CURRENT.scope(scope, (case.run)(client.clone(), bindings.clone()));
            let res = std::panic::AssertUnwindSafe(fut).catch_unwind().await;
            let status = match failure_reason(res) {
                None => {
                    debug!("{group}::{} ok", case.name);
                    CaseStatus::Passed
                }
                Some(reason) => {
                    debug!("{group}::{} failed: {reason}", case.name);
                    CaseStatus::Failed(reason)
                }
            };

            publish(Message::CaseFinished(
                group.clone(),
                case.name.clone(),
                status.clone(),
            ));
            report.cases.push((case.name.clone(), status));
            self.state = GroupState::Ready;
        }

        self.state = GroupState::Done;
        report
    }
}

/// Flatten a caught step result into an optional failure message, turning
/// panics into step failures so one panicking case cannot take the group
/// down.
fn failure_reason(
    res: std::result::Result<crate::Result<()>, Box<dyn std::any::Any + Send>>,
) -> Option<String> {
    match res {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(e.to_string()),
        Err(panic) => {
            let message = if let Some(message) = panic.downcast_ref::<&str>() {
                (*message).to_string()
            } else if let Some(message) = panic.downcast_ref::<String>() {
                message.clone()
            } else {
                "panicked with unknown message".to_string()
            };
            Some(format!("panic: {message}"))
        }
    }
}

#[derive(Debug, Clone)]
pub struct GroupReport {
    pub group: GroupName,
    pub cases: Vec<(CaseName, CaseStatus)>,
}

impl GroupReport {
    /// A blocked case counts as a failure of the group.
    pub fn passed(&self) -> bool {
        self.cases
            .iter()
            .all(|(_, status)| *status == CaseStatus::Passed)
    }
}

/// Filter groups by name. An empty filter matches everything.
pub struct GroupFilter<'a> {
    group_names: &'a [String],
}

impl GroupFilter<'_> {
    pub fn matches(&self, name: &str) -> bool {
        self.group_names.is_empty() || self.group_names.iter().any(|g| g == name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Options {
    pub capture_rust: bool,
    pub terminate_channel: bool,
}

/// The suite runner: owns the groups and reporters, drives groups
/// concurrently and reporters off the event channel, and fails iff any case
/// failed or was blocked.
pub struct Runner {
    cfg: Config,
    options: Options,
    groups: Vec<Box<dyn GroupExec>>,
    reporters: Vec<Box<dyn Reporter + Send>>,
}

impl Default for Runner {
    fn default() -> Self {
        Runner::new()
    }
}

impl Runner {
    pub fn new() -> Runner {
        Runner::with_config(get_config().clone())
    }

    pub fn with_config(cfg: Config) -> Runner {
        Runner {
            cfg,
            options: Options::default(),
            groups: Vec::new(),
            reporters: Vec::new(),
        }
    }

    pub fn capture_rust(&mut self) {
        self.options.capture_rust = true;
    }

    pub fn terminate_channel(&mut self) {
        self.options.terminate_channel = true;
    }

    pub fn add_group(&mut self, group: impl GroupExec + 'static) {
        self.groups.push(Box::new(group));
    }

    pub fn add_reporter(&mut self, reporter: impl Reporter + 'static + Send) {
        self.reporters.push(Box::new(reporter));
    }

    /// List groups and their cases in declaration order.
    pub fn list(&self) -> Vec<(GroupName, Vec<CaseName>)> {
        self.groups
            .iter()
            .map(|group| (group.name().to_string(), group.case_names()))
            .collect()
    }

    /// Run the suite, optionally restricted to the named groups.
    pub async fn run(&mut self, group_names: &[String]) -> eyre::Result<()> {
        if self.options.capture_rust {
            tracing_subscriber::fmt::init();
        }

        let client = Client::new(&self.cfg)?;
        let filter = GroupFilter { group_names };
        let mut reporters = std::mem::take(&mut self.reporters);

        let handles: FuturesUnordered<_> = std::mem::take(&mut self.groups)
            .into_iter()
            .filter(|group| filter.matches(group.name()))
            .map(|mut group| {
                let client = client.clone();
                tokio::spawn(async move { group.run(client).await })
            })
            .collect();

        let reporters =
            futures::future::join_all(reporters.iter_mut().map(|reporter| reporter.run().boxed()));

        let options = self.options.clone();
        let runner = async move {
            let results = handles.collect::<Vec<_>>().await;
            if results.is_empty() {
                console::Term::stdout().write_line("no groups matched")?;
            }

            let mut has_any_error = false;
            for result in results {
                match result {
                    Ok(report) => {
                        if !report.passed() {
                            has_any_error = true;
                        }
                    }
                    Err(e) => {
                        error!("group task failed: {e}");
                        has_any_error = true;
                    }
                }
            }
            debug!("all groups finished");

            if options.terminate_channel {
                let Ok(mut guard) = CHANNEL.lock() else {
                    eyre::bail!("failed to acquire runner channel lock");
                };
                guard.take(); // closing the runner channel.
            }

            if has_any_error {
                eyre::bail!("one or more cases failed");
            }

            eyre::Ok(())
        };

        let (outcome, _reporters) = tokio::join!(runner, reporters);

        debug!("runner stopped");

        outcome
    }
}
