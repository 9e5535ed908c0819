//! Reconciliation engine.
//!
//! Every intent follows the same protocol: check preconditions against the
//! registry, build the multiplexer command, run it on the owning host,
//! interpret the result as an [`Outcome`], and only then mutate the
//! registry. Anything rejected locally never reaches a host.

use rand::seq::SliceRandom;
use remote_sessions_core::{
    ExecOutput, ExecutorError, HostError, HostFilter, HostSet, Intent, KillTarget, Listing,
    Multiplexer, Outcome, RemoteCommand, RemoteExecutor, SessionEntry, SessionName,
};

use crate::{
    ActionReport, EngineError, HostRefresh, RefreshResult, SessionRegistry, error::InvalidInput,
};

/// Drives intents through a multiplexer adapter and remote executor.
pub struct ReconciliationEngine<E, M>
where
    E: RemoteExecutor,
    M: Multiplexer,
{
    executor: E,
    multiplexer: M,
    hosts: HostSet,
}

impl<E, M> ReconciliationEngine<E, M>
where
    E: RemoteExecutor,
    M: Multiplexer,
{
    /// Create a new engine.
    #[must_use]
    pub const fn new(executor: E, multiplexer: M, hosts: HostSet) -> Self {
        Self {
            executor,
            multiplexer,
            hosts,
        }
    }

    #[must_use]
    pub const fn hosts(&self) -> &HostSet {
        &self.hosts
    }

    #[must_use]
    pub const fn executor(&self) -> &E {
        &self.executor
    }

    /// Perform one intent against `registry`.
    ///
    /// The registry reflects every mutation that actually happened, even
    /// when an error is returned. Persisting it is the caller's job.
    ///
    /// # Errors
    /// Returns error if a precondition fails, the transport cannot be
    /// started, or the multiplexer reports an outcome the intent cannot
    /// accept.
    pub async fn perform_action(
        &self,
        registry: &mut SessionRegistry,
        intent: Intent,
    ) -> Result<ActionReport, EngineError> {
        tracing::debug!(action = intent.verb(), "Performing action");
        match intent {
            Intent::List { show_hosts } => Ok(ActionReport::Listing {
                entries: registry.entries().to_vec(),
                show_hosts,
            }),
            Intent::Create { name, host } => self.create(registry, name, host).await,
            Intent::Attach { name } => self.attach(registry, name).await,
            Intent::Kill(KillTarget::Named(name)) => self.kill(registry, name).await,
            Intent::Kill(KillTarget::All) => Ok(self.kill_all(registry).await),
            Intent::Rename { old, new } => self.rename(registry, old, new).await,
            Intent::Refresh(filter) => self.refresh(registry, &filter).await,
        }
    }

    async fn create(
        &self,
        registry: &mut SessionRegistry,
        name: SessionName,
        host: Option<String>,
    ) -> Result<ActionReport, EngineError> {
        if registry.contains(name.as_str()) {
            return Err(EngineError::SessionAlreadyExists(name));
        }
        let host = self.choose_host(host)?;
        let command = self.multiplexer.new_session(&name)?;

        let outcome = self.run(&host, &command).await?;
        if outcome != Outcome::Detached {
            return Err(outcome_error("new", name, host, outcome));
        }

        tracing::info!(session = %name, host = %host, "Session created");
        registry.put(name.clone(), host.clone());
        Ok(ActionReport::Created { name, host })
    }

    async fn attach(
        &self,
        registry: &mut SessionRegistry,
        name: SessionName,
    ) -> Result<ActionReport, EngineError> {
        let host = owning_host(registry, &name)?;
        let command = self.multiplexer.attach(Some(&name))?;

        let outcome = self.run(&host, &command).await?;
        if outcome == Outcome::RemoteExited {
            tracing::info!(session = %name, host = %host, "Session exited; removing");
            registry.remove(name.as_str());
            return Ok(ActionReport::Attached {
                name,
                host,
                outcome,
                removed: true,
            });
        }

        registry.promote(name.as_str());
        match outcome {
            Outcome::Detached | Outcome::OkNormal => Ok(ActionReport::Attached {
                name,
                host,
                outcome,
                removed: false,
            }),
            _ => Err(outcome_error("attach", name, host, outcome)),
        }
    }

    async fn kill(
        &self,
        registry: &mut SessionRegistry,
        name: SessionName,
    ) -> Result<ActionReport, EngineError> {
        let host = owning_host(registry, &name)?;
        let command = self.multiplexer.kill(&name)?;

        let outcome = self.run(&host, &command).await?;
        match outcome {
            // NotFound: someone beat us to it; the entry is stale either way.
            Outcome::OkNormal | Outcome::NotFound => {
                tracing::info!(session = %name, host = %host, %outcome, "Session killed");
                registry.remove(name.as_str());
                Ok(ActionReport::Killed {
                    name,
                    host,
                    outcome,
                })
            }
            _ => Err(outcome_error("kill", name, host, outcome)),
        }
    }

    async fn kill_all(&self, registry: &mut SessionRegistry) -> ActionReport {
        let mut killed = Vec::new();
        let mut failed = Vec::new();

        for name in registry.names() {
            match self.kill(registry, name.clone()).await {
                Ok(ActionReport::Killed { name, host, .. }) => {
                    killed.push(SessionEntry::new(name, host));
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(session = %name, "Kill failed: {e}");
                    failed.push((name, e));
                }
            }
        }

        ActionReport::KilledAll { killed, failed }
    }

    async fn rename(
        &self,
        registry: &mut SessionRegistry,
        old: SessionName,
        new: SessionName,
    ) -> Result<ActionReport, EngineError> {
        let host = owning_host(registry, &old)?;
        if registry.contains(new.as_str()) {
            return Err(EngineError::SessionAlreadyExists(new));
        }
        let command = self.multiplexer.rename(&old, &new)?;

        let outcome = self.run(&host, &command).await?;
        if outcome != Outcome::OkNormal {
            return Err(outcome_error("rename", old, host, outcome));
        }

        tracing::info!(old = %old, new = %new, host = %host, "Session renamed");
        registry.rename(old.as_str(), new.clone());
        Ok(ActionReport::Renamed { old, new, host })
    }

    async fn refresh(
        &self,
        registry: &mut SessionRegistry,
        filter: &HostFilter,
    ) -> Result<ActionReport, EngineError> {
        let hosts = self.hosts.matching(filter)?;
        let command = self.multiplexer.list()?;

        // One host at a time so listings never interleave.
        let mut refreshed = Vec::with_capacity(hosts.len());
        for host in hosts {
            let cleared = registry.remove_host(host);
            let result = self.refresh_host(registry, host, &command).await;
            refreshed.push(HostRefresh {
                host: host.to_string(),
                cleared,
                result,
            });
        }
        Ok(ActionReport::Refreshed(refreshed))
    }

    async fn refresh_host(
        &self,
        registry: &mut SessionRegistry,
        host: &str,
        command: &RemoteCommand,
    ) -> RefreshResult {
        let output = match self.execute(host, command).await {
            Ok(output) => output,
            Err(e) => return RefreshResult::Unavailable(e),
        };

        match self.multiplexer.parse_listing(&output) {
            Listing::Sessions(names) if names.is_empty() => RefreshResult::NoSessions,
            Listing::Sessions(names) => {
                // Insert back to front so the listing order survives promotion.
                for name in names.iter().rev() {
                    registry.put(name.clone(), host);
                }
                tracing::info!(host, sessions = names.len(), "Host refreshed");
                RefreshResult::Found(names)
            }
            Listing::NoServer => RefreshResult::NoSessions,
            Listing::Failed(status) => {
                let outcome = Outcome::from_status(status);
                tracing::warn!(host, %outcome, "Listing sessions failed");
                RefreshResult::Unavailable(status_error(host, outcome))
            }
        }
    }

    fn choose_host(&self, requested: Option<String>) -> Result<String, EngineError> {
        match requested {
            Some(host) if self.hosts.contains(&host) => Ok(host),
            Some(host) => Err(HostError::Unknown(host).into()),
            None => self
                .hosts
                .as_slice()
                .choose(&mut rand::thread_rng())
                .cloned()
                .ok_or_else(|| HostError::Empty.into()),
        }
    }

    async fn execute(
        &self,
        host: &str,
        command: &RemoteCommand,
    ) -> Result<ExecOutput, EngineError> {
        self.executor
            .run(host, command)
            .await
            .map_err(|source| match source {
                ExecutorError::Rejected(e) => EngineError::InvalidInput(InvalidInput::Name(e)),
                source => EngineError::TransportFailure {
                    host: host.to_string(),
                    source,
                },
            })
    }

    async fn run(&self, host: &str, command: &RemoteCommand) -> Result<Outcome, EngineError> {
        let output = self.execute(host, command).await?;
        let outcome = self.multiplexer.interpret(&output);
        tracing::debug!(host, %outcome, "Multiplexer outcome");
        Ok(outcome)
    }
}

fn owning_host(registry: &SessionRegistry, name: &SessionName) -> Result<String, EngineError> {
    registry
        .get(name.as_str())
        .map(str::to_string)
        .ok_or_else(|| EngineError::SessionNotFound(name.clone()))
}

/// Error for an outcome that carries its own failure meaning.
fn status_error(host: &str, outcome: Outcome) -> EngineError {
    match outcome {
        Outcome::TransportError(code) => EngineError::AmbiguousFailure {
            host: host.to_string(),
            code,
        },
        Outcome::Error(code) => EngineError::RemoteCommandFailure {
            host: host.to_string(),
            code,
        },
        Outcome::CommandNotFound => EngineError::MultiplexerNotFound {
            host: host.to_string(),
        },
        Outcome::NotFound => EngineError::RemoteCommandFailure {
            host: host.to_string(),
            code: 1,
        },
        _ => EngineError::RemoteCommandFailure {
            host: host.to_string(),
            code: 0,
        },
    }
}

/// Error for an outcome the action could not accept.
fn outcome_error(
    action: &'static str,
    name: SessionName,
    host: String,
    outcome: Outcome,
) -> EngineError {
    match outcome {
        Outcome::TransportError(_) | Outcome::Error(_) | Outcome::CommandNotFound => {
            status_error(&host, outcome)
        }
        Outcome::NotFound if action != "new" => EngineError::RemoteSessionMissing { name, host },
        _ => EngineError::UnexpectedOutcome {
            action,
            name,
            host,
            outcome,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, sync::Mutex};

    use async_trait::async_trait;
    use remote_sessions_core::{ExecStatus, NameError};
    use remote_sessions_executor::TmuxAdapter;
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    /// Executor that replays scripted results and records every call.
    #[derive(Default)]
    struct ScriptedExecutor {
        replies: Mutex<VecDeque<Result<ExecOutput, ExecutorError>>>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedExecutor {
        fn with(replies: impl IntoIterator<Item = ExecOutput>) -> Self {
            let executor = Self::default();
            executor
                .replies
                .lock()
                .unwrap()
                .extend(replies.into_iter().map(Ok));
            executor
        }

        fn push_err(&self, err: ExecutorError) {
            self.replies.lock().unwrap().push_back(Err(err));
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RemoteExecutor for ScriptedExecutor {
        async fn run(
            &self,
            host: &str,
            command: &RemoteCommand,
        ) -> Result<ExecOutput, ExecutorError> {
            self.calls
                .lock()
                .unwrap()
                .push((host.to_string(), command.line.clone()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ExecOutput::exited(0)))
        }
    }

    fn text(code: i32, output: &str) -> ExecOutput {
        ExecOutput::new(ExecStatus::Exited(code), Some(output.to_string()))
    }

    fn detached() -> ExecOutput {
        text(0, "[detached (from session x)]\r\n")
    }

    fn exited() -> ExecOutput {
        text(0, "[exited]\r\n")
    }

    fn name(s: &str) -> SessionName {
        SessionName::parse(s).unwrap()
    }

    fn call(host: &str, line: &str) -> (String, String) {
        (host.to_string(), line.to_string())
    }

    fn engine(
        executor: ScriptedExecutor,
        hosts: &[&str],
    ) -> ReconciliationEngine<ScriptedExecutor, TmuxAdapter> {
        ReconciliationEngine::new(executor, TmuxAdapter::default(), HostSet::new(hosts.iter().copied()))
    }

    fn registry(entries: &[(&str, &str)]) -> SessionRegistry {
        SessionRegistry::from_entries(
            entries
                .iter()
                .map(|(n, h)| SessionEntry::new(name(n), *h)),
        )
    }

    fn order(registry: &SessionRegistry) -> Vec<(&str, &str)> {
        registry
            .entries()
            .iter()
            .map(|e| (e.name.as_str(), e.host.as_str()))
            .collect()
    }

    #[tokio::test]
    async fn test_create_detached_registers_on_chosen_host() {
        let engine = engine(ScriptedExecutor::with([detached()]), &["h1", "h2", "h3"]);
        let mut reg = SessionRegistry::new();

        let report = assert_ok!(
            engine
                .perform_action(&mut reg, Intent::Create { name: name("web"), host: None })
                .await
        );

        let calls = engine.executor().calls();
        assert_eq!(calls.len(), 1);
        let chosen = calls[0].0.as_str();
        assert!(engine.hosts().contains(chosen));
        assert_eq!(calls[0].1, "tmux new-session -s web");
        assert_eq!(reg.get("web"), Some(chosen));
        assert!(matches!(report, ActionReport::Created { host, .. } if host == chosen));
    }

    #[tokio::test]
    async fn test_create_on_explicit_host() {
        let engine = engine(ScriptedExecutor::with([detached()]), &["h1", "h2"]);
        let mut reg = SessionRegistry::new();
        assert_ok!(
            engine
                .perform_action(
                    &mut reg,
                    Intent::Create { name: name("web"), host: Some("h2".into()) }
                )
                .await
        );
        assert_eq!(engine.executor().calls()[0].0, "h2");
        assert_eq!(reg.get("web"), Some("h2"));
    }

    #[tokio::test]
    async fn test_create_other_outcomes_do_not_register() {
        for reply in [exited(), ExecOutput::exited(0), ExecOutput::exited(1), ExecOutput::exited(2)] {
            let engine = engine(ScriptedExecutor::with([reply]), &["h1"]);
            let mut reg = SessionRegistry::new();
            let result = engine
                .perform_action(&mut reg, Intent::Create { name: name("web"), host: None })
                .await;
            assert_err!(result);
            assert!(reg.is_empty());
        }
    }

    #[tokio::test]
    async fn test_create_duplicate_is_rejected_without_remote_call() {
        let engine = engine(ScriptedExecutor::default(), &["h1"]);
        let mut reg = registry(&[("web", "h1")]);
        let err = assert_err!(
            engine
                .perform_action(&mut reg, Intent::Create { name: name("web"), host: None })
                .await
        );
        assert!(matches!(err, EngineError::SessionAlreadyExists(_)));
        assert!(engine.executor().calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_unknown_host_and_empty_host_set() {
        let engine1 = engine(ScriptedExecutor::default(), &["h1"]);
        let mut reg = SessionRegistry::new();
        let err = assert_err!(
            engine1
                .perform_action(&mut reg, Intent::Create { name: name("a"), host: Some("zz".into()) })
                .await
        );
        assert!(matches!(err, EngineError::InvalidInput(InvalidInput::Host(HostError::Unknown(_)))));

        let engine2 = engine(ScriptedExecutor::default(), &[]);
        let err = assert_err!(
            engine2
                .perform_action(&mut reg, Intent::Create { name: name("a"), host: None })
                .await
        );
        assert!(matches!(err, EngineError::InvalidInput(InvalidInput::Host(HostError::Empty))));
        assert!(engine1.executor().calls().is_empty());
        assert!(engine2.executor().calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_transport_failure_does_not_retry() {
        let executor = ScriptedExecutor::default();
        executor.push_err(ExecutorError::ExecutableNotFound("ssh".into()));
        let engine = engine(executor, &["h1", "h2"]);
        let mut reg = SessionRegistry::new();
        let err = assert_err!(
            engine
                .perform_action(&mut reg, Intent::Create { name: name("a"), host: None })
                .await
        );
        assert!(matches!(err, EngineError::TransportFailure { .. }));
        assert_eq!(engine.executor().calls().len(), 1);
        assert!(reg.is_empty());
    }

    #[tokio::test]
    async fn test_attach_remote_exited_removes() {
        let engine = engine(ScriptedExecutor::with([exited()]), &["h1"]);
        let mut reg = registry(&[("a", "h1"), ("b", "h1")]);
        let report = assert_ok!(
            engine
                .perform_action(&mut reg, Intent::Attach { name: name("b") })
                .await
        );
        assert!(matches!(report, ActionReport::Attached { removed: true, .. }));
        assert!(!reg.contains("b"));
        assert_eq!(engine.executor().calls(), vec![call("h1", "tmux attach -t b")]);
    }

    #[tokio::test]
    async fn test_attach_other_outcomes_keep_and_promote() {
        let replies = [
            detached(),
            ExecOutput::exited(0),
            ExecOutput::exited(1),
            ExecOutput::exited(2),
            ExecOutput::new(ExecStatus::TransportSuspect(Some(255)), None),
        ];
        for reply in replies {
            let engine = engine(ScriptedExecutor::with([reply]), &["h1", "h2"]);
            let mut reg = registry(&[("a", "h1"), ("b", "h2")]);
            let _ = engine
                .perform_action(&mut reg, Intent::Attach { name: name("b") })
                .await;
            assert_eq!(order(&reg), vec![("b", "h2"), ("a", "h1")]);
            assert_eq!(engine.executor().calls()[0].0, "h2");
        }
    }

    #[tokio::test]
    async fn test_attach_errors_are_classified() {
        let engine = engine(
            ScriptedExecutor::with([
                ExecOutput::exited(1),
                ExecOutput::new(ExecStatus::TransportSuspect(Some(255)), None),
                ExecOutput::exited(3),
                ExecOutput::new(ExecStatus::CommandNotFound, None),
            ]),
            &["h1"],
        );
        let mut reg = registry(&[("a", "h1")]);
        let attach = || Intent::Attach { name: name("a") };

        let err = assert_err!(engine.perform_action(&mut reg, attach()).await);
        assert!(matches!(err, EngineError::RemoteSessionMissing { .. }));
        let err = assert_err!(engine.perform_action(&mut reg, attach()).await);
        assert!(matches!(err, EngineError::AmbiguousFailure { code: Some(255), .. }));
        let err = assert_err!(engine.perform_action(&mut reg, attach()).await);
        assert!(matches!(err, EngineError::RemoteCommandFailure { code: 3, .. }));
        let err = assert_err!(engine.perform_action(&mut reg, attach()).await);
        assert!(matches!(err, EngineError::MultiplexerNotFound { .. }));
        assert!(reg.contains("a"));
    }

    #[tokio::test]
    async fn test_attach_unknown_session() {
        let engine = engine(ScriptedExecutor::default(), &["h1"]);
        let mut reg = SessionRegistry::new();
        let err = assert_err!(
            engine
                .perform_action(&mut reg, Intent::Attach { name: name("ghost") })
                .await
        );
        assert!(matches!(err, EngineError::SessionNotFound(_)));
        assert!(engine.executor().calls().is_empty());
    }

    #[tokio::test]
    async fn test_kill_ok_and_not_found_remove() {
        let engine = engine(
            ScriptedExecutor::with([ExecOutput::exited(0), ExecOutput::exited(1)]),
            &["h1"],
        );
        let mut reg = registry(&[("a", "h1"), ("b", "h1")]);
        assert_ok!(engine.perform_action(&mut reg, Intent::Kill(KillTarget::Named(name("a")))).await);
        assert_ok!(engine.perform_action(&mut reg, Intent::Kill(KillTarget::Named(name("b")))).await);
        assert!(reg.is_empty());
        assert_eq!(engine.executor().calls()[0].1, "tmux kill-session -t a");
    }

    #[tokio::test]
    async fn test_kill_error_keeps_entry() {
        let engine = engine(
            ScriptedExecutor::with([
                ExecOutput::exited(2),
                ExecOutput::new(ExecStatus::TransportSuspect(Some(255)), None),
            ]),
            &["h1"],
        );
        let mut reg = registry(&[("a", "h1")]);
        let kill = || Intent::Kill(KillTarget::Named(name("a")));
        let err = assert_err!(engine.perform_action(&mut reg, kill()).await);
        assert!(matches!(err, EngineError::RemoteCommandFailure { code: 2, .. }));
        let err = assert_err!(engine.perform_action(&mut reg, kill()).await);
        assert!(matches!(err, EngineError::AmbiguousFailure { .. }));
        assert_eq!(reg.get("a"), Some("h1"));
    }

    #[tokio::test]
    async fn test_kill_all_empties_registry() {
        let engine = engine(ScriptedExecutor::default(), &["h1", "h2"]);
        let mut reg = registry(&[("a", "h1"), ("b", "h2"), ("c", "h1")]);
        let report = assert_ok!(engine.perform_action(&mut reg, Intent::Kill(KillTarget::All)).await);
        assert!(reg.is_empty());
        let ActionReport::KilledAll { killed, failed } = report else {
            panic!("expected KilledAll");
        };
        assert_eq!(killed.len(), 3);
        assert!(failed.is_empty());
        let calls = engine.executor().calls();
        assert_eq!(
            calls,
            vec![
                call("h1", "tmux kill-session -t a"),
                call("h2", "tmux kill-session -t b"),
                call("h1", "tmux kill-session -t c"),
            ]
        );
    }

    #[tokio::test]
    async fn test_kill_all_continues_past_failures() {
        let executor = ScriptedExecutor::with([ExecOutput::exited(0)]);
        executor.push_err(ExecutorError::SpawnFailed("boom".into()));
        executor.replies.lock().unwrap().push_back(Ok(ExecOutput::exited(2)));
        let engine = engine(executor, &["h1", "h2"]);
        let mut reg = registry(&[("a", "h1"), ("b", "h2"), ("c", "h1")]);

        let report = assert_ok!(engine.perform_action(&mut reg, Intent::Kill(KillTarget::All)).await);
        let ActionReport::KilledAll { killed, failed } = report else {
            panic!("expected KilledAll");
        };
        assert_eq!(engine.executor().calls().len(), 3);
        assert_eq!(killed, vec![SessionEntry::new(name("a"), "h1")]);
        let failed_names: Vec<&str> = failed.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(failed_names, vec!["b", "c"]);
        assert_eq!(order(&reg), vec![("b", "h2"), ("c", "h1")]);
    }

    #[tokio::test]
    async fn test_rename_ok_moves_entry() {
        let engine = engine(ScriptedExecutor::with([ExecOutput::exited(0)]), &["h1"]);
        let mut reg = registry(&[("x", "h2"), ("a", "h1")]);
        assert_ok!(
            engine
                .perform_action(&mut reg, Intent::Rename { old: name("a"), new: name("b") })
                .await
        );
        assert_eq!(order(&reg), vec![("b", "h1"), ("x", "h2")]);
        assert_eq!(
            engine.executor().calls(),
            vec![call("h1", "tmux rename-session -t a b")]
        );
    }

    #[tokio::test]
    async fn test_rename_to_existing_is_rejected_without_remote_call() {
        let engine = engine(ScriptedExecutor::default(), &["h1"]);
        let mut reg = registry(&[("a", "h1"), ("b", "h1")]);
        let before = reg.clone();
        let err = assert_err!(
            engine
                .perform_action(&mut reg, Intent::Rename { old: name("a"), new: name("b") })
                .await
        );
        assert!(matches!(err, EngineError::SessionAlreadyExists(_)));
        assert!(engine.executor().calls().is_empty());
        assert_eq!(reg, before);
    }

    #[tokio::test]
    async fn test_rename_failure_leaves_registry() {
        let engine = engine(ScriptedExecutor::with([ExecOutput::exited(1)]), &["h1"]);
        let mut reg = registry(&[("a", "h1")]);
        let before = reg.clone();
        assert_err!(
            engine
                .perform_action(&mut reg, Intent::Rename { old: name("a"), new: name("b") })
                .await
        );
        assert_eq!(reg, before);
    }

    #[tokio::test]
    async fn test_refresh_replaces_host_entries() {
        let engine = engine(
            ScriptedExecutor::with([text(0, "foo: attached\nbar: detached")]),
            &["h1", "h2"],
        );
        let mut reg = registry(&[("old", "h1"), ("keep", "h2")]);

        let report = assert_ok!(
            engine
                .perform_action(&mut reg, Intent::Refresh(HostFilter::Host("h1".into())))
                .await
        );
        assert_eq!(order(&reg), vec![("foo", "h1"), ("bar", "h1"), ("keep", "h2")]);
        assert_eq!(
            engine.executor().calls(),
            vec![call("h1", "tmux list-sessions")]
        );

        let ActionReport::Refreshed(hosts) = report else {
            panic!("expected Refreshed");
        };
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].cleared, vec![name("old")]);
        assert_eq!(hosts[0].found(), [name("foo"), name("bar")]);
    }

    #[tokio::test]
    async fn test_refresh_all_visits_hosts_in_order() {
        let engine = engine(
            ScriptedExecutor::with([
                text(0, "a: 1 windows\n"),
                text(1, "").with_errors("failed to connect to server\n"),
                text(1, ""),
            ]),
            &["h1", "h2", "h3"],
        );
        let mut reg = registry(&[("stale", "h2"), ("gone", "h3")]);

        let report = assert_ok!(
            engine
                .perform_action(&mut reg, Intent::Refresh(HostFilter::All))
                .await
        );
        assert_eq!(order(&reg), vec![("a", "h1")]);
        let hosts: Vec<String> = engine.executor().calls().into_iter().map(|c| c.0).collect();
        assert_eq!(hosts, vec!["h1", "h2", "h3"]);

        let ActionReport::Refreshed(results) = report else {
            panic!("expected Refreshed");
        };
        assert!(matches!(results[0].result, RefreshResult::Found(_)));
        assert!(matches!(results[1].result, RefreshResult::NoSessions));
        assert!(matches!(
            results[2].result,
            RefreshResult::Unavailable(EngineError::RemoteCommandFailure { .. })
                | RefreshResult::Unavailable(EngineError::AmbiguousFailure { .. })
        ));
    }

    #[tokio::test]
    async fn test_refresh_transport_failure_leaves_host_empty() {
        let executor = ScriptedExecutor::default();
        executor.push_err(ExecutorError::SpawnFailed("no route".into()));
        let engine = engine(executor, &["h1"]);
        let mut reg = registry(&[("a", "h1")]);
        let report = assert_ok!(
            engine
                .perform_action(&mut reg, Intent::Refresh(HostFilter::All))
                .await
        );
        assert!(reg.is_empty());
        let ActionReport::Refreshed(results) = report else {
            panic!("expected Refreshed");
        };
        assert!(matches!(
            results[0].result,
            RefreshResult::Unavailable(EngineError::TransportFailure { .. })
        ));
    }

    #[tokio::test]
    async fn test_refresh_unknown_host_is_rejected() {
        let engine = engine(ScriptedExecutor::default(), &["h1"]);
        let mut reg = registry(&[("a", "h1")]);
        let err = assert_err!(
            engine
                .perform_action(&mut reg, Intent::Refresh(HostFilter::Host("nope".into())))
                .await
        );
        assert!(err.is_rejected_locally());
        assert!(reg.contains("a"));
        assert!(engine.executor().calls().is_empty());
    }

    #[tokio::test]
    async fn test_list_makes_no_remote_call() {
        let engine = engine(ScriptedExecutor::default(), &["h1"]);
        let mut reg = registry(&[("a", "h1"), ("b", "h1")]);
        let report = assert_ok!(
            engine
                .perform_action(&mut reg, Intent::List { show_hosts: true })
                .await
        );
        assert!(matches!(report, ActionReport::Listing { ref entries, show_hosts: true } if entries.len() == 2));
        assert!(engine.executor().calls().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_command_line_is_invalid_input() {
        let executor = ScriptedExecutor::default();
        executor.push_err(ExecutorError::Rejected(NameError::IllegalCharacters(vec![';'])));
        let engine = engine(executor, &["h1"]);
        let mut reg = SessionRegistry::new();
        let err = assert_err!(
            engine
                .perform_action(&mut reg, Intent::Create { name: name("a"), host: None })
                .await
        );
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }
}
