#[cfg(test)]
mod tests {
    use crate::utils::{
        Call, CallLog, RecordingBackend, RecordingDirectory, switch, three_stores,
    };
    use engine_core::{
        connectors::local::{SledBackend, StaticStoreDirectory, StoreEntry},
        metrics::Metrics,
    };
    use engine_processing::{error::ImportStep, mode::ModeSwitcher};
    use engine_runtime::{
        error::RunError,
        execution::{executor::ImportExecutor, settings::ExecutorSettings, ticker::ModeTicker},
    };
    use model::{
        records::{
            kv::{KvPair, Rows},
            object::{DbRef, OBJECT_HEADER_LEN, StringRecord, encode_string_records},
        },
        store::{LivenessThresholds, StoreState, SwitchMode},
    };
    use std::{sync::Arc, time::Duration};
    use tokio_util::sync::CancellationToken;
    use tracing_test::traced_test;

    fn settings(interval: Duration) -> ExecutorSettings {
        ExecutorSettings {
            table: "t".to_string(),
            shard_id: 0,
            switch_mode_interval: interval,
            thresholds: LivenessThresholds::default(),
        }
    }

    fn executor(log: &CallLog, backend: RecordingBackend, interval: Duration) -> ImportExecutor {
        ImportExecutor::new(
            settings(interval),
            Arc::new(RecordingDirectory::new(three_stores(), log.clone())),
            Arc::new(backend),
            CancellationToken::new(),
        )
    }

    fn one_row() -> Rows {
        Rows::from_kv_pairs(vec![KvPair::new("k", "v")])
    }

    fn import_assertion() -> Vec<Call> {
        vec![
            Call::ListStores(StoreState::Offline),
            switch("s1", SwitchMode::Import),
            switch("s2", SwitchMode::Import),
        ]
    }

    fn normal_assertion() -> Vec<Call> {
        vec![
            Call::ListStores(StoreState::Disconnected),
            switch("s1", SwitchMode::Normal),
            switch("s2", SwitchMode::Normal),
            switch("s3", SwitchMode::Normal),
        ]
    }

    // Scenario: stores {Normal, Offline, Disconnected}, import mode asserted.
    // Expected Outcome: only the Normal and Offline stores are switched.
    #[traced_test]
    #[tokio::test]
    async fn import_mode_reaches_offline_and_above() {
        let log = CallLog::default();
        let directory = Arc::new(RecordingDirectory::new(three_stores(), log.clone()));
        ModeSwitcher::new(directory, LivenessThresholds::default(), Metrics::new())
            .assert_mode(SwitchMode::Import)
            .await;

        assert_eq!(log.calls(), import_assertion());
    }

    // Scenario: same stores, normal mode asserted.
    // Expected Outcome: all three stores are switched, including the disconnected one.
    #[traced_test]
    #[tokio::test]
    async fn normal_mode_reaches_every_connected_store() {
        let log = CallLog::default();
        let directory = Arc::new(RecordingDirectory::new(three_stores(), log.clone()));
        ModeSwitcher::new(directory, LivenessThresholds::default(), Metrics::new())
            .assert_mode(SwitchMode::Normal)
            .await;

        assert_eq!(log.calls(), normal_assertion());
    }

    // Scenario: every store rejects the switch, or the directory cannot list stores.
    // Expected Outcome: the assertion returns normally; failures only show up in metrics.
    #[traced_test]
    #[tokio::test]
    async fn mode_switch_failures_never_escalate() {
        let log = CallLog::default();
        let metrics = Metrics::new();
        let directory = RecordingDirectory::new(three_stores(), log.clone())
            .failing_switch("s1")
            .failing_switch("s2")
            .failing_switch("s3");
        ModeSwitcher::new(
            Arc::new(directory),
            LivenessThresholds::default(),
            metrics.clone(),
        )
        .assert_mode(SwitchMode::Normal)
        .await;
        assert_eq!(metrics.snapshot().mode_switch_failures, 3);

        let log = CallLog::default();
        let directory = RecordingDirectory::new(three_stores(), log.clone()).failing_listing();
        ModeSwitcher::new(Arc::new(directory), LivenessThresholds::default(), Metrics::new())
            .assert_mode(SwitchMode::Import)
            .await;
        assert_eq!(log.calls(), vec![Call::ListStores(StoreState::Offline)]);
    }

    // Scenario: a full run of one row {k, v} with a healthy backend.
    // Expected Outcome:
    // - import assertion, then every lifecycle step in order, then the normal assertion;
    // - the ticker is cancelled, so no call is made after the run returns.
    #[traced_test]
    #[tokio::test(start_paused = true)]
    async fn successful_run_follows_the_lifecycle_order() {
        let log = CallLog::default();
        let executor = executor(
            &log,
            RecordingBackend::new(log.clone()),
            Duration::from_secs(60),
        );

        let summary = executor.execute(&one_row()).await.unwrap();
        assert_eq!(summary.rows, 1);

        let mut expected = import_assertion();
        expected.extend([
            Call::OpenEngine {
                table: "t".to_string(),
                shard_id: 0,
            },
            Call::AcquireWriter,
            Call::WriteRows(vec![KvPair::new("k", "v")]),
            Call::CloseWriter,
            Call::CloseEngine,
            Call::Import,
            Call::Cleanup,
        ]);
        expected.extend(normal_assertion());
        assert_eq!(log.calls(), expected);

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(log.calls().len(), expected.len());
    }

    // Scenario: the backend rejects the written rows.
    // Expected Outcome:
    // - writer close, finalize, import and cleanup are never invoked;
    // - the cluster is still switched back to normal mode;
    // - the error names the write step.
    #[traced_test]
    #[tokio::test(start_paused = true)]
    async fn write_failure_still_reverts_to_normal_mode() {
        let log = CallLog::default();
        let executor = executor(
            &log,
            RecordingBackend::new(log.clone()).failing_at(ImportStep::WriteRows),
            Duration::from_secs(60),
        );

        let err = executor.execute(&one_row()).await.unwrap_err();
        match err {
            RunError::Import(e) => assert_eq!(e.step(), ImportStep::WriteRows),
            other => panic!("unexpected error: {other:?}"),
        }

        let mut expected = import_assertion();
        expected.extend([
            Call::OpenEngine {
                table: "t".to_string(),
                shard_id: 0,
            },
            Call::AcquireWriter,
            Call::WriteRows(vec![KvPair::new("k", "v")]),
        ]);
        expected.extend(normal_assertion());
        assert_eq!(log.calls(), expected);

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(log.calls().len(), expected.len());
    }

    // Scenario: the ingest step fails after staging succeeded.
    // Expected Outcome: cleanup runs exactly once and the import error is reported.
    #[traced_test]
    #[tokio::test]
    async fn import_failure_still_cleans_up_once() {
        let log = CallLog::default();
        let executor = executor(
            &log,
            RecordingBackend::new(log.clone()).failing_at(ImportStep::Import),
            Duration::from_secs(60),
        );

        let err = executor.execute(&one_row()).await.unwrap_err();
        assert!(matches!(&err, RunError::Import(e) if e.step() == ImportStep::Import));
        assert_eq!(log.count(|c| *c == Call::Cleanup), 1);
        assert!(log.position(&Call::Cleanup) < log.position(&switch("s3", SwitchMode::Normal)));
    }

    // Scenario: steps that can fail independently of the write.
    // Expected Outcome: each failure is attributed to its own step and stops the pipeline there.
    #[traced_test]
    #[tokio::test]
    async fn each_lifecycle_failure_names_its_step() {
        let cases = [
            (ImportStep::OpenEngine, Call::OpenEngine {
                table: "t".to_string(),
                shard_id: 0,
            }),
            (ImportStep::AcquireWriter, Call::AcquireWriter),
            (ImportStep::CloseWriter, Call::CloseWriter),
            (ImportStep::CloseEngine, Call::CloseEngine),
            (ImportStep::Cleanup, Call::Cleanup),
        ];

        for (step, last_pipeline_call) in cases {
            let log = CallLog::default();
            let executor = executor(
                &log,
                RecordingBackend::new(log.clone()).failing_at(step),
                Duration::from_secs(60),
            );

            let err = executor.execute(&one_row()).await.unwrap_err();
            assert!(
                matches!(&err, RunError::Import(e) if e.step() == step),
                "{step}: {err}"
            );

            let calls = log.calls();
            let normal = normal_assertion();
            let split = calls.len() - normal.len();
            assert_eq!(calls[split..], normal[..], "{step}");
            assert_eq!(calls[split - 1], last_pipeline_call, "{step}");
        }
    }

    // Scenario: import takes 35s while the ticker fires every 10s.
    // Expected Outcome:
    // - three background re-assertions of import mode happen during the import;
    // - none happen after the run returns.
    #[traced_test]
    #[tokio::test(start_paused = true)]
    async fn ticker_reasserts_import_mode_during_a_long_import() {
        let log = CallLog::default();
        let executor = executor(
            &log,
            RecordingBackend::new(log.clone()).slow_import(Duration::from_secs(35)),
            Duration::from_secs(10),
        );

        let summary = executor.execute(&one_row()).await.unwrap();

        let import_listings = log.count(|c| *c == Call::ListStores(StoreState::Offline));
        assert_eq!(import_listings, 1 + 3);
        assert_eq!(summary.metrics.ticks, 3);

        let calls = log.calls();
        let import_at = log.position(&Call::Import).unwrap();
        let cleanup_at = log.position(&Call::Cleanup).unwrap();
        let ticks_during_import = calls[import_at..cleanup_at]
            .iter()
            .filter(|c| **c == Call::ListStores(StoreState::Offline))
            .count();
        assert_eq!(ticks_during_import, 3);

        tokio::time::sleep(Duration::from_secs(100)).await;
        assert_eq!(log.calls().len(), calls.len());
        assert_eq!(executor.metrics().snapshot().ticks, 3);
    }

    // Scenario: encoded string records imported through the local collaborators.
    // Expected Outcome: the objects are readable from the live data and every store ends in normal mode.
    #[traced_test]
    #[tokio::test]
    async fn local_end_to_end_import() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(SledBackend::open(dir.path()).unwrap());
        let directory = Arc::new(StaticStoreDirectory::new(vec![
            StoreEntry::new("s1", StoreState::Normal),
            StoreEntry::new("s2", StoreState::Offline).rejecting(),
            StoreEntry::new("s3", StoreState::Disconnected),
        ]));
        let executor = ImportExecutor::new(
            settings(Duration::from_secs(60)),
            directory.clone(),
            backend.clone(),
            CancellationToken::new(),
        );

        let db = DbRef::default();
        let rows = encode_string_records(
            &db,
            &[
                StringRecord::new("strkey", "testval"),
                StringRecord::new("other", "x"),
            ],
            chrono::Utc::now(),
        );
        let summary = executor.execute(&rows).await.unwrap();

        assert_eq!(summary.rows, 2);
        let value = backend.get(&db.meta_key(b"strkey")).unwrap().unwrap();
        assert_eq!(&value[OBJECT_HEADER_LEN..], b"testval");
        assert_eq!(backend.len().unwrap(), 2);

        assert_eq!(directory.mode_of("s1").await, Some(SwitchMode::Normal));
        assert_eq!(directory.mode_of("s2").await, None);
        assert_eq!(directory.mode_of("s3").await, Some(SwitchMode::Normal));
        // s2 rejected both the import and the normal assertion
        assert_eq!(summary.metrics.mode_switch_failures, 2);
    }

    // Scenario: the ticker is stopped while a tick is still switching stores.
    // Expected Outcome:
    // - the in-flight tick finishes and is counted;
    // - no further tick starts afterwards.
    #[traced_test]
    #[tokio::test(start_paused = true)]
    async fn stopping_the_ticker_lets_an_in_flight_tick_finish() {
        let log = CallLog::default();
        let metrics = Metrics::new();
        let directory = RecordingDirectory::new(three_stores(), log.clone())
            .slow_switch(Duration::from_secs(5));
        let switcher = ModeSwitcher::new(
            Arc::new(directory),
            LivenessThresholds::default(),
            metrics.clone(),
        );

        let ticker = ModeTicker::spawn(
            switcher,
            Duration::from_secs(10),
            SwitchMode::Import,
            &CancellationToken::new(),
        );

        // the first tick starts at 10s and is still switching at 12s
        tokio::time::sleep(Duration::from_secs(12)).await;
        assert_eq!(log.calls(), import_assertion());
        assert_eq!(metrics.snapshot().mode_switch_requests, 0);

        ticker.stop();
        tokio::time::sleep(Duration::from_secs(100)).await;

        let snap = metrics.snapshot();
        assert_eq!(snap.ticks, 1);
        assert_eq!(snap.mode_switch_requests, 2);
        assert_eq!(log.calls(), import_assertion());
    }

    // Scenario: the run fails after the rows were written but before they were ingested.
    // Expected Outcome: no rows are reported as written.
    #[traced_test]
    #[tokio::test]
    async fn rows_only_count_once_ingested() {
        for step in [ImportStep::CloseWriter, ImportStep::CloseEngine, ImportStep::Import] {
            let log = CallLog::default();
            let executor = executor(
                &log,
                RecordingBackend::new(log.clone()).failing_at(step),
                Duration::from_secs(60),
            );

            executor.execute(&one_row()).await.unwrap_err();
            let snap = executor.metrics().snapshot();
            assert_eq!(snap.rows_written, 0, "{step}");
            assert_eq!(snap.bytes_written, 0, "{step}");
        }

        let log = CallLog::default();
        let executor = executor(&log, RecordingBackend::new(log.clone()), Duration::from_secs(60));
        let summary = executor.execute(&one_row()).await.unwrap();
        assert_eq!(summary.metrics.rows_written, 1);
        assert_eq!(summary.metrics.bytes_written, 2);
    }
}
