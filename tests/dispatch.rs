// SPDX-License-Identifier: MIT OR Apache-2.0

#[cfg(test)]
mod tests {
    use logdispatch::context::{ContextProvider, ThreadContext};
    use logdispatch::{
        dispatch, Arg, Config, InMemorySink, Level, LoggerRegistry, Message, SharedError,
        SimpleMessageFactory,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct Timeout;
    impl std::fmt::Display for Timeout {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("timed out")
        }
    }
    impl std::error::Error for Timeout {}

    fn setup(threshold: Level) -> (Arc<InMemorySink>, LoggerRegistry) {
        let sink = Arc::new(InMemorySink::new());
        let config = Config::default().with_default_threshold(threshold);
        (sink.clone(), LoggerRegistry::new(config, sink))
    }

    #[test]
    fn severe_levels_reach_the_sink_once_and_others_never() {
        let (sink, registry) = setup(Level::WARN);
        let logger = registry.get("gate");
        let suppliers_run = Arc::new(AtomicUsize::new(0));

        for level in [Level::FATAL, Level::ERROR, Level::WARN, Level::INFO, Level::DEBUG, Level::TRACE] {
            let counter = suppliers_run.clone();
            logger.log_lazy(&level, move || {
                counter.fetch_add(1, Ordering::SeqCst);
                "lazy"
            });
        }

        let levels: Vec<String> = sink
            .drain_records()
            .iter()
            .map(|r| r.original_level().to_string())
            .collect();
        assert_eq!(levels, ["FATAL", "ERROR", "WARN"]);
        assert_eq!(suppliers_run.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn disabled_macro_arguments_are_not_evaluated() {
        let (sink, registry) = setup(Level::INFO);
        let logger = registry.get("macros");
        let evaluated = AtomicUsize::new(0);
        let expensive = || {
            evaluated.fetch_add(1, Ordering::SeqCst);
            42
        };

        logdispatch::debug!(logger, "{}", expensive());
        logdispatch::trace!(logger, "{} {}", expensive(), expensive());
        logdispatch::info!(logger, "{}", expensive());
        assert_eq!(evaluated.load(Ordering::SeqCst), 1);
        assert_eq!(sink.texts(), ["42"]);
    }

    #[test]
    fn specialized_paths_match_the_general_path() {
        let (sink, registry) = setup(Level::INFO);
        let logger = registry.get("paths");
        let marker = registry.marker("M");

        dispatch::log_simple(&logger, &Level::INFO, Some(&marker), "plain {}");
        dispatch::log(&logger, &Level::INFO, Some(&marker), "plain {}", vec![]);
        dispatch::log_single_param(&logger, &Level::INFO, None, "one {} {}", "a");
        dispatch::log(&logger, &Level::INFO, None, "one {} {}", vec!["a".into()]);
        dispatch::log_two_params(&logger, &Level::INFO, None, "{} and {}", 1, Arg::Null);
        dispatch::log(&logger, &Level::INFO, None, "{} and {}", vec![1.into(), Arg::Null]);

        let texts = sink.texts();
        assert_eq!(texts[0], "[M] plain {}");
        assert_eq!(texts[0], texts[1]);
        assert_eq!(texts[2], "one a {}");
        assert_eq!(texts[2], texts[3]);
        assert_eq!(texts[4], "1 and null");
        assert_eq!(texts[4], texts[5]);
    }

    #[test]
    fn marker_label_lists_direct_parents() {
        let (sink, registry) = setup(Level::INFO);
        let logger = registry.get("markers");
        let sql = registry.marker("SQL");
        let update = registry.marker("SQL_UPDATE");
        update.add_parents(&[sql.clone()]);

        logdispatch::info!(logger, marker: update, "{} rows", 3);
        logdispatch::info!(logger, marker: sql, "plain");

        let records = sink.drain_records();
        assert_eq!(records[0].text(), "[SQL_UPDATE [SQL]] 3 rows");
        assert_eq!(records[0].marker(), Some(&update));
        assert_eq!(records[1].text(), "[SQL] plain");
    }

    #[test]
    fn errors_travel_beside_the_text() {
        let (sink, registry) = setup(Level::INFO);
        let logger = registry.get("errors");
        let error: SharedError = Arc::new(Timeout);

        logger.log_error(&Level::ERROR, "request failed", error.clone());
        logdispatch::error!(logger, "retry {} failed", 2, Arg::from(error.clone()));

        let records = sink.drain_records();
        for record in &records {
            assert!(!record.text().contains("timed out"));
            assert_eq!(record.error().map(|e| e.to_string()).as_deref(), Some("timed out"));
        }
        // a trailing error is not a format argument
        assert_eq!(records[1].text(), "retry 2 failed");
    }

    #[test]
    fn records_carry_the_callers_context() {
        let (sink, registry) = setup(Level::INFO);
        let logger = registry.get("ctx");
        ThreadContext::clear_all();
        ThreadContext::put("request", "r-7");
        {
            let _scope = ThreadContext::scoped_push("handler");
            logger.info("inside");
        }
        logger.info("outside");
        ThreadContext::clear_all();
        logger.info("none");

        let records = sink.drain_records();
        assert_eq!(records[0].context().mdc().get("request"), Some("r-7"));
        assert_eq!(records[0].context().ndc().peek(), Some("handler"));
        assert!(records[1].context().ndc().is_empty());
        assert!(!records[2].context().has_context());
    }

    #[test]
    fn panicking_supplier_is_contained_at_every_level() {
        let (sink, registry) = setup(Level::TRACE);
        let logger = registry.get("panics");
        for level in [Level::FATAL, Level::ERROR, Level::WARN, Level::INFO, Level::DEBUG, Level::TRACE] {
            logger.log_lazy(&level, || -> String { panic!("supplier exploded") });
        }
        let texts = sink.texts();
        assert_eq!(texts.len(), 6);
        for text in texts {
            assert_eq!(text, "error formatting message: supplier exploded");
        }
    }

    #[test]
    fn panicking_display_argument_is_contained() {
        struct Panicky;
        impl std::fmt::Display for Panicky {
            fn fmt(&self, _f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                panic!("to_string blew up")
            }
        }

        let (sink, registry) = setup(Level::INFO);
        let logger = registry.get("display");
        logdispatch::info!(logger, "v={}", Arg::display(Panicky));
        logdispatch::warn!(logger, "{} then {}", 1, Arg::display(Panicky));
        logdispatch::error!(logger, "after");

        assert_eq!(
            sink.texts(),
            [
                "error formatting message: to_string blew up",
                "error formatting message: to_string blew up",
                "after",
            ]
        );
    }

    #[test]
    fn less_severe_custom_level_never_runs_its_supplier() {
        let (sink, registry) = setup(Level::INFO);
        let logger = registry.get("custom");
        let chatty = registry.level("CHATTY", 450);
        let notice = registry.level("NOTICE", 350);
        let suppliers_run = Arc::new(AtomicUsize::new(0));

        for level in [&chatty, &notice] {
            let counter = suppliers_run.clone();
            logger.log_lazy(level, move || {
                counter.fetch_add(1, Ordering::SeqCst);
                "lazy"
            });
        }

        let records = sink.drain_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].original_level(), &notice);
        assert_eq!(suppliers_run.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn message_is_formatted_once() {
        let (sink, registry) = setup(Level::INFO);
        let logger = registry.get("once");
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let message = Message::lazy(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            "computed"
        });
        assert_eq!(message.formatted(), "computed");
        logger.log_message(&Level::INFO, None, message);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(sink.texts(), ["computed"]);
    }

    #[test]
    fn simple_factory_keeps_the_pattern_verbatim() {
        let (sink, registry) = setup(Level::INFO);
        let logger = registry.get_with("verbatim", Arc::new(SimpleMessageFactory));
        logdispatch::info!(logger, "{} stays", 1);
        assert_eq!(sink.texts(), ["{} stays"]);
    }

    #[test]
    fn single_thread_order_is_preserved() {
        let (sink, registry) = setup(Level::INFO);
        let logger = registry.get("order");
        for i in 0..50 {
            logdispatch::info!(logger, "{}", i);
        }
        let expected: Vec<String> = (0..50).map(|i| i.to_string()).collect();
        assert_eq!(sink.texts(), expected);
    }
}
