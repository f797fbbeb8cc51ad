//! # Integration Tests
//!
//! Cross-crate end-to-end tests.
//!
//! Covers:
//! - Wire contract of every error and success envelope
//! - Config file -> dispatcher -> responder flow
//! - Store initialization under concurrent dispatch

#[cfg(test)]
mod contract_tests {
    use contracts::{DispatchResponse, ResponseEnvelope};
    use serde_json::json;

    #[test]
    fn test_envelope_never_has_both_fields() {
        let ok = serde_json::to_value(DispatchResponse::ok(json!(1)).envelope).unwrap();
        let err = serde_json::to_value(DispatchResponse::error(400, "No body").envelope).unwrap();

        assert_eq!(ok.as_object().unwrap().len(), 1);
        assert_eq!(err.as_object().unwrap().len(), 1);
        assert!(matches!(
            serde_json::from_value::<ResponseEnvelope>(err).unwrap(),
            ResponseEnvelope::Error { .. }
        ));
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{DispatchResponse, RequestEnvelope};
    use dispatcher::{
        handler_fn, ActionConfig, ActionContext, Dispatcher, DispatcherConfig, MemoryResponder,
        StoreSource, WriterResponder,
    };
    use serde_json::{json, Value};

    fn echo_dispatcher() -> Dispatcher {
        let manifest =
            ConfigLoader::load_from_str(r#"{ "actions": { "echo": {} } }"#, ConfigFormat::Json)
                .unwrap();
        Dispatcher::builder()
            .config(DispatcherConfig::from_manifest(&manifest))
            .handler("echo", |input, _ctx| async move { Ok(input) })
            .build()
    }

    #[tokio::test]
    async fn test_echo_scenario() {
        let resp = echo_dispatcher()
            .dispatch(&RequestEnvelope::action("echo", json!(42)))
            .await;
        assert_eq!(resp, DispatchResponse::ok(json!(42)));
        assert_eq!(
            serde_json::to_string(&resp.envelope).unwrap(),
            r#"{"data":42}"#
        );
    }

    #[tokio::test]
    async fn test_missing_action_scenario() {
        let resp = echo_dispatcher()
            .dispatch(&RequestEnvelope::new(json!({ "action": "missing" })))
            .await;
        assert_eq!(resp.status, 400);
        assert_eq!(
            serde_json::to_string(&resp.envelope).unwrap(),
            r#"{"error":"Unknown action \"missing\""}"#
        );
    }

    #[tokio::test]
    async fn test_disabled_action_scenario() {
        let manifest = ConfigLoader::load_from_str(
            "[actions.greet]\ndisabled = true\n",
            ConfigFormat::Toml,
        )
        .unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let dispatcher: Dispatcher = Dispatcher::builder()
            .config(DispatcherConfig::from_manifest(&manifest))
            .handler("greet", move |input, _ctx| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move { Ok(input) }
            })
            .build();

        let resp = dispatcher
            .dispatch(&RequestEnvelope::action("greet", json!("x")))
            .await;
        assert_eq!(resp, DispatchResponse::error(400, "Action \"greet\" not enabled"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_validation_order() {
        let dispatcher = echo_dispatcher();
        let cases = [
            (RequestEnvelope::empty(), "No body"),
            (RequestEnvelope::new(json!({ "input": 1 })), "No action"),
            (
                RequestEnvelope::new(json!({ "action": "nope", "input": 1 })),
                "Unknown action \"nope\"",
            ),
        ];
        for (request, expected) in cases {
            let resp = dispatcher.dispatch(&request).await;
            assert_eq!(resp, DispatchResponse::error(400, expected));
        }
        assert_eq!(dispatcher.metrics().rejected(), 3);
    }

    #[tokio::test]
    async fn test_before_handler_after_composition() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (lb, lh, la) = (Arc::clone(&log), Arc::clone(&log), Arc::clone(&log));

        let before = handler_fn(move |input: Value, _ctx: ActionContext<()>| {
            lb.lock().unwrap().push("b");
            async move { Ok(json!(format!("b({})", input.as_str().unwrap()))) }
        });
        let after = handler_fn(move |input: Value, _ctx: ActionContext<()>| {
            la.lock().unwrap().push("a");
            async move { Ok(json!(format!("a({})", input.as_str().unwrap()))) }
        });

        let dispatcher = Dispatcher::builder()
            .handler("h", move |input: Value, _ctx| {
                lh.lock().unwrap().push("h");
                async move { Ok(json!(format!("h({})", input.as_str().unwrap()))) }
            })
            .action("h", ActionConfig::enabled().with_before(before).with_after(after))
            .build();

        let resp = dispatcher
            .dispatch(&RequestEnvelope::action("h", json!("i")))
            .await;
        assert_eq!(resp, DispatchResponse::ok(json!("a(h(b(i)))")));
        assert_eq!(*log.lock().unwrap(), vec!["b", "h", "a"]);
    }

    #[tokio::test]
    async fn test_handler_error_skips_after() {
        let after_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&after_calls);
        let after = handler_fn(move |input: Value, _ctx: ActionContext<()>| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok(input) }
        });

        let dispatcher = Dispatcher::builder()
            .handler("h", |_input, _ctx| async move {
                Err(anyhow::anyhow!("handler blew up"))
            })
            .action("h", ActionConfig::enabled().with_after(after))
            .build();

        let mut responder = MemoryResponder::new("mem");
        let resp = dispatcher
            .handle(&RequestEnvelope::action("h", Value::Null), &mut responder)
            .await
            .unwrap();

        assert_eq!(resp, DispatchResponse::error(500, "handler blew up"));
        assert_eq!(responder.responses(), &[resp]);
        assert_eq!(after_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_store_init_runs_factory_once() {
        let factory_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&factory_calls);

        let dispatcher = Arc::new(
            Dispatcher::builder()
                .store(StoreSource::factory(move || {
                    let counter = Arc::clone(&counter);
                    async move {
                        let id = counter.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(25)).await;
                        Ok(format!("store-{id}"))
                    }
                }))
                .handler("store", |_input, ctx: ActionContext<String>| async move {
                    let store = ctx.require_store()?;
                    Ok(json!({ "value": store.as_str(), "ptr": Arc::as_ptr(store) as usize }))
                })
                .action("store", ActionConfig::enabled())
                .build(),
        );

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let dispatcher = Arc::clone(&dispatcher);
                tokio::spawn(async move {
                    dispatcher
                        .dispatch(&RequestEnvelope::action("store", Value::Null))
                        .await
                })
            })
            .collect();

        let responses: Vec<DispatchResponse> = futures::future::join_all(tasks)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(factory_calls.load(Ordering::SeqCst), 1);
        let first = responses[0].envelope.data().cloned().unwrap();
        assert_eq!(first["value"], json!("store-0"));
        assert!(responses
            .iter()
            .all(|r| r.envelope.data() == Some(&first)));
        assert!(dispatcher.store_initialized());
    }

    #[tokio::test]
    async fn test_writer_responder_end_to_end() {
        let dispatcher = echo_dispatcher();
        let mut responder = WriterResponder::new("buf", Vec::new());

        for raw in [r#"{"action":"echo","input":"hi"}"#, ""] {
            let request = RequestEnvelope::from_json(raw).unwrap();
            dispatcher.handle(&request, &mut responder).await.unwrap();
        }

        let out = String::from_utf8(responder.into_inner()).unwrap();
        assert_eq!(
            out,
            "{\"status\":200,\"body\":{\"data\":\"hi\"}}\n{\"status\":400,\"body\":{\"error\":\"No body\"}}\n"
        );
    }

    #[tokio::test]
    async fn test_namespace_feeds_store() {
        let vars = [("APP_NAME", "shop"), ("DEPLOY_ENV", "preview"), ("DEPLOY_BRANCH", "fix/cart")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let namespace = config_loader::namespace(&vars);

        let dispatcher = Dispatcher::builder()
            .store(StoreSource::value(namespace))
            .handler("ns", |_input, ctx: ActionContext<String>| async move {
                Ok(json!(ctx.require_store()?.as_str()))
            })
            .action("ns", ActionConfig::enabled())
            .build();

        let resp = dispatcher
            .dispatch(&RequestEnvelope::action("ns", Value::Null))
            .await;
        assert_eq!(resp, DispatchResponse::ok(json!("shop:preview:fix-cart")));
    }
}
