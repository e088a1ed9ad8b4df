//! 翻译流程集成测试
//!
//! 覆盖请求编排（限流、缓存、分块、失败中止）以及豆包客户端的 HTTP 行为

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{ScriptedProvider, TestServiceBuilder};
use doubao_translator::translation::{
    cache_key, ErrorCategory, TranslationError, TranslationOutcome,
};

#[tokio::test]
async fn test_happy_path_then_cache_hit() {
    let provider = ScriptedProvider::new();
    let service = TestServiceBuilder::default()
        .chunk_size(10)
        .build(provider.clone());

    let text = "first para\n\nsecond one\n\nthird";
    let outcome = service.translate(text, "en", "fr").await.unwrap();

    assert_eq!(provider.calls(), vec!["first para", "second one", "third"]);
    assert_eq!(
        outcome,
        TranslationOutcome {
            text: "FIRST PARA\nSECOND ONE\nTHIRD".to_string(),
            cached: false,
        }
    );

    let again = service.translate(text, "en", "fr").await.unwrap();
    assert_eq!(again.text, outcome.text);
    assert!(again.cached);
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn test_different_languages_are_cached_separately() {
    let provider = ScriptedProvider::new();
    let service = TestServiceBuilder::default().build(provider.clone());

    service.translate("hello", "en", "fr").await.unwrap();
    let other = service.translate("hello", "en", "de").await.unwrap();

    assert!(!other.cached);
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn test_failure_on_second_chunk_aborts_request() {
    let provider = ScriptedProvider::failing_on(1);
    let service = TestServiceBuilder::default()
        .chunk_size(5)
        .build(provider.clone());

    let text = "aaaaa\n\nbbbbb\n\nccccc";
    let err = service.translate(text, "en", "fr").await.unwrap_err();

    assert!(matches!(err, TranslationError::ProviderFailure(ref msg) if msg.contains("500")));
    assert_eq!(err.category(), ErrorCategory::Upstream);
    // 第三块不会被请求
    assert_eq!(provider.calls(), vec!["aaaaa", "bbbbb"]);
    assert_eq!(service.cache().get(&cache_key(text, "en", "fr")), None);
    assert_eq!(service.cache().size(), 0);
}

#[tokio::test]
async fn test_rate_limit_denies_without_provider_call() {
    let provider = ScriptedProvider::new();
    let service = TestServiceBuilder::default()
        .burst(2)
        .refill_interval(Duration::from_millis(100))
        .build(provider.clone());

    service.translate("one", "", "fr").await.unwrap();
    service.translate("two", "", "fr").await.unwrap();
    assert_eq!(
        service.translate("three", "", "fr").await,
        Err(TranslationError::RateLimitExceeded)
    );
    assert_eq!(provider.call_count(), 2);

    tokio::time::sleep(Duration::from_millis(150)).await;
    service.translate("three", "", "fr").await.unwrap();
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn test_input_too_large_is_rejected() {
    let provider = ScriptedProvider::new();
    let service = TestServiceBuilder::default()
        .max_text_length(5000)
        .build(provider.clone());

    let err = service
        .translate(&"字".repeat(5001), "", "en")
        .await
        .unwrap_err();
    assert_eq!(err, TranslationError::InputTooLarge { length: 5001, max: 5000 });

    // 按字符计数，5000 个多字节字符仍然允许
    service.translate(&"字".repeat(5000), "", "en").await.unwrap();
    assert_eq!(provider.call_count(), 7);
}

#[tokio::test]
async fn test_full_cache_does_not_fail_request() {
    let provider = ScriptedProvider::new();
    let service = TestServiceBuilder::default()
        .cache_max_size(1)
        .build(provider.clone());

    service.translate("first", "", "fr").await.unwrap();
    let second = service.translate("second", "", "fr").await.unwrap();
    assert_eq!(second.text, "SECOND");
    assert!(!second.cached);

    let repeated = service.translate("second", "", "fr").await.unwrap();
    assert!(!repeated.cached);
    assert_eq!(provider.call_count(), 3);
    assert_eq!(service.cache().stats().rejected, 2);
}

#[tokio::test]
async fn test_provider_timeout_is_upstream_failure() {
    let provider = ScriptedProvider::slow(Duration::from_millis(300));
    let service = TestServiceBuilder::default()
        .call_timeout(Duration::from_millis(50))
        .build(provider.clone());

    let err = service.translate("slow", "", "fr").await.unwrap_err();
    assert!(matches!(err, TranslationError::TimeoutError(_)));
    assert_eq!(err.category(), ErrorCategory::Upstream);
    assert_eq!(service.cache().size(), 0);
}

#[tokio::test]
async fn test_long_paragraph_is_hard_split() {
    let provider = ScriptedProvider::new();
    let service = TestServiceBuilder::default().build(provider.clone());

    let text = "x".repeat(2 * 800 + 5);
    let outcome = service.translate(&text, "", "fr").await.unwrap();

    let lengths: Vec<usize> = provider.calls().iter().map(|c| c.chars().count()).collect();
    assert_eq!(lengths, vec![800, 800, 5]);
    assert_eq!(outcome.text, ["X".repeat(800), "X".repeat(800), "X".repeat(5)].join("\n"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_share_cache() {
    let provider = ScriptedProvider::new();
    let service = Arc::new(TestServiceBuilder::default().build(provider.clone()));

    let tasks: Vec<_> = (0..20)
        .map(|i| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .translate(&format!("text {}", i % 5), "", "fr")
                    .await
                    .unwrap()
            })
        })
        .collect();

    for (i, result) in futures::future::join_all(tasks).await.into_iter().enumerate() {
        assert_eq!(result.unwrap().text, format!("TEXT {}", i % 5));
    }

    assert_eq!(service.cache().size(), 5);
    let stats = service.get_stats().snapshot();
    assert_eq!(stats.requests, 20);
    assert_eq!(stats.cache_hits + stats.cache_misses, 20);
}

#[cfg(feature = "web")]
mod doubao_client {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    use doubao_translator::translation::{
        DoubaoClient, ProviderConfig, ProviderError, TranslationProvider,
    };

    #[derive(Default)]
    struct MockState {
        hits: AtomicUsize,
        /// 前几次请求返回 503
        fail_first: usize,
        delay: Option<Duration>,
        last_auth: Mutex<Option<String>>,
        last_body: Mutex<Option<Value>>,
    }

    async fn responses(
        State(state): State<Arc<MockState>>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, String) {
        let hit = state.hits.fetch_add(1, Ordering::SeqCst);
        *state.last_auth.lock().unwrap() = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        *state.last_body.lock().unwrap() = Some(body.clone());

        if let Some(delay) = state.delay {
            tokio::time::sleep(delay).await;
        }

        if hit < state.fail_first {
            return (StatusCode::SERVICE_UNAVAILABLE, "busy".to_string());
        }

        let text = body["input"][0]["content"][0]["text"]
            .as_str()
            .unwrap_or_default()
            .to_uppercase();
        let reply = json!({
            "status": "completed",
            "output": [{
                "type": "message",
                "role": "assistant",
                "content": [{"type": "output_text", "text": text}]
            }]
        });
        (StatusCode::OK, reply.to_string())
    }

    async fn spawn_mock(state: Arc<MockState>) -> String {
        let app = Router::new()
            .route("/api/v3/responses", post(responses))
            .with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api/v3/responses", addr)
    }

    fn client(url: String, timeout: Duration, max_retries: u32) -> DoubaoClient {
        DoubaoClient::new(ProviderConfig {
            timeout,
            max_retries,
            ..ProviderConfig::new("test-key", url)
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_sends_bearer_auth_and_request_shape() {
        let state = Arc::new(MockState::default());
        let url = spawn_mock(state.clone()).await;
        let client = client(url, Duration::from_secs(5), 0);

        let result = client.translate_chunk("hello", "", "zh").await.unwrap();
        assert_eq!(result, "HELLO");

        assert_eq!(
            state.last_auth.lock().unwrap().as_deref(),
            Some("Bearer test-key")
        );
        let body = state.last_body.lock().unwrap().clone().unwrap();
        assert_eq!(body["model"], "doubao-seed-translation-250915");
        assert_eq!(body["input"][0]["role"], "user");
        assert_eq!(body["input"][0]["content"][0]["type"], "input_text");
        let options = &body["input"][0]["content"][0]["translation_options"];
        assert_eq!(options["target_language"], "zh");
        assert!(options.get("source_language").is_none());
    }

    #[tokio::test]
    async fn test_non_200_is_status_error() {
        let state = Arc::new(MockState {
            fail_first: usize::MAX,
            ..MockState::default()
        });
        let url = spawn_mock(state.clone()).await;
        let client = client(url, Duration::from_secs(5), 0);

        let err = client.translate_chunk("hello", "en", "zh").await.unwrap_err();
        assert_eq!(
            err,
            ProviderError::Status {
                status: 503,
                body: "busy".to_string()
            }
        );
        assert_eq!(state.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_retryable_status() {
        let state = Arc::new(MockState {
            fail_first: 1,
            ..MockState::default()
        });
        let url = spawn_mock(state.clone()).await;
        let client = client(url, Duration::from_secs(5), 2);

        let result = client.translate_chunk("again", "en", "zh").await.unwrap();
        assert_eq!(result, "AGAIN");
        assert_eq!(state.hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_http_timeout() {
        let state = Arc::new(MockState {
            delay: Some(Duration::from_millis(500)),
            ..MockState::default()
        });
        let url = spawn_mock(state).await;
        let client = client(url, Duration::from_millis(100), 0);

        let err = client.translate_chunk("late", "en", "zh").await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        // 绑定后立即释放，得到一个没有监听者的端口
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client(
            format!("http://{}/api/v3/responses", addr),
            Duration::from_secs(2),
            0,
        );
        let err = client.translate_chunk("x", "", "zh").await.unwrap_err();
        assert!(err.is_retryable());
    }
}
