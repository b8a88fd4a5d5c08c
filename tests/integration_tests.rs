//! Integration tests for the nyaai library.
//! These tests run the client and the proxy against a stub provider on
//! localhost; no credential or network access is needed.

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode, header};
    use axum::response::{IntoResponse, Json, Response};
    use axum::routing::post;
    use serde_json::{Value, json};

    use nyaai::chat::{ChatConfig, ChatSession, Notification, SubmitOutcome};
    use nyaai::proxy::{ProxyConfig, ProxyServer};
    use nyaai::{
        ChatCompletionRequest, ChatMessageParam, CompletionClient, ContextWindow, KnownModel,
        Model,
    };

    #[derive(Clone, Default)]
    struct Seen {
        requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    }

    impl Seen {
        fn all(&self) -> Vec<(Option<String>, Value)> {
            self.requests.lock().unwrap().clone()
        }
    }

    async fn spawn(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        addr
    }

    async fn answering(State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let turns = body["messages"].as_array().map_or(0, Vec::len);
        seen.requests.lock().unwrap().push((authorization, body));
        Json(json!({
            "id": "chatcmpl-1",
            "model": "llama-3.3-70b-versatile",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": format!("**Step 1.** File an FIR ({turns} turns)")},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }))
        .into_response()
    }

    async fn stub_provider() -> (SocketAddr, Seen) {
        let seen = Seen::default();
        let app = Router::new()
            .route("/v1/chat/completions", post(answering))
            .with_state(seen.clone());
        (spawn(app).await, seen)
    }

    async fn failing_provider(status: StatusCode, body: Value) -> SocketAddr {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move || {
                let body = body.clone();
                async move { (status, [("retry-after", "7")], Json(body)).into_response() }
            }),
        );
        spawn(app).await
    }

    async fn raw_provider(body: &'static str) -> SocketAddr {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move || async move { ([(header::CONTENT_TYPE, "application/json")], body) }),
        );
        spawn(app).await
    }

    fn client_for(addr: SocketAddr, api_key: Option<&str>) -> CompletionClient {
        CompletionClient::with_options(
            api_key.map(str::to_string),
            Some(&format!("http://{addr}/v1")),
            None,
        )
        .unwrap()
    }

    fn request(text: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: Model::Known(KnownModel::Llama3370bVersatile),
            messages: vec![
                ChatMessageParam::system("You are a legal assistant."),
                ChatMessageParam::user(text),
            ],
            temperature: 0.7,
            max_tokens: 1024,
            stream: false,
        }
    }

    #[tokio::test]
    async fn test_client_round_trip() {
        let (addr, seen) = stub_provider().await;
        let client = client_for(addr, Some("direct-key"));

        let completion = client.send(&request("My wallet was stolen")).await.unwrap();
        assert_eq!(completion.usage.unwrap().total_tokens, 15);
        assert_eq!(
            completion.into_text().unwrap(),
            "**Step 1.** File an FIR (2 turns)"
        );

        let seen = seen.all();
        assert_eq!(seen.len(), 1);
        let (authorization, body) = &seen[0];
        assert_eq!(authorization.as_deref(), Some("Bearer direct-key"));
        assert_eq!(body["model"], "llama-3.3-70b-versatile");
        assert_eq!(body["stream"], false);
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["messages"][1]["content"], "My wallet was stolen");
    }

    #[tokio::test]
    async fn test_error_statuses_are_mapped() {
        let addr = failing_provider(
            StatusCode::TOO_MANY_REQUESTS,
            json!({"error": {"message": "slow down", "type": "rate_limit_error"}}),
        )
        .await;
        let err = client_for(addr, None).send(&request("hi")).await.unwrap_err();
        assert!(err.is_rate_limit());
        assert_eq!(err.status_code(), Some(429));

        let addr = failing_provider(
            StatusCode::UNAUTHORIZED,
            json!({"error": {"message": "invalid api key", "type": "invalid_request_error"}}),
        )
        .await;
        let err = client_for(addr, None).send(&request("hi")).await.unwrap_err();
        assert!(err.is_authentication());

        let addr = failing_provider(StatusCode::SERVICE_UNAVAILABLE, json!("down")).await;
        let err = client_for(addr, None).send(&request("hi")).await.unwrap_err();
        assert!(err.is_server_error());
    }

    #[tokio::test]
    async fn test_malformed_replies() {
        let addr = raw_provider(r#"{"id": "x", "choices": []}"#).await;
        let completion = client_for(addr, None).send(&request("hi")).await.unwrap();
        assert!(completion.into_text().unwrap_err().is_malformed());

        let addr = raw_provider("this is not json").await;
        let err = client_for(addr, None).send(&request("hi")).await.unwrap_err();
        assert!(err.is_malformed());
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = client_for(addr, None).send(&request("hi")).await.unwrap_err();
        assert!(err.is_connection());
    }

    #[tokio::test]
    async fn test_session_through_proxy() {
        let (upstream, seen) = stub_provider().await;
        let config = ProxyConfig::new("upstream-secret")
            .unwrap()
            .with_bind("127.0.0.1:0".parse().unwrap())
            .with_upstream(&format!("http://{upstream}/v1/"))
            .unwrap()
            .with_model("llama-3.1-8b-instant");
        let proxy = ProxyServer::start(&config).await.unwrap();

        let chat_config = ChatConfig::new()
            .with_base_url(format!("http://{}/v1/", proxy.addr()))
            .with_context_window(ContextWindow::LastMessages(2));
        let client =
            CompletionClient::with_options(None, Some(&chat_config.base_url), None).unwrap();
        let mut session = ChatSession::new(client, chat_config);

        for question in ["What should I do if my wallet is stolen?", "And my PAN card?", "Thanks"] {
            let outcome = session.submit(question).await;
            assert!(matches!(outcome, SubmitOutcome::Answered(_)), "{outcome:?}");
        }
        assert_eq!(session.message_count(), 6);

        let seen = seen.all();
        assert_eq!(seen.len(), 3);
        for (authorization, body) in &seen {
            assert_eq!(authorization.as_deref(), Some("Bearer upstream-secret"));
            assert_eq!(body["model"], "llama-3.1-8b-instant");
            assert_eq!(body["messages"][0]["role"], "system");
        }
        // system + last two history messages + new user turn
        assert_eq!(seen[2].1["messages"].as_array().unwrap().len(), 4);
        assert_eq!(seen[2].1["messages"][1]["content"], "And my PAN card?");

        let reply = &session.store().messages()[5];
        assert_eq!(reply.content, "**Step 1.** File an FIR (4 turns)");
    }

    #[tokio::test]
    async fn test_proxy_relays_bad_request() {
        let upstream = failing_provider(
            StatusCode::BAD_REQUEST,
            json!({"error": {"message": "max_tokens is too large", "type": "invalid_request_error", "param": "max_tokens"}}),
        )
        .await;
        let config = ProxyConfig::new("upstream-secret")
            .unwrap()
            .with_bind("127.0.0.1:0".parse().unwrap())
            .with_upstream(&format!("http://{upstream}/v1/"))
            .unwrap();
        let proxy = ProxyServer::start(&config).await.unwrap();

        let err = client_for(proxy.addr(), None)
            .send(&request("hi"))
            .await
            .unwrap_err();
        assert!(err.is_bad_request());
        assert!(!err.is_server_error());
        assert_eq!(err.status_code(), Some(400));
    }

    #[tokio::test]
    async fn test_proxy_relays_upstream_errors() {
        let upstream = failing_provider(
            StatusCode::UNAUTHORIZED,
            json!({"error": {"message": "invalid api key", "type": "invalid_request_error"}}),
        )
        .await;
        let config = ProxyConfig::new("wrong-secret")
            .unwrap()
            .with_bind("127.0.0.1:0".parse().unwrap())
            .with_upstream(&format!("http://{upstream}/v1/"))
            .unwrap();
        let proxy = ProxyServer::start(&config).await.unwrap();
        let client = client_for(proxy.addr(), None);

        let err = client.send(&request("hi")).await.unwrap_err();
        assert!(err.is_authentication());
        assert_eq!(err.status_code(), Some(401));

        let chat_config = ChatConfig::new().with_base_url(format!("http://{}/v1/", proxy.addr()));
        let mut session = ChatSession::new(client, chat_config);
        assert_eq!(
            session.submit("hello").await,
            SubmitOutcome::Failed(Notification::completion_failed())
        );
        assert_eq!(session.message_count(), 1);
        assert!(!session.store().is_in_flight());
    }
}
