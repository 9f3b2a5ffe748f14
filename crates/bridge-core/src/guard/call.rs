//! Guarded outbound calls.

use async_trait::async_trait;
use thiserror::Error;

use super::scan::{validate_no_pii, Denylist};
use super::value::Value;

/// An outbound body contained denylisted keys. Carries every offending path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("PII keys not allowed in cloud requests: {}", .forbidden_key_paths.join(", "))]
pub struct PiiViolationError {
    pub forbidden_key_paths: Vec<String>,
}

/// A body that claims to be JSON could not be parsed, so it was not scanned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Outbound JSON body could not be scanned: {reason}")]
pub struct UnscannableBodyError {
    pub reason: String,
}

/// Failure of a guarded call.
#[derive(Debug, Error)]
pub enum GuardError<E: std::error::Error + 'static> {
    /// Blocked before dispatch; the transport was never invoked
    #[error(transparent)]
    Violation(#[from] PiiViolationError),

    /// Blocked before dispatch: the body looked like JSON but did not parse
    #[error(transparent)]
    Unscannable(#[from] UnscannableBodyError),

    /// The transport itself failed
    #[error("Outbound request failed: {0}")]
    Transport(#[source] E),
}

/// Guard configuration. Enabled unless explicitly turned off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardPolicy {
    pub enabled: bool,
    pub denylist: Denylist,
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            denylist: Denylist::default(),
        }
    }
}

impl GuardPolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Method, headers and optional body of an outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            headers: Vec::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post_json(body: impl Into<String>) -> Self {
        Self {
            method: "POST".to_string(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body.into()),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// True when the request says its body is JSON, or the body starts like a
/// JSON object or array.
fn declares_json(options: &RequestOptions, body: &str) -> bool {
    let trimmed = body.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return true;
    }
    options.headers.iter().any(|(name, value)| {
        name.eq_ignore_ascii_case("content-type") && value.to_ascii_lowercase().contains("json")
    })
}

/// The application's raw network primitive.
#[async_trait]
pub trait Transport: Send + Sync {
    type Response: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    async fn send(&self, url: &str, options: RequestOptions)
        -> Result<Self::Response, Self::Error>;
}

/// Wraps a [`Transport`] so no request carrying student identity keys leaves
/// the process.
#[derive(Debug, Clone)]
pub struct GuardedClient<T> {
    transport: T,
    policy: GuardPolicy,
}

impl<T: Transport> GuardedClient<T> {
    pub fn new(transport: T, policy: GuardPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &GuardPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run the guard without sending anything.
    ///
    /// Bodiless requests and plain non-JSON bodies pass. A body that is
    /// declared or shaped as JSON but fails to parse (malformed, or nested
    /// past the parser's depth limit) is blocked.
    pub fn check(&self, url: &str, options: &RequestOptions) -> Result<(), GuardError<T::Error>> {
        if !self.policy.enabled {
            return Ok(());
        }
        let Some(body) = options.body.as_deref() else {
            return Ok(());
        };
        let value = match Value::parse_json(body) {
            Ok(value) => value,
            Err(err) if declares_json(options, body) => {
                tracing::error!(url, error = %err, "PII guard blocked unscannable JSON body");
                return Err(UnscannableBodyError {
                    reason: err.to_string(),
                }
                .into());
            }
            Err(_) => {
                tracing::debug!(url, "outbound body is not JSON; not scanned");
                return Ok(());
            }
        };

        validate_no_pii(&value, &self.policy.denylist).map_err(|violation| {
            tracing::error!(
                url,
                violations = ?violation.forbidden_key_paths,
                "PII guard blocked outbound request"
            );
            GuardError::Violation(violation)
        })
    }

    /// Scan, then dispatch. A violating request is never handed to the
    /// transport.
    pub async fn call(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<T::Response, GuardError<T::Error>> {
        self.check(url, &options)?;
        self.transport
            .send(url, options)
            .await
            .map_err(GuardError::Transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default, Clone)]
    struct CountingTransport {
        calls: Arc<AtomicUsize>,
    }

    impl CountingTransport {
        fn count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for CountingTransport {
        type Response = String;
        type Error = io::Error;

        async fn send(&self, url: &str, options: RequestOptions) -> Result<String, io::Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{} {}", options.method, url))
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        type Response = ();
        type Error = io::Error;

        async fn send(&self, _url: &str, _options: RequestOptions) -> Result<(), io::Error> {
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "offline"))
        }
    }

    const URL: &str = "https://api.example.test/submissions";

    #[tokio::test]
    async fn test_violation_never_reaches_transport() {
        let transport = CountingTransport::default();
        let client = GuardedClient::new(transport.clone(), GuardPolicy::default());
        let body = r#"{"students":[{"name":"a"},{"studentName":"b"}],"student_id":"u1"}"#;

        let err = client.call(URL, RequestOptions::post_json(body)).await.unwrap_err();

        assert_eq!(transport.count(), 0);
        match err {
            GuardError::Violation(v) => assert_eq!(
                v.forbidden_key_paths,
                vec!["students.0.name", "students.1.studentName"]
            ),
            other => panic!("expected violation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_clean_body_passes_through() {
        let transport = CountingTransport::default();
        let client = GuardedClient::new(transport.clone(), GuardPolicy::default());

        let response = client
            .call(URL, RequestOptions::post_json(r#"{"student_id":"u1","score":9}"#))
            .await
            .unwrap();

        assert_eq!(response, format!("POST {}", URL));
        assert_eq!(transport.count(), 1);
    }

    #[tokio::test]
    async fn test_bodiless_and_non_json_pass_through() {
        let transport = CountingTransport::default();
        let client = GuardedClient::new(transport.clone(), GuardPolicy::default());

        client.call(URL, RequestOptions::get()).await.unwrap();
        let form = RequestOptions {
            method: "POST".to_string(),
            headers: Vec::new(),
            body: Some("name=Ada".to_string()),
        };
        client.call(URL, form).await.unwrap();

        assert_eq!(transport.count(), 2);
    }

    #[tokio::test]
    async fn test_deeply_nested_body_is_blocked() {
        let transport = CountingTransport::default();
        let client = GuardedClient::new(transport.clone(), GuardPolicy::default());
        let body = format!(
            "{}{}{}",
            "{\"a\":".repeat(200),
            r#"{"name":"Ada"}"#,
            "}".repeat(200)
        );

        let err = client.call(URL, RequestOptions::post_json(body)).await.unwrap_err();

        assert!(matches!(err, GuardError::Unscannable(_)));
        assert_eq!(transport.count(), 0);
    }

    #[tokio::test]
    async fn test_nesting_within_limit_is_still_scanned() {
        let transport = CountingTransport::default();
        let client = GuardedClient::new(transport.clone(), GuardPolicy::default());
        let body = format!(
            "{}{}{}",
            "{\"a\":".repeat(20),
            r#"{"name":"Ada"}"#,
            "}".repeat(20)
        );

        let err = client.call(URL, RequestOptions::post_json(body)).await.unwrap_err();

        match err {
            GuardError::Violation(v) => {
                assert_eq!(v.forbidden_key_paths, vec![format!("{}name", "a.".repeat(20))])
            }
            other => panic!("expected violation, got {:?}", other),
        }
        assert_eq!(transport.count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_json_is_blocked() {
        let transport = CountingTransport::default();
        let client = GuardedClient::new(transport.clone(), GuardPolicy::default());

        let truncated = RequestOptions {
            method: "POST".to_string(),
            headers: Vec::new(),
            body: Some(r#"{"name":"Ada""#.to_string()),
        };
        assert!(matches!(
            client.call(URL, truncated).await,
            Err(GuardError::Unscannable(_))
        ));

        // Declared JSON that is not JSON at all.
        let declared = RequestOptions::post_json("name=Ada");
        assert!(matches!(
            client.call(URL, declared).await,
            Err(GuardError::Unscannable(_))
        ));
        assert_eq!(transport.count(), 0);
    }

    #[tokio::test]
    async fn test_disabled_policy_does_not_scan() {
        let transport = CountingTransport::default();
        let client = GuardedClient::new(transport.clone(), GuardPolicy::disabled());

        client
            .call(URL, RequestOptions::post_json(r#"{"name":"Ada"}"#))
            .await
            .unwrap();

        assert_eq!(transport.count(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_is_wrapped() {
        let client = GuardedClient::new(FailingTransport, GuardPolicy::default());
        let err = client.call(URL, RequestOptions::get()).await.unwrap_err();
        assert!(matches!(err, GuardError::Transport(_)));
    }

    #[test]
    fn test_violation_message_lists_paths() {
        let err = PiiViolationError {
            forbidden_key_paths: vec!["name".to_string(), "student.localId".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "PII keys not allowed in cloud requests: name, student.localId"
        );
    }

    #[test]
    fn test_check_uses_configured_denylist() {
        let policy = GuardPolicy {
            enabled: true,
            denylist: Denylist::default().with_extra(["guardian_email"]),
        };
        let client = GuardedClient::new(CountingTransport::default(), policy);
        let options = RequestOptions::post_json(r#"{"guardian_email":"a@b.c"}"#)
            .with_header("x-request-id", "1");
        assert!(client.check(URL, &options).is_err());
    }
}
