//! Alert dispatcher and its staged builder.

use std::{fmt, sync::Arc};

use chrono::Local;
use tokio::task::JoinHandle;

use crate::{
    config::{validate_token, AlertConfig},
    domain::{AlertRequest, Metadata, Severity},
    errors::Error,
    formatting::format_alert,
    messaging::{
        port::MessagingPort,
        types::{RenderMode, SendOptions},
    },
    tag::{derive_project_tag, ProjectTag},
    Result,
};

/// Called with every delivery error the dispatcher discards.
pub type DeliveryFailureHook = Arc<dyn Fn(&Error) + Send + Sync>;

/// Formats alerts for one project and sends them to one chat thread.
///
/// Delivery is best-effort: send failures never reach the caller. The only
/// error a send method can return is a local formatting error.
#[derive(Clone)]
pub struct AlertBot {
    config: AlertConfig,
    tag: ProjectTag,
    messenger: Arc<dyn MessagingPort>,
    on_failure: Option<DeliveryFailureHook>,
}

impl fmt::Debug for AlertBot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlertBot")
            .field("config", &self.config)
            .field("tag", &self.tag)
            .field("on_failure", &self.on_failure.is_some())
            .finish_non_exhaustive()
    }
}

impl AlertBot {
    /// Validate `token` and `config`, derive the project tag, then create the
    /// messaging client via `connect`. `connect` is not called if validation fails.
    pub fn new<F>(token: &str, config: AlertConfig, connect: F) -> Result<Self>
    where
        F: FnOnce(&str) -> Arc<dyn MessagingPort>,
    {
        validate_token(token)?;
        let config = config.validate()?;
        let tag = derive_project_tag(&config.display_name);
        let messenger = connect(token);

        Ok(Self {
            config,
            tag,
            messenger,
            on_failure: None,
        })
    }

    /// Install a callback that observes discarded delivery errors.
    pub fn on_delivery_failure(mut self, hook: impl Fn(&Error) + Send + Sync + 'static) -> Self {
        self.on_failure = Some(Arc::new(hook));
        self
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    pub fn project_tag(&self) -> &ProjectTag {
        &self.tag
    }

    pub async fn error(&self, message: &str, metadata: Option<&Metadata>) -> Result<()> {
        self.send_alert(request(Severity::Error, message, metadata))
            .await
    }

    pub async fn warning(&self, message: &str, metadata: Option<&Metadata>) -> Result<()> {
        self.send_alert(request(Severity::Warning, message, metadata))
            .await
    }

    pub async fn log(&self, message: &str, metadata: Option<&Metadata>) -> Result<()> {
        self.send_alert(request(Severity::Log, message, metadata))
            .await
    }

    /// Render `req` with the current local time and send it once.
    pub async fn send_alert(&self, req: AlertRequest) -> Result<()> {
        let body = format_alert(&req, &self.tag, &Local::now())?;
        let options = SendOptions {
            render_mode: RenderMode::Html,
            thread_id: self.config.thread_id,
        };

        if let Err(e) = self
            .messenger
            .send(&self.config.destination_id, &body, options)
            .await
        {
            self.report_failure(&e);
        }
        Ok(())
    }

    /// Send an alert on a background task; the caller may drop the handle.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn(
        &self,
        severity: Severity,
        message: impl Into<String>,
        metadata: Option<Metadata>,
    ) -> JoinHandle<Result<()>> {
        let bot = self.clone();
        let req = AlertRequest {
            severity,
            message: message.into(),
            metadata,
        };
        tokio::spawn(async move { bot.send_alert(req).await })
    }

    fn report_failure(&self, err: &Error) {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            destination = %self.config.destination_id,
            thread_id = self.config.thread_id,
            "alert delivery failed: {err}"
        );

        if let Some(hook) = &self.on_failure {
            hook(err);
        }
    }
}

fn request(severity: Severity, message: &str, metadata: Option<&Metadata>) -> AlertRequest {
    AlertRequest {
        severity,
        message: message.to_string(),
        metadata: metadata.cloned(),
    }
}

/// Staging area for a bot: holds the token and, once set, the config.
///
/// Nothing is validated until [`AlertBotBuilder::build`].
#[derive(Clone, Debug)]
pub struct AlertBotBuilder {
    token: String,
    config: Option<AlertConfig>,
}

impl AlertBotBuilder {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            config: None,
        }
    }

    pub fn config(mut self, config: AlertConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build<F>(self, connect: F) -> Result<AlertBot>
    where
        F: FnOnce(&str) -> Arc<dyn MessagingPort>,
    {
        let Some(config) = self.config else {
            return Err(Error::Config("bot configuration must be set".to_string()));
        };
        AlertBot::new(&self.token, config, connect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Sent {
        destination: String,
        body: String,
        options: SendOptions,
    }

    #[derive(Default)]
    struct FakeMessenger {
        fail: bool,
        sends: Mutex<Vec<Sent>>,
    }

    impl FakeMessenger {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn sent(&self) -> Vec<Sent> {
            self.sends.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessagingPort for FakeMessenger {
        async fn send(&self, destination: &str, body: &str, options: SendOptions) -> Result<()> {
            self.sends.lock().unwrap().push(Sent {
                destination: destination.to_string(),
                body: body.to_string(),
                options,
            });
            if self.fail {
                return Err(Error::External("telegram error: chat not found".to_string()));
            }
            Ok(())
        }
    }

    fn test_config() -> AlertConfig {
        AlertConfig::new("-1001234567890", 7, "Payments API")
    }

    fn bot_with(messenger: Arc<FakeMessenger>) -> AlertBot {
        AlertBot::new("123:abc", test_config(), move |_| messenger as Arc<dyn MessagingPort>).unwrap()
    }

    fn meta(v: serde_json::Value) -> Metadata {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn derives_tag_once_at_construction() {
        let bot = bot_with(Arc::new(FakeMessenger::default()));
        assert_eq!(bot.project_tag().as_str(), "payments_api");
        assert_eq!(bot.config(), &test_config());
    }

    #[test]
    fn invalid_config_never_connects() {
        let connects = AtomicUsize::new(0);
        let connect = |_: &str| -> Arc<dyn MessagingPort> {
            connects.fetch_add(1, Ordering::SeqCst);
            Arc::new(FakeMessenger::default())
        };

        let bad = AlertConfig::new("@alerts", 0, "Payments");
        assert!(matches!(
            AlertBot::new("123:abc", bad, connect),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            AlertBot::new("", test_config(), connect),
            Err(Error::Config(_))
        ));
        assert_eq!(connects.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn connect_receives_token() {
        let seen = Mutex::new(String::new());
        AlertBot::new("123:abc", test_config(), |token| -> Arc<dyn MessagingPort> {
            *seen.lock().unwrap() = token.to_string();
            Arc::new(FakeMessenger::default())
        })
        .unwrap();
        assert_eq!(*seen.lock().unwrap(), "123:abc");
    }

    #[tokio::test]
    async fn error_swallows_delivery_failure() {
        let messenger = Arc::new(FakeMessenger::failing());
        let bot = bot_with(messenger.clone());

        bot.error("x", None).await.unwrap();

        let sent = messenger.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].destination, "-1001234567890");
        assert_eq!(
            sent[0].options,
            SendOptions {
                render_mode: RenderMode::Html,
                thread_id: 7,
            }
        );
        assert!(sent[0].body.starts_with("#error #payments_api\n\n<b>🚨 ERROR - "));
        assert!(sent[0].body.ends_with("<b>Message:</b>\n<pre>x</pre>"));
    }

    #[tokio::test]
    async fn failure_hook_sees_discarded_error() {
        let failures = Arc::new(AtomicUsize::new(0));
        let counter = failures.clone();
        let bot = bot_with(Arc::new(FakeMessenger::failing())).on_delivery_failure(move |e| {
            assert!(matches!(e, Error::External(_)));
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bot.warning("disk at 91%", None).await.unwrap();
        bot.log("still alive", None).await.unwrap();
        assert_eq!(failures.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn hook_not_called_on_success() {
        let failures = Arc::new(AtomicUsize::new(0));
        let counter = failures.clone();
        let bot = bot_with(Arc::new(FakeMessenger::default())).on_delivery_failure(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bot.log("ok", None).await.unwrap();
        assert_eq!(failures.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn metadata_section_follows_the_map() {
        let messenger = Arc::new(FakeMessenger::default());
        let bot = bot_with(messenger.clone());

        bot.log("a", Some(&Metadata::new())).await.unwrap();
        bot.log("b", Some(&meta(json!({ "key": "v" })))).await.unwrap();

        let sent = messenger.sent();
        assert!(!sent[0].body.contains("Metadata:"));
        assert!(sent[1]
            .body
            .ends_with("<b>Metadata:</b>\n<pre>{\n  &quot;key&quot;: &quot;v&quot;\n}</pre>"));
    }

    #[tokio::test]
    async fn concurrent_calls_stay_independent() {
        let messenger = Arc::new(FakeMessenger::default());
        let bot = bot_with(messenger.clone());

        let m1 = meta(json!({ "n": 1 }));
        let m3 = meta(json!({ "n": 3 }));
        let (a, b, c) = tokio::join!(
            bot.log("first", Some(&m1)),
            bot.warning("second", None),
            bot.error("third", Some(&m3)),
        );
        a.unwrap();
        b.unwrap();
        c.unwrap();

        let sent = messenger.sent();
        assert_eq!(sent.len(), 3);

        let find = |needle: &str| {
            sent.iter()
                .find(|s| s.body.contains(needle))
                .cloned()
                .unwrap()
        };
        let first = find("<pre>first</pre>");
        assert!(first.body.starts_with("#log "));
        assert!(first.body.contains("&quot;n&quot;: 1"));
        assert!(!first.body.contains("second") && !first.body.contains("third"));

        let second = find("<pre>second</pre>");
        assert!(second.body.starts_with("#warning "));
        assert!(!second.body.contains("Metadata:"));

        let third = find("<pre>third</pre>");
        assert!(third.body.starts_with("#error "));
        assert!(third.body.contains("&quot;n&quot;: 3"));
        assert!(!third.body.contains("&quot;n&quot;: 1"));
    }

    #[tokio::test]
    async fn spawned_alert_completes_in_background() {
        let messenger = Arc::new(FakeMessenger::failing());
        let bot = bot_with(messenger.clone());

        bot.spawn(Severity::Warning, "background", None)
            .await
            .unwrap()
            .unwrap();

        let sent = messenger.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains("<pre>background</pre>"));
    }

    #[test]
    fn builder_requires_config() {
        let r = AlertBotBuilder::new("123:abc").build(|_| -> Arc<dyn MessagingPort> {
            Arc::new(FakeMessenger::default())
        });
        match r {
            Err(Error::Config(msg)) => assert_eq!(msg, "bot configuration must be set"),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn builder_validates_on_build() {
        let builder = AlertBotBuilder::new("123:abc").config(AlertConfig::new("", 7, "x"));
        let r = builder.build(|_| -> Arc<dyn MessagingPort> { Arc::new(FakeMessenger::default()) });
        assert!(matches!(r, Err(Error::Config(_))));

        let bot = AlertBotBuilder::new("123:abc")
            .config(AlertConfig::new("@alerts", 3, "123 Cool Project!!"))
            .build(|_| -> Arc<dyn MessagingPort> { Arc::new(FakeMessenger::default()) })
            .unwrap();
        assert_eq!(bot.project_tag().as_str(), "project_123_cool_project");
        assert_eq!(bot.config().thread_id, 3);
    }

    #[test]
    fn builder_rejects_empty_token_at_build() {
        let r = AlertBotBuilder::new("")
            .config(test_config())
            .build(|_| -> Arc<dyn MessagingPort> { Arc::new(FakeMessenger::default()) });
        assert!(matches!(r, Err(Error::Config(_))));
    }
}
