//! Notification dispatcher - reminder fan-out across recipients and channels
//!
//! One reminder goes to the event's primary contact and, when family
//! notification is enabled, to the parents selected on the event. Every
//! recipient gets an email and a text message attempt; each attempt is
//! independent, bounded by a timeout, and never retried within a cycle.
//! Nothing here returns an error: every attempt ends up as an outcome in the
//! `DispatchReport`.

use std::sync::Arc;
use std::time::Duration;

use calnotify_domain::constants::DEFAULT_SEND_TIMEOUT_SECS;
use calnotify_domain::{
    parse_family_members, parse_selected_children, Event, FamilyRole, Recipient, RecipientRole,
    ReminderKind,
};
use futures::future::join_all;
use tokio::time::{error::Elapsed, timeout};
use tracing::{debug, info, instrument, warn};

use super::error::{ChannelError, RecipientDataError};
use super::ports::{DeliveryReceipt, EmailMessage, EmailSender, Mailbox, MessagingSender, TextMessage};
use super::report::{Channel, DeliveryOutcome, DeliveryStatus, DispatchReport, RecipientLabel, SkipReason};
use super::templates::{compose, Personalisation, ReminderMessage};
use crate::utils::{redact_email, redact_phone};

/// Tunables for the dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherSettings {
    /// Upper bound for a single provider call.
    pub send_timeout: Duration,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self { send_timeout: Duration::from_secs(DEFAULT_SEND_TIMEOUT_SECS) }
    }
}

/// Sends one reminder to every eligible recipient on every channel.
pub struct NotificationDispatcher {
    email: Arc<dyn EmailSender>,
    messaging: Arc<dyn MessagingSender>,
    settings: DispatcherSettings,
}

impl NotificationDispatcher {
    pub fn new(email: Arc<dyn EmailSender>, messaging: Arc<dyn MessagingSender>) -> Self {
        Self { email, messaging, settings: DispatcherSettings::default() }
    }

    pub fn with_settings(mut self, settings: DispatcherSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Dispatch the `kind` reminder for `event`.
    ///
    /// Primary contact first, then the family fan-out. Malformed family data
    /// is recorded in `family_error` and only skips the family step.
    #[instrument(skip_all, fields(event_id = event.id, kind = %kind))]
    pub async fn dispatch(&self, event: &Event, kind: ReminderKind) -> DispatchReport {
        let mut report = DispatchReport::new(event.id, kind);

        let primary = event.primary_recipient();
        let message = compose(event, kind, None);
        report.outcomes.extend(self.deliver(&primary, &message).await);

        if event.notify_family {
            match family_recipients(event) {
                Ok((recipients, children)) => {
                    let personalised: Vec<(Recipient, ReminderMessage)> = recipients
                        .into_iter()
                        .map(|recipient| {
                            let personal = Personalisation {
                                name: recipient.name.as_deref(),
                                children: &children,
                            };
                            let message = compose(event, kind, Some(personal));
                            (recipient, message)
                        })
                        .collect();

                    let deliveries = personalised
                        .iter()
                        .map(|(recipient, message)| self.deliver(recipient, message));
                    for outcomes in join_all(deliveries).await {
                        report.outcomes.extend(outcomes);
                    }
                }
                Err(err) => {
                    warn!(error = %err, "Skipping family notifications: malformed family data");
                    report.family_error = Some(err.to_string());
                }
            }
        }

        info!(
            sent = report.sent_count(),
            failed = report.failed_count(),
            skipped = report.skipped_count(),
            "Reminder dispatched"
        );
        report
    }

    async fn deliver(&self, recipient: &Recipient, message: &ReminderMessage) -> Vec<DeliveryOutcome> {
        let label = label_for(recipient);
        let (email, text) =
            futures::join!(self.send_email(recipient, message), self.send_text(recipient, message));

        vec![
            DeliveryOutcome { recipient: label.clone(), channel: Channel::Email, status: email },
            DeliveryOutcome { recipient: label, channel: Channel::Messaging, status: text },
        ]
    }

    async fn send_email(&self, recipient: &Recipient, message: &ReminderMessage) -> DeliveryStatus {
        let (true, Some(from)) = (self.email.is_configured(), self.email.sender()) else {
            debug!(channel = "email", "Email channel not configured, skipping");
            return DeliveryStatus::Skipped(SkipReason::ChannelUnconfigured);
        };
        let Some(address) = recipient.email.as_deref() else {
            return DeliveryStatus::Skipped(SkipReason::MissingAddress);
        };

        let email = EmailMessage {
            from,
            to: Mailbox::new(address, recipient.name.clone()),
            subject: message.subject.clone(),
            body: message.email_body.clone(),
        };
        let result = timeout(self.settings.send_timeout, self.email.send(&email)).await;
        self.settle(Channel::Email, &redact_email(address), result)
    }

    async fn send_text(&self, recipient: &Recipient, message: &ReminderMessage) -> DeliveryStatus {
        let (true, Some(from)) = (self.messaging.is_configured(), self.messaging.sender()) else {
            debug!(channel = "messaging", "Messaging channel not configured, skipping");
            return DeliveryStatus::Skipped(SkipReason::ChannelUnconfigured);
        };
        let Some(number) = recipient.phone.as_deref() else {
            return DeliveryStatus::Skipped(SkipReason::MissingAddress);
        };

        let text = TextMessage { from, to: number.to_string(), body: message.text_body.clone() };
        let result = timeout(self.settings.send_timeout, self.messaging.send(&text)).await;
        self.settle(Channel::Messaging, &redact_phone(number), result)
    }

    fn settle(
        &self,
        channel: Channel,
        address: &str,
        result: Result<Result<DeliveryReceipt, ChannelError>, Elapsed>,
    ) -> DeliveryStatus {
        let error = match result {
            Ok(Ok(receipt)) => {
                debug!(%channel, recipient = address, provider_id = ?receipt.provider_id, "Reminder sent");
                return DeliveryStatus::Sent { provider_id: receipt.provider_id };
            }
            Ok(Err(ChannelError::Unconfigured)) => {
                debug!(%channel, "Channel reported unconfigured, skipping");
                return DeliveryStatus::Skipped(SkipReason::ChannelUnconfigured);
            }
            Ok(Err(err)) => err,
            Err(_) => ChannelError::Timeout { seconds: self.settings.send_timeout.as_secs() },
        };

        warn!(%channel, recipient = address, error = %error, error_kind = error.label(), "Reminder delivery failed");
        DeliveryStatus::Failed(error.to_string())
    }
}

/// Parents selected on the event, fathers before mothers.
fn family_recipients(event: &Event) -> Result<(Vec<Recipient>, Vec<String>), RecipientDataError> {
    let members =
        parse_family_members(&event.family_members).map_err(RecipientDataError::FamilyMembers)?;
    let children = parse_selected_children(&event.selected_children)
        .map_err(RecipientDataError::SelectedChildren)?;

    let with_role = |role: FamilyRole, enabled: bool| {
        members
            .iter()
            .filter(move |member| enabled && member.family_role() == role)
            .map(Recipient::from_member)
    };

    let recipients = with_role(FamilyRole::Father, event.notify_father)
        .chain(with_role(FamilyRole::Mother, event.notify_mother))
        .collect();
    Ok((recipients, children))
}

fn label_for(recipient: &Recipient) -> RecipientLabel {
    match &recipient.role {
        RecipientRole::Primary => RecipientLabel::Primary,
        RecipientRole::Family(role) => {
            RecipientLabel::Family { role: role.as_str().to_string(), name: recipient.name.clone() }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::*;

    #[derive(Default)]
    struct FakeEmail {
        configured: bool,
        fail: bool,
        sent: Mutex<Vec<EmailMessage>>,
    }

    #[async_trait]
    impl EmailSender for FakeEmail {
        fn is_configured(&self) -> bool {
            self.configured
        }

        fn sender(&self) -> Option<Mailbox> {
            self.configured.then(|| Mailbox::new("noreply@example.com", Some("Calendar".into())))
        }

        async fn send(&self, message: &EmailMessage) -> Result<DeliveryReceipt, ChannelError> {
            if self.fail {
                return Err(ChannelError::SendFailure("smtp down".into()));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(DeliveryReceipt { provider_id: Some("msg-1".into()) })
        }
    }

    #[derive(Default)]
    struct FakeMessaging {
        configured: bool,
        delay: Option<Duration>,
        sent: Mutex<Vec<TextMessage>>,
    }

    #[async_trait]
    impl MessagingSender for FakeMessaging {
        fn is_configured(&self) -> bool {
            self.configured
        }

        fn sender(&self) -> Option<String> {
            self.configured.then(|| "+15550000000".to_string())
        }

        async fn send(&self, message: &TextMessage) -> Result<DeliveryReceipt, ChannelError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(DeliveryReceipt::default())
        }
    }

    fn event() -> Event {
        let mut event = Event::new(42, "School play", NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());
        event.time = "18:00".into();
        event.email = "a@x.com".into();
        event
    }

    fn dispatcher(email: &Arc<FakeEmail>, messaging: &Arc<FakeMessaging>) -> NotificationDispatcher {
        NotificationDispatcher::new(email.clone(), messaging.clone())
    }

    #[tokio::test]
    async fn test_primary_email_sent_and_missing_phone_skipped() {
        let email = Arc::new(FakeEmail { configured: true, ..Default::default() });
        let messaging = Arc::new(FakeMessaging { configured: true, ..Default::default() });

        let report = dispatcher(&email, &messaging).dispatch(&event(), ReminderKind::DayBefore).await;

        assert_eq!(report.sent_count(), 1);
        assert_eq!(
            report.for_channel(Channel::Messaging).next().unwrap().status,
            DeliveryStatus::Skipped(SkipReason::MissingAddress)
        );
        let sent = email.sent.lock().unwrap();
        assert_eq!(sent[0].to.email, "a@x.com");
        assert_eq!(sent[0].subject, "Reminder: School play tomorrow");
    }

    #[tokio::test]
    async fn test_unconfigured_email_is_skipped_and_messaging_still_attempted() {
        let email = Arc::new(FakeEmail::default());
        let messaging = Arc::new(FakeMessaging { configured: true, ..Default::default() });
        let mut event = event();
        event.phone = "+5491155551234".into();

        let report = dispatcher(&email, &messaging).dispatch(&event, ReminderKind::SameDay).await;

        assert_eq!(
            report.for_channel(Channel::Email).next().unwrap().status,
            DeliveryStatus::Skipped(SkipReason::ChannelUnconfigured)
        );
        assert_eq!(messaging.sent.lock().unwrap().len(), 1);
        assert!(report.any_sent());
    }

    #[tokio::test]
    async fn test_send_failure_is_recorded_not_raised() {
        let email = Arc::new(FakeEmail { configured: true, fail: true, ..Default::default() });
        let messaging = Arc::new(FakeMessaging::default());

        let report = dispatcher(&email, &messaging).dispatch(&event(), ReminderKind::SameDay).await;

        assert_eq!(report.failed_count(), 1);
        assert!(!report.any_sent());
    }

    #[tokio::test]
    async fn test_family_fan_out_respects_role_flags_and_order() {
        let email = Arc::new(FakeEmail { configured: true, ..Default::default() });
        let messaging = Arc::new(FakeMessaging::default());
        let mut event = event();
        event.notify_family = true;
        event.notify_father = true;
        event.notify_mother = true;
        event.family_members = r#"[
            {"name": "Ana", "email": "m@x.com", "role": "mama"},
            {"name": "Luis", "email": "f@x.com", "role": "Father"},
            {"name": "Abu", "email": "g@x.com", "role": "grandma"}
        ]"#
        .into();
        event.selected_children = r#"["Sofi"]"#.into();

        let report = dispatcher(&email, &messaging).dispatch(&event, ReminderKind::DayBefore).await;

        let recipients: Vec<String> =
            email.sent.lock().unwrap().iter().map(|m| m.to.email.clone()).collect();
        assert_eq!(recipients, vec!["a@x.com", "f@x.com", "m@x.com"]);
        assert_eq!(report.sent_count(), 3);

        let family: Vec<&RecipientLabel> = report
            .for_channel(Channel::Email)
            .map(|outcome| &outcome.recipient)
            .filter(|label| matches!(label, RecipientLabel::Family { .. }))
            .collect();
        assert_eq!(
            family[0],
            &RecipientLabel::Family { role: "father".into(), name: Some("Luis".into()) }
        );
        let family_mail = &email.sent.lock().unwrap()[1];
        assert!(family_mail.body.contains("This event is for: Sofi"));
    }

    #[tokio::test]
    async fn test_father_notified_without_mother_flag() {
        let email = Arc::new(FakeEmail { configured: true, ..Default::default() });
        let messaging = Arc::new(FakeMessaging::default());
        let mut event = event();
        event.notify_family = true;
        event.notify_father = true;
        event.family_members = r#"[
            {"name": "Ana", "email": "m@x.com", "role": "mother"},
            {"name": "Luis", "email": "f@x.com", "role": "father"}
        ]"#
        .into();

        dispatcher(&email, &messaging).dispatch(&event, ReminderKind::SameDay).await;

        let recipients: Vec<String> =
            email.sent.lock().unwrap().iter().map(|m| m.to.email.clone()).collect();
        assert_eq!(recipients, vec!["a@x.com", "f@x.com"]);
    }

    #[tokio::test]
    async fn test_family_disabled_ignores_members() {
        let email = Arc::new(FakeEmail { configured: true, ..Default::default() });
        let messaging = Arc::new(FakeMessaging::default());
        let mut event = event();
        event.notify_father = true;
        event.family_members = r#"[{"email": "f@x.com", "role": "father"}]"#.into();

        let report = dispatcher(&email, &messaging).dispatch(&event, ReminderKind::SameDay).await;

        assert_eq!(email.sent.lock().unwrap().len(), 1);
        assert_eq!(report.outcomes.len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_family_data_keeps_primary_path() {
        let email = Arc::new(FakeEmail { configured: true, ..Default::default() });
        let messaging = Arc::new(FakeMessaging::default());
        let mut event = event();
        event.notify_family = true;
        event.notify_father = true;
        event.family_members = "[{not json".into();

        let report = dispatcher(&email, &messaging).dispatch(&event, ReminderKind::SameDay).await;

        assert_eq!(email.sent.lock().unwrap().len(), 1);
        assert!(report.family_error.as_deref().unwrap().contains("family members"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_provider_times_out_as_failure() {
        let email = Arc::new(FakeEmail::default());
        let messaging = Arc::new(FakeMessaging {
            configured: true,
            delay: Some(Duration::from_secs(60)),
            ..Default::default()
        });
        let mut event = event();
        event.phone = "+15551234567".into();

        let report = dispatcher(&email, &messaging)
            .with_settings(DispatcherSettings { send_timeout: Duration::from_secs(1) })
            .dispatch(&event, ReminderKind::SameDay)
            .await;

        assert_eq!(
            report.for_channel(Channel::Messaging).next().unwrap().status,
            DeliveryStatus::Failed("send timed out after 1s".into())
        );
    }
}
