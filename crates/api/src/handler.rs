//! Submission orchestration.
//!
//! A submission is throttle-checked, validated, sanitized, stored and
//! announced, in that order. Only a stored submission counts against the
//! client's throttle allowance.

use delivery::{NewSubmission, Notifier, SharedNotifier, SharedRepository, SubmissionRepository};
use intake_core::{Error, FormValidator, Messages, Result, SanitizedSubmission, Sanitizer};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use telemetry::metrics;
use throttle::{RequestContext, SharedThrottle};
use tracing::{debug, error, info, warn};

use crate::response::{ApiError, SubmissionData, SubmitResponse};

/// Body of `POST /submit`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitRequest {
    /// Field id to value. Anything other than an object is rejected by validation.
    #[serde(default)]
    pub form_data: Value,
    #[serde(default)]
    pub form_id: Option<String>,
    /// Replaces the default success message
    #[serde(default)]
    pub success_message: Option<String>,
    /// Replaces the default failure message
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Who sent the request.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub ip: String,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl ClientInfo {
    pub fn new(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            user_agent: None,
            referer: None,
        }
    }

    fn context(&self) -> RequestContext {
        RequestContext::new(self.referer.clone(), self.user_agent.clone())
    }
}

/// Runs submissions through the pipeline.
pub struct SubmissionHandler {
    validator: FormValidator,
    sanitizer: Sanitizer,
    throttle: SharedThrottle,
    repository: SharedRepository,
    notifier: SharedNotifier,
}

impl SubmissionHandler {
    /// The sanitizer should share the validator's field resolver so both
    /// agree on field types.
    pub fn new(
        validator: FormValidator,
        sanitizer: Sanitizer,
        throttle: SharedThrottle,
        repository: SharedRepository,
        notifier: SharedNotifier,
    ) -> Self {
        Self {
            validator,
            sanitizer,
            throttle,
            repository,
            notifier,
        }
    }

    pub fn messages(&self) -> &Arc<Messages> {
        self.validator.messages()
    }

    pub fn throttle(&self) -> &SharedThrottle {
        &self.throttle
    }

    pub fn repository(&self) -> &SharedRepository {
        &self.repository
    }

    pub fn notifier(&self) -> &SharedNotifier {
        &self.notifier
    }

    pub async fn handle(
        &self,
        request: SubmitRequest,
        client: &ClientInfo,
    ) -> std::result::Result<SubmitResponse, ApiError> {
        metrics().submissions_received.inc();
        let messages = self.messages();
        let ctx = client.context();

        if self.throttle.is_throttled(&client.ip, &ctx).await {
            let retry_after = self.throttle.time_until_next_allowed(&client.ip, &ctx).await;

            metrics().submissions_throttled.inc();
            warn!(client_ip = %client.ip, retry_after, "Submission throttled");

            return Err(Error::throttled(&messages.throttled, retry_after).into());
        }

        let submission = self.validator.validate_json(&request.form_data).map_err(|e| {
            metrics().submissions_rejected.inc();
            debug!(code = e.code(), "Submission rejected");
            ApiError::from(e)
        })?;

        let sanitized = self.sanitizer.sanitize(&submission);
        let form_id = request.form_id.as_deref();

        let (submission_id, email_sent) = match self.process(sanitized, form_id, client).await {
            Ok(result) => result,
            Err(e) => {
                metrics().processing_failures.inc();
                error!(
                    form_id,
                    client_ip = %client.ip,
                    error = %e,
                    "Form submission processing failed"
                );
                let message = request
                    .error_message
                    .unwrap_or_else(|| messages.submission_failed.clone());
                return Err(Error::processing(message, messages.processing_failed.clone()).into());
            }
        };

        if let Err(e) = self.throttle.record_submission(&client.ip).await {
            warn!(client_ip = %client.ip, error = %e, "Failed to record submission");
        }

        metrics().submissions_accepted.inc();
        info!(
            form_id,
            submission_id,
            email_sent,
            field_count = submission.len(),
            "Submission accepted"
        );

        let message = request
            .success_message
            .unwrap_or_else(|| messages.submission_succeeded.clone());

        Ok(SubmitResponse::new(
            message,
            SubmissionData {
                submission_id,
                form_id: request.form_id,
                email_sent,
            },
        ))
    }

    async fn process(
        &self,
        sanitized: SanitizedSubmission,
        form_id: Option<&str>,
        client: &ClientInfo,
    ) -> Result<(u64, bool)> {
        let record = NewSubmission::new(
            sanitized.clone(),
            form_id.map(str::to_string),
            client.ip.clone(),
            client.user_agent.clone(),
            client.referer.clone(),
        );

        let submission_id = self.repository.save(record).await?;
        let email_sent = self.notifier.notify(&sanitized, form_id, &client.ip).await?;

        if !email_sent {
            warn!(form_id, submission_id, "Notification not delivered");
        }

        Ok((submission_id, email_sent))
    }
}
