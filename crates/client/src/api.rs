//! REST binding of the session capability.
//!
//! Wraps the change-desk HTTP API using [`reqwest`]. Routes are grouped
//! under a role prefix (`/user`, `/assigner`, `/dept-head`, `/resolver`);
//! every call carries the bearer token and a fresh `X-Request-Id`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use changedesk_core::attachment::AttachmentRef;
use changedesk_core::conversation::{ConversationTurn, NewTurn, ProjectActivity, TurnResponse};
use changedesk_core::error::CoreError;
use changedesk_core::request::{
    Assignment, DeptHeadDecision, DeptHeadVerdict, NewRequest, Request, ResolverUpdate,
};
use changedesk_core::roles::{check_permission, Actor, Operation, Role};
use changedesk_core::session::SessionCapability;
use changedesk_core::types::DbId;

use crate::config::ClientConfig;
use crate::error::{ClientError, Target};
use crate::retry::{read_budget, retry_read, RetryConfig};
use crate::wire::{multipart_form, Envelope, FormBody, Payload};

/// Headroom over the retry budget for connection setup and scheduling.
const BUDGET_SLACK: Duration = Duration::from_secs(1);

/// Header carrying a per-call correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Authenticated HTTP session for one actor.
pub struct HttpSession {
    client: reqwest::Client,
    api_url: String,
    token: String,
    actor: Actor,
    request_timeout: Duration,
    retry: RetryConfig,
    cancel: CancellationToken,
}

/// URL segment grouping a role's routes.
pub fn role_prefix(role: Role) -> &'static str {
    match role {
        Role::Submitter => "user",
        Role::Assigner => "assigner",
        Role::DeptHead => "dept-head",
        Role::Resolver => "resolver",
    }
}

impl HttpSession {
    /// Build a session with its own connection pool and per-call timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Build a session reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            token: config.api_token.clone(),
            actor: config.actor,
            request_timeout: config.request_timeout,
            retry: RetryConfig {
                max_attempts: config.retry_max_attempts,
                ..Default::default()
            },
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Upper bound for one session call including read retries.
    ///
    /// Use this as the outer workflow timeout; the per-attempt timeout
    /// alone would abandon the retry loop after the first slow attempt.
    pub fn call_budget(&self) -> Duration {
        read_budget(self.request_timeout, &self.retry).saturating_add(BUDGET_SLACK)
    }

    /// Token that aborts in-flight read retries, e.g. on logout.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.api_url, role_prefix(self.actor.role), path)
    }

    // ---- transport ----

    /// Send one request and unwrap the response envelope.
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
    ) -> Result<Option<T>, ClientError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let url = self.url(path);
        tracing::debug!(%method, %url, %request_id, "API call");

        let mut builder = self
            .client
            .request(method, &url)
            .bearer_auth(&self.token)
            .header(REQUEST_ID_HEADER, &request_id)
            .header(reqwest::header::ACCEPT, "application/json");

        builder = match payload {
            Payload::Empty => builder,
            Payload::Json(body) => builder.json(&body),
            Payload::Multipart { fields, files } => {
                builder.multipart(multipart_form(fields, files).await?)
            }
        };

        let response = Self::ensure_success(builder.send().await?).await?;
        let envelope = response.json::<Envelope<T>>().await?;
        if !envelope.success {
            return Err(ClientError::Rejected(envelope.message.unwrap_or_default()));
        }
        Ok(envelope.data)
    }

    /// Like [`send`](Self::send) but the envelope must carry `data`.
    async fn send_data<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
    ) -> Result<T, ClientError> {
        self.send::<T>(method, path, payload)
            .await?
            .ok_or_else(|| ClientError::MissingData(format!("response to {path}")))
    }

    /// Ensure the response has a success status code, capturing the body
    /// of failures for error mapping.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    // ---- operation plumbing ----

    /// Role gate, then an idempotent GET with transient-failure retry.
    async fn read<T: DeserializeOwned>(
        &self,
        op: Operation,
        path: &str,
        target: Target,
    ) -> Result<Option<T>, CoreError> {
        check_permission(&self.actor, op)?;
        retry_read(op.name(), &self.retry, &self.cancel, move || async move {
            self.send::<T>(Method::GET, path, Payload::Empty)
                .await
                .map_err(|e| self.log_failure(op, e).into_core(target))
        })
        .await
    }

    async fn read_data<T: DeserializeOwned>(
        &self,
        op: Operation,
        path: &str,
        target: Target,
    ) -> Result<T, CoreError> {
        self.read::<T>(op, path, target).await?.ok_or_else(|| {
            CoreError::InvalidState(format!("{} response carried no data", op.name()))
        })
    }

    /// Role gate, then a single non-retried write.
    async fn write<T: DeserializeOwned>(
        &self,
        op: Operation,
        method: Method,
        path: &str,
        body: FormBody,
        target: Target,
    ) -> Result<T, CoreError> {
        check_permission(&self.actor, op)?;
        let result = self
            .send_data::<T>(method, path, body.into_payload())
            .await
            .map_err(|e| self.log_failure(op, e).into_core(target));
        if result.is_ok() {
            tracing::info!(
                op = op.name(),
                actor_id = self.actor.user_id,
                role = self.actor.role.as_str(),
                entity = target.entity,
                id = target.id,
                "API write succeeded",
            );
        }
        result
    }

    fn log_failure(&self, op: Operation, error: ClientError) -> ClientError {
        match &error {
            ClientError::Api { status, .. } if *status >= 500 => {
                tracing::error!(op = op.name(), error = %error, "API call failed")
            }
            _ => tracing::debug!(op = op.name(), error = %error, "API call failed"),
        }
        error
    }
}

fn collection() -> Target {
    Target::new("collection", 0)
}

#[async_trait]
impl SessionCapability for HttpSession {
    fn actor(&self) -> Actor {
        self.actor
    }

    async fn list_requests(&self) -> Result<Vec<Request>, CoreError> {
        let path = match self.actor.role {
            Role::Submitter | Role::DeptHead => "history",
            Role::Assigner | Role::Resolver => "dashboard",
        };
        self.read_data(Operation::ListRequests, path, collection()).await
    }

    async fn get_request(&self, request_id: DbId) -> Result<Request, CoreError> {
        self.read_data(
            Operation::GetRequest,
            &format!("requests/{request_id}"),
            Target::new("request", request_id),
        )
        .await
    }

    async fn list_project_activity(&self) -> Result<Vec<ProjectActivity>, CoreError> {
        self.read_data(
            Operation::ListProjectActivity,
            "projects-with-activity",
            collection(),
        )
        .await
    }

    async fn list_conversation(&self, project_id: DbId) -> Result<Vec<ConversationTurn>, CoreError> {
        self.read_data(
            Operation::ListConversation,
            &format!("projects/{project_id}/conversations"),
            Target::new("project", project_id),
        )
        .await
    }

    async fn get_latest_open_turn(
        &self,
        project_id: DbId,
    ) -> Result<Option<ConversationTurn>, CoreError> {
        self.read(
            Operation::GetLatestOpenTurn,
            &format!("projects/{project_id}/latest-unresponded"),
            Target::new("project", project_id),
        )
        .await
    }

    async fn create_request(&self, input: NewRequest) -> Result<Request, CoreError> {
        let body = FormBody::new()
            .field("project_id", input.project_id)
            .field("category_id", input.category_id)
            .field("sub_category_id", input.sub_category_id)
            .field("priority", input.priority.as_str())
            .field("priority_reason", input.priority_reason)
            .field("request_details", input.request_details)
            .field("submitted_by_name", input.submitted_by_name)
            .field("dept_head_required", input.dept_head_required)
            .files("attachments", &input.attachments)
            .file("voice_note", input.voice_note.as_ref());
        self.write(
            Operation::CreateRequest,
            Method::POST,
            "change-request",
            body,
            collection(),
        )
        .await
    }

    async fn assign_resolver(
        &self,
        request_id: DbId,
        assignment: Assignment,
    ) -> Result<Request, CoreError> {
        let body = FormBody::new()
            .field("developer_id", assignment.resolver_id)
            .field("assigner_comments", assignment.assigner_comments);
        self.write(
            Operation::AssignResolver,
            Method::POST,
            &format!("requests/{request_id}/assign"),
            body,
            Target::new("request", request_id),
        )
        .await
    }

    async fn update_resolver_status(
        &self,
        request_id: DbId,
        update: ResolverUpdate,
    ) -> Result<Request, CoreError> {
        let body = FormBody::new()
            .field("status", update.status)
            .field("hours_worked", update.hours_worked)
            .field("resolver_comment", update.resolver_comment);
        self.write(
            Operation::UpdateResolverStatus,
            Method::PATCH,
            &format!("requests/{request_id}/status"),
            body,
            Target::new("request", request_id),
        )
        .await
    }

    async fn decide_dept_head(
        &self,
        request_id: DbId,
        verdict: DeptHeadVerdict,
    ) -> Result<Request, CoreError> {
        let (action, body) = match verdict.decision {
            DeptHeadDecision::Approved => ("approve", FormBody::new()),
            DeptHeadDecision::Rejected => (
                "reject",
                FormBody::new().field("rejection_reason", verdict.rejection_reason),
            ),
        };
        self.write(
            Operation::DecideDeptHead,
            Method::POST,
            &format!("requests/{request_id}/{action}"),
            body,
            Target::new("request", request_id),
        )
        .await
    }

    async fn post_assigner_turn(&self, input: NewTurn) -> Result<ConversationTurn, CoreError> {
        let (path, target) = match input.request_id {
            Some(request_id) => (
                format!("requests/{request_id}/action"),
                Target::new("request", request_id),
            ),
            None => (
                format!("projects/{}/conversations", input.project_id),
                Target::new("project", input.project_id),
            ),
        };
        let body = FormBody::new()
            .field("project_id", input.project_id)
            .field("assigner_remarks", input.remarks)
            .file("assigner_attachment", input.attachment.as_ref());
        self.write(Operation::PostAssignerTurn, Method::POST, &path, body, target)
            .await
    }

    async fn respond_to_turn(
        &self,
        turn_id: DbId,
        response: TurnResponse,
    ) -> Result<ConversationTurn, CoreError> {
        let body = FormBody::new()
            .field("status", response.decision.as_str())
            .field("remarks", response.remarks.unwrap_or_default())
            .file("attachments", response.attachment.as_ref());
        self.write(
            Operation::RespondToTurn,
            Method::POST,
            &format!("respond/{turn_id}"),
            body,
            Target::turn_response(turn_id),
        )
        .await
    }

    async fn upload_completion_attachment(
        &self,
        request_id: DbId,
        attachment: AttachmentRef,
    ) -> Result<Request, CoreError> {
        let body = FormBody::new().file("attachment", Some(&attachment));
        self.write(
            Operation::UploadCompletionAttachment,
            Method::POST,
            &format!("requests/{request_id}/update-completed"),
            body,
            Target::new("request", request_id),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_prefixes_match_routes() {
        assert_eq!(role_prefix(Role::Submitter), "user");
        assert_eq!(role_prefix(Role::DeptHead), "dept-head");
        assert_eq!(role_prefix(Role::Resolver), "resolver");
    }
}
