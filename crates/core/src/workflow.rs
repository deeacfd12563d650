//! Request lifecycle orchestration over a [`SessionCapability`].
//!
//! [`Workflow`] is what every presentation variant calls. Each operation
//! validates locally against freshly fetched data (so the user gets
//! field-level feedback without a round trip on obvious mistakes), then
//! performs the remote write, which re-validates authoritatively. Every
//! remote call is bounded by a timeout reported as [`CoreError::Transient`].

use std::future::Future;
use std::time::Duration;

use chrono::Utc;

use crate::attachment::{check_attachment, AttachmentContext, AttachmentRef};
use crate::conversation::{
    validate_new_turn, validate_response, ConversationTurn, NewTurn, ProjectActivity,
    TurnResponse,
};
use crate::error::CoreError;
use crate::pagination::{paginate, Page};
use crate::request::{
    check_submission, count_pending_for, validate_assignment, validate_dept_head_decision,
    validate_resolver_update, Assignment, DeptHeadVerdict, NewRequest, Request, ResolverUpdate,
};
use crate::roles::{Actor, Operation};
use crate::search::{activity_matches, RequestQuery};
use crate::session::SessionCapability;
use crate::stats::RequestStats;
use crate::types::DbId;

/// Default upper bound on a single remote call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

pub struct Workflow<S> {
    session: S,
    call_timeout: Duration,
}

impl<S: SessionCapability> Workflow<S> {
    pub fn new(session: S) -> Self {
        Self::with_timeout(session, DEFAULT_CALL_TIMEOUT)
    }

    pub fn with_timeout(session: S, call_timeout: Duration) -> Self {
        Self {
            session,
            call_timeout,
        }
    }

    pub fn actor(&self) -> Actor {
        self.session.actor()
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Await a remote call, converting an elapsed timeout into `Transient`.
    async fn call<T>(
        &self,
        op: Operation,
        fut: impl Future<Output = Result<T, CoreError>>,
    ) -> Result<T, CoreError> {
        match tokio::time::timeout(self.call_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    op = op.name(),
                    timeout_ms = self.call_timeout.as_millis() as u64,
                    "Remote call timed out",
                );
                Err(CoreError::Transient(format!(
                    "{} timed out after {}ms",
                    op.name(),
                    self.call_timeout.as_millis()
                )))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn requests(&self) -> Result<Vec<Request>, CoreError> {
        self.call(Operation::ListRequests, self.session.list_requests())
            .await
    }

    pub async fn request(&self, request_id: DbId) -> Result<Request, CoreError> {
        self.call(Operation::GetRequest, self.session.get_request(request_id))
            .await
    }

    /// Filter the actor's requests, then slice out one page.
    pub async fn request_page(
        &self,
        query: &RequestQuery,
        page: usize,
        per_page: usize,
    ) -> Result<Page<Request>, CoreError> {
        let requests = self.requests().await?;
        let matching: Vec<Request> = requests.into_iter().filter(|r| query.matches(r)).collect();
        Ok(paginate(&matching, page, per_page))
    }

    pub async fn stats(&self) -> Result<RequestStats, CoreError> {
        let requests = self.requests().await?;
        Ok(RequestStats::from_requests(&requests))
    }

    pub async fn project_activity(&self) -> Result<Vec<ProjectActivity>, CoreError> {
        self.call(
            Operation::ListProjectActivity,
            self.session.list_project_activity(),
        )
        .await
    }

    pub async fn activity_page(
        &self,
        text: &str,
        page: usize,
        per_page: usize,
    ) -> Result<Page<ProjectActivity>, CoreError> {
        let activity = self.project_activity().await?;
        let matching: Vec<ProjectActivity> = activity
            .into_iter()
            .filter(|a| activity_matches(a, text))
            .collect();
        Ok(paginate(&matching, page, per_page))
    }

    pub async fn conversation(&self, project_id: DbId) -> Result<Vec<ConversationTurn>, CoreError> {
        self.call(
            Operation::ListConversation,
            self.session.list_conversation(project_id),
        )
        .await
    }

    pub async fn latest_open_turn(
        &self,
        project_id: DbId,
    ) -> Result<Option<ConversationTurn>, CoreError> {
        self.call(
            Operation::GetLatestOpenTurn,
            self.session.get_latest_open_turn(project_id),
        )
        .await
    }

    /// `true` when there is no open turn to answer, i.e. "Respond" is hidden.
    pub async fn has_response(&self, project_id: DbId) -> Result<bool, CoreError> {
        Ok(self.latest_open_turn(project_id).await?.is_none())
    }

    // -----------------------------------------------------------------------
    // Submitter
    // -----------------------------------------------------------------------

    /// Submit a new request, enforcing the pending quota before any write.
    pub async fn submit_request(&self, input: NewRequest) -> Result<Request, CoreError> {
        let actor = self.actor();
        let existing = self.requests().await?;
        let pending = count_pending_for(&existing, actor.user_id);
        check_submission(&input, pending)?;

        let request = self
            .call(Operation::CreateRequest, self.session.create_request(input))
            .await?;
        tracing::info!(
            request_id = request.id,
            actor_id = actor.user_id,
            dept_head_required = request.dept_head_required,
            "Request submitted",
        );
        Ok(request)
    }

    // -----------------------------------------------------------------------
    // Assigner
    // -----------------------------------------------------------------------

    pub async fn assign_resolver(
        &self,
        request_id: DbId,
        assignment: Assignment,
    ) -> Result<Request, CoreError> {
        let mut preview = self.request(request_id).await?;
        validate_assignment(&mut preview, &assignment, Utc::now())?;

        self.call(
            Operation::AssignResolver,
            self.session.assign_resolver(request_id, assignment),
        )
        .await
    }

    pub async fn post_assigner_turn(&self, input: NewTurn) -> Result<ConversationTurn, CoreError> {
        validate_new_turn(&input)?;
        let turn = self
            .call(
                Operation::PostAssignerTurn,
                self.session.post_assigner_turn(input),
            )
            .await?;
        tracing::info!(
            turn_id = turn.id,
            project_id = turn.project_id,
            "Conversation turn posted",
        );
        Ok(turn)
    }

    pub async fn upload_completion_attachment(
        &self,
        request_id: DbId,
        attachment: AttachmentRef,
    ) -> Result<Request, CoreError> {
        check_attachment(&attachment, AttachmentContext::CompletionFile)?;
        self.call(
            Operation::UploadCompletionAttachment,
            self.session
                .upload_completion_attachment(request_id, attachment),
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Department Head
    // -----------------------------------------------------------------------

    pub async fn decide_dept_head(
        &self,
        request_id: DbId,
        verdict: DeptHeadVerdict,
    ) -> Result<Request, CoreError> {
        let mut preview = self.request(request_id).await?;
        validate_dept_head_decision(&mut preview, &verdict, Utc::now())?;

        self.call(
            Operation::DecideDeptHead,
            self.session.decide_dept_head(request_id, verdict),
        )
        .await
    }

    /// Answer a specific turn. The at-most-once check happens at write time
    /// inside the session.
    pub async fn respond_to_turn(
        &self,
        turn_id: DbId,
        response: TurnResponse,
    ) -> Result<ConversationTurn, CoreError> {
        validate_response(&response)?;
        self.call(
            Operation::RespondToTurn,
            self.session.respond_to_turn(turn_id, response),
        )
        .await
    }

    /// Answer the single most recent open turn of a project.
    pub async fn respond_to_latest(
        &self,
        project_id: DbId,
        response: TurnResponse,
    ) -> Result<ConversationTurn, CoreError> {
        let latest = self.latest_open_turn(project_id).await?.ok_or_else(|| {
            CoreError::InvalidState(format!("project {project_id} has no open conversation turn"))
        })?;
        self.respond_to_turn(latest.id, response).await
    }

    // -----------------------------------------------------------------------
    // Resolver
    // -----------------------------------------------------------------------

    pub async fn update_resolver_status(
        &self,
        request_id: DbId,
        update: ResolverUpdate,
    ) -> Result<Request, CoreError> {
        let mut preview = self.request(request_id).await?;
        validate_resolver_update(&mut preview, &update, Utc::now())?;

        self.call(
            Operation::UpdateResolverStatus,
            self.session.update_resolver_status(request_id, update),
        )
        .await
    }
}
