//! Shared in-process system of record and its per-actor sessions.
//!
//! [`MemoryStore`] is meant to be shared via `Arc<MemoryStore>`. A single
//! `tokio::sync::Mutex` serializes writers, so concurrent responses to the
//! same turn resolve to exactly one winner.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use changedesk_core::attachment::AttachmentRef;
use changedesk_core::conversation::{ConversationTurn, NewTurn, ProjectActivity, TurnResponse};
use changedesk_core::error::CoreError;
use changedesk_core::request::{Assignment, DeptHeadVerdict, NewRequest, Request, ResolverUpdate};
use changedesk_core::roles::{check_permission, Actor, Operation, Role};
use changedesk_core::session::SessionCapability;
use changedesk_core::types::DbId;

use crate::state::StoreState;

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
    /// Artificial delay before every call, for exercising client timeouts.
    latency: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            state: Mutex::default(),
            latency: Some(latency),
        }
    }

    pub async fn register_project(&self, id: DbId, name: impl Into<String>) {
        self.state.lock().await.upsert_project(id, name);
    }

    pub async fn register_user(&self, id: DbId, name: impl Into<String>, role: Role) {
        self.state.lock().await.upsert_user(id, name, role);
    }

    /// Open a session acting as `actor`.
    pub fn session(self: &Arc<Self>, actor: Actor) -> MemorySession {
        MemorySession {
            store: Arc::clone(self),
            actor,
        }
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

/// A [`SessionCapability`] bound to one actor over a shared [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct MemorySession {
    store: Arc<MemoryStore>,
    actor: Actor,
}

impl MemorySession {
    /// Role gate plus simulated latency, run before touching state.
    async fn enter(&self, op: Operation) -> Result<(), CoreError> {
        check_permission(&self.actor, op)?;
        self.store.simulate_latency().await;
        tracing::debug!(op = op.name(), actor_id = self.actor.user_id, "Store call");
        Ok(())
    }
}

#[async_trait]
impl SessionCapability for MemorySession {
    fn actor(&self) -> Actor {
        self.actor
    }

    async fn list_requests(&self) -> Result<Vec<Request>, CoreError> {
        self.enter(Operation::ListRequests).await?;
        Ok(self.store.state.lock().await.list_requests(&self.actor))
    }

    async fn get_request(&self, request_id: DbId) -> Result<Request, CoreError> {
        self.enter(Operation::GetRequest).await?;
        self.store
            .state
            .lock()
            .await
            .get_request(&self.actor, request_id)
    }

    async fn list_project_activity(&self) -> Result<Vec<ProjectActivity>, CoreError> {
        self.enter(Operation::ListProjectActivity).await?;
        Ok(self.store.state.lock().await.list_project_activity())
    }

    async fn list_conversation(&self, project_id: DbId) -> Result<Vec<ConversationTurn>, CoreError> {
        self.enter(Operation::ListConversation).await?;
        Ok(self.store.state.lock().await.list_conversation(project_id))
    }

    async fn get_latest_open_turn(
        &self,
        project_id: DbId,
    ) -> Result<Option<ConversationTurn>, CoreError> {
        self.enter(Operation::GetLatestOpenTurn).await?;
        Ok(self.store.state.lock().await.latest_open_turn(project_id))
    }

    async fn create_request(&self, input: NewRequest) -> Result<Request, CoreError> {
        self.enter(Operation::CreateRequest).await?;
        let request = self
            .store
            .state
            .lock()
            .await
            .create_request(&self.actor, &input, Utc::now())?;
        tracing::info!(
            request_id = request.id,
            submitter_id = request.submitter_id,
            "Request stored",
        );
        Ok(request)
    }

    async fn assign_resolver(
        &self,
        request_id: DbId,
        assignment: Assignment,
    ) -> Result<Request, CoreError> {
        self.enter(Operation::AssignResolver).await?;
        let request = self.store.state.lock().await.assign_resolver(
            &self.actor,
            request_id,
            &assignment,
            Utc::now(),
        )?;
        tracing::info!(
            request_id,
            resolver_id = assignment.resolver_id,
            "Resolver assigned",
        );
        Ok(request)
    }

    async fn update_resolver_status(
        &self,
        request_id: DbId,
        update: ResolverUpdate,
    ) -> Result<Request, CoreError> {
        self.enter(Operation::UpdateResolverStatus).await?;
        let request = self.store.state.lock().await.update_resolver_status(
            &self.actor,
            request_id,
            &update,
            Utc::now(),
        )?;
        tracing::info!(
            request_id,
            status = request.status.as_str(),
            working_hours = request.working_hours,
            "Resolver status updated",
        );
        Ok(request)
    }

    async fn decide_dept_head(
        &self,
        request_id: DbId,
        verdict: DeptHeadVerdict,
    ) -> Result<Request, CoreError> {
        self.enter(Operation::DecideDeptHead).await?;
        let request = self.store.state.lock().await.decide_dept_head(
            &self.actor,
            request_id,
            &verdict,
            Utc::now(),
        )?;
        tracing::info!(
            request_id,
            dept_head_status = request.dept_head_status.as_str(),
            "Department Head decision recorded",
        );
        Ok(request)
    }

    async fn post_assigner_turn(&self, input: NewTurn) -> Result<ConversationTurn, CoreError> {
        self.enter(Operation::PostAssignerTurn).await?;
        let turn = self
            .store
            .state
            .lock()
            .await
            .post_assigner_turn(&self.actor, &input, Utc::now())?;
        tracing::info!(turn_id = turn.id, project_id = turn.project_id, "Turn stored");
        Ok(turn)
    }

    async fn respond_to_turn(
        &self,
        turn_id: DbId,
        response: TurnResponse,
    ) -> Result<ConversationTurn, CoreError> {
        self.enter(Operation::RespondToTurn).await?;
        let result = self.store.state.lock().await.respond_to_turn(
            &self.actor,
            turn_id,
            &response,
            Utc::now(),
        );
        match &result {
            Ok(turn) => tracing::info!(
                turn_id,
                decision = turn.submitter_status.as_str(),
                "Turn answered",
            ),
            Err(CoreError::AlreadyResponded { .. }) => {
                tracing::warn!(turn_id, actor_id = self.actor.user_id, "Turn already answered")
            }
            Err(_) => {}
        }
        result
    }

    async fn upload_completion_attachment(
        &self,
        request_id: DbId,
        attachment: AttachmentRef,
    ) -> Result<Request, CoreError> {
        self.enter(Operation::UploadCompletionAttachment).await?;
        let request = self.store.state.lock().await.upload_completion_attachment(
            &self.actor,
            request_id,
            &attachment,
            Utc::now(),
        )?;
        tracing::info!(
            request_id,
            file = %attachment.name,
            "Completion attachment stored",
        );
        Ok(request)
    }
}
