//! The session capability: an authenticated handle onto the system of record.
//!
//! A session is constructed once per authenticated actor and passed into
//! every core operation. The core never sees tokens; implementations own
//! authentication and transport. Every mutating call must re-validate its
//! preconditions against the authoritative record at the moment of write.

use async_trait::async_trait;

use crate::attachment::AttachmentRef;
use crate::conversation::{ConversationTurn, NewTurn, ProjectActivity, TurnResponse};
use crate::error::CoreError;
use crate::request::{Assignment, DeptHeadVerdict, NewRequest, Request, ResolverUpdate};
use crate::roles::Actor;
use crate::types::DbId;

/// Remote reads and writes performed on behalf of one actor.
///
/// Implementations may return [`CoreError::Transient`] and
/// [`CoreError::Unauthorized`]; the pure validation layer never does.
#[async_trait]
pub trait SessionCapability: Send + Sync {
    /// The identity this session acts as.
    fn actor(&self) -> Actor;

    // ---- idempotent reads ----

    /// Requests visible to the actor's role, newest first.
    async fn list_requests(&self) -> Result<Vec<Request>, CoreError>;

    async fn get_request(&self, request_id: DbId) -> Result<Request, CoreError>;

    /// One summary row per project with conversation activity.
    async fn list_project_activity(&self) -> Result<Vec<ProjectActivity>, CoreError>;

    /// The project's thread, oldest first.
    async fn list_conversation(&self, project_id: DbId) -> Result<Vec<ConversationTurn>, CoreError>;

    async fn get_latest_open_turn(
        &self,
        project_id: DbId,
    ) -> Result<Option<ConversationTurn>, CoreError>;

    // ---- mutations ----

    async fn create_request(&self, input: NewRequest) -> Result<Request, CoreError>;

    async fn assign_resolver(
        &self,
        request_id: DbId,
        assignment: Assignment,
    ) -> Result<Request, CoreError>;

    async fn update_resolver_status(
        &self,
        request_id: DbId,
        update: ResolverUpdate,
    ) -> Result<Request, CoreError>;

    async fn decide_dept_head(
        &self,
        request_id: DbId,
        verdict: DeptHeadVerdict,
    ) -> Result<Request, CoreError>;

    async fn post_assigner_turn(&self, input: NewTurn) -> Result<ConversationTurn, CoreError>;

    /// Must fail with [`CoreError::AlreadyResponded`] when the stored turn
    /// already carries a verdict, even if the caller's copy looked open.
    async fn respond_to_turn(
        &self,
        turn_id: DbId,
        response: TurnResponse,
    ) -> Result<ConversationTurn, CoreError>;

    async fn upload_completion_attachment(
        &self,
        request_id: DbId,
        attachment: AttachmentRef,
    ) -> Result<Request, CoreError>;
}
