//! Authoritative record state and the write-time rules applied to it.
//!
//! Every method here runs while the caller holds the store lock, so the
//! check and the write it guards are one atomic step. Role checks happen
//! one layer up in [`crate::memory::MemorySession`]; visibility scoping
//! happens here because it depends on the stored rows.

use std::collections::BTreeMap;

use changedesk_core::attachment::AttachmentRef;
use changedesk_core::conversation::{
    build_turn, latest_open_turn, summarize_activity, thread_for, ConversationTurn, NewTurn,
    ProjectActivity, TurnResponse,
};
use changedesk_core::error::CoreError;
use changedesk_core::request::{
    count_pending_for, validate_assignment, validate_completion_attachment,
    validate_dept_head_decision, validate_resolver_update, validate_submission, Assignment,
    DeptHeadVerdict, NewRequest, Request, ResolverUpdate,
};
use changedesk_core::roles::{Actor, Role};
use changedesk_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRecord {
    pub id: DbId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: DbId,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Default)]
pub struct StoreState {
    projects: BTreeMap<DbId, ProjectRecord>,
    users: BTreeMap<DbId, UserRecord>,
    requests: BTreeMap<DbId, Request>,
    turns: BTreeMap<DbId, ConversationTurn>,
    last_request_id: DbId,
    last_turn_id: DbId,
}

/// Whether `actor` may see `request` at all.
///
/// Submitters see their own requests, resolvers the ones routed to them,
/// Department Heads the gated ones, and Assigners everything.
pub fn is_visible(actor: &Actor, request: &Request) -> bool {
    match actor.role {
        Role::Assigner => true,
        Role::Submitter => request.submitter_id == actor.user_id,
        Role::DeptHead => request.dept_head_required,
        Role::Resolver => request.assigned_resolver_id == Some(actor.user_id),
    }
}

impl StoreState {
    // -----------------------------------------------------------------------
    // Directory
    // -----------------------------------------------------------------------

    pub fn upsert_project(&mut self, id: DbId, name: impl Into<String>) {
        self.projects.insert(
            id,
            ProjectRecord {
                id,
                name: name.into(),
            },
        );
    }

    pub fn upsert_user(&mut self, id: DbId, name: impl Into<String>, role: Role) {
        self.users.insert(
            id,
            UserRecord {
                id,
                name: name.into(),
                role,
            },
        );
    }

    fn project_name(&self, project_id: DbId) -> Option<String> {
        self.projects.get(&project_id).map(|p| p.name.clone())
    }

    fn user_name(&self, user_id: DbId) -> Option<String> {
        self.users.get(&user_id).map(|u| u.name.clone())
    }

    fn require_project(&self, project_id: DbId) -> Result<(), CoreError> {
        if self.projects.contains_key(&project_id) {
            Ok(())
        } else {
            Err(CoreError::NotFound {
                entity: "project",
                id: project_id,
            })
        }
    }

    // -----------------------------------------------------------------------
    // Requests
    // -----------------------------------------------------------------------

    /// Requests visible to `actor`, newest first.
    pub fn list_requests(&self, actor: &Actor) -> Vec<Request> {
        let mut visible: Vec<Request> = self
            .requests
            .values()
            .filter(|r| is_visible(actor, r))
            .cloned()
            .collect();
        visible.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        visible
    }

    /// Look up a request, treating invisible rows as missing.
    pub fn get_request(&self, actor: &Actor, request_id: DbId) -> Result<Request, CoreError> {
        self.visible(actor, request_id).cloned()
    }

    fn visible(&self, actor: &Actor, request_id: DbId) -> Result<&Request, CoreError> {
        self.requests
            .get(&request_id)
            .filter(|r| is_visible(actor, r))
            .ok_or(CoreError::NotFound {
                entity: "request",
                id: request_id,
            })
    }

    fn visible_mut(&mut self, actor: &Actor, request_id: DbId) -> Result<&mut Request, CoreError> {
        self.requests
            .get_mut(&request_id)
            .filter(|r| is_visible(actor, r))
            .ok_or(CoreError::NotFound {
                entity: "request",
                id: request_id,
            })
    }

    /// Create a request, counting the submitter's pending rows at write time.
    pub fn create_request(
        &mut self,
        actor: &Actor,
        input: &NewRequest,
        now: Timestamp,
    ) -> Result<Request, CoreError> {
        let pending = count_pending_for(self.requests.values(), actor.user_id);
        let id = self.last_request_id + 1;
        let mut request = validate_submission(id, actor.user_id, input, pending, now)?;
        self.require_project(request.project_id)?;

        request.project_name = self.project_name(request.project_id);
        self.last_request_id = id;
        self.requests.insert(id, request.clone());
        Ok(request)
    }

    pub fn assign_resolver(
        &mut self,
        actor: &Actor,
        request_id: DbId,
        assignment: &Assignment,
        now: Timestamp,
    ) -> Result<Request, CoreError> {
        let registered = matches!(
            self.users.get(&assignment.resolver_id),
            Some(user) if user.role == Role::Resolver
        );
        let request = self.visible_mut(actor, request_id)?;

        // Request state errors take precedence over a bad resolver id.
        let mut assigned = request.clone();
        validate_assignment(&mut assigned, assignment, now)?;
        if !registered {
            return Err(CoreError::validation("resolver_id", "invalid_resolver"));
        }
        *request = assigned;
        Ok(request.clone())
    }

    pub fn update_resolver_status(
        &mut self,
        actor: &Actor,
        request_id: DbId,
        update: &ResolverUpdate,
        now: Timestamp,
    ) -> Result<Request, CoreError> {
        let request = self.visible_mut(actor, request_id)?;
        validate_resolver_update(request, update, now)?;
        Ok(request.clone())
    }

    pub fn decide_dept_head(
        &mut self,
        actor: &Actor,
        request_id: DbId,
        verdict: &DeptHeadVerdict,
        now: Timestamp,
    ) -> Result<Request, CoreError> {
        let request = self.visible_mut(actor, request_id)?;
        validate_dept_head_decision(request, verdict, now)?;
        Ok(request.clone())
    }

    pub fn upload_completion_attachment(
        &mut self,
        actor: &Actor,
        request_id: DbId,
        attachment: &AttachmentRef,
        now: Timestamp,
    ) -> Result<Request, CoreError> {
        let request = self.visible_mut(actor, request_id)?;
        validate_completion_attachment(request, attachment, now)?;
        Ok(request.clone())
    }

    // -----------------------------------------------------------------------
    // Conversation
    // -----------------------------------------------------------------------

    pub fn list_project_activity(&self) -> Vec<ProjectActivity> {
        summarize_activity(self.turns.values(), |id| self.project_name(id))
    }

    pub fn list_conversation(&self, project_id: DbId) -> Vec<ConversationTurn> {
        thread_for(self.turns.values(), project_id)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn latest_open_turn(&self, project_id: DbId) -> Option<ConversationTurn> {
        latest_open_turn(self.turns.values(), project_id).cloned()
    }

    pub fn post_assigner_turn(
        &mut self,
        actor: &Actor,
        input: &NewTurn,
        now: Timestamp,
    ) -> Result<ConversationTurn, CoreError> {
        self.require_project(input.project_id)?;
        if let Some(request_id) = input.request_id {
            match self.requests.get(&request_id) {
                Some(r) if r.project_id == input.project_id => {}
                _ => {
                    return Err(CoreError::NotFound {
                        entity: "request",
                        id: request_id,
                    })
                }
            }
        }

        let id = self.last_turn_id + 1;
        let turn = build_turn(id, actor.user_id, self.user_name(actor.user_id), input, now)?;
        self.last_turn_id = id;
        self.turns.insert(id, turn.clone());
        Ok(turn)
    }

    /// Record a response against the stored turn, not the caller's copy.
    pub fn respond_to_turn(
        &mut self,
        actor: &Actor,
        turn_id: DbId,
        response: &TurnResponse,
        now: Timestamp,
    ) -> Result<ConversationTurn, CoreError> {
        let turn = self.turns.get_mut(&turn_id).ok_or(CoreError::NotFound {
            entity: "turn",
            id: turn_id,
        })?;
        turn.respond(actor.user_id, response, now)?;
        Ok(turn.clone())
    }
}
