//! Roles, the acting identity of a session, and operation permissions.
//!
//! Role names must match the values issued by the authentication backend.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

pub const ROLE_SUBMITTER: &str = "submitter";
pub const ROLE_ASSIGNER: &str = "assigner";
pub const ROLE_DEPT_HEAD: &str = "depthead";
pub const ROLE_RESOLVER: &str = "resolver";

/// The fixed cast of roles a request passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Submitter,
    Assigner,
    #[serde(rename = "depthead")]
    DeptHead,
    Resolver,
}

impl Role {
    /// Parse from the wire name. Accepts `dept_head` / `dept-head` as aliases.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name.trim().to_ascii_lowercase().as_str() {
            ROLE_SUBMITTER | "user" => Ok(Self::Submitter),
            ROLE_ASSIGNER => Ok(Self::Assigner),
            ROLE_DEPT_HEAD | "dept_head" | "dept-head" => Ok(Self::DeptHead),
            ROLE_RESOLVER => Ok(Self::Resolver),
            _ => Err(CoreError::validation("role", "invalid_role")),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submitter => ROLE_SUBMITTER,
            Self::Assigner => ROLE_ASSIGNER,
            Self::DeptHead => ROLE_DEPT_HEAD,
            Self::Resolver => ROLE_RESOLVER,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Submitter => "Submitter",
            Self::Assigner => "Assigner",
            Self::DeptHead => "Department Head",
            Self::Resolver => "Resolver",
        }
    }
}

/// The authenticated user a session acts as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: DbId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: DbId, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Every operation exposed by a session capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListRequests,
    GetRequest,
    ListProjectActivity,
    ListConversation,
    GetLatestOpenTurn,
    CreateRequest,
    AssignResolver,
    UpdateResolverStatus,
    DecideDeptHead,
    PostAssignerTurn,
    RespondToTurn,
    UploadCompletionAttachment,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Self::ListRequests => "list_requests",
            Self::GetRequest => "get_request",
            Self::ListProjectActivity => "list_project_activity",
            Self::ListConversation => "list_conversation",
            Self::GetLatestOpenTurn => "get_latest_open_turn",
            Self::CreateRequest => "create_request",
            Self::AssignResolver => "assign_resolver",
            Self::UpdateResolverStatus => "update_resolver_status",
            Self::DecideDeptHead => "decide_dept_head",
            Self::PostAssignerTurn => "post_assigner_turn",
            Self::RespondToTurn => "respond_to_turn",
            Self::UploadCompletionAttachment => "upload_completion_attachment",
        }
    }

    /// Roles allowed to perform this operation.
    pub fn allowed_roles(self) -> &'static [Role] {
        use Role::*;
        match self {
            Self::ListRequests | Self::GetRequest => &[Submitter, Assigner, DeptHead, Resolver],
            Self::ListProjectActivity | Self::ListConversation => &[Assigner, DeptHead],
            Self::GetLatestOpenTurn | Self::DecideDeptHead | Self::RespondToTurn => &[DeptHead],
            Self::CreateRequest => &[Submitter],
            Self::AssignResolver | Self::PostAssignerTurn | Self::UploadCompletionAttachment => {
                &[Assigner]
            }
            Self::UpdateResolverStatus => &[Resolver],
        }
    }
}

/// Fail with [`CoreError::Unauthorized`] unless `actor` may perform `op`.
pub fn check_permission(actor: &Actor, op: Operation) -> Result<(), CoreError> {
    if op.allowed_roles().contains(&actor.role) {
        Ok(())
    } else {
        Err(CoreError::Unauthorized(format!(
            "{} may not perform {}",
            actor.role.label(),
            op.name()
        )))
    }
}
