#![allow(dead_code)]

use std::sync::Arc;

use changedesk_core::attachment::AttachmentRef;
use changedesk_core::request::{NewRequest, Priority};
use changedesk_core::roles::{Actor, Role};
use changedesk_store::{MemorySession, MemoryStore};

pub const PROJECT_ID: i64 = 10;

pub const SUBMITTER: Actor = Actor {
    user_id: 1,
    role: Role::Submitter,
};
pub const ASSIGNER: Actor = Actor {
    user_id: 2,
    role: Role::Assigner,
};
pub const DEPT_HEAD: Actor = Actor {
    user_id: 3,
    role: Role::DeptHead,
};
pub const RESOLVER: Actor = Actor {
    user_id: 4,
    role: Role::Resolver,
};

/// A store with one project and one user per role.
pub async fn seeded_store() -> Arc<MemoryStore> {
    seed(MemoryStore::new()).await
}

pub async fn seed(store: MemoryStore) -> Arc<MemoryStore> {
    let store = Arc::new(store);
    store.register_project(PROJECT_ID, "Payroll Portal").await;
    store.register_user(1, "Nadia Rahman", Role::Submitter).await;
    store.register_user(2, "Omar Haddad", Role::Assigner).await;
    store.register_user(3, "Leila Costa", Role::DeptHead).await;
    store.register_user(4, "Ravi Menon", Role::Resolver).await;
    store
}

pub fn session(store: &Arc<MemoryStore>, actor: Actor) -> MemorySession {
    store.session(actor)
}

pub fn valid_form() -> NewRequest {
    NewRequest {
        project_id: Some(PROJECT_ID),
        category_id: Some(1),
        priority: Priority::Normal,
        request_details: "Add CSV export to payslip screen".into(),
        submitted_by_name: "Nadia Rahman".into(),
        ..Default::default()
    }
}

pub fn pdf(name: &str) -> AttachmentRef {
    AttachmentRef::new(format!("file:///tmp/{name}"), "application/pdf", name, 2_048)
}
