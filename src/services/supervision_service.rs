use crate::models::supervisor_delegate::{SupervisorDelegate, SupervisorDelegateView};
use crate::models::user::{Role, User};
use crate::repositories::{RepositoryError, SupervisorDelegateRepository, UserRepository};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum SupervisionError {
    #[error("A user cannot supervise themself")]
    SelfAssignment,
    #[error("Supervisor not found")]
    SupervisorNotFound,
    #[error("Delegate not found")]
    DelegateNotFound,
    #[error("User {0} does not have the supervisor role")]
    NotASupervisor(i64),
    #[error("User {0} does not have the delegate role")]
    NotADelegate(i64),
    #[error("Delegate is already assigned to this supervisor")]
    AlreadyAssigned,
    #[error("Assignment not found")]
    LinkNotFound,
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

pub struct SupervisionService {
    links: Arc<dyn SupervisorDelegateRepository>,
    users: Arc<dyn UserRepository>,
}

impl SupervisionService {
    pub fn new(
        links: Arc<dyn SupervisorDelegateRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self { links, users }
    }

    pub async fn assign(
        &self,
        supervisor_id: i64,
        delegate_id: i64,
    ) -> Result<SupervisorDelegate, SupervisionError> {
        if supervisor_id == delegate_id {
            return Err(SupervisionError::SelfAssignment);
        }

        let supervisor = self
            .users
            .find_by_id(supervisor_id)
            .await?
            .ok_or(SupervisionError::SupervisorNotFound)?;
        if supervisor.role != Role::Supervisor {
            return Err(SupervisionError::NotASupervisor(supervisor_id));
        }

        let delegate = self
            .users
            .find_by_id(delegate_id)
            .await?
            .ok_or(SupervisionError::DelegateNotFound)?;
        if delegate.role != Role::Delegate {
            return Err(SupervisionError::NotADelegate(delegate_id));
        }

        match self.links.create(supervisor_id, delegate_id).await {
            Ok(link) => {
                tracing::info!(
                    "Assigned delegate {} to supervisor {}",
                    delegate_id,
                    supervisor_id
                );
                Ok(link)
            }
            Err(RepositoryError::AlreadyExists(_)) => Err(SupervisionError::AlreadyAssigned),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_links(&self) -> Result<Vec<SupervisorDelegateView>, SupervisionError> {
        Ok(self.links.list_all().await?)
    }

    pub async fn delegates_of(&self, supervisor_id: i64) -> Result<Vec<User>, SupervisionError> {
        Ok(self.links.delegates_of(supervisor_id).await?)
    }

    pub async fn supervisors_of(&self, delegate_id: i64) -> Result<Vec<User>, SupervisionError> {
        Ok(self.links.supervisors_of(delegate_id).await?)
    }

    pub async fn unassign(&self, link_id: i64) -> Result<(), SupervisionError> {
        match self.links.delete(link_id).await {
            Ok(()) => {
                tracing::info!("Removed supervisor assignment {}", link_id);
                Ok(())
            }
            Err(RepositoryError::NotFound) => Err(SupervisionError::LinkNotFound),
            Err(e) => Err(e.into()),
        }
    }
}
