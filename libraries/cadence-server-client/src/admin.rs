//! User management endpoints for staff accounts.

use crate::auth::endpoint;
use crate::client::{read_json, CadenceClient};
use crate::error::{Result, ServerClientError};
use crate::types::{AdminUpdateRequest, UserProfile};
use tracing::{debug, info};

impl CadenceClient {
    /// All registered users.
    pub async fn list_users(&self) -> Result<Vec<UserProfile>> {
        self.require_admin("list users").await?;

        let url = endpoint(&self.base_url, &["api", "users"])?;
        let users: Vec<UserProfile> = self.get_json(&url, "user list").await?;
        debug!(users = users.len(), "Fetched users");
        Ok(users)
    }

    /// Grant or revoke staff status.
    pub async fn set_user_admin(&self, user_id: i64, is_admin: bool) -> Result<UserProfile> {
        self.require_admin("change user roles").await?;

        let id = user_id.to_string();
        let url = endpoint(&self.base_url, &["api", "users", &id])?;
        let body = AdminUpdateRequest { is_staff: is_admin };

        let response = self
            .send_authorized(|http| Ok(http.patch(url.clone()).json(&body)))
            .await?;
        let user: UserProfile = read_json(response, "user").await?;
        info!(user_id, is_admin, "User role updated");
        Ok(user)
    }

    /// Delete another user's account.
    ///
    /// Deleting the signed-in account is refused locally.
    pub async fn delete_user(&self, user_id: i64) -> Result<()> {
        let me = self.require_admin("delete users").await?;
        if me.id == user_id {
            return Err(ServerClientError::Forbidden(
                "You cannot delete your own account".into(),
            ));
        }

        let id = user_id.to_string();
        let url = endpoint(&self.base_url, &["api", "users", &id])?;
        self.send_authorized(|http| Ok(http.delete(url.clone())))
            .await?;
        info!(user_id, "User deleted");
        Ok(())
    }

    /// Cached profile of a staff user, fetching it when nothing is cached.
    async fn require_admin(&self, action: &str) -> Result<UserProfile> {
        let user = match self.session.user().await {
            Some(user) => user,
            None => self.current_user().await?,
        };
        if user.is_admin() {
            Ok(user)
        } else {
            Err(ServerClientError::Forbidden(format!("Only admins can {}", action)))
        }
    }
}
