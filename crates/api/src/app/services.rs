//! Service wiring for the HTTP layer.

use std::sync::Arc;

use chrono::Utc;

use courseadmin_auth::{
    AccountService, Argon2PasswordEncoder, Authenticator, CredentialVerifier, Hs256Tokens,
    PasswordEncoder, RoleStore, SigningKey, TokenIssuer, TokenValidator,
};
use courseadmin_core::DomainResult;
use courseadmin_courses::{
    AssignmentService, CourseService, EnrollmentService, ModuleService, TaskService,
};
use courseadmin_infra::InMemoryBackend;

use crate::config::BootstrapAdmin;

/// Everything a handler can reach, shared through an `Extension`.
#[derive(Clone)]
pub struct AppServices {
    pub accounts: AccountService,
    pub authenticator: Authenticator,
    pub tokens: Arc<dyn TokenValidator>,
    pub roles: Arc<dyn RoleStore>,
    pub courses: CourseService,
    pub modules: ModuleService,
    pub tasks: TaskService,
    pub enrollments: EnrollmentService,
    pub assignments: AssignmentService,
}

impl AppServices {
    /// Wire every service over fresh in-memory stores.
    pub fn in_memory(key: &SigningKey) -> DomainResult<Self> {
        let backend = InMemoryBackend::new()?;
        let stores = backend.stores();
        let passwords: Arc<dyn PasswordEncoder> = Arc::new(Argon2PasswordEncoder);
        let tokens = Arc::new(Hs256Tokens::new(key));
        let issuer: Arc<dyn TokenIssuer> = tokens.clone();

        let verifier = CredentialVerifier::new(stores.users.clone(), passwords.clone())?;
        let authenticator = Authenticator::new(verifier, issuer, stores.users.clone());
        let accounts = AccountService::new(stores.users.clone(), backend.identity.clone(), passwords);

        Ok(Self {
            accounts,
            authenticator,
            tokens,
            roles: backend.identity.clone(),
            courses: CourseService::new(stores.clone()),
            modules: ModuleService::new(stores.clone()),
            tasks: TaskService::new(stores.clone()),
            enrollments: EnrollmentService::new(stores.clone()),
            assignments: AssignmentService::new(stores),
        })
    }

    /// Create the configured administrator if it does not exist yet.
    pub fn bootstrap_admin(&self, admin: &BootstrapAdmin) -> DomainResult<()> {
        let user = self
            .accounts
            .ensure_admin(&admin.username, &admin.password, &admin.email, Utc::now())?;
        tracing::info!(user_id = %user.id, username = %user.username, "bootstrap administrator ready");
        Ok(())
    }
}
