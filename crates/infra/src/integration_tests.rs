//! Integration tests for the credential and role flows against the real store.
//!
//! Tests: register → login → validate → role change → refresh
//!
//! Verifies:
//! - Login failures are indistinguishable
//! - A role change shows up on the next refresh, not in live access tokens
//! - Rejected mutations leave the stored row unchanged

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use roster_auth::{
        Authorizer, CredentialError, CredentialHasher, CredentialService, HashingCost, Hs256Jwt, NewUser,
        Permission, Role, RolePermissionTable, TokenError, TokenLifetimes, UserStore, change_role,
    };
    use roster_core::{DomainError, UserId};

    use crate::InMemoryUserStore;

    fn cheap_hasher() -> Arc<CredentialHasher> {
        Arc::new(
            CredentialHasher::new(HashingCost {
                memory_kib: 8,
                iterations: 1,
            })
            .unwrap(),
        )
    }

    fn setup() -> (Arc<InMemoryUserStore>, CredentialService<Arc<InMemoryUserStore>>) {
        let store = Arc::new(InMemoryUserStore::new());
        let tokens = Arc::new(Hs256Jwt::new(b"integration-secret", TokenLifetimes::default()));
        let authorizer = Authorizer::new(Arc::new(RolePermissionTable::standard()));
        let service = CredentialService::new(store.clone(), tokens, cheap_hasher(), authorizer);
        (store, service)
    }

    fn register(service: &CredentialService<Arc<InMemoryUserStore>>, username: &str, role: Role) -> UserId {
        service
            .register(
                NewUser {
                    username: username.to_string(),
                    email: format!("{username}@example.com"),
                    password: format!("{username}pass123"),
                    role,
                },
                Utc::now(),
            )
            .unwrap()
            .id
    }

    #[test]
    fn login_issues_tokens_and_role_permissions() {
        let (_store, service) = setup();
        register(&service, "manager", Role::Manager);

        let issued = service.issue("manager", "managerpass123", Utc::now()).unwrap();

        assert_eq!(issued.user.role, Role::Manager);
        assert_eq!(
            issued.permissions,
            vec![Permission::ViewUsers, Permission::CreateUsers, Permission::UpdateUsers]
        );
        assert_eq!(issued.expires_in, 300);

        let claims = service.validate(&issued.access, Utc::now()).unwrap();
        assert_eq!(claims.sub, "manager");
        assert_eq!(claims.role, Role::Manager);
    }

    #[test]
    fn admin_login_reports_every_permission() {
        let (_store, service) = setup();
        register(&service, "admin", Role::Admin);

        let issued = service.issue("admin", "adminpass123", Utc::now()).unwrap();
        assert_eq!(issued.permissions, Permission::ALL.to_vec());
    }

    #[test]
    fn unknown_user_and_wrong_password_look_the_same() {
        let (_store, service) = setup();
        register(&service, "user", Role::User);

        let wrong_password = service.issue("user", "nope", Utc::now()).unwrap_err();
        let unknown_user = service.issue("ghost", "userpass123", Utc::now()).unwrap_err();

        assert!(matches!(wrong_password, CredentialError::InvalidCredentials));
        assert!(matches!(unknown_user, CredentialError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[test]
    fn role_change_applies_on_refresh_but_not_to_live_access_tokens() {
        let (store, service) = setup();
        let user_id = register(&service, "user", Role::User);

        let now = Utc::now();
        let issued = service.issue("user", "userpass123", now).unwrap();

        change_role(store.as_ref(), &user_id, "Manager").unwrap();
        assert_eq!(store.get(&user_id).unwrap().role, Role::Manager);

        // The old access token still validates and still says User.
        let stale = service.validate(&issued.access, now).unwrap();
        assert_eq!(stale.role, Role::User);

        let grant = service.refresh(&issued.refresh, now).unwrap();
        assert_eq!(grant.role, Role::Manager);
        let fresh = service.validate(&grant.access, now).unwrap();
        assert_eq!(fresh.role, Role::Manager);
        assert_eq!(fresh.uid, user_id);
    }

    #[test]
    fn refresh_rejects_access_tokens_and_deleted_subjects() {
        let (store, service) = setup();
        let user_id = register(&service, "temp", Role::User);
        let now = Utc::now();
        let issued = service.issue("temp", "temppass123", now).unwrap();

        let err = service.refresh(&issued.access, now).unwrap_err();
        assert!(matches!(err, CredentialError::Token(TokenError::Invalid(_))));

        store.delete(&user_id).unwrap();
        let err = service.refresh(&issued.refresh, now).unwrap_err();
        assert!(matches!(err, CredentialError::Token(TokenError::Invalid(_))));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let (_store, service) = setup();
        register(&service, "late", Role::User);
        let then = Utc::now() - Duration::days(2);
        let issued = service.issue("late", "latepass123", then).unwrap();

        assert_eq!(service.validate(&issued.access, Utc::now()), Err(TokenError::Expired));
        assert!(matches!(
            service.refresh(&issued.refresh, Utc::now()),
            Err(CredentialError::Token(TokenError::Expired))
        ));
    }

    #[test]
    fn change_role_validates_after_lookup_and_leaves_row_untouched() {
        let (store, service) = setup();
        let user_id = register(&service, "user", Role::User);

        let err = change_role(store.as_ref(), &user_id, "Owner").unwrap_err();
        assert_eq!(err.field(), Some("role"));
        assert_eq!(store.get(&user_id).unwrap().role, Role::User);

        // Unknown target wins over an invalid role name.
        let err = change_role(store.as_ref(), &UserId::new(), "Owner").unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn change_role_reports_previous_role() {
        let (store, service) = setup();
        let user_id = register(&service, "promoted", Role::User);

        let change = change_role(store.as_ref(), &user_id, "Admin").unwrap();
        assert_eq!(change.previous, Role::User);
        assert_eq!(change.user.role, Role::Admin);
    }

    #[test]
    fn duplicate_registration_is_a_username_validation_error() {
        let (store, service) = setup();
        register(&service, "alice", Role::User);

        let err = service
            .register(
                NewUser {
                    username: "alice".to_string(),
                    email: "other@example.com".to_string(),
                    password: "pw".to_string(),
                    role: Role::User,
                },
                Utc::now(),
            )
            .unwrap_err();

        match err {
            CredentialError::Domain(e) => assert_eq!(e.field(), Some("username")),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn stored_secret_is_hashed() {
        let (store, service) = setup();
        let user_id = register(&service, "hashed", Role::User);

        let row = store.get(&user_id).unwrap();
        assert_ne!(row.password_hash, "hashedpass123");
        assert!(row.password_hash.starts_with("$argon2id$"));
    }

    #[test]
    fn change_password_requires_current_secret_when_given() {
        let (_store, service) = setup();
        let user_id = register(&service, "pat", Role::User);

        let err = service.change_password(&user_id, Some("wrong"), "newpass456").unwrap_err();
        assert!(matches!(err, CredentialError::InvalidCredentials));

        service.change_password(&user_id, Some("patpass123"), "newpass456").unwrap();
        assert!(service.issue("pat", "patpass123", Utc::now()).is_err());
        assert!(service.issue("pat", "newpass456", Utc::now()).is_ok());

        // Admin reset path: no current secret.
        service.change_password(&user_id, None, "reset789").unwrap();
        assert!(service.issue("pat", "reset789", Utc::now()).is_ok());
    }
}
