//! Integration tests for the full read/write pipeline.
//!
//! Tests: Identity → Scope → Engine/Guard → Store
//!
//! Verifies:
//! - Role scopes change what reads return and what writes may touch
//! - Out-of-scope records are indistinguishable from missing ones
//! - Account deletion cascades to owned listings
//! - Login/signup halt on every failure before a token is signed

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use rentdesk_auth::{
        Account, AccountParams, AccountPatch, Argon2Hasher, CredentialHasher, Hs256Jwt, Identity,
        JwtValidator, NewAccount, Registration, RoleKind, TokenConfig,
    };
    use rentdesk_core::{DomainError, ListingId, UserId};
    use rentdesk_listings::{Listing, ListingParams, ListingPatch, NewListing};

    use crate::auth_service::{AuthService, LoginRequest};
    use crate::listing_engine::{ListingEngine, ListingView};
    use crate::mutation_guard::MutationGuard;
    use crate::store::{AccountStore, InMemoryStore, ListingStore};

    struct Harness {
        accounts: Arc<InMemoryStore<Account>>,
        listings: Arc<InMemoryStore<Listing>>,
        hasher: Arc<Argon2Hasher>,
        jwt: Arc<Hs256Jwt>,
        engine: ListingEngine,
        guard: MutationGuard,
        auth: AuthService,
    }

    fn setup() -> Harness {
        let accounts = Arc::new(InMemoryStore::<Account>::new());
        let listings = Arc::new(InMemoryStore::<Listing>::new());
        let hasher = Arc::new(Argon2Hasher::with_cost(8, 1, 1).unwrap());
        let jwt = Arc::new(Hs256Jwt::new(&TokenConfig::new(
            "test-secret",
            chrono::Duration::hours(1),
        )));

        let engine = ListingEngine::new(listings.clone(), accounts.clone());
        let guard = MutationGuard::new(listings.clone(), accounts.clone(), hasher.clone());
        let auth = AuthService::new(accounts.clone(), hasher.clone(), jwt.clone());
        Harness {
            accounts,
            listings,
            hasher,
            jwt,
            engine,
            guard,
            auth,
        }
    }

    const PASSWORD: &str = "Passw0rd!";

    fn signup_payload(email: &str, role: Option<&str>) -> NewAccount {
        NewAccount {
            first_name: Some("Test".to_string()),
            last_name: Some("User".to_string()),
            email: Some(email.to_string()),
            password: Some(PASSWORD.to_string()),
            repassword: Some(PASSWORD.to_string()),
            role: role.map(str::to_string),
        }
    }

    async fn seed(h: &Harness, email: &str, role: RoleKind) -> Identity {
        let validated = signup_payload(email, Some(role.as_str()))
            .validate(Registration::ByAdmin)
            .unwrap();
        let digest = h.hasher.hash(PASSWORD).unwrap();
        let account = h
            .accounts
            .insert(Account::register(validated, digest, Utc::now()))
            .await
            .unwrap();
        account.identity()
    }

    fn listing_payload(price: f64, rentable: bool) -> NewListing {
        NewListing {
            name: Some("Flat".to_string()),
            description: Some("Sunny".to_string()),
            location: Some("Porto".to_string()),
            floor_size: Some(45.5),
            price: Some(price),
            lat: Some(41.15),
            lng: Some(-8.61),
            rooms: Some(2.0),
            realtor: None,
            rentable: Some(rentable),
        }
    }

    async fn add_listing(h: &Harness, realtor: &Identity, price: f64, rentable: bool) -> Listing {
        h.guard
            .create_listing(realtor, listing_payload(price, rentable))
            .await
            .unwrap()
    }

    fn params(current_page: &str, rows_count: &str) -> ListingParams {
        ListingParams {
            current_page: Some(current_page.to_string()),
            rows_count: Some(rows_count.to_string()),
            ..Default::default()
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn default_query_on_empty_collection_returns_nothing() {
        let h = setup();
        let admin = seed(&h, "admin@example.com", RoleKind::Admin).await;
        let page = h.engine.list(&admin, &ListingParams::default()).await.unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.total_count, 0);
    }

    #[tokio::test]
    async fn last_page_is_partial_and_count_ignores_pagination() {
        let h = setup();
        let realtor = seed(&h, "realtor@example.com", RoleKind::Realtor).await;
        for i in 0..7 {
            add_listing(&h, &realtor, 100.0 + f64::from(i), true).await;
        }

        let page = h.engine.list(&realtor, &params("1", "5")).await.unwrap();
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.total_count, 7);

        let beyond = h.engine.list(&realtor, &params("9", "5")).await.unwrap();
        assert!(beyond.records.is_empty());
        assert_eq!(beyond.total_count, 7);
    }

    #[tokio::test]
    async fn clients_never_receive_unrentable_listings() {
        let h = setup();
        let realtor = seed(&h, "realtor@example.com", RoleKind::Realtor).await;
        let client = seed(&h, "client@example.com", RoleKind::Client).await;
        add_listing(&h, &realtor, 100.0, true).await;
        add_listing(&h, &realtor, 200.0, false).await;

        let page = h.engine.list(&client, &ListingParams::default()).await.unwrap();
        assert_eq!(page.total_count, 1);
        assert!(page.records.iter().all(|l| l.rentable));

        let asking = ListingParams {
            rentable: Some("unrentable".to_string()),
            ..Default::default()
        };
        let page = h.engine.list(&client, &asking).await.unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.total_count, 0);

        let map = h.engine.list_all(&client, &ListingParams::default()).await.unwrap();
        assert_eq!(map.total_count, 1);
    }

    #[tokio::test]
    async fn realtors_see_only_their_own_listings() {
        let h = setup();
        let r1 = seed(&h, "r1@example.com", RoleKind::Realtor).await;
        let r2 = seed(&h, "r2@example.com", RoleKind::Realtor).await;
        add_listing(&h, &r1, 100.0, true).await;
        add_listing(&h, &r2, 100.0, true).await;
        add_listing(&h, &r2, 150.0, false).await;

        let page = h.engine.list(&r2, &ListingParams::default()).await.unwrap();
        assert_eq!(page.total_count, 2);
        assert!(page.records.iter().all(|l| l.realtor.id == r2.user_id));
    }

    #[tokio::test]
    async fn price_range_and_sort_apply_together() {
        let h = setup();
        let admin = seed(&h, "admin@example.com", RoleKind::Admin).await;
        let realtor = seed(&h, "realtor@example.com", RoleKind::Realtor).await;
        for price in [500.0, 50.0, 900.0, 300.0] {
            add_listing(&h, &realtor, price, true).await;
        }

        let query = ListingParams {
            order: Some("desc".to_string()),
            order_by: Some("pricePerMonth".to_string()),
            price_min: Some("100".to_string()),
            price_max: Some("800".to_string()),
            ..Default::default()
        };
        let page = h.engine.list(&admin, &query).await.unwrap();
        let prices: Vec<f64> = page.records.iter().map(|l| l.price_per_month).collect();
        assert_eq!(prices, vec![500.0, 300.0]);
    }

    #[tokio::test]
    async fn invalid_parameters_surface_as_validation_errors() {
        let h = setup();
        let admin = seed(&h, "admin@example.com", RoleKind::Admin).await;
        let query = ListingParams {
            order_by: Some("password".to_string()),
            ..Default::default()
        };
        let err = h.engine.list(&admin, &query).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "orderBy"));
    }

    #[tokio::test]
    async fn reads_embed_the_owner_profile() {
        let h = setup();
        let client = seed(&h, "client@example.com", RoleKind::Client).await;
        let r1 = seed(&h, "r1@example.com", RoleKind::Realtor).await;
        let r2 = seed(&h, "r2@example.com", RoleKind::Realtor).await;
        add_listing(&h, &r1, 100.0, true).await;
        add_listing(&h, &r2, 200.0, true).await;
        add_listing(&h, &r1, 300.0, true).await;

        let page = h.engine.list_all(&client, &ListingParams::default()).await.unwrap();
        assert_eq!(page.records.len(), 3);
        for view in &page.records {
            let profile = view.realtor.profile.as_ref().unwrap();
            assert_eq!(profile.first_name, "Test");
            assert_eq!(profile.role, RoleKind::Realtor);
            let expected = if view.realtor.id == r1.user_id { "r1@example.com" } else { "r2@example.com" };
            assert_eq!(profile.email, expected);
        }

        let json = serde_json::to_value(&page.records[0]).unwrap();
        assert_eq!(json["realtor"]["first_name"], "Test");
        assert!(json["realtor"].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn missing_owner_leaves_only_the_id() {
        let h = setup();
        let admin = seed(&h, "admin@example.com", RoleKind::Admin).await;
        let realtor = seed(&h, "realtor@example.com", RoleKind::Realtor).await;
        add_listing(&h, &realtor, 100.0, true).await;
        h.accounts.remove(realtor.user_id).await.unwrap();

        let page = h.engine.list(&admin, &ListingParams::default()).await.unwrap();
        assert_eq!(page.records[0].realtor.id, realtor.user_id);
        assert!(page.records[0].realtor.profile.is_none());
    }

    #[tokio::test]
    async fn admin_directory_hides_self_and_admins() {
        let h = setup();
        let admin = seed(&h, "admin@example.com", RoleKind::Admin).await;
        seed(&h, "other-admin@example.com", RoleKind::Admin).await;
        seed(&h, "realtor@example.com", RoleKind::Realtor).await;
        seed(&h, "client@example.com", RoleKind::Client).await;

        let page = h.engine.list_accounts(&admin, &AccountParams::default()).await.unwrap();
        assert_eq!(page.total_count, 2);
        assert!(page.records.iter().all(|a| a.role != RoleKind::Admin));

        let owners = h.engine.realtors(&admin).await.unwrap();
        assert_eq!(owners.len(), 3);
        assert!(owners.iter().all(|a| a.role != RoleKind::Client));
    }

    #[tokio::test]
    async fn non_admins_only_see_themselves() {
        let h = setup();
        let client = seed(&h, "client@example.com", RoleKind::Client).await;
        let realtor = seed(&h, "realtor@example.com", RoleKind::Realtor).await;

        let page = h.engine.list_accounts(&client, &AccountParams::default()).await.unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.records[0].id, client.user_id);

        let err = h.engine.account(&client, realtor.user_id).await.unwrap_err();
        assert_eq!(err, DomainError::NotFound);
        assert!(matches!(h.engine.realtors(&client).await, Err(DomainError::Forbidden(_))));
    }

    // ─────────────────────────────────────────────────────────────────────
    // Listing writes
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn realtor_cannot_touch_another_realtors_listing() {
        let h = setup();
        let r1 = seed(&h, "r1@example.com", RoleKind::Realtor).await;
        let r2 = seed(&h, "r2@example.com", RoleKind::Realtor).await;
        let listing = add_listing(&h, &r1, 100.0, true).await;

        let patch = ListingPatch {
            name: Some("Mine now".to_string()),
            ..Default::default()
        };
        assert_eq!(
            h.guard.update_listing(&r2, listing.id, patch).await.unwrap_err(),
            DomainError::NotFound
        );
        assert_eq!(
            h.guard.delete_listing(&r2, listing.id).await.unwrap_err(),
            DomainError::NotFound
        );
        assert_eq!(h.listings.count(&Default::default()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn clients_cannot_write_listings() {
        let h = setup();
        let client = seed(&h, "client@example.com", RoleKind::Client).await;
        let err = h
            .guard
            .create_listing(&client, listing_payload(100.0, true))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn realtor_owner_is_forced_and_reassignment_ignored() {
        let h = setup();
        let r1 = seed(&h, "r1@example.com", RoleKind::Realtor).await;
        let r2 = seed(&h, "r2@example.com", RoleKind::Realtor).await;

        let mut payload = listing_payload(100.0, true);
        payload.realtor = Some(r2.user_id.to_string());
        let listing = h.guard.create_listing(&r1, payload).await.unwrap();
        assert_eq!(listing.realtor, r1.user_id);

        let patch = ListingPatch {
            realtor: Some(r2.user_id.to_string()),
            price: Some(150.0),
            ..Default::default()
        };
        let updated = h.guard.update_listing(&r1, listing.id, patch).await.unwrap();
        assert_eq!(updated.realtor, r1.user_id);
        assert_eq!(updated.price_per_month, 150.0);
    }

    #[tokio::test]
    async fn admin_must_name_an_existing_non_client_owner() {
        let h = setup();
        let admin = seed(&h, "admin@example.com", RoleKind::Admin).await;
        let client = seed(&h, "client@example.com", RoleKind::Client).await;
        let realtor = seed(&h, "realtor@example.com", RoleKind::Realtor).await;

        let err = h
            .guard
            .create_listing(&admin, listing_payload(100.0, true))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "realtor"));

        for owner in [client.user_id, UserId::new()] {
            let mut payload = listing_payload(100.0, true);
            payload.realtor = Some(owner.to_string());
            let err = h.guard.create_listing(&admin, payload).await.unwrap_err();
            assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "realtor"));
        }

        let mut payload = listing_payload(100.0, true);
        payload.realtor = Some(realtor.user_id.to_string());
        let listing = h.guard.create_listing(&admin, payload).await.unwrap();

        let patch = ListingPatch {
            realtor: Some(admin.user_id.to_string()),
            ..Default::default()
        };
        let moved = h.guard.update_listing(&admin, listing.id, patch).await.unwrap();
        assert_eq!(moved.realtor, admin.user_id);
    }

    #[tokio::test]
    async fn empty_update_leaves_listing_unchanged() {
        let h = setup();
        let realtor = seed(&h, "realtor@example.com", RoleKind::Realtor).await;
        let listing = add_listing(&h, &realtor, 1200.0, true).await;

        let updated = h
            .guard
            .update_listing(&realtor, listing.id, ListingPatch::default())
            .await
            .unwrap();
        assert_eq!(updated, listing);
        assert_eq!(updated.floor_size, 45.5);
        assert_eq!(updated.price_per_month, 1200.0);
    }

    #[tokio::test]
    async fn invalid_update_is_rejected_without_writing() {
        let h = setup();
        let realtor = seed(&h, "realtor@example.com", RoleKind::Realtor).await;
        let listing = add_listing(&h, &realtor, 100.0, true).await;

        let patch = ListingPatch {
            rooms: Some(0.0),
            ..Default::default()
        };
        let err = h.guard.update_listing(&realtor, listing.id, patch).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "rooms"));

        let stored = h.engine.list(&realtor, &ListingParams::default()).await.unwrap();
        let owner = h.accounts.find_by_ids(&[realtor.user_id]).await.unwrap();
        assert_eq!(stored.records, vec![ListingView::new(listing, owner.first())]);
    }

    #[tokio::test]
    async fn deleting_unknown_listing_is_not_found() {
        let h = setup();
        let admin = seed(&h, "admin@example.com", RoleKind::Admin).await;
        let err = h.guard.delete_listing(&admin, ListingId::new()).await.unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Account writes
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn deleting_a_realtor_cascades_to_their_listings() {
        let h = setup();
        let admin = seed(&h, "admin@example.com", RoleKind::Admin).await;
        let r1 = seed(&h, "r1@example.com", RoleKind::Realtor).await;
        let r2 = seed(&h, "r2@example.com", RoleKind::Realtor).await;
        add_listing(&h, &r1, 100.0, true).await;
        add_listing(&h, &r1, 200.0, true).await;
        add_listing(&h, &r2, 300.0, true).await;

        h.guard.delete_account(&admin, r1.user_id).await.unwrap();

        let remaining = h.engine.list(&admin, &ListingParams::default()).await.unwrap();
        assert_eq!(remaining.total_count, 1);
        assert!(remaining.records.iter().all(|l| l.realtor.id != r1.user_id));
        assert!(h.accounts.find_by_email("r1@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn realtor_owning_listings_cannot_be_demoted_to_client() {
        let h = setup();
        let admin = seed(&h, "admin@example.com", RoleKind::Admin).await;
        let owner = seed(&h, "owner@example.com", RoleKind::Realtor).await;
        let idle = seed(&h, "idle@example.com", RoleKind::Realtor).await;
        add_listing(&h, &owner, 100.0, true).await;

        let demote = || AccountPatch {
            role: Some("client".to_string()),
            ..Default::default()
        };
        let err = h.guard.update_account(&admin, owner.user_id, demote()).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "role"));
        let stored = h.accounts.find_by_ids(&[owner.user_id]).await.unwrap();
        assert_eq!(stored[0].role, RoleKind::Realtor);

        let demoted = h.guard.update_account(&admin, idle.user_id, demote()).await.unwrap();
        assert_eq!(demoted.role, RoleKind::Client);
    }

    #[tokio::test]
    async fn admin_cannot_delete_self_and_others_cannot_delete_at_all() {
        let h = setup();
        let admin = seed(&h, "admin@example.com", RoleKind::Admin).await;
        let realtor = seed(&h, "realtor@example.com", RoleKind::Realtor).await;

        assert!(matches!(
            h.guard.delete_account(&admin, admin.user_id).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            h.guard.delete_account(&realtor, admin.user_id).await,
            Err(DomainError::Forbidden(_))
        ));
        assert_eq!(
            h.guard.delete_account(&admin, UserId::new()).await.unwrap_err(),
            DomainError::NotFound
        );
    }

    #[tokio::test]
    async fn only_admins_change_roles() {
        let h = setup();
        let admin = seed(&h, "admin@example.com", RoleKind::Admin).await;
        let client = seed(&h, "client@example.com", RoleKind::Client).await;

        let promote = AccountPatch {
            role: Some("admin".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            h.guard.update_account(&client, client.user_id, promote.clone()).await,
            Err(DomainError::Forbidden(_))
        ));

        let rename = AccountPatch {
            first_name: Some("Renamed".to_string()),
            role: Some("client".to_string()),
            ..Default::default()
        };
        let me = h.guard.update_account(&client, client.user_id, rename).await.unwrap();
        assert_eq!(me.first_name, "Renamed");

        let promoted = h.guard.update_account(&admin, client.user_id, promote).await.unwrap();
        assert_eq!(promoted.role, RoleKind::Admin);
    }

    #[tokio::test]
    async fn password_change_is_rehashed_and_usable_for_login() {
        let h = setup();
        let client = seed(&h, "client@example.com", RoleKind::Client).await;
        let patch = AccountPatch {
            password: Some("N3wSecret!".to_string()),
            repassword: Some("N3wSecret!".to_string()),
            ..Default::default()
        };
        h.guard.update_account(&client, client.user_id, patch).await.unwrap();

        let login = |password: &str| LoginRequest {
            email: Some("client@example.com".to_string()),
            password: Some(password.to_string()),
        };
        assert!(h.auth.login(login("N3wSecret!")).await.is_ok());
        assert!(matches!(h.auth.login(login(PASSWORD)).await, Err(DomainError::Forbidden(_))));
    }

    #[tokio::test]
    async fn admin_creates_accounts_of_any_role_but_emails_stay_unique() {
        let h = setup();
        let admin = seed(&h, "admin@example.com", RoleKind::Admin).await;
        let realtor = seed(&h, "realtor@example.com", RoleKind::Realtor).await;

        let created = h
            .guard
            .create_account(&admin, signup_payload("new-admin@example.com", Some("admin")))
            .await
            .unwrap();
        assert_eq!(created.role, RoleKind::Admin);

        let dup = h
            .guard
            .create_account(&admin, signup_payload("realtor@example.com", None))
            .await
            .unwrap_err();
        assert!(matches!(dup, DomainError::Conflict(_)));

        let err = h
            .guard
            .create_account(&realtor, signup_payload("x@example.com", None))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    // ─────────────────────────────────────────────────────────────────────
    // Auth flows
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn signup_rejects_admin_role_and_mismatched_passwords() {
        let h = setup();
        let err = h
            .auth
            .signup(signup_payload("boss@example.com", Some("admin")))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "role"));

        let mut mismatched = signup_payload("user@example.com", None);
        mismatched.repassword = Some("Different1!".to_string());
        let err = h.auth.signup(mismatched).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "repassword"));

        assert_eq!(h.accounts.count(&Default::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn signup_then_login_yields_a_verifiable_token() {
        let h = setup();
        let account = h
            .auth
            .signup(signup_payload("Realtor@Example.com", Some("realtor")))
            .await
            .unwrap();
        assert_eq!(account.email, "realtor@example.com");

        let err = h
            .auth
            .signup(signup_payload("realtor@example.com", None))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let session = h
            .auth
            .login(LoginRequest {
                email: Some("realtor@example.com".to_string()),
                password: Some(PASSWORD.to_string()),
            })
            .await
            .unwrap();
        let claims = h.jwt.validate(&session.token, Utc::now()).unwrap();
        assert_eq!(claims.sub, account.id);
        assert_eq!(claims.role.kind(), Some(RoleKind::Realtor));
    }

    #[tokio::test]
    async fn login_failures_are_classified() {
        let h = setup();
        seed(&h, "client@example.com", RoleKind::Client).await;

        let unknown = h
            .auth
            .login(LoginRequest {
                email: Some("nobody@example.com".to_string()),
                password: Some(PASSWORD.to_string()),
            })
            .await
            .unwrap_err();
        assert_eq!(unknown, DomainError::NotFound);

        let wrong = h
            .auth
            .login(LoginRequest {
                email: Some("client@example.com".to_string()),
                password: Some("Wr0ngPass!".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(wrong, DomainError::Forbidden(_)));

        let malformed = h
            .auth
            .login(LoginRequest {
                email: Some("not-an-email".to_string()),
                password: Some(PASSWORD.to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(malformed, DomainError::Validation { ref field, .. } if field == "email"));

        let weak = h
            .auth
            .login(LoginRequest {
                email: Some("nobody@example.com".to_string()),
                password: Some("short".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(weak, DomainError::Validation { ref field, .. } if field == "password"));
    }

    #[tokio::test]
    async fn bootstrap_admin_is_created_once_and_can_log_in() {
        let h = setup();

        let created = h.auth.ensure_admin(" Root@Example.com ", PASSWORD).await.unwrap().unwrap();
        assert_eq!(created.role, RoleKind::Admin);
        assert_eq!(created.email, "root@example.com");
        assert!(h.auth.ensure_admin("root@example.com", "Other0ne!").await.unwrap().is_none());
        assert_eq!(h.accounts.count(&Default::default()).await.unwrap(), 1);

        let session = h
            .auth
            .login(LoginRequest {
                email: Some("root@example.com".to_string()),
                password: Some(PASSWORD.to_string()),
            })
            .await
            .unwrap();
        assert_eq!(session.role, RoleKind::Admin);

        let err = h.auth.ensure_admin("ops@example.com", "weak").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "password"));
    }
}
