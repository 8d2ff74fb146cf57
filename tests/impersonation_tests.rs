use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::RwLock;

use session_service::domain::{AccountStatus, Email, Password};
use session_service::errors::ImpersonationError;
use session_service::services::{HashmapAccountStore, HashsetRefreshStore, TokenService};
use session_service::session::{
    AuthGateway, ImpersonationController, MemorySessionStore, ServiceGateway, SessionManager,
    SessionStore,
};
use session_service::utils::Config;

/// Prepare environment variables required by Config::default()
fn set_env_config() {
    std::env::set_var("JWT_ISSUER", "test-issuer");
    std::env::set_var("JWT_AUDIENCE", "test-aud");
    std::env::set_var("ACCESS_TTL_SECONDS", "60");
    std::env::set_var("REFRESH_TTL_SECONDS", "300");

    let thirty_two_zero_b64 = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";
    std::env::set_var("REFRESH_HASH_KEY_B64", thirty_two_zero_b64);

    let keys_json = format!(
        r#"[{{"kid":"k1","secret_b64":"{secret}"}}]"#,
        secret = thirty_two_zero_b64
    );
    std::env::set_var("JWT_HS256_KEYS_JSON", keys_json);
    std::env::set_var("JWT_ACTIVE_KID", "k1");
}

const ADMIN_PASSWORD: &str = "Admin-pass1!";
const MEMBER_PASSWORD: &str = "Member-pass1!";

fn email(s: &str) -> Email {
    Email::parse(s.to_string()).expect("valid test email")
}

fn password(s: &str) -> Password {
    Password::parse(s.to_string()).expect("valid test password")
}

fn perms<const N: usize>(list: [&str; N]) -> BTreeSet<String> {
    list.iter().map(|p| p.to_string()).collect()
}

/// Full in-process wiring: issuance service behind a `ServiceGateway`,
/// one client session store, controller and manager on top.
struct World {
    service: Arc<TokenService>,
    store: Arc<dyn SessionStore>,
    controller: ImpersonationController,
    manager: SessionManager,
    admin_subject: String,
    member_subject: String,
}

async fn build_world() -> World {
    set_env_config();
    let cfg = Arc::new(RwLock::new(
        Config::default().expect("failed to build test config"),
    ));

    let mut accounts = HashmapAccountStore::new();
    let admin_subject = accounts
        .register(
            email("admin@acme.example.com"),
            ADMIN_PASSWORD,
            "org-1",
            AccountStatus::Active,
            perms(["user:impersonate", "user:list:read"]),
        )
        .await
        .expect("seed admin");
    let member_subject = accounts
        .register(
            email("member@acme.example.com"),
            MEMBER_PASSWORD,
            "org-1",
            AccountStatus::Active,
            perms(["job:update:own"]),
        )
        .await
        .expect("seed member");

    let service = Arc::new(
        TokenService::new(
            Arc::clone(&cfg),
            Arc::new(accounts),
            Box::new(HashsetRefreshStore::default()),
        )
        .await,
    );
    let gateway: Arc<dyn AuthGateway> = Arc::new(ServiceGateway::new(Arc::clone(&service)));
    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    let controller =
        ImpersonationController::new(Arc::clone(&store), Arc::clone(&gateway), service.codec());
    let manager = {
        let config = cfg.read().await;
        SessionManager::from_config(Arc::clone(&store), Arc::clone(&gateway), &config)
    };

    World {
        service,
        store,
        controller,
        manager,
        admin_subject,
        member_subject,
    }
}

impl World {
    async fn sign_in(&self, address: &str, pass: &str) {
        let issued = self
            .service
            .login(&email(address), &password(pass), false)
            .await
            .expect("login");
        self.store.set_current(issued.pair);
    }
}

#[tokio::test]
async fn start_swaps_identity_and_saves_the_original() {
    let world = build_world().await;
    world.sign_in("admin@acme.example.com", ADMIN_PASSWORD).await;
    let admin_pair = world.store.get_current().expect("signed in");

    let claims = world
        .controller
        .start(&world.member_subject)
        .await
        .expect("impersonation should start");

    assert_eq!(claims.subject_id, world.member_subject);
    assert_eq!(
        claims.impersonated_by.as_deref(),
        Some(world.admin_subject.as_str())
    );
    assert!(world.controller.is_impersonating());
    assert_eq!(world.store.get_original(), Some(admin_pair));
    assert_ne!(world.store.get_current(), world.store.get_original());
}

#[tokio::test]
async fn start_twice_fails_with_already_impersonating() {
    let world = build_world().await;
    world.sign_in("admin@acme.example.com", ADMIN_PASSWORD).await;

    world
        .controller
        .start(&world.member_subject)
        .await
        .expect("first start");
    let again = world.controller.start(&world.member_subject).await;
    assert_eq!(
        again.expect_err("second start must fail"),
        ImpersonationError::AlreadyImpersonating
    );
    // The active impersonation is untouched.
    assert!(world.controller.is_impersonating());
}

#[tokio::test]
async fn stop_restores_exactly_the_saved_pair_and_is_idempotent() {
    let world = build_world().await;
    world.sign_in("admin@acme.example.com", ADMIN_PASSWORD).await;
    let admin_pair = world.store.get_current().expect("signed in");

    world
        .controller
        .start(&world.member_subject)
        .await
        .expect("start");

    let restored = world
        .controller
        .stop()
        .await
        .expect("stop succeeds")
        .expect("a restore happened");
    assert_eq!(restored.subject_id, world.admin_subject);
    assert!(restored.impersonated_by.is_none());
    assert_eq!(world.store.get_current(), Some(admin_pair));
    assert!(!world.store.has_original());

    // Stopping again is a no-op.
    let noop = world.controller.stop().await.expect("stop stays Ok");
    assert!(noop.is_none());
}

#[tokio::test]
async fn failed_start_rolls_back_the_saved_original() {
    let world = build_world().await;
    world.sign_in("admin@acme.example.com", ADMIN_PASSWORD).await;
    let admin_pair = world.store.get_current().expect("signed in");

    let res = world.controller.start("no-such-subject").await;
    assert_eq!(
        res.expect_err("unknown target must fail"),
        ImpersonationError::NotPermitted
    );

    // No orphaned original, current unchanged.
    assert!(!world.store.has_original());
    assert_eq!(world.store.get_current(), Some(admin_pair));
}

#[tokio::test]
async fn members_cannot_start_impersonation() {
    let world = build_world().await;
    world
        .sign_in("member@acme.example.com", MEMBER_PASSWORD)
        .await;

    let res = world.controller.start(&world.admin_subject).await;
    assert_eq!(
        res.expect_err("member must not impersonate"),
        ImpersonationError::NotPermitted
    );
    assert!(!world.store.has_original());
}

#[tokio::test]
async fn impersonator_is_reported_only_while_active() {
    let world = build_world().await;
    world.sign_in("admin@acme.example.com", ADMIN_PASSWORD).await;

    let before = world.controller.impersonator();
    assert_eq!(
        before.expect_err("no impersonation yet"),
        ImpersonationError::NoActiveImpersonation
    );

    world
        .controller
        .start(&world.member_subject)
        .await
        .expect("start");
    let admin = world
        .controller
        .impersonator()
        .expect("active impersonation reports its admin");
    assert_eq!(admin.subject_id, world.admin_subject);

    world.controller.stop().await.expect("stop");
    assert_eq!(
        world.controller.impersonator().expect_err("ended"),
        ImpersonationError::NoActiveImpersonation
    );
}

#[tokio::test]
async fn refresh_during_impersonation_keeps_the_marker() {
    let world = build_world().await;
    world.sign_in("admin@acme.example.com", ADMIN_PASSWORD).await;
    world
        .controller
        .start(&world.member_subject)
        .await
        .expect("start");

    let rotated = world.manager.refresh().await.expect("rotation during impersonation");
    let claims = world
        .service
        .codec()
        .decode(&rotated.access_token)
        .expect("fresh access decodes");

    assert_eq!(claims.subject_id, world.member_subject);
    assert_eq!(
        claims.impersonated_by.as_deref(),
        Some(world.admin_subject.as_str())
    );
    // The admin's own pair is still waiting in the original slot.
    assert!(world.store.has_original());
}
