//! Tests for the identity resolution service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{
    InMemorySessionStorage, InMemoryUserDirectory, MockSessionStorage, MockUserDirectory,
    NoticeLevel, RecordingNotifier,
};
use crate::domain::{ErrorCode, Nft};
use rstest::{fixture, rstest};

type Service<D> = IdentityService<D, InMemorySessionStorage, RecordingNotifier>;

struct Harness<D> {
    service: Service<D>,
    sessions: Arc<InMemorySessionStorage>,
    notifier: Arc<RecordingNotifier>,
    store: Arc<AppStore>,
}

fn harness<D: UserDirectory>(directory: D) -> Harness<D> {
    let sessions = Arc::new(InMemorySessionStorage::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let store = Arc::new(AppStore::new());
    let service = IdentityService::new(
        Arc::new(directory),
        Arc::clone(&sessions),
        Arc::clone(&notifier),
        Arc::clone(&store),
    );
    Harness {
        service,
        sessions,
        notifier,
        store,
    }
}

#[fixture]
fn seeded() -> Harness<InMemoryUserDirectory> {
    harness(
        InMemoryUserDirectory::new()
            .with_user("ada", "Ada", "ada@example.com", "engine", "0xaaa")
            .with_user("grace", "Grace", "grace@example.com", "cobol", "0xbbb"),
    )
}

fn wallet(value: &str) -> WalletAddress {
    WalletAddress::new(value).expect("valid wallet")
}

fn input(echelon_id: &str, email: &str) -> RegistrationInput {
    RegistrationInput {
        echelon_id: echelon_id.into(),
        name: "Linus".into(),
        email: email.into(),
        password: "kernel".into(),
    }
}

fn marker(h: &Harness<impl UserDirectory>) -> Option<String> {
    h.sessions
        .echelon_id()
        .expect("read marker")
        .map(String::from)
}

fn last_notice(h: &Harness<impl UserDirectory>) -> Option<Notice> {
    h.notifier.notices().last().cloned()
}

#[rstest]
#[case("ada")]
#[case("ada@example.com")]
#[tokio::test]
async fn sign_in_persists_marker_for_matching_credentials(
    seeded: Harness<InMemoryUserDirectory>,
    #[case] identifier: &str,
) {
    let outcome = seeded
        .service
        .sign_in(identifier, "engine")
        .await
        .expect("sign-in succeeds");

    assert_eq!(
        outcome,
        SignInOutcome::SignedIn {
            echelon_id: EchelonId::new("ada").expect("id"),
            navigate_to: Route::Dashboard,
        }
    );
    assert_eq!(marker(&seeded).as_deref(), Some("ada"));
    assert_eq!(seeded.store.snapshot().phase, SessionPhase::Authenticated);
}

#[rstest]
#[tokio::test]
async fn unknown_identifier_requests_sign_up(seeded: Harness<InMemoryUserDirectory>) {
    let outcome = seeded
        .service
        .sign_in("nobody", "engine")
        .await
        .expect("lookup succeeds");

    assert_eq!(outcome, SignInOutcome::UnknownUser);
    assert!(outcome.needs_sign_up());
    assert!(marker(&seeded).is_none());
    assert_eq!(
        last_notice(&seeded).map(|n| n.message),
        Some("User doesn't exist.".to_owned())
    );
    assert_eq!(seeded.store.snapshot().phase, SessionPhase::Unauthenticated);
}

#[rstest]
#[tokio::test]
async fn wrong_password_is_reported_without_sign_up(seeded: Harness<InMemoryUserDirectory>) {
    let outcome = seeded
        .service
        .sign_in("ada", "cobol")
        .await
        .expect("lookup succeeds");

    assert_eq!(outcome, SignInOutcome::IncorrectPassword);
    assert!(!outcome.needs_sign_up());
    assert!(marker(&seeded).is_none());
    assert_eq!(
        last_notice(&seeded).map(|n| n.message),
        Some("Incorrect password.".to_owned())
    );
}

#[rstest]
#[case("", "pw")]
#[case("ada", "")]
#[tokio::test]
async fn blank_sign_in_fields_never_reach_directory(#[case] identifier: &str, #[case] password: &str) {
    let mut directory = MockUserDirectory::new();
    directory.expect_sign_in_anonymously().never();
    let h = harness(directory);

    let err = h
        .service
        .sign_in(identifier, password)
        .await
        .expect_err("blank fields rejected");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "Please fill the form.");
}

#[rstest]
#[tokio::test]
async fn sign_in_propagates_directory_failures() {
    let mut directory = MockUserDirectory::new();
    directory
        .expect_sign_in_anonymously()
        .times(1)
        .return_once(|| Ok(()));
    directory
        .expect_find_by_identifier()
        .return_once(|_| Err(UserDirectoryError::connection("refused")));
    directory
        .expect_find_by_credentials()
        .return_once(|_| Ok(Vec::new()));
    let h = harness(directory);

    let err = h
        .service
        .sign_in("ada", "engine")
        .await
        .expect_err("upstream failure");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    assert!(marker(&h).is_none());
    assert_eq!(h.store.snapshot().phase, SessionPhase::Unauthenticated);
}

#[rstest]
#[tokio::test]
async fn resume_without_marker_redirects(seeded: Harness<InMemoryUserDirectory>) {
    let mount = seeded.service.resume_session().await.expect("mount");
    assert_eq!(mount, DashboardMount::Redirect(Route::Landing));
    assert_eq!(seeded.store.snapshot().current_user, None);
}

#[rstest]
#[tokio::test]
async fn resume_adopts_first_matching_row(seeded: Harness<InMemoryUserDirectory>) {
    seeded
        .sessions
        .persist(&EchelonId::new("grace").expect("id"))
        .expect("persist");

    let mount = seeded.service.resume_session().await.expect("mount");
    let DashboardMount::Ready { user: Some(user) } = mount else {
        panic!("expected a resolved user, got {mount:?}");
    };
    assert_eq!(user.email(), "grace@example.com");
    assert_eq!(seeded.store.snapshot().current_user, Some(user));
}

#[rstest]
#[tokio::test]
async fn resume_query_failure_leaves_user_unset() {
    let mut directory = MockUserDirectory::new();
    directory
        .expect_sign_in_anonymously()
        .return_once(|| Ok(()));
    directory
        .expect_find_by_echelon_id()
        .return_once(|_| Err(UserDirectoryError::query("relation does not exist")));
    let h = harness(directory);
    h.sessions
        .persist(&EchelonId::new("ada").expect("id"))
        .expect("persist");

    let mount = h.service.resume_session().await.expect("mount");
    assert_eq!(mount, DashboardMount::Ready { user: None });
    assert!(h.store.snapshot().current_user.is_none());
    assert!(h.notifier.notices().is_empty());
}

#[rstest]
#[tokio::test]
async fn resume_surfaces_storage_failures() {
    let mut sessions = MockSessionStorage::new();
    sessions
        .expect_echelon_id()
        .return_once(|| Err(SessionStorageError::io("permission denied")));
    let service = IdentityService::new(
        Arc::new(InMemoryUserDirectory::new()),
        Arc::new(sessions),
        Arc::new(RecordingNotifier::new()),
        Arc::new(AppStore::new()),
    );
    let err = service.resume_session().await.expect_err("storage failure");
    assert_eq!(err.code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn wallet_sign_in_hit_and_miss(seeded: Harness<InMemoryUserDirectory>) {
    let miss = seeded
        .service
        .sign_in_with_wallet(&wallet("0xccc"))
        .await
        .expect("lookup");
    assert_eq!(miss, WalletSignInOutcome::WalletNotFound);
    assert!(marker(&seeded).is_none());
    assert_eq!(
        last_notice(&seeded).map(|n| n.message),
        Some("Wallet not found.".to_owned())
    );

    let hit = seeded
        .service
        .sign_in_with_wallet(&wallet("0xbbb"))
        .await
        .expect("lookup");
    assert!(matches!(hit, WalletSignInOutcome::SignedIn { .. }));
    assert_eq!(marker(&seeded).as_deref(), Some("grace"));
}

#[rstest]
#[tokio::test]
async fn wallet_sign_in_error_counts_as_miss() {
    let mut directory = MockUserDirectory::new();
    directory
        .expect_find_by_wallet()
        .return_once(|_| Err(UserDirectoryError::query("boom")));
    let h = harness(directory);
    let outcome = h
        .service
        .sign_in_with_wallet(&wallet("0xaaa"))
        .await
        .expect("miss is not an error");
    assert_eq!(outcome, WalletSignInOutcome::WalletNotFound);
}

#[rstest]
#[case("ada", Err(RegistrationFieldError::EchelonIdTaken))]
#[case("linus", Ok(()))]
#[case("  ", Err(RegistrationFieldError::Invalid(RegistrationValidationError::MissingEchelonId)))]
#[tokio::test]
async fn validate_echelon_id_checks_uniqueness(
    seeded: Harness<InMemoryUserDirectory>,
    #[case] value: &str,
    #[case] expected: Result<(), RegistrationFieldError>,
) {
    assert_eq!(seeded.service.validate_echelon_id(value).await, expected);
}

#[rstest]
#[case("grace@example.com", Err(RegistrationFieldError::EmailTaken))]
#[case("linus@example.com", Ok(()))]
#[case("linus", Err(RegistrationFieldError::Invalid(RegistrationValidationError::InvalidEmail)))]
#[tokio::test]
async fn validate_email_checks_uniqueness(
    seeded: Harness<InMemoryUserDirectory>,
    #[case] value: &str,
    #[case] expected: Result<(), RegistrationFieldError>,
) {
    assert_eq!(seeded.service.validate_email(value).await, expected);
}

#[rstest]
#[tokio::test]
async fn validation_lookup_failure_is_reported() {
    let mut directory = MockUserDirectory::new();
    directory
        .expect_email_exists()
        .return_once(|_| Err(UserDirectoryError::connection("down")));
    let h = harness(directory);
    assert_eq!(
        h.service.validate_email("x@example.com").await,
        Err(RegistrationFieldError::Lookup { field: "Email" })
    );
}

#[rstest]
#[tokio::test]
async fn wallet_registered_treats_errors_as_false() {
    let mut directory = MockUserDirectory::new();
    directory
        .expect_wallet_exists()
        .return_once(|_| Err(UserDirectoryError::query("boom")));
    let h = harness(directory);
    assert!(!h.service.wallet_registered(&wallet("0xaaa")).await);
}

#[rstest]
#[tokio::test]
async fn register_inserts_and_signs_in(seeded: Harness<InMemoryUserDirectory>) {
    seeded.store.connect_wallet(wallet("0xccc"));

    let outcome = seeded
        .service
        .register(input("linus", "linus@example.com"))
        .await
        .expect("registration");

    assert_eq!(
        outcome,
        RegistrationOutcome::Registered {
            echelon_id: EchelonId::new("linus").expect("id"),
            navigate_to: Route::Dashboard,
        }
    );
    assert_eq!(marker(&seeded).as_deref(), Some("linus"));
    let notice = last_notice(&seeded).expect("notice");
    assert_eq!(notice.level, NoticeLevel::Success);
    assert_eq!(notice.message, "User Saved!");
    let wallet_owner = seeded
        .service
        .sign_in_with_wallet(&wallet("0xccc"))
        .await
        .expect("lookup");
    assert!(matches!(wallet_owner, WalletSignInOutcome::SignedIn { .. }));
}

#[rstest]
#[tokio::test]
async fn register_rejects_duplicates_before_insert() {
    let mut directory = MockUserDirectory::new();
    directory.expect_wallet_exists().return_once(|_| Ok(false));
    directory.expect_echelon_id_exists().return_once(|_| Ok(true));
    directory.expect_email_exists().return_once(|_| Ok(true));
    directory.expect_sign_in_anonymously().never();
    directory.expect_insert().never();
    let h = harness(directory);
    h.store.connect_wallet(wallet("0xccc"));

    let outcome = h
        .service
        .register(input("ada", "ada@example.com"))
        .await
        .expect("registration");
    assert_eq!(
        outcome,
        RegistrationOutcome::Rejected(vec![
            RegistrationFieldError::EchelonIdTaken,
            RegistrationFieldError::EmailTaken,
        ])
    );
    assert!(marker(&h).is_none());
}

#[rstest]
#[tokio::test]
async fn register_requires_connected_wallet(seeded: Harness<InMemoryUserDirectory>) {
    let outcome = seeded
        .service
        .register(input("linus", "linus@example.com"))
        .await
        .expect("registration");
    assert_eq!(outcome, RegistrationOutcome::WalletNotConnected);
    assert_eq!(
        last_notice(&seeded).map(|n| n.message),
        Some("There was a problem".to_owned())
    );
}

#[rstest]
#[tokio::test]
async fn register_refuses_registered_wallet(seeded: Harness<InMemoryUserDirectory>) {
    seeded.store.connect_wallet(wallet("0xaaa"));
    let outcome = seeded
        .service
        .register(input("linus", "linus@example.com"))
        .await
        .expect("registration");
    assert_eq!(outcome, RegistrationOutcome::WalletAlreadyRegistered);
}

#[rstest]
#[tokio::test]
async fn register_reports_invalid_form(seeded: Harness<InMemoryUserDirectory>) {
    seeded.store.connect_wallet(wallet("0xccc"));
    let outcome = seeded
        .service
        .register(input("linus", "not-an-email"))
        .await
        .expect("registration");
    assert_eq!(
        outcome,
        RegistrationOutcome::Rejected(vec![RegistrationFieldError::Invalid(
            RegistrationValidationError::InvalidEmail
        )])
    );
}

#[rstest]
#[tokio::test]
async fn register_surfaces_raw_insert_message() {
    let mut directory = MockUserDirectory::new();
    directory.expect_wallet_exists().return_once(|_| Ok(false));
    directory.expect_echelon_id_exists().return_once(|_| Ok(false));
    directory.expect_email_exists().return_once(|_| Ok(false));
    directory
        .expect_sign_in_anonymously()
        .return_once(|| Ok(()));
    directory
        .expect_insert()
        .return_once(|_| Err(UserDirectoryError::rejected("new row violates row-level security")));
    let h = harness(directory);
    h.store.connect_wallet(wallet("0xccc"));

    let err = h
        .service
        .register(input("linus", "linus@example.com"))
        .await
        .expect_err("insert failure");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.message(), "new row violates row-level security");
    assert_eq!(
        last_notice(&h).map(|n| n.message),
        Some("new row violates row-level security".to_owned())
    );
    assert!(marker(&h).is_none());
}

#[rstest]
#[tokio::test]
async fn sign_out_clears_state_and_next_mount_redirects(seeded: Harness<InMemoryUserDirectory>) {
    seeded.store.connect_wallet(wallet("0xaaa"));
    seeded
        .service
        .sign_in("ada", "engine")
        .await
        .expect("sign-in");
    seeded.service.resume_session().await.expect("mount");
    seeded.store.set_nft_list(vec![Nft::default()]);

    let route = seeded.service.sign_out().expect("sign-out");
    assert_eq!(route, Route::Landing);

    let snapshot = seeded.store.snapshot();
    assert!(snapshot.current_user.is_none());
    assert!(snapshot.nfts.is_empty());
    assert!(!snapshot.wallet.is_connected());
    assert!(marker(&seeded).is_none());

    let mount = seeded.service.resume_session().await.expect("mount");
    assert_eq!(mount, DashboardMount::Redirect(Route::Landing));
}

#[rstest]
fn route_paths() {
    assert_eq!(Route::Landing.path(), "/");
    assert_eq!(Route::SignIn.path(), "/sign-in");
    assert_eq!(Route::Dashboard.path(), "/dashboard");
}
