//! Integration tests for mimo-core services
//!
//! Every scenario runs against both storage backends: CSV files in a temp
//! directory and a DuckDB file. All IO is real.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

use mimo_core::adapters::csv::CsvRepository;
use mimo_core::adapters::duckdb::{DuckDbRepository, DB_FILE};
use mimo_core::config::{Config, StorageBackend};
use mimo_core::domain::result::Error;
use mimo_core::domain::{FavoriteEntry, UserRecord};
use mimo_core::ports::{FavoriteRepository, ReviewRepository, UserRepository};
use mimo_core::services::{
    hash_password, verify_password, AuthService, BackupService, FavoriteService, ProfileService,
    RegistrationService, ReviewService, SignUpRequest,
};
use mimo_core::MimoContext;

// ============================================================================
// Test Helpers
// ============================================================================

/// One storage backend under test, with its data root kept alive
struct Store {
    name: &'static str,
    _dir: TempDir,
    users: Arc<dyn UserRepository>,
    favorites: Arc<dyn FavoriteRepository>,
    reviews: Arc<dyn ReviewRepository>,
}

fn csv_store() -> Store {
    let dir = TempDir::new().unwrap();
    let repo = Arc::new(CsvRepository::new(dir.path()));
    Store {
        name: "csv",
        users: repo.clone(),
        favorites: repo.clone(),
        reviews: repo,
        _dir: dir,
    }
}

fn duckdb_store() -> Store {
    let dir = TempDir::new().unwrap();
    let repo = DuckDbRepository::new(&dir.path().join(DB_FILE)).expect("Failed to open database");
    repo.ensure_schema().expect("Failed to initialize schema");
    let repo = Arc::new(repo);
    Store {
        name: "duckdb",
        users: repo.clone(),
        favorites: repo.clone(),
        reviews: repo,
        _dir: dir,
    }
}

/// Run `test` once per backend; the backend name is passed for assertion messages
fn each_backend(test: impl Fn(&Store)) {
    for store in [csv_store(), duckdb_store()] {
        test(&store);
    }
}

fn sign_up_request(user_id: &str, email: &str, password: &str) -> SignUpRequest {
    SignUpRequest {
        user_id: user_id.to_string(),
        password: password.to_string(),
        password_confirm: password.to_string(),
        email: email.to_string(),
        nickname: format!("{} nick", user_id),
    }
}

// ============================================================================
// Credential Store
// ============================================================================

#[test]
fn test_unregistered_id_can_sign_up_and_is_findable() {
    each_backend(|store| {
        let registration = RegistrationService::new(store.users.clone());

        assert!(store.users.find_by_id("trinity").unwrap().is_none(), "{}", store.name);

        let profile = registration
            .sign_up(&sign_up_request("trinity", "trinity@zion.ai", "followthewhiterabbit"))
            .unwrap();
        assert_eq!(profile.user_id, "trinity");
        assert_eq!(profile.nickname, "trinity nick");

        let stored = store.users.find_by_id("trinity").unwrap().unwrap();
        assert_eq!(stored.email, "trinity@zion.ai", "{}", store.name);
        assert_eq!(store.users.find_by_email("trinity@zion.ai").unwrap(), Some(stored));
    });
}

#[test]
fn test_duplicate_sign_up_leaves_store_unchanged() {
    each_backend(|store| {
        let registration = RegistrationService::new(store.users.clone());
        registration
            .sign_up(&sign_up_request("trinity", "trinity@zion.ai", "password123"))
            .unwrap();
        let before = store.users.load_all().unwrap();

        let same_id = registration
            .sign_up(&sign_up_request("trinity", "other@zion.ai", "password123"))
            .unwrap_err();
        assert!(matches!(same_id, Error::Conflict(_)), "{}", store.name);

        let same_email = registration
            .sign_up(&sign_up_request("morpheus", "trinity@zion.ai", "password123"))
            .unwrap_err();
        assert!(matches!(same_email, Error::Conflict(_)), "{}", store.name);

        assert_eq!(store.users.load_all().unwrap(), before, "{}", store.name);
    });
}

#[test]
fn test_save_all_load_all_round_trip() {
    each_backend(|store| {
        let records = vec![
            UserRecord::new("zeta", "$argon2id$x", "z@example.com", "제타, \"Z\"", "2025-02-01"),
            UserRecord::new("alpha", "$argon2id$y", "a@example.com", "Alpha", "2024-12-31"),
            UserRecord::new("mid", "$argon2id$z", "m@example.com", "", "2025-01-15"),
        ];
        store.users.save_all(&records).unwrap();
        assert_eq!(store.users.load_all().unwrap(), records, "{}", store.name);

        // Saving a smaller set replaces rather than merges
        store.users.save_all(&records[..1]).unwrap();
        assert_eq!(store.users.load_all().unwrap(), records[..1].to_vec(), "{}", store.name);
    });
}

// ============================================================================
// Authentication
// ============================================================================

#[test]
fn test_authenticate_matches_stored_hash_only() {
    each_backend(|store| {
        let hash = hash_password("correct horse").unwrap();
        store
            .users
            .insert(&UserRecord::new("morpheus", hash, "m@zion.ai", "Morpheus", "2025-01-02"))
            .unwrap();
        let auth = AuthService::new(store.users.clone(), true);

        let profile = auth.authenticate("morpheus", "correct horse").unwrap();
        assert_eq!(profile.nickname, "Morpheus", "{}", store.name);

        assert!(matches!(
            auth.authenticate("morpheus", "wrong horse").unwrap_err(),
            Error::AuthFailure(_)
        ));
        assert!(matches!(
            auth.authenticate("nobody", "correct horse").unwrap_err(),
            Error::AuthFailure(_)
        ));
    });
}

#[test]
fn test_malformed_stored_hash_fails_closed() {
    each_backend(|store| {
        store
            .users
            .insert(&UserRecord::new("broken", "not-a-hash", "b@x.io", "B", "2025-01-02"))
            .unwrap();
        let auth = AuthService::new(store.users.clone(), true);

        assert!(!verify_password("anything", "not-a-hash"));
        assert!(matches!(
            auth.authenticate("broken", "not-a-hash").unwrap_err(),
            Error::AuthFailure(_)
        ));
    });
}

#[test]
fn test_bcrypt_store_from_earlier_app_still_logs_in() {
    each_backend(|store| {
        let legacy = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";
        store
            .users
            .insert(&UserRecord::new("alice", legacy, "a@x.io", "Alice", "2025-01-02"))
            .unwrap();
        let auth = AuthService::new(store.users.clone(), true);
        let profile = ProfileService::new(store.users.clone());

        assert!(auth.authenticate("alice", "wrong-one").is_err(), "{}", store.name);
        assert_eq!(auth.authenticate("alice", "U*U").unwrap().nickname, "Alice");
        let upgraded = store.users.find_by_id("alice").unwrap().unwrap().pw_hash;
        assert!(upgraded.starts_with("$argon2id$"), "{}", store.name);

        profile.change_password("alice", "U*U", "operator2").unwrap();
        assert!(auth.authenticate("alice", "operator2").is_ok(), "{}", store.name);
    });
}

#[test]
fn test_demo_account_fallback() {
    each_backend(|store| {
        let auth = AuthService::new(store.users.clone(), true);
        let profile = auth.login("neo", "matrix1234").unwrap();
        assert_eq!(profile.nickname, "네오", "{}", store.name);
        assert_eq!(profile.joined, "2024-10-10");

        let locked = AuthService::new(store.users.clone(), false);
        assert!(matches!(
            locked.login("neo", "matrix1234").unwrap_err(),
            Error::AuthFailure(_)
        ));
    });
}

#[test]
fn test_stored_user_shadows_demo_account() {
    each_backend(|store| {
        let hash = hash_password("my-own-password").unwrap();
        store
            .users
            .insert(&UserRecord::new("guest", hash, "g@mine.io", "Mine", "2025-05-05"))
            .unwrap();
        let auth = AuthService::new(store.users.clone(), true);

        assert!(auth.authenticate("guest", "12341234").is_err(), "{}", store.name);
        assert_eq!(auth.authenticate("guest", "my-own-password").unwrap().nickname, "Mine");
    });
}

// ============================================================================
// Profile
// ============================================================================

#[test]
fn test_change_password() {
    each_backend(|store| {
        let registration = RegistrationService::new(store.users.clone());
        registration
            .sign_up(&sign_up_request("tank", "tank@zion.ai", "operator1"))
            .unwrap();
        let profile = ProfileService::new(store.users.clone());
        let auth = AuthService::new(store.users.clone(), true);
        let before = store.users.find_by_id("tank").unwrap().unwrap().pw_hash;

        let err = profile.change_password("tank", "operator1", "short").unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "{}", store.name);
        assert_eq!(store.users.find_by_id("tank").unwrap().unwrap().pw_hash, before);

        profile.change_password("tank", "operator1", "operator2").unwrap();
        assert!(auth.authenticate("tank", "operator1").is_err(), "{}", store.name);
        assert!(auth.authenticate("tank", "operator2").is_ok(), "{}", store.name);
    });
}

#[test]
fn test_nickname_change_is_visible_to_login() {
    each_backend(|store| {
        let registration = RegistrationService::new(store.users.clone());
        registration
            .sign_up(&sign_up_request("dozer", "dozer@zion.ai", "operator1"))
            .unwrap();
        ProfileService::new(store.users.clone())
            .update_nickname("dozer", "  Dozer  ")
            .unwrap();

        let auth = AuthService::new(store.users.clone(), true);
        assert_eq!(
            auth.get_profile("dozer").unwrap().unwrap().nickname,
            "Dozer",
            "{}",
            store.name
        );
    });
}

// ============================================================================
// Favorites
// ============================================================================

#[test]
fn test_favorites_seed_once() {
    each_backend(|store| {
        let service = FavoriteService::new(store.favorites.clone());

        let first = service.list("switch").unwrap();
        let ids: Vec<i64> = first.iter().map(|f| f.title_id).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>(), "{}", store.name);
        assert_eq!(first[0], FavoriteEntry::new(1, "영화 제목 1", "🎬"));

        assert_eq!(service.list("switch").unwrap(), first, "{}", store.name);
        assert_eq!(store.favorites.load("switch").unwrap(), first, "{}", store.name);
    });
}

#[test]
fn test_favorites_remove() {
    each_backend(|store| {
        let service = FavoriteService::new(store.favorites.clone());
        service.list("apoc").unwrap();

        service.remove("apoc", 4).unwrap();
        let after = service.list("apoc").unwrap();
        assert!(after.iter().all(|f| f.title_id != 4), "{}", store.name);
        assert_eq!(after.len(), 9);

        service.remove("apoc", 404).unwrap();
        assert_eq!(service.list("apoc").unwrap(), after, "{}", store.name);
    });
}

#[test]
fn test_favorites_are_per_user() {
    each_backend(|store| {
        let service = FavoriteService::new(store.favorites.clone());
        service.list("a-user").unwrap();
        service.list("b-user").unwrap();
        service.remove("a-user", 1).unwrap();

        assert_eq!(service.list("a-user").unwrap().len(), 9, "{}", store.name);
        assert_eq!(service.list("b-user").unwrap().len(), 10, "{}", store.name);
    });
}

#[test]
fn test_favorites_paging() {
    each_backend(|store| {
        let service = FavoriteService::new(store.favorites.clone());
        let page = service.page("mouse", 2).unwrap();
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.total_items, 10);
        assert_eq!(page.items.len(), 2, "{}", store.name);

        let clamped = service.page("mouse", 0).unwrap();
        assert_eq!(clamped.page, 1);
    });
}

// ============================================================================
// Reviews
// ============================================================================

#[test]
fn test_review_add_appends_at_end() {
    each_backend(|store| {
        let service = ReviewService::new(store.reviews.clone());
        service.add("cypher", "The Matrix", "steak").unwrap();
        let before = service.list("cypher").unwrap();

        let added = service.add("cypher", " Reloaded ", " fine ").unwrap();
        let after = service.list("cypher").unwrap();

        assert_eq!(after.len(), before.len() + 1, "{}", store.name);
        assert_eq!(after.last(), Some(&added));
        assert_eq!(added.title, "Reloaded");
        assert!(!added.created_at.is_empty());
    });
}

#[test]
fn test_review_rejects_blank_input() {
    each_backend(|store| {
        let service = ReviewService::new(store.reviews.clone());
        assert!(matches!(
            service.add("cypher", "", "body").unwrap_err(),
            Error::Validation(_)
        ));
        assert!(matches!(
            service.add("cypher", "Title", "   ").unwrap_err(),
            Error::Validation(_)
        ));
        assert!(service.list("cypher").unwrap().is_empty(), "{}", store.name);
    });
}

// ============================================================================
// Context, storage selection and backups
// ============================================================================

#[test]
fn test_context_uses_configured_backend() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        storage: StorageBackend::Duckdb,
        allow_demo_accounts: true,
    };
    config.save(dir.path()).unwrap();

    let ctx = MimoContext::new(dir.path()).unwrap();
    ctx.registration_service
        .sign_up(&sign_up_request("niobe", "niobe@zion.ai", "logos-ship"))
        .unwrap();

    assert!(dir.path().join(DB_FILE).exists());
    assert!(!dir.path().join(".users_demo.csv").exists());
    assert!(ctx.auth_service.login("niobe", "logos-ship").is_ok());
}

#[test]
fn test_csv_context_backup_restore() {
    let dir = TempDir::new().unwrap();
    {
        let ctx = MimoContext::new(dir.path()).unwrap();
        ctx.registration_service
            .sign_up(&sign_up_request("link", "link@zion.ai", "operator9"))
            .unwrap();
        ctx.favorite_service.list("link").unwrap();
    }

    let backups = BackupService::new(dir.path());
    let backup = backups.create(None).unwrap();

    {
        let ctx = MimoContext::new(dir.path()).unwrap();
        ctx.favorite_service.remove("link", 1).unwrap();
        ctx.profile_service.update_nickname("link", "Changed").unwrap();
    }

    backups.restore(&backup.name).unwrap();

    let ctx = MimoContext::new(dir.path()).unwrap();
    assert_eq!(ctx.favorite_service.list("link").unwrap().len(), 10);
    assert_eq!(
        ctx.auth_service.get_profile("link").unwrap().unwrap().nickname,
        "link nick"
    );
    assert!(fs::read_dir(dir.path().join("backups")).unwrap().count() >= 2);
}
