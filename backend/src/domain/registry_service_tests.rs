//! Behaviour coverage for the batch mutation orchestrator.

use std::sync::Arc;

use chrono::NaiveDate;
use rstest::rstest;

use crate::domain::ports::{
    InMemoryUserStore, MockUserStore, UniqueField, UserStore, UserStoreError,
};
use crate::domain::{
    ErrorCode, NewUser, Registration, RegistryService, Selector, SelectorParseError,
};

fn birthdate() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 1, 1).expect("valid date")
}

fn candidate(name: &str, email: &str) -> NewUser {
    NewUser::try_from_parts(name, email, birthdate()).expect("valid candidate")
}

fn service_with_memory_store() -> (RegistryService, Arc<InMemoryUserStore>) {
    let store = Arc::new(InMemoryUserStore::new());
    let service = RegistryService::new(store.clone());
    (service, store)
}

#[tokio::test]
async fn non_overlapping_candidates_all_succeed() {
    let (service, store) = service_with_memory_store();

    let outcome = service
        .add_users(vec![
            candidate("Alice Smith", "alice@example.com"),
            candidate("Bob Johnson", "bob@example.com"),
            candidate("Carol Reed", "carol@example.com"),
        ])
        .await
        .expect("batch runs");

    assert_eq!(outcome.succeeded().len(), 3);
    assert!(outcome.failed().is_empty());
    assert_eq!(store.find_all().await.expect("list").len(), 3);
}

#[tokio::test]
async fn success_messages_carry_the_assigned_id() {
    let (service, _store) = service_with_memory_store();

    let outcome = service
        .add_users(vec![candidate("Alice Smith", "alice@example.com")])
        .await
        .expect("batch runs");

    assert_eq!(outcome.succeeded(), ["Added user 'Alice Smith' with ID 1"]);
}

#[tokio::test]
async fn same_batch_name_duplicate_fails_only_the_second_candidate() {
    let (service, store) = service_with_memory_store();

    let outcome = service
        .add_users(vec![
            candidate("Eve", "e@x.com"),
            candidate("Eve", "other@x.com"),
        ])
        .await
        .expect("batch runs");

    assert_eq!(outcome.succeeded().len(), 1);
    assert_eq!(
        outcome.failed(),
        ["User with name 'Eve' is already registered"]
    );
    assert_eq!(store.find_all().await.expect("list").len(), 1);
}

#[tokio::test]
async fn same_batch_email_duplicate_fails_only_the_second_candidate() {
    let (service, store) = service_with_memory_store();

    let outcome = service
        .add_users(vec![
            candidate("Eve", "e@x.com"),
            candidate("Someone Else", "e@x.com"),
        ])
        .await
        .expect("batch runs");

    assert_eq!(outcome.succeeded().len(), 1);
    assert_eq!(
        outcome.failed(),
        ["User with email 'e@x.com' is already registered"]
    );
    assert_eq!(store.find_all().await.expect("list").len(), 1);
}

#[tokio::test]
async fn a_failing_candidate_never_blocks_its_siblings() {
    let (service, store) = service_with_memory_store();
    service
        .add_users(vec![candidate("Alice Smith", "alice@example.com")])
        .await
        .expect("seed");

    let outcome = service
        .add_users(vec![
            candidate("Alice Smith", "other@example.com"),
            candidate("Bob Johnson", "bob@example.com"),
        ])
        .await
        .expect("batch runs");

    assert_eq!(
        outcome.failed(),
        ["User with name 'Alice Smith' is already registered"]
    );
    assert_eq!(outcome.succeeded(), ["Added user 'Bob Johnson' with ID 2"]);
    assert_eq!(store.find_all().await.expect("list").len(), 2);
}

#[tokio::test]
async fn a_lost_uniqueness_race_takes_the_conflict_shape() {
    // The pre-checks pass but the save loses against a concurrent writer;
    // the constraint rejection must read like the pre-check failure.
    let mut store = MockUserStore::new();
    store.expect_exists_by_name().return_once(|_| Ok(false));
    store.expect_exists_by_email().return_once(|_| Ok(false));
    store.expect_save().return_once(|_| {
        Err(UserStoreError::unique_violation(
            UniqueField::Name,
            "Alice Smith",
        ))
    });
    let service = RegistryService::new(Arc::new(store));

    let outcome = service
        .add_users(vec![candidate("Alice Smith", "alice@example.com")])
        .await
        .expect("batch runs despite the constraint rejection");

    assert!(outcome.succeeded().is_empty());
    assert_eq!(
        outcome.failed(),
        ["User with name 'Alice Smith' is already registered"]
    );
}

#[rstest]
#[case(UserStoreError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(UserStoreError::query("broken"), ErrorCode::InternalError)]
#[tokio::test]
async fn infrastructure_failures_abort_the_request(
    #[case] store_error: UserStoreError,
    #[case] expected: ErrorCode,
) {
    let mut store = MockUserStore::new();
    store
        .expect_exists_by_name()
        .return_once(move |_| Err(store_error));
    let service = RegistryService::new(Arc::new(store));

    let err = service
        .add_users(vec![candidate("Alice Smith", "alice@example.com")])
        .await
        .expect_err("infrastructure failures propagate");

    assert_eq!(err.code(), expected);
}

#[tokio::test]
async fn register_user_collects_every_uniqueness_failure() {
    let (service, _store) = service_with_memory_store();
    service
        .add_users(vec![candidate("Eve", "e@x.com")])
        .await
        .expect("seed");

    let registration = service
        .register_user(candidate("Eve", "e@x.com"))
        .await
        .expect("registration runs");

    assert_eq!(
        registration,
        Registration::Rejected(vec![
            "User with name 'Eve' is already registered".to_owned(),
            "User with email 'e@x.com' is already registered".to_owned(),
        ])
    );
}

#[tokio::test]
async fn register_user_persists_a_clean_candidate() {
    let (service, store) = service_with_memory_store();

    let registration = service
        .register_user(candidate("Alice Smith", "alice@example.com"))
        .await
        .expect("registration runs");

    match registration {
        Registration::Registered(user) => assert_eq!(user.id(), 1),
        Registration::Rejected(errors) => panic!("unexpected rejection: {errors:?}"),
    }
    assert_eq!(store.find_all().await.expect("list").len(), 1);
}

#[tokio::test]
async fn deleting_the_same_id_twice_fails_the_second_time() {
    let (service, store) = service_with_memory_store();
    service
        .add_users(vec![candidate("Alice Smith", "alice@example.com")])
        .await
        .expect("seed");

    let first = service
        .delete_users(vec![Ok(Selector::Id(1))])
        .await
        .expect("first delete");
    assert_eq!(first.succeeded(), ["Deleted user with ID: 1"]);
    assert!(first.failed().is_empty());
    assert!(!store.exists_by_id(1).await.expect("probe"));

    let second = service
        .delete_users(vec![Ok(Selector::Id(1))])
        .await
        .expect("second delete");
    assert!(second.succeeded().is_empty());
    assert_eq!(second.failed(), ["User with ID 1 not found"]);
}

#[tokio::test]
async fn deleting_by_name_removes_the_match_and_reports_one_entry() {
    let (service, store) = service_with_memory_store();
    service
        .add_users(vec![candidate("Alice Smith", "alice@example.com")])
        .await
        .expect("seed");

    let outcome = service
        .delete_users(vec![Ok(Selector::Name("Alice Smith".to_owned()))])
        .await
        .expect("delete runs");

    assert_eq!(outcome.succeeded(), ["Deleted user(s) with name 'Alice Smith'"]);
    assert!(store
        .find_by_name("Alice Smith")
        .await
        .expect("lookup")
        .is_empty());
}

#[tokio::test]
async fn deleting_a_name_group_issues_one_grouped_store_call() {
    use mockall::predicate::function;

    let homonyms = vec![
        crate::domain::User::from_parts(1, candidate("Alice Smith", "alice@example.com")),
        crate::domain::User::from_parts(4, candidate("Alice Smith", "alice2@example.com")),
    ];
    let mut store = MockUserStore::new();
    let returned = homonyms.clone();
    store
        .expect_find_by_name()
        .return_once(move |_| Ok(returned));
    store
        .expect_delete_all()
        .with(function(|users: &[crate::domain::User]| users.len() == 2))
        .times(1)
        .return_once(|_| Ok(()));
    let service = RegistryService::new(Arc::new(store));

    let outcome = service
        .delete_users(vec![Ok(Selector::Name("Alice Smith".to_owned()))])
        .await
        .expect("delete runs");

    assert_eq!(outcome.succeeded(), ["Deleted user(s) with name 'Alice Smith'"]);
    assert!(outcome.failed().is_empty());
}

#[tokio::test]
async fn unknown_names_record_a_not_found_failure() {
    let (service, _store) = service_with_memory_store();

    let outcome = service
        .delete_users(vec![Ok(Selector::Name("Nobody".to_owned()))])
        .await
        .expect("delete runs");

    assert_eq!(outcome.failed(), ["User(s) 'Nobody' not found"]);
}

#[tokio::test]
async fn malformed_selectors_fail_in_place_without_aborting_the_batch() {
    let (service, _store) = service_with_memory_store();
    service
        .add_users(vec![candidate("Alice Smith", "alice@example.com")])
        .await
        .expect("seed");

    let outcome = service
        .delete_users(vec![
            Err(SelectorParseError::invalid_id("abc")),
            Ok(Selector::Id(1)),
            Err(SelectorParseError::unrecognised("{\"email\":\"x\"}")),
        ])
        .await
        .expect("delete runs");

    assert_eq!(outcome.succeeded(), ["Deleted user with ID: 1"]);
    assert_eq!(
        outcome.failed(),
        [
            "User ID 'abc' is not a valid number",
            "Invalid request object: {\"email\":\"x\"}",
        ]
    );
}

#[tokio::test]
async fn duplicate_selectors_are_processed_independently() {
    let (service, _store) = service_with_memory_store();
    service
        .add_users(vec![candidate("Alice Smith", "alice@example.com")])
        .await
        .expect("seed");

    let outcome = service
        .delete_users(vec![Ok(Selector::Id(1)), Ok(Selector::Id(1))])
        .await
        .expect("delete runs");

    assert_eq!(outcome.succeeded(), ["Deleted user with ID: 1"]);
    assert_eq!(outcome.failed(), ["User with ID 1 not found"]);
}

#[tokio::test]
async fn remove_by_id_reports_whether_anything_was_removed() {
    let (service, _store) = service_with_memory_store();
    service
        .add_users(vec![candidate("Alice Smith", "alice@example.com")])
        .await
        .expect("seed");

    assert!(service.remove_by_id(1).await.expect("first removal"));
    assert!(!service.remove_by_id(1).await.expect("second removal"));
}

#[tokio::test]
async fn lookup_by_name_is_read_only() {
    let (service, store) = service_with_memory_store();
    service
        .add_users(vec![candidate("Alice Smith", "alice@example.com")])
        .await
        .expect("seed");

    let found = service.lookup_by_name("Alice Smith").await.expect("lookup");

    assert_eq!(found.len(), 1);
    assert_eq!(store.find_all().await.expect("list").len(), 1);
}
