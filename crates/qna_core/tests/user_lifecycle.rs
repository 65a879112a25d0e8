use qna_core::db::open_db_in_memory;
use qna_core::{
    EntityKind, EntityValidationError, IdentifierSequencer, Question, QuestionService,
    ServiceError, SqliteSequencer, User, UserService,
};

#[test]
fn create_then_get_returns_the_created_user() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::try_new(&conn).unwrap();

    let created = service
        .create(&User::new("ada", "s3cret", "ada@example.com").with_phone("555-0100"))
        .unwrap();

    assert_eq!(created.user_id, Some(1));
    assert_eq!(service.get(1).unwrap(), created);
}

#[test]
fn successful_create_advances_sequence_by_exactly_one() {
    let conn = open_db_in_memory().unwrap();
    let sequencer = SqliteSequencer::try_new(&conn).unwrap();
    let service = UserService::try_new(&conn).unwrap();

    for expected in 1..=3 {
        let before = sequencer.current_value("users_seq").unwrap();
        let created = service
            .create(&User::new(format!("user{expected}"), "pw", "u@example.com"))
            .unwrap();
        assert_eq!(created.user_id, Some(before + 1));
        assert_eq!(sequencer.current_value("users_seq").unwrap(), before + 1);
    }
}

#[test]
fn invalid_email_fails_validation_without_consuming_an_id() {
    let conn = open_db_in_memory().unwrap();
    let sequencer = SqliteSequencer::try_new(&conn).unwrap();
    let service = UserService::try_new(&conn).unwrap();

    let err = service
        .create(&User::new("ada", "pw", "not-an-email"))
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Validation(EntityValidationError::InvalidEmail)
    ));
    assert_eq!(sequencer.current_value("users_seq").unwrap(), 0);
    assert!(service.list().unwrap().is_empty());
}

#[test]
fn single_label_email_domain_is_accepted() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::try_new(&conn).unwrap();

    let created = service
        .create(&User::new("root", "pw", "root@localhost"))
        .unwrap();

    assert_eq!(created.user_id, Some(1));
    assert_eq!(service.get(1).unwrap().email, "root@localhost");
}

#[test]
fn update_overwrites_every_field_including_clearing_phone() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::try_new(&conn).unwrap();
    service
        .create(&User::new("ada", "pw", "ada@example.com").with_phone("555-0100"))
        .unwrap();

    let updated = service
        .update(1, &User::new("Ada L.", "pw2", "ada@lovelace.org"))
        .unwrap();

    assert_eq!(updated.user_id, Some(1));
    let stored = service.get(1).unwrap();
    assert_eq!(stored.name, "Ada L.");
    assert_eq!(stored.email, "ada@lovelace.org");
    assert_eq!(stored.phone, None);
}

#[test]
fn delete_twice_reports_not_found_the_second_time() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::try_new(&conn).unwrap();
    service
        .create(&User::new("ada", "pw", "ada@example.com"))
        .unwrap();

    service.delete(1).unwrap();
    let err = service.delete(1).unwrap_err();

    assert!(matches!(
        err,
        ServiceError::NotFound {
            kind: EntityKind::User,
            id: 1,
        }
    ));
    assert!(matches!(
        service.get(1).unwrap_err(),
        ServiceError::NotFound { .. }
    ));
}

#[test]
fn deleting_a_user_who_owns_questions_is_a_constraint_violation() {
    let conn = open_db_in_memory().unwrap();
    let users = UserService::try_new(&conn).unwrap();
    let questions = QuestionService::try_new(&conn).unwrap();
    let owner = users
        .create(&User::new("ada", "pw", "ada@example.com"))
        .unwrap();
    questions
        .create(&Question::new("who owns me?", owner.user_id.unwrap()))
        .unwrap();

    let err = users.delete(1).unwrap_err();

    assert!(matches!(err, ServiceError::ConstraintViolation { .. }), "{err}");
    assert_eq!(users.get(1).unwrap(), owner);
}

#[test]
fn user_payload_deserializes_from_camel_case_json() {
    let user: User = serde_json::from_str(
        r#"{"userId":9,"name":"ada","password":"pw","email":"ada@example.com"}"#,
    )
    .unwrap();

    assert_eq!(user.user_id, Some(9));
    assert_eq!(user.phone, None);

    let conn = open_db_in_memory().unwrap();
    let created = UserService::try_new(&conn).unwrap().create(&user).unwrap();
    assert_eq!(created.user_id, Some(1));
}
