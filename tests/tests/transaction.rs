use pretty_assertions::assert_eq;
use quarry::{ops, Context, Error, Node, Record};
use quarry_core::driver::operation::Transaction;
use tests::{
    goradd::{node, Person},
    DbTest,
};

fn person(first: &str, last: &str) -> Person {
    let mut person = Person::new();
    person.set_first_name(first);
    person.set_last_name(last);
    person
}

#[tokio::test]
async fn nested_scopes_share_one_transaction() {
    let mut t = DbTest::mysql();

    let outer = t.db.begin(&mut t.cx).await.unwrap();
    let inner = t.db.begin(&mut t.cx).await.unwrap();
    assert!(t.cx.in_transaction("goradd"));

    person("Ada", "Lovelace").save(&t.db, &mut t.cx).await.unwrap();

    t.db.commit(&mut t.cx, inner).await.unwrap();
    assert!(t.cx.in_transaction("goradd"));
    t.db.commit(&mut t.cx, outer).await.unwrap();
    assert!(!t.cx.in_transaction("goradd"));

    assert_eq!(
        t.log().sql(),
        [
            "START TRANSACTION",
            "INSERT INTO `person` (`first_name`, `last_name`) VALUES (?, ?);",
            "COMMIT",
        ]
    );
    assert_eq!(t.driver.connects(), 1);
}

#[tokio::test]
async fn inner_rollback_fails_the_outer_commit() {
    let mut t = DbTest::postgresql();

    let outer = t.db.begin(&mut t.cx).await.unwrap();
    let inner = t.db.begin(&mut t.cx).await.unwrap();
    t.db.rollback(&mut t.cx, inner).await.unwrap();

    let err = t.db.commit(&mut t.cx, outer).await.unwrap_err();
    assert!(err.is_transaction_rollback());

    let log = t.log();
    assert_eq!(log.sql(), ["BEGIN", "ROLLBACK"]);
    assert!(!log.has_transaction(Transaction::Commit));
}

#[tokio::test]
async fn failed_statement_rolls_back_on_commit() {
    let mut t = DbTest::mysql();

    let token = t.db.begin(&mut t.cx).await.unwrap();
    t.driver
        .push_error(Error::integrity("Duplicate entry 'ada' for key 'username'"));

    let err = person("Ada", "Lovelace")
        .save(&t.db, &mut t.cx)
        .await
        .unwrap_err();
    assert!(err.is_integrity());

    let err = t.db.commit(&mut t.cx, token).await.unwrap_err();
    assert!(err.is_transaction_rollback());
    assert!(t.log().has_transaction(Transaction::Rollback));
}

#[tokio::test]
async fn scopes_close_innermost_first() {
    let mut t = DbTest::mysql();

    let outer = t.db.begin(&mut t.cx).await.unwrap();
    let inner = t.db.begin(&mut t.cx).await.unwrap();

    let err = t.db.commit(&mut t.cx, outer).await.unwrap_err();
    assert!(err.is_invalid_statement());

    t.db.rollback(&mut t.cx, inner).await.unwrap();
}

#[tokio::test]
async fn token_belongs_to_its_context() {
    let mut t = DbTest::mysql();
    let mut other = Context::new();

    let token = t.db.begin(&mut t.cx).await.unwrap();
    let err = t.db.commit(&mut other, token).await.unwrap_err();
    assert!(err.is_invalid_statement());
    assert!(!other.in_transaction("goradd"));
}

#[tokio::test]
async fn closure_commits_on_success() {
    let mut t = DbTest::mysql();
    let db = t.db.clone();

    let id = t
        .db
        .transaction(&mut t.cx, async |cx| {
            let mut ada = person("Ada", "Lovelace");
            ada.save(&db, cx).await?;
            ada.id()
        })
        .await
        .unwrap();
    assert_eq!(id, 1);

    let log = t.log();
    assert!(log.has_transaction(Transaction::Start));
    assert!(log.has_transaction(Transaction::Commit));
    assert!(!t.cx.in_transaction("goradd"));
}

#[tokio::test]
async fn closure_rolls_back_on_error() {
    let mut t = DbTest::mysql();
    let db = t.db.clone();

    let err = t
        .db
        .transaction(&mut t.cx, async |cx| {
            let count = Person::query()
                .filter(ops::equal(node::person().last_name(), "Wolfe"))
                .count(&db, cx, false, Vec::<Node>::new())
                .await?;
            if count == 0 {
                return Err(Error::record_not_found("no manager named Wolfe"));
            }
            Ok(count)
        })
        .await
        .unwrap_err();
    assert!(err.is_record_not_found());

    let log = t.log();
    assert_eq!(log.sql().first().map(String::as_str), Some("START TRANSACTION"));
    assert_eq!(log.sql().last().map(String::as_str), Some("ROLLBACK"));
}

#[tokio::test]
async fn contexts_use_separate_connections() {
    let t = DbTest::mysql();
    let mut a = Context::new();
    let mut b = Context::new();

    let token = t.db.begin(&mut a).await.unwrap();
    person("Ada", "Lovelace").save(&t.db, &mut b).await.unwrap();
    t.db.commit(&mut a, token).await.unwrap();

    assert_eq!(t.driver.connects(), 2);
    assert!(!b.in_transaction("goradd"));
}
