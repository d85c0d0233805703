use sportsbook_catalog::*;
use sportsbook_db::{self as db, SqliteStore, SqliteTransaction};
use sportsbook_engine::*;

fn command(json: &str) -> Command {
    Command::Create(parse(json).unwrap())
}

const BOXING: &str = r#"{"sport":{"name":"boxing","display_name":"Boxing","slug":"boxing"}}"#;

/// Trips the token as soon as a write transaction is open, so the command
/// body runs and the pre-commit check is what stops it.
struct CancelAfterBegin {
    inner: SqliteStore,
    token: CancellationToken,
}

impl Store for CancelAfterBegin {
    type Tx<'a> = SqliteTransaction<'a>;

    fn read(&mut self) -> Result<Self::Tx<'_>, StoreError> {
        self.inner.read()
    }

    fn write(&mut self) -> Result<Self::Tx<'_>, StoreError> {
        let tx = self.inner.write()?;
        self.token.cancel();
        Ok(tx)
    }
}

#[test]
fn execute_dispatches_each_command() {
    let mut engine = CatalogEngine::new(SqliteStore::open_memory().unwrap());

    let id = match engine.execute(command(BOXING)).unwrap() {
        Outcome::Created(id) => id,
        other => panic!("expected Created, got {other:?}"),
    };

    let update = Command::Update(
        parse(&format!(r#"{{"sport":{{"id":{id},"values":{{"order":3}}}}}}"#)).unwrap(),
    );
    assert_eq!(engine.execute(update).unwrap(), Outcome::Updated(true));

    let search = Command::Search(parse(r#"{"sport":"box"}"#).unwrap());
    match engine.execute(search).unwrap() {
        Outcome::Rows(SearchResults::Sports(rows)) => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].order, Some(3));
        }
        other => panic!("expected sport rows, got {other:?}"),
    }

    let delete = Command::Delete(parse(&format!(r#"{{"sport":{{"id":{id}}}}}"#)).unwrap());
    assert_eq!(engine.execute(delete).unwrap(), Outcome::Deleted(true));
}

#[test]
fn cancelled_engine_refuses_new_commands() {
    let mut engine = CatalogEngine::new(SqliteStore::open_memory().unwrap());
    engine.cancellation().cancel();

    assert!(matches!(
        engine.execute(command(BOXING)),
        Err(CommandError::Cancelled)
    ));
    assert!(matches!(
        engine.search(&SearchFilter::All("box".to_string())),
        Err(CommandError::Cancelled)
    ));
    assert!(db::search_sports(engine.store().connection(), "box")
        .unwrap()
        .is_empty());
}

#[test]
fn cancellation_before_commit_rolls_back() {
    let token = CancellationToken::new();
    let store = CancelAfterBegin {
        inner: SqliteStore::open_memory().unwrap(),
        token: token.clone(),
    };
    let mut engine = CatalogEngine::with_cancellation(store, token);

    assert!(matches!(
        engine.execute(command(BOXING)),
        Err(CommandError::Cancelled)
    ));
    let conn = engine.store().inner.connection();
    assert!(db::search_sports(conn, "box").unwrap().is_empty());
}

#[test]
fn failed_command_leaves_engine_usable() {
    let mut engine = CatalogEngine::new(SqliteStore::open_memory().unwrap());
    engine.execute(command(BOXING)).unwrap();
    assert!(matches!(
        engine.execute(command(BOXING)),
        Err(CommandError::DuplicateKey { .. })
    ));
    // The failed transaction was dropped; the next one opens cleanly.
    let id = match engine
        .execute(command(
            r#"{"sport":{"name":"tennis","display_name":"Tennis","slug":"tennis"}}"#,
        ))
        .unwrap()
    {
        Outcome::Created(id) => id,
        other => panic!("expected Created, got {other:?}"),
    };
    assert!(db::find_sport(engine.store().connection(), id).unwrap().is_some());
}

#[test]
fn error_messages_name_the_row() {
    let err = CommandError::HasDependents {
        kind: EntityKind::Sport,
        id: 4,
        dependent: EntityKind::Event,
        count: 2,
    };
    assert_eq!(
        err.to_string(),
        "Cannot delete sport 4: 2 event row(s) still reference it"
    );
    let err = CommandError::NotFound {
        kind: EntityKind::MarketEvent,
        id: 9,
    };
    assert_eq!(err.to_string(), "No market_event with id 9");
}
