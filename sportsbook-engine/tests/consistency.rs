use sportsbook_catalog::*;
use sportsbook_db::{self as db, SqliteStore};
use sportsbook_engine::*;

fn engine() -> CatalogEngine<SqliteStore> {
    CatalogEngine::new(SqliteStore::open_memory().unwrap())
}

fn create(engine: &mut CatalogEngine<SqliteStore>, json: &str) -> Result<Id, CommandError> {
    engine.create(&parse(json).unwrap())
}

fn update(engine: &mut CatalogEngine<SqliteStore>, json: &str) -> Result<bool, CommandError> {
    engine.update(&parse(json).unwrap())
}

fn delete(engine: &mut CatalogEngine<SqliteStore>, json: &str) -> Result<bool, CommandError> {
    engine.delete(&parse(json).unwrap())
}

struct Catalog {
    sport: Id,
    event: Id,
    market: Id,
}

/// An inactive sport and market, and an event under the sport.
fn seed(engine: &mut CatalogEngine<SqliteStore>) -> Catalog {
    let sport = create(
        engine,
        r#"{"sport":{"name":"football","display_name":"Football","slug":"football","order":"1"}}"#,
    )
    .unwrap();
    let event = create(
        engine,
        &format!(
            r#"{{"event":{{"sport_id":"{sport}","name":"France vs England","type":"0","slug":"france_vs_england"}}}}"#
        ),
    )
    .unwrap();
    let market = create(
        engine,
        r#"{"market":{"name":"full time result","display_name":"Full Time Result","schema":"2","columns":"3"}}"#,
    )
    .unwrap();
    Catalog {
        sport,
        event,
        market,
    }
}

fn selection_json(market: Id, event: Id, name: &str) -> String {
    format!(
        r#"{{"selection":{{"market_id":{market},"event_id":{event},"name":"{name}","price":"1.85","outcome":"win"}}}}"#
    )
}

fn market_event_count(engine: &CatalogEngine<SqliteStore>) -> i64 {
    engine
        .store()
        .connection()
        .query_row("SELECT COUNT(*) FROM marketevents", [], |row| row.get(0))
        .unwrap()
}

// -- Create --

#[test]
fn duplicate_sport_name_is_rejected() {
    let mut engine = engine();
    let first = create(
        &mut engine,
        r#"{"sport":{"name":"boxing","display_name":"Boxing","slug":"boxing"}}"#,
    )
    .unwrap();

    let err = create(
        &mut engine,
        r#"{"sport":{"name":"boxing","display_name":"Pugilism","slug":"pugilism"}}"#,
    )
    .unwrap_err();
    assert!(
        matches!(err, CommandError::DuplicateKey { kind: EntityKind::Sport, .. }),
        "got {err:?}"
    );

    let conn = engine.store().connection();
    let sport = db::find_sport(conn, first).unwrap().unwrap();
    assert_eq!(sport.display_name, "Boxing");
    assert!(db::search_sports(conn, "pugilism").unwrap().is_empty());
}

#[test]
fn event_is_created_active_under_existing_sport() {
    let mut engine = engine();
    let c = seed(&mut engine);
    let conn = engine.store().connection();
    let event = db::find_event(conn, c.event).unwrap().unwrap();
    assert!(event.active);
    assert_eq!(event.sport_id, c.sport);
    assert!(!db::find_sport(conn, c.sport).unwrap().unwrap().active);
}

#[test]
fn event_payload_active_flag_is_ignored() {
    let mut engine = engine();
    let c = seed(&mut engine);
    let id = create(
        &mut engine,
        &format!(
            r#"{{"event":{{"sport_id":{},"name":"Spain vs Italy","type":0,"slug":"spain_vs_italy","active":false}}}}"#,
            c.sport
        ),
    )
    .unwrap();
    assert!(db::find_event(engine.store().connection(), id).unwrap().unwrap().active);
}

#[test]
fn event_with_unknown_sport_is_parent_not_found() {
    let mut engine = engine();
    let err = create(
        &mut engine,
        r#"{"event":{"sport_id":77,"name":"Nowhere","type":0,"slug":"nowhere"}}"#,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        CommandError::ParentNotFound {
            kind: EntityKind::Sport,
            id: 77
        }
    ));
}

#[test]
fn market_keeps_caller_active_flag() {
    let mut engine = engine();
    let id = create(
        &mut engine,
        r#"{"market":{"name":"both teams to score","display_name":"BTTS","schema":1,"active":"1"}}"#,
    )
    .unwrap();
    assert!(db::find_market(engine.store().connection(), id).unwrap().unwrap().active);
}

#[test]
fn selection_create_cascades_activation() {
    let mut engine = engine();
    let c = seed(&mut engine);
    {
        let conn = engine.store().connection();
        db::set_event_active(conn, c.event, false).unwrap();
        assert!(!db::find_sport(conn, c.sport).unwrap().unwrap().active);
        assert!(!db::find_market(conn, c.market).unwrap().unwrap().active);
    }

    let id = create(&mut engine, &selection_json(c.market, c.event, "France")).unwrap();

    let conn = engine.store().connection();
    let selection = db::find_selection(conn, id).unwrap().unwrap();
    assert!(selection.active);
    assert_eq!(selection.price, Price::from_cents(185));
    let me = db::find_market_event(conn, selection.marketevent_id)
        .unwrap()
        .unwrap();
    assert!(me.active);
    assert_eq!((me.market_id, me.event_id), (c.market, c.event));
    assert!(db::find_market(conn, c.market).unwrap().unwrap().active);
    assert!(db::find_event(conn, c.event).unwrap().unwrap().active);
    assert!(db::find_sport(conn, c.sport).unwrap().unwrap().active);
}

#[test]
fn selections_on_same_pair_share_market_event() {
    let mut engine = engine();
    let c = seed(&mut engine);
    let france = create(&mut engine, &selection_json(c.market, c.event, "France")).unwrap();
    let england = create(&mut engine, &selection_json(c.market, c.event, "England")).unwrap();

    let conn = engine.store().connection();
    let a = db::find_selection(conn, france).unwrap().unwrap();
    let b = db::find_selection(conn, england).unwrap().unwrap();
    assert_eq!(a.marketevent_id, b.marketevent_id);
    assert_eq!(market_event_count(&engine), 1);
}

#[test]
fn inactive_market_event_is_not_reused() {
    let mut engine = engine();
    let c = seed(&mut engine);
    let stale = db::insert_market_event(
        engine.store().connection(),
        &NewMarketEvent {
            market_id: c.market,
            event_id: c.event,
            active: false,
        },
    )
    .unwrap();

    let id = create(&mut engine, &selection_json(c.market, c.event, "France")).unwrap();
    let selection = db::find_selection(engine.store().connection(), id)
        .unwrap()
        .unwrap();
    assert_ne!(selection.marketevent_id, stale);
    assert_eq!(market_event_count(&engine), 2);
}

#[test]
fn selection_with_missing_event_writes_nothing() {
    let mut engine = engine();
    let c = seed(&mut engine);
    let err = create(&mut engine, &selection_json(c.market, 999, "Ghost")).unwrap_err();
    assert!(matches!(
        err,
        CommandError::ParentNotFound {
            kind: EntityKind::Event,
            id: 999
        }
    ));
    assert_eq!(market_event_count(&engine), 0);
    assert!(!db::find_market(engine.store().connection(), c.market).unwrap().unwrap().active);
}

#[test]
fn selection_with_missing_market_is_parent_not_found() {
    let mut engine = engine();
    let c = seed(&mut engine);
    let err = create(&mut engine, &selection_json(999, c.event, "Ghost")).unwrap_err();
    assert!(matches!(
        err,
        CommandError::ParentNotFound {
            kind: EntityKind::Market,
            ..
        }
    ));
}

// -- Update --

#[test]
fn sport_update_applies_fields() {
    let mut engine = engine();
    let c = seed(&mut engine);
    let json = format!(
        r#"{{"sport":{{"id":"{}","values":{{"display_name":"Soccer","active":1}}}}}}"#,
        c.sport
    );
    assert!(update(&mut engine, &json).unwrap());
    let sport = db::find_sport(engine.store().connection(), c.sport)
        .unwrap()
        .unwrap();
    assert_eq!(sport.display_name, "Soccer");
    assert_eq!(sport.name, "football");
    assert!(sport.active);
}

#[test]
fn update_of_missing_row_is_not_found() {
    let mut engine = engine();
    let err = update(&mut engine, r#"{"market":{"id":5,"values":{"name":"x"}}}"#).unwrap_err();
    assert!(matches!(
        err,
        CommandError::NotFound {
            kind: EntityKind::Market,
            id: 5
        }
    ));
    let err = update(&mut engine, r#"{"selection":{"id":5,"values":{"name":"x"}}}"#).unwrap_err();
    assert!(matches!(
        err,
        CommandError::NotFound {
            kind: EntityKind::Selection,
            id: 5
        }
    ));
}

#[test]
fn empty_update_is_malformed() {
    let mut engine = engine();
    let c = seed(&mut engine);
    let json = format!(r#"{{"sport":{{"id":{},"values":{{}}}}}}"#, c.sport);
    assert!(matches!(
        update(&mut engine, &json),
        Err(CommandError::MalformedPayload(_))
    ));
}

#[test]
fn event_sport_is_immutable() {
    let mut engine = engine();
    let c = seed(&mut engine);
    let other = create(
        &mut engine,
        r#"{"sport":{"name":"boxing","display_name":"Boxing","slug":"boxing"}}"#,
    )
    .unwrap();

    let json = format!(
        r#"{{"event":{{"id":{},"values":{{"sport_id":{other},"name":"Renamed"}}}}}}"#,
        c.event
    );
    let err = update(&mut engine, &json).unwrap_err();
    assert!(matches!(
        err,
        CommandError::ImmutableField {
            field: "sport_id",
            ..
        }
    ));

    let event = db::find_event(engine.store().connection(), c.event)
        .unwrap()
        .unwrap();
    assert_eq!(event.sport_id, c.sport);
    assert_eq!(event.name, "France vs England");
}

#[test]
fn event_update_with_null_sport_id_is_rejected() {
    let mut engine = engine();
    let c = seed(&mut engine);

    let json = format!(
        r#"{{"event":{{"id":{},"values":{{"sport_id":null,"name":"Renamed"}}}}}}"#,
        c.event
    );
    let err = update(&mut engine, &json).unwrap_err();
    assert!(
        matches!(
            err,
            CommandError::ImmutableField {
                field: "sport_id",
                ..
            }
        ),
        "got {err:?}"
    );

    let event = db::find_event(engine.store().connection(), c.event)
        .unwrap()
        .unwrap();
    assert_eq!(event.name, "France vs England");
    assert_eq!(event.sport_id, c.sport);
}

#[test]
fn moving_sole_selection_removes_orphaned_market_event() {
    let mut engine = engine();
    let c = seed(&mut engine);
    let other_market = create(
        &mut engine,
        r#"{"market":{"name":"first goalscorer","display_name":"First Goalscorer","schema":1}}"#,
    )
    .unwrap();
    let id = create(&mut engine, &selection_json(c.market, c.event, "Kane")).unwrap();
    let old_me = db::find_selection(engine.store().connection(), id)
        .unwrap()
        .unwrap()
        .marketevent_id;

    let json = format!(
        r#"{{"selection":{{"id":{id},"values":{{"market_id":{other_market},"price":"6.50"}}}}}}"#
    );
    assert!(update(&mut engine, &json).unwrap());

    let conn = engine.store().connection();
    assert!(db::find_market_event(conn, old_me).unwrap().is_none());
    let selection = db::find_selection(conn, id).unwrap().unwrap();
    assert_ne!(selection.marketevent_id, old_me);
    assert_eq!(selection.price.to_string(), "6.50");
    let me = db::find_market_event(conn, selection.marketevent_id)
        .unwrap()
        .unwrap();
    assert_eq!((me.market_id, me.event_id), (other_market, c.event));
    assert!(db::find_market(conn, other_market).unwrap().unwrap().active);
    assert_eq!(market_event_count(&engine), 1);
}

#[test]
fn moving_one_of_two_selections_keeps_market_event() {
    let mut engine = engine();
    let c = seed(&mut engine);
    let other_market = create(
        &mut engine,
        r#"{"market":{"name":"first goalscorer","display_name":"First Goalscorer","schema":1}}"#,
    )
    .unwrap();
    let kane = create(&mut engine, &selection_json(c.market, c.event, "Kane")).unwrap();
    let mbappe = create(&mut engine, &selection_json(c.market, c.event, "Mbappe")).unwrap();
    let shared = db::find_selection(engine.store().connection(), mbappe)
        .unwrap()
        .unwrap()
        .marketevent_id;

    let json = format!(
        r#"{{"selection":{{"id":{kane},"values":{{"market_id":{other_market},"event_id":{}}}}}}}"#,
        c.event
    );
    assert!(update(&mut engine, &json).unwrap());

    let conn = engine.store().connection();
    assert!(db::find_market_event(conn, shared).unwrap().is_some());
    assert_eq!(market_event_count(&engine), 2);
}

#[test]
fn update_on_same_pair_keeps_market_event() {
    let mut engine = engine();
    let c = seed(&mut engine);
    let id = create(&mut engine, &selection_json(c.market, c.event, "France")).unwrap();
    let before = db::find_selection(engine.store().connection(), id)
        .unwrap()
        .unwrap();

    let json = format!(r#"{{"selection":{{"id":{id},"values":{{"name":"Les Bleus","active":0}}}}}}"#);
    assert!(update(&mut engine, &json).unwrap());

    let after = db::find_selection(engine.store().connection(), id)
        .unwrap()
        .unwrap();
    assert_eq!(after.marketevent_id, before.marketevent_id);
    assert_eq!(after.name, "Les Bleus");
    assert!(!after.active);
    assert_eq!(after.outcome.as_deref(), Some("win"));
}

#[test]
fn selection_move_to_missing_event_is_rolled_back() {
    let mut engine = engine();
    let c = seed(&mut engine);
    let id = create(&mut engine, &selection_json(c.market, c.event, "France")).unwrap();
    let before = db::find_selection(engine.store().connection(), id)
        .unwrap()
        .unwrap();

    let json = format!(r#"{{"selection":{{"id":{id},"values":{{"event_id":404}}}}}}"#);
    assert!(matches!(
        update(&mut engine, &json),
        Err(CommandError::ParentNotFound {
            kind: EntityKind::Event,
            id: 404
        })
    ));
    let after = db::find_selection(engine.store().connection(), id)
        .unwrap()
        .unwrap();
    assert_eq!(after, before);
    assert_eq!(market_event_count(&engine), 1);
}

#[test]
fn selection_update_does_not_activate_sport() {
    let mut engine = engine();
    let c = seed(&mut engine);
    let id = create(&mut engine, &selection_json(c.market, c.event, "France")).unwrap();
    db::set_sport_active(engine.store().connection(), c.sport, false).unwrap();
    db::set_event_active(engine.store().connection(), c.event, false).unwrap();

    let json = format!(r#"{{"selection":{{"id":{id},"values":{{"price":"2.10"}}}}}}"#);
    assert!(update(&mut engine, &json).unwrap());

    let conn = engine.store().connection();
    assert!(db::find_event(conn, c.event).unwrap().unwrap().active);
    assert!(!db::find_sport(conn, c.sport).unwrap().unwrap().active);
}

// -- Delete --

#[test]
fn sport_with_events_cannot_be_deleted() {
    let mut engine = engine();
    let c = seed(&mut engine);

    let err = delete(&mut engine, &format!(r#"{{"sport":{{"id":{}}}}}"#, c.sport)).unwrap_err();
    match err {
        CommandError::HasDependents {
            kind,
            dependent,
            count,
            ..
        } => {
            assert_eq!(kind, EntityKind::Sport);
            assert_eq!(dependent, EntityKind::Event);
            assert_eq!(count, 1);
        }
        e => panic!("expected HasDependents, got {e:?}"),
    }
    assert!(db::find_sport(engine.store().connection(), c.sport).unwrap().is_some());

    assert!(delete(&mut engine, &format!(r#"{{"event":{{"id":{}}}}}"#, c.event)).unwrap());
    assert!(delete(&mut engine, &format!(r#"{{"sport":{{"id":{}}}}}"#, c.sport)).unwrap());
    assert!(db::find_sport(engine.store().connection(), c.sport).unwrap().is_none());
}

#[test]
fn event_and_market_with_market_events_cannot_be_deleted() {
    let mut engine = engine();
    let c = seed(&mut engine);
    create(&mut engine, &selection_json(c.market, c.event, "France")).unwrap();

    for json in [
        format!(r#"{{"event":{{"id":{}}}}}"#, c.event),
        format!(r#"{{"market":{{"id":{}}}}}"#, c.market),
    ] {
        let err = delete(&mut engine, &json).unwrap_err();
        assert!(
            matches!(
                err,
                CommandError::HasDependents {
                    dependent: EntityKind::MarketEvent,
                    count: 1,
                    ..
                }
            ),
            "got {err:?}"
        );
    }
}

#[test]
fn selection_delete_leaves_market_event() {
    let mut engine = engine();
    let c = seed(&mut engine);
    let id = create(&mut engine, &selection_json(c.market, c.event, "France")).unwrap();

    assert!(delete(&mut engine, &format!(r#"{{"selection":{{"id":{id}}}}}"#)).unwrap());
    assert!(db::find_selection(engine.store().connection(), id).unwrap().is_none());
    assert_eq!(market_event_count(&engine), 1);
}

#[test]
fn delete_of_missing_row_is_not_found() {
    let mut engine = engine();
    let err = delete(&mut engine, r#"{"sport":{"id":"12"}}"#).unwrap_err();
    assert!(matches!(
        err,
        CommandError::NotFound {
            kind: EntityKind::Sport,
            id: 12
        }
    ));
}
