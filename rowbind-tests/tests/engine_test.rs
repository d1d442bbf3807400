//! Engine tests against the in-memory fixture driver
//!
//! These cover the lifecycle guarantees (every opened connection and cursor
//! closed exactly once, on success and on every failure path) and the
//! name-based binding rules, without a database server.

use rowbind::{
    BindingPolicy, Connection, ConnectionSource, Error, ErrorKind, Parameters, Record, Row,
    RowExt, Statement, StatementRunner, Value,
};
use rowbind_tests::{Fixture, FixtureSource, FIXTURE_URL};

#[derive(Debug, Default, PartialEq, Record, Parameters)]
struct User {
    #[rowbind(rename = "Id")]
    id: i64,
    #[rowbind(rename = "Name")]
    name: String,
}

#[derive(Debug, Default, PartialEq, Record, Parameters)]
struct Scored {
    #[rowbind(rename = "Id")]
    id: i64,
    #[rowbind(rename = "Name")]
    name: String,
    #[rowbind(rename = "Score")]
    score: Option<i32>,
    #[rowbind(skip)]
    cached_rank: u32,
}

fn users_fixture() -> Fixture {
    Fixture::new(&["Id", "Name"])
        .row(vec![Value::I64(3), Value::from("alice")])
}

fn find_user(id: i64) -> Statement {
    Statement::new("SELECT Id, Name FROM Users WHERE Id = @id").bind("@id", id)
}

// ============ Query Scenarios ============

#[tokio::test]
async fn test_query_by_id_returns_matching_user() {
    let source = FixtureSource::new(users_fixture());
    let probe = source.probe();
    let runner = StatementRunner::new(source);

    let users: Vec<User> = runner.query(&find_user(3)).await.unwrap();

    assert_eq!(
        users,
        vec![User {
            id: 3,
            name: "alice".into()
        }]
    );
    assert_eq!(probe.opened(), 1);
    assert_eq!(probe.closed(), 1);
    assert_eq!(probe.open_connections(), 0);

    let statements = probe.statements();
    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].parameters()[0].bare_name(), "id");
    assert_eq!(statements[0].parameters()[0].value(), &Value::I64(3));
}

#[tokio::test]
async fn test_query_with_no_rows_is_empty() {
    let source = FixtureSource::new(Fixture::new(&["Id", "Name"]));
    let probe = source.probe();
    let runner = StatementRunner::new(source);

    let users: Vec<User> = runner.query(&find_user(99)).await.unwrap();

    assert!(users.is_empty());
    assert_eq!(probe.open_connections(), 0);
    assert_eq!(probe.cursors_closed(), 1);
}

#[tokio::test]
async fn test_query_returns_every_row_in_order() {
    let mut fixture = Fixture::new(&["Id", "Name"]);
    for id in 1..=5 {
        fixture = fixture.row(vec![Value::I64(id), Value::from(format!("user{}", id))]);
    }
    let source = FixtureSource::new(fixture);
    let probe = source.probe();
    let runner = StatementRunner::new(source);

    let users: Vec<User> = runner
        .query(&Statement::new("SELECT Id, Name FROM Users"))
        .await
        .unwrap();

    let ids: Vec<i64> = users.iter().map(|u| u.id).collect();
    assert_eq!(ids, [1, 2, 3, 4, 5]);
    assert_eq!(users[4].name, "user5");
    // Exactly one advance per row, plus the one that reports exhaustion
    assert_eq!(probe.advances(), 6);
}

// ============ Binding Rules ============

#[tokio::test]
async fn test_null_score_binds_as_none() {
    let fixture = Fixture::new(&["Id", "Name", "Score"])
        .row(vec![Value::I64(7), Value::from("a"), Value::Null])
        .row(vec![Value::I64(8), Value::from("b"), Value::I64(0)]);
    let runner = StatementRunner::new(FixtureSource::new(fixture));

    let rows: Vec<Scored> = runner
        .query(&Statement::new("SELECT Id, Name, Score FROM Scores"))
        .await
        .unwrap();

    assert_eq!(
        rows[0],
        Scored {
            id: 7,
            name: "a".into(),
            score: None,
            cached_rank: 0,
        }
    );
    // A real zero stays distinguishable from NULL
    assert_eq!(rows[1].score, Some(0));
}

#[tokio::test]
async fn test_extra_column_is_ignored() {
    let fixture = Fixture::new(&["Id", "CreatedBy", "Name"])
        .row(vec![Value::I64(1), Value::from("admin"), Value::from("bob")]);
    let runner = StatementRunner::new(FixtureSource::new(fixture));

    let users: Vec<User> = runner
        .query(&Statement::new("SELECT * FROM Users"))
        .await
        .unwrap();

    assert_eq!(
        users,
        vec![User {
            id: 1,
            name: "bob".into()
        }]
    );
}

#[tokio::test]
async fn test_missing_column_keeps_default() {
    let fixture = Fixture::new(&["Id"]).row(vec![Value::I64(4)]);
    let runner = StatementRunner::new(FixtureSource::new(fixture));

    let rows: Vec<Scored> = runner
        .query(&Statement::new("SELECT Id FROM Scores"))
        .await
        .unwrap();

    assert_eq!(rows[0].id, 4);
    assert_eq!(rows[0].name, "");
    assert_eq!(rows[0].score, None);
}

#[tokio::test]
async fn test_skipped_field_is_not_bound() {
    let fixture = Fixture::new(&["Id", "cached_rank"]).row(vec![Value::I64(4), Value::I64(9)]);
    let runner = StatementRunner::new(FixtureSource::new(fixture));

    let rows: Vec<Scored> = runner
        .query(&Statement::new("SELECT Id, 9 AS cached_rank FROM Scores"))
        .await
        .unwrap();

    assert_eq!(rows[0].cached_rank, 0);
}

#[tokio::test]
async fn test_binding_error_releases_connection() {
    let fixture = Fixture::new(&["Id", "Name"])
        .row(vec![Value::I64(1), Value::from("ok")])
        .row(vec![Value::from("not-a-number"), Value::from("bad")])
        .row(vec![Value::I64(3), Value::from("never read")]);
    let source = FixtureSource::new(fixture);
    let probe = source.probe();
    let runner = StatementRunner::new(source);

    let err = runner
        .query::<User>(&Statement::new("SELECT Id, Name FROM Users"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Binding);
    assert_eq!(probe.advances(), 2);
    assert_eq!(probe.closed(), 1);
    assert_eq!(probe.cursors_closed(), 1);
}

#[tokio::test]
async fn test_null_into_plain_field_keeps_default() {
    let fixture = Fixture::new(&["Id", "Name"])
        .row(vec![Value::I64(1), Value::Null])
        .row(vec![Value::Null, Value::from("bob")]);

    for policy in [BindingPolicy::Strict, BindingPolicy::Lenient] {
        let runner = StatementRunner::new(FixtureSource::new(fixture.clone())).with_policy(policy);

        let users: Vec<User> = runner
            .query(&Statement::new("SELECT Id, Name FROM Users"))
            .await
            .unwrap();

        assert_eq!(
            users,
            vec![
                User {
                    id: 1,
                    name: String::new()
                },
                User {
                    id: 0,
                    name: "bob".into()
                },
            ]
        );
    }
}

#[tokio::test]
async fn test_null_scalar_is_binding_error() {
    let fixture = Fixture::new(&["MAX(Score)"]).row(vec![Value::Null]);
    let runner = StatementRunner::new(FixtureSource::new(fixture));

    let err = runner
        .query_scalar::<i32>(&Statement::new("SELECT MAX(Score) FROM Scores"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Binding);

    let max: Option<i32> = runner
        .query_scalar(&Statement::new("SELECT MAX(Score) FROM Scores"))
        .await
        .unwrap();
    assert_eq!(max, None);
}

#[tokio::test]
async fn test_lenient_policy_keeps_other_fields() {
    let fixture = Fixture::new(&["Id", "Name"])
        .row(vec![Value::from("not-a-number"), Value::from("carol")]);
    let runner =
        StatementRunner::new(FixtureSource::new(fixture)).with_policy(BindingPolicy::Lenient);

    let users: Vec<User> = runner
        .query(&Statement::new("SELECT Id, Name FROM Users"))
        .await
        .unwrap();

    assert_eq!(users[0].id, 0);
    assert_eq!(users[0].name, "carol");
}

// ============ Handlers and Transforms ============

#[tokio::test]
async fn test_handler_failure_closes_connection_once() {
    let fixture = Fixture::new(&["Id", "Name"])
        .row(vec![Value::I64(1), Value::from("a")])
        .row(vec![Value::I64(2), Value::from("b")])
        .row(vec![Value::I64(3), Value::from("c")]);
    let source = FixtureSource::new(fixture);
    let probe = source.probe();
    let runner = StatementRunner::new(source);

    let mut handled = Vec::new();
    let err = runner
        .execute(&Statement::new("SELECT Id, Name FROM Users"), |row| {
            let id: i64 = row.get(0)?;
            if id == 2 {
                return Err(Error::handler("stop at 2"));
            }
            handled.push(id);
            Ok(())
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Handler);
    assert_eq!(handled, [1]);
    assert_eq!(probe.opened(), 1);
    assert_eq!(probe.closed(), 1);
    assert_eq!(probe.cursors_closed(), 1);
    assert_eq!(probe.advances(), 2);
}

#[tokio::test]
async fn test_execute_without_handler_reads_all_rows() {
    let source = FixtureSource::new(users_fixture().row(vec![Value::I64(4), Value::from("dan")]));
    let probe = source.probe();
    let runner = StatementRunner::new(source);

    runner
        .execute_drop(&Statement::new("SELECT Id, Name FROM Users"))
        .await
        .unwrap();

    assert_eq!(probe.advances(), 3);
    assert_eq!(probe.open_connections(), 0);
}

#[tokio::test]
async fn test_custom_transform() {
    let runner = StatementRunner::new(FixtureSource::new(users_fixture()));

    let names: Vec<String> = runner
        .query_with(&find_user(3), |row| {
            row.get_by_name::<String>("Name").map(|n| n.to_uppercase())
        })
        .await
        .unwrap();

    assert_eq!(names, ["ALICE"]);
}

#[tokio::test]
async fn test_positional_arrays() {
    let fixture = Fixture::new(&["Id", "Score"])
        .row(vec![Value::I64(1), Value::Null])
        .row(vec![Value::I64(2), Value::I32(50)]);
    let runner = StatementRunner::new(FixtureSource::new(fixture));

    let rows = runner
        .query_values(&Statement::new("SELECT Id, Score FROM Scores"))
        .await
        .unwrap();

    assert_eq!(
        rows,
        vec![
            vec![Value::I64(1), Value::Null],
            vec![Value::I64(2), Value::I32(50)],
        ]
    );

    let ids = runner
        .query_values_with(&Statement::new("SELECT Id, Score FROM Scores"), |row| {
            Ok(vec![row.get_value("Id")?])
        })
        .await
        .unwrap();
    assert_eq!(ids, vec![vec![Value::I64(1)], vec![Value::I64(2)]]);
}

#[tokio::test]
async fn test_query_first_drains_remaining_rows() {
    let source = FixtureSource::new(users_fixture().row(vec![Value::I64(4), Value::from("dan")]));
    let probe = source.probe();
    let runner = StatementRunner::new(source);

    let first: Option<User> = runner
        .query_first(&Statement::new("SELECT Id, Name FROM Users"))
        .await
        .unwrap();

    assert_eq!(first.map(|u| u.id), Some(3));
    assert_eq!(probe.advances(), 3);
    assert_eq!(probe.cursors_closed(), 1);
}

#[tokio::test]
async fn test_query_scalar() {
    let fixture = Fixture::new(&["COUNT(*)"]).row(vec![Value::I64(42)]);
    let runner = StatementRunner::new(FixtureSource::new(fixture));

    let count: u64 = runner
        .query_scalar(&Statement::new("SELECT COUNT(*) FROM Users"))
        .await
        .unwrap();
    assert_eq!(count, 42);

    let empty = StatementRunner::new(FixtureSource::new(Fixture::new(&["COUNT(*)"])));
    let err = empty
        .query_scalar::<u64>(&Statement::new("SELECT COUNT(*) FROM Users"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataAccess);
}

// ============ Non-Query ============

#[tokio::test]
async fn test_non_query_returns_affected_count() {
    let source = FixtureSource::new(Fixture::default().affected(2));
    let probe = source.probe();
    let runner = StatementRunner::new(source);

    let affected = runner
        .execute_non_query(&Statement::new("DELETE FROM Users WHERE Name = @name").bind("@name", "x"))
        .await
        .unwrap();

    assert_eq!(affected, 2);
    assert_eq!(probe.open_connections(), 0);
    assert_eq!(probe.cursors_opened(), 0);
}

#[tokio::test]
async fn test_non_query_without_parameters() {
    let source = FixtureSource::new(Fixture::default());
    let probe = source.probe();
    let runner = StatementRunner::new(source);

    let affected = runner
        .execute_non_query(&Statement::new("DELETE FROM Sessions"))
        .await
        .unwrap();

    assert_eq!(affected, 0);
    assert!(probe.statements()[0].parameters().is_empty());
    assert_eq!(probe.closed(), 1);
}

#[tokio::test]
async fn test_bind_record_parameters() {
    let source = FixtureSource::new(Fixture::default().affected(1));
    let probe = source.probe();
    let record = Scored {
        id: 7,
        name: "a".into(),
        score: None,
        cached_rank: 5,
    };

    let affected = Statement::new("INSERT INTO Scores (Id, Name, Score) VALUES (@Id, @Name, @Score)")
        .bind_record(&record)
        .execute_non_query(&StatementRunner::new(source))
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let statements = probe.statements();
    let statement = &statements[0];
    let names: Vec<&str> = statement.parameters().iter().map(|p| p.name()).collect();
    assert_eq!(names, ["Id", "Name", "Score"]);
    assert!(statement.parameters()[2].value().is_null());
    assert_eq!(<Scored as Parameters>::parameter_names(), ["Id", "Name", "Score"]);
    assert_eq!(<Scored as Record>::field_names(), ["Id", "Name", "Score"]);
}

// ============ Failure Paths ============

#[tokio::test]
async fn test_missing_connection_string_opens_nothing() {
    let source = FixtureSource::unconfigured(users_fixture());
    let probe = source.probe();
    let runner = StatementRunner::new(source);

    let err = runner.query::<User>(&find_user(3)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(probe.constructed(), 0);
    assert_eq!(probe.opened(), 0);
}

#[tokio::test]
async fn test_open_failure_is_data_access_error() {
    let source = FixtureSource::new(users_fixture().fail_open());
    let probe = source.probe();
    let runner = StatementRunner::new(source);

    let err = runner.query::<User>(&find_user(3)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DataAccess);
    assert_eq!(probe.opened(), 0);
    assert_eq!(probe.closed(), 0);
}

#[tokio::test]
async fn test_statement_failure_closes_connection() {
    let source = FixtureSource::new(users_fixture().fail_statement());
    let probe = source.probe();
    let runner = StatementRunner::new(source);

    let query_err = runner.query::<User>(&find_user(3)).await.unwrap_err();
    let non_query_err = runner
        .execute_non_query(&Statement::new("DELETE FROM Users"))
        .await
        .unwrap_err();

    assert_eq!(query_err.kind(), ErrorKind::DataAccess);
    assert_eq!(non_query_err.kind(), ErrorKind::DataAccess);
    assert_eq!(probe.opened(), 2);
    assert_eq!(probe.closed(), 2);
    assert_eq!(probe.cursors_opened(), 0);
}

#[tokio::test]
async fn test_read_failure_midway_closes_everything() {
    let fixture = users_fixture()
        .row(vec![Value::I64(4), Value::from("dan")])
        .fail_read_at(1);
    let source = FixtureSource::new(fixture);
    let probe = source.probe();
    let runner = StatementRunner::new(source);

    let err = runner
        .query::<User>(&Statement::new("SELECT Id, Name FROM Users"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DataAccess);
    assert_eq!(probe.cursors_closed(), 1);
    assert_eq!(probe.closed(), 1);
}

#[tokio::test]
async fn test_close_failure_is_reported() {
    let source = FixtureSource::new(users_fixture().fail_close());
    let probe = source.probe();
    let runner = StatementRunner::new(source);

    let err = runner.query::<User>(&find_user(3)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DataAccess);
    assert_eq!(probe.opened(), 1);
    assert_eq!(probe.closed(), 1);
    assert_eq!(probe.cursors_closed(), 1);
}

#[tokio::test]
async fn test_earlier_error_wins_over_close_failure() {
    let source = FixtureSource::new(users_fixture().fail_close());
    let probe = source.probe();
    let runner = StatementRunner::new(source);

    let err = runner
        .execute(&find_user(3), |_| Err(Error::handler("abort")))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Handler);
    assert_eq!(probe.opened(), 1);
    assert_eq!(probe.closed(), 1);
    assert_eq!(probe.cursors_closed(), 1);
}

#[tokio::test]
async fn test_fixture_counts_every_close_call() {
    let source = FixtureSource::new(users_fixture());
    let probe = source.probe();

    let mut connection = source.open_connection(FIXTURE_URL).unwrap();
    connection.open().await.unwrap();
    connection.close().await.unwrap();
    connection.close().await.unwrap();

    // A repeated close is visible, so the runner's single close is checkable
    assert_eq!(probe.opened(), 1);
    assert_eq!(probe.closed(), 2);
}

#[tokio::test]
async fn test_mixed_parameters_are_passed_through_to_driver() {
    // The fixture driver accepts any parameter set; only real drivers bind them
    let source = FixtureSource::new(users_fixture());
    let probe = source.probe();
    let runner = StatementRunner::new(source);

    let statement = Statement::new("SELECT Id, Name FROM Users WHERE Id = ? AND Name = @name")
        .push(3)
        .bind("@name", "alice");
    let users: Vec<User> = runner.query(&statement).await.unwrap();

    assert_eq!(users.len(), 1);
    assert_eq!(probe.statements()[0].parameters().len(), 2);
}

// ============ Concurrency ============

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_calls_use_separate_connections() {
    let source = FixtureSource::new(users_fixture());
    let probe = source.probe();
    let runner = std::sync::Arc::new(StatementRunner::new(source));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let runner = runner.clone();
            tokio::spawn(async move { runner.query::<User>(&find_user(3)).await })
        })
        .collect();

    for task in tasks {
        let users = task.await.unwrap().unwrap();
        assert_eq!(users.len(), 1);
    }

    assert_eq!(probe.constructed(), 8);
    assert_eq!(probe.opened(), 8);
    assert_eq!(probe.closed(), 8);
}
