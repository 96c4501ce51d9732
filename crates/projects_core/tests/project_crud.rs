use projects_core::db::open_db_in_memory;
use projects_core::{
    Amount, NewMaterial, NewStep, ProjectDetails, ProjectRepository, RepoError,
    SqliteProjectRepository,
};
use rusqlite::Connection;

fn details(name: &str) -> ProjectDetails {
    ProjectDetails {
        project_name: name.to_string(),
        estimated_hours: Some("4.5".parse().unwrap()),
        actual_hours: Some("3".parse().unwrap()),
        difficulty: Some(2),
        notes: Some("bring gloves".to_string()),
    }
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn insert_then_fetch_returns_same_fields() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteProjectRepository::try_new(&mut conn).unwrap();

    let id = repo.insert_project(&details("Paint the fence")).unwrap();
    let loaded = repo.fetch_project_by_id(id).unwrap().unwrap();

    assert_eq!(loaded.project_id, id);
    assert_eq!(loaded.details(), details("Paint the fence"));
    assert!(loaded.materials.is_empty());
    assert!(loaded.steps.is_empty());
    assert!(loaded.categories.is_empty());
}

#[test]
fn decimal_columns_keep_two_fraction_digits() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteProjectRepository::try_new(&mut conn).unwrap();

    let mut input = details("Precise");
    input.estimated_hours = Some(Amount::from_hundredths(1_234_567));
    input.actual_hours = Some(Amount::from_hundredths(1));
    let id = repo.insert_project(&input).unwrap();

    let loaded = repo.fetch_project_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.estimated_hours.unwrap().to_string(), "12345.67");
    assert_eq!(loaded.actual_hours.unwrap().to_string(), "0.01");
}

#[test]
fn optional_columns_round_trip_as_none() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteProjectRepository::try_new(&mut conn).unwrap();

    let id = repo.insert_project(&ProjectDetails::new("Bare")).unwrap();
    let loaded = repo.fetch_project_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.details(), ProjectDetails::new("Bare"));
}

#[test]
fn fetch_missing_project_returns_none() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteProjectRepository::try_new(&mut conn).unwrap();
    assert!(repo.fetch_project_by_id(404).unwrap().is_none());
}

#[test]
fn fetch_all_orders_by_name_without_children() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteProjectRepository::try_new(&mut conn).unwrap();

    let zebra = repo.insert_project(&details("Zebra shed")).unwrap();
    let apple = repo.insert_project(&details("Apple press")).unwrap();
    repo.insert_step(
        zebra,
        &NewStep {
            step_text: "Pour the slab".to_string(),
        },
    )
    .unwrap();

    let all = repo.fetch_all_projects().unwrap();
    let ids: Vec<_> = all.iter().map(|project| project.project_id).collect();
    assert_eq!(ids, vec![apple, zebra]);
    assert!(all.iter().all(|project| project.steps.is_empty()));
}

#[test]
fn update_changes_only_detail_columns() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteProjectRepository::try_new(&mut conn).unwrap();

    let id = repo.insert_project(&details("Old name")).unwrap();
    let other = repo.insert_project(&details("Untouched")).unwrap();
    repo.insert_material(
        id,
        &NewMaterial {
            material_name: "Nails".to_string(),
            num_required: Some(10),
            cost: None,
        },
    )
    .unwrap();

    let mut changed = details("New name");
    changed.difficulty = Some(5);
    changed.notes = None;
    assert!(repo.modify_project_details(id, &changed).unwrap());

    let loaded = repo.fetch_project_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.details(), changed);
    assert_eq!(loaded.materials.len(), 1);

    let untouched = repo.fetch_project_by_id(other).unwrap().unwrap();
    assert_eq!(untouched.details(), details("Untouched"));
}

#[test]
fn update_missing_project_reports_no_change() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteProjectRepository::try_new(&mut conn).unwrap();
    assert!(!repo.modify_project_details(9, &details("ghost")).unwrap());
}

#[test]
fn invalid_details_are_rejected_before_sql() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut repo = SqliteProjectRepository::try_new(&mut conn).unwrap();
        let mut input = details("Too hard");
        input.difficulty = Some(9);
        let err = repo.insert_project(&input).unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }
    assert_eq!(count(&conn, "project"), 0);
}

#[test]
fn delete_removes_row_and_cascades_children() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut repo = SqliteProjectRepository::try_new(&mut conn).unwrap();
        let id = repo.insert_project(&details("Doomed")).unwrap();
        repo.insert_material(
            id,
            &NewMaterial {
                material_name: "Glue".to_string(),
                ..NewMaterial::default()
            },
        )
        .unwrap();
        repo.insert_step(
            id,
            &NewStep {
                step_text: "Glue it".to_string(),
            },
        )
        .unwrap();
        repo.add_category_to_project(id, "Crafts").unwrap();

        assert!(repo.delete_project(id).unwrap());
        assert!(repo.fetch_project_by_id(id).unwrap().is_none());
        assert!(!repo.delete_project(id).unwrap());
    }

    assert_eq!(count(&conn, "material"), 0);
    assert_eq!(count(&conn, "step"), 0);
    assert_eq!(count(&conn, "project_category"), 0);
    assert_eq!(count(&conn, "category"), 1);
}

#[test]
fn steps_are_appended_in_order() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteProjectRepository::try_new(&mut conn).unwrap();
    let id = repo.insert_project(&details("Ordered")).unwrap();

    for text in ["first", "second", "third"] {
        repo.insert_step(
            id,
            &NewStep {
                step_text: text.to_string(),
            },
        )
        .unwrap();
    }

    let loaded = repo.fetch_project_by_id(id).unwrap().unwrap();
    let steps: Vec<_> = loaded
        .steps
        .iter()
        .map(|step| (step.step_order, step.step_text.as_str()))
        .collect();
    assert_eq!(steps, vec![(1, "first"), (2, "second"), (3, "third")]);
}

#[test]
fn child_inserts_for_missing_project_return_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteProjectRepository::try_new(&mut conn).unwrap();

    let err = repo
        .insert_step(
            77,
            &NewStep {
                step_text: "nowhere".to_string(),
            },
        )
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(77)));

    let err = repo.add_category_to_project(77, "Orphans").unwrap_err();
    assert!(matches!(err, RepoError::NotFound(77)));
    assert!(repo.fetch_all_categories().unwrap().is_empty());
}

#[test]
fn categories_are_reused_by_name_and_linked_once() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteProjectRepository::try_new(&mut conn).unwrap();
    let first = repo.insert_project(&details("One")).unwrap();
    let second = repo.insert_project(&details("Two")).unwrap();

    let created = repo.add_category_to_project(first, "Outdoor").unwrap();
    let reused = repo.add_category_to_project(second, "outdoor").unwrap();
    let again = repo.add_category_to_project(first, "Outdoor").unwrap();
    assert_eq!(created, reused);
    assert_eq!(created, again);

    let loaded = repo.fetch_project_by_id(first).unwrap().unwrap();
    assert_eq!(loaded.categories, vec![created.clone()]);
    assert_eq!(repo.fetch_all_categories().unwrap(), vec![created]);
}

#[test]
fn failed_batch_rolls_back_every_statement() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut repo = SqliteProjectRepository::try_new(&mut conn).unwrap();
        let err = repo
            .execute_batch(&[
                "INSERT INTO project (project_name) VALUES ('ok')".to_string(),
                "INSERT INTO no_such_table VALUES (1)".to_string(),
            ])
            .unwrap_err();
        assert!(matches!(err, RepoError::Db(_)));
    }
    assert_eq!(count(&conn, "project"), 0);
}

#[test]
fn repository_requires_project_tables() {
    let mut conn = Connection::open_in_memory().unwrap();
    let err = SqliteProjectRepository::try_new(&mut conn)
        .err()
        .expect("bare connection has no tables");
    assert!(matches!(err, RepoError::MissingRequiredTable("project")));
}

#[test]
fn listing_reads_run_in_their_own_transaction() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut repo = SqliteProjectRepository::try_new(&mut conn).unwrap();
        let project_id = repo.insert_project(&details("Shelf")).unwrap();
        repo.add_category_to_project(project_id, "Woodwork").unwrap();

        assert_eq!(repo.fetch_all_projects().unwrap().len(), 1);
        assert_eq!(repo.fetch_all_categories().unwrap().len(), 1);
    }
    assert!(conn.is_autocommit());

    // A caller-held transaction makes the nested BEGIN fail.
    conn.execute_batch("BEGIN;").unwrap();
    {
        let repo = SqliteProjectRepository::try_new(&mut conn).unwrap();
        assert!(matches!(repo.fetch_all_projects(), Err(RepoError::Db(_))));
        assert!(matches!(repo.fetch_all_categories(), Err(RepoError::Db(_))));
    }
    conn.execute_batch("ROLLBACK;").unwrap();
    assert!(conn.is_autocommit());
}
