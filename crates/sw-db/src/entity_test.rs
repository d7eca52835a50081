use super::*;
use crate::DuckDbBackend;

#[derive(Debug, PartialEq)]
struct Tag {
    id: i64,
    label: String,
    slug: Option<String>,
}

impl Entity for Tag {
    const TABLE: &'static str = "tags";
    const KEY: &'static str = "id";
    const COLUMNS: &'static [&'static str] = &["id", "label", "slug"];

    fn from_row(row: Vec<Value>) -> DbResult<Self> {
        let mut cells = row.into_iter();
        let id = cells.next().and_then(|v| v.as_i64()).unwrap_or_default();
        let label = cells.next().and_then(Value::into_text).unwrap_or_default();
        let slug = cells.next().and_then(Value::into_text);
        Ok(Tag { id, label, slug })
    }

    fn key(&self) -> Value {
        self.id.into()
    }

    fn field(&self, column: &str) -> Option<Value> {
        match column {
            "id" => Some(self.id.into()),
            "label" => Some(self.label.as_str().into()),
            "slug" => Some(self.slug.clone().into()),
            _ => None,
        }
    }
}

fn seeded() -> DuckDbBackend {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE tags (id INTEGER, label VARCHAR, slug VARCHAR);
         INSERT INTO tags VALUES (2, 'Beta', NULL), (1, 'Alpha', NULL), (3, 'Gamma', 'g');",
    )
    .unwrap();
    db
}

#[test]
fn fetch_all_ordered() {
    let db = seeded();
    let tags: Vec<Tag> = db.fetch(&Criteria::all().order_by("id")).unwrap();
    let ids: Vec<i64> = tags.iter().map(|t| t.id).collect();
    assert_eq!(ids, [1, 2, 3]);
    assert_eq!(tags[2].slug.as_deref(), Some("g"));
}

#[test]
fn fetch_with_filter() {
    let db = seeded();
    let tags: Vec<Tag> = db
        .fetch(&Criteria::all().filter("slug IS NULL AND id > ?", vec![1i64.into()]))
        .unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].label, "Beta");
}

#[test]
fn fetch_through_trait_object() {
    let db = seeded();
    let dyn_db: &dyn Database = &db;
    let tags: Vec<Tag> = dyn_db.fetch(&Criteria::all()).unwrap();
    assert_eq!(tags.len(), 3);
}

#[test]
fn update_writes_only_listed_fields() {
    let db = seeded();
    let tag = Tag {
        id: 1,
        label: "ignored".to_string(),
        slug: Some("alpha".to_string()),
    };
    db.update(&tag, &["slug"]).unwrap();

    let tags: Vec<Tag> = db
        .fetch(&Criteria::all().filter("id = ?", vec![1i64.into()]))
        .unwrap();
    assert_eq!(
        tags[0],
        Tag {
            id: 1,
            label: "Alpha".to_string(),
            slug: Some("alpha".to_string()),
        }
    );
}

#[test]
fn update_unknown_field_fails() {
    let db = seeded();
    let tag = Tag {
        id: 1,
        label: "Alpha".to_string(),
        slug: None,
    };
    let err = db.update(&tag, &["colour"]).unwrap_err();
    assert!(matches!(err, DbError::UnknownColumn { .. }));
}

#[test]
fn update_missing_row_fails() {
    let db = seeded();
    let tag = Tag {
        id: 99,
        label: "Ghost".to_string(),
        slug: None,
    };
    let err = db.update(&tag, &["label"]).unwrap_err();
    assert!(matches!(err, DbError::RowNotFound { .. }));
}

#[test]
fn fetch_missing_table_fails() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert!(db.fetch::<Tag>(&Criteria::all()).is_err());
}
