//! Integration tests for relation planning and queryset application.

use std::sync::Arc;

use fieldset::prelude::*;
use fieldset::query::{PATH_SEPARATOR, Plan};
use pretty_assertions::assert_eq;

struct Country {
    name: String,
}

struct City {
    name: String,
    country: Country,
}

struct Profile {
    bio: String,
}

struct Comment {
    body: String,
    author: Box<User>,
}

struct User {
    name: String,
    city: Option<City>,
    profile: Profile,
    comments: Vec<Comment>,
}

fn country() -> Arc<Serializer<Country>> {
    Arc::new(Serializer::new("Country").field(Field::serialize("name", |c: &Country| &c.name)))
}

fn city() -> Arc<Serializer<City>> {
    Arc::new(
        Serializer::new("City")
            .field(Field::serialize("name", |c: &City| &c.name))
            .field(Field::nested("country", |c: &City| Some(&c.country), country()))
            .relation("country", [Directive::select("country")]),
    )
}

fn profile() -> Arc<Serializer<Profile>> {
    Arc::new(
        Serializer::new("Profile")
            .field(Field::serialize("bio", |p: &Profile| &p.bio))
            // Never planned below the external `profile` relation.
            .relation("bio", [Directive::select("bio_text")]),
    )
}

/// Users without comments, to keep the recursion finite.
fn commenter() -> Arc<Serializer<User>> {
    Arc::new(
        Serializer::new("User")
            .field(Field::serialize("name", |u: &User| &u.name))
            .field(Field::nested("city", |u: &User| u.city.as_ref(), city()))
            .relation("city", [Directive::select("city")]),
    )
}

fn comment() -> Arc<Serializer<Comment>> {
    Arc::new(
        Serializer::new("Comment")
            .field(Field::serialize("body", |c: &Comment| &c.body))
            .field(Field::nested("author", |c: &Comment| Some(c.author.as_ref()), commenter()))
            .relation("author", [Directive::select("author")]),
    )
}

fn users() -> Serializer<User> {
    Serializer::new("User")
        .field(Field::serialize("name", |u: &User| &u.name))
        .field(Field::nested("city", |u: &User| u.city.as_ref(), city()))
        .field(Field::nested("profile", |u: &User| Some(&u.profile), profile()))
        .field(Field::nested_many("comments", |u: &User| Some(&u.comments), comment()))
        .relation("city", [Directive::select("city"), Directive::select("city_stats")])
        .relation("profile", [Directive::external("profile")])
        .relation("comments", [Directive::prefetch("comments")])
}

fn plan(selection: &str) -> Directives {
    users().plan(Some(&Selection::parse(selection)))
}

#[test]
fn test_plain_fields_plan_nothing() {
    assert!(plan("name").is_empty());
}

#[test]
fn test_nested_select_prefix() {
    let directives = plan("city{country{name}}");
    assert_eq!(
        directives.select,
        vec!["city", "city__country", "city_stats"]
    );
    assert!(directives.prefetch.is_empty());
    assert!(directives.external.is_empty());
}

#[test]
fn test_only_first_descriptor_is_parent() {
    let directives = plan("city{country}");
    assert!(!directives.select.iter().any(|p| p.starts_with("city_stats__")));
}

#[test]
fn test_prefetch_parent_promotes_selects() {
    let directives = plan("comments{author{city{country}}}");
    assert!(directives.select.is_empty());
    assert_eq!(
        directives.prefetch,
        vec![
            "comments",
            "comments__author",
            "comments__author__city",
            "comments__author__city__country",
        ]
    );
}

#[test]
fn test_external_parent_drops_children() {
    let directives = plan("profile{bio}");
    assert_eq!(directives.external, vec!["profile"]);
    assert!(directives.select.is_empty());
}

#[test]
fn test_dedup_across_siblings() {
    let directives = plan("city,city{name},comments{body},comments");
    assert_eq!(directives.select, vec!["city", "city_stats"]);
    assert_eq!(directives.prefetch, vec!["comments"]);
}

#[test]
fn test_default_fields_drive_plan() {
    let serializer = users().default_fields(["comments"]);
    let directives = serializer.plan(None);
    assert_eq!(directives.prefetch, vec!["comments"]);

    // An explicit selection replaces the defaults.
    let directives = serializer.plan(Some(&Selection::parse("city")));
    assert!(directives.prefetch.is_empty());
}

#[test]
fn test_plan_trait_object() {
    let serializer = users();
    let planner: &dyn Plan = &serializer;
    let parent = Directive::select("owner");

    let directives = planner.plan_under(Some(&Selection::parse("city")), Some(&parent));
    let expected = format!("owner{PATH_SEPARATOR}city");
    assert!(directives.select.contains(&expected));
}

#[test]
fn test_modify_queryset_order_and_idempotence() {
    let selection = Selection::parse("city,profile,comments");
    let serializer = users();

    let query = serializer.modify_queryset(QueryPlan::new(), Some(&selection));
    assert_eq!(
        query.select_related.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["city", "city_stats"]
    );
    assert!(query.prefetch_related.contains("comments"));
    assert!(query.api_related.contains("profile"));

    let again = serializer.modify_queryset(query.clone(), Some(&selection));
    assert_eq!(again, query);
}

/// A query object without an external resolver.
#[derive(Debug, Default, PartialEq)]
struct SqlOnly {
    joins: Vec<String>,
    prefetches: Vec<String>,
}

impl QuerySet for SqlOnly {
    fn select_related(mut self, paths: &[String]) -> Self {
        self.joins.extend_from_slice(paths);
        self
    }

    fn prefetch_related(mut self, paths: &[String]) -> Self {
        self.prefetches.extend_from_slice(paths);
        self
    }
}

#[test]
fn test_external_skipped_without_capability() {
    let selection = Selection::parse("profile,comments");
    let query = users().modify_queryset(SqlOnly::default(), Some(&selection));
    assert_eq!(
        query,
        SqlOnly {
            joins: Vec::new(),
            prefetches: vec!["comments".to_string()],
        }
    );
}

#[test]
fn test_directives_serialize() {
    let json = serde_json::to_value(plan("city,comments")).expect("serialize");
    assert_eq!(
        json,
        serde_json::json!({
            "select": ["city", "city_stats"],
            "prefetch": ["comments"],
            "external": []
        })
    );
}
