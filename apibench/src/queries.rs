//! Request shapes for each (API kind, complexity) treatment.
//!
//! A REST tier is an ordered list of resource paths fetched one after
//! another; a GraphQL tier is one document posted with `owner`/`repo`
//! variables. Both tiers of the same complexity ask for the same data.

use apibench_core::{Complexity, Repository};
use serde::Serialize;

pub const GRAPHQL_SIMPLE: &str = r#"
query($owner: String!, $repo: String!) {
    repository(owner: $owner, name: $repo) {
        name
        description
        stargazerCount
        forkCount
        createdAt
        updatedAt
        primaryLanguage { name }
    }
}
"#;

pub const GRAPHQL_MEDIUM: &str = r#"
query($owner: String!, $repo: String!) {
    repository(owner: $owner, name: $repo) {
        name
        description
        stargazerCount
        forkCount
        issues(first: 10, orderBy: {field: CREATED_AT, direction: DESC}) {
            nodes {
                title
                state
                createdAt
                author { login }
            }
        }
    }
}
"#;

pub const GRAPHQL_COMPLEX: &str = r#"
query($owner: String!, $repo: String!) {
    repository(owner: $owner, name: $repo) {
        name
        description
        stargazerCount
        forkCount
        issues(first: 5, orderBy: {field: CREATED_AT, direction: DESC}) {
            nodes { title state createdAt }
        }
        mentionableUsers(first: 5) {
            nodes { login name }
        }
        refs(refPrefix: "refs/heads/", first: 5) {
            nodes { name }
        }
    }
}
"#;

pub fn graphql_query(complexity: Complexity) -> &'static str {
    match complexity {
        Complexity::Simple => GRAPHQL_SIMPLE,
        Complexity::Medium => GRAPHQL_MEDIUM,
        Complexity::Complex => GRAPHQL_COMPLEX,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphQlVariables<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
}

/// JSON body of a GraphQL POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'static str,
    pub variables: GraphQlVariables<'a>,
}

impl<'a> GraphQlRequest<'a> {
    pub fn new(complexity: Complexity, repository: &'a Repository) -> Self {
        Self {
            query: graphql_query(complexity),
            variables: GraphQlVariables {
                owner: &repository.owner,
                repo: &repository.name,
            },
        }
    }
}

/// REST paths (with query strings) of a tier, in request order.
pub fn rest_paths(complexity: Complexity, repository: &Repository) -> Vec<String> {
    let base = format!("/repos/{}/{}", repository.owner, repository.name);
    match complexity {
        Complexity::Simple => vec![base],
        Complexity::Medium => vec![
            base.clone(),
            format!("{base}/issues?per_page=10&state=all"),
        ],
        Complexity::Complex => vec![
            base.clone(),
            format!("{base}/issues?per_page=5&state=all"),
            format!("{base}/contributors?per_page=5"),
            format!("{base}/branches?per_page=5"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn react() -> Repository {
        Repository::new("facebook", "react")
    }

    #[test]
    fn test_rest_paths() {
        assert_eq!(
            rest_paths(Complexity::Simple, &react()),
            vec!["/repos/facebook/react"]
        );
        assert_eq!(
            rest_paths(Complexity::Medium, &react())[1],
            "/repos/facebook/react/issues?per_page=10&state=all"
        );

        let complex = rest_paths(Complexity::Complex, &react());
        assert_eq!(complex.len(), 4);
        assert_eq!(complex[0], "/repos/facebook/react");
        assert_eq!(complex[2], "/repos/facebook/react/contributors?per_page=5");
        assert_eq!(complex[3], "/repos/facebook/react/branches?per_page=5");
    }

    #[test]
    fn test_graphql_queries_select_tier_fields() {
        assert!(GRAPHQL_SIMPLE.contains("primaryLanguage { name }"));
        assert!(!GRAPHQL_SIMPLE.contains("issues"));
        assert!(GRAPHQL_MEDIUM.contains("issues(first: 10"));
        assert!(GRAPHQL_COMPLEX.contains("mentionableUsers(first: 5)"));
        assert!(GRAPHQL_COMPLEX.contains(r#"refs(refPrefix: "refs/heads/", first: 5)"#));
    }

    #[test]
    fn test_graphql_body() {
        let repo = react();
        let body = serde_json::to_value(GraphQlRequest::new(Complexity::Simple, &repo)).unwrap();

        assert_eq!(body["variables"]["owner"], "facebook");
        assert_eq!(body["variables"]["repo"], "react");
        assert_eq!(body["query"], GRAPHQL_SIMPLE);
    }
}
