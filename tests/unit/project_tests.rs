// Project derivation tests: titles, tags, and filtering rules.

use gitfolio::projects::{derive_tags, humanize_repo_name, ProjectTransformer};
use gitfolio::github::Repository;
use rstest::rstest;

fn repo_with(language: Option<&str>, topics: &[&str]) -> Repository {
    Repository {
        id: 1,
        name: "site".to_string(),
        full_name: "dacrab/site".to_string(),
        html_url: "https://github.com/dacrab/site".to_string(),
        description: Some("A site".to_string()),
        homepage: None,
        stargazers_count: 0,
        language: language.map(String::from),
        topics: topics.iter().map(|t| t.to_string()).collect(),
        fork: false,
        archived: false,
        created_at: None,
        updated_at: None,
        pushed_at: None,
        default_branch: None,
    }
}

#[rstest]
#[case("my-cool-project", "My Cool Project")]
#[case("data_pipeline", "Data Pipeline")]
#[case("single", "Single")]
#[case("already-Capitalized", "Already Capitalized")]
#[case("v2-api", "V2 Api")]
fn test_humanize_repo_name(#[case] slug: &str, #[case] expected: &str) {
    assert_eq!(humanize_repo_name(slug), expected);
}

#[rstest]
#[case(Some("TypeScript"), &["web", "cli", "tools", "extra"], &["TypeScript", "web", "cli", "tools"])]
#[case(Some("TypeScript"), &["typescript", "web", "cli", "tools"], &["TypeScript", "typescript", "web", "cli"])]
#[case(Some("Rust"), &[], &["Rust"])]
#[case(None, &["web"], &["web"])]
#[case(None, &[], &["Code"])]
fn test_derive_tags(
    #[case] language: Option<&str>,
    #[case] topics: &[&str],
    #[case] expected: &[&str],
) {
    let repo = repo_with(language, topics);
    assert_eq!(derive_tags(&repo), expected);
}

#[test]
fn test_transform_output_is_deterministic_for_same_ids() {
    let transformer = ProjectTransformer::new();
    let repos = vec![repo_with(Some("Rust"), &["systems"])];

    let first = transformer.transform(&repos);
    let second = transformer.transform(&repos);
    assert_eq!(*first, *second);
}
