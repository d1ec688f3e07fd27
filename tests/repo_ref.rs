// ABOUTME: Integration tests for the repository reference parser.
// ABOUTME: Covers default tagging, colon splitting, and display round-trips.

use burrow::types::RepoRef;
use proptest::prelude::*;

#[test]
fn bare_name_gets_latest() {
    let repo = RepoRef::parse("fedora");
    assert_eq!(repo.name(), "fedora");
    assert_eq!(repo.tag(), "latest");
}

#[test]
fn explicit_tag_is_kept() {
    let repo = RepoRef::parse("fedora:40");
    assert_eq!(repo.name(), "fedora");
    assert_eq!(repo.tag(), "40");
}

#[test]
fn split_happens_at_first_colon() {
    let repo = RepoRef::parse("fedora:40:beta");
    assert_eq!(repo.name(), "fedora");
    assert_eq!(repo.tag(), "40:beta");
}

#[test]
fn trailing_colon_means_latest() {
    let repo = RepoRef::parse("fedora:");
    assert_eq!(repo.name(), "fedora");
    assert_eq!(repo.tag(), "latest");
}

#[test]
fn display_joins_name_and_tag() {
    assert_eq!(RepoRef::parse("fedora:40").to_string(), "fedora:40");
    assert_eq!(RepoRef::parse("fedora").to_string(), "fedora:latest");
}

proptest! {
    /// Any name:tag pair survives a render-and-reparse cycle.
    #[test]
    fn round_trips_through_display(
        name in "[a-z][a-z0-9_-]{0,20}",
        tag in "[a-zA-Z0-9][a-zA-Z0-9._-]{0,20}",
    ) {
        let parsed = RepoRef::parse(&format!("{name}:{tag}"));
        prop_assert_eq!(parsed.name(), name.as_str());
        prop_assert_eq!(parsed.tag(), tag.as_str());

        let reparsed = RepoRef::parse(&parsed.to_string());
        prop_assert_eq!(&reparsed, &parsed);
    }

    #[test]
    fn bare_names_always_default(name in "[a-z][a-z0-9_-]{0,20}") {
        let parsed = RepoRef::parse(&name);
        prop_assert_eq!(parsed.tag(), "latest");
    }
}
