use gitops_fs::NormalizedPath;
use proptest::prelude::*;

proptest! {
    #[test]
    fn normalized_paths_have_no_backslashes_or_double_slashes(s in "\\PC*") {
        let path = NormalizedPath::new(&s);
        let as_str = path.as_str();

        prop_assert!(!as_str.contains('\\'));
        prop_assert!(!as_str.contains("//"));
    }

    #[test]
    fn normalization_is_idempotent(s in "\\PC*") {
        let once = NormalizedPath::new(&s);
        let twice = NormalizedPath::new(once.as_str());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn join_keeps_root_prefix(segments in proptest::collection::vec("[a-z][a-z0-9-]{0,10}", 1..6)) {
        let root = NormalizedPath::new("/repo");
        let joined = root.join(&segments.join("/"));
        prop_assert!(joined.as_str().starts_with("/repo/"));
        prop_assert_eq!(joined.file_name(), segments.last().map(String::as_str));
    }
}
