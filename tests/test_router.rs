use burrow::Error;
use burrow::server::{NotFound, Router};

fn router() -> Router {
    let router = Router::new();
    router.handle("/", NotFound).unwrap();
    router.handle("/images/", NotFound).unwrap();
    router.handle("/images/thumbs/", NotFound).unwrap();
    router.handle("/about", NotFound).unwrap();
    router
}

#[test]
fn test_longest_pattern_wins() {
    let router = router();

    assert_eq!(router.handler("/images/cat.png").1, "/images/");
    assert_eq!(router.handler("/images/thumbs/cat.png").1, "/images/thumbs/");
    assert_eq!(router.handler("/music/song.ogg").1, "/");
}

#[test]
fn test_exact_pattern_does_not_match_subpaths() {
    let router = router();

    assert_eq!(router.handler("/about").1, "/about");
    assert_eq!(router.handler("/about/team").1, "/");
}

#[test]
fn test_unmatched_selector_falls_back_to_not_found() {
    let router = Router::new();
    router.handle("/about", NotFound).unwrap();

    assert_eq!(router.handler("/elsewhere").1, "");
}

#[test]
fn test_duplicate_registration_fails() {
    let router = router();

    let err = router.handle("/about", NotFound).unwrap_err();
    assert!(matches!(err, Error::DuplicatePattern(ref p) if p == "/about"));
}

#[test]
fn test_empty_pattern_rejected() {
    let router = Router::new();
    assert!(matches!(router.handle("", NotFound), Err(Error::EmptyPattern)));
}

#[test]
fn test_patterns_are_sorted() {
    assert_eq!(
        router().patterns(),
        vec!["/", "/about", "/images/", "/images/thumbs/"]
    );
}

#[test]
fn test_handle_fn_registers_closure() {
    let router = Router::new();
    router
        .handle_fn("/hello", |w, _req| {
            w.write_info("hi")?;
            Ok(())
        })
        .unwrap();

    assert_eq!(router.handler("/hello").1, "/hello");
}
