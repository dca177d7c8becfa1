use quay::files::{ResolvedTarget, resolve};
use quay::http::response::StatusCode;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Layout:
///   <tmp>/secret.txt
///   <tmp>/www/index.html
///   <tmp>/www/my file.html
///   <tmp>/www/docs/index.html
///   <tmp>/www/empty/
fn fixture() -> (TempDir, PathBuf) {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("secret.txt"), "top secret").unwrap();

    let root = tmp.path().join("www");
    fs::create_dir_all(root.join("docs")).unwrap();
    fs::create_dir_all(root.join("empty")).unwrap();
    fs::write(root.join("index.html"), "<h1>home</h1>").unwrap();
    fs::write(root.join("my file.html"), "spaced").unwrap();
    fs::write(root.join("docs").join("index.html"), "docs").unwrap();

    let root = root.canonicalize().unwrap();
    (tmp, root)
}

#[tokio::test]
async fn test_root_resolves_to_index() {
    let (_tmp, root) = fixture();

    assert_eq!(
        resolve(&root, "/").await,
        ResolvedTarget::File(root.join("index.html"))
    );
}

#[tokio::test]
async fn test_subdirectory_slash_resolves_to_its_index() {
    let (_tmp, root) = fixture();

    assert_eq!(
        resolve(&root, "/docs/").await,
        ResolvedTarget::File(root.join("docs").join("index.html"))
    );
}

#[tokio::test]
async fn test_directory_without_slash_is_not_found() {
    let (_tmp, root) = fixture();

    assert_eq!(
        resolve(&root, "/docs").await,
        ResolvedTarget::Error(StatusCode::NotFound)
    );
}

#[tokio::test]
async fn test_directory_without_index_is_not_found() {
    let (_tmp, root) = fixture();

    assert_eq!(
        resolve(&root, "/empty/").await,
        ResolvedTarget::Error(StatusCode::NotFound)
    );
}

#[tokio::test]
async fn test_missing_file_is_not_found() {
    let (_tmp, root) = fixture();

    assert_eq!(
        resolve(&root, "/no-such-file.html").await,
        ResolvedTarget::Error(StatusCode::NotFound)
    );
}

#[tokio::test]
async fn test_decoded_space_in_name() {
    let (_tmp, root) = fixture();

    assert_eq!(
        resolve(&root, "/my file.html").await,
        ResolvedTarget::File(root.join("my file.html"))
    );
}

#[tokio::test]
async fn test_parent_traversal_is_not_found() {
    let (_tmp, root) = fixture();

    // The file exists one level above the root.
    assert!(root.parent().unwrap().join("secret.txt").exists());
    assert_eq!(
        resolve(&root, "/../secret.txt").await,
        ResolvedTarget::Error(StatusCode::NotFound)
    );
    assert_eq!(
        resolve(&root, "/docs/../../secret.txt").await,
        ResolvedTarget::Error(StatusCode::NotFound)
    );
}

#[tokio::test]
async fn test_deep_traversal_to_etc_passwd_is_not_found() {
    let (_tmp, root) = fixture();

    assert_eq!(
        resolve(&root, "/../../../../../../etc/passwd").await,
        ResolvedTarget::Error(StatusCode::NotFound)
    );
}

#[tokio::test]
async fn test_double_slash_absolute_path_is_not_found() {
    let (tmp, root) = fixture();
    let outside = tmp.path().join("secret.txt").canonicalize().unwrap();

    let path = format!("/{}", outside.display());
    assert_eq!(
        resolve(&root, &path).await,
        ResolvedTarget::Error(StatusCode::NotFound)
    );
}

#[tokio::test]
async fn test_traversal_that_comes_back_inside_is_allowed() {
    let (_tmp, root) = fixture();

    assert_eq!(
        resolve(&root, "/docs/../index.html").await,
        ResolvedTarget::File(root.join("index.html"))
    );
}

#[tokio::test]
async fn test_nul_byte_is_not_found() {
    let (_tmp, root) = fixture();

    assert_eq!(
        resolve(&root, "/index.html\0.png").await,
        ResolvedTarget::Error(StatusCode::NotFound)
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlink_escaping_root_is_not_found() {
    let (tmp, root) = fixture();
    std::os::unix::fs::symlink(tmp.path().join("secret.txt"), root.join("link.txt")).unwrap();

    assert_eq!(
        resolve(&root, "/link.txt").await,
        ResolvedTarget::Error(StatusCode::NotFound)
    );
}
