//! File serving against a temporary directory tree

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use burrow::Error;
use burrow::client::fetch_directory;
use burrow::config::ServerConfig;
use burrow::fs::{Dir, FileServer, FileSystem, TypeDetector};
use burrow::gopher::item::{Item, ItemType};
use burrow::server::Server;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn serve_dir(root: &Path, detector: Option<TypeDetector>) -> SocketAddr {
    let mut files = FileServer::new(Dir::new(root));
    if let Some(detector) = detector {
        files = files.with_detector(detector);
    }

    let server = Server::new(ServerConfig::default()).with_handler(Arc::new(files));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { server.serve(listener).await });
    addr
}

async fn raw_request(addr: SocketAddr, selector: &str) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(format!("{selector}\r\n").as_bytes())
        .await
        .unwrap();
    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    out
}

fn menu(addr: SocketAddr, selector: &str) -> Item {
    Item::new(ItemType::Directory, "", selector).at("127.0.0.1", addr.port())
}

#[tokio::test]
async fn test_root_listing_single_file() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("hello.txt"), "hello, gopher\n").unwrap();
    let addr = serve_dir(tmp.path(), None).await;

    let dir = fetch_directory(&menu(addr, "/")).await.unwrap();

    assert_eq!(dir.len(), 1);
    let item = &dir.items[0];
    assert_eq!(item.item_type, ItemType::File);
    assert_eq!(item.description, "hello.txt");
    assert_eq!(item.selector, "/hello.txt");
    assert_eq!(item.host, "127.0.0.1");
    assert_eq!(item.port, addr.port());
}

#[tokio::test]
async fn test_listing_is_sorted_and_classified() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir(tmp.path().join("sub")).unwrap();
    std::fs::write(tmp.path().join(".hidden"), "secret").unwrap();
    std::fs::write(tmp.path().join("blob.bin"), [0u8; 600]).unwrap();

    let mut page = b"<html><body>".to_vec();
    page.resize(600, b' ');
    std::fs::write(tmp.path().join("page"), &page).unwrap();

    let addr = serve_dir(tmp.path(), None).await;
    let dir = fetch_directory(&menu(addr, "/")).await.unwrap();

    let listing: Vec<(&str, ItemType)> = dir
        .iter()
        .map(|i| (i.description.as_str(), i.item_type))
        .collect();
    assert_eq!(
        listing,
        vec![
            ("blob.bin", ItemType::Binary),
            ("page", ItemType::Html),
            ("sub", ItemType::Directory),
        ]
    );
}

#[tokio::test]
async fn test_subdirectory_selectors_are_joined() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir(tmp.path().join("docs")).unwrap();
    std::fs::write(tmp.path().join("docs").join("notes.md"), "# notes").unwrap();
    let addr = serve_dir(tmp.path(), None).await;

    let dir = fetch_directory(&menu(addr, "/docs")).await.unwrap();

    assert_eq!(dir.len(), 1);
    assert_eq!(dir.items[0].selector, "/docs/notes.md");
    assert_eq!(dir.items[0].item_type, ItemType::File);
}

#[tokio::test]
async fn test_file_is_sent_verbatim() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("hello.txt"), "hello, gopher\n").unwrap();
    let addr = serve_dir(tmp.path(), None).await;

    assert_eq!(raw_request(addr, "/hello.txt").await, b"hello, gopher\n");
}

#[tokio::test]
async fn test_large_file_streams_completely() {
    let tmp = TempDir::new().unwrap();
    let body: Vec<u8> = (0..50_000u32).map(|n| (n % 251) as u8).collect();
    std::fs::write(tmp.path().join("big.bin"), &body).unwrap();
    let addr = serve_dir(tmp.path(), None).await;

    assert_eq!(raw_request(addr, "/big.bin").await, body);
}

#[tokio::test]
async fn test_gophermap_replaces_listing() {
    let tmp = TempDir::new().unwrap();
    let map = "iWelcome to my hole\t\terror.host\t1\r\n";
    std::fs::create_dir(tmp.path().join("docs")).unwrap();
    std::fs::write(tmp.path().join("docs").join("gophermap"), map).unwrap();
    std::fs::write(tmp.path().join("docs").join("other.txt"), "x").unwrap();
    let addr = serve_dir(tmp.path(), None).await;

    assert_eq!(raw_request(addr, "/docs").await, map.as_bytes());
}

#[tokio::test]
async fn test_missing_file_is_an_error_item() {
    let tmp = TempDir::new().unwrap();
    let addr = serve_dir(tmp.path(), None).await;

    let out = raw_request(addr, "/nope.txt").await;

    assert!(out.starts_with(b"3"));
    assert!(out.ends_with(b"\terror.host\t1\r\n.\r\n"));
}

#[tokio::test]
async fn test_dot_dot_stays_inside_root() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir(tmp.path().join("inner")).unwrap();
    std::fs::write(tmp.path().join("outside.txt"), "top").unwrap();
    let addr = serve_dir(&tmp.path().join("inner"), None).await;

    let out = raw_request(addr, "/../outside.txt").await;

    assert!(out.starts_with(b"3"));
}

#[tokio::test]
async fn test_custom_detector() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("song.flac"), "tiny").unwrap();
    let detector = TypeDetector::default().with_extension("flac", ItemType::Audio);
    let addr = serve_dir(tmp.path(), Some(detector)).await;

    let dir = fetch_directory(&menu(addr, "/")).await.unwrap();

    assert_eq!(dir.items[0].item_type, ItemType::Audio);
}

#[tokio::test]
async fn test_nul_in_path_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let fs = Dir::new(tmp.path());

    assert!(matches!(fs.open("/a\0b").await, Err(Error::InvalidPath(_))));

    let addr = serve_dir(tmp.path(), None).await;
    let out = raw_request(addr, "/a\0b").await;
    assert!(out.starts_with(b"3invalid character in file path"));
}
