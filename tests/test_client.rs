use std::time::Duration;

use burrow::Error;
use burrow::client::{Client, fetch_file, item_for_uri};
use burrow::gopher::item::{Item, ItemType};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

/// Serves `reply` to a single client and hands back the selector it sent.
async fn mock_server(reply: &'static [u8]) -> (u16, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let mut reader = BufReader::new(socket);
        let mut selector = String::new();
        reader.read_line(&mut selector).await.unwrap();

        let mut socket = reader.into_inner();
        socket.write_all(reply).await.unwrap();
        socket.shutdown().await.unwrap();
        selector
    });

    (port, handle)
}

#[test]
fn test_uri_root_is_directory() {
    let item = item_for_uri("gopher://gopher.floodgap.com/").unwrap();

    assert_eq!(item.item_type, ItemType::Directory);
    assert_eq!(item.selector, "");
    assert_eq!(item.host, "gopher.floodgap.com");
    assert_eq!(item.port, 70);
}

#[test]
fn test_uri_without_path_is_directory() {
    let item = item_for_uri("gopher://example.org:7070").unwrap();

    assert_eq!(item.item_type, ItemType::Directory);
    assert_eq!(item.port, 7070);
}

#[test]
fn test_uri_type_and_selector() {
    let item = item_for_uri("gopher://example.org/0/docs/readme.txt").unwrap();

    assert_eq!(item.item_type, ItemType::File);
    assert_eq!(item.selector, "/docs/readme.txt");
}

#[test]
fn test_uri_percent_decoding() {
    let item = item_for_uri("gopher://example.org/0/my%20file.txt").unwrap();
    assert_eq!(item.selector, "/my file.txt");
}

#[test]
fn test_uri_query_joins_with_tab() {
    let item = item_for_uri("gopher://example.org/7/v2/vs?rust+gopher").unwrap();

    assert_eq!(item.item_type, ItemType::IndexSearch);
    assert_eq!(item.selector, "/v2/vs\trust+gopher");
}

#[test]
fn test_uri_wrong_scheme() {
    let err = item_for_uri("http://example.org/").unwrap_err();
    assert!(matches!(err, Error::InvalidScheme(ref s) if s == "http"));
}

#[test]
fn test_uri_garbage() {
    assert!(matches!(item_for_uri("not a uri"), Err(Error::InvalidUri(_))));
}

#[test]
fn test_uri_bad_port() {
    assert!(matches!(
        item_for_uri("gopher://example.org:99999/"),
        Err(Error::InvalidAddress(_))
    ));
}

#[test]
fn test_uri_unknown_type() {
    assert!(matches!(
        item_for_uri("gopher://example.org/X/thing"),
        Err(Error::UnknownItemType('X'))
    ));
}

#[tokio::test]
async fn test_directory_drops_malformed_lines() {
    let (port, server) = mock_server(
        b"iWelcome\t\terror.host\t1\r\n\
          Xbogus\t/x\thost\t70\r\n\
          0Readme\t/readme\texample.org\t70\r\n\
          1Broken\t/b\texample.org\tseventy\r\n\
          .\r\n",
    )
    .await;

    let res = Client::default()
        .get(&format!("gopher://127.0.0.1:{port}/1/menu"))
        .await
        .unwrap();

    assert_eq!(res.item_type, ItemType::Directory);
    let dir = res.into_directory().unwrap();
    assert_eq!(dir.len(), 2);
    assert_eq!(dir.items[0].item_type, ItemType::Info);
    assert_eq!(dir.items[1].selector, "/readme");

    assert_eq!(server.await.unwrap(), "/menu\r\n");
}

#[tokio::test]
async fn test_directory_without_terminator() {
    let (port, _server) = mock_server(b"0Readme\t/readme\texample.org\t70\r\n").await;

    let res = burrow::client::get(&format!("gopher://127.0.0.1:{port}/"))
        .await
        .unwrap();

    assert_eq!(res.directory().unwrap().len(), 1);
}

#[tokio::test]
async fn test_document_streams_until_close() {
    let (port, server) = mock_server(b"just some text\n.\nmore").await;

    let item = Item::new(ItemType::File, "", "/doc.txt").at("127.0.0.1", port);
    let mut doc = fetch_file(&item).await.unwrap();

    let mut body = String::new();
    doc.read_to_string(&mut body).await.unwrap();

    assert_eq!(body, "just some text\n.\nmore");
    assert_eq!(server.await.unwrap(), "/doc.txt\r\n");
}

#[tokio::test]
async fn test_document_bytes() {
    let (port, _server) = mock_server(b"\x89PNG\r\n\x1a\n").await;

    let res = burrow::client::get(&format!("gopher://127.0.0.1:{port}/p/logo.png"))
        .await
        .unwrap();

    assert!(!res.is_directory());
    let bytes = res.into_document().unwrap().bytes().await.unwrap();
    assert_eq!(bytes, b"\x89PNG\r\n\x1a\n");
}

#[tokio::test]
async fn test_fetch_kind_mismatch() {
    let client = Client::new(Duration::from_secs(1), Some(Duration::from_secs(1)));
    let doc = Item::new(ItemType::File, "", "/a").at("127.0.0.1", 1);
    let menu = Item::new(ItemType::Directory, "", "/").at("127.0.0.1", 1);

    assert!(matches!(
        client.fetch_directory(&doc).await,
        Err(Error::UnsupportedFetch(_))
    ));
    assert!(matches!(
        client.fetch_file(&menu).await,
        Err(Error::UnsupportedFetch(_))
    ));
}
