use bytes::Bytes;
use tokio::io::AsyncReadExt;

use crate::{
    errors::ClientError,
    options::UploadOptions,
    tests::mock::MockService,
    upload::UploadTarget,
    utilities::hash_passphrase,
    Payload, Representation,
};

type TestResult = anyhow::Result<()>;

async fn upload_named(
    mock: &MockService,
    files: &[(&str, &str)],
    options: UploadOptions,
) -> anyhow::Result<String> {
    let targets = files
        .iter()
        .map(|(name, body)| UploadTarget::buffer(body.as_bytes(), *name))
        .collect::<Result<Vec<_>, _>>()?;
    let result = mock.client().upload_many(targets, options).await?;
    Ok(result.code)
}

#[tokio::test]
async fn payloads_follow_manifest_order() -> TestResult {
    let mock = MockService::spawn().await?;
    let files = [("a.txt", "first"), ("b.txt", "second")];
    let code = upload_named(&mock, &files, UploadOptions::default()).await?;

    // a.txt answers last
    mock.state().delays.insert("a.txt".to_string(), 300);

    let payloads = mock.client().download_buffers(&code, None).await?;
    assert_eq!(payloads, [Bytes::from("first"), Bytes::from("second")]);
    Ok(())
}

#[tokio::test]
async fn many_files_keep_numeric_key_order() -> TestResult {
    let mock = MockService::spawn().await?;
    let files: Vec<(String, String)> = (0..12)
        .map(|n| (format!("file{n}.txt"), format!("content {n}")))
        .collect();
    let borrowed: Vec<(&str, &str)> = files
        .iter()
        .map(|(name, body)| (name.as_str(), body.as_str()))
        .collect();
    let code = upload_named(&mock, &borrowed, UploadOptions::default()).await?;

    let info = mock.client().get_info(&code, None).await?;
    let names: Vec<&str> = info.files.values().map(|f| f.name.as_str()).collect();
    let expected: Vec<&str> = files.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, expected);

    let payloads = mock.client().download_buffers(&code, None).await?;
    for (payload, (_, body)) in payloads.iter().zip(&files) {
        assert_eq!(payload, body.as_bytes());
    }
    assert_eq!(payloads.len(), files.len());
    Ok(())
}

#[tokio::test]
async fn hash_keys_download_in_document_order() -> TestResult {
    let mock = MockService::spawn().await?;
    let files = [("first.txt", "one"), ("second.txt", "two"), ("third.txt", "three")];
    let code = upload_named(&mock, &files, UploadOptions::default()).await?;

    {
        let mut state = mock.state();
        state.file_keys = vec!["f9c2".to_string(), "0a7d-x".to_string(), "b".to_string()];
        state.delays.insert("first.txt".to_string(), 300);
    }

    let info = mock.client().get_info(&code, None).await?;
    let keys: Vec<&str> = info.files.keys().collect();
    assert_eq!(keys, ["f9c2", "0a7d-x", "b"]);

    let payloads = mock.client().download_buffers(&code, None).await?;
    assert_eq!(payloads.len(), info.files.len());
    assert_eq!(
        payloads,
        [Bytes::from("one"), Bytes::from("two"), Bytes::from("three")]
    );
    Ok(())
}

#[tokio::test]
async fn one_failed_file_fails_everything() -> TestResult {
    let mock = MockService::spawn().await?;
    let code = upload_named(
        &mock,
        &[("a.txt", "first"), ("broken.txt", "second"), ("c.txt", "third")],
        UploadOptions::default(),
    )
    .await?;
    mock.state().broken.push("broken.txt".to_string());

    let err = mock
        .client()
        .download_all(&code, None, Representation::Buffer)
        .await
        .unwrap_err();

    match err {
        ClientError::Download { link, detail } => {
            assert!(link.ends_with(&format!("/{code}/1")), "{link}");
            assert!(detail.starts_with("500"), "{detail}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn stream_representation() -> TestResult {
    let mock = MockService::spawn().await?;
    let files = [("a.txt", "first"), ("b.txt", "second")];
    let code = upload_named(&mock, &files, UploadOptions::default()).await?;

    let mut payloads = mock
        .client()
        .download_all(&code, None, Representation::Stream)
        .await?;
    assert!(payloads.iter().all(|p| matches!(p, Payload::Stream(_))));

    let second = payloads.pop().unwrap();
    let first = payloads.pop().unwrap();

    assert_eq!(first.into_bytes().await?, Bytes::from("first"));

    let mut text = String::new();
    second.into_reader().read_to_string(&mut text).await?;
    assert_eq!(text, "second");
    Ok(())
}

#[tokio::test]
async fn protected_upload_needs_passphrase() -> TestResult {
    let mock = MockService::spawn().await?;
    let options = UploadOptions::new().password("abc123");
    let code = upload_named(&mock, &[("a.txt", "secret stuff")], options).await?;

    let err = mock.client().get_info(&code, None).await.unwrap_err();
    match err {
        ClientError::InfoFetch { detail } => assert!(detail.contains("error-passwordRequired")),
        other => panic!("unexpected error: {other:?}"),
    }

    let err = mock
        .client()
        .download_all(&code, Some("wrong1"), Representation::Buffer)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "info-fetch-failed");

    let payloads = mock.client().download_buffers(&code, Some("abc123")).await?;
    assert_eq!(payloads, [Bytes::from("secret stuff")]);

    let state = mock.state();
    let sent = state.info_queries.last().unwrap();
    assert_eq!(sent.get("p"), Some(&hash_passphrase("abc123")));
    assert!(state
        .info_queries
        .iter()
        .all(|query| query.values().all(|value| value != "abc123")));
    Ok(())
}

#[tokio::test]
async fn empty_passphrase_is_not_sent() -> TestResult {
    let mock = MockService::spawn().await?;
    let code = upload_named(&mock, &[("a.txt", "hello")], UploadOptions::default()).await?;

    mock.client().get_info(&code, Some("")).await?;

    let state = mock.state();
    assert!(state.info_queries[0].get("p").is_none());
    Ok(())
}
