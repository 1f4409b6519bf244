mod common;

use common::{Call, FakeTransport};
use h5stl_client::{
    suggested_file_name, ClientConfig, ClientError, ConversionClient, ConversionRequest,
    ConversionResult, Workflow,
};

fn request() -> ConversionRequest {
    ConversionRequest {
        file_name: "part.h5".to_string(),
        source: common::h5_payload(),
        declared_format: "h5".to_string(),
        deflection: 0.25,
    }
}

#[test]
fn endpoints_join_base_and_path() {
    let mut cfg = ClientConfig::default();
    assert_eq!(common::EXPORT_URL, cfg.endpoint(Workflow::Download));
    assert_eq!(common::VIS_URL, cfg.endpoint(Workflow::Visualize));

    cfg.base_url = format!("{}/", common::BASE);
    assert_eq!(common::VIS_URL, cfg.endpoint(Workflow::Visualize));
}

#[test]
fn save_dialog_name_comes_from_the_url() {
    assert_eq!("part.stl", suggested_file_name(common::ARTIFACT_URL));
    assert_eq!(
        "part.stl",
        suggested_file_name("http://host/download/part.stl?token=abc")
    );
    assert_eq!("model.stl", suggested_file_name("http://host/download/"));
    assert_eq!("model.stl", suggested_file_name(""));
}

#[tokio::test]
async fn configured_deflection_is_sent_verbatim() {
    let transport = FakeTransport::new()
        .on_post(common::EXPORT_URL, common::converted(common::ARTIFACT_URL));
    let client = ConversionClient::with_transport(ClientConfig::default(), transport);

    let result = client.convert(request(), Workflow::Download).await.unwrap();
    assert_eq!(
        ConversionResult::Download {
            url: common::ARTIFACT_URL.to_string()
        },
        result
    );
    match &client.transport().calls()[..] {
        [Call::Post { form, .. }] => assert_eq!(0.25, form.deflection),
        other => panic!("expected one submission, got {other:?}"),
    }
}

#[tokio::test]
async fn visualize_returns_url_and_bytes() {
    let bytes = common::stl_bytes(2);
    let transport = FakeTransport::new()
        .on_post(common::VIS_URL, common::converted(common::ARTIFACT_URL))
        .on_get(common::ARTIFACT_URL, common::stl(bytes.clone()));
    let client = ConversionClient::with_transport(ClientConfig::default(), transport);

    match client.convert(request(), Workflow::Visualize).await.unwrap() {
        ConversionResult::StlBytes { url, bytes: got } => {
            assert_eq!(common::ARTIFACT_URL, url);
            assert_eq!(bytes, got);
        }
        other => panic!("expected fetched bytes, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_url_is_not_success() {
    let transport = FakeTransport::new().on_post(
        common::EXPORT_URL,
        common::json(200, serde_json::json!({"stl_file_url": ""})),
    );
    let client = ConversionClient::with_transport(ClientConfig::default(), transport);
    let err = client.convert_to_downloadable(request()).await.unwrap_err();
    assert!(matches!(err, ClientError::Conversion { status: 200, .. }));
}

#[tokio::test]
async fn missing_content_type_is_reported() {
    let transport = FakeTransport::new().on_get(
        common::ARTIFACT_URL,
        Ok(h5stl_client::transport::HttpReply {
            status: 200,
            content_type: None,
            body: common::stl_bytes(1),
        }),
    );
    let client = ConversionClient::with_transport(ClientConfig::default(), transport);
    match client.fetch_stl(common::ARTIFACT_URL).await.unwrap_err() {
        ClientError::Fetch { received, .. } => assert_eq!("no content type", received),
        other => panic!("expected a fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn content_type_match_ignores_case_and_parameters() {
    let transport = FakeTransport::new().on_get(
        common::ARTIFACT_URL,
        Ok(h5stl_client::transport::HttpReply {
            status: 200,
            content_type: Some("Application/STL; charset=binary".to_string()),
            body: common::stl_bytes(1),
        }),
    );
    let client = ConversionClient::with_transport(ClientConfig::default(), transport);
    assert!(client.fetch_stl(common::ARTIFACT_URL).await.is_ok());
}

#[tokio::test]
async fn failed_fetch_writes_nothing() {
    let client = ConversionClient::with_transport(ClientConfig::default(), FakeTransport::new());
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("model.stl");

    let err = client
        .save_artifact(common::ARTIFACT_URL, &dest)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Fetch { .. }));
    assert!(!dest.exists());
}

#[tokio::test]
async fn fetch_bytes_follows_the_visualize_endpoint() {
    let transport = FakeTransport::new()
        .on_post(common::VIS_URL, common::converted(common::ARTIFACT_URL))
        .on_get(common::ARTIFACT_URL, common::stl(common::stl_bytes(3)));
    let client = ConversionClient::with_transport(ClientConfig::default(), transport);

    let bytes = client.convert_and_fetch_bytes(request()).await.unwrap();
    assert_eq!(common::stl_bytes(3), bytes);
    assert!(matches!(
        &client.transport().calls()[0],
        Call::Post { url, .. } if url == common::VIS_URL
    ));
}
