//! End-to-end flow tests: the wizard driving a real server over HTTP.

mod common;

use common::{app::spawn_server, fixtures};
use inkline::client::HttpCodec;
use inkline::error::{TransportError, ValidationError, WizardError};
use inkline::models::{AppConfig, BlobKind, Unit};
use inkline::session::{EphemeralStore, MemoryStore, Wizard, HANDOFF_KEY};
use pretty_assertions::assert_eq;

async fn wizard() -> Wizard<HttpCodec, MemoryStore> {
    let base_url = spawn_server(AppConfig::default()).await;
    let codec = HttpCodec::new(base_url).unwrap();
    Wizard::new(codec, MemoryStore::new())
}

#[tokio::test]
async fn test_enhance_then_outline_handoff() {
    let mut wizard = wizard().await;

    // Step 1: upload and size the image
    let info = wizard
        .upload_for_enhance("scan.png", fixtures::sample_png(300, 150))
        .await
        .unwrap()
        .clone();
    assert_eq!((info.width, info.height), (300, 150));
    assert_eq!(wizard.state().enhancer.width, Some(300.0));

    wizard.set_resolution(300, 300).unwrap();
    wizard.set_unit(Unit::Physical).unwrap();
    wizard.set_width(2.0).unwrap();
    assert_eq!(wizard.state().enhancer.height, Some(1.0));

    let result = wizard.enhance().await.unwrap().clone();
    assert_eq!((result.width, result.height), (600, 300));
    assert_eq!(result.width_inches, Some(2.0));

    let enhanced = wizard.download(BlobKind::Enhanced).await.unwrap();
    assert_eq!(fixtures::image_size(&enhanced), (600, 300));
    assert_eq!(
        common::png_pixels_per_meter(&enhanced),
        Some((11811, 11811))
    );

    // Step 2: hand off to the outliner
    let handed = wizard.send_to_outliner().unwrap();
    assert_eq!(handed, result.result_ref);
    assert_eq!(
        wizard.handoff().store().get(HANDOFF_KEY).as_deref(),
        Some(handed.as_str())
    );

    assert_eq!(wizard.load_outliner(), Some(handed.as_str()));
    wizard.set_thickness(3).unwrap();

    let outline = wizard.extract_outline().await.unwrap().clone();
    assert_eq!(outline.original_kind, BlobKind::Enhanced);
    assert_eq!(outline.original_ref, handed);
    assert_eq!(outline.thickness, Some(3));
    assert_eq!((outline.width, outline.height), (600, 300));

    let lines = wizard.download(BlobKind::Outlined).await.unwrap();
    assert_eq!(fixtures::image_size(&lines), (600, 300));
}

#[tokio::test]
async fn test_outliner_upload_replaces_handoff() {
    let mut wizard = wizard().await;

    wizard
        .upload_for_enhance("a.png", fixtures::sample_png(32, 32))
        .await
        .unwrap();
    wizard.enhance().await.unwrap();
    wizard.send_to_outliner().unwrap();
    wizard.load_outliner();

    let info = wizard
        .upload_for_outline("b.png", fixtures::sample_png(48, 24))
        .await
        .unwrap()
        .clone();
    assert_eq!(wizard.state().outliner.handed_off_ref, None);
    assert_eq!(wizard.handoff().consume(), None);

    let outline = wizard.extract_outline().await.unwrap().clone();
    assert_eq!(outline.original_kind, BlobKind::Uploads);
    assert_eq!(outline.original_ref, info.filename);
    assert_eq!((outline.width, outline.height), (48, 24));
}

#[tokio::test]
async fn test_invalid_input_never_reaches_server() {
    let mut wizard = wizard().await;
    wizard
        .upload_for_enhance("a.png", fixtures::sample_png(32, 32))
        .await
        .unwrap();

    let before = wizard.state().clone();
    let err = wizard.set_resolution(0, 72).unwrap_err();
    assert!(matches!(
        err,
        WizardError::Validation(ValidationError::InvalidResolution { value, .. }) if value == 0.0
    ));
    assert_eq!(wizard.state(), &before);

    let err = wizard.set_thickness(9).unwrap_err();
    assert!(matches!(
        err,
        WizardError::Validation(ValidationError::InvalidThickness(t)) if t == 9.0
    ));
}

#[tokio::test]
async fn test_server_rejection_is_reported() {
    let base_url = spawn_server(AppConfig::default()).await;
    let codec = HttpCodec::new(base_url).unwrap();
    let mut wizard = Wizard::new(codec, MemoryStore::new());

    let err = wizard
        .upload_for_enhance("notes.png", b"plain text".to_vec())
        .await
        .unwrap_err();
    match err {
        WizardError::Transport(TransportError::Status { status, message }) => {
            assert_eq!(status, 400);
            assert!(message.starts_with("Invalid image"), "got {message}");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(wizard.state().enhancer.upload, None);
}
