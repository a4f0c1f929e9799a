//! Platform dispatch tests.

use crate::release::{
    adapters::memory::StaticCapability,
    domain::{Platform, PlatformType, UnknownPlatform, VersionLabel},
    ports::{PlatformCapability, UploadRequest},
    services::{DispatchError, PlatformDispatcher},
};
use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use std::sync::Arc;

#[fixture]
fn dispatcher() -> PlatformDispatcher {
    PlatformDispatcher::new()
        .with_capability(Platform::Wechat, Arc::new(StaticCapability::succeeding("wechat")))
        .with_capability(Platform::Alipay, Arc::new(StaticCapability::succeeding("alipay")))
}

async fn upload_url(capability: &dyn PlatformCapability) -> String {
    let request = UploadRequest {
        platform_type: PlatformType::new("any-mini").expect("valid platform type"),
        project_path: Utf8PathBuf::from("/tmp"),
        version: VersionLabel::new("1").expect("valid version"),
        description: String::new(),
        identification: None,
        experience: false,
    };
    capability.upload(&request).await.expect("upload succeeds")
}

#[rstest]
#[case("wechat-mini", "wechat")]
#[case("alipay-mini", "alipay")]
#[case("wechat-and-alipay", "wechat")]
#[tokio::test(flavor = "multi_thread")]
async fn resolves_to_the_registered_capability(
    dispatcher: PlatformDispatcher,
    #[case] platform_type: &str,
    #[case] expected_url: &str,
) {
    let capability = dispatcher
        .resolve(platform_type)
        .expect("platform should resolve");

    assert_eq!(upload_url(capability.as_ref()).await, expected_url);
}

#[rstest]
fn unknown_platform_is_rejected(dispatcher: PlatformDispatcher) {
    let result = dispatcher.resolve("baidu-mini");

    assert!(matches!(
        result,
        Err(DispatchError::UnknownPlatform(UnknownPlatform(name))) if name == "baidu-mini"
    ));
}

#[rstest]
fn known_platform_without_capability_is_unregistered(dispatcher: PlatformDispatcher) {
    let result = dispatcher.resolve("toutiao-mini");

    assert!(matches!(
        result,
        Err(DispatchError::Unregistered(Platform::Toutiao))
    ));
    assert_eq!(
        dispatcher.platforms().collect::<Vec<_>>(),
        vec![Platform::Wechat, Platform::Alipay]
    );
}
