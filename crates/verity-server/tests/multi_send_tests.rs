use alloy::primitives::{b256, Address, B256, U256};
use rstest::*;
use uuid::Uuid;
use verity_primitives::{
    codec::{AbiFunctionEncoder, FunctionArgument, FunctionEncoder},
    intents::{AssetMultiSendParams, Intent, ScreenConfig},
    AddressMatch, PrimitivesError, Status,
};
use verity_server::{
    error::ServerError,
    services::{IntentResolver, MultiSendService},
};

use common::fixtures::*;
use common::helpers::{attached, mined};

mod common;

const APPROVE_HASH: B256 =
    b256!("0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a");
const DISPERSE_HASH: B256 =
    b256!("0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d");

fn multi_send(project_id: Uuid, token: Option<Address>) -> Intent<AssetMultiSendParams> {
    Intent::new(
        project_id,
        CHAIN_ID,
        AssetMultiSendParams {
            token,
            disperse_contract: DISPERSE,
            recipients: vec![RECIPIENT, Address::repeat_byte(0x44)],
            amounts: vec![U256::from(100u64), U256::from(250u64)],
            sender: AddressMatch::Pinned(SENDER),
            approve_screen_config: ScreenConfig::default(),
            disperse_screen_config: ScreenConfig::default(),
        },
    )
}

fn service(ctx: &TestContext) -> MultiSendService {
    let (intents, _) = ctx.service::<AssetMultiSendParams>();
    MultiSendService::new(intents)
}

#[rstest]
#[tokio::test]
async fn test_nothing_attached_is_pending(ctx: TestContext) {
    let service = service(&ctx);
    let intent = service
        .intents()
        .create(multi_send(ctx.project_id, Some(TOKEN)))
        .await
        .unwrap();

    let view = service.get(intent.id).await.unwrap();
    assert_eq!(view.status, Status::Pending);
    let approve = view.resolution.approve.unwrap();
    assert_eq!(approve.status, Status::Pending);
    assert_eq!(approve.expected.to, TOKEN);
    assert!(view.resolution.disperse.is_none());
}

#[rstest]
#[tokio::test]
async fn test_approved_flow_surfaces_pending_disperse(ctx: TestContext) {
    let service = service(&ctx);
    let intent = service
        .intents()
        .create(multi_send(ctx.project_id, Some(TOKEN)))
        .await
        .unwrap();

    let encoder = AbiFunctionEncoder::new();
    let expected_approve = intent.expected_approve(&encoder).unwrap().unwrap();
    ctx.chain
        .add_transaction(mined(APPROVE_HASH, SENDER, &expected_approve));

    let view = service
        .attach_approve_tx(ctx.project_id, intent.id, attached(APPROVE_HASH, SENDER))
        .await
        .unwrap();
    assert_eq!(view.status, Status::Pending);
    assert_eq!(view.resolution.approve.unwrap().status, Status::Success);

    let disperse = view.resolution.disperse.unwrap();
    assert_eq!(disperse.status, Status::Pending);
    assert!(disperse.tx_hash.is_none());
    assert!(disperse.transaction_info.is_none());
    assert_eq!(disperse.expected.to, DISPERSE);
    assert_eq!(disperse.expected.value(), U256::ZERO);
    let disperse_data = encoder
        .encode(
            "disperseToken",
            &[
                FunctionArgument::Address(TOKEN),
                FunctionArgument::AddressArray(vec![RECIPIENT, Address::repeat_byte(0x44)]),
                FunctionArgument::Uint256Array(vec![U256::from(100u64), U256::from(250u64)]),
            ],
        )
        .unwrap();
    assert_eq!(disperse.expected.data(), Some(&disperse_data));
}

#[rstest]
#[tokio::test]
async fn test_both_legs_resolve_independently(ctx: TestContext) {
    let service = service(&ctx);
    let intent = service
        .intents()
        .create(multi_send(ctx.project_id, Some(TOKEN)))
        .await
        .unwrap();

    let encoder = AbiFunctionEncoder::new();
    let expected_approve = intent.expected_approve(&encoder).unwrap().unwrap();
    let expected_disperse = intent.expected_disperse(&encoder).unwrap();
    ctx.chain
        .add_transaction(mined(APPROVE_HASH, SENDER, &expected_approve));
    ctx.chain
        .add_transaction(mined(DISPERSE_HASH, SENDER, &expected_disperse));

    service
        .attach_approve_tx(ctx.project_id, intent.id, attached(APPROVE_HASH, SENDER))
        .await
        .unwrap();
    let view = service
        .attach_disperse_tx(ctx.project_id, intent.id, attached(DISPERSE_HASH, SENDER))
        .await
        .unwrap();

    assert_eq!(view.status, Status::Success);
    let approve = view.resolution.approve.unwrap();
    let disperse = view.resolution.disperse.unwrap();
    assert_eq!(approve.tx_hash, Some(APPROVE_HASH));
    assert_eq!(disperse.tx_hash, Some(DISPERSE_HASH));
    assert_eq!(
        disperse.transaction_info.map(|tx| tx.hash),
        Some(DISPERSE_HASH)
    );
}

#[rstest]
#[tokio::test]
async fn test_failed_approval_fails_the_flow(ctx: TestContext) {
    let service = service(&ctx);
    let intent = service
        .intents()
        .create(multi_send(ctx.project_id, Some(TOKEN)))
        .await
        .unwrap();

    let expected_approve = intent
        .expected_approve(&AbiFunctionEncoder::new())
        .unwrap()
        .unwrap();
    let mut observed = mined(APPROVE_HASH, SENDER, &expected_approve);
    observed.success = false;
    ctx.chain.add_transaction(observed);

    let view = service
        .attach_approve_tx(ctx.project_id, intent.id, attached(APPROVE_HASH, SENDER))
        .await
        .unwrap();
    assert_eq!(view.status, Status::Failed);
    assert!(view.resolution.disperse.is_none());
}

#[rstest]
#[tokio::test]
async fn test_disperse_without_approve_resolves(ctx: TestContext) {
    let service = service(&ctx);
    let intent = service
        .intents()
        .create(multi_send(ctx.project_id, Some(TOKEN)))
        .await
        .unwrap();

    let expected_disperse = intent
        .expected_disperse(&AbiFunctionEncoder::new())
        .unwrap();
    ctx.chain
        .add_transaction(mined(DISPERSE_HASH, SENDER, &expected_disperse));

    let view = service
        .attach_disperse_tx(ctx.project_id, intent.id, attached(DISPERSE_HASH, SENDER))
        .await
        .unwrap();
    assert_eq!(view.resolution.approve.unwrap().status, Status::Pending);
    assert_eq!(view.resolution.disperse.unwrap().status, Status::Success);
    assert_eq!(view.status, Status::Success);
}

#[rstest]
#[tokio::test]
async fn test_native_multi_send(ctx: TestContext) {
    let service = service(&ctx);
    let intent = service
        .intents()
        .create(multi_send(ctx.project_id, None))
        .await
        .unwrap();

    let pending = service.get(intent.id).await.unwrap();
    assert!(pending.resolution.approve.is_none());
    let disperse = pending.resolution.disperse.unwrap();
    assert_eq!(disperse.status, Status::Pending);
    assert_eq!(disperse.expected.value(), U256::from(350u64));

    let err = service
        .attach_approve_tx(ctx.project_id, intent.id, attached(APPROVE_HASH, SENDER))
        .await
        .unwrap_err();
    assert!(matches!(err, ServerError::CannotAttachTxInfo(_)));

    ctx.chain
        .add_transaction(mined(DISPERSE_HASH, SENDER, &disperse.expected));
    let view = service
        .attach_disperse_tx(ctx.project_id, intent.id, attached(DISPERSE_HASH, SENDER))
        .await
        .unwrap();
    assert_eq!(view.status, Status::Success);
}

#[rstest]
#[tokio::test]
async fn test_each_leg_attaches_once(ctx: TestContext) {
    let service = service(&ctx);
    let intent = service
        .intents()
        .create(multi_send(ctx.project_id, Some(TOKEN)))
        .await
        .unwrap();

    service
        .attach_approve_tx(ctx.project_id, intent.id, attached(APPROVE_HASH, SENDER))
        .await
        .unwrap();
    let err = service
        .attach_approve_tx(ctx.project_id, intent.id, attached(DISPERSE_HASH, SENDER))
        .await
        .unwrap_err();
    assert!(matches!(err, ServerError::CannotAttachTxInfo(_)));

    service
        .attach_disperse_tx(ctx.project_id, intent.id, attached(DISPERSE_HASH, SENDER))
        .await
        .unwrap();
    let err = service
        .attach_disperse_tx(ctx.project_id, intent.id, attached(APPROVE_HASH, SENDER))
        .await
        .unwrap_err();
    assert!(matches!(err, ServerError::CannotAttachTxInfo(_)));
}

#[rstest]
#[tokio::test]
async fn test_mismatched_amounts_are_rejected(ctx: TestContext) {
    let service = service(&ctx);
    let mut intent = multi_send(ctx.project_id, Some(TOKEN));
    intent.params.amounts.pop();

    let err = service.intents().create(intent).await.unwrap_err();
    assert!(matches!(
        err,
        ServerError::PrimitivesError(PrimitivesError::InvalidParams(_))
    ));
}
