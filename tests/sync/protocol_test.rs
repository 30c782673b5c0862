// Protocol Tests
// Tests for blockchain channel messages, encoding and validation

use blocksync::chain::Block;
use blocksync::sync::{
    BlockchainMessage, EncodingError, MessageType, ProtocolError, BLOCKCHAIN_CHANNEL,
    MAX_MSG_SIZE,
};

fn all_messages() -> Vec<BlockchainMessage> {
    vec![
        BlockchainMessage::BlockRequest { height: 1 },
        BlockchainMessage::BlockResponse {
            block: Block::new("test-chain", 1, None, vec![b"tx".to_vec()]),
        },
        BlockchainMessage::NoBlockResponse { height: 2 },
        BlockchainMessage::StatusResponse { height: 3 },
        BlockchainMessage::StatusRequest { base: 1, height: 3 },
    ]
}

// ============================================================================
// CHANNEL & TYPES
// ============================================================================

#[test]
fn test_blockchain_channel_id() {
    assert_eq!(BLOCKCHAIN_CHANNEL, 0x40);
}

#[test]
fn test_message_types() {
    let types: Vec<MessageType> = all_messages().iter().map(|m| m.message_type()).collect();

    assert_eq!(
        types,
        vec![
            MessageType::BlockRequest,
            MessageType::BlockResponse,
            MessageType::NoBlockResponse,
            MessageType::StatusResponse,
            MessageType::StatusRequest,
        ]
    );
}

// ============================================================================
// ENCODING
// ============================================================================

#[test]
fn test_block_request_height_survives_codec() {
    let bytes = BlockchainMessage::BlockRequest { height: 77 }
        .encode(MAX_MSG_SIZE)
        .unwrap();

    match BlockchainMessage::decode(&bytes).unwrap() {
        BlockchainMessage::BlockRequest { height } => assert_eq!(height, 77),
        other => panic!("unexpected message: {:?}", other),
    }
}

#[test]
fn test_every_variant_decodes_to_itself() {
    for msg in all_messages() {
        let bytes = msg.encode(MAX_MSG_SIZE).unwrap();
        assert_eq!(BlockchainMessage::decode(&bytes).unwrap(), msg);
    }
}

#[test]
fn test_variants_have_distinct_encodings() {
    let a = BlockchainMessage::BlockRequest { height: 5 }.encode(MAX_MSG_SIZE).unwrap();
    let b = BlockchainMessage::NoBlockResponse { height: 5 }.encode(MAX_MSG_SIZE).unwrap();
    let c = BlockchainMessage::StatusResponse { height: 5 }.encode(MAX_MSG_SIZE).unwrap();

    assert_ne!(a, b);
    assert_ne!(b, c);
}

#[test]
fn test_encoding_is_deterministic() {
    let msg = BlockchainMessage::StatusRequest { base: 100, height: 150 };
    assert_eq!(msg.encode(MAX_MSG_SIZE).unwrap(), msg.encode(MAX_MSG_SIZE).unwrap());
}

#[test]
fn test_encode_over_limit() {
    let block = Block::new("test-chain", 1, None, vec![vec![0xAA; 1024]]);
    let msg = BlockchainMessage::BlockResponse { block };

    match msg.encode(512) {
        Err(EncodingError::MessageTooLarge { size, max }) => {
            assert!(size > 1024);
            assert_eq!(max, 512);
        }
        other => panic!("expected MessageTooLarge, got {:?}", other),
    }
}

// ============================================================================
// DECODING & VALIDATION
// ============================================================================

#[test]
fn test_decode_garbage() {
    let result = BlockchainMessage::decode(&[0xFF, 0xFF, 0xFF]);
    assert_eq!(result, Err(ProtocolError::DeserializationFailed));
}

#[test]
fn test_decode_empty() {
    assert!(BlockchainMessage::decode(&[]).is_err());
}

#[test]
fn test_decode_rejects_negative_height() {
    let bytes = BlockchainMessage::BlockRequest { height: -1 }
        .encode(MAX_MSG_SIZE)
        .unwrap();

    assert!(matches!(
        BlockchainMessage::decode(&bytes),
        Err(ProtocolError::InvalidMessage(_))
    ));
}

#[test]
fn test_decode_rejects_inverted_status_range() {
    let bytes = BlockchainMessage::StatusRequest { base: 10, height: 5 }
        .encode(MAX_MSG_SIZE)
        .unwrap();

    assert!(matches!(
        BlockchainMessage::decode(&bytes),
        Err(ProtocolError::InvalidMessage(_))
    ));
}

#[test]
fn test_validate_accepts_zero_heights() {
    assert!(BlockchainMessage::StatusRequest { base: 0, height: 0 }
        .validate_basic()
        .is_ok());
    assert!(BlockchainMessage::NoBlockResponse { height: 0 }
        .validate_basic()
        .is_ok());
}
