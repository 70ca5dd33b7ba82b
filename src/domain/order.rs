//! Order-book order model, wire codec and canonical hash.
//!
//! Orders are signed off-chain by a maker and passed through the settlement
//! path as opaque bytes. The adapter and the venue must derive the same
//! order hash independently, so both the payload layout and the hash
//! preimage are fixed here and nowhere else.
//!
//! Payload layout (version `0x01`, 449 bytes):
//!
//! ```text
//! [0]        version
//! [1..449]   14 x 32-byte big-endian words:
//!            maker, taker, maker_token, taker_token, fee_recipient,
//!            maker_amount, taker_amount, maker_fee, taker_fee,
//!            expiration, salt, v, r, s
//! ```
//!
//! Address words are left-padded; `v` must fit in one byte.

use alloy::primitives::{keccak256, Address, Bytes, PrimitiveSignature, B256, U256};
use serde::{Deserialize, Serialize};

use crate::error::OrderCodecError;

/// Current payload version byte.
pub const ORDER_PAYLOAD_VERSION: u8 = 0x01;

const WORD: usize = 32;
const WORD_COUNT: usize = 14;

/// Exact payload length in bytes.
pub const ORDER_PAYLOAD_LEN: usize = 1 + WORD * WORD_COUNT;

/// Electrum-notation ECDSA signature over the order hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct OrderSignature {
    pub v: u8,
    pub r: B256,
    pub s: B256,
}

impl OrderSignature {
    /// Builds a signature from its 65-byte `r || s || v` form.
    pub fn from_rsv(bytes: &[u8; 65]) -> Self {
        Self {
            r: B256::from_slice(&bytes[..32]),
            s: B256::from_slice(&bytes[32..64]),
            v: bytes[64],
        }
    }

    fn to_rsv(self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(self.r.as_slice());
        out[32..64].copy_from_slice(self.s.as_slice());
        out[64] = self.v;
        out
    }
}

/// A signed limit order as posted by a maker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Account that posted the liquidity and signed the order.
    pub maker: Address,
    /// Only this account may fill; zero means anyone.
    pub taker: Address,
    pub maker_token: Address,
    pub taker_token: Address,
    /// Receives maker / taker fees; zero means no fees are charged.
    pub fee_recipient: Address,
    pub maker_amount: U256,
    pub taker_amount: U256,
    pub maker_fee: U256,
    pub taker_fee: U256,
    pub expiration_unix_timestamp_sec: U256,
    pub salt: U256,
    pub signature: OrderSignature,
}

impl Order {
    /// Canonical order hash as computed by the venue at `venue`.
    ///
    /// Preimage is the tightly packed concatenation of the venue address
    /// followed by every order field except the signature.
    pub fn hash(&self, venue: Address) -> B256 {
        let mut preimage = Vec::with_capacity(6 * 20 + 6 * WORD);
        for addr in [
            venue,
            self.maker,
            self.taker,
            self.maker_token,
            self.taker_token,
            self.fee_recipient,
        ] {
            preimage.extend_from_slice(addr.as_slice());
        }
        for value in [
            self.maker_amount,
            self.taker_amount,
            self.maker_fee,
            self.taker_fee,
            self.expiration_unix_timestamp_sec,
            self.salt,
        ] {
            preimage.extend_from_slice(&value.to_be_bytes::<WORD>());
        }
        keccak256(&preimage)
    }

    /// Whether the order expires at or before `now` (unix seconds).
    pub fn is_expired(&self, now: u64) -> bool {
        U256::from(now) >= self.expiration_unix_timestamp_sec
    }

    /// Whether the order charges a taker fee to a real fee recipient.
    pub fn charges_taker_fee(&self) -> bool {
        !self.fee_recipient.is_zero() && !self.taker_fee.is_zero()
    }

    /// Recovers the EIP-191 signer of `hash` from the order signature and
    /// compares it to the maker.
    pub fn is_signed_by_maker(&self, hash: B256) -> bool {
        let Ok(signature) = PrimitiveSignature::try_from(&self.signature.to_rsv()[..]) else {
            return false;
        };
        signature
            .recover_address_from_msg(hash.as_slice())
            .is_ok_and(|signer| signer == self.maker)
    }

    /// Serializes the order into its versioned fixed-width payload.
    pub fn encode(&self) -> Bytes {
        let mut out = Vec::with_capacity(ORDER_PAYLOAD_LEN);
        out.push(ORDER_PAYLOAD_VERSION);
        for addr in [
            self.maker,
            self.taker,
            self.maker_token,
            self.taker_token,
            self.fee_recipient,
        ] {
            out.extend_from_slice(&[0u8; 12]);
            out.extend_from_slice(addr.as_slice());
        }
        for value in [
            self.maker_amount,
            self.taker_amount,
            self.maker_fee,
            self.taker_fee,
            self.expiration_unix_timestamp_sec,
            self.salt,
            U256::from(self.signature.v),
        ] {
            out.extend_from_slice(&value.to_be_bytes::<WORD>());
        }
        out.extend_from_slice(self.signature.r.as_slice());
        out.extend_from_slice(self.signature.s.as_slice());
        Bytes::from(out)
    }

    /// Parses a payload produced by [`Order::encode`].
    ///
    /// # Errors
    /// Fails on a wrong length or version, a non-address value in an
    /// address word, or a `v` that does not fit in one byte.
    pub fn decode(payload: &[u8]) -> Result<Self, OrderCodecError> {
        if payload.len() != ORDER_PAYLOAD_LEN {
            return Err(OrderCodecError::InvalidLength {
                expected: ORDER_PAYLOAD_LEN,
                actual: payload.len(),
            });
        }
        if payload[0] != ORDER_PAYLOAD_VERSION {
            return Err(OrderCodecError::UnsupportedVersion(payload[0]));
        }

        let words = &payload[1..];
        let word = |i: usize| &words[i * WORD..(i + 1) * WORD];
        let address = |i: usize| -> Result<Address, OrderCodecError> {
            let w = word(i);
            if w[..12].iter().any(|b| *b != 0) {
                return Err(OrderCodecError::DirtyAddressWord { index: i });
            }
            Ok(Address::from_slice(&w[12..]))
        };
        let uint = |i: usize| U256::from_be_slice(word(i));

        let v = u8::try_from(uint(11)).map_err(|_| OrderCodecError::InvalidSignatureV)?;

        Ok(Self {
            maker: address(0)?,
            taker: address(1)?,
            maker_token: address(2)?,
            taker_token: address(3)?,
            fee_recipient: address(4)?,
            maker_amount: uint(5),
            taker_amount: uint(6),
            maker_fee: uint(7),
            taker_fee: uint(8),
            expiration_unix_timestamp_sec: uint(9),
            salt: uint(10),
            signature: OrderSignature {
                v,
                r: B256::from_slice(word(12)),
                s: B256::from_slice(word(13)),
            },
        })
    }

    /// Decodes a payload and checks it trades the expected pair.
    ///
    /// # Errors
    /// Any decode error, or `TokenPairMismatch` if the order's tokens
    /// differ from `maker_token` / `taker_token`.
    pub fn decode_for_pair(
        payload: &[u8],
        maker_token: Address,
        taker_token: Address,
    ) -> Result<Self, OrderCodecError> {
        let order = Self::decode(payload)?;
        if order.maker_token != maker_token || order.taker_token != taker_token {
            return Err(OrderCodecError::TokenPairMismatch {
                order_maker: order.maker_token,
                order_taker: order.taker_token,
                maker_token,
                taker_token,
            });
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    fn sample_order() -> Order {
        Order {
            maker: address!("1000000000000000000000000000000000000001"),
            taker: Address::ZERO,
            maker_token: address!("2000000000000000000000000000000000000002"),
            taker_token: address!("3000000000000000000000000000000000000003"),
            fee_recipient: Address::ZERO,
            maker_amount: U256::from(100u64),
            taker_amount: U256::from(100u64),
            maker_fee: U256::ZERO,
            taker_fee: U256::ZERO,
            expiration_unix_timestamp_sec: U256::from(2_000_000_000u64),
            salt: U256::from(42u64),
            signature: OrderSignature {
                v: 27,
                r: B256::repeat_byte(0xaa),
                s: B256::repeat_byte(0xbb),
            },
        }
    }

    #[test]
    fn test_codec_preserves_every_field() {
        let order = sample_order();
        let payload = order.encode();
        assert_eq!(payload.len(), ORDER_PAYLOAD_LEN);
        assert_eq!(Order::decode(&payload).unwrap(), order);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let payload = sample_order().encode();
        let err = Order::decode(&payload[..100]).unwrap_err();
        assert_eq!(
            err,
            OrderCodecError::InvalidLength {
                expected: ORDER_PAYLOAD_LEN,
                actual: 100
            }
        );
    }

    #[test]
    fn test_decode_rejects_unknown_version() {
        let mut payload = sample_order().encode().to_vec();
        payload[0] = 0x02;
        assert_eq!(
            Order::decode(&payload).unwrap_err(),
            OrderCodecError::UnsupportedVersion(0x02)
        );
    }

    #[test]
    fn test_decode_rejects_dirty_address_word() {
        let mut payload = sample_order().encode().to_vec();
        // High byte of the fee_recipient word.
        payload[1 + 4 * 32] = 0x01;
        assert_eq!(
            Order::decode(&payload).unwrap_err(),
            OrderCodecError::DirtyAddressWord { index: 4 }
        );
    }

    #[test]
    fn test_decode_for_pair_checks_tokens() {
        let order = sample_order();
        let payload = order.encode();
        assert!(Order::decode_for_pair(&payload, order.maker_token, order.taker_token).is_ok());
        let err = Order::decode_for_pair(&payload, order.taker_token, order.maker_token);
        assert!(matches!(err, Err(OrderCodecError::TokenPairMismatch { .. })));
    }

    #[test]
    fn test_hash_depends_on_venue_and_fields() {
        let order = sample_order();
        let venue = address!("4000000000000000000000000000000000000004");
        let other_venue = address!("5000000000000000000000000000000000000005");
        assert_eq!(order.hash(venue), order.clone().hash(venue));
        assert_ne!(order.hash(venue), order.hash(other_venue));

        let mut salted = order.clone();
        salted.salt = U256::from(43u64);
        assert_ne!(order.hash(venue), salted.hash(venue));
    }

    #[test]
    fn test_hash_ignores_signature() {
        let order = sample_order();
        let venue = address!("4000000000000000000000000000000000000004");
        let mut resigned = order.clone();
        resigned.signature.v = 28;
        assert_eq!(order.hash(venue), resigned.hash(venue));
    }

    #[test]
    fn test_expiry_is_inclusive() {
        let mut order = sample_order();
        order.expiration_unix_timestamp_sec = U256::from(10u64);
        assert!(!order.is_expired(9));
        assert!(order.is_expired(10));
    }

    #[test]
    fn test_taker_fee_requires_recipient() {
        let mut order = sample_order();
        order.taker_fee = U256::from(5u64);
        assert!(!order.charges_taker_fee());
        order.fee_recipient = address!("6000000000000000000000000000000000000006");
        assert!(order.charges_taker_fee());
    }

    #[test]
    fn test_garbage_signature_does_not_verify() {
        let order = sample_order();
        let hash = order.hash(Address::ZERO);
        assert!(!order.is_signed_by_maker(hash));
    }
}
