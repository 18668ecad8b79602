// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for the invariants listed alongside the wire format and sampler.

use emolog::protocol::codec::{decode, DecodeOutcome};
use emolog::protocol::header::FrameHeader;
use emolog::protocol::Encoder;
use emolog::ring::TxRing;
use emolog::sampler::{Sampler, VariableDescriptor};
use emolog::transport::{NullCriticalSection, ReadMemory};

use proptest::prelude::*;

struct ZeroMemory;

impl ReadMemory for ZeroMemory {
    fn read(&self, _address: u32, dst: &mut [u8]) -> emolog::Result<()> {
        dst.fill(0);
        Ok(())
    }
}

proptest! {
    // Invariant 1: round-trip for every message variant.
    #[test]
    fn roundtrip_ping(_unused in any::<u8>()) {
        let mut enc = Encoder::new();
        let mut buf = [0u8; 32];
        let n = enc.encode_ping(&mut buf).unwrap();
        match decode(&buf[0..n]) {
            DecodeOutcome::Frame { total_len, .. } => prop_assert_eq!(total_len, n),
            other => prop_assert!(false, "expected Frame, got {:?}", other),
        }
    }

    #[test]
    fn roundtrip_version(reply_to_seq in any::<u8>()) {
        let mut enc = Encoder::new();
        let mut buf = [0u8; 32];
        let n = enc.encode_version(&mut buf, reply_to_seq).unwrap();
        match decode(&buf[0..n]) {
            DecodeOutcome::Frame { total_len, .. } => {
                prop_assert_eq!(total_len, n);
                prop_assert_eq!(buf[FrameHeader::SIZE + 2], reply_to_seq);
            }
            other => prop_assert!(false, "expected Frame, got {:?}", other),
        }
    }

    #[test]
    fn roundtrip_register_variable(
        phase in any::<u32>(),
        period in 1u32..=u32::MAX,
        address in any::<u32>(),
        size in any::<u16>(),
    ) {
        let mut enc = Encoder::new();
        let mut buf = [0u8; 64];
        let n = enc
            .encode_sampler_register_variable(&mut buf, phase, period, address, size)
            .unwrap();
        match decode(&buf[0..n]) {
            DecodeOutcome::Frame { total_len, .. } => {
                prop_assert_eq!(total_len, n);
                let payload = &buf[FrameHeader::SIZE..n];
                prop_assert_eq!(u32::from_le_bytes(payload[0..4].try_into().unwrap()), phase);
                prop_assert_eq!(u32::from_le_bytes(payload[4..8].try_into().unwrap()), period);
                prop_assert_eq!(u32::from_le_bytes(payload[8..12].try_into().unwrap()), address);
                prop_assert_eq!(u16::from_le_bytes(payload[12..14].try_into().unwrap()), size);
            }
            other => prop_assert!(false, "expected Frame, got {:?}", other),
        }
    }

    // Invariant 2: prefix robustness.
    #[test]
    fn prefix_robustness(reply_to_seq in any::<u8>(), cut in 1usize..12) {
        let mut enc = Encoder::new();
        let mut buf = [0u8; 32];
        let n = enc.encode_version(&mut buf, reply_to_seq).unwrap();
        let k = n.saturating_sub(cut).max(1).min(n - 1);
        let outcome = decode(&buf[0..k]);
        match outcome {
            DecodeOutcome::NeedMore(remaining) => prop_assert_eq!(remaining, n - k),
            DecodeOutcome::Skip(_) => {
                // only possible if k < FrameHeader::SIZE and the short prefix
                // happens to fail header validation; covered separately by
                // `need_more_below_header_size`.
                prop_assert!(k < FrameHeader::SIZE);
            }
            other => prop_assert!(false, "unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn need_more_below_header_size(len in 0usize..FrameHeader::SIZE) {
        let buf = vec![0u8; len];
        prop_assert_eq!(decode(&buf), DecodeOutcome::NeedMore(FrameHeader::SIZE - len));
    }

    // Invariant 4: single-bit-flip detection.
    #[test]
    fn bit_flip_detection(byte_idx in 0usize..16, bit in 0u8..8, reply_to_seq in any::<u8>()) {
        let mut enc = Encoder::new();
        let mut buf = [0u8; 32];
        let n = enc.encode_version(&mut buf, reply_to_seq).unwrap();
        let idx = byte_idx % n;
        buf[idx] ^= 1 << bit;
        let outcome = decode(&buf[0..n]);
        let is_frame = matches!(outcome, DecodeOutcome::Frame { .. });
        prop_assert!(!is_frame);
    }

    // Invariant 5: sequence monotonicity.
    #[test]
    fn sequence_monotonic(start_seq in any::<u8>(), count in 0usize..50) {
        let mut enc = Encoder::new();
        let mut buf = [0u8; 32];
        for _ in 0..start_seq {
            enc.encode_ping(&mut buf).unwrap();
        }
        prop_assert_eq!(enc.next_seq(), start_seq);
        for i in 0..count {
            let expected = start_seq.wrapping_add(i as u8);
            prop_assert_eq!(enc.next_seq(), expected);
            enc.encode_ping(&mut buf).unwrap();
        }
    }

    // Invariant 6: sampler selection law.
    #[test]
    fn sampler_selection_law(
        phase in 0u32..16,
        period in 1u32..16,
        start_ticks in any::<u32>(),
        offset in 0u32..64,
    ) {
        let phase = phase % period;
        let mut sampler = Sampler::new();
        sampler
            .register_variable(VariableDescriptor {
                phase_ticks: phase,
                period_ticks: period,
                address: 0x1000,
                size: 1,
            })
            .unwrap();
        sampler.start(start_ticks).unwrap();

        let tick = start_ticks.wrapping_add(offset);
        let relative = tick.wrapping_sub(start_ticks);
        let expected_match = period == 1 || relative % period == phase;

        let memory = ZeroMemory;
        let mut encoder = Encoder::new();
        let mut scratch = [0u8; 64];
        let mut matched = false;
        sampler.sample(tick, &memory, &mut encoder, &mut scratch, |_| {
            matched = true;
            true
        });
        prop_assert_eq!(matched, expected_match);
    }

    // Invariant 7: ring atomicity.
    #[test]
    fn ring_put_bytes_atomic(
        first in prop::collection::vec(any::<u8>(), 0..40),
        second_len in 0usize..60,
    ) {
        let ring: TxRing<32> = TxRing::new();
        let (producer, _consumer) = ring.split(NullCriticalSection);
        let first_ok = producer.put_bytes(&first);
        if first.len() <= 32 {
            prop_assert!(first_ok);
        }
        let len_before = producer.len();
        let free_before = producer.free();
        let second = vec![0xAAu8; second_len];
        let ok = producer.put_bytes(&second);
        if ok {
            prop_assert_eq!(producer.len(), len_before + second_len);
            prop_assert_eq!(producer.free(), free_before - second_len);
        } else {
            prop_assert_eq!(producer.len(), len_before);
            prop_assert_eq!(producer.free(), free_before);
        }
    }

    // Invariant 8: ring wrap-around preserves byte order.
    #[test]
    fn ring_wrap_preserves_order(
        chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..6), 1..10)
    ) {
        let ring: TxRing<8> = TxRing::new();
        let (producer, consumer) = ring.split(NullCriticalSection);
        let mut expected = Vec::new();
        let mut actual = Vec::new();
        for chunk in &chunks {
            if chunk.len() <= producer.free() && producer.put_bytes(chunk) {
                expected.extend_from_slice(chunk);
            }
            let mut drained = [0u8; 8];
            let n = consumer.drain_into(&mut drained);
            actual.extend_from_slice(&drained[0..n]);
        }
        let mut tail = [0u8; 8];
        loop {
            let n = consumer.drain_into(&mut tail);
            if n == 0 {
                break;
            }
            actual.extend_from_slice(&tail[0..n]);
        }
        prop_assert_eq!(actual, expected);
    }
}
