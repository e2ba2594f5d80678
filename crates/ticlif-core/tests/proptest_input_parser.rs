//! Property tests for [`InputParser`] restartability.
//!
//! However a byte stream is chopped into pushes, the decoded token sequence
//! must be the same as decoding it in one go.

use proptest::prelude::*;
use ticlif_core::input_parser::InputParser;

fn byte_strategy() -> impl Strategy<Value = u8> {
    prop_oneof![
        4 => 0x20u8..=0x7E,
        2 => Just(0xE0u8),
        2 => prop::sample::select(vec![b'H', b'P', b'K', b'M', b'S']),
        1 => prop::sample::select(vec![0x1Bu8, b'\r', b'\t', 0x08, 0x03, 0x00, 0x7F]),
        1 => any::<u8>(),
    ]
}

proptest! {
    #[test]
    fn chunking_does_not_change_tokens(
        bytes in prop::collection::vec(byte_strategy(), 0..64),
        cuts in prop::collection::vec(0usize..64, 0..8),
    ) {
        let mut whole = InputParser::new();
        let expected = whole.parse(&bytes);

        let mut cuts: Vec<usize> = cuts.into_iter().map(|c| c.min(bytes.len())).collect();
        cuts.sort_unstable();

        let mut chunked = InputParser::new();
        let mut got = Vec::new();
        let mut start = 0;
        for cut in cuts {
            got.extend(chunked.parse(&bytes[start..cut]));
            start = cut;
        }
        got.extend(chunked.parse(&bytes[start..]));

        prop_assert_eq!(got, expected);
        prop_assert_eq!(chunked.pending(), whole.pending());
    }

    #[test]
    fn pending_is_at_most_one_prefix(bytes in prop::collection::vec(byte_strategy(), 0..64)) {
        let mut parser = InputParser::new();
        let _ = parser.parse(&bytes);
        prop_assert!(parser.pending() <= 1);
        if parser.pending() == 1 {
            prop_assert!(parser.is_waiting());
        }
    }
}
