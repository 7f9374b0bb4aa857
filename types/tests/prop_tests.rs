use proptest::prelude::*;

use counterstake_types::{Address, ClaimId, Ratio, Timestamp};

proptest! {
    /// ceil_mul never undershoots and never overshoots by a whole unit.
    #[test]
    fn ceil_mul_brackets_exact_product(
        x in 0u128..1_000_000_000,
        num in 1u128..10_000,
        den in 1u128..10_000,
    ) {
        let r = Ratio::new(num, den).unwrap();
        let c = r.ceil_mul(x).unwrap();
        prop_assert!(c * den >= x * num);
        prop_assert!(c == 0 || (c - 1) * den < x * num);
    }

    /// floor_mul <= ceil_mul, equal exactly when the product is integral.
    #[test]
    fn floor_le_ceil(
        x in 0u128..1_000_000_000,
        num in 1u128..10_000,
        den in 1u128..10_000,
    ) {
        let r = Ratio::new(num, den).unwrap();
        let f = r.floor_mul(x).unwrap();
        let c = r.ceil_mul(x).unwrap();
        prop_assert!(f <= c);
        prop_assert_eq!(f == c, (x * num) % den == 0);
    }

    /// Display output parses back to the same ratio.
    #[test]
    fn ratio_display_parses_back(num in 0u128..1_000_000, den in 1u128..1_000_000) {
        let r = Ratio::new(num, den).unwrap();
        let parsed: Ratio = r.to_string().parse().unwrap();
        prop_assert_eq!(parsed, r);
    }

    /// The identity key depends on the amount.
    #[test]
    fn claim_id_depends_on_amount(a in 1u128..u128::MAX, b in 1u128..u128::MAX) {
        prop_assume!(a != b);
        let derive = |amount| ClaimId::derive(
            &Address::new("s"),
            &Address::new("r"),
            "tx",
            Timestamp::new(1),
            amount,
            0,
            "",
        );
        prop_assert_ne!(derive(a), derive(b));
    }

    /// ClaimId survives a bincode round trip.
    #[test]
    fn claim_id_bincode_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let id = ClaimId::new(bytes);
        let encoded = bincode::serialize(&id).unwrap();
        let decoded: ClaimId = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, id);
    }
}
